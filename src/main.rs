//! Dashboard auth server - Main entry point.
//!
//! Starts the Actix-web server with configured routes and middleware.

use actix_cors::Cors;
use actix_web::{App, HttpServer, http::header, web};
use tracing::{Level, error, info, warn};
use tracing_subscriber::FmtSubscriber;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use dashauth_lib::api::{self, ApiDoc};
use dashauth_lib::config::Config;
use dashauth_lib::middleware::RequestLogger;
use dashauth_lib::services::{self, ProviderRegistry};
use dashauth_lib::sources::SourceRegistry;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    // Initialize logging
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .finish();
    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {}", e);
        std::process::exit(1);
    }

    // Load configuration
    let config = match Config::from_env() {
        Ok(cfg) => cfg,
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            error!("");
            error!("Please check your environment variables:");
            error!("  - RUST_ENV must be set to 'development' or 'production'");
            error!("  - In production, DASH_PUBLIC_URL and at least one OAuth provider must be set");
            error!("  - OAuth client IDs and secrets must be set in pairs");
            std::process::exit(1);
        }
    };

    info!("========================================");
    info!("  Dashboard Auth Server");
    info!("  Environment: {}", config.environment);
    info!("========================================");

    if config.is_development() {
        warn!("Running in DEVELOPMENT mode - do not use in production!");
        info!("Using development sources (1: enterprise, 2: plain) unless DASH_SOURCES_FILE is set");
    }

    let providers = ProviderRegistry::from_config(&config);
    if providers.is_empty() {
        warn!("No OAuth provider configured; principal resolution is disabled");
    }
    let sources = SourceRegistry::new(config.sources.clone());
    info!("{} source(s) loaded", sources.len());

    let bind_address = config.bind_address();
    let is_development = config.is_development();

    let worker_count = if is_development {
        info!(
            "Starting server at http://{} (4 workers - development mode)",
            bind_address
        );
        4
    } else {
        let cpus = num_cpus::get();
        info!("Starting server at http://{} ({} workers)", bind_address, cpus);
        cpus
    };

    let config = web::Data::new(config);
    let providers = web::Data::new(providers);
    let sources = web::Data::new(sources);
    let openapi = ApiDoc::openapi();

    let server = HttpServer::new(move || {
        let methods = vec!["GET", "POST", "PATCH", "DELETE", "OPTIONS"];
        let headers = vec![header::AUTHORIZATION, header::ACCEPT, header::CONTENT_TYPE];
        let cors = if is_development {
            // Dashboard dev server
            Cors::default()
                .allowed_origin("http://localhost:3000")
                .allowed_origin("http://127.0.0.1:3000")
                .allowed_methods(methods)
                .allowed_headers(headers)
                .expose_headers(vec![header::LOCATION])
                .max_age(3600)
        } else {
            // Same-origin only
            Cors::default()
                .allowed_methods(methods)
                .allowed_headers(headers)
                .expose_headers(vec![header::LOCATION])
                .max_age(3600)
        };

        App::new()
            // CORS must wrap everything else
            .wrap(cors)
            .wrap(RequestLogger)
            .app_data(config.clone())
            .app_data(providers.clone())
            .app_data(sources.clone())
            .app_data(services::roles::json_config())
            .service(
                web::scope("/api/v1")
                    .configure(api::configure_health_routes)
                    .configure(services::configure_login_routes)
                    .configure(services::configure_role_routes),
            )
            .service(
                SwaggerUi::new("/api/docs/{_:.*}")
                    .url("/api/docs/openapi.json", openapi.clone()),
            )
    });

    server
        .workers(worker_count)
        .bind(&bind_address)?
        .run()
        .await
}
