//! Mock provider API for principal resolution tests.
//!
//! Starts an in-process HTTP server answering the userinfo, email and
//! organization endpoints the providers call. Responses are scripted per
//! test through [`MockState`].

use actix_web::{App, HttpRequest, HttpResponse, HttpServer, get, web};
use serde::Deserialize;
use serde_json::Value;
use std::net::TcpListener;
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Access token the mock accepts.
pub const TEST_TOKEN: &str = "gho_test-token";

/// Scripted responses of the mock API.
#[derive(Default)]
pub struct MockState {
    /// Body of `GET /userinfo`
    pub userinfo: Value,
    /// Body of `GET /userinfo/emails` and `GET /user/emails`
    pub emails: Value,
    /// Pages served by `GET /user/orgs`, first page is 1
    pub org_pages: Vec<Value>,
    /// Serve a `next` link after the last page too
    pub endless_orgs: bool,
    /// Status forced on every endpoint
    pub status: Option<u16>,
    /// Delay before every response
    pub delay: Option<Duration>,
    /// Number of email listing calls received
    pub email_calls: usize,
    /// Pages of organizations requested, in order
    pub org_requests: Vec<u32>,
}

type SharedState = web::Data<Arc<Mutex<MockState>>>;

#[derive(Deserialize)]
struct PageQuery {
    #[serde(default = "first_page")]
    page: u32,
}

fn first_page() -> u32 {
    1
}

/// Shared preamble: delay, token check and forced status.
async fn gate(req: &HttpRequest, state: &SharedState) -> Option<HttpResponse> {
    let delay = state.lock().unwrap().delay;
    if let Some(delay) = delay {
        tokio::time::sleep(delay).await;
    }

    let authorized = req
        .headers()
        .get("Authorization")
        .and_then(|v| v.to_str().ok())
        == Some(format!("Bearer {}", TEST_TOKEN).as_str());
    if !authorized {
        return Some(HttpResponse::Unauthorized().json(serde_json::json!({
            "message": "Bad credentials"
        })));
    }

    let status = state.lock().unwrap().status;
    status.map(|code| {
        HttpResponse::build(actix_web::http::StatusCode::from_u16(code).unwrap())
            .json(serde_json::json!({"message": "scripted failure"}))
    })
}

#[get("/userinfo")]
async fn userinfo(req: HttpRequest, state: SharedState) -> HttpResponse {
    if let Some(resp) = gate(&req, &state).await {
        return resp;
    }
    HttpResponse::Ok().json(state.lock().unwrap().userinfo.clone())
}

async fn emails(req: HttpRequest, state: SharedState) -> HttpResponse {
    if let Some(resp) = gate(&req, &state).await {
        return resp;
    }
    let mut state = state.lock().unwrap();
    state.email_calls += 1;
    HttpResponse::Ok().json(state.emails.clone())
}

#[get("/user/orgs")]
async fn orgs(req: HttpRequest, state: SharedState, query: web::Query<PageQuery>) -> HttpResponse {
    if let Some(resp) = gate(&req, &state).await {
        return resp;
    }

    let mut state = state.lock().unwrap();
    state.org_requests.push(query.page);

    let index = query.page.saturating_sub(1) as usize;
    let body = state
        .org_pages
        .get(index)
        .cloned()
        .unwrap_or_else(|| Value::Array(vec![]));

    let mut resp = HttpResponse::Ok();
    let has_next = state.endless_orgs || index + 1 < state.org_pages.len();
    if has_next {
        let info = req.connection_info();
        let base = format!("{}://{}", info.scheme(), info.host());
        resp.insert_header((
            "Link",
            format!(
                "<{base}/user/orgs?per_page=10&page={next}>; rel=\"next\", \
                 <{base}/user/orgs?per_page=10&page=1>; rel=\"first\"",
                next = query.page + 1
            ),
        ));
    }
    resp.json(body)
}

/// Mock provider API on an ephemeral port.
pub struct MockApi {
    pub base_url: String,
    pub state: Arc<Mutex<MockState>>,
}

impl MockApi {
    /// Start the mock API serving `state`.
    pub async fn start(state: MockState) -> Self {
        let state = Arc::new(Mutex::new(state));

        let listener = TcpListener::bind("127.0.0.1:0").expect("failed to bind");
        let port = listener.local_addr().unwrap().port();
        let base_url = format!("http://127.0.0.1:{}", port);

        let state_data = state.clone();
        let server = HttpServer::new(move || {
            App::new()
                .app_data(web::Data::new(state_data.clone()))
                .service(userinfo)
                .service(orgs)
                .route("/userinfo/emails", web::get().to(emails))
                .route("/user/emails", web::get().to(emails))
        })
        .workers(1)
        .listen(listener)
        .expect("failed to listen")
        .disable_signals()
        .run();

        // Fire and forget; server lives for the process lifetime
        tokio::spawn(server);

        MockApi { base_url, state }
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    pub fn email_calls(&self) -> usize {
        self.state.lock().unwrap().email_calls
    }

    pub fn org_requests(&self) -> Vec<u32> {
        self.state.lock().unwrap().org_requests.clone()
    }
}
