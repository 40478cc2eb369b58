//! Actix-web extractor resolving the `{id}` path segment to a source.

use std::future::{Ready, ready};
use std::sync::Arc;

use actix_web::dev::Payload;
use actix_web::{FromRequest, HttpRequest, web};
use tracing::error;

use super::{SourceRegistry, TimeSeries};
use crate::error::AppError;
use crate::models::Source;
use crate::store::RolesStore;

/// The source named by the request path, with its backend handle.
///
/// Use this in handlers mounted under `/sources/{id}`:
/// ```ignore
/// async fn handler(series: SourceSeries) -> AppResult<HttpResponse> {
///     let roles = series.roles()?;
/// }
/// ```
pub struct SourceSeries {
    pub source: Source,
    pub series: Arc<dyn TimeSeries>,
}

impl SourceSeries {
    pub fn id(&self) -> i64 {
        self.source.id
    }

    /// Role store of the source; sources without role support are a 404.
    pub fn roles(&self) -> Result<Arc<dyn RolesStore>, AppError> {
        self.series
            .roles()
            .ok_or(AppError::MissingRoleCapability(self.source.id))
    }
}

impl FromRequest for SourceSeries {
    type Error = AppError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let Some(registry) = req.app_data::<web::Data<SourceRegistry>>() else {
            error!("SourceRegistry missing from app data");
            return ready(Err(AppError::NotFound("Source registry".to_string())));
        };

        let raw_id = req.match_info().get("id").unwrap_or_default();
        let id = match raw_id.parse::<i64>() {
            Ok(id) => id,
            Err(_) => {
                return ready(Err(AppError::InvalidInput(format!(
                    "Error converting source ID '{}'",
                    raw_id
                ))));
            }
        };

        ready(
            registry
                .get(id)
                .map(|(source, series)| SourceSeries { source, series })
                .ok_or_else(|| AppError::NotFound(format!("Source {}", id))),
        )
    }
}
