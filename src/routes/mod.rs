use actix_web::HttpResponse;
use serde_json::json;

use crate::services::ServiceError;

pub mod products;

/// Translate a service failure into an HTTP response.
///
/// Validation and referential problems are the caller's fault and carry the
/// detail; storage failures are logged and answered with a generic message.
fn error_response(context: &str, err: ServiceError) -> HttpResponse {
    match err {
        ServiceError::NotFound => {
            HttpResponse::NotFound().json(json!({ "message": format!("{context} not found.") }))
        }
        ServiceError::Form(message) => {
            HttpResponse::BadRequest().json(json!({ "message": message }))
        }
        ServiceError::Referential(message) => {
            HttpResponse::BadRequest().json(json!({ "message": message }))
        }
        ServiceError::Repository(err) => {
            log::error!("{context} request failed: {err}");
            HttpResponse::InternalServerError()
                .json(json!({ "message": format!("Failed to process the {context} request.") }))
        }
    }
}
