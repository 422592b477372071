use crate::domain::error::{AppError, IngestionFailure};
use actix_web::http::StatusCode;
use actix_web::HttpResponse;
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub detail: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<&'static str>,
}

pub fn status_for(err: &AppError) -> StatusCode {
    match err {
        AppError::ValidationError(_) => StatusCode::BAD_REQUEST,
        AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
        AppError::NotFound(_) => StatusCode::NOT_FOUND,
        AppError::LLMError(_) => StatusCode::BAD_GATEWAY,
        AppError::Ingestion(failure) => match failure {
            IngestionFailure::UnsupportedFileType(_)
            | IngestionFailure::PdfUnreadable(_)
            | IngestionFailure::MissingAuthToken => StatusCode::BAD_REQUEST,
            IngestionFailure::TicketFetch { .. }
            | IngestionFailure::TicketTransport(_)
            | IngestionFailure::TicketMalformed(_) => StatusCode::BAD_GATEWAY,
        },
        AppError::Internal(_) | AppError::ConfigError(_) | AppError::IoError(_) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

fn detail(err: &AppError) -> String {
    match err {
        AppError::Internal(msg)
        | AppError::NotFound(msg)
        | AppError::ValidationError(msg)
        | AppError::Unauthorized(msg)
        | AppError::LLMError(msg)
        | AppError::ConfigError(msg)
        | AppError::IoError(msg) => msg.clone(),
        AppError::Ingestion(failure) => failure.to_string(),
    }
}

pub fn error_response(err: &AppError) -> HttpResponse {
    let reason = match err {
        AppError::Ingestion(failure) => Some(failure.reason_code()),
        _ => None,
    };
    HttpResponse::build(status_for(err)).json(ErrorBody {
        detail: detail(err),
        reason,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            status_for(&IngestionFailure::MissingAuthToken.into()),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status_for(
                &IngestionFailure::TicketFetch {
                    status: 401,
                    body: String::new()
                }
                .into()
            ),
            StatusCode::BAD_GATEWAY
        );
        assert_eq!(
            status_for(&AppError::LLMError("timeout".to_string())),
            StatusCode::BAD_GATEWAY
        );
        assert_eq!(
            status_for(&AppError::IoError("disk full".to_string())),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_ingestion_detail_carries_failure_message() {
        let err: AppError = IngestionFailure::MissingAuthToken.into();
        assert_eq!(detail(&err), "Jira token not configured in Admin Settings");
        assert_eq!(
            detail(&AppError::NotFound("Context not found".to_string())),
            "Context not found"
        );
    }
}
