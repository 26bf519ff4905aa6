use crate::config::ConfigError;
use crate::survey::controller::{FormError, Notice};
use crate::survey::submission::SubmissionError;
use crate::telemetry::TelemetryError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use std::fmt;

#[derive(Debug)]
pub enum AppError {
    Config(ConfigError),
    Telemetry(TelemetryError),
    Io(std::io::Error),
    Submission(SubmissionError),
    Form(FormError),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Config(err) => write!(f, "configuration error: {}", err),
            AppError::Telemetry(err) => write!(f, "telemetry error: {}", err),
            AppError::Io(err) => write!(f, "io error: {}", err),
            AppError::Submission(err) => write!(f, "submission setup error: {}", err),
            AppError::Form(err) => write!(f, "form error: {}", err),
        }
    }
}

impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AppError::Config(err) => Some(err),
            AppError::Telemetry(err) => Some(err),
            AppError::Io(err) => Some(err),
            AppError::Submission(err) => Some(err),
            AppError::Form(err) => Some(err),
        }
    }
}

impl AppError {
    fn status(&self) -> StatusCode {
        match self {
            AppError::Form(FormError::Validation(_)) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::Form(FormError::Busy(_) | FormError::NotInProgress(_)) => {
                StatusCode::CONFLICT
            }
            AppError::Form(_) => StatusCode::BAD_REQUEST,
            AppError::Config(_)
            | AppError::Telemetry(_)
            | AppError::Io(_)
            | AppError::Submission(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = match &self {
            AppError::Form(FormError::Validation(err)) => {
                let notice = Notice::ValidationFailed {
                    missing: err.missing.clone(),
                };
                Json(json!({
                    "error": self.to_string(),
                    "missing": err.missing.iter().map(|field| field.key()).collect::<Vec<_>>(),
                    "notice": notice.message(),
                }))
            }
            _ => Json(json!({ "error": self.to_string() })),
        };
        (status, body).into_response()
    }
}

impl From<ConfigError> for AppError {
    fn from(value: ConfigError) -> Self {
        Self::Config(value)
    }
}

impl From<TelemetryError> for AppError {
    fn from(value: TelemetryError) -> Self {
        Self::Telemetry(value)
    }
}

impl From<std::io::Error> for AppError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<SubmissionError> for AppError {
    fn from(value: SubmissionError) -> Self {
        Self::Submission(value)
    }
}

impl From<FormError> for AppError {
    fn from(value: FormError) -> Self {
        Self::Form(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::survey::controller::FormStatus;
    use crate::survey::domain::FieldId;
    use crate::survey::validation::ValidationError;

    #[test]
    fn form_errors_map_to_client_statuses() {
        let validation = AppError::from(FormError::Validation(ValidationError {
            missing: vec![FieldId::Price],
        }));
        assert_eq!(validation.status(), StatusCode::UNPROCESSABLE_ENTITY);

        let busy = AppError::from(FormError::Busy(FormStatus::Submitting));
        assert_eq!(busy.status(), StatusCode::CONFLICT);

        let unknown = AppError::from(FormError::UnknownField("garage".to_string()));
        assert_eq!(unknown.status(), StatusCode::BAD_REQUEST);

        assert_eq!(
            AppError::from(ConfigError::InvalidPort).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[tokio::test]
    async fn validation_body_lists_wire_keys() {
        let response = AppError::from(FormError::Validation(ValidationError {
            missing: vec![FieldId::Price, FieldId::InformantName],
        }))
        .into_response();

        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        let body = axum::body::to_bytes(response.into_body(), 16 * 1024)
            .await
            .expect("body readable");
        let body: serde_json::Value = serde_json::from_slice(&body).expect("json body");
        assert_eq!(body["missing"], json!(["price", "informantName"]));
    }
}
