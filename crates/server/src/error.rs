use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use db::DbErr;
use serde::Serialize;
use services::services::{
    auth::AuthServiceError, crm::CrmServiceError, meetings::MeetingServiceError,
    tasks::TaskServiceError, users::UserServiceError,
};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Auth(#[from] AuthServiceError),
    #[error(transparent)]
    Crm(#[from] CrmServiceError),
    #[error(transparent)]
    Task(#[from] TaskServiceError),
    #[error(transparent)]
    Meeting(#[from] MeetingServiceError),
    #[error(transparent)]
    User(#[from] UserServiceError),
    #[error(transparent)]
    Database(#[from] DbErr),
    #[error("Unauthorized")]
    Unauthorized,
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Bad request: {0}")]
    BadRequest(String),
    #[error("Forbidden: {0}")]
    Forbidden(String),
    #[error("Internal server error: {0}")]
    Internal(String),
}

/// The error body every endpoint returns.
#[derive(Debug, Serialize)]
struct ErrorBody {
    #[serde(rename = "statusCode")]
    status_code: u16,
    message: String,
}

fn status_for_db_err(err: &DbErr) -> StatusCode {
    match err {
        DbErr::RecordNotFound(_) => StatusCode::NOT_FOUND,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status_code = match &self {
            ApiError::Auth(err) => match err {
                AuthServiceError::DuplicateEmail(_) => StatusCode::CONFLICT,
                AuthServiceError::InvalidRole | AuthServiceError::InvalidOrExpiredOtp => {
                    StatusCode::BAD_REQUEST
                }
                AuthServiceError::InvalidCredentials
                | AuthServiceError::InvalidGoogleCredential => StatusCode::UNAUTHORIZED,
                AuthServiceError::GoogleUnknownUser | AuthServiceError::UnknownEmail(_) => {
                    StatusCode::NOT_FOUND
                }
                AuthServiceError::Database(db_err) => status_for_db_err(db_err),
                AuthServiceError::GoogleUnavailable
                | AuthServiceError::Password(_)
                | AuthServiceError::Token(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
            ApiError::Crm(err) => match err {
                CrmServiceError::NotFound(_) | CrmServiceError::ClientNotLinked(_) => {
                    StatusCode::NOT_FOUND
                }
                CrmServiceError::Database(db_err) => status_for_db_err(db_err),
            },
            ApiError::Task(err) => match err {
                TaskServiceError::NotFound(_) | TaskServiceError::ClientNotLinked(_) => {
                    StatusCode::NOT_FOUND
                }
                TaskServiceError::Database(db_err) => status_for_db_err(db_err),
            },
            ApiError::Meeting(err) => match err {
                MeetingServiceError::NotFound(_) => StatusCode::NOT_FOUND,
                MeetingServiceError::Database(db_err) => status_for_db_err(db_err),
            },
            ApiError::User(err) => match err {
                UserServiceError::NotFound(_) => StatusCode::NOT_FOUND,
                UserServiceError::InvalidRole => StatusCode::BAD_REQUEST,
                UserServiceError::Database(db_err) => status_for_db_err(db_err),
            },
            ApiError::Database(db_err) => status_for_db_err(db_err),
            ApiError::Unauthorized => StatusCode::UNAUTHORIZED,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        // For the plain wrapper variants the prefix ("Not found: ") is for
        // logs; clients get the bare message.
        let message = match &self {
            ApiError::NotFound(msg)
            | ApiError::BadRequest(msg)
            | ApiError::Forbidden(msg)
            | ApiError::Internal(msg) => msg.clone(),
            _ => self.to_string(),
        };

        if status_code.is_server_error() {
            tracing::error!(
                status = %status_code,
                error = %self,
                "API request failed"
            );
        }
        let body = ErrorBody {
            status_code: status_code.as_u16(),
            message,
        };
        (status_code, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn api_error_maps_to_expected_http_statuses() {
        assert_eq!(
            ApiError::Unauthorized.into_response().status(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            ApiError::Forbidden("Access denied".to_string())
                .into_response()
                .status(),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            ApiError::NotFound("missing".to_string())
                .into_response()
                .status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ApiError::Internal("boom".to_string())
                .into_response()
                .status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn auth_errors_map_to_expected_http_statuses() {
        assert_eq!(
            ApiError::from(AuthServiceError::DuplicateEmail("a@b.c".to_string()))
                .into_response()
                .status(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            ApiError::from(AuthServiceError::InvalidCredentials)
                .into_response()
                .status(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            ApiError::from(AuthServiceError::InvalidOrExpiredOtp)
                .into_response()
                .status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::from(AuthServiceError::GoogleUnknownUser)
                .into_response()
                .status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ApiError::from(AuthServiceError::GoogleUnavailable)
                .into_response()
                .status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn domain_errors_map_to_expected_http_statuses() {
        assert_eq!(
            ApiError::from(TaskServiceError::NotFound("Task not found".to_string()))
                .into_response()
                .status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ApiError::from(TaskServiceError::ClientNotLinked("c@d.e".to_string()))
                .into_response()
                .status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ApiError::from(UserServiceError::InvalidRole)
                .into_response()
                .status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::from(DbErr::RecordNotFound("row".to_string()))
                .into_response()
                .status(),
            StatusCode::NOT_FOUND
        );
    }
}
