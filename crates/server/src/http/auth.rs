use axum::{
    extract::{Request, State},
    http::header,
    middleware::Next,
    response::{IntoResponse, Response},
};
use db::models::user::User;

use crate::{AppState, error::ApiError};

fn parse_authorization_bearer(value: &str) -> Option<&str> {
    let trimmed = value.trim();
    let (prefix, rest) = trimmed.split_once(' ')?;
    if !prefix.eq_ignore_ascii_case("bearer") {
        return None;
    }
    let token = rest.trim();
    if token.is_empty() {
        return None;
    }
    Some(token)
}

fn unauthorized(req: &Request, reason: &'static str) -> Response {
    tracing::warn!(
        path = %req.uri().path(),
        method = %req.method(),
        reason,
        "Unauthorized API request"
    );
    ApiError::Unauthorized.into_response()
}

/// Verifies the `Authorization: Bearer` token and loads the authenticated
/// [`User`] into request extensions for downstream handlers and role guards.
pub async fn require_bearer(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Response {
    let token = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(parse_authorization_bearer)
        .map(str::to_string);

    let Some(token) = token else {
        return unauthorized(&req, "missing_token");
    };

    let claims = match state.jwt().verify(&token) {
        Ok(claims) => claims,
        Err(_) => return unauthorized(&req, "invalid_token"),
    };

    match User::find_by_email(&state.db().pool, &claims.sub).await {
        Ok(Some(user)) => {
            req.extensions_mut().insert(user);
            next.run(req).await
        }
        Ok(None) => unauthorized(&req, "unknown_subject"),
        Err(err) => ApiError::Database(err).into_response(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_bearer_tokens_case_insensitively() {
        assert_eq!(parse_authorization_bearer("Bearer abc123"), Some("abc123"));
        assert_eq!(parse_authorization_bearer("bearer abc123"), Some("abc123"));
        assert_eq!(
            parse_authorization_bearer("  BEARER   abc123  "),
            Some("abc123")
        );
    }

    #[test]
    fn rejects_malformed_authorization_headers() {
        assert_eq!(parse_authorization_bearer("abc123"), None);
        assert_eq!(parse_authorization_bearer("Basic abc123"), None);
        assert_eq!(parse_authorization_bearer("Bearer "), None);
        assert_eq!(parse_authorization_bearer(""), None);
    }
}
