//! Role guards layered onto route groups after bearer authentication.
//!
//! Each guard reads the [`User`] that `http::auth::require_bearer` stored in
//! request extensions, so they must be installed inside the authenticated
//! router.

use axum::{
    extract::Request,
    middleware::Next,
    response::{IntoResponse, Response},
};
use db::{models::user::User, types::Role};

use crate::error::ApiError;

async fn require_role(allowed: &[Role], req: Request, next: Next) -> Response {
    let Some(user) = req.extensions().get::<User>() else {
        return ApiError::Unauthorized.into_response();
    };
    if !allowed.contains(&user.role) {
        tracing::warn!(
            path = %req.uri().path(),
            method = %req.method(),
            user = %user.email,
            role = ?user.role,
            "Forbidden API request"
        );
        return ApiError::Forbidden("Access denied".to_string()).into_response();
    }
    next.run(req).await
}

pub async fn require_staff(req: Request, next: Next) -> Response {
    require_role(&[Role::Admin, Role::Employee, Role::SuperAdmin], req, next).await
}

pub async fn require_admin(req: Request, next: Next) -> Response {
    require_role(&[Role::Admin, Role::SuperAdmin], req, next).await
}

pub async fn require_super_admin(req: Request, next: Next) -> Response {
    require_role(&[Role::SuperAdmin], req, next).await
}

pub async fn require_client(req: Request, next: Next) -> Response {
    require_role(&[Role::Client], req, next).await
}
