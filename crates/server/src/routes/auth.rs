use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::Json as ResponseJson,
    routing::post,
};
use serde_json::{Value, json};
use services::services::auth::{
    ChangePasswordRequest, ForgotPasswordRequest, GoogleLoginRequest, LoginRequest,
    RegisterRequest, VerifyOtpRequest,
};

use crate::{AppState, error::ApiError};

pub async fn register(
    State(state): State<AppState>,
    Json(payload): Json<RegisterRequest>,
) -> Result<(StatusCode, ResponseJson<Value>), ApiError> {
    let user = state.auth().register(&state.db().pool, payload).await?;
    Ok((
        StatusCode::CREATED,
        ResponseJson(json!({
            "statusCode": 201,
            "message": "User registered successfully",
            "user": user,
        })),
    ))
}

pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Result<ResponseJson<Value>, ApiError> {
    let login = state
        .auth()
        .login(&state.db().pool, state.jwt(), payload)
        .await?;
    Ok(ResponseJson(json!({
        "statusCode": 200,
        "token": login.token,
        "role": login.role,
        "message": "Login successful",
        "user": login.user,
    })))
}

pub async fn google_login(
    State(state): State<AppState>,
    Json(payload): Json<GoogleLoginRequest>,
) -> Result<ResponseJson<Value>, ApiError> {
    let login = state
        .auth()
        .google_login(
            &state.db().pool,
            state.jwt(),
            state.google(),
            &payload.credential,
        )
        .await?;
    Ok(ResponseJson(json!({
        "statusCode": 200,
        "token": login.token,
        "role": login.role,
        "message": "Google login successful",
        "user": login.user,
    })))
}

pub async fn forgot_password(
    State(state): State<AppState>,
    Json(payload): Json<ForgotPasswordRequest>,
) -> Result<ResponseJson<Value>, ApiError> {
    state
        .auth()
        .forgot_password(&state.db().pool, state.mailer(), &payload.email)
        .await?;
    Ok(ResponseJson(json!({
        "statusCode": 200,
        "message": "OTP sent to your email. Please check your inbox.",
    })))
}

pub async fn verify_otp(
    State(state): State<AppState>,
    Json(payload): Json<VerifyOtpRequest>,
) -> Result<ResponseJson<Value>, ApiError> {
    state
        .auth()
        .verify_otp(&state.db().pool, &payload.email, &payload.otp)
        .await?;
    Ok(ResponseJson(json!({
        "statusCode": 200,
        "message": "OTP verified successfully",
    })))
}

pub async fn change_password(
    State(state): State<AppState>,
    Json(payload): Json<ChangePasswordRequest>,
) -> Result<ResponseJson<Value>, ApiError> {
    state
        .auth()
        .change_password(&state.db().pool, payload)
        .await?;
    Ok(ResponseJson(json!({
        "statusCode": 200,
        "message": "Password changed successfully",
    })))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/auth/register", post(register))
        .route("/auth/login", post(login))
        .route("/auth/google-login", post(google_login))
        .route("/auth/forgot-password", post(forgot_password))
        .route("/auth/verify-otp", post(verify_otp))
        .route("/auth/change-password", post(change_password))
}
