use chrono::{Duration, Utc};
use db::models::password_otp::PasswordOtp;
use db::models::user::{CreateUser, User};
use db::types::Role;
use db::{DbErr, DbPool, TransactionTrait};
use rand::Rng;
use serde::Deserialize;
use thiserror::Error;
use utils_jwt::{JwtError, JwtService};

use crate::services::email::{otp_email, Mailer};
use crate::services::google::{GoogleIdentity, GoogleVerifier, GoogleVerifyError};
use crate::services::password::{hash_password, verify_password, PasswordError};

pub const OTP_TTL_MINUTES: i64 = 10;

#[derive(Debug, Error)]
pub enum AuthServiceError {
    #[error("User with email {0} already exists")]
    DuplicateEmail(String),
    #[error("Invalid role. Must be ADMIN, EMPLOYEE, or SUPER_ADMIN")]
    InvalidRole,
    #[error("Invalid email or password")]
    InvalidCredentials,
    #[error("User not associated with this email ,Contact sales")]
    GoogleUnknownUser,
    #[error("User with email {0} not found")]
    UnknownEmail(String),
    #[error("Invalid Google ID token")]
    InvalidGoogleCredential,
    #[error("Google authentication failed. Please try again.")]
    GoogleUnavailable,
    #[error("Invalid or expired OTP")]
    InvalidOrExpiredOtp,
    #[error(transparent)]
    Database(#[from] DbErr),
    #[error(transparent)]
    Password(#[from] PasswordError),
    #[error(transparent)]
    Token(#[from] JwtError),
}

pub type Result<T> = std::result::Result<T, AuthServiceError>;

#[derive(Debug, Clone, Deserialize)]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
    pub password: String,
    pub role: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GoogleLoginRequest {
    pub credential: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ForgotPasswordRequest {
    pub email: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct VerifyOtpRequest {
    pub email: String,
    pub otp: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangePasswordRequest {
    pub email: String,
    pub otp: String,
    pub new_password: String,
}

#[derive(Debug)]
pub struct LoginSuccess {
    pub token: String,
    pub role: Role,
    pub user: User,
}

#[derive(Clone, Default)]
pub struct AuthService;

impl AuthService {
    pub fn new() -> Self {
        Self
    }

    /// Self-registration. Only staff roles may be requested; omitting the
    /// role yields EMPLOYEE. CLIENT accounts are provisioned by admins.
    pub async fn register(&self, pool: &DbPool, data: RegisterRequest) -> Result<User> {
        if User::email_exists(pool, &data.email).await? {
            return Err(AuthServiceError::DuplicateEmail(data.email));
        }
        let role = match data
            .role
            .as_deref()
            .map(str::trim)
            .filter(|raw| !raw.is_empty())
        {
            Some(raw) => Role::parse(raw)
                .filter(Role::is_staff)
                .ok_or(AuthServiceError::InvalidRole)?,
            None => Role::Employee,
        };
        let password_hash = hash_password(&data.password)?;

        let user = User::create(
            pool,
            &CreateUser {
                name: data.name,
                email: data.email,
                password_hash,
                role,
                google_id: None,
                avatar_url: None,
                client_crm_id: None,
            },
        )
        .await?;
        tracing::info!("registered user {} with role {}", user.email, user.role);
        Ok(user)
    }

    pub async fn login(
        &self,
        pool: &DbPool,
        jwt: &JwtService,
        data: LoginRequest,
    ) -> Result<LoginSuccess> {
        let Some(stored_hash) = User::password_hash_by_email(pool, &data.email).await? else {
            return Err(AuthServiceError::InvalidCredentials);
        };
        if !verify_password(&data.password, &stored_hash)? {
            return Err(AuthServiceError::InvalidCredentials);
        }
        let user = User::find_by_email(pool, &data.email)
            .await?
            .ok_or(AuthServiceError::InvalidCredentials)?;

        let token = jwt.issue(&user.email)?;
        Ok(LoginSuccess {
            token,
            role: user.role,
            user,
        })
    }

    /// Sign-in with a Google ID token. The account must already exist; we
    /// never auto-provision from a Google identity.
    pub async fn google_login(
        &self,
        pool: &DbPool,
        jwt: &JwtService,
        verifier: &GoogleVerifier,
        credential: &str,
    ) -> Result<LoginSuccess> {
        let identity = match verifier.verify(credential).await {
            Ok(identity) => identity,
            Err(GoogleVerifyError::InvalidToken) => {
                return Err(AuthServiceError::InvalidGoogleCredential);
            }
            Err(GoogleVerifyError::KeyFetch(reason)) => {
                tracing::error!("failed to fetch Google signing keys: {}", reason);
                return Err(AuthServiceError::GoogleUnavailable);
            }
        };
        self.complete_google_login(pool, jwt, identity).await
    }

    /// The post-verification half of [`google_login`], split out so tests
    /// can drive it without Google's JWKS endpoint.
    ///
    /// [`google_login`]: AuthService::google_login
    pub async fn complete_google_login(
        &self,
        pool: &DbPool,
        jwt: &JwtService,
        identity: GoogleIdentity,
    ) -> Result<LoginSuccess> {
        let user = User::find_by_email(pool, &identity.email)
            .await?
            .ok_or(AuthServiceError::GoogleUnknownUser)?;

        // Backfill the Google id on first sign-in and refresh the avatar
        // when Google reports a new picture. A missing picture never clears
        // a stored avatar.
        let google_id_changed = user.google_id.as_deref() != Some(identity.sub.as_str());
        let avatar_changed = match identity.picture.as_deref() {
            Some(picture) => user.avatar_url.as_deref() != Some(picture),
            None => false,
        };
        let user = if google_id_changed || avatar_changed {
            let avatar_url = if avatar_changed {
                identity.picture.clone()
            } else {
                user.avatar_url.clone()
            };
            User::update_google_profile(pool, &user.email, &identity.sub, avatar_url.as_deref())
                .await?;
            User::find_by_email(pool, &user.email)
                .await?
                .ok_or(AuthServiceError::GoogleUnknownUser)?
        } else {
            user
        };

        let token = jwt.issue(&user.email)?;
        tracing::info!("google sign-in for {}", user.email);
        Ok(LoginSuccess {
            token,
            role: user.role,
            user,
        })
    }

    /// Issues a fresh OTP, replacing any previous one for the address, and
    /// emails it. A send failure is logged but does not fail the request;
    /// the code stays valid and the user can retry.
    pub async fn forgot_password(
        &self,
        pool: &DbPool,
        mailer: &dyn Mailer,
        email: &str,
    ) -> Result<()> {
        let user = User::find_by_email(pool, email)
            .await?
            .ok_or_else(|| AuthServiceError::UnknownEmail(email.to_string()))?;

        let otp = generate_otp();
        let expires_at = Utc::now() + Duration::minutes(OTP_TTL_MINUTES);
        PasswordOtp::upsert(pool, &user.email, &otp, expires_at).await?;

        if let Err(err) = mailer.send(otp_email(&user.email, &otp)).await {
            tracing::error!("Failed to send OTP email to: {}: {}", user.email, err);
        }
        Ok(())
    }

    /// Checks the OTP without consuming it, so the frontend can gate the
    /// new-password form. Only [`change_password`] burns the code.
    ///
    /// [`change_password`]: AuthService::change_password
    pub async fn verify_otp(&self, pool: &DbPool, email: &str, otp: &str) -> Result<()> {
        if PasswordOtp::verify(pool, email, otp).await? {
            Ok(())
        } else {
            Err(AuthServiceError::InvalidOrExpiredOtp)
        }
    }

    /// Consumes the OTP and replaces the password hash in one transaction.
    /// If either half fails nothing is kept, so a valid code survives a
    /// failed attempt rather than being burned for nothing.
    pub async fn change_password(&self, pool: &DbPool, data: ChangePasswordRequest) -> Result<()> {
        let new_hash = hash_password(&data.new_password)?;

        let txn = pool.begin().await?;
        if !PasswordOtp::consume(&txn, &data.email, &data.otp).await? {
            return Err(AuthServiceError::InvalidOrExpiredOtp);
        }
        if User::update_password_hash(&txn, &data.email, &new_hash).await? == 0 {
            return Err(AuthServiceError::UnknownEmail(data.email));
        }
        txn.commit().await?;
        tracing::info!("password changed for {}", data.email);
        Ok(())
    }
}

fn generate_otp() -> String {
    rand::thread_rng().gen_range(100_000..=999_999).to_string()
}
