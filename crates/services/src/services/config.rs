use std::env;

use utils_jwt::DEFAULT_TOKEN_LIFETIME_SECS;

pub const DEFAULT_HOST: &str = "127.0.0.1";
pub const DEFAULT_PORT: u16 = 8080;
const DEFAULT_DATABASE_URL: &str = "sqlite://workhub.sqlite";
const DEFAULT_MAIL_FROM: &str = "no-reply@workhub.local";

#[derive(Debug, Clone)]
pub struct SmtpConfig {
    pub host: String,
    pub username: String,
    pub password: String,
}

/// Runtime settings, read once at startup. Every value has a development
/// default so a bare `cargo run` comes up; production deployments are
/// expected to set `JWT_SECRET` at minimum.
#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub database_url: String,
    pub jwt_secret: String,
    pub token_lifetime_secs: u64,
    pub google_client_id: String,
    pub smtp: Option<SmtpConfig>,
    pub mail_from: String,
    pub frontend_origin: Option<String>,
    pub production: bool,
}

impl Config {
    pub fn from_env() -> Self {
        let host = env::var("HOST").unwrap_or_else(|_| DEFAULT_HOST.to_string());
        let port = env::var("BACKEND_PORT")
            .or_else(|_| env::var("PORT"))
            .ok()
            .and_then(|raw| raw.trim().parse().ok())
            .unwrap_or(DEFAULT_PORT);
        let database_url =
            env::var("DATABASE_URL").unwrap_or_else(|_| DEFAULT_DATABASE_URL.to_string());

        let jwt_secret = env::var("JWT_SECRET").unwrap_or_else(|_| {
            tracing::warn!("JWT_SECRET is not set, using an insecure development secret");
            "workhub-dev-secret".to_string()
        });
        let token_lifetime_secs = env::var("JWT_LIFETIME_SECS")
            .ok()
            .and_then(|raw| raw.trim().parse().ok())
            .unwrap_or(DEFAULT_TOKEN_LIFETIME_SECS);

        let google_client_id = env::var("GOOGLE_CLIENT_ID").unwrap_or_else(|_| {
            tracing::warn!("GOOGLE_CLIENT_ID is not set, Google sign-in will reject all tokens");
            String::new()
        });

        let smtp = match (
            env::var("SMTP_HOST"),
            env::var("SMTP_USER"),
            env::var("SMTP_PASS"),
        ) {
            (Ok(host), Ok(username), Ok(password)) => Some(SmtpConfig {
                host,
                username,
                password,
            }),
            _ => {
                tracing::warn!("SMTP is not fully configured, outgoing email is disabled");
                None
            }
        };
        let mail_from = env::var("MAIL_FROM")
            .ok()
            .filter(|value| !value.trim().is_empty())
            .or_else(|| smtp.as_ref().map(|smtp| smtp.username.clone()))
            .unwrap_or_else(|| DEFAULT_MAIL_FROM.to_string());

        let frontend_origin = env::var("FRONTEND_ORIGIN")
            .ok()
            .filter(|value| !value.trim().is_empty());
        let production = env::var("APP_ENV")
            .map(|value| value.eq_ignore_ascii_case("production"))
            .unwrap_or(false);

        Config {
            host,
            port,
            database_url,
            jwt_secret,
            token_lifetime_secs,
            google_client_id,
            smtp,
            mail_from,
            frontend_origin,
            production,
        }
    }
}
