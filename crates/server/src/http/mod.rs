use axum::{
    Router,
    http::{HeaderValue, Method, header},
    middleware::from_fn_with_state,
    routing::get,
};
use services::services::config::Config;
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    trace::TraceLayer,
};

use crate::{AppState, routes};

mod auth;

fn is_local_origin(origin: &HeaderValue) -> bool {
    let Ok(origin) = origin.to_str() else {
        return false;
    };
    let Some(rest) = origin
        .strip_prefix("http://")
        .or_else(|| origin.strip_prefix("https://"))
    else {
        return false;
    };
    let host = rest.split(':').next().unwrap_or(rest);
    host == "localhost"
        || host == "127.0.0.1"
        || host.starts_with("192.168.")
        || host.starts_with("10.")
}

/// In production the configured frontend origin is the only one allowed;
/// everywhere else any localhost or private-LAN origin may call the API.
fn cors_layer(config: &Config) -> CorsLayer {
    let allow_origin = match (config.production, config.frontend_origin.as_deref()) {
        (true, Some(origin)) => match origin.parse::<HeaderValue>() {
            Ok(value) => AllowOrigin::exact(value),
            Err(_) => {
                tracing::warn!(
                    origin,
                    "FRONTEND_ORIGIN is not a valid header value, falling back to local origins"
                );
                AllowOrigin::predicate(|origin, _| is_local_origin(origin))
            }
        },
        _ => AllowOrigin::predicate(|origin, _| is_local_origin(origin)),
    };

    CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
}

pub fn router(state: AppState) -> Router {
    let protected_routes = Router::new()
        .merge(routes::crm::router())
        .merge(routes::tasks::router())
        .merge(routes::meetings::router())
        .merge(routes::users::router())
        .layer(from_fn_with_state(state.clone(), auth::require_bearer));

    let api_routes = Router::new()
        .merge(routes::auth::router())
        .merge(protected_routes);

    Router::new()
        .route("/health", get(routes::health::health_check))
        .nest("/api/v1", api_routes)
        .layer(cors_layer(state.config()))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::{
        Router,
        body::{Body, to_bytes},
        http::{Request, Response, StatusCode, header},
    };
    use db::{
        DBService,
        models::{
            crm_entry::{CreateCrmEntry, CrmEntry},
            user::{CreateUser, User},
        },
        types::Role,
    };
    use sea_orm_migration::MigratorTrait;
    use serde_json::{Value, json};
    use services::services::{config::Config, email::NoopMailer};
    use tower::ServiceExt;
    use uuid::Uuid;

    use crate::AppState;

    async fn test_state() -> AppState {
        let conn = sea_orm::Database::connect("sqlite::memory:").await.unwrap();
        db_migration::Migrator::up(&conn, None).await.unwrap();
        let config = Config {
            host: "127.0.0.1".to_string(),
            port: 0,
            database_url: "sqlite::memory:".to_string(),
            jwt_secret: "test-secret".to_string(),
            token_lifetime_secs: 3600,
            google_client_id: String::new(),
            smtp: None,
            mail_from: "no-reply@workhub.local".to_string(),
            frontend_origin: None,
            production: false,
        };
        AppState::new(
            DBService::from_connection(conn),
            config,
            Arc::new(NoopMailer),
        )
    }

    async fn test_app() -> (AppState, Router) {
        let state = test_state().await;
        let app = super::router(state.clone());
        (state, app)
    }

    async fn seed_user(state: &AppState, email: &str, role: Role) -> User {
        User::create(
            &state.db().pool,
            &CreateUser {
                name: email.split('@').next().unwrap_or(email).to_string(),
                email: email.to_string(),
                password_hash: "irrelevant".to_string(),
                role,
                google_id: None,
                avatar_url: None,
                client_crm_id: None,
            },
        )
        .await
        .unwrap()
    }

    fn bearer(state: &AppState, email: &str) -> String {
        format!("Bearer {}", state.jwt().issue(email).unwrap())
    }

    fn get_request(uri: &str, authorization: Option<&str>) -> Request<Body> {
        let mut builder = Request::builder().uri(uri);
        if let Some(value) = authorization {
            builder = builder.header(header::AUTHORIZATION, value);
        }
        builder.body(Body::empty()).unwrap()
    }

    fn json_request(method: &str, uri: &str, authorization: Option<&str>, body: Value) -> Request<Body> {
        let mut builder = Request::builder()
            .method(method)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json");
        if let Some(value) = authorization {
            builder = builder.header(header::AUTHORIZATION, value);
        }
        builder
            .body(Body::from(serde_json::to_vec(&body).unwrap()))
            .unwrap()
    }

    async fn json_body(response: Response<Body>) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn health_is_public() {
        let (_state, app) = test_app().await;

        let response = app.oneshot(get_request("/health", None)).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(body.get("status").and_then(Value::as_str), Some("ok"));
    }

    #[tokio::test]
    async fn protected_routes_reject_missing_and_bogus_tokens() {
        let (_state, app) = test_app().await;

        let response = app
            .clone()
            .oneshot(get_request("/api/v1/tasks", None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        let body = json_body(response).await;
        assert_eq!(body.get("statusCode").and_then(Value::as_u64), Some(401));
        assert_eq!(
            body.get("message").and_then(Value::as_str),
            Some("Unauthorized")
        );

        let response = app
            .oneshot(get_request("/api/v1/tasks", Some("Bearer not-a-jwt")))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn register_login_and_call_a_protected_route() {
        let (_state, app) = test_app().await;

        let response = app
            .clone()
            .oneshot(json_request(
                "POST",
                "/api/v1/auth/register",
                None,
                json!({"name": "Dana", "email": "dana@example.com", "password": "hunter22"}),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);
        let body = json_body(response).await;
        assert_eq!(
            body.get("message").and_then(Value::as_str),
            Some("User registered successfully")
        );
        assert_eq!(
            body.pointer("/user/role").and_then(Value::as_str),
            Some("EMPLOYEE")
        );

        let response = app
            .clone()
            .oneshot(json_request(
                "POST",
                "/api/v1/auth/login",
                None,
                json!({"email": "dana@example.com", "password": "hunter22"}),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(
            body.get("message").and_then(Value::as_str),
            Some("Login successful")
        );
        let token = body
            .get("token")
            .and_then(Value::as_str)
            .unwrap()
            .to_string();

        let response = app
            .oneshot(get_request(
                "/api/v1/tasks",
                Some(&format!("Bearer {token}")),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(json_body(response).await, json!([]));
    }

    #[tokio::test]
    async fn login_with_wrong_password_is_unauthorized() {
        let (_state, app) = test_app().await;

        let response = app
            .clone()
            .oneshot(json_request(
                "POST",
                "/api/v1/auth/register",
                None,
                json!({"name": "Dana", "email": "dana@example.com", "password": "hunter22"}),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);

        let response = app
            .oneshot(json_request(
                "POST",
                "/api/v1/auth/login",
                None,
                json!({"email": "dana@example.com", "password": "wrong"}),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        let body = json_body(response).await;
        assert_eq!(
            body.get("message").and_then(Value::as_str),
            Some("Invalid email or password")
        );
    }

    #[tokio::test]
    async fn role_guards_enforce_the_access_matrix() {
        let (state, app) = test_app().await;
        let employee = seed_user(&state, "emp@example.com", Role::Employee).await;
        seed_user(&state, "client@example.com", Role::Client).await;
        seed_user(&state, "root@example.com", Role::SuperAdmin).await;

        // Employees cannot delete tasks.
        let response = app
            .clone()
            .oneshot(
                Request::builder()
                    .method("DELETE")
                    .uri(format!("/api/v1/tasks/{}", Uuid::new_v4()))
                    .header(header::AUTHORIZATION, bearer(&state, "emp@example.com"))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
        let body = json_body(response).await;
        assert_eq!(
            body.get("message").and_then(Value::as_str),
            Some("Access denied")
        );

        // Clients cannot browse the CRM list.
        let response = app
            .clone()
            .oneshot(get_request(
                "/api/v1/crm",
                Some(&bearer(&state, "client@example.com")),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);

        // Staff cannot use the client-only entry point.
        let response = app
            .clone()
            .oneshot(get_request(
                "/api/v1/crm/my-crm",
                Some(&bearer(&state, "emp@example.com")),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);

        // Employees cannot change roles, super admins can.
        let response = app
            .clone()
            .oneshot(json_request(
                "PUT",
                &format!("/api/v1/users/{}", employee.id),
                Some(&bearer(&state, "emp@example.com")),
                json!({"role": "ADMIN"}),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);

        let response = app
            .oneshot(json_request(
                "PUT",
                &format!("/api/v1/users/{}", employee.id),
                Some(&bearer(&state, "root@example.com")),
                json!({"role": "ADMIN"}),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(body.get("role").and_then(Value::as_str), Some("ADMIN"));
    }

    #[tokio::test]
    async fn clients_read_their_linked_crm_entry() {
        let (state, app) = test_app().await;
        let entry = CrmEntry::create(
            &state.db().pool,
            &CreateCrmEntry {
                company: "Acme Corp".to_string(),
                ..Default::default()
            },
        )
        .await
        .unwrap();
        User::create(
            &state.db().pool,
            &CreateUser {
                name: "Acme Contact".to_string(),
                email: "contact@acme.test".to_string(),
                password_hash: "irrelevant".to_string(),
                role: Role::Client,
                google_id: None,
                avatar_url: None,
                client_crm_id: Some(entry.id),
            },
        )
        .await
        .unwrap();
        seed_user(&state, "lost@client.test", Role::Client).await;

        let response = app
            .clone()
            .oneshot(get_request(
                "/api/v1/crm/my-crm",
                Some(&bearer(&state, "contact@acme.test")),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(
            body.get("company").and_then(Value::as_str),
            Some("Acme Corp")
        );

        let response = app
            .oneshot(get_request(
                "/api/v1/crm/my-crm",
                Some(&bearer(&state, "lost@client.test")),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let body = json_body(response).await;
        assert_eq!(
            body.get("message").and_then(Value::as_str),
            Some(
                "Client user 'lost@client.test' is not linked to any CRM entry. \
                 Please contact administrator."
            )
        );
    }

    #[tokio::test]
    async fn crm_list_is_wrapped_and_buckets_are_bare() {
        let (state, app) = test_app().await;
        seed_user(&state, "emp@example.com", Role::Employee).await;
        CrmEntry::create(
            &state.db().pool,
            &CreateCrmEntry {
                company: "Acme Corp".to_string(),
                status: Some("Onboarded".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
        let auth = bearer(&state, "emp@example.com");

        let response = app
            .clone()
            .oneshot(get_request("/api/v1/crm", Some(&auth)))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        let list = body.get("crmList").and_then(Value::as_array).unwrap();
        assert_eq!(list.len(), 1);

        let response = app
            .oneshot(get_request("/api/v1/crm/onboarded", Some(&auth)))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(body.as_array().map(Vec::len), Some(1));
    }

    #[tokio::test]
    async fn missing_task_carries_the_id_in_the_error_body() {
        let (state, app) = test_app().await;
        seed_user(&state, "emp@example.com", Role::Employee).await;
        let id = Uuid::new_v4();

        let response = app
            .oneshot(get_request(
                &format!("/api/v1/tasks/{id}"),
                Some(&bearer(&state, "emp@example.com")),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let body = json_body(response).await;
        assert_eq!(body.get("statusCode").and_then(Value::as_u64), Some(404));
        assert_eq!(
            body.get("message").and_then(Value::as_str),
            Some(format!("Task not found with id: {id}").as_str())
        );
    }

    #[tokio::test]
    async fn preflight_allows_local_origins_only() {
        let (_state, app) = test_app().await;

        let preflight = |origin: &'static str| {
            Request::builder()
                .method("OPTIONS")
                .uri("/api/v1/tasks")
                .header(header::ORIGIN, origin)
                .header(header::ACCESS_CONTROL_REQUEST_METHOD, "GET")
                .body(Body::empty())
                .unwrap()
        };

        let response = app
            .clone()
            .oneshot(preflight("http://localhost:5173"))
            .await
            .unwrap();
        assert_eq!(
            response
                .headers()
                .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
                .and_then(|value| value.to_str().ok()),
            Some("http://localhost:5173")
        );

        let response = app
            .oneshot(preflight("https://evil.example.com"))
            .await
            .unwrap();
        assert!(
            response
                .headers()
                .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
                .is_none()
        );
    }

    #[test]
    fn local_origin_predicate_covers_lan_addresses() {
        let local = |origin: &str| super::is_local_origin(&origin.parse().unwrap());

        assert!(local("http://localhost:5173"));
        assert!(local("http://127.0.0.1:3000"));
        assert!(local("https://localhost"));
        assert!(local("http://192.168.1.42:8080"));
        assert!(local("http://10.0.0.7:3000"));
        assert!(!local("https://app.example.com"));
        assert!(!local("http://172.16.0.1:3000"));
        assert!(!local("ws://localhost:5173"));
    }
}
