// HTTP routes configuration

use crate::core::state::AppState;
use crate::handlers::{fallback, health, users};
use axum::{
    routing::{get, post, put},
    Router,
};
use std::sync::Arc;

pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))

        // User directory; static segments win over /{login}
        .route("/api/users", post(users::create_user_handler))
        .route("/api/users/active-users", get(users::active_users_handler))
        .route("/api/users/self", get(users::self_handler))
        .route("/api/users/older-than/{age}", get(users::older_than_handler))
        .route(
            "/api/users/{login}",
            get(users::get_by_login_handler).delete(users::delete_user_handler),
        )
        .route("/api/users/update-info/{login}", put(users::update_info_handler))
        .route("/api/users/update-password/{login}", put(users::update_password_handler))
        .route("/api/users/update-login/{login}", put(users::update_login_handler))
        .route("/api/users/restore/{login}", put(users::restore_user_handler))

        .fallback(fallback::fallback_handler)

        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::Config;
    use axum::body::Body;
    use axum::http::{Method, Request, StatusCode};
    use http_body_util::BodyExt;
    use serde_json::{json, Value};
    use tower::ServiceExt;

    fn app() -> Router {
        let config = Config::from_toml("[server]\nport = 8080\n[logging]\n").unwrap();
        build_router(Arc::new(AppState::new(config)))
    }

    async fn send(
        app: &Router,
        method: Method,
        uri: &str,
        credentials: (&str, &str),
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let builder = Request::builder()
            .method(method)
            .uri(uri)
            .header("login", credentials.0)
            .header("password", credentials.1);

        let request = match body {
            Some(body) => builder
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, value)
    }

    const ADMIN: (&str, &str) = ("admin", "adminPassword");

    #[tokio::test]
    async fn test_create_delete_restore_scenario() {
        let app = app();
        let bob = json!({"login": "bob", "password": "pw", "name": "Bob"});

        let (status, body) = send(&app, Method::POST, "/api/users", ADMIN, Some(bob.clone())).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["createdBy"], "admin");

        let (status, _) = send(&app, Method::POST, "/api/users", ADMIN, Some(bob)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, _) = send(&app, Method::DELETE, "/api/users/bob", ADMIN, Some(json!(true))).await;
        assert_eq!(status, StatusCode::OK);

        let (status, body) = send(&app, Method::GET, "/api/users/bob", ADMIN, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["isActive"], false);
        assert_eq!(body["name"], "Bob");

        let (status, body) = send(&app, Method::PUT, "/api/users/restore/bob", ADMIN, None).await;
        assert_eq!(status, StatusCode::OK);
        assert!(body["revokedOn"].is_null());

        let (status, body) = send(&app, Method::GET, "/api/users/bob", ADMIN, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["isActive"], true);
    }

    #[tokio::test]
    async fn test_static_routes_not_shadowed_by_login() {
        let app = app();

        let (status, body) = send(&app, Method::GET, "/api/users/self", ADMIN, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["name"], "user_1 (admin)");
        assert_eq!(body["isActive"], true);

        let (status, body) = send(&app, Method::GET, "/api/users/active-users", ADMIN, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body.as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_self_service_updates() {
        let app = app();
        let bob = json!({"login": "bob", "password": "pw", "name": "Bob", "gender": 1, "birthday": "1990-02-03"});
        send(&app, Method::POST, "/api/users", ADMIN, Some(bob)).await;

        let info = json!({"name": "Robert", "gender": 1, "birthday": "1991-02-03"});
        let (status, body) =
            send(&app, Method::PUT, "/api/users/update-info/bob", ("bob", "pw"), Some(info)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["name"], "Robert");
        assert_eq!(body["modifiedBy"], "bob");

        let (status, _) = send(
            &app,
            Method::PUT,
            "/api/users/update-password/bob",
            ("bob", "pw"),
            Some(json!("secret")),
        )
        .await;
        assert_eq!(status, StatusCode::OK);

        let (status, _) = send(&app, Method::GET, "/api/users/self", ("bob", "pw"), None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        let (status, body) = send(
            &app,
            Method::PUT,
            "/api/users/update-login/bob",
            ("bob", "secret"),
            Some(json!("robert")),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["login"], "robert");

        let (status, _) = send(
            &app,
            Method::PUT,
            "/api/users/update-login/admin",
            ("robert", "secret"),
            Some(json!("root")),
        )
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_older_than_filter() {
        let app = app();
        let old = json!({"login": "old", "password": "pw", "birthday": "1950-01-01"});
        let none = json!({"login": "none", "password": "pw"});
        send(&app, Method::POST, "/api/users", ADMIN, Some(old)).await;
        send(&app, Method::POST, "/api/users", ADMIN, Some(none)).await;

        let (status, body) = send(&app, Method::GET, "/api/users/older-than/18", ADMIN, None).await;
        assert_eq!(status, StatusCode::OK);
        let logins: Vec<&str> = body
            .as_array()
            .unwrap()
            .iter()
            .map(|u| u["login"].as_str().unwrap())
            .collect();
        assert_eq!(logins, vec!["old"]);

        let (status, _) =
            send(&app, Method::GET, "/api/users/older-than/18", ("old", "pw"), None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_hard_delete_then_lookup_not_found() {
        let app = app();
        send(&app, Method::POST, "/api/users", ADMIN, Some(json!({"login": "tmp", "password": "pw"}))).await;

        let (status, _) = send(&app, Method::DELETE, "/api/users/tmp", ADMIN, Some(json!(false))).await;
        assert_eq!(status, StatusCode::OK);

        let (status, _) = send(&app, Method::GET, "/api/users/tmp", ADMIN, None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_request_prefixed_headers_accepted() {
        let app = app();
        let request = Request::builder()
            .method(Method::GET)
            .uri("/api/users/admin")
            .header("requestLogin", "admin")
            .header("requestPassword", "adminPassword")
            .body(Body::empty())
            .unwrap();

        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_missing_headers_do_not_authenticate_empty_account() {
        let app = app();
        let ghost = json!({"login": "", "password": "", "name": "Ghost"});
        let (status, _) = send(&app, Method::POST, "/api/users", ADMIN, Some(ghost)).await;
        assert_eq!(status, StatusCode::OK);

        let request = Request::builder()
            .method(Method::GET)
            .uri("/api/users/self")
            .body(Body::empty())
            .unwrap();
        let response = app.clone().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        let request = Request::builder()
            .method(Method::GET)
            .uri("/api/users/active-users")
            .body(Body::empty())
            .unwrap();
        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_unknown_route() {
        let app = app();
        let (status, body) = send(&app, Method::GET, "/nothing/here", ADMIN, None).await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["success"], false);
    }
}
