//! API router.
//!
//! Everything lives under `/api`. Registration and login are the only
//! unauthenticated routes; the rest sit behind the bearer-token
//! middleware. CORS is the outermost layer.

use axum::routing::{get, post, put};
use axum::Router;
use tower_http::cors::CorsLayer;

use crate::api::endpoints;
use crate::api::middleware;
use crate::api::types::ApiContext;

pub fn api_router(ctx: ApiContext) -> Router {
    // NOTE: Path params use `:param` syntax (matchit 0.7 / axum 0.7).
    let protected = Router::new()
        .route("/health", get(endpoints::health::check))
        .route("/auth/logout", post(endpoints::auth::logout))
        .route("/auth/me", get(endpoints::auth::me))
        .route("/profiles", get(endpoints::profiles::list))
        .route(
            "/profiles/:id",
            get(endpoints::profiles::get)
                .put(endpoints::profiles::update)
                .delete(endpoints::profiles::delete),
        )
        .route(
            "/insurances",
            get(endpoints::insurances::list).post(endpoints::insurances::create),
        )
        .route(
            "/insurances/:id",
            get(endpoints::insurances::get)
                .put(endpoints::insurances::update)
                .delete(endpoints::insurances::delete),
        )
        .route(
            "/hospitals",
            get(endpoints::hospitals::list).post(endpoints::hospitals::create),
        )
        .route(
            "/hospitals/:id",
            get(endpoints::hospitals::get)
                .put(endpoints::hospitals::update)
                .delete(endpoints::hospitals::delete),
        )
        .route(
            "/departments",
            get(endpoints::departments::list).post(endpoints::departments::create),
        )
        .route(
            "/departments/:id",
            get(endpoints::departments::get)
                .put(endpoints::departments::update)
                .delete(endpoints::departments::delete),
        )
        .route(
            "/hospital-departments",
            get(endpoints::hospital_departments::list)
                .post(endpoints::hospital_departments::create),
        )
        .route(
            "/hospital-departments/:id",
            put(endpoints::hospital_departments::update)
                .delete(endpoints::hospital_departments::delete),
        )
        .route(
            "/doctors",
            get(endpoints::doctors::list).post(endpoints::doctors::create),
        )
        .route(
            "/doctors/:id",
            get(endpoints::doctors::get)
                .put(endpoints::doctors::update)
                .delete(endpoints::doctors::delete),
        )
        .route(
            "/nurses",
            get(endpoints::nurses::list).post(endpoints::nurses::create),
        )
        .route(
            "/nurses/:id",
            get(endpoints::nurses::get)
                .put(endpoints::nurses::update)
                .delete(endpoints::nurses::delete),
        )
        .route(
            "/pharmacies",
            get(endpoints::pharmacies::list).post(endpoints::pharmacies::create),
        )
        .route(
            "/pharmacies/:id",
            get(endpoints::pharmacies::get)
                .put(endpoints::pharmacies::update)
                .delete(endpoints::pharmacies::delete),
        )
        .route(
            "/medications",
            get(endpoints::medications::list).post(endpoints::medications::create),
        )
        .route(
            "/medications/:id",
            get(endpoints::medications::get)
                .put(endpoints::medications::update)
                .delete(endpoints::medications::delete),
        )
        .route(
            "/appointments",
            get(endpoints::appointments::list).post(endpoints::appointments::create),
        )
        .route("/appointments/slots", get(endpoints::appointments::slots))
        .route("/appointments/:id", get(endpoints::appointments::get))
        .route(
            "/appointments/:id/decision",
            put(endpoints::appointments::decide),
        )
        .route(
            "/appointments/:id/cancel",
            put(endpoints::appointments::cancel),
        )
        .route(
            "/consultations",
            get(endpoints::consultations::list).post(endpoints::consultations::create),
        )
        .route("/consultations/:id", get(endpoints::consultations::get))
        .route(
            "/lab-tests/templates",
            get(endpoints::lab_tests::list_templates).post(endpoints::lab_tests::create_template),
        )
        .route(
            "/lab-tests/templates/:id",
            get(endpoints::lab_tests::get_template)
                .put(endpoints::lab_tests::update_template)
                .delete(endpoints::lab_tests::delete_template),
        )
        .route(
            "/lab-tests/requests",
            get(endpoints::lab_tests::list_requests).post(endpoints::lab_tests::create_request),
        )
        .route(
            "/lab-tests/requests/:id",
            get(endpoints::lab_tests::get_request),
        )
        .route(
            "/lab-tests/requests/:id/status",
            put(endpoints::lab_tests::update_request_status),
        )
        .route(
            "/lab-tests/results",
            post(endpoints::lab_tests::create_result),
        )
        .route(
            "/lab-tests/results/:id",
            get(endpoints::lab_tests::get_result),
        )
        .route(
            "/prescriptions",
            get(endpoints::prescriptions::list).post(endpoints::prescriptions::create),
        )
        .route(
            "/prescriptions/:id",
            get(endpoints::prescriptions::get).put(endpoints::prescriptions::update),
        )
        .route(
            "/pharmacy-requests",
            get(endpoints::pharmacy_requests::list),
        )
        .route(
            "/pharmacy-requests/:id",
            get(endpoints::pharmacy_requests::get),
        )
        .route(
            "/pharmacy-requests/:id/decision",
            put(endpoints::pharmacy_requests::decide),
        )
        .route(
            "/payments",
            get(endpoints::payments::list).post(endpoints::payments::create),
        )
        .route("/payments/:id", get(endpoints::payments::get))
        .route("/notifications", get(endpoints::notifications::list))
        .route(
            "/notifications/unread-count",
            get(endpoints::notifications::unread_count),
        )
        .route(
            "/notifications/read-all",
            put(endpoints::notifications::mark_all_read),
        )
        .route(
            "/notifications/:id/read",
            put(endpoints::notifications::mark_read),
        )
        .route(
            "/vitals",
            get(endpoints::vitals::list).post(endpoints::vitals::create),
        )
        .route("/vitals/:id", get(endpoints::vitals::get))
        .with_state(ctx.clone())
        .layer(axum::middleware::from_fn(middleware::auth::require_auth))
        .layer(axum::Extension(ctx.clone()));

    let unprotected = Router::new()
        .route("/auth/register", post(endpoints::auth::register))
        .route("/auth/login", post(endpoints::auth::login))
        .with_state(ctx);

    Router::new()
        .nest("/api", protected)
        .nest("/api", unprotected)
        .layer(CorsLayer::permissive())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use tower::ServiceExt;

    use crate::db::open_memory_database;

    fn test_app() -> Router {
        let conn = open_memory_database().unwrap();
        api_router(ApiContext::new(conn))
    }

    fn json_request(method: &str, uri: &str, token: Option<&str>, body: &str) -> Request<Body> {
        let mut builder = Request::builder()
            .method(method)
            .uri(uri)
            .header("Content-Type", "application/json");
        if let Some(t) = token {
            builder = builder.header("Authorization", format!("Bearer {t}"));
        }
        builder.body(Body::from(body.to_string())).unwrap()
    }

    async fn response_json(response: axum::http::Response<Body>) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), 65536).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn health_requires_auth() {
        let app = test_app();
        let req = Request::builder()
            .method("GET")
            .uri("/api/health")
            .body(Body::empty())
            .unwrap();
        let response = app.oneshot(req).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn register_then_login_round_trip() {
        let conn = open_memory_database().unwrap();
        let ctx = ApiContext::new(conn);

        let app = api_router(ctx.clone());
        let req = json_request(
            "POST",
            "/api/auth/register",
            None,
            r#"{"email":"  Pat@Example.com ","password":"hunter2hunter2","full_name":"Pat Doe"}"#,
        );
        let response = app.oneshot(req).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let json = response_json(response).await;
        assert_eq!(json["profile"]["email"], "pat@example.com");
        assert_eq!(json["profile"]["role"], "patient");
        assert!(json["profile"]["password_hash"].is_null());
        let token = json["token"].as_str().unwrap().to_string();

        // Token works against a protected route.
        let app = api_router(ctx.clone());
        let req = json_request("GET", "/api/auth/me", Some(&token), "");
        let me = app.oneshot(req).await.unwrap();
        assert_eq!(me.status(), StatusCode::OK);

        // Login with the original (untrimmed, differently-cased) email.
        let app = api_router(ctx);
        let req = json_request(
            "POST",
            "/api/auth/login",
            None,
            r#"{"email":"PAT@example.COM","password":"hunter2hunter2"}"#,
        );
        let response = app.oneshot(req).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn duplicate_registration_is_rejected() {
        let conn = open_memory_database().unwrap();
        let ctx = ApiContext::new(conn);
        let body =
            r#"{"email":"dup@example.com","password":"hunter2hunter2","full_name":"Dup"}"#;

        let app = api_router(ctx.clone());
        let first = app
            .oneshot(json_request("POST", "/api/auth/register", None, body))
            .await
            .unwrap();
        assert_eq!(first.status(), StatusCode::OK);

        let app = api_router(ctx);
        let second = app
            .oneshot(json_request("POST", "/api/auth/register", None, body))
            .await
            .unwrap();
        assert_eq!(second.status(), StatusCode::BAD_REQUEST);
        let json = response_json(second).await;
        assert!(json["error"].as_str().unwrap().contains("already exists"));
    }

    #[tokio::test]
    async fn login_does_not_reveal_which_credential_failed() {
        let conn = open_memory_database().unwrap();
        let ctx = ApiContext::new(conn);

        let app = api_router(ctx.clone());
        app.oneshot(json_request(
            "POST",
            "/api/auth/register",
            None,
            r#"{"email":"who@example.com","password":"hunter2hunter2","full_name":"Who"}"#,
        ))
        .await
        .unwrap();

        let app = api_router(ctx.clone());
        let wrong_password = app
            .oneshot(json_request(
                "POST",
                "/api/auth/login",
                None,
                r#"{"email":"who@example.com","password":"wrong-password"}"#,
            ))
            .await
            .unwrap();

        let app = api_router(ctx);
        let unknown_user = app
            .oneshot(json_request(
                "POST",
                "/api/auth/login",
                None,
                r#"{"email":"nobody@example.com","password":"whatever123"}"#,
            ))
            .await
            .unwrap();

        assert_eq!(wrong_password.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(unknown_user.status(), StatusCode::UNAUTHORIZED);
        let a = response_json(wrong_password).await;
        let b = response_json(unknown_user).await;
        assert_eq!(a["error"], b["error"]);
    }

    #[tokio::test]
    async fn invalid_token_returns_401() {
        let app = test_app();
        let req = json_request("GET", "/api/health", Some("not-a-real-token"), "");
        let response = app.oneshot(req).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn admin_registration_is_rejected() {
        let app = test_app();
        let req = json_request(
            "POST",
            "/api/auth/register",
            None,
            r#"{"email":"boss@example.com","password":"hunter2hunter2","full_name":"Boss","role":"admin"}"#,
        );
        let response = app.oneshot(req).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn unknown_route_is_404() {
        let app = test_app();
        let req = json_request("GET", "/api/nonexistent", Some("token"), "");
        let response = app.oneshot(req).await.unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
