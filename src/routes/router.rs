use std::time::Duration;

use axum::error_handling::HandleErrorLayer;
use axum::http::{HeaderName, Method, StatusCode};
use axum::{
    Router,
    extract::{MatchedPath, Request},
    middleware,
    response::IntoResponse,
    routing::{get, patch, post},
};
use tower::ServiceBuilder;
use tower_http::{
    cors::{self, CorsLayer},
    normalize_path::NormalizePath,
    trace::TraceLayer,
};
use tracing::info_span;

use crate::core::error::{self, Error};
use crate::core::state::AppState;
use crate::routes::admin::{customers, dashboard, engagement, reports, transactions};
use crate::routes::{admin, auth, calls, payments, wallet, webhook};
use crate::types::response::ApiResponse;
use crate::utils;
use crate::utils::auth::{ADMIN_SESSION_HEADER, ADMIN_TOKEN_HEADER};

/// Prefix under which every function is also reachable.
pub(crate) const FUNCTIONS_PREFIX: &str = "/functions/v1";

async fn not_found() -> Error {
    Error::not_found("Not found")
}

async fn method_not_allowed() -> impl IntoResponse {
    (
        StatusCode::METHOD_NOT_ALLOWED,
        ApiResponse::failure("Method not allowed".to_owned(), None),
    )
}

fn functions(state: &AppState) -> Router<AppState> {
    let user_routes = Router::new()
        .route("/auth-logout", post(auth::logout))
        .route("/auth-user", get(auth::current_user))
        .route("/auth-change-password", post(auth::change_password))
        .route(
            "/auth-delete-account",
            post(auth::delete_account).delete(auth::delete_account),
        )
        .route(
            "/generate-funding-account",
            post(wallet::generate_funding_account),
        )
        .route(
            "/check-customers",
            get(wallet::check_customers).post(wallet::check_customers),
        )
        .route("/validate-customer", post(wallet::validate_customer))
        .route("/purchase-airtime", post(payments::purchase_airtime))
        .route("/bill-payment", post(payments::bill_payment))
        .route("/generate-zego-token", post(calls::generate_zego_token))
        .route("/initiate-call", post(calls::initiate_call))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            utils::auth::authorize,
        ));

    Router::new()
        .route("/auth-register", post(auth::register))
        .route("/auth-login", post(auth::login))
        .route("/auth-forgot-password", post(auth::forgot_password))
        .route("/webhook-paystack", post(webhook::paystack))
        .route("/admin-login", post(admin::login))
        .merge(user_routes)
        .nest(
            "/admin-customers",
            admin_function(
                state,
                Router::new()
                    .route("/", get(customers::list))
                    .route("/list", get(customers::list))
                    .route("/filters", get(customers::filters))
                    .route("/{id}", get(customers::detail))
                    .route("/{id}/status", patch(customers::update_status)),
            ),
        )
        .nest(
            "/admin-dashboard",
            admin_function(
                state,
                Router::new()
                    .route("/", get(dashboard::overview))
                    .route("/overview", get(dashboard::overview))
                    .route("/recent-activity", get(dashboard::recent_activity)),
            ),
        )
        .nest(
            "/admin-engagement",
            admin_function(
                state,
                Router::new()
                    .route("/overview", get(engagement::overview))
                    .route("/summary", get(engagement::overview))
                    .route("/services", get(engagement::services)),
            ),
        )
        .nest(
            "/admin-reports",
            admin_function(
                state,
                Router::new()
                    .route("/filters", get(reports::filters))
                    .route("/overview", get(reports::overview))
                    .route("/summary", get(reports::overview))
                    .route("/export", get(reports::export)),
            ),
        )
        .nest(
            "/admin-transactions",
            admin_function(
                state,
                Router::new()
                    .route("/", get(transactions::list))
                    .route("/list", get(transactions::list))
                    .route("/filters", get(transactions::filters)),
            ),
        )
        // nested fallbacks are only carried into the prefixed mount when
        // this router has its own
        .fallback(not_found)
}

/// Admin function behind the session check, unknown sub-routes included.
fn admin_function(state: &AppState, routes: Router<AppState>) -> Router<AppState> {
    routes
        .fallback(not_found)
        .layer(middleware::from_fn_with_state(
            state.clone(),
            utils::auth::authorize_admin,
        ))
}

/// Every function, with trailing slashes trimmed before routing.
pub(crate) fn routes(state: AppState, rate_limit_per_second: u64) -> NormalizePath<Router> {
    let functions = functions(&state);

    let router = Router::new()
        .nest(FUNCTIONS_PREFIX, functions.clone())
        .merge(functions)
        .fallback(not_found)
        .method_not_allowed_fallback(method_not_allowed)
        .with_state(state)
        .layer(
            ServiceBuilder::new()
                .layer(
                    TraceLayer::new_for_http().make_span_with(|request: &Request<_>| {
                        let matched_path = request
                            .extensions()
                            .get::<MatchedPath>()
                            .map(MatchedPath::as_str);

                        info_span!(
                            "request",
                            method = ?request.method(),
                            matched_path,
                        )
                    }),
                )
                .layer(HandleErrorLayer::new(error::handle_middleware_errors))
                .buffer(128)
                .rate_limit(rate_limit_per_second, Duration::from_secs(1))
                .layer(cors()),
        );

    NormalizePath::trim_trailing_slash(router)
}

fn cors() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(cors::Any)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([
            HeaderName::from_static("authorization"),
            HeaderName::from_static("x-client-info"),
            HeaderName::from_static("apikey"),
            HeaderName::from_static("content-type"),
            HeaderName::from_static(ADMIN_SESSION_HEADER),
            HeaderName::from_static(ADMIN_TOKEN_HEADER),
        ])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::state::test_state;
    use axum::body::{Body, to_bytes};
    use axum::http::header;
    use serde_json::Value;
    use tower::ServiceExt;

    fn app() -> NormalizePath<Router> {
        routes(test_state(), 100)
    }

    async fn send(request: Request<Body>) -> (StatusCode, Value) {
        let response = app().oneshot(request).await.unwrap();
        let status = response.status();
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();

        (status, serde_json::from_slice(&body).unwrap_or(Value::Null))
    }

    #[tokio::test]
    async fn unknown_routes_are_not_found() {
        let (status, body) = send(
            Request::get("/functions/v1/nothing-here")
                .body(Body::empty())
                .unwrap(),
        )
        .await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["success"], false);
        assert_eq!(body["message"], "Not found");
    }

    #[tokio::test]
    async fn user_routes_require_a_bearer_token() {
        for path in ["/auth-user", "/functions/v1/auth-user"] {
            let (status, body) = send(Request::get(path).body(Body::empty()).unwrap()).await;

            assert_eq!(status, StatusCode::UNAUTHORIZED);
            assert_eq!(body["message"], "Authorization token required");
        }
    }

    #[tokio::test]
    async fn admin_routes_require_a_session_header() {
        let (status, body) = send(
            Request::get("/admin-customers/filters")
                .header(header::AUTHORIZATION, "Bearer user-token")
                .body(Body::empty())
                .unwrap(),
        )
        .await;

        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["message"], "Admin session token required");
    }

    #[tokio::test]
    async fn webhooks_with_bad_signatures_are_rejected() {
        let (status, body) = send(
            Request::post("/functions/v1/webhook-paystack")
                .header("x-paystack-signature", "00")
                .body(Body::from(r#"{"event":"charge.success","data":{}}"#))
                .unwrap(),
        )
        .await;

        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["message"], "Invalid webhook signature");
    }

    #[tokio::test]
    async fn wrong_methods_are_rejected() {
        let (status, body) = send(Request::get("/auth-login").body(Body::empty()).unwrap()).await;

        assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(body["success"], false);
    }

    #[tokio::test]
    async fn preflight_is_answered_for_any_origin() {
        let response = app()
            .oneshot(
                Request::options("/bill-payment")
                    .header(header::ORIGIN, "https://app.example.com")
                    .header(header::ACCESS_CONTROL_REQUEST_METHOD, "POST")
                    .header(header::ACCESS_CONTROL_REQUEST_HEADERS, "authorization")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN],
            "*"
        );
    }

    #[tokio::test]
    async fn trailing_slashes_reach_the_function() {
        for path in [
            "/functions/v1/admin-dashboard/",
            "/admin-customers/",
            "/functions/v1/admin-transactions/list/",
        ] {
            let (status, body) = send(Request::get(path).body(Body::empty()).unwrap()).await;

            assert_eq!(status, StatusCode::UNAUTHORIZED, "{path}");
            assert_eq!(body["message"], "Admin session token required");
        }

        let (status, body) = send(Request::get("/auth-user/").body(Body::empty()).unwrap()).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["message"], "Authorization token required");
    }

    #[tokio::test]
    async fn unknown_admin_sub_routes_need_a_session_first() {
        for path in [
            "/admin-dashboard/nope",
            "/functions/v1/admin-dashboard/nope",
            "/functions/v1/admin-reports",
            "/admin-customers/a/b/c",
        ] {
            let (status, body) = send(Request::get(path).body(Body::empty()).unwrap()).await;

            assert_eq!(status, StatusCode::UNAUTHORIZED, "{path}");
            assert_eq!(body["message"], "Admin session token required");
        }
    }

    #[tokio::test]
    async fn report_filters_are_behind_admin_sessions() {
        let (status, _) = send(
            Request::get("/admin-reports/filters")
                .body(Body::empty())
                .unwrap(),
        )
        .await;

        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }
}
