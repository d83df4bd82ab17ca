// src/routes.rs

use axum::{
    Router,
    extract::Request,
    http::Method,
    middleware::{self, Next},
    routing::{delete, get, post, put},
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::{
    handlers::{
        accounts, achievements, auth, exams, exercises, forum, lessons, logs, people, profile,
        reports,
    },
    models::account::Capability,
    state::AppState,
    utils::jwt::{auth_middleware, require},
};

/// Restricts every route of `router` to roles granting `capability`.
fn gated(capability: Capability, router: Router<AppState>) -> Router<AppState> {
    router.route_layer(middleware::from_fn(move |req: Request, next: Next| {
        require(capability, req, next)
    }))
}

/// Assembles the main application router.
///
/// * Login is the only public route; everything else sits behind `auth_middleware`.
/// * Staff-only routes are additionally gated by capability.
/// * Applies global middleware (Trace, CORS).
pub fn create_router(state: AppState) -> Router {
    let origins = [
        "http://localhost:3000".parse().unwrap(),
        "http://127.0.0.1:3000".parse().unwrap(),
    ];

    let cors = CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([
            axum::http::header::AUTHORIZATION,
            axum::http::header::CONTENT_TYPE,
        ]);

    let auth_routes = Router::new().route("/login", post(auth::login));

    let me_routes = Router::new()
        .route("/", get(profile::get_me).put(profile::update_me))
        .route("/results", get(profile::list_my_results));

    let people_routes = gated(
        Capability::ManagePeople,
        Router::new()
            .route("/", get(people::list_people).post(people::create_person))
            .route(
                "/{id}",
                put(people::update_person).delete(people::delete_person),
            ),
    );

    let account_routes = gated(
        Capability::ManageAccounts,
        Router::new()
            .route("/", get(accounts::list_accounts).post(accounts::create_account))
            .route(
                "/{id}",
                put(accounts::update_account).delete(accounts::delete_account),
            ),
    );

    let lesson_routes = Router::new()
        .route("/", get(lessons::list_lessons))
        .route("/{id}", get(lessons::get_lesson))
        .merge(gated(
            Capability::ManageContent,
            Router::new()
                .route("/", post(lessons::create_lesson))
                .route(
                    "/{id}",
                    put(lessons::update_lesson).delete(lessons::delete_lesson),
                ),
        ));

    let exercise_routes = Router::new()
        .route("/", get(exercises::list_exercises))
        .route("/{id}/check", post(exercises::check_exercise))
        .merge(gated(
            Capability::ManageContent,
            Router::new()
                .route("/", post(exercises::create_exercise))
                .route("/{id}", delete(exercises::delete_exercise)),
        ));

    let exam_routes = Router::new()
        .route("/", get(exams::list_exams))
        .route("/{id}/start", get(exams::start_exam))
        .route("/{id}/submit", post(exams::submit_exam))
        .merge(gated(
            Capability::ManageContent,
            Router::new()
                .route("/", post(exams::create_exam))
                .route("/{id}", get(exams::get_exam).delete(exams::delete_exam)),
        ));

    let report_routes = gated(
        Capability::ViewReports,
        Router::new()
            .route("/dashboard", get(reports::dashboard))
            .route("/summary", get(reports::summary))
            .route("/study-hours", get(reports::study_hours))
            .route("/low-performers", get(reports::low_performers))
            .route(
                "/exams/{id}/critical-questions",
                get(reports::critical_questions),
            ),
    );

    let achievement_routes = Router::new()
        .route("/", get(achievements::list_catalog))
        .merge(gated(
            Capability::ManageAccounts,
            Router::new().route("/", post(achievements::create_achievement)),
        ));

    let forum_routes = Router::new()
        .route("/posts", get(forum::list_posts).post(forum::create_post))
        .route("/posts/{id}", get(forum::get_post).delete(forum::delete_post))
        .route("/posts/{id}/replies", post(forum::create_reply));

    let admin_routes = gated(
        Capability::ViewLogs,
        Router::new().route("/logs", get(logs::view_logs)),
    );

    let protected = Router::new()
        .nest("/api/me", me_routes)
        .nest("/api/people", people_routes)
        .nest("/api/accounts", account_routes)
        .nest("/api/lessons", lesson_routes)
        .nest("/api/exercises", exercise_routes)
        .nest("/api/exams", exam_routes)
        .nest("/api/reports", report_routes)
        .nest("/api/achievements", achievement_routes)
        .nest("/api/forum", forum_routes)
        .nest("/api/admin", admin_routes)
        // Auth runs before any capability gate
        .route_layer(middleware::from_fn_with_state(state.clone(), auth_middleware));

    Router::new()
        .nest("/api/auth", auth_routes)
        .merge(protected)
        // Global Middleware (applied from outside in)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use std::{path::PathBuf, sync::Arc};

    use axum::{
        body::Body,
        http::{Request, StatusCode, header},
    };
    use tower::ServiceExt;

    use super::*;
    use crate::{
        config::Config,
        models::account::{Account, Role},
        store::RecordStore,
        utils::jwt::sign_jwt,
    };

    const SECRET: &str = "router-test-secret";

    fn app(dir: &tempfile::TempDir) -> Router {
        let config = Config {
            data_dir: dir.path().to_path_buf(),
            log_dir: PathBuf::from("does-not-exist"),
            jwt_secret: SECRET.to_string(),
            jwt_expiration: 60,
            rust_log: "error".to_string(),
            port: 0,
            admin_username: None,
            admin_password: None,
        };
        create_router(AppState {
            store: Arc::new(RecordStore::open(dir.path()).unwrap()),
            config,
        })
    }

    fn token(role: Role) -> String {
        let account = Account {
            id: format!("acc-{}", role.as_str()),
            username: role.as_str().to_string(),
            password_hash: String::new(),
            role,
            person_id: None,
        };
        sign_jwt(&account, SECRET, 60).unwrap()
    }

    async fn status(app: Router, uri: &str, token: Option<String>) -> StatusCode {
        let mut req = Request::builder().uri(uri);
        if let Some(token) = token {
            req = req.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        app.oneshot(req.body(Body::empty()).unwrap())
            .await
            .unwrap()
            .status()
    }

    #[tokio::test]
    async fn test_missing_token_is_unauthorized() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(status(app(&dir), "/api/lessons", None).await, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_capabilities_gate_routes() {
        let dir = tempfile::tempdir().unwrap();

        let cases = [
            (Role::Student, "/api/lessons", StatusCode::OK),
            (Role::Student, "/api/reports/dashboard", StatusCode::FORBIDDEN),
            (Role::Student, "/api/people", StatusCode::FORBIDDEN),
            (Role::Teacher, "/api/reports/dashboard", StatusCode::OK),
            (Role::Teacher, "/api/accounts", StatusCode::FORBIDDEN),
            (Role::Teacher, "/api/admin/logs", StatusCode::FORBIDDEN),
            (Role::Admin, "/api/accounts", StatusCode::OK),
            (Role::Admin, "/api/admin/logs", StatusCode::OK),
        ];

        for (role, uri, expected) in cases {
            assert_eq!(
                status(app(&dir), uri, Some(token(role))).await,
                expected,
                "{:?} {}",
                role,
                uri
            );
        }
    }
}
