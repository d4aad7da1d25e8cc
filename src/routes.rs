// src/routes.rs

use axum::{
    Router,
    http::{HeaderValue, Method, header},
    middleware,
    routing::{delete, get, post, put},
};
use tower::ServiceBuilder;
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    trace::TraceLayer,
};

use crate::{
    handlers::{admin, auth, course, enrollment, pages, profile, quiz},
    state::AppState,
    utils::jwt::{admin_middleware, auth_middleware},
};

/// Assembles the main application router.
///
/// * Public routes: login, signup and the static pages.
/// * Session routes: everything behind `auth_middleware`.
/// * Admin routes: additionally behind `admin_middleware`.
pub fn create_router(state: AppState) -> Router {
    let origins: Vec<HeaderValue> = state
        .config
        .cors_origins
        .iter()
        .filter_map(|origin| origin.parse().ok())
        .collect();

    let cors = CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE]);

    let public_routes = Router::new()
        .route("/", post(auth::login))
        .route("/login/", post(auth::login))
        .route("/signup/", post(auth::signup))
        .route("/about/", get(pages::about))
        .route("/contact/", get(pages::contact));

    let session_routes = Router::new()
        .route("/logout/", post(auth::logout))
        .route(
            "/courses/",
            get(course::list_courses).post(course::create_course),
        )
        .route(
            "/courses/{course_id}/",
            get(course::get_course).delete(course::delete_course),
        )
        .route("/courses/{course_id}/contents/", post(course::add_content))
        .route(
            "/courses/{course_id}/contents/{content_id}/complete/",
            post(enrollment::complete_content),
        )
        .route("/courses/{course_id}/questions/", post(quiz::add_question))
        .route("/courses/{course_id}/quiz/", get(quiz::list_questions))
        .route(
            "/courses/{course_id}/quiz/results/",
            get(quiz::quiz_results),
        )
        .route(
            "/courses/{course_id}/quiz/{question_id}/attempt/",
            post(quiz::submit_attempt),
        )
        .route("/courses/enroll/{course_id}/", post(enrollment::enroll_course))
        .route("/my-courses/", get(enrollment::my_courses))
        .route("/profile/", get(profile::get_profile))
        .route(
            "/profile/edit/",
            post(profile::edit_profile).put(profile::edit_profile),
        )
        .route("/profile/details/", put(profile::update_role_details))
        .route(
            "/profile/security-questions/",
            get(profile::list_security_questions).post(profile::add_security_question),
        )
        .route("/add-achievement/", post(profile::add_achievement))
        .layer(middleware::from_fn_with_state(state.clone(), auth_middleware));

    // Auth runs first (outermost), then the staff-admin check.
    let admin_routes = Router::new()
        .route("/admin/users/", get(admin::list_users))
        .route("/admin/users/{id}/", delete(admin::delete_user))
        .layer(
            ServiceBuilder::new()
                .layer(middleware::from_fn_with_state(state.clone(), auth_middleware))
                .layer(middleware::from_fn(admin_middleware)),
        );

    Router::new()
        .merge(public_routes)
        .merge(session_routes)
        .merge(admin_routes)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors),
        )
        .with_state(state)
}
