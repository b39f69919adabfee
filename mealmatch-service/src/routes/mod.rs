pub mod health;
pub mod join_requests;
pub mod locations;
pub mod meals;
pub mod profiles;
pub mod social;

use std::sync::Arc;

use axum::routing::{get, patch, post};
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use mealmatch_shared::middleware::metrics_middleware;

use crate::AppState;

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        // Health
        .route("/health", get(health::health_check))
        .route("/metrics", get(health::metrics))
        // Locations
        .route(
            "/locations",
            get(locations::list_locations).post(locations::create_location),
        )
        // Profiles
        .route(
            "/profile",
            get(profiles::get_my_profile)
                .post(profiles::create_profile)
                .patch(profiles::update_profile),
        )
        .route("/profiles/:id", get(profiles::get_profile))
        // Meals
        .route("/meals", get(meals::list_meals).post(meals::create_meal))
        .route("/meals/search", get(meals::list_meals))
        .route(
            "/meals/:id",
            get(meals::get_meal)
                .patch(meals::update_meal)
                .delete(meals::delete_meal),
        )
        .route("/meals/:id/calendar", get(meals::download_calendar))
        .route("/meals/:id/join", post(join_requests::request_to_join))
        .route("/meals/:id/messages", post(social::post_message))
        // Join requests
        .route(
            "/join-requests/:id",
            patch(join_requests::edit_request).delete(join_requests::cancel_request),
        )
        .route("/join-requests/:id/accept", post(join_requests::accept_request))
        .route("/join-requests/:id/decline", post(join_requests::decline_request))
        .route("/join-requests/:id/waitlist", post(join_requests::waitlist_request))
        // Dashboard
        .route("/dashboard/hosted", get(meals::hosted_meals))
        .route("/dashboard/joined", get(meals::joined_meals))
        // Matching and reviews
        .route("/matches", get(social::find_matches))
        .route("/reviews", post(social::create_review))
        .layer(axum::middleware::from_fn(metrics_middleware))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
