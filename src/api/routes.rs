use axum::{
    middleware,
    routing::{get, put},
    Router,
};
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::middleware::request_id::{make_span_with_request_id, request_id_middleware};

use super::handlers::{self, directors, events, films, lookups, reviews, users};
use super::AppState;

/// Creates the main API router with all routes
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health_check))
        // Users and the social graph
        .route(
            "/users",
            get(users::list_users)
                .post(users::create_user)
                .put(users::update_user),
        )
        .route("/users/:id", get(users::get_user).delete(users::delete_user))
        .route("/users/:id/friends", get(users::friends))
        .route(
            "/users/:id/friends/:friend_id",
            put(users::add_friend).delete(users::remove_friend),
        )
        .route(
            "/users/:id/friends/common/:other_id",
            get(users::mutual_friends),
        )
        .route("/users/:id/recommendations", get(users::recommendations))
        .route("/users/:id/feed", get(users::feed))
        // Films
        .route(
            "/films",
            get(films::list_films)
                .post(films::create_film)
                .put(films::update_film),
        )
        .route("/films/popular", get(films::popular))
        .route("/films/common", get(films::common))
        .route("/films/search", get(films::search))
        .route("/films/director/:director_id", get(films::by_director))
        .route("/films/:id", get(films::get_film).delete(films::delete_film))
        .route(
            "/films/:id/like/:user_id",
            put(films::add_like).delete(films::remove_like),
        )
        // Directors
        .route(
            "/directors",
            get(directors::list_directors)
                .post(directors::create_director)
                .put(directors::update_director),
        )
        .route(
            "/directors/:id",
            get(directors::get_director).delete(directors::delete_director),
        )
        // Lookups
        .route("/genres", get(lookups::list_genres))
        .route("/genres/:id", get(lookups::get_genre))
        .route("/mpa", get(lookups::list_mpa))
        .route("/mpa/:id", get(lookups::get_mpa))
        // Reviews
        .route(
            "/reviews",
            get(reviews::list_reviews)
                .post(reviews::create_review)
                .put(reviews::update_review),
        )
        .route(
            "/reviews/:id",
            get(reviews::get_review).delete(reviews::delete_review),
        )
        .route(
            "/reviews/:id/like/:user_id",
            put(reviews::add_like).delete(reviews::remove_like),
        )
        .route(
            "/reviews/:id/dislike/:user_id",
            put(reviews::add_dislike).delete(reviews::remove_dislike),
        )
        .route("/reviews/:id/usefulness", get(reviews::usefulness))
        .route(
            "/reviews/:id/usefulness/recompute",
            get(reviews::recompute_usefulness),
        )
        // Administration
        .route("/admin/events", get(events::all_events))
        .with_state(state)
        .layer(
            ServiceBuilder::new()
                .layer(middleware::from_fn(request_id_middleware))
                .layer(TraceLayer::new_for_http().make_span_with(make_span_with_request_id))
                .layer(CorsLayer::permissive()),
        )
}
