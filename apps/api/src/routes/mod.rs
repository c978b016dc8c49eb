pub mod health;

use axum::{routing::get, Router};

use crate::matching::handlers;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Matching API — descriptive
        .route("/api/v1/matching", get(handlers::handle_overview))
        .route(
            "/api/v1/matching/configuracion",
            get(handlers::handle_configuration),
        )
        .route("/api/v1/matching/estadisticas", get(handlers::handle_stats))
        // Matching API — professionals
        .route(
            "/api/v1/matching/ofertas-recomendadas",
            get(handlers::handle_recommended_postings),
        )
        .route(
            "/api/v1/matching/ofertas-recomendadas/alto-matching",
            get(handlers::handle_high_match_postings),
        )
        .route(
            "/api/v1/matching/ofertas-recomendadas/medio-matching",
            get(handlers::handle_medium_match_postings),
        )
        .route(
            "/api/v1/matching/ofertas-recomendadas/top-5",
            get(handlers::handle_top_postings),
        )
        // Matching API — companies
        .route(
            "/api/v1/matching/oferta/:oferta_id/candidatos-recomendados",
            get(handlers::handle_recommended_candidates),
        )
        .route(
            "/api/v1/matching/oferta/:oferta_id/candidatos-recomendados/alto-matching",
            get(handlers::handle_high_match_candidates),
        )
        .route(
            "/api/v1/matching/oferta/:oferta_id/candidatos-recomendados/top-10",
            get(handlers::handle_top_candidates),
        )
        // Matching API — point queries
        .route(
            "/api/v1/matching/profesional/:profesional_id/oferta/:oferta_id",
            get(handlers::handle_pair_match),
        )
        .route(
            "/api/v1/matching/calcular/:profesional_id/:oferta_id",
            get(handlers::handle_pair_match),
        )
        .route(
            "/api/v1/matching/test/:profesional_id/:oferta_id",
            get(handlers::handle_pair_debug),
        )
        .with_state(state)
}
