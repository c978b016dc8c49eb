//! Axum route handlers for the Matching API.

use axum::{
    extract::{Path, Query, State},
    Json,
};
use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use serde_json::{json, Value};

use crate::auth::AuthUser;
use crate::errors::AppError;
use crate::matching::recommend::{
    compatibility_for, recommend_candidates, recommend_postings, RankFilter,
    RecommendationParams, DEFAULT_CANDIDATE_MIN, DEFAULT_LIMIT, DEFAULT_POSTING_MIN,
};
use crate::matching::repository::MatchingStats;
use crate::matching::scoring::{CompatibilityReport, ScoreBreakdown, WEIGHTS};
use crate::models::posting::JobPostingRow;
use crate::models::user::UserRole;
use crate::state::AppState;

// ────────────────────────────────────────────────────────────────────────────
// Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct CompanyRef {
    pub id: i64,
    pub email: String,
}

#[derive(Debug, Serialize)]
pub struct PostingMatch {
    #[serde(flatten)]
    pub posting: JobPostingRow,
    #[serde(rename = "empresa")]
    pub company: CompanyRef,
    #[serde(rename = "porcentajeMatching")]
    pub percentage: u8,
    #[serde(rename = "detallesMatching")]
    pub breakdown: ScoreBreakdown,
}

#[derive(Debug, Serialize)]
pub struct PostingRecommendationsResponse {
    #[serde(rename = "mensaje")]
    pub message: String,
    pub total: usize,
    #[serde(rename = "totalEvaluadas")]
    pub evaluated: usize,
    #[serde(rename = "porcentajeMinimo")]
    pub min_percentage: u8,
    #[serde(rename = "ofertas")]
    pub postings: Vec<PostingMatch>,
}

#[derive(Debug, Serialize)]
pub struct CandidateMatch {
    pub id: i64,
    pub email: String,
    #[serde(rename = "tipoUsuario")]
    pub user_type: String,
    #[serde(rename = "fechaCreacion")]
    pub created_at: DateTime<Utc>,
    #[serde(rename = "porcentajeMatching")]
    pub percentage: u8,
    #[serde(rename = "detallesMatching")]
    pub breakdown: ScoreBreakdown,
}

#[derive(Debug, Serialize)]
pub struct PostingRef {
    pub id: i64,
    #[serde(rename = "titulo")]
    pub title: String,
}

#[derive(Debug, Serialize)]
pub struct CandidateRecommendationsResponse {
    #[serde(rename = "mensaje")]
    pub message: String,
    #[serde(rename = "oferta")]
    pub posting: PostingRef,
    pub total: usize,
    #[serde(rename = "totalEvaluados")]
    pub evaluated: usize,
    #[serde(rename = "porcentajeMinimo")]
    pub min_percentage: u8,
    #[serde(rename = "candidatos")]
    pub candidates: Vec<CandidateMatch>,
}

#[derive(Debug, Serialize)]
pub struct PairMatchResponse {
    #[serde(rename = "mensaje")]
    pub message: String,
    #[serde(rename = "profesionalId")]
    pub professional_id: i64,
    #[serde(rename = "ofertaId")]
    pub posting_id: i64,
    #[serde(rename = "resultado")]
    pub result: CompatibilityReport,
}

#[derive(Debug, Serialize)]
pub struct StatsResponse {
    #[serde(rename = "mensaje")]
    pub message: String,
    #[serde(rename = "sistema")]
    pub system: MatchingStats,
    /// Applications per active posting, two decimals.
    #[serde(rename = "tasaAplicacion")]
    pub application_rate: f64,
}

fn today() -> NaiveDate {
    Utc::now().date_naive()
}

// ────────────────────────────────────────────────────────────────────────────
// Descriptive endpoints
// ────────────────────────────────────────────────────────────────────────────

/// GET /api/v1/matching
///
/// Describes the algorithm and the endpoints available to the caller.
pub async fn handle_overview(user: AuthUser) -> Json<Value> {
    Json(json!({
        "mensaje": "Sistema de Matching TalentChain",
        "version": env!("CARGO_PKG_VERSION"),
        "usuario": {
            "id": user.id,
            "email": user.email,
            "tipo": user.role.as_str(),
        },
        "algoritmo": {
            "factores": [
                { "nombre": "Educación", "peso": WEIGHTS.education, "descripcion": "Nivel educativo vs requerido" },
                { "nombre": "Experiencia", "peso": WEIGHTS.experience, "descripcion": "Años de experiencia vs mínimo" },
                { "nombre": "Habilidades", "peso": WEIGHTS.skills, "descripcion": "Habilidades coincidentes" },
                { "nombre": "Ubicación", "peso": WEIGHTS.location, "descripcion": "Proximidad geográfica" },
            ],
            "rango": "0% - 100%",
        },
        "endpoints": {
            "profesionales": {
                "ofertas": "GET /api/v1/matching/ofertas-recomendadas",
                "calculo": "GET /api/v1/matching/profesional/:id/oferta/:id",
            },
            "empresas": {
                "candidatos": "GET /api/v1/matching/oferta/:id/candidatos-recomendados",
                "calculo": "GET /api/v1/matching/profesional/:id/oferta/:id",
            },
        },
    }))
}

/// GET /api/v1/matching/configuracion
pub async fn handle_configuration(_user: AuthUser) -> Json<Value> {
    Json(json!({
        "mensaje": "Configuración del algoritmo de matching",
        "version": env!("CARGO_PKG_VERSION"),
        "pesos": WEIGHTS,
        "parametros": {
            "matching_minimo_ofertas": DEFAULT_POSTING_MIN,
            "matching_minimo_candidatos": DEFAULT_CANDIDATE_MIN,
            "limite_recomendaciones_defecto": DEFAULT_LIMIT,
        },
        "filtros": {
            "solo_ofertas_activas": true,
            "solo_profesionales_activos": true,
        },
    }))
}

// ────────────────────────────────────────────────────────────────────────────
// Recommendations for professionals
// ────────────────────────────────────────────────────────────────────────────

async fn posting_recommendations(
    state: &AppState,
    user: &AuthUser,
    filter: RankFilter,
) -> Result<Json<PostingRecommendationsResponse>, AppError> {
    user.require_role(UserRole::Professional, "view recommended postings")?;

    let result = recommend_postings(
        state.repo.as_ref(),
        user.id,
        &filter,
        state.config.posting_scan_limit,
        today(),
    )
    .await?;

    let postings: Vec<PostingMatch> = result
        .ranked
        .into_iter()
        .map(|scored| PostingMatch {
            company: CompanyRef {
                id: scored.item.company_id,
                email: scored.item.company_email.clone(),
            },
            posting: scored.item,
            percentage: scored.report.percentage,
            breakdown: scored.report.breakdown,
        })
        .collect();

    Ok(Json(PostingRecommendationsResponse {
        message: "Recommended postings retrieved".to_string(),
        total: postings.len(),
        evaluated: result.evaluated,
        min_percentage: filter.min_percentage,
        postings,
    }))
}

/// GET /api/v1/matching/ofertas-recomendadas?limite=&minimo=
pub async fn handle_recommended_postings(
    State(state): State<AppState>,
    user: AuthUser,
    Query(params): Query<RecommendationParams>,
) -> Result<Json<PostingRecommendationsResponse>, AppError> {
    let filter = params.into_filter(DEFAULT_POSTING_MIN);
    posting_recommendations(&state, &user, filter).await
}

/// GET /api/v1/matching/ofertas-recomendadas/alto-matching — at least 80%.
pub async fn handle_high_match_postings(
    State(state): State<AppState>,
    user: AuthUser,
    Query(params): Query<RecommendationParams>,
) -> Result<Json<PostingRecommendationsResponse>, AppError> {
    let filter = RankFilter {
        min_percentage: 80,
        ..params.into_filter(DEFAULT_POSTING_MIN)
    };
    posting_recommendations(&state, &user, filter).await
}

/// GET /api/v1/matching/ofertas-recomendadas/medio-matching — 50% to 79%.
pub async fn handle_medium_match_postings(
    State(state): State<AppState>,
    user: AuthUser,
    Query(params): Query<RecommendationParams>,
) -> Result<Json<PostingRecommendationsResponse>, AppError> {
    let filter = RankFilter {
        min_percentage: 50,
        ..params.into_filter(DEFAULT_POSTING_MIN)
    }
    .with_max(79);
    posting_recommendations(&state, &user, filter).await
}

/// GET /api/v1/matching/ofertas-recomendadas/top-5
pub async fn handle_top_postings(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<Json<PostingRecommendationsResponse>, AppError> {
    posting_recommendations(&state, &user, RankFilter::new(60, 5)).await
}

// ────────────────────────────────────────────────────────────────────────────
// Recommendations for companies
// ────────────────────────────────────────────────────────────────────────────

async fn candidate_recommendations(
    state: &AppState,
    user: &AuthUser,
    posting_id: i64,
    filter: RankFilter,
) -> Result<Json<CandidateRecommendationsResponse>, AppError> {
    user.require_role(UserRole::Company, "view recommended candidates")?;

    let posting = state
        .repo
        .find_company_posting(posting_id, user.id)
        .await?
        .ok_or_else(|| {
            AppError::NotFound(format!(
                "Posting {posting_id} does not exist or does not belong to you"
            ))
        })?;

    let result = recommend_candidates(
        state.repo.as_ref(),
        &posting,
        &filter,
        state.config.candidate_scan_limit,
        today(),
    )
    .await?;

    let candidates: Vec<CandidateMatch> = result
        .ranked
        .into_iter()
        .map(|scored| CandidateMatch {
            id: scored.item.id,
            email: scored.item.email,
            user_type: scored.item.user_type,
            created_at: scored.item.created_at,
            percentage: scored.report.percentage,
            breakdown: scored.report.breakdown,
        })
        .collect();

    Ok(Json(CandidateRecommendationsResponse {
        message: "Recommended candidates retrieved".to_string(),
        posting: PostingRef {
            id: posting.id,
            title: posting.title,
        },
        total: candidates.len(),
        evaluated: result.evaluated,
        min_percentage: filter.min_percentage,
        candidates,
    }))
}

/// GET /api/v1/matching/oferta/:oferta_id/candidatos-recomendados?limite=&minimo=
pub async fn handle_recommended_candidates(
    State(state): State<AppState>,
    user: AuthUser,
    Path(posting_id): Path<i64>,
    Query(params): Query<RecommendationParams>,
) -> Result<Json<CandidateRecommendationsResponse>, AppError> {
    let filter = params.into_filter(DEFAULT_CANDIDATE_MIN);
    candidate_recommendations(&state, &user, posting_id, filter).await
}

/// GET /api/v1/matching/oferta/:oferta_id/candidatos-recomendados/alto-matching — at least 80%.
pub async fn handle_high_match_candidates(
    State(state): State<AppState>,
    user: AuthUser,
    Path(posting_id): Path<i64>,
    Query(params): Query<RecommendationParams>,
) -> Result<Json<CandidateRecommendationsResponse>, AppError> {
    let filter = RankFilter {
        min_percentage: 80,
        ..params.into_filter(DEFAULT_CANDIDATE_MIN)
    };
    candidate_recommendations(&state, &user, posting_id, filter).await
}

/// GET /api/v1/matching/oferta/:oferta_id/candidatos-recomendados/top-10
pub async fn handle_top_candidates(
    State(state): State<AppState>,
    user: AuthUser,
    Path(posting_id): Path<i64>,
) -> Result<Json<CandidateRecommendationsResponse>, AppError> {
    candidate_recommendations(&state, &user, posting_id, RankFilter::new(50, 10)).await
}

// ────────────────────────────────────────────────────────────────────────────
// Point queries
// ────────────────────────────────────────────────────────────────────────────

fn validate_pair(professional_id: i64, posting_id: i64) -> Result<(), AppError> {
    if professional_id <= 0 || posting_id <= 0 {
        return Err(AppError::Validation(
            "professional and posting ids must be positive".to_string(),
        ));
    }
    Ok(())
}

/// GET /api/v1/matching/profesional/:profesional_id/oferta/:oferta_id
/// GET /api/v1/matching/calcular/:profesional_id/:oferta_id
///
/// Professionals may only query their own id.
pub async fn handle_pair_match(
    State(state): State<AppState>,
    user: AuthUser,
    Path((professional_id, posting_id)): Path<(i64, i64)>,
) -> Result<Json<PairMatchResponse>, AppError> {
    validate_pair(professional_id, posting_id)?;
    if user.role == UserRole::Professional && user.id != professional_id {
        return Err(AppError::Forbidden(
            "Professionals can only view their own matching".to_string(),
        ));
    }

    let result = compatibility_for(state.repo.as_ref(), professional_id, posting_id, today()).await;

    Ok(Json(PairMatchResponse {
        message: "Matching computed".to_string(),
        professional_id,
        posting_id,
        result,
    }))
}

/// GET /api/v1/matching/test/:profesional_id/:oferta_id
///
/// Debugging view of a pair score. Disabled in production.
pub async fn handle_pair_debug(
    State(state): State<AppState>,
    _user: AuthUser,
    Path((professional_id, posting_id)): Path<(i64, i64)>,
) -> Result<Json<Value>, AppError> {
    if state.config.is_production() {
        return Err(AppError::Forbidden(
            "Endpoint not available in production".to_string(),
        ));
    }
    validate_pair(professional_id, posting_id)?;

    let result = compatibility_for(state.repo.as_ref(), professional_id, posting_id, today()).await;
    let posting_active = state
        .repo
        .find_posting(posting_id)
        .await?
        .map(|posting| posting.is_active(Utc::now()));

    Ok(Json(json!({
        "mensaje": "Matching algorithm test",
        "profesional_id": professional_id,
        "oferta_id": posting_id,
        "oferta_activa": posting_active,
        "resultado_detallado": result,
        "timestamp": Utc::now().to_rfc3339(),
        "modo": "testing",
    })))
}

// ────────────────────────────────────────────────────────────────────────────
// Statistics
// ────────────────────────────────────────────────────────────────────────────

/// GET /api/v1/matching/estadisticas
pub async fn handle_stats(
    State(state): State<AppState>,
    _user: AuthUser,
) -> Result<Json<StatsResponse>, AppError> {
    let system = state.repo.stats().await?;
    let application_rate = application_rate(&system);

    Ok(Json(StatsResponse {
        message: "Matching statistics".to_string(),
        system,
        application_rate,
    }))
}

fn application_rate(stats: &MatchingStats) -> f64 {
    if stats.active_postings > 0 {
        let rate = stats.applications as f64 / stats.active_postings as f64;
        (rate * 100.0).round() / 100.0
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_application_rate_rounds_to_two_decimals() {
        let stats = MatchingStats {
            active_postings: 3,
            applications: 2,
            ..Default::default()
        };
        assert_eq!(application_rate(&stats), 0.67);
    }

    #[test]
    fn test_application_rate_without_postings_is_zero() {
        assert_eq!(application_rate(&MatchingStats::default()), 0.0);
    }

    #[test]
    fn test_validate_pair_rejects_non_positive_ids() {
        assert!(validate_pair(1, 2).is_ok());
        assert!(matches!(validate_pair(0, 2), Err(AppError::Validation(_))));
        assert!(matches!(validate_pair(3, -1), Err(AppError::Validation(_))));
    }
}
