//! Recommendation flows built on the scorer: postings for a professional,
//! candidates for a posting, and the single-pair query.
//!
//! Scoring is sequential; each pair is independent so a failed load only drops
//! that pair from the batch.

use chrono::NaiveDate;
use serde::Deserialize;
use tracing::{info, warn};

use crate::errors::AppError;
use crate::matching::repository::MatchingRepository;
use crate::matching::scoring::{score, CompatibilityReport};
use crate::models::posting::JobPostingRow;
use crate::models::user::UserRow;

pub const DEFAULT_LIMIT: usize = 10;
pub const DEFAULT_POSTING_MIN: u8 = 50;
pub const DEFAULT_CANDIDATE_MIN: u8 = 60;

const NOT_FOUND_REASON: &str = "Professional or posting not found";

// ────────────────────────────────────────────────────────────────────────────
// Filtering and ranking
// ────────────────────────────────────────────────────────────────────────────

/// Threshold window and result cap for a recommendation request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RankFilter {
    pub min_percentage: u8,
    pub max_percentage: Option<u8>,
    pub limit: usize,
}

impl RankFilter {
    pub fn new(min_percentage: u8, limit: usize) -> Self {
        Self {
            min_percentage,
            max_percentage: None,
            limit,
        }
    }

    pub fn with_max(self, max_percentage: u8) -> Self {
        Self {
            max_percentage: Some(max_percentage),
            ..self
        }
    }

    fn accepts(&self, percentage: u8) -> bool {
        percentage >= self.min_percentage
            && self.max_percentage.map_or(true, |max| percentage <= max)
    }
}

/// Raw `?limite=&minimo=` query parameters.
///
/// Absent, unparsable, or zero values fall back to the endpoint default.
#[derive(Debug, Default, Deserialize)]
pub struct RecommendationParams {
    #[serde(rename = "limite")]
    pub limit: Option<String>,
    #[serde(rename = "minimo")]
    pub min: Option<String>,
}

impl RecommendationParams {
    pub fn into_filter(self, default_min: u8) -> RankFilter {
        let limit = positive(self.limit.as_deref()).map_or(DEFAULT_LIMIT, |l| l as usize);
        let min = positive(self.min.as_deref()).map_or(default_min, |m| m.min(100) as u8);
        RankFilter::new(min, limit)
    }
}

fn positive(raw: Option<&str>) -> Option<u32> {
    raw.and_then(|v| v.trim().parse::<u32>().ok())
        .filter(|v| *v > 0)
}

/// An item paired with its compatibility report.
#[derive(Debug, Clone)]
pub struct Scored<T> {
    pub item: T,
    pub report: CompatibilityReport,
}

/// Drops failed reports and those outside the threshold window, then sorts by
/// percentage descending. Ties keep input order.
pub fn rank<T>(scored: Vec<Scored<T>>, filter: &RankFilter) -> Vec<Scored<T>> {
    let mut kept: Vec<Scored<T>> = scored
        .into_iter()
        .filter(|s| !s.report.is_failed() && filter.accepts(s.report.percentage))
        .collect();
    kept.sort_by(|a, b| b.report.percentage.cmp(&a.report.percentage));
    kept.truncate(filter.limit);
    kept
}

/// Ranked results plus how many items were evaluated.
#[derive(Debug, Clone)]
pub struct Recommendations<T> {
    pub evaluated: usize,
    pub ranked: Vec<Scored<T>>,
}

// ────────────────────────────────────────────────────────────────────────────
// Flows
// ────────────────────────────────────────────────────────────────────────────

/// Active postings that best fit one professional.
pub async fn recommend_postings(
    repo: &dyn MatchingRepository,
    professional_id: i64,
    filter: &RankFilter,
    scan_limit: i64,
    today: NaiveDate,
) -> Result<Recommendations<JobPostingRow>, AppError> {
    let profile = repo
        .load_profile(professional_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Professional {professional_id} not found")))?;

    let postings = repo.list_active_postings(scan_limit).await?;
    let evaluated = postings.len();

    let scored = postings
        .into_iter()
        .map(|posting| {
            let report = score(&profile, &posting.requirements(), today);
            Scored {
                item: posting,
                report,
            }
        })
        .collect();

    let ranked = rank(scored, filter);
    info!(
        "Recommended {} of {} postings for professional {}",
        ranked.len(),
        evaluated,
        professional_id
    );

    Ok(Recommendations { evaluated, ranked })
}

/// Active professionals that best fit one posting.
pub async fn recommend_candidates(
    repo: &dyn MatchingRepository,
    posting: &JobPostingRow,
    filter: &RankFilter,
    scan_limit: i64,
    today: NaiveDate,
) -> Result<Recommendations<UserRow>, AppError> {
    let professionals = repo.list_active_professionals(scan_limit).await?;
    let evaluated = professionals.len();
    let requirements = posting.requirements();

    let mut scored = Vec::with_capacity(evaluated);
    for professional in professionals {
        let report = match repo.load_profile(professional.id).await {
            Ok(Some(profile)) => score(&profile, &requirements, today),
            Ok(None) => CompatibilityReport::failed(NOT_FOUND_REASON),
            Err(e) => CompatibilityReport::failed(format!("Profile load failed: {e}")),
        };
        if let Some(reason) = &report.error {
            warn!(
                "Skipping professional {} for posting {}: {}",
                professional.id, posting.id, reason
            );
        }
        scored.push(Scored {
            item: professional,
            report,
        });
    }

    let ranked = rank(scored, filter);
    info!(
        "Recommended {} of {} candidates for posting {}",
        ranked.len(),
        evaluated,
        posting.id
    );

    Ok(Recommendations { evaluated, ranked })
}

/// Scores a single pair. Never fails: a missing record or a repository error
/// yields the all-zero report with an error marker.
pub async fn compatibility_for(
    repo: &dyn MatchingRepository,
    professional_id: i64,
    posting_id: i64,
    today: NaiveDate,
) -> CompatibilityReport {
    let loaded = async {
        let profile = repo.load_profile(professional_id).await?;
        let posting = repo.find_posting(posting_id).await?;
        anyhow::Ok(profile.zip(posting))
    }
    .await;

    match loaded {
        Ok(Some((profile, posting))) => score(&profile, &posting.requirements(), today),
        Ok(None) => CompatibilityReport::failed(NOT_FOUND_REASON),
        Err(e) => {
            warn!("Compatibility {professional_id}/{posting_id} failed: {e:?}");
            CompatibilityReport::failed(format!("Compatibility could not be computed: {e}"))
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matching::repository::memory::MemoryRepository;
    use crate::matching::scoring::{
        Credential, EducationLevel, ProficiencyLevel, ProfessionalProfile, ScoreBreakdown, Skill,
        WorkExperience,
    };
    use crate::matching::test_support::{posting_row, user_row};

    fn report(percentage: u8) -> CompatibilityReport {
        CompatibilityReport {
            percentage,
            breakdown: ScoreBreakdown::default(),
            error: None,
        }
    }

    fn scored(name: &'static str, percentage: u8) -> Scored<&'static str> {
        Scored {
            item: name,
            report: report(percentage),
        }
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 6, 1).unwrap()
    }

    fn strong_profile() -> ProfessionalProfile {
        ProfessionalProfile {
            credentials: vec![Credential {
                level: Some(EducationLevel::Ingenieria),
            }],
            experience: vec![WorkExperience {
                start: NaiveDate::from_ymd_opt(2018, 1, 1).unwrap(),
                end: None,
            }],
            skills: vec![Skill {
                name: "Rust".to_string(),
                level: ProficiencyLevel::Experto,
            }],
        }
    }

    #[test]
    fn test_rank_filters_sorts_and_truncates() {
        let input = vec![
            scored("a", 55),
            scored("b", 90),
            scored("c", 40),
            scored("d", 70),
            scored("e", 90),
        ];
        let ranked = rank(input, &RankFilter::new(50, 3));
        let names: Vec<_> = ranked.iter().map(|s| s.item).collect();
        assert_eq!(names, vec!["b", "e", "d"]);
    }

    #[test]
    fn test_rank_ties_keep_input_order() {
        let input = vec![scored("x", 60), scored("y", 60), scored("z", 60)];
        let names: Vec<_> = rank(input, &RankFilter::new(0, 10))
            .into_iter()
            .map(|s| s.item)
            .collect();
        assert_eq!(names, vec!["x", "y", "z"]);
    }

    #[test]
    fn test_rank_respects_upper_bound() {
        let input = vec![scored("a", 85), scored("b", 79), scored("c", 50)];
        let ranked = rank(input, &RankFilter::new(50, 10).with_max(79));
        let names: Vec<_> = ranked.iter().map(|s| s.item).collect();
        assert_eq!(names, vec!["b", "c"]);
    }

    #[test]
    fn test_rank_drops_failed_reports() {
        let input = vec![
            Scored {
                item: "broken",
                report: CompatibilityReport::failed("missing"),
            },
            scored("ok", 10),
        ];
        let ranked = rank(input, &RankFilter::new(0, 10));
        assert_eq!(ranked.len(), 1);
        assert_eq!(ranked[0].item, "ok");
    }

    #[test]
    fn test_params_fall_back_to_defaults() {
        let filter = RecommendationParams::default().into_filter(DEFAULT_POSTING_MIN);
        assert_eq!(filter, RankFilter::new(50, 10));

        let params = RecommendationParams {
            limit: Some("0".to_string()),
            min: Some("abc".to_string()),
        };
        assert_eq!(params.into_filter(60), RankFilter::new(60, 10));

        let params = RecommendationParams {
            limit: Some("3".to_string()),
            min: Some("75".to_string()),
        };
        assert_eq!(params.into_filter(60), RankFilter::new(75, 3));
    }

    #[tokio::test]
    async fn test_recommend_postings_ranks_active_postings() {
        let mut expired = posting_row(3, 100, "ingenieria", 2, &["Rust"]);
        expired.expires_at = Some(chrono::Utc::now() - chrono::Duration::days(2));

        let mut repo = MemoryRepository {
            users: vec![user_row(1, "profesional"), user_row(100, "empresa")],
            postings: vec![
                posting_row(1, 100, "doctorado", 10, &["Haskell"]),
                posting_row(2, 100, "ingenieria", 2, &["Rust"]),
                expired,
            ],
            ..Default::default()
        };
        repo.profiles.insert(1, strong_profile());

        let result = recommend_postings(&repo, 1, &RankFilter::new(50, 10), 50, today())
            .await
            .unwrap();

        assert_eq!(result.evaluated, 2);
        assert_eq!(result.ranked.len(), 1);
        assert_eq!(result.ranked[0].item.id, 2);
        assert!(result.ranked[0].report.percentage >= 80);
    }

    #[tokio::test]
    async fn test_recommend_postings_unknown_professional_is_not_found() {
        let repo = MemoryRepository::default();
        let err = recommend_postings(&repo, 42, &RankFilter::new(50, 10), 50, today())
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_recommend_candidates_skips_failed_profiles() {
        let mut repo = MemoryRepository {
            users: vec![
                user_row(1, "profesional"),
                user_row(2, "profesional"),
                user_row(3, "profesional"),
                user_row(100, "empresa"),
            ],
            broken_profiles: vec![2],
            ..Default::default()
        };
        repo.profiles.insert(1, strong_profile());
        repo.profiles.insert(3, strong_profile());
        let posting = posting_row(7, 100, "licenciatura", 1, &["rust"]);

        let result = recommend_candidates(&repo, &posting, &RankFilter::new(0, 10), 100, today())
            .await
            .unwrap();

        assert_eq!(result.evaluated, 3);
        let ids: Vec<_> = result.ranked.iter().map(|s| s.item.id).collect();
        assert_eq!(ids, vec![1, 3]);
    }

    #[tokio::test]
    async fn test_compatibility_for_missing_posting_returns_marker() {
        let repo = MemoryRepository {
            users: vec![user_row(1, "profesional")],
            ..Default::default()
        };
        let report = compatibility_for(&repo, 1, 999, today()).await;
        assert_eq!(report.percentage, 0);
        assert_eq!(report.error.as_deref(), Some(NOT_FOUND_REASON));
    }

    #[tokio::test]
    async fn test_compatibility_for_repository_error_returns_marker() {
        let repo = MemoryRepository {
            users: vec![user_row(1, "profesional")],
            broken_profiles: vec![1],
            postings: vec![posting_row(5, 100, "licenciatura", 0, &[])],
            ..Default::default()
        };
        let report = compatibility_for(&repo, 1, 5, today()).await;
        assert!(report.is_failed());
        assert_eq!(report.breakdown, ScoreBreakdown::default());
    }

    #[tokio::test]
    async fn test_compatibility_for_scores_pair() {
        let mut repo = MemoryRepository {
            users: vec![user_row(1, "profesional")],
            postings: vec![posting_row(5, 100, "licenciatura", 0, &[])],
            ..Default::default()
        };
        repo.profiles.insert(1, strong_profile());

        let report = compatibility_for(&repo, 1, 5, today()).await;
        assert!(report.error.is_none());
        assert_eq!(report.breakdown.skills, 100);
        assert_eq!(report.breakdown.experience, 100);
    }
}
