//! Data access for matching. The scorer never touches the database; everything it
//! needs is loaded here and handed over as plain values.

use anyhow::Result;
use async_trait::async_trait;
use serde::Serialize;
use sqlx::PgPool;

use crate::matching::scoring::ProfessionalProfile;
use crate::models::posting::JobPostingRow;
use crate::models::profile::{build_profile, CredentialRow, SkillRow, WorkExperienceRow};
use crate::models::user::UserRow;

/// Platform-wide counters for the statistics endpoint.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MatchingStats {
    #[serde(rename = "ofertas_activas")]
    pub active_postings: i64,
    #[serde(rename = "profesionales_registrados")]
    pub professionals: i64,
    #[serde(rename = "empresas_registradas")]
    pub companies: i64,
    #[serde(rename = "aplicaciones_totales")]
    pub applications: i64,
}

/// Read-only access to the records the matching flows score.
///
/// Carried in `AppState` as `Arc<dyn MatchingRepository>`.
#[async_trait]
pub trait MatchingRepository: Send + Sync {
    async fn find_user(&self, user_id: i64) -> Result<Option<UserRow>>;

    /// Credentials, work history and skills of a user. `None` if the user does not exist.
    async fn load_profile(&self, professional_id: i64) -> Result<Option<ProfessionalProfile>>;

    async fn find_posting(&self, posting_id: i64) -> Result<Option<JobPostingRow>>;

    /// The posting only if it belongs to `company_id`.
    async fn find_company_posting(
        &self,
        posting_id: i64,
        company_id: i64,
    ) -> Result<Option<JobPostingRow>>;

    /// Active, unexpired postings, oldest first, at most `limit`.
    async fn list_active_postings(&self, limit: i64) -> Result<Vec<JobPostingRow>>;

    /// Active professional accounts, oldest first, at most `limit`.
    async fn list_active_professionals(&self, limit: i64) -> Result<Vec<UserRow>>;

    async fn stats(&self) -> Result<MatchingStats>;
}

// ────────────────────────────────────────────────────────────────────────────
// PostgreSQL backend
// ────────────────────────────────────────────────────────────────────────────

const POSTING_COLUMNS: &str = r#"
    p.id, p.company_id, u.email AS company_email, p.title, p.description,
    p.required_education, p.min_experience_years, p.required_skills, p.location,
    p.employment_type, p.work_mode, p.salary_min, p.salary_max, p.status,
    p.expires_at, p.created_at
"#;

pub struct PgMatchingRepository {
    pool: PgPool,
}

impl PgMatchingRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl MatchingRepository for PgMatchingRepository {
    async fn find_user(&self, user_id: i64) -> Result<Option<UserRow>> {
        Ok(sqlx::query_as::<_, UserRow>(
            "SELECT id, email, user_type, status, created_at FROM users WHERE id = $1",
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?)
    }

    async fn load_profile(&self, professional_id: i64) -> Result<Option<ProfessionalProfile>> {
        let exists: Option<i64> = sqlx::query_scalar("SELECT id FROM users WHERE id = $1")
            .bind(professional_id)
            .fetch_optional(&self.pool)
            .await?;
        if exists.is_none() {
            return Ok(None);
        }

        let credentials = sqlx::query_as::<_, CredentialRow>(
            "SELECT level FROM academic_credentials WHERE user_id = $1 ORDER BY id",
        )
        .bind(professional_id)
        .fetch_all(&self.pool)
        .await?;

        let experience = sqlx::query_as::<_, WorkExperienceRow>(
            "SELECT start_date, end_date, is_current FROM work_experiences WHERE user_id = $1 ORDER BY id",
        )
        .bind(professional_id)
        .fetch_all(&self.pool)
        .await?;

        let skills = sqlx::query_as::<_, SkillRow>(
            "SELECT name, level FROM skills WHERE user_id = $1 ORDER BY id",
        )
        .bind(professional_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(Some(build_profile(credentials, experience, skills)))
    }

    async fn find_posting(&self, posting_id: i64) -> Result<Option<JobPostingRow>> {
        let sql = format!(
            "SELECT {POSTING_COLUMNS} FROM job_postings p JOIN users u ON u.id = p.company_id WHERE p.id = $1"
        );
        Ok(sqlx::query_as::<_, JobPostingRow>(&sql)
            .bind(posting_id)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn find_company_posting(
        &self,
        posting_id: i64,
        company_id: i64,
    ) -> Result<Option<JobPostingRow>> {
        let sql = format!(
            "SELECT {POSTING_COLUMNS} FROM job_postings p JOIN users u ON u.id = p.company_id \
             WHERE p.id = $1 AND p.company_id = $2"
        );
        Ok(sqlx::query_as::<_, JobPostingRow>(&sql)
            .bind(posting_id)
            .bind(company_id)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn list_active_postings(&self, limit: i64) -> Result<Vec<JobPostingRow>> {
        let sql = format!(
            "SELECT {POSTING_COLUMNS} FROM job_postings p JOIN users u ON u.id = p.company_id \
             WHERE p.status = 'activa' AND (p.expires_at IS NULL OR p.expires_at > NOW()) \
             ORDER BY p.id LIMIT $1"
        );
        Ok(sqlx::query_as::<_, JobPostingRow>(&sql)
            .bind(limit)
            .fetch_all(&self.pool)
            .await?)
    }

    async fn list_active_professionals(&self, limit: i64) -> Result<Vec<UserRow>> {
        Ok(sqlx::query_as::<_, UserRow>(
            r#"
            SELECT id, email, user_type, status, created_at
            FROM users
            WHERE user_type = 'profesional' AND status = 'activo'
            ORDER BY id
            LIMIT $1
            "#,
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?)
    }

    async fn stats(&self) -> Result<MatchingStats> {
        let active_postings: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM job_postings WHERE status = 'activa' AND (expires_at IS NULL OR expires_at > NOW())",
        )
        .fetch_one(&self.pool)
        .await?;
        let professionals: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM users WHERE user_type = 'profesional'")
                .fetch_one(&self.pool)
                .await?;
        let companies: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM users WHERE user_type = 'empresa'")
                .fetch_one(&self.pool)
                .await?;
        let applications: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM applications")
            .fetch_one(&self.pool)
            .await?;

        Ok(MatchingStats {
            active_postings,
            professionals,
            companies,
            applications,
        })
    }
}

// ────────────────────────────────────────────────────────────────────────────
// In-memory backend for tests
// ────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
pub mod memory {
    use std::collections::HashMap;

    use anyhow::anyhow;
    use chrono::Utc;

    use super::*;

    #[derive(Default)]
    pub struct MemoryRepository {
        pub users: Vec<UserRow>,
        pub profiles: HashMap<i64, ProfessionalProfile>,
        pub postings: Vec<JobPostingRow>,
        pub applications: i64,
        /// Profile loads for these ids fail, to exercise batch error handling.
        pub broken_profiles: Vec<i64>,
    }

    #[async_trait]
    impl MatchingRepository for MemoryRepository {
        async fn find_user(&self, user_id: i64) -> Result<Option<UserRow>> {
            Ok(self.users.iter().find(|u| u.id == user_id).cloned())
        }

        async fn load_profile(&self, professional_id: i64) -> Result<Option<ProfessionalProfile>> {
            if self.broken_profiles.contains(&professional_id) {
                return Err(anyhow!("connection reset"));
            }
            if !self.users.iter().any(|u| u.id == professional_id) {
                return Ok(None);
            }
            Ok(Some(
                self.profiles
                    .get(&professional_id)
                    .cloned()
                    .unwrap_or_default(),
            ))
        }

        async fn find_posting(&self, posting_id: i64) -> Result<Option<JobPostingRow>> {
            Ok(self.postings.iter().find(|p| p.id == posting_id).cloned())
        }

        async fn find_company_posting(
            &self,
            posting_id: i64,
            company_id: i64,
        ) -> Result<Option<JobPostingRow>> {
            Ok(self
                .postings
                .iter()
                .find(|p| p.id == posting_id && p.company_id == company_id)
                .cloned())
        }

        async fn list_active_postings(&self, limit: i64) -> Result<Vec<JobPostingRow>> {
            let now = Utc::now();
            Ok(self
                .postings
                .iter()
                .filter(|p| p.is_active(now))
                .take(limit as usize)
                .cloned()
                .collect())
        }

        async fn list_active_professionals(&self, limit: i64) -> Result<Vec<UserRow>> {
            Ok(self
                .users
                .iter()
                .filter(|u| u.user_type == "profesional" && u.is_active())
                .take(limit as usize)
                .cloned()
                .collect())
        }

        async fn stats(&self) -> Result<MatchingStats> {
            let now = Utc::now();
            Ok(MatchingStats {
                active_postings: self.postings.iter().filter(|p| p.is_active(now)).count() as i64,
                professionals: self
                    .users
                    .iter()
                    .filter(|u| u.user_type == "profesional")
                    .count() as i64,
                companies: self
                    .users
                    .iter()
                    .filter(|u| u.user_type == "empresa")
                    .count() as i64,
                applications: self.applications,
            })
        }
    }
}
