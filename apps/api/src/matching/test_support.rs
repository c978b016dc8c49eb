//! Row fixtures shared by matching tests.

use chrono::{Duration, Utc};
use sqlx::types::Json;

use crate::models::posting::JobPostingRow;
use crate::models::user::UserRow;

pub fn user_row(id: i64, user_type: &str) -> UserRow {
    UserRow {
        id,
        email: format!("user{id}@talentchain.bo"),
        user_type: user_type.to_string(),
        status: "activo".to_string(),
        created_at: Utc::now() - Duration::days(30),
    }
}

pub fn posting_row(
    id: i64,
    company_id: i64,
    education: &str,
    min_years: i32,
    skills: &[&str],
) -> JobPostingRow {
    JobPostingRow {
        id,
        company_id,
        company_email: format!("user{company_id}@talentchain.bo"),
        title: format!("Oferta {id}"),
        description: "Puesto de desarrollo de software".to_string(),
        required_education: education.to_string(),
        min_experience_years: min_years,
        required_skills: Json(skills.iter().map(|s| s.to_string()).collect()),
        location: Some("Santa Cruz, Bolivia".to_string()),
        employment_type: "tiempo-completo".to_string(),
        work_mode: "presencial".to_string(),
        salary_min: None,
        salary_max: None,
        status: "activa".to_string(),
        expires_at: None,
        created_at: Utc::now(),
    }
}
