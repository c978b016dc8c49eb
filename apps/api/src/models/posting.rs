use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::FromRow;

use crate::matching::scoring::JobRequirements;

/// A job posting joined with the owning company's email.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct JobPostingRow {
    pub id: i64,
    #[serde(rename = "empresaId")]
    pub company_id: i64,
    #[serde(skip_serializing)]
    pub company_email: String,
    #[serde(rename = "titulo")]
    pub title: String,
    #[serde(rename = "descripcion")]
    pub description: String,
    #[serde(rename = "educacionRequerida")]
    pub required_education: String,
    #[serde(rename = "experienciaMinima")]
    pub min_experience_years: i32,
    #[serde(rename = "habilidadesRequeridas")]
    pub required_skills: Json<Vec<String>>,
    #[serde(rename = "ubicacion")]
    pub location: Option<String>,
    #[serde(rename = "tipoTrabajo")]
    pub employment_type: String,
    #[serde(rename = "modalidad")]
    pub work_mode: String,
    #[serde(rename = "salarioMin")]
    pub salary_min: Option<f64>,
    #[serde(rename = "salarioMax")]
    pub salary_max: Option<f64>,
    #[serde(rename = "estado")]
    pub status: String,
    #[serde(rename = "fechaExpiracion")]
    pub expires_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl JobPostingRow {
    pub fn requirements(&self) -> JobRequirements {
        JobRequirements::from_raw(
            Some(self.required_education.as_str()),
            self.min_experience_years,
            self.required_skills.0.clone(),
            self.location.as_deref(),
        )
    }

    pub fn is_active(&self, now: DateTime<Utc>) -> bool {
        self.status == "activa" && self.expires_at.map_or(true, |expiry| now < expiry)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    use crate::matching::scoring::EducationLevel;

    fn posting() -> JobPostingRow {
        JobPostingRow {
            id: 1,
            company_id: 9,
            company_email: "rrhh@empresa.bo".to_string(),
            title: "Desarrollador Backend".to_string(),
            description: "Servicios en Rust".to_string(),
            required_education: "ingenieria".to_string(),
            min_experience_years: 3,
            required_skills: Json(vec!["Rust".to_string()]),
            location: Some("Santa Cruz, Bolivia".to_string()),
            employment_type: "tiempo-completo".to_string(),
            work_mode: "remoto".to_string(),
            salary_min: None,
            salary_max: None,
            status: "activa".to_string(),
            expires_at: None,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_requirements_from_row() {
        let req = posting().requirements();
        assert_eq!(req.education, EducationLevel::Ingenieria);
        assert_eq!(req.min_experience_years, 3);
        assert_eq!(req.skills, vec!["Rust".to_string()]);
        assert_eq!(req.location.as_deref(), Some("Santa Cruz, Bolivia"));
    }

    #[test]
    fn test_is_active_respects_status_and_expiry() {
        let now = Utc::now();
        let mut row = posting();
        assert!(row.is_active(now));

        row.expires_at = Some(now - Duration::days(1));
        assert!(!row.is_active(now));

        row.expires_at = Some(now + Duration::days(1));
        row.status = "pausada".to_string();
        assert!(!row.is_active(now));
    }

    #[test]
    fn test_serialized_posting_hides_company_email() {
        let value = serde_json::to_value(posting()).unwrap();
        assert_eq!(value["titulo"], "Desarrollador Backend");
        assert_eq!(value["habilidadesRequeridas"][0], "Rust");
        assert!(value.get("companyEmail").is_none());
    }
}
