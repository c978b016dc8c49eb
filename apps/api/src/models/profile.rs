use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::matching::scoring::{
    Credential, EducationLevel, ProficiencyLevel, ProfessionalProfile, Skill, WorkExperience,
};

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct CredentialRow {
    pub level: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct WorkExperienceRow {
    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
    pub is_current: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct SkillRow {
    pub name: String,
    pub level: Option<String>,
}

impl From<CredentialRow> for Credential {
    fn from(row: CredentialRow) -> Self {
        Credential {
            level: EducationLevel::parse(&row.level),
        }
    }
}

impl From<WorkExperienceRow> for WorkExperience {
    fn from(row: WorkExperienceRow) -> Self {
        // A current position has no end even if a stale end_date was stored.
        let end = if row.is_current { None } else { row.end_date };
        WorkExperience {
            start: row.start_date,
            end,
        }
    }
}

impl From<SkillRow> for Skill {
    fn from(row: SkillRow) -> Self {
        Skill {
            level: ProficiencyLevel::parse_or_default(row.level.as_deref()),
            name: row.name,
        }
    }
}

/// Assembles the scorer's view of a professional from the stored rows.
pub fn build_profile(
    credentials: Vec<CredentialRow>,
    experience: Vec<WorkExperienceRow>,
    skills: Vec<SkillRow>,
) -> ProfessionalProfile {
    ProfessionalProfile {
        credentials: credentials.into_iter().map(Credential::from).collect(),
        experience: experience.into_iter().map(WorkExperience::from).collect(),
        skills: skills.into_iter().map(Skill::from).collect(),
    }
}
