//! Compatibility scoring — weighted heuristic that rates a professional against a job posting.
//!
//! Pure and deterministic: no I/O, no clock reads. The caller supplies "today"
//! so experience durations are reproducible in tests.
//!
//! Four sub-scores in [0, 1] are combined with fixed weights into a 0–100 percentage.

use std::collections::HashMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

// ────────────────────────────────────────────────────────────────────────────
// Domain values
// ────────────────────────────────────────────────────────────────────────────

/// Academic credential level as stored on a credential or required by a posting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EducationLevel {
    Bachillerato,
    Tecnico,
    Licenciatura,
    Ingenieria,
    Maestria,
    Doctorado,
    Certificacion,
}

/// Rank used when a posting omits its requirement (licenciatura).
pub const DEFAULT_REQUIRED_RANK: u8 = 3;

impl EducationLevel {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_lowercase().as_str() {
            "bachillerato" => Some(Self::Bachillerato),
            "tecnico" => Some(Self::Tecnico),
            "licenciatura" => Some(Self::Licenciatura),
            "ingenieria" => Some(Self::Ingenieria),
            "maestria" => Some(Self::Maestria),
            "doctorado" => Some(Self::Doctorado),
            "certificacion" => Some(Self::Certificacion),
            _ => None,
        }
    }

    /// Ordinal position in the degree ladder. Certifications are not ranked.
    pub fn rank(self) -> Option<u8> {
        match self {
            Self::Bachillerato => Some(1),
            Self::Tecnico => Some(2),
            Self::Licenciatura => Some(3),
            Self::Ingenieria => Some(4),
            Self::Maestria => Some(5),
            Self::Doctorado => Some(6),
            Self::Certificacion => None,
        }
    }
}

/// Self-reported proficiency on a skill.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProficiencyLevel {
    #[default]
    Basico,
    Intermedio,
    Avanzado,
    Experto,
}

impl ProficiencyLevel {
    /// Unknown or missing levels fall back to basico.
    pub fn parse_or_default(raw: Option<&str>) -> Self {
        match raw.map(|r| r.trim().to_lowercase()).as_deref() {
            Some("intermedio") => Self::Intermedio,
            Some("avanzado") => Self::Avanzado,
            Some("experto") => Self::Experto,
            _ => Self::Basico,
        }
    }

    pub fn bonus(self) -> f64 {
        match self {
            Self::Experto => 0.3,
            Self::Avanzado => 0.2,
            Self::Intermedio => 0.1,
            Self::Basico => 0.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Credential {
    /// `None` when the stored level was not recognised; such credentials rank 0.
    pub level: Option<EducationLevel>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct WorkExperience {
    pub start: NaiveDate,
    /// `None` for the current position.
    pub end: Option<NaiveDate>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Skill {
    pub name: String,
    pub level: ProficiencyLevel,
}

/// Everything the scorer needs to know about a professional.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProfessionalProfile {
    pub credentials: Vec<Credential>,
    pub experience: Vec<WorkExperience>,
    pub skills: Vec<Skill>,
}

/// Matching requirements of a job posting, with defaults already applied.
#[derive(Debug, Clone, PartialEq)]
pub struct JobRequirements {
    pub education: EducationLevel,
    pub min_experience_years: u32,
    pub skills: Vec<String>,
    pub location: Option<String>,
}

impl Default for JobRequirements {
    fn default() -> Self {
        Self {
            education: EducationLevel::Licenciatura,
            min_experience_years: 0,
            skills: Vec::new(),
            location: None,
        }
    }
}

impl JobRequirements {
    /// Builds requirements from raw stored values, applying the documented defaults:
    /// missing or unknown education → licenciatura, negative experience → 0,
    /// blank location → none.
    pub fn from_raw(
        education: Option<&str>,
        min_experience_years: i32,
        skills: Vec<String>,
        location: Option<&str>,
    ) -> Self {
        Self {
            education: education
                .and_then(EducationLevel::parse)
                .unwrap_or(EducationLevel::Licenciatura),
            min_experience_years: u32::try_from(min_experience_years).unwrap_or(0),
            skills,
            location: location
                .map(str::trim)
                .filter(|l| !l.is_empty())
                .map(str::to_string),
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Output
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreBreakdown {
    #[serde(rename = "educacion")]
    pub education: u8,
    #[serde(rename = "experiencia")]
    pub experience: u8,
    #[serde(rename = "habilidades")]
    pub skills: u8,
    #[serde(rename = "ubicacion")]
    pub location: u8,
}

/// Result of one (professional, posting) evaluation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompatibilityReport {
    #[serde(rename = "porcentajeMatching")]
    pub percentage: u8,
    #[serde(rename = "detalles")]
    pub breakdown: ScoreBreakdown,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl CompatibilityReport {
    /// All-zero report for when an input could not be loaded.
    pub fn failed(reason: impl Into<String>) -> Self {
        Self {
            percentage: 0,
            breakdown: ScoreBreakdown::default(),
            error: Some(reason.into()),
        }
    }

    pub fn is_failed(&self) -> bool {
        self.error.is_some()
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Aggregator
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ScoringWeights {
    #[serde(rename = "educacion")]
    pub education: f64,
    #[serde(rename = "experiencia")]
    pub experience: f64,
    #[serde(rename = "habilidades")]
    pub skills: f64,
    #[serde(rename = "ubicacion")]
    pub location: f64,
}

pub const WEIGHTS: ScoringWeights = ScoringWeights {
    education: 0.30,
    experience: 0.35,
    skills: 0.25,
    location: 0.10,
};

/// Scores `profile` against `posting` as of `today`.
pub fn score(
    profile: &ProfessionalProfile,
    posting: &JobRequirements,
    today: NaiveDate,
) -> CompatibilityReport {
    let education = evaluate_education(&profile.credentials, posting.education).clamp(0.0, 1.0);
    let experience =
        evaluate_experience(&profile.experience, posting.min_experience_years, today)
            .clamp(0.0, 1.0);
    let skills = evaluate_skills(&profile.skills, &posting.skills).clamp(0.0, 1.0);
    let location = evaluate_location(posting.location.as_deref()).clamp(0.0, 1.0);

    let mut total = 0.0;
    total += education * WEIGHTS.education;
    total += experience * WEIGHTS.experience;
    total += skills * WEIGHTS.skills;
    total += location * WEIGHTS.location;

    CompatibilityReport {
        percentage: to_percent(total),
        breakdown: ScoreBreakdown {
            education: to_percent(education),
            experience: to_percent(experience),
            skills: to_percent(skills),
            location: to_percent(location),
        },
        error: None,
    }
}

fn to_percent(fraction: f64) -> u8 {
    (fraction * 100.0).round().clamp(0.0, 100.0) as u8
}

// ────────────────────────────────────────────────────────────────────────────
// Sub-evaluators
// ────────────────────────────────────────────────────────────────────────────

/// Highest held degree vs the required one.
///
/// Meeting the requirement starts at 0.8 and adds 0.05 per level above it;
/// falling short starts at 0.5 and loses 0.15 per missing level.
pub fn evaluate_education(credentials: &[Credential], required: EducationLevel) -> f64 {
    if credentials.is_empty() {
        return 0.0;
    }

    let held = credentials
        .iter()
        .filter_map(|c| c.level.and_then(EducationLevel::rank))
        .max()
        .unwrap_or(0);
    let required = required.rank().unwrap_or(DEFAULT_REQUIRED_RANK);

    if held >= required {
        let excess = f64::from(held - required);
        (0.8 + excess * 0.05).min(1.0)
    } else {
        let shortfall = f64::from(required - held);
        (0.5 - shortfall * 0.15).max(0.0)
    }
}

/// Accumulated years of experience across all positions, open positions ending `today`.
pub fn total_experience_years(history: &[WorkExperience], today: NaiveDate) -> f64 {
    history
        .iter()
        .map(|exp| {
            let end = exp.end.unwrap_or(today);
            let days = (end - exp.start).num_days().max(0);
            days as f64 / 365.25
        })
        .sum()
}

/// Accumulated years vs the posting's minimum.
///
/// The jump at exactly the minimum (0.6 just below, 0.7 at it) is intended.
pub fn evaluate_experience(history: &[WorkExperience], min_years: u32, today: NaiveDate) -> f64 {
    if history.is_empty() {
        return if min_years == 0 { 0.8 } else { 0.0 };
    }

    let total = total_experience_years(history, today);
    let required = f64::from(min_years);

    if total >= required {
        if min_years == 0 {
            return 1.0;
        }
        let ratio = total / required;
        (0.7 + (ratio - 1.0) * 0.1).min(1.0)
    } else {
        (total / required) * 0.6
    }
}

/// Share of required skills the professional lists, plus a capped proficiency bonus.
pub fn evaluate_skills(held: &[Skill], required: &[String]) -> f64 {
    if required.is_empty() {
        return 1.0;
    }
    if held.is_empty() {
        return 0.0;
    }

    let by_name: HashMap<String, ProficiencyLevel> = held
        .iter()
        .map(|s| (s.name.to_lowercase(), s.level))
        .collect();

    let mut matched = 0usize;
    let mut level_bonus = 0.0;
    for name in required {
        if let Some(level) = by_name.get(&name.to_lowercase()) {
            matched += 1;
            level_bonus += level.bonus();
        }
    }

    let count = required.len() as f64;
    let match_ratio = matched as f64 / count;
    let bonus = (level_bonus / count).min(0.2);

    (match_ratio + bonus).min(1.0)
}

/// Placeholder until professionals carry a location: any stated location scores 0.7.
pub fn evaluate_location(posting_location: Option<&str>) -> f64 {
    match posting_location {
        Some(loc) if !loc.trim().is_empty() => 0.7,
        _ => 1.0,
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────
