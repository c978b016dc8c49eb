use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct UserRow {
    pub id: i64,
    pub email: String,
    #[serde(rename = "tipoUsuario")]
    pub user_type: String,
    #[serde(rename = "estado")]
    pub status: String,
    #[serde(rename = "fechaCreacion")]
    pub created_at: DateTime<Utc>,
}

impl UserRow {
    pub fn role(&self) -> Option<UserRole> {
        UserRole::parse(&self.user_type)
    }

    pub fn is_active(&self) -> bool {
        self.status == "activo"
    }
}

/// Account kind. Drives which matching endpoints a user may call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UserRole {
    #[serde(rename = "profesional")]
    Professional,
    #[serde(rename = "empresa")]
    Company,
    #[serde(rename = "institucion")]
    Institution,
}

impl UserRole {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "profesional" => Some(Self::Professional),
            "empresa" => Some(Self::Company),
            "institucion" => Some(Self::Institution),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Professional => "profesional",
            Self::Company => "empresa",
            Self::Institution => "institucion",
        }
    }
}
