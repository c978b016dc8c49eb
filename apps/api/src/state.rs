use std::sync::Arc;

use crate::config::Config;
use crate::matching::repository::MatchingRepository;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// Read access to users, profiles and postings. Default: `PgMatchingRepository`.
    pub repo: Arc<dyn MatchingRepository>,
    pub config: Config,
}
