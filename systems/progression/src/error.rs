use star_chart_core::{AchievementId, CompletionRejection, PlanetId};
use star_chart_world::ValidationError;
use thiserror::Error;

use crate::StoreError;

/// Failures reported by the progression controller.
///
/// Every failed command leaves the world exactly as it was, except
/// [`ProgressionError::Persist`], which never rolls back the in-memory state.
#[derive(Debug, Error)]
pub enum ProgressionError {
    /// A completion was requested for an achievement that is not available.
    #[error("cannot complete `{achievement}` on `{planet}`: {reason}")]
    Precondition {
        /// Planet named by the command.
        planet: PlanetId,
        /// Achievement named by the command.
        achievement: AchievementId,
        /// Why the achievement cannot be completed.
        reason: CompletionRejection,
    },
    /// An imported graph document was rejected.
    #[error("graph import rejected")]
    Validation(#[from] ValidationError),
    /// An administrative command was refused by the authorizer.
    #[error("{action} requires administrative access")]
    Unauthorized {
        /// Name of the refused command.
        action: &'static str,
    },
    /// The current graph could not be encoded.
    #[error("failed to encode progression state")]
    Encode(#[from] serde_json::Error),
    /// Writing the completion snapshot failed.
    #[error("failed to persist completion snapshot: {0}")]
    Persist(#[from] StoreError),
}
