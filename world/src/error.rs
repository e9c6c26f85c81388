use star_chart_core::{AchievementId, PlanetId, TierId, TopicId};
use thiserror::Error;

/// Reasons a graph document or completion snapshot is rejected at the load boundary.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// The document is not valid JSON or does not have the graph shape.
    #[error("malformed document: {0}")]
    Malformed(#[from] serde_json::Error),
    /// An identifier was the empty string.
    #[error("{kind} identifier must not be empty")]
    EmptyIdentifier {
        /// Kind of node carrying the empty identifier.
        kind: &'static str,
    },
    /// Two planets share an identifier.
    #[error("planet `{0}` is defined more than once")]
    DuplicatePlanet(PlanetId),
    /// Two tiers of one planet share an identifier.
    #[error("tier `{tier}` is defined more than once on planet `{planet}`")]
    DuplicateTier {
        /// Planet owning the tiers.
        planet: PlanetId,
        /// Repeated tier identifier.
        tier: TierId,
    },
    /// Two topics of one tier share an identifier.
    #[error("topic `{topic}` is defined more than once in tier `{tier}` of planet `{planet}`")]
    DuplicateTopic {
        /// Planet owning the tier.
        planet: PlanetId,
        /// Tier owning the topics.
        tier: TierId,
        /// Repeated topic identifier.
        topic: TopicId,
    },
    /// Two achievements of one planet share an identifier.
    #[error("achievement `{achievement}` is defined more than once on planet `{planet}`")]
    DuplicateAchievement {
        /// Planet owning the achievements.
        planet: PlanetId,
        /// Repeated achievement identifier.
        achievement: AchievementId,
    },
}
