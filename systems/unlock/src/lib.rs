#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure unlock evaluation over progression graph snapshots.
//!
//! Nothing here is cached: every answer is derived from the planet's current
//! completion set, so a mutation can never leave a stale lock flag behind.
//! Missing planets, tiers and achievements are treated as locked rather than
//! reported as errors.

use star_chart_core::{AchievementId, PlanetId, Status, TierId};
use star_chart_world::{Graph, Planet, Tier};

/// Completion counts for a single tier.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TierProgress {
    /// Tier the counts describe.
    pub tier: TierId,
    /// Achievements of the tier present in the completion set.
    pub completed: usize,
    /// Achievements contained in the tier.
    pub total: usize,
    /// Whether the tier is unlocked.
    pub unlocked: bool,
}

impl TierProgress {
    /// Reports whether every achievement of the tier is completed.
    #[must_use]
    pub const fn is_complete(&self) -> bool {
        self.completed == self.total
    }
}

/// Tier identifiers in ascending tier order.
pub fn tier_order(planet: &Planet) -> impl Iterator<Item = &TierId> {
    planet.tiers().iter().map(Tier::id)
}

/// First tier in tier order, which is always unlocked.
#[must_use]
pub fn first_tier(planet: &Planet) -> Option<&TierId> {
    tier_order(planet).next()
}

/// Tier immediately preceding `tier` in tier order.
#[must_use]
pub fn previous_tier<'a>(planet: &'a Planet, tier: &TierId) -> Option<&'a TierId> {
    let index = planet.tier_index(tier)?;
    let previous = index.checked_sub(1)?;
    planet.tiers().get(previous).map(Tier::id)
}

/// Reports whether every achievement of the tier is in the completion set.
///
/// A tier without achievements is vacuously completed. Unknown tiers are
/// never completed. Completion-set ids absent from the tier contribute
/// nothing.
#[must_use]
pub fn tier_completed(planet: &Planet, tier: &TierId) -> bool {
    planet.tier(tier).is_some_and(|tier| {
        tier.achievements()
            .all(|achievement| planet.is_completed(achievement.id()))
    })
}

/// Reports whether the tier is unlocked.
///
/// The first tier is always unlocked; any later tier is unlocked exactly when
/// the tier before it is completed. Unknown tiers are locked.
#[must_use]
pub fn tier_unlocked(planet: &Planet, tier: &TierId) -> bool {
    match planet.tier_index(tier) {
        None => false,
        Some(0) => true,
        Some(index) => tier_completed(planet, planet.tiers()[index - 1].id()),
    }
}

/// Tier owning the achievement: the first tier in order whose topics contain it.
#[must_use]
pub fn owning_tier<'a>(planet: &'a Planet, achievement: &AchievementId) -> Option<&'a TierId> {
    planet
        .tiers()
        .iter()
        .find(|tier| tier.contains(achievement))
        .map(Tier::id)
}

/// Derives the status of an achievement.
///
/// Completion overrides lock state, so an id in the completion set reports
/// [`Status::Completed`] even if its tier is currently locked.
#[must_use]
pub fn achievement_status(planet: &Planet, achievement: &AchievementId) -> Status {
    if planet.is_completed(achievement) {
        return Status::Completed;
    }

    match owning_tier(planet, achievement) {
        Some(tier) if tier_unlocked(planet, tier) => Status::Available,
        _ => Status::Locked,
    }
}

/// Completion counts for one tier, or `None` when the tier is unknown.
#[must_use]
pub fn tier_progress(planet: &Planet, tier: &TierId) -> Option<TierProgress> {
    let found = planet.tier(tier)?;
    Some(progress_of(planet, found))
}

/// Completion counts for every tier of the planet in tier order.
#[must_use]
pub fn planet_progress(planet: &Planet) -> Vec<TierProgress> {
    planet
        .tiers()
        .iter()
        .map(|tier| progress_of(planet, tier))
        .collect()
}

fn progress_of(planet: &Planet, tier: &Tier) -> TierProgress {
    let completed = tier
        .achievements()
        .filter(|achievement| planet.is_completed(achievement.id()))
        .count();
    TierProgress {
        tier: tier.id().clone(),
        completed,
        total: tier.achievement_count(),
        unlocked: tier_unlocked(planet, tier.id()),
    }
}

/// Graph-level lookups that resolve the planet first.
///
/// Unknown planets are locked.
pub mod graph {
    use super::{Graph, PlanetId, Status, TierId};
    use star_chart_core::AchievementId;

    /// Derives an achievement's status, treating unknown planets as locked.
    #[must_use]
    pub fn achievement_status(
        graph: &Graph,
        planet: &PlanetId,
        achievement: &AchievementId,
    ) -> Status {
        graph
            .planet(planet)
            .map_or(Status::Locked, |planet| {
                super::achievement_status(planet, achievement)
            })
    }

    /// Reports whether a tier is unlocked, treating unknown planets as locked.
    #[must_use]
    pub fn tier_unlocked(graph: &Graph, planet: &PlanetId, tier: &TierId) -> bool {
        graph
            .planet(planet)
            .is_some_and(|planet| super::tier_unlocked(planet, tier))
    }

    /// Reports whether a tier is completed, treating unknown planets as incomplete.
    #[must_use]
    pub fn tier_completed(graph: &Graph, planet: &PlanetId, tier: &TierId) -> bool {
        graph
            .planet(planet)
            .is_some_and(|planet| super::tier_completed(planet, tier))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use star_chart_world::{Achievement, Topic};

    fn planet(completed: &[&str]) -> Planet {
        Planet::new(
            "earth",
            vec![
                Tier::new("tier3", vec![Topic::new("t", vec![Achievement::new("c1", "", "")])]),
                Tier::new("tier1", vec![Topic::new("t", vec![Achievement::new("a1", "", "")])]),
                Tier::new("tier2", Vec::new()),
            ],
            completed.iter().copied().map(AchievementId::from),
        )
    }

    #[test]
    fn previous_tier_follows_tier_order() {
        let planet = planet(&[]);
        assert_eq!(first_tier(&planet), Some(&TierId::from("tier1")));
        assert_eq!(previous_tier(&planet, &"tier1".into()), None);
        assert_eq!(
            previous_tier(&planet, &"tier3".into()),
            Some(&TierId::from("tier2"))
        );
        assert_eq!(previous_tier(&planet, &"tier9".into()), None);
    }

    #[test]
    fn empty_tier_passes_completion_through() {
        let planet = planet(&["a1"]);
        assert!(tier_completed(&planet, &"tier2".into()));
        assert!(tier_unlocked(&planet, &"tier2".into()));
        assert!(tier_unlocked(&planet, &"tier3".into()));
    }

    #[test]
    fn empty_tier_still_waits_for_its_predecessor() {
        let planet = planet(&[]);
        assert!(tier_completed(&planet, &"tier2".into()));
        assert!(!tier_unlocked(&planet, &"tier2".into()));
        assert!(tier_unlocked(&planet, &"tier3".into()));
    }

    #[test]
    fn unknown_tier_is_locked_and_incomplete() {
        let planet = planet(&[]);
        assert!(!tier_unlocked(&planet, &"tier9".into()));
        assert!(!tier_completed(&planet, &"tier9".into()));
        assert_eq!(tier_progress(&planet, &"tier9".into()), None);
    }

    #[test]
    fn progress_counts_only_known_ids() {
        let planet = planet(&["a1", "ghost"]);
        let progress = planet_progress(&planet);
        assert_eq!(progress.len(), 3);
        assert_eq!(progress[0].completed, 1);
        assert_eq!(progress[0].total, 1);
        assert!(progress[0].is_complete());
        assert!(progress[1].is_complete(), "empty tiers are complete");
        assert_eq!(progress[2].completed, 0);
        assert!(progress[2].unlocked);
    }
}
