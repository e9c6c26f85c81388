//! In-memory progression graph.

use std::collections::{BTreeSet, HashSet};

use star_chart_core::{AchievementId, PlanetId, TierId, TopicId};

use crate::ValidationError;

/// Leaf unit of progression. Immutable once loaded.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Achievement {
    id: AchievementId,
    title: String,
    description: String,
}

impl Achievement {
    /// Creates a new achievement.
    #[must_use]
    pub fn new(
        id: impl Into<AchievementId>,
        title: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            description: description.into(),
        }
    }

    /// Identifier of the achievement, unique within its planet.
    #[must_use]
    pub fn id(&self) -> &AchievementId {
        &self.id
    }

    /// Short human readable title.
    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Longer description shown in detail views.
    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }
}

/// Ordered cluster of achievements inside a tier.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Topic {
    id: TopicId,
    achievements: Vec<Achievement>,
}

impl Topic {
    /// Creates a topic holding the achievements in the provided order.
    #[must_use]
    pub fn new(id: impl Into<TopicId>, achievements: Vec<Achievement>) -> Self {
        Self {
            id: id.into(),
            achievements,
        }
    }

    /// Identifier of the topic, unique within its tier.
    #[must_use]
    pub fn id(&self) -> &TopicId {
        &self.id
    }

    /// Achievements in load order.
    #[must_use]
    pub fn achievements(&self) -> &[Achievement] {
        &self.achievements
    }
}

/// Stage of a planet, gated by completion of the preceding tier.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Tier {
    id: TierId,
    topics: Vec<Topic>,
}

impl Tier {
    /// Creates a tier holding the topics in the provided order.
    #[must_use]
    pub fn new(id: impl Into<TierId>, topics: Vec<Topic>) -> Self {
        Self {
            id: id.into(),
            topics,
        }
    }

    /// Identifier of the tier.
    #[must_use]
    pub fn id(&self) -> &TierId {
        &self.id
    }

    /// Topics in load order.
    #[must_use]
    pub fn topics(&self) -> &[Topic] {
        &self.topics
    }

    /// Iterates over every achievement of every topic.
    pub fn achievements(&self) -> impl Iterator<Item = &Achievement> {
        self.topics.iter().flat_map(|topic| topic.achievements.iter())
    }

    /// Reports whether any topic of the tier contains the achievement.
    #[must_use]
    pub fn contains(&self, achievement: &AchievementId) -> bool {
        self.achievements().any(|candidate| candidate.id() == achievement)
    }

    /// Number of achievements across all topics.
    #[must_use]
    pub fn achievement_count(&self) -> usize {
        self.topics.iter().map(|topic| topic.achievements.len()).sum()
    }
}

/// Where an achievement lives inside its planet.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AchievementLocation<'a> {
    /// Tier owning the achievement.
    pub tier: &'a Tier,
    /// Topic owning the achievement.
    pub topic: &'a Topic,
    /// The achievement itself.
    pub achievement: &'a Achievement,
}

/// Top-level grouping with its own completion set.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Planet {
    id: PlanetId,
    tiers: Vec<Tier>,
    completed: BTreeSet<AchievementId>,
}

impl Planet {
    /// Creates a planet. Tiers are kept sorted by tier order.
    #[must_use]
    pub fn new(
        id: impl Into<PlanetId>,
        mut tiers: Vec<Tier>,
        completed: impl IntoIterator<Item = AchievementId>,
    ) -> Self {
        tiers.sort_by(|left, right| left.id.cmp(&right.id));
        Self {
            id: id.into(),
            tiers,
            completed: completed.into_iter().collect(),
        }
    }

    /// Identifier of the planet.
    #[must_use]
    pub fn id(&self) -> &PlanetId {
        &self.id
    }

    /// Tiers in ascending tier order.
    #[must_use]
    pub fn tiers(&self) -> &[Tier] {
        &self.tiers
    }

    /// Looks up a tier by identifier.
    #[must_use]
    pub fn tier(&self, tier: &TierId) -> Option<&Tier> {
        self.tier_index(tier).map(|index| &self.tiers[index])
    }

    /// Position of the tier in tier order.
    #[must_use]
    pub fn tier_index(&self, tier: &TierId) -> Option<usize> {
        self.tiers
            .binary_search_by(|candidate| candidate.id.cmp(tier))
            .ok()
    }

    /// Achievement ids recorded as completed, including inert stray ids.
    #[must_use]
    pub fn completed(&self) -> &BTreeSet<AchievementId> {
        &self.completed
    }

    /// Reports whether the id is part of the completion set.
    #[must_use]
    pub fn is_completed(&self, achievement: &AchievementId) -> bool {
        self.completed.contains(achievement)
    }

    /// Finds the first tier (in tier order) and topic holding the achievement.
    #[must_use]
    pub fn locate(&self, achievement: &AchievementId) -> Option<AchievementLocation<'_>> {
        self.tiers.iter().find_map(|tier| {
            tier.topics.iter().find_map(|topic| {
                topic
                    .achievements
                    .iter()
                    .find(|candidate| candidate.id() == achievement)
                    .map(|found| AchievementLocation {
                        tier,
                        topic,
                        achievement: found,
                    })
            })
        })
    }

    /// Reports whether any tier of the planet holds the achievement.
    #[must_use]
    pub fn contains_achievement(&self, achievement: &AchievementId) -> bool {
        self.tiers.iter().any(|tier| tier.contains(achievement))
    }

    /// Iterates over every achievement in tier order.
    pub fn achievements(&self) -> impl Iterator<Item = &Achievement> {
        self.tiers.iter().flat_map(Tier::achievements)
    }

    pub(crate) fn insert_completed(&mut self, achievement: AchievementId) -> bool {
        self.contains_achievement(&achievement) && self.completed.insert(achievement)
    }

    pub(crate) fn clear_completed(&mut self) -> bool {
        let changed = !self.completed.is_empty();
        self.completed.clear();
        changed
    }

    pub(crate) fn replace_completed(&mut self, completed: BTreeSet<AchievementId>) {
        self.completed = completed;
    }
}

/// Mapping from planet id to planet, kept in load order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Graph {
    planets: Vec<Planet>,
}

impl Graph {
    /// Creates a graph without planets.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Validates the planets and assembles them into a graph.
    ///
    /// Identifiers must be non-empty, planet ids unique, tier ids unique per
    /// planet, topic ids unique per tier and achievement ids unique per
    /// planet.
    pub fn from_planets(planets: Vec<Planet>) -> Result<Self, ValidationError> {
        let mut planet_ids = HashSet::with_capacity(planets.len());
        for planet in &planets {
            validate_planet(planet)?;
            if !planet_ids.insert(planet.id()) {
                return Err(ValidationError::DuplicatePlanet(planet.id().clone()));
            }
        }
        Ok(Self { planets })
    }

    /// Planets in load order.
    #[must_use]
    pub fn planets(&self) -> &[Planet] {
        &self.planets
    }

    /// Looks up a planet by identifier.
    #[must_use]
    pub fn planet(&self, planet: &PlanetId) -> Option<&Planet> {
        self.planets.iter().find(|candidate| candidate.id() == planet)
    }

    /// Load-order index of the planet.
    #[must_use]
    pub fn planet_index(&self, planet: &PlanetId) -> Option<usize> {
        self.planets
            .iter()
            .position(|candidate| candidate.id() == planet)
    }

    /// Number of planets.
    #[must_use]
    pub fn len(&self) -> usize {
        self.planets.len()
    }

    /// Reports whether the graph holds no planets.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.planets.is_empty()
    }

    pub(crate) fn planet_mut(&mut self, planet: &PlanetId) -> Option<&mut Planet> {
        self.planets
            .iter_mut()
            .find(|candidate| candidate.id() == planet)
    }
}

fn validate_planet(planet: &Planet) -> Result<(), ValidationError> {
    if planet.id.as_str().is_empty() {
        return Err(ValidationError::EmptyIdentifier { kind: "planet" });
    }

    for pair in planet.tiers.windows(2) {
        if pair[0].id == pair[1].id {
            return Err(ValidationError::DuplicateTier {
                planet: planet.id.clone(),
                tier: pair[0].id.clone(),
            });
        }
    }

    let mut achievements = HashSet::new();
    for tier in &planet.tiers {
        if tier.id.as_str().is_empty() {
            return Err(ValidationError::EmptyIdentifier { kind: "tier" });
        }
        let mut topics = HashSet::with_capacity(tier.topics.len());
        for topic in &tier.topics {
            if topic.id.as_str().is_empty() {
                return Err(ValidationError::EmptyIdentifier { kind: "topic" });
            }
            if !topics.insert(&topic.id) {
                return Err(ValidationError::DuplicateTopic {
                    planet: planet.id.clone(),
                    tier: tier.id.clone(),
                    topic: topic.id.clone(),
                });
            }
            for achievement in &topic.achievements {
                if achievement.id.as_str().is_empty() {
                    return Err(ValidationError::EmptyIdentifier {
                        kind: "achievement",
                    });
                }
                if !achievements.insert(&achievement.id) {
                    return Err(ValidationError::DuplicateAchievement {
                        planet: planet.id.clone(),
                        achievement: achievement.id.clone(),
                    });
                }
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn achievement(id: &str) -> Achievement {
        Achievement::new(id, id.to_uppercase(), "")
    }

    fn planet(id: &str, tiers: Vec<Tier>) -> Planet {
        Planet::new(id, tiers, Vec::new())
    }

    #[test]
    fn tiers_are_sorted_by_tier_order() {
        let planet = planet(
            "earth",
            vec![
                Tier::new("tier10", Vec::new()),
                Tier::new("tier2", Vec::new()),
                Tier::new("tier1", Vec::new()),
            ],
        );
        let order: Vec<&str> = planet.tiers().iter().map(|tier| tier.id().as_str()).collect();
        assert_eq!(order, vec!["tier1", "tier2", "tier10"]);
        assert_eq!(planet.tier_index(&TierId::from("tier10")), Some(2));
    }

    #[test]
    fn locate_reports_owning_tier_and_topic() {
        let planet = planet(
            "earth",
            vec![Tier::new(
                "tier1",
                vec![
                    Topic::new("combat", vec![achievement("a1")]),
                    Topic::new("travel", vec![achievement("a2")]),
                ],
            )],
        );
        let location = planet.locate(&"a2".into()).expect("a2 exists");
        assert_eq!(location.tier.id().as_str(), "tier1");
        assert_eq!(location.topic.id().as_str(), "travel");
        assert_eq!(location.achievement.title(), "A2");
        assert!(planet.locate(&"missing".into()).is_none());
    }

    #[test]
    fn insert_completed_ignores_unknown_ids() {
        let mut planet = planet(
            "earth",
            vec![Tier::new("tier1", vec![Topic::new("t", vec![achievement("a1")])])],
        );
        assert!(!planet.insert_completed("ghost".into()));
        assert!(planet.insert_completed("a1".into()));
        assert!(!planet.insert_completed("a1".into()));
        assert_eq!(planet.completed().len(), 1);
    }

    #[test]
    fn duplicate_achievements_across_tiers_are_rejected() {
        let earth = planet(
            "earth",
            vec![
                Tier::new("tier1", vec![Topic::new("t", vec![achievement("a1")])]),
                Tier::new("tier2", vec![Topic::new("t", vec![achievement("a1")])]),
            ],
        );
        assert!(matches!(
            Graph::from_planets(vec![earth]),
            Err(ValidationError::DuplicateAchievement { .. })
        ));
    }

    #[test]
    fn achievement_ids_may_repeat_across_planets() {
        let tiers = || vec![Tier::new("tier1", vec![Topic::new("t", vec![achievement("a1")])])];
        let graph = Graph::from_planets(vec![planet("earth", tiers()), planet("mars", tiers())])
            .expect("ids only need to be unique within a planet");
        assert_eq!(graph.len(), 2);
        assert_eq!(graph.planet_index(&"mars".into()), Some(1));
    }

    #[test]
    fn duplicate_planets_and_topics_are_rejected() {
        assert!(matches!(
            Graph::from_planets(vec![planet("earth", Vec::new()), planet("earth", Vec::new())]),
            Err(ValidationError::DuplicatePlanet(_))
        ));

        let earth = planet(
            "earth",
            vec![Tier::new(
                "tier1",
                vec![Topic::new("t", Vec::new()), Topic::new("t", Vec::new())],
            )],
        );
        assert!(matches!(
            Graph::from_planets(vec![earth]),
            Err(ValidationError::DuplicateTopic { .. })
        ));
    }

    #[test]
    fn empty_identifiers_are_rejected() {
        assert!(matches!(
            Graph::from_planets(vec![planet("", Vec::new())]),
            Err(ValidationError::EmptyIdentifier { kind: "planet" })
        ));
    }
}
