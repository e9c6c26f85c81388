use star_chart_core::{AchievementId, PlanetId, Position, RefreshScope, Status, TierId, TopicId};
use star_chart_system_layout::{layout_planet, GeometryConfig, PlanetLayout};
use star_chart_system_unlock::{achievement_status, planet_progress, TierProgress};
use star_chart_world::{query, Planet, World};

/// Evaluated status and layout of every planet, as handed to renderers.
#[derive(Clone, Debug, PartialEq)]
pub struct ChartSnapshot {
    generation: u64,
    center: Position,
    planets: Vec<PlanetView>,
}

impl ChartSnapshot {
    pub(crate) fn capture(world: &World, config: &GeometryConfig) -> Self {
        let graph = query::graph(world);
        let count = graph.len();
        Self {
            generation: query::generation(world),
            center: config.center,
            planets: graph
                .planets()
                .iter()
                .enumerate()
                .map(|(index, planet)| PlanetView::evaluate(planet, index, count, config))
                .collect(),
        }
    }

    /// Re-evaluates the planets covered by `scope`.
    ///
    /// Falls back to a full capture when the graph was replaced since the
    /// snapshot was taken.
    pub(crate) fn refresh(&mut self, world: &World, config: &GeometryConfig, scope: &RefreshScope) {
        let stale_graph = self.generation != query::generation(world);
        let planets = match scope {
            RefreshScope::Planets(planets) if !stale_graph => planets,
            _ => {
                *self = Self::capture(world, config);
                return;
            }
        };

        let graph = query::graph(world);
        let count = graph.len();
        for planet in planets {
            let (Some(index), Some(found)) = (graph.planet_index(planet), graph.planet(planet))
            else {
                continue;
            };
            if let Some(slot) = self.planets.get_mut(index) {
                *slot = PlanetView::evaluate(found, index, count, config);
            }
        }
    }

    /// Graph generation the snapshot was evaluated against.
    #[must_use]
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Centre of the planet ring.
    #[must_use]
    pub fn center(&self) -> Position {
        self.center
    }

    /// Planet views in load order.
    #[must_use]
    pub fn planets(&self) -> &[PlanetView] {
        &self.planets
    }

    /// Looks up the view of a planet.
    #[must_use]
    pub fn planet(&self, planet: &PlanetId) -> Option<&PlanetView> {
        self.planets
            .iter()
            .find(|view| &view.layout.planet == planet)
    }
}

/// Evaluated state of a single planet.
#[derive(Clone, Debug, PartialEq)]
pub struct PlanetView {
    /// Node positions for the planet.
    pub layout: PlanetLayout,
    /// Progress of every tier in tier order.
    pub tiers: Vec<TierProgress>,
    /// Achievements in layout order with their derived status.
    pub achievements: Vec<AchievementView>,
}

impl PlanetView {
    fn evaluate(planet: &Planet, index: usize, count: usize, config: &GeometryConfig) -> Self {
        let layout = layout_planet(planet, index, count, config);
        let achievements = layout
            .achievements
            .iter()
            .filter_map(|node| {
                let location = planet.locate(&node.achievement)?;
                Some(AchievementView {
                    achievement: node.achievement.clone(),
                    tier: node.tier.clone(),
                    topic: node.topic.clone(),
                    title: location.achievement.title().to_owned(),
                    description: location.achievement.description().to_owned(),
                    status: achievement_status(planet, &node.achievement),
                    position: node.position,
                })
            })
            .collect();

        Self {
            tiers: planet_progress(planet),
            achievements,
            layout,
        }
    }

    /// Identifier of the planet.
    #[must_use]
    pub fn planet(&self) -> &PlanetId {
        &self.layout.planet
    }

    /// Looks up the view of an achievement.
    #[must_use]
    pub fn achievement(&self, achievement: &AchievementId) -> Option<&AchievementView> {
        self.achievements
            .iter()
            .find(|view| &view.achievement == achievement)
    }

    /// Number of completed achievements that exist on the planet.
    #[must_use]
    pub fn completed_count(&self) -> usize {
        self.tiers.iter().map(|tier| tier.completed).sum()
    }

    /// Number of achievements on the planet.
    #[must_use]
    pub fn total_count(&self) -> usize {
        self.tiers.iter().map(|tier| tier.total).sum()
    }
}

/// Achievement as presented to renderers.
#[derive(Clone, Debug, PartialEq)]
pub struct AchievementView {
    /// Achievement identifier.
    pub achievement: AchievementId,
    /// Owning tier.
    pub tier: TierId,
    /// Owning topic.
    pub topic: TopicId,
    /// Display title.
    pub title: String,
    /// Display description.
    pub description: String,
    /// Status derived at evaluation time.
    pub status: Status,
    /// Position of the achievement node.
    pub position: Position,
}
