#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Deterministic radial layout of the progression graph.
//!
//! Planets sit on a ring around a shared centre. Around each planet, every
//! tier forms a concentric band of topic branches whose radius grows with the
//! tier index, achievements fan out along their topic's branch, and junction
//! nodes mark the gate towards the next tier. Every coordinate is a pure
//! function of the graph shape, the indices involved and the
//! [`GeometryConfig`], so repeated runs reproduce identical positions.

use std::f64::consts::{FRAC_PI_2, TAU};

use star_chart_core::{AchievementId, PlanetId, Position, TierId, TopicId};
use star_chart_system_unlock::tier_unlocked;
use star_chart_world::{Graph, Planet};

mod config;

pub use config::{ConfigError, GeometryConfig};

/// Positions for the whole chart.
#[derive(Clone, Debug, PartialEq)]
pub struct ChartLayout {
    /// Centre of the planet ring.
    pub center: Position,
    /// Planet layouts in load order.
    pub planets: Vec<PlanetLayout>,
}

impl ChartLayout {
    /// Looks up the layout of a planet.
    #[must_use]
    pub fn planet(&self, planet: &PlanetId) -> Option<&PlanetLayout> {
        self.planets.iter().find(|layout| &layout.planet == planet)
    }
}

/// Positions for a single planet and everything anchored to it.
#[derive(Clone, Debug, PartialEq)]
pub struct PlanetLayout {
    /// Planet described by the layout.
    pub planet: PlanetId,
    /// Load-order index of the planet on the ring.
    pub index: usize,
    /// Angle of the planet around the ring centre, in radians.
    pub angle: f64,
    /// Position of the planet.
    pub center: Position,
    /// Tier satellites orbiting the planet.
    pub satellites: Vec<TierSatellite>,
    /// Topic branches in tier order, then topic order.
    pub branches: Vec<BranchLayout>,
    /// Achievement nodes in tier, topic and achievement order.
    pub achievements: Vec<AchievementNode>,
    /// Junctions leading to the next tier.
    pub junctions: Vec<JunctionNode>,
}

impl PlanetLayout {
    /// Looks up the node of an achievement.
    #[must_use]
    pub fn achievement(&self, achievement: &AchievementId) -> Option<&AchievementNode> {
        self.achievements
            .iter()
            .find(|node| &node.achievement == achievement)
    }
}

/// Small body representing a tier next to its planet.
#[derive(Clone, Debug, PartialEq)]
pub struct TierSatellite {
    /// Tier represented by the satellite.
    pub tier: TierId,
    /// Index of the tier in tier order.
    pub tier_index: usize,
    /// Angle around the planet, in radians.
    pub angle: f64,
    /// Position of the satellite.
    pub position: Position,
    /// Whether the tier is unlocked.
    pub unlocked: bool,
}

/// Branch joining a planet to one of its topic clusters.
#[derive(Clone, Debug, PartialEq)]
pub struct BranchLayout {
    /// Tier owning the topic.
    pub tier: TierId,
    /// Topic the branch leads to.
    pub topic: TopicId,
    /// Index of the tier in tier order.
    pub tier_index: usize,
    /// Index of the topic within its tier.
    pub topic_index: usize,
    /// Direction of the branch, in radians.
    pub angle: f64,
    /// Length of the branch.
    pub radius: f64,
    /// Far end of the branch.
    pub endpoint: Position,
}

/// Placed achievement.
#[derive(Clone, Debug, PartialEq)]
pub struct AchievementNode {
    /// Achievement represented by the node.
    pub achievement: AchievementId,
    /// Tier owning the achievement.
    pub tier: TierId,
    /// Topic owning the achievement.
    pub topic: TopicId,
    /// Angle around the planet, in radians.
    pub angle: f64,
    /// Distance from the planet.
    pub radius: f64,
    /// Position of the node.
    pub position: Position,
}

/// Gate between a tier and the next one, placed on a topic branch.
#[derive(Clone, Debug, PartialEq)]
pub struct JunctionNode {
    /// Tier the junction starts from.
    pub from_tier: TierId,
    /// Tier the junction leads to.
    pub to_tier: TierId,
    /// Topic branch carrying the junction.
    pub topic: TopicId,
    /// Angle around the planet, in radians.
    pub angle: f64,
    /// Distance from the planet.
    pub radius: f64,
    /// Position of the node.
    pub position: Position,
    /// Whether the tier the junction leads to is unlocked.
    pub unlocked: bool,
}

/// Angle of planet `index` on a ring of `count` planets.
///
/// The first planet sits straight above the centre and the rest follow
/// clockwise in screen space, `2π / count` apart.
#[must_use]
pub fn planet_angle(index: usize, count: usize) -> f64 {
    if count == 0 {
        return -FRAC_PI_2;
    }
    (index as f64 / count as f64) * TAU - FRAC_PI_2
}

/// Lays out every planet of the graph.
#[must_use]
pub fn layout_chart(graph: &Graph, config: &GeometryConfig) -> ChartLayout {
    let count = graph.len();
    ChartLayout {
        center: config.center,
        planets: graph
            .planets()
            .iter()
            .enumerate()
            .map(|(index, planet)| layout_planet(planet, index, count, config))
            .collect(),
    }
}

/// Lays out one planet placed at `index` on a ring of `count` planets.
#[must_use]
pub fn layout_planet(
    planet: &Planet,
    index: usize,
    count: usize,
    config: &GeometryConfig,
) -> PlanetLayout {
    let angle = planet_angle(index, count);
    let center = config.center.offset(config.orbit_radius, angle);

    let satellites = planet
        .tiers()
        .iter()
        .take(config.max_satellites)
        .enumerate()
        .map(|(tier_index, tier)| {
            let satellite_angle = angle + (tier_index as f64 - 2.0) * config.tier_perturbation;
            TierSatellite {
                tier: tier.id().clone(),
                tier_index,
                angle: satellite_angle,
                position: center.offset(config.satellite_radius, satellite_angle),
                unlocked: tier_unlocked(planet, tier.id()),
            }
        })
        .collect();

    let mut branches = Vec::new();
    let mut achievements = Vec::new();
    let mut junctions = Vec::new();
    let tiers = planet.tiers();

    for (tier_index, tier) in tiers.iter().enumerate() {
        let branch_radius =
            config.branch_base_radius + tier_index as f64 * config.branch_radius_step;
        let topic_count = tier.topics().len();
        let next_tier = tiers.get(tier_index + 1);
        let next_unlocked = next_tier.is_some_and(|next| tier_unlocked(planet, next.id()));

        for (topic_index, topic) in tier.topics().iter().enumerate() {
            let branch_angle = (topic_index as f64 / topic_count as f64) * TAU;
            branches.push(BranchLayout {
                tier: tier.id().clone(),
                topic: topic.id().clone(),
                tier_index,
                topic_index,
                angle: branch_angle,
                radius: branch_radius,
                endpoint: center.offset(branch_radius, branch_angle),
            });

            let node_count = topic.achievements().len() as f64;
            for (node_index, achievement) in topic.achievements().iter().enumerate() {
                let node_angle =
                    branch_angle + (node_index as f64 - node_count / 2.0) * config.angular_spread;
                // Odd nodes step outwards so neighbours on one branch never coincide.
                let node_radius = branch_radius + (node_index % 2) as f64 * config.radial_jitter;
                achievements.push(AchievementNode {
                    achievement: achievement.id().clone(),
                    tier: tier.id().clone(),
                    topic: topic.id().clone(),
                    angle: node_angle,
                    radius: node_radius,
                    position: center.offset(node_radius, node_angle),
                });
            }

            if let Some(next) = next_tier {
                let junction_radius = branch_radius + config.junction_offset;
                junctions.push(JunctionNode {
                    from_tier: tier.id().clone(),
                    to_tier: next.id().clone(),
                    topic: topic.id().clone(),
                    angle: branch_angle,
                    radius: junction_radius,
                    position: center.offset(junction_radius, branch_angle),
                    unlocked: next_unlocked,
                });
            }
        }
    }

    PlanetLayout {
        planet: planet.id().clone(),
        index,
        angle,
        center,
        satellites,
        branches,
        achievements,
        junctions,
    }
}
