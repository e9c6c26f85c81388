#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative progression state for the star chart.
//!
//! The [`World`] owns the progression graph. Completion sets are only changed
//! through [`apply`], and readers go through the [`query`] module.

mod document;
mod error;
mod graph;

pub use document::CompletionSnapshot;
pub use error::ValidationError;
pub use graph::{Achievement, AchievementLocation, Graph, Planet, Tier, Topic};

use star_chart_core::{AchievementId, Event, PlanetId};

/// Mutation primitives understood by the world.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Mutation {
    /// Adds an achievement to its planet's completion set.
    ///
    /// Ignored when the planet is unknown, the achievement does not exist on
    /// the planet, or it is already completed.
    MarkCompleted {
        /// Planet owning the achievement.
        planet: PlanetId,
        /// Achievement to record.
        achievement: AchievementId,
    },
    /// Clears the completion set of a planet. Ignored for unknown planets.
    ResetPlanet {
        /// Planet to clear.
        planet: PlanetId,
    },
    /// Swaps the whole graph in one step.
    ReplaceGraph {
        /// Graph that replaces the current one.
        graph: Graph,
    },
}

/// Represents the authoritative star chart state.
#[derive(Debug, Default)]
pub struct World {
    graph: Graph,
    generation: u64,
}

impl World {
    /// Creates a world holding the provided graph.
    #[must_use]
    pub fn with_graph(graph: Graph) -> Self {
        Self {
            graph,
            generation: 0,
        }
    }
}

/// Applies the provided mutation to the world.
///
/// Events are only emitted when the mutation changed state.
pub fn apply(world: &mut World, mutation: Mutation, out_events: &mut Vec<Event>) {
    match mutation {
        Mutation::MarkCompleted {
            planet,
            achievement,
        } => {
            let Some(target) = world.graph.planet_mut(&planet) else {
                return;
            };
            if target.insert_completed(achievement.clone()) {
                out_events.push(Event::AchievementCompleted {
                    planet,
                    achievement,
                });
            }
        }
        Mutation::ResetPlanet { planet } => {
            let Some(target) = world.graph.planet_mut(&planet) else {
                return;
            };
            if target.clear_completed() {
                out_events.push(Event::ProgressReset { planet });
            }
        }
        Mutation::ReplaceGraph { graph } => {
            world.graph = graph;
            world.generation = world.generation.wrapping_add(1);
            out_events.push(Event::GraphReplaced);
        }
    }
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use std::collections::BTreeSet;

    use star_chart_core::{AchievementId, PlanetId};

    use super::{Graph, Planet, World};

    /// Provides read-only access to the whole graph.
    #[must_use]
    pub fn graph(world: &World) -> &Graph {
        &world.graph
    }

    /// Looks up a planet by identifier.
    #[must_use]
    pub fn planet<'world>(world: &'world World, planet: &PlanetId) -> Option<&'world Planet> {
        world.graph.planet(planet)
    }

    /// Planet identifiers in load order.
    #[must_use]
    pub fn planet_ids(world: &World) -> Vec<PlanetId> {
        world
            .graph
            .planets()
            .iter()
            .map(|planet| planet.id().clone())
            .collect()
    }

    /// Load-order index of a planet, if the planet exists.
    #[must_use]
    pub fn planet_index(world: &World, planet: &PlanetId) -> Option<usize> {
        world.graph.planet_index(planet)
    }

    /// Completion set of a planet, if the planet exists.
    #[must_use]
    pub fn completed<'world>(
        world: &'world World,
        planet: &PlanetId,
    ) -> Option<&'world BTreeSet<AchievementId>> {
        world.graph.planet(planet).map(Planet::completed)
    }

    /// Reports whether the planet exists and holds the achievement.
    #[must_use]
    pub fn contains_achievement(
        world: &World,
        planet: &PlanetId,
        achievement: &AchievementId,
    ) -> bool {
        world
            .graph
            .planet(planet)
            .is_some_and(|planet| planet.contains_achievement(achievement))
    }

    /// Identity of the current graph; changes whenever the graph is replaced.
    #[must_use]
    pub fn generation(world: &World) -> u64 {
        world.generation
    }
}
