#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Progression controller for the star chart.
//!
//! [`Progression`] accepts [`Command`] values, checks them against the unlock
//! rules, mutates the world, refreshes its cached [`ChartSnapshot`] and then
//! reports what happened as [`Event`] values. Renderers read the snapshot;
//! persistence adapters react to [`Event::PersistRequested`] by calling
//! [`Progression::persist`].
//!
//! A render pass borrows the controller immutably, so no command can swap the
//! graph while positions and statuses are being read.

mod auth;
mod error;
mod snapshot;
mod store;

pub use auth::{AdminCapability, AllowAll, Authorizer, Deny};
pub use error::ProgressionError;
pub use snapshot::{AchievementView, ChartSnapshot, PlanetView};
pub use store::{MemoryStore, SnapshotStore, StoreError};

use std::collections::BTreeSet;

use star_chart_core::{
    AchievementId, Command, CompletionRejection, Event, PlanetId, RefreshScope, Status, TierId,
};
use star_chart_system_layout::GeometryConfig;
use star_chart_system_unlock as unlock;
use star_chart_world::{apply, query, CompletionSnapshot, Graph, Mutation, World};
use tracing::{debug, info, warn};

/// Orchestrates commands over the authoritative world.
#[derive(Debug)]
pub struct Progression {
    world: World,
    config: GeometryConfig,
    authorizer: Box<dyn Authorizer>,
    snapshot: ChartSnapshot,
}

impl Progression {
    /// Creates a controller over the provided graph.
    ///
    /// Every command is permitted until [`Progression::with_authorizer`]
    /// installs a stricter policy.
    #[must_use]
    pub fn new(graph: Graph, config: GeometryConfig) -> Self {
        let world = World::with_graph(graph);
        let snapshot = ChartSnapshot::capture(&world, &config);
        Self {
            world,
            config,
            authorizer: Box::new(AllowAll),
            snapshot,
        }
    }

    /// Builds the startup state from a graph source and a persisted snapshot.
    ///
    /// A malformed source yields the empty graph. A stored snapshot replaces
    /// the completion sets of the planets it names; an unreadable or malformed
    /// snapshot is skipped.
    #[must_use]
    pub fn load(source: &str, store: &dyn SnapshotStore, config: GeometryConfig) -> Self {
        let graph = Graph::from_json_or_empty(source);
        let graph = match store.read() {
            Ok(Some(contents)) => match CompletionSnapshot::parse(&contents) {
                Ok(snapshot) => {
                    debug!(planets = snapshot.len(), "restoring completion snapshot");
                    graph.with_snapshot(&snapshot)
                }
                Err(error) => {
                    warn!(%error, "ignoring malformed completion snapshot");
                    graph
                }
            },
            Ok(None) => graph,
            Err(error) => {
                warn!(%error, "ignoring unreadable completion snapshot");
                graph
            }
        };
        Self::new(graph, config)
    }

    /// Replaces the authorization policy for administrative commands.
    #[must_use]
    pub fn with_authorizer(mut self, authorizer: impl Authorizer + 'static) -> Self {
        self.authorizer = Box::new(authorizer);
        self
    }

    /// Read-only access to the authoritative world.
    #[must_use]
    pub fn world(&self) -> &World {
        &self.world
    }

    /// Geometry used for layout.
    #[must_use]
    pub fn config(&self) -> &GeometryConfig {
        &self.config
    }

    /// Last evaluated statuses and positions.
    #[must_use]
    pub fn snapshot(&self) -> &ChartSnapshot {
        &self.snapshot
    }

    /// Last evaluated view of a single planet.
    #[must_use]
    pub fn planet_view(&self, planet: &PlanetId) -> Option<&PlanetView> {
        self.snapshot.planet(planet)
    }

    /// Derives the current status of an achievement.
    #[must_use]
    pub fn status(&self, planet: &PlanetId, achievement: &AchievementId) -> Status {
        unlock::graph::achievement_status(query::graph(&self.world), planet, achievement)
    }

    /// Executes a command.
    ///
    /// On success the world events are followed by
    /// [`Event::RefreshRequested`] and [`Event::PersistRequested`]. On failure
    /// nothing is emitted and neither the world nor the snapshot changes.
    pub fn execute(
        &mut self,
        command: Command,
        out_events: &mut Vec<Event>,
    ) -> Result<(), ProgressionError> {
        let action = command.name();
        if !self.authorizer.permits(&command) {
            warn!(action, "refused administrative command");
            return Err(ProgressionError::Unauthorized { action });
        }

        let mut events = Vec::new();
        let scope = match command {
            Command::Complete {
                planet,
                achievement,
            } => self.complete(planet, achievement, &mut events)?,
            Command::BulkUnlock => self.unlock_all(&mut events),
            Command::UnlockTier { planet, tier } => self.unlock_tier(planet, &tier, &mut events),
            Command::BulkReset { planet } => self.reset(planet, &mut events),
            Command::ReplaceFromJson { payload } => self.replace(&payload, &mut events)?,
        };

        self.snapshot.refresh(&self.world, &self.config, &scope);
        info!(action, changes = events.len(), "command applied");

        out_events.append(&mut events);
        out_events.push(Event::RefreshRequested { scope });
        out_events.push(Event::PersistRequested);
        Ok(())
    }

    /// Writes the minimal completion snapshot to the store.
    ///
    /// A failed write is reported but the in-memory state stays as it is.
    pub fn persist(&self, store: &mut dyn SnapshotStore) -> Result<(), ProgressionError> {
        let contents = query::graph(&self.world).completion_snapshot().to_json()?;
        store.write(&contents)?;
        debug!(bytes = contents.len(), "completion snapshot written");
        Ok(())
    }

    /// Exports the whole graph, including completion sets, in the source format.
    pub fn export(&self) -> Result<String, ProgressionError> {
        Ok(query::graph(&self.world).to_json_pretty()?)
    }

    fn complete(
        &mut self,
        planet: PlanetId,
        achievement: AchievementId,
        events: &mut Vec<Event>,
    ) -> Result<RefreshScope, ProgressionError> {
        let status = self.status(&planet, &achievement);
        if let Some(reason) = CompletionRejection::from_status(status) {
            debug!(%planet, %achievement, %reason, "completion rejected");
            return Err(ProgressionError::Precondition {
                planet,
                achievement,
                reason,
            });
        }

        self.mark_completed(&planet, vec![achievement], events);
        Ok(RefreshScope::Planets(vec![planet]))
    }

    fn unlock_all(&mut self, events: &mut Vec<Event>) -> RefreshScope {
        for planet in query::planet_ids(&self.world) {
            let achievements = query::planet(&self.world, &planet)
                .map(|found| found.achievements().map(|a| a.id().clone()).collect())
                .unwrap_or_default();
            self.mark_completed(&planet, achievements, events);
        }
        RefreshScope::All
    }

    fn unlock_tier(
        &mut self,
        planet: PlanetId,
        tier: &TierId,
        events: &mut Vec<Event>,
    ) -> RefreshScope {
        let achievements: Vec<AchievementId> = query::planet(&self.world, &planet)
            .and_then(|found| found.tier(tier))
            .map(|found| found.achievements().map(|a| a.id().clone()).collect())
            .unwrap_or_default();
        if achievements.is_empty() {
            debug!(%planet, %tier, "tier unlock matched nothing");
        }
        self.mark_completed(&planet, achievements, events);
        RefreshScope::Planets(vec![planet])
    }

    fn reset(&mut self, planet: Option<PlanetId>, events: &mut Vec<Event>) -> RefreshScope {
        match planet {
            Some(planet) => {
                apply(
                    &mut self.world,
                    Mutation::ResetPlanet {
                        planet: planet.clone(),
                    },
                    events,
                );
                RefreshScope::Planets(vec![planet])
            }
            None => {
                for planet in query::planet_ids(&self.world) {
                    apply(&mut self.world, Mutation::ResetPlanet { planet }, events);
                }
                RefreshScope::All
            }
        }
    }

    fn replace(
        &mut self,
        payload: &str,
        events: &mut Vec<Event>,
    ) -> Result<RefreshScope, ProgressionError> {
        let graph = Graph::from_json(payload).map_err(|error| {
            warn!(%error, "graph import rejected");
            error
        })?;
        info!(planets = graph.len(), "replacing graph");
        apply(&mut self.world, Mutation::ReplaceGraph { graph }, events);
        Ok(RefreshScope::All)
    }

    /// Records completions and reports every tier they finished.
    fn mark_completed(
        &mut self,
        planet: &PlanetId,
        achievements: Vec<AchievementId>,
        events: &mut Vec<Event>,
    ) {
        let open_tiers: BTreeSet<TierId> = query::planet(&self.world, planet)
            .map(|found| {
                unlock::tier_order(found)
                    .filter(|tier| !unlock::tier_completed(found, tier))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default();

        for achievement in achievements {
            apply(
                &mut self.world,
                Mutation::MarkCompleted {
                    planet: planet.clone(),
                    achievement,
                },
                events,
            );
        }

        let Some(found) = query::planet(&self.world, planet) else {
            return;
        };
        for tier in open_tiers {
            if unlock::tier_completed(found, &tier) {
                events.push(Event::TierCompleted {
                    planet: planet.clone(),
                    tier,
                });
            }
        }
    }
}
