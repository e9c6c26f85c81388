#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the star chart engine.
//!
//! This crate defines the message surface that connects adapters, the
//! authoritative world, and pure systems. Adapters submit [`Command`] values
//! describing desired progression changes, the progression controller checks
//! them against the unlock rules and mutates the world, and then broadcasts
//! [`Event`] values so renderers and persistence adapters can react. Systems
//! only ever read immutable graph snapshots.

use std::{
    cmp::Ordering,
    fmt,
    hash::{Hash, Hasher},
};

use serde::{Deserialize, Serialize};

mod ids;

pub use ids::{AchievementId, PlanetId, TopicId};

/// Derived progression state of a single achievement.
///
/// Status is never stored; it is recomputed from the completion set on every
/// query.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    /// The owning tier is gated behind an incomplete predecessor.
    Locked,
    /// The achievement may be completed.
    Available,
    /// The achievement is recorded in the planet's completion set.
    Completed,
}

impl Status {
    /// Lowercase label used by adapters when presenting the status.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Locked => "locked",
            Self::Available => "available",
            Self::Completed => "completed",
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Commands that express all permissible progression changes.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Command {
    /// Marks a single available achievement as completed.
    Complete {
        /// Planet owning the achievement.
        planet: PlanetId,
        /// Achievement the player finished.
        achievement: AchievementId,
    },
    /// Completes every achievement of every planet.
    BulkUnlock,
    /// Completes every achievement of a single tier.
    UnlockTier {
        /// Planet owning the tier.
        planet: PlanetId,
        /// Tier whose achievements should all be completed.
        tier: TierId,
    },
    /// Clears completion state for one planet, or for all planets when absent.
    BulkReset {
        /// Planet to reset; `None` resets every planet.
        planet: Option<PlanetId>,
    },
    /// Replaces the whole graph with the provided JSON document.
    ReplaceFromJson {
        /// Raw document in the graph source format.
        payload: String,
    },
}

impl Command {
    /// Reports whether the command belongs to the administrative surface.
    #[must_use]
    pub const fn is_administrative(&self) -> bool {
        !matches!(self, Self::Complete { .. })
    }

    /// Short name of the command used in logs and error messages.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Complete { .. } => "complete",
            Self::BulkUnlock => "bulk unlock",
            Self::UnlockTier { .. } => "tier unlock",
            Self::BulkReset { .. } => "bulk reset",
            Self::ReplaceFromJson { .. } => "graph import",
        }
    }
}

/// Events broadcast after a command has been applied successfully.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Event {
    /// Confirms that an achievement entered the completion set.
    AchievementCompleted {
        /// Planet owning the achievement.
        planet: PlanetId,
        /// Achievement that was completed.
        achievement: AchievementId,
    },
    /// Announces that every achievement of a tier is now completed.
    TierCompleted {
        /// Planet owning the tier.
        planet: PlanetId,
        /// Tier that became complete.
        tier: TierId,
    },
    /// Confirms that a planet's completion set was cleared.
    ProgressReset {
        /// Planet whose completion set is now empty.
        planet: PlanetId,
    },
    /// Confirms that the whole graph was swapped for a new one.
    GraphReplaced,
    /// Asks renderers to re-query status and layout for the given scope.
    RefreshRequested {
        /// Planets whose presentation is stale.
        scope: RefreshScope,
    },
    /// Asks persistence adapters to write the current completion snapshot.
    PersistRequested,
}

/// Planets affected by a successful mutation.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum RefreshScope {
    /// Every planet must be re-queried.
    All,
    /// Only the listed planets changed.
    Planets(Vec<PlanetId>),
}

impl RefreshScope {
    /// Reports whether the scope covers the provided planet.
    #[must_use]
    pub fn includes(&self, planet: &PlanetId) -> bool {
        match self {
            Self::All => true,
            Self::Planets(planets) => planets.contains(planet),
        }
    }
}

/// Reasons a completion request may be rejected.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CompletionRejection {
    /// The achievement is locked or does not exist.
    Locked,
    /// The achievement is already part of the completion set.
    AlreadyCompleted,
}

impl CompletionRejection {
    /// Maps a non-available status onto the matching rejection reason.
    #[must_use]
    pub const fn from_status(status: Status) -> Option<Self> {
        match status {
            Status::Locked => Some(Self::Locked),
            Status::Completed => Some(Self::AlreadyCompleted),
            Status::Available => None,
        }
    }
}

impl fmt::Display for CompletionRejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Locked => write!(f, "achievement is locked"),
            Self::AlreadyCompleted => write!(f, "achievement is already completed"),
        }
    }
}

/// Identifier of a tier within a planet.
///
/// Tiers are ordered by natural order: identifiers are split into runs of
/// ASCII digits and runs of other characters, digit runs compare by numeric
/// value and other runs compare lexicographically, so `tier2 < tier10`.
/// Identifiers whose runs all compare equal (`tier01` and `tier1`) fall back
/// to plain lexicographic order, which keeps the order total and consistent
/// with equality.
#[derive(Clone, Debug, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TierId(String);

impl TierId {
    /// Creates a new tier identifier.
    #[must_use]
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Borrows the identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl PartialEq for TierId {
    fn eq(&self, other: &Self) -> bool {
        self.0 == other.0
    }
}

impl Hash for TierId {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.0.hash(state);
    }
}

impl Ord for TierId {
    fn cmp(&self, other: &Self) -> Ordering {
        natural_cmp(&self.0, &other.0)
    }
}

impl PartialOrd for TierId {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for TierId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for TierId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

fn natural_cmp(left: &str, right: &str) -> Ordering {
    let mut left_runs = Runs { rest: left };
    let mut right_runs = Runs { rest: right };
    loop {
        match (left_runs.next(), right_runs.next()) {
            (None, None) => return left.cmp(right),
            (None, Some(_)) => return Ordering::Less,
            (Some(_), None) => return Ordering::Greater,
            (Some(a), Some(b)) => {
                let ordering = compare_runs(a, b);
                if ordering != Ordering::Equal {
                    return ordering;
                }
            }
        }
    }
}

fn compare_runs(left: &str, right: &str) -> Ordering {
    let numeric = |run: &str| run.bytes().all(|byte| byte.is_ascii_digit());
    if !(numeric(left) && numeric(right)) {
        return left.cmp(right);
    }

    // Compares arbitrarily long digit runs without parsing them.
    let left = left.trim_start_matches('0');
    let right = right.trim_start_matches('0');
    left.len().cmp(&right.len()).then_with(|| left.cmp(right))
}

struct Runs<'a> {
    rest: &'a str,
}

impl<'a> Iterator for Runs<'a> {
    type Item = &'a str;

    fn next(&mut self) -> Option<&'a str> {
        let first = self.rest.chars().next()?;
        let digit = first.is_ascii_digit();
        let end = self
            .rest
            .find(|c: char| c.is_ascii_digit() != digit)
            .unwrap_or(self.rest.len());
        let (run, rest) = self.rest.split_at(end);
        self.rest = rest;
        Some(run)
    }
}

/// Point in the chart's layout plane.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Position {
    /// Horizontal coordinate; grows to the right.
    pub x: f64,
    /// Vertical coordinate; grows downwards like screen space.
    pub y: f64,
}

impl Position {
    /// Creates a new position.
    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Returns the point `radius` units away from `self` along `angle` radians.
    #[must_use]
    pub fn offset(self, radius: f64, angle: f64) -> Self {
        Self {
            x: self.x + radius * angle.cos(),
            y: self.y + radius * angle.sin(),
        }
    }

    /// Euclidean distance between two positions.
    #[must_use]
    pub fn distance(self, other: Self) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }

    /// Midpoint of the segment joining two positions.
    #[must_use]
    pub fn midpoint(self, other: Self) -> Self {
        Self {
            x: (self.x + other.x) / 2.0,
            y: (self.y + other.y) / 2.0,
        }
    }
}
