#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Shared rendering contracts for star chart adapters.
//!
//! A [`Scene`] is a flat, backend-agnostic description of one render pass,
//! built from the controller's [`ChartSnapshot`]. Backends only draw what the
//! scene says and never evaluate unlock rules themselves.

use anyhow::Result as AnyResult;
use glam::Vec2;
use star_chart_core::{AchievementId, PlanetId, Position, RefreshScope, Status, TierId, TopicId};
use star_chart_system_layout::GeometryConfig;
use star_chart_system_progression::{ChartSnapshot, PlanetView};

/// Vertical lift applied to the control point of branch curves.
pub const BRANCH_CURVE_LIFT: f32 = 20.0;

/// RGBA color used when presenting scenes.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Color {
    /// Red channel intensity in the range 0.0..=1.0.
    pub red: f32,
    /// Green channel intensity in the range 0.0..=1.0.
    pub green: f32,
    /// Blue channel intensity in the range 0.0..=1.0.
    pub blue: f32,
    /// Alpha channel intensity in the range 0.0..=1.0.
    pub alpha: f32,
}

impl Color {
    /// Creates a new color from floating point channels.
    #[must_use]
    pub const fn new(red: f32, green: f32, blue: f32, alpha: f32) -> Self {
        Self {
            red,
            green,
            blue,
            alpha,
        }
    }

    /// Creates an opaque color from byte RGB values.
    #[must_use]
    pub const fn from_rgb_u8(red: u8, green: u8, blue: u8) -> Self {
        Self {
            red: red as f32 / 255.0,
            green: green as f32 / 255.0,
            blue: blue as f32 / 255.0,
            alpha: 1.0,
        }
    }

    /// Returns the color with a different alpha channel.
    #[must_use]
    pub const fn with_alpha(self, alpha: f32) -> Self {
        Self { alpha, ..self }
    }
}

/// Colors assigned to each achievement status.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Palette {
    /// Background behind the chart.
    pub background: Color,
    /// Nodes and branches that cannot be completed yet.
    pub locked: Color,
    /// Nodes that may be completed now.
    pub available: Color,
    /// Completed nodes.
    pub completed: Color,
}

impl Palette {
    /// Color used for a status.
    #[must_use]
    pub const fn status(&self, status: Status) -> Color {
        match status {
            Status::Locked => self.locked,
            Status::Available => self.available,
            Status::Completed => self.completed,
        }
    }

    /// Color used for a gate that is open or closed.
    #[must_use]
    pub const fn gate(&self, unlocked: bool) -> Color {
        if unlocked {
            self.available
        } else {
            self.locked
        }
    }
}

impl Default for Palette {
    fn default() -> Self {
        Self {
            background: Color::from_rgb_u8(5, 8, 22),
            locked: Color::from_rgb_u8(90, 90, 110).with_alpha(0.6),
            available: Color::from_rgb_u8(120, 200, 255),
            completed: Color::from_rgb_u8(255, 215, 90),
        }
    }
}

/// Sprite drawn for a node.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum NodeIcon {
    /// Padlock over a locked achievement.
    Lock,
    /// Regular achievement node.
    Node,
    /// Gate between two tiers.
    Junction,
}

/// What a scene node stands for.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum NodeKind {
    /// An achievement with its derived status.
    Achievement {
        /// Achievement identifier.
        id: AchievementId,
        /// Display title.
        title: String,
        /// Status at evaluation time.
        status: Status,
    },
    /// The gate from one tier to the next on a branch.
    Junction {
        /// Tier the gate leads out of.
        from: TierId,
        /// Tier the gate leads into.
        to: TierId,
        /// Whether the tier behind the gate is unlocked.
        unlocked: bool,
    },
}

/// Planet body drawn on the orbit ring.
#[derive(Clone, Debug, PartialEq)]
pub struct ScenePlanet {
    /// Planet identifier.
    pub id: PlanetId,
    /// Upper-cased display label.
    pub label: String,
    /// Centre of the planet in world units.
    pub center: Vec2,
    /// Edge length of the square the planet sprite is drawn into.
    pub size: f32,
    /// Completed achievements on the planet.
    pub completed: usize,
    /// Achievements on the planet.
    pub total: usize,
}

impl ScenePlanet {
    /// Top-left and bottom-right corners of the planet sprite.
    #[must_use]
    pub fn bounds(&self) -> (Vec2, Vec2) {
        let half = Vec2::splat(self.size / 2.0);
        (self.center - half, self.center + half)
    }
}

/// Quadratic curve from a planet to the tip of one of its branches.
#[derive(Clone, Debug, PartialEq)]
pub struct SceneBranch {
    /// Planet the branch grows from.
    pub planet: PlanetId,
    /// Tier of the branch.
    pub tier: TierId,
    /// Topic of the branch.
    pub topic: TopicId,
    /// Curve start at the planet centre.
    pub start: Vec2,
    /// Curve control point.
    pub control: Vec2,
    /// Curve end at the branch tip.
    pub end: Vec2,
    /// Stroke color.
    pub color: Color,
}

impl SceneBranch {
    /// Point on the curve for `t` in `0.0..=1.0`.
    #[must_use]
    pub fn point_at(&self, t: f32) -> Vec2 {
        let t = t.clamp(0.0, 1.0);
        let inverse = 1.0 - t;
        self.start * inverse * inverse + self.control * 2.0 * inverse * t + self.end * t * t
    }
}

/// Achievement or junction node.
#[derive(Clone, Debug, PartialEq)]
pub struct SceneNode {
    /// Planet the node belongs to.
    pub planet: PlanetId,
    /// What the node stands for.
    pub kind: NodeKind,
    /// Node centre in world units.
    pub position: Vec2,
    /// Sprite to draw.
    pub icon: NodeIcon,
    /// Tint applied to the sprite.
    pub color: Color,
    /// Whether the node should pulse to draw attention.
    pub pulse: bool,
}

/// Tier marker orbiting a planet.
#[derive(Clone, Debug, PartialEq)]
pub struct SceneSatellite {
    /// Planet the satellite orbits.
    pub planet: PlanetId,
    /// Tier represented by the satellite.
    pub tier: TierId,
    /// Satellite centre in world units.
    pub position: Vec2,
    /// Tint reflecting whether the tier is unlocked.
    pub color: Color,
}

/// Everything a backend needs to draw one frame of the chart.
#[derive(Clone, Debug, PartialEq)]
pub struct Scene {
    /// Clear color.
    pub background: Color,
    /// Centre of the planet ring.
    pub center: Vec2,
    /// Planet bodies in load order.
    pub planets: Vec<ScenePlanet>,
    /// Branch curves, drawn below nodes.
    pub branches: Vec<SceneBranch>,
    /// Tier satellites.
    pub satellites: Vec<SceneSatellite>,
    /// Achievement and junction nodes.
    pub nodes: Vec<SceneNode>,
}

impl Scene {
    /// Builds a scene from a controller snapshot using the default palette.
    #[must_use]
    pub fn from_snapshot(snapshot: &ChartSnapshot, config: &GeometryConfig) -> Self {
        Self::with_palette(snapshot, config, &Palette::default())
    }

    /// Builds a scene from a controller snapshot.
    #[must_use]
    pub fn with_palette(
        snapshot: &ChartSnapshot,
        config: &GeometryConfig,
        palette: &Palette,
    ) -> Self {
        let mut scene = Self {
            background: palette.background,
            center: to_vec2(snapshot.center()),
            planets: Vec::new(),
            branches: Vec::new(),
            satellites: Vec::new(),
            nodes: Vec::new(),
        };
        for view in snapshot.planets() {
            scene.push_planet(view, config, palette);
        }
        scene
    }

    /// Drops everything outside the refresh scope.
    pub fn retain(&mut self, scope: &RefreshScope) {
        self.planets.retain(|planet| scope.includes(&planet.id));
        self.branches.retain(|branch| scope.includes(&branch.planet));
        self.satellites
            .retain(|satellite| scope.includes(&satellite.planet));
        self.nodes.retain(|node| scope.includes(&node.planet));
    }

    /// Number of nodes that can be completed right now.
    #[must_use]
    pub fn available_count(&self) -> usize {
        self.nodes.iter().filter(|node| node.pulse).count()
    }

    fn push_planet(&mut self, view: &PlanetView, config: &GeometryConfig, palette: &Palette) {
        let layout = &view.layout;
        let center = to_vec2(layout.center);

        self.planets.push(ScenePlanet {
            id: layout.planet.clone(),
            label: planet_label(&layout.planet),
            center,
            size: config.planet_size as f32,
            completed: view.completed_count(),
            total: view.total_count(),
        });

        for branch in &layout.branches {
            let end = to_vec2(branch.endpoint);
            let midpoint = to_vec2(layout.center.midpoint(branch.endpoint));
            let unlocked = view
                .tiers
                .iter()
                .any(|tier| tier.tier == branch.tier && tier.unlocked);
            self.branches.push(SceneBranch {
                planet: layout.planet.clone(),
                tier: branch.tier.clone(),
                topic: branch.topic.clone(),
                start: center,
                control: midpoint - Vec2::new(0.0, BRANCH_CURVE_LIFT),
                end,
                color: palette.gate(unlocked),
            });
        }

        for satellite in &layout.satellites {
            self.satellites.push(SceneSatellite {
                planet: layout.planet.clone(),
                tier: satellite.tier.clone(),
                position: to_vec2(satellite.position),
                color: palette.gate(satellite.unlocked),
            });
        }

        for achievement in &view.achievements {
            let icon = match achievement.status {
                Status::Locked => NodeIcon::Lock,
                Status::Available | Status::Completed => NodeIcon::Node,
            };
            self.nodes.push(SceneNode {
                planet: layout.planet.clone(),
                kind: NodeKind::Achievement {
                    id: achievement.achievement.clone(),
                    title: achievement.title.clone(),
                    status: achievement.status,
                },
                position: to_vec2(achievement.position),
                icon,
                color: palette.status(achievement.status),
                pulse: achievement.status == Status::Available,
            });
        }

        for junction in &layout.junctions {
            self.nodes.push(SceneNode {
                planet: layout.planet.clone(),
                kind: NodeKind::Junction {
                    from: junction.from_tier.clone(),
                    to: junction.to_tier.clone(),
                    unlocked: junction.unlocked,
                },
                position: to_vec2(junction.position),
                icon: NodeIcon::Junction,
                color: palette.gate(junction.unlocked),
                pulse: false,
            });
        }
    }
}

/// Display label of a planet: upper-cased with the first hyphen turned into a space.
#[must_use]
pub fn planet_label(planet: &PlanetId) -> String {
    planet.as_str().to_uppercase().replacen('-', " ", 1)
}

fn to_vec2(position: Position) -> Vec2 {
    Vec2::new(position.x as f32, position.y as f32)
}

/// Rendering backend capable of presenting star chart scenes.
pub trait RenderingBackend {
    /// Presents a fully built scene.
    fn present(&mut self, scene: &Scene) -> AnyResult<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn planet_label_matches_display_convention() {
        assert_eq!(planet_label(&"web-dev".into()), "WEB DEV");
        assert_eq!(planet_label(&"a-b-c".into()), "A B-C");
        assert_eq!(planet_label(&"mars".into()), "MARS");
    }

    #[test]
    fn with_alpha_keeps_channels() {
        let color = Color::from_rgb_u8(255, 0, 255).with_alpha(0.25);

        assert_eq!(color, Color::new(1.0, 0.0, 1.0, 0.25));
    }

    #[test]
    fn branch_curve_passes_through_its_ends() {
        let branch = SceneBranch {
            planet: "p".into(),
            tier: "t1".into(),
            topic: "x".into(),
            start: Vec2::ZERO,
            control: Vec2::new(50.0, -20.0),
            end: Vec2::new(100.0, 0.0),
            color: Palette::default().available,
        };

        assert_eq!(branch.point_at(0.0), Vec2::ZERO);
        assert_eq!(branch.point_at(1.0), Vec2::new(100.0, 0.0));
        assert_eq!(branch.point_at(0.5), Vec2::new(50.0, -10.0));
    }

    #[test]
    fn palette_maps_each_status() {
        let palette = Palette::default();

        assert_eq!(palette.status(Status::Locked), palette.locked);
        assert_eq!(palette.status(Status::Completed), palette.completed);
        assert_eq!(palette.gate(true), palette.available);
    }
}
