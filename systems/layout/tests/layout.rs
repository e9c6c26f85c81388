use std::f64::consts::{PI, TAU};

use serde_json::json;
use star_chart_core::{AchievementId, PlanetId, Position};
use star_chart_system_layout::{layout_chart, layout_planet, GeometryConfig};
use star_chart_world::{Achievement, Graph, Planet, Tier, Topic};

const EPSILON: f64 = 1e-9;

fn ring(count: usize) -> Graph {
    let planets = (0..count)
        .map(|index| Planet::new(format!("p{index}").as_str(), Vec::new(), Vec::new()))
        .collect();
    Graph::from_planets(planets).expect("ring graph")
}

fn branching_planet(completed: &[&str]) -> Planet {
    let topic = |id: &str, achievements: &[&str]| {
        Topic::new(
            id,
            achievements
                .iter()
                .map(|achievement| Achievement::new(*achievement, "", ""))
                .collect(),
        )
    };
    Planet::new(
        "earth",
        vec![
            Tier::new(
                "tier1",
                vec![
                    topic("combat", &["a1", "a2", "a3"]),
                    topic("travel", &["a4"]),
                    topic("lore", &["a5", "a6"]),
                    topic("craft", &[]),
                ],
            ),
            Tier::new("tier2", vec![topic("deep", &["b1", "b2"])]),
            Tier::new("tier3", vec![topic("end", &["c1"]), topic("epilogue", &["c2"])]),
        ],
        completed.iter().copied().map(AchievementId::from),
    )
}

fn normalized(angle: f64) -> f64 {
    angle.rem_euclid(TAU)
}

#[test]
fn consecutive_planets_are_evenly_spaced() {
    let config = GeometryConfig::default();
    for count in 1..=12 {
        let layout = layout_chart(&ring(count), &config);
        let step = TAU / count as f64;

        for index in 0..count {
            let current = &layout.planets[index];
            let next = &layout.planets[(index + 1) % count];
            let separation = normalized(next.angle - current.angle);
            let expected = if count == 1 { 0.0 } else { step };
            assert!(
                (separation - expected).abs() < EPSILON,
                "count {count}, index {index}: {separation} != {expected}"
            );
            assert!(
                (current.center.distance(config.center) - config.orbit_radius).abs() < EPSILON
            );
        }

        for (index, planet) in layout.planets.iter().enumerate() {
            for other in &layout.planets[index + 1..] {
                assert!(planet.center.distance(other.center) > 1.0, "planets overlap");
            }
        }
    }
}

#[test]
fn first_planet_sits_above_the_centre() {
    let config = GeometryConfig {
        center: Position::new(500.0, 400.0),
        ..GeometryConfig::default()
    };
    let layout = layout_chart(&ring(5), &config);
    let top = layout.planets[0].center;
    assert!((top.x - 500.0).abs() < EPSILON);
    assert!((top.y - 100.0).abs() < EPSILON);
}

#[test]
fn tiers_form_concentric_bands() {
    let config = GeometryConfig::default();
    let layout = layout_planet(&branching_planet(&[]), 0, 1, &config);

    for branch in &layout.branches {
        let expected =
            config.branch_base_radius + branch.tier_index as f64 * config.branch_radius_step;
        assert_eq!(branch.radius, expected);
        assert!((branch.endpoint.distance(layout.center) - expected).abs() < EPSILON);
    }

    let tier1: Vec<f64> = layout
        .branches
        .iter()
        .filter(|branch| branch.tier_index == 0)
        .map(|branch| branch.angle)
        .collect();
    assert_angles(&tier1, &[0.0, PI / 2.0, PI, 3.0 * PI / 2.0]);

    let tier3: Vec<f64> = layout
        .branches
        .iter()
        .filter(|branch| branch.tier_index == 2)
        .map(|branch| branch.angle)
        .collect();
    assert_angles(&tier3, &[0.0, PI]);
}

fn assert_angles(actual: &[f64], expected: &[f64]) {
    assert_eq!(actual.len(), expected.len());
    for (actual, expected) in actual.iter().zip(expected) {
        assert!((actual - expected).abs() < EPSILON, "{actual} != {expected}");
    }
}

#[test]
fn achievements_fan_out_with_alternating_jitter() {
    let config = GeometryConfig::default();
    let layout = layout_planet(&branching_planet(&[]), 0, 1, &config);

    let combat: Vec<_> = layout
        .achievements
        .iter()
        .filter(|node| node.topic.as_str() == "combat")
        .collect();
    assert_eq!(combat.len(), 3);

    let radii: Vec<f64> = combat.iter().map(|node| node.radius).collect();
    assert_eq!(radii, vec![80.0, 95.0, 80.0]);

    let angles: Vec<f64> = combat.iter().map(|node| node.angle).collect();
    for (index, angle) in angles.iter().enumerate() {
        let expected = (index as f64 - 1.5) * config.angular_spread;
        assert!((angle - expected).abs() < EPSILON);
    }

    for (index, node) in layout.achievements.iter().enumerate() {
        for other in &layout.achievements[index + 1..] {
            if node.topic == other.topic {
                assert!(node.position.distance(other.position) > 1.0, "nodes overlap");
            }
        }
    }
    assert_eq!(layout.achievements.len(), 10);
}

#[test]
fn junctions_lead_to_the_next_tier() {
    let config = GeometryConfig::default();
    let locked = layout_planet(&branching_planet(&[]), 0, 1, &config);

    // Four topics in tier1, one in tier2, none after the last tier.
    assert_eq!(locked.junctions.len(), 5);
    assert!(locked.junctions.iter().all(|junction| !junction.unlocked));
    let first = &locked.junctions[0];
    assert_eq!(first.from_tier.as_str(), "tier1");
    assert_eq!(first.to_tier.as_str(), "tier2");
    assert_eq!(first.radius, config.branch_base_radius + config.junction_offset);

    let tier1_done = layout_planet(
        &branching_planet(&["a1", "a2", "a3", "a4", "a5", "a6"]),
        0,
        1,
        &config,
    );
    let unlocked: Vec<bool> = tier1_done.junctions.iter().map(|j| j.unlocked).collect();
    assert_eq!(unlocked, vec![true, true, true, true, false]);
}

#[test]
fn satellites_follow_tier_order() {
    let config = GeometryConfig {
        max_satellites: 2,
        ..GeometryConfig::default()
    };
    let layout = layout_planet(&branching_planet(&[]), 0, 1, &config);

    assert_eq!(layout.satellites.len(), 2);
    assert_eq!(layout.satellites[0].tier.as_str(), "tier1");
    assert!(layout.satellites[0].unlocked);
    assert!(!layout.satellites[1].unlocked);
    let expected = layout.angle - 2.0 * config.tier_perturbation;
    assert!((layout.satellites[0].angle - expected).abs() < EPSILON);
    assert!(
        (layout.satellites[1].position.distance(layout.center) - config.satellite_radius).abs()
            < EPSILON
    );
}

#[test]
fn layout_is_deterministic() {
    let source = json!({
        "planets": {
            "earth": { "tiers": {
                "tier1": { "topics": { "a": [ { "id": "a1" }, { "id": "a2" } ] } },
                "tier2": { "topics": { "b": [ { "id": "b1" } ] } }
            } },
            "mars": { "tiers": { "tier1": { "topics": { "m": [ { "id": "m1" } ] } } } }
        }
    })
    .to_string();
    let config = GeometryConfig::default();

    let first = layout_chart(&Graph::from_json(&source).expect("graph"), &config);
    let second = layout_chart(&Graph::from_json(&source).expect("graph"), &config);

    assert_eq!(first, second);
    assert_eq!(fingerprint(&first), fingerprint(&second));
    assert!(first.planet(&PlanetId::from("mars")).is_some());
}

fn fingerprint(layout: &star_chart_system_layout::ChartLayout) -> Vec<(u64, u64)> {
    layout
        .planets
        .iter()
        .flat_map(|planet| {
            std::iter::once(planet.center)
                .chain(planet.branches.iter().map(|branch| branch.endpoint))
                .chain(planet.achievements.iter().map(|node| node.position))
                .chain(planet.junctions.iter().map(|node| node.position))
                .chain(planet.satellites.iter().map(|node| node.position))
        })
        .map(|position| (position.x.to_bits(), position.y.to_bits()))
        .collect()
}
