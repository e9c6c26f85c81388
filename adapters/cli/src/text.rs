use std::io::{self, Write};

use anyhow::Result as AnyResult;
use star_chart_rendering::{NodeKind, RenderingBackend, Scene};
use star_chart_system_progression::PlanetView;

/// Backend that prints scenes as indented text.
#[derive(Debug)]
pub(crate) struct TextBackend<W> {
    out: W,
}

impl<W: Write> TextBackend<W> {
    /// Creates a backend writing to `out`.
    pub(crate) fn new(out: W) -> Self {
        Self { out }
    }
}

impl<W: Write> RenderingBackend for TextBackend<W> {
    fn present(&mut self, scene: &Scene) -> AnyResult<()> {
        for planet in &scene.planets {
            writeln!(
                self.out,
                "{} ({}) at {} [{}/{}]",
                planet.label,
                planet.id,
                point(planet.center.x, planet.center.y),
                planet.completed,
                planet.total
            )?;

            for satellite in scene.satellites.iter().filter(|s| s.planet == planet.id) {
                writeln!(
                    self.out,
                    "  satellite {} at {}",
                    satellite.tier,
                    point(satellite.position.x, satellite.position.y)
                )?;
            }
            for branch in scene.branches.iter().filter(|b| b.planet == planet.id) {
                writeln!(
                    self.out,
                    "  branch {}/{} to {}",
                    branch.tier,
                    branch.topic,
                    point(branch.end.x, branch.end.y)
                )?;
            }
            for node in scene.nodes.iter().filter(|n| n.planet == planet.id) {
                let at = point(node.position.x, node.position.y);
                match &node.kind {
                    NodeKind::Achievement { id, title, status } => {
                        writeln!(self.out, "  {:<9} {id} at {at} {title}", status.label())?;
                    }
                    NodeKind::Junction { from, to, unlocked } => {
                        let gate = if *unlocked { "open" } else { "closed" };
                        writeln!(self.out, "  gate {from} -> {to} {gate} at {at}")?;
                    }
                }
            }
        }
        self.out.flush()?;
        Ok(())
    }
}

/// Prints the progress of one planet, tier by tier.
pub(crate) fn write_status(out: &mut impl Write, view: &PlanetView) -> io::Result<()> {
    writeln!(
        out,
        "{} {}/{}",
        view.planet(),
        view.completed_count(),
        view.total_count()
    )?;
    for tier in &view.tiers {
        let gate = if tier.unlocked { "unlocked" } else { "locked" };
        writeln!(out, "  {} {}/{} {gate}", tier.tier, tier.completed, tier.total)?;
        for achievement in view.achievements.iter().filter(|a| a.tier == tier.tier) {
            writeln!(
                out,
                "    {:<9} {} {}",
                achievement.status.label(),
                achievement.achievement,
                achievement.title
            )?;
        }
    }
    Ok(())
}

fn point(x: f32, y: f32) -> String {
    format!("({x:.1}, {y:.1})")
}

#[cfg(test)]
mod tests {
    use super::*;
    use star_chart_system_layout::GeometryConfig;
    use star_chart_system_progression::Progression;

    fn progression() -> Progression {
        let source = r#"{"planets": {"deep-space": {"tiers": {
            "tier1": {"topics": {"nav": [{"id": "a1", "title": "Star map"}]}},
            "tier2": {"topics": {"nav": [{"id": "b1", "title": "Warp"}]}}
        }}}}"#;
        Progression::load(
            source,
            &star_chart_system_progression::MemoryStore::new(),
            GeometryConfig::default(),
        )
    }

    #[test]
    fn scene_dump_lists_every_node() {
        let progression = progression();
        let scene = Scene::from_snapshot(progression.snapshot(), progression.config());
        let mut buffer = Vec::new();

        TextBackend::new(&mut buffer)
            .present(&scene)
            .expect("writing to memory succeeds");

        let text = String::from_utf8(buffer).expect("utf-8 output");
        assert!(text.starts_with("DEEP SPACE (deep-space) at (0.0, -300.0) [0/2]"));
        assert!(text.contains("available a1 at"));
        assert!(text.contains("locked    b1 at"));
        assert!(text.contains("gate tier1 -> tier2 closed"));
    }

    #[test]
    fn status_groups_achievements_by_tier() {
        let progression = progression();
        let view = progression
            .planet_view(&"deep-space".into())
            .expect("planet view");
        let mut buffer = Vec::new();

        write_status(&mut buffer, view).expect("writing to memory succeeds");

        let text = String::from_utf8(buffer).expect("utf-8 output");
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "deep-space 0/2");
        assert_eq!(lines[1], "  tier1 0/1 unlocked");
        assert_eq!(lines[2], "    available a1 Star map");
        assert_eq!(lines[3], "  tier2 0/1 locked");
    }
}
