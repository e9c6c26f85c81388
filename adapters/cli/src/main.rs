#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter for exploring and completing a star chart.

mod store;
mod text;

use std::{
    fs,
    io::{self, Write},
    path::{Path, PathBuf},
};

use anyhow::{Context, Result as AnyResult};
use clap::{Parser, Subcommand};
use star_chart_core::{AchievementId, Command, Event, PlanetId, RefreshScope, TierId};
use star_chart_rendering::{RenderingBackend, Scene};
use star_chart_system_layout::GeometryConfig;
use star_chart_system_progression::{AdminCapability, Progression};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::{store::FileStore, text::TextBackend};

const EMPTY_GRAPH: &str = r#"{"planets": {}}"#;

/// Explore and complete a progression star chart.
#[derive(Debug, Parser)]
#[command(name = "star-chart", version)]
struct Cli {
    /// Graph source document.
    #[arg(long, default_value = "star-chart.json")]
    graph: PathBuf,

    /// File holding the persisted completion snapshot.
    #[arg(long, default_value = "star-chart-state.json")]
    state: PathBuf,

    /// Geometry overrides in TOML.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Grants access to administrative commands.
    #[arg(long)]
    admin: bool,

    #[command(subcommand)]
    action: Action,
}

#[derive(Debug, Subcommand)]
enum Action {
    /// Prints completion progress.
    Status {
        /// Planet to show; every planet when omitted.
        planet: Option<String>,
    },
    /// Prints computed node positions.
    Layout {
        /// Planet to show; every planet when omitted.
        planet: Option<String>,
    },
    /// Completes an available achievement.
    Complete {
        /// Planet owning the achievement.
        planet: String,
        /// Achievement to complete.
        achievement: String,
    },
    /// Completes every achievement of every planet.
    UnlockAll,
    /// Completes every achievement of one tier.
    UnlockTier {
        /// Planet owning the tier.
        planet: String,
        /// Tier to complete.
        tier: String,
    },
    /// Clears progress of one planet, or of every planet.
    Reset {
        /// Planet to clear; every planet when omitted.
        planet: Option<String>,
    },
    /// Replaces the graph with another source document.
    Import {
        /// Document to load.
        path: PathBuf,
    },
    /// Writes the graph, including progress, in the source format.
    Export {
        /// Output file; standard output when omitted.
        path: Option<PathBuf>,
    },
}

/// Entry point for the star chart command-line interface.
fn main() -> AnyResult<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();

    run(Cli::parse())
}

fn run(cli: Cli) -> AnyResult<()> {
    let config = load_geometry(cli.config.as_deref())?;
    let source = read_graph_source(&cli.graph);
    let mut store = FileStore::new(&cli.state);
    let capability = if cli.admin {
        AdminCapability::granted()
    } else {
        AdminCapability::withheld()
    };
    let mut progression = Progression::load(&source, &store, config).with_authorizer(capability);

    let stdout = io::stdout();
    let mut out = stdout.lock();

    let command = match cli.action {
        Action::Status { planet } => {
            return print_status(&progression, &scope_of(planet), &mut out);
        }
        Action::Layout { planet } => {
            return present(&progression, &scope_of(planet), &mut out);
        }
        Action::Export { path } => {
            let document = progression.export()?;
            match path {
                Some(path) => fs::write(&path, document)
                    .with_context(|| format!("failed to write {}", path.display()))?,
                None => writeln!(out, "{document}")?,
            }
            return Ok(());
        }
        Action::Complete {
            planet,
            achievement,
        } => Command::Complete {
            planet: PlanetId::new(planet),
            achievement: AchievementId::new(achievement),
        },
        Action::UnlockAll => Command::BulkUnlock,
        Action::UnlockTier { planet, tier } => Command::UnlockTier {
            planet: PlanetId::new(planet),
            tier: TierId::new(tier),
        },
        Action::Reset { planet } => Command::BulkReset {
            planet: planet.map(PlanetId::new),
        },
        Action::Import { path } => Command::ReplaceFromJson {
            payload: fs::read_to_string(&path)
                .with_context(|| format!("failed to read {}", path.display()))?,
        },
    };

    let mut events = Vec::new();
    progression.execute(command, &mut events)?;

    for event in events {
        match event {
            Event::AchievementCompleted {
                planet,
                achievement,
            } => info!(%planet, %achievement, "achievement completed"),
            Event::TierCompleted { planet, tier } => {
                writeln!(out, "{planet}: {tier} completed")?;
            }
            Event::ProgressReset { planet } => info!(%planet, "progress cleared"),
            Event::GraphReplaced => {
                // Keep the import for the next run.
                let document = progression.export()?;
                fs::write(&cli.graph, document)
                    .with_context(|| format!("failed to write {}", cli.graph.display()))?;
            }
            Event::RefreshRequested { scope } => print_status(&progression, &scope, &mut out)?,
            Event::PersistRequested => {
                if let Err(error) = progression.persist(&mut store) {
                    warn!(%error, path = %store.path().display(), "progress was not saved");
                }
            }
        }
    }
    Ok(())
}

fn scope_of(planet: Option<String>) -> RefreshScope {
    planet.map_or(RefreshScope::All, |planet| {
        RefreshScope::Planets(vec![PlanetId::new(planet)])
    })
}

fn load_geometry(path: Option<&Path>) -> AnyResult<GeometryConfig> {
    let Some(path) = path else {
        return Ok(GeometryConfig::default());
    };
    let contents = fs::read_to_string(path)
        .with_context(|| format!("failed to read geometry config {}", path.display()))?;
    let config: GeometryConfig = toml::from_str(&contents)
        .with_context(|| format!("failed to parse geometry config {}", path.display()))?;
    config
        .validate()
        .with_context(|| format!("invalid geometry config {}", path.display()))?;
    Ok(config)
}

fn read_graph_source(path: &Path) -> String {
    fs::read_to_string(path).unwrap_or_else(|error| {
        warn!(%error, path = %path.display(), "graph source unavailable, starting empty");
        EMPTY_GRAPH.to_owned()
    })
}

fn print_status(
    progression: &Progression,
    scope: &RefreshScope,
    out: &mut impl Write,
) -> AnyResult<()> {
    if let RefreshScope::Planets(planets) = scope {
        for planet in planets {
            if progression.planet_view(planet).is_none() {
                warn!(%planet, "unknown planet");
            }
        }
    }
    for view in progression.snapshot().planets() {
        if scope.includes(view.planet()) {
            text::write_status(out, view)?;
        }
    }
    Ok(())
}

fn present(progression: &Progression, scope: &RefreshScope, out: &mut impl Write) -> AnyResult<()> {
    let mut scene = Scene::from_snapshot(progression.snapshot(), progression.config());
    scene.retain(scope);
    TextBackend::new(out).present(&scene)
}
