//! Bubblify launcher
//!
//! Loads a robot, optionally imports a sphere set, applies scripted edit
//! events from stdin and writes the requested exports. Drawing is left to an
//! external viewer.

use std::io::{BufRead, Write};
use std::path::{Path, PathBuf};

use bubble_core::{
    AppConfig, ConfigError, EditEvent, ExportError, Frame, FrameSink, KinematicModel, ModelError,
    Session,
};
use clap::Parser;

// ---------------------------------------------------------------------------
// CLI
// ---------------------------------------------------------------------------

/// Interactive collision-sphere authoring for URDF robots.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Cli {
    /// Robot name, looked up in the configured search paths.
    #[arg(long, default_value = "panda")]
    robot: String,

    /// Path to a URDF file (overrides --robot).
    #[arg(long = "urdf-path", alias = "urdf_path")]
    urdf_path: Option<PathBuf>,

    /// Show the robot's own collision geometry.
    #[arg(long = "show-collision", alias = "show_collision")]
    show_collision: bool,

    /// Port handed to the viewer.
    #[arg(long, default_value_t = 8080)]
    port: u16,

    /// Configuration file (RON).
    #[arg(long)]
    config: Option<PathBuf>,

    /// Sphere set to import at startup.
    #[arg(long)]
    spheres: Option<PathBuf>,

    /// Write the sphere set here before exiting.
    #[arg(long = "export-spheres")]
    export_spheres: Option<PathBuf>,

    /// Write the spherized URDF here before exiting.
    #[arg(long = "export-urdf")]
    export_urdf: Option<PathBuf>,

    /// Read newline-delimited JSON edit events from stdin.
    #[arg(long)]
    events: bool,
}

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error("URDF file not found: {}", .0.display())]
    UrdfNotFound(PathBuf),

    #[error("robot '{0}' not found in any configured search path")]
    RobotNotFound(String),

    #[error(transparent)]
    Model(#[from] ModelError),

    #[error(transparent)]
    Export(#[from] ExportError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("failed to read events: {0}")]
    Io(#[from] std::io::Error),
}

fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("bubblify").join("config.ron"))
}

fn load_config(cli: &Cli) -> Result<AppConfig, CliError> {
    match &cli.config {
        // An explicit file has to be readable
        Some(path) => Ok(AppConfig::load(path)?),
        None => Ok(default_config_path()
            .map(|path| AppConfig::load_or_default(&path))
            .unwrap_or_else(AppConfig::new)),
    }
}

fn resolve_urdf(cli: &Cli, config: &AppConfig) -> Result<PathBuf, CliError> {
    match &cli.urdf_path {
        Some(path) if path.exists() => Ok(path.clone()),
        Some(path) => Err(CliError::UrdfNotFound(path.clone())),
        None => config
            .robots
            .resolve(&cli.robot)
            .ok_or_else(|| CliError::RobotNotFound(cli.robot.clone())),
    }
}

// ---------------------------------------------------------------------------
// Frame summary
// ---------------------------------------------------------------------------

/// Stand-in renderer that logs what a viewer would draw
#[derive(Default)]
struct SummarySink {
    frames: usize,
}

impl FrameSink for SummarySink {
    fn present(&mut self, frame: &Frame<'_>) {
        self.frames += 1;
        let visible = frame.spheres.iter().filter(|s| s.visible).count();
        tracing::info!(
            "Frame {}: {} links, {} spheres ({} visible), collision geometry {}",
            self.frames,
            frame.links.len(),
            frame.spheres.len(),
            visible,
            if frame.show_collision { "shown" } else { "hidden" }
        );
    }
}

fn log_summary(session: &Session) {
    for (link, count) in session.store().counts_by_link() {
        if count > 0 {
            tracing::info!("  {}: {} spheres", link, count);
        }
    }
    tracing::info!("Total: {} spheres", session.store().len());
}

// ---------------------------------------------------------------------------
// Event stream
// ---------------------------------------------------------------------------

/// One JSON line per input line
fn handle_event_line(session: &mut Session, line: &str) -> serde_json::Value {
    let event: EditEvent = match serde_json::from_str(line) {
        Ok(event) => event,
        Err(e) => return serde_json::json!({ "error": format!("invalid event: {e}") }),
    };
    match session.dispatch(event) {
        Ok(outcome) => serde_json::json!({ "ok": outcome }),
        Err(e) => serde_json::json!({ "error": e.to_string() }),
    }
}

fn run_events(
    session: &mut Session,
    input: impl BufRead,
    mut output: impl Write,
) -> Result<usize, CliError> {
    let mut applied = 0;
    for line in input.lines() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let result = handle_event_line(session, &line);
        if result.get("ok").is_some() {
            applied += 1;
        }
        writeln!(output, "{result}")?;
    }
    output.flush()?;
    Ok(applied)
}

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

fn run(cli: Cli) -> Result<(), CliError> {
    let mut config = load_config(&cli)?;
    if cli.show_collision {
        config.display.show_collision = true;
    }

    let urdf_path = resolve_urdf(&cli, &config)?;
    let model = KinematicModel::from_urdf_file(&urdf_path)?;
    tracing::info!(
        "Robot '{}': {} links, {} joints ({} actuated)",
        model.name(),
        model.link_count(),
        model.joint_count(),
        model.actuated_joints().count()
    );
    tracing::info!("Viewer port: {}", cli.port);

    let mut session = Session::new(model, config);
    if let Some(path) = &cli.spheres {
        session.load_sphere_set_file(path)?;
    }

    let mut sink = SummarySink::default();
    session.publish(&mut sink);

    if cli.events {
        let stdin = std::io::stdin();
        let applied = run_events(&mut session, stdin.lock(), std::io::stdout().lock())?;
        tracing::info!("Applied {} events", applied);
        session.publish(&mut sink);
    }

    log_summary(&session);
    export(&session, cli.export_spheres.as_deref(), cli.export_urdf.as_deref())
}

fn export(
    session: &Session,
    spheres: Option<&Path>,
    urdf: Option<&Path>,
) -> Result<(), CliError> {
    if let Some(path) = spheres {
        session.save_sphere_set(path)?;
    }
    if let Some(path) = urdf {
        session.save_urdf(path)?;
    }
    Ok(())
}

fn main() {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "bubble_cli=info,bubble_core=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    if let Err(e) = run(cli) {
        tracing::error!("{}", e);
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const URDF: &str = r#"<robot name="slider">
  <link name="rail"/>
  <link name="cart"/>
  <joint name="travel" type="prismatic">
    <parent link="rail"/>
    <child link="cart"/>
    <axis xyz="1 0 0"/>
    <limit lower="0" upper="1" effort="1" velocity="1"/>
  </joint>
</robot>"#;

    fn session() -> Session {
        Session::new(KinematicModel::from_urdf_str(URDF).unwrap(), AppConfig::new())
    }

    #[test]
    fn test_parse_flags() {
        let cli = Cli::try_parse_from([
            "bubblify",
            "--urdf_path",
            "robot.urdf",
            "--show-collision",
            "--port",
            "8081",
        ])
        .unwrap();
        assert_eq!(cli.urdf_path, Some(PathBuf::from("robot.urdf")));
        assert!(cli.show_collision);
        assert_eq!(cli.port, 8081);
        assert_eq!(cli.robot, "panda");
        assert!(!cli.events);
    }

    #[test]
    fn test_missing_urdf_path_is_an_error() {
        let cli = Cli::try_parse_from(["bubblify", "--urdf-path", "/definitely/not/here.urdf"])
            .unwrap();
        assert!(matches!(
            resolve_urdf(&cli, &AppConfig::new()),
            Err(CliError::UrdfNotFound(_))
        ));
    }

    #[test]
    fn test_unknown_robot_name() {
        let cli = Cli::try_parse_from(["bubblify", "--robot", "ghost"]).unwrap();
        assert!(matches!(
            resolve_urdf(&cli, &AppConfig::new()),
            Err(CliError::RobotNotFound(name)) if name == "ghost"
        ));
    }

    #[test]
    fn test_event_lines_produce_one_result_each() {
        let mut session = session();
        let input = concat!(
            r#"{"type": "set_joint", "joint": "travel", "value": 2.0}"#,
            "\n\n",
            r#"{"type": "add_sphere", "link": "cart", "radius": 0.1}"#,
            "\n",
            r#"{"type": "resize_active_sphere", "delta": -5}"#,
            "\n",
            "not json\n",
        );
        let mut output = Vec::new();
        let applied = run_events(&mut session, input.as_bytes(), &mut output).unwrap();
        assert_eq!(applied, 2);

        let lines: Vec<serde_json::Value> = String::from_utf8(output)
            .unwrap()
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect();
        assert_eq!(lines.len(), 4);
        assert_eq!(lines[0]["ok"]["outcome"], "joints_updated");
        assert_eq!(lines[0]["ok"]["clamped"][0]["applied"], 1.0);
        assert_eq!(lines[1]["ok"]["outcome"], "sphere_added");
        assert!(lines[2]["error"].as_str().unwrap().contains("radius"));
        assert!(lines[3]["error"].as_str().unwrap().starts_with("invalid event"));
        assert_eq!(session.store().len(), 1);
    }
}
