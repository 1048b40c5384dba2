/// tankscene terminal demo
///
/// Renders the tank (or robot arm) scene as coloured ASCII.
/// Controls follow the default keymap: 1-4 cameras, 0 split view, 8/9
/// oblique/perspective, arrows tilt, q/e drive, w/s barrel, a/d turret,
/// o/p claw, space wireframe, +/- or mouse wheel zoom, r reset, z fire.
/// Esc quits.
use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use std::fs::File;
use std::path::PathBuf;
use std::sync::Mutex;
use tankscene_core::{Action, App, Keymap, SceneKind};
use tankscene_terminal::TerminalApp;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Clone, Copy, ValueEnum)]
enum SceneArg {
    Tank,
    Arm,
}

impl From<SceneArg> for SceneKind {
    fn from(arg: SceneArg) -> Self {
        match arg {
            SceneArg::Tank => SceneKind::Tank,
            SceneArg::Arm => SceneKind::Arm,
        }
    }
}

#[derive(Debug, Parser)]
#[command(name = "tankscene-terminal", version, about = "Articulated tank scene in the terminal")]
struct Args {
    /// Which model to show
    #[arg(long, value_enum, default_value_t = SceneArg::Tank)]
    scene: SceneArg,

    /// Keymap file overlaid on the default bindings
    #[arg(long)]
    keymap: Option<PathBuf>,

    /// Target frames per second
    #[arg(long, default_value_t = 30)]
    fps: u32,

    /// Start in four-way split view
    #[arg(long)]
    split: bool,

    /// Write logs to this file
    #[arg(long)]
    log: Option<PathBuf>,

    /// Log at debug level unless RUST_LOG says otherwise
    #[arg(short, long)]
    verbose: bool,
}

fn init_logging(args: &Args) -> Result<()> {
    let Some(path) = &args.log else {
        return Ok(());
    };
    let file = File::create(path).with_context(|| format!("creating log file {}", path.display()))?;
    let default = if args.verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_ansi(false)
        .with_writer(Mutex::new(file))
        .init();
    Ok(())
}

fn load_keymap(path: Option<&PathBuf>) -> Result<Keymap> {
    let mut keymap = Keymap::default();
    if let Some(path) = path {
        let text = std::fs::read_to_string(path).with_context(|| format!("reading keymap {}", path.display()))?;
        let count = keymap
            .overlay(&text)
            .with_context(|| format!("parsing keymap {}", path.display()))?;
        tracing::info!(path = %path.display(), count, "keymap loaded");
    }
    Ok(keymap)
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(&args)?;

    let keymap = load_keymap(args.keymap.as_ref())?;
    let mut app = App::new(args.scene.into(), 1, 1).with_keymap(keymap);
    if args.split {
        app.apply(Action::ToggleSplit);
    }

    tracing::info!(scene = ?app.scene, fps = args.fps, "starting terminal renderer");
    let mut terminal = TerminalApp::new(app, args.fps).context("initialising terminal")?;
    terminal.run().context("terminal session failed")?;
    Ok(())
}
