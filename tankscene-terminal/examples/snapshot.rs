/// Example: print a single frame without taking over the terminal
///
/// Usage: cargo run --example snapshot -- [action ...]
///
/// Actions use the keymap names (`split-view`, `turret-left`, `fire`, ...)
/// and are applied in order before the frame is drawn.
use std::env;
use std::io::{self, Write};
use tankscene_core::{Action, App, SceneKind};
use tankscene_terminal::AsciiRenderer;

fn main() -> io::Result<()> {
    let mut renderer = AsciiRenderer::new(100, 40);
    let (width, height) = renderer.canvas_size();
    let mut app = App::new(SceneKind::Tank, width, height);

    for name in env::args().skip(1) {
        match Action::from_name(&name) {
            Ok(action) => app.apply(action),
            Err(err) => eprintln!("skipping: {err}"),
        }
    }

    let report = app.frame(&mut renderer);
    let mut stdout = io::stdout();
    renderer.present(&mut stdout)?;
    writeln!(stdout)?;
    writeln!(
        stdout,
        "shells in flight: {}, targets hit: {}",
        app.sim.projectiles().len(),
        report.newly_hit.len()
    )?;
    stdout.flush()
}
