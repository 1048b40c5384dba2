/// Terminal frontend: crossterm event loop around the core application
use crossterm::{
    cursor,
    event::{
        self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent, KeyEventKind,
        KeyModifiers, MouseEventKind,
    },
    execute, queue,
    terminal::{self},
};
use std::io::{self, stdout, Write};
use std::time::{Duration, Instant};
use tankscene_core::{App, Key};
use tracing::{debug, info};

pub mod renderer;

pub use renderer::AsciiRenderer;

/// Map a crossterm key code onto the platform-neutral key set
pub fn map_key(code: KeyCode) -> Option<Key> {
    match code {
        KeyCode::Char(' ') => Some(Key::Space),
        KeyCode::Char(c) => Some(Key::Char(c.to_ascii_lowercase())),
        KeyCode::Up => Some(Key::Up),
        KeyCode::Down => Some(Key::Down),
        KeyCode::Left => Some(Key::Left),
        KeyCode::Right => Some(Key::Right),
        _ => None,
    }
}

/// Main application struct for terminal rendering
pub struct TerminalApp {
    app: App,
    renderer: AsciiRenderer,
    running: bool,
    target_frame_time: Duration,
    last_report: Instant,
    frame_count: u32,
}

impl TerminalApp {
    /// Wrap `app`, sizing both the renderer and the camera to the terminal
    pub fn new(mut app: App, fps: u32) -> io::Result<Self> {
        let (columns, rows) = terminal::size()?;
        let renderer = AsciiRenderer::new(columns as usize, rows as usize);
        let (width, height) = renderer.canvas_size();
        if let Err(err) = app.resize(width, height) {
            debug!(%err, "terminal reported an empty size");
        }

        Ok(Self {
            app,
            renderer,
            running: true,
            target_frame_time: Duration::from_millis(1000 / u64::from(fps.max(1))),
            last_report: Instant::now(),
            frame_count: 0,
        })
    }

    pub fn run(&mut self) -> io::Result<()> {
        terminal::enable_raw_mode()?;
        execute!(stdout(), terminal::EnterAlternateScreen, EnableMouseCapture, cursor::Hide)?;

        let result = self.main_loop();

        // Cleanup
        terminal::disable_raw_mode()?;
        execute!(stdout(), DisableMouseCapture, terminal::LeaveAlternateScreen, cursor::Show)?;

        info!(frames = self.app.frames(), "terminal session ended");
        result
    }

    fn main_loop(&mut self) -> io::Result<()> {
        while self.running {
            let frame_start = Instant::now();

            // Drain every pending event before drawing
            while event::poll(Duration::ZERO)? {
                self.handle_event(event::read()?);
            }

            self.render()?;

            // Frame timing
            self.frame_count += 1;
            let elapsed = frame_start.elapsed();
            if elapsed < self.target_frame_time {
                std::thread::sleep(self.target_frame_time - elapsed);
            }

            let now = Instant::now();
            if (now - self.last_report).as_secs() >= 1 {
                let fps = self.frame_count as f32 / (now - self.last_report).as_secs_f32();
                debug!(fps, "frame rate");
                self.frame_count = 0;
                self.last_report = now;
            }
        }

        Ok(())
    }

    fn handle_event(&mut self, event: Event) {
        match event {
            Event::Key(key) => self.handle_key(key),
            Event::Mouse(mouse) => match mouse.kind {
                MouseEventKind::ScrollUp => self.app.wheel(-1.0),
                MouseEventKind::ScrollDown => self.app.wheel(1.0),
                _ => {}
            },
            Event::Resize(columns, rows) => {
                self.renderer.resize(columns as usize, rows as usize);
                let (width, height) = self.renderer.canvas_size();
                if let Err(err) = self.app.resize(width, height) {
                    debug!(%err, "resize ignored");
                }
            }
            _ => {}
        }
    }

    fn handle_key(&mut self, KeyEvent { code, modifiers, kind, .. }: KeyEvent) {
        if kind != KeyEventKind::Press {
            return;
        }
        let interrupt = code == KeyCode::Char('c') && modifiers.contains(KeyModifiers::CONTROL);
        if code == KeyCode::Esc || interrupt {
            self.running = false;
            return;
        }
        if let Some(key) = map_key(code) {
            self.app.key_down(key);
        }
    }

    fn render(&mut self) -> io::Result<()> {
        self.renderer.clear();

        let report = self.app.frame(&mut self.renderer);
        if !report.newly_hit.is_empty() {
            debug!(hits = self.app.sim.hit_count(), "targets hit");
        }

        let mut stdout = stdout();
        queue!(stdout, cursor::MoveTo(0, 0))?;
        self.renderer.present(&mut stdout)?;
        stdout.flush()?;
        Ok(())
    }
}
