/// Terminal-based suit viewer
use bodyfit_core::status::frame_legend;
use bodyfit_core::{AssetReply, Camera, PlaybackClock, Sim, SuitRig};
use crossterm::{
    cursor,
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind},
    execute, queue,
    style::{Color, Print, ResetColor, SetForegroundColor},
    terminal::{self, ClearType},
};
use std::io::{self, stdout, Write};
use std::time::{Duration, Instant};
use tracing::info;

pub mod assets;
pub mod config;
pub mod renderer;

pub use assets::AssetWorker;
pub use config::ViewerConfig;
pub use renderer::AsciiRenderer;

pub use bodyfit_core::playback::{MAX_SPEED, MIN_SPEED};

const SPEED_STEP: f64 = 0.25;
const RELIEF_STEP: f32 = 0.01;
const MAX_RELIEF: f32 = 0.3;

/// Everything the viewer shows, independent of the terminal
pub struct Session {
    pub rig: SuitRig,
    pub sim: Sim,
    /// Where the sequence came from, for status lines
    pub sim_source: String,
    pub clock: PlaybackClock,
    pub playing: bool,
    pub speed: f64,
    pub max_tick_sec: f64,
}

impl Session {
    pub fn new(rig: SuitRig, sim: Sim, sim_source: impl Into<String>, config: &ViewerConfig) -> Self {
        let mut session = Self {
            rig,
            sim,
            sim_source: sim_source.into(),
            clock: PlaybackClock::new(),
            playing: config.autoplay,
            speed: config.speed.clamp(MIN_SPEED, MAX_SPEED),
            max_tick_sec: config.max_tick_sec,
        };
        session.show_current_frame();
        session
    }

    /// Pose the rig for the clock's frame, or the front layout without a sequence
    pub fn show_current_frame(&mut self) {
        match self.sim.frames.get(self.clock.index()) {
            Some(frame) => self.rig.apply_frame(frame),
            None => self.rig.apply_front_layout(),
        }
    }

    /// Fold in asset replies; true if any was applied
    pub fn accept_all(&mut self, replies: Vec<AssetReply>) -> bool {
        let mut applied = false;
        for reply in replies {
            applied |= self.rig.accept(reply);
        }
        applied
    }

    /// Advance playback by wall-clock `elapsed_sec`; true if the frame changed
    pub fn tick(&mut self, elapsed_sec: f64) -> bool {
        if !self.playing {
            return false;
        }
        let dt = elapsed_sec.min(self.max_tick_sec);
        let steps = self.clock.advance(&self.sim.frames, dt, self.speed);
        if steps > 0 {
            self.show_current_frame();
        }
        steps > 0
    }

    pub fn toggle_play(&mut self) {
        self.playing = !self.playing;
    }

    pub fn step(&mut self, delta: isize) {
        self.clock.step(delta, self.sim.frames.len());
        self.show_current_frame();
    }

    pub fn rewind(&mut self) {
        self.clock.reset();
        self.show_current_frame();
    }

    pub fn change_speed(&mut self, delta: f64) {
        self.speed = (self.speed + delta).clamp(MIN_SPEED, MAX_SPEED);
    }

    pub fn change_relief(&mut self, delta: f32) {
        let amplitude = (self.rig.config().relief_amplitude + delta).clamp(0.0, MAX_RELIEF);
        self.rig.set_relief(amplitude);
    }

    pub fn toggle_textures(&mut self) {
        let enabled = !self.rig.config().textures_enabled;
        self.rig.set_textures_enabled(enabled);
    }

    pub fn frame_legend(&self) -> String {
        frame_legend(
            self.clock.index(),
            self.sim.frames.len(),
            self.sim.equipped_at(self.clock.index()),
            self.speed,
        )
    }

    pub fn status_line(&self) -> String {
        self.rig.status().summary(self.sim.frames.len(), &self.sim_source)
    }
}

/// Main application struct for terminal suit rendering
pub struct TerminalApp {
    session: Session,
    assets: AssetWorker,
    camera: Camera,
    renderer: AsciiRenderer,
    target_fps: u32,
    running: bool,
    last_tick: Instant,
    last_fps_sample: Instant,
    frame_count: u32,
    fps: f32,
}

impl TerminalApp {
    pub fn new(session: Session, assets: AssetWorker, target_fps: u32) -> io::Result<Self> {
        let (width, height) = terminal::size()?;

        let mut app = Self {
            session,
            assets,
            camera: Camera::new(width as u32, height as u32),
            renderer: AsciiRenderer::new(width as usize, height as usize),
            target_fps: target_fps.max(1),
            running: true,
            last_tick: Instant::now(),
            last_fps_sample: Instant::now(),
            frame_count: 0,
            fps: 0.0,
        };
        app.fit_camera();
        Ok(app)
    }

    pub fn run(&mut self) -> io::Result<()> {
        terminal::enable_raw_mode()?;
        execute!(stdout(), terminal::EnterAlternateScreen, cursor::Hide)?;

        let result = self.main_loop();

        // Cleanup
        terminal::disable_raw_mode()?;
        execute!(stdout(), terminal::LeaveAlternateScreen, cursor::Show)?;

        result
    }

    fn main_loop(&mut self) -> io::Result<()> {
        let target_frame_time = Duration::from_millis(1000 / self.target_fps as u64);

        while self.running {
            let frame_start = Instant::now();

            // Handle input
            while event::poll(Duration::from_millis(0))? {
                self.handle_input()?;
            }

            // Update
            self.update();

            // Render
            self.render()?;

            // Frame timing
            self.frame_count += 1;
            let elapsed = frame_start.elapsed();
            if elapsed < target_frame_time {
                std::thread::sleep(target_frame_time - elapsed);
            }

            // Update FPS counter
            let now = Instant::now();
            if (now - self.last_fps_sample).as_secs() >= 1 {
                self.fps = self.frame_count as f32 / (now - self.last_fps_sample).as_secs_f32();
                self.frame_count = 0;
                self.last_fps_sample = now;
            }
        }

        Ok(())
    }

    fn handle_input(&mut self) -> io::Result<()> {
        match event::read()? {
            Event::Key(KeyEvent { code, kind, .. }) if kind != KeyEventKind::Release => match code {
                KeyCode::Char('q') | KeyCode::Esc => {
                    self.running = false;
                }
                KeyCode::Char(' ') => self.session.toggle_play(),
                KeyCode::Left | KeyCode::Char('h') => self.session.step(-1),
                KeyCode::Right | KeyCode::Char('l') => self.session.step(1),
                KeyCode::Home | KeyCode::Char('0') => self.session.rewind(),
                KeyCode::Char('t') => self.session.toggle_textures(),
                KeyCode::Char('+') | KeyCode::Char('=') => self.session.change_relief(RELIEF_STEP),
                KeyCode::Char('-') => self.session.change_relief(-RELIEF_STEP),
                KeyCode::Char(']') => self.session.change_speed(SPEED_STEP),
                KeyCode::Char('[') => self.session.change_speed(-SPEED_STEP),
                KeyCode::Char('f') => self.fit_camera(),
                _ => {}
            },
            Event::Resize(width, height) => {
                self.renderer.resize(width as usize, height as usize);
                self.camera.aspect = width as f32 / height.max(1) as f32;
            }
            _ => {}
        }
        Ok(())
    }

    fn fit_camera(&mut self) {
        if let Some(sphere) = self.session.rig.visible_bounds() {
            self.camera.frame(&sphere);
        }
    }

    fn update(&mut self) {
        let now = Instant::now();
        let elapsed = (now - self.last_tick).as_secs_f64();
        self.last_tick = now;

        let replies = self.assets.drain();
        if !replies.is_empty() {
            let was_pending = !self.session.rig.status().is_complete();
            if self.session.accept_all(replies) && was_pending && self.session.rig.status().is_complete() {
                info!("{}", self.session.status_line());
                self.fit_camera();
            }
        }

        self.session.tick(elapsed);
    }

    fn render(&mut self) -> io::Result<()> {
        // Clear renderer
        self.renderer.clear();

        for part in self.session.rig.parts() {
            let Some(transform) = part.transform else {
                continue;
            };
            let model = transform.model_matrix();
            self.renderer.render_part(part.geometry(), &model, &self.camera, part.color);
        }

        // Output to terminal
        let mut stdout = stdout();
        queue!(stdout, cursor::MoveTo(0, 0))?;

        self.renderer.draw(&mut stdout)?;

        // Draw UI overlay
        let status = self.session.status_line();
        let headline = status.lines().next().unwrap_or_default().to_string();
        let overlay = [
            format!(
                "Bodyfit | FPS: {:.1} | Space=Play/Pause Left/Right=Step T=Textures +/-=Relief [/]=Speed F=Fit Q=Quit",
                self.fps
            ),
            self.session.frame_legend(),
            self.session.rig.legend(),
            headline,
        ];
        for (row, line) in overlay.iter().enumerate() {
            queue!(
                stdout,
                cursor::MoveTo(0, row as u16),
                terminal::Clear(ClearType::CurrentLine),
                SetForegroundColor(Color::Yellow),
                Print(line),
                ResetColor
            )?;
        }

        stdout.flush()?;
        Ok(())
    }
}
