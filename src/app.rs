use std::io::{self, Stdout};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::Result;
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use crossterm::ExecutableCommand;
use log::{info, trace, warn};
use parking_lot::RwLock;
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Paragraph};
use ratatui::Terminal;

use crate::audio::{AudioEngine, ClickTrigger};
use crate::command::CommandBus;
use crate::config::Settings;
use crate::sequencer::{
    BeatScheduler, ClockSource, RhythmPattern, ScheduledBeat, SchedulerLoop, SystemClock,
};
use crate::synth::{Instrument, SoundSet};
use crate::ui::{
    render_pattern_info, render_patterns, render_sounds, render_transport, render_wheel, Theme,
    TransportInfo,
};

pub const MIN_BPM: f64 = 40.0;
pub const MAX_BPM: f64 = 240.0;

/// Keep a UI-chosen tempo inside the playable range
pub fn clamp_bpm(bpm: f64) -> f64 {
    bpm.clamp(MIN_BPM, MAX_BPM)
}

/// What the beats drive
enum Output {
    Audio {
        engine: AudioEngine,
        trigger: ClickTrigger,
    },
    /// Visual only, no sound
    Silent(Arc<dyn ClockSource>),
    /// Audio was requested but the device could not be opened
    Unavailable(String),
}

impl Output {
    fn label(&self) -> &'static str {
        match self {
            Output::Audio { engine, .. } if engine.is_fallback() => "tones",
            Output::Audio { .. } => "samples",
            Output::Silent(_) => "silent",
            Output::Unavailable(_) => "no audio",
        }
    }

    fn clock(&self) -> Option<Arc<dyn ClockSource>> {
        match self {
            Output::Audio { engine, .. } => Some(engine.clock() as Arc<dyn ClockSource>),
            Output::Silent(clock) => Some(clock.clone()),
            Output::Unavailable(_) => None,
        }
    }

    fn suspend(&self) {
        if let Some(clock) = self.clock() {
            clock.suspend();
        }
    }
}

/// Application state
pub struct App {
    theme: Theme,
    output: Output,
    runner: SchedulerLoop,
    catalog: Vec<RhythmPattern>,
    /// Index into `catalog`
    selected: usize,
    bpm: f64,
    /// Shared with the click trigger so toggles apply while playing
    sounds: Arc<RwLock<SoundSet>>,
    settings: Settings,
    settings_path: PathBuf,
    should_quit: bool,
    /// Temporary status message (e.g., "Saved settings")
    status_message: Option<(String, Instant)>,
}

impl App {
    pub fn new(settings: Settings, settings_path: PathBuf, theme: Theme, silent: bool) -> Result<Self> {
        let timing = settings.timing()?;
        let sounds = Arc::new(RwLock::new(settings.sounds));

        let (scheduler, output) = if silent {
            let clock: Arc<dyn ClockSource> = Arc::new(SystemClock::new());
            (BeatScheduler::new(clock.clone(), timing), Output::Silent(clock))
        } else {
            let bus = CommandBus::new();
            match AudioEngine::new(bus.receiver(), &settings.samples, settings.volumes.as_array()) {
                Ok(engine) => {
                    let trigger = ClickTrigger::new(
                        bus.sender(),
                        engine.clock(),
                        sounds.clone(),
                        engine.is_fallback(),
                    );
                    (
                        BeatScheduler::new(engine.clock(), timing),
                        Output::Audio { engine, trigger },
                    )
                }
                Err(e) => {
                    warn!("Audio output unavailable: {:#}", e);
                    (BeatScheduler::detached(timing), Output::Unavailable(format!("{:#}", e)))
                }
            }
        };

        Self::assemble(settings, settings_path, theme, sounds, scheduler, output)
    }

    fn assemble(
        settings: Settings,
        settings_path: PathBuf,
        theme: Theme,
        sounds: Arc<RwLock<SoundSet>>,
        scheduler: BeatScheduler,
        output: Output,
    ) -> Result<Self> {
        let catalog = settings.catalog();
        let selected = match catalog.iter().position(|p| p.matches_name(&settings.pattern)) {
            Some(index) => index,
            None => {
                warn!("Unknown pattern '{}', using {}", settings.pattern, catalog[0].name());
                0
            }
        };
        let bpm = clamp_bpm(settings.bpm);

        let runner = SchedulerLoop::new(scheduler);
        runner.configure(catalog[selected].clone(), bpm)?;

        let mut app = Self {
            theme,
            output,
            runner,
            catalog,
            selected,
            bpm,
            sounds,
            settings,
            settings_path,
            should_quit: false,
            status_message: None,
        };
        if let Output::Unavailable(reason) = &app.output {
            let msg = format!("No audio ({}); run with --silent for visual only", reason);
            app.set_status(msg);
        }
        Ok(app)
    }

    /// Run the main application loop
    pub fn run(&mut self) -> Result<()> {
        let mut terminal = Self::setup_terminal()?;

        let result = self.main_loop(&mut terminal);

        self.stop_transport();
        self.output.suspend();

        Self::restore_terminal(&mut terminal)?;

        result
    }

    /// Setup the terminal for TUI
    fn setup_terminal() -> Result<Terminal<CrosstermBackend<Stdout>>> {
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        stdout.execute(EnterAlternateScreen)?;
        let backend = CrosstermBackend::new(stdout);
        let terminal = Terminal::new(backend)?;
        Ok(terminal)
    }

    /// Restore terminal to normal state
    fn restore_terminal(terminal: &mut Terminal<CrosstermBackend<Stdout>>) -> Result<()> {
        disable_raw_mode()?;
        terminal.backend_mut().execute(LeaveAlternateScreen)?;
        terminal.show_cursor()?;
        Ok(())
    }

    /// Main event loop
    fn main_loop(&mut self, terminal: &mut Terminal<CrosstermBackend<Stdout>>) -> Result<()> {
        loop {
            self.check_clock();
            terminal.draw(|frame| self.render(frame))?;

            // Poll for events with timeout for responsive UI (~60fps)
            if event::poll(Duration::from_millis(16))? {
                if let Event::Key(key) = event::read()? {
                    if key.kind == KeyEventKind::Press {
                        self.handle_key(key);
                    }
                }
            }

            if self.should_quit {
                break;
            }
        }

        Ok(())
    }

    /// Set a temporary status message shown in the footer
    fn set_status(&mut self, msg: String) {
        self.status_message = Some((msg, Instant::now()));
    }

    fn pattern(&self) -> &RhythmPattern {
        &self.catalog[self.selected]
    }

    /// Handle key press events
    fn handle_key(&mut self, key: KeyEvent) {
        if key.modifiers.contains(KeyModifiers::CONTROL) {
            match key.code {
                KeyCode::Char('s') => self.save_settings_action(),
                KeyCode::Char('c') => self.should_quit = true,
                _ => {}
            }
            return;
        }

        match key.code {
            KeyCode::Char(' ') | KeyCode::Char('p') => self.toggle_playback(),
            KeyCode::Char('+') | KeyCode::Char('=') => self.change_tempo(1.0),
            KeyCode::Char('-') => self.change_tempo(-1.0),
            KeyCode::Char(']') => self.change_tempo(5.0),
            KeyCode::Char('[') => self.change_tempo(-5.0),
            KeyCode::Up | KeyCode::Char('k') => self.select_pattern(-1),
            KeyCode::Down | KeyCode::Char('j') => self.select_pattern(1),
            KeyCode::Char(c @ '1'..='4') => {
                let index = c as usize - '1' as usize;
                self.toggle_sound(Instrument::ALL[index]);
            }
            KeyCode::Char('t') => {
                self.theme = self.theme.next();
                self.set_status(format!("Theme: {}", self.theme.name));
            }
            KeyCode::Char('q') | KeyCode::Esc => self.should_quit = true,
            _ => {}
        }
    }

    fn toggle_playback(&mut self) {
        if self.runner.is_running() {
            self.stop_transport();
        } else {
            self.start_transport();
        }
    }

    fn start_transport(&mut self) {
        let on_beat: Box<dyn FnMut(ScheduledBeat) + Send> = match &self.output {
            Output::Audio { trigger, .. } => {
                let trigger = trigger.clone();
                Box::new(move |beat| {
                    trigger.trigger(&beat);
                })
            }
            Output::Silent(_) | Output::Unavailable(_) => Box::new(|beat| {
                trace!("Beat {} at {:.3}s", beat.number, beat.time);
            }),
        };

        if let Err(e) = self.runner.start(on_beat) {
            warn!("Could not start: {}", e);
            let msg = match &self.output {
                Output::Unavailable(_) => {
                    format!("Cannot play: {}; run with --silent", e)
                }
                _ => format!("Cannot play: {}", e),
            };
            self.set_status(msg);
        }
    }

    /// Stop playback if the clock died under a running scheduler
    fn check_clock(&mut self) {
        if !self.runner.is_running() {
            return;
        }
        let Some(reason) = self.output.clock().and_then(|clock| clock.failure()) else {
            return;
        };
        warn!("Clock failed while playing: {}", reason);
        self.stop_transport();
        self.set_status(format!("Playback stopped: {}", reason));
    }

    fn stop_transport(&mut self) {
        self.runner.stop();
        if let Output::Audio { trigger, .. } = &self.output {
            trigger.cancel_pending();
        }
    }

    /// Push the current pattern and tempo to the scheduler, restarting
    /// playback right away if it was running
    fn reconfigure(&mut self) {
        let was_running = self.runner.is_running();
        if was_running {
            self.stop_transport();
        }
        if let Err(e) = self.runner.configure(self.pattern().clone(), self.bpm) {
            self.set_status(format!("Configure failed: {}", e));
            return;
        }
        if was_running {
            self.start_transport();
        }
    }

    fn change_tempo(&mut self, delta: f64) {
        let bpm = clamp_bpm(self.bpm + delta);
        if bpm == self.bpm {
            return;
        }
        self.bpm = bpm;
        self.reconfigure();
    }

    fn select_pattern(&mut self, delta: isize) {
        let len = self.catalog.len() as isize;
        let selected = (self.selected as isize + delta).rem_euclid(len) as usize;
        if selected == self.selected {
            return;
        }
        self.selected = selected;
        info!("Pattern: {}", self.pattern().name());
        self.reconfigure();
    }

    fn toggle_sound(&mut self, instrument: Instrument) {
        let enabled = {
            let mut sounds = self.sounds.write();
            sounds.toggle(instrument);
            sounds.is_enabled(instrument)
        };
        let state = if enabled { "on" } else { "off" };
        self.set_status(format!("{}: {}", instrument.display_name(), state));
    }

    fn save_settings_action(&mut self) {
        self.settings.bpm = self.bpm;
        self.settings.pattern = self.pattern().name().to_string();
        self.settings.sounds = *self.sounds.read();
        self.settings.theme = self.theme.name.to_string();
        match self.settings.save(&self.settings_path) {
            Ok(()) => {
                let msg = format!("Saved: {}", self.settings_path.display());
                self.set_status(msg);
            }
            Err(e) => self.set_status(format!("Save failed: {:#}", e)),
        }
    }

    /// Render the UI
    fn render(&self, frame: &mut Frame) {
        let area = frame.area();

        // Clear with background color
        let bg_block = Block::default().style(Style::default().bg(self.theme.bg));
        frame.render_widget(bg_block, area);

        // Layout: header, transport, main content, footer
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3), // Header
                Constraint::Length(3), // Transport
                Constraint::Min(10),   // Wheel and side panels
                Constraint::Length(3), // Footer
            ])
            .split(area);

        self.render_header(frame, chunks[0]);

        let playing = self.runner.is_running();
        let current_beat = self.runner.current_beat();
        let pattern = self.pattern();
        let transport_info = TransportInfo {
            playing,
            bpm: self.bpm,
            current_beat,
            beat_count: pattern.beat_count(),
            output: self.output.label(),
        };
        render_transport(frame, chunks[1], &transport_info, &self.theme);

        let main = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
            .split(chunks[2]);
        render_wheel(frame, main[0], pattern, current_beat, playing, &self.theme);

        let side = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Min(4),
                Constraint::Length(6),
                Constraint::Length(6),
            ])
            .split(main[1]);
        render_patterns(frame, side[0], &self.catalog, self.selected, &self.theme);
        render_sounds(frame, side[1], &self.sounds.read(), &self.theme);
        render_pattern_info(frame, side[2], pattern, &self.theme);

        self.render_footer(frame, chunks[3]);
    }

    /// Render the header
    fn render_header(&self, frame: &mut Frame, area: Rect) {
        let title = format!(" COMPÁS v{} ", env!("CARGO_PKG_VERSION"));
        let header = Paragraph::new(title)
            .style(
                Style::default()
                    .fg(self.theme.highlight)
                    .bg(self.theme.bg)
                    .bold(),
            )
            .alignment(Alignment::Center)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_style(Style::default().fg(self.theme.border))
                    .style(Style::default().bg(self.theme.bg)),
            );
        frame.render_widget(header, area);
    }

    /// Render the footer with help or status message
    fn render_footer(&self, frame: &mut Frame, area: Rect) {
        // Show status message if recent (within 3 seconds)
        let text = match &self.status_message {
            Some((msg, instant)) if instant.elapsed().as_secs() < 3 => msg.clone(),
            _ => self.footer_help(),
        };

        let footer = Paragraph::new(text)
            .style(Style::default().fg(self.theme.dimmed).bg(self.theme.bg))
            .alignment(Alignment::Center)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_style(Style::default().fg(self.theme.border))
                    .style(Style::default().bg(self.theme.bg)),
            );
        frame.render_widget(footer, area);
    }

    fn footer_help(&self) -> String {
        format!(
            "SPACE:Play | +/-:BPM | [/]:BPM x5 | Up/Down:Palo | 1-4:Sounds | T:Theme | C-s:Save | Q:Quit | {}",
            self.theme.name
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sequencer::SimulatedClock;
    use tempfile::TempDir;

    fn silent_app(clock: Arc<SimulatedClock>) -> (App, TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let settings = Settings::default();
        let timing = settings.timing().unwrap();
        let sounds = Arc::new(RwLock::new(settings.sounds));
        let scheduler = BeatScheduler::new(clock.clone(), timing);
        let app = App::assemble(
            settings,
            dir.path().join("settings.json"),
            Theme::default(),
            sounds,
            scheduler,
            Output::Silent(clock),
        )
        .unwrap();
        (app, dir)
    }

    fn wait_for(mut cond: impl FnMut() -> bool) -> bool {
        for _ in 0..200 {
            if cond() {
                return true;
            }
            std::thread::sleep(Duration::from_millis(5));
        }
        false
    }

    #[test]
    fn changes_while_stopped_do_not_start_playback() {
        let (mut app, _dir) = silent_app(Arc::new(SimulatedClock::new(0.0)));
        app.change_tempo(5.0);
        app.select_pattern(1);
        assert!(!app.runner.is_running());
        assert_eq!(app.bpm, 125.0);
        assert_eq!(app.runner.tempo_bpm(), 125.0);
        assert_eq!(app.pattern().name(), "Bulería");
        assert_eq!(app.runner.current_beat(), 0);
    }

    #[test]
    fn changes_while_playing_restart_at_once() {
        let clock = Arc::new(SimulatedClock::new(0.0));
        let (mut app, _dir) = silent_app(clock.clone());
        app.toggle_playback();
        assert!(app.runner.is_running());

        // 120 bpm: beat 3 sounds at t=1.0
        clock.set(1.0);
        assert!(wait_for(|| app.runner.current_beat() == 3));

        app.change_tempo(5.0);
        assert!(app.runner.is_running());
        assert_eq!(app.runner.tempo_bpm(), 125.0);
        assert_eq!(app.runner.current_beat(), 1);

        // 125 bpm: beat 3 sounds 0.96s after the restart
        clock.set(2.0);
        assert!(wait_for(|| app.runner.current_beat() == 3));

        app.select_pattern(1);
        assert!(app.runner.is_running());
        assert_eq!(app.pattern().name(), "Bulería");
        assert_eq!(app.runner.current_beat(), 1);
    }

    #[test]
    fn tempo_changes_stop_at_the_bounds() {
        let (mut app, _dir) = silent_app(Arc::new(SimulatedClock::new(0.0)));
        for _ in 0..30 {
            app.change_tempo(5.0);
        }
        assert_eq!(app.bpm, MAX_BPM);
        assert_eq!(app.runner.tempo_bpm(), MAX_BPM);

        app.change_tempo(-500.0);
        assert_eq!(app.bpm, MIN_BPM);
        assert_eq!(app.runner.tempo_bpm(), MIN_BPM);
        app.change_tempo(-1.0);
        assert_eq!(app.bpm, MIN_BPM);
    }

    #[test]
    fn failed_clock_stops_playback() {
        let clock = Arc::new(SimulatedClock::new(0.0));
        let (mut app, _dir) = silent_app(clock.clone());
        app.check_clock();
        app.toggle_playback();
        app.check_clock();
        assert!(app.runner.is_running());

        clock.fail_with("device lost");
        app.check_clock();
        assert!(!app.runner.is_running());
        assert_eq!(app.runner.current_beat(), 0);
        let (status, _) = app.status_message.as_ref().unwrap();
        assert!(status.contains("device lost"));

        // a later play attempt reports the dead clock instead of starting
        app.toggle_playback();
        assert!(!app.runner.is_running());
    }

    #[test]
    fn tempo_is_kept_in_range() {
        assert_eq!(clamp_bpm(20.0), MIN_BPM);
        assert_eq!(clamp_bpm(300.0), MAX_BPM);
        assert_eq!(clamp_bpm(96.0), 96.0);
    }
}
