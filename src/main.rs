mod app;
mod audio;
mod command;
mod config;
mod dry_run;
mod error;
mod logging;
mod samples;
mod sequencer;
mod synth;
mod ui;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;

use app::App;
use config::Settings;
use logging::LogTarget;
use sequencer::find_pattern;
use synth::SoundSet;
use ui::Theme;

/// Compás - flamenco metronome for the terminal
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Tempo in beats per minute
    #[arg(long)]
    bpm: Option<f64>,

    /// Palo to play (e.g. solea, buleria, tangos)
    #[arg(long)]
    pattern: Option<String>,

    /// Comma separated sounds: palo,jaleo,castanets,cajon
    #[arg(long)]
    sounds: Option<String>,

    /// Theme to use for the interface
    #[arg(long)]
    theme: Option<String>,

    /// Settings file (default ~/.compas/settings.json)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Scheduler poll interval in milliseconds
    #[arg(long)]
    poll_ms: Option<u64>,

    /// Scheduling lookahead in seconds
    #[arg(long)]
    horizon: Option<f64>,

    /// Run without an audio device (visual only)
    #[arg(long)]
    silent: bool,

    /// Print the beat schedule for SECS seconds of a simulated clock and exit
    #[arg(long, value_name = "SECS")]
    dry_run: Option<f64>,

    /// List available palos and exit
    #[arg(long)]
    list_patterns: bool,

    /// List available themes and exit
    #[arg(long)]
    list_themes: bool,

    /// Log filter (error, warn, info, debug, trace or a RUST_LOG style filter)
    #[arg(long)]
    log_level: Option<String>,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let tui = !(args.list_themes || args.list_patterns || args.dry_run.is_some());
    let log_path = samples::data_dir().join("compas.log");
    let target = if tui {
        LogTarget::File(&log_path)
    } else {
        LogTarget::Stderr
    };
    if let Err(e) = logging::init(args.log_level.as_deref(), target) {
        eprintln!("Warning: logging disabled: {:#}", e);
    }

    // Handle --list-themes
    if args.list_themes {
        println!("Available themes:");
        for theme in Theme::available_themes() {
            println!("  {}", theme);
        }
        return Ok(());
    }

    let settings_path = args.config.clone().unwrap_or_else(Settings::default_path);
    let settings = apply_overrides(Settings::load_or_default(&settings_path)?, &args)?;
    let catalog = settings.catalog();

    if args.list_patterns {
        println!("Available patterns:");
        for pattern in &catalog {
            let accents: Vec<String> = pattern.accents().iter().map(|a| a.to_string()).collect();
            println!(
                "  {:<12} {:>2} beats  accents {}",
                pattern.name(),
                pattern.beat_count(),
                accents.join(" ")
            );
        }
        return Ok(());
    }

    if let Some(seconds) = args.dry_run {
        let pattern = find_pattern(&catalog, &settings.pattern).with_context(|| {
            format!(
                "Unknown pattern '{}'. Use --list-patterns to see available patterns.",
                settings.pattern
            )
        })?;
        let timing = settings.timing()?;
        let stdout = std::io::stdout();
        return dry_run::run(pattern, settings.bpm, timing, seconds, &mut stdout.lock());
    }

    // Load theme
    let theme = Theme::from_name(&settings.theme).unwrap_or_else(|| {
        eprintln!(
            "Warning: Unknown theme '{}', using default. Use --list-themes to see available themes.",
            settings.theme
        );
        Theme::default()
    });

    // Run the TUI application
    let mut app = App::new(settings, settings_path, theme, args.silent)?;
    app.run()
}

/// Command line values win over the settings file
fn apply_overrides(mut settings: Settings, args: &Args) -> Result<Settings> {
    if let Some(bpm) = args.bpm {
        settings.bpm = bpm;
    }
    if let Some(pattern) = &args.pattern {
        settings.pattern = pattern.clone();
    }
    if let Some(list) = &args.sounds {
        settings.sounds = SoundSet::parse_list(list)?;
    }
    if let Some(theme) = &args.theme {
        settings.theme = theme.clone();
    }
    if let Some(poll_ms) = args.poll_ms {
        settings.timing.poll_interval_ms = poll_ms;
    }
    if let Some(horizon) = args.horizon {
        settings.timing.schedule_horizon_secs = horizon;
    }
    Ok(settings)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::synth::Instrument;

    #[test]
    fn command_line_overrides_settings() {
        let args = Args::parse_from([
            "compas",
            "--bpm",
            "180",
            "--pattern",
            "buleria",
            "--sounds",
            "palo,cajon",
            "--poll-ms",
            "10",
        ]);
        let settings = apply_overrides(Settings::default(), &args).unwrap();
        assert_eq!(settings.bpm, 180.0);
        assert_eq!(settings.pattern, "buleria");
        assert!(settings.sounds.is_enabled(Instrument::Cajon));
        assert!(!settings.sounds.is_enabled(Instrument::Jaleo));
        assert_eq!(settings.timing.poll_interval_ms, 10);
        assert_eq!(settings.theme, "default");
        assert!(find_pattern(&settings.catalog(), &settings.pattern).is_some());
    }

    #[test]
    fn unknown_sound_is_an_error() {
        let args = Args::parse_from(["compas", "--sounds", "palo,trumpet"]);
        assert!(apply_overrides(Settings::default(), &args).is_err());
    }
}
