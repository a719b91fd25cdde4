use std::io::Write;
use std::sync::Arc;

use anyhow::Result;
use parking_lot::Mutex;

use crate::sequencer::{BeatScheduler, ClockSource, RhythmPattern, ScheduledBeat, SimulatedClock, Timing};

/// Run the scheduler against a simulated clock stepped once per poll
/// interval up to `seconds`, printing every committed beat.
pub fn run(
    pattern: &RhythmPattern,
    bpm: f64,
    timing: Timing,
    seconds: f64,
    out: &mut impl Write,
) -> Result<()> {
    let clock = Arc::new(SimulatedClock::new(0.0));
    let mut scheduler = BeatScheduler::new(clock.clone(), timing);
    scheduler.configure(pattern.clone(), bpm)?;

    writeln!(
        out,
        "{}: {} beats at {} bpm (poll {:?}, horizon {:.3}s)",
        pattern.name(),
        pattern.beat_count(),
        bpm,
        timing.poll_interval(),
        timing.horizon_secs()
    )?;

    let committed = Arc::new(Mutex::new(Vec::<ScheduledBeat>::new()));
    let sink = committed.clone();
    scheduler.start(move |beat| sink.lock().push(beat))?;
    print_beats(&committed, out)?;

    let step = timing.poll_interval().as_secs_f64();
    let steps = (seconds / step + 1e-9).floor() as u64;
    for i in 1..=steps {
        clock.set(i as f64 * step);
        scheduler.tick();
        print_beats(&committed, out)?;
    }

    writeln!(
        out,
        "display beat at {:.3}s: {}",
        clock.now(),
        scheduler.current_beat()
    )?;
    scheduler.stop();
    Ok(())
}

fn print_beats(committed: &Mutex<Vec<ScheduledBeat>>, out: &mut impl Write) -> Result<()> {
    for beat in committed.lock().drain(..) {
        let kind = if beat.accent { "accent" } else { "plain" };
        writeln!(out, "beat {:>2}  {:>8.3}s  {}", beat.number, beat.time, kind)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn output(pattern: &RhythmPattern, bpm: f64, seconds: f64) -> String {
        let mut out = Vec::new();
        run(pattern, bpm, Timing::default(), seconds, &mut out).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn tangos_schedule() {
        let tangos = RhythmPattern::new("Tangos", 4, &[1, 3], 2).unwrap();
        let text = output(&tangos, 120.0, 1.2);
        let beats: Vec<&str> = text.lines().filter(|l| l.starts_with("beat")).collect();
        assert_eq!(
            beats,
            vec![
                "beat  1     0.000s  accent",
                "beat  2     0.500s  plain",
                "beat  3     1.000s  accent",
            ]
        );
        assert!(text.lines().last().unwrap().ends_with(": 3"));
    }

    #[test]
    fn numbering_wraps_around_the_cycle() {
        let tangos = RhythmPattern::new("Tangos", 4, &[1, 3], 2).unwrap();
        let text = output(&tangos, 240.0, 1.2);
        let numbers: Vec<&str> = text
            .lines()
            .filter(|l| l.starts_with("beat"))
            .map(|l| l.split_whitespace().nth(1).unwrap())
            .collect();
        // beats every 0.25s up to 1.275s
        assert_eq!(numbers, vec!["1", "2", "3", "4", "1", "2"]);
    }

    #[test]
    fn bad_tempo_fails_before_printing() {
        let tangos = RhythmPattern::new("Tangos", 4, &[1, 3], 2).unwrap();
        let mut out = Vec::new();
        assert!(run(&tangos, 0.0, Timing::default(), 1.0, &mut out).is_err());
        assert!(out.is_empty());
    }
}
