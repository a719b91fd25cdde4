use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Paragraph};

use crate::sequencer::RhythmPattern;
use crate::ui::Theme;

/// Beat number shown at a slot. Slot 0 is the top of the wheel and holds
/// the last beat of the cycle, then 1, 2, ... clockwise.
pub fn beat_at_slot(slot: u32, beats: u32) -> u32 {
    if slot == 0 {
        beats
    } else {
        slot
    }
}

/// Cell offsets of each slot inside a `width` x `height` area.
/// Terminal cells are about twice as tall as wide, so the x radius is doubled.
pub fn slot_offsets(beats: u32, width: u16, height: u16) -> Vec<(u16, u16)> {
    let cx = (width.saturating_sub(2)) as f64 / 2.0;
    let cy = (height.saturating_sub(1)) as f64 / 2.0;
    let ry = cy.min(cx / 2.0).max(0.0);
    let rx = ry * 2.0;

    (0..beats)
        .map(|slot| {
            let angle = slot as f64 * std::f64::consts::TAU / beats as f64
                - std::f64::consts::FRAC_PI_2;
            let x = (cx + rx * angle.cos()).round().max(0.0) as u16;
            let y = (cy + ry * angle.sin()).round().max(0.0) as u16;
            (x, y)
        })
        .collect()
}

/// Render the rotating beat indicator
pub fn render_wheel(
    frame: &mut Frame,
    area: Rect,
    pattern: &RhythmPattern,
    current_beat: u32,
    playing: bool,
    theme: &Theme,
) {
    let block = Block::default()
        .title(Span::styled(
            format!(" {} ", pattern.name()),
            Style::default().fg(theme.label).bold(),
        ))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(theme.border))
        .style(Style::default().bg(theme.bg));

    let inner = block.inner(area);
    frame.render_widget(block, area);
    if inner.width < 8 || inner.height < 5 {
        return;
    }

    let beats = pattern.beat_count();
    for (slot, (dx, dy)) in slot_offsets(beats, inner.width, inner.height)
        .into_iter()
        .enumerate()
    {
        let beat = beat_at_slot(slot as u32, beats);
        let is_active = playing && beat == current_beat;
        let style = if is_active {
            Style::default().fg(theme.bg).bg(theme.beat_active).bold()
        } else if pattern.is_accent(beat) {
            Style::default().fg(theme.beat_accent).bold()
        } else {
            Style::default().fg(theme.beat_plain)
        };

        let cell = Rect::new(inner.x + dx, inner.y + dy, 2, 1).intersection(inner);
        frame.render_widget(Paragraph::new(format!("{:>2}", beat)).style(style), cell);
    }

    // Big beat number in the middle of the wheel
    let center_text = if playing && current_beat > 0 {
        format!("{}", current_beat)
    } else {
        "--".to_string()
    };
    let center_style = if playing && pattern.is_accent(current_beat) {
        Style::default().fg(theme.beat_accent).bold()
    } else {
        Style::default().fg(theme.fg).bold()
    };
    let center = Rect::new(inner.x, inner.y + inner.height / 2, inner.width, 1);
    frame.render_widget(
        Paragraph::new(center_text)
            .style(center_style)
            .alignment(Alignment::Center),
        center,
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn top_slot_holds_last_beat() {
        assert_eq!(beat_at_slot(0, 12), 12);
        assert_eq!(beat_at_slot(1, 12), 1);
        assert_eq!(beat_at_slot(11, 12), 11);
        assert_eq!(beat_at_slot(0, 1), 1);
    }

    #[test]
    fn slots_go_clockwise_from_the_top() {
        let offsets = slot_offsets(4, 42, 21);
        // top, right, bottom, left
        assert_eq!(offsets[0], (20, 0));
        assert_eq!(offsets[1], (40, 10));
        assert_eq!(offsets[2], (20, 20));
        assert_eq!(offsets[3], (0, 10));
    }

    #[test]
    fn slots_stay_inside_small_areas() {
        for beats in [1, 4, 12] {
            for (x, y) in slot_offsets(beats, 10, 5) {
                assert!(x + 2 <= 10 && y < 5, "({}, {})", x, y);
            }
        }
    }
}
