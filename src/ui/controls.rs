use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, List, ListItem, ListState, Paragraph};

use crate::sequencer::RhythmPattern;
use crate::synth::{Instrument, SoundSet};
use crate::ui::Theme;

/// Snapshot for the transport bar
pub struct TransportInfo {
    pub playing: bool,
    pub bpm: f64,
    pub current_beat: u32,
    pub beat_count: u32,
    pub output: &'static str,
}

fn panel<'a>(title: &'a str, theme: &Theme) -> Block<'a> {
    Block::default()
        .title(Span::styled(title, Style::default().fg(theme.label)))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(theme.border))
        .style(Style::default().bg(theme.bg))
}

/// Render transport status bar
pub fn render_transport(frame: &mut Frame, area: Rect, info: &TransportInfo, theme: &Theme) {
    let status = if info.playing { "PLAY" } else { "STOP" };
    let status_style = if info.playing {
        Style::default().fg(theme.playing).bold()
    } else {
        Style::default().fg(theme.dimmed)
    };
    let beat = if info.playing && info.current_beat > 0 {
        format!("{:2}/{}", info.current_beat, info.beat_count)
    } else {
        format!(" -/{}", info.beat_count)
    };

    let text = vec![
        Span::styled(format!(" {} ", status), status_style),
        Span::styled(" | ", Style::default().fg(theme.border)),
        Span::styled(format!("BPM: {:.0}", info.bpm), Style::default().fg(theme.fg)),
        Span::styled(" | ", Style::default().fg(theme.border)),
        Span::styled(format!("Beat: {}", beat), Style::default().fg(theme.fg)),
        Span::styled(" | ", Style::default().fg(theme.border)),
        Span::styled(info.output, Style::default().fg(theme.dimmed)),
    ];

    let transport = Paragraph::new(Line::from(text))
        .style(Style::default().bg(theme.bg))
        .block(panel(" Compás ", theme));
    frame.render_widget(transport, area);
}

/// Render the palo selector
pub fn render_patterns(
    frame: &mut Frame,
    area: Rect,
    catalog: &[RhythmPattern],
    selected: usize,
    theme: &Theme,
) {
    let items: Vec<ListItem> = catalog
        .iter()
        .map(|p| ListItem::new(format!("{:<12} {:>2}", p.name(), p.beat_count())))
        .collect();

    let list = List::new(items)
        .block(panel(" Palo ", theme))
        .style(Style::default().fg(theme.fg).bg(theme.bg))
        .highlight_style(Style::default().fg(theme.highlight).bold())
        .highlight_symbol("> ");

    let mut state = ListState::default().with_selected(Some(selected));
    frame.render_stateful_widget(list, area, &mut state);
}

/// Render the instrument toggles
pub fn render_sounds(frame: &mut Frame, area: Rect, sounds: &SoundSet, theme: &Theme) {
    let lines: Vec<Line> = Instrument::ALL
        .iter()
        .enumerate()
        .map(|(i, &instrument)| {
            let on = sounds.is_enabled(instrument);
            let (mark, style) = if on {
                ("[x]", Style::default().fg(theme.highlight))
            } else {
                ("[ ]", Style::default().fg(theme.dimmed))
            };
            Line::from(vec![
                Span::styled(format!("{} ", i + 1), Style::default().fg(theme.dimmed)),
                Span::styled(mark, style),
                Span::styled(
                    format!(" {}", instrument.display_name()),
                    Style::default().fg(theme.fg),
                ),
            ])
        })
        .collect();

    frame.render_widget(Paragraph::new(lines).block(panel(" Sounds ", theme)), area);
}

/// One cell per beat, `X` on accents, split into groups of `subdivision`
pub fn mask_line(pattern: &RhythmPattern) -> String {
    let group = pattern.subdivision() as usize;
    pattern
        .accent_mask()
        .chunks(group)
        .map(|chunk| chunk.iter().map(|&on| if on { 'X' } else { '.' }).collect::<String>())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Render beat count, accents and grouping of the selected palo
pub fn render_pattern_info(frame: &mut Frame, area: Rect, pattern: &RhythmPattern, theme: &Theme) {
    let accents = pattern
        .accents()
        .iter()
        .map(|a| a.to_string())
        .collect::<Vec<_>>()
        .join(" ");

    let lines = vec![
        Line::from(vec![
            Span::styled("Beats:   ", Style::default().fg(theme.dimmed)),
            Span::styled(pattern.beat_count().to_string(), Style::default().fg(theme.fg)),
        ]),
        Line::from(vec![
            Span::styled("Accents: ", Style::default().fg(theme.dimmed)),
            Span::styled(accents, Style::default().fg(theme.beat_accent)),
        ]),
        Line::from(vec![
            Span::styled("Groups:  ", Style::default().fg(theme.dimmed)),
            Span::styled(
                pattern.subdivision().to_string(),
                Style::default().fg(theme.fg),
            ),
        ]),
        Line::from(vec![
            Span::styled("Compás:  ", Style::default().fg(theme.dimmed)),
            Span::styled(mask_line(pattern), Style::default().fg(theme.beat_accent)),
        ]),
    ];

    frame.render_widget(Paragraph::new(lines).block(panel(" Info ", theme)), area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sequencer::flamenco_patterns;

    #[test]
    fn mask_line_groups_by_subdivision() {
        let catalog = flamenco_patterns();
        assert_eq!(mask_line(&catalog[0]), ".. X. .X .X .X .X");
        assert_eq!(mask_line(&catalog[3]), "X. X.");
        assert_eq!(mask_line(&catalog[5]), "X.. X.. X.. X..");
    }
}
