use ratatui::style::Color;

/// Colors for the metronome screen
#[derive(Debug, Clone)]
pub struct Theme {
    pub name: &'static str,
    pub bg: Color,
    pub fg: Color,
    /// Beat currently sounding
    pub beat_active: Color,
    pub beat_accent: Color,
    pub beat_plain: Color,
    pub label: Color,
    pub border: Color,
    pub highlight: Color,
    pub dimmed: Color,
    pub playing: Color,
}

impl Theme {
    /// Default theme - uses terminal's ANSI colors
    pub fn default_theme() -> Self {
        Self {
            name: "default",
            bg: Color::Reset,
            fg: Color::Reset,
            beat_active: Color::Yellow,
            beat_accent: Color::Red,
            beat_plain: Color::Gray,
            label: Color::Cyan,
            border: Color::White,
            highlight: Color::Magenta,
            dimmed: Color::DarkGray,
            playing: Color::Green,
        }
    }

    /// Classic green CRT phosphor look
    pub fn phosphor_green() -> Self {
        Self {
            name: "phosphor-green",
            bg: Color::Black,
            fg: Color::Rgb(0, 255, 0),
            beat_active: Color::Rgb(180, 255, 180),
            beat_accent: Color::Rgb(0, 255, 0),
            beat_plain: Color::Rgb(0, 120, 0),
            label: Color::Rgb(0, 200, 0),
            border: Color::Rgb(0, 180, 0),
            highlight: Color::Rgb(150, 255, 150),
            dimmed: Color::Rgb(0, 60, 0),
            playing: Color::Rgb(0, 255, 0),
        }
    }

    /// Warm amber monochrome CRT
    pub fn amber_crt() -> Self {
        Self {
            name: "amber-crt",
            bg: Color::Black,
            fg: Color::Rgb(255, 176, 0),
            beat_active: Color::Rgb(255, 220, 150),
            beat_accent: Color::Rgb(255, 176, 0),
            beat_plain: Color::Rgb(130, 90, 0),
            label: Color::Rgb(200, 140, 0),
            border: Color::Rgb(180, 125, 0),
            highlight: Color::Rgb(255, 220, 150),
            dimmed: Color::Rgb(60, 40, 0),
            playing: Color::Rgb(255, 176, 0),
        }
    }

    /// Cool blue terminal tones
    pub fn blue_terminal() -> Self {
        Self {
            name: "blue-terminal",
            bg: Color::Black,
            fg: Color::Rgb(100, 180, 255),
            beat_active: Color::Rgb(180, 220, 255),
            beat_accent: Color::Rgb(100, 180, 255),
            beat_plain: Color::Rgb(40, 80, 130),
            label: Color::Rgb(80, 150, 220),
            border: Color::Rgb(70, 130, 200),
            highlight: Color::Rgb(180, 220, 255),
            dimmed: Color::Rgb(25, 50, 80),
            playing: Color::Rgb(100, 180, 255),
        }
    }

    /// Stark black and white high contrast
    pub fn high_contrast() -> Self {
        Self {
            name: "high-contrast",
            bg: Color::Black,
            fg: Color::White,
            beat_active: Color::White,
            beat_accent: Color::White,
            beat_plain: Color::Rgb(120, 120, 120),
            label: Color::White,
            border: Color::White,
            highlight: Color::White,
            dimmed: Color::Rgb(80, 80, 80),
            playing: Color::White,
        }
    }

    /// Get theme by name
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "default" => Some(Self::default_theme()),
            "phosphor-green" => Some(Self::phosphor_green()),
            "amber-crt" => Some(Self::amber_crt()),
            "blue-terminal" => Some(Self::blue_terminal()),
            "high-contrast" => Some(Self::high_contrast()),
            _ => None,
        }
    }

    /// List all available theme names
    pub fn available_themes() -> &'static [&'static str] {
        &[
            "default",
            "phosphor-green",
            "amber-crt",
            "blue-terminal",
            "high-contrast",
        ]
    }

    /// The theme after this one, wrapping around
    pub fn next(&self) -> Self {
        let names = Self::available_themes();
        let index = names.iter().position(|&n| n == self.name).unwrap_or(0);
        Self::from_name(names[(index + 1) % names.len()]).unwrap_or_default()
    }
}

impl Default for Theme {
    fn default() -> Self {
        Self::default_theme()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_listed_theme_resolves_and_cycles() {
        let mut theme = Theme::default();
        for &name in Theme::available_themes() {
            assert_eq!(Theme::from_name(name).unwrap().name, name);
            theme = theme.next();
        }
        assert_eq!(theme.name, "default");
    }
}
