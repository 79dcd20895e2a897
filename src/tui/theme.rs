//! Light and dark palettes.

use ratatui::style::Color;

/// Colors used by the renderer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Theme {
    pub background: Color,
    pub panel: Color,
    pub text: Color,
    pub muted: Color,
    /// Unfilled part of the ring and progress bar
    pub track: Color,
    /// Filled part of the ring, icons, button
    pub accent: Color,
}

pub const LIGHT: Theme = Theme {
    background: Color::Rgb(243, 244, 246), // gray-100
    panel: Color::Rgb(255, 255, 255),
    text: Color::Rgb(0, 0, 0),
    muted: Color::Rgb(75, 85, 99), // gray-600
    track: Color::Rgb(229, 231, 235), // gray-200
    accent: Color::Rgb(59, 130, 246),
};

pub const DARK: Theme = Theme {
    background: Color::Rgb(17, 24, 39), // gray-900
    panel: Color::Rgb(31, 41, 55),      // gray-800
    text: Color::Rgb(255, 255, 255),
    muted: Color::Rgb(156, 163, 175), // gray-400
    track: Color::Rgb(55, 65, 81),    // gray-700
    accent: Color::Rgb(34, 211, 238),
};

impl Theme {
    pub fn for_mode(dark_mode: bool) -> Theme {
        if dark_mode {
            DARK
        } else {
            LIGHT
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_for_mode() {
        assert_eq!(Theme::for_mode(true), DARK);
        assert_eq!(Theme::for_mode(false), LIGHT);
        assert_ne!(DARK.background, LIGHT.background);
    }
}
