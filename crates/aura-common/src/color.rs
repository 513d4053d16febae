//! RGBA colors shared by the kernel and its renderers.

use crate::error::ConfigError;

/// Linear RGBA color, each channel in `0.0..=1.0`.
pub type Color = [f32; 4];

/// Named colors used across the palettes and reaction table.
pub mod colors {
    use super::Color;

    /// Pure white.
    pub const WHITE: Color = [1.0, 1.0, 1.0, 1.0];
    /// Soft success green.
    pub const SUCCESS_GREEN: Color = [0.30, 0.85, 0.45, 1.0];
    /// Error red (`#ff4444`).
    pub const ERROR_RED: Color = [1.0, 0.267, 0.267, 1.0];
    /// Thinking purple.
    pub const THINKING_PURPLE: Color = [0.62, 0.45, 0.95, 1.0];
    /// Joke yellow.
    pub const JOKE_YELLOW: Color = [1.0, 0.85, 0.25, 1.0];
    /// Listening blue.
    pub const LISTENING_BLUE: Color = [0.30, 0.60, 1.0, 1.0];
    /// Speaking cyan.
    pub const SPEAKING_CYAN: Color = [0.25, 0.90, 0.95, 1.0];
    /// Warm greeting pink.
    pub const GREETING_PINK: Color = [1.0, 0.55, 0.75, 1.0];
    /// Celebration gold.
    pub const CELEBRATE_GOLD: Color = [1.0, 0.75, 0.20, 1.0];
}

/// Parses `#rrggbb` or `#rrggbbaa` (leading `#` optional) into a [`Color`].
pub fn parse_hex_color(text: &str) -> Result<Color, ConfigError> {
    let hex = text.trim().trim_start_matches('#');
    if !(hex.len() == 6 || hex.len() == 8) || !hex.is_ascii() {
        return Err(ConfigError::InvalidColor(text.to_string()));
    }

    let channel = |i: usize| -> Result<f32, ConfigError> {
        u8::from_str_radix(&hex[i..i + 2], 16)
            .map(|v| f32::from(v) / 255.0)
            .map_err(|_| ConfigError::InvalidColor(text.to_string()))
    };

    let alpha = if hex.len() == 8 { channel(6)? } else { 1.0 };
    Ok([channel(0)?, channel(2)?, channel(4)?, alpha])
}
