//! Animation states and palettes supplied by the session controller.

use serde::{Deserialize, Serialize};

/// Visual state of the assistant, as reported by the session/speech controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnimationState {
    /// Nothing happening, slow ambient drift.
    #[default]
    Idle,
    /// Microphone open, waiting for speech.
    Listening,
    /// Assistant is talking.
    Speaking,
    /// Multi-turn conversation in progress.
    Conversation,
}

impl AnimationState {
    /// All states in ascending activity order.
    pub const ALL: [Self; 4] = [
        Self::Idle,
        Self::Listening,
        Self::Conversation,
        Self::Speaking,
    ];

    /// Parses a state name case-insensitively. Unknown names fall back to
    /// [`AnimationState::Idle`] so a malformed value never stalls the loop.
    #[must_use]
    pub fn from_name(name: &str) -> Self {
        match name.trim().to_ascii_lowercase().as_str() {
            "listening" => Self::Listening,
            "speaking" => Self::Speaking,
            "conversation" => Self::Conversation,
            _ => Self::Idle,
        }
    }

    /// Lowercase name of this state.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Listening => "listening",
            Self::Speaking => "speaking",
            Self::Conversation => "conversation",
        }
    }
}

/// Color/type weighting scheme chosen by the user's theme.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Palette {
    /// Soft, rounded particles in warm colors.
    #[default]
    Friendly,
    /// Sparks and trails in high-contrast colors.
    Dramatic,
}
