//! Status line shown next to each gallery control

use schemars::JsonSchema;
use serde::Serialize;

/// Visual tone of a status message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum Tone {
    /// Neutral progress or informational text
    Info,
    /// Successful outcome
    Ok,
    /// Failed outcome
    Error,
}

impl Tone {
    /// CSS class used by the HTML shell
    #[must_use]
    pub const fn css_class(self) -> &'static str {
        match self {
            Self::Info => "status-info",
            Self::Ok => "status-ok",
            Self::Error => "status-error",
        }
    }
}

/// A status message, the rendered outcome of a gallery operation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, JsonSchema)]
pub struct StatusMessage {
    /// Visual tone
    pub tone: Tone,
    /// Message text
    pub text: String,
}

impl StatusMessage {
    /// Informational message
    #[must_use]
    pub fn info(text: impl Into<String>) -> Self {
        Self {
            tone: Tone::Info,
            text: text.into(),
        }
    }

    /// Success message
    #[must_use]
    pub fn ok(text: impl Into<String>) -> Self {
        Self {
            tone: Tone::Ok,
            text: text.into(),
        }
    }

    /// Error message
    #[must_use]
    pub fn error(text: impl Into<String>) -> Self {
        Self {
            tone: Tone::Error,
            text: text.into(),
        }
    }
}
