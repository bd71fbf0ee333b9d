//! Terminal equivalent of a toast: a one-line success or error message.

use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notice {
    pub level: Level,
    pub message: String,
}

impl Notice {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            level: Level::Success,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: Level::Error,
            message: message.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        self.level == Level::Success
    }

    /// Record the notice in the trace log
    pub fn log(&self) {
        match self.level {
            Level::Success => info!("notice: {}", self.message),
            Level::Error => warn!("notice: {}", self.message),
        }
    }
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.level {
            Level::Success => write!(f, "✓ {}", self.message),
            Level::Error => write!(f, "✗ {}", self.message),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_marks_level() {
        assert_eq!(Notice::success("Category added").to_string(), "✓ Category added");
        assert_eq!(Notice::error("Failed to add group").to_string(), "✗ Failed to add group");
    }

    #[test]
    fn serializes_lowercase_level() {
        let json = serde_json::to_value(Notice::error("x")).unwrap();
        assert_eq!(json["level"], "error");
    }
}
