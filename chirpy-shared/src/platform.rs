/// Deployment mode of the service
///
/// The mode is read once at startup and never changes afterwards. Only
/// [`Platform::Dev`] unlocks destructive maintenance operations such as the
/// full data reset.
use serde::{Deserialize, Serialize};
use std::fmt;

/// Deployment mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    /// Local development, reset allowed
    Dev,

    /// Anything that is not explicitly development
    #[default]
    Production,
}

impl Platform {
    /// Parses the `PLATFORM` value
    ///
    /// Only the exact string `dev` selects development mode. Every other
    /// value, including typos, selects production so that reset stays locked.
    ///
    /// # Example
    ///
    /// ```
    /// use chirpy_shared::platform::Platform;
    ///
    /// assert_eq!(Platform::parse("dev"), Platform::Dev);
    /// assert_eq!(Platform::parse("DEV "), Platform::Production);
    /// ```
    pub fn parse(value: &str) -> Self {
        match value {
            "dev" => Platform::Dev,
            _ => Platform::Production,
        }
    }

    /// Whether development-only operations are permitted
    pub fn is_dev(&self) -> bool {
        matches!(self, Platform::Dev)
    }

    /// Gets platform as string
    pub fn as_str(&self) -> &'static str {
        match self {
            Platform::Dev => "dev",
            Platform::Production => "production",
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
