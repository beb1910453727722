//! Deployment platform.

#[cfg(feature = "config")]
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString};

/// Platform the service runs on. Destructive admin operations are only
/// allowed on [`Platform::Dev`].
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
#[derive(Serialize, Deserialize, Display, EnumString, AsRefStr)]
#[cfg_attr(feature = "config", derive(ValueEnum))]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Platform {
    /// Local development.
    Dev,
    /// Anything else.
    #[default]
    Production,
}

impl Platform {
    /// Returns `true` on the development platform.
    #[inline]
    pub fn is_dev(self) -> bool {
        self == Self::Dev
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn production_is_default() {
        assert_eq!(Platform::default(), Platform::Production);
        assert!(!Platform::default().is_dev());
        assert_eq!("dev".parse::<Platform>().ok(), Some(Platform::Dev));
    }
}
