//! Configuration loading and management.

use std::path::{Path, PathBuf};

use figment::Figment;
use figment::providers::{Env, Format, Serialized, Toml};
use serde::{Deserialize, Serialize};

/// Application configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Number of teaching weeks used for the average weekly load.
    pub semester_weeks: u32,

    /// Round-trip travel time to campus, in hours.
    pub commute_hours_per_trip: f64,

    /// Classify events on the rayon thread pool.
    pub parallel: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            semester_weeks: 15,
            commute_hours_per_trip: 2.0,
            parallel: false,
        }
    }
}

impl Config {
    /// Loads configuration, optionally from a specific file.
    #[expect(
        clippy::result_large_err,
        reason = "figment::Error is large but only returned at startup"
    )]
    pub fn load_from(config_path: Option<&Path>) -> Result<Self, figment::Error> {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        if let Some(config_dir) = dirs_config_path() {
            figment = figment.merge(Toml::file(config_dir.join("config.toml")));
        }

        if let Some(path) = config_path {
            figment = figment.merge(Toml::file(path));
        }

        // SCHEDSTAT_SEMESTER_WEEKS, SCHEDSTAT_COMMUTE_HOURS_PER_TRIP, ...
        figment = figment.merge(Env::prefixed("SCHEDSTAT_"));

        figment.extract()
    }
}

/// Returns the platform-specific config directory for schedstat.
///
/// On Linux: `~/.config/schedstat`
pub fn dirs_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join("schedstat"))
}
