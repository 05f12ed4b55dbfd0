//! Server settings read from the environment.

use std::str::FromStr;

use baduk::prelude::{CountdownConfig, RoomConfig, SessionConfig};

pub const BIND_VAR: &str = "BADUK_BIND";
pub const BOARD_SIZE_VAR: &str = "BADUK_BOARD_SIZE";
pub const COUNTDOWN_VAR: &str = "BADUK_COUNTDOWN_SECS";

const DEFAULT_BIND: &str = "0.0.0.0:8080";

/// Board sizes a client UI can reasonably draw.
const BOARD_SIZES: std::ops::RangeInclusive<usize> = 2..=25;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{var}={value:?} is not a valid number")]
    NotANumber { var: &'static str, value: String },

    #[error("{var}={value} is out of range ({min}..={max})")]
    OutOfRange {
        var: &'static str,
        value: usize,
        min: usize,
        max: usize,
    },
}

/// Everything the binary needs to start a server.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub bind: String,
    pub room: RoomConfig,
}

impl ServerConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Builds the config from any variable source. Unset variables keep
    /// their defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let bind = lookup(BIND_VAR).unwrap_or_else(|| DEFAULT_BIND.to_string());

        let mut room = RoomConfig::default();
        if let Some(size) = parse::<usize>(&lookup, BOARD_SIZE_VAR)? {
            if !BOARD_SIZES.contains(&size) {
                return Err(ConfigError::OutOfRange {
                    var: BOARD_SIZE_VAR,
                    value: size,
                    min: *BOARD_SIZES.start(),
                    max: *BOARD_SIZES.end(),
                });
            }
            room.session = SessionConfig { board_size: size };
        }
        if let Some(secs) = parse::<u32>(&lookup, COUNTDOWN_VAR)? {
            room.countdown = CountdownConfig::from_secs(secs);
        }

        Ok(Self { bind, room })
    }
}

fn parse<T: FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    var: &'static str,
) -> Result<Option<T>, ConfigError> {
    match lookup(var) {
        None => Ok(None),
        Some(value) => value
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::NotANumber { var, value }),
    }
}
