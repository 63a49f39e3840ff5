//! Configuration management for ytmp3

use crate::error::ConfigError;
use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub paths: PathsConfig,
    pub output: OutputConfig,
    pub batch: BatchConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathsConfig {
    /// Path to yt-dlp binary (auto-detected if not set)
    pub yt_dlp: Option<PathBuf>,
    /// Path to FFmpeg binary (left to yt-dlp if not set)
    pub ffmpeg: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Default output directory
    pub default_directory: PathBuf,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchConfig {
    /// Concurrent downloads
    pub workers: usize,
    /// MP3 bitrate, e.g. "192K"
    pub bitrate: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            paths: PathsConfig {
                yt_dlp: None,
                ffmpeg: None,
            },
            output: OutputConfig {
                default_directory: PathBuf::from("downloads"),
            },
            batch: BatchConfig {
                workers: 4,
                bitrate: "192K".to_string(),
            },
        }
    }
}

impl Config {
    /// Load configuration from file and environment
    pub fn load(config_file: Option<&Path>) -> Result<Self, ConfigError> {
        let mut figment = Figment::new().merge(Serialized::defaults(Config::default()));

        if let Some(default_config) = Self::default_config_path() {
            if default_config.exists() {
                figment = figment.merge(Toml::file(&default_config));
            }
        }

        if let Some(path) = config_file {
            if !path.exists() {
                return Err(ConfigError::LoadError(format!(
                    "config file not found: {}",
                    path.display()
                )));
            }
            figment = figment.merge(Toml::file(path));
        }

        // Double underscore so keys like `paths.yt_dlp` survive the split
        figment = figment.merge(Env::prefixed("YTMP3_").split("__"));

        figment.extract().map_err(|e| ConfigError::LoadError(e.to_string()))
    }

    /// User-level config file, `<config_dir>/ytmp3/config.toml`
    pub fn default_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join("ytmp3/config.toml"))
    }

    /// Get yt-dlp path, auto-detecting if not configured. A configured path must exist.
    pub fn yt_dlp_path(&self) -> Result<PathBuf, ConfigError> {
        if let Some(ref path) = self.paths.yt_dlp {
            if path.is_file() {
                Ok(path.clone())
            } else {
                Err(ConfigError::InvalidValue(format!(
                    "configured yt-dlp not found: {}",
                    path.display()
                )))
            }
        } else {
            which::which("yt-dlp")
                .map_err(|_| ConfigError::InvalidValue("yt-dlp not found in PATH".to_string()))
        }
    }

    /// Explicitly configured FFmpeg path. yt-dlp searches PATH itself otherwise.
    pub fn ffmpeg_path(&self) -> Option<PathBuf> {
        self.paths.ffmpeg.clone()
    }

    pub fn bitrate(&self) -> Result<Bitrate, ConfigError> {
        self.batch.bitrate.parse()
    }
}

/// Target MP3 bitrate in kbps
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Bitrate(u32);

impl Bitrate {
    pub fn new(kbps: u32) -> Result<Self, ConfigError> {
        if kbps == 0 {
            return Err(ConfigError::InvalidValue("bitrate must be positive".to_string()));
        }
        Ok(Self(kbps))
    }

    pub fn kbps(&self) -> u32 {
        self.0
    }
}

impl Default for Bitrate {
    fn default() -> Self {
        Self(192)
    }
}

impl FromStr for Bitrate {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || ConfigError::InvalidValue(format!("invalid bitrate {:?}, expected e.g. 192K", s));

        // Accepts "192K", "192k" or a bare "192"
        let re = Regex::new(r"^(\d+)[kK]?$").map_err(|_| invalid())?;
        let caps = re.captures(s.trim()).ok_or_else(invalid)?;
        let kbps: u32 = caps[1].parse().map_err(|_| invalid())?;

        Self::new(kbps)
    }
}

impl fmt::Display for Bitrate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}K", self.0)
    }
}
