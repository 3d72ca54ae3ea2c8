//! Configuration of the crash report tools.
//!
//! All tools read the same optional YAML file. Every value has a default, so an absent file is
//! equivalent to an empty configuration.

use std::env;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::de::{self, Deserializer};
use serde::Deserialize;
use tracing::level_filters::LevelFilter;

/// The name of the configuration file looked up in the home directory.
pub const CONFIG_FILE_NAME: &str = ".ipsym.yml";

/// The directory Xcode stores archives in.
pub const DEFAULT_ARCHIVES_DIR: &str = "~/Library/Developer/Xcode/Archives";

/// The crash symbolicator shipped with Xcode 15 and later.
pub const DEFAULT_CRASH_SYMBOLICATOR: &str = "/Applications/Xcode.app/Contents/SharedFrameworks/\
     CoreSymbolicationDT.framework/Versions/A/Resources/CrashSymbolicator.py";

/// Controls the log format
#[derive(Clone, Copy, Debug, Eq, PartialEq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Auto detect (pretty for tty, simplified for other)
    Auto,
    /// With colors
    Pretty,
    /// Simplified log output
    Simplified,
    /// Dump out JSON lines
    Json,
}

/// Controls the logging system.
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct Logging {
    /// The log level.
    #[serde(deserialize_with = "deserialize_level_filter")]
    pub level: LevelFilter,
    /// Controls the log format.
    pub format: LogFormat,
}

impl Default for Logging {
    fn default() -> Self {
        Logging {
            level: LevelFilter::INFO,
            format: LogFormat::Auto,
        }
    }
}

/// Locations of the external programs.
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct Tools {
    /// The program used to read dSYM UUIDs.
    pub dwarfdump: PathBuf,
    /// The Python interpreter running the crash symbolicator.
    pub python: PathBuf,
    /// Path to Xcode's `CrashSymbolicator.py`.
    pub crash_symbolicator: PathBuf,
    /// Path to the legacy `symbolicatecrash` script.
    ///
    /// Defaults to `symbolicatecrash` in the directory of the running executable.
    pub symbolicatecrash: Option<PathBuf>,
    /// Passed to `symbolicatecrash` as `DEVELOPER_DIR` when set.
    pub developer_dir: Option<PathBuf>,
    /// The program used to reveal a found dSYM.
    pub open: PathBuf,
}

impl Default for Tools {
    fn default() -> Self {
        Tools {
            dwarfdump: PathBuf::from("dwarfdump"),
            python: PathBuf::from("python3"),
            crash_symbolicator: PathBuf::from(DEFAULT_CRASH_SYMBOLICATOR),
            symbolicatecrash: None,
            developer_dir: None,
            open: PathBuf::from("open"),
        }
    }
}

impl Tools {
    /// Returns the configured or default location of `symbolicatecrash`.
    pub fn symbolicatecrash_path(&self) -> PathBuf {
        if let Some(ref path) = self.symbolicatecrash {
            return path.clone();
        }

        env::current_exe()
            .ok()
            .and_then(|exe| exe.parent().map(|dir| dir.join("symbolicatecrash")))
            .unwrap_or_else(|| PathBuf::from("symbolicatecrash"))
    }
}

/// The configuration shared by all tools.
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Directories searched for Xcode archives, in order.
    ///
    /// A leading `~` is expanded to the home directory.
    pub archives: Vec<PathBuf>,

    /// Locations of the external programs.
    pub tools: Tools,

    /// Configuration for internal logging.
    pub logging: Logging,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            archives: vec![PathBuf::from(DEFAULT_ARCHIVES_DIR)],
            tools: Tools::default(),
            logging: Logging::default(),
        }
    }
}

impl Config {
    /// Loads the configuration.
    ///
    /// An explicitly given file must exist. Without one, `~/.ipsym.yml` is used if present.
    pub fn get(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::from_reader(
                fs::File::open(path).context("failed to open configuration file")?,
            ),
            None => match default_config_path() {
                Some(path) if path.is_file() => Self::from_reader(
                    fs::File::open(&path).context("failed to open configuration file")?,
                )
                .with_context(|| format!("invalid configuration file {}", path.display())),
                _ => Ok(Config::default()),
            },
        }
    }

    fn from_reader(mut reader: impl std::io::Read) -> Result<Self> {
        let mut config = String::new();
        reader
            .read_to_string(&mut config)
            .context("failed reading config file")?;
        // check for empty files explicitly
        if config.trim().is_empty() {
            anyhow::bail!("config file empty");
        }
        serde_yaml::from_str(&config).context("failed to parse config YAML")
    }
}

fn default_config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(CONFIG_FILE_NAME))
}

#[derive(Debug)]
struct LevelFilterVisitor;

impl<'de> de::Visitor<'de> for LevelFilterVisitor {
    type Value = LevelFilter;

    fn expecting(&self, formatter: &mut fmt::Formatter) -> std::fmt::Result {
        write!(
            formatter,
            r#"one of the strings "off", "error", "warn", "info", "debug", or "trace""#
        )
    }

    fn visit_str<E>(self, v: &str) -> Result<Self::Value, E>
    where
        E: de::Error,
    {
        match v {
            "off" => Ok(LevelFilter::OFF),
            "error" => Ok(LevelFilter::ERROR),
            "warn" => Ok(LevelFilter::WARN),
            "info" => Ok(LevelFilter::INFO),
            "debug" => Ok(LevelFilter::DEBUG),
            "trace" => Ok(LevelFilter::TRACE),
            _ => Err(de::Error::unknown_variant(
                v,
                &["off", "error", "warn", "info", "debug", "trace"],
            )),
        }
    }
}

fn deserialize_level_filter<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<LevelFilter, D::Error> {
    deserializer.deserialize_str(LevelFilterVisitor)
}
