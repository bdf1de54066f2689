//! Configuration management for javelin.
//!
//! The rest of the launcher never reads configuration files itself; it is
//! handed an immutable [`Config`] value built once at startup.
use serde::Deserialize;
use std::{fs, path::Path};

use crate::error::LauncherError;

/// Represents the structure of the configuration file.
#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct Config {
    /// Configuration version.
    pub version: Option<String>,
    /// Runtime discovery preferences.
    pub runtime: RuntimeConfig,
    /// Launch command assembly options.
    pub launch: LaunchConfig,
    /// Supervision behaviour.
    pub supervise: SuperviseConfig,
}

/// Preferences applied while discovering and ranking JVM installations.
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct RuntimeConfig {
    /// Required major version; candidates that do not match are dropped.
    pub version: Option<String>,
    /// Vendor substring that moves matching candidates to the front.
    pub preferred: String,
    /// Extra JVM installation directories to probe, in addition to the
    /// cache directory, environment variables, and `PATH`.
    pub paths: Vec<String>,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            version: Some("21".into()),
            preferred: "GraalVM".into(),
            paths: Vec::new(),
        }
    }
}

/// Options folded into the assembled launch command.
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct LaunchConfig {
    /// Path to the application jar, resolved against the working directory.
    pub app_jar: String,
    /// Directory of dependency jars appended to the classpath as a glob.
    /// `None` disables the library bundle check entirely.
    pub lib_dir: Option<String>,
    /// Fully qualified class started once the classpath is assembled.
    pub main_class: Option<String>,
    /// Maximum heap size, e.g. `4G` (becomes `-Xmx4G`).
    pub max_memory: Option<String>,
    /// Initial heap size, e.g. `512M` (becomes `-Xms512M`).
    pub min_memory: Option<String>,
    /// Raw `-X...` style VM flags appended verbatim.
    pub vm_options: Vec<String>,
    /// `-XX` flag names enabled for the server VM, e.g. `UseZGC`.
    pub xx_options: Vec<String>,
    /// Additional `--add-opens` module specs beyond the built-in set.
    pub add_opens: Vec<String>,
    /// System properties as `key=value` entries, forwarded in order.
    pub properties: Vec<String>,
    /// Trailing program arguments passed to the main class.
    pub args: Vec<String>,
}

impl Default for LaunchConfig {
    fn default() -> Self {
        Self {
            app_jar: "server.jar".into(),
            lib_dir: Some("libs".into()),
            main_class: None,
            max_memory: None,
            min_memory: None,
            vm_options: Vec::new(),
            xx_options: Vec::new(),
            add_opens: Vec::new(),
            properties: Vec::new(),
            args: Vec::new(),
        }
    }
}

/// Restart and stdin-bridge policy for the supervised process.
#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct SuperviseConfig {
    /// Relaunch the server after it exits, behind an interruptible countdown.
    pub auto_restart: bool,
    /// File polled as a pseudo-stdin channel, relative to the working
    /// directory.
    pub stdin_file: Option<String>,
}

/// Loads and parses the configuration file.
///
/// A missing default config file is not an error: the launcher falls back to
/// built-in defaults so that `javelin locate` works out of the box. An
/// explicitly named file that cannot be read still fails loudly.
pub fn load_config(config_path: Option<&str>) -> Result<Config, LauncherError> {
    let path = config_path.map(Path::new).unwrap_or_else(|| {
        if Path::new("javelin.yaml").exists() {
            Path::new("javelin.yaml")
        } else {
            Path::new("javelin.yml")
        }
    });

    if config_path.is_none() && !path.exists() {
        return Ok(Config::default());
    }

    let content = fs::read_to_string(path).map_err(|e| {
        LauncherError::ConfigReadError(std::io::Error::new(
            e.kind(),
            format!("{} ({})", e, path.display()),
        ))
    })?;

    let config: Config =
        serde_yaml::from_str(&content).map_err(LauncherError::ConfigParseError)?;
    Ok(config)
}
