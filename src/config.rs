use config::{Config as ExternalConfig, ConfigError, Environment, File, FileFormat};
use serde::{Deserialize, Serialize};
use serde_repr::*;
use std::env;
use std::fmt::{Display, Formatter, Result};
use std::path::{Path, PathBuf};

pub const CONFIG_FILE_NAME: &str = "sc_clone.json";
pub const ENV_PREFIX: &str = "SC_CLONE";

///"logging":{
//       "default_level":3,
//       "loggers":[
//          {
//             "component":"sc_clone::service_control::windows_service_control",
//             "level":1
//          }
//       ],
//       "file":"C:\\ProgramData\\sc_clone\\sc_clone.log"
//    }

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize_repr, Serialize_repr)]
#[repr(u8)]
pub enum LogLevel {
    Trace = 0,
    Debug = 1,
    Info = 2,
    Warning = 3,
    Error = 4,
    Critical = 5,
    None = 6,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct ComponentLogger {
    pub component: String,
    pub level: LogLevel,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct LoggingConfig {
    pub default_level: LogLevel,
    #[serde(default)]
    pub loggers: Vec<ComponentLogger>,
    #[serde(default)]
    pub file: Option<PathBuf>,
}

impl Display for LoggingConfig {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        match serde_json::to_string_pretty(&self) {
            Ok(serialized) => write!(f, "\n{serialized}"),
            Err(_) => write!(f, "{self:?}"),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> LoggingConfig {
        LoggingConfig {
            default_level: LogLevel::Warning,
            loggers: vec![],
            file: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    // Remote computer to manage, local one when absent
    pub machine: Option<String>,
    pub color: bool,
    pub logging: LoggingConfig,
}

impl Config {
    pub fn new() -> Config {
        Config {
            machine: None,
            color: true,
            logging: LoggingConfig::default(),
        }
    }

    /// Reads `path` (or `sc_clone.json` beside the executable) and then the
    /// `SC_CLONE__*` environment. Anything missing or unreadable keeps its
    /// default. An unreadable file is logged as a warning, so logging should
    /// already be up.
    pub fn load(path: Option<&Path>) -> Config {
        let path = path.map(Path::to_path_buf).unwrap_or_else(default_config_path);
        match Config::try_load(&path) {
            Ok(config) => config,
            Err(e) => {
                log::warn!("Config: could not read {}: {e}, using defaults", path.display());
                Config::new()
            }
        }
    }

    pub fn try_load(path: &Path) -> std::result::Result<Config, ConfigError> {
        let settings = Config::settings(path, Environment::with_prefix(ENV_PREFIX))?;
        Ok(Config::settings_to_config(&settings))
    }

    fn settings(
        path: &Path,
        environment: Environment,
    ) -> std::result::Result<ExternalConfig, ConfigError> {
        ExternalConfig::builder()
            .add_source(File::new(&path.to_string_lossy(), FileFormat::Json).required(false))
            .add_source(environment.separator("__").try_parsing(true))
            .build()
    }

    // settings is external object
    pub(crate) fn settings_to_config(settings: &ExternalConfig) -> Config {
        let defaults = Config::new();
        let machine = match settings.get::<String>("machine") {
            Ok(machine) if !machine.is_empty() => {
                log::info!("Config: Got machine value from settings: {machine}");
                Some(machine)
            }
            _ => defaults.machine,
        };
        Config {
            machine,
            color: Config::get_value_or_default(settings, "color", defaults.color),
            logging: Config::get_value_or_default(settings, "logging", defaults.logging),
        }
    }

    fn get_value_or_default<'a, T: Display + Deserialize<'a>>(
        settings: &ExternalConfig,
        key: &str,
        default_value: T,
    ) -> T {
        if let Ok(value) = settings.get(key) {
            log::info!("Config: Got {} value from settings: {}", key, value);
            value
        } else {
            log::info!("Config: Kept default {} value: {}", key, default_value);
            default_value
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}

fn default_config_path() -> PathBuf {
    match env::current_exe() {
        Ok(exe) => exe.with_file_name(CONFIG_FILE_NAME),
        Err(e) => {
            log::warn!(
                "Could not locate the executable ({e}), looking for {CONFIG_FILE_NAME} in the working directory"
            );
            PathBuf::from(CONFIG_FILE_NAME)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::fs;

    fn write_settings(file_name: &str, contents: &str) -> PathBuf {
        let path = env::temp_dir().join(file_name);
        fs::write(&path, contents).expect("Couldn't write settings file");
        path
    }

    // Keeps tests independent of the real process environment
    fn load_with_env(path: &Path, vars: &[(&str, &str)]) -> Config {
        let source = vars
            .iter()
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect::<HashMap<_, _>>();
        let environment = Environment::with_prefix(ENV_PREFIX).source(Some(source));
        Config::settings_to_config(&Config::settings(path, environment).unwrap())
    }

    #[test]
    fn missing_file_gives_defaults() {
        let config = load_with_env(Path::new("definitely_missing_sc_clone.json"), &[]);
        assert_eq!(config, Config::new());
        assert_eq!(config.logging.default_level, LogLevel::Warning);
    }

    #[test]
    fn file_values_are_read() {
        let path = write_settings(
            "sc_clone_config_file_values.json",
            r#"{
                "machine": "buildhost",
                "color": false,
                "logging": {
                    "default_level": 1,
                    "loggers": [{"component": "sc_clone::cli", "level": 0}],
                    "file": "sc_clone.log"
                }
            }"#,
        );
        let config = load_with_env(&path, &[]);
        fs::remove_file(&path).ok();
        assert_eq!(config.machine.as_deref(), Some("buildhost"));
        assert!(!config.color);
        assert_eq!(config.logging.default_level, LogLevel::Debug);
        assert_eq!(
            config.logging.loggers,
            vec![ComponentLogger {
                component: "sc_clone::cli".to_string(),
                level: LogLevel::Trace,
            }]
        );
        assert_eq!(config.logging.file, Some(PathBuf::from("sc_clone.log")));
    }

    #[test]
    fn environment_overrides_file() {
        let path = write_settings(
            "sc_clone_config_env_override.json",
            r#"{"machine": "buildhost", "color": true}"#,
        );
        let config = load_with_env(
            &path,
            &[("SC_CLONE__MACHINE", "otherhost"), ("SC_CLONE__COLOR", "false")],
        );
        fs::remove_file(&path).ok();
        assert_eq!(config.machine.as_deref(), Some("otherhost"));
        assert!(!config.color);
    }

    #[test]
    fn broken_logging_section_keeps_default() {
        let path = write_settings(
            "sc_clone_config_broken_logging.json",
            r#"{"logging": {"default_level": "loud"}}"#,
        );
        let config = load_with_env(&path, &[]);
        fs::remove_file(&path).ok();
        assert_eq!(config.logging, LoggingConfig::default());
    }

    #[test]
    fn malformed_file_is_an_error() {
        let path = write_settings("sc_clone_config_malformed.json", r#"{ "color": tru"#);
        let result = Config::try_load(&path);
        let fallback = Config::load(Some(&path));
        fs::remove_file(&path).ok();
        assert!(result.is_err());
        assert_eq!(fallback, Config::new());
    }
}
