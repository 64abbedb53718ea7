//! # Config Loader
//!
//! Scenario configuration loading.
//!
//! Responsibilities:
//! - Parse TOML/JSON configuration files
//! - Validate configuration legality
//! - Produce `ScenarioConfig`
//!
//! # Example
//!
//! ```no_run
//! use config_loader::ConfigLoader;
//! use std::path::Path;
//!
//! let config = ConfigLoader::load_from_path(Path::new("scenario.toml")).unwrap();
//! println!("Map: {}", config.client.map);
//! ```

mod parser;
mod validator;

pub use contracts::ScenarioConfig;
pub use parser::ConfigFormat;

use contracts::ContractError;
use std::path::Path;

/// Configuration loader
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration from file path
    ///
    /// Format is detected from the file extension (.toml / .json).
    ///
    /// # Errors
    /// - File read failure
    /// - Unsupported format
    /// - Parse failure
    /// - Validation failure
    pub fn load_from_path(path: &Path) -> Result<ScenarioConfig, ContractError> {
        let format = Self::detect_format(path)?;
        let content = std::fs::read_to_string(path)?;
        Self::load_from_str(&content, format)
    }

    /// Load configuration from string
    pub fn load_from_str(
        content: &str,
        format: ConfigFormat,
    ) -> Result<ScenarioConfig, ContractError> {
        let config = parser::parse(content, format)?;
        validator::validate(&config)?;
        Ok(config)
    }

    /// Validate an already constructed configuration
    pub fn validate(config: &ScenarioConfig) -> Result<(), ContractError> {
        validator::validate(config)
    }

    /// Serialize ScenarioConfig to TOML string
    pub fn to_toml(config: &ScenarioConfig) -> Result<String, ContractError> {
        toml::to_string_pretty(config)
            .map_err(|e| ContractError::config_parse(format!("TOML serialize error: {e}")))
    }

    /// Serialize ScenarioConfig to JSON string
    pub fn to_json(config: &ScenarioConfig) -> Result<String, ContractError> {
        serde_json::to_string_pretty(config)
            .map_err(|e| ContractError::config_parse(format!("JSON serialize error: {e}")))
    }

    fn detect_format(path: &Path) -> Result<ConfigFormat, ContractError> {
        let ext = path.extension().and_then(|e| e.to_str()).ok_or_else(|| {
            ContractError::config_parse("cannot determine file format from extension")
        })?;

        ConfigFormat::from_extension(ext).ok_or_else(|| {
            ContractError::config_parse(format!("unsupported config format: .{ext}"))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const SPAWN_VEHICLE_TOML: &str = r#"
[client]
host = "localhost"
timeout_sec = 10.0
map = "Town04"
force_reset = true

[spectator.transform.location]
x = 123.756668
y = 0.951465
z = 25.576216
[spectator.transform.rotation]
pitch = -17.857296
yaw = 174.745468
roll = 0.000119

[debug]
draw_spawn_points = true
life_time = 10.0

[[vehicles]]
filter = "vehicle.*"
spawn_point = 56
"#;

    #[test]
    fn test_load_from_str_toml() {
        let result = ConfigLoader::load_from_str(SPAWN_VEHICLE_TOML, ConfigFormat::Toml);
        assert!(result.is_ok(), "Failed: {:?}", result.err());
        let config = result.unwrap();
        assert_eq!(config.client.map, "Town04");
        assert!(config.debug.draw_spawn_points);
        assert!(config.spectator.unwrap().transform.is_some());
    }

    #[test]
    fn test_round_trip_toml() {
        let config = ConfigLoader::load_from_str(SPAWN_VEHICLE_TOML, ConfigFormat::Toml).unwrap();
        let serialized = ConfigLoader::to_toml(&config).unwrap();
        let config2 = ConfigLoader::load_from_str(&serialized, ConfigFormat::Toml).unwrap();
        assert_eq!(config.client, config2.client);
        assert_eq!(config.vehicles.len(), config2.vehicles.len());
        assert_eq!(config.spectator, config2.spectator);
    }

    #[test]
    fn test_json_from_toml() {
        let config = ConfigLoader::load_from_str(SPAWN_VEHICLE_TOML, ConfigFormat::Toml).unwrap();
        let json = ConfigLoader::to_json(&config).unwrap();
        let config2 = ConfigLoader::load_from_str(&json, ConfigFormat::Json).unwrap();
        assert_eq!(config.client.map, config2.client.map);
    }

    #[test]
    fn test_load_from_path() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        file.write_all(SPAWN_VEHICLE_TOML.as_bytes()).unwrap();

        let config = ConfigLoader::load_from_path(file.path()).unwrap();
        assert_eq!(config.vehicles[0].spawn_point, 56);
    }

    #[test]
    fn test_unsupported_extension() {
        let file = tempfile::Builder::new().suffix(".yaml").tempfile().unwrap();
        let err = ConfigLoader::load_from_path(file.path()).unwrap_err();
        assert!(err.to_string().contains("unsupported config format"), "got: {err}");
    }

    #[test]
    fn test_toml_inf_and_nan_rejected() {
        let timeout = "[client]\ntimeout_sec = inf\n";
        let err = ConfigLoader::load_from_str(timeout, ConfigFormat::Toml).unwrap_err();
        assert!(err.to_string().contains("timeout_sec"), "got: {err}");

        let timeout = "[client]\ntimeout_sec = nan\n";
        assert!(ConfigLoader::load_from_str(timeout, ConfigFormat::Toml).is_err());

        let delay = "[run]\nteardown_delay_sec = [0.0, inf]\n";
        let err = ConfigLoader::load_from_str(delay, ConfigFormat::Toml).unwrap_err();
        assert!(err.to_string().contains("teardown_delay_sec"), "got: {err}");
    }

    #[test]
    fn test_validation_runs_after_parse() {
        let content = r#"
[[vehicles]]
spawn_point = 1

[[vehicles]]
spawn_point = 1
"#;
        let result = ConfigLoader::load_from_str(content, ConfigFormat::Toml);
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("duplicate"));
    }
}
