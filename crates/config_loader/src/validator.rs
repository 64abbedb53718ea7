//! 配置校验模块
//!
//! Field-level rules (ranges, non-empty strings) come from the `Validate`
//! derives on the contract types. Cross-field rules live here:
//! - spawn_point indices unique
//! - color strings parse as `R,G,B`
//! - timeout and teardown delay finite (TOML accepts `inf` and `nan`)
//! - teardown delay bounds non-negative and ordered

use std::collections::HashSet;

use contracts::{Color, ContractError, ScenarioConfig};
use validator::Validate;

/// 校验 ScenarioConfig 配置
///
/// 返回第一个遇到的错误，或 Ok(())。
pub fn validate(config: &ScenarioConfig) -> Result<(), ContractError> {
    validate_fields(config)?;
    validate_timeout(config)?;
    validate_spawn_points(config)?;
    validate_colors(config)?;
    validate_teardown_delay(config)?;
    Ok(())
}

fn validate_fields(config: &ScenarioConfig) -> Result<(), ContractError> {
    config
        .validate()
        .map_err(|e| ContractError::config_validation("scenario", e.to_string()))
}

/// Range rules compare false against NaN, so `nan` slips through the derive
fn validate_timeout(config: &ScenarioConfig) -> Result<(), ContractError> {
    let timeout = config.client.timeout_sec;
    if !timeout.is_finite() || timeout <= 0.0 {
        return Err(ContractError::config_validation(
            "client.timeout_sec",
            format!("timeout_sec must be a finite number > 0, got {timeout}"),
        ));
    }
    Ok(())
}

/// Two vehicles on one spawn point always collide, the second spawn is refused
fn validate_spawn_points(config: &ScenarioConfig) -> Result<(), ContractError> {
    let mut seen = HashSet::new();
    for (idx, vehicle) in config.vehicles.iter().enumerate() {
        if !seen.insert(vehicle.spawn_point) {
            return Err(ContractError::config_validation(
                format!("vehicles[{idx}].spawn_point"),
                format!("duplicate spawn_point {}", vehicle.spawn_point),
            ));
        }
    }
    Ok(())
}

fn validate_colors(config: &ScenarioConfig) -> Result<(), ContractError> {
    for (idx, vehicle) in config.vehicles.iter().enumerate() {
        if let Some(color) = &vehicle.color {
            Color::parse_rgb(color).map_err(|e| {
                ContractError::config_validation(format!("vehicles[{idx}].color"), e.to_string())
            })?;
        }
    }
    Ok(())
}

fn validate_teardown_delay(config: &ScenarioConfig) -> Result<(), ContractError> {
    let [min, max] = config.run.teardown_delay_sec;
    if !min.is_finite() || !max.is_finite() {
        return Err(ContractError::config_validation(
            "run.teardown_delay_sec",
            format!("delays must be finite, got [{min}, {max}]"),
        ));
    }
    if min < 0.0 || max < 0.0 {
        return Err(ContractError::config_validation(
            "run.teardown_delay_sec",
            format!("delays must be >= 0, got [{min}, {max}]"),
        ));
    }
    if min > max {
        return Err(ContractError::config_validation(
            "run.teardown_delay_sec",
            format!("min ({min}) must be <= max ({max})"),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use contracts::{CameraConfig, CleanupConfig, RecordingConfig, VehicleSpawnConfig};

    fn minimal_config() -> ScenarioConfig {
        ScenarioConfig {
            vehicles: vec![VehicleSpawnConfig {
                filter: "vehicle.*".into(),
                spawn_point: 56,
                color: Some("255,0,0".into()),
                autopilot: true,
                camera: Some(CameraConfig::default()),
            }],
            cleanup: Some(CleanupConfig::default()),
            recording: Some(RecordingConfig {
                file: "session.log".into(),
                additional_data: false,
            }),
            ..ScenarioConfig::default()
        }
    }

    #[test]
    fn test_valid_config() {
        let config = minimal_config();
        assert!(validate(&config).is_ok());
    }

    #[test]
    fn test_zero_port() {
        let mut config = minimal_config();
        config.client.port = 0;
        let err = validate(&config).unwrap_err().to_string();
        assert!(err.contains("port must be > 0"), "got: {err}");
    }

    #[test]
    fn test_non_positive_timeout() {
        let mut config = minimal_config();
        config.client.timeout_sec = 0.0;
        let err = validate(&config).unwrap_err().to_string();
        assert!(err.contains("timeout_sec"), "got: {err}");
    }

    #[test]
    fn test_non_finite_timeout() {
        for timeout in [f64::INFINITY, f64::NAN] {
            let mut config = minimal_config();
            config.client.timeout_sec = timeout;
            let err = validate(&config).unwrap_err().to_string();
            assert!(err.contains("timeout_sec"), "{timeout} gave: {err}");
        }
    }

    #[test]
    fn test_non_finite_teardown_delay() {
        for delay in [[0.0, f64::INFINITY], [f64::NAN, 1.0]] {
            let mut config = minimal_config();
            config.run.teardown_delay_sec = delay;
            let err = validate(&config).unwrap_err().to_string();
            assert!(err.contains("finite"), "{delay:?} gave: {err}");
        }
    }

    #[test]
    fn test_duplicate_spawn_point() {
        let mut config = minimal_config();
        config.vehicles.push(config.vehicles[0].clone());
        let err = validate(&config).unwrap_err().to_string();
        assert!(err.contains("duplicate spawn_point"), "got: {err}");
    }

    #[test]
    fn test_invalid_color() {
        let mut config = minimal_config();
        config.vehicles[0].color = Some("red".into());
        let err = validate(&config).unwrap_err().to_string();
        assert!(err.contains("vehicles[0].color"), "got: {err}");
    }

    #[test]
    fn test_zero_capture_rate() {
        let mut config = minimal_config();
        config.vehicles[0].camera.as_mut().unwrap().capture_rate = 0;
        let err = validate(&config).unwrap_err().to_string();
        assert!(err.contains("capture_rate"), "got: {err}");
    }

    #[test]
    fn test_non_positive_max_distance() {
        let mut config = minimal_config();
        config.cleanup.as_mut().unwrap().max_distance = 0.0;
        let err = validate(&config).unwrap_err().to_string();
        assert!(err.contains("max_distance"), "got: {err}");
    }

    #[test]
    fn test_empty_recording_file() {
        let mut config = minimal_config();
        config.recording.as_mut().unwrap().file = String::new();
        let err = validate(&config).unwrap_err().to_string();
        assert!(err.contains("file cannot be empty"), "got: {err}");
    }

    #[test]
    fn test_teardown_delay_order() {
        let mut config = minimal_config();
        config.run.teardown_delay_sec = [6.0, 2.0];
        let err = validate(&config).unwrap_err().to_string();
        assert!(err.contains("must be <= max"), "got: {err}");

        config.run.teardown_delay_sec = [-1.0, 2.0];
        let err = validate(&config).unwrap_err().to_string();
        assert!(err.contains("must be >= 0"), "got: {err}");
    }
}
