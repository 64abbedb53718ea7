//! # Integration Tests
//!
//! 集成测试与端到端测试。
//!
//! 负责：
//! - 配置文件 → ScenarioConfig → Scenario 全流程
//! - 模拟 e2e 测试（无需 CARLA）
//! - 真实 CARLA 冒烟测试（需要服务器，默认忽略）

#[cfg(test)]
mod contract_tests {
    use config_loader::{ConfigFormat, ConfigLoader};
    use contracts::ScenarioConfig;

    #[test]
    fn test_default_config_is_valid() {
        ConfigLoader::validate(&ScenarioConfig::default()).unwrap();
    }

    #[test]
    fn test_serialized_config_loads_back() {
        let config = ConfigLoader::load_from_str(super::SCENARIO_TOML, ConfigFormat::Toml).unwrap();
        let json = ConfigLoader::to_json(&config).unwrap();
        let reloaded = ConfigLoader::load_from_str(&json, ConfigFormat::Json).unwrap();

        assert_eq!(reloaded.client, config.client);
        assert_eq!(reloaded.vehicles.len(), config.vehicles.len());
        assert_eq!(reloaded.recording, config.recording);
    }
}

/// Town04 highway scene: three vehicles, one with a camera, culled at 100 m
#[cfg(test)]
const SCENARIO_TOML: &str = r#"
[client]
host = "localhost"
port = 2000
timeout_sec = 10.0
map = "Town04"
force_reset = true

[spectator]
location = { x = 123.75, y = 0.95, z = 25.57 }
rotation = { pitch = -17.85, yaw = 174.74, roll = 0.0 }

[debug]
draw_spawn_points = true
life_time = 10.0

[[vehicles]]
spawn_point = 56
color = "255,0,0"

[[vehicles]]
filter = "vehicle.audi.*"
spawn_point = 12
camera = { kind = "segmentation", width = 800, height = 600, fov = 90, capture_rate = 10 }

[[vehicles]]
filter = "vehicle.carlamotors.*"
spawn_point = 33
autopilot = false

[cleanup]
max_distance = 100.0

[recording]
file = "town04.log"

[run]
max_ticks = 20
teardown_delay_sec = [0.0, 0.0]
"#;

#[cfg(test)]
mod e2e_tests {
    use std::io::Write;

    use carla_utils::{
        session, world, CameraKind, CarlaClient, MockCarlaClient, MockConfig, Scenario,
        UtilsError,
    };
    use config_loader::ConfigLoader;

    /// End-to-end test: config file -> ConfigLoader -> Scenario -> MockCarlaClient
    ///
    /// 验证完整的流程：
    /// 1. 从文件加载并校验配置
    /// 2. 连接、加载地图、绘制出生点、移动观察者
    /// 3. spawn 车辆和相机，运行 tick 循环
    /// 4. teardown 后世界中不再有动态 actor
    #[tokio::test]
    async fn test_e2e_scenario_from_file() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        file.write_all(super::SCENARIO_TOML.as_bytes()).unwrap();
        let config = ConfigLoader::load_from_path(file.path()).unwrap();

        let client = MockCarlaClient::new();
        let mut scenario = Scenario::new(client.clone(), config).with_seed(42);
        let report = scenario.run_until(std::future::pending::<()>()).await.unwrap();

        assert_eq!(client.map_name().await.unwrap(), "Carla/Maps/Town04");
        assert_eq!(client.load_count(), 1);
        assert_eq!(report.spawned.len(), 3);
        assert_eq!(report.failed, 0);
        assert_eq!(report.cameras.len(), 1);
        assert_eq!(report.ticks, 20);
        assert_eq!(report.recording.as_deref(), Some("town04.log"));

        // Spawn point 56 is at (0, 140): outside 100 m from the start
        assert!(report.removed.contains(&report.spawned[0]));
        assert_eq!(report.destroyed + report.removed.len(), 4);

        assert_eq!(client.dynamic_actor_count(), 0);
        assert_eq!(client.active_recording(), None);
        assert_eq!(client.frame(), 20);

        let summary = report.summary.to_string();
        assert!(summary.contains("Spawned actors: 3"));
    }

    #[tokio::test]
    async fn test_e2e_camera_follows_vehicle() {
        let mut config = ConfigLoader::load_from_str(
            super::SCENARIO_TOML,
            config_loader::ConfigFormat::Toml,
        )
        .unwrap();
        config.cleanup = None;
        config.recording = None;
        config.run.max_ticks = 10;

        // Keep everything alive for inspection after the run
        let client = MockCarlaClient::with_config(MockConfig {
            fail_destroy: (1000..1100).collect(),
            ..MockConfig::default()
        });
        let mut scenario = Scenario::new(client.clone(), config);
        let report = scenario.run_until(std::future::pending::<()>()).await.unwrap();
        assert_eq!(report.destroyed, 0);

        let camera = client.actor(report.cameras[0]).await.unwrap().unwrap();
        let parent = client.actor(report.spawned[1]).await.unwrap().unwrap();
        assert_eq!(camera.parent, Some(parent.id));
        assert_eq!(camera.type_id, CameraKind::SemanticSegmentation.blueprint_id());

        let camera_bp = client.spawned_blueprint(camera.id).unwrap();
        assert_eq!(camera_bp.attribute_value("image_size_x"), Some("800"));
        assert_eq!(camera_bp.attribute_value("sensor_tick"), Some("0.1"));

        // Autopilot off for the third vehicle: it stays on its spawn point
        let parked = client.actor(report.spawned[2]).await.unwrap().unwrap();
        let spawn_points = client.spawn_points().await.unwrap();
        assert_eq!(parked.location(), spawn_points[33].location);
        assert!(!client.is_autopilot(parked.id));

        // Clean up the way a script would after a crashed run
        let destroyed = world::destroy_all_dynamic_actors(&client).await.unwrap();
        assert_eq!(destroyed, 0);
    }

    #[tokio::test]
    async fn test_e2e_unknown_map() {
        let mut config = ConfigLoader::load_from_str(
            super::SCENARIO_TOML,
            config_loader::ConfigFormat::Toml,
        )
        .unwrap();
        config.client.map = "Atlantis".into();

        let mut scenario = Scenario::new(MockCarlaClient::new(), config);
        let err = scenario
            .run_until(std::future::pending::<()>())
            .await
            .unwrap_err();
        assert!(matches!(err, UtilsError::LoadWorldFailed { .. }));
    }

    #[tokio::test]
    async fn test_e2e_session_helpers() {
        let mut client = MockCarlaClient::new();
        let config = session::SessionConfig {
            map: "Town10HD".into(),
            ..Default::default()
        };
        session::create(&mut client, &config).await.unwrap();
        assert_eq!(client.map_name().await.unwrap(), "Carla/Maps/Town10HD");
    }

    #[cfg(feature = "real-carla")]
    #[tokio::test]
    #[ignore = "requires CARLA server"]
    async fn test_e2e_real_carla() {
        let mut config = ConfigLoader::load_from_str(
            super::SCENARIO_TOML,
            config_loader::ConfigFormat::Toml,
        )
        .unwrap();
        config.client.host = "127.0.0.1".into();

        let mut scenario = Scenario::new(carla_utils::RealCarlaClient::new(), config);
        let report = scenario.run_until(std::future::pending::<()>()).await.unwrap();
        assert!(!report.spawned.is_empty());
    }
}
