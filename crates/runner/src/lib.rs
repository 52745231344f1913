//! Mock Drive Runner
//!
//! Loads a runner configuration, builds the configured preset drive and
//! simulates it against a delegate that logs every callback.

use anyhow::Context;
use config::{Config, Environment, File, FileFormat};
use drive_model::{AccidentInfo, DriveInfo, DriveStartInfo, Event, VehicleInfo};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use mock_drive::PresetTrip;
use serde::{Deserialize, Serialize};
use simulation::{DriveDelegate, MockSettings, SdkContext, SimulationReport, Simulator};
use std::path::Path;
use std::sync::Arc;
use tracing::{info, warn, Level};
use tracing_subscriber::FmtSubscriber;
use vehicle_tagging::VehicleRegistry;

/// Prefix of environment variables overriding the runner config
pub const RUNNER_ENV_PREFIX: &str = "MOCK_DRIVE_RUNNER";

/// What to simulate and against which SDK state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunnerConfig {
    pub preset: PresetTrip,
    /// Wall-clock time the trip is replayed in
    pub run_time_ms: i64,
    pub sdk: SdkContext,
    pub mock: MockSettings,
    /// Vehicle id tag attached to the drive
    pub vehicle_id: Option<String>,
    /// Vehicles associated before the simulation starts
    pub vehicles: Vec<VehicleInfo>,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            preset: PresetTrip::Urban10MinTrip,
            run_time_ms: 30_000,
            sdk: SdkContext::default(),
            mock: MockSettings::mock_enabled(),
            vehicle_id: None,
            vehicles: Vec::new(),
        }
    }
}

impl RunnerConfig {
    /// Defaults, overridden by an optional file, overridden by
    /// `MOCK_DRIVE_RUNNER_*` variables (`__` separates nested keys)
    pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        let mut builder = Config::builder().add_source(Config::try_from(&Self::default())?);
        if let Some(path) = path {
            builder = builder.add_source(File::from(path).required(false));
        }
        let config = builder
            .add_source(
                Environment::with_prefix(RUNNER_ENV_PREFIX)
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .context("Failed to load runner config")?
            .try_deserialize()
            .context("Invalid runner config")?;
        Ok(config)
    }

    /// Parse a TOML config on top of the defaults
    pub fn from_toml(contents: &str) -> anyhow::Result<Self> {
        let config = Config::builder()
            .add_source(Config::try_from(&Self::default())?)
            .add_source(File::from_str(contents, FileFormat::Toml))
            .build()?
            .try_deserialize()?;
        Ok(config)
    }
}

/// Initialize logging
pub fn init_logging(level: Level) -> anyhow::Result<()> {
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(true)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .context("Failed to set tracing subscriber")
}

/// Install the prometheus recorder and describe the simulation metrics
pub fn install_metrics() -> anyhow::Result<PrometheusHandle> {
    let handle = PrometheusBuilder::new()
        .install_recorder()
        .context("Failed to install prometheus recorder")?;

    metrics::describe_counter!(
        "mock_drive_callbacks_delivered_total",
        "Drive callbacks delivered, by callback kind"
    );
    metrics::describe_counter!(
        "mock_drive_simulations_started_total",
        "Simulations that passed all checks"
    );
    metrics::describe_counter!(
        "mock_drive_simulations_rejected_total",
        "Simulations rejected, by reason"
    );
    metrics::describe_gauge!(
        "mock_drive_simulation_running",
        "1 while a simulation is delivering callbacks"
    );
    Ok(handle)
}

/// Logs every callback it receives
#[derive(Debug, Default)]
pub struct LoggingDelegate;

impl LoggingDelegate {
    fn log_accident(label: &str, info: &AccidentInfo) {
        match info.to_json() {
            Ok(json) => info!("{}: {}", label, json),
            Err(e) => warn!("{} for drive {} not serializable: {}", label, info.drive_id, e),
        }
    }
}

impl DriveDelegate for LoggingDelegate {
    fn process_start_of_drive(&self, info: &DriveStartInfo) {
        info!("Drive {} started at {}", info.drive_id, info.start_timestamp);
    }

    fn process_event(&self, event: &Event) {
        info!(
            "Event {} ({:?}) lasting {} ms",
            event.event_type.as_str(),
            event.severity,
            event.duration_ms()
        );
    }

    fn process_potential_accident_detected(&self, info: &AccidentInfo) {
        Self::log_accident("Potential accident", info);
    }

    fn process_accident_detected(&self, info: &AccidentInfo) {
        if info.is_invalidation() {
            info!("Accident {} retracted", info.accident_id);
        }
        Self::log_accident("Accident", info);
    }

    fn process_end_of_drive(&self, info: &DriveInfo) {
        info!(
            "Drive {} ended: {:.0} m in {} ms",
            info.drive_id,
            info.distance,
            info.duration_ms()
        );
    }

    fn process_analysis_of_drive(&self, info: &DriveInfo) {
        info!(
            "Drive {} analyzed: score {}, {} events",
            info.drive_id,
            info.score.zendrive_score,
            info.events.len()
        );
    }
}

/// Build the configured drive and simulate it to completion
pub async fn run(config: &RunnerConfig) -> anyhow::Result<SimulationReport> {
    let registry = Arc::new(VehicleRegistry::new());
    registry.set_sdk_setup(config.sdk.setup_complete)?;
    for vehicle in &config.vehicles {
        registry
            .associate_vehicle(vehicle.clone())
            .with_context(|| format!("Failed to associate vehicle {}", vehicle.vehicle_id))?;
    }

    let mut builder = config.preset.builder()?;
    if let Some(vehicle_id) = &config.vehicle_id {
        builder = builder.vehicle_id_tag(vehicle_id.clone());
    }
    let drive = builder
        .build()
        .with_context(|| format!("Failed to build preset {}", config.preset))?;

    info!(
        "Simulating {} ({} ms trip) in {} ms",
        config.preset,
        drive.duration_ms(),
        config.run_time_ms
    );

    let simulator =
        Simulator::new(config.mock.clone(), Arc::new(LoggingDelegate)).with_registry(registry);
    let handle = simulator.simulate_drive(&drive, config.run_time_ms, &config.sdk)?;
    let report = handle.wait().await?;
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use simulation::{CallbackKind, DriveDetectionMode, SimulationError};

    #[test]
    fn test_default_config() {
        let config = RunnerConfig::default();
        assert_eq!(config.preset, PresetTrip::Urban10MinTrip);
        assert!(config.mock.mock_mode_enabled);
        assert!(config.sdk.setup_complete);
    }

    #[test]
    fn test_config_from_toml() {
        let config = RunnerConfig::from_toml(
            r#"
            preset = "Urban30MinWithMultipleCollisionCallbackTrip"
            run_time_ms = 5000
            vehicle_id = "car-1"

            [sdk]
            drive_detection_mode = "auto_off"
            vehicle_type = "Motorcycle"

            [[vehicles]]
            vehicle_id = "car-1"
            bluetooth_id = "14:0F:C7:62:F8:9E"
            "#,
        )
        .unwrap();
        assert_eq!(
            config.preset,
            PresetTrip::Urban30MinWithMultipleCollisionCallbackTrip
        );
        assert_eq!(config.run_time_ms, 5_000);
        assert_eq!(config.sdk.drive_detection_mode, DriveDetectionMode::AutoOff);
        // Unset nested keys keep their defaults
        assert!(config.sdk.implements_multiple_accident_callbacks);
        assert_eq!(config.vehicles.len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_run_preset() {
        let config = RunnerConfig {
            preset: PresetTrip::Urban30MinWithCollisionTrip,
            run_time_ms: 10_000,
            vehicle_id: Some("car-1".to_string()),
            vehicles: vec![VehicleInfo::new("car-1", "14:0F:C7:62:F8:9E")],
            ..RunnerConfig::default()
        };
        let report = run(&config).await.unwrap();
        assert_eq!(report.count(CallbackKind::Accident), 1);
        // start + hard brake, hard turn, accident events + accident + end + analysis
        assert_eq!(report.count(CallbackKind::Event), 3);
        assert_eq!(report.deliveries.len(), 7);
        assert_eq!(
            report.associated_vehicle.map(|v| v.vehicle_id),
            Some("car-1".to_string())
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_run_rejected_when_mock_mode_off() {
        let config = RunnerConfig {
            mock: MockSettings::default(),
            ..RunnerConfig::default()
        };
        let err = run(&config).await.unwrap_err();
        assert_eq!(
            err.downcast_ref::<SimulationError>(),
            Some(&SimulationError::NotMockDriveBuild)
        );
    }
}
