//! Drive Simulator
//!
//! Checks that a drive may be simulated, then replays its timeline on a
//! tokio task. At most one simulation runs per simulator at a time.

use crate::context::{DriveDetectionMode, SdkContext};
use crate::delegate::DriveDelegate;
use crate::error::SimulationError;
use crate::settings::MockSettings;
use crate::timeline::{CallbackKind, Timeline};
use drive_model::{VehicleInfo, VehicleType};
use mock_drive::MockDrive;
use serde::Serialize;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::{sleep_until, Instant};
use tracing::{debug, info, warn};
use vehicle_tagging::VehicleRegistry;

/// Longest accepted run time: 5 hours
pub const MAX_RUN_TIME_MS: i64 = 5 * 60 * 60 * 1_000;

/// Lifecycle of the simulator
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SimulationState {
    /// No simulation has run yet
    #[default]
    Idle,
    Running { drive_id: String },
    /// The last simulation delivered `delivered` callbacks
    Completed { drive_id: String, delivered: usize },
}

/// A callback that was delivered
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Delivery {
    pub kind: CallbackKind,
    pub trip_offset_ms: i64,
    pub scaled_offset_ms: i64,
}

/// Outcome of a finished simulation
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SimulationReport {
    pub drive_id: String,
    pub run_time_ms: i64,
    pub scale_ratio: f64,
    pub deliveries: Vec<Delivery>,
    /// Associated vehicle resolved from the drive's vehicle id tags
    pub associated_vehicle: Option<VehicleInfo>,
}

impl SimulationReport {
    /// Number of deliveries of `kind`
    pub fn count(&self, kind: CallbackKind) -> usize {
        self.deliveries.iter().filter(|d| d.kind == kind).count()
    }

    /// Pretty-printed JSON
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

/// Handle to a running simulation
#[derive(Debug)]
pub struct SimulationHandle {
    drive_id: String,
    task: JoinHandle<SimulationReport>,
}

impl SimulationHandle {
    pub fn drive_id(&self) -> &str {
        &self.drive_id
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }

    /// Wait for the last callback to be delivered
    pub async fn wait(self) -> Result<SimulationReport, SimulationError> {
        self.task
            .await
            .map_err(|e| SimulationError::Internal(format!("Simulation task failed: {}", e)))
    }
}

/// Releases the single-flight lock when the run ends or its task is dropped
struct RunGuard {
    state: Arc<Mutex<SimulationState>>,
    drive_id: String,
    delivered: usize,
}

impl Drop for RunGuard {
    fn drop(&mut self) {
        let next = SimulationState::Completed {
            drive_id: self.drive_id.clone(),
            delivered: self.delivered,
        };
        match self.state.lock() {
            Ok(mut state) => *state = next,
            // Still release the lock after a delegate panic
            Err(poisoned) => *poisoned.into_inner() = next,
        }
        metrics::gauge!("mock_drive_simulation_running").set(0.0);
    }
}

/// Simulates mock drives against a delegate
pub struct Simulator {
    settings: MockSettings,
    delegate: Arc<dyn DriveDelegate>,
    registry: Option<Arc<VehicleRegistry>>,
    state: Arc<Mutex<SimulationState>>,
}

impl Simulator {
    /// Create a new simulator
    pub fn new(settings: MockSettings, delegate: Arc<dyn DriveDelegate>) -> Self {
        info!(
            "Creating drive simulator (mock mode {})",
            if settings.mock_mode_enabled { "on" } else { "off" }
        );
        Self {
            settings,
            delegate,
            registry: None,
            state: Arc::new(Mutex::new(SimulationState::Idle)),
        }
    }

    /// Resolve associated vehicles of simulated drives against `registry`
    pub fn with_registry(mut self, registry: Arc<VehicleRegistry>) -> Self {
        self.registry = Some(registry);
        self
    }

    fn lock_state(&self) -> Result<MutexGuard<'_, SimulationState>, SimulationError> {
        self.state
            .lock()
            .map_err(|e| SimulationError::Internal(format!("Lock error: {}", e)))
    }

    /// Current lifecycle state
    pub fn state(&self) -> Result<SimulationState, SimulationError> {
        Ok(self.lock_state()?.clone())
    }

    pub fn is_running(&self) -> bool {
        matches!(self.state(), Ok(SimulationState::Running { .. }))
    }

    /// Timeline `simulate_drive` would deliver, without running it
    pub fn plan(
        drive: &MockDrive,
        run_time_ms: i64,
        sdk: &SdkContext,
    ) -> Result<Timeline, SimulationError> {
        check_run_time(run_time_ms)?;
        Ok(Timeline::plan(
            drive,
            run_time_ms,
            sdk.implements_multiple_accident_callbacks,
        ))
    }

    /// Start simulating `drive` so that trip start to trip end takes `run_time_ms`.
    ///
    /// Must be called from within a tokio runtime. Fails without side
    /// effects when a check does not pass.
    pub fn simulate_drive(
        &self,
        drive: &MockDrive,
        run_time_ms: i64,
        sdk: &SdkContext,
    ) -> Result<SimulationHandle, SimulationError> {
        match self.start(drive, run_time_ms, sdk) {
            Ok(handle) => Ok(handle),
            Err(e) => {
                warn!("Simulation of drive {} rejected: {}", drive.drive_id(), e);
                metrics::counter!("mock_drive_simulations_rejected_total", "reason" => e.reason())
                    .increment(1);
                Err(e)
            }
        }
    }

    fn start(
        &self,
        drive: &MockDrive,
        run_time_ms: i64,
        sdk: &SdkContext,
    ) -> Result<SimulationHandle, SimulationError> {
        if !self.settings.mock_mode_enabled {
            return Err(SimulationError::NotMockDriveBuild);
        }
        check_run_time(run_time_ms)?;
        if !sdk.setup_complete {
            return Err(SimulationError::SdkNotSetup);
        }
        if sdk.drive_detection_mode != DriveDetectionMode::AutoOn {
            return Err(SimulationError::AutoDetectionModeNotOn);
        }

        let runtime = tokio::runtime::Handle::try_current()
            .map_err(|e| SimulationError::Internal(format!("No tokio runtime: {}", e)))?;

        let guard = {
            let mut state = self.lock_state()?;
            if let SimulationState::Running { drive_id } = &*state {
                return Err(SimulationError::SimulationAlreadyInProgress {
                    drive_id: drive_id.clone(),
                });
            }
            let drive_vehicle = drive.vehicle_type();
            if drive_vehicle != VehicleType::Unknown && drive_vehicle != sdk.vehicle_type {
                return Err(SimulationError::UnsupportedVehicleType {
                    drive: drive_vehicle,
                    setup: sdk.vehicle_type,
                });
            }
            *state = SimulationState::Running {
                drive_id: drive.drive_id().to_string(),
            };
            RunGuard {
                state: Arc::clone(&self.state),
                drive_id: drive.drive_id().to_string(),
                delivered: 0,
            }
        };

        let timeline = Timeline::plan(
            drive,
            run_time_ms,
            sdk.implements_multiple_accident_callbacks,
        );
        let associated_vehicle = self.resolve_vehicle(drive);

        info!(
            "Simulating drive {} in {} ms (scale {:.4}, {} callbacks)",
            drive.drive_id(),
            run_time_ms,
            timeline.scale_ratio(),
            timeline.len()
        );
        metrics::counter!("mock_drive_simulations_started_total").increment(1);
        metrics::gauge!("mock_drive_simulation_running").set(1.0);

        let report = SimulationReport {
            drive_id: drive.drive_id().to_string(),
            run_time_ms,
            scale_ratio: timeline.scale_ratio(),
            deliveries: Vec::with_capacity(timeline.len()),
            associated_vehicle,
        };
        let task = runtime.spawn(run(timeline, Arc::clone(&self.delegate), guard, report));

        Ok(SimulationHandle {
            drive_id: drive.drive_id().to_string(),
            task,
        })
    }

    fn resolve_vehicle(&self, drive: &MockDrive) -> Option<VehicleInfo> {
        let registry = self.registry.as_ref()?;
        match registry.associated_vehicle_for_drive(drive.tags()) {
            Ok(vehicle) => vehicle,
            Err(e) => {
                warn!("Could not resolve vehicle of drive {}: {}", drive.drive_id(), e);
                None
            }
        }
    }
}

fn check_run_time(run_time_ms: i64) -> Result<(), SimulationError> {
    if run_time_ms <= 0 || run_time_ms > MAX_RUN_TIME_MS {
        return Err(SimulationError::InvalidRunTime {
            run_time_ms,
            max_ms: MAX_RUN_TIME_MS,
        });
    }
    Ok(())
}

/// Deliver every callback of `timeline` at its scaled offset
async fn run(
    mut timeline: Timeline,
    delegate: Arc<dyn DriveDelegate>,
    mut guard: RunGuard,
    mut report: SimulationReport,
) -> SimulationReport {
    let started = Instant::now();

    while let Some(scheduled) = timeline.pop() {
        let offset = Duration::from_millis(scheduled.scaled_offset_ms.max(0) as u64);
        sleep_until(started + offset).await;

        let kind = scheduled.callback.kind();
        debug!(
            "Delivering {} for drive {} at {} ms",
            kind.as_str(),
            report.drive_id,
            scheduled.scaled_offset_ms
        );
        scheduled.callback.deliver(delegate.as_ref());
        metrics::counter!("mock_drive_callbacks_delivered_total", "kind" => kind.as_str())
            .increment(1);

        guard.delivered += 1;
        report.deliveries.push(Delivery {
            kind,
            trip_offset_ms: scheduled.trip_offset_ms,
            scaled_offset_ms: scheduled.scaled_offset_ms,
        });
    }

    info!(
        "Simulation of drive {} completed: {} callbacks",
        report.drive_id, guard.delivered
    );
    drop(guard);
    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use drive_model::{AccidentConfidence, AccidentInfo, DriveInfo, DriveStartInfo, Event};
    use mock_drive::{MockAccidentConfig, MockDriveBuilder, PointEventBuilder, PresetTrip};

    const START: i64 = 1_700_000_000_000;

    /// Records callbacks with the run time at which they arrived
    #[derive(Default)]
    struct RecordingDelegate {
        calls: Mutex<Vec<(CallbackKind, Duration)>>,
        accidents: Mutex<Vec<AccidentInfo>>,
        origin: Mutex<Option<Instant>>,
    }

    impl RecordingDelegate {
        fn start_clock(&self) {
            *self.origin.lock().unwrap() = Some(Instant::now());
        }

        fn record(&self, kind: CallbackKind) {
            let elapsed = self
                .origin
                .lock()
                .unwrap()
                .map(|origin| origin.elapsed())
                .unwrap_or_default();
            self.calls.lock().unwrap().push((kind, elapsed));
        }

        fn calls(&self) -> Vec<(CallbackKind, Duration)> {
            self.calls.lock().unwrap().clone()
        }
    }

    impl DriveDelegate for RecordingDelegate {
        fn process_start_of_drive(&self, _info: &DriveStartInfo) {
            self.record(CallbackKind::StartOfDrive);
        }

        fn process_event(&self, _event: &Event) {
            self.record(CallbackKind::Event);
        }

        fn process_potential_accident_detected(&self, info: &AccidentInfo) {
            self.record(CallbackKind::PotentialAccident);
            self.accidents.lock().unwrap().push(info.clone());
        }

        fn process_accident_detected(&self, info: &AccidentInfo) {
            self.record(CallbackKind::Accident);
            self.accidents.lock().unwrap().push(info.clone());
        }

        fn process_end_of_drive(&self, _info: &DriveInfo) {
            self.record(CallbackKind::EndOfDrive);
        }

        fn process_analysis_of_drive(&self, _info: &DriveInfo) {
            self.record(CallbackKind::AnalysisOfDrive);
        }
    }

    fn simulator() -> (Simulator, Arc<RecordingDelegate>) {
        let delegate = Arc::new(RecordingDelegate::default());
        let simulator = Simulator::new(MockSettings::mock_enabled(), delegate.clone());
        (simulator, delegate)
    }

    fn short_drive() -> MockDrive {
        MockDriveBuilder::new(START, START + 60_000).build().unwrap()
    }

    #[tokio::test(start_paused = true)]
    async fn test_delivers_all_callbacks_in_order() {
        let (simulator, delegate) = simulator();
        let drive = PresetTrip::Urban10MinTrip
            .builder_at(START)
            .unwrap()
            .build()
            .unwrap();

        delegate.start_clock();
        let handle = simulator
            .simulate_drive(&drive, 60_000, &SdkContext::default())
            .unwrap();
        let report = handle.wait().await.unwrap();

        // start + 2 events + end + analysis
        assert_eq!(report.deliveries.len(), 5);
        assert_eq!(report.count(CallbackKind::Event), 2);
        let calls = delegate.calls();
        assert_eq!(calls.len(), 5);
        assert_eq!(calls[0].0, CallbackKind::StartOfDrive);
        assert_eq!(calls[4].0, CallbackKind::AnalysisOfDrive);
        assert!(calls.windows(2).all(|pair| pair[0].1 <= pair[1].1));
        // Hard brake at 2 min of a 10 min trip replayed in 1 min
        assert_eq!(calls[1].1, Duration::from_millis(12_000));
        assert_eq!(calls[3].1, Duration::from_millis(60_000));
    }

    #[tokio::test(start_paused = true)]
    async fn test_multi_callback_gap() {
        let (simulator, delegate) = simulator();
        let config = MockAccidentConfig::new()
            .with_potential_confidence(AccidentConfidence::Low)
            .with_potential_confidence_number(40);
        let drive = MockDriveBuilder::new(START, START + 120_000)
            .add_event(
                PointEventBuilder::accident_with_config(config, START + 30_000, START, "crash")
                    .unwrap(),
            )
            .build()
            .unwrap();

        delegate.start_clock();
        let handle = simulator
            .simulate_drive(&drive, drive.duration_ms(), &SdkContext::default())
            .unwrap();
        let report = handle.wait().await.unwrap();
        assert_eq!(report.deliveries.len(), 6);

        let calls = delegate.calls();
        let potential = calls
            .iter()
            .find(|(kind, _)| *kind == CallbackKind::PotentialAccident)
            .unwrap();
        let accident = calls
            .iter()
            .find(|(kind, _)| *kind == CallbackKind::Accident)
            .unwrap();
        assert_eq!(potential.1, Duration::from_millis(30_000));
        assert_eq!(accident.1, Duration::from_millis(50_000));

        let accidents = delegate.accidents.lock().unwrap().clone();
        assert_eq!(accidents[0].confidence, AccidentConfidence::Low);
        assert_eq!(accidents[0].confidence_number, 40);
        assert_eq!(accidents[1].confidence, AccidentConfidence::High);
        assert_eq!(accidents[1].confidence_number, 70);
    }

    #[tokio::test(start_paused = true)]
    async fn test_potential_dropped_without_multi_callback_support() {
        let (simulator, delegate) = simulator();
        let drive = PresetTrip::Urban30MinWithMultipleCollisionCallbackTrip
            .builder_at(START)
            .unwrap()
            .build()
            .unwrap();
        let sdk = SdkContext::default().with_multiple_accident_callbacks(false);

        let report = simulator
            .simulate_drive(&drive, 30_000, &sdk)
            .unwrap()
            .wait()
            .await
            .unwrap();
        assert_eq!(report.count(CallbackKind::PotentialAccident), 0);
        assert_eq!(report.count(CallbackKind::Accident), 1);
        assert_eq!(delegate.accidents.lock().unwrap().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_single_flight() {
        let (simulator, _delegate) = simulator();
        let first = short_drive();
        let second = short_drive();
        let sdk = SdkContext::default();

        let handle = simulator.simulate_drive(&first, 10_000, &sdk).unwrap();
        assert!(simulator.is_running());
        assert_eq!(
            simulator.simulate_drive(&second, 10_000, &sdk).err(),
            Some(SimulationError::SimulationAlreadyInProgress {
                drive_id: first.drive_id().to_string()
            })
        );

        handle.wait().await.unwrap();
        assert_eq!(
            simulator.state().unwrap(),
            SimulationState::Completed {
                drive_id: first.drive_id().to_string(),
                delivered: 3
            }
        );
        let report = simulator
            .simulate_drive(&second, 10_000, &sdk)
            .unwrap()
            .wait()
            .await
            .unwrap();
        assert_eq!(report.drive_id, second.drive_id());

        let json: serde_json::Value = serde_json::from_str(&report.to_json().unwrap()).unwrap();
        assert_eq!(json["deliveries"][0]["kind"], "start_of_drive");
    }

    #[tokio::test(start_paused = true)]
    async fn test_guard_order() {
        let delegate = Arc::new(RecordingDelegate::default());
        let drive = short_drive();

        let disabled = Simulator::new(MockSettings::default(), delegate.clone());
        assert_eq!(
            disabled.simulate_drive(&drive, 0, &SdkContext::not_set_up()).err(),
            Some(SimulationError::NotMockDriveBuild)
        );

        let (simulator, _) = simulator();
        assert!(matches!(
            simulator.simulate_drive(&drive, 0, &SdkContext::not_set_up()),
            Err(SimulationError::InvalidRunTime { .. })
        ));
        assert_eq!(
            simulator.simulate_drive(&drive, 1_000, &SdkContext::not_set_up()).err(),
            Some(SimulationError::SdkNotSetup)
        );
        let auto_off = SdkContext::default().with_drive_detection_mode(DriveDetectionMode::AutoOff);
        assert_eq!(
            simulator.simulate_drive(&drive, 1_000, &auto_off).err(),
            Some(SimulationError::AutoDetectionModeNotOn)
        );
        assert!(delegate.calls().is_empty());
        assert_eq!(simulator.state().unwrap(), SimulationState::Idle);
    }

    #[tokio::test(start_paused = true)]
    async fn test_run_time_bounds() {
        let (simulator, _) = simulator();
        let drive = short_drive();
        let sdk = SdkContext::default();

        assert!(simulator.simulate_drive(&drive, -1, &sdk).is_err());
        assert!(simulator
            .simulate_drive(&drive, MAX_RUN_TIME_MS + 1, &sdk)
            .is_err());
        let report = simulator
            .simulate_drive(&drive, MAX_RUN_TIME_MS, &sdk)
            .unwrap()
            .wait()
            .await
            .unwrap();
        assert_eq!(report.deliveries.len(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_vehicle_type_conflict() {
        let (simulator, _) = simulator();
        let motorcycle = PresetTrip::Urban10MinMotorcycleTrip
            .builder_at(START)
            .unwrap()
            .build()
            .unwrap();

        assert_eq!(
            simulator
                .simulate_drive(&motorcycle, 1_000, &SdkContext::default())
                .err(),
            Some(SimulationError::UnsupportedVehicleType {
                drive: VehicleType::Motorcycle,
                setup: VehicleType::Car
            })
        );
        assert!(!simulator.is_running());

        // Unknown never conflicts
        let non_driving = PresetTrip::NonDriving60MinTrip
            .builder_at(START)
            .unwrap()
            .build()
            .unwrap();
        let sdk = SdkContext::default().with_vehicle_type(VehicleType::Motorcycle);
        assert!(simulator.simulate_drive(&non_driving, 1_000, &sdk).is_ok());
    }

    #[tokio::test(start_paused = true)]
    async fn test_report_resolves_associated_vehicle() {
        let registry = Arc::new(VehicleRegistry::set_up());
        registry
            .associate_vehicle(VehicleInfo::new("car-1", "14:0F:C7:62:F8:9E"))
            .unwrap();
        let (simulator, _) = simulator();
        let simulator = simulator.with_registry(registry);

        let drive = MockDriveBuilder::new(START, START + 60_000)
            .vehicle_id_tag("car-1")
            .build()
            .unwrap();
        let report = simulator
            .simulate_drive(&drive, 1_000, &SdkContext::default())
            .unwrap()
            .wait()
            .await
            .unwrap();
        assert_eq!(
            report.associated_vehicle.map(|v| v.vehicle_id),
            Some("car-1".to_string())
        );
    }

    #[test]
    fn test_plan_checks_run_time() {
        let drive = short_drive();
        assert!(Simulator::plan(&drive, 0, &SdkContext::default()).is_err());
        let timeline = Simulator::plan(&drive, 30_000, &SdkContext::default()).unwrap();
        assert_eq!(timeline.len(), 3);
        assert!((timeline.scale_ratio() - 0.5).abs() < f64::EPSILON);
    }

    #[test]
    fn test_simulate_requires_runtime() {
        let (simulator, _) = simulator();
        assert!(matches!(
            simulator.simulate_drive(&short_drive(), 1_000, &SdkContext::default()),
            Err(SimulationError::Internal(_))
        ));
        assert!(!simulator.is_running());
    }
}
