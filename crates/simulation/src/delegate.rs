//! Drive callback receiver

use drive_model::{AccidentInfo, DriveInfo, DriveStartInfo, Event};

/// Receives the callbacks of a simulated drive.
///
/// Callbacks are invoked one at a time from the simulation task, in
/// timeline order. Every method defaults to a no-op.
pub trait DriveDelegate: Send + Sync {
    fn process_start_of_drive(&self, _info: &DriveStartInfo) {}

    fn process_event(&self, _event: &Event) {}

    /// Provisional accident report, followed by a final one
    fn process_potential_accident_detected(&self, _info: &AccidentInfo) {}

    /// Final accident report. Confidence `Invalid` retracts a potential report.
    fn process_accident_detected(&self, _info: &AccidentInfo) {}

    /// Drive ended; analysis pending
    fn process_end_of_drive(&self, _info: &DriveInfo) {}

    fn process_analysis_of_drive(&self, _info: &DriveInfo) {}
}
