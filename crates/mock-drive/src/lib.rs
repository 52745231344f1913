//! Mock Drive
//!
//! Builders for synthetic drives used to exercise drive callbacks without
//! driving:
//! - Point and range event builders
//! - Two-phase mock accident configuration
//! - Validating drive builder and preset trips

mod accident_config;
mod builder;
mod drive;
mod error;
mod event;
mod preset;

pub use accident_config::MockAccidentConfig;
pub use builder::MockDriveBuilder;
pub use drive::{MockAccidentInfo, MockDrive};
pub use error::{BuildError, EventError};
pub use event::{
    AccidentSpec, CallbackMode, EventBuilder, PointEventBuilder, PointKind, RangeEventBuilder,
    RangeKind,
};
pub use preset::PresetTrip;
