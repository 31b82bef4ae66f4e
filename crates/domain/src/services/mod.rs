//! Shipping resolution, address events and telemetry wiring.

pub mod events;
pub mod shipping;
pub mod telemetry;

pub use events::*;
pub use shipping::*;
pub use telemetry::*;
