mod dac_interface;
mod adc_interface;
mod loopback;
mod sweep;

use std::fmt;

// Re-export the channel and driver interfaces
pub use dac_interface::{AnalogOut, DacConfig, SimulatedDac};
pub use adc_interface::{AdcConfig, AnalogIn, SimulatedAdc};
pub use loopback::LoopbackWire;
pub use sweep::{SweepConfig, SweepDriver, SweepReading, SweepReport, SweepSequence};

/// Full-scale code of the 16-bit channel abstraction shared by both converters.
pub const FULL_SCALE: u16 = 65535;

/// Voltage corresponding to a full-scale code.
pub const REFERENCE_VOLTAGE: f64 = 3.3;

/// Board pin identifier, e.g. `A0`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PinId(String);

impl PinId {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn name(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PinId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Mask that keeps the top `resolution_bits` bits of a 16-bit code.
fn resolution_mask(resolution_bits: u8) -> u16 {
    u16::MAX << (16 - u32::from(resolution_bits))
}
