use crate::loopback::LoopbackWire;
use crate::{resolution_mask, PinId, FULL_SCALE, REFERENCE_VOLTAGE};
use anyhow::{anyhow, Result};
use tracing::{debug, error, info};

/// Output side of the bench: a DAC channel driven with 16-bit codes.
pub trait AnalogOut {
    fn pin(&self) -> &PinId;

    /// Write a 16-bit code to the channel.
    fn set_value(&mut self, value: u16) -> Result<()>;
}

#[derive(Debug, Clone, PartialEq)]
pub struct DacConfig {
    pin: PinId,
    reference_voltage: f64, // V at full scale
    resolution_bits: u8, // physical DAC bits, stored high in the 16-bit code
}

impl Default for DacConfig {
    fn default() -> Self {
        Self {
            pin: PinId::new("A0"),
            reference_voltage: REFERENCE_VOLTAGE,
            resolution_bits: 10,
        }
    }
}

impl DacConfig {
    pub fn new(pin: PinId, reference_voltage: f64, resolution_bits: u8) -> Result<Self, anyhow::Error> {
        if !(reference_voltage > 0.0) {
            error!("DAC reference_voltage must be greater than 0");
            return Err(anyhow!("DAC reference_voltage must be greater than 0, got {}", reference_voltage));
        }
        if !(1..=16).contains(&resolution_bits) {
            error!("DAC resolution_bits must be within 1..=16");
            return Err(anyhow!("DAC resolution_bits must be within 1..=16, got {}", resolution_bits));
        }
        Ok(Self {
            pin,
            reference_voltage,
            resolution_bits,
        })
    }

    pub fn pin(&self) -> &PinId {
        &self.pin
    }

    pub fn reference_voltage(&self) -> f64 {
        self.reference_voltage
    }

    pub fn resolution_bits(&self) -> u8 {
        self.resolution_bits
    }

    /// The code the converter actually produces for a requested 16-bit code.
    pub fn quantize(&self, code: u16) -> u16 {
        code & resolution_mask(self.resolution_bits)
    }

    pub fn code_to_voltage(&self, code: u16) -> f64 {
        code_to_voltage(code, self.reference_voltage)
    }
}

/// Voltage commanded by an output code, `code * reference / 65535`.
pub fn code_to_voltage(code: u16, reference_voltage: f64) -> f64 {
    f64::from(code) * reference_voltage / f64::from(FULL_SCALE)
}

/// Host-side stand-in for a DAC pin. Drives a [`LoopbackWire`] with the
/// quantized code.
#[derive(Debug, Clone)]
pub struct SimulatedDac {
    config: DacConfig,
    wire: LoopbackWire,
    value: u16,
}

impl SimulatedDac {
    pub fn new(config: DacConfig, wire: LoopbackWire) -> Self {
        info!("Simulated DAC bound to pin {} ({} bit)", config.pin, config.resolution_bits);
        Self {
            config,
            wire,
            value: 0,
        }
    }

    /// Last code written, as requested by the caller.
    pub fn value(&self) -> u16 {
        self.value
    }
}

impl AnalogOut for SimulatedDac {
    fn pin(&self) -> &PinId {
        &self.config.pin
    }

    fn set_value(&mut self, value: u16) -> Result<()> {
        let level = self.config.quantize(value);
        self.value = value;
        self.wire.drive(level);
        debug!("DAC {} <- {} (level {})", self.config.pin, value, level);
        Ok(())
    }
}
