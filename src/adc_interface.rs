use crate::loopback::LoopbackWire;
use crate::{resolution_mask, PinId, FULL_SCALE, REFERENCE_VOLTAGE};
use anyhow::{anyhow, Result};
use tracing::{debug, error, info};

// Readings are reported on the same 16-bit scale as the DAC regardless of the
// converter's native resolution.

/// Input side of the bench: an ADC channel sampled as 16-bit codes.
pub trait AnalogIn {
    fn pin(&self) -> &PinId;

    /// Most recent sample, scaled to 16 bits.
    fn value(&mut self) -> Result<u16>;
}

#[derive(Debug, Clone, PartialEq)]
pub struct AdcConfig {
    pin: PinId,
    reference_voltage: f64, // V at full scale
    resolution_bits: u8,
}

impl Default for AdcConfig {
    fn default() -> Self {
        Self {
            pin: PinId::new("A1"),
            reference_voltage: REFERENCE_VOLTAGE,
            resolution_bits: 12,
        }
    }
}

impl AdcConfig {
    pub fn new(pin: PinId, reference_voltage: f64, resolution_bits: u8) -> Result<Self, anyhow::Error> {
        if !(reference_voltage > 0.0) {
            error!("ADC reference_voltage must be greater than 0");
            return Err(anyhow!("ADC reference_voltage must be greater than 0, got {}", reference_voltage));
        }
        if !(1..=16).contains(&resolution_bits) {
            error!("ADC resolution_bits must be within 1..=16");
            return Err(anyhow!("ADC resolution_bits must be within 1..=16, got {}", resolution_bits));
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

    pub fn quantize(&self, code: u16) -> u16 {
        code & resolution_mask(self.resolution_bits)
    }

    pub fn code_to_voltage(&self, code: u16) -> f64 {
        code_to_voltage(code, self.reference_voltage)
    }
}

/// Voltage of a sampled code, `code / 65535 * reference`.
pub fn code_to_voltage(code: u16, reference_voltage: f64) -> f64 {
    f64::from(code) / f64::from(FULL_SCALE) * reference_voltage
}

#[derive(Debug, Clone)]
enum Source {
    Wire(LoopbackWire),
    Fixed(u16),
}

/// Host-side stand-in for an ADC pin.
#[derive(Debug, Clone)]
pub struct SimulatedAdc {
    config: AdcConfig,
    source: Source,
}

impl SimulatedAdc {
    /// Samples whatever level the wire is currently driven to.
    pub fn loopback(config: AdcConfig, wire: LoopbackWire) -> Self {
        info!("Simulated ADC bound to pin {} ({} bit, loopback)", config.pin, config.resolution_bits);
        Self {
            config,
            source: Source::Wire(wire),
        }
    }

    /// Always samples the same level.
    pub fn fixed(config: AdcConfig, level: u16) -> Self {
        info!("Simulated ADC bound to pin {} ({} bit, fixed at {})", config.pin, config.resolution_bits, level);
        Self {
            config,
            source: Source::Fixed(level),
        }
    }
}

impl AnalogIn for SimulatedAdc {
    fn pin(&self) -> &PinId {
        &self.config.pin
    }

    fn value(&mut self) -> Result<u16> {
        let level = match &self.source {
            Source::Wire(wire) => wire.level(),
            Source::Fixed(level) => *level,
        };
        let sample = self.config.quantize(level);
        debug!("ADC {} -> {}", self.config.pin, sample);
        Ok(sample)
    }
}
