use crate::adc_interface::{AdcConfig, AnalogIn};
use crate::dac_interface::{AnalogOut, DacConfig};
use anyhow::{anyhow, Context, Result};
use std::fmt;
use std::io::Write;
use tokio::time::{sleep, Duration, Instant};
use tracing::{debug, error, info, warn};

/// Ascending output codes `start, start + step, ...` strictly below `upper_bound`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SweepSequence {
    next: u32,
    step: u32,
    upper_bound: u32,
}

impl SweepSequence {
    pub fn new(start: u16, step: u16, upper_bound: u32) -> Self {
        Self {
            next: u32::from(start),
            step: u32::from(step),
            upper_bound: upper_bound.min(1 << 16),
        }
    }
}

impl Iterator for SweepSequence {
    type Item = u16;

    fn next(&mut self) -> Option<u16> {
        if self.step == 0 || self.next >= self.upper_bound {
            return None;
        }
        let code = self.next as u16;
        self.next += self.step;
        Some(code)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = if self.step == 0 || self.next >= self.upper_bound {
            0
        } else {
            ((self.upper_bound - self.next + self.step - 1) / self.step) as usize
        };
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for SweepSequence {}

#[derive(Debug, Clone, PartialEq)]
pub struct SweepConfig {
    dac: DacConfig,
    adc: AdcConfig,
    start: u16,
    step: u16,
    upper_bound: u32, // exclusive
    interval: Duration, // pause after each reading
}

impl Default for SweepConfig {
    fn default() -> Self {
        Self {
            dac: DacConfig::default(),
            adc: AdcConfig::default(),
            start: 0,
            step: 512,
            upper_bound: 65535,
            interval: Duration::from_millis(50),
        }
    }
}

impl SweepConfig {
    pub fn new(dac: DacConfig, adc: AdcConfig, start: u16, step: u16, upper_bound: u32, interval: Duration) -> Result<Self, anyhow::Error> {
        if step == 0 {
            error!("step must be greater than 0");
            return Err(anyhow!("step must be greater than 0"));
        }
        if upper_bound > 1 << 16 {
            error!("upper_bound must not exceed 65536");
            return Err(anyhow!("upper_bound must not exceed 65536, got {}", upper_bound));
        }
        if u32::from(start) >= upper_bound {
            error!("start must be less than upper_bound");
            return Err(anyhow!("start {} must be less than upper_bound {}", start, upper_bound));
        }
        if dac.pin() == adc.pin() {
            error!("output and input must use different pins");
            return Err(anyhow!("output and input are both bound to pin {}", dac.pin()));
        }
        Ok(Self {
            dac,
            adc,
            start,
            step,
            upper_bound,
            interval,
        })
    }

    pub fn dac(&self) -> &DacConfig {
        &self.dac
    }

    pub fn adc(&self) -> &AdcConfig {
        &self.adc
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// A fresh sequence of output codes for one pass.
    pub fn sequence(&self) -> SweepSequence {
        SweepSequence::new(self.start, self.step, self.upper_bound)
    }
}

/// One step of a sweep.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SweepReading {
    pub code: u16,
    pub input_raw: u16,
    pub input_voltage: f64,
    pub output_voltage: f64,
}

impl fmt::Display for SweepReading {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:?}, {:?})", self.input_voltage, self.output_voltage)
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SweepReport {
    pub readings: Vec<SweepReading>,
}

impl SweepReport {
    pub fn len(&self) -> usize {
        self.readings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.readings.is_empty()
    }

    pub fn first(&self) -> Option<&SweepReading> {
        self.readings.first()
    }

    pub fn last(&self) -> Option<&SweepReading> {
        self.readings.last()
    }
}

pub struct SweepDriver<O, I> {
    config: SweepConfig,
    output: O,
    input: I,
}

impl<O: AnalogOut, I: AnalogIn> SweepDriver<O, I> {
    pub fn new(config: SweepConfig, output: O, input: I) -> Self {
        if output.pin() != config.dac.pin() {
            warn!("Output handle is on pin {} but config names {}", output.pin(), config.dac.pin());
        }
        if input.pin() != config.adc.pin() {
            warn!("Input handle is on pin {} but config names {}", input.pin(), config.adc.pin());
        }
        Self {
            config,
            output,
            input,
        }
    }

    pub fn config(&self) -> &SweepConfig {
        &self.config
    }

    pub fn into_parts(self) -> (O, I) {
        (self.output, self.input)
    }

    /// Drive one full ramp, writing a `(input_voltage, output_voltage)` line to
    /// `out` per step. Any channel failure ends the sweep.
    pub async fn run<W: Write>(&mut self, out: &mut W) -> Result<SweepReport> {
        let sequence = self.config.sequence();
        let steps = sequence.len();
        info!(
            "Sweep started: {} steps on {} -> {}, {} ms apart",
            steps,
            self.output.pin(),
            self.input.pin(),
            self.config.interval.as_millis()
        );
        let started = Instant::now();

        let mut readings = Vec::with_capacity(steps);
        for code in sequence {
            self.output
                .set_value(code)
                .with_context(|| format!("failed to write code {} to output pin {}", code, self.output.pin()))?;
            let input_raw = self
                .input
                .value()
                .with_context(|| format!("failed to read input pin {} at code {}", self.input.pin(), code))?;

            let reading = SweepReading {
                code,
                input_raw,
                input_voltage: self.config.adc.code_to_voltage(input_raw),
                output_voltage: self.config.dac.code_to_voltage(code),
            };
            writeln!(out, "{}", reading).context("failed to write sweep reading")?;
            debug!("code {} -> raw {} {}", code, input_raw, reading);
            readings.push(reading);

            sleep(self.config.interval).await;
        }
        out.flush().context("failed to flush sweep output")?;

        info!("Sweep completed: {} readings in {:?}", readings.len(), started.elapsed());
        Ok(SweepReport { readings })
    }
}
