use std::sync::atomic::{AtomicU16, Ordering};
use std::sync::Arc;

/// A simulated analog node shared between an output and an input.
///
/// The simulated DAC drives the wire and the simulated ADC samples it, the same
/// way a jumper from A0 to A1 would on the bench.
#[derive(Debug, Clone, Default)]
pub struct LoopbackWire {
    level: Arc<AtomicU16>,
}

impl LoopbackWire {
    pub fn new(initial_level: u16) -> Self {
        Self {
            level: Arc::new(AtomicU16::new(initial_level)),
        }
    }

    pub fn drive(&self, level: u16) {
        self.level.store(level, Ordering::SeqCst);
    }

    pub fn level(&self) -> u16 {
        self.level.load(Ordering::SeqCst)
    }
}
