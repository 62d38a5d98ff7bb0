// src/transmitter/mod.rs

pub mod sync_transmitter;

pub use sync_transmitter::SoftSerialTx;

use crate::common::timing::BitTiming;

/// Run-time settings of the software transmitter.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TxConfig {
    /// Start/Stop and data-bit delays.
    pub timing: BitTiming,
    /// Extra idle (mark) bit periods held after every Stop bit.
    /// The Stop bit already provides one; this is for slow receivers.
    pub idle_guard_periods: u8,
}

impl TxConfig {
    pub const fn new(timing: BitTiming) -> Self {
        TxConfig {
            timing,
            idle_guard_periods: 0,
        }
    }

    pub const fn with_idle_guard(mut self, periods: u8) -> Self {
        self.idle_guard_periods = periods;
        self
    }
}

impl Default for TxConfig {
    fn default() -> Self {
        Self::new(BitTiming::REFERENCE_9600)
    }
}
