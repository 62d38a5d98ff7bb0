// src/transmitter/sync_transmitter/mod.rs

mod interop;
mod io_helpers;

use super::TxConfig;
use crate::common::{
    error::TxError,
    frame::FrameState,
    hal_traits::TxLine,
    level::Level,
};
use embedded_hal::delay::DelayNs;

/// Bit-banged 8N1 transmitter on a single output line.
///
/// Owns the line and the busy-wait delay for its whole lifetime. Every
/// transmit call blocks until the Stop bit has been held, so nothing else can
/// touch the line mid-frame.
#[derive(Debug)]
pub struct SoftSerialTx<L, D>
where
    L: TxLine,
    D: DelayNs,
{
    line: L,
    delay: D,
    config: TxConfig,
    state: FrameState,
    configured: bool,
}

impl<L, D> SoftSerialTx<L, D>
where
    L: TxLine,
    D: DelayNs,
{
    pub fn new(line: L, delay: D) -> Self {
        Self::with_config(line, delay, TxConfig::default())
    }

    pub fn with_config(line: L, delay: D, config: TxConfig) -> Self {
        SoftSerialTx {
            line,
            delay,
            config,
            state: FrameState::Idle,
            configured: false,
        }
    }

    // --- Public Blocking Methods ---

    /// Makes the line an output, drives it HIGH and holds it there for one
    /// bit period so a receiver sees idle before the first Start bit.
    ///
    /// Safe to call repeatedly.
    pub fn configure(&mut self) -> Result<(), TxError<L::Error>> {
        self.line.configure_as_output().map_err(TxError::Line)?;
        self.hold(Level::IDLE, self.config.timing.frame_bit_ns())?;
        self.state = FrameState::Idle;
        self.configured = true;

        #[cfg(feature = "defmt")]
        defmt::debug!("soft serial line configured at {=u32} baud", self.config.timing.baud());

        Ok(())
    }

    /// Shifts one byte out as Start, 8 data bits LSB first, Stop.
    ///
    /// Returns with the line HIGH after the Stop bit has been held. Configures
    /// the line first if `configure` has not been called. If the line reports
    /// an error mid-frame, a break and one mark period are attempted before the
    /// error is returned, and the state goes back to `Idle`.
    pub fn transmit_byte(&mut self, value: u8) -> Result<(), TxError<L::Error>> {
        self.ensure_configured()?;
        self.shift_out(value, &mut || false)
    }

    /// Back-to-back frames, one per byte.
    pub fn transmit_bytes(&mut self, bytes: &[u8]) -> Result<(), TxError<L::Error>> {
        for &byte in bytes {
            self.transmit_byte(byte)?;
        }
        Ok(())
    }

    /// Like `transmit_byte`, but polls `should_abort` before the Start bit and
    /// before each data bit.
    ///
    /// An abort before the Start bit leaves the line untouched. An abort
    /// mid-frame holds a break (one frame of LOW) so the receiver flags the
    /// truncated frame, then returns the line to idle for one bit period.
    pub fn transmit_byte_cancellable<F>(&mut self, value: u8, mut should_abort: F) -> Result<(), TxError<L::Error>>
    where
        F: FnMut() -> bool,
    {
        self.ensure_configured()?;
        self.shift_out(value, &mut should_abort)
    }

    /// Busy-waits with the line left at idle.
    pub fn pause_us(&mut self, us: u32) {
        self.delay.delay_us(us);
    }

    /// Busy-waits with the line left at idle.
    pub fn pause_ms(&mut self, ms: u32) {
        self.delay.delay_ms(ms);
    }

    // --- Accessors ---

    #[inline]
    pub fn config(&self) -> &TxConfig {
        &self.config
    }

    #[inline]
    pub fn state(&self) -> FrameState {
        self.state
    }

    #[inline]
    pub fn is_configured(&self) -> bool {
        self.configured
    }

    #[inline]
    pub fn line(&self) -> &L {
        &self.line
    }

    pub fn free(self) -> (L, D) {
        (self.line, self.delay)
    }
}
