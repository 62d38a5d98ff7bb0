// src/monitor/mod.rs

//! Host sampling loop: read a sample, mirror it on a display port, send it
//! over the soft serial line, wait, then check the bootloader-reset button.

use crate::common::{
    error::TxError,
    hal_traits::{PortRegisters, TxLine},
    timing,
};
use crate::transmitter::SoftSerialTx;
use arrayvec::ArrayString;
use core::fmt::{Debug, Write as _};
use embedded_hal::delay::DelayNs;
use embedded_hal::digital::InputPin;

// --- Collaborator Traits ---

/// Source of raw 8-bit samples, e.g. the latest ADC conversion.
pub trait SampleSource {
    fn read_sample(&mut self) -> u8;
}

impl<F: FnMut() -> u8> SampleSource for F {
    fn read_sample(&mut self) -> u8 {
        self()
    }
}

/// Somewhere to show the sample, e.g. LEDs on the header port.
pub trait SampleDisplay {
    fn show(&mut self, sample: u8);
}

impl SampleDisplay for () {
    fn show(&mut self, _sample: u8) {}
}

/// Writes the sample into a port latch.
///
/// A shift of 4 shows the low nybble on LEDs wired to the upper four bits.
/// Bits in the reserved mask belong to someone else (typically the serial
/// TX pin on the same port) and keep their latched value.
#[derive(Debug)]
pub struct LatchDisplay<R> {
    port: R,
    shift: u8,
    reserved: u8,
}

impl<R: PortRegisters> LatchDisplay<R> {
    pub fn new(port: R) -> Self {
        LatchDisplay { port, shift: 0, reserved: 0 }
    }

    pub fn with_shift(port: R, shift: u8) -> Self {
        LatchDisplay {
            port,
            shift: shift.min(7),
            reserved: 0,
        }
    }

    /// Leaves the bits set in `mask` alone on every update.
    pub fn reserving(mut self, mask: u8) -> Self {
        self.reserved = mask;
        self
    }

    #[inline]
    pub fn reserved(&self) -> u8 {
        self.reserved
    }

    pub fn free(self) -> R {
        self.port
    }
}

impl<R: PortRegisters> SampleDisplay for LatchDisplay<R> {
    fn show(&mut self, sample: u8) {
        let kept = self.port.read_latch() & self.reserved;
        self.port.write_latch(kept | ((sample << self.shift) & !self.reserved));
    }
}

// --- Configuration ---

/// What goes out on the serial line for each sample.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum OutputMode {
    /// The sample byte as a single frame.
    Raw,
    /// Three ASCII digits with leading zeros, then CR LF.
    #[default]
    Decimal,
    /// Nothing is transmitted.
    Silent,
}

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct MonitorConfig {
    pub mode: OutputMode,
    pub sample_interval_ms: u32,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        MonitorConfig {
            mode: OutputMode::default(),
            sample_interval_ms: timing::SAMPLE_INTERVAL.as_millis() as u32,
        }
    }
}

/// Outcome of one pass through the loop, carrying the sample taken.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Poll {
    Continue(u8),
    /// The reset button was held; the caller should jump to the bootloader.
    ResetRequested(u8),
}

#[derive(Debug, thiserror::Error)]
pub enum MonitorError<E, B>
where
    E: Debug,
    B: Debug,
{
    #[error("serial output failed: {0}")]
    Tx(TxError<E>),

    #[error("reset button read failed: {0:?}")]
    Button(B),

    #[error("sample line did not fit the format buffer")]
    Format,
}

// --- Monitor ---

pub struct SampleMonitor<S, V, B, L, D>
where
    S: SampleSource,
    V: SampleDisplay,
    B: InputPin,
    L: TxLine,
    D: DelayNs,
{
    source: S,
    display: V,
    reset_button: B,
    tx: SoftSerialTx<L, D>,
    config: MonitorConfig,
}

impl<S, V, B, L, D> SampleMonitor<S, V, B, L, D>
where
    S: SampleSource,
    V: SampleDisplay,
    B: InputPin,
    L: TxLine,
    D: DelayNs,
{
    pub fn new(source: S, display: V, reset_button: B, tx: SoftSerialTx<L, D>, config: MonitorConfig) -> Self {
        SampleMonitor {
            source,
            display,
            reset_button,
            tx,
            config,
        }
    }

    /// Configures the serial line and waits out the input acquisition time.
    pub fn start(&mut self) -> Result<(), MonitorError<L::Error, B::Error>> {
        self.tx.configure().map_err(MonitorError::Tx)?;
        self.settle(timing::ACQUISITION_SETTLE.as_micros() as u32);
        Ok(())
    }

    /// Busy-waits for the sample input to settle.
    pub fn settle(&mut self, us: u32) {
        self.tx.pause_us(us);
    }

    /// One loop iteration.
    pub fn poll_once(&mut self) -> Result<Poll, MonitorError<L::Error, B::Error>> {
        let sample = self.source.read_sample();
        self.display.show(sample);

        match self.config.mode {
            OutputMode::Raw => self.tx.transmit_byte(sample).map_err(MonitorError::Tx)?,
            OutputMode::Decimal => {
                let mut line: ArrayString<8> = ArrayString::new();
                write!(line, "{:03}\r\n", sample).map_err(|_| MonitorError::Format)?;
                self.tx.transmit_bytes(line.as_bytes()).map_err(MonitorError::Tx)?;
            }
            OutputMode::Silent => {}
        }

        self.tx.pause_ms(self.config.sample_interval_ms);

        // SW1 is active low
        if self.reset_button.is_low().map_err(MonitorError::Button)? {
            #[cfg(feature = "defmt")]
            defmt::info!("reset requested after sample {=u8}", sample);
            return Ok(Poll::ResetRequested(sample));
        }
        Ok(Poll::Continue(sample))
    }

    /// Loops until the reset button is seen, returning that final poll.
    pub fn run(&mut self) -> Result<Poll, MonitorError<L::Error, B::Error>> {
        loop {
            let poll = self.poll_once()?;
            if let Poll::ResetRequested(_) = poll {
                return Ok(poll);
            }
        }
    }

    #[inline]
    pub fn config(&self) -> &MonitorConfig {
        &self.config
    }

    #[inline]
    pub fn transmitter(&self) -> &SoftSerialTx<L, D> {
        &self.tx
    }

    pub fn free(self) -> (S, V, B, SoftSerialTx<L, D>) {
        (self.source, self.display, self.reset_button, self.tx)
    }
}
