// src/common/error.rs

use core::fmt::Debug;

/// Errors reported while shifting a frame out.
///
/// The serial protocol itself cannot fail on the transmit side; the only
/// sources are the pin driver and a caller-requested abort.
#[derive(Debug, Copy, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TxError<E = ()>
where
    E: Debug, // Needed for the {0:?} format of the driver error
{
    /// Underlying error from the pin implementation.
    #[error("line driver error: {0:?}")]
    Line(E),

    /// Cooperative abort requested before a bit boundary.
    /// `bits_sent` counts the bit periods already on the wire (Start included).
    #[error("transmission aborted after {bits_sent} bit periods")]
    Aborted { bits_sent: u8 },
}

impl<E: Debug> TxError<E> {
    #[inline]
    pub fn is_aborted(&self) -> bool {
        matches!(self, TxError::Aborted { .. })
    }
}

impl<E: Debug> embedded_io::Error for TxError<E> {
    fn kind(&self) -> embedded_io::ErrorKind {
        match self {
            TxError::Line(_) => embedded_io::ErrorKind::Other,
            TxError::Aborted { .. } => embedded_io::ErrorKind::Interrupted,
        }
    }
}

impl<E: Debug> embedded_hal_nb::serial::Error for TxError<E> {
    fn kind(&self) -> embedded_hal_nb::serial::ErrorKind {
        embedded_hal_nb::serial::ErrorKind::Other
    }
}

/// Invalid bit timing or pin configuration.
#[derive(Debug, Copy, Clone, PartialEq, Eq, thiserror::Error)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    #[error("baud rate must be non-zero")]
    ZeroBaud,

    #[error("bit delays must be non-zero")]
    ZeroDelay,

    /// Loop overhead would leave no time for the data-bit delay.
    #[error("loop overhead {overhead_ns} ns does not fit in a {period_ns} ns bit period")]
    OverheadExceedsPeriod { period_ns: u32, overhead_ns: u32 },

    /// Data-bit and Start/Stop delays differ by more than a receiver tolerates.
    #[error("bit timing skew {skew_ppm} ppm exceeds {limit_ppm} ppm")]
    ToleranceExceeded { skew_ppm: u32, limit_ppm: u32 },

    #[error("pin index {0} is outside an 8-bit port")]
    InvalidPin(u8),
}

/// Framing problems seen by a receiver sampling a waveform.
#[derive(Debug, Copy, Clone, PartialEq, Eq, thiserror::Error)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FrameError {
    #[error("start bit was not low at mid-bit")]
    MissingStartBit,

    /// Stop bit sampled low. A break or an aborted frame looks like this.
    #[error("stop bit was not high at mid-bit")]
    MissingStopBit,
}
