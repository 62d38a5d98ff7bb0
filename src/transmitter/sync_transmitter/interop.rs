// src/transmitter/sync_transmitter/interop.rs

//! Byte-stream trait impls so the transmitter can sit behind `write!`,
//! `embedded-io` and `embedded-hal-nb` consumers.

use super::SoftSerialTx;
use crate::common::{error::TxError, hal_traits::TxLine};
use embedded_hal::delay::DelayNs;

impl<L, D> core::fmt::Write for SoftSerialTx<L, D>
where
    L: TxLine,
    D: DelayNs,
{
    fn write_str(&mut self, s: &str) -> core::fmt::Result {
        self.transmit_bytes(s.as_bytes()).map_err(|_| core::fmt::Error)
    }
}

impl<L, D> embedded_io::ErrorType for SoftSerialTx<L, D>
where
    L: TxLine,
    D: DelayNs,
{
    type Error = TxError<L::Error>;
}

impl<L, D> embedded_io::Write for SoftSerialTx<L, D>
where
    L: TxLine,
    D: DelayNs,
{
    /// Sends the whole buffer before returning.
    fn write(&mut self, buf: &[u8]) -> Result<usize, Self::Error> {
        self.transmit_bytes(buf)?;
        Ok(buf.len())
    }

    fn flush(&mut self) -> Result<(), Self::Error> {
        // Nothing is buffered.
        Ok(())
    }
}

impl<L, D> embedded_hal_nb::serial::ErrorType for SoftSerialTx<L, D>
where
    L: TxLine,
    D: DelayNs,
{
    type Error = TxError<L::Error>;
}

impl<L, D> embedded_hal_nb::serial::Write<u8> for SoftSerialTx<L, D>
where
    L: TxLine,
    D: DelayNs,
{
    /// Never returns `WouldBlock`; the frame is complete on return.
    fn write(&mut self, word: u8) -> nb::Result<(), Self::Error> {
        self.transmit_byte(word).map_err(nb::Error::Other)
    }

    fn flush(&mut self) -> nb::Result<(), Self::Error> {
        Ok(())
    }
}
