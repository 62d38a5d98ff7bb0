// src/common/hal_traits.rs

use super::level::{Direction, Level};
use core::convert::Infallible;
use core::fmt::Debug;
use embedded_hal::digital::OutputPin;

/// Single output line driven by the software transmitter.
///
/// Every operation is scoped to one pin. Implementations sharing a port with
/// other pins must leave their sibling bits untouched.
///
/// Delays come from `embedded_hal::delay::DelayNs`, so there is no timer trait here.
pub trait TxLine {
    /// Associated error type for pin driver errors.
    type Error: Debug;

    /// Makes the pin an output. Calling this again must have no further effect.
    fn configure_as_output(&mut self) -> Result<(), Self::Error>;

    /// Drives the line to `level`.
    fn set_level(&mut self, level: Level) -> Result<(), Self::Error>;

    /// Current data direction of the pin.
    fn direction(&self) -> Direction;
}

impl<T: TxLine + ?Sized> TxLine for &mut T {
    type Error = T::Error;

    #[inline]
    fn configure_as_output(&mut self) -> Result<(), Self::Error> {
        T::configure_as_output(self)
    }

    #[inline]
    fn set_level(&mut self, level: Level) -> Result<(), Self::Error> {
        T::set_level(self, level)
    }

    #[inline]
    fn direction(&self) -> Direction {
        T::direction(self)
    }
}

/// Adapts any `embedded-hal` output pin.
///
/// HAL pins encode their direction in the type, so the pin is already an
/// output and `configure_as_output` has nothing to do.
#[derive(Debug)]
pub struct OutputPinLine<P> {
    pin: P,
}

impl<P: OutputPin> OutputPinLine<P> {
    pub fn new(pin: P) -> Self {
        OutputPinLine { pin }
    }

    pub fn free(self) -> P {
        self.pin
    }
}

impl<P: OutputPin> TxLine for OutputPinLine<P> {
    type Error = P::Error;

    fn configure_as_output(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }

    fn set_level(&mut self, level: Level) -> Result<(), Self::Error> {
        self.pin.set_state(level.into())
    }

    fn direction(&self) -> Direction {
        Direction::Output
    }
}

/// Bit-mapped 8-bit port with a direction register and an output latch.
///
/// Direction bits follow the TRIS convention: 1 is input, 0 is output.
/// Register access is assumed infallible, as on memory-mapped hardware.
pub trait PortRegisters {
    fn read_direction(&self) -> u8;
    fn write_direction(&mut self, bits: u8);
    fn read_latch(&self) -> u8;
    fn write_latch(&mut self, bits: u8);
}

impl<T: PortRegisters + ?Sized> PortRegisters for &mut T {
    fn read_direction(&self) -> u8 {
        T::read_direction(self)
    }
    fn write_direction(&mut self, bits: u8) {
        T::write_direction(self, bits)
    }
    fn read_latch(&self) -> u8 {
        T::read_latch(self)
    }
    fn write_latch(&mut self, bits: u8) {
        T::write_latch(self, bits)
    }
}

/// Error type for lines that cannot fail.
pub type NoLineError = Infallible;
