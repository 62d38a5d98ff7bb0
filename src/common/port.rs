// src/common/port.rs

use super::error::ConfigError;
use super::hal_traits::{NoLineError, PortRegisters, TxLine};
use super::level::{Direction, Level};
use vcell::VolatileCell;

/// One pin of a shared 8-bit port.
///
/// All writes are masked read-modify-write so the other seven pins keep their
/// direction and latch state.
#[derive(Debug)]
pub struct PortPin<R> {
    port: R,
    mask: u8,
}

impl<R: PortRegisters> PortPin<R> {
    pub fn new(port: R, bit: u8) -> Result<Self, ConfigError> {
        if bit > 7 {
            return Err(ConfigError::InvalidPin(bit));
        }
        Ok(PortPin {
            port,
            mask: 1 << bit,
        })
    }

    #[inline]
    pub fn mask(&self) -> u8 {
        self.mask
    }

    /// Level currently held in this pin's latch bit.
    pub fn latched_level(&self) -> Level {
        Level::from_bit(self.port.read_latch() & self.mask != 0)
    }

    pub fn free(self) -> R {
        self.port
    }
}

impl<R: PortRegisters> TxLine for PortPin<R> {
    type Error = NoLineError;

    fn configure_as_output(&mut self) -> Result<(), Self::Error> {
        let dir = self.port.read_direction();
        self.port.write_direction(dir & !self.mask);
        Ok(())
    }

    fn set_level(&mut self, level: Level) -> Result<(), Self::Error> {
        let latch = self.port.read_latch();
        let latch = match level {
            Level::High => latch | self.mask,
            Level::Low => latch & !self.mask,
        };
        self.port.write_latch(latch);
        Ok(())
    }

    fn direction(&self) -> Direction {
        if self.port.read_direction() & self.mask == 0 {
            Direction::Output
        } else {
            Direction::Input
        }
    }
}

/// Port registers accessed through volatile cells.
///
/// On hardware the cells are the memory-mapped direction and latch registers;
/// in tests they can live on the stack.
pub struct VolatilePort<'a> {
    direction: &'a VolatileCell<u8>,
    latch: &'a VolatileCell<u8>,
}

impl<'a> VolatilePort<'a> {
    pub fn new(direction: &'a VolatileCell<u8>, latch: &'a VolatileCell<u8>) -> Self {
        VolatilePort { direction, latch }
    }
}

impl PortRegisters for VolatilePort<'_> {
    #[inline]
    fn read_direction(&self) -> u8 {
        self.direction.get()
    }
    #[inline]
    fn write_direction(&mut self, bits: u8) {
        self.direction.set(bits)
    }
    #[inline]
    fn read_latch(&self) -> u8 {
        self.latch.get()
    }
    #[inline]
    fn write_latch(&mut self, bits: u8) {
        self.latch.set(bits)
    }
}

// --- Unit Tests ---
#[cfg(test)]
mod tests {
    use super::*;

    // --- Mock Port ---
    #[derive(Debug, Clone, Copy)]
    struct MockPort {
        tris: u8,
        lat: u8,
    }
    impl PortRegisters for MockPort {
        fn read_direction(&self) -> u8 { self.tris }
        fn write_direction(&mut self, bits: u8) { self.tris = bits; }
        fn read_latch(&self) -> u8 { self.lat }
        fn write_latch(&mut self, bits: u8) { self.lat = bits; }
    }

    #[test]
    fn test_configure_clears_only_own_direction_bit() {
        let mut pin = PortPin::new(MockPort { tris: 0b0000_1101, lat: 0 }, 0).unwrap();
        assert_eq!(pin.direction(), Direction::Input);
        pin.configure_as_output().unwrap();
        assert_eq!(pin.direction(), Direction::Output);
        assert_eq!(pin.free().tris, 0b0000_1100);
    }

    #[test]
    fn test_set_level_preserves_siblings() {
        let mut pin = PortPin::new(MockPort { tris: 0xFF, lat: 0b1010_0000 }, 3).unwrap();
        pin.set_level(Level::High).unwrap();
        assert_eq!(pin.latched_level(), Level::High);
        assert_eq!(pin.port.lat, 0b1010_1000);
        pin.set_level(Level::Low).unwrap();
        assert_eq!(pin.latched_level(), Level::Low);
        assert_eq!(pin.port.lat, 0b1010_0000);
    }

    #[test]
    fn test_invalid_bit() {
        let port = MockPort { tris: 0xFF, lat: 0 };
        assert!(matches!(PortPin::new(port, 8), Err(ConfigError::InvalidPin(8))));
        assert_eq!(PortPin::new(port, 7).unwrap().mask(), 0b1000_0000);
    }

    #[test]
    fn test_volatile_port_backing() {
        let tris = VolatileCell::new(0xFFu8);
        let lat = VolatileCell::new(0x00u8);
        let mut pin = PortPin::new(VolatilePort::new(&tris, &lat), 0).unwrap();
        pin.configure_as_output().unwrap();
        pin.set_level(Level::High).unwrap();
        assert_eq!(tris.get(), 0xFE);
        assert_eq!(lat.get(), 0x01);
    }
}
