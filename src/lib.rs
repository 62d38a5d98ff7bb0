// src/lib.rs

//! Bit-banged asynchronous serial transmitter.
//!
//! Drives one GPIO line with 9600,8,N,1 NRZ frames (idle HIGH, Start LOW,
//! data LSB first, Stop HIGH) using only level changes and busy-wait delays.

#![no_std] // Specify no_std at the crate root

pub mod common;
pub mod monitor;
pub mod sim;
pub mod transmitter;

// Re-export key types for convenience
pub use common::{BitTiming, Level, TxError, TxLine};
pub use transmitter::{SoftSerialTx, TxConfig};
