// src/common/mod.rs

// --- Declare all public modules within common ---
pub mod error;
pub mod frame;
pub mod hal_traits;
pub mod level;
pub mod port;
pub mod timing;

// --- Re-export key types/traits for easier access ---

// From error.rs
pub use error::{ConfigError, FrameError, TxError};

// From frame.rs
pub use frame::{Frame, FrameFormat, FrameState, FRAME_BITS};

// From hal_traits.rs
pub use hal_traits::{NoLineError, OutputPinLine, PortRegisters, TxLine};

// From level.rs
pub use level::{Direction, Level};

// From port.rs
pub use port::{PortPin, VolatilePort};

// From timing.rs (constants stay under common::timing::*)
pub use timing::BitTiming;
