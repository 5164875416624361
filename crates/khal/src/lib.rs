//! Hardware Abstraction Layer.
#![cfg_attr(not(test), no_std)]

pub mod keyboard;
pub mod port;
pub mod serial;

pub use keyboard::Ps2Keyboard;
pub use port::{PortIo, RawPorts};
pub use serial::Serial;
