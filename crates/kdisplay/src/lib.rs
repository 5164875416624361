//! VGA text-mode console.
//!
//! An 80x25 grid of 16-bit cells at physical `0xB8000`, plus the CRT
//! controller's cursor registers. [`Console`] is the only writer of
//! both; it owns the [`Surface`] and the port handle it is built with.
#![cfg_attr(not(test), no_std)]

pub mod buffer;
pub mod color;
pub mod console;

pub use buffer::{Cell, Surface, VgaMemory, CELLS, HEIGHT, WIDTH};
pub use color::{Color, ColorCode, DEFAULT_COLOR};
pub use console::Console;
