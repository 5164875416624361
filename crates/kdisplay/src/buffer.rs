//! Framebuffer cells and the memory they live in.

use core::ptr;

use crate::color::ColorCode;

pub const WIDTH: usize = 80;
pub const HEIGHT: usize = 25;
pub const CELLS: usize = WIDTH * HEIGHT;

/// Physical address of the color text framebuffer.
pub const VGA_PHYS_ADDR: u64 = 0xB8000;

/// One character position: code page 437 byte plus attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cell {
    pub character: u8,
    pub color: ColorCode,
}

impl Cell {
    pub const fn new(character: u8, color: ColorCode) -> Self {
        Self { character, color }
    }

    pub const fn blank(color: ColorCode) -> Self {
        Self::new(b' ', color)
    }

    /// Hardware layout: character in the low byte, attribute in the high.
    pub const fn to_u16(self) -> u16 {
        (self.color.0 as u16) << 8 | self.character as u16
    }

    pub const fn from_u16(raw: u16) -> Self {
        Self {
            character: raw as u8,
            color: ColorCode((raw >> 8) as u8),
        }
    }
}

/// `CELLS` packed cells indexed by `row * WIDTH + col`.
///
/// Indices at or past `CELLS` panic, like slice indexing.
pub trait Surface {
    fn read(&self, index: usize) -> u16;
    fn write(&mut self, index: usize, value: u16);
}

impl Surface for [u16; CELLS] {
    fn read(&self, index: usize) -> u16 {
        self[index]
    }

    fn write(&mut self, index: usize, value: u16) {
        self[index] = value;
    }
}

/// The memory-mapped text framebuffer.
///
/// Every access is volatile so the compiler never elides or merges
/// writes the display hardware needs to see.
#[derive(Debug)]
pub struct VgaMemory {
    base: *mut u16,
}

impl VgaMemory {
    /// # Safety
    ///
    /// `base` must be the virtual address at which [`VGA_PHYS_ADDR`] is
    /// mapped writable for `CELLS` cells, and no other `VgaMemory` (or
    /// other reference) may alias it for the rest of the program.
    pub const unsafe fn new(base: *mut u16) -> Self {
        Self { base }
    }
}

impl Surface for VgaMemory {
    fn read(&self, index: usize) -> u16 {
        assert!(index < CELLS, "cell index {index} out of range");
        // SAFETY: in bounds of the mapping promised by `new`.
        unsafe { ptr::read_volatile(self.base.add(index)) }
    }

    fn write(&mut self, index: usize, value: u16) {
        assert!(index < CELLS, "cell index {index} out of range");
        // SAFETY: in bounds of the mapping promised by `new`.
        unsafe { ptr::write_volatile(self.base.add(index), value) }
    }
}
