//! x86 port I/O primitives.
//!
//! Drivers talk to hardware through the [`PortIo`] trait so the same
//! driver code runs against real ports in the kernel and against a
//! recording mock in host tests.

use x86_64::instructions::port::Port;

/// Byte-wide access to the x86 I/O port space.
pub trait PortIo {
    /// Write a byte to `port`.
    fn write_u8(&mut self, port: u16, value: u8);

    /// Read a byte from `port`.
    fn read_u8(&mut self, port: u16) -> u8;
}

/// The real I/O port space, accessed with `in`/`out`.
#[derive(Debug)]
pub struct RawPorts {
    _private: (),
}

impl RawPorts {
    /// # Safety
    ///
    /// Writing to an arbitrary I/O port can have side effects on hardware.
    /// The caller must run at an I/O privilege level that permits port
    /// access and must ensure every driver handed this value owns the
    /// ports it touches.
    pub const unsafe fn new() -> Self {
        Self { _private: () }
    }
}

impl PortIo for RawPorts {
    #[inline]
    fn write_u8(&mut self, port: u16, value: u8) {
        unsafe { outb(port, value) }
    }

    #[inline]
    fn read_u8(&mut self, port: u16) -> u8 {
        unsafe { inb(port) }
    }
}

/// Write a byte to an x86 I/O port.
///
/// # Safety
///
/// Writing to an arbitrary I/O port can have side effects on hardware.
/// The caller must ensure the port and value are valid.
#[inline]
pub unsafe fn outb(port: u16, value: u8) {
    Port::<u8>::new(port).write(value);
}

/// Read a byte from an x86 I/O port.
///
/// # Safety
///
/// Reading from an arbitrary I/O port can have side effects on hardware.
/// The caller must ensure the port is valid.
#[inline]
pub unsafe fn inb(port: u16) -> u8 {
    Port::<u8>::new(port).read()
}
