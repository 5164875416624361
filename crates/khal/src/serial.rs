//! Serial port (COM1 UART 16550) driver.
//!
//! Log output only; the console never reads from it.

use core::fmt;
use spin::Mutex;

use crate::port::{PortIo, RawPorts};

/// COM1 base port address
pub const COM1_PORT: u16 = 0x3F8;

const DATA: u16 = 0;
const INT_ENABLE: u16 = 1;
const FIFO_CTRL: u16 = 2;
const LINE_CTRL: u16 = 3;
const MODEM_CTRL: u16 = 4;
const LINE_STATUS: u16 = 5;

/// Line status: transmit holding register empty.
const LSR_TX_EMPTY: u8 = 1 << 5;
const LOOPBACK_PROBE: u8 = 0xAE;

/// 16550 UART at a fixed base port.
pub struct Serial<P> {
    ports: P,
    base: u16,
    initialized: bool,
}

impl<P: PortIo> Serial<P> {
    /// Create an uninitialized port; writes are dropped until [`Serial::init`].
    pub const fn new(ports: P, base: u16) -> Self {
        Self {
            ports,
            base,
            initialized: false,
        }
    }

    /// Program 115200 baud, 8N1, FIFOs on, interrupts off.
    ///
    /// Returns `false` if the loopback self-test failed. The port is
    /// used anyway; on emulators the probe is not always echoed.
    pub fn init(&mut self) -> bool {
        let base = self.base;
        let io = &mut self.ports;

        io.write_u8(base + INT_ENABLE, 0x00);
        // DLAB on, divisor 1
        io.write_u8(base + LINE_CTRL, 0x80);
        io.write_u8(base + DATA, 0x01);
        io.write_u8(base + INT_ENABLE, 0x00);
        // 8 bits, no parity, one stop bit, DLAB off
        io.write_u8(base + LINE_CTRL, 0x03);
        io.write_u8(base + FIFO_CTRL, 0xC7);
        io.write_u8(base + MODEM_CTRL, 0x03);

        io.write_u8(base + MODEM_CTRL, 0x1E);
        io.write_u8(base + DATA, LOOPBACK_PROBE);
        let echoed = io.read_u8(base + DATA) == LOOPBACK_PROBE;

        io.write_u8(base + MODEM_CTRL, 0x0F);
        self.initialized = true;
        echoed
    }

    fn is_transmit_empty(&mut self) -> bool {
        self.ports.read_u8(self.base + LINE_STATUS) & LSR_TX_EMPTY != 0
    }

    /// Write a byte, spinning until the transmitter is free.
    pub fn write_byte(&mut self, byte: u8) {
        if !self.initialized {
            return;
        }
        while !self.is_transmit_empty() {
            core::hint::spin_loop();
        }
        self.ports.write_u8(self.base + DATA, byte);
    }
}

impl<P: PortIo> fmt::Write for Serial<P> {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        for byte in s.bytes() {
            self.write_byte(byte);
        }
        Ok(())
    }
}

/// Global serial port instance (COM1)
static SERIAL: Mutex<Serial<RawPorts>> =
    Mutex::new(Serial::new(unsafe { RawPorts::new() }, COM1_PORT));

/// Initialize the global serial port
pub fn init() -> bool {
    SERIAL.lock().init()
}

/// Write a string to the serial port
pub fn write_str(s: &str) {
    let _ = fmt::Write::write_str(&mut *SERIAL.lock(), s);
}

/// Write formatted arguments to the serial port
pub fn write_fmt(args: fmt::Arguments) {
    let _ = fmt::Write::write_fmt(&mut *SERIAL.lock(), args);
}
