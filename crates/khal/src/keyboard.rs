//! PS/2 keyboard driver, polled.
//!
//! Reads raw Set 1 (XT) scancodes from the 8042 controller and maps
//! make-codes to ASCII through a fixed US QWERTY table. The decoder is
//! stateless: Shift and Caps Lock latching belongs to the caller, which
//! picks the shifted or unshifted column via [`decode`].

use bitflags::bitflags;

use crate::port::PortIo;

// ── PS/2 controller ports ─────────────────────────────────────────

/// Data port — read scancodes, write commands to device.
pub const PS2_DATA: u16 = 0x60;
/// Status / command port.
pub const PS2_STATUS: u16 = 0x64;

// ── Scancodes the caller latches on ───────────────────────────────

pub const LEFT_SHIFT: u8 = 0x2A;
pub const RIGHT_SHIFT: u8 = 0x36;
pub const CAPS_LOCK: u8 = 0x3A;
/// Bit 7 marks a break (key release) code.
pub const BREAK_BIT: u8 = 0x80;

bitflags! {
    /// 8042 status register, read from [`PS2_STATUS`].
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct Status: u8 {
        /// A byte is waiting in the data port.
        const OUTPUT_FULL = 1 << 0;
        /// The controller has not consumed the last byte written.
        const INPUT_FULL = 1 << 1;
        const SYSTEM = 1 << 2;
        /// Last write went to the command port rather than data.
        const COMMAND = 1 << 3;
        const TIMEOUT = 1 << 6;
        const PARITY = 1 << 7;
    }
}

/// A raw scancode sorted by what the control loop must do with it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scancode {
    ShiftPressed,
    ShiftReleased,
    CapsLock,
    /// Any other key press; the payload is the make-code.
    Make(u8),
    /// Any other key release; the payload is the make-code it releases.
    Break(u8),
}

/// Sort a raw byte into a [`Scancode`].
pub fn classify(scancode: u8) -> Scancode {
    match scancode {
        LEFT_SHIFT | RIGHT_SHIFT => Scancode::ShiftPressed,
        0xAA | 0xB6 => Scancode::ShiftReleased,
        CAPS_LOCK => Scancode::CapsLock,
        code if code & BREAK_BIT != 0 => Scancode::Break(code & !BREAK_BIT),
        code => Scancode::Make(code),
    }
}

// ── Scancode table ────────────────────────────────────────────────

/// (unshifted, shifted) ASCII for each make-code; 0 means no character.
static SCANCODE_TABLE: [(u8, u8); 0x80] = build_table();

const fn build_table() -> [(u8, u8); 0x80] {
    let mut t = [(0u8, 0u8); 0x80];

    t[0x02] = (b'1', b'!');
    t[0x03] = (b'2', b'@');
    t[0x04] = (b'3', b'#');
    t[0x05] = (b'4', b'$');
    t[0x06] = (b'5', b'%');
    t[0x07] = (b'6', b'^');
    t[0x08] = (b'7', b'&');
    t[0x09] = (b'8', b'*');
    t[0x0A] = (b'9', b'(');
    t[0x0B] = (b'0', b')');
    t[0x0C] = (b'-', b'_');
    t[0x0D] = (b'=', b'+');
    t[0x0E] = (b'\x08', b'\x08');
    t[0x0F] = (b'\t', b'\t');

    t[0x10] = (b'q', b'Q');
    t[0x11] = (b'w', b'W');
    t[0x12] = (b'e', b'E');
    t[0x13] = (b'r', b'R');
    t[0x14] = (b't', b'T');
    t[0x15] = (b'y', b'Y');
    t[0x16] = (b'u', b'U');
    t[0x17] = (b'i', b'I');
    t[0x18] = (b'o', b'O');
    t[0x19] = (b'p', b'P');
    t[0x1A] = (b'[', b'{');
    t[0x1B] = (b']', b'}');
    t[0x1C] = (b'\n', b'\n');

    t[0x1E] = (b'a', b'A');
    t[0x1F] = (b's', b'S');
    t[0x20] = (b'd', b'D');
    t[0x21] = (b'f', b'F');
    t[0x22] = (b'g', b'G');
    t[0x23] = (b'h', b'H');
    t[0x24] = (b'j', b'J');
    t[0x25] = (b'k', b'K');
    t[0x26] = (b'l', b'L');
    t[0x27] = (b';', b':');
    t[0x28] = (b'\'', b'"');
    t[0x29] = (b'`', b'~');

    t[0x2B] = (b'\\', b'|');
    t[0x2C] = (b'z', b'Z');
    t[0x2D] = (b'x', b'X');
    t[0x2E] = (b'c', b'C');
    t[0x2F] = (b'v', b'V');
    t[0x30] = (b'b', b'B');
    t[0x31] = (b'n', b'N');
    t[0x32] = (b'm', b'M');
    t[0x33] = (b',', b'<');
    t[0x34] = (b'.', b'>');
    t[0x35] = (b'/', b'?');

    // Keypad '*'
    t[0x37] = (b'*', b'*');
    t[0x39] = (b' ', b' ');

    t
}

/// Map a make-code to its ASCII byte.
///
/// Returns `None` for keys with no printable mapping (Escape, Ctrl,
/// function keys, unused codes) and for break codes, which callers are
/// expected to filter out before getting here.
pub fn decode(scancode: u8, shifted: bool) -> Option<u8> {
    let (plain, shift) = *SCANCODE_TABLE.get(scancode as usize)?;
    let byte = if shifted { shift } else { plain };
    (byte != 0).then_some(byte)
}

// ── Controller ────────────────────────────────────────────────────

/// Polled PS/2 keyboard on the 8042 status/data port pair.
pub struct Ps2Keyboard<P> {
    ports: P,
}

impl<P: PortIo> Ps2Keyboard<P> {
    pub const fn new(ports: P) -> Self {
        Self { ports }
    }

    pub fn status(&mut self) -> Status {
        Status::from_bits_truncate(self.ports.read_u8(PS2_STATUS))
    }

    /// Return the pending scancode, if the controller has one.
    pub fn try_read_scancode(&mut self) -> Option<u8> {
        if self.status().contains(Status::OUTPUT_FULL) {
            Some(self.ports.read_u8(PS2_DATA))
        } else {
            None
        }
    }

    /// Spin on the status port until a byte arrives, then return it.
    ///
    /// There is no timeout: with no key events this never returns.
    pub fn read_scancode(&mut self) -> u8 {
        loop {
            if let Some(scancode) = self.try_read_scancode() {
                return scancode;
            }
            core::hint::spin_loop();
        }
    }

    pub fn into_inner(self) -> P {
        self.ports
    }
}
