// =============================================================================
// Bare Bones — Keyboard → Console Control Loop
// =============================================================================
//
// The whole runtime of the kernel after boot:
//
//   loop {
//       scancode = keyboard.read_scancode()   // spins until a key event
//       byte     = modifiers.apply(scancode)  // latch Shift / Caps Lock
//       console.put_char(byte)                // if it decoded to anything
//   }
//
// MODIFIER STATE:
//   The scancode decoder in khal is stateless. Shift (momentary) and
//   Caps Lock (toggle) are latched here and folded into one "shifted"
//   flag with XOR, so Caps Lock + Shift types lowercase letters.
//
//   Modifier scancodes are consumed: they never reach decode().
//
// NO INTERRUPTS:
//   Nothing else runs while we wait for the keyboard, so no locking is
//   needed around Modifiers. An IRQ-driven keyboard would have to move
//   this state behind a lock shared with the handler.
//
// =============================================================================

use kdisplay::{Console, Surface};
use khal::keyboard::{self, Ps2Keyboard, Scancode};
use khal::port::PortIo;

/// Anything that can block until the next raw scancode.
pub trait ScancodeSource {
    fn read_scancode(&mut self) -> u8;
}

impl<P: PortIo> ScancodeSource for Ps2Keyboard<P> {
    fn read_scancode(&mut self) -> u8 {
        Ps2Keyboard::read_scancode(self)
    }
}

/// Where decoded characters go.
pub trait CharSink {
    fn put_char(&mut self, byte: u8);
}

impl<S: Surface, P: PortIo> CharSink for Console<S, P> {
    fn put_char(&mut self, byte: u8) {
        Console::put_char(self, byte);
    }
}

/// Shift and Caps Lock, as latched from the scancode stream.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Modifiers {
    /// Either Shift key is down.
    pub shift_held: bool,
    /// Caps Lock has been pressed an odd number of times.
    pub caps_locked: bool,
}

impl Modifiers {
    pub const fn new() -> Self {
        Self {
            shift_held: false,
            caps_locked: false,
        }
    }

    /// Whether the next key should use the shifted table column.
    pub const fn shifted(&self) -> bool {
        self.shift_held ^ self.caps_locked
    }

    /// Feed one raw scancode.
    ///
    /// Updates the latched modifiers and returns the byte to print, if
    /// the scancode is a make-code with a printable mapping.
    pub fn apply(&mut self, scancode: u8) -> Option<u8> {
        match keyboard::classify(scancode) {
            Scancode::ShiftPressed => {
                self.shift_held = true;
                None
            }
            Scancode::ShiftReleased => {
                self.shift_held = false;
                None
            }
            Scancode::CapsLock => {
                self.caps_locked = !self.caps_locked;
                log::debug!("caps lock {}", if self.caps_locked { "on" } else { "off" });
                None
            }
            Scancode::Make(code) => keyboard::decode(code, self.shifted()),
            Scancode::Break(_) => None,
        }
    }
}

/// Run one iteration: wait for a scancode and echo what it decodes to.
pub fn step<K, C>(keyboard: &mut K, modifiers: &mut Modifiers, console: &mut C) -> Option<u8>
where
    K: ScancodeSource,
    C: CharSink,
{
    let scancode = keyboard.read_scancode();
    let byte = modifiers.apply(scancode);
    log::trace!("scancode {:#04x} -> {:?}", scancode, byte);
    if let Some(byte) = byte {
        console.put_char(byte);
    }
    byte
}

/// Echo the keyboard to the console forever.
pub fn run<K, C>(keyboard: &mut K, console: &mut C) -> !
where
    K: ScancodeSource,
    C: CharSink,
{
    let mut modifiers = Modifiers::new();
    loop {
        step(keyboard, &mut modifiers, console);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kdisplay::{Cell, CELLS, DEFAULT_COLOR};

    /// Replays a fixed list of scancodes, then panics if read again.
    struct Replay {
        codes: Vec<u8>,
        next: usize,
    }

    impl Replay {
        fn new(codes: &[u8]) -> Self {
            Self { codes: codes.to_vec(), next: 0 }
        }

        fn done(&self) -> bool {
            self.next == self.codes.len()
        }
    }

    impl ScancodeSource for Replay {
        fn read_scancode(&mut self) -> u8 {
            let code = self.codes[self.next];
            self.next += 1;
            code
        }
    }

    impl CharSink for Vec<u8> {
        fn put_char(&mut self, byte: u8) {
            self.push(byte);
        }
    }

    struct NullPorts;

    impl PortIo for NullPorts {
        fn write_u8(&mut self, _port: u16, _value: u8) {}

        fn read_u8(&mut self, _port: u16) -> u8 {
            0
        }
    }

    fn typed(codes: &[u8], modifiers: &mut Modifiers) -> Vec<u8> {
        let mut source = Replay::new(codes);
        let mut out = Vec::new();
        while !source.done() {
            step(&mut source, modifiers, &mut out);
        }
        out
    }

    #[test]
    fn shift_is_momentary() {
        let mut m = Modifiers::new();
        assert_eq!(typed(&[0x2A, 0x1E, 0xAA, 0x1E], &mut m), b"Aa");
        assert!(!m.shift_held);
    }

    #[test]
    fn right_shift_behaves_like_left() {
        let mut m = Modifiers::new();
        assert_eq!(typed(&[0x36, 0x1E, 0x9E, 0xB6, 0x1E], &mut m), b"Aa");
    }

    #[test]
    fn caps_lock_toggles() {
        let mut m = Modifiers::new();
        assert_eq!(typed(&[0x1E, 0x3A, 0x1E], &mut m), b"aA");
        assert!(m.caps_locked);

        assert_eq!(typed(&[0x3A, 0x1E], &mut m), b"a");
        assert_eq!(m, Modifiers::new());
    }

    #[test]
    fn caps_lock_release_is_ignored() {
        let mut m = Modifiers::new();
        assert_eq!(typed(&[0x3A, 0xBA, 0x1E], &mut m), b"A");
    }

    #[test]
    fn shift_with_caps_lock_cancels_out() {
        let mut m = Modifiers { shift_held: false, caps_locked: true };
        assert_eq!(typed(&[0x2A, 0x1E, 0xAA, 0x1E], &mut m), b"aA");
    }

    #[test]
    fn modifiers_and_releases_print_nothing() {
        let mut m = Modifiers::new();
        for code in [0x2A, 0xAA, 0x36, 0xB6, 0x3A, 0x9E, 0x81, 0x01] {
            let before = m;
            assert_eq!(m.apply(code), None, "scancode {code:#04x}");
            if code == 0x3A {
                assert_ne!(m, before);
            }
        }
    }

    #[test]
    fn keystrokes_reach_the_screen() {
        let mut console = Console::new([0u16; CELLS], NullPorts);
        let mut source = Replay::new(&[
            0x2A, 0x23, 0xAA, 0x17, // "Hi"
            0x1C, // Enter
            0x0F, 0x1F, // Tab, 's'
            0x0E, // Backspace
        ]);
        let mut modifiers = Modifiers::new();
        while !source.done() {
            step(&mut source, &mut modifiers, &mut console);
        }

        assert_eq!(console.cell(0, 0), Cell::new(b'H', DEFAULT_COLOR));
        assert_eq!(console.cell(1, 0), Cell::new(b'i', DEFAULT_COLOR));
        assert_eq!(console.cell(4, 1), Cell::blank(DEFAULT_COLOR));
        assert_eq!(console.cursor(), (4, 1));
    }
}
