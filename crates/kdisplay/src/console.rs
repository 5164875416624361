//! Terminal line discipline over the text framebuffer.

use core::fmt;

use khal::port::PortIo;

use crate::buffer::{Cell, Surface, CELLS, HEIGHT, WIDTH};
use crate::color::{Color, ColorCode, DEFAULT_COLOR};

// ── CRT controller ────────────────────────────────────────────────

pub const CRTC_INDEX: u16 = 0x3D4;
pub const CRTC_DATA: u16 = 0x3D5;

const CURSOR_START: u8 = 0x0A;
const CURSOR_END: u8 = 0x0B;
const CURSOR_HIGH: u8 = 0x0E;
const CURSOR_LOW: u8 = 0x0F;

/// Tab stops every 4 columns. Must be a power of two.
const TAB_WIDTH: usize = 4;

/// Text console: cursor, current attribute and the cells they act on.
///
/// The cursor always satisfies `column < WIDTH` and `row < HEIGHT`;
/// every path that advances it wraps or scrolls before returning.
pub struct Console<S, P> {
    surface: S,
    ports: P,
    column: usize,
    row: usize,
    color: ColorCode,
    default_color: ColorCode,
}

impl<S: Surface, P: PortIo> Console<S, P> {
    /// Take ownership of the framebuffer and clear it.
    pub fn new(surface: S, ports: P) -> Self {
        Self::with_color(surface, ports, DEFAULT_COLOR)
    }

    /// Like [`Console::new`], but `color` becomes the attribute that
    /// [`Console::initialize`] resets to.
    pub fn with_color(surface: S, ports: P, color: ColorCode) -> Self {
        let mut console = Self {
            surface,
            ports,
            column: 0,
            row: 0,
            color,
            default_color: color,
        };
        console.initialize();
        console
    }

    /// Reset the attribute, blank every cell and home the cursor.
    ///
    /// Safe to call again at any time; it just clears the screen.
    pub fn initialize(&mut self) {
        self.color = self.default_color;
        let blank = Cell::blank(self.color).to_u16();
        for index in 0..CELLS {
            self.surface.write(index, blank);
        }
        self.column = 0;
        self.row = 0;
        self.sync_cursor();
    }

    /// Attribute for subsequent writes. Existing cells keep theirs.
    pub fn set_color(&mut self, foreground: Color, background: Color) {
        self.color = ColorCode::new(foreground, background);
    }

    pub fn color(&self) -> ColorCode {
        self.color
    }

    /// `(column, row)` of the next write.
    pub fn cursor(&self) -> (usize, usize) {
        (self.column, self.row)
    }

    pub fn cell(&self, column: usize, row: usize) -> Cell {
        assert!(column < WIDTH && row < HEIGHT);
        Cell::from_u16(self.surface.read(row * WIDTH + column))
    }

    /// Write one byte, interpreting `\n`, `\t` and `\x08` (backspace).
    pub fn put_char(&mut self, byte: u8) {
        match byte {
            b'\n' => self.new_line(),
            b'\t' => {
                self.column = (self.column + TAB_WIDTH) & !(TAB_WIDTH - 1);
                if self.column >= WIDTH {
                    self.new_line();
                }
            }
            b'\x08' => {
                if self.column == 0 && self.row == 0 {
                    return;
                }
                if self.column > 0 {
                    self.column -= 1;
                } else {
                    self.row -= 1;
                    self.column = WIDTH - 1;
                }
                self.put_cell(Cell::blank(self.color));
            }
            byte => {
                self.put_cell(Cell::new(byte, self.color));
                self.column += 1;
                if self.column == WIDTH {
                    self.new_line();
                }
            }
        }
        self.sync_cursor();
    }

    pub fn write(&mut self, bytes: &[u8]) {
        for &byte in bytes {
            self.put_char(byte);
        }
    }

    /// Write `text` up to its first NUL, if it has one.
    pub fn write_string(&mut self, text: &str) {
        let bytes = text.as_bytes();
        let len = bytes.iter().position(|&b| b == 0).unwrap_or(bytes.len());
        self.write(&bytes[..len]);
    }

    /// Move every row up by one and blank the bottom row.
    ///
    /// The top row is lost; there is no scrollback.
    pub fn scroll(&mut self) {
        for index in 0..CELLS - WIDTH {
            let below = self.surface.read(index + WIDTH);
            self.surface.write(index, below);
        }
        let blank = Cell::blank(self.color).to_u16();
        for index in CELLS - WIDTH..CELLS {
            self.surface.write(index, blank);
        }
    }

    /// Make the hardware cursor visible, spanning scanlines
    /// `start..=end` of the character cell (0-15).
    pub fn enable_cursor(&mut self, start: u8, end: u8) {
        self.ports.write_u8(CRTC_INDEX, CURSOR_START);
        let shape = self.ports.read_u8(CRTC_DATA) & 0xC0;
        self.ports.write_u8(CRTC_DATA, shape | (start & 0x1F));

        self.ports.write_u8(CRTC_INDEX, CURSOR_END);
        let shape = self.ports.read_u8(CRTC_DATA) & 0xE0;
        self.ports.write_u8(CRTC_DATA, shape | (end & 0x1F));
    }

    fn put_cell(&mut self, cell: Cell) {
        self.surface
            .write(self.row * WIDTH + self.column, cell.to_u16());
    }

    fn new_line(&mut self) {
        self.column = 0;
        self.row += 1;
        if self.row == HEIGHT {
            self.scroll();
            self.row = HEIGHT - 1;
        }
    }

    fn sync_cursor(&mut self) {
        let position = (self.row * WIDTH + self.column) as u16;
        self.ports.write_u8(CRTC_INDEX, CURSOR_LOW);
        self.ports.write_u8(CRTC_DATA, (position & 0xFF) as u8);
        self.ports.write_u8(CRTC_INDEX, CURSOR_HIGH);
        self.ports.write_u8(CRTC_DATA, (position >> 8) as u8);
    }
}

impl<S: Surface, P: PortIo> fmt::Write for Console<S, P> {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        self.write(s.as_bytes());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::fmt::Write;

    #[derive(Default)]
    struct RecordingPorts {
        writes: Vec<(u16, u8)>,
    }

    impl PortIo for RecordingPorts {
        fn write_u8(&mut self, port: u16, value: u8) {
            self.writes.push((port, value));
        }

        fn read_u8(&mut self, _port: u16) -> u8 {
            0xFF
        }
    }

    type TestConsole = Console<[u16; CELLS], RecordingPorts>;

    fn console() -> TestConsole {
        Console::new([0u16; CELLS], RecordingPorts::default())
    }

    fn cursor_writes(position: u16) -> [(u16, u8); 4] {
        [
            (CRTC_INDEX, CURSOR_LOW),
            (CRTC_DATA, position as u8),
            (CRTC_INDEX, CURSOR_HIGH),
            (CRTC_DATA, (position >> 8) as u8),
        ]
    }

    fn row_text(console: &TestConsole, row: usize) -> Vec<u8> {
        (0..WIDTH).map(|col| console.cell(col, row).character).collect()
    }

    fn assert_blank_screen(console: &TestConsole, color: ColorCode) {
        for row in 0..HEIGHT {
            for col in 0..WIDTH {
                assert_eq!(console.cell(col, row), Cell::blank(color), "({col}, {row})");
            }
        }
    }

    #[test]
    fn initialize_clears_and_homes() {
        let c = console();
        assert_blank_screen(&c, DEFAULT_COLOR);
        assert_eq!(c.cursor(), (0, 0));
        assert_eq!(c.color(), DEFAULT_COLOR);
        assert_eq!(c.ports.writes, cursor_writes(0));
    }

    #[test]
    fn initialize_again_clears_again() {
        let mut c = console();
        c.set_color(Color::White, Color::Blue);
        c.write_string("hello\nworld");
        c.initialize();
        assert_blank_screen(&c, DEFAULT_COLOR);
        assert_eq!(c.cursor(), (0, 0));
        assert_eq!(c.color(), DEFAULT_COLOR);
    }

    #[test]
    fn with_color_sets_the_reset_attribute() {
        let green = ColorCode::new(Color::LightGreen, Color::Black);
        let mut c = Console::with_color([0u16; CELLS], RecordingPorts::default(), green);
        assert_blank_screen(&c, green);
        c.set_color(Color::Red, Color::Red);
        c.initialize();
        assert_eq!(c.color(), green);
    }

    #[test]
    fn set_color_applies_to_following_writes() {
        let mut c = console();
        for fg in Color::ALL {
            for bg in Color::ALL {
                c.set_color(fg, bg);
                let (col, row) = c.cursor();
                c.put_char(b'x');
                let cell = c.cell(col, row);
                assert_eq!(cell.character, b'x');
                assert_eq!(cell.color.0, fg as u8 | (bg as u8) << 4);
            }
        }
    }

    #[test]
    fn set_color_leaves_existing_cells() {
        let mut c = console();
        c.put_char(b'a');
        c.set_color(Color::Black, Color::White);
        assert_eq!(c.cell(0, 0), Cell::new(b'a', DEFAULT_COLOR));
        assert_eq!(c.cell(1, 0), Cell::blank(DEFAULT_COLOR));
    }

    #[test]
    fn full_line_wraps_to_next_row() {
        let mut c = console();
        c.write(&[b'#'; WIDTH]);
        assert_eq!(c.cursor(), (0, 1));
        assert_eq!(row_text(&c, 0), vec![b'#'; WIDTH]);
        assert_eq!(c.cell(0, 1), Cell::blank(DEFAULT_COLOR));

        c.write(&[b'#'; WIDTH - 1]);
        assert_eq!(c.cursor(), (WIDTH - 1, 1));
    }

    #[test]
    fn full_line_on_last_row_scrolls() {
        let mut c = console();
        c.write(&[b'\n'; HEIGHT - 1]);
        assert_eq!(c.cursor(), (0, HEIGHT - 1));

        c.write(&[b'z'; WIDTH]);
        assert_eq!(c.cursor(), (0, HEIGHT - 1));
        assert_eq!(row_text(&c, HEIGHT - 2), vec![b'z'; WIDTH]);
        assert_eq!(row_text(&c, HEIGHT - 1), vec![b' '; WIDTH]);
    }

    #[test]
    fn newlines_scroll_once_per_line_at_bottom() {
        let mut c = console();
        // Label each row with a letter, leaving the cursor on the last row.
        for row in 0..HEIGHT {
            c.put_char(b'A' + row as u8);
            if row < HEIGHT - 1 {
                c.put_char(b'\n');
            }
        }
        assert_eq!(c.cursor(), (1, HEIGHT - 1));

        c.write(&[b'\n'; HEIGHT - 1]);
        assert_eq!(c.cursor(), (0, HEIGHT - 1));
        // HEIGHT - 1 scrolls: only the old bottom row survives, now on top.
        assert_eq!(c.cell(0, 0).character, b'A' + (HEIGHT - 1) as u8);
        for row in 1..HEIGHT {
            assert_eq!(c.cell(0, row).character, b' ');
        }

        c.put_char(b'\n');
        assert_eq!(c.cursor(), (0, HEIGHT - 1));
        assert_blank_screen(&c, DEFAULT_COLOR);
    }

    #[test]
    fn newline_from_top_only_scrolls_past_the_bottom() {
        let mut c = console();
        c.write_string("top");
        c.write(&[b'\n'; HEIGHT - 1]);
        assert_eq!(c.cell(0, 0).character, b't');

        c.put_char(b'\n');
        assert_eq!(c.cursor(), (0, HEIGHT - 1));
        assert_eq!(c.cell(0, 0).character, b' ');
        assert_blank_screen(&c, DEFAULT_COLOR);
    }

    #[test]
    fn scroll_blanks_with_current_color() {
        let mut c = console();
        c.set_color(Color::Black, Color::Cyan);
        c.scroll();
        assert_eq!(
            c.cell(0, HEIGHT - 1),
            Cell::blank(ColorCode::new(Color::Black, Color::Cyan))
        );
        assert_eq!(c.cell(0, 0), Cell::blank(DEFAULT_COLOR));
    }

    #[test]
    fn tab_advances_to_next_stop() {
        let mut c = console();
        c.put_char(b'\t');
        assert_eq!(c.cursor(), (4, 0));

        c.write(b"\n12345");
        assert_eq!(c.cursor(), (5, 1));
        c.put_char(b'\t');
        assert_eq!(c.cursor(), (8, 1));
        c.put_char(b'\t');
        assert_eq!(c.cursor(), (12, 1));
        assert_eq!(c.cell(5, 1), Cell::blank(DEFAULT_COLOR));
    }

    #[test]
    fn tab_past_last_stop_wraps() {
        let mut c = console();
        c.write(&[b'-'; WIDTH - 2]);
        c.put_char(b'\t');
        assert_eq!(c.cursor(), (0, 1));

        c.write(&[b'-'; WIDTH - 4]);
        c.put_char(b'\t');
        assert_eq!(c.cursor(), (0, 2));
    }

    #[test]
    fn tab_past_last_stop_on_bottom_row_scrolls() {
        let mut c = console();
        c.write_string("top");
        c.write(&[b'\n'; HEIGHT - 1]);
        c.write(&[b'-'; WIDTH - 2]);
        c.put_char(b'\t');

        assert_eq!(c.cursor(), (0, HEIGHT - 1));
        // One scroll: the dashes moved up a row and "top" is gone.
        assert_eq!(row_text(&c, HEIGHT - 2)[..WIDTH - 2], [b'-'; WIDTH - 2]);
        assert_eq!(row_text(&c, HEIGHT - 1), vec![b' '; WIDTH]);
        assert_eq!(c.cell(0, 0), Cell::blank(DEFAULT_COLOR));
    }

    #[test]
    fn backspace_at_origin_is_noop() {
        let mut c = console();
        c.ports.writes.clear();
        c.put_char(b'\x08');
        assert_eq!(c.cursor(), (0, 0));
        assert!(c.ports.writes.is_empty());
        assert_blank_screen(&c, DEFAULT_COLOR);
    }

    #[test]
    fn backspace_erases_previous_cell() {
        let mut c = console();
        c.write(b"ab");
        c.set_color(Color::White, Color::Black);
        c.put_char(b'\x08');
        assert_eq!(c.cursor(), (1, 0));
        assert_eq!(c.cell(0, 0).character, b'a');
        assert_eq!(
            c.cell(1, 0),
            Cell::blank(ColorCode::new(Color::White, Color::Black))
        );
    }

    #[test]
    fn backspace_at_line_start_goes_to_previous_line_end() {
        let mut c = console();
        c.write(&[b'q'; WIDTH]);
        assert_eq!(c.cursor(), (0, 1));

        c.put_char(b'\x08');
        assert_eq!(c.cursor(), (WIDTH - 1, 0));
        assert_eq!(c.cell(WIDTH - 1, 0), Cell::blank(DEFAULT_COLOR));
        assert_eq!(c.cell(WIDTH - 2, 0).character, b'q');

        c.put_char(b'r');
        assert_eq!(c.cell(WIDTH - 1, 0).character, b'r');
        assert_eq!(c.cursor(), (0, 1));
    }

    #[test]
    fn cursor_registers_follow_every_write() {
        let mut c = console();
        c.write(b"\n\n\tabc");
        let position = (2 * WIDTH + 7) as u16;
        assert!(c.ports.writes.ends_with(&cursor_writes(position)));
        // initialize + one sync per byte
        assert_eq!(c.ports.writes.len(), 4 * 7);

        c.write(&[b'\n'; HEIGHT]);
        c.write(&[b'.'; WIDTH - 1]);
        assert!(c.ports.writes.ends_with(&cursor_writes((CELLS - 1) as u16)));
        assert_eq!(cursor_writes(1999)[1], (CRTC_DATA, 0xCF));
        assert_eq!(cursor_writes(1999)[3], (CRTC_DATA, 0x07));
    }

    #[test]
    fn write_string_stops_at_nul() {
        let mut a = console();
        let mut b = console();
        a.write_string("ab\tc\0ignored");
        b.write(b"ab\tc");
        assert_eq!(a.cursor(), b.cursor());
        assert_eq!(row_text(&a, 0), row_text(&b, 0));
        assert_eq!(a.ports.writes, b.ports.writes);
    }

    #[test]
    fn formatted_output() {
        let mut c = console();
        write!(c, "{}+{}={}", 2, 2, 4).unwrap();
        assert_eq!(&row_text(&c, 0)[..5], b"2+2=4");
        assert_eq!(c.cursor(), (5, 0));
    }

    #[test]
    fn enable_cursor_programs_shape_registers() {
        let mut c = console();
        c.ports.writes.clear();
        c.enable_cursor(14, 15);
        assert_eq!(
            c.ports.writes,
            [
                (CRTC_INDEX, CURSOR_START),
                (CRTC_DATA, 0xC0 | 14),
                (CRTC_INDEX, CURSOR_END),
                (CRTC_DATA, 0xE0 | 15),
            ]
        );
    }
}
