//! The 16-color VGA text palette and packed attribute bytes.

/// VGA text-mode color. The discriminant is the 4-bit palette index.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Color {
    Black = 0,
    Blue = 1,
    Green = 2,
    Cyan = 3,
    Red = 4,
    Magenta = 5,
    Brown = 6,
    LightGrey = 7,
    DarkGrey = 8,
    LightBlue = 9,
    LightGreen = 10,
    LightCyan = 11,
    LightRed = 12,
    Pink = 13,
    Yellow = 14,
    White = 15,
}

impl Color {
    pub const ALL: [Color; 16] = [
        Color::Black,
        Color::Blue,
        Color::Green,
        Color::Cyan,
        Color::Red,
        Color::Magenta,
        Color::Brown,
        Color::LightGrey,
        Color::DarkGrey,
        Color::LightBlue,
        Color::LightGreen,
        Color::LightCyan,
        Color::LightRed,
        Color::Pink,
        Color::Yellow,
        Color::White,
    ];

    /// Palette entry for the low nibble of `value`.
    pub const fn from_u8(value: u8) -> Self {
        Self::ALL[(value & 0x0F) as usize]
    }
}

/// Attribute byte: foreground in bits 0-3, background in bits 4-7.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(transparent)]
pub struct ColorCode(pub u8);

impl ColorCode {
    pub const fn new(foreground: Color, background: Color) -> Self {
        Self((background as u8) << 4 | foreground as u8)
    }

    pub const fn foreground(self) -> Color {
        Color::from_u8(self.0)
    }

    pub const fn background(self) -> Color {
        Color::from_u8(self.0 >> 4)
    }
}

/// Attribute applied by [`crate::Console::initialize`].
pub const DEFAULT_COLOR: ColorCode = ColorCode::new(Color::LightRed, Color::DarkGrey);
