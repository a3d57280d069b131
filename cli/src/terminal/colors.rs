use colored::Color;

pub const PRIMARY: Color = Color::TrueColor { r: 94, g: 234, b: 212 };
pub const ACCENT: Color = Color::TrueColor { r: 250, g: 204, b: 21 };
pub const SEPARATOR: Color = Color::TrueColor { r: 100, g: 116, b: 139 };
pub const TEXT_DEFAULT: Color = Color::TrueColor { r: 226, g: 232, b: 240 };
pub const IPV4_ADDR: Color = Color::TrueColor { r: 96, g: 165, b: 250 };
pub const IPV4_PREFIX: Color = Color::TrueColor { r: 147, g: 197, b: 253 };
pub const MAC_ADDR: Color = Color::TrueColor { r: 196, g: 181, b: 253 };
pub const STREAM_URI: Color = Color::TrueColor { r: 134, g: 239, b: 172 };
pub const FAILURE: Color = Color::TrueColor { r: 248, g: 113, b: 113 };
