//! The color value type shared by palettes and diaries.
//!
//! [`HexColor`] owns validation, the textual and storage forms, and the
//! hue/saturation/value ordering used to lay out a user's palette.

mod error;
mod hex_color;
mod ordering;

pub use error::HexColorError;
pub use hex_color::{is_hex, parse_hex_color, HexColor};
pub use ordering::{sort_palette, PaletteColor};
