use serde::Serialize;

use super::HexColor;

/// A stored color as it appears in a user's palette.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PaletteColor {
    pub id: i32,
    pub hex_color: HexColor,
}

/// Sorts a palette for display: [`HexColor::palette_cmp`] ascending, ties by id.
pub fn sort_palette(mut colors: Vec<PaletteColor>) -> Vec<PaletteColor> {
    colors.sort_by(|a, b| {
        a.hex_color
            .palette_cmp(&b.hex_color)
            .then_with(|| a.id.cmp(&b.id))
    });
    colors
}
