//! Icon image handling in pure Rust via the `image` crate.
//!
//! | Operation | Crate / function |
//! |---|---|
//! | **Decode** | `image::load` (PNG, ICO) |
//! | **Normalize** | bilinear resize to 16×16 RGBA |
//! | **Encode** | PNG for data URIs and the sprite sheet |
//!
//! The module is split into:
//! - **Calculations**: Pure sprite-grid geometry (unit testable)
//! - **Normalize**: Decode, resample, encode, placeholder glyph

mod calculations;
pub mod normalize;

pub use calculations::{
    CELL, COLUMNS, GridCell, INSET, cell_for_slot, icon_origin, sheet_dimensions, slots_for_sites,
};
pub use normalize::{
    ICON_SIZE, ImagingError, PLACEHOLDER_PNG_BASE64, decode_icon, encode_png, normalize,
    placeholder, thumbnail,
};
