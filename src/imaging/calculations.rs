//! Pure sprite-sheet geometry.
//!
//! The sheet is a grid of [`CELL`]×[`CELL`] slots, [`COLUMNS`] per row. Each
//! 16×16 icon sits [`INSET`] pixels in from its slot's top-left corner. Slot 0
//! holds the placeholder icon; sites are numbered from 1.
//!
//! All functions here are pure and testable without any I/O or images.

/// Edge length of one grid slot in pixels.
pub const CELL: u32 = 20;
/// Offset of the icon inside its slot.
pub const INSET: u32 = 2;
/// Slots per row. Caps the sheet width at `COLUMNS * CELL` = 1000px.
pub const COLUMNS: u32 = 50;

/// Position of a slot in the grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GridCell {
    pub row: u32,
    pub col: u32,
}

/// Grid cell of the `slot`-th icon, wrapping every [`COLUMNS`].
pub fn cell_for_slot(slot: u32) -> GridCell {
    GridCell {
        row: slot / COLUMNS,
        col: slot % COLUMNS,
    }
}

/// Top-left pixel of the icon drawn in `slot`.
///
/// The sprite stylesheet's `background-position` for the slot is the
/// negation of this point.
pub fn icon_origin(slot: u32) -> (u32, u32) {
    let GridCell { row, col } = cell_for_slot(slot);
    (CELL * col + INSET, CELL * row + INSET)
}

/// Sheet dimensions `(width, height)` for a grid of `slots` slots.
///
/// Width grows one cell per slot up to [`COLUMNS`] cells; height grows one
/// row per started group of [`COLUMNS`]. Always at least one cell.
pub fn sheet_dimensions(slots: u32) -> (u32, u32) {
    let slots = slots.max(1);
    let width = slots.min(COLUMNS) * CELL;
    let height = CELL * slots.div_ceil(COLUMNS);
    (width, height)
}

/// Slots needed for a run over `total_sites` sites: one per site plus the
/// placeholder in slot 0.
pub fn slots_for_sites(total_sites: usize) -> u32 {
    u32::try_from(total_sites)
        .unwrap_or(u32::MAX - 1)
        .saturating_add(1)
}
