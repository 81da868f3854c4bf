//! Sprite sheet packing.
//!
//! Every usable icon is drawn into the next free cell of one PNG, and the
//! sprite stylesheet gets a rule cropping that cell by pixel offset:
//!
//! ```css
//! .site-bookmark-img {
//!   background: url("sitesprites.png");
//!   display: inline-block;
//!   height: 16px;
//!   width: 16px;
//! }
//! .nofavicon {
//!   background-position: -2px -2px;
//! }
//! .wwwgooglecom {
//!   background-position: -22px -2px;
//! }
//! ```
//!
//! # Lifecycle
//!
//! One [`SpritePacker`] exists per run. [`SpritePacker::begin`] sizes the
//! sheet for the run's total site count (see
//! [`sheet_dimensions`](crate::imaging::sheet_dimensions)), draws the
//! placeholder into slot 0 and writes both files. Each
//! [`place`](SpritePacker::place) claims the next slot, draws into the
//! in-memory raster and rewrites the PNG, so the file on disk always matches
//! the stylesheet even if the run dies halfway.
//!
//! Placements take `&mut self`; the packer is the single writer of both files.

use crate::imaging::{self, ImagingError};
use crate::naming::NO_FAVICON_CLASS;
use image::RgbaImage;
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Class carrying the shared sprite background; pages combine it with the
/// per-site class.
pub const BASE_CLASS: &str = "site-bookmark-img";

#[derive(Error, Debug)]
pub enum SpriteError {
    #[error("failed to write {}: {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error(transparent)]
    Imaging(#[from] ImagingError),
    #[error("sprite sheet is full ({capacity} slots)")]
    Full { capacity: u32 },
}

/// Where an icon landed on the sheet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Placement {
    pub slot: u32,
    /// Top-left pixel of the icon.
    pub x: u32,
    pub y: u32,
}

/// Rule shared by every sprite icon.
pub fn base_rule(sprite_url: &str) -> String {
    format!(
        ".{BASE_CLASS} {{\n  background: url(\"{sprite_url}\");\n  display: inline-block;\n  height: 16px;\n  width: 16px;\n}}\n"
    )
}

/// Rule cropping the icon at `(x, y)`.
pub fn position_rule(class: &str, x: u32, y: u32) -> String {
    format!(".{class} {{\n  background-position: -{x}px -{y}px;\n}}\n")
}

pub struct SpritePacker {
    sheet: RgbaImage,
    capacity: u32,
    placed: u32,
    image_path: PathBuf,
    css_path: PathBuf,
    css: File,
}

impl SpritePacker {
    /// Start the sheet for a run over `total_sites` sites.
    ///
    /// Writes the base and placeholder rules to the stylesheet, draws the
    /// placeholder glyph into slot 0 and writes the sheet.
    pub fn begin(
        image_path: &Path,
        css_path: &Path,
        total_sites: usize,
    ) -> Result<Self, SpriteError> {
        let capacity = imaging::slots_for_sites(total_sites);
        let (width, height) = imaging::sheet_dimensions(capacity);

        let css = OpenOptions::new()
            .create(true)
            .append(true)
            .open(css_path)
            .map_err(|source| SpriteError::Io {
                path: css_path.to_path_buf(),
                source,
            })?;

        let mut packer = Self {
            sheet: RgbaImage::new(width, height),
            capacity,
            placed: 0,
            image_path: image_path.to_path_buf(),
            css_path: css_path.to_path_buf(),
            css,
        };

        let sprite_url = image_path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let (x, y) = imaging::icon_origin(0);
        packer.write_css(&base_rule(&sprite_url))?;
        packer.write_css(&position_rule(NO_FAVICON_CLASS, x, y))?;
        packer.draw(0, &imaging::placeholder()?);
        packer.flush()?;
        Ok(packer)
    }

    /// Draw `icon` into the next free slot and append its rule.
    pub fn place(&mut self, class: &str, icon: &RgbaImage) -> Result<Placement, SpriteError> {
        let slot = self.placed + 1;
        if slot >= self.capacity {
            return Err(SpriteError::Full {
                capacity: self.capacity,
            });
        }
        self.placed = slot;

        let (x, y) = self.draw(slot, icon);
        self.flush()?;
        self.write_css(&position_rule(class, x, y))?;
        Ok(Placement { slot, x, y })
    }

    /// Icons placed so far, not counting the placeholder.
    pub fn placed(&self) -> u32 {
        self.placed
    }

    pub fn dimensions(&self) -> (u32, u32) {
        self.sheet.dimensions()
    }

    fn draw(&mut self, slot: u32, icon: &RgbaImage) -> (u32, u32) {
        let (x, y) = imaging::icon_origin(slot);
        image::imageops::replace(&mut self.sheet, icon, i64::from(x), i64::from(y));
        (x, y)
    }

    fn flush(&self) -> Result<(), SpriteError> {
        let png = imaging::encode_png(&self.sheet)?;
        std::fs::write(&self.image_path, png).map_err(|source| SpriteError::Io {
            path: self.image_path.clone(),
            source,
        })
    }

    fn write_css(&mut self, rule: &str) -> Result<(), SpriteError> {
        self.css
            .write_all(rule.as_bytes())
            .map_err(|source| SpriteError::Io {
                path: self.css_path.clone(),
                source,
            })
    }
}
