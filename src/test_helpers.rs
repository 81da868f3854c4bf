//! Shared test utilities for the siteicons test suite.
//!
//! Provides icon file writers, a site-tree fixture laid out like a real
//! checkout, and a recording [`MockTransport`] standing in for the favicon
//! providers.
//!
//! # Usage
//!
//! ```rust
//! use crate::test_helpers::*;
//!
//! let site = SiteTree::new(CATALOG_ONE_SITE);
//! let transport = MockTransport::offline();
//! transport.respond_with_icon("http://favicon.yandex.net/favicon/google.com");
//! ```

use image::codecs::ico::IcoEncoder;
use image::codecs::png::PngEncoder;
use image::{ImageEncoder, RgbaImage};
use std::collections::HashMap;
use std::io::Cursor;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tempfile::TempDir;

use crate::config::{Layout, PathsConfig};
use crate::fetch::{HttpResponse, Transport, TransportError};

// =========================================================================
// Icon files
// =========================================================================

/// Pixels with enough noise that the encoded PNG never drops under the
/// fetcher's minimum icon size.
pub fn noisy_image(width: u32, height: u32) -> RgbaImage {
    let mut state: u32 = 0x2545_f491 ^ (width << 16) ^ height;
    RgbaImage::from_fn(width, height, |_, _| {
        state = state.wrapping_mul(1_103_515_245).wrapping_add(12_345);
        let [r, g, b, _] = state.to_le_bytes();
        image::Rgba([r, g, b, 255])
    })
}

pub fn png_bytes(width: u32, height: u32) -> Vec<u8> {
    let img = noisy_image(width, height);
    let mut buf = Vec::new();
    PngEncoder::new(Cursor::new(&mut buf))
        .write_image(img.as_raw(), width, height, image::ExtendedColorType::Rgba8)
        .unwrap();
    buf
}

pub fn ico_bytes(size: u32) -> Vec<u8> {
    let img = noisy_image(size, size);
    let mut buf = Vec::new();
    IcoEncoder::new(Cursor::new(&mut buf))
        .write_image(img.as_raw(), size, size, image::ExtendedColorType::Rgba8)
        .unwrap();
    buf
}

pub fn write_png(path: &Path, width: u32, height: u32) {
    std::fs::write(path, png_bytes(width, height)).unwrap();
}

pub fn write_ico(path: &Path, size: u32) {
    std::fs::write(path, ico_bytes(size)).unwrap();
}

// =========================================================================
// Site tree fixture
// =========================================================================

pub const CATALOG_ONE_SITE: &str = r#"
index:
  - category: Search
    links:
      - title: Google
        url: https://www.google.com/search
        favicon: ""
"#;

/// A temp directory laid out like a site checkout, with a catalog in place.
pub struct SiteTree {
    pub tmp: TempDir,
    pub layout: Layout,
}

impl SiteTree {
    pub fn new(catalog_yaml: &str) -> Self {
        let tmp = TempDir::new().unwrap();
        let layout = Layout::new(tmp.path(), &PathsConfig::default());
        std::fs::create_dir_all(layout.catalog().parent().unwrap()).unwrap();
        std::fs::write(layout.catalog(), catalog_yaml).unwrap();
        Self { tmp, layout }
    }

    pub fn root(&self) -> &Path {
        self.tmp.path()
    }

    /// Write an icon into the current icon directory, as a previous run would
    /// have left it.
    pub fn add_icon(&self, filename: &str) -> PathBuf {
        let dir = self.layout.icon_dir();
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join(filename);
        write_png(&path, 32, 32);
        path
    }

    pub fn read(&self, path: &Path) -> String {
        std::fs::read_to_string(path)
            .unwrap_or_else(|e| panic!("failed to read {}: {e}", path.display()))
    }
}

// =========================================================================
// Mock transport
// =========================================================================

/// Transport answering from a fixed URL → response table. Unknown URLs fail
/// like an unreachable network. Every request is recorded.
#[derive(Default)]
pub struct MockTransport {
    pub responses: Mutex<HashMap<String, HttpResponse>>,
    pub requests: Mutex<Vec<String>>,
}

impl MockTransport {
    pub fn offline() -> Self {
        Self::default()
    }

    pub fn respond(&self, url: &str, status: u16, body: Vec<u8>) {
        self.responses
            .lock()
            .unwrap()
            .insert(url.to_string(), HttpResponse { status, body });
    }

    pub fn respond_with_icon(&self, url: &str) {
        self.respond(url, 200, png_bytes(32, 32));
    }

    pub fn get_requests(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }
}

impl Transport for MockTransport {
    fn get(&self, url: &str) -> Result<HttpResponse, TransportError> {
        self.requests.lock().unwrap().push(url.to_string());
        self.responses
            .lock()
            .unwrap()
            .get(url)
            .cloned()
            .ok_or_else(|| TransportError(format!("{url}: network unreachable")))
    }
}
