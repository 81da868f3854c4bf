//! Stylesheet with every icon inlined as a base64 data URI.
//!
//! ```css
//! .nofavicon {
//!   background-image: url("data:image/png;base64,iVBORw0KGgo...");
//! }
//! .wwwgooglecom {
//!   background-image: url("data:image/png;base64,iVBORw0KGgo...");
//! }
//! ```
//!
//! The placeholder rule is written once, when the file is opened empty. Icon
//! rules follow in processing order with no sorting or deduplication.

use crate::imaging::{self, ImagingError};
use crate::naming::NO_FAVICON_CLASS;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use image::RgbaImage;
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum InlineCssError {
    #[error("failed to write {}: {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error(transparent)]
    Imaging(#[from] ImagingError),
}

/// `data:` URI for PNG bytes.
pub fn data_uri(png: &[u8]) -> String {
    format!("data:image/png;base64,{}", STANDARD.encode(png))
}

/// One rule binding `class` to a data URI background.
pub fn inline_rule(class: &str, uri: &str) -> String {
    format!(".{class} {{\n  background-image: url(\"{uri}\");\n}}\n")
}

/// Append-only handle on the inline stylesheet.
pub struct InlineStylesheet {
    path: PathBuf,
    file: File,
}

impl InlineStylesheet {
    /// Open (creating if needed) for appending. An empty file first receives
    /// the placeholder rule.
    pub fn open(path: &Path) -> Result<Self, InlineCssError> {
        let io_err = |source| InlineCssError::Io {
            path: path.to_path_buf(),
            source,
        };
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .map_err(io_err)?;
        let mut sheet = Self {
            path: path.to_path_buf(),
            file,
        };

        if sheet.file.metadata().map_err(io_err)?.len() == 0 {
            let png = STANDARD
                .decode(imaging::PLACEHOLDER_PNG_BASE64)
                .map_err(|e| ImagingError::Placeholder(e.to_string()))?;
            sheet.write(&inline_rule(NO_FAVICON_CLASS, &data_uri(&png)))?;
        }
        Ok(sheet)
    }

    /// Append the rule for one normalized icon.
    pub fn append(&mut self, class: &str, icon: &RgbaImage) -> Result<(), InlineCssError> {
        let png = imaging::encode_png(icon)?;
        self.write(&inline_rule(class, &data_uri(&png)))
    }

    fn write(&mut self, rule: &str) -> Result<(), InlineCssError> {
        self.file
            .write_all(rule.as_bytes())
            .map_err(|source| InlineCssError::Io {
                path: self.path.clone(),
                source,
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::noisy_image;
    use tempfile::TempDir;

    #[test]
    fn rule_format() {
        assert_eq!(
            inline_rule("abc", "data:x"),
            ".abc {\n  background-image: url(\"data:x\");\n}\n"
        );
    }

    #[test]
    fn data_uri_is_base64_png() {
        assert_eq!(data_uri(b"hi"), "data:image/png;base64,aGk=");
    }

    #[test]
    fn new_sheet_starts_with_placeholder() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("siteimg.css");

        InlineStylesheet::open(&path).unwrap();

        let css = std::fs::read_to_string(&path).unwrap();
        assert!(css.starts_with(".nofavicon {\n  background-image: url(\"data:image/png;base64,"));
        assert!(css.contains(imaging::PLACEHOLDER_PNG_BASE64));
        assert_eq!(css.matches(".nofavicon").count(), 1);
    }

    #[test]
    fn reopening_nonempty_sheet_skips_placeholder() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("siteimg.css");

        InlineStylesheet::open(&path).unwrap();
        InlineStylesheet::open(&path).unwrap();

        let css = std::fs::read_to_string(&path).unwrap();
        assert_eq!(css.matches(".nofavicon").count(), 1);
    }

    #[test]
    fn appended_rule_embeds_decodable_16px_png() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("siteimg.css");
        let mut sheet = InlineStylesheet::open(&path).unwrap();

        sheet.append("examplecom", &noisy_image(16, 16)).unwrap();

        let css = std::fs::read_to_string(&path).unwrap();
        let rule_start = css.find(".examplecom {").unwrap();
        let rule = &css[rule_start..];
        let b64 = rule
            .split("base64,")
            .nth(1)
            .and_then(|s| s.split('"').next())
            .unwrap();
        let png = STANDARD.decode(b64).unwrap();
        let img = image::load_from_memory(&png).unwrap();
        assert_eq!((img.width(), img.height()), (16, 16));
    }

    #[test]
    fn rules_keep_processing_order_and_duplicates() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("siteimg.css");
        let mut sheet = InlineStylesheet::open(&path).unwrap();
        let icon = noisy_image(16, 16);

        sheet.append("b", &icon).unwrap();
        sheet.append("a", &icon).unwrap();
        sheet.append("b", &icon).unwrap();

        let css = std::fs::read_to_string(&path).unwrap();
        let classes: Vec<&str> = css
            .lines()
            .filter(|l| l.ends_with(" {"))
            .map(|l| l.trim_end_matches(" {"))
            .collect();
        assert_eq!(classes, vec![".nofavicon", ".b", ".a", ".b"]);
    }
}
