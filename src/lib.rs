//! # siteicons
//!
//! Keeps a static site's bookmark favicons fresh. The site lists its bookmarks
//! in a YAML catalog of categories; for every bookmark this crate finds a
//! favicon, shrinks it to 16×16 and publishes it twice:
//!
//! - as a base64 data URI in an inline stylesheet (`siteimg.css`), and
//! - as a cell of one packed sprite sheet (`sitesprites.png`) with a matching
//!   `background-position` stylesheet (`siteimgsprite.css`).
//!
//! Each catalog entry is updated with its favicon reference, the CSS class
//! used in both stylesheets and pinyin-aware search words.
//!
//! # A Refresh Run
//!
//! ```text
//! backup      data/websites.yml → data/websites-old.yml, content/img → content/img-old, ...
//! per site    reuse from img-old, or fetch from yandex → duckduckgo → google
//!             normalize to 16×16 → inline stylesheet + sprite sheet
//! finish      write data/websites.yml, sweep undersized files, delete the -old set
//! ```
//!
//! A run that dies halfway leaves the "-old" set behind; the next refresh
//! refuses to start until `--restore` has rolled it back.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`process`] | The refresh run: orchestrates every module below, emits progress events |
//! | [`backup`] | "-old" renames before a run, finalize after, restore after a crash |
//! | [`reuse`] | Reuse-or-refetch decision per site, run statistics |
//! | [`fetch`] | Provider fallback sequence over a [`fetch::Transport`] |
//! | [`imaging`] | Decode, resample and encode icons; sprite grid geometry |
//! | [`inline_css`] | Data-URI stylesheet writer |
//! | [`sprite`] | Sprite sheet packer and its stylesheet |
//! | [`catalog`] | YAML catalog model |
//! | [`naming`] | Host scanning, icon file names, CSS class names |
//! | [`metadata`] | Search words with pinyin transliteration |
//! | [`config`] | `siteicons.toml` loading and the resolved path [`config::Layout`] |
//! | [`output`] | CLI output formatting |
//!
//! # Design Decisions
//!
//! ## Strictly Sequential
//!
//! Sites are handled one at a time in catalog order. Sprite cells are handed
//! out in that order, so the same catalog always produces the same sheet, and
//! providers see at most one request at a time.
//!
//! ## Filename-Keyed Reuse
//!
//! An icon is identified by its file name (`{host}.png`). A recorded favicon
//! whose file survives in the previous run's icon directory is moved over
//! instead of downloaded again. There is no content hashing; `--force`
//! throws every previous icon away.
//!
//! ## Pure-Rust Imaging
//!
//! PNG and ICO decoding, bilinear resampling and PNG encoding all go through
//! the `image` crate, so the binary has no system dependencies.

pub mod backup;
pub mod catalog;
pub mod config;
pub mod fetch;
pub mod imaging;
pub mod inline_css;
pub mod metadata;
pub mod naming;
pub mod output;
pub mod process;
pub mod reuse;
pub mod sprite;

#[cfg(test)]
pub(crate) mod test_helpers;
