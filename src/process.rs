//! The refresh run: every site in catalog order, one at a time.
//!
//! ## Steps
//!
//! 1. [`backup`](crate::backup::backup) moves the previous run's artifacts to
//!    their "-old" names and creates a fresh icon directory.
//! 2. The catalog is read from its backed-up copy.
//! 3. Both stylesheets and the sprite sheet are started (placeholder rules,
//!    placeholder glyph in slot 0).
//! 4. Each site is resolved, reused or refetched (see [`reuse`](crate::reuse)),
//!    gets fresh search words, and has its icon normalized once and added to
//!    both the inline stylesheet and the sprite sheet.
//! 5. The updated catalog is written to the original path, undersized files
//!    are swept from the icon directory and the "-old" set is deleted.
//!
//! ## Failure Severity
//!
//! A site whose icon cannot be fetched or decoded is a soft failure: its
//! favicon is cleared (an undecodable file is deleted from the icon
//! directory), both its classes become `nofavicon`, the reason is
//! reported once through [`ProcessEvent::SiteProcessed`] and the run goes on.
//! Everything else (catalog I/O, stylesheet or sprite writes, moving icons)
//! aborts the run with a [`ProcessError`] and leaves the "-old" set in place
//! for [`restore`].
//!
//! ## Progress
//!
//! Events go over an optional `mpsc` channel so the caller can print while
//! the run is going. A closed receiver is ignored.

use crate::backup::{self, BackupError, RestoreReport};
use crate::catalog::{Catalog, CatalogError, Site};
use crate::config::{IconsConfig, Layout};
use crate::fetch::{FetchError, Fetcher, Transport};
use crate::imaging::{self, ImagingError};
use crate::inline_css::{InlineCssError, InlineStylesheet};
use crate::metadata;
use crate::naming::{self, NO_FAVICON_CLASS};
use crate::reuse::{self, IconDecision, RunStats};
use crate::sprite::{SpriteError, SpritePacker};
use image::RgbaImage;
use std::path::Path;
use std::sync::mpsc::Sender;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ProcessError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Catalog(#[from] CatalogError),
    #[error(transparent)]
    Backup(#[from] BackupError),
    #[error(transparent)]
    InlineCss(#[from] InlineCssError),
    #[error(transparent)]
    Sprite(#[from] SpriteError),
}

/// Why a site ended the run without an icon.
#[derive(Error, Debug)]
pub enum SiteFailure {
    #[error(transparent)]
    Fetch(#[from] FetchError),
    #[error("{0}")]
    DecodeFailed(ImagingError),
}

/// Where a site's icon came from this run.
#[derive(Debug)]
pub enum IconOutcome {
    /// Recovered from the previous run.
    Reused,
    /// Downloaded from a provider.
    Fetched { provider: &'static str },
    /// No usable icon; the site shows the placeholder.
    Missing(SiteFailure),
}

/// Progress event emitted during a refresh.
#[derive(Debug)]
pub enum ProcessEvent {
    CategoryStarted {
        name: String,
        site_count: usize,
    },
    SiteProcessed {
        /// 1-based position within the category.
        index: usize,
        title: String,
        favicon: Option<String>,
        /// Class used in both stylesheets.
        class: String,
        outcome: IconOutcome,
    },
}

fn emit(events: &Option<Sender<ProcessEvent>>, event: ProcessEvent) {
    if let Some(tx) = events {
        tx.send(event).ok();
    }
}

/// Per-site work of a run. Owns both stylesheets and the sprite sheet.
pub struct SiteProcessor<'a, T: Transport> {
    layout: &'a Layout,
    fetcher: Fetcher<'a, T>,
    inline: InlineStylesheet,
    sprite: SpritePacker,
    force: bool,
    stats: RunStats,
}

impl<'a, T: Transport> SiteProcessor<'a, T> {
    /// Start the stylesheets and sprite sheet for a run over `total_sites`.
    pub fn begin(
        layout: &'a Layout,
        config: &IconsConfig,
        transport: &'a T,
        force: bool,
        total_sites: usize,
    ) -> Result<Self, ProcessError> {
        let inline = InlineStylesheet::open(&layout.inline_css())?;
        let sprite =
            SpritePacker::begin(&layout.sprite_image(), &layout.sprite_css(), total_sites)?;
        Ok(Self {
            layout,
            fetcher: Fetcher::new(transport, &layout.icon_dir(), config.fetch.delay()),
            inline,
            sprite,
            force,
            stats: RunStats::default(),
        })
    }

    /// Resolve, describe and emit one site, updating it in place.
    pub fn process_site(&mut self, site: &mut Site) -> Result<IconOutcome, ProcessError> {
        let mut outcome = self.resolve_icon(site)?;
        site.search_words = metadata::search_words(&site.title, &site.url);

        let icon = match self.load_icon(site) {
            Ok(icon) => icon,
            Err(e) => {
                if let Some(favicon) = site.favicon.take() {
                    self.discard_icon(&favicon)?;
                }
                outcome = IconOutcome::Missing(SiteFailure::DecodeFailed(e));
                None
            }
        };

        let class = match (&site.favicon, icon) {
            (Some(favicon), Some(icon)) => {
                let class = naming::css_class_for(favicon, &self.layout.favicon_prefix());
                self.inline.append(&class, &icon)?;
                self.sprite.place(&class, &icon)?;
                class
            }
            _ => NO_FAVICON_CLASS.to_string(),
        };
        site.data_uri_class = Some(class.clone());
        site.favicon_class = Some(class);

        match outcome {
            IconOutcome::Reused => self.stats.reuse(),
            IconOutcome::Fetched { .. } => self.stats.fetch(),
            IconOutcome::Missing(_) => self.stats.miss(),
        }
        Ok(outcome)
    }

    pub fn into_stats(self) -> RunStats {
        self.stats
    }

    fn resolve_icon(&self, site: &mut Site) -> Result<IconOutcome, ProcessError> {
        match reuse::decide(self.layout, site.favicon.as_deref(), self.force) {
            IconDecision::Reuse {
                favicon,
                restore_from,
            } => {
                reuse::restore_icon(self.layout, &favicon, restore_from.as_deref())?;
                site.favicon = Some(favicon);
                Ok(IconOutcome::Reused)
            }
            IconDecision::Refetch => match self.fetcher.fetch(&site.url) {
                Ok(fetched) => {
                    site.favicon = Some(self.layout.favicon_ref(&fetched.filename));
                    Ok(IconOutcome::Fetched {
                        provider: fetched.provider,
                    })
                }
                Err(e) => {
                    site.favicon = None;
                    Ok(IconOutcome::Missing(e.into()))
                }
            },
        }
    }

    /// Delete an icon file no site will reference.
    fn discard_icon(&self, favicon: &str) -> Result<(), ProcessError> {
        let path = self.layout.resolve_favicon(favicon);
        if path.is_file() {
            std::fs::remove_file(&path)?;
        }
        Ok(())
    }

    fn load_icon(&self, site: &Site) -> Result<Option<RgbaImage>, ImagingError> {
        match &site.favicon {
            Some(favicon) => imaging::normalize(&self.layout.resolve_favicon(favicon)).map(Some),
            None => Ok(None),
        }
    }
}

/// Refresh every icon in the catalog under `root`.
///
/// With `force`, the previous run's icons are ignored and everything is
/// refetched.
pub fn refresh(
    root: &Path,
    config: &IconsConfig,
    force: bool,
    transport: &impl Transport,
    events: Option<Sender<ProcessEvent>>,
) -> Result<RunStats, ProcessError> {
    let layout = Layout::new(root, &config.paths);
    backup::backup(&layout)?;

    let mut catalog = Catalog::load(&backup::backup_path(&layout.catalog()))?;
    let mut processor =
        SiteProcessor::begin(&layout, config, transport, force, catalog.total_sites())?;

    for category in &mut catalog.categories {
        emit(
            &events,
            ProcessEvent::CategoryStarted {
                name: category.name.clone(),
                site_count: category.sites.len(),
            },
        );
        for (i, site) in category.sites.iter_mut().enumerate() {
            let outcome = processor.process_site(site)?;
            emit(
                &events,
                ProcessEvent::SiteProcessed {
                    index: i + 1,
                    title: site.title.clone(),
                    favicon: site.favicon.clone(),
                    class: site.favicon_class.clone().unwrap_or_default(),
                    outcome,
                },
            );
        }
    }

    catalog.save(&layout.catalog())?;
    let mut stats = processor.into_stats();
    stats.swept = reuse::sweep_undersized(&layout.icon_dir())?;
    backup::finalize(&layout)?;
    Ok(stats)
}

/// Roll back a refresh that did not finish.
pub fn restore(root: &Path, config: &IconsConfig) -> Result<RestoreReport, ProcessError> {
    let layout = Layout::new(root, &config.paths);
    Ok(backup::restore(&layout)?)
}
