//! Favicon download from third-party icon providers.
//!
//! Sites are never contacted directly. For each catalog URL the host is
//! scanned out (see [`naming::extract_host`]) and a fixed list of favicon
//! services is queried:
//!
//! | Provider | Endpoint |
//! |---|---|
//! | Yandex | `http://favicon.yandex.net/favicon/{host}` |
//! | DuckDuckGo | `https://icons.duckduckgo.com/ip3/{host}.ico` |
//! | Google | `https://www.google.com/s2/favicons?domain_url={host}` |
//!
//! Each provider is asked about the registrable domain first, then about the
//! full host. The first `200` response wins and its body is stored as
//! `{host}.png` in the icon directory. Bodies under [`MIN_ICON_BYTES`] are the
//! providers' way of saying "no icon" and count as a failure.
//!
//! Requests go through the [`Transport`] trait so the fallback sequence can be
//! exercised without a network.

use crate::naming;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

/// Icon files smaller than this are provider placeholders, not icons.
pub const MIN_ICON_BYTES: u64 = 80;

/// Upper bound on a single response body.
const MAX_BODY_BYTES: u64 = 4 * 1024 * 1024;

/// A favicon service, queried by host name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Provider {
    pub name: &'static str,
    prefix: &'static str,
    suffix: &'static str,
}

impl Provider {
    /// Endpoint URL for `host`.
    pub fn url(&self, host: &str) -> String {
        format!("{}{}{}", self.prefix, host, self.suffix)
    }
}

/// Providers in the order they are tried.
pub const PROVIDERS: &[Provider] = &[
    Provider {
        name: "yandex",
        prefix: "http://favicon.yandex.net/favicon/",
        suffix: "",
    },
    Provider {
        name: "duckduckgo",
        prefix: "https://icons.duckduckgo.com/ip3/",
        suffix: ".ico",
    },
    Provider {
        name: "google",
        prefix: "https://www.google.com/s2/favicons?domain_url=",
        suffix: "",
    },
];

#[derive(Error, Debug)]
pub enum FetchError {
    #[error("no host name in {0:?}")]
    NoHostExtracted(String),
    #[error("no provider had an icon for {0}")]
    AllProvidersFailed(String),
    #[error("{} is only {size} bytes", path.display())]
    ResponseTooSmall { path: PathBuf, size: u64 },
    #[error("failed to store icon: {0}")]
    Io(#[from] std::io::Error),
}

/// Transport-level failure: DNS, TLS, connection reset and the like.
#[derive(Error, Debug, Clone)]
#[error("{0}")]
pub struct TransportError(pub String);

/// Status and body of a completed GET.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    /// Only read for `200` responses.
    pub body: Vec<u8>,
}

/// Blocking HTTP GET.
pub trait Transport {
    fn get(&self, url: &str) -> Result<HttpResponse, TransportError>;
}

/// Production transport over `ureq`, using its default timeouts.
pub struct UreqTransport {
    agent: ureq::Agent,
}

impl UreqTransport {
    pub fn new() -> Self {
        let agent = ureq::AgentBuilder::new()
            .user_agent(concat!("siteicons/", env!("CARGO_PKG_VERSION")))
            .build();
        Self { agent }
    }
}

impl Default for UreqTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl Transport for UreqTransport {
    fn get(&self, url: &str) -> Result<HttpResponse, TransportError> {
        match self.agent.get(url).call() {
            Ok(response) => {
                let status = response.status();
                let body = if status == 200 {
                    read_body(response.into_reader(), MAX_BODY_BYTES, url)?
                } else {
                    Vec::new()
                };
                Ok(HttpResponse { status, body })
            }
            Err(ureq::Error::Status(status, _)) => Ok(HttpResponse {
                status,
                body: Vec::new(),
            }),
            Err(ureq::Error::Transport(t)) => Err(TransportError(format!("{url}: {t}"))),
        }
    }
}

/// Read a response body of at most `limit` bytes. A longer body is an error,
/// never a truncated icon.
fn read_body(reader: impl Read, limit: u64, url: &str) -> Result<Vec<u8>, TransportError> {
    let mut body = Vec::new();
    reader
        .take(limit + 1)
        .read_to_end(&mut body)
        .map_err(|e| TransportError(format!("{url}: {e}")))?;
    if body.len() as u64 > limit {
        return Err(TransportError(format!(
            "{url}: response larger than {limit} bytes"
        )));
    }
    Ok(body)
}

/// Runs the provider fallback sequence and stores the winning icon.
pub struct Fetcher<'a, T: Transport> {
    transport: &'a T,
    icon_dir: PathBuf,
    delay: Duration,
}

/// An icon stored by [`Fetcher::fetch`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchedIcon {
    /// File name inside the icon directory, e.g. `www.google.com.png`.
    pub filename: String,
    /// Provider that answered.
    pub provider: &'static str,
    /// Host the provider was asked about.
    pub queried_host: String,
}

impl<'a, T: Transport> Fetcher<'a, T> {
    pub fn new(transport: &'a T, icon_dir: &Path, delay: Duration) -> Self {
        Self {
            transport,
            icon_dir: icon_dir.to_path_buf(),
            delay,
        }
    }

    /// Fetch the favicon for a catalog URL into the icon directory.
    pub fn fetch(&self, url: &str) -> Result<FetchedIcon, FetchError> {
        let host =
            naming::extract_host(url).ok_or_else(|| FetchError::NoHostExtracted(url.to_string()))?;

        let (provider, queried_host, body) = self
            .first_hit(host)
            .ok_or_else(|| FetchError::AllProvidersFailed(host.to_string()))?;

        let filename = naming::icon_filename(host);
        let path = self.icon_dir.join(&filename);
        std::fs::write(&path, &body)?;

        let size = std::fs::metadata(&path)?.len();
        if size < MIN_ICON_BYTES {
            return Err(FetchError::ResponseTooSmall { path, size });
        }

        Ok(FetchedIcon {
            filename,
            provider: provider.name,
            queried_host: queried_host.to_string(),
        })
    }

    /// First `200` response over every candidate host and provider.
    fn first_hit<'h>(&self, host: &'h str) -> Option<(&'static Provider, &'h str, Vec<u8>)> {
        for candidate in naming::candidate_hosts(host) {
            for provider in PROVIDERS {
                if !self.delay.is_zero() {
                    std::thread::sleep(self.delay);
                }
                match self.transport.get(&provider.url(candidate)) {
                    Ok(HttpResponse { status: 200, body }) => {
                        return Some((provider, candidate, body));
                    }
                    Ok(_) | Err(_) => continue,
                }
            }
        }
        None
    }
}
