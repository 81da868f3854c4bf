//! Host and CSS class naming.
//!
//! Everything the tool derives from strings alone lives here: the hostname
//! picked out of a catalog URL, the naive registrable domain used as a second
//! provider query, and the CSS class derived from an icon's filename.
//!
//! ## Hostnames
//!
//! URLs in the catalog are free-form and hand-edited, so the host is found by
//! scanning for the first dotted token rather than by parsing a URL:
//!
//! - `https://www.google.com/search` → `www.google.com`
//! - `github.com/rust-lang` → `github.com`
//! - `localhost:8080` → no host
//!
//! The scan is best effort: a dotted token earlier in the string wins even if
//! it is not the host.
//!
//! ## Class names
//!
//! `img/123.acme.com.png` → `c123acmecom`: the icon directory prefix and the
//! extension are stripped, dots removed, and a leading digit is guarded with
//! `c` because CSS class names cannot start with one.

use regex::Regex;
use std::sync::LazyLock;

/// Class shared by every site without a usable icon, in both stylesheets.
pub const NO_FAVICON_CLASS: &str = "nofavicon";

static HOST_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?-u:(?:[\w-]+\.)+\w+)").unwrap_or_else(|e| panic!("host pattern: {e}"))
});

/// First dotted-hostname token in `url`, if any.
pub fn extract_host(url: &str) -> Option<&str> {
    HOST_PATTERN.find(url).map(|m| m.as_str())
}

/// Last two labels of a host: `www.news.bbc.co.uk` → `co.uk`.
///
/// Not public-suffix aware; multi-label suffixes come out wrong.
pub fn registrable_domain(host: &str) -> &str {
    let mut dots = host.rmatch_indices('.');
    match (dots.next(), dots.next()) {
        (Some(_), Some((second, _))) => &host[second + 1..],
        _ => host,
    }
}

/// Candidate hosts to query favicon providers with, in order.
///
/// The registrable domain is tried first; the full host second. A host that
/// is already two labels long yields a single candidate.
pub fn candidate_hosts(host: &str) -> Vec<&str> {
    let main = registrable_domain(host);
    if main == host {
        vec![host]
    } else {
        vec![main, host]
    }
}

/// Filename an icon fetched for `host` is stored under.
pub fn icon_filename(host: &str) -> String {
    format!("{host}.png")
}

/// CSS class for a favicon reference such as `img/example.com.png`.
///
/// `prefix` is the icon directory prefix (`"img/"`). Returns
/// [`NO_FAVICON_CLASS`] if nothing is left after stripping.
pub fn css_class_for(favicon: &str, prefix: &str) -> String {
    let name = favicon.replacen(prefix, "", 1);
    let name = name.replacen(".png", "", 1);
    let name = name.replacen(".ico", "", 1);
    let class: String = name.chars().filter(|c| *c != '.').collect();

    match class.chars().next() {
        None => NO_FAVICON_CLASS.to_string(),
        Some(c) if c.is_ascii_digit() => format!("c{class}"),
        Some(_) => class,
    }
}
