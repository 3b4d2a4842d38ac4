//! Google Drive downloads.
//!
//! Drive serves files above its virus-scan size threshold behind an HTML
//! "download anyway" page instead of the raw bytes. The flow here normalizes
//! share links to the direct-download form, detects whether the response
//! redirected to a content host, and otherwise follows the link on the
//! confirmation page with the page's cookies.

use scraper::{Html, Selector};
use std::path::Path;
use url::Url;

use super::http::{self, header_values};
use super::FetchError;
use crate::config::FetchConfig;
use crate::storage::StagingWriter;

/// Host whose URLs take the confirmation-page flow.
pub const DRIVE_HOST: &str = "drive.google.com";

const UC_PREFIX: &str = "https://drive.google.com/uc?export=download&id=";

/// `id` attribute of the confirmation page's direct download anchor.
const DOWNLOAD_LINK_ID: &str = "uc-download-link";

/// True if `url` is served by `host` (case-insensitive host comparison).
pub fn is_host(url: &str, host: &str) -> bool {
    Url::parse(url)
        .ok()
        .and_then(|u| u.host_str().map(|h| h.eq_ignore_ascii_case(host)))
        .unwrap_or(false)
}

/// True if `url` is an https Drive URL.
pub fn is_drive_url(url: &str) -> bool {
    url.starts_with("https://") && is_host(url, DRIVE_HOST)
}

/// Translate share links into the direct-download form.
///
/// - `https://drive.google.com/open?id=X` → `https://drive.google.com/uc?export=download&id=X`
/// - `https://drive.google.com/file/d/X` and `.../file/d/X/view` → same
///
/// Other URLs, including ones already in direct-download form, are returned unchanged.
pub fn canonical_url(url: &str) -> String {
    match share_link_id(url) {
        Some(id) => format!("{}{}", UC_PREFIX, id),
        None => url.to_string(),
    }
}

/// File id of a Drive share link, read from the parsed path and query.
fn share_link_id(url: &str) -> Option<String> {
    if !is_drive_url(url) {
        return None;
    }
    let parsed = Url::parse(url).ok()?;
    let segments: Vec<&str> = parsed.path_segments()?.collect();
    match segments.as_slice() {
        ["open"] => parsed
            .query_pairs()
            .find(|(key, _)| key == "id")
            .map(|(_, id)| id.into_owned())
            .filter(|id| !id.is_empty()),
        ["file", "d", id] | ["file", "d", id, "view"] if !id.is_empty() => Some(id.to_string()),
        _ => None,
    }
}

/// Extract the `href` of `<a id="uc-download-link">` from a confirmation page.
/// Entities are decoded (`&amp;` → `&`).
pub fn extract_download_link(html: &str) -> Option<String> {
    let selector = Selector::parse(&format!("a#{}", DOWNLOAD_LINK_ID)).ok()?;
    let doc = Html::parse_document(html);
    let href = doc
        .select(&selector)
        .find_map(|a| a.value().attr("href"))
        .map(str::to_string);
    href
}

/// Build a `Cookie` header value from `Set-Cookie` response header lines.
/// Only the leading `name=value` pair of each cookie is replayed.
pub fn cookie_header(response_headers: &[String]) -> Option<String> {
    let pairs: Vec<&str> = header_values(response_headers, "Set-Cookie")
        .filter_map(|v| v.split(';').next())
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .collect();
    if pairs.is_empty() {
        None
    } else {
        Some(pairs.join("; "))
    }
}

/// Download a Drive URL into `dest`.
pub fn download(cfg: &FetchConfig, url: &str, dest: &Path) -> Result<u64, FetchError> {
    let canonical = canonical_url(url);
    if canonical != url {
        tracing::info!(from = url, to = %canonical, "translated Drive share URL");
    }
    download_with_confirmation(cfg, &canonical, dest, DRIVE_HOST)
}

/// Confirmation-page flow against `provider_host`.
///
/// The first response is written to `dest`. If the request ended up on another
/// host, that body is the file. Otherwise it is the confirmation page: its
/// download link is fetched with the page's cookies, replacing `dest`.
pub fn download_with_confirmation(
    cfg: &FetchConfig,
    url: &str,
    dest: &Path,
    provider_host: &str,
) -> Result<u64, FetchError> {
    let mut writer = StagingWriter::create(dest).map_err(FetchError::Write)?;
    let first = http::get(cfg, url, &[], |data| writer.write_chunk(data))?;
    let written = writer.finish().map_err(FetchError::Write)?;

    let final_url = first.effective_url.as_deref().unwrap_or(url);
    if !is_host(final_url, provider_host) {
        tracing::debug!(final_url, "redirected to content host");
        return Ok(written);
    }

    tracing::info!(url, "retrieving direct download link from confirmation page");
    let page = std::fs::read(dest).map_err(FetchError::Write)?;
    let link = extract_download_link(&String::from_utf8_lossy(&page)).ok_or_else(|| {
        FetchError::ConfirmationLinkMissing {
            url: url.to_string(),
        }
    })?;
    let direct = Url::parse(final_url)
        .and_then(|base| base.join(&link))
        .map_err(|_| FetchError::ConfirmationLinkMissing {
            url: url.to_string(),
        })?;

    let mut headers = Vec::new();
    if let Some(cookies) = cookie_header(&first.headers) {
        headers.push(format!("Cookie: {}", cookies));
    }
    tracing::debug!(direct = %direct, cookies = headers.len(), "following confirmation link");

    let mut writer = StagingWriter::create(dest).map_err(FetchError::Write)?;
    http::get(cfg, direct.as_str(), &headers, |data| writer.write_chunk(data))?;
    writer.finish().map_err(FetchError::Write)
}
