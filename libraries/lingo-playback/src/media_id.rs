//! External media id resolution
//!
//! The embedded video player plays by id, not by URL. Tracks carry whatever
//! locator the backend stored (a share link, an embed URL, or the bare id) and
//! this module reduces it to the id the player understands.
//!
//! Resolution is pure and total: an unrecognised locator is not an error, it
//! simply has no playable id.

use serde::Serialize;
use std::fmt;
use url::Url;

/// Length of a player video id
const ID_LEN: usize = 11;

/// Path prefixes that carry the id as the next path segment
const ID_PATH_KINDS: [&str; 4] = ["embed", "shorts", "live", "v"];

/// Playable identifier understood by the embedded player
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct ExternalMediaId(String);

impl ExternalMediaId {
    /// Borrow the raw id
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ExternalMediaId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for ExternalMediaId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Resolve a media locator to a playable id
///
/// Accepts watch links, short links, embed/shorts/live links, and bare ids.
/// Returns `None` for anything else.
pub fn resolve(media_uri: &str) -> Option<ExternalMediaId> {
    let trimmed = media_uri.trim();
    if trimmed.is_empty() {
        return None;
    }

    if is_valid_id(trimmed) {
        return Some(ExternalMediaId(trimmed.to_string()));
    }

    let url = parse_lenient(trimmed)?;
    if !matches!(url.scheme(), "http" | "https") {
        return None;
    }

    let host = url.host_str()?.to_ascii_lowercase();
    let host = strip_subdomain(&host);

    let candidate = match host {
        "youtu.be" => url.path_segments()?.next().map(str::to_string),
        "youtube.com" | "youtube-nocookie.com" => id_from_long_form(&url),
        _ => None,
    }?;

    is_valid_id(&candidate).then(|| ExternalMediaId(candidate))
}

/// Parse a URL, retrying with an https scheme for scheme-less links
fn parse_lenient(input: &str) -> Option<Url> {
    match Url::parse(input) {
        Ok(url) => Some(url),
        Err(url::ParseError::RelativeUrlWithoutBase) => {
            Url::parse(&format!("https://{input}")).ok()
        }
        Err(_) => None,
    }
}

fn strip_subdomain(host: &str) -> &str {
    ["www.", "m.", "music."]
        .iter()
        .find_map(|prefix| host.strip_prefix(prefix))
        .unwrap_or(host)
}

fn id_from_long_form(url: &Url) -> Option<String> {
    if url.path() == "/watch" {
        return url
            .query_pairs()
            .find(|(key, _)| key == "v")
            .map(|(_, value)| value.into_owned());
    }

    let mut segments = url.path_segments()?;
    let kind = segments.next()?;
    if ID_PATH_KINDS.contains(&kind) {
        segments.next().map(str::to_string)
    } else {
        None
    }
}

fn is_valid_id(candidate: &str) -> bool {
    candidate.len() == ID_LEN
        && candidate
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'-' || b == b'_')
}
