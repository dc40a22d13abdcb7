//! Data types for Hype Machine listing pages and assembled tracks.
//!
//! This module contains the page request, the two upstream shapes that get
//! merged (listing tracks from the HTML page and metadata records from the
//! JSON feed), the session cookie, the output record and client configuration.

use crate::{HypemError, Result};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

// ================================================================================================
// PAGE REQUEST
// ================================================================================================

/// Identifies one page of the upstream listing.
///
/// # Examples
///
/// ```rust
/// use hypem_tracks::PageRequest;
///
/// let request = PageRequest::new("popular", "3day", 3);
/// assert_eq!(request.listing_path(), "popular/3day/3");
/// assert_eq!(request.feed_path(), "playlist/popular/3day/json/3/data.js");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRequest {
    /// Collection name, e.g. `popular` or `latest`
    pub collection: String,
    /// Listing mode within the collection, e.g. `3day`
    pub mode: String,
    /// Page number (1-indexed upstream)
    pub page_number: u32,
    /// Optional sort. Accepted for callers but not sent upstream.
    pub sort: Option<String>,
}

impl PageRequest {
    pub fn new(collection: impl Into<String>, mode: impl Into<String>, page_number: u32) -> Self {
        Self {
            collection: collection.into(),
            mode: mode.into(),
            page_number,
            sort: None,
        }
    }

    pub fn with_sort(mut self, sort: Option<String>) -> Self {
        self.sort = sort;
        self
    }

    /// Path of the HTML listing page, relative to the base URL.
    pub fn listing_path(&self) -> String {
        format!(
            "{}/{}/{}",
            urlencoding::encode(&self.collection),
            urlencoding::encode(&self.mode),
            self.page_number
        )
    }

    /// Path of the JSON metadata feed for the same page.
    pub fn feed_path(&self) -> String {
        format!(
            "playlist/{}/{}/json/{}/data.js",
            urlencoding::encode(&self.collection),
            urlencoding::encode(&self.mode),
            self.page_number
        )
    }
}

// ================================================================================================
// LISTING PAGE DATA
// ================================================================================================

/// The `type` of a listing track.
///
/// Upstream sends either a string (usually `"normal"`) or the literal `false`
/// for tracks that cannot be served. Anything other than `false` is treated
/// as resolvable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TrackType {
    /// The `false` sentinel: never resolve a URL for this track
    Unresolvable,
    /// Any other value, kept as text
    Resolvable(String),
}

impl TrackType {
    pub fn is_resolvable(&self) -> bool {
        matches!(self, TrackType::Resolvable(_))
    }
}

impl<'de> Deserialize<'de> for TrackType {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(match Value::deserialize(deserializer)? {
            Value::Bool(false) => TrackType::Unresolvable,
            Value::String(name) => TrackType::Resolvable(name),
            Value::Null => TrackType::Resolvable(String::new()),
            other => TrackType::Resolvable(other.to_string()),
        })
    }
}

/// One track summary from the JSON embedded in the listing page.
///
/// `id`, `key` and `type` are required; a summary without them cannot be
/// resolved and its index is skipped during assembly. The remaining fields
/// are kept as upstream sent them.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ListingTrack {
    pub id: String,
    pub key: String,
    #[serde(rename = "type")]
    pub track_type: TrackType,
    pub artist: Option<Value>,
    pub song: Option<Value>,
    /// Duration, usually seconds
    pub time: Option<Value>,
    /// Unix timestamp of the post
    pub ts: Option<Value>,
    pub posturl: Option<Value>,
    pub postid: Option<Value>,
    pub fav: Option<Value>,
    pub is_bc: Option<Value>,
    pub is_sc: Option<Value>,
}

/// Page data decoded from the listing page's `#displayList-data` element.
///
/// Track summaries are kept undecoded so that a malformed entry only costs
/// its own index; use [`PageData::track`] to decode one. Page descriptors are
/// informational and accepted in any JSON shape.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PageData {
    pub page_name: Option<Value>,
    pub page_mode: Option<Value>,
    pub page_sort: Option<Value>,
    pub page_num: Option<Value>,
    pub page_cur: Option<Value>,
    pub page_prev: Option<Value>,
    pub page_next: Option<Value>,
    pub title: Option<Value>,
    pub tracks: Vec<Value>,
}

impl PageData {
    pub fn track_count(&self) -> usize {
        self.tracks.len()
    }

    /// Decode the track summary at `index`.
    pub fn track(&self, index: usize) -> Result<ListingTrack> {
        let raw = self.tracks.get(index).ok_or(HypemError::MissingEntry {
            index,
            side: "listing",
        })?;
        ListingTrack::deserialize(raw)
            .map_err(|e| HypemError::Parse(format!("listing track {index}: {e}")))
    }
}

// ================================================================================================
// METADATA FEED
// ================================================================================================

/// Per-track metadata from the `data.js` feed.
///
/// Values are carried through to the output unchanged, whatever their JSON
/// type.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct MetadataRecord {
    pub artist: Option<Value>,
    pub title: Option<Value>,
    pub dateposted: Option<Value>,
    pub loved_count: Option<Value>,
    pub time: Option<Value>,
    pub thumb_url: Option<Value>,
    pub thumb_url_medium: Option<Value>,
    pub thumb_url_large: Option<Value>,
    pub thumb_url_artist: Option<Value>,
    pub posted_count: Option<Value>,
    pub posturl: Option<Value>,
    pub mediaid: Option<Value>,
}

/// The metadata feed for one page, keyed by zero-based position.
///
/// The feed's `version` key is never part of this map. Records stay as raw
/// JSON until [`MetadataFeed::record`] decodes one, so a single malformed
/// record does not invalidate its siblings.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MetadataFeed {
    entries: BTreeMap<usize, Value>,
}

impl MetadataFeed {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, index: usize, record: Value) {
        self.entries.insert(index, record);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Value> {
        self.entries.get(&index)
    }

    /// Decode the record at `index`. Only JSON objects are records.
    pub fn record(&self, index: usize) -> Result<MetadataRecord> {
        let raw = self.get(index).ok_or(HypemError::MissingEntry {
            index,
            side: "metadata",
        })?;
        if !raw.is_object() {
            return Err(HypemError::Parse(format!(
                "metadata record {index} is not an object"
            )));
        }
        MetadataRecord::deserialize(raw)
            .map_err(|e| HypemError::Parse(format!("metadata record {index}: {e}")))
    }
}

impl FromIterator<(usize, Value)> for MetadataFeed {
    fn from_iter<I: IntoIterator<Item = (usize, Value)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

// ================================================================================================
// SESSION
// ================================================================================================

/// The session cookie captured from one listing page response.
///
/// Holds the `name=value` part of every `Set-Cookie` header. It authorizes
/// the serve requests for the tracks of that same page and nothing else.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionCookie {
    pairs: Vec<String>,
}

impl SessionCookie {
    /// Build a cookie from raw `Set-Cookie` header values.
    ///
    /// Attributes after the first `;` are dropped and a later cookie with the
    /// same name replaces an earlier one.
    pub fn from_set_cookie<'a, I>(headers: I) -> Self
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut pairs: Vec<String> = Vec::new();
        for header in headers {
            let pair = header.split(';').next().unwrap_or("").trim();
            if pair.is_empty() {
                continue;
            }
            let name = pair.split('=').next().unwrap_or("");
            pairs.retain(|existing| !existing.starts_with(&format!("{name}=")));
            pairs.push(pair.to_string());
        }
        Self { pairs }
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    /// Value for a `Cookie` request header, or `None` when nothing was captured.
    pub fn header_value(&self) -> Option<String> {
        if self.pairs.is_empty() {
            None
        } else {
            Some(self.pairs.join("; "))
        }
    }
}

/// Raw listing page HTML together with the session cookie it set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadedPage {
    pub html: String,
    pub cookie: SessionCookie,
}

// ================================================================================================
// OUTPUT
// ================================================================================================

/// One assembled track: a metadata record merged with its listing entry and
/// resolved URL.
///
/// Serialized field names are the ones mobile clients read.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TrackRecord {
    pub artist: Option<Value>,
    pub title: Option<Value>,
    pub date_posted: Option<Value>,
    pub loved_count: Option<Value>,
    pub time: Option<Value>,
    pub thumb_url: Option<Value>,
    pub thumb_url_medium: Option<Value>,
    pub thumb_url_large: Option<Value>,
    pub thumb_url_artist: Option<Value>,
    pub posted_count: Option<Value>,
    pub post_url: Option<Value>,
    pub media_id: Option<Value>,
    /// Playable URL, `None` when resolution failed or was not attempted
    pub url: Option<String>,
}

impl TrackRecord {
    pub fn with_url(mut self, url: Option<String>) -> Self {
        self.url = url;
        self
    }
}

impl From<MetadataRecord> for TrackRecord {
    fn from(record: MetadataRecord) -> Self {
        Self {
            artist: record.artist,
            title: record.title,
            date_posted: record.dateposted,
            loved_count: record.loved_count,
            time: record.time,
            thumb_url: record.thumb_url,
            thumb_url_medium: record.thumb_url_medium,
            thumb_url_large: record.thumb_url_large,
            thumb_url_artist: record.thumb_url_artist,
            posted_count: record.posted_count,
            post_url: record.posturl,
            media_id: record.mediaid,
            url: None,
        }
    }
}

// ================================================================================================
// CONFIGURATION
// ================================================================================================

/// Default upstream base URL.
pub const DEFAULT_BASE_URL: &str = "https://hypem.com";

/// Configuration for the client and the assembly pipeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Base URL all three upstream endpoints live under
    pub base_url: String,
    /// Maximum number of serve requests in flight for one page
    pub resolve_concurrency: usize,
    /// When set, the decoded listing JSON is logged at this level
    pub page_dump_level: Option<log::Level>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            resolve_concurrency: 4,
            page_dump_level: None,
        }
    }
}

impl ClientConfig {
    /// Create a new config with default settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolve track URLs one at a time
    pub fn sequential() -> Self {
        Self::default().with_resolve_concurrency(1)
    }

    /// Set the upstream base URL. A trailing slash is ignored.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Set the serve request concurrency (at least 1)
    pub fn with_resolve_concurrency(mut self, resolve_concurrency: usize) -> Self {
        self.resolve_concurrency = resolve_concurrency.max(1);
        self
    }

    /// Log decoded listing JSON at `level`, or not at all with `None`
    pub fn with_page_dump_level(mut self, level: Option<log::Level>) -> Self {
        self.page_dump_level = level;
        self
    }
}
