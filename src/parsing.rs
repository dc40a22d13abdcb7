//! Parsing for Hype Machine responses.
//!
//! The listing page embeds its track list as JSON inside a single element;
//! the metadata feed and serve endpoint answer with plain JSON. These are
//! pure functions over response bodies so they can be tested without a
//! network.

use crate::{HypemError, MetadataFeed, PageData, Result};
use scraper::{Html, Selector};
use serde::Deserialize;
use serde_json::{Map, Value};

/// Selector of the element whose text is the page's JSON data.
const PAGE_DATA_SELECTOR: &str = "#displayList-data";

/// Feed key that describes the feed itself rather than a track.
const FEED_VERSION_KEY: &str = "version";

/// Parser for Hype Machine pages and feeds.
///
/// Stateless apart from the optional level at which decoded page data is
/// dumped to the log.
#[derive(Debug, Clone, Default)]
pub struct HypemParser {
    page_dump_level: Option<log::Level>,
}

#[derive(Deserialize)]
struct ServeResponse {
    url: Option<String>,
}

impl HypemParser {
    /// Create a new parser instance.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a parser that logs decoded page data at `level`.
    pub fn with_page_dump_level(page_dump_level: Option<log::Level>) -> Self {
        Self { page_dump_level }
    }

    pub fn page_dump_level(&self) -> Option<log::Level> {
        self.page_dump_level
    }

    /// Extract and decode the JSON page data embedded in a listing page.
    ///
    /// The page data has the following shape:
    ///
    /// ```json
    /// {
    ///     "page_cur":  "/popular/3day/3?ax=1&ts=1424219886.61",
    ///     "page_mode": "3day",
    ///     "page_name": "popular",
    ///     "page_num":  "3",
    ///     "tracks": [
    ///         {
    ///             "artist": "Pat Lok feat. Desirée Dawson",
    ///             "id":     "29dgt",
    ///             "key":    "3add9a261b27df4a3f01163303a5fd5c",
    ///             "song":   "All In My Head (Howson's Groove Remix)",
    ///             "time":   330,
    ///             "ts":     1424048450,
    ///             "type":   "normal"
    ///         }
    ///     ]
    /// }
    /// ```
    pub fn parse_page_data(&self, html: &str) -> Result<PageData> {
        let document = Html::parse_document(html);
        let selector = Selector::parse(PAGE_DATA_SELECTOR).unwrap();

        let element = document
            .select(&selector)
            .next()
            .ok_or(HypemError::PageDataNotFound)?;
        let text = element.text().collect::<String>();

        let value: Value = serde_json::from_str(text.trim()).map_err(|e| {
            log::warn!("Hype Machine page contained invalid JSON: {e}");
            HypemError::InvalidPageData(e.to_string())
        })?;

        if let Some(level) = self.page_dump_level {
            if let Ok(pretty) = serde_json::to_string_pretty(&value) {
                log::log!(level, "Page data:\n{pretty}");
            }
        }

        let page_data = PageData::deserialize(&value)
            .map_err(|e| HypemError::InvalidPageData(e.to_string()))?;
        log::debug!(
            "Parsed page data for {:?}/{:?} with {} tracks",
            page_data.page_name,
            page_data.page_mode,
            page_data.track_count()
        );
        Ok(page_data)
    }

    /// Decode a `data.js` metadata feed, dropping its `version` key.
    pub fn parse_metadata_feed(&self, body: &str) -> Result<MetadataFeed> {
        let mut object: Map<String, Value> = serde_json::from_str(body)
            .map_err(|e| HypemError::Parse(format!("metadata feed: {e}")))?;

        if object.remove(FEED_VERSION_KEY).is_none() {
            log::debug!("Metadata feed carried no version key");
        }

        let mut feed = MetadataFeed::new();
        for (key, record) in object {
            match key.parse::<usize>() {
                Ok(index) => feed.insert(index, record),
                Err(_) => log::debug!("Ignoring non-positional metadata key '{key}'"),
            }
        }

        log::debug!("Parsed metadata feed with {} entries", feed.len());
        Ok(feed)
    }

    /// Extract the playable URL from a serve endpoint response.
    pub fn parse_serve_response(&self, body: &str) -> Result<String> {
        let response: ServeResponse = serde_json::from_str(body)
            .map_err(|e| HypemError::Parse(format!("serve response: {e}")))?;
        response
            .url
            .ok_or_else(|| HypemError::Parse("serve response has no url".to_string()))
    }
}
