use thiserror::Error;

/// Error types for Hype Machine operations.
///
/// Which of these end a pipeline run depends on where they happen. Listing
/// page failures are fatal. Metadata feed and per-track failures are logged
/// and absorbed by [`TrackAssembler`](crate::TrackAssembler).
///
/// # Error Handling Examples
///
/// ```rust,no_run
/// use hypem_tracks::{HypemClientImpl, HypemError, PageRequest};
///
/// #[tokio::main]
/// async fn main() {
///     let client = HypemClientImpl::new(Box::new(http_client::native::NativeClient::new()));
///     let request = PageRequest::new("popular", "3day", 1);
///
///     match client.fetch_page(&request).await {
///         Ok(tracks) => println!("Assembled {} tracks", tracks.len()),
///         Err(HypemError::PageDataNotFound) => eprintln!("Listing markup changed"),
///         Err(HypemError::Status { status, .. }) => eprintln!("Upstream returned {status}"),
///         Err(e) => eprintln!("Other error: {}", e),
///     }
/// }
/// ```
#[derive(Error, Debug)]
pub enum HypemError {
    /// HTTP/network related errors.
    ///
    /// This includes connection failures, timeouts, DNS errors and body read
    /// failures. The message carries the transport's reason.
    #[error("HTTP error: {0}")]
    Http(String),

    /// The upstream answered with a non-success status code.
    #[error("HTTP status {status} from {url}")]
    Status {
        /// The numeric status code
        status: u16,
        /// The URL that was requested
        url: String,
    },

    /// A request URL could not be built from the page request.
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// The listing page has no `#displayList-data` element.
    ///
    /// This typically indicates that Hype Machine's page structure has changed
    /// or that the request was served an error page.
    #[error("Listing page data element not found")]
    PageDataNotFound,

    /// The listing page's embedded JSON could not be decoded.
    #[error("Listing page contained invalid JSON: {0}")]
    InvalidPageData(String),

    /// Failed to decode a metadata feed, serve response or track entry.
    #[error("Failed to parse response: {0}")]
    Parse(String),

    /// No entry exists at a position while merging the listing with the feed.
    #[error("No {side} entry at index {index}")]
    MissingEntry {
        /// Zero-based position within the page
        index: usize,
        /// Which side of the merge lacked the entry
        side: &'static str,
    },

    /// JSON serialization errors.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl HypemError {
    /// Log an absorbed failure with its category.
    ///
    /// Status failures log the status code, transport failures log the
    /// reason, anything else logs the message.
    pub fn log_absorbed(&self, context: &str) {
        match self {
            HypemError::Status { status, .. } => {
                log::warn!("HTTPError = {status} trying {context}");
            }
            HypemError::Http(reason) => {
                log::warn!("URLError = {reason} trying {context}");
            }
            other => {
                log::warn!("Exception: {other} ({context})");
            }
        }
    }
}
