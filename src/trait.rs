use crate::{LoadedPage, MetadataFeed, PageRequest, Result, SessionCookie};
use async_trait::async_trait;

/// The three upstream calls the assembly pipeline is built from.
///
/// Each method performs exactly one request and reports failure as a typed
/// error. Deciding which failures are fatal is left to
/// [`TrackAssembler`](crate::TrackAssembler).
///
/// # Mocking Support
///
/// When the `mock` feature is enabled, this crate provides `MockHypemClient`
/// that implements this trait using the `mockall` library.
#[cfg_attr(feature = "mock", mockall::automock)]
#[async_trait(?Send)]
pub trait HypemClient {
    /// Fetch the HTML listing page and the session cookie it sets.
    async fn load_page(&self, request: &PageRequest) -> Result<LoadedPage>;

    /// Fetch the positional metadata feed for the same page.
    async fn get_tracks_metadata(&self, request: &PageRequest) -> Result<MetadataFeed>;

    /// Ask the serve endpoint for the playable URL of one track.
    async fn get_song_url(
        &self,
        track_id: &str,
        track_key: &str,
        cookie: &SessionCookie,
    ) -> Result<String>;
}
