//! The track assembly pipeline.
//!
//! Fetching the listing page and parsing its data are fatal steps. The
//! metadata feed degrades to empty on failure, and every index after that is
//! processed in isolation: a failed merge drops the index, a failed
//! resolution leaves `url` empty.

use crate::parsing::HypemParser;
use crate::{
    ClientConfig, HypemClient, ListingTrack, LoadedPage, MetadataFeed, PageData, PageRequest,
    Result, SessionCookie, TrackRecord,
};
use futures::stream::{self, StreamExt};

/// Assembles one listing page into [`TrackRecord`]s using any [`HypemClient`].
///
/// # Examples
///
/// ```rust,no_run
/// use hypem_tracks::{ClientConfig, HypemClientImpl, PageRequest, TrackAssembler};
///
/// # tokio_test::block_on(async {
/// let client = HypemClientImpl::new(Box::new(http_client::native::NativeClient::new()));
/// let assembler = TrackAssembler::with_config(&client, &ClientConfig::sequential());
///
/// let tracks = assembler.fetch_page(&PageRequest::new("popular", "3day", 1)).await?;
/// for track in tracks {
///     println!("{:?} - {:?}: {:?}", track.artist, track.title, track.url);
/// }
/// # Ok::<(), hypem_tracks::HypemError>(())
/// # });
/// ```
pub struct TrackAssembler<'a, C: HypemClient + ?Sized> {
    client: &'a C,
    parser: HypemParser,
    resolve_concurrency: usize,
}

impl<'a, C: HypemClient + ?Sized> TrackAssembler<'a, C> {
    /// Create an assembler with the default configuration.
    pub fn new(client: &'a C) -> Self {
        Self::with_config(client, &ClientConfig::default())
    }

    /// Create an assembler using the concurrency and page dump settings of `config`.
    pub fn with_config(client: &'a C, config: &ClientConfig) -> Self {
        Self {
            client,
            parser: HypemParser::with_page_dump_level(config.page_dump_level),
            resolve_concurrency: config.resolve_concurrency.max(1),
        }
    }

    /// Fetch, merge and resolve one page of tracks.
    ///
    /// Records come back in ascending position order. Positions that could
    /// not be merged are left out rather than padded.
    pub async fn fetch_page(&self, request: &PageRequest) -> Result<Vec<TrackRecord>> {
        log::debug!(
            "Assembling {}/{} page {}",
            request.collection,
            request.mode,
            request.page_number
        );
        if let Some(sort) = &request.sort {
            log::debug!("Sort '{sort}' is accepted but not applied upstream");
        }

        let LoadedPage { html, cookie } = self.client.load_page(request).await?;
        let page_data = self.parser.parse_page_data(&html)?;

        let feed = match self.client.get_tracks_metadata(request).await {
            Ok(feed) => feed,
            Err(e) => {
                e.log_absorbed("metadata feed");
                MetadataFeed::new()
            }
        };

        let page_data = &page_data;
        let feed = &feed;
        let cookie = &cookie;

        let results: Vec<(usize, Result<TrackRecord>)> = stream::iter(0..feed.len())
            .map(move |index| async move {
                let result = self.assemble_track(index, page_data, feed, cookie).await;
                (index, result)
            })
            .buffered(self.resolve_concurrency)
            .collect()
            .await;

        let tracks = results
            .into_iter()
            .fold(Vec::new(), |mut tracks, (index, result)| {
                match result {
                    Ok(track) => tracks.push(track),
                    Err(e) => log::warn!("Skipping track {index}: {e}"),
                }
                tracks
            });

        log::debug!(
            "Assembled {} tracks from {} metadata entries and {} listing entries",
            tracks.len(),
            feed.len(),
            page_data.track_count()
        );
        Ok(tracks)
    }

    async fn assemble_track(
        &self,
        index: usize,
        page_data: &PageData,
        feed: &MetadataFeed,
        cookie: &SessionCookie,
    ) -> Result<TrackRecord> {
        let record = TrackRecord::from(feed.record(index)?);
        let listing = page_data.track(index)?;
        let url = self.resolve_track_url(&listing, cookie).await;
        Ok(record.with_url(url))
    }

    /// Resolve the playable URL of one listing track.
    ///
    /// Tracks typed `false` are never sent to the serve endpoint. Any error
    /// from the serve call is logged and yields `None`.
    pub async fn resolve_track_url(
        &self,
        track: &ListingTrack,
        cookie: &SessionCookie,
    ) -> Option<String> {
        if !track.track_type.is_resolvable() {
            log::debug!("Track {} is not resolvable, skipping serve request", track.id);
            return None;
        }

        match self.client.get_song_url(&track.id, &track.key, cookie).await {
            Ok(url) => Some(url),
            Err(e) => {
                e.log_absorbed(&format!("download url for {}", track.id));
                None
            }
        }
    }
}
