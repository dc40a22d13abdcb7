//! # hypem-tracks
//!
//! Assembles one Hype Machine listing page into playable track records.
//!
//! A page is built from three upstream calls: the HTML listing page (which
//! embeds the track list as JSON and sets a session cookie), a positional
//! JSON metadata feed for the same page, and one cookie-authorized serve
//! request per track that yields its playable URL.
//!
//! ```rust,no_run
//! use hypem_tracks::{HypemClientImpl, PageRequest};
//!
//! # tokio_test::block_on(async {
//! let client = HypemClientImpl::new(Box::new(http_client::native::NativeClient::new()));
//! let tracks = client.fetch_page(&PageRequest::new("popular", "3day", 1)).await?;
//! println!("{} tracks", tracks.len());
//! # Ok::<(), hypem_tracks::HypemError>(())
//! # });
//! ```

pub mod assemble;
pub mod client;
pub mod error;
pub mod headers;
pub mod parsing;
pub mod r#trait;
pub mod types;

pub use assemble::TrackAssembler;
pub use client::HypemClientImpl;
pub use error::HypemError;
pub use parsing::HypemParser;
pub use r#trait::HypemClient;
pub use types::{
    ClientConfig, ListingTrack, LoadedPage, MetadataFeed, MetadataRecord, PageData, PageRequest,
    SessionCookie, TrackRecord, TrackType, DEFAULT_BASE_URL,
};

#[cfg(feature = "mock")]
pub use r#trait::MockHypemClient;

pub type Result<T> = std::result::Result<T, HypemError>;
