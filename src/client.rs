use crate::headers;
use crate::parsing::HypemParser;
use crate::{
    ClientConfig, HypemClient, HypemError, LoadedPage, MetadataFeed, PageRequest, Result,
    SessionCookie, TrackAssembler, TrackRecord,
};
use async_trait::async_trait;
use http_client::{HttpClient, Request, Response};
use http_types::{Body, Method, Url};

/// Main client for Hype Machine's web interface.
///
/// This client issues the listing, metadata feed and serve requests and
/// provides [`fetch_page`](Self::fetch_page), the full assembly pipeline.
/// It holds no state between calls other than its configuration.
///
/// # Examples
///
/// ```rust,no_run
/// use hypem_tracks::{HypemClientImpl, PageRequest, Result};
///
/// #[tokio::main]
/// async fn main() -> Result<()> {
///     let http_client = http_client::native::NativeClient::new();
///     let client = HypemClientImpl::new(Box::new(http_client));
///
///     let request = PageRequest::new("popular", "3day", 3);
///     println!("{}", client.fetch_page_json(&request).await?);
///
///     Ok(())
/// }
/// ```
pub struct HypemClientImpl {
    client: Box<dyn HttpClient>,
    config: ClientConfig,
    parser: HypemParser,
}

impl HypemClientImpl {
    /// Create a new [`HypemClientImpl`] with the default configuration.
    ///
    /// # Arguments
    ///
    /// * `client` - Any HTTP client implementation that implements [`HttpClient`]
    pub fn new(client: Box<dyn HttpClient>) -> Self {
        Self::with_config(client, ClientConfig::default())
    }

    /// Create a new [`HypemClientImpl`] with a custom configuration.
    ///
    /// This is useful for testing against a local server or for tuning
    /// serve request concurrency.
    pub fn with_config(client: Box<dyn HttpClient>, config: ClientConfig) -> Self {
        Self {
            client,
            parser: HypemParser::with_page_dump_level(config.page_dump_level),
            config,
        }
    }

    /// Fetch one page and assemble its tracks.
    ///
    /// Fails only when the listing page cannot be fetched or parsed. A
    /// missing metadata feed yields an empty list.
    pub async fn fetch_page(&self, request: &PageRequest) -> Result<Vec<TrackRecord>> {
        TrackAssembler::with_config(self, &self.config)
            .fetch_page(request)
            .await
    }

    /// Like [`fetch_page`](Self::fetch_page), serialized as a JSON array.
    pub async fn fetch_page_json(&self, request: &PageRequest) -> Result<String> {
        let tracks = self.fetch_page(request).await?;
        Ok(serde_json::to_string(&tracks)?)
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.config.base_url, path)
    }

    fn parse_url(url: &str) -> Result<Url> {
        url.parse::<Url>()
            .map_err(|e| HypemError::InvalidUrl(format!("{url}: {e}")))
    }

    fn json_post(url: Url, referer_url: Option<&str>) -> Request {
        let mut request = Request::new(Method::Post, url);
        request.set_body(Body::empty());
        headers::add_json_post_headers(&mut request, referer_url);
        request
    }

    /// Send a request and fail on transport errors or non-success statuses
    async fn send(&self, request: Request, url: &str) -> Result<Response> {
        let response = self
            .client
            .send(request)
            .await
            .map_err(|e| HypemError::Http(e.to_string()))?;

        log::debug!("{} answered {}", url, response.status());

        if !response.status().is_success() {
            return Err(HypemError::Status {
                status: response.status().into(),
                url: url.to_string(),
            });
        }

        Ok(response)
    }

    async fn read_body(response: &mut Response) -> Result<String> {
        response
            .body_string()
            .await
            .map_err(|e| HypemError::Http(e.to_string()))
    }

    fn extract_cookie(response: &Response) -> SessionCookie {
        let cookie = match response.header("set-cookie") {
            Some(values) => SessionCookie::from_set_cookie(values.iter().map(|v| v.as_str())),
            None => SessionCookie::default(),
        };
        if cookie.is_empty() {
            log::debug!("Listing response set no session cookie");
        } else {
            log::trace!("Captured session cookie: {:?}", cookie.header_value());
        }
        cookie
    }
}

/// Cache-defeating timestamp in the form upstream expects, e.g. `1424219886.61`
fn freshness_timestamp() -> String {
    let millis = chrono::Utc::now().timestamp_millis();
    format!("{:.2}", millis as f64 / 1000.0)
}

#[async_trait(?Send)]
impl HypemClient for HypemClientImpl {
    async fn load_page(&self, request: &PageRequest) -> Result<LoadedPage> {
        let url = format!(
            "{}?ax=1&ts={}",
            self.endpoint(&request.listing_path()),
            freshness_timestamp()
        );
        log::debug!("Fetching listing page: {url}");

        let mut http_request = Request::new(Method::Get, Self::parse_url(&url)?);
        headers::add_page_headers(&mut http_request);

        let mut response = self.send(http_request, &url).await?;
        let cookie = Self::extract_cookie(&response);
        let html = Self::read_body(&mut response).await?;

        Ok(LoadedPage { html, cookie })
    }

    async fn get_tracks_metadata(&self, request: &PageRequest) -> Result<MetadataFeed> {
        let url = self.endpoint(&request.feed_path());
        let referer = self.endpoint(&request.listing_path());
        log::debug!("Fetching metadata feed: {url}");

        let http_request = Self::json_post(Self::parse_url(&url)?, Some(referer.as_str()));
        let mut response = self.send(http_request, &url).await?;
        let body = Self::read_body(&mut response).await?;

        self.parser.parse_metadata_feed(&body)
    }

    async fn get_song_url(
        &self,
        track_id: &str,
        track_key: &str,
        cookie: &SessionCookie,
    ) -> Result<String> {
        let url = self.endpoint(&format!(
            "serve/source/{}/{}",
            urlencoding::encode(track_id),
            urlencoding::encode(track_key)
        ));
        log::debug!("Resolving track {track_id}: {url}");

        let mut http_request = Self::json_post(Self::parse_url(&url)?, None);
        headers::add_cookie(&mut http_request, cookie);

        let mut response = self.send(http_request, &url).await?;
        let body = Self::read_body(&mut response).await?;

        self.parser.parse_serve_response(&body)
    }
}
