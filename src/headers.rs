use crate::SessionCookie;
use http_client::Request;

/// Common Chrome user agent string for all requests
const USER_AGENT: &str = "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/138.0.0.0 Safari/537.36";

/// Add common browser headers to a request
pub fn add_common_headers(request: &mut Request) {
    let _ = request.insert_header("User-Agent", USER_AGENT);
    let _ = request.insert_header("Accept-Language", "en-US,en;q=0.9");
    let _ = request.insert_header("DNT", "1");
    let _ = request.insert_header("Connection", "keep-alive");
}

/// Add headers for the HTML listing page request
pub fn add_page_headers(request: &mut Request) {
    add_common_headers(request);
    let _ = request.insert_header(
        "Accept",
        "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8",
    );
    let _ = request.insert_header("Upgrade-Insecure-Requests", "1");
}

/// Add headers for the empty-bodied JSON POSTs (metadata feed and serve)
pub fn add_json_post_headers(request: &mut Request, referer_url: Option<&str>) {
    add_common_headers(request);
    let _ = request.insert_header("Accept", "application/json, text/javascript, */*; q=0.01");
    let _ = request.insert_header("Content-Type", "application/json");
    let _ = request.insert_header("X-Requested-With", "XMLHttpRequest");

    if let Some(referer) = referer_url {
        let _ = request.insert_header("Referer", referer);
    }
}

/// Attach the session cookie to a request if one was captured
pub fn add_cookie(request: &mut Request, cookie: &SessionCookie) {
    if let Some(cookie_header) = cookie.header_value() {
        let _ = request.insert_header("Cookie", cookie_header.as_str());
    }
}
