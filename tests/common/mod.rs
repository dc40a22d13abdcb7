#![allow(dead_code)]
use async_trait::async_trait;
use http_client::{HttpClient, Request, Response};
use http_types::{Error, StatusCode};
use std::sync::{Arc, Mutex};

/// What a scripted route answers with
#[derive(Debug, Clone)]
pub enum Reply {
    Respond {
        status: u16,
        body: String,
        set_cookies: Vec<String>,
    },
    TransportError(String),
}

impl Reply {
    pub fn ok(body: impl Into<String>) -> Self {
        Reply::Respond {
            status: 200,
            body: body.into(),
            set_cookies: Vec::new(),
        }
    }

    pub fn status(status: u16) -> Self {
        Reply::Respond {
            status,
            body: String::new(),
            set_cookies: Vec::new(),
        }
    }

    pub fn with_cookie(self, cookie: &str) -> Self {
        match self {
            Reply::Respond {
                status,
                body,
                mut set_cookies,
            } => {
                set_cookies.push(cookie.to_string());
                Reply::Respond {
                    status,
                    body,
                    set_cookies,
                }
            }
            other => other,
        }
    }
}

/// A request as the scripted client saw it
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: String,
    pub path: String,
    pub query: Option<String>,
    pub cookie: Option<String>,
    pub content_type: Option<String>,
}

/// In-memory [`HttpClient`] answering by URL path and recording every request.
///
/// Clones share routes and the request log, so a test can hand one clone to
/// the client under test and inspect the other.
#[derive(Debug, Clone, Default)]
pub struct ScriptedClient {
    routes: Arc<Mutex<Vec<(String, Reply)>>>,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
}

impl ScriptedClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer requests whose path equals `path` with `reply`
    pub fn route(self, path: &str, reply: Reply) -> Self {
        self.routes
            .lock()
            .unwrap()
            .push((path.to_string(), reply));
        self
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn requests_to(&self, prefix: &str) -> Vec<RecordedRequest> {
        self.requests()
            .into_iter()
            .filter(|r| r.path.starts_with(prefix))
            .collect()
    }
}

fn first_header(request: &Request, name: &str) -> Option<String> {
    request
        .header(name)
        .and_then(|values| values.get(0))
        .map(|value| value.as_str().to_string())
}

#[async_trait]
impl HttpClient for ScriptedClient {
    async fn send(&self, req: Request) -> Result<Response, Error> {
        let path = req.url().path().to_string();
        self.requests.lock().unwrap().push(RecordedRequest {
            method: req.method().to_string(),
            path: path.clone(),
            query: req.url().query().map(|q| q.to_string()),
            cookie: first_header(&req, "Cookie"),
            content_type: first_header(&req, "Content-Type"),
        });

        let reply = self
            .routes
            .lock()
            .unwrap()
            .iter()
            .find(|(route, _)| *route == path)
            .map(|(_, reply)| reply.clone());

        match reply {
            Some(Reply::Respond {
                status,
                body,
                set_cookies,
            }) => {
                let status = StatusCode::try_from(status).unwrap_or(StatusCode::InternalServerError);
                let mut response = Response::new(status);
                for cookie in set_cookies {
                    response.append_header("Set-Cookie", cookie.as_str());
                }
                response.set_body(body);
                Ok(response)
            }
            Some(Reply::TransportError(reason)) => {
                Err(Error::from_str(StatusCode::BadGateway, reason))
            }
            None => Ok(Response::new(StatusCode::NotFound)),
        }
    }
}

/// Wrap page JSON in listing page markup the way upstream does
pub fn listing_html(page_json: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head><title>Popular MP3 &amp; Music Blog Tracks / Hype Machine</title></head>
<body>
<div id="container">
  <div id="track-list"></div>
  <script type="application/json" id="displayList-data">
  {page_json}
  </script>
</div>
</body>
</html>"#
    )
}
