use http::header::{ACCEPT, CONTENT_TYPE, HeaderName, HeaderValue};
use http::{Method, StatusCode};
use reqwest::{Body, Request};
use tracing::debug;
use url::Url;

use super::ProbeRunner;

/// A response whose status was received; the body may still fail to read.
pub(super) struct Exchanged {
    pub(super) status: StatusCode,
    pub(super) body: Result<String, String>,
}

impl ProbeRunner {
    pub(super) fn build_url(base_url: &Url, path: &str) -> Result<Url, url::ParseError> {
        let url = format!(
            "{}/{}",
            base_url.as_str().trim_end_matches('/'),
            path.trim_start_matches('/')
        );
        url.parse::<Url>()
    }

    pub(super) fn build_request(
        method: Method,
        url: Url,
        authorization: Option<&(HeaderName, HeaderValue)>,
        json_body: Option<Vec<u8>>,
    ) -> Request {
        let mut request = Request::new(method, url);
        let req_headers = request.headers_mut();
        req_headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        if let Some((name, value)) = authorization {
            req_headers.insert(name.clone(), value.clone());
        }

        if let Some(body) = json_body {
            req_headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
            *request.body_mut() = Some(Body::from(body));
        }

        request
    }

    /// Sends the request and reads the whole body.
    ///
    /// Fails only when no response was received.
    pub(super) async fn exchange(&self, request: Request) -> Result<Exchanged, reqwest::Error> {
        debug!(?request, "sending...");
        let response = self.client.execute(request).await?;
        debug!(?response, "...receiving");

        let status = response.status();
        let body = response.text().await.map_err(|err| err.to_string());
        Ok(Exchanged { status, body })
    }
}
