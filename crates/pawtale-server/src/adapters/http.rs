//! Shared HTTP client plumbing

use std::time::Duration;

use anyhow::{bail, Context};
use pawtale::{UpstreamError, UpstreamErrorKind};
use reqwest::{
    header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE},
    Client, Url,
};

/// JSON client with a fixed timeout and optional bearer token
pub(crate) fn json_client(timeout: Duration, bearer: Option<&str>) -> anyhow::Result<Client> {
    let mut headers = HeaderMap::new();
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    if let Some(token) = bearer {
        let mut value = HeaderValue::from_str(&format!("Bearer {}", token))
            .context("API key contains characters not allowed in a header")?;
        value.set_sensitive(true);
        headers.insert(AUTHORIZATION, value);
    }

    Client::builder()
        .timeout(timeout)
        .default_headers(headers)
        .build()
        .context("Failed to build HTTP client")
}

/// Parse a base URL that path segments can be appended to
pub(crate) fn base_url(raw: &str) -> anyhow::Result<Url> {
    let url = Url::parse(raw).with_context(|| format!("Invalid base URL: {}", raw))?;
    if url.cannot_be_a_base() {
        bail!("Base URL cannot carry a path: {}", raw);
    }
    Ok(url)
}

/// `base` with `segments` appended, each percent-encoded
pub(crate) fn join(base: &Url, segments: &[&str]) -> Url {
    let mut url = base.clone();
    if let Ok(mut path) = url.path_segments_mut() {
        path.pop_if_empty().extend(segments);
    }
    url
}

/// Classify a transport or status failure from the PIMS API
pub(crate) fn upstream_error(err: reqwest::Error) -> UpstreamError {
    let kind = if let Some(status) = err.status() {
        UpstreamErrorKind::from_status(status.as_u16())
    } else if err.is_connect() {
        UpstreamErrorKind::ConnectionRefused
    } else {
        UpstreamErrorKind::Unknown
    };
    UpstreamError::new(kind, err.to_string())
}
