#![cfg_attr(doc, doc = include_str!("../README.md"))]

mod client;
mod config;
mod credential;
mod endpoint;
pub mod error;
mod html;
mod types;

use reqwest::blocking::{Client as ReqwestClient, Request};

pub use client::{Client, Params, masked_query, masked_url};
pub use config::{BASE_URL, ClientConfig};
pub use credential::{Credential, DEFAULT_API_KEY_ENV};
pub use endpoint::{Endpoint, EndpointRegistry};
pub use error::Error;
pub use html::{CLEAN_SETLIST_FIELD, clean_setlist};
pub use types::{Envelope, FIRST_SHOW_YEAR, ResponseBody, SHOWS_QUERY_CAP, Setlists, Shows};

pub type Result<T> = std::result::Result<T, Error>;

/// Query parameter carrying the API key.
pub const API_KEY_PARAM: &str = "apikey";

/// Executes a single request and returns the raw body of a 2xx response.
///
/// `display_url` is what gets logged; callers pass a masked form so API keys
/// never reach log output.
#[cfg_attr(
    feature = "tracing",
    tracing::instrument(
        level = "debug",
        skip(client, request, display_url),
        fields(method, url = %display_url, status_code)
    )
)]
pub(crate) fn request(
    client: &ReqwestClient,
    request: Request,
    display_url: &str,
) -> Result<String> {
    #[cfg(not(feature = "tracing"))]
    let _: &str = display_url;

    let method = request.method().clone();
    let path = request.url().path().to_owned();

    #[cfg(feature = "tracing")]
    tracing::Span::current().record("method", method.as_str());

    let response = client.execute(request)?;
    let status_code = response.status();

    #[cfg(feature = "tracing")]
    tracing::Span::current().record("status_code", status_code.as_u16());

    if !status_code.is_success() {
        let message = response.text().unwrap_or_default();

        #[cfg(feature = "tracing")]
        tracing::warn!(
            status = %status_code,
            method = %method,
            url = %display_url,
            message = %message,
            "API request failed"
        );

        return Err(Error::status(status_code, method, path, message));
    }

    let body = response.text()?;

    #[cfg(feature = "tracing")]
    tracing::debug!(bytes = body.len(), "API request succeeded");

    Ok(body)
}
