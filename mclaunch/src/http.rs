//! This module provides the blocking transport used by the whole pipeline. Everything
//! is based on async reqwest, driven by a private current-thread tokio runtime, so
//! each request blocks the caller until the full body is received.

use std::io;

use reqwest::{Client, ClientBuilder, StatusCode};
use tokio::runtime::{self, Runtime};


/// The user agent to be used on each HTTP request.
pub const USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

/// Get a new client builder for HTTP(S) requests.
pub fn builder() -> ClientBuilder {
    Client::builder().user_agent(USER_AGENT)
}

/// The transport capability: fetch the whole body of a resource given its URL.
///
/// The pipeline only depends on this trait, so it can be driven by any source of
/// bytes (a mock, a local mirror...), the default being [`HttpFetch`].
pub trait Fetch {
    /// Fetch the given URL and return the full response body, any non-OK status is
    /// considered an error.
    fn fetch(&mut self, url: &str) -> Result<Vec<u8>, FetchError>;
}

// Mutable implementation.
impl<F: Fetch + ?Sized> Fetch for &mut F {
    #[inline]
    fn fetch(&mut self, url: &str) -> Result<Vec<u8>, FetchError> {
        (**self).fetch(url)
    }
}

/// Blocking HTTP(S) fetcher, requests are sent one at a time with no timeout.
#[derive(Debug)]
pub struct HttpFetch {
    rt: Runtime,
    client: Client,
}

impl HttpFetch {

    /// Create a new fetcher with its own runtime and client.
    pub fn new() -> Result<Self, FetchError> {

        let rt = runtime::Builder::new_current_thread()
            .enable_time()
            .enable_io()
            .build()?;

        Ok(Self {
            rt,
            client: builder().build()?,
        })

    }

}

impl Fetch for HttpFetch {

    fn fetch(&mut self, url: &str) -> Result<Vec<u8>, FetchError> {

        log::debug!("fetch: {url}");

        let client = &self.client;
        self.rt.block_on(async move {

            let res = client.get(url).send().await?;
            if res.status() != StatusCode::OK {
                return Err(FetchError::InvalidStatus(res.status().as_u16()));
            }

            Ok(res.bytes().await?.to_vec())

        })

    }

}

/// An error while fetching a single resource.
#[derive(thiserror::Error, Debug)]
pub enum FetchError {
    /// HTTP error while requesting the resource or reading its body.
    #[error("reqwest: {0}")]
    Reqwest(#[from] reqwest::Error),
    /// Invalid HTTP status code while requesting the resource.
    #[error("invalid status: {0}")]
    InvalidStatus(u16),
    /// System I/O error, while building the runtime for example.
    #[error("io: {0}")]
    Io(#[from] io::Error),
}
