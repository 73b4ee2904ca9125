use std::time::Duration;

use bytes::Bytes;
use reqwest::blocking::{Client as InnerClient, Response as InnerResponse};

use crate::helpers::AlpError;

/// Thin wrapper over the blocking reqwest client so the rest of the pipeline
/// never sees reqwest types.
#[derive(Debug, Clone)]
pub struct Client {
    inner: InnerClient,
}

#[derive(Debug)]
pub struct Response {
    inner: InnerResponse,
}

impl Client {
    pub fn new(transfer_timeout: Duration) -> Result<Client, AlpError> {
        let client = InnerClient::builder()
            .user_agent("alpenstream")
            .timeout(transfer_timeout)
            .build()
            .map_err(|e| AlpError::Network(format!("Failed to build HTTP client: {e}")))?;
        Ok(Client { inner: client })
    }

    pub fn get(&self, url: &str) -> Result<Response, reqwest::Error> {
        let inner = self.inner.get(url).send()?;
        Ok(Response { inner })
    }
}

impl Response {
    pub fn status(&self) -> u16 {
        self.inner.status().as_u16()
    }

    pub fn bytes(self) -> Result<Bytes, reqwest::Error> {
        self.inner.bytes()
    }
}
