//! HTTP transport seam
//!
//! The client never talks to the network directly. It hands a fully built
//! `http::Request` to an [`HttpTransport`] and gets the buffered response back,
//! which lets tests substitute a request-capturing double.

use async_trait::async_trait;
use bytes::Bytes;

use crate::error::Result;

/// Executes one HTTP exchange
#[async_trait]
pub trait HttpTransport: Send + Sync {
    /// Send the request and buffer the whole response body.
    ///
    /// Only I/O level failures are errors; any HTTP status is a successful exchange.
    async fn execute(&self, request: http::Request<Bytes>) -> Result<http::Response<Bytes>>;
}

#[cfg(feature = "reqwest-transport")]
pub use self::reqwest_transport::ReqwestTransport;

#[cfg(feature = "reqwest-transport")]
mod reqwest_transport {
    use super::*;
    use crate::config::TransportConfig;
    use crate::error::DicomWebError;
    use tracing::debug;

    /// [`HttpTransport`] backed by a shared `reqwest::Client`
    #[derive(Debug, Clone)]
    pub struct ReqwestTransport {
        client: reqwest::Client,
    }

    impl ReqwestTransport {
        /// Build a client with the configured timeouts
        pub fn new(config: &TransportConfig) -> Result<Self> {
            config.validate()?;
            let client = reqwest::Client::builder()
                .timeout(config.timeout())
                .connect_timeout(config.connect_timeout())
                .build()
                .map_err(|e| DicomWebError::config(format!("failed to build HTTP client: {}", e)))?;
            Ok(Self { client })
        }

        /// Wrap an already configured client
        pub fn with_client(client: reqwest::Client) -> Self {
            Self { client }
        }
    }

    #[async_trait]
    impl HttpTransport for ReqwestTransport {
        async fn execute(&self, request: http::Request<Bytes>) -> Result<http::Response<Bytes>> {
            let request = reqwest::Request::try_from(request)
                .map_err(|e| DicomWebError::transport(format!("invalid request: {}", e)))?;
            debug!("{} {}", request.method(), request.url());

            let response = self
                .client
                .execute(request)
                .await
                .map_err(|e| DicomWebError::transport(e.to_string()))?;

            let status = response.status();
            let version = response.version();
            let headers = response.headers().clone();
            let body = response
                .bytes()
                .await
                .map_err(|e| DicomWebError::transport(e.to_string()))?;

            let mut builder = http::Response::builder().status(status).version(version);
            if let Some(map) = builder.headers_mut() {
                *map = headers;
            }
            builder
                .body(body)
                .map_err(|e| DicomWebError::internal(format!("failed to rebuild response: {}", e)))
        }
    }
}
