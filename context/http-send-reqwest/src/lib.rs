//! Blocking reqwest based HTTP sending implementation for chefapi.
//!
//! This crate provides `ReqwestHttpSend`, which implements the `HttpSend`
//! trait from `chefapi_core` on top of `reqwest::blocking`.
//!
//! ## Example
//!
//! ```no_run
//! use std::time::Duration;
//!
//! use chefapi_core::Context;
//! use chefapi_http_send_reqwest::ReqwestHttpSend;
//!
//! # fn main() -> chefapi_core::Result<()> {
//! let http = ReqwestHttpSend::builder()
//!     .proxy("proxy.example.com", Some(3128), None, None)
//!     .read_timeout(Duration::from_secs(30))
//!     .build()?;
//!
//! let ctx = Context::new().with_http_send(http);
//! # Ok(())
//! # }
//! ```

use std::time::Duration;

use bytes::Bytes;
use chefapi_core::utils::Redact;
use chefapi_core::{Body, Error, HttpSend, Result};
use log::debug;
use reqwest::blocking::Client;
use reqwest::redirect::Policy;
use reqwest::{Certificate, Proxy};

/// HttpSend implementation backed by a blocking reqwest client.
#[derive(Debug, Clone)]
pub struct ReqwestHttpSend {
    client: Client,
}

impl ReqwestHttpSend {
    /// Create a new ReqwestHttpSend with a reqwest::blocking::Client.
    ///
    /// The client must be built with `redirect(Policy::none())`, otherwise
    /// reqwest follows redirects before the connection sees them.
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// Start building a client from connection options.
    pub fn builder() -> Builder {
        Builder::default()
    }
}

impl HttpSend for ReqwestHttpSend {
    fn http_send(&self, req: http::Request<Body>) -> Result<http::Response<Bytes>> {
        let (parts, body) = req.into_parts();
        let uri = parts.uri.to_string();

        let mut builder = self
            .client
            .request(parts.method, &uri)
            .headers(parts.headers);
        builder = match body {
            Body::Empty => builder,
            Body::Bytes(bs) => builder.body(bs),
            Body::Stream { reader, length } => {
                builder.body(reqwest::blocking::Body::sized(reader, length))
            }
        };

        let resp = builder.send().map_err(|e| send_error(&uri, e))?;

        let status = resp.status();
        let headers = resp.headers().clone();
        let bs = resp.bytes().map_err(|e| send_error(&uri, e))?;
        debug!("got response from {uri}: {status}, {} bytes", bs.len());

        let mut out = http::Response::new(bs);
        *out.status_mut() = status;
        *out.headers_mut() = headers;
        Ok(out)
    }
}

fn send_error(uri: &str, e: reqwest::Error) -> Error {
    if e.is_builder() {
        Error::request_invalid(format!("failed to build request to {uri}")).with_source(e)
    } else {
        Error::server_unavailable(format!("failed to send request to {uri}")).with_source(e)
    }
}

/// Builder for [`ReqwestHttpSend`].
#[derive(Clone)]
pub struct Builder {
    proxy_address: Option<String>,
    proxy_port: Option<u16>,
    proxy_username: Option<String>,
    proxy_password: Option<String>,
    ca_pem: Option<Vec<u8>>,
    ssl_verify: bool,
    read_timeout: Option<Duration>,
}

impl Default for Builder {
    fn default() -> Self {
        Self {
            proxy_address: None,
            proxy_port: None,
            proxy_username: None,
            proxy_password: None,
            ca_pem: None,
            ssl_verify: true,
            read_timeout: None,
        }
    }
}

impl std::fmt::Debug for Builder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Builder")
            .field("proxy_address", &self.proxy_address)
            .field("proxy_port", &self.proxy_port)
            .field("proxy_username", &self.proxy_username)
            .field("proxy_password", &Redact::from(&self.proxy_password))
            .field("ca_pem", &self.ca_pem.as_ref().map(|v| v.len()))
            .field("ssl_verify", &self.ssl_verify)
            .field("read_timeout", &self.read_timeout)
            .finish()
    }
}

impl Builder {
    /// Route every request through the given HTTP proxy.
    ///
    /// `address` may carry its own scheme; `http://` is assumed otherwise.
    pub fn proxy(
        mut self,
        address: &str,
        port: Option<u16>,
        username: Option<&str>,
        password: Option<&str>,
    ) -> Self {
        self.proxy_address = Some(address.to_string());
        self.proxy_port = port;
        self.proxy_username = username.map(|v| v.to_string());
        self.proxy_password = password.map(|v| v.to_string());
        self
    }

    /// Trust the certificates in this PEM bundle on top of the built-in roots.
    pub fn ca_pem(mut self, pem: impl Into<Vec<u8>>) -> Self {
        self.ca_pem = Some(pem.into());
        self
    }

    /// Set whether server certificates are verified.
    pub fn ssl_verify(mut self, verify: bool) -> Self {
        self.ssl_verify = verify;
        self
    }

    /// Fail requests that take longer than `timeout`.
    pub fn read_timeout(mut self, timeout: Duration) -> Self {
        self.read_timeout = Some(timeout);
        self
    }

    fn proxy_url(&self) -> Option<String> {
        let address = self.proxy_address.as_deref()?;
        let address = if address.contains("://") {
            address.to_string()
        } else {
            format!("http://{address}")
        };

        Some(match self.proxy_port {
            Some(port) => format!("{}:{port}", address.trim_end_matches('/')),
            None => address,
        })
    }

    /// Build the http sender.
    pub fn build(self) -> Result<ReqwestHttpSend> {
        // One exchange per request; redirects are handled by the connection.
        let mut builder = Client::builder()
            .redirect(Policy::none())
            .pool_max_idle_per_host(0);

        if let Some(url) = self.proxy_url() {
            let mut proxy = Proxy::all(&url).map_err(|e| {
                Error::config_invalid(format!("invalid proxy address {url}")).with_source(e)
            })?;
            if let Some(username) = &self.proxy_username {
                proxy = proxy.basic_auth(username, self.proxy_password.as_deref().unwrap_or(""));
            }
            builder = builder.proxy(proxy);
        }

        if let Some(pem) = &self.ca_pem {
            let certs = Certificate::from_pem_bundle(pem).map_err(|e| {
                Error::config_invalid("ssl pem file is not a valid certificate bundle")
                    .with_source(e)
            })?;
            if certs.is_empty() {
                return Err(Error::config_invalid(
                    "ssl pem file doesn't contain any certificate",
                ));
            }
            for cert in certs {
                builder = builder.add_root_certificate(cert);
            }
        }

        if !self.ssl_verify {
            builder = builder.danger_accept_invalid_certs(true);
        }

        if let Some(timeout) = self.read_timeout {
            builder = builder.timeout(timeout);
        }

        let client = builder
            .build()
            .map_err(|e| Error::config_invalid("failed to build http client").with_source(e))?;
        Ok(ReqwestHttpSend::new(client))
    }
}
