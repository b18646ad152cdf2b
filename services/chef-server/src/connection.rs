// Licensed to the Apache Software Foundation (ASF) under one
// or more contributor license agreements.  See the NOTICE file
// distributed with this work for additional information
// regarding copyright ownership.  The ASF licenses this file
// to you under the Apache License, Version 2.0 (the
// "License"); you may not use this file except in compliance
// with the License.  You may obtain a copy of the License at
//
//   http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing,
// software distributed under the License is distributed on an
// "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY
// KIND, either express or implied.  See the License for the
// specific language governing permissions and limitations
// under the License.

use bytes::Bytes;
use chefapi_core::{Body, Context, Result};
use http::header::{ACCEPT, CONTENT_LENGTH, CONTENT_TYPE, LOCATION, USER_AGENT};
use http::{HeaderName, HeaderValue, Method, Request, Response, Uri};
use log::debug;

use crate::body::RequestBody;
use crate::config::{Config, Flavor};
use crate::constants::{APPLICATION_JSON, X_CHEF_VERSION};
use crate::credential::{Credential, CredentialLoader};
use crate::key::KeyMaterial;
use crate::multipart::Multipart;
use crate::response::{parse_response, ResponseBody};
use crate::sign_request::RequestSigner;
use crate::uri::{resolve_location, resolve_uri};

const NO_PARAMS: &[(&str, &str)] = &[];

/// Connection to a Chef Server.
///
/// Every request is signed with the configured client and key. A connection
/// can be shared between threads as long as each request uses its own
/// streams.
///
/// ```no_run
/// use chefapi_chef_server::{Config, Connection};
/// use chefapi_core::Context;
///
/// # fn example(ctx: Context) -> chefapi_core::Result<()> {
/// let config = Config::default().from_env(&ctx);
/// let conn = Connection::new(ctx, &config);
///
/// let nodes = conn.get("/nodes")?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct Connection {
    ctx: Context,
    endpoint: String,
    flavor: Option<Flavor>,
    credential: CredentialLoader,
    signer: RequestSigner,

    user_agent: String,
    chef_version: String,
    sign_full_body: bool,
}

impl Connection {
    /// Create a connection from `config`.
    ///
    /// The key is resolved lazily on the first request.
    pub fn new(ctx: Context, config: &Config) -> Self {
        Self {
            ctx,
            endpoint: config.endpoint().to_string(),
            flavor: config.flavor,
            credential: CredentialLoader::new(
                config.client.clone(),
                config.key.clone().map(KeyMaterial::from),
            ),
            signer: RequestSigner::new(),

            user_agent: config.user_agent().to_string(),
            chef_version: config.chef_version().to_string(),
            sign_full_body: config.sign_full_body(),
        }
    }

    /// Use this signer instead of the default one.
    pub fn with_signer(mut self, signer: RequestSigner) -> Self {
        self.signer = signer;
        self
    }

    /// Use this key instead of the configured one.
    pub fn with_key(mut self, key: impl Into<KeyMaterial>) -> Self {
        self.set_key(key);
        self
    }

    /// Replace the key. The previously resolved key is dropped.
    pub fn set_key(&mut self, key: impl Into<KeyMaterial>) {
        self.credential.set_key(key);
    }

    /// Replace the client name.
    pub fn set_client(&mut self, client: impl Into<String>) {
        self.credential.set_client(client);
    }

    /// Endpoint relative paths are resolved against.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Configured server flavor.
    pub fn flavor(&self) -> Option<Flavor> {
        self.flavor
    }

    /// Name of the signing client.
    pub fn client(&self) -> Option<&str> {
        self.credential.client()
    }

    /// Make a GET request.
    pub fn get(&self, path: &str) -> Result<ResponseBody> {
        self.perform(Method::GET, path, &RequestBody::Empty, NO_PARAMS)
    }

    /// Make a POST request.
    pub fn post(&self, path: &str, body: impl Into<RequestBody>) -> Result<ResponseBody> {
        self.perform(Method::POST, path, &body.into(), NO_PARAMS)
    }

    /// Make a PUT request.
    pub fn put(&self, path: &str, body: impl Into<RequestBody>) -> Result<ResponseBody> {
        self.perform(Method::PUT, path, &body.into(), NO_PARAMS)
    }

    /// Make a PATCH request.
    pub fn patch(&self, path: &str, body: impl Into<RequestBody>) -> Result<ResponseBody> {
        self.perform(Method::PATCH, path, &body.into(), NO_PARAMS)
    }

    /// Make a DELETE request.
    pub fn delete(&self, path: &str) -> Result<ResponseBody> {
        self.perform(Method::DELETE, path, &RequestBody::Empty, NO_PARAMS)
    }

    /// Make a HEAD request.
    pub fn head(&self, path: &str) -> Result<ResponseBody> {
        self.perform(Method::HEAD, path, &RequestBody::Empty, NO_PARAMS)
    }

    /// Make a signed request and decode its response.
    ///
    /// `path` is either absolute or relative to the endpoint. `params` become
    /// the query string of GET and DELETE requests. A redirect is followed
    /// once, with the same method and body, signed again for the new path.
    /// Streams in `body` are rewound before this returns.
    pub fn perform<K, V>(
        &self,
        method: Method,
        path: &str,
        body: &RequestBody,
        params: &[(K, V)],
    ) -> Result<ResponseBody>
    where
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let uri = resolve_uri(&self.endpoint, &method, path, params)?;
        let cred = self.credential.load(&self.ctx)?;

        let mut resp = self.send(&cred, &method, &uri, body)?;

        let location = match resp.headers().get(LOCATION) {
            Some(v) if resp.status().is_redirection() => Some(v.to_str()?.to_string()),
            _ => None,
        };
        if let Some(location) = location {
            let next = resolve_location(&uri, &location)?;
            debug!("{method} {uri} redirected to {next}");
            resp = self.send(&cred, &method, &next, body)?;
        }

        parse_response(resp)
    }

    fn send(
        &self,
        cred: &Credential,
        method: &Method,
        uri: &Uri,
        body: &RequestBody,
    ) -> Result<Response<Bytes>> {
        let content_hash = body.content_hash(self.sign_full_body)?;
        let auth = self
            .signer
            .sign(cred, method, uri.path(), &content_hash)?;

        let (payload, content_type) = match body {
            RequestBody::Empty => (Body::Empty, APPLICATION_JSON.to_string()),
            RequestBody::Bytes(bs) => (Body::Bytes(bs.clone()), APPLICATION_JSON.to_string()),
            RequestBody::Stream(s) => (
                Body::stream(s.reader()?, s.len()),
                APPLICATION_JSON.to_string(),
            ),
            RequestBody::Form(fields) => {
                let multipart = Multipart::new(fields);
                (multipart.to_body(), Multipart::content_type())
            }
        };

        let mut req = Request::builder()
            .method(method.clone())
            .uri(uri.clone())
            .body(Body::Empty)?;
        let headers = req.headers_mut();
        headers.insert(ACCEPT, HeaderValue::from_static(APPLICATION_JSON));
        headers.insert(CONTENT_TYPE, HeaderValue::from_str(&content_type)?);
        headers.insert(
            HeaderName::from_bytes(X_CHEF_VERSION.as_bytes())?,
            HeaderValue::from_str(&self.chef_version)?,
        );
        headers.insert(USER_AGENT, HeaderValue::from_str(&self.user_agent)?);
        if matches!(payload, Body::Stream { .. }) {
            headers.insert(CONTENT_LENGTH, HeaderValue::from(payload.len()));
        }
        auth.apply(headers)?;
        *req.body_mut() = payload;

        debug!("sending {method} {uri} signed by {}", cred.client);
        let resp = self.ctx.http_send(req);
        let rewound = body.rewind();

        let resp = resp?;
        rewound?;
        Ok(resp)
    }
}
