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

use std::fmt::Write;

use chefapi_core::hash::{base64_encode, base64_sha1};
use chefapi_core::time::{format_iso8601, now, DateTime};
use chefapi_core::Result;
use http::header::{HeaderName, HeaderValue};
use http::{HeaderMap, Method};
use log::debug;

use crate::constants::*;
use crate::Credential;

/// RequestSigner that implements the Chef Server header signing protocol
/// (`algorithm=sha1;version=1.0`).
#[derive(Debug, Default, Clone)]
pub struct RequestSigner {
    time: Option<DateTime>,
}

impl RequestSigner {
    /// Create a new signer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Specify the signing time.
    ///
    /// # Note
    ///
    /// We should always take current time to sign requests.
    /// Only use this function for testing.
    pub fn with_time(mut self, time: DateTime) -> Self {
        self.time = Some(time);
        self
    }

    /// Sign a request for `path` whose body hashes to `content_hash`.
    ///
    /// `path` is the path part of the final URI, without query.
    pub fn sign(
        &self,
        cred: &Credential,
        method: &Method,
        path: &str,
        content_hash: &str,
    ) -> Result<AuthHeaders> {
        let timestamp = format_iso8601(self.time.unwrap_or_else(now));

        let creq = canonical_request_string(
            method,
            &hashed_path(path),
            content_hash,
            &timestamp,
            &cred.client,
        )?;
        debug!("calculated canonical request: {creq}");

        let signature = base64_encode(&cred.key.private_encrypt(creq.as_bytes())?);

        let mut headers = vec![
            (X_OPS_SIGN.to_string(), SIGNATURE.to_string()),
            (X_OPS_USERID.to_string(), cred.client.clone()),
            (X_OPS_TIMESTAMP.to_string(), timestamp),
            (X_OPS_CONTENT_HASH.to_string(), content_hash.to_string()),
        ];
        // Base64 output is ASCII, so splitting bytes never cuts a char.
        for (idx, line) in signature
            .as_bytes()
            .chunks(AUTHORIZATION_LINE_WIDTH)
            .enumerate()
        {
            headers.push((
                format!("{X_OPS_AUTHORIZATION}-{}", idx + 1),
                String::from_utf8_lossy(line).into_owned(),
            ));
        }

        Ok(AuthHeaders { headers })
    }
}

/// Collapse repeated `/` and strip trailing ones.
///
/// `/zip//zap/foo/` becomes `/zip/zap/foo`, and `/` becomes the empty string.
pub fn canonical_path(path: &str) -> String {
    let mut out = String::with_capacity(path.len());
    for c in path.chars() {
        if c == '/' && out.ends_with('/') {
            continue;
        }
        out.push(c);
    }
    out.truncate(out.trim_end_matches('/').len());
    out
}

/// Base64 SHA-1 of the canonical path.
pub fn hashed_path(path: &str) -> String {
    base64_sha1(canonical_path(path).as_bytes())
}

fn canonical_request_string(
    method: &Method,
    hashed_path: &str,
    content_hash: &str,
    timestamp: &str,
    user_id: &str,
) -> Result<String> {
    let mut f = String::with_capacity(192);

    writeln!(f, "Method:{}", method.as_str().to_ascii_uppercase())?;
    writeln!(f, "Hashed Path:{hashed_path}")?;
    writeln!(f, "X-Ops-Content-Hash:{content_hash}")?;
    writeln!(f, "X-Ops-Timestamp:{timestamp}")?;
    write!(f, "X-Ops-UserId:{user_id}")?;

    Ok(f)
}

/// AuthHeaders is the ordered set of headers produced by signing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthHeaders {
    headers: Vec<(String, String)>,
}

impl AuthHeaders {
    /// Iterate over `(name, value)` in signing order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.headers.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Get a header by name, ignoring ASCII case.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v)
    }

    /// Values of `X-Ops-Authorization-1..N` in order.
    pub fn authorization_lines(&self) -> Vec<&str> {
        let prefix = format!("{X_OPS_AUTHORIZATION}-");
        self.iter()
            .filter(|(k, _)| k.starts_with(&prefix))
            .map(|(_, v)| v)
            .collect()
    }

    /// Number of headers.
    pub fn len(&self) -> usize {
        self.headers.len()
    }

    /// Check if there are no headers.
    pub fn is_empty(&self) -> bool {
        self.headers.is_empty()
    }

    /// Insert every header into `headers`, replacing existing values.
    pub fn apply(&self, headers: &mut HeaderMap) -> Result<()> {
        for (k, v) in self.iter() {
            let mut value = HeaderValue::from_str(v)?;
            if k.starts_with(X_OPS_AUTHORIZATION) {
                value.set_sensitive(true);
            }
            headers.insert(HeaderName::from_bytes(k.as_bytes())?, value);
        }
        Ok(())
    }
}
