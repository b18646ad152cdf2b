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

use std::fmt::{self, Debug};
use std::sync::Arc;

use chefapi_core::utils::Redact;
use chefapi_core::{Context, Error, Result};
use log::debug;
use rsa::pkcs1::DecodeRsaPrivateKey;
use rsa::pkcs8::DecodePrivateKey;
use rsa::traits::PublicKeyParts;
use rsa::{Pkcs1v15Sign, RsaPrivateKey};

/// PrivateKey is a parsed RSA private key, cheap to clone.
#[derive(Clone, PartialEq)]
pub struct PrivateKey(Arc<RsaPrivateKey>);

impl Debug for PrivateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PrivateKey")
            .field("bits", &(self.0.size() * 8))
            .field("key", &"<redacted>")
            .finish()
    }
}

impl From<RsaPrivateKey> for PrivateKey {
    fn from(key: RsaPrivateKey) -> Self {
        PrivateKey(Arc::new(key))
    }
}

impl PrivateKey {
    /// Parse a PEM encoded key, either PKCS#1 (`RSA PRIVATE KEY`) or
    /// PKCS#8 (`PRIVATE KEY`).
    pub fn from_pem(pem: &str) -> Result<Self> {
        let pem = pem.trim();
        let key = RsaPrivateKey::from_pkcs1_pem(pem)
            .or_else(|_| RsaPrivateKey::from_pkcs8_pem(pem))
            .map_err(|e| {
                Error::key_invalid("private key is not a valid PEM encoded RSA key")
                    .with_source(e)
            })?;
        Ok(key.into())
    }

    /// Size of the modulus in bytes.
    pub fn size(&self) -> usize {
        self.0.size()
    }

    /// Raw RSA private-key encryption of `data` with PKCS#1 v1.5 type 1
    /// padding and no DigestInfo prefix.
    ///
    /// `data` must be at least 11 bytes shorter than the modulus.
    pub fn private_encrypt(&self, data: &[u8]) -> Result<Vec<u8>> {
        self.0
            .sign(Pkcs1v15Sign::new_unprefixed(), data)
            .map_err(|e| {
                Error::key_invalid(format!(
                    "failed to encrypt {} bytes with a {} bit key",
                    data.len(),
                    self.size() * 8
                ))
                .with_source(e)
            })
    }
}

/// KeyMaterial is the configured form of a private key before it's parsed.
#[derive(Clone, PartialEq)]
pub enum KeyMaterial {
    /// An already parsed key, used as is.
    Parsed(PrivateKey),
    /// PEM text or the path to a PEM file.
    Raw(String),
}

impl Debug for KeyMaterial {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KeyMaterial::Parsed(k) => f.debug_tuple("Parsed").field(k).finish(),
            KeyMaterial::Raw(v) => f.debug_tuple("Raw").field(&Redact::from(v)).finish(),
        }
    }
}

impl From<PrivateKey> for KeyMaterial {
    fn from(key: PrivateKey) -> Self {
        KeyMaterial::Parsed(key)
    }
}

impl From<String> for KeyMaterial {
    fn from(v: String) -> Self {
        KeyMaterial::Raw(v)
    }
}

impl From<&str> for KeyMaterial {
    fn from(v: &str) -> Self {
        KeyMaterial::Raw(v.to_string())
    }
}

impl KeyMaterial {
    /// Resolve into a usable key.
    ///
    /// Raw values ending in `.pem`, or naming an existing file, are read
    /// from disk (`~` is expanded). Anything else is parsed as PEM text.
    pub fn resolve(&self, ctx: &Context) -> Result<PrivateKey> {
        let raw = match self {
            KeyMaterial::Parsed(k) => {
                debug!("private key is already parsed");
                return Ok(k.clone());
            }
            KeyMaterial::Raw(raw) => raw.trim(),
        };
        if raw.is_empty() {
            return Err(Error::key_invalid("no private key given"));
        }

        let path = ctx.expand_home_dir(raw);
        let is_file = path
            .as_deref()
            .is_some_and(|p| p.ends_with(".pem") || ctx.file_exists(p));

        match path {
            Some(path) if is_file => {
                debug!("private key is the path to a file: {path}");
                let content = ctx.file_read_as_string(&path).map_err(|e| {
                    Error::key_invalid(format!("failed to read private key file {path}"))
                        .with_source(e)
                })?;
                PrivateKey::from_pem(&content)
            }
            _ => {
                debug!("private key is the literal PEM text");
                PrivateKey::from_pem(raw)
            }
        }
    }
}

/// Resolve an optional key, failing if none is configured.
pub fn resolve_key(ctx: &Context, key: Option<&KeyMaterial>) -> Result<PrivateKey> {
    key.ok_or_else(|| Error::key_invalid("no private key given"))?
        .resolve(ctx)
}
