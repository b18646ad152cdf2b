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

use std::fmt::{Debug, Formatter};
use std::sync::Mutex;

use chefapi_core::{Context, Error, Result};
use log::debug;

use crate::key::{KeyMaterial, PrivateKey};

/// Credential that holds the client name and its private key.
#[derive(Clone)]
pub struct Credential {
    /// Name of the client (or user) that signs requests.
    pub client: String,
    /// Private key of the client.
    pub key: PrivateKey,
}

impl Debug for Credential {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credential")
            .field("client", &self.client)
            .field("key", &self.key)
            .finish()
    }
}

impl Credential {
    /// Create a credential from an already parsed key.
    pub fn new(client: impl Into<String>, key: PrivateKey) -> Self {
        Self {
            client: client.into(),
            key,
        }
    }

    /// Check if this credential can sign requests.
    pub fn is_valid(&self) -> bool {
        !self.client.is_empty()
    }
}

/// CredentialLoader resolves the configured client and key into a
/// [`Credential`] and keeps the parsed key until the key changes.
pub struct CredentialLoader {
    client: Option<String>,
    key: Option<KeyMaterial>,

    cache: Mutex<Option<PrivateKey>>,
}

impl Debug for CredentialLoader {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialLoader")
            .field("client", &self.client)
            .field("key", &self.key)
            .finish()
    }
}

impl CredentialLoader {
    /// Create a loader for `client` signing with `key`.
    pub fn new(client: Option<String>, key: Option<KeyMaterial>) -> Self {
        Self {
            client,
            key,
            cache: Mutex::new(None),
        }
    }

    /// Name of the client.
    pub fn client(&self) -> Option<&str> {
        self.client.as_deref()
    }

    /// Replace the client name.
    pub fn set_client(&mut self, client: impl Into<String>) {
        self.client = Some(client.into());
    }

    /// Replace the key and drop the cached one.
    pub fn set_key(&mut self, key: impl Into<KeyMaterial>) {
        self.key = Some(key.into());
        *self.cache.get_mut().unwrap_or_else(|e| e.into_inner()) = None;
    }

    /// Load the credential, resolving the key on first use.
    pub fn load(&self, ctx: &Context) -> Result<Credential> {
        let client = match self.client.as_deref() {
            Some(v) if !v.is_empty() => v,
            _ => return Err(Error::config_invalid("no client name given")),
        };

        let mut cache = self.cache.lock().unwrap_or_else(|e| e.into_inner());
        let key = match cache.as_ref() {
            Some(key) => key.clone(),
            None => {
                let key = self
                    .key
                    .as_ref()
                    .ok_or_else(|| Error::key_invalid("no private key given"))?
                    .resolve(ctx)?;
                debug!("resolved private key for client {client}");
                *cache = Some(key.clone());
                key
            }
        };

        Ok(Credential::new(client, key))
    }
}
