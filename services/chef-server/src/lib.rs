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

//! Chef Server request signing and transport.
//!
//! Requests are authenticated with the `X-Ops-*` headers of the Chef Server
//! signing protocol (`algorithm=sha1;version=1.0`): the canonical request is
//! encrypted with the client's RSA private key and the base64 signature is
//! split over `X-Ops-Authorization-1..N`.
//!
//! [`Connection`] ties everything together. [`RequestSigner`] can also be
//! used on its own to sign requests sent by other means.

mod constants;

mod config;
pub use config::{Config, Flavor};

mod key;
pub use key::{resolve_key, KeyMaterial, PrivateKey};

mod credential;
pub use credential::{Credential, CredentialLoader};

mod sign_request;
pub use sign_request::{canonical_path, hashed_path, AuthHeaders, RequestSigner};

mod body;
pub use body::{FileStream, FormValue, RequestBody};

mod multipart;
pub use multipart::{Multipart, MultipartReader};

mod uri;
pub use uri::{resolve_location, resolve_uri};

mod response;
pub use response::{parse_response, ResponseBody};

mod connection;
pub use connection::Connection;
