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

use percent_encoding::{AsciiSet, NON_ALPHANUMERIC};

// Headers used in signed requests.
pub const X_OPS_SIGN: &str = "X-Ops-Sign";
pub const X_OPS_USERID: &str = "X-Ops-Userid";
pub const X_OPS_TIMESTAMP: &str = "X-Ops-Timestamp";
pub const X_OPS_CONTENT_HASH: &str = "X-Ops-Content-Hash";
pub const X_OPS_AUTHORIZATION: &str = "X-Ops-Authorization";
pub const X_CHEF_VERSION: &str = "X-Chef-Version";

/// Value of `X-Ops-Sign` for the sha1 signing protocol.
pub const SIGNATURE: &str = "algorithm=sha1;version=1.0;";

/// Width of one `X-Ops-Authorization-N` line.
pub const AUTHORIZATION_LINE_WIDTH: usize = 60;

/// Boundary shared by every multipart body.
pub const MULTIPART_BOUNDARY: &str = "------ChefAPIMultipartBoundary";

pub const APPLICATION_JSON: &str = "application/json";
pub const APPLICATION_OCTET_STREAM: &str = "application/octet-stream";

// Defaults
pub const DEFAULT_ENDPOINT: &str = "http://localhost:4000/";
pub const DEFAULT_CHEF_VERSION: &str = "11.4.0";
pub const DEFAULT_USER_AGENT: &str = concat!("chefapi-rust/", env!("CARGO_PKG_VERSION"));
pub const DEFAULT_CONFIG_PATH: &str = "~/.chef-api";

// Env values used in chefapi
pub const CHEFAPI_CONFIG: &str = "CHEFAPI_CONFIG";
pub const CHEFAPI_ENDPOINT: &str = "CHEFAPI_ENDPOINT";
pub const CHEFAPI_FLAVOR: &str = "CHEFAPI_FLAVOR";
pub const CHEFAPI_CLIENT: &str = "CHEFAPI_CLIENT";
pub const CHEFAPI_KEY: &str = "CHEFAPI_KEY";
pub const CHEFAPI_PROXY_ADDRESS: &str = "CHEFAPI_PROXY_ADDRESS";
pub const CHEFAPI_PROXY_PORT: &str = "CHEFAPI_PROXY_PORT";
pub const CHEFAPI_PROXY_USERNAME: &str = "CHEFAPI_PROXY_USERNAME";
pub const CHEFAPI_PROXY_PASSWORD: &str = "CHEFAPI_PROXY_PASSWORD";
pub const CHEFAPI_SSL_PEM_FILE: &str = "CHEFAPI_SSL_PEM_FILE";
pub const CHEFAPI_SSL_VERIFY: &str = "CHEFAPI_SSL_VERIFY";
pub const CHEFAPI_READ_TIMEOUT: &str = "CHEFAPI_READ_TIMEOUT";
pub const CHEFAPI_USER_AGENT: &str = "CHEFAPI_USER_AGENT";

/// AsciiSet for query keys and values.
///
/// Everything except `A-Z a-z 0-9 - _ . ~` gets percent encoded.
pub static QUERY_ENCODE_SET: AsciiSet = NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~');
