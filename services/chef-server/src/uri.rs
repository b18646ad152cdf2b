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

use chefapi_core::{Error, Result};
use http::{Method, Uri};
use log::{debug, warn};
use percent_encoding::utf8_percent_encode;
use url::Url;

use crate::constants::QUERY_ENCODE_SET;

/// Build the URI of a request.
///
/// Absolute `path`s are used as is; relative ones are appended to
/// `endpoint` with a single `/` in between and no re-encoding. `params` are
/// only sent for GET and DELETE.
pub fn resolve_uri<K, V>(
    endpoint: &str,
    method: &Method,
    path: &str,
    params: &[(K, V)],
) -> Result<Uri>
where
    K: AsRef<str>,
    V: AsRef<str>,
{
    let mut url = if is_absolute(path) {
        path.to_string()
    } else {
        let base: Uri = endpoint.parse().map_err(|e| {
            Error::uri_invalid(format!("endpoint {endpoint} is not a valid uri")).with_source(e)
        })?;
        if base.scheme().is_none() || base.authority().is_none() {
            return Err(Error::uri_invalid(format!(
                "endpoint {endpoint} must be an absolute uri"
            )));
        }
        join(endpoint, path)
    };

    if !params.is_empty() {
        if matches!(*method, Method::GET | Method::DELETE) {
            url.push(if url.contains('?') { '&' } else { '?' });
            url.push_str(&query_string(params));
        } else {
            warn!("ignoring query params for {method} {url}");
        }
    }

    let uri: Uri = url
        .parse()
        .map_err(|e| Error::uri_invalid(format!("{url} is not a valid uri")).with_source(e))?;
    debug!("resolved uri: {uri}");
    Ok(uri)
}

/// Resolve a redirect `Location` against the URI that answered it.
///
/// Relative references follow RFC 3986: `?q` keeps the current path, `//host/x`
/// keeps the current scheme, and dot segments are removed.
pub fn resolve_location(current: &Uri, location: &str) -> Result<Uri> {
    let base = Url::parse(&current.to_string()).map_err(|e| {
        Error::uri_invalid(format!("{current} is not an absolute uri")).with_source(e)
    })?;
    let next = base.join(location).map_err(|e| {
        Error::uri_invalid(format!("redirect location {location} is not a valid uri"))
            .with_source(e)
    })?;

    next.as_str().parse().map_err(|e| {
        Error::uri_invalid(format!("redirect location {next} is not a valid uri")).with_source(e)
    })
}

fn is_absolute(path: &str) -> bool {
    path.parse::<Uri>()
        .is_ok_and(|u| u.scheme().is_some() && u.authority().is_some())
}

fn join(endpoint: &str, path: &str) -> String {
    let endpoint = endpoint.trim_end_matches('/');
    let path = path.trim_start_matches('/');
    if path.is_empty() {
        format!("{endpoint}/")
    } else {
        format!("{endpoint}/{path}")
    }
}

fn query_string<K: AsRef<str>, V: AsRef<str>>(params: &[(K, V)]) -> String {
    params
        .iter()
        .map(|(k, v)| {
            format!(
                "{}={}",
                utf8_percent_encode(k.as_ref(), &QUERY_ENCODE_SET),
                utf8_percent_encode(v.as_ref(), &QUERY_ENCODE_SET)
            )
        })
        .collect::<Vec<_>>()
        .join("&")
}
