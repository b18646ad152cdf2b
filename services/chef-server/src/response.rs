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
use chefapi_core::{Error, Result};
use http::header::CONTENT_TYPE;
use http::Response;
use log::{debug, warn};
use serde::de::DeserializeOwned;
use serde_json::Value;

/// Decoded body of a successful response.
#[derive(Debug, Clone, PartialEq)]
pub enum ResponseBody {
    /// Body of a JSON response.
    Json(Value),
    /// Body of any other response, empty ones included.
    Text(String),
}

impl ResponseBody {
    /// The JSON value, if the server sent JSON.
    pub fn as_json(&self) -> Option<&Value> {
        match self {
            ResponseBody::Json(v) => Some(v),
            ResponseBody::Text(_) => None,
        }
    }

    /// The raw text, if the server sent anything but JSON.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            ResponseBody::Json(_) => None,
            ResponseBody::Text(v) => Some(v),
        }
    }

    /// Deserialize a JSON body into `T`.
    pub fn into_json<T: DeserializeOwned>(self) -> Result<T> {
        let value = match self {
            ResponseBody::Json(v) => v,
            ResponseBody::Text(v) => {
                return Err(Error::unexpected(format!(
                    "expected a json response, got: {v}"
                )))
            }
        };
        serde_json::from_value(value)
            .map_err(|e| Error::unexpected("failed to deserialize response").with_source(e))
    }
}

/// Classify a final response: decode 2xx, map everything else to an error.
pub fn parse_response(resp: Response<Bytes>) -> Result<ResponseBody> {
    let status = resp.status();
    if !status.is_success() {
        let message = error_message(resp.body(), is_json(&resp));
        debug!("server answered {status}: {message}");
        return Err(Error::from_status(status, message));
    }

    let body = resp.body();
    if body.is_empty() {
        return Ok(ResponseBody::Text(String::new()));
    }

    if is_json(&resp) {
        let value = serde_json::from_slice(body).map_err(|e| {
            Error::unexpected(format!("server answered {status} with invalid json")).with_source(e)
        })?;
        Ok(ResponseBody::Json(value))
    } else {
        Ok(ResponseBody::Text(String::from_utf8_lossy(body).into_owned()))
    }
}

fn is_json(resp: &Response<Bytes>) -> bool {
    let Some(content_type) = resp.headers().get(CONTENT_TYPE) else {
        warn!("response has no content type, treated as text");
        return false;
    };
    let Ok(content_type) = content_type.to_str() else {
        return false;
    };

    let essence = content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();
    essence == "application/json" || essence.ends_with("+json")
}

/// Best-effort message out of an error body.
///
/// Chef answers `{"error": ["..."]}` or `{"error": "..."}` in JSON bodies;
/// anything else is returned as text.
fn error_message(body: &[u8], json: bool) -> String {
    if json {
        if let Ok(value) = serde_json::from_slice::<Value>(body) {
            match value.get("error") {
                Some(Value::Array(v)) => {
                    if let Some(Value::String(s)) = v.first() {
                        return s.clone();
                    }
                }
                Some(Value::String(s)) => return s.clone(),
                _ => {}
            }
        }
    }

    String::from_utf8_lossy(body).trim().to_string()
}
