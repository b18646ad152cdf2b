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

use super::{credential, fixed_signer, testdata, USER, USER_PKCS8_PEM};
use anyhow::Result;
use chefapi_chef_server::{Credential, FileStream, FormValue, PrivateKey, RequestBody};
use http::Method;
use pretty_assertions::assert_eq;

/// Headers recorded for `GET /foo/bar` with an empty body.
pub const GET_FOO_BAR: &[(&str, &str)] = &[
    ("X-Ops-Sign", "algorithm=sha1;version=1.0;"),
    ("X-Ops-Userid", "sethvargo"),
    ("X-Ops-Timestamp", "1991-07-23T03:00:54Z"),
    ("X-Ops-Content-Hash", "2jmj7l5rSw0yVb/vlWAYkK/YBwk="),
    (
        "X-Ops-Authorization-1",
        "2Z6mRyDDdi6FZNHnlRztrUOJqAP5AUSzm1RH4ErAvkz2eHSMEZW1NQ+2nUIU",
    ),
    (
        "X-Ops-Authorization-2",
        "7CQ/XnGNtqM1nYX/0XuAPRIlxKO5OS5NIOjw/pFEoq0d6wlxHFe8ZGC6WHjp",
    ),
    (
        "X-Ops-Authorization-3",
        "k6hAZ8SH4qQSpO23foLh2D5/HgDGEDn9KsiSaDnOz7ljSnLjF3dCz0USKrxG",
    ),
    (
        "X-Ops-Authorization-4",
        "6A9bFnuuOpcrpkNzquiGq4PvAUaCZnwfITqbUI/7raL4hAZjheJtohsC7pyp",
    ),
    (
        "X-Ops-Authorization-5",
        "rwdV+FojapjGNxEB1yLFf4rtiQ2mY+gHpG0qh5hB6ituZgbUDIimtZuTr2AL",
    ),
    (
        "X-Ops-Authorization-6",
        "EOY1k9p+MOG04IjzPJyLmXSMnVLCfZkuQf3KCtDQJg==",
    ),
];

pub const POST_FOO_BAR_BODY: &str = r#"{"name":"web1","run_list":["recipe[apache2]"]}"#;

/// Headers recorded for `POST /foo/bar` with [`POST_FOO_BAR_BODY`].
pub const POST_FOO_BAR: &[(&str, &str)] = &[
    ("X-Ops-Sign", "algorithm=sha1;version=1.0;"),
    ("X-Ops-Userid", "sethvargo"),
    ("X-Ops-Timestamp", "1991-07-23T03:00:54Z"),
    ("X-Ops-Content-Hash", "uBnR/2gagwwmIX8ptD5lEm+I55s="),
    (
        "X-Ops-Authorization-1",
        "1OmqqVXsRzQDS60NSBLIlXtdeTNnKN8oxkAo1rCkFeLrxpevnmA8WuRMBaze",
    ),
    (
        "X-Ops-Authorization-2",
        "VK16o2dznjQPN9da7uiQ61kdQdCPHpUUufdE4nP/YlzwWRV362nWJBC49rM0",
    ),
    (
        "X-Ops-Authorization-3",
        "ceftQiqgK+OwXGeGUQHz/3cNOXElOb5zP1niDmOKY8UDogU3B+hnY6k6C5ZT",
    ),
    (
        "X-Ops-Authorization-4",
        "ZaqRYKRcZnzTfUJWYUGHHNLmUA3D8WA6gxeKa9rhFWkA5zPKmR68djPxmwG2",
    ),
    (
        "X-Ops-Authorization-5",
        "RQZyH4RgxqSeZYH9zFkhtmL8nC0WJSfBiaxSRAExdxcXjVyL+S3pihX+0Xb6",
    ),
    (
        "X-Ops-Authorization-6",
        "uVRFo8zd8FnjW0nPahH19xbNiUAN8TSwF1xtRX+gkg==",
    ),
];

/// Headers recorded for `PUT /cookbooks/demo` streaming `testdata/metadata.rb`.
pub const PUT_COOKBOOK: &[(&str, &str)] = &[
    ("X-Ops-Sign", "algorithm=sha1;version=1.0;"),
    ("X-Ops-Userid", "sethvargo"),
    ("X-Ops-Timestamp", "1991-07-23T03:00:54Z"),
    ("X-Ops-Content-Hash", "Y3A4s+wb+L+uh/7O8qv5xnWlVtc="),
    (
        "X-Ops-Authorization-1",
        "RvCBxZQc6fX6bY44Qv72tcrDdwfA7TayqZJzfL5IBjqxdIzlhdLk60m3nd0Q",
    ),
    (
        "X-Ops-Authorization-2",
        "glGRnpWjUCmnz7RtRPX+EPz8GC6kfvpJsYIZwOI2L2F0ssikqjd5BJRNF22j",
    ),
    (
        "X-Ops-Authorization-3",
        "ltlfGoRcIm9obSHoa+/zciZjFksNpuM2VF4QSGG+5jTlwPwcJCppA+VrKQ9M",
    ),
    (
        "X-Ops-Authorization-4",
        "fLgpU2xBqY1Yk7VH8s4DK9Z4VG7BG4diyKE6QcyZuPrIDAHQJHg49NM8DEPQ",
    ),
    (
        "X-Ops-Authorization-5",
        "av6IALudlcUQ5euRY1Hy5/bwuR8x1tCUipAWuykM7S+W3iyFlcRqvzcPSOIT",
    ),
    (
        "X-Ops-Authorization-6",
        "xoHHESg0aeYBL5sbK37cpz/0v/5n7k72+ymyG7wIyQ==",
    ),
];

fn sign(
    cred: &Credential,
    method: Method,
    path: &str,
    body: &RequestBody,
) -> Result<Vec<(String, String)>> {
    let content_hash = body.content_hash(false)?;
    let headers = fixed_signer().sign(cred, &method, path, &content_hash)?;
    Ok(headers
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect())
}

fn owned(fixture: &[(&str, &str)]) -> Vec<(String, String)> {
    fixture
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

#[test]
fn test_get_fixture() -> Result<()> {
    let headers = sign(&credential(), Method::GET, "/foo/bar", &RequestBody::Empty)?;
    assert_eq!(headers, owned(GET_FOO_BAR));
    Ok(())
}

#[test]
fn test_post_fixture() -> Result<()> {
    let body = RequestBody::from(POST_FOO_BAR_BODY);
    let headers = sign(&credential(), Method::POST, "/foo/bar", &body)?;
    assert_eq!(headers, owned(POST_FOO_BAR));
    Ok(())
}

#[test]
fn test_put_stream_fixture() -> Result<()> {
    let stream = FileStream::open(testdata("metadata.rb"))?;
    let body = RequestBody::from(stream.clone());

    let headers = sign(&credential(), Method::PUT, "/cookbooks/demo", &body)?;
    assert_eq!(headers, owned(PUT_COOKBOOK));

    // Hashing left the stream where the caller had it.
    let mut content = String::new();
    std::io::Read::read_to_string(&mut stream.reader()?, &mut content)?;
    assert_eq!(content, std::fs::read_to_string(testdata("metadata.rb"))?);
    Ok(())
}

#[test]
fn test_multipart_signs_file_part_only() -> Result<()> {
    let stream = FileStream::open(testdata("metadata.rb"))?;
    let body = RequestBody::form([
        ("name", FormValue::from("demo")),
        ("tarball", FormValue::from(stream)),
    ]);

    let headers = sign(&credential(), Method::PUT, "/cookbooks/demo", &body)?;
    assert_eq!(headers, owned(PUT_COOKBOOK));
    Ok(())
}

#[test]
fn test_pkcs8_key_signs_the_same() -> Result<()> {
    let cred = Credential::new(USER, PrivateKey::from_pem(USER_PKCS8_PEM)?);
    let headers = sign(&cred, Method::GET, "/foo/bar", &RequestBody::Empty)?;
    assert_eq!(headers, owned(GET_FOO_BAR));
    Ok(())
}

#[test]
fn test_path_is_canonicalized() -> Result<()> {
    let headers = sign(&credential(), Method::GET, "//foo///bar//", &RequestBody::Empty)?;
    assert_eq!(headers, owned(GET_FOO_BAR));
    Ok(())
}

#[test]
fn test_verb_is_case_insensitive() -> Result<()> {
    let method = Method::from_bytes(b"get")?;
    let headers = sign(&credential(), method, "/foo/bar", &RequestBody::Empty)?;
    assert_eq!(headers, owned(GET_FOO_BAR));
    Ok(())
}
