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

use super::{fixed_signer, testdata, USER, USER_PEM};
use crate::signing::{GET_FOO_BAR, POST_FOO_BAR, POST_FOO_BAR_BODY, PUT_COOKBOOK};
use anyhow::Result;
use chefapi_chef_server::{
    Config, Connection, FileStream, FormValue, Multipart, RequestBody, ResponseBody,
};
use chefapi_core::{Context, ErrorKind};
use chefapi_file_read_std::StdFileRead;
use chefapi_http_send_reqwest::ReqwestHttpSend;
use httpmock::Method::{DELETE, GET, POST, PUT};
use httpmock::MockServer;
use serde_json::json;

fn connect(endpoint: &str) -> Connection {
    let _ = env_logger::builder().is_test(true).try_init();

    let ctx = Context::new()
        .with_file_read(StdFileRead)
        .with_http_send(ReqwestHttpSend::builder().build().unwrap());
    let config = Config {
        endpoint: Some(endpoint.to_string()),
        client: Some(USER.to_string()),
        key: Some(USER_PEM.to_string()),
        ..Default::default()
    };
    Connection::new(ctx, &config).with_signer(fixed_signer())
}

#[test]
fn test_get_sends_recorded_headers() -> Result<()> {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        let mut when = when
            .method(GET)
            .path("/foo/bar")
            .header("accept", "application/json")
            .header("content-type", "application/json")
            .header("x-chef-version", "11.4.0");
        for (k, v) in GET_FOO_BAR {
            when = when.header(k.to_ascii_lowercase(), *v);
        }
        then.status(200)
            .header("content-type", "application/json")
            .body(r#"{"web1":"http://chef/nodes/web1"}"#);
    });

    let body = connect(&server.base_url()).get("/foo/bar")?;

    mock.assert();
    assert_eq!(
        body,
        ResponseBody::Json(json!({"web1": "http://chef/nodes/web1"}))
    );
    Ok(())
}

#[test]
fn test_post_json_body() -> Result<()> {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        let mut when = when.method(POST).path("/foo/bar").body(POST_FOO_BAR_BODY);
        for (k, v) in POST_FOO_BAR {
            when = when.header(k.to_ascii_lowercase(), *v);
        }
        then.status(201)
            .header("content-type", "application/json")
            .body(r#"{"uri":"http://chef/nodes/web1"}"#);
    });

    let body = connect(&server.base_url()).post("/foo/bar", POST_FOO_BAR_BODY)?;

    mock.assert();
    assert_eq!(body.as_json().unwrap()["uri"], "http://chef/nodes/web1");
    Ok(())
}

#[test]
fn test_put_streams_file() -> Result<()> {
    let content = std::fs::read_to_string(testdata("metadata.rb"))?;

    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        let mut when = when
            .method(PUT)
            .path("/cookbooks/demo")
            .header("content-length", content.len().to_string())
            .body(content.clone());
        for (k, v) in PUT_COOKBOOK {
            when = when.header(k.to_ascii_lowercase(), *v);
        }
        then.status(200);
    });

    let stream = FileStream::open(testdata("metadata.rb"))?;
    connect(&server.base_url()).put("/cookbooks/demo", stream)?;

    mock.assert();
    Ok(())
}

#[test]
fn test_multipart_upload_length_matches_body() -> Result<()> {
    let fields = vec![
        ("name".to_string(), FormValue::from("demo")),
        (
            "tarball".to_string(),
            FormValue::from(FileStream::open(testdata("metadata.rb"))?),
        ),
    ];
    let multipart = Multipart::new(&fields);
    let mut expected = Vec::new();
    std::io::Read::read_to_end(&mut multipart.reader(), &mut expected)?;
    assert_eq!(expected.len() as u64, multipart.content_length());

    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method(POST)
            .path("/sandboxes")
            .header(
                "content-type",
                "multipart/form-data; boundary=------ChefAPIMultipartBoundary",
            )
            .header("content-length", expected.len().to_string())
            .header("x-ops-content-hash", "Y3A4s+wb+L+uh/7O8qv5xnWlVtc=")
            .body(String::from_utf8(expected.clone()).unwrap());
        then.status(201);
    });

    connect(&server.base_url()).post("/sandboxes", RequestBody::Form(fields))?;

    mock.assert();
    Ok(())
}

#[test]
fn test_get_with_params() -> Result<()> {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method(GET)
            .path("/organizations/acme/search/node")
            .query_param("q", "name:web*")
            .query_param("rows", "5");
        then.status(200)
            .header("content-type", "application/json")
            .body(r#"{"total":0,"rows":[]}"#);
    });

    let conn = connect(&server.url("/organizations/acme"));
    let body = conn.perform(
        http::Method::GET,
        "search/node",
        &RequestBody::Empty,
        &[("q", "name:web*"), ("rows", "5")],
    )?;

    mock.assert();
    assert_eq!(body.as_json().unwrap()["total"], 0);
    Ok(())
}

#[test]
fn test_error_statuses() -> Result<()> {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/nodes/missing");
        then.status(404)
            .header("content-type", "application/json")
            .body(r#"{"error":["Cannot load node missing"]}"#);
    });
    server.mock(|when, then| {
        when.method(GET).path("/nodes/secret");
        then.status(401)
            .header("content-type", "application/json")
            .body(r#"{"error":"Failed to authenticate as sethvargo"}"#);
    });
    server.mock(|when, then| {
        when.method(DELETE).path("/nodes/broken");
        then.status(500).body("Internal Server Error");
    });
    let conn = connect(&server.base_url());

    let err = conn.get("/nodes/missing").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);
    assert!(err.is_not_found());
    assert_eq!(err.message(), "Cannot load node missing");

    let err = conn.get("/nodes/secret").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Unauthorized);
    assert_eq!(err.message(), "Failed to authenticate as sethvargo");

    let err = conn.delete("/nodes/broken").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::ServerUnavailable);
    assert_eq!(err.status(), Some(http::StatusCode::INTERNAL_SERVER_ERROR));
    assert!(err.is_retryable());
    Ok(())
}

#[test]
fn test_connection_refused() {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let err = connect(&format!("http://{addr}")).get("/nodes").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::ServerUnavailable);
    assert_eq!(err.status(), None);
}

#[test]
fn test_follows_one_redirect() -> Result<()> {
    let server = MockServer::start();
    let moved = server.mock(|when, then| {
        when.method(GET).path("/organizations/acme/nodes");
        then.status(301)
            .header("location", "/organizations/acme2/nodes");
    });
    let target = server.mock(|when, then| {
        when.method(GET)
            .path("/organizations/acme2/nodes")
            .header_exists("x-ops-authorization-1");
        then.status(200)
            .header("content-type", "application/json")
            .body("{}");
    });

    let body = connect(&server.base_url()).get("/organizations/acme/nodes")?;

    moved.assert();
    target.assert();
    assert_eq!(body, ResponseBody::Json(json!({})));
    Ok(())
}

#[test]
fn test_redirect_to_relative_location() -> Result<()> {
    let server = MockServer::start();
    let moved = server.mock(|when, then| {
        when.method(GET).path("/organizations/acme/nodes/web1");
        then.status(302).header("location", "../roles/web");
    });
    let target = server.mock(|when, then| {
        when.method(GET)
            .path("/organizations/acme/roles/web")
            .header_exists("x-ops-authorization-1");
        then.status(200)
            .header("content-type", "application/json")
            .body(r#"{"name":"web"}"#);
    });

    let body = connect(&server.base_url()).get("/organizations/acme/nodes/web1")?;

    moved.assert();
    target.assert();
    assert_eq!(body.as_json().unwrap()["name"], "web");
    Ok(())
}

#[test]
fn test_redirect_replays_stream() -> Result<()> {
    let content = std::fs::read_to_string(testdata("metadata.rb"))?;

    let server = MockServer::start();
    let moved = server.mock(|when, then| {
        when.method(PUT).path("/cookbooks/demo");
        then.status(307).header("location", "/cookbooks/demo2");
    });
    let target = server.mock(|when, then| {
        when.method(PUT).path("/cookbooks/demo2").body(content.clone());
        then.status(200);
    });

    let stream = FileStream::open(testdata("metadata.rb"))?;
    connect(&server.base_url()).put("/cookbooks/demo", stream)?;

    moved.assert();
    target.assert();
    Ok(())
}

#[test]
fn test_chained_redirects_stop_after_one_hop() {
    let server = MockServer::start();
    let first = server.mock(|when, then| {
        when.method(GET).path("/a");
        then.status(302).header("location", "/b");
    });
    let second = server.mock(|when, then| {
        when.method(GET).path("/b");
        then.status(302).header("location", "/c");
    });
    let third = server.mock(|when, then| {
        when.method(GET).path("/c");
        then.status(200).body("unreachable");
    });

    let err = connect(&server.base_url()).get("/a").unwrap_err();

    assert_eq!(err.kind(), ErrorKind::UnrecognizedStatus);
    assert_eq!(err.status(), Some(http::StatusCode::FOUND));
    first.assert_hits(1);
    second.assert_hits(1);
    third.assert_hits(0);
}
