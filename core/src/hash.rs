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

//! Hash related utils.

use std::io::ErrorKind;
use std::io::Read;

use base64::prelude::BASE64_STANDARD;
use base64::Engine;
use sha1::Digest;
use sha1::Sha1;

/// Chunk size used while digesting streams.
const DIGEST_CHUNK_SIZE: usize = 1024;

/// Base64 encode
pub fn base64_encode(content: &[u8]) -> String {
    BASE64_STANDARD.encode(content)
}

/// Base64 encoded SHA1 hash.
///
/// The output never carries a trailing newline.
pub fn base64_sha1(content: &[u8]) -> String {
    base64_encode(Sha1::digest(content).as_slice())
}

/// Base64 encoded SHA1 hash of everything `r` yields until EOF.
///
/// The reader is consumed in small chunks so large files never sit in
/// memory. Callers own the cursor and must rewind it themselves.
pub fn base64_sha1_reader(r: &mut impl Read) -> std::io::Result<String> {
    let mut h = Sha1::new();
    let mut buf = [0u8; DIGEST_CHUNK_SIZE];

    loop {
        match r.read(&mut buf) {
            Ok(0) => break,
            Ok(n) => h.update(&buf[..n]),
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }

    Ok(base64_encode(h.finalize().as_slice()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_base64_sha1_empty() {
        assert_eq!(base64_sha1(b""), "2jmj7l5rSw0yVb/vlWAYkK/YBwk=");
    }

    #[test]
    fn test_base64_sha1_reader_matches_slice() {
        // Larger than one chunk so the loop runs more than once.
        let content = "knife cookbook upload ".repeat(200);

        let mut r = Cursor::new(content.as_bytes());
        let streamed = base64_sha1_reader(&mut r).unwrap();

        assert_eq!(streamed, base64_sha1(content.as_bytes()));
        assert_eq!(r.position() as usize, content.len());
    }

    #[test]
    fn test_base64_encode() {
        assert_eq!(base64_encode(b"chef"), "Y2hlZg==");
    }
}
