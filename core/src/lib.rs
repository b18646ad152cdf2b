//! Core components for talking to the Chef Server API.
//!
//! This crate provides the foundational types and traits shared by the chefapi
//! workspace. It defines the seams that let a connection sign and send requests
//! without caring which file system, HTTP client or environment it runs on.
//!
//! ## Overview
//!
//! - **Context**: A container that holds implementations for file reading,
//!   HTTP sending and environment access
//! - **Body**: The payload of one HTTP exchange, either in memory or streamed with a known length
//! - **Error**: One error type whose [`ErrorKind`] tells key, URI, status
//!   and transport failures apart
//!
//! ## Example
//!
//! ```no_run
//! use chefapi_core::{Body, Context, OsEnv, Result};
//!
//! # fn example() -> Result<()> {
//! let ctx = Context::new().with_env(OsEnv);
//!
//! let req = http::Request::get("http://localhost:4000/nodes")
//!     .body(Body::Empty)?;
//!
//! // Fails until an `HttpSend` implementation is configured.
//! let resp = ctx.http_send(req)?;
//! println!("status: {}", resp.status());
//! # Ok(())
//! # }
//! ```
//!
//! ## Traits
//!
//! - [`FileRead`]: For blocking file reading
//! - [`HttpSend`]: For sending HTTP requests
//! - [`Env`]: For environment variable access
//!
//! ## Utilities
//!
//! - [`hash`]: Base64 and SHA-1 helpers used by request signing
//! - [`time`]: Time formatting helpers
//! - [`utils`]: General utilities including data redaction

// Make sure all our public APIs have docs.
#![warn(missing_docs)]

pub mod hash;
pub mod time;
pub mod utils;

mod body;
pub use body::Body;
mod context;
pub use context::{Context, Env, FileRead, HttpSend, NoopEnv, NoopFileRead, NoopHttpSend};
pub use context::{OsEnv, StaticEnv};
mod error;
pub use error::{Error, ErrorKind, Result};
