//! Signed requests against the Chef Server API.
//!
//! ```no_run
//! use chefapi::chef_server::Config;
//!
//! # fn main() -> chefapi::Result<()> {
//! let conn = chefapi::connect(Config::default())?;
//! let nodes = conn.get("/nodes")?;
//! println!("{nodes:?}");
//! # Ok(())
//! # }
//! ```

pub use chefapi_core::*;

#[cfg(feature = "default-context")]
mod context;
#[cfg(feature = "default-context")]
pub use context::{connect, default_context};

/// Signing, bodies and the connection to a Chef Server.
pub mod chef_server {
    pub use chefapi_chef_server::*;
}
