//! sealradio - back end for the seal radio site
//!
//! This library provides the HTTP service behind the site: a chat proxy to
//! the generative-language API and a deduplicated model catalog.

pub mod config;
pub mod error;
pub mod proxy;
pub mod upstream;

pub use config::Config;
pub use error::{Error, Result};
