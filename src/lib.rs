pub mod config;
pub mod error;
pub mod grounding;
pub mod logging;
pub mod xrefs;

pub use config::{Config, GroundingConfig};
pub use error::XrefError;

pub const TARGET_WEB_REQUEST: &str = "web_request";
