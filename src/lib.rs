//! Record sanitation pipeline: deduplicate, validate, scrub and store
//! vitals readings keyed by a palindromic identifier.

pub mod config;
pub mod data;
pub mod error;
pub mod pipeline;
pub mod service;
pub mod vault;

pub use config::{ScrubConfig, ZeroBaseline};
pub use error::IntegrityError;
pub use service::IntegrityService;
