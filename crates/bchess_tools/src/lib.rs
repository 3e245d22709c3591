//! # Battle Chess Development Tools
//!
//! Command-line tools for development:
//! - Stat table validation
//! - Canonical stat table export

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic)]

pub mod validate;
