//! API constants
//!
//! Every proxy route lives under this prefix; the browser client hardcodes
//! it, so it is not configurable.

pub const API_PREFIX: &str = "/api";
