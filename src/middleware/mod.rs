//! HTTP Middleware
//! Mission: Cross-cutting request plumbing (logging)

pub mod logging;

pub use logging::request_logging;
