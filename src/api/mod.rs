//! HTTP routing, request parsing and response building

pub mod handler;
pub mod helpers;
pub mod parsing;

pub use handler::{build_app, router};
