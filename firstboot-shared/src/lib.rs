//! Types shared across the firstboot crates.

pub mod errors;

pub use errors::{FirstbootError, FirstbootResult};
