//! Keystone v2.0 authentication: request bodies, access documents, the token endpoint
//! client, a caching token supplier, and service-catalog region resolution.

pub mod access;
pub mod client;
pub mod region;
pub mod request;
pub mod supplier;

pub use access::*;
pub use client::*;
pub use region::*;
pub use request::*;
pub use supplier::*;
