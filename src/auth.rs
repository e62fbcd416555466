//! Identifiers, redacted secrets, and credential bindings shared across the registry and
//! the Keystone plumbing.

pub mod credential;
pub mod id;
pub mod secret;

pub use credential::*;
pub use id::*;
pub use secret::*;
