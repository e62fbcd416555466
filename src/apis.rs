//! Built-in API descriptors published through the registry's discovery table.

pub mod heat;
