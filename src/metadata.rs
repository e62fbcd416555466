//! API descriptor data structures and helpers shared by the registry and context bootstrap.
//!
//! The module exposes the immutable [`ApiMetadata`] record, its validating builder,
//! placeholder templates for identities and credentials, and the string property maps
//! that carry defaults into client construction.

/// Builder API for assembling API descriptors.
pub mod builder;
/// Default and override property maps.
pub mod properties;
/// Identity and credential placeholder templates.
pub mod template;

pub use builder::*;
pub use properties::*;
pub use template::*;

// self
use crate::{
	_prelude::*,
	auth::{ApiId, ModuleId},
};

/// Immutable descriptor identifying one API client variant.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiMetadata {
	/// Registry-unique identifier.
	pub id: ApiId,
	/// Human-readable API name.
	pub name: String,
	/// API version served by this descriptor.
	pub version: String,
	/// Human-readable description of the expected endpoint.
	pub endpoint_name: String,
	/// Endpoint used when the caller supplies none.
	pub default_endpoint: Url,
	/// Shape of the caller identity (e.g. `${tenantName}:${userName}`).
	pub identity_template: Template,
	/// Shape of the caller credential (e.g. `${password}`).
	pub credential_template: Template,
	/// Link to the API's documentation.
	pub documentation: Option<Url>,
	/// Properties applied when the caller does not override them.
	pub default_properties: Properties,
	/// Modules installed, in order, when a client context is built.
	pub default_modules: Vec<ModuleId>,
}
impl ApiMetadata {
	/// Creates an empty builder.
	pub fn builder() -> ApiMetadataBuilder {
		ApiMetadataBuilder::new()
	}

	/// Creates a builder seeded with every field of this descriptor.
	pub fn to_builder(&self) -> ApiMetadataBuilder {
		ApiMetadataBuilder::from_existing(self)
	}

	/// Checks whether the descriptor installs the named module.
	pub fn uses_module(&self, module: &str) -> bool {
		self.default_modules.iter().any(|id| **id == *module)
	}
}
