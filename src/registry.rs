//! Write-once registry mapping API identifiers to their descriptors.
//!
//! Descriptors are collected from [`DISCOVERED`], an explicit table of factories, when the
//! registry is first requested. After initialization the registry is never mutated, so
//! lookups borrow shared state without locking and may run from any number of threads.

// std
use std::sync::OnceLock;
// self
use crate::{
	_prelude::*,
	apis::heat,
	auth::ApiId,
	metadata::{ApiMetadata, ValidationError},
	obs::{self, BootstrapOutcome, BootstrapSpan, BootstrapStage},
};

/// Factory producing one discoverable descriptor.
pub type MetadataFactory = fn() -> Result<ApiMetadata, ValidationError>;

/// Descriptors published by this crate.
pub const DISCOVERED: &[MetadataFactory] = &[heat::metadata];

static GLOBAL: OnceLock<ApiRegistry> = OnceLock::new();

/// Errors raised by registry lookups.
#[derive(Clone, Debug, PartialEq, Eq, ThisError)]
pub enum NotFoundError {
	/// No descriptor is registered under the identifier.
	#[error("No API is registered under `{id}`.")]
	UnknownApi {
		/// Requested identifier.
		id: String,
	},
	/// A descriptor exists but serves a different version.
	#[error("API `{id}` is registered with version {available}, not {requested}.")]
	UnsupportedVersion {
		/// Requested identifier.
		id: String,
		/// Requested version.
		requested: String,
		/// Version the registered descriptor serves.
		available: String,
	},
}

/// Immutable identifier → descriptor map.
#[derive(Clone, Debug, Default)]
pub struct ApiRegistry {
	apis: HashMap<ApiId, Arc<ApiMetadata>>,
}
impl ApiRegistry {
	/// Builds a registry from descriptors, rejecting duplicate identifiers.
	pub fn from_metadata<I>(descriptors: I) -> Result<Self, ValidationError>
	where
		I: IntoIterator<Item = ApiMetadata>,
	{
		let mut apis = HashMap::new();

		for descriptor in descriptors {
			let id = descriptor.id.clone();

			if apis.insert(id.clone(), Arc::new(descriptor)).is_some() {
				return Err(ValidationError::DuplicateApi { id });
			}
		}

		Ok(Self { apis })
	}

	/// Builds a registry from every factory in [`DISCOVERED`].
	pub fn discover() -> Result<Self, ValidationError> {
		Self::discover_from(DISCOVERED)
	}

	/// Builds a registry from the provided factory table.
	pub fn discover_from(factories: &[MetadataFactory]) -> Result<Self, ValidationError> {
		const STAGE: BootstrapStage = BootstrapStage::Discover;

		let _guard = BootstrapSpan::new(STAGE, "discover").entered();

		obs::record_bootstrap_outcome(STAGE, BootstrapOutcome::Attempt);

		let result = factories
			.iter()
			.map(|factory| factory())
			.collect::<Result<Vec<_>, _>>()
			.and_then(Self::from_metadata);

		obs::record_bootstrap_outcome(STAGE, BootstrapOutcome::of(&result));

		result
	}

	/// Returns the process-wide registry, discovering it on first use.
	pub fn global() -> Result<&'static ApiRegistry, ValidationError> {
		if let Some(registry) = GLOBAL.get() {
			return Ok(registry);
		}

		let discovered = Self::discover()?;

		Ok(GLOBAL.get_or_init(|| discovered))
	}

	/// Returns the descriptor registered under `id`.
	pub fn lookup(&self, id: &str) -> Result<&Arc<ApiMetadata>, NotFoundError> {
		let result =
			self.apis.get(id).ok_or_else(|| NotFoundError::UnknownApi { id: id.to_owned() });

		obs::record_bootstrap_outcome(BootstrapStage::Lookup, BootstrapOutcome::of(&result));

		result
	}

	/// Returns the descriptor registered under `id` when it serves `version`.
	pub fn lookup_version(
		&self,
		id: &str,
		version: &str,
	) -> Result<&Arc<ApiMetadata>, NotFoundError> {
		let descriptor = self.lookup(id)?;

		if descriptor.version == version {
			Ok(descriptor)
		} else {
			Err(NotFoundError::UnsupportedVersion {
				id: id.to_owned(),
				requested: version.to_owned(),
				available: descriptor.version.clone(),
			})
		}
	}

	/// Returns true if `id` is registered.
	pub fn contains(&self, id: &str) -> bool {
		self.apis.contains_key(id)
	}

	/// Registered identifiers in sorted order.
	pub fn ids(&self) -> Vec<&ApiId> {
		let mut ids = self.apis.keys().collect::<Vec<_>>();

		ids.sort();

		ids
	}

	/// Iterator over registered descriptors (unordered).
	pub fn iter(&self) -> impl Iterator<Item = &Arc<ApiMetadata>> {
		self.apis.values()
	}

	/// Number of registered descriptors.
	pub fn len(&self) -> usize {
		self.apis.len()
	}

	/// Returns true if nothing is registered.
	pub fn is_empty(&self) -> bool {
		self.apis.is_empty()
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	fn broken() -> Result<ApiMetadata, ValidationError> {
		ApiMetadata::builder().build()
	}

	#[test]
	fn discovery_table_registers_heat() {
		let registry = ApiRegistry::discover().expect("Built-in discovery should succeed.");

		assert_eq!(registry.len(), DISCOVERED.len());
		assert!(registry.contains(heat::HEAT_API_ID));
	}

	#[test]
	fn discovery_surfaces_factory_failures() {
		let err = ApiRegistry::discover_from(&[heat::metadata, broken])
			.expect_err("A failing factory should abort discovery.");

		assert_eq!(err, ValidationError::MissingField { field: "id" });
	}

	#[test]
	fn duplicate_factories_are_rejected() {
		let err = ApiRegistry::discover_from(&[heat::metadata, heat::metadata])
			.expect_err("Duplicate identifiers should be rejected.");

		assert!(matches!(err, ValidationError::DuplicateApi { .. }));
	}

	#[test]
	fn global_registry_is_initialized_once() {
		let first = ApiRegistry::global().expect("Global registry should initialize.");
		let second = ApiRegistry::global().expect("Global registry should stay available.");

		assert!(std::ptr::eq(first, second));
		assert!(first.lookup(heat::HEAT_API_ID).is_ok());
	}

	#[test]
	fn lookup_version_distinguishes_versions() {
		let registry = ApiRegistry::discover().expect("Built-in discovery should succeed.");

		assert!(registry.lookup_version(heat::HEAT_API_ID, "1").is_ok());
		assert!(matches!(
			registry.lookup_version(heat::HEAT_API_ID, "2"),
			Err(NotFoundError::UnsupportedVersion { ref available, .. }) if available == "1"
		));
	}
}
