//! Lookup table resolving module identifiers to module implementations.

// self
use crate::{
	_prelude::*,
	auth::ModuleId,
	module::{
		ApiModule, AuthenticationApiModule, DependencyError, HeatHttpApiModule,
		KeystoneAuthenticationModule, KeystoneRegionModule,
	},
};

/// Module implementations keyed by identifier.
#[derive(Clone, Default)]
pub struct ModuleCatalog {
	modules: HashMap<ModuleId, Arc<dyn ApiModule>>,
}
impl ModuleCatalog {
	/// Creates an empty catalog.
	pub fn new() -> Self {
		Self::default()
	}

	/// Catalog holding every module shipped with the crate.
	pub fn builtin() -> Self {
		Self::new()
			.with_module(AuthenticationApiModule::default())
			.with_module(KeystoneAuthenticationModule::default())
			.with_module(KeystoneRegionModule::default())
			.with_module(HeatHttpApiModule::default())
	}

	/// Adds (or replaces) a module.
	pub fn with_module(mut self, module: impl ApiModule + 'static) -> Self {
		self.register(Arc::new(module));

		self
	}

	/// Adds (or replaces) a shared module, returning the module it displaced.
	pub fn register(&mut self, module: Arc<dyn ApiModule>) -> Option<Arc<dyn ApiModule>> {
		self.modules.insert(module.id().clone(), module)
	}

	/// Resolves `id` to its module.
	pub fn resolve(&self, id: &ModuleId) -> Result<&Arc<dyn ApiModule>, DependencyError> {
		self.modules.get(id).ok_or_else(|| DependencyError::UnknownModule { module: id.clone() })
	}

	/// Returns true if `id` is available.
	pub fn contains(&self, id: &str) -> bool {
		self.modules.contains_key(id)
	}

	/// Number of modules.
	pub fn len(&self) -> usize {
		self.modules.len()
	}

	/// Returns true if the catalog is empty.
	pub fn is_empty(&self) -> bool {
		self.modules.is_empty()
	}
}
impl Debug for ModuleCatalog {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		let mut ids = self.modules.keys().collect::<Vec<_>>();

		ids.sort();

		f.debug_struct("ModuleCatalog").field("modules", &ids).finish()
	}
}
