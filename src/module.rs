//! Capability modules and the ordered composition that wires them into a client context.
//!
//! A descriptor lists modules by [`ModuleId`]; composition resolves each id through a
//! [`ModuleCatalog`], checks that every capability the module requires was provided by an
//! earlier module, and lets the module install its provider into the shared
//! [`ModuleContext`]. Installation is synchronous and never touches the network: providers
//! that need Keystone defer the call until first use.

pub mod builtin;
pub mod catalog;

pub use builtin::*;
pub use catalog::*;

// self
use crate::{
	_prelude::*,
	auth::{CredentialBindings, ModuleId},
	keystone::{AuthenticationApi, RegionResolver, TokenSupplier},
	metadata::{ApiMetadata, Properties},
	obs::{self, BootstrapOutcome, BootstrapSpan, BootstrapStage},
	transport::ApiTransport,
};

/// Capabilities a module may provide or require.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Capability {
	/// Client for the identity service's token endpoint.
	AuthenticationApi,
	/// Cached authenticated session (token supplier).
	Authentication,
	/// Region resolution over the service catalog.
	Region,
	/// Authorized HTTP transport for the API itself.
	Transport,
}
impl Capability {
	/// Returns a stable label.
	pub const fn as_str(self) -> &'static str {
		match self {
			Capability::AuthenticationApi => "authentication_api",
			Capability::Authentication => "authentication",
			Capability::Region => "region",
			Capability::Transport => "transport",
		}
	}
}
impl Display for Capability {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Errors raised while composing modules.
#[derive(Clone, Debug, PartialEq, Eq, ThisError)]
pub enum DependencyError {
	/// The catalog has no module under the listed id.
	#[error("Module `{module}` is not available in the module catalog.")]
	UnknownModule {
		/// Unresolved module identifier.
		module: ModuleId,
	},
	/// A module was listed before the module providing its prerequisite.
	#[error(
		"Module `{module}` requires the {requires} capability, which no earlier module provides."
	)]
	MissingPrerequisite {
		/// Module whose prerequisite is absent.
		module: ModuleId,
		/// Missing capability.
		requires: Capability,
	},
	/// A module finished installing without providing its declared capability.
	#[error("Module `{module}` did not provide the {capability} capability.")]
	NotProvided {
		/// Offending module.
		module: ModuleId,
		/// Capability the module declared.
		capability: Capability,
	},
	/// The composed set lacks a capability the client context needs.
	#[error("No module provides the {capability} capability.")]
	MissingCapability {
		/// Missing capability.
		capability: Capability,
	},
}

/// A named capability provider installed during composition.
///
/// Implementations are stateless factories: `install` reads configuration and earlier
/// providers from the context and stores the provider for [`provides`](Self::provides).
pub trait ApiModule
where
	Self: Send + Sync + Debug,
{
	/// Identifier referenced by descriptor module lists.
	fn id(&self) -> &ModuleId;

	/// Capability this module installs.
	fn provides(&self) -> Capability;

	/// Capabilities that must be installed before this module.
	fn requires(&self) -> &[Capability] {
		&[]
	}

	/// Installs the module's provider into `ctx`.
	fn install(&self, ctx: &mut ModuleContext) -> Result<()>;
}

/// Shared state handed to each module in list order.
pub struct ModuleContext {
	/// Descriptor being composed.
	pub metadata: Arc<ApiMetadata>,
	/// Effective properties (descriptor defaults merged with caller overrides).
	pub properties: Properties,
	/// Effective endpoint.
	pub endpoint: Url,
	/// Caller credentials, when supplied.
	pub credentials: Option<CredentialBindings>,
	/// Provider for [`Capability::AuthenticationApi`].
	pub authentication_api: Option<Arc<dyn AuthenticationApi>>,
	/// Provider for [`Capability::Authentication`].
	pub token_supplier: Option<Arc<TokenSupplier>>,
	/// Provider for [`Capability::Region`].
	pub region_resolver: Option<Arc<RegionResolver>>,
	/// Provider for [`Capability::Transport`].
	pub transport: Option<Arc<ApiTransport>>,
	installed: Vec<ModuleId>,
}
impl ModuleContext {
	/// Creates an empty context for `metadata`.
	pub fn new(
		metadata: Arc<ApiMetadata>,
		properties: Properties,
		endpoint: Url,
		credentials: Option<CredentialBindings>,
	) -> Self {
		Self {
			metadata,
			properties,
			endpoint,
			credentials,
			authentication_api: None,
			token_supplier: None,
			region_resolver: None,
			transport: None,
			installed: Vec::new(),
		}
	}

	/// Returns true once a provider for `capability` is installed.
	pub fn provides(&self, capability: Capability) -> bool {
		match capability {
			Capability::AuthenticationApi => self.authentication_api.is_some(),
			Capability::Authentication => self.token_supplier.is_some(),
			Capability::Region => self.region_resolver.is_some(),
			Capability::Transport => self.transport.is_some(),
		}
	}

	/// Modules installed so far, in installation order.
	pub fn installed(&self) -> &[ModuleId] {
		&self.installed
	}
}
impl Debug for ModuleContext {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("ModuleContext")
			.field("api", &self.metadata.id)
			.field("endpoint", &self.endpoint.as_str())
			.field("credentials", &self.credentials)
			.field("installed", &self.installed)
			.finish()
	}
}

/// Installs the descriptor's modules into `ctx` in list order.
///
/// Fails with [`DependencyError`] when a module is unknown, when a prerequisite has not been
/// provided by an earlier module, or when no module provides a transport.
pub fn compose(catalog: &ModuleCatalog, mut ctx: ModuleContext) -> Result<ModuleContext> {
	const STAGE: BootstrapStage = BootstrapStage::Compose;

	let _guard = BootstrapSpan::new(STAGE, "compose").entered();

	obs::record_bootstrap_outcome(STAGE, BootstrapOutcome::Attempt);

	let result = install_all(catalog, &mut ctx);

	obs::record_bootstrap_outcome(STAGE, BootstrapOutcome::of(&result));

	result.map(|()| ctx)
}

fn install_all(catalog: &ModuleCatalog, ctx: &mut ModuleContext) -> Result<()> {
	let modules = ctx.metadata.default_modules.clone();

	for id in modules {
		let module = catalog.resolve(&id)?;

		if let Some(requires) = module.requires().iter().copied().find(|cap| !ctx.provides(*cap)) {
			return Err(DependencyError::MissingPrerequisite { module: id, requires }.into());
		}

		module.install(ctx)?;

		if !ctx.provides(module.provides()) {
			let capability = module.provides();

			return Err(DependencyError::NotProvided { module: id, capability }.into());
		}

		ctx.installed.push(id);
	}

	if !ctx.provides(Capability::Transport) {
		return Err(
			DependencyError::MissingCapability { capability: Capability::Transport }.into()
		);
	}

	Ok(())
}
