//! Caller-facing bootstrap that turns a registered descriptor into a ready client context.
//!
//! [`ContextBuilder`] merges the descriptor's default properties with caller overrides,
//! picks the endpoint, binds credentials through the descriptor's templates, and composes
//! the descriptor's modules in order. Building never performs network I/O; the first
//! Keystone call happens when the transport or resolver is used.

// self
use crate::{
	_prelude::*,
	auth::{CredentialBindings, ModuleId, Secret},
	error::ConfigError,
	keystone::{RegionResolver, TokenSupplier},
	metadata::{ApiMetadata, Properties, keys},
	module::{self, DependencyError, ModuleCatalog, ModuleContext},
	registry::ApiRegistry,
	transport::ApiTransport,
};

/// Fluent builder for [`ApiContext`].
#[derive(Debug)]
pub struct ContextBuilder {
	metadata: Arc<ApiMetadata>,
	endpoint: Option<Url>,
	identity: Option<String>,
	credential: Option<Secret>,
	overrides: Properties,
	modules: ModuleCatalog,
}
impl ContextBuilder {
	/// Starts a builder for `metadata` using the built-in module catalog.
	pub fn new(metadata: impl Into<Arc<ApiMetadata>>) -> Self {
		Self {
			metadata: metadata.into(),
			endpoint: None,
			identity: None,
			credential: None,
			overrides: Properties::default(),
			modules: ModuleCatalog::builtin(),
		}
	}

	/// Starts a builder for the descriptor registered under `id` in the global registry.
	pub fn for_api(id: &str) -> Result<Self> {
		let metadata = ApiRegistry::global()?.lookup(id)?;

		Ok(Self::new(metadata.clone()))
	}

	/// Overrides the endpoint.
	pub fn endpoint(mut self, url: Url) -> Self {
		self.endpoint = Some(url);

		self
	}

	/// Supplies the caller identity and credential.
	pub fn credentials(
		mut self,
		identity: impl Into<String>,
		credential: impl Into<String>,
	) -> Self {
		self.identity = Some(identity.into());
		self.credential = Some(Secret::new(credential));

		self
	}

	/// Merges property overrides; later calls win over earlier ones.
	pub fn overrides(mut self, overrides: Properties) -> Self {
		self.overrides = self.overrides.merge(&overrides);

		self
	}

	/// Overrides a single property.
	pub fn override_property(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
		self.overrides.set(key, value);

		self
	}

	/// Replaces the module catalog used to resolve the descriptor's module list.
	pub fn modules(mut self, modules: ModuleCatalog) -> Self {
		self.modules = modules;

		self
	}

	/// Validates the configuration and composes the descriptor's modules.
	pub fn build(self) -> Result<ApiContext> {
		let properties = self.metadata.default_properties.merge(&self.overrides);
		let endpoint = match (self.endpoint, properties.get(keys::ENDPOINT)) {
			(Some(url), _) => url,
			(None, Some(value)) => Url::parse(value).map_err(|source| {
				ConfigError::InvalidEndpoint { value: value.to_owned(), source }
			})?,
			(None, None) => self.metadata.default_endpoint.clone(),
		};
		let credentials = match (self.identity.as_deref(), self.credential.as_ref()) {
			(Some(identity), Some(credential)) => Some(CredentialBindings::capture(
				&self.metadata.identity_template,
				identity,
				&self.metadata.credential_template,
				credential.expose(),
			)?),
			_ => None,
		};
		let ctx = ModuleContext::new(self.metadata.clone(), properties, endpoint, credentials);
		let ctx = module::compose(&self.modules, ctx)?;

		ApiContext::from_modules(ctx)
	}
}

/// Composed client context: effective configuration plus installed providers.
#[derive(Debug)]
pub struct ApiContext {
	metadata: Arc<ApiMetadata>,
	properties: Properties,
	endpoint: Url,
	identity: Option<String>,
	installed: Vec<ModuleId>,
	token_supplier: Option<Arc<TokenSupplier>>,
	region_resolver: Option<Arc<RegionResolver>>,
	transport: Arc<ApiTransport>,
}
impl ApiContext {
	/// Builds a context from a composed module context.
	pub fn from_modules(ctx: ModuleContext) -> Result<Self> {
		let installed = ctx.installed().to_vec();
		let transport = ctx.transport.ok_or(DependencyError::MissingCapability {
			capability: module::Capability::Transport,
		})?;

		Ok(Self {
			metadata: ctx.metadata,
			properties: ctx.properties,
			endpoint: ctx.endpoint,
			identity: ctx.credentials.as_ref().map(|bindings| bindings.identity().to_owned()),
			installed,
			token_supplier: ctx.token_supplier,
			region_resolver: ctx.region_resolver,
			transport,
		})
	}

	/// Descriptor the context was built from.
	pub fn metadata(&self) -> &Arc<ApiMetadata> {
		&self.metadata
	}

	/// Effective properties.
	pub fn properties(&self) -> &Properties {
		&self.properties
	}

	/// Effective endpoint.
	pub fn endpoint(&self) -> &Url {
		&self.endpoint
	}

	/// Caller identity as rendered by the identity template; contains no secrets.
	pub fn identity(&self) -> Option<&str> {
		self.identity.as_deref()
	}

	/// Modules installed, in order.
	pub fn installed_modules(&self) -> &[ModuleId] {
		&self.installed
	}

	/// Keystone session, when an authentication module was installed.
	pub fn token_supplier(&self) -> Option<&Arc<TokenSupplier>> {
		self.token_supplier.as_ref()
	}

	/// Region resolver, when a region module was installed.
	pub fn region_resolver(&self) -> Option<&Arc<RegionResolver>> {
		self.region_resolver.as_ref()
	}

	/// Authorized transport.
	pub fn transport(&self) -> &Arc<ApiTransport> {
		&self.transport
	}
}
