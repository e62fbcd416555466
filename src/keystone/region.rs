//! Region resolution over the Keystone service catalog.

// self
use crate::{
	_prelude::*,
	error::ConfigError,
	keystone::{Access, Service, TokenSupplier},
};

/// Resolves the regions and regional endpoints that expose one service type.
#[derive(Debug)]
pub struct RegionResolver {
	supplier: Arc<TokenSupplier>,
	service_type: String,
	allowed: Option<BTreeSet<String>>,
}
impl RegionResolver {
	/// Creates a resolver for `service_type` backed by `supplier`.
	pub fn new(supplier: Arc<TokenSupplier>, service_type: impl Into<String>) -> Self {
		Self { supplier, service_type: service_type.into(), allowed: None }
	}

	/// Restricts resolution to the listed regions.
	pub fn with_allowed_regions<I, S>(mut self, regions: I) -> Self
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		self.allowed = Some(regions.into_iter().map(Into::into).collect());

		self
	}

	/// Service type looked up in the catalog.
	pub fn service_type(&self) -> &str {
		&self.service_type
	}

	/// Token supplier this resolver authenticates through.
	pub fn token_supplier(&self) -> &Arc<TokenSupplier> {
		&self.supplier
	}

	/// Regions exposing the service, sorted and deduplicated.
	pub async fn regions(&self) -> Result<Vec<String>> {
		let access = self.supplier.access().await?;

		Ok(self.regions_in(&access)?)
	}

	/// Endpoint of the service in `region`.
	pub async fn endpoint(&self, region: &str) -> Result<Url> {
		let access = self.supplier.access().await?;

		Ok(self.endpoint_in(&access, region)?)
	}

	/// Regions exposing the service in `access`.
	pub fn regions_in(&self, access: &Access) -> Result<Vec<String>, ConfigError> {
		let service = self.service_in(access)?;
		let regions = service
			.endpoints
			.iter()
			.filter_map(|endpoint| endpoint.region.as_deref())
			.filter(|region| self.is_allowed(region))
			.map(str::to_owned)
			.collect::<BTreeSet<_>>();

		Ok(regions.into_iter().collect())
	}

	/// Endpoint of the service in `region` within `access`.
	pub fn endpoint_in(&self, access: &Access, region: &str) -> Result<Url, ConfigError> {
		let service = self.service_in(access)?;
		let unknown = || ConfigError::UnknownRegion {
			region: region.to_owned(),
			service_type: self.service_type.clone(),
		};

		if !self.is_allowed(region) {
			return Err(unknown());
		}

		service
			.endpoints
			.iter()
			.find(|endpoint| endpoint.region.as_deref() == Some(region))
			.map(|endpoint| endpoint.public_url.clone())
			.ok_or_else(unknown)
	}

	fn service_in<'a>(&self, access: &'a Access) -> Result<&'a Service, ConfigError> {
		access.service(&self.service_type).ok_or_else(|| ConfigError::ServiceNotInCatalog {
			service_type: self.service_type.clone(),
		})
	}

	fn is_allowed(&self, region: &str) -> bool {
		self.allowed.as_ref().is_none_or(|allowed| allowed.contains(region))
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;
	use crate::{
		auth::{CredentialBindings, CredentialType},
		keystone::{AuthFuture, AuthRequest, AuthenticationApi},
	};

	const ACCESS: &str = r#"{
		"access": {
			"token": { "id": "token-1", "expires": "2099-01-01T00:00:00Z" },
			"serviceCatalog": [
				{
					"type": "orchestration",
					"name": "heat",
					"endpoints": [
						{ "region": "RegionTwo", "publicURL": "http://two.invalid:8004/v1/t" },
						{ "region": "RegionOne", "publicURL": "http://one.invalid:8004/v1/t" },
						{ "region": "RegionOne", "publicURL": "http://one-b.invalid:8004/v1/t" }
					]
				}
			]
		}
	}"#;

	struct FixedApi;
	impl AuthenticationApi for FixedApi {
		fn authenticate<'a>(&'a self, _request: &'a AuthRequest) -> AuthFuture<'a, Access> {
			Box::pin(async { Ok(Access::from_json_slice(ACCESS.as_bytes(), Some(200))?) })
		}
	}

	fn resolver(service_type: &str) -> RegionResolver {
		let bindings =
			CredentialBindings::from_values("admin", [("userName", "admin"), ("password", "pw")]);
		let request = AuthRequest::from_bindings(CredentialType::PasswordCredentials, &bindings)
			.expect("Password bindings should resolve.");

		RegionResolver::new(Arc::new(TokenSupplier::new(Arc::new(FixedApi), request)), service_type)
	}

	#[tokio::test]
	async fn regions_are_sorted_and_deduplicated() {
		let regions = resolver("orchestration").regions().await.expect("Regions should resolve.");

		assert_eq!(regions, vec!["RegionOne", "RegionTwo"]);
	}

	#[tokio::test]
	async fn allow_list_filters_regions_and_endpoints() {
		let resolver = resolver("orchestration").with_allowed_regions(["RegionTwo"]);

		assert_eq!(resolver.regions().await.expect("Regions should resolve."), vec!["RegionTwo"]);

		let err = resolver.endpoint("RegionOne").await.expect_err("Filtered regions should fail.");

		assert!(matches!(err, Error::Config(ConfigError::UnknownRegion { .. })));
	}

	#[tokio::test]
	async fn endpoint_returns_first_public_url_for_region() {
		let url = resolver("orchestration")
			.endpoint("RegionOne")
			.await
			.expect("RegionOne should resolve.");

		assert_eq!(url.as_str(), "http://one.invalid:8004/v1/t");
	}

	#[tokio::test]
	async fn missing_service_type_is_reported() {
		let err = resolver("compute").regions().await.expect_err("Compute is not in the catalog.");

		assert!(matches!(err, Error::Config(ConfigError::ServiceNotInCatalog { .. })));
	}
}
