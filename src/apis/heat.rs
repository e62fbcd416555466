//! Descriptor for the OpenStack Heat orchestration API (v1).

// self
use crate::{
	_prelude::*,
	auth::{ApiId, CredentialType, ModuleId},
	metadata::{
		ApiMetadata, ApiMetadataBuilder, Properties, ValidationError, base_http_properties, keys,
	},
	module::builtin,
};

/// Registry identifier of the Heat descriptor.
pub const HEAT_API_ID: &str = "openstack-heat";
/// Keystone service type advertised by Heat endpoints.
pub const HEAT_SERVICE_TYPE: &str = "orchestration";

const HEAT_ENDPOINT: &str = "http://localhost:5000/v2.0/";
const HEAT_DOCUMENTATION: &str = "https://wiki.openstack.org/wiki/Heat";

/// Default properties for Heat: the HTTP base set plus the orchestration service type and
/// password credentials.
pub fn default_properties() -> Properties {
	base_http_properties()
		.with(keys::SERVICE_TYPE, HEAT_SERVICE_TYPE)
		.with(keys::CREDENTIAL_TYPE, CredentialType::PasswordCredentials.as_str())
}

/// Builder seeded with the Heat descriptor; callers may override fields before building.
pub fn builder() -> ApiMetadataBuilder {
	let mut builder = ApiMetadata::builder()
		.id(ApiId::from_static(HEAT_API_ID))
		.name("OpenStack Heat API")
		.version("1")
		.endpoint_name("Keystone base url ending in /v2.0/")
		.identity_template("${tenantName}:${userName}|${userName}")
		.credential_template("${password}")
		.default_properties(default_properties())
		.default_modules([
			ModuleId::from_static(builtin::AUTHENTICATION_API),
			ModuleId::from_static(builtin::KEYSTONE_AUTHENTICATION),
			ModuleId::from_static(builtin::KEYSTONE_REGION),
			ModuleId::from_static(builtin::HEAT_HTTP_API),
		]);

	if let Ok(url) = Url::parse(HEAT_ENDPOINT) {
		builder = builder.default_endpoint(url);
	}
	if let Ok(url) = Url::parse(HEAT_DOCUMENTATION) {
		builder = builder.documentation(url);
	}

	builder
}

/// Builds the Heat descriptor.
pub fn metadata() -> Result<ApiMetadata, ValidationError> {
	builder().build()
}
