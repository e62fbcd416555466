// std
use std::collections::HashSet;
// self
use crate::{
	_prelude::*,
	auth::{ApiId, ModuleId},
	metadata::{ApiMetadata, Properties, Template, TemplateError},
};

const DEFAULT_ENDPOINT_NAME: &str = "https endpoint";
const DEFAULT_IDENTITY_TEMPLATE: &str = "${identity}";
const DEFAULT_CREDENTIAL_TEMPLATE: &str = "${credential}";

/// Errors raised while constructing or validating descriptors and registries.
#[derive(Clone, Debug, PartialEq, Eq, ThisError)]
pub enum ValidationError {
	/// A required field was never set.
	#[error("Missing required field `{field}`.")]
	MissingField {
		/// Field name.
		field: &'static str,
	},
	/// A required field was set to an empty or whitespace-only value.
	#[error("Field `{field}` cannot be blank.")]
	BlankField {
		/// Field name.
		field: &'static str,
	},
	/// Default endpoints must be HTTP(S).
	#[error("Default endpoint must use http or https: {url}.")]
	UnsupportedEndpointScheme {
		/// Endpoint URL that failed validation.
		url: String,
	},
	/// Identity or credential template could not be parsed.
	#[error("Field `{field}` holds an invalid template.")]
	InvalidTemplate {
		/// Field name.
		field: &'static str,
		/// Underlying template failure.
		#[source]
		source: TemplateError,
	},
	/// The module list names the same module twice.
	#[error("Module `{module}` is listed more than once.")]
	DuplicateModule {
		/// Repeated module identifier.
		module: ModuleId,
	},
	/// Two descriptors share an identifier.
	#[error("Api `{id}` is registered more than once.")]
	DuplicateApi {
		/// Repeated API identifier.
		id: ApiId,
	},
}

/// Builder for [`ApiMetadata`] values.
///
/// Setters consume and return the builder so calls chain; `build` validates the staged
/// values and leaves descriptors immutable afterwards.
#[derive(Clone, Debug)]
pub struct ApiMetadataBuilder {
	/// Identifier for the descriptor being constructed.
	pub id: Option<ApiId>,
	/// Human-readable API name.
	pub name: Option<String>,
	/// API version.
	pub version: Option<String>,
	/// Human-readable endpoint description.
	pub endpoint_name: String,
	/// Default endpoint.
	pub default_endpoint: Option<Url>,
	/// Raw identity template text.
	pub identity_template: String,
	/// Raw credential template text.
	pub credential_template: String,
	/// Documentation link.
	pub documentation: Option<Url>,
	/// Default properties.
	pub default_properties: Properties,
	/// Ordered module list.
	pub default_modules: Vec<ModuleId>,
}
impl ApiMetadataBuilder {
	/// Creates an empty builder.
	pub fn new() -> Self {
		Self {
			id: None,
			name: None,
			version: None,
			endpoint_name: DEFAULT_ENDPOINT_NAME.into(),
			default_endpoint: None,
			identity_template: DEFAULT_IDENTITY_TEMPLATE.into(),
			credential_template: DEFAULT_CREDENTIAL_TEMPLATE.into(),
			documentation: None,
			default_properties: Properties::default(),
			default_modules: Vec::new(),
		}
	}

	/// Creates a builder carrying every field of `existing`.
	pub fn from_existing(existing: &ApiMetadata) -> Self {
		Self {
			id: Some(existing.id.clone()),
			name: Some(existing.name.clone()),
			version: Some(existing.version.clone()),
			endpoint_name: existing.endpoint_name.clone(),
			default_endpoint: Some(existing.default_endpoint.clone()),
			identity_template: existing.identity_template.as_str().to_owned(),
			credential_template: existing.credential_template.as_str().to_owned(),
			documentation: existing.documentation.clone(),
			default_properties: existing.default_properties.clone(),
			default_modules: existing.default_modules.clone(),
		}
	}

	/// Sets the identifier.
	pub fn id(mut self, id: ApiId) -> Self {
		self.id = Some(id);

		self
	}

	/// Sets the API name.
	pub fn name(mut self, name: impl Into<String>) -> Self {
		self.name = Some(name.into());

		self
	}

	/// Sets the API version.
	pub fn version(mut self, version: impl Into<String>) -> Self {
		self.version = Some(version.into());

		self
	}

	/// Sets the endpoint description.
	pub fn endpoint_name(mut self, endpoint_name: impl Into<String>) -> Self {
		self.endpoint_name = endpoint_name.into();

		self
	}

	/// Sets the default endpoint.
	pub fn default_endpoint(mut self, url: Url) -> Self {
		self.default_endpoint = Some(url);

		self
	}

	/// Sets the identity template text.
	pub fn identity_template(mut self, template: impl Into<String>) -> Self {
		self.identity_template = template.into();

		self
	}

	/// Sets the credential template text.
	pub fn credential_template(mut self, template: impl Into<String>) -> Self {
		self.credential_template = template.into();

		self
	}

	/// Sets the documentation link.
	pub fn documentation(mut self, url: Url) -> Self {
		self.documentation = Some(url);

		self
	}

	/// Replaces the default properties.
	pub fn default_properties(mut self, properties: Properties) -> Self {
		self.default_properties = properties;

		self
	}

	/// Sets a single default property.
	pub fn default_property(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
		self.default_properties.set(key, value);

		self
	}

	/// Replaces the module list.
	pub fn default_modules<I>(mut self, modules: I) -> Self
	where
		I: IntoIterator<Item = ModuleId>,
	{
		self.default_modules = modules.into_iter().collect();

		self
	}

	/// Appends one module to the module list.
	pub fn default_module(mut self, module: ModuleId) -> Self {
		self.default_modules.push(module);

		self
	}

	/// Consumes the builder and validates the resulting descriptor.
	pub fn build(self) -> Result<ApiMetadata, ValidationError> {
		let id = self.id.ok_or(ValidationError::MissingField { field: "id" })?;
		let name = required("name", self.name)?;
		let version = required("version", self.version)?;
		let default_endpoint = self
			.default_endpoint
			.ok_or(ValidationError::MissingField { field: "default_endpoint" })?;
		let identity_template = parse_template("identity_template", self.identity_template)?;
		let credential_template = parse_template("credential_template", self.credential_template)?;
		let descriptor = ApiMetadata {
			id,
			name,
			version,
			endpoint_name: self.endpoint_name,
			default_endpoint,
			identity_template,
			credential_template,
			documentation: self.documentation,
			default_properties: self.default_properties,
			default_modules: self.default_modules,
		};

		descriptor.validate()?;

		Ok(descriptor)
	}
}
impl Default for ApiMetadataBuilder {
	fn default() -> Self {
		Self::new()
	}
}

impl ApiMetadata {
	/// Validates invariants for the descriptor.
	fn validate(&self) -> Result<(), ValidationError> {
		if !matches!(self.default_endpoint.scheme(), "http" | "https") {
			return Err(ValidationError::UnsupportedEndpointScheme {
				url: self.default_endpoint.to_string(),
			});
		}

		let mut seen = HashSet::new();

		for module in &self.default_modules {
			if !seen.insert(module) {
				return Err(ValidationError::DuplicateModule { module: module.clone() });
			}
		}

		Ok(())
	}
}

fn required(field: &'static str, value: Option<String>) -> Result<String, ValidationError> {
	let value = value.ok_or(ValidationError::MissingField { field })?;

	if value.trim().is_empty() {
		Err(ValidationError::BlankField { field })
	} else {
		Ok(value)
	}
}

fn parse_template(field: &'static str, text: String) -> Result<Template, ValidationError> {
	Template::parse(text).map_err(|source| ValidationError::InvalidTemplate { field, source })
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	fn seeded() -> ApiMetadataBuilder {
		ApiMetadata::builder()
			.id(ApiId::new("demo").expect("Api fixture should be valid."))
			.name("Demo API")
			.version("2")
			.default_endpoint(url("https://demo.invalid/"))
	}

	fn url(value: &str) -> Url {
		Url::parse(value).expect("URL fixture should parse.")
	}

	#[test]
	fn defaults_fill_optional_fields() {
		let descriptor = seeded().build().expect("Seeded builder should build.");

		assert_eq!(descriptor.endpoint_name, DEFAULT_ENDPOINT_NAME);
		assert_eq!(descriptor.identity_template.as_str(), DEFAULT_IDENTITY_TEMPLATE);
		assert_eq!(descriptor.credential_template.as_str(), DEFAULT_CREDENTIAL_TEMPLATE);
		assert!(descriptor.default_modules.is_empty());
		assert!(descriptor.documentation.is_none());
	}

	#[test]
	fn blank_required_fields_are_rejected() {
		let err = seeded().name("  ").build().expect_err("Blank names should be rejected.");

		assert_eq!(err, ValidationError::BlankField { field: "name" });
	}

	#[test]
	fn non_http_endpoints_are_rejected() {
		let err = seeded()
			.default_endpoint(url("ftp://demo.invalid/"))
			.build()
			.expect_err("FTP endpoints should be rejected.");

		assert!(matches!(err, ValidationError::UnsupportedEndpointScheme { .. }));
	}

	#[test]
	fn duplicate_modules_are_rejected() {
		let module = ModuleId::new("region").expect("Module fixture should be valid.");
		let err = seeded()
			.default_modules([module.clone(), module])
			.build()
			.expect_err("Duplicate modules should be rejected.");

		assert!(matches!(err, ValidationError::DuplicateModule { .. }));
	}

	#[test]
	fn invalid_templates_name_their_field() {
		let err = seeded()
			.credential_template("${unterminated")
			.build()
			.expect_err("Unterminated placeholders should be rejected.");

		assert!(matches!(
			err,
			ValidationError::InvalidTemplate { field: "credential_template", .. }
		));
	}
}
