//! Crate-level error types shared by the registry, module composition, and Keystone plumbing.

// self
use crate::_prelude::*;

/// Crate-wide result type alias returning [`Error`] by default.
pub type Result<T, E = Error> = std::result::Result<T, E>;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

pub use crate::{metadata::ValidationError, module::DependencyError, registry::NotFoundError};

/// Canonical error exposed by public APIs.
#[derive(Debug, ThisError)]
pub enum Error {
	/// Descriptor or registry validation failed.
	#[error(transparent)]
	Validation(#[from] ValidationError),
	/// Registry lookup failed.
	#[error(transparent)]
	NotFound(#[from] NotFoundError),
	/// Module composition could not satisfy a prerequisite.
	#[error(transparent)]
	Dependency(#[from] DependencyError),
	/// Local configuration problem.
	#[error(transparent)]
	Config(#[from] ConfigError),
	/// Temporary upstream failure; the transport layer may retry.
	#[error(transparent)]
	Transient(#[from] TransientError),
	/// Transport failure (DNS, TCP, TLS).
	#[error(transparent)]
	Transport(#[from] TransportError),

	/// Keystone rejected the supplied credentials.
	#[error("Keystone rejected the credentials: {reason}.")]
	Unauthorized {
		/// HTTP status returned by Keystone.
		status: u16,
		/// Keystone- or crate-supplied reason string.
		reason: String,
	},
}

/// Configuration failures raised while bootstrapping a client context.
#[derive(Debug, ThisError)]
pub enum ConfigError {
	/// HTTP client could not be constructed.
	#[error("HTTP client could not be constructed.")]
	HttpClientBuild {
		/// Underlying transport builder failure.
		#[source]
		source: BoxError,
	},
	/// An endpoint could not be parsed or joined.
	#[error("Endpoint `{value}` is invalid.")]
	InvalidEndpoint {
		/// Endpoint text that failed to parse.
		value: String,
		/// Underlying parsing failure.
		#[source]
		source: url::ParseError,
	},
	/// Property overrides could not be decoded.
	#[error("Property overrides are not a flat JSON object of strings.")]
	InvalidOverrides {
		/// Structured decoding failure including the offending path.
		#[source]
		source: serde_path_to_error::Error<serde_json::Error>,
	},

	/// A property value could not be parsed into the expected type.
	#[error("Property `{key}` has an invalid value `{value}`.")]
	InvalidProperty {
		/// Property key.
		key: String,
		/// Raw property value.
		value: String,
	},
	/// A property required by an installed module is absent.
	#[error("Property `{key}` is required but unset.")]
	MissingProperty {
		/// Property key.
		key: &'static str,
	},
	/// The configured credential type is not recognised.
	#[error("Credential type `{value}` is not supported.")]
	UnknownCredentialType {
		/// Raw credential type value.
		value: String,
	},
	/// Authentication modules need caller credentials.
	#[error("Credentials are required to authenticate against Keystone.")]
	MissingCredentials,
	/// The supplied identity does not match the descriptor's identity template.
	#[error("Identity does not match the expected form: {template}.")]
	IdentityMismatch {
		/// Human-readable template.
		template: String,
	},
	/// The supplied credential does not match the descriptor's credential template.
	#[error("Credential does not match the expected form: {template}.")]
	CredentialMismatch {
		/// Human-readable template.
		template: String,
	},
	/// A placeholder required by the credential type was not bound.
	#[error("Credential placeholder `{name}` was not supplied.")]
	MissingBinding {
		/// Placeholder name.
		name: &'static str,
	},
	/// The Keystone service catalog does not list the configured service type.
	#[error("Service type `{service_type}` is not present in the service catalog.")]
	ServiceNotInCatalog {
		/// Requested service type.
		service_type: String,
	},
	/// The requested region does not expose the configured service type.
	#[error("Region `{region}` does not expose service type `{service_type}`.")]
	UnknownRegion {
		/// Requested region.
		region: String,
		/// Requested service type.
		service_type: String,
	},
}
impl ConfigError {
	/// Wraps a transport's builder failure inside [`ConfigError`].
	pub fn http_client_build(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::HttpClientBuild { source: Box::new(src) }
	}
}
impl From<ReqwestError> for ConfigError {
	fn from(e: ReqwestError) -> Self {
		Self::http_client_build(e)
	}
}

/// Temporary failure variants (safe to retry).
#[derive(Debug, ThisError)]
pub enum TransientError {
	/// Keystone returned an unexpected but non-fatal response.
	#[error("Identity endpoint returned an unexpected response: {message}.")]
	UnexpectedResponse {
		/// Body preview summarizing the failure.
		message: String,
		/// HTTP status code.
		status: u16,
	},
	/// Keystone responded with JSON that does not describe an access document.
	#[error("Identity endpoint returned malformed JSON.")]
	ResponseParse {
		/// Structured parsing failure.
		#[source]
		source: serde_path_to_error::Error<serde_json::Error>,
		/// HTTP status code, when available.
		status: Option<u16>,
	},
}

/// Transport-level failures (network, IO).
#[derive(Debug, ThisError)]
pub enum TransportError {
	/// Underlying HTTP client reported a network failure.
	#[error("Network error occurred while calling the identity endpoint.")]
	Network {
		/// Transport-specific network error.
		#[source]
		source: BoxError,
	},
}
impl TransportError {
	/// Wraps a transport-specific network error.
	pub fn network(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::Network { source: Box::new(src) }
	}
}
impl From<ReqwestError> for TransportError {
	fn from(e: ReqwestError) -> Self {
		Self::network(e)
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;
	use crate::auth::ApiId;

	#[test]
	fn registry_errors_keep_their_source() {
		let not_found = NotFoundError::UnknownApi { id: "nova".into() };
		let error: Error = not_found.clone().into();

		assert!(matches!(error, Error::NotFound(_)));
		assert_eq!(error.to_string(), not_found.to_string());
	}

	#[test]
	fn validation_errors_convert_into_crate_error() {
		let id = ApiId::new("openstack-heat").expect("Identifier fixture should be valid.");
		let error: Error = ValidationError::DuplicateApi { id }.into();

		assert!(matches!(error, Error::Validation(ValidationError::DuplicateApi { .. })));
		assert!(error.to_string().contains("openstack-heat"));
	}

	#[test]
	fn config_error_hides_credential_values() {
		let error = ConfigError::CredentialMismatch { template: "${password}".into() };

		assert_eq!(error.to_string(), "Credential does not match the expected form: ${password}.");
	}
}
