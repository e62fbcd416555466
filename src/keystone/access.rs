//! Keystone `access` documents returned by the token endpoint.

// self
use crate::{_prelude::*, auth::Secret, error::TransientError};

/// Authenticated session returned by Keystone.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct Access {
	/// Issued token.
	pub token: Token,
	/// Services the token may reach.
	#[serde(rename = "serviceCatalog", default)]
	pub service_catalog: Vec<Service>,
}
impl Access {
	/// Decodes the `{"access": ...}` envelope returned by `POST /tokens`.
	pub fn from_json_slice(body: &[u8], status: Option<u16>) -> Result<Self, TransientError> {
		#[derive(Deserialize)]
		struct Envelope {
			access: Access,
		}

		let mut de = serde_json::Deserializer::from_slice(body);

		serde_path_to_error::deserialize::<_, Envelope>(&mut de)
			.map(|envelope| envelope.access)
			.map_err(|source| TransientError::ResponseParse { source, status })
	}

	/// Returns true when the token expires within `skew` of `now`.
	///
	/// A deadline past the representable range counts as expired.
	pub fn expires_within(&self, now: OffsetDateTime, skew: Duration) -> bool {
		now.checked_add(skew).is_none_or(|deadline| self.token.expires <= deadline)
	}

	/// Returns the first catalog entry of the given service type.
	pub fn service(&self, service_type: &str) -> Option<&Service> {
		self.service_catalog.iter().find(|service| service.kind == service_type)
	}
}

/// Token issued by Keystone.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct Token {
	/// Token id sent as `X-Auth-Token`.
	pub id: Secret,
	/// Expiry instant.
	#[serde(with = "time::serde::rfc3339")]
	pub expires: OffsetDateTime,
	/// Tenant the token is scoped to, if any.
	#[serde(default)]
	pub tenant: Option<Tenant>,
}

/// Tenant scope attached to a token.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct Tenant {
	/// Tenant id.
	pub id: String,
	/// Tenant name.
	pub name: String,
}

/// Service catalog entry.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct Service {
	/// Service type (e.g. `orchestration`).
	#[serde(rename = "type")]
	pub kind: String,
	/// Service name (e.g. `heat`).
	pub name: String,
	/// Regional endpoints.
	#[serde(default)]
	pub endpoints: Vec<Endpoint>,
}

/// Regional endpoint of a catalog service.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct Endpoint {
	/// Region name, when the deployment is regioned.
	#[serde(default)]
	pub region: Option<String>,
	/// Public URL used by clients.
	#[serde(rename = "publicURL")]
	pub public_url: Url,
	/// Internal URL, when published.
	#[serde(rename = "internalURL", default)]
	pub internal_url: Option<Url>,
}
