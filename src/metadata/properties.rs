// std
use std::ops::RangeInclusive;
// self
use crate::{_prelude::*, error::ConfigError};

/// Well-known property keys.
pub mod keys {
	/// Overrides the descriptor's default endpoint.
	pub const ENDPOINT: &str = "api.endpoint";
	/// Maximum number of retries the transport may attempt.
	pub const MAX_RETRIES: &str = "http.max-retries";
	/// Initial retry back-off in milliseconds.
	pub const RETRY_DELAY_START: &str = "http.retry-delay-start";
	/// Connect timeout in milliseconds.
	pub const CONNECTION_TIMEOUT: &str = "http.connection-timeout";
	/// Whole-request timeout in milliseconds.
	pub const SOCKET_TIMEOUT: &str = "http.socket-timeout";
	/// Seconds before token expiry at which Keystone sessions are renewed.
	pub const SESSION_INTERVAL: &str = "keystone.session-interval";
	/// Service type looked up in the Keystone service catalog.
	pub const SERVICE_TYPE: &str = "keystone.service-type";
	/// Credential shape sent to Keystone (see [`CredentialType`](crate::auth::CredentialType)).
	pub const CREDENTIAL_TYPE: &str = "keystone.credential-type";
	/// Comma-separated allow-list of regions exposed by the region resolver.
	pub const REGIONS: &str = "keystone.regions";
}

/// Ordered string properties carried by descriptors and supplied as caller overrides.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Properties(BTreeMap<String, String>);
impl Properties {
	/// Creates an empty property set.
	pub fn new() -> Self {
		Self::default()
	}

	/// Decodes a flat JSON object of string values.
	pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
		let mut de = serde_json::Deserializer::from_str(json);

		serde_path_to_error::deserialize(&mut de)
			.map_err(|source| ConfigError::InvalidOverrides { source })
	}

	/// Returns a copy with `key` set to `value`.
	pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
		self.set(key, value);

		self
	}

	/// Sets `key` to `value`, returning the previous value.
	pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) -> Option<String> {
		self.0.insert(key.into(), value.into())
	}

	/// Returns the raw value stored under `key`.
	pub fn get(&self, key: &str) -> Option<&str> {
		self.0.get(key).map(String::as_str)
	}

	/// Returns true when `key` is present.
	pub fn contains_key(&self, key: &str) -> bool {
		self.0.contains_key(key)
	}

	/// Parses the value stored under `key`.
	pub fn parse<T>(&self, key: &str) -> Result<Option<T>, ConfigError>
	where
		T: FromStr,
	{
		self.get(key)
			.map(|value| value.trim().parse::<T>().map_err(|_| invalid_property(key, value)))
			.transpose()
	}

	/// Parses the value stored under `key` and rejects values outside `range`.
	pub fn parse_within<T>(
		&self,
		key: &str,
		range: RangeInclusive<T>,
	) -> Result<Option<T>, ConfigError>
	where
		T: FromStr + PartialOrd,
	{
		match self.parse::<T>(key)? {
			Some(value) if !range.contains(&value) => {
				Err(invalid_property(key, self.get(key).unwrap_or_default()))
			},
			parsed => Ok(parsed),
		}
	}

	/// Returns a new set where entries from `overrides` replace entries in `self`.
	pub fn merge(&self, overrides: &Properties) -> Properties {
		let mut merged = self.clone();

		merged.0.extend(overrides.0.iter().map(|(k, v)| (k.clone(), v.clone())));

		merged
	}

	/// Number of entries.
	pub fn len(&self) -> usize {
		self.0.len()
	}

	/// Returns true if no entries are present.
	pub fn is_empty(&self) -> bool {
		self.0.is_empty()
	}

	/// Iterator over entries in key order.
	pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
		self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
	}
}
impl<K, V> FromIterator<(K, V)> for Properties
where
	K: Into<String>,
	V: Into<String>,
{
	fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
		Self(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
	}
}

fn invalid_property(key: &str, value: &str) -> ConfigError {
	ConfigError::InvalidProperty { key: key.to_owned(), value: value.to_owned() }
}

/// Transport defaults shared by every HTTP-backed API descriptor.
pub fn base_http_properties() -> Properties {
	Properties::from_iter([
		(keys::MAX_RETRIES, "5"),
		(keys::RETRY_DELAY_START, "50"),
		(keys::CONNECTION_TIMEOUT, "60000"),
		(keys::SOCKET_TIMEOUT, "60000"),
		(keys::SESSION_INTERVAL, "60"),
	])
}
