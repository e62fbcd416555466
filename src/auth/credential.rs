//! Credential kinds and the placeholder bindings captured from caller-supplied credentials.

// self
use crate::{_prelude::*, auth::Secret, error::ConfigError, metadata::Template};

/// Keystone credential shapes selectable through the `keystone.credential-type` property.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CredentialType {
	#[default]
	/// Username + password, optionally scoped to a tenant.
	PasswordCredentials,
	/// Access key + secret key pair.
	ApiAccessKeyCredentials,
	/// A previously issued token id.
	TokenCredentials,
}
impl CredentialType {
	/// Returns the property value naming this credential type.
	pub const fn as_str(self) -> &'static str {
		match self {
			CredentialType::PasswordCredentials => "password-credentials",
			CredentialType::ApiAccessKeyCredentials => "api-access-key-credentials",
			CredentialType::TokenCredentials => "token-credentials",
		}
	}
}
impl Display for CredentialType {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}
impl FromStr for CredentialType {
	type Err = ConfigError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s {
			"password-credentials" => Ok(CredentialType::PasswordCredentials),
			"api-access-key-credentials" => Ok(CredentialType::ApiAccessKeyCredentials),
			"token-credentials" => Ok(CredentialType::TokenCredentials),
			other => Err(ConfigError::UnknownCredentialType { value: other.to_owned() }),
		}
	}
}

/// Placeholder values captured from a caller's identity and credential.
///
/// Values are keyed by placeholder name (`tenantName`, `userName`, `password`, ...) and are
/// resolved into a Keystone request only when authentication runs. `Debug` output lists the
/// bound names but never the values.
#[derive(Clone, PartialEq, Eq)]
pub struct CredentialBindings {
	identity: String,
	values: BTreeMap<String, Secret>,
}
impl CredentialBindings {
	/// Captures `identity` and `credential` through the descriptor's templates.
	pub fn capture(
		identity_template: &Template,
		identity: &str,
		credential_template: &Template,
		credential: &str,
	) -> Result<Self, ConfigError> {
		let identity_values = identity_template.capture(identity).ok_or_else(|| {
			ConfigError::IdentityMismatch { template: identity_template.to_string() }
		})?;
		let credential_values = credential_template.capture(credential).ok_or_else(|| {
			ConfigError::CredentialMismatch { template: credential_template.to_string() }
		})?;
		let identity =
			identity_template.render(&identity_values).unwrap_or_else(|| identity.to_owned());
		let values = identity_values
			.into_iter()
			.chain(credential_values)
			.map(|(name, value)| (name, Secret::new(value)))
			.collect();

		Ok(Self { identity, values })
	}

	/// Builds bindings from explicit placeholder values.
	pub fn from_values<I, K, V>(identity: impl Into<String>, values: I) -> Self
	where
		I: IntoIterator<Item = (K, V)>,
		K: Into<String>,
		V: Into<String>,
	{
		Self {
			identity: identity.into(),
			values: values.into_iter().map(|(k, v)| (k.into(), Secret::new(v))).collect(),
		}
	}

	/// Identity as rendered through the identity template; safe to log.
	pub fn identity(&self) -> &str {
		&self.identity
	}

	/// Returns the value bound to `name`.
	pub fn get(&self, name: &str) -> Option<&str> {
		self.values.get(name).map(Secret::expose)
	}

	/// Returns the first bound value among `names`.
	pub fn first_of(&self, names: &[&str]) -> Option<&str> {
		names.iter().find_map(|name| self.get(name))
	}

	/// Iterator over bound placeholder names.
	pub fn names(&self) -> impl Iterator<Item = &str> {
		self.values.keys().map(String::as_str)
	}
}
impl Debug for CredentialBindings {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("CredentialBindings")
			.field("identity", &self.identity)
			.field("names", &self.values.keys().collect::<Vec<_>>())
			.finish()
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	fn template(text: &str) -> Template {
		Template::parse(text).expect("Template fixture should parse.")
	}

	#[test]
	fn credential_type_round_trips_through_property_values() {
		for kind in [
			CredentialType::PasswordCredentials,
			CredentialType::ApiAccessKeyCredentials,
			CredentialType::TokenCredentials,
		] {
			assert_eq!(kind.as_str().parse::<CredentialType>().ok(), Some(kind));
		}

		assert!(matches!(
			"passwordCredentials".parse::<CredentialType>(),
			Err(ConfigError::UnknownCredentialType { .. })
		));
	}

	#[test]
	fn capture_binds_tenant_user_and_password() {
		let bindings = CredentialBindings::capture(
			&template("${tenantName}:${userName}|${userName}"),
			"demo:admin",
			&template("${password}"),
			"s3cret",
		)
		.expect("Identity and credential should match their templates.");

		assert_eq!(bindings.get("tenantName"), Some("demo"));
		assert_eq!(bindings.get("userName"), Some("admin"));
		assert_eq!(bindings.get("password"), Some("s3cret"));
		assert_eq!(bindings.identity(), "demo:admin");
	}

	#[test]
	fn capture_falls_back_to_user_only_identity() {
		let bindings = CredentialBindings::capture(
			&template("${tenantName}:${userName}|${userName}"),
			"admin",
			&template("${password}"),
			"s3cret",
		)
		.expect("User-only identity should match the second alternative.");

		assert_eq!(bindings.get("tenantName"), None);
		assert_eq!(bindings.first_of(&["accessKey", "userName"]), Some("admin"));
	}

	#[test]
	fn debug_output_hides_values() {
		let bindings = CredentialBindings::from_values("admin", [("password", "s3cret")]);
		let rendered = format!("{bindings:?}");

		assert!(rendered.contains("password"));
		assert!(!rendered.contains("s3cret"));
	}

	#[test]
	fn mismatched_identity_is_rejected() {
		let err = CredentialBindings::capture(
			&template("${tenantName}:${userName}"),
			"admin",
			&template("${password}"),
			"s3cret",
		)
		.expect_err("Identity without a tenant should not match.");

		assert!(matches!(err, ConfigError::IdentityMismatch { .. }));
	}

	#[test]
	fn identity_with_an_empty_user_is_rejected() {
		for identity in ["demo:", ":admin"] {
			let err = CredentialBindings::capture(
				&template("${tenantName}:${userName}|${userName}"),
				identity,
				&template("${password}"),
				"s3cret",
			)
			.expect_err("Identities with empty placeholders should not match.");

			assert!(
				matches!(err, ConfigError::IdentityMismatch { .. }),
				"Unexpected error for {identity}: {err:?}."
			);
		}
	}
}
