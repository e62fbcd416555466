//! Keystone v2.0 token request bodies built from credential bindings.

// crates.io
use serde_json::{Value, json};
// self
use crate::{
	_prelude::*,
	auth::{CredentialBindings, CredentialType, Secret},
	error::ConfigError,
};

const TENANT_NAME: &str = "tenantName";
const USER_NAME: &str = "userName";
const PASSWORD: &str = "password";
const ACCESS_KEY: &str = "accessKey";
const SECRET_KEY: &str = "secretKey";
const TOKEN: &str = "token";

/// Token request resolved from caller credentials.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AuthRequest {
	/// `passwordCredentials` request.
	Password {
		/// Optional tenant scope.
		tenant_name: Option<String>,
		/// User name.
		username: String,
		/// Password.
		password: Secret,
	},
	/// `apiAccessKeyCredentials` request.
	ApiAccessKey {
		/// Optional tenant scope.
		tenant_name: Option<String>,
		/// Access key.
		access_key: String,
		/// Secret key.
		secret_key: Secret,
	},
	/// Re-scoping request using an existing token.
	Token {
		/// Optional tenant scope.
		tenant_name: Option<String>,
		/// Existing token id.
		token: Secret,
	},
}
impl AuthRequest {
	/// Resolves the placeholders `kind` needs from `bindings`.
	///
	/// `tenantName` is optional for every kind. Password requests need `userName` and
	/// `password`; access-key requests take `accessKey`/`secretKey`, falling back to
	/// `userName`/`password`; token requests take `token`, falling back to `password`.
	pub fn from_bindings(
		kind: CredentialType,
		bindings: &CredentialBindings,
	) -> Result<Self, ConfigError> {
		let tenant_name = bindings.get(TENANT_NAME).map(str::to_owned);
		let request = match kind {
			CredentialType::PasswordCredentials => AuthRequest::Password {
				tenant_name,
				username: require(bindings, &[USER_NAME], USER_NAME)?.to_owned(),
				password: Secret::new(require(bindings, &[PASSWORD], PASSWORD)?),
			},
			CredentialType::ApiAccessKeyCredentials => AuthRequest::ApiAccessKey {
				tenant_name,
				access_key: require(bindings, &[ACCESS_KEY, USER_NAME], ACCESS_KEY)?.to_owned(),
				secret_key: Secret::new(require(bindings, &[SECRET_KEY, PASSWORD], SECRET_KEY)?),
			},
			CredentialType::TokenCredentials => AuthRequest::Token {
				tenant_name,
				token: Secret::new(require(bindings, &[TOKEN, PASSWORD], TOKEN)?),
			},
		};

		Ok(request)
	}

	/// Credential type this request was resolved for.
	pub fn credential_type(&self) -> CredentialType {
		match self {
			AuthRequest::Password { .. } => CredentialType::PasswordCredentials,
			AuthRequest::ApiAccessKey { .. } => CredentialType::ApiAccessKeyCredentials,
			AuthRequest::Token { .. } => CredentialType::TokenCredentials,
		}
	}

	/// Tenant scope, if any.
	pub fn tenant_name(&self) -> Option<&str> {
		match self {
			AuthRequest::Password { tenant_name, .. }
			| AuthRequest::ApiAccessKey { tenant_name, .. }
			| AuthRequest::Token { tenant_name, .. } => tenant_name.as_deref(),
		}
	}

	/// Renders the JSON body for `POST /tokens`.
	pub fn to_body(&self) -> Value {
		let mut auth = match self {
			AuthRequest::Password { username, password, .. } => json!({
				"passwordCredentials": { "username": username, "password": password.expose() }
			}),
			AuthRequest::ApiAccessKey { access_key, secret_key, .. } => json!({
				"apiAccessKeyCredentials": {
					"accessKey": access_key,
					"secretKey": secret_key.expose()
				}
			}),
			AuthRequest::Token { token, .. } => json!({ "token": { "id": token.expose() } }),
		};

		if let (Some(tenant), Value::Object(map)) = (self.tenant_name(), &mut auth) {
			map.insert(TENANT_NAME.into(), Value::String(tenant.to_owned()));
		}

		json!({ "auth": auth })
	}
}

fn require<'a>(
	bindings: &'a CredentialBindings,
	names: &[&str],
	reported: &'static str,
) -> Result<&'a str, ConfigError> {
	bindings.first_of(names).ok_or(ConfigError::MissingBinding { name: reported })
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn password_body_includes_tenant_when_bound() {
		let bindings = CredentialBindings::from_values(
			"demo:admin",
			[("tenantName", "demo"), ("userName", "admin"), ("password", "s3cret")],
		);
		let request = AuthRequest::from_bindings(CredentialType::PasswordCredentials, &bindings)
			.expect("Password bindings should resolve.");

		assert_eq!(
			request.to_body(),
			json!({
				"auth": {
					"passwordCredentials": { "username": "admin", "password": "s3cret" },
					"tenantName": "demo"
				}
			})
		);
	}

	#[test]
	fn access_key_falls_back_to_user_and_password() {
		let bindings =
			CredentialBindings::from_values("admin", [("userName", "AK"), ("password", "SK")]);
		let request = AuthRequest::from_bindings(CredentialType::ApiAccessKeyCredentials, &bindings)
			.expect("Access key bindings should resolve.");

		assert_eq!(request.tenant_name(), None);
		assert_eq!(
			request.to_body(),
			json!({
				"auth": { "apiAccessKeyCredentials": { "accessKey": "AK", "secretKey": "SK" } }
			})
		);
	}

	#[test]
	fn token_requests_use_the_credential_value() {
		let bindings = CredentialBindings::from_values("admin", [("password", "tok-1")]);
		let request = AuthRequest::from_bindings(CredentialType::TokenCredentials, &bindings)
			.expect("Token bindings should resolve.");

		assert_eq!(request.credential_type(), CredentialType::TokenCredentials);
		assert_eq!(request.to_body(), json!({ "auth": { "token": { "id": "tok-1" } } }));
	}

	#[test]
	fn missing_bindings_are_named() {
		let bindings = CredentialBindings::from_values("admin", [("userName", "admin")]);
		let err = AuthRequest::from_bindings(CredentialType::PasswordCredentials, &bindings)
			.expect_err("Password requests need a password.");

		assert!(matches!(err, ConfigError::MissingBinding { name: "password" }));
	}

	#[test]
	fn debug_output_redacts_secrets() {
		let bindings = CredentialBindings::from_values(
			"admin",
			[("userName", "admin"), ("password", "s3cret")],
		);
		let request = AuthRequest::from_bindings(CredentialType::PasswordCredentials, &bindings)
			.expect("Password bindings should resolve.");

		assert!(!format!("{request:?}").contains("s3cret"));
	}
}
