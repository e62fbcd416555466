//! Modules shipped with the crate: Keystone authentication, region resolution, and the
//! authorized HTTP transport.

// std
use std::ops::RangeInclusive;
// self
use crate::{
	_prelude::*,
	auth::{CredentialType, ModuleId},
	error::ConfigError,
	keystone::{AuthRequest, RegionResolver, ReqwestAuthenticationApi, TokenSupplier},
	metadata::keys,
	module::{ApiModule, Capability, DependencyError, ModuleContext},
	transport::{ApiTransport, RetryPolicy, http_client},
};

/// Identifier of [`AuthenticationApiModule`].
pub const AUTHENTICATION_API: &str = "authentication-api";
/// Identifier of [`KeystoneAuthenticationModule`].
pub const KEYSTONE_AUTHENTICATION: &str = "keystone-authentication";
/// Identifier of [`KeystoneRegionModule`].
pub const KEYSTONE_REGION: &str = "keystone-region";
/// Identifier of [`HeatHttpApiModule`].
pub const HEAT_HTTP_API: &str = "heat-http-api";

/// Accepted `keystone.session-interval` values: up to one day.
const SESSION_INTERVAL_SECONDS: RangeInclusive<i64> = 0..=86_400;

/// Installs a reqwest-backed client for the Keystone token endpoint at the context endpoint.
#[derive(Debug)]
pub struct AuthenticationApiModule {
	id: ModuleId,
}
impl Default for AuthenticationApiModule {
	fn default() -> Self {
		Self { id: ModuleId::from_static(AUTHENTICATION_API) }
	}
}
impl ApiModule for AuthenticationApiModule {
	fn id(&self) -> &ModuleId {
		&self.id
	}

	fn provides(&self) -> Capability {
		Capability::AuthenticationApi
	}

	fn install(&self, ctx: &mut ModuleContext) -> Result<()> {
		let client = http_client(&ctx.properties)?;
		let api = ReqwestAuthenticationApi::new(client, &ctx.endpoint)?;

		ctx.authentication_api = Some(Arc::new(api));

		Ok(())
	}
}

/// Installs a [`TokenSupplier`] for the caller's credentials.
///
/// The credential shape comes from `keystone.credential-type` and the renewal window from
/// `keystone.session-interval` (seconds).
#[derive(Debug)]
pub struct KeystoneAuthenticationModule {
	id: ModuleId,
}
impl Default for KeystoneAuthenticationModule {
	fn default() -> Self {
		Self { id: ModuleId::from_static(KEYSTONE_AUTHENTICATION) }
	}
}
impl ApiModule for KeystoneAuthenticationModule {
	fn id(&self) -> &ModuleId {
		&self.id
	}

	fn provides(&self) -> Capability {
		Capability::Authentication
	}

	fn requires(&self) -> &[Capability] {
		&[Capability::AuthenticationApi]
	}

	fn install(&self, ctx: &mut ModuleContext) -> Result<()> {
		let api = ctx.authentication_api.clone().ok_or_else(|| {
			DependencyError::MissingPrerequisite {
				module: self.id.clone(),
				requires: Capability::AuthenticationApi,
			}
		})?;
		let kind = ctx
			.properties
			.get(keys::CREDENTIAL_TYPE)
			.map(str::parse::<CredentialType>)
			.transpose()?
			.unwrap_or_default();
		let bindings = ctx.credentials.as_ref().ok_or(ConfigError::MissingCredentials)?;
		let request = AuthRequest::from_bindings(kind, bindings)?;
		let mut supplier = TokenSupplier::new(api, request);

		if let Some(seconds) =
			ctx.properties.parse_within::<i64>(keys::SESSION_INTERVAL, SESSION_INTERVAL_SECONDS)?
		{
			supplier = supplier.with_expiry_skew(Duration::seconds(seconds));
		}

		ctx.token_supplier = Some(Arc::new(supplier));

		Ok(())
	}
}

/// Installs a [`RegionResolver`] for `keystone.service-type`, optionally limited by the
/// comma-separated `keystone.regions` allow-list.
#[derive(Debug)]
pub struct KeystoneRegionModule {
	id: ModuleId,
}
impl Default for KeystoneRegionModule {
	fn default() -> Self {
		Self { id: ModuleId::from_static(KEYSTONE_REGION) }
	}
}
impl ApiModule for KeystoneRegionModule {
	fn id(&self) -> &ModuleId {
		&self.id
	}

	fn provides(&self) -> Capability {
		Capability::Region
	}

	fn requires(&self) -> &[Capability] {
		&[Capability::Authentication]
	}

	fn install(&self, ctx: &mut ModuleContext) -> Result<()> {
		let supplier = ctx.token_supplier.clone().ok_or_else(|| {
			DependencyError::MissingPrerequisite {
				module: self.id.clone(),
				requires: Capability::Authentication,
			}
		})?;
		let service_type = ctx
			.properties
			.get(keys::SERVICE_TYPE)
			.ok_or(ConfigError::MissingProperty { key: keys::SERVICE_TYPE })?;
		let mut resolver = RegionResolver::new(supplier, service_type);

		if let Some(regions) = ctx.properties.get(keys::REGIONS) {
			resolver = resolver.with_allowed_regions(
				regions.split(',').map(str::trim).filter(|region| !region.is_empty()),
			);
		}

		ctx.region_resolver = Some(Arc::new(resolver));

		Ok(())
	}
}

/// Installs the authorized [`ApiTransport`] for the Heat API.
#[derive(Debug)]
pub struct HeatHttpApiModule {
	id: ModuleId,
}
impl Default for HeatHttpApiModule {
	fn default() -> Self {
		Self { id: ModuleId::from_static(HEAT_HTTP_API) }
	}
}
impl ApiModule for HeatHttpApiModule {
	fn id(&self) -> &ModuleId {
		&self.id
	}

	fn provides(&self) -> Capability {
		Capability::Transport
	}

	fn requires(&self) -> &[Capability] {
		&[Capability::Authentication, Capability::Region]
	}

	fn install(&self, ctx: &mut ModuleContext) -> Result<()> {
		let missing = |requires| DependencyError::MissingPrerequisite {
			module: self.id.clone(),
			requires,
		};
		let supplier =
			ctx.token_supplier.clone().ok_or_else(|| missing(Capability::Authentication))?;
		let regions = ctx.region_resolver.clone().ok_or_else(|| missing(Capability::Region))?;
		let transport = ApiTransport::new(http_client(&ctx.properties)?, supplier, regions)
			.with_retry_policy(RetryPolicy::from_properties(&ctx.properties)?);

		ctx.transport = Some(Arc::new(transport));

		Ok(())
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;
	use crate::{apis::heat, auth::CredentialBindings, metadata::Properties};

	fn context(properties: Properties) -> ModuleContext {
		let metadata = Arc::new(heat::metadata().expect("Heat descriptor should build."));
		let endpoint = metadata.default_endpoint.clone();

		ModuleContext::new(
			metadata,
			properties,
			endpoint,
			Some(CredentialBindings::from_values(
				"admin",
				[("userName", "admin"), ("password", "s3cret")],
			)),
		)
	}

	fn authenticated(properties: Properties) -> ModuleContext {
		let mut ctx = context(properties);

		AuthenticationApiModule::default().install(&mut ctx).expect("Client should install.");
		KeystoneAuthenticationModule::default()
			.install(&mut ctx)
			.expect("Keystone session should install.");

		ctx
	}

	#[test]
	fn session_interval_sets_the_expiry_skew() {
		let ctx = authenticated(Properties::new().with(keys::SESSION_INTERVAL, "120"));
		let supplier = ctx.token_supplier.as_ref().expect("Supplier should be installed.");

		assert_eq!(supplier.expiry_skew(), Duration::seconds(120));
		assert_eq!(supplier.request().credential_type(), CredentialType::PasswordCredentials);
	}

	#[test]
	fn session_interval_outside_one_day_is_rejected() {
		for value in ["-1", "86401", "9223372036854775807"] {
			let mut ctx = context(Properties::new().with(keys::SESSION_INTERVAL, value));

			AuthenticationApiModule::default().install(&mut ctx).expect("Client should install.");

			let err = KeystoneAuthenticationModule::default()
				.install(&mut ctx)
				.expect_err("Out-of-range session intervals should be rejected.");

			assert!(
				matches!(
					err,
					Error::Config(ConfigError::InvalidProperty { ref key, value: ref raw })
						if key == keys::SESSION_INTERVAL && raw == value
				),
				"Unexpected error for {value}: {err:?}."
			);
			assert!(ctx.token_supplier.is_none());
		}

		let ctx = authenticated(Properties::new().with(keys::SESSION_INTERVAL, "86400"));

		assert_eq!(
			ctx.token_supplier.as_ref().map(|supplier| supplier.expiry_skew()),
			Some(Duration::days(1))
		);
	}

	#[test]
	fn region_module_requires_a_service_type() {
		let mut ctx = authenticated(Properties::new());
		let err = KeystoneRegionModule::default()
			.install(&mut ctx)
			.expect_err("Region resolution needs a service type.");

		assert!(matches!(
			err,
			Error::Config(ConfigError::MissingProperty { key: keys::SERVICE_TYPE })
		));
	}

	#[test]
	fn transport_reads_the_retry_policy() {
		let mut ctx = authenticated(
			heat::default_properties()
				.with(keys::MAX_RETRIES, "3")
				.with(keys::REGIONS, "RegionOne"),
		);

		KeystoneRegionModule::default().install(&mut ctx).expect("Region module should install.");
		HeatHttpApiModule::default().install(&mut ctx).expect("Transport should install.");

		let transport = ctx.transport.as_ref().expect("Transport should be installed.");

		assert_eq!(transport.retry_policy().max_retries, 3);
		assert_eq!(transport.region_resolver().service_type(), heat::HEAT_SERVICE_TYPE);
	}
}
