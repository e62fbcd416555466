//! Authorized HTTP plumbing handed to API clients.
//!
//! [`ApiTransport`] owns a configured [`ReqwestClient`], the Keystone session, and the region
//! resolver. It hands out [`AuthorizedEndpoint`]s and request builders carrying the
//! `X-Auth-Token` header; building and interpreting API calls stays with the caller.

// std
use std::time::Duration as StdDuration;
// crates.io
use reqwest::{Method, RequestBuilder};
// self
use crate::{
	_prelude::*,
	auth::Secret,
	error::ConfigError,
	keystone::{RegionResolver, TokenSupplier, join_path},
	metadata::{Properties, keys},
};

/// Header carrying the Keystone token on API requests.
pub const AUTH_TOKEN_HEADER: &str = "X-Auth-Token";

/// Builds a reqwest client honouring the `http.*` timeout properties.
pub fn http_client(properties: &Properties) -> Result<ReqwestClient, ConfigError> {
	let mut builder = ReqwestClient::builder();

	if let Some(ms) = properties.parse::<u64>(keys::CONNECTION_TIMEOUT)? {
		builder = builder.connect_timeout(StdDuration::from_millis(ms));
	}
	if let Some(ms) = properties.parse::<u64>(keys::SOCKET_TIMEOUT)? {
		builder = builder.timeout(StdDuration::from_millis(ms));
	}

	Ok(builder.build()?)
}

/// Retry settings published to the code that dispatches API calls.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RetryPolicy {
	/// Maximum retries after the first attempt.
	pub max_retries: u32,
	/// Back-off before the first retry; doubles on each subsequent attempt.
	pub delay_start: Duration,
}
impl RetryPolicy {
	/// Reads `http.max-retries` and `http.retry-delay-start` (milliseconds).
	pub fn from_properties(properties: &Properties) -> Result<Self, ConfigError> {
		let defaults = Self::default();

		Ok(Self {
			max_retries: properties.parse(keys::MAX_RETRIES)?.unwrap_or(defaults.max_retries),
			delay_start: properties
				.parse_within::<i64>(keys::RETRY_DELAY_START, 0..=i64::MAX)?
				.map(Duration::milliseconds)
				.unwrap_or(defaults.delay_start),
		})
	}

	/// Back-off before retry number `attempt` (1-based).
	///
	/// Returns `None` once retries are spent or when the back-off no longer fits a [`Duration`].
	pub fn delay_for(&self, attempt: u32) -> Option<Duration> {
		if attempt == 0 || attempt > self.max_retries {
			return None;
		}

		self.delay_start.checked_mul(2_i32.checked_pow(attempt - 1)?)
	}
}
impl Default for RetryPolicy {
	fn default() -> Self {
		Self { max_retries: 5, delay_start: Duration::milliseconds(50) }
	}
}

/// A regional service endpoint paired with the token that authorizes it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AuthorizedEndpoint {
	/// Region the endpoint belongs to.
	pub region: String,
	/// Service base URL.
	pub url: Url,
	/// Token to send as [`AUTH_TOKEN_HEADER`].
	pub token: Secret,
}

/// Authorized transport for one API context.
#[derive(Debug)]
pub struct ApiTransport {
	client: ReqwestClient,
	supplier: Arc<TokenSupplier>,
	regions: Arc<RegionResolver>,
	retry: RetryPolicy,
}
impl ApiTransport {
	/// Creates a transport from its collaborators.
	pub fn new(
		client: ReqwestClient,
		supplier: Arc<TokenSupplier>,
		regions: Arc<RegionResolver>,
	) -> Self {
		Self { client, supplier, regions, retry: RetryPolicy::default() }
	}

	/// Overrides the retry policy.
	pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
		self.retry = retry;

		self
	}

	/// Underlying HTTP client.
	pub fn client(&self) -> &ReqwestClient {
		&self.client
	}

	/// Retry policy for API calls.
	pub fn retry_policy(&self) -> RetryPolicy {
		self.retry
	}

	/// Keystone session.
	pub fn token_supplier(&self) -> &Arc<TokenSupplier> {
		&self.supplier
	}

	/// Region resolver.
	pub fn region_resolver(&self) -> &Arc<RegionResolver> {
		&self.regions
	}

	/// Regions exposing the API.
	pub async fn regions(&self) -> Result<Vec<String>> {
		self.regions.regions().await
	}

	/// Resolves `region` to its endpoint and current token, authenticating if needed.
	pub async fn endpoint(&self, region: &str) -> Result<AuthorizedEndpoint> {
		let access = self.supplier.access().await?;
		let url = self.regions.endpoint_in(&access, region)?;

		Ok(AuthorizedEndpoint { region: region.to_owned(), url, token: access.token.id.clone() })
	}

	/// Starts a request for `path` relative to `endpoint`, carrying its token.
	pub fn request(
		&self,
		method: Method,
		endpoint: &AuthorizedEndpoint,
		path: &str,
	) -> Result<RequestBuilder, ConfigError> {
		let url = join_path(&endpoint.url, path)?;

		Ok(self.client.request(method, url).header(AUTH_TOKEN_HEADER, endpoint.token.expose()))
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;
	use crate::metadata::base_http_properties;

	#[test]
	fn retry_policy_reads_properties() {
		let policy = RetryPolicy::from_properties(
			&base_http_properties()
				.with(keys::MAX_RETRIES, "2")
				.with(keys::RETRY_DELAY_START, "100"),
		)
		.expect("Numeric retry properties should parse.");

		assert_eq!(policy.max_retries, 2);
		assert_eq!(policy.delay_for(0), None);
		assert_eq!(policy.delay_for(1), Some(Duration::milliseconds(100)));
		assert_eq!(policy.delay_for(2), Some(Duration::milliseconds(200)));
		assert_eq!(policy.delay_for(3), None);
	}

	#[test]
	fn retry_policy_defaults_match_base_properties() {
		let from_base = RetryPolicy::from_properties(&base_http_properties())
			.expect("Base properties should parse.");

		assert_eq!(from_base, RetryPolicy::default());
		assert_eq!(
			RetryPolicy::from_properties(&Properties::new()).ok(),
			Some(RetryPolicy::default())
		);
	}

	#[test]
	fn retry_policy_rejects_negative_delays() {
		let err = RetryPolicy::from_properties(
			&base_http_properties().with(keys::RETRY_DELAY_START, "-100"),
		)
		.expect_err("Negative retry delays should be rejected.");

		assert!(matches!(
			err,
			ConfigError::InvalidProperty { ref key, ref value }
				if key == keys::RETRY_DELAY_START && value == "-100"
		));
	}

	#[test]
	fn oversized_back_off_ends_retries() {
		let policy = RetryPolicy::from_properties(
			&base_http_properties()
				.with(keys::MAX_RETRIES, "40")
				.with(keys::RETRY_DELAY_START, "9000000000000000"),
		)
		.expect("Large retry delays should parse.");

		assert_eq!(policy.delay_for(1), Some(Duration::milliseconds(9_000_000_000_000_000)));
		assert_eq!(policy.delay_for(40), None);

		let policy = RetryPolicy { max_retries: 40, delay_start: Duration::milliseconds(1) };

		assert_eq!(policy.delay_for(31), Some(Duration::milliseconds(1 << 30)));
		assert_eq!(policy.delay_for(32), None);
	}

	#[test]
	fn http_client_rejects_non_numeric_timeouts() {
		let err = http_client(&Properties::new().with(keys::SOCKET_TIMEOUT, "soon"))
			.expect_err("Non-numeric timeouts should be rejected.");

		assert!(matches!(err, ConfigError::InvalidProperty { .. }));
		assert!(http_client(&base_http_properties()).is_ok());
	}
}
