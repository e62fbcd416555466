//! Lazily authenticated Keystone session shared by region resolution and transports.

// self
use crate::{
	_prelude::*,
	keystone::{Access, AuthRequest, AuthenticationApi},
	obs::{self, BootstrapOutcome, BootstrapSpan, BootstrapStage},
};

/// Default renewal window applied before token expiry.
pub const DEFAULT_EXPIRY_SKEW: Duration = Duration::seconds(60);

/// Caches the current [`Access`] and re-authenticates when it nears expiry.
///
/// Concurrent callers share one in-flight authentication: the cache sits behind an async
/// mutex, so the second caller waits for the first and then reuses its result.
pub struct TokenSupplier {
	api: Arc<dyn AuthenticationApi>,
	request: AuthRequest,
	expiry_skew: Duration,
	cached: AsyncMutex<Option<Arc<Access>>>,
}
impl TokenSupplier {
	/// Creates a supplier that authenticates `request` through `api`.
	pub fn new(api: Arc<dyn AuthenticationApi>, request: AuthRequest) -> Self {
		Self { api, request, expiry_skew: DEFAULT_EXPIRY_SKEW, cached: AsyncMutex::new(None) }
	}

	/// Overrides the renewal window.
	pub fn with_expiry_skew(mut self, skew: Duration) -> Self {
		self.expiry_skew = skew;

		self
	}

	/// Request sent to Keystone.
	pub fn request(&self) -> &AuthRequest {
		&self.request
	}

	/// Renewal window.
	pub fn expiry_skew(&self) -> Duration {
		self.expiry_skew
	}

	/// Returns a live access document, authenticating when none is cached or it is about to
	/// expire.
	pub async fn access(&self) -> Result<Arc<Access>> {
		const STAGE: BootstrapStage = BootstrapStage::Authenticate;

		let mut cached = self.cached.lock().await;
		let now = OffsetDateTime::now_utc();

		if let Some(access) = &*cached
			&& !access.expires_within(now, self.expiry_skew)
		{
			return Ok(access.clone());
		}

		let span = BootstrapSpan::new(STAGE, "token_supplier");

		obs::record_bootstrap_outcome(STAGE, BootstrapOutcome::Attempt);

		let result = span.instrument(self.api.authenticate(&self.request)).await;

		obs::record_bootstrap_outcome(STAGE, BootstrapOutcome::of(&result));

		let access = Arc::new(result?);

		*cached = Some(access.clone());

		Ok(access)
	}

	/// Drops the cached access so the next call re-authenticates.
	pub async fn invalidate(&self) {
		*self.cached.lock().await = None;
	}
}
impl Debug for TokenSupplier {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("TokenSupplier")
			.field("credential_type", &self.request.credential_type())
			.field("tenant_name", &self.request.tenant_name())
			.field("expiry_skew", &self.expiry_skew)
			.finish()
	}
}

#[cfg(test)]
mod tests {
	// std
	use std::sync::atomic::{AtomicUsize, Ordering};
	// self
	use super::*;
	use crate::{
		auth::{CredentialBindings, CredentialType, Secret},
		keystone::{AuthFuture, Token},
	};

	struct CountingApi {
		calls: AtomicUsize,
		lifetime: Duration,
	}
	impl AuthenticationApi for CountingApi {
		fn authenticate<'a>(&'a self, _request: &'a AuthRequest) -> AuthFuture<'a, Access> {
			Box::pin(async move {
				let call = self.calls.fetch_add(1, Ordering::SeqCst) + 1;

				Ok(Access {
					token: Token {
						id: Secret::new(format!("token-{call}")),
						expires: OffsetDateTime::now_utc() + self.lifetime,
						tenant: None,
					},
					service_catalog: Vec::new(),
				})
			})
		}
	}

	fn supplier(lifetime: Duration) -> (Arc<CountingApi>, TokenSupplier) {
		let api = Arc::new(CountingApi { calls: AtomicUsize::new(0), lifetime });
		let bindings =
			CredentialBindings::from_values("admin", [("userName", "admin"), ("password", "pw")]);
		let request = AuthRequest::from_bindings(CredentialType::PasswordCredentials, &bindings)
			.expect("Password bindings should resolve.");

		(api.clone(), TokenSupplier::new(api, request))
	}

	#[tokio::test]
	async fn cached_access_is_reused_until_expiry() {
		let (api, supplier) = supplier(Duration::hours(1));
		let first = supplier.access().await.expect("First authentication should succeed.");
		let second = supplier.access().await.expect("Cached access should be returned.");

		assert_eq!(first.token.id.expose(), "token-1");
		assert!(Arc::ptr_eq(&first, &second));
		assert_eq!(api.calls.load(Ordering::SeqCst), 1);
	}

	#[tokio::test]
	async fn near_expiry_tokens_are_renewed() {
		let (api, supplier) = supplier(Duration::seconds(30));
		let first = supplier.access().await.expect("First authentication should succeed.");
		let second = supplier.access().await.expect("Renewal should succeed.");

		assert_eq!(first.token.id.expose(), "token-1");
		assert_eq!(second.token.id.expose(), "token-2");
		assert_eq!(api.calls.load(Ordering::SeqCst), 2);
	}

	#[tokio::test]
	async fn invalidate_forces_reauthentication() {
		let (api, supplier) = supplier(Duration::hours(1));

		supplier.access().await.expect("First authentication should succeed.");
		supplier.invalidate().await;

		let renewed = supplier.access().await.expect("Re-authentication should succeed.");

		assert_eq!(renewed.token.id.expose(), "token-2");
		assert_eq!(api.calls.load(Ordering::SeqCst), 2);
	}

	#[tokio::test]
	async fn concurrent_callers_share_one_authentication() {
		let (api, supplier) = supplier(Duration::hours(1));
		let (first, second) = tokio::join!(supplier.access(), supplier.access());

		assert_eq!(
			first.expect("First caller should succeed.").token.id,
			second.expect("Second caller should succeed.").token.id
		);
		assert_eq!(api.calls.load(Ordering::SeqCst), 1);
	}
}
