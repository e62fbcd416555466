//! Token endpoint client contract and its reqwest implementation.

// crates.io
use reqwest::header::{ACCEPT, CONTENT_TYPE};
// self
use crate::{
	_prelude::*,
	error::{ConfigError, TransientError, TransportError},
	keystone::{Access, AuthRequest},
};

const BODY_PREVIEW_LIMIT: usize = 256;

/// Boxed future returned by [`AuthenticationApi`] implementations.
pub type AuthFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T>> + 'a + Send>>;

/// Client for the identity service's token endpoint.
///
/// Implementations must map HTTP 401/403 to [`Error::Unauthorized`], other non-success
/// statuses to [`TransientError`], and connection failures to [`TransportError`].
pub trait AuthenticationApi
where
	Self: Send + Sync,
{
	/// Exchanges `request` for an [`Access`] document.
	fn authenticate<'a>(&'a self, request: &'a AuthRequest) -> AuthFuture<'a, Access>;
}

/// Keystone v2.0 token client backed by [`ReqwestClient`].
#[derive(Clone, Debug)]
pub struct ReqwestAuthenticationApi {
	client: ReqwestClient,
	tokens_url: Url,
}
impl ReqwestAuthenticationApi {
	/// Creates a client posting to `{endpoint}/tokens`.
	pub fn new(client: ReqwestClient, endpoint: &Url) -> Result<Self, ConfigError> {
		let tokens_url = join_path(endpoint, "tokens")?;

		Ok(Self { client, tokens_url })
	}

	/// Token endpoint URL.
	pub fn tokens_url(&self) -> &Url {
		&self.tokens_url
	}
}
impl AuthenticationApi for ReqwestAuthenticationApi {
	fn authenticate<'a>(&'a self, request: &'a AuthRequest) -> AuthFuture<'a, Access> {
		Box::pin(async move {
			let response = self
				.client
				.post(self.tokens_url.clone())
				.header(CONTENT_TYPE, "application/json")
				.header(ACCEPT, "application/json")
				.body(request.to_body().to_string())
				.send()
				.await
				.map_err(TransportError::from)?;
			let status = response.status();
			let body = response.bytes().await.map_err(TransportError::from)?;

			if status.as_u16() == 401 || status.as_u16() == 403 {
				return Err(Error::Unauthorized {
					status: status.as_u16(),
					reason: preview(&body),
				});
			}
			if !status.is_success() {
				return Err(TransientError::UnexpectedResponse {
					message: preview(&body),
					status: status.as_u16(),
				}
				.into());
			}

			Ok(Access::from_json_slice(&body, Some(status.as_u16()))?)
		})
	}
}

/// Joins `path` onto `base`, treating `base` as a directory.
pub(crate) fn join_path(base: &Url, path: &str) -> Result<Url, ConfigError> {
	let mut dir = base.clone();

	if !dir.path().ends_with('/') {
		let with_slash = format!("{}/", dir.path());

		dir.set_path(&with_slash);
	}

	dir.join(path.trim_start_matches('/'))
		.map_err(|source| ConfigError::InvalidEndpoint { value: path.to_owned(), source })
}

fn preview(body: &[u8]) -> String {
	let text = String::from_utf8_lossy(body);
	let text = text.trim();

	if text.is_empty() {
		return "empty response body".into();
	}
	if text.chars().count() <= BODY_PREVIEW_LIMIT {
		return text.to_owned();
	}

	let mut buf = text.chars().take(BODY_PREVIEW_LIMIT).collect::<String>();

	buf.push('…');

	buf
}
