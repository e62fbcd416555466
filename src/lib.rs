//! Typed API metadata registry and client bootstrap for multi-cloud clients: validated
//! descriptors, write-once discovery, ordered module composition, and Keystone-authenticated
//! transports in one crate.

#![deny(clippy::all, missing_docs, unused_crate_dependencies)]

pub mod apis;
pub mod auth;
pub mod context;
pub mod error;
pub mod keystone;
pub mod metadata;
pub mod module;
pub mod obs;
pub mod registry;
pub mod transport;
#[cfg(any(test, feature = "test"))]
#[doc(hidden)]
pub mod _preludet {
	//! Convenience re-exports and fixtures shared by unit and integration tests.

	pub use crate::_prelude::*;

	// self
	use crate::{
		apis::heat,
		metadata::{ApiMetadata, Properties},
	};

	/// Builds the Heat descriptor with its default endpoint swapped for `endpoint`.
	pub fn heat_metadata_at(endpoint: &str) -> ApiMetadata {
		heat::builder()
			.default_endpoint(Url::parse(endpoint).expect("Test endpoint should parse."))
			.build()
			.expect("Heat descriptor fixture should build.")
	}

	/// Property overrides that keep test transports from waiting on slow sockets.
	pub fn fast_test_overrides() -> Properties {
		Properties::new()
			.with(crate::metadata::keys::CONNECTION_TIMEOUT, "2000")
			.with(crate::metadata::keys::SOCKET_TIMEOUT, "2000")
	}

	/// Renders a Keystone v2.0 `access` document exposing one orchestration service.
	pub fn keystone_access_json(
		token: &str,
		expires: OffsetDateTime,
		endpoints: &[(&str, &str)],
	) -> String {
		let expires = expires
			.format(&time::format_description::well_known::Rfc3339)
			.expect("Expiry fixture should format as RFC 3339.");
		let endpoints = endpoints
			.iter()
			.map(|(region, url)| serde_json::json!({ "region": region, "publicURL": url }))
			.collect::<Vec<_>>();

		serde_json::json!({
			"access": {
				"token": {
					"id": token,
					"expires": expires,
					"tenant": { "id": "tenant-id-1", "name": "demo" }
				},
				"serviceCatalog": [
					{ "type": "orchestration", "name": "heat", "endpoints": endpoints },
					{
						"type": "identity",
						"name": "keystone",
						"endpoints": [
							{ "region": "RegionOne", "publicURL": "http://keystone.invalid/v2.0/" }
						]
					}
				]
			}
		})
		.to_string()
	}
}

mod _prelude {
	pub use std::{
		collections::{BTreeMap, BTreeSet, HashMap},
		error::Error as StdError,
		fmt::{Debug, Display, Formatter, Result as FmtResult},
		future::Future,
		pin::Pin,
		str::FromStr,
		sync::Arc,
	};

	pub use async_lock::Mutex as AsyncMutex;
	pub use reqwest::{Client as ReqwestClient, Error as ReqwestError};
	pub use serde::{Deserialize, Serialize};
	pub use thiserror::Error as ThisError;
	pub use time::{Duration, OffsetDateTime};
	pub use url::Url;

	pub use crate::error::{Error, Result};
}

pub use reqwest;
pub use url;
#[cfg(test)] use {color_eyre as _, httpmock as _};
