//! Demonstrates bootstrapping the registered Heat descriptor against a mock Keystone and
//! issuing an authorized request to the regional orchestration endpoint.

// crates.io
use color_eyre::Result;
use httpmock::prelude::*;
use time::{Duration, OffsetDateTime, format_description::well_known::Rfc3339};
use url::Url;
// self
use cloud_api_metadata::{
	apis::heat,
	context::ContextBuilder,
	metadata::{Properties, keys},
	registry::ApiRegistry,
	reqwest::Method,
};

#[tokio::main]
async fn main() -> Result<()> {
	color_eyre::install()?;

	let server = MockServer::start_async().await;
	let expires = (OffsetDateTime::now_utc() + Duration::hours(1)).format(&Rfc3339)?;
	let access = format!(
		"{{\"access\":{{\"token\":{{\"id\":\"demo-token\",\"expires\":\"{expires}\"}},\
		\"serviceCatalog\":[{{\"type\":\"orchestration\",\"name\":\"heat\",\"endpoints\":\
		[{{\"region\":\"RegionOne\",\"publicURL\":\"{}\"}}]}}]}}}}",
		server.url("/v1/demo-tenant")
	);
	let token_mock = server
		.mock_async(|when, then| {
			when.method(POST).path("/v2.0/tokens");
			then.status(200).header("content-type", "application/json").body(access);
		})
		.await;
	let stacks_mock = server
		.mock_async(|when, then| {
			when.method(GET).path("/v1/demo-tenant/stacks").header("X-Auth-Token", "demo-token");
			then.status(200).header("content-type", "application/json").body("{\"stacks\":[]}");
		})
		.await;
	let registry = ApiRegistry::global()?;

	println!("Registered APIs: {:?}.", registry.ids());

	let metadata = registry.lookup(heat::HEAT_API_ID)?;
	let context = ContextBuilder::new(metadata.clone())
		.endpoint(Url::parse(&server.url("/v2.0/"))?)
		.credentials("demo:admin", "s3cret")
		.overrides(Properties::new().with(keys::MAX_RETRIES, "2"))
		.build()?;

	println!("Installed modules: {:?}.", context.installed_modules());

	let transport = context.transport();
	let regions = transport.regions().await?;

	println!("Orchestration regions: {regions:?}.");

	let endpoint = transport.endpoint("RegionOne").await?;
	let response = transport.request(Method::GET, &endpoint, "stacks")?.send().await?;

	println!("GET {}/stacks -> {}.", endpoint.url, response.status());

	token_mock.assert_async().await;
	stacks_mock.assert_async().await;

	Ok(())
}
