//! Optional observability helpers for registry discovery and client bootstrap.
//!
//! # Feature Flags
//!
//! - Enable `tracing` to emit structured spans named `cloud_api.bootstrap` with the `stage`
//!   and `step` (call site) fields.
//! - Enable `metrics` to increment the `cloud_api_bootstrap_total` counter for every
//!   attempt/success/failure, labeled by `stage` + `outcome`.

mod metrics;
mod tracing;

pub use metrics::*;
pub use tracing::*;

// self
use crate::_prelude::*;

/// Bootstrap stages observed by the crate.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum BootstrapStage {
	/// Registry population from the discovery table.
	Discover,
	/// Registry lookup by identifier.
	Lookup,
	/// Module composition for a client context.
	Compose,
	/// Keystone authentication.
	Authenticate,
}
impl BootstrapStage {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			BootstrapStage::Discover => "discover",
			BootstrapStage::Lookup => "lookup",
			BootstrapStage::Compose => "compose",
			BootstrapStage::Authenticate => "authenticate",
		}
	}
}
impl Display for BootstrapStage {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Outcome labels recorded for each stage.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum BootstrapOutcome {
	/// Entry to a stage.
	Attempt,
	/// Successful completion.
	Success,
	/// Failure propagated back to the caller.
	Failure,
}
impl BootstrapOutcome {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			BootstrapOutcome::Attempt => "attempt",
			BootstrapOutcome::Success => "success",
			BootstrapOutcome::Failure => "failure",
		}
	}

	/// Maps a result onto its outcome label.
	pub fn of<T, E>(result: &Result<T, E>) -> Self {
		if result.is_ok() { BootstrapOutcome::Success } else { BootstrapOutcome::Failure }
	}
}
impl Display for BootstrapOutcome {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}
