// self
use crate::obs::{BootstrapOutcome, BootstrapStage};

/// Records a bootstrap outcome via the global metrics recorder (when enabled).
pub fn record_bootstrap_outcome(stage: BootstrapStage, outcome: BootstrapOutcome) {
	#[cfg(feature = "metrics")]
	{
		metrics::counter!(
			"cloud_api_bootstrap_total",
			"stage" => stage.as_str(),
			"outcome" => outcome.as_str()
		)
		.increment(1);
	}

	#[cfg(not(feature = "metrics"))]
	{
		let _ = (stage, outcome);
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn record_bootstrap_outcome_noop_without_metrics() {
		record_bootstrap_outcome(BootstrapStage::Lookup, BootstrapOutcome::Failure);
	}
}
