// self
use crate::{_prelude::*, obs::BootstrapStage};

/// Type alias that resolves to an instrumented future when tracing is enabled.
#[cfg(feature = "tracing")]
pub type InstrumentedStage<F> = tracing::instrument::Instrumented<F>;
/// Passthrough future type when tracing is disabled.
#[cfg(not(feature = "tracing"))]
pub type InstrumentedStage<F> = F;

/// A span builder used by bootstrap stages.
#[derive(Clone, Debug)]
pub struct BootstrapSpan {
	#[cfg(feature = "tracing")]
	span: tracing::Span,
}
impl BootstrapSpan {
	/// Creates a new span tagged with the provided stage + step.
	pub fn new(stage: BootstrapStage, step: &'static str) -> Self {
		#[cfg(feature = "tracing")]
		{
			let span = tracing::info_span!("cloud_api.bootstrap", stage = stage.as_str(), step);

			Self { span }
		}
		#[cfg(not(feature = "tracing"))]
		{
			let _ = (stage, step);

			Self {}
		}
	}

	/// Enters the span for synchronous sections.
	pub fn entered(self) -> BootstrapSpanGuard {
		#[cfg(feature = "tracing")]
		{
			BootstrapSpanGuard { guard: self.span.entered() }
		}
		#[cfg(not(feature = "tracing"))]
		{
			let _ = self;

			BootstrapSpanGuard {}
		}
	}

	/// Instruments an async block without holding a guard across `.await` points.
	pub fn instrument<Fut>(&self, fut: Fut) -> InstrumentedStage<Fut>
	where
		Fut: Future,
	{
		#[cfg(feature = "tracing")]
		{
			use tracing::Instrument;

			fut.instrument(self.span.clone())
		}
		#[cfg(not(feature = "tracing"))]
		{
			fut
		}
	}
}

/// RAII guard returned by [`BootstrapSpan::entered`].
pub struct BootstrapSpanGuard {
	#[cfg(feature = "tracing")]
	#[allow(dead_code)]
	guard: tracing::span::EnteredSpan,
}
impl Debug for BootstrapSpanGuard {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str("BootstrapSpanGuard(..)")
	}
}
