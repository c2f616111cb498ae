//! Pipeline services.

pub mod artifact;
pub mod batch;
pub mod dispatch;
pub mod pipeline;
pub mod transform;

pub use dispatch::{DispatchOutcome, HttpSink, SinkResponse, TelemetrySink};
pub use pipeline::{PipelineStatus, run_pipeline};
