//! Paceline - analysis engine for runner activity telemetry
//!
//! Paceline ingests one activity's raw telemetry (time-aligned distance,
//! velocity, and heart-rate samples) and classifies it as a steady "base"
//! effort or a structured "interval" workout, extracting a compact numeric
//! summary either way. The pipeline is deterministic and purely functional:
//! smoothing → change-point segmentation → per-block periodicity check →
//! alternation pairing → summary extraction.
//!
//! ## Modules
//!
//! - **smoothing**: centered moving-average denoising of the velocity signal
//! - **alternation**: matched-filter transition detection (direct and spectral)
//! - **segmentation**: PELT change-point partitioning and repetition pairing
//! - **extract**: interval and base summary extraction with outlier rejection
//! - **pipeline**: the public `summarize` entry point

pub mod alternation;
pub mod config;
pub mod error;
pub mod extract;
pub mod pipeline;
pub mod segmentation;
pub mod smoothing;
pub mod types;

mod stats;

pub use alternation::{find_alternations, is_periodic, PeakMode, Polarity};
pub use config::AnalysisConfig;
pub use error::AnalysisError;
pub use extract::{extract_base_data, extract_interval_data, mps_to_min_per_km};
pub use pipeline::{summarize, ActivityAnalyzer};
pub use segmentation::{pair_alternations, pelt_segments};
pub use smoothing::smooth;
pub use types::{ActivityStream, ActivitySummary, AlternationPair, Segment};

/// Engine version embedded in CLI provenance output
pub const ENGINE_VERSION: &str = env!("CARGO_PKG_VERSION");
