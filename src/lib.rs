//! FitTrack Trends - deterministic analytics engine for fitness dashboards
//!
//! Trends turns raw, irregularly timed log records (meals, workouts, weight
//! readings) into bucketed trend series, period-over-period comparisons, streaks
//! and normalized distributions. Every computation is a pure function of the
//! records, a range token and an injected "today".
//!
//! ## Modules
//!
//! - **Primitives**: range resolution, bucketing, change, distribution, streaks, smoothing
//! - **Assemblers**: one UI-ready metric per dashboard card
//! - **Dashboard**: every metric for one snapshot in a single document

pub mod assemblers;
pub mod bucket;
pub mod change;
pub mod config;
pub mod dashboard;
pub mod distribution;
pub mod error;
pub mod range;
pub mod smoothing;
pub mod snapshot;
pub mod streak;
pub mod types;

// FFI bindings for C interop (always available for cdylib/staticlib builds)
pub mod ffi;

pub use bucket::{Bucket, Granularity};
pub use change::{percent_change, PercentChange};
pub use config::EngineConfig;
pub use dashboard::{build_dashboard, dashboard_json, Dashboard};
pub use distribution::{normalize, Share, TieBreak};
pub use error::AnalyticsError;
pub use range::{resolve_periods, resolve_start, AnalysisWindow, PeriodPair, RangeToken};
pub use snapshot::{failing_record_count, RecordIssue, RecordKind, Snapshot};
pub use streak::{compute_streaks, Streaks};
pub use types::{
    EffortLevel, Macro, MealRecord, MealType, Profile, WeightRecord, WorkoutRecord, WorkoutType,
};

/// Engine version embedded in every dashboard
pub const ENGINE_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Producer name for dashboard documents
pub const PRODUCER_NAME: &str = "fittrack-trends";
