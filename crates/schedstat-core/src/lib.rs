//! Core domain logic for class schedule statistics.
//!
//! This crate contains:
//! - Extraction: classifying calendar event titles into sessions
//! - Aggregation: folding sessions into a [`Report`]

mod aggregate;
pub mod event;
pub mod extract;
pub mod session_type;

pub use aggregate::{
    Aggregator, ByLocation, ByType, CampusVisit, Report, SubjectStats, Tally, aggregate, analyze,
    analyze_parallel,
};
pub use event::{ClassificationError, ClassifiedSession, RawEvent};
pub use extract::classify;
pub use session_type::{LocationCategory, SessionType};
