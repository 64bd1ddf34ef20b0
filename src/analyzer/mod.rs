//! Analyzer module - scoring, aggregation and rating of study documents

pub mod checklist;
pub mod document;
pub mod engine;
pub mod rating;
pub mod scorer;

pub use checklist::evaluate;
pub use document::{normalize, Document};
pub use engine::{AggregateStats, EvaluationEngine};
pub use rating::{RatingClassifier, RatingThresholds, ThresholdPair};
pub use scorer::score;
