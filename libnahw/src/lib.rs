//! Core of a transition-based dependency-and-constituency parser for
//! classical Arabic: syntax graph, shift/reduce transition system, oracle,
//! phrase classifier, feature extraction, and the training/inference
//! drivers that tie them together.

pub mod action;
pub mod config;
pub mod errors;
pub mod features;
pub mod format;
pub mod graph;
pub mod infer;
pub mod lemma;
pub mod model;
pub mod morphology;
pub mod oracle;
pub mod phrase_classifier;
pub mod subgraph;
pub mod train;
pub mod transitions;
pub mod vocab;

pub use errors::{NahwError, Result};
