//! Statistical utilities for the neuroevo project.
//!
//! This crate provides the numeric summaries used throughout training and
//! analysis:
//!
//! - **Descriptive statistics**: min, max, mean, variance, and standard
//!   deviation of a fitness sample
//! - **Cross-run aggregation**: per-generation mean and spread of a metric
//!   across independent runs of the same experiment
//!
//! # Modules
//!
//! - [`descriptive`]: Descriptive statistics for summarizing datasets
//! - [`aggregate`]: Generation-aligned aggregation across runs
//!
//! # Examples
//!
//! ## Summarizing a fitness sample
//!
//! ```
//! use neuroevo_stats::descriptive::DescriptiveStats;
//!
//! let values = [1.0, 2.0, 3.0, 4.0, 5.0];
//! let stats = DescriptiveStats::new(values).unwrap();
//! assert_eq!(stats.mean, 3.0);
//! ```
//!
//! ## Aggregating best-fitness curves across seeds
//!
//! ```
//! use neuroevo_stats::aggregate::aggregate_by_generation;
//!
//! let run_a = vec![(0, 10.0), (1, 20.0)];
//! let run_b = vec![(0, 30.0), (1, 40.0)];
//! let summary = aggregate_by_generation(&[run_a, run_b]);
//! assert_eq!(summary[0].mean, 20.0);
//! assert_eq!(summary[1].runs, 2);
//! ```

pub mod aggregate;
pub mod descriptive;
