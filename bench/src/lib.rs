//! Benchmark utilities for rusty_update.
//!
//! This crate provides benchmarking infrastructure for the update registry and the frame loop,
//! including:
//!
//! - **Microbenchmarks**: dispatch, subscribe/unsubscribe and driver ticks in isolation
//! - **Scenario benchmarks**: many subscribers with churn, compared against one host hook per
//!   subscriber
//! - **Frame timing**: per-frame statistics over a frame loop run
//!
//! # Running Benchmarks
//!
//! ```bash
//! # Run all benchmarks
//! cargo bench -p rusty_update_bench
//!
//! # Run specific benchmark group
//! cargo bench -p rusty_update_bench -- dispatch
//! ```
//!
//! # Benchmark Results
//!
//! Results are written to `target/criterion/` with HTML reports for visualization.

pub mod frame_timer;
pub mod scenarios;
