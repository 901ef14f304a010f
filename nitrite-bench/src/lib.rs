//! Nitrite Benchmark Library
//!
//! Provides benchmark infrastructure for testing Nitrite database performance
//! across different storage backends and feature sets.

pub mod config;
pub mod data_gen;
pub mod stores;
