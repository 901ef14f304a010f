//! Spatial integration test module.
//!
//! These tests verify spatial indexing functionality with the full
//! Nitrite database stack.
