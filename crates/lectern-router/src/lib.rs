// SPDX-FileCopyrightText: 2026 Lectern Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Section assignment for the Lectern research coordinator.
//!
//! This crate provides:
//! - [`ContentAnalyzer`]: keyword indicator scoring into a [`ContentProfile`]
//! - [`ConfidenceScorer`]: tiered confidence for a (model, section) pair
//! - [`AssignmentBalancer`]: bounded greedy assignment with a fairness pass
//! - [`Coordinator`]: the facade callers use
//!
//! Everything here is synchronous and pure; network calls live in
//! `lectern-orchestrator`.

pub mod analyzer;
pub mod balancer;
pub mod coordinator;
pub mod profile;
pub mod registry;
pub mod scorer;

pub use analyzer::ContentAnalyzer;
pub use balancer::{Assignment, AssignmentBalancer, AssignmentPlan};
pub use coordinator::{Coordinator, join_messages};
pub use profile::ContentProfile;
pub use registry::{ModelCapability, ModelRegistry, Tier};
pub use scorer::{ConfidenceScorer, ScoredCandidate};
