// SPDX-FileCopyrightText: 2026 Lectern Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test utilities for Lectern integration tests.
//!
//! Mock adapters and fixtures for fast, deterministic tests without
//! external services.
//!
//! - [`MockProvider`]: scripted completion replies, failures, and delays
//! - [`MockEmbedder`]: deterministic bag-of-words embeddings
//! - [`fixtures`]: the standard roster and sample messages

pub mod fixtures;
pub mod mock_embedder;
pub mod mock_provider;

pub use mock_embedder::MockEmbedder;
pub use mock_provider::{MockProvider, MockReply};
