// SPDX-FileCopyrightText: 2026 Lectern Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Section archive for Lectern.
//!
//! ## Architecture
//!
//! - **SqliteVectorStore**: SQLite persistence with BLOB vectors and JSON metadata
//! - **SectionArchive**: novelty/coherence scoring and per-section performance tracking
//! - **Types**: Section, SectionMetrics, SectionPerformance, vector helpers

pub mod archive;
pub mod store;
pub mod types;

pub use archive::{ArchiveSettings, SUCCESS_QUALITY, SectionArchive};
pub use store::SqliteVectorStore;
pub use types::*;
