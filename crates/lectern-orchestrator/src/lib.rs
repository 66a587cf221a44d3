// SPDX-FileCopyrightText: 2026 Lectern Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Multi-provider orchestration for Lectern.
//!
//! - [`ProviderPool`]: concurrency-limited, retrying access to roster models
//! - [`TopicAnalyzer`]: remote scoring with a keyword fallback
//! - [`QuestionGenerator`]: remote research questions with a template fallback
//! - [`SemanticProfiler`]: embedding similarity to each indicator category
//! - [`ResearchPipeline`]: analyze, plan, fan out, archive

pub mod pool;
pub mod questions;
pub mod research;
pub mod semantic;
pub mod topic;

pub use pool::{
    FanOutFailure, FanOutJob, FanOutReport, FanOutSuccess, ProviderPool, parse_json_object,
    strip_code_fences,
};
pub use questions::{
    QUESTION_COUNT, QuestionGenerator, QuestionSet, QuestionSource, ResearchQuestion, ResearchType,
};
pub use research::{ResearchOutcome, ResearchPipeline, SectionDraft, Strategy, split_draft};
pub use semantic::SemanticProfiler;
pub use topic::{AnalysisSource, TopicAnalysis, TopicAnalyzer};
