// SPDX-FileCopyrightText: 2026 Lectern Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Builds provider adapters, the pool, the embedder and the section archive from config.

use std::sync::Arc;

use lectern_anthropic::AnthropicProvider;
use lectern_config::{LecternConfig, ProviderConfig, ProviderKind};
use lectern_core::{EmbeddingAdapter, LecternError, ProviderAdapter};
use lectern_gemini::GeminiProvider;
use lectern_memory::{ArchiveSettings, SectionArchive, SqliteVectorStore};
use lectern_openai::{OpenAiEmbedder, OpenAiProvider};
use lectern_orchestrator::{ProviderPool, SemanticProfiler};
use tracing::info;

/// Creates the adapter for one provider kind.
pub fn provider_adapter(
    kind: ProviderKind,
    config: &ProviderConfig,
) -> Result<Arc<dyn ProviderAdapter>, LecternError> {
    let adapter: Arc<dyn ProviderAdapter> = match kind {
        ProviderKind::Openai => Arc::new(OpenAiProvider::new(config)?),
        ProviderKind::Anthropic => Arc::new(AnthropicProvider::new(config)?),
        ProviderKind::Gemini => Arc::new(GeminiProvider::new(config)?),
    };
    Ok(adapter)
}

pub fn build_pool(config: &LecternConfig) -> Result<Arc<ProviderPool>, LecternError> {
    ProviderPool::from_config(config, provider_adapter).map(Arc::new)
}

/// The embedding adapter named by `[vector_store]`.
pub fn build_embedder(config: &LecternConfig) -> Result<Arc<dyn EmbeddingAdapter>, LecternError> {
    let store_config = &config.vector_store;
    match store_config.embedding_provider {
        ProviderKind::Openai => Ok(Arc::new(OpenAiEmbedder::new(
            config.providers.get(ProviderKind::Openai),
            store_config.embedding_model.clone(),
        )?)),
        other => Err(LecternError::Config(format!(
            "embeddings are not available for provider `{other}`"
        ))),
    }
}

/// Semantic profiler over the configured indicators, or `None` when
/// `semantic_weight` is zero.
pub fn build_semantic_profiler(
    config: &LecternConfig,
) -> Result<Option<Arc<SemanticProfiler>>, LecternError> {
    if config.assignment.semantic_weight <= 0.0 {
        return Ok(None);
    }
    let profiler = SemanticProfiler::new(build_embedder(config)?, &config.indicators);
    Ok(Some(Arc::new(profiler)))
}

/// Opens the archive database and its embedding adapter.
pub async fn build_archive(config: &LecternConfig) -> Result<Arc<SectionArchive>, LecternError> {
    let store_config = &config.vector_store;
    let embedder = build_embedder(config)?;
    let store = SqliteVectorStore::open(&store_config.database_path).await?;
    info!(path = %store_config.database_path, "archive opened");

    Ok(Arc::new(SectionArchive::new(
        embedder,
        Arc::new(store),
        ArchiveSettings::from(store_config),
    )))
}
