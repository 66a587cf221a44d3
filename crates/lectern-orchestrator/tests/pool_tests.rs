// SPDX-FileCopyrightText: 2026 Lectern Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Provider pool, topic analyzer and question generator behaviour against mock providers.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use lectern_config::{LecternConfig, ProviderKind};
use lectern_core::{LecternError, ProviderAdapter};
use lectern_orchestrator::{
    AnalysisSource, FanOutJob, ProviderPool, QUESTION_COUNT, QuestionGenerator, QuestionSource,
    ResearchType, TopicAnalyzer,
};
use lectern_test_utils::{MockProvider, MockReply};

struct Mocks {
    openai: Arc<MockProvider>,
    anthropic: Arc<MockProvider>,
    gemini: Arc<MockProvider>,
}

impl Mocks {
    fn new() -> Self {
        Self {
            openai: Arc::new(MockProvider::new("openai")),
            anthropic: Arc::new(MockProvider::new("anthropic")),
            gemini: Arc::new(MockProvider::new("gemini")),
        }
    }

    fn pool(&self, config: &LecternConfig) -> ProviderPool {
        let by_kind: BTreeMap<ProviderKind, Arc<MockProvider>> = BTreeMap::from([
            (ProviderKind::Openai, self.openai.clone()),
            (ProviderKind::Anthropic, self.anthropic.clone()),
            (ProviderKind::Gemini, self.gemini.clone()),
        ]);
        ProviderPool::from_config(config, |kind, _| {
            Ok(by_kind[&kind].clone() as Arc<dyn ProviderAdapter>)
        })
        .unwrap()
        .with_retry_backoff(Duration::ZERO)
    }
}

fn job(label: &str, model_id: &str) -> FanOutJob {
    FanOutJob {
        label: label.into(),
        model_id: model_id.into(),
        prompt: format!("prompt for {label}"),
        system_prompt: None,
    }
}

#[tokio::test]
async fn factory_runs_once_per_provider() {
    let mut config = LecternConfig::default();
    let mut extra = config.models[0].clone();
    extra.id = "gpt4-mini".into();
    config.models.push(extra);

    let mut calls = Vec::new();
    let pool = ProviderPool::from_config(&config, |kind, _| {
        calls.push(kind);
        Ok(Arc::new(MockProvider::new(kind.to_string())) as Arc<dyn ProviderAdapter>)
    })
    .unwrap();

    assert_eq!(calls.len(), 3);
    assert_eq!(pool.model_ids().count(), 4);
    assert!(pool.contains("gpt4-mini"));
}

#[tokio::test]
async fn complete_maps_roster_settings_into_request() {
    let mocks = Mocks::new();
    let pool = mocks.pool(&LecternConfig::default());

    let response = pool.complete("claude", "hello", Some("be brief")).await.unwrap();
    assert_eq!(response.content, "mock response");

    let requests = mocks.anthropic.requests().await;
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].model, "claude-3-opus-20240229");
    assert_eq!(requests[0].system_prompt.as_deref(), Some("be brief"));
    assert_eq!(requests[0].temperature, Some(0.7));
    assert_eq!(requests[0].max_tokens, 4096);
}

#[tokio::test]
async fn unknown_model_is_a_validation_error() {
    let pool = Mocks::new().pool(&LecternConfig::default());
    let err = pool.complete("llama", "hi", None).await.unwrap_err();
    assert!(matches!(err, LecternError::Validation(_)), "got: {err}");
}

#[tokio::test]
async fn transient_failures_are_retried() {
    let mocks = Mocks::new();
    mocks
        .openai
        .push_reply(MockReply::Fail {
            message: "429 rate limited".into(),
            transient: true,
        })
        .await;
    let pool = mocks.pool(&LecternConfig::default());

    let response = pool.complete("gpt4", "hi", None).await.unwrap();
    assert_eq!(response.content, "mock response");
    assert_eq!(mocks.openai.calls(), 2);
}

#[tokio::test]
async fn retries_stop_at_the_configured_limit() {
    let mut mocks = Mocks::new();
    mocks.gemini = Arc::new(MockProvider::failing("gemini", "503", true));
    let pool = mocks.pool(&LecternConfig::default());

    let err = pool.complete("gemini", "hi", None).await.unwrap_err();
    assert!(err.is_transient());
    // one attempt plus max_retries = 2
    assert_eq!(mocks.gemini.calls(), 3);
}

#[tokio::test]
async fn permanent_failures_are_not_retried() {
    let mut mocks = Mocks::new();
    mocks.anthropic = Arc::new(MockProvider::failing("anthropic", "401 bad key", false));
    let pool = mocks.pool(&LecternConfig::default());

    assert!(pool.complete("claude", "hi", None).await.is_err());
    assert_eq!(mocks.anthropic.calls(), 1);
}

#[tokio::test]
async fn slow_calls_time_out() {
    let mut mocks = Mocks::new();
    mocks.openai = Arc::new(MockProvider::new("openai").with_delay(Duration::from_millis(500)));
    let mut config = LecternConfig::default();
    config.providers.openai.max_retries = 0;
    let pool = mocks
        .pool(&config)
        .with_timeout("openai", Duration::from_millis(20));

    let err = pool.complete("gpt4", "hi", None).await.unwrap_err();
    assert!(matches!(err, LecternError::Timeout { ref provider, .. } if provider == "openai"));
}

#[tokio::test]
async fn structured_completion_parses_fenced_json() {
    let mocks = Mocks::new();
    mocks
        .openai
        .push_reply(MockReply::Text(
            "```json\n{\"score\": 0.4, \"reasoning\": \"ok\"}\n```".into(),
        ))
        .await;
    let pool = mocks.pool(&LecternConfig::default());

    let object = pool
        .structured_completion("gpt4", "rate it", None, &["score", "reasoning"])
        .await
        .unwrap();
    assert_eq!(object["score"], 0.4);
}

#[tokio::test]
async fn structured_completion_reports_missing_keys() {
    let mocks = Mocks::new();
    mocks
        .openai
        .push_reply(MockReply::Text("{\"score\": 0.4}".into()))
        .await;
    let pool = mocks.pool(&LecternConfig::default());

    let err = pool
        .structured_completion("gpt4", "rate it", None, &["score", "reasoning"])
        .await
        .unwrap_err();
    assert!(!err.is_transient());
    assert!(err.to_string().contains("missing keys: reasoning"), "got: {err}");
}

#[tokio::test]
async fn fan_out_keeps_job_order_and_partial_failures() {
    let mut mocks = Mocks::new();
    mocks.anthropic = Arc::new(MockProvider::failing("anthropic", "401 bad key", false));
    let pool = mocks.pool(&LecternConfig::default());

    let report = pool
        .fan_out(vec![job("a", "gpt4"), job("b", "claude"), job("c", "gemini")])
        .await
        .unwrap();

    let ok: Vec<_> = report.successes.iter().map(|s| s.label.as_str()).collect();
    assert_eq!(ok, ["a", "c"]);
    assert_eq!(report.failures.len(), 1);
    assert_eq!(report.failures[0].label, "b");
    assert!(report.failures[0].error.contains("401 bad key"));
}

#[tokio::test]
async fn fan_out_fails_when_everything_fails() {
    let mut mocks = Mocks::new();
    mocks.openai = Arc::new(MockProvider::failing("openai", "down", false));
    mocks.gemini = Arc::new(MockProvider::failing("gemini", "down", false));
    let pool = mocks.pool(&LecternConfig::default());

    let err = pool
        .fan_out(vec![job("a", "gpt4"), job("b", "gemini")])
        .await
        .unwrap_err();
    match err {
        LecternError::AllProvidersFailed {
            attempted,
            failures,
        } => {
            assert_eq!(attempted, 2);
            assert_eq!(failures[0].0, "a");
            assert_eq!(failures[1].0, "b");
        }
        other => panic!("expected AllProvidersFailed, got {other}"),
    }
}

#[tokio::test]
async fn empty_fan_out_is_an_empty_report() {
    let pool = Mocks::new().pool(&LecternConfig::default());
    let report = pool.fan_out(Vec::new()).await.unwrap();
    assert!(report.successes.is_empty());
    assert!(report.failures.is_empty());
}

#[tokio::test]
async fn provider_concurrency_is_bounded() {
    let mut mocks = Mocks::new();
    mocks.openai = Arc::new(MockProvider::new("openai").with_delay(Duration::from_millis(50)));
    let mut config = LecternConfig::default();
    config.providers.openai.max_concurrency = 1;
    let pool = mocks.pool(&config);

    let started = Instant::now();
    let report = pool
        .fan_out(vec![job("a", "gpt4"), job("b", "gpt4"), job("c", "gpt4")])
        .await
        .unwrap();
    assert_eq!(report.successes.len(), 3);
    assert!(started.elapsed() >= Duration::from_millis(150));
}

// --- topic analysis ---

fn analyzer(pool: ProviderPool) -> TopicAnalyzer {
    let config = LecternConfig::default();
    let roster = config.models.iter().map(|m| m.id.clone()).collect();
    TopicAnalyzer::new(Arc::new(pool), config.topic, roster)
}

#[tokio::test]
async fn remote_analysis_weights_dimension_scores() {
    let mocks = Mocks::new();
    mocks
        .openai
        .push_reply(MockReply::Text(
            r#"{"technical_score": 0.9, "theoretical_score": 0.2, "societal_score": 0.1, "reasoning": "systems topic"}"#.into(),
        ))
        .await;
    let topics = analyzer(mocks.pool(&LecternConfig::default()));

    let analysis = topics.analyze("Raft consensus internals").await.unwrap();
    assert_eq!(analysis.selected_model, "gpt4");
    assert!((analysis.scores["gpt4"] - 0.84).abs() < 1e-9);
    assert!((analysis.scores["claude"] - 0.22).abs() < 1e-9);
    assert!((analysis.scores["gemini"] - 0.44).abs() < 1e-9);
    assert_eq!(analysis.reasoning, "systems topic");
    assert_eq!(
        analysis.source,
        AnalysisSource::Remote {
            model: "gpt4".into()
        }
    );
}

#[tokio::test]
async fn remote_scores_are_clamped() {
    let mocks = Mocks::new();
    mocks
        .openai
        .push_reply(MockReply::Text(
            r#"{"technical_score": 1.5, "theoretical_score": -1, "societal_score": 0, "reasoning": ""}"#.into(),
        ))
        .await;
    let topics = analyzer(mocks.pool(&LecternConfig::default()));

    let analysis = topics.analyze("anything").await.unwrap();
    assert_eq!(analysis.dimensions["technical"], 1.0);
    assert_eq!(analysis.dimensions["theoretical"], 0.0);
}

#[tokio::test]
async fn malformed_remote_answer_falls_back_to_keywords() {
    let mocks = Mocks::new();
    mocks
        .openai
        .push_reply(MockReply::Text("I think Gemini would be best.".into()))
        .await;
    let topics = analyzer(mocks.pool(&LecternConfig::default()));

    let analysis = topics
        .analyze("The ethics and social impact of AI on human culture")
        .await
        .unwrap();

    assert!(matches!(analysis.source, AnalysisSource::Heuristic { .. }));
    assert_eq!(analysis.selected_model, "gemini");
    // five of eleven societal terms, through gemini's 0.8 weight, plus the 0.2 baseline
    assert!((analysis.scores["gemini"] - (0.8 * 5.0 / 11.0 + 0.2)).abs() < 1e-9);
    assert!((analysis.scores["gpt4"] - 0.2).abs() < 1e-9);
}

#[tokio::test]
async fn heuristic_ties_go_to_the_smallest_id() {
    let mut mocks = Mocks::new();
    mocks.openai = Arc::new(MockProvider::failing("openai", "down", false));
    let topics = analyzer(mocks.pool(&LecternConfig::default()));

    let analysis = topics.analyze("zzz qqq").await.unwrap();
    assert_eq!(analysis.selected_model, "claude");
    assert!(analysis.scores.values().all(|s| (s - 0.2).abs() < 1e-9));
}

// --- research questions ---

fn questions(pool: ProviderPool) -> QuestionGenerator {
    QuestionGenerator::new(Arc::new(pool), LecternConfig::default().topic)
}

#[tokio::test]
async fn remote_questions_are_read_from_the_list() {
    let mocks = Mocks::new();
    mocks
        .anthropic
        .push_reply(MockReply::Text(
            "Some questions worth asking:\n\n\
             - What theoretical framework best explains Raft?\n\
             - How is leader election implemented?\n\
             3. What is the future of consensus research?\n"
                .into(),
        ))
        .await;
    let generator = questions(mocks.pool(&LecternConfig::default()));

    let set = generator.generate("Raft", "claude").await.unwrap();
    assert_eq!(
        set.source,
        QuestionSource::Remote {
            model: "claude".into()
        }
    );
    assert_eq!(set.model_id, "claude");
    assert_eq!(set.focus, "theoretical");

    let texts: Vec<&str> = set.questions.iter().map(|q| q.text.as_str()).collect();
    assert_eq!(
        texts,
        [
            "What theoretical framework best explains Raft?",
            "How is leader election implemented?",
            "What is the future of consensus research?",
        ]
    );
    assert_eq!(set.questions[0].category, "theoretical");
    assert_eq!(set.questions[0].research_type, ResearchType::Academic);
    assert_eq!(set.questions[1].category, "general");
    assert_eq!(set.questions[1].research_type, ResearchType::Technical);
    assert_eq!(set.questions[2].research_type, ResearchType::Trend);

    let requests = mocks.anthropic.requests().await;
    assert_eq!(requests.len(), 1);
    assert!(requests[0].prompt.contains("theoretical perspective"));
    assert!(requests[0].prompt.contains("historical context"));
}

#[tokio::test]
async fn remote_questions_are_capped() {
    let mocks = Mocks::new();
    let reply = (1..=8)
        .map(|i| format!("- Question {i}?"))
        .collect::<Vec<_>>()
        .join("\n");
    mocks.openai.push_reply(MockReply::Text(reply)).await;
    let generator = questions(mocks.pool(&LecternConfig::default()));

    let set = generator.generate("Raft", "gpt4").await.unwrap();
    assert_eq!(set.focus, "technical");
    assert_eq!(set.questions.len(), QUESTION_COUNT);
    assert_eq!(set.questions[4].text, "Question 5?");
}

#[tokio::test]
async fn failed_remote_questions_fall_back_to_templates() {
    let mut mocks = Mocks::new();
    mocks.anthropic = Arc::new(MockProvider::failing("anthropic", "503 overloaded", false));
    let generator = questions(mocks.pool(&LecternConfig::default()));

    let set = generator.generate("Raft", "claude").await.unwrap();
    match &set.source {
        QuestionSource::Template { reason } => assert!(reason.contains("503 overloaded")),
        other => panic!("expected template questions, got {other:?}"),
    }
    assert_eq!(set.questions.len(), QUESTION_COUNT);
    assert_eq!(set.questions[0].text, "What is the historical development of Raft?");
    assert_eq!(set.questions[0].category, "general");
    assert_eq!(set.questions[0].research_type, ResearchType::General);
    assert_eq!(
        set.questions[1].text,
        "How does Raft relate to existing theoretical frameworks?"
    );
    assert_eq!(set.questions[1].category, "theoretical");
    assert_eq!(set.questions[1].research_type, ResearchType::Technical);
}

#[tokio::test]
async fn reply_without_list_items_falls_back_to_templates() {
    let mocks = Mocks::new();
    mocks
        .gemini
        .push_reply(MockReply::Text("Happy to help with that topic!".into()))
        .await;
    let generator = questions(mocks.pool(&LecternConfig::default()));

    let set = generator.generate("AI regulation", "gemini").await.unwrap();
    assert!(matches!(set.source, QuestionSource::Template { .. }));
    assert_eq!(set.focus, "societal");
    assert_eq!(
        set.questions[0].text,
        "What are the ethical implications of AI regulation?"
    );
    assert_eq!(set.questions[0].category, "impact");
    assert_eq!(mocks.gemini.calls(), 1);
}

#[tokio::test]
async fn questions_for_unknown_model_are_rejected() {
    let generator = questions(Mocks::new().pool(&LecternConfig::default()));
    let err = generator.generate("Raft", "mystery").await.unwrap_err();
    assert!(matches!(err, LecternError::Validation(_)));
}
