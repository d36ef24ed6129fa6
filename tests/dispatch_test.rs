//! Tests for tool dispatch over a live orchestrator.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::json;

use pappus::dispatch::{GENERATE_TEXT, GET_LLM_STATUS, TEST_PROVIDERS};
use pappus::{
    AdapterResponse, ExtraParams, Pappus, PappusError, ProviderAdapter, ProviderConfig,
    ProviderId, Result, ToolCall, ToolDispatcher, Usage,
};

// ============================================================================
// Mock adapter
// ============================================================================

struct EchoAdapter {
    healthy: bool,
}

#[async_trait]
impl ProviderAdapter for EchoAdapter {
    async fn initialize(&self) -> Result<()> {
        Ok(())
    }

    async fn generate(
        &self,
        prompt: &str,
        config: &ProviderConfig,
        extra: &ExtraParams,
    ) -> Result<AdapterResponse> {
        let suffix = extra
            .get("suffix")
            .and_then(|v| v.as_str())
            .unwrap_or_default();
        Ok(AdapterResponse::new(
            format!("{prompt}{suffix}"),
            config.model.clone().unwrap_or_default(),
        )
        .usage(Usage::tokens(1, 2)))
    }

    fn is_connected(&self) -> bool {
        self.healthy
    }

    async fn test_connection(&self) -> Result<bool> {
        if self.healthy {
            Ok(true)
        } else {
            Err(PappusError::Http("connection refused".into()))
        }
    }
}

async fn dispatcher() -> ToolDispatcher {
    let orchestrator = Pappus::builder()
        .provider(ProviderConfig::new(ProviderId::OpenAi).model("gpt-4o-mini"))
        .provider(ProviderConfig::new(ProviderId::Ollama).model("llama3"))
        .adapter(ProviderId::OpenAi, |_| {
            Ok(Arc::new(EchoAdapter { healthy: true }) as Arc<dyn ProviderAdapter>)
        })
        .adapter(ProviderId::Ollama, |_| {
            Ok(Arc::new(EchoAdapter { healthy: false }) as Arc<dyn ProviderAdapter>)
        })
        .build()
        .await
        .unwrap();
    ToolDispatcher::new(Arc::new(orchestrator))
}

// ============================================================================
// Tests
// ============================================================================

#[tokio::test]
async fn lists_its_tools() {
    let dispatcher = dispatcher().await;
    assert_eq!(
        dispatcher.tools(),
        &[GENERATE_TEXT, GET_LLM_STATUS, TEST_PROVIDERS]
    );
}

#[tokio::test]
async fn generate_text_returns_the_serialized_result() {
    let dispatcher = dispatcher().await;

    let result = dispatcher
        .handle(
            ToolCall::new(GENERATE_TEXT, "c1")
                .param("prompt", "hello")
                .param("provider", "openai")
                .param("model", "gpt-4o")
                .param("suffix", "!"),
        )
        .await;

    assert_eq!(result.call_id, "c1");
    assert!(!result.is_error(), "{:?}", result.error);
    let value = result.result.unwrap();
    assert_eq!(value["content"], "hello!");
    assert_eq!(value["provider"], "openai");
    assert_eq!(value["model"], "gpt-4o");
    assert_eq!(value["usage"]["total_tokens"], 3);
    assert!(value["latency"].is_f64());
}

#[tokio::test]
async fn generate_text_with_strategy() {
    let dispatcher = dispatcher().await;

    let result = dispatcher
        .handle(
            ToolCall::new(GENERATE_TEXT, "c2")
                .param("prompt", "hi")
                .param("strategy", "load_balanced"),
        )
        .await;

    let value = result.result.unwrap();
    assert_eq!(value["provider"], "openai");
}

#[tokio::test]
async fn engine_errors_become_tool_errors() {
    let dispatcher = dispatcher().await;

    let result = dispatcher
        .handle(
            ToolCall::new(GENERATE_TEXT, "c3")
                .param("prompt", "hi")
                .param("provider", "groq"),
        )
        .await;

    assert_eq!(result.call_id, "c3");
    assert!(result.result.is_none());
    assert_eq!(result.error.as_deref(), Some("provider groq not available"));
}

#[tokio::test]
async fn unknown_strategy_becomes_a_tool_error() {
    let dispatcher = dispatcher().await;

    let result = dispatcher
        .handle(
            ToolCall::new(GENERATE_TEXT, "c4")
                .param("prompt", "hi")
                .param("strategy", "fastest"),
        )
        .await;

    assert_eq!(result.error.as_deref(), Some("unknown strategy: fastest"));
}

#[tokio::test]
async fn get_llm_status_lists_live_providers() {
    let dispatcher = dispatcher().await;

    let result = dispatcher.handle(ToolCall::new(GET_LLM_STATUS, "s1")).await;

    let rows = result.result.unwrap();
    assert_eq!(rows.as_array().unwrap().len(), 2);
    assert_eq!(rows[0]["provider"], "openai");
    assert_eq!(rows[0]["status"], "connected");
    assert_eq!(rows[1]["provider"], "ollama");
    assert_eq!(rows[1]["status"], "disconnected");
    assert_eq!(rows[1]["model"], "llama3");
}

#[tokio::test]
async fn test_providers_reports_each_provider() {
    let dispatcher = dispatcher().await;

    let result = dispatcher.handle(ToolCall::new(TEST_PROVIDERS, "t1")).await;

    assert_eq!(
        result.result.unwrap(),
        json!({"openai": true, "ollama": false})
    );
}

#[tokio::test]
async fn unknown_tool_is_reported() {
    let dispatcher = dispatcher().await;

    let result = dispatcher.handle(ToolCall::new("summarize", "u1")).await;

    assert_eq!(result.call_id, "u1");
    assert_eq!(result.error.as_deref(), Some("tool not found: summarize"));
}

#[tokio::test]
async fn handle_text_parses_json_messages() {
    let dispatcher = dispatcher().await;

    let result = dispatcher
        .handle_text(
            r#"{"tool": "generate_text", "call_id": "j1", "parameters": {"prompt": "ping", "provider": "ollama"}}"#,
        )
        .await;

    assert_eq!(result.call_id, "j1");
    assert_eq!(result.result.unwrap()["content"], "ping");
}

#[tokio::test]
async fn handle_text_rejects_invalid_json() {
    let dispatcher = dispatcher().await;

    let result = dispatcher.handle_text("{not json").await;

    assert_eq!(result.call_id, "");
    assert!(result.result.is_none());
    assert!(result.error.unwrap().starts_with("invalid JSON"));
}
