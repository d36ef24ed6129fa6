//! Transport-free tool dispatch.
//!
//! A request-dispatch server (WebSocket, stdio, anything that carries JSON)
//! receives tool calls and hands them to [`ToolDispatcher`], which maps them
//! onto the engine and always answers with a [`ToolResult`]. Failures are
//! rendered into the result's `error` field; nothing here returns `Err`.
//!
//! ```text
//!   {"tool": "generate_text", "parameters": {...}, "call_id": "7"}
//!        │
//!        ▼
//!   ToolDispatcher::handle ──► Orchestrator::generate / StatusReporter
//!        │
//!        ▼
//!   {"call_id": "7", "result": {...}}   or   {"call_id": "7", "error": "..."}
//! ```

use std::str::FromStr;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::{debug, instrument, warn};

use crate::engine::Orchestrator;
use crate::types::{ExtraParams, GenerationRequest, ProviderId, Strategy};
use crate::{PappusError, Result};

/// Generate text through the engine.
pub const GENERATE_TEXT: &str = "generate_text";
/// List live providers.
pub const GET_LLM_STATUS: &str = "get_llm_status";
/// Check every live provider.
pub const TEST_PROVIDERS: &str = "test_providers";

const TOOLS: [&str; 3] = [GENERATE_TEXT, GET_LLM_STATUS, TEST_PROVIDERS];

/// An inbound tool invocation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolCall {
    pub tool: String,
    #[serde(default)]
    pub parameters: Map<String, Value>,
    #[serde(default)]
    pub call_id: String,
}

impl ToolCall {
    pub fn new(tool: impl Into<String>, call_id: impl Into<String>) -> Self {
        Self {
            tool: tool.into(),
            parameters: Map::new(),
            call_id: call_id.into(),
        }
    }

    /// Add one parameter.
    pub fn param(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.parameters.insert(key.into(), value.into());
        self
    }
}

/// The answer to a [`ToolCall`]. Exactly one of `result` and `error` is set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolResult {
    pub call_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ToolResult {
    pub fn success(call_id: impl Into<String>, result: Value) -> Self {
        Self {
            call_id: call_id.into(),
            result: Some(result),
            error: None,
        }
    }

    pub fn failure(call_id: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            call_id: call_id.into(),
            result: None,
            error: Some(error.into()),
        }
    }

    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }
}

/// Maps tool calls onto a shared [`Orchestrator`].
#[derive(Clone)]
pub struct ToolDispatcher {
    orchestrator: Arc<Orchestrator>,
}

impl ToolDispatcher {
    pub fn new(orchestrator: Arc<Orchestrator>) -> Self {
        Self { orchestrator }
    }

    /// Names of the tools this dispatcher serves.
    pub fn tools(&self) -> &'static [&'static str] {
        &TOOLS
    }

    /// Parse a JSON-encoded [`ToolCall`] and handle it.
    ///
    /// Malformed input yields an error result with an empty call id.
    pub async fn handle_text(&self, text: &str) -> ToolResult {
        match serde_json::from_str::<ToolCall>(text) {
            Ok(call) => self.handle(call).await,
            Err(e) => {
                warn!(error = %e, "invalid tool call message");
                ToolResult::failure("", format!("invalid JSON: {e}"))
            }
        }
    }

    /// Run one tool call.
    #[instrument(skip(self, call), fields(tool = %call.tool, call_id = %call.call_id))]
    pub async fn handle(&self, call: ToolCall) -> ToolResult {
        let ToolCall {
            tool,
            parameters,
            call_id,
        } = call;

        let outcome = match tool.as_str() {
            GENERATE_TEXT => self.generate_text(parameters).await,
            GET_LLM_STATUS => {
                serde_json::to_value(self.orchestrator.status().list()).map_err(Into::into)
            }
            TEST_PROVIDERS => {
                serde_json::to_value(self.orchestrator.status().test_all().await)
                    .map_err(Into::into)
            }
            other => {
                warn!(tool = other, "tool not found");
                return ToolResult::failure(call_id, format!("tool not found: {other}"));
            }
        };

        match outcome {
            Ok(result) => {
                debug!("tool call succeeded");
                ToolResult::success(call_id, result)
            }
            Err(e) => {
                warn!(error = %e, "tool call failed");
                ToolResult::failure(call_id, e.to_string())
            }
        }
    }

    async fn generate_text(&self, parameters: Map<String, Value>) -> Result<Value> {
        let request = parse_generate_params(parameters)?;
        let result = self.orchestrator.generate(request).await?;
        Ok(serde_json::to_value(result)?)
    }
}

/// Build a [`GenerationRequest`] from `generate_text` parameters.
///
/// Recognized keys are `prompt`, `provider`, `model`, `temperature`,
/// `strategy` and `n`. A `null` value counts as absent. Every other key is
/// forwarded to the adapter as an extra parameter.
pub fn parse_generate_params(parameters: Map<String, Value>) -> Result<GenerationRequest> {
    let mut prompt = None;
    let mut provider = None;
    let mut model = None;
    let mut temperature = None;
    let mut strategy = None;
    let mut n = None;
    let mut extra = ExtraParams::new();

    for (key, value) in parameters {
        match key.as_str() {
            "prompt" => prompt = Some(string_param(&key, value)?),
            "provider" | "model" | "temperature" | "strategy" | "n" if value.is_null() => {}
            "provider" => {
                let name = string_param(&key, value)?;
                let id = ProviderId::from_str(&name)
                    .map_err(|_| PappusError::InvalidInput(format!("unknown provider: {name}")))?;
                provider = Some(id);
            }
            "model" => model = Some(string_param(&key, value)?),
            "temperature" => {
                let t = value.as_f64().ok_or_else(|| type_error(&key, "a number"))?;
                temperature = Some(t as f32);
            }
            "strategy" => strategy = Some(Strategy::from_str(&string_param(&key, value)?)?),
            "n" => {
                let width = value
                    .as_u64()
                    .ok_or_else(|| type_error(&key, "a non-negative integer"))?;
                n = Some(usize::try_from(width).map_err(|_| type_error(&key, "in range"))?);
            }
            _ => extra.insert(key, value),
        }
    }

    let prompt = prompt
        .ok_or_else(|| PappusError::InvalidInput("missing required parameter: prompt".into()))?;
    let mut request = GenerationRequest::new(prompt).extra(extra);
    request.provider = provider;
    request.overrides.model = model;
    request.overrides.temperature = temperature;
    request.strategy = strategy;
    request.n = n;
    Ok(request)
}

fn string_param(key: &str, value: Value) -> Result<String> {
    match value {
        Value::String(s) => Ok(s),
        _ => Err(type_error(key, "a string")),
    }
}

fn type_error(key: &str, expected: &str) -> PappusError {
    PappusError::InvalidInput(format!("parameter `{key}` must be {expected}"))
}
