use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::domain::{
    models::ProjectAnalysis,
    ports::outbound::{AnalysisError, TranscriptAnalyzer},
};

pub const DEFAULT_BASE_URL: &str = "https://openrouter.ai/api/v1";
const TOOL_NAME: &str = "create_project_analysis";

const SYSTEM_PROMPT: &str = "You are a senior insights editor. Given a call transcript, \
produce a brief that can immediately drive expert sourcing. Infer the objective, time \
window, geographies, stage focus, priorities and exclusions. Write a specific project \
title of at most 70 characters, a 4-6 sentence description, exactly 10 one-sentence \
expert questions that surface non-obvious signals, and a concise search query for \
finding operators and practitioners with the right experience.";

/// Transcript analyzer backed by an OpenAI-compatible chat completions API.
pub struct OpenRouterAnalyzer {
    http: reqwest::Client,
    api_key: Option<String>,
    base_url: String,
    model: String,
}

impl OpenRouterAnalyzer {
    pub fn new(
        api_key: Option<String>,
        base_url: impl Into<String>,
        model: impl Into<String>,
    ) -> Self {
        Self {
            http: reqwest::Client::new(),
            api_key: api_key.filter(|key| !key.is_empty()),
            base_url: base_url.into(),
            model: model.into(),
        }
    }

    fn request_body(&self, transcript: &str) -> Value {
        json!({
            "model": self.model,
            "messages": [
                { "role": "system", "content": SYSTEM_PROMPT },
                {
                    "role": "user",
                    "content": format!(
                        "Please analyze this call transcript and create a project analysis:\n\n<TRANSCRIPT>\n{}\n</TRANSCRIPT>",
                        transcript
                    )
                }
            ],
            "tools": [{
                "type": "function",
                "function": {
                    "name": TOOL_NAME,
                    "description": "Create project analysis from call transcript",
                    "parameters": {
                        "type": "object",
                        "properties": {
                            "project_title": { "type": "string" },
                            "project_description": { "type": "string" },
                            "questions": { "type": "array", "items": { "type": "string" } },
                            "expert_search_query": { "type": "string" }
                        },
                        "required": [
                            "project_title",
                            "project_description",
                            "questions",
                            "expert_search_query"
                        ]
                    }
                }
            }],
            "tool_choice": { "type": "function", "function": { "name": TOOL_NAME } }
        })
    }
}

#[async_trait]
impl TranscriptAnalyzer for OpenRouterAnalyzer {
    async fn analyze(&self, transcript: &str) -> Result<ProjectAnalysis, AnalysisError> {
        let api_key = self
            .api_key
            .as_ref()
            .ok_or_else(|| AnalysisError::Request("LLM API key not configured".to_string()))?;

        let url = format!("{}/chat/completions", self.base_url.trim_end_matches('/'));
        let resp = self
            .http
            .post(url)
            .bearer_auth(api_key)
            .json(&self.request_body(transcript))
            .send()
            .await
            .map_err(|e| AnalysisError::Request(e.to_string()))?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(AnalysisError::Request(format!("HTTP {}: {}", status, body)));
        }

        let completion = resp
            .json::<ChatCompletion>()
            .await
            .map_err(|e| AnalysisError::Invalid(e.to_string()))?;

        parse_tool_call(completion)
    }
}

#[derive(Debug, Deserialize)]
struct ChatCompletion {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChatMessage,
}

#[derive(Debug, Deserialize)]
struct ChatMessage {
    #[serde(default)]
    tool_calls: Vec<ToolCall>,
}

#[derive(Debug, Deserialize)]
struct ToolCall {
    function: FunctionCall,
}

#[derive(Debug, Deserialize)]
struct FunctionCall {
    name: String,
    /// JSON-encoded arguments.
    arguments: String,
}

fn parse_tool_call(completion: ChatCompletion) -> Result<ProjectAnalysis, AnalysisError> {
    let call = completion
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.message.tool_calls.into_iter().next())
        .filter(|call| call.function.name == TOOL_NAME)
        .ok_or_else(|| AnalysisError::Invalid(format!("no {} tool call in response", TOOL_NAME)))?;

    serde_json::from_str(&call.function.arguments)
        .map_err(|e| AnalysisError::Invalid(format!("malformed tool arguments: {}", e)))
}
