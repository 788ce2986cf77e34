use axum::{extract::State, http::HeaderMap, routing::post, Json, Router};
use serde::Serialize;
use serde_json::Value;
use tracing::instrument;
use uuid::Uuid;

use crate::{
    app_state::AppState,
    domain::models::{CallId, ExternalJobId, ProjectId, SearchRequest},
};

use super::ApiError;

const CALL_ID_HEADER: &str = "x-call-id";
/// Tool name the voice assistant uses for search requests.
const VOICE_TOOL_NAME: &str = "expert_search";

pub fn router() -> Router<AppState> {
    Router::new().route("/", post(start_search))
}

#[derive(Debug, Serialize)]
struct SearchStarted {
    success: bool,
    message: &'static str,
    search_id: ExternalJobId,
    call_id: CallId,
}

/// Accepts both direct JSON bodies and voice-assistant tool calls, so the body is read
/// raw and parsed leniently.
#[instrument(name = "POST /search", skip(app_state, headers, body))]
async fn start_search(
    State(app_state): State<AppState>,
    headers: HeaderMap,
    body: String,
) -> Result<Json<SearchStarted>, ApiError> {
    let parsed = parse_search_body(&body)?;

    let call_id = headers
        .get(CALL_ID_HEADER)
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(CallId::from)
        .or(parsed.call_id);

    let request = SearchRequest {
        query: parsed.query.unwrap_or_default(),
        call_id,
        submitter_name: parsed.submitter_name,
        project_id: parsed.project_id,
    };

    let accepted = app_state.expert_search().start_search(request).await?;

    Ok(Json(SearchStarted {
        success: true,
        message: "Search initiated successfully",
        search_id: accepted.search_id,
        call_id: accepted.call_id,
    }))
}

#[derive(Debug, Default, PartialEq)]
struct SearchBody {
    query: Option<String>,
    call_id: Option<CallId>,
    submitter_name: Option<String>,
    project_id: Option<ProjectId>,
}

fn parse_search_body(raw: &str) -> Result<SearchBody, ApiError> {
    let Ok(body) = serde_json::from_str::<Value>(raw) else {
        tracing::debug!("Search body is not valid JSON");
        return Ok(SearchBody::default());
    };

    if let Some(function) = body
        .pointer("/message/toolCalls/0/function")
        .filter(|function| function.get("name").and_then(Value::as_str) == Some(VOICE_TOOL_NAME))
    {
        // Arguments arrive either as an object or as a JSON-encoded string.
        let arguments = match function.get("arguments") {
            Some(Value::String(encoded)) => serde_json::from_str(encoded).unwrap_or(Value::Null),
            Some(arguments) => arguments.clone(),
            None => Value::Null,
        };

        return Ok(SearchBody {
            query: string_field(&arguments, "search_query"),
            call_id: body
                .pointer("/message/call/id")
                .and_then(Value::as_str)
                .map(CallId::from),
            ..Default::default()
        });
    }

    let project_id = match string_field(&body, "project_id") {
        Some(id) => Some(
            Uuid::parse_str(&id)
                .map(ProjectId::new)
                .map_err(|_| ApiError::bad_request("project_id must be a UUID"))?,
        ),
        None => None,
    };

    Ok(SearchBody {
        query: string_field(&body, "search_query"),
        call_id: string_field(&body, "call_id").map(CallId::from),
        submitter_name: string_field(&body, "submitter_name"),
        project_id,
    })
}

fn string_field(value: &Value, key: &str) -> Option<String> {
    value
        .get(key)
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use axum::{
        body::Body,
        http::{Request, StatusCode},
    };
    use serde_json::json;
    use tower::ServiceExt;

    use super::*;
    use crate::{
        domain::ports::outbound::{GatewayError, MockSearchGateway, MockTranscriptAnalyzer},
        repositories::MockRepository,
        routes::test_support::{app_state, json_body},
    };

    fn post_search(body: impl Into<Body>, call_id: Option<&str>) -> Request<Body> {
        let mut builder = Request::builder()
            .method("POST")
            .uri("/")
            .header("content-type", "application/json");
        if let Some(call_id) = call_id {
            builder = builder.header(CALL_ID_HEADER, call_id);
        }
        builder.body(body.into()).unwrap()
    }

    #[tokio::test]
    async fn direct_request_starts_search() {
        let gateway = MockSearchGateway::new().with_job_id("job-42");
        let app = app_state(Some(gateway.clone()), MockRepository::new(), MockTranscriptAnalyzer::failing());
        let body = json!({ "search_query": "fintech CFOs", "submitter_name": "Ada" }).to_string();

        let response = router()
            .with_state(app.state)
            .oneshot(post_search(body, Some("call-7")))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            json_body(response).await,
            json!({
                "success": true,
                "message": "Search initiated successfully",
                "search_id": "job-42",
                "call_id": "call-7"
            })
        );
        let job = app.searches.store().get(&CallId::new("call-7")).await.unwrap();
        assert_eq!(job.submitter_name.as_deref(), Some("Ada"));
    }

    #[tokio::test]
    async fn voice_tool_call_envelope_is_unwrapped() {
        let gateway = MockSearchGateway::new();
        let app = app_state(Some(gateway.clone()), MockRepository::new(), MockTranscriptAnalyzer::failing());
        let body = json!({
            "message": {
                "call": { "id": "vapi-call-1" },
                "toolCalls": [{
                    "function": {
                        "name": "expert_search",
                        "arguments": { "search_query": "biotech regulatory experts" }
                    }
                }]
            }
        })
        .to_string();

        let response = router()
            .with_state(app.state)
            .oneshot(post_search(body, None))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(json_body(response).await["call_id"], "vapi-call-1");
        assert_eq!(
            gateway.submit_calls(),
            vec![("biotech regulatory experts".to_string(), 30)]
        );
    }

    #[tokio::test]
    async fn missing_query_is_rejected_without_upstream_call() {
        let gateway = MockSearchGateway::new();
        let app = app_state(Some(gateway.clone()), MockRepository::new(), MockTranscriptAnalyzer::failing());
        let service = router().with_state(app.state);

        for body in [
            json!({}).to_string(),
            json!({ "search_query": "" }).to_string(),
            json!({ "search_query": "   " }).to_string(),
            "not json".to_string(),
        ] {
            let response = service.clone().oneshot(post_search(body, None)).await.unwrap();

            assert_eq!(response.status(), StatusCode::BAD_REQUEST);
            assert_eq!(
                json_body(response).await,
                json!({ "error": "search_query is required" })
            );
        }

        assert!(gateway.submit_calls().is_empty());
    }

    #[tokio::test]
    async fn missing_credential_is_500() {
        let app = app_state(None, MockRepository::new(), MockTranscriptAnalyzer::failing());

        let response = router()
            .with_state(app.state)
            .oneshot(post_search(json!({ "search_query": "q" }).to_string(), None))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            json_body(response).await,
            json!({ "error": "Clado API key not configured" })
        );
    }

    #[tokio::test]
    async fn submit_failure_is_500_with_details() {
        let gateway = MockSearchGateway::new()
            .with_submit_error(GatewayError::Unavailable("StatusError: 503: down".to_string()));
        let app = app_state(Some(gateway), MockRepository::new(), MockTranscriptAnalyzer::failing());

        let response = router()
            .with_state(app.state)
            .oneshot(post_search(json!({ "search_query": "q" }).to_string(), None))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = json_body(response).await;
        assert_eq!(body["error"], "Failed to initiate Clado search");
        assert_eq!(body["details"], "StatusError: 503: down");
    }

    #[test]
    fn envelope_with_other_tool_falls_back_to_direct_fields() {
        let raw = json!({
            "search_query": "direct",
            "message": { "toolCalls": [{ "function": { "name": "other", "arguments": {} } }] }
        })
        .to_string();

        let parsed = parse_search_body(&raw).unwrap();

        assert_eq!(parsed.query.as_deref(), Some("direct"));
    }

    #[test]
    fn string_encoded_tool_arguments_are_accepted() {
        let raw = json!({
            "message": {
                "toolCalls": [{
                    "function": {
                        "name": "expert_search",
                        "arguments": "{\"search_query\":\"fintech CFOs\"}"
                    }
                }]
            }
        })
        .to_string();

        assert_eq!(
            parse_search_body(&raw).unwrap().query.as_deref(),
            Some("fintech CFOs")
        );
    }

    #[test]
    fn project_id_must_be_a_uuid() {
        let raw = json!({ "search_query": "q", "project_id": "nope" }).to_string();
        assert!(parse_search_body(&raw).is_err());

        let id = Uuid::new_v4();
        let raw = json!({ "search_query": "q", "project_id": id.to_string() }).to_string();
        assert_eq!(
            parse_search_body(&raw).unwrap().project_id,
            Some(ProjectId::new(id))
        );
    }
}
