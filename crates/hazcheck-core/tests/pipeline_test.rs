//! End-to-end pipeline behavior over a scripted model client

use async_trait::async_trait;
use hazcheck_core::cancel::CancelToken;
use hazcheck_core::config::{KnowledgeServerConfig, Settings};
use hazcheck_core::connector::ContextFetcher;
use hazcheck_core::context::{SourceContext, SourceType};
use hazcheck_core::db::{Database, DocumentType};
use hazcheck_core::error::{HazCheckError, Result};
use hazcheck_core::llm::{
    InferenceClient, InferenceRequest, InferenceResponse, InlineImage, TokenUsage,
};
use hazcheck_core::pipeline::{PipelineStage, ValidationPipeline};
use hazcheck_core::shipment::{Carrier, HazmatShipment, TransportMode};
use hazcheck_core::ValidationStatus;
use std::collections::VecDeque;
use std::sync::Mutex;

/// Scripted client: hands out canned outcomes in order and records
/// every request it saw.
struct ScriptedClient {
    responses: Mutex<VecDeque<Result<InferenceResponse>>>,
    requests: Mutex<Vec<InferenceRequest>>,
}

impl ScriptedClient {
    fn new(responses: Vec<InferenceResponse>) -> Self {
        Self::with_script(responses.into_iter().map(Ok).collect())
    }

    fn with_script(responses: Vec<Result<InferenceResponse>>) -> Self {
        Self {
            responses: Mutex::new(responses.into()),
            requests: Mutex::new(Vec::new()),
        }
    }

    fn requests(&self) -> Vec<InferenceRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl InferenceClient for ScriptedClient {
    async fn generate(&self, request: InferenceRequest) -> Result<InferenceResponse> {
        self.requests.lock().unwrap().push(request);
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(HazCheckError::Inference("script exhausted".to_string())))
    }
}

struct NoContext;

#[async_trait]
impl ContextFetcher for NoContext {
    async fn fetch_server(&self, _server: &KnowledgeServerConfig) -> Result<Vec<SourceContext>> {
        Ok(Vec::new())
    }

    async fn query_server(
        &self,
        _server: &KnowledgeServerConfig,
        _query: &str,
    ) -> Result<Vec<SourceContext>> {
        Ok(Vec::new())
    }
}

struct FixedContext;

#[async_trait]
impl ContextFetcher for FixedContext {
    async fn fetch_server(&self, server: &KnowledgeServerConfig) -> Result<Vec<SourceContext>> {
        Ok(vec![SourceContext::new(
            server.name.clone(),
            SourceType::RemoteServer,
            "flammable liquids forbidden on economy air services",
            server.weight,
        )])
    }

    async fn query_server(
        &self,
        _server: &KnowledgeServerConfig,
        _query: &str,
    ) -> Result<Vec<SourceContext>> {
        Ok(Vec::new())
    }
}

fn response(text: &str, usage: Option<TokenUsage>) -> InferenceResponse {
    InferenceResponse {
        text: text.to_string(),
        usage,
    }
}

fn usage(prompt: u64, candidates: u64) -> TokenUsage {
    TokenUsage {
        prompt_tokens: prompt,
        candidate_tokens: candidates,
        total_tokens: prompt + candidates,
    }
}

fn shipment() -> HazmatShipment {
    HazmatShipment {
        carrier: Carrier::FedEx,
        mode: TransportMode::Air,
        service: "FedEx Priority Overnight".to_string(),
        un_number: "1263".to_string(),
        proper_shipping_name: "Paint".to_string(),
        technical_name: None,
        hazard_class: "3".to_string(),
        packing_group: Some("II".to_string()),
        quantity: 4.0,
        quantity_unit: "L".to_string(),
        packaging_type: None,
        packing_instruction: None,
        cargo_aircraft_only: false,
        reportable_quantity: false,
    }
}

fn open_db() -> Database {
    let db = Database::open_in_memory().expect("open");
    db.initialize().expect("init");
    db
}

const FAIL_VERDICT: &str = r#"```json
{
  "status": "pass",
  "summary": "One blocking problem found.",
  "issues": [
    {
      "description": "Economy service not allowed for accessible DG in Class 3",
      "confidence": 92,
      "regulationReference": "FedEx Express DG service guide",
      "recommendation": "Rebook on Priority Overnight or First Overnight",
      "severity": "Critical",
      "explanation": "Class 3 is accessible DG and is restricted to premium services.",
      "citation": null
    },
    {"description": "Labels look fine", "severity": "Info"}
  ],
  "metadata": {"checkedAgainst": "IATA DGR"}
}
```"#;

#[tokio::test]
async fn test_validate_shipment_derives_status_and_cost() {
    let db = open_db();
    let client = ScriptedClient::new(vec![response(FAIL_VERDICT, Some(usage(1000, 200)))]);
    let settings = Settings::default();
    let pipeline = ValidationPipeline::new(&db, &NoContext, &client, &settings);

    let result = pipeline
        .validate_shipment(&shipment(), None, &CancelToken::new())
        .await
        .expect("validate");

    // The model claimed "pass"; the critical issue makes it a fail.
    assert_eq!(result.status, ValidationStatus::Fail);
    assert_eq!(result.issues.len(), 2);
    assert_eq!(result.issues[0].confidence, 92);
    assert_eq!(
        result.issues[0].regulation_reference,
        "FedEx Express DG service guide"
    );
    assert!(result.issues[0].recommendation.contains("Priority Overnight"));
    assert!(result.issues[0].explanation.is_some());
    assert!(result.metadata.is_some());

    let usage = result.usage.expect("usage attached");
    assert_eq!(usage.model_id, "gemini-2.5-flash");
    assert_eq!(usage.total_tokens, 1200);
    assert!(usage.estimated_cost > 0.0);
}

#[tokio::test]
async fn test_prompt_carries_normalized_un_number_and_context() {
    let db = open_db();
    db.save_document("internal SOP", "never ship aerosols", 70, DocumentType::Text)
        .expect("save");

    let client = ScriptedClient::new(vec![response(
        r#"{"status": "pass", "summary": "ok", "issues": []}"#,
        None,
    )]);
    let mut settings = Settings::default();
    settings.servers.push(KnowledgeServerConfig {
        name: "iata".to_string(),
        url: "http://iata/sse".to_string(),
        enabled: true,
        weight: 90,
    });
    let pipeline = ValidationPipeline::new(&db, &FixedContext, &client, &settings);

    let result = pipeline
        .validate_shipment(&shipment(), None, &CancelToken::new())
        .await
        .expect("validate");
    assert_eq!(result.status, ValidationStatus::Pass);
    assert!(result.usage.is_none());

    let requests = client.requests();
    assert_eq!(requests.len(), 1);
    let prompt = &requests[0].prompt;
    assert!(prompt.contains("UN1263"), "bare digits were not normalized");
    assert!(prompt.contains("[Source: iata | type: remote | weight: 90/100]"));
    assert!(prompt.contains("never ship aerosols"));
    // Remote weight 90 sorts ahead of the local document at 70.
    let remote_at = prompt.find("[Source: iata").expect("remote block");
    let local_at = prompt.find("[Source: internal SOP").expect("local block");
    assert!(remote_at < local_at);
}

#[tokio::test]
async fn test_unreadable_un_number_is_not_mangled() {
    let db = open_db();
    let client = ScriptedClient::new(vec![response(
        r#"{"status": "pass", "summary": "ok", "issues": []}"#,
        None,
    )]);
    let settings = Settings::default();
    let pipeline = ValidationPipeline::new(&db, &NoContext, &client, &settings);

    let mut shipment = shipment();
    shipment.un_number = "N/A".to_string();
    pipeline
        .validate_shipment(&shipment, None, &CancelToken::new())
        .await
        .expect("validate");

    let prompt = &client.requests()[0].prompt;
    assert!(prompt.contains("- UN number: N/A"));
    assert!(!prompt.contains("UNN/A"));
}

#[tokio::test]
async fn test_malformed_model_output_is_an_error() {
    let db = open_db();
    let client = ScriptedClient::new(vec![response("I refuse to answer.", None)]);
    let settings = Settings::default();
    let pipeline = ValidationPipeline::new(&db, &NoContext, &client, &settings);

    let err = pipeline
        .validate_shipment(&shipment(), None, &CancelToken::new())
        .await
        .unwrap_err();
    assert!(matches!(err, HazCheckError::MalformedResponse(_)));
}

#[tokio::test]
async fn test_parse_document_uses_fast_model_and_normalizes() {
    let db = open_db();
    let client = ScriptedClient::new(vec![response(
        r#"```json
{"unNumber": "un1993", "properShippingName": "Flammable liquid, n.o.s.", "hazardClass": "3", "packingGroup": null, "flashPoint": "38 C", "confidence": {"unNumber": 0.9}}
```"#,
        None,
    )]);
    let settings = Settings::default();
    let pipeline = ValidationPipeline::new(&db, &NoContext, &client, &settings);

    let fields = pipeline
        .parse_document("SECTION 14: UN1993 ...", &CancelToken::new())
        .await
        .expect("parse");
    assert_eq!(fields.un_number.as_deref(), Some("UN1993"));
    assert_eq!(fields.flash_point.as_deref(), Some("38 C"));

    let requests = client.requests();
    assert_eq!(requests[0].model_id, "gemini-2.5-flash-lite");
}

#[tokio::test]
async fn test_screenshot_survives_failed_field_read() {
    let db = open_db();
    let client = ScriptedClient::with_script(vec![
        // Stage one dies on the wire; stage two must still run.
        Err(HazCheckError::Inference("upstream returned 503".to_string())),
        Ok(response(
            r#"{"status": "pass", "summary": "compliant", "issues": []}"#,
            Some(usage(800, 100)),
        )),
    ]);
    let settings = Settings::default();
    let pipeline = ValidationPipeline::new(&db, &NoContext, &client, &settings);

    let image = InlineImage {
        mime_type: "image/png".to_string(),
        data: vec![1, 2, 3],
    };
    let result = pipeline
        .validate_screenshot(image, &CancelToken::new())
        .await
        .expect("validate");
    assert_eq!(result.status, ValidationStatus::Pass);

    let requests = client.requests();
    assert_eq!(requests.len(), 2);
    // Stage two works from the image alone.
    assert!(requests[1].image.is_some());
    assert!(requests[1].prompt.contains("could not be read ahead of time"));

    // Only the surviving call is billed.
    let usage = result.usage.expect("usage");
    assert_eq!(usage.total_tokens, 900);
}

#[tokio::test]
async fn test_screenshot_two_stage_passes_raw_text_on_prose_read() {
    let db = open_db();
    let client = ScriptedClient::new(vec![
        // Stage one comes back as prose, not JSON.
        response(
            "The form shows UN1263 Paint, class 3, on Priority Overnight.",
            Some(usage(300, 50)),
        ),
        response(
            r#"{"status": "pass", "summary": "compliant", "issues": []}"#,
            Some(usage(800, 100)),
        ),
    ]);
    let settings = Settings::default();
    let pipeline = ValidationPipeline::new(&db, &NoContext, &client, &settings);

    let image = InlineImage {
        mime_type: "image/png".to_string(),
        data: vec![1, 2, 3],
    };
    let result = pipeline
        .validate_screenshot(image, &CancelToken::new())
        .await
        .expect("validate");
    assert_eq!(result.status, ValidationStatus::Pass);

    let requests = client.requests();
    assert_eq!(requests.len(), 2);
    assert_eq!(requests[0].model_id, "gemini-2.5-flash-lite");
    assert_eq!(requests[1].model_id, "gemini-2.5-flash");
    assert!(requests.iter().all(|r| r.image.is_some()));
    // The raw stage-one text was passed into stage two.
    assert!(requests[1].prompt.contains("The form shows UN1263 Paint"));

    // Both calls billed.
    let usage = result.usage.expect("usage");
    assert_eq!(usage.prompt_tokens, 1100);
    assert_eq!(usage.total_tokens, 1250);
}

#[tokio::test]
async fn test_pre_cancelled_request_never_calls_the_model() {
    let db = open_db();
    let client = ScriptedClient::new(vec![]);
    let settings = Settings::default();
    let pipeline = ValidationPipeline::new(&db, &NoContext, &client, &settings);

    let cancel = CancelToken::new();
    cancel.cancel();

    let err = pipeline
        .validate_shipment(&shipment(), None, &cancel)
        .await
        .unwrap_err();
    assert!(matches!(err, HazCheckError::Cancelled));
    assert!(client.requests().is_empty());
}

#[tokio::test]
async fn test_stage_hook_reports_enumerated_stages() {
    let db = open_db();
    let client = ScriptedClient::new(vec![response(
        r#"{"status": "pass", "summary": "ok", "issues": []}"#,
        None,
    )]);
    let settings = Settings::default();

    let stages = std::sync::Arc::new(Mutex::new(Vec::new()));
    let sink = std::sync::Arc::clone(&stages);
    let pipeline = ValidationPipeline::new(&db, &NoContext, &client, &settings)
        .on_stage(move |stage| sink.lock().unwrap().push(stage));

    pipeline
        .validate_shipment(&shipment(), None, &CancelToken::new())
        .await
        .expect("validate");

    let stages = stages.lock().unwrap();
    assert_eq!(
        *stages,
        vec![PipelineStage::GatheringContext, PipelineStage::Analyzing]
    );
}
