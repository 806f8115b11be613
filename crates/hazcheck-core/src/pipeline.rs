//! Validation pipeline
//!
//! Orchestrates one validation request: gather context from the
//! knowledge servers and the local store, build the prompt, call the
//! model, and normalize the verdict. All collaborators are injected;
//! the pipeline owns no connections and no global state.

use crate::cancel::CancelToken;
use crate::config::Settings;
use crate::connector::{fetch_context_from_servers, fetch_tool_context, ContextFetcher};
use crate::context::{self, SourceContext};
use crate::cost::{cost_of, UsageInfo};
use crate::db::Database;
use crate::error::{HazCheckError, Result};
use crate::llm::{
    build_screenshot_read_prompt, build_screenshot_validation_prompt,
    build_sds_extraction_prompt, build_validation_prompt, derive_status, normalize_json_response,
    normalize_un_number, InferenceClient, InferenceRequest, InferenceResponse, InlineImage,
    SdsFields, ValidationResult,
};
use crate::shipment::HazmatShipment;

/// Coarse pipeline stage, reported through an enumerated callback so
/// consumers never have to pattern-match status strings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineStage {
    GatheringContext,
    ParsingDocument,
    ReadingScreenshot,
    Analyzing,
}

type StageHook = Box<dyn Fn(PipelineStage) + Send + Sync>;

/// One-request validation pipeline over injected collaborators
pub struct ValidationPipeline<'a> {
    db: &'a Database,
    fetcher: &'a dyn ContextFetcher,
    client: &'a dyn InferenceClient,
    settings: &'a Settings,
    stage_hook: Option<StageHook>,
}

impl<'a> ValidationPipeline<'a> {
    pub fn new(
        db: &'a Database,
        fetcher: &'a dyn ContextFetcher,
        client: &'a dyn InferenceClient,
        settings: &'a Settings,
    ) -> Self {
        Self {
            db,
            fetcher,
            client,
            settings,
            stage_hook: None,
        }
    }

    /// Register a stage callback for progress display.
    pub fn on_stage(mut self, hook: impl Fn(PipelineStage) + Send + Sync + 'static) -> Self {
        self.stage_hook = Some(Box::new(hook));
        self
    }

    /// Validate a declared shipment, optionally cross-checked against raw
    /// SDS text. Cancellation takes effect at the next await point.
    pub async fn validate_shipment(
        &self,
        shipment: &HazmatShipment,
        sds_text: Option<&str>,
        cancel: &CancelToken,
    ) -> Result<ValidationResult> {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => Err(HazCheckError::Cancelled),
            result = self.validate_shipment_inner(shipment, sds_text, cancel) => result,
        }
    }

    async fn validate_shipment_inner(
        &self,
        shipment: &HazmatShipment,
        sds_text: Option<&str>,
        cancel: &CancelToken,
    ) -> Result<ValidationResult> {
        cancel.check()?;

        let mut shipment = shipment.clone();
        shipment.un_number = normalize_un_number(&shipment.un_number);

        let sds = match sds_text {
            Some(text) => {
                self.emit(PipelineStage::ParsingDocument);
                Some(self.parse_document(text, cancel).await?)
            }
            None => None,
        };

        self.emit(PipelineStage::GatheringContext);
        let query = format!(
            "{} {} class {}",
            shipment.un_number, shipment.proper_shipping_name, shipment.hazard_class
        );
        let contexts = self.gather_context(&query).await;
        cancel.check()?;

        self.emit(PipelineStage::Analyzing);
        let prompt = build_validation_prompt(
            &shipment,
            sds.as_ref(),
            &context::render(&contexts),
            &self.settings.rule_toggles,
        );
        let response = self
            .client
            .generate(InferenceRequest {
                model_id: self.settings.validation_model.clone(),
                prompt,
                image: None,
            })
            .await?;

        self.parse_validation_response(&self.settings.validation_model, &response)
    }

    /// Pull structured fields out of raw SDS text.
    pub async fn parse_document(&self, sds_text: &str, cancel: &CancelToken) -> Result<SdsFields> {
        cancel.check()?;

        let response = self
            .client
            .generate(InferenceRequest {
                model_id: self.settings.extraction_model.clone(),
                prompt: build_sds_extraction_prompt(sds_text),
                image: None,
            })
            .await?;

        let body = normalize_json_response(&response.text)?;
        let mut fields: SdsFields = serde_json::from_str(&body)
            .map_err(|e| HazCheckError::MalformedResponse(format!("bad SDS fields: {e}")))?;
        if let Some(un) = &fields.un_number {
            fields.un_number = Some(normalize_un_number(un));
        }
        Ok(fields)
    }

    /// Two-stage screenshot validation: read the form fields off the
    /// image first, then judge them with full context.
    ///
    /// Stage one degrades rather than fails. A response that is not
    /// parseable JSON is passed on to stage two as raw text; a transport
    /// error drops the pre-read entirely and stage two works from the
    /// image alone.
    pub async fn validate_screenshot(
        &self,
        image: InlineImage,
        cancel: &CancelToken,
    ) -> Result<ValidationResult> {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => Err(HazCheckError::Cancelled),
            result = self.validate_screenshot_inner(image, cancel) => result,
        }
    }

    async fn validate_screenshot_inner(
        &self,
        image: InlineImage,
        cancel: &CancelToken,
    ) -> Result<ValidationResult> {
        cancel.check()?;

        self.emit(PipelineStage::ReadingScreenshot);
        let field_read = match self
            .client
            .generate(InferenceRequest {
                model_id: self.settings.extraction_model.clone(),
                prompt: build_screenshot_read_prompt(),
                image: Some(image.clone()),
            })
            .await
        {
            Ok(response) => Some(response),
            Err(e) => {
                tracing::warn!("screenshot field read failed, validating the image directly: {e}");
                None
            }
        };

        let observed = match &field_read {
            Some(response) => match normalize_json_response(&response.text) {
                Ok(body) => body,
                Err(e) => {
                    tracing::warn!("screenshot field read returned no JSON, passing raw text on: {e}");
                    response.text.trim().to_string()
                }
            },
            None => String::new(),
        };
        cancel.check()?;

        self.emit(PipelineStage::GatheringContext);
        let query = screenshot_query(&observed);
        let contexts = self.gather_context(&query).await;
        cancel.check()?;

        self.emit(PipelineStage::Analyzing);
        let response = self
            .client
            .generate(InferenceRequest {
                model_id: self.settings.screenshot_model.clone(),
                prompt: build_screenshot_validation_prompt(&observed, &context::render(&contexts)),
                image: Some(image),
            })
            .await?;

        let mut result =
            self.parse_validation_response(&self.settings.screenshot_model, &response)?;
        result.usage = combine_usage(
            field_read
                .and_then(|r| r.usage)
                .map(|u| cost_of(&self.settings.extraction_model, u.prompt_tokens, u.candidate_tokens)),
            result.usage,
        );
        Ok(result)
    }

    /// Gather remote resource context, remote tool context, and local
    /// documents, merged by weight. Failures inside any one source are
    /// isolated; an empty result is a valid outcome.
    async fn gather_context(&self, query: &str) -> Vec<SourceContext> {
        let servers = self.settings.enabled_servers();

        let (mut remote, tool) = tokio::join!(
            fetch_context_from_servers(self.fetcher, &servers),
            fetch_tool_context(self.fetcher, &servers, query),
        );
        remote.extend(tool);

        let local = match self.db.local_contexts() {
            Ok(contexts) => contexts,
            Err(e) => {
                tracing::warn!("skipping local document store: {e}");
                Vec::new()
            }
        };

        context::merge(remote, local)
    }

    fn parse_validation_response(
        &self,
        model_id: &str,
        response: &InferenceResponse,
    ) -> Result<ValidationResult> {
        let body = normalize_json_response(&response.text)?;
        let mut result: ValidationResult = serde_json::from_str(&body)
            .map_err(|e| HazCheckError::MalformedResponse(format!("bad validation result: {e}")))?;

        // The verdict is derived from the issues, not taken from the model.
        let derived = derive_status(&result.issues);
        if derived != result.status {
            tracing::warn!(
                reported = ?result.status,
                derived = ?derived,
                "model status disagrees with its own issues, keeping derived status"
            );
            result.status = derived;
        }

        result.usage = response
            .usage
            .map(|u| cost_of(model_id, u.prompt_tokens, u.candidate_tokens));
        Ok(result)
    }

    fn emit(&self, stage: PipelineStage) {
        if let Some(hook) = &self.stage_hook {
            hook(stage);
        }
    }
}

/// Best-effort context query out of the stage-one screenshot read
fn screenshot_query(observed: &str) -> String {
    if let Ok(value) = serde_json::from_str::<serde_json::Value>(observed) {
        let un = value["unNumber"].as_str().map(normalize_un_number);
        let name = value["properShippingName"].as_str();
        let class = value["hazardClass"].as_str();
        let parts: Vec<String> = [
            un,
            name.map(str::to_string),
            class.map(|c| format!("class {c}")),
        ]
        .into_iter()
        .flatten()
        .filter(|p| !p.is_empty())
        .collect();
        if !parts.is_empty() {
            return parts.join(" ");
        }
    }
    "dangerous goods shipment declaration".to_string()
}

/// Fold the field-read call's usage into the final call's. Token counts
/// add; the model id of the final call wins for display.
fn combine_usage(read: Option<UsageInfo>, main: Option<UsageInfo>) -> Option<UsageInfo> {
    match (read, main) {
        (Some(a), Some(mut b)) => {
            b.prompt_tokens += a.prompt_tokens;
            b.candidate_tokens += a.candidate_tokens;
            b.total_tokens += a.total_tokens;
            b.input_cost += a.input_cost;
            b.output_cost += a.output_cost;
            b.estimated_cost += a.estimated_cost;
            Some(b)
        }
        (None, main) => main,
        (read, None) => read,
    }
}
