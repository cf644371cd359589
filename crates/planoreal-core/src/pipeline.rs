//! The request pipeline: validate, normalize, prompt, call, extract.
//!
//! [`Planner`] owns the gateway and is cheap to clone; it holds no
//! per-request state, so one instance serves every concurrent request.

use std::sync::Arc;

use serde_json::Value;
use thiserror::Error;

use crate::extract::{MalformedResponseError, extract_plan};
use crate::gateway::{ModelGateway, UpstreamError};
use crate::plan::LessonPlan;
use crate::prompt::build_prompt;
use crate::request::LessonRequest;
use crate::sanitize::normalize;
use crate::validate::{ValidationErrors, check_request};

/// Any terminal failure of a generate request.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Validation(#[from] ValidationErrors),

    #[error(transparent)]
    Upstream(#[from] UpstreamError),

    #[error(transparent)]
    Malformed(#[from] MalformedResponseError),
}

/// Validate and normalize a raw body, then synthesize its prompt.
///
/// Runs no I/O. Fails with every validation violation when the body is
/// rejected.
pub fn prepare_prompt(body: &Value) -> Result<String, ValidationErrors> {
    check_request(body)?;
    let request: LessonRequest = serde_json::from_value(body.clone())
        .map_err(|e| ValidationErrors::new(vec![format!("Dados da requisição inválidos: {e}")]))?;
    Ok(build_prompt(&normalize(&request)))
}

/// Generates lesson plans through a [`ModelGateway`].
#[derive(Clone)]
pub struct Planner {
    gateway: Arc<dyn ModelGateway>,
}

impl Planner {
    pub fn new(gateway: Arc<dyn ModelGateway>) -> Self {
        Self { gateway }
    }

    /// Run the full pipeline for one raw request body.
    ///
    /// The gateway is never called when validation fails.
    pub async fn generate(&self, body: &Value) -> Result<LessonPlan, PipelineError> {
        let prompt = prepare_prompt(body)?;
        tracing::debug!(prompt_len = prompt.len(), "prompt synthesized");

        let reply = self.gateway.complete(&prompt).await?;
        tracing::debug!(reply_len = reply.len(), "model replied");

        let plan = extract_plan(&reply)?;
        Ok(plan)
    }
}
