//! Lesson-plan generation pipeline for PlanoReal.
//!
//! A submission flows strictly one way:
//! validate -> normalize -> build prompt -> model gateway -> extract plan.
//! The presentation side ([`render`]) turns an extracted [`LessonPlan`]
//! into labeled sections, paginated pages and a PDF document.

pub mod extract;
pub mod gateway;
pub mod pipeline;
pub mod plan;
pub mod prompt;
pub mod render;
pub mod request;
pub mod sanitize;
pub mod validate;

pub use extract::{MalformedResponseError, extract_plan};
pub use gateway::{ChatCompletionClient, GatewayConfig, ModelGateway, UpstreamError};
pub use pipeline::{PipelineError, Planner, prepare_prompt};
pub use plan::{LessonPlan, Phase};
pub use prompt::build_prompt;
pub use request::{DurationInput, LessonRequest};
pub use sanitize::{ClassSize, NormalizedRequest, ResourceAvailability, normalize};
pub use validate::{ValidationErrors, validate_request};
