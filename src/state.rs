//! Application state shared by all handlers.
//!
//! This module owns:
//!   - the content service (absent when no model credential is configured)
//!
//! Per-learner state lives in `Session`, owned by each WebSocket connection.

use std::sync::Arc;

use tracing::{error, info, instrument};

use crate::backend::GenerativeBackend;
use crate::config::Settings;
use crate::content::ContentService;
use crate::error::{ContentError, ContentResult};
use crate::openai::OpenAI;

#[derive(Clone)]
pub struct AppState {
    pub content: Option<ContentService>,
}

impl AppState {
    /// Build state from settings: construct the OpenAI-backed content service if configured.
    #[instrument(level = "info", skip_all)]
    pub fn new(settings: &Settings) -> Self {
        let content = match &settings.openai {
            Some(oa_settings) => match OpenAI::new(oa_settings) {
                Ok(oa) => {
                    info!(target: "lexical_gap", base_url = %oa.base_url, fast_model = %oa.fast_model, strong_model = %oa.strong_model, "OpenAI enabled.");
                    let backend: Arc<dyn GenerativeBackend> = Arc::new(oa);
                    Some(ContentService::new(backend, settings.prompts.clone()))
                }
                Err(e) => {
                    error!(target: "lexical_gap", error = %e, "OpenAI client could not be built; generation disabled.");
                    None
                }
            },
            None => {
                info!(target: "lexical_gap", "OpenAI disabled (no OPENAI_API_KEY). Generation controls are disabled.");
                None
            }
        };
        Self { content }
    }

    pub fn with_content(content: Option<ContentService>) -> Self {
        Self { content }
    }

    pub fn generation_enabled(&self) -> bool {
        self.content.is_some()
    }

    /// The content service, or a configuration error when generation is disabled.
    pub fn require_content(&self) -> ContentResult<&ContentService> {
        self.content
            .as_ref()
            .ok_or_else(|| ContentError::Configuration("OPENAI_API_KEY is not set".into()))
    }
}
