//! Session-wide notification template.

use std::sync::Arc;

use tracing::{info, warn};

use crate::error::{RenderError, SourceError};
use crate::source::TemplateSource;
use crate::template::NotificationTemplate;

/// Where the loaded template came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TemplateOrigin {
    /// The source supplied a valid record.
    Source,
    /// The source failed; the built-in record is in use.
    BuiltIn { reason: String },
}

/// Holds the template for subsequent render calls.
///
/// Loading never fails: any source problem falls back to
/// [`NotificationTemplate::builtin`]. The record is not re-fetched until
/// [`TemplateStore::load`] is called again.
#[derive(Debug, Clone, Default)]
pub struct TemplateStore {
    template: Option<Arc<NotificationTemplate>>,
}

impl TemplateStore {
    /// An empty store; renders fail with `TemplateNotLoaded` until loaded.
    pub fn new() -> Self {
        Self::default()
    }

    /// A store already holding `template`.
    pub fn with_template(template: NotificationTemplate) -> Self {
        Self {
            template: Some(Arc::new(template)),
        }
    }

    /// Fetch the template from `source`, falling back to the built-in record.
    pub async fn load(&mut self, source: &dyn TemplateSource) -> TemplateOrigin {
        let (template, origin) = fetch_or_default(source).await;
        self.template = Some(Arc::new(template));
        origin
    }

    /// The loaded template.
    pub fn get(&self) -> Result<&NotificationTemplate, RenderError> {
        self.template
            .as_deref()
            .ok_or(RenderError::TemplateNotLoaded)
    }

    /// A shared handle to the loaded template.
    pub fn shared(&self) -> Option<Arc<NotificationTemplate>> {
        self.template.clone()
    }

    pub fn is_loaded(&self) -> bool {
        self.template.is_some()
    }
}

/// Fetch and validate a template, substituting the built-in record on any
/// failure.
pub async fn fetch_or_default(
    source: &dyn TemplateSource,
) -> (NotificationTemplate, TemplateOrigin) {
    let fetched = source.fetch_template().await.and_then(|template| {
        template
            .validate()
            .map(|_| template)
            .map_err(|err| SourceError::Malformed(err.to_string()))
    });

    match fetched {
        Ok(template) => {
            info!(source = %source.describe(), "Loaded notification template");
            (template, TemplateOrigin::Source)
        }
        Err(err) => {
            warn!(
                source = %source.describe(),
                error = %err,
                "Failed to load notification template, using built-in default"
            );
            (
                NotificationTemplate::builtin(),
                TemplateOrigin::BuiltIn {
                    reason: err.to_string(),
                },
            )
        }
    }
}
