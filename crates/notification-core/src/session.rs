//! Operator session: the loaded template plus the facts of the incident
//! being composed.

use tracing::{debug, info};

use crate::error::{ComposeError, RenderError};
use crate::facts::IncidentFacts;
use crate::render::{Clock, RenderLinks, RenderRequest, Renderer, SystemClock};
use crate::source::{FactsSource, TemplateSource};
use crate::store::{TemplateOrigin, TemplateStore};
use crate::template::NotificationTemplate;

/// Update number and status flags for one render.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UpdateOptions {
    pub update_number: u32,
    pub resolve: bool,
    pub downgrade: bool,
}

impl Default for UpdateOptions {
    fn default() -> Self {
        Self {
            update_number: 1,
            resolve: false,
            downgrade: false,
        }
    }
}

/// Handle for an in-flight facts fetch.
///
/// Only the most recently issued handle can populate the cache.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchTicket {
    generation: u64,
    ticket_number: String,
}

impl FetchTicket {
    pub fn ticket_number(&self) -> &str {
        &self.ticket_number
    }
}

#[derive(Debug, Clone)]
struct CachedFacts {
    ticket_number: String,
    facts: IncidentFacts,
}

/// Caches the facts of one incident so flag toggles re-render without
/// another fetch.
#[derive(Debug)]
pub struct ComposerSession<C = SystemClock> {
    store: TemplateStore,
    renderer: Renderer<C>,
    cached: Option<CachedFacts>,
    pending: Option<FetchTicket>,
    generation: u64,
}

impl ComposerSession<SystemClock> {
    /// Session with default links, the wall clock and no template loaded.
    pub fn new() -> Self {
        Self::with_renderer(Renderer::new())
    }

    /// Session with custom links and the wall clock.
    pub fn with_links(links: RenderLinks) -> Self {
        Self::with_renderer(Renderer::with_links(links))
    }
}

impl Default for ComposerSession<SystemClock> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: Clock> ComposerSession<C> {
    pub fn with_renderer(renderer: Renderer<C>) -> Self {
        Self {
            store: TemplateStore::new(),
            renderer,
            cached: None,
            pending: None,
            generation: 0,
        }
    }

    /// Load the template, falling back to the built-in record.
    pub async fn load_template(&mut self, source: &dyn TemplateSource) -> TemplateOrigin {
        self.store.load(source).await
    }

    /// Use `template` without consulting a source.
    pub fn set_template(&mut self, template: NotificationTemplate) {
        self.store = TemplateStore::with_template(template);
    }

    pub fn template(&self) -> Result<&NotificationTemplate, RenderError> {
        self.store.get()
    }

    /// Facts cached for `ticket_number`, if any.
    pub fn cached_facts(&self, ticket_number: &str) -> Option<&IncidentFacts> {
        self.cached
            .as_ref()
            .filter(|cached| cached.ticket_number == ticket_number)
            .map(|cached| &cached.facts)
    }

    /// Whether rendering `ticket_number` requires fetching facts first.
    pub fn needs_fetch(&self, ticket_number: &str, refresh: bool) -> bool {
        refresh || self.cached_facts(ticket_number).is_none()
    }

    /// Start a fetch. Drops the cached facts and supersedes any earlier
    /// fetch.
    pub fn begin_fetch(&mut self, ticket_number: &str) -> FetchTicket {
        self.generation += 1;
        self.cached = None;

        let ticket = FetchTicket {
            generation: self.generation,
            ticket_number: ticket_number.to_string(),
        };
        self.pending = Some(ticket.clone());
        ticket
    }

    /// Apply a fetch result. Returns `false` and discards `facts` when a
    /// later fetch has been started since `ticket` was issued.
    pub fn complete_fetch(&mut self, ticket: FetchTicket, facts: IncidentFacts) -> bool {
        if self.pending.as_ref() != Some(&ticket) {
            debug!(
                ticket = %ticket.ticket_number,
                generation = ticket.generation,
                current = self.generation,
                "Ignoring superseded incident fetch"
            );
            return false;
        }

        self.pending = None;
        self.cached = Some(CachedFacts {
            ticket_number: ticket.ticket_number,
            facts,
        });
        true
    }

    /// Render from the cached facts.
    pub fn render(&self, ticket_number: &str, options: UpdateOptions) -> Result<String, RenderError> {
        let facts = self
            .cached_facts(ticket_number)
            .ok_or_else(|| RenderError::NoIncidentData(ticket_number.to_string()))?;
        let template = self.store.get()?;

        let request = RenderRequest::new(facts.clone(), ticket_number)
            .with_update_number(options.update_number)
            .with_resolve(options.resolve)
            .with_downgrade(options.downgrade);
        self.renderer.render(template, &request)
    }

    /// Fetch facts when needed, then render.
    pub async fn compose(
        &mut self,
        source: &dyn FactsSource,
        ticket_number: &str,
        options: UpdateOptions,
        refresh: bool,
    ) -> Result<String, ComposeError> {
        if self.needs_fetch(ticket_number, refresh) {
            let ticket = self.begin_fetch(ticket_number);
            let facts = source.fetch_facts(ticket_number).await?;
            info!(ticket = %ticket_number, title = %facts.title, "Fetched incident facts");
            self.complete_fetch(ticket, facts);
        }

        Ok(self.render(ticket_number, options)?)
    }

    /// Forget cached facts and any in-flight fetch.
    pub fn reset(&mut self) {
        self.generation += 1;
        self.cached = None;
        self.pending = None;
    }
}
