//! Template and incident-facts sources.

use std::path::PathBuf;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use tracing::debug;

use crate::error::SourceError;
use crate::facts::IncidentFacts;
use crate::template::NotificationTemplate;

/// Something that can supply a notification template record.
#[async_trait]
pub trait TemplateSource: Send + Sync {
    async fn fetch_template(&self) -> Result<NotificationTemplate, SourceError>;

    /// Short description for logs.
    fn describe(&self) -> String;
}

/// Something that can supply incident facts by ticket number.
#[async_trait]
pub trait FactsSource: Send + Sync {
    async fn fetch_facts(&self, ticket_number: &str) -> Result<IncidentFacts, SourceError>;
}

/// Always yields the built-in template.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultTemplateSource;

#[async_trait]
impl TemplateSource for DefaultTemplateSource {
    async fn fetch_template(&self) -> Result<NotificationTemplate, SourceError> {
        Ok(NotificationTemplate::builtin())
    }

    fn describe(&self) -> String {
        "built-in template".to_string()
    }
}

/// Reads the template record from a JSON file.
#[derive(Debug, Clone)]
pub struct JsonFileTemplateSource {
    path: PathBuf,
}

impl JsonFileTemplateSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl TemplateSource for JsonFileTemplateSource {
    async fn fetch_template(&self) -> Result<NotificationTemplate, SourceError> {
        let raw = tokio::fs::read_to_string(&self.path).await?;
        Ok(serde_json::from_str(&raw)?)
    }

    fn describe(&self) -> String {
        format!("file {}", self.path.display())
    }
}

/// Fetches the template record from an HTTP endpoint.
#[derive(Debug, Clone)]
pub struct HttpTemplateSource {
    http: Client,
    url: String,
}

impl HttpTemplateSource {
    pub fn new(url: impl Into<String>) -> Result<Self, SourceError> {
        let http = Client::builder().timeout(Duration::from_secs(10)).build()?;
        Ok(Self {
            http,
            url: url.into(),
        })
    }
}

#[async_trait]
impl TemplateSource for HttpTemplateSource {
    async fn fetch_template(&self) -> Result<NotificationTemplate, SourceError> {
        debug!(url = %self.url, "Fetching notification template");

        let response = self.http.get(&self.url).send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(SourceError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let body = response.text().await?;
        Ok(serde_json::from_str(&body)?)
    }

    fn describe(&self) -> String {
        format!("url {}", self.url)
    }
}

/// Pick the template source from the environment.
///
/// | Variable | Description |
/// |----------|-------------|
/// | `NOTIFY_TEMPLATE_PATH` | JSON file with the template record |
/// | `NOTIFY_TEMPLATE_URL` | Endpoint serving the template record |
///
/// The path wins when both are set. With neither, the built-in template is
/// used.
pub fn template_source_from_env() -> Result<Box<dyn TemplateSource>, SourceError> {
    let non_empty = |name: &str| std::env::var(name).ok().filter(|v| !v.trim().is_empty());

    if let Some(path) = non_empty("NOTIFY_TEMPLATE_PATH") {
        return Ok(Box::new(JsonFileTemplateSource::new(path)));
    }
    if let Some(url) = non_empty("NOTIFY_TEMPLATE_URL") {
        return Ok(Box::new(HttpTemplateSource::new(url)?));
    }
    Ok(Box::new(DefaultTemplateSource))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_json_file_source_reads_template() {
        let path = std::env::temp_dir().join(format!(
            "notification-template-{}.json",
            std::process::id()
        ));
        let mut template = NotificationTemplate::builtin();
        template.footer_template = "Dashboard: {status_dashboard_url}".to_string();
        tokio::fs::write(&path, serde_json::to_string(&template).unwrap())
            .await
            .unwrap();

        let loaded = JsonFileTemplateSource::new(&path)
            .fetch_template()
            .await
            .unwrap();
        assert_eq!(loaded, template);

        let _ = tokio::fs::remove_file(&path).await;
    }

    #[tokio::test]
    async fn test_json_file_source_missing_file() {
        let err = JsonFileTemplateSource::new("/nonexistent/template.json")
            .fetch_template()
            .await
            .unwrap_err();
        assert!(matches!(err, SourceError::Io(_)));
    }
}
