use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;

use crate::types::Notification;

#[derive(Debug, thiserror::Error)]
pub enum NotifyError {
    #[error("Failed to write notification file {path}: {source}")]
    Io { path: PathBuf, source: io::Error },
    #[error("Failed to encode notification: {0}")]
    Encode(#[from] serde_json::Error),
    #[error("Webhook request failed: {0}")]
    Http(#[from] reqwest::Error),
}

/// A destination new-project alerts are delivered to.
#[async_trait]
pub trait NotificationSink: Send + Sync {
    fn name(&self) -> &str;

    async fn notify(&self, notification: &Notification) -> Result<(), NotifyError>;
}

/// Prints an alert block listing every new project.
#[derive(Debug, Default)]
pub struct ConsoleSink;

impl ConsoleSink {
    pub fn render(notification: &Notification) -> Result<String, NotifyError> {
        let json = serde_json::to_string_pretty(&notification.items)?;
        Ok(format!("{notification}New projects as JSON:\n{json}\n"))
    }
}

#[async_trait]
impl NotificationSink for ConsoleSink {
    fn name(&self) -> &str {
        "console"
    }

    async fn notify(&self, notification: &Notification) -> Result<(), NotifyError> {
        print!("{}", Self::render(notification)?);
        Ok(())
    }
}

/// Overwrites a JSON file for external monitors to poll.
#[derive(Debug, Clone)]
pub struct FileSink {
    path: PathBuf,
}

impl FileSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl NotificationSink for FileSink {
    fn name(&self) -> &str {
        "file"
    }

    async fn notify(&self, notification: &Notification) -> Result<(), NotifyError> {
        let json = serde_json::to_string_pretty(notification)?;
        let io_err = |source| NotifyError::Io {
            path: self.path.clone(),
            source,
        };

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(io_err)?;
        }
        fs::write(&self.path, json).map_err(io_err)?;

        log::info!("📄 Notification file created: {}", self.path.display());
        Ok(())
    }
}

/// POSTs the notification record as JSON.
#[derive(Debug, Clone)]
pub struct WebhookSink {
    client: Client,
    url: String,
}

impl WebhookSink {
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self, NotifyError> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(format!(
                "{}/{}",
                env!("CARGO_PKG_NAME"),
                env!("CARGO_PKG_VERSION")
            ))
            .build()?;

        Ok(Self {
            client,
            url: url.into(),
        })
    }
}

#[async_trait]
impl NotificationSink for WebhookSink {
    fn name(&self) -> &str {
        "webhook"
    }

    async fn notify(&self, notification: &Notification) -> Result<(), NotifyError> {
        self.client
            .post(&self.url)
            .json(notification)
            .send()
            .await?
            .error_for_status()?;

        log::info!("Webhook notified at {}", self.url);
        Ok(())
    }
}

/// Fans a notification out to every configured sink.
#[derive(Default)]
pub struct Notifier {
    sinks: Vec<Box<dyn NotificationSink>>,
}

impl Notifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_sink(mut self, sink: impl NotificationSink + 'static) -> Self {
        self.sinks.push(Box::new(sink));
        self
    }

    /// Delivers to each sink in turn. A failing sink is logged and skipped.
    /// Returns how many sinks succeeded.
    pub async fn dispatch(&self, notification: &Notification) -> usize {
        let mut delivered = 0;
        for sink in &self.sinks {
            match sink.notify(notification).await {
                Ok(()) => delivered += 1,
                Err(e) => log::error!("Notification sink '{}' failed: {}", sink.name(), e),
            }
        }
        delivered
    }
}

impl std::fmt::Debug for Notifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let names: Vec<&str> = self.sinks.iter().map(|s| s.name()).collect();
        f.debug_struct("Notifier").field("sinks", &names).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Item;
    use serde_json::Value;
    use tempfile::tempdir;

    fn notification() -> Notification {
        Notification::new(vec![
            Item::new("Logo", "https://mostaql.com/project/1"),
            Item::new("Website", "https://mostaql.com/project/2"),
        ])
    }

    #[test]
    fn test_console_render_lists_items() {
        let out = ConsoleSink::render(&notification()).unwrap();

        assert!(out.contains("Found 2 NEW project(s)"));
        assert!(out.contains("  1. Logo\n     Link: https://mostaql.com/project/1"));
        assert!(out.contains("  2. Website"));
        assert!(out.contains("\"link\": \"https://mostaql.com/project/2\""));
    }

    #[tokio::test]
    async fn test_file_sink_writes_record() {
        let dir = tempdir().unwrap();
        let sink = FileSink::new(dir.path().join("state/new_projects_notification.json"));

        sink.notify(&notification()).await.unwrap();

        let raw = fs::read_to_string(sink.path()).unwrap();
        let value: Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(value["new_projects_count"], 2);
        assert_eq!(value["notification_sent"], true);
        assert_eq!(value["new_projects"][0]["title"], "Logo");
    }

    #[tokio::test]
    async fn test_file_sink_overwrites() {
        let dir = tempdir().unwrap();
        let sink = FileSink::new(dir.path().join("new_projects_notification.json"));

        sink.notify(&notification()).await.unwrap();
        sink.notify(&Notification::new(vec![Item::new("Only", "https://x/o")]))
            .await
            .unwrap();

        let record: Notification =
            serde_json::from_str(&fs::read_to_string(sink.path()).unwrap()).unwrap();
        assert_eq!(record.new_item_count, 1);
        assert_eq!(record.items, vec![Item::new("Only", "https://x/o")]);
    }

    #[tokio::test]
    async fn test_webhook_posts_json() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/hook")
            .match_header("content-type", "application/json")
            .match_body(mockito::Matcher::PartialJsonString(
                r#"{"new_projects_count": 2, "notification_sent": true}"#.to_string(),
            ))
            .with_status(204)
            .create_async()
            .await;

        let sink = WebhookSink::new(format!("{}/hook", server.url()), Duration::from_secs(5))
            .unwrap();
        sink.notify(&notification()).await.unwrap();

        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_failing_sink_does_not_stop_others() {
        let dir = tempdir().unwrap();
        let good = FileSink::new(dir.path().join("ok.json"));
        // A directory cannot be overwritten by a file.
        let bad = FileSink::new(dir.path());

        let notifier = Notifier::new().with_sink(bad).with_sink(good.clone());
        let delivered = notifier.dispatch(&notification()).await;

        assert_eq!(delivered, 1);
        assert!(good.path().exists());
    }
}
