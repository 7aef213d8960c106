use serde::Serialize;

use crate::config::WatchConfig;
use crate::diff;
use crate::notify::{ConsoleSink, FileSink, Notifier, NotifyError, WebhookSink};
use crate::scraper::{ScraperError, WebScraper};
use crate::session::SessionContext;
use crate::store::BaselineStore;
use crate::types::{Item, Notification};

#[derive(Debug, thiserror::Error)]
pub enum SetupError {
    #[error("Failed to build dashboard client: {0}")]
    Scraper(#[from] ScraperError),
    #[error("Failed to build notification sink: {0}")]
    Notify(#[from] NotifyError),
}

/// What a single poll cycle ended with.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum RunOutcome {
    /// Transport error or non-2xx response. Baseline untouched.
    FetchFailed { status: Option<u16> },
    /// The dashboard container is gone from the markup. Baseline untouched.
    StructureChanged,
    /// Container present but no project headings matched. Baseline untouched.
    NoItems,
    NoNewItems { checked: usize },
    NewItems { items: Vec<Item>, checked: usize },
    /// The stored baseline was unreadable and has been rebuilt from this
    /// cycle's projects without reporting any of them.
    BaselineReset { checked: usize },
}

impl RunOutcome {
    pub fn new_items(&self) -> &[Item] {
        match self {
            RunOutcome::NewItems { items, .. } => items,
            _ => &[],
        }
    }
}

#[derive(Debug)]
pub struct Watcher {
    scraper: WebScraper,
    store: BaselineStore,
    notifier: Notifier,
    session: SessionContext,
}

impl Watcher {
    pub fn new(
        scraper: WebScraper,
        store: BaselineStore,
        notifier: Notifier,
        session: SessionContext,
    ) -> Self {
        Self {
            scraper,
            store,
            notifier,
            session,
        }
    }

    /// Notification-file sink, plus console and webhook sinks when enabled.
    pub fn from_config(config: &WatchConfig, session: SessionContext) -> Result<Self, SetupError> {
        let mut notifier = Notifier::new();
        if config.console_alerts {
            notifier = notifier.with_sink(ConsoleSink);
        }
        notifier = notifier.with_sink(FileSink::new(&config.notification_path));
        if let Some(url) = &config.webhook_url {
            notifier = notifier.with_sink(WebhookSink::new(url, config.timeout)?);
        }

        Ok(Self::new(
            WebScraper::new(config)?,
            BaselineStore::new(&config.baseline_path),
            notifier,
            session,
        ))
    }

    pub fn store(&self) -> &BaselineStore {
        &self.store
    }

    /// Fetch, extract, diff against the baseline, persist and notify.
    /// Every failure after startup degrades into an outcome instead of an
    /// error.
    pub async fn run(&self) -> RunOutcome {
        let current = match self.scraper.fetch_items(&self.session).await {
            Ok(items) => items,
            Err(ScraperError::ParseError(e)) => {
                log::warn!(
                    "{e}. The page layout changed or the session is no longer logged in; keeping the previous baseline"
                );
                return RunOutcome::StructureChanged;
            }
            Err(e) => return fetch_failed(&e),
        };

        if current.is_empty() {
            log::warn!("Dashboard section found but no project headings matched; keeping the previous baseline");
            return RunOutcome::NoItems;
        }
        let checked = current.len();
        log::info!("Extracted {} project(s) from the dashboard", checked);

        let previous = match self.store.load() {
            Ok(Some(baseline)) => Some(baseline.items),
            Ok(None) => {
                log::info!(
                    "No baseline at {}, every project counts as new",
                    self.store.path().display()
                );
                Some(Vec::new())
            }
            Err(e) => {
                log::error!("{e}. New-project detection is skipped this cycle and the baseline rebuilt");
                None
            }
        };

        let fresh = previous
            .as_deref()
            .map(|previous| diff::new_items(&current, previous))
            .unwrap_or_default();

        if let Err(e) = self.store.save(&current) {
            log::error!("Error saving last seen projects: {e}");
        }

        if previous.is_none() {
            return RunOutcome::BaselineReset { checked };
        }

        if fresh.is_empty() {
            log::info!(
                "✅ No new projects found (total projects checked: {})",
                checked
            );
            return RunOutcome::NoNewItems { checked };
        }

        let notification = Notification::new(fresh.clone());
        let delivered = self.notifier.dispatch(&notification).await;
        log::info!(
            "Found {} new project(s), notified {} sink(s)",
            fresh.len(),
            delivered
        );

        RunOutcome::NewItems {
            items: fresh,
            checked,
        }
    }
}

fn fetch_failed(e: &ScraperError) -> RunOutcome {
    let status = match e {
        ScraperError::HttpError(err) => err.status(),
        ScraperError::ParseError(_) => None,
    };

    match (status, e) {
        (Some(status), _) if status.as_u16() == 401 || status.as_u16() == 403 => log::error!(
            "Dashboard answered {status}; the MOSTAQLWEB cookie has probably expired"
        ),
        (Some(status), _) => log::error!("Dashboard answered {status}"),
        (None, ScraperError::HttpError(err)) if err.is_timeout() => {
            log::error!("Dashboard request timed out: {err}")
        }
        (None, _) => log::error!("Request failed: {e}"),
    }

    RunOutcome::FetchFailed {
        status: status.map(|s| s.as_u16()),
    }
}
