use std::path::{Path, PathBuf};
use std::time::Duration;

pub const BASELINE_FILE_NAME: &str = "last_seen_projects.json";
pub const NOTIFICATION_FILE_NAME: &str = "new_projects_notification.json";

/// Everything a poll cycle needs besides the session cookies.
#[derive(Debug, Clone)]
pub struct WatchConfig {
    /// Page that is fetched on every cycle.
    pub url: String,
    /// Prefix for root-relative project links.
    pub origin: String,
    pub timeout: Duration,
    pub baseline_path: PathBuf,
    pub notification_path: PathBuf,
    pub webhook_url: Option<String>,
    /// Print the alert block to stdout when new projects show up.
    pub console_alerts: bool,
}

impl WatchConfig {
    /// Places both state files inside `dir` under their usual names.
    pub fn with_state_dir(mut self, dir: impl AsRef<Path>) -> Self {
        let dir = dir.as_ref();
        self.baseline_path = dir.join(BASELINE_FILE_NAME);
        self.notification_path = dir.join(NOTIFICATION_FILE_NAME);
        self
    }
}

impl Default for WatchConfig {
    fn default() -> Self {
        Self {
            url: format!("{}/", crate::BASE_URL),
            origin: crate::BASE_URL.to_string(),
            timeout: Duration::from_secs(30),
            baseline_path: PathBuf::from("logs").join(BASELINE_FILE_NAME),
            notification_path: PathBuf::from("logs").join(NOTIFICATION_FILE_NAME),
            webhook_url: None,
            console_alerts: true,
        }
    }
}
