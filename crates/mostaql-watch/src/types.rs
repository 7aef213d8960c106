use std::fmt::Display;

use chrono::{Local, NaiveDateTime};
use serde::{Deserialize, Serialize};

/// A project listed on the dashboard. `link` is the identity key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Item {
    pub title: String,
    pub link: String,
}

impl Item {
    pub fn new(title: impl Into<String>, link: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            link: link.into(),
        }
    }
}

impl Display for Item {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}\n     Link: {}", self.title, self.link)
    }
}

/// Last observed item list, replaced wholesale after every successful poll.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Baseline {
    /// Epoch when the file carries no timestamp.
    #[serde(default)]
    pub timestamp: NaiveDateTime,
    #[serde(rename = "projects", default)]
    pub items: Vec<Item>,
}

impl Baseline {
    pub fn new(items: Vec<Item>) -> Self {
        Self {
            timestamp: Local::now().naive_local(),
            items,
        }
    }
}

impl Display for Baseline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(
            f,
            "Baseline recorded at {} ({} project(s))",
            self.timestamp.format("%Y-%m-%d %H:%M:%S"),
            self.items.len()
        )?;
        for (i, item) in self.items.iter().enumerate() {
            writeln!(f, "{:>3}. {}", i + 1, item)?;
        }
        Ok(())
    }
}

/// On-disk artifact external monitors poll for new projects.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub timestamp: NaiveDateTime,
    #[serde(rename = "new_projects_count")]
    pub new_item_count: usize,
    #[serde(rename = "new_projects")]
    pub items: Vec<Item>,
    #[serde(rename = "notification_sent")]
    pub sent: bool,
}

impl Notification {
    pub fn new(items: Vec<Item>) -> Self {
        Self {
            timestamp: Local::now().naive_local(),
            new_item_count: items.len(),
            items,
            sent: true,
        }
    }
}

impl Display for Notification {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let rule = "=".repeat(60);
        writeln!(f, "\n{rule}")?;
        writeln!(f, "🔔 NEW PROJECTS ALERT 🔔")?;
        writeln!(f, "{rule}")?;
        writeln!(f, "\n🆕 Found {} NEW project(s):", self.new_item_count)?;
        writeln!(f, "{}", "=".repeat(50))?;
        for (i, item) in self.items.iter().enumerate() {
            writeln!(f, "{:>3}. {}\n", i + 1, item)?;
        }
        Ok(())
    }
}
