use std::sync::LazyLock;

use scraper::{ElementRef, Html, Selector};

use crate::types::Item;

#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    #[error("Dashboard section not found (no #dashboard__latest-published container)")]
    ContainerNotFound,
}

const PRIMARY_CONTAINER_ID: &str = "dashboard__latest-published";
const PANEL_CONTAINER_ID: &str = "dashboard__latest-published-panel";

const TITLE_CLASS_SIGNATURE: &str = "listing__title project__title mrg--bt-reset";
const TITLE_CLASS_TOKENS: [&str; 2] = ["listing__title", "project__title"];

static SEL_PRIMARY: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse("div#dashboard__latest-published").expect("invalid selector: primary")
});

static SEL_PANEL: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse("div#dashboard__latest-published-panel").expect("invalid selector: panel")
});

static SEL_HEADING: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("h5[class]").expect("invalid selector: heading"));

static SEL_ANCHOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("a").expect("invalid selector: anchor"));

fn elem_text(element: ElementRef) -> String {
    element.text().collect::<String>()
}

fn normalize_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Ways of picking project title headings out of the dashboard container.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeadingStrategy {
    /// Class attribute is exactly the full title signature.
    ExactClass,
    /// Class attribute mentions both title tokens, in any order.
    ClassContains,
}

impl HeadingStrategy {
    /// Tried in order; the first strategy with any match wins.
    pub const ORDERED: [HeadingStrategy; 2] =
        [HeadingStrategy::ExactClass, HeadingStrategy::ClassContains];

    fn matches(&self, class: &str) -> bool {
        match self {
            HeadingStrategy::ExactClass => normalize_whitespace(class) == TITLE_CLASS_SIGNATURE,
            HeadingStrategy::ClassContains => {
                TITLE_CLASS_TOKENS.iter().all(|token| class.contains(token))
            }
        }
    }

    pub fn select<'a>(&self, container: ElementRef<'a>) -> Vec<ElementRef<'a>> {
        container
            .select(&SEL_HEADING)
            .filter(|h| h.value().attr("class").is_some_and(|c| self.matches(c)))
            .collect()
    }
}

fn find_container(document: &Html) -> Option<ElementRef<'_>> {
    if let Some(container) = document.select(&SEL_PRIMARY).next() {
        return Some(container);
    }

    let panel = document.select(&SEL_PANEL).next()?;
    log::debug!("#{PRIMARY_CONTAINER_ID} missing at top level, looking inside #{PANEL_CONTAINER_ID}");
    panel.select(&SEL_PRIMARY).next()
}

fn select_headings(container: ElementRef<'_>) -> Vec<ElementRef<'_>> {
    for strategy in HeadingStrategy::ORDERED {
        let headings = strategy.select(container);
        if !headings.is_empty() {
            log::debug!("{:?} matched {} heading(s)", strategy, headings.len());
            return headings;
        }
    }
    Vec::new()
}

/// Turns a root-relative href into an absolute URL on `origin`. Anything else
/// is returned untouched.
pub fn normalize_link(href: &str, origin: &str) -> String {
    if href.starts_with('/') {
        format!("{}{}", origin.trim_end_matches('/'), href)
    } else {
        href.to_string()
    }
}

fn parse_heading(heading: ElementRef, origin: &str) -> Option<Item> {
    let anchor = heading.select(&SEL_ANCHOR).next()?;
    let title = normalize_whitespace(&elem_text(anchor));
    let href = anchor.value().attr("href").unwrap_or_default();

    Some(Item {
        title,
        link: normalize_link(href, origin),
    })
}

/// Extracts the latest published projects from the dashboard markup, in
/// document order.
pub fn parse_listing(html: &str, origin: &str) -> Result<Vec<Item>, ParseError> {
    let document = Html::parse_document(html);
    let container = find_container(&document).ok_or(ParseError::ContainerNotFound)?;

    let items: Vec<Item> = select_headings(container)
        .into_iter()
        .filter_map(|heading| {
            let item = parse_heading(heading, origin);
            if item.is_none() {
                log::debug!("Skipping project heading without a link");
            }
            item
        })
        .collect();

    Ok(items)
}
