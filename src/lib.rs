//! Page session glue: configuration, the filter feature, and a runner that
//! loads a page, announces its listings and reports what the watchers did.

pub mod config;
pub mod filtering;

use css::{Selector, SelectorError};
use filters::{CaseError, Collaborators};
use html::{Document, NodeId};
use layout::BlockLayout;
use once_cell::sync::Lazy;
use std::fmt;
use things::{ThingKind, Things, Visibility};
use watchers::{ContainerKind, Page, PassSummary, init_observers};

pub use config::{ConfigError, FilterConfig, PageConfig};
pub use filtering::{FilterFeature, FilterMatch};

static SITETABLE: Lazy<Selector> =
    Lazy::new(|| Selector::parse(".sitetable").expect("sitetable selector"));

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("cannot register watcher: {0}")]
    Selector(#[from] SelectorError),
    #[error("cannot build filters: {0}")]
    Case(#[from] CaseError),
}

/// Build a page session for `markup`: observers, filters and geometry set up
/// from `config`. Nothing is announced yet.
pub fn open_page(
    markup: &str,
    url: Option<&str>,
    config: &PageConfig,
    collaborators: &Collaborators,
) -> Result<Page, AppError> {
    let mut doc = Document::parse(markup);
    if let Some(url) = url {
        doc.set_url(url);
    }
    let geometry = BlockLayout::new(config.viewport());
    let mut page = Page::with_config(doc, config.dispatch(), Box::new(geometry));
    init_observers(&mut page)?;
    FilterFeature::from_config(&config.filters, collaborators)?.install(&mut page);
    Ok(page)
}

/// Listings present at load: every outermost `.sitetable`, else the search
/// result listing.
pub fn initial_listings(doc: &Document) -> Vec<NodeId> {
    let outermost: Vec<NodeId> = css::query_selector_all(doc, Document::ROOT, &SITETABLE)
        .into_iter()
        .filter(|s| !doc.ancestors(*s).any(|a| doc.has_class(a, "sitetable")))
        .collect();
    if !outermost.is_empty() {
        return outermost;
    }
    doc.body()
        .and_then(|body| Things::things_container(doc, body))
        .into_iter()
        .collect()
}

/// Announce the listings present at load.
pub fn announce_page(page: &mut Page) -> Vec<PassSummary> {
    initial_listings(&page.doc)
        .into_iter()
        .map(|listing| page.notify_container_ready(ContainerKind::SiteTable, listing))
        .collect()
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ThingReport {
    pub fullname: String,
    pub kind: ThingKind,
    pub visible: bool,
    /// Label of the filter that hid the thing.
    pub filter: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PageReport {
    pub passes: usize,
    pub turns: usize,
    pub things: Vec<ThingReport>,
}

impl PageReport {
    pub fn collect(page: &mut Page, passes: usize, turns: usize) -> Self {
        let ids = page.things.all(&page.doc);
        let things = ids
            .into_iter()
            .filter_map(|id| page.thing(id))
            .map(|thing| ThingReport {
                fullname: thing.fullname().unwrap_or("?").to_string(),
                kind: thing.kind(),
                visible: thing.is_visible(),
                filter: thing
                    .filter()
                    .and_then(|payload| payload.downcast_ref::<FilterMatch>())
                    .map(|m| m.label.clone()),
            })
            .collect();
        Self {
            passes,
            turns,
            things,
        }
    }
}

impl fmt::Display for PageReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "{} thing(s), {} pass(es), {} turn(s)",
            self.things.len(),
            self.passes,
            self.turns
        )?;
        for thing in &self.things {
            let state = match (&thing.filter, thing.visible) {
                (Some(label), true) => format!("visible, matched {label}"),
                (Some(label), false) => format!("hidden by {label}"),
                (None, true) => "visible".to_string(),
                (None, false) => "hidden".to_string(),
            };
            writeln!(f, "{:<12} {:<8} {state}", thing.fullname, format!("{:?}", thing.kind))?;
        }
        Ok(())
    }
}

/// Open `markup`, announce its listings and run until idle.
pub fn run_page(markup: &str, url: Option<&str>, config: &PageConfig) -> Result<PageReport, AppError> {
    let mut page = open_page(markup, url, config, &Collaborators::default())?;
    let passes = announce_page(&mut page).len();
    let turns = page.run_until_idle();
    Ok(PageReport::collect(&mut page, passes, turns))
}
