//! Page-side wiring that turns structural page events into dispatch passes.

use crate::callback::{CallbackError, CallbackResult};
use crate::dispatch::{GroupOrder, PassSummary};
use crate::page::Page;
use crate::registry::WatcherOptions;
use core_types::{ContainerKind, WatchKind};
use css::{Selector, SelectorError};
use html::{Document, NodeId};
use once_cell::sync::Lazy;
use things::ThingId;

static FORM: Lazy<Selector> = Lazy::new(|| Selector::parse("form").expect("form selector"));
static THING: Lazy<Selector> = Lazy::new(|| Selector::parse(".thing").expect("thing selector"));
static SITETABLE: Lazy<Selector> =
    Lazy::new(|| Selector::parse(".sitetable").expect("sitetable selector"));
static CHILD: Lazy<Selector> = Lazy::new(|| Selector::parse(".child").expect("child selector"));
static COMMENT_AREA: Lazy<Selector> =
    Lazy::new(|| Selector::parse(".commentarea .sitetable").expect("comment area selector"));

const EXPANDO: &str = ".entry div.expando";

impl Page {
    /// Announce a container of things that just became available.
    pub fn notify_container_ready(&mut self, kind: ContainerKind, root: NodeId) -> PassSummary {
        match kind {
            ContainerKind::SiteTable if self.config().sort_sitetables => new_sitetable(self, root),
            kind => self.dispatch(kind, root, GroupOrder::Discovery),
        }
    }
}

/// Dispatch a listing; attached listings run their rows nearest to the
/// viewport first.
pub fn new_sitetable(page: &mut Page, sitetable: NodeId) -> PassSummary {
    let order = if page.doc.is_connected(sitetable) {
        GroupOrder::Viewport
    } else {
        GroupOrder::Discovery
    };
    page.dispatch(ContainerKind::SiteTable, sitetable, order)
}

/// Watch the page for content that appears after load: self-text forms in
/// expandos and, on comment pages, newly loaded comments and replies.
pub fn init_observers(page: &mut Page) -> Result<(), SelectorError> {
    page.watch_for_elements(
        &[ContainerKind::SiteTable],
        Some(EXPANDO),
        observe_self_text,
        WatcherOptions::default(),
    )?;

    if things::is_comments_page(&page.doc) {
        if let Some(area) = css::query_selector(&page.doc, Document::ROOT, &COMMENT_AREA) {
            observe_comments(page, area);
        }
        page.watch_for_things(WatchKind::Comment, observe_replies, WatcherOptions::default());
    }
    Ok(())
}

fn observe_self_text(page: &mut Page, expando: NodeId) -> CallbackResult {
    page.watch_for_future_children(expando, &FORM, |page, form| {
        page.dispatch(ContainerKind::SelfText, form, GroupOrder::Discovery);
        Ok(())
    });
    Ok(())
}

fn observe_comments(page: &mut Page, sitetable: NodeId) {
    page.watch_for_future_children(sitetable, &THING, |page, comment| {
        page.dispatch(ContainerKind::NewComments, comment, GroupOrder::Discovery);
        Ok(())
    });
}

fn observe_replies(page: &mut Page, id: ThingId) -> CallbackResult {
    let element = page
        .thing(id)
        .map(|t| t.element())
        .ok_or_else(|| CallbackError::msg(format!("comment {id:?} is no longer registered")))?;

    if let Some(sitetable) = css::query_selector(&page.doc, element, &SITETABLE) {
        observe_comments(page, sitetable);
        return Ok(());
    }

    // Comments without replies have no listing until the first one loads.
    let Some(child) = css::query_selector(&page.doc, element, &CHILD) else {
        return Ok(());
    };
    page.wait_for_child(child, &SITETABLE, |page, sitetable| {
        observe_comments(page, sitetable);
        if let Some(first) = css::query_selector(&page.doc, sitetable, &THING) {
            page.dispatch(ContainerKind::NewComments, first, GroupOrder::Discovery);
        }
        Ok(())
    });
    Ok(())
}
