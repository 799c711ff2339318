use crate::config::FilterConfig;
use core_types::{ThingKind, WatchKind};
use filters::{CaseEngine, CaseError, Collaborators, Expression, PendingVerdict, Verdict, register_builtins};
use std::rc::Rc;
use things::{FilterPayload, ThingId};
use watchers::{CallbackError, CallbackResult, Page, WatcherOptions};

/// Filter annotation stored on things hidden by an expression.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FilterMatch {
    /// Label of the expression that matched.
    pub label: String,
}

/// Applies the post and comment expressions to every thing as it is
/// announced.
pub struct FilterFeature {
    engine: CaseEngine,
    posts: Expression,
    comments: Expression,
}

impl FilterFeature {
    pub fn new(engine: CaseEngine, posts: Expression, comments: Expression) -> Self {
        Self {
            engine,
            posts,
            comments,
        }
    }

    /// Built-in cases plus the configured expressions.
    pub fn from_config(config: &FilterConfig, collaborators: &Collaborators) -> Result<Self, CaseError> {
        let mut engine = CaseEngine::new();
        register_builtins(&mut engine, collaborators)?;
        let posts = Expression::from_spec(&engine, &config.posts)?;
        let comments = Expression::from_spec(&engine, &config.comments)?;
        Ok(Self::new(engine, posts, comments))
    }

    pub fn engine(&self) -> &CaseEngine {
        &self.engine
    }

    pub fn install(self, page: &mut Page) {
        let feature = Rc::new(self);
        for kind in [WatchKind::Post, WatchKind::Comment] {
            let feature = Rc::clone(&feature);
            page.watch_for_things(
                kind,
                move |page, id| feature.apply(page, id),
                WatcherOptions::default(),
            );
        }
    }

    fn expression_for(&self, kind: ThingKind) -> Option<&Expression> {
        let expression = match kind {
            ThingKind::Post => &self.posts,
            ThingKind::Comment => &self.comments,
            ThingKind::Generic => return None,
        };
        (!expression.is_empty()).then_some(expression)
    }

    fn apply(&self, page: &mut Page, id: ThingId) -> CallbackResult {
        let thing = page
            .thing(id)
            .ok_or_else(|| CallbackError::msg(format!("{id:?} is not registered")))?;
        let Some(expression) = self.expression_for(thing.kind()) else {
            return Ok(());
        };
        let label = expression.label();
        let verdict = expression.evaluate(&self.engine, &thing);
        match verdict {
            Verdict::Ready(result) => settle(page, id, label, result),
            Verdict::Pending(pending) => defer(page, id, label, pending),
        }
        Ok(())
    }
}

/// Run the case in flight on the page's pool, then carry on with the
/// remaining cases against the thing as it is by then.
fn defer(page: &mut Page, id: ThingId, label: String, pending: PendingVerdict) {
    let (future, rest) = pending.into_parts();
    page.spawn_local(future, move |page, result| {
        let verdict = match page.thing(id) {
            Some(thing) => rest.resume(&thing, result),
            None => {
                log::warn!(target: "filters", "{id:?} went away before its filter settled");
                return;
            }
        };
        match verdict {
            Verdict::Ready(result) => settle(page, id, label, result),
            Verdict::Pending(pending) => defer(page, id, label, pending),
        }
    });
}

fn settle(page: &mut Page, id: ThingId, label: String, result: Result<bool, CaseError>) {
    let matched = match result {
        Ok(matched) => matched,
        Err(err) => {
            log::warn!(target: "filters", "filter evaluation for {id:?} failed: {err}");
            return;
        }
    };
    let payload = matched.then(|| Rc::new(FilterMatch { label }) as FilterPayload);
    if let Err(err) = page.things.set_filter(&mut page.doc, id, payload) {
        log::warn!(target: "filters", "cannot annotate {id:?}: {err}");
    }
}
