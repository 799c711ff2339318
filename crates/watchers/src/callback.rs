use crate::page::Page;
use html::NodeId;
use std::error::Error;
use std::rc::Rc;
use things::ThingId;

/// Failure reported by a watcher callback. Contained at the dispatch
/// boundary: logged, never propagated.
#[derive(Debug, thiserror::Error)]
#[error("{message}")]
pub struct CallbackError {
    message: String,
    #[source]
    source: Option<Box<dyn Error + 'static>>,
}

impl CallbackError {
    pub fn msg(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            source: None,
        }
    }

    pub fn with_source(message: impl Into<String>, source: impl Error + 'static) -> Self {
        Self {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl From<things::ThingError> for CallbackError {
    fn from(err: things::ThingError) -> Self {
        Self::with_source("thing lookup failed", err)
    }
}

impl From<html::DomError> for CallbackError {
    fn from(err: html::DomError) -> Self {
        Self::with_source("document update failed", err)
    }
}

impl From<css::SelectorError> for CallbackError {
    fn from(err: css::SelectorError) -> Self {
        Self::with_source("invalid selector", err)
    }
}

pub type CallbackResult = Result<(), CallbackError>;

pub type ThingCallback = Rc<dyn Fn(&mut Page, ThingId) -> CallbackResult>;
pub type ElementCallback = Rc<dyn Fn(&mut Page, NodeId) -> CallbackResult>;

/// One pending callback call, bound to its argument.
#[derive(Clone)]
pub(crate) enum Invocation {
    Thing(ThingCallback, ThingId),
    Element(ElementCallback, NodeId),
}

impl Invocation {
    /// Run the callback; a failure is logged and swallowed.
    pub(crate) fn run(self, page: &mut Page) {
        let (result, target) = match self {
            Invocation::Thing(cb, id) => (cb(page, id), format!("{id:?}")),
            Invocation::Element(cb, node) => (cb(page, node), format!("{node:?}")),
        };
        if let Err(err) = result {
            match err.source() {
                Some(cause) => log::error!(
                    target: "watchers.dispatch",
                    "watcher callback for {target} failed: {err}: {cause}"
                ),
                None => log::error!(
                    target: "watchers.dispatch",
                    "watcher callback for {target} failed: {err}"
                ),
            }
        }
    }
}
