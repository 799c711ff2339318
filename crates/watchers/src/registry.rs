use crate::callback::{ElementCallback, ThingCallback};
use core_types::{ContainerKind, WatchKind};
use css::Selector;
use std::collections::HashMap;
use std::rc::Rc;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct WatcherOptions {
    /// Run during discovery instead of in a later batch.
    pub immediate: bool,
}

impl WatcherOptions {
    pub const IMMEDIATE: WatcherOptions = WatcherOptions { immediate: true };
}

#[derive(Clone)]
pub(crate) struct ThingWatcher {
    pub(crate) callback: ThingCallback,
    pub(crate) options: WatcherOptions,
}

#[derive(Clone)]
pub(crate) struct ElementWatcher {
    pub(crate) selector: Option<Rc<Selector>>,
    pub(crate) callback: ElementCallback,
    pub(crate) options: WatcherOptions,
}

/// Subscription tables. Append-only: watchers live as long as the page.
#[derive(Default)]
pub struct WatcherRegistry {
    things: HashMap<WatchKind, Vec<ThingWatcher>>,
    elements: HashMap<ContainerKind, Vec<ElementWatcher>>,
}

impl WatcherRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn add_thing_watcher(
        &mut self,
        kind: WatchKind,
        callback: ThingCallback,
        options: WatcherOptions,
    ) {
        let kinds: &[WatchKind] = match kind {
            WatchKind::Any => &WatchKind::CONCRETE,
            ref one => std::slice::from_ref(one),
        };
        for kind in kinds {
            self.things.entry(*kind).or_default().push(ThingWatcher {
                callback: Rc::clone(&callback),
                options,
            });
        }
    }

    pub(crate) fn add_element_watcher(
        &mut self,
        kinds: &[ContainerKind],
        selector: Option<Selector>,
        callback: ElementCallback,
        options: WatcherOptions,
    ) {
        let selector = selector.map(Rc::new);
        for kind in kinds {
            self.elements.entry(*kind).or_default().push(ElementWatcher {
                selector: selector.clone(),
                callback: Rc::clone(&callback),
                options,
            });
        }
    }

    /// Copy of the thing watchers for `kind`, taken at the start of a pass so
    /// late registrations only apply to later passes.
    pub(crate) fn thing_watchers(&self, kind: WatchKind) -> Vec<ThingWatcher> {
        self.things.get(&kind).cloned().unwrap_or_default()
    }

    pub(crate) fn element_watchers(&self, kind: ContainerKind) -> Vec<ElementWatcher> {
        self.elements.get(&kind).cloned().unwrap_or_default()
    }

    pub fn thing_watcher_count(&self, kind: WatchKind) -> usize {
        match kind {
            WatchKind::Any => WatchKind::CONCRETE
                .iter()
                .map(|k| self.thing_watcher_count(*k))
                .sum(),
            kind => self.things.get(&kind).map_or(0, Vec::len),
        }
    }

    pub fn element_watcher_count(&self, kind: ContainerKind) -> usize {
        self.elements.get(&kind).map_or(0, Vec::len)
    }
}
