use crate::callback::{CallbackResult, Invocation};
use crate::mutation::MutationObservers;
use crate::registry::{WatcherOptions, WatcherRegistry};
use crate::scheduler::{Scheduler, Task};
use core_types::{ContainerKind, WatchKind};
use css::{Selector, SelectorError};
use futures::executor::LocalPool;
use futures::task::LocalSpawnExt;
use html::{Document, NodeId};
use layout::{BlockLayout, Geometry, Viewport};
use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::future::Future;
use std::rc::Rc;
use things::{Thing, ThingId, Things};

/// Pacing of deferred dispatch work.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DispatchConfig {
    /// Callback groups run per turn.
    pub groups_per_turn: usize,
    /// Order groups of an attached listing by viewport distance.
    pub sort_sitetables: bool,
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            groups_per_turn: 1,
            sort_sitetables: true,
        }
    }
}

/// Everything one page session owns: the document, the thing registry, the
/// watcher tables and the pending work. Callbacks receive it mutably.
pub struct Page {
    pub doc: Document,
    pub things: Things,
    pub(crate) watchers: WatcherRegistry,
    pub(crate) scheduler: Scheduler,
    pub(crate) observers: MutationObservers,
    geometry: Box<dyn Geometry>,
    pool: LocalPool,
    completions: Rc<RefCell<VecDeque<Task>>>,
    /// Spawned futures that have not produced their output yet.
    in_flight: Rc<Cell<usize>>,
    /// Futures spawned since the pool last ran.
    unpolled: usize,
    config: DispatchConfig,
}

impl Page {
    pub fn new(doc: Document) -> Self {
        Self::with_config(
            doc,
            DispatchConfig::default(),
            Box::new(BlockLayout::new(Viewport::default())),
        )
    }

    pub fn with_config(doc: Document, config: DispatchConfig, geometry: Box<dyn Geometry>) -> Self {
        Self {
            doc,
            things: Things::new(),
            watchers: WatcherRegistry::new(),
            scheduler: Scheduler::new(config.groups_per_turn),
            observers: MutationObservers::default(),
            geometry,
            pool: LocalPool::new(),
            completions: Rc::new(RefCell::new(VecDeque::new())),
            in_flight: Rc::new(Cell::new(0)),
            unpolled: 0,
            config,
        }
    }

    pub fn config(&self) -> DispatchConfig {
        self.config
    }

    pub fn geometry(&self) -> &dyn Geometry {
        self.geometry.as_ref()
    }

    pub fn set_geometry(&mut self, geometry: Box<dyn Geometry>) {
        self.geometry = geometry;
    }

    pub fn watchers(&self) -> &WatcherRegistry {
        &self.watchers
    }

    /// View of a registered thing.
    pub fn thing(&self, id: ThingId) -> Option<Thing<'_>> {
        self.things.get(&self.doc, id)
    }

    // ----- subscriptions -----

    /// Register `callback` for things of `kind`; `WatchKind::Any` registers
    /// it for every kind. Applies to dispatch passes that start afterwards.
    pub fn watch_for_things<F>(&mut self, kind: WatchKind, callback: F, options: WatcherOptions)
    where
        F: Fn(&mut Page, ThingId) -> CallbackResult + 'static,
    {
        self.watchers
            .add_thing_watcher(kind, Rc::new(callback), options);
    }

    /// Register `callback` for announced containers of `kinds`. With a
    /// selector, it runs for each matching element inside the container;
    /// without one, for the container itself.
    pub fn watch_for_elements<F>(
        &mut self,
        kinds: &[ContainerKind],
        selector: Option<&str>,
        callback: F,
        options: WatcherOptions,
    ) -> Result<(), SelectorError>
    where
        F: Fn(&mut Page, NodeId) -> CallbackResult + 'static,
    {
        let selector = selector.map(Selector::parse).transpose()?;
        self.watchers
            .add_element_watcher(kinds, selector, Rc::new(callback), options);
        Ok(())
    }

    /// Call `callback` for every element child that is inserted directly
    /// under `container` from now on and matches `selector`. Children present
    /// now are never reported.
    pub fn watch_for_future_children<F>(&mut self, container: NodeId, selector: &Selector, callback: F)
    where
        F: Fn(&mut Page, NodeId) -> CallbackResult + 'static,
    {
        self.observers.observe(
            &self.doc,
            container,
            Rc::new(selector.clone()),
            Rc::new(callback),
            false,
        );
    }

    /// Call `callback` once with the first child of `container` matching
    /// `selector`: an existing one on the next turn, otherwise the first one
    /// inserted later.
    pub fn wait_for_child<F>(&mut self, container: NodeId, selector: &Selector, callback: F)
    where
        F: Fn(&mut Page, NodeId) -> CallbackResult + 'static,
    {
        let existing = self
            .doc
            .element_children(container)
            .find(|c| css::matches(&self.doc, *c, selector));
        match existing {
            Some(child) => {
                let invocation = Invocation::Element(Rc::new(callback), child);
                self.completions
                    .borrow_mut()
                    .push_back(Box::new(move |page: &mut Page| invocation.run(page)));
            }
            None => self.observers.observe(
                &self.doc,
                container,
                Rc::new(selector.clone()),
                Rc::new(callback),
                true,
            ),
        }
    }

    pub fn observer_count(&self) -> usize {
        self.observers.len()
    }

    // ----- turns -----

    /// Queue `task` behind the pending dispatch groups.
    pub fn schedule(&mut self, task: Task) {
        self.scheduler.push(task);
    }

    pub fn pending_tasks(&self) -> usize {
        self.scheduler.len()
    }

    /// Run `future` on the page's local executor and hand its output to
    /// `then` on a later turn.
    pub fn spawn_local<Fut, T, F>(&mut self, future: Fut, then: F)
    where
        Fut: Future<Output = T> + 'static,
        T: 'static,
        F: FnOnce(&mut Page, T) + 'static,
    {
        let completions = Rc::clone(&self.completions);
        let in_flight = Rc::clone(&self.in_flight);
        in_flight.set(in_flight.get() + 1);
        let task = async move {
            let output = future.await;
            in_flight.set(in_flight.get() - 1);
            completions
                .borrow_mut()
                .push_back(Box::new(move |page: &mut Page| then(page, output)));
        };
        match self.pool.spawner().spawn_local(task) {
            Ok(()) => self.unpolled += 1,
            Err(err) => {
                self.in_flight.set(self.in_flight.get() - 1);
                log::error!(target: "watchers.dispatch", "cannot spawn local task: {err}");
            }
        }
    }

    /// Deliver pending child insertions to the mutation observers.
    pub fn flush_mutations(&mut self) {
        if !self.doc.has_pending_mutations() {
            return;
        }
        let mutations = self.doc.take_mutations();
        let invocations = self.observers.collect(&self.doc, &mutations);
        log::trace!(
            target: "watchers.mutation",
            "{} insertion(s), {} observer callback(s)",
            mutations.len(),
            invocations.len()
        );
        for invocation in invocations {
            invocation.run(self);
        }
    }

    /// One turn of the page's event loop: observe mutations, run the next
    /// dispatch groups, drive async work and deliver its results, then
    /// settle comment visibility. Returns `true` while work remains.
    pub fn run_turn(&mut self) -> bool {
        self.flush_mutations();
        for task in self.scheduler.take_turn() {
            task(self);
        }
        self.unpolled = 0;
        self.pool.run_until_stalled();
        loop {
            let next = self.completions.borrow_mut().pop_front();
            match next {
                Some(task) => task(self),
                None => break,
            }
        }
        let updated = self.things.flush_child_visibility(&mut self.doc);
        if updated > 0 {
            log::trace!(target: "watchers.dispatch", "updated {updated} comment(s) with visible children");
        }
        self.has_pending_work()
    }

    /// Run turns until no work remains; returns the number of turns.
    ///
    /// Stops early once only spawned futures remain and the last turn left
    /// all of them waiting.
    pub fn run_until_idle(&mut self) -> usize {
        let mut turns = 1;
        while self.run_turn() {
            if self.only_waiting() {
                log::debug!(
                    target: "watchers.dispatch",
                    "{} future(s) still waiting after {turns} turn(s)",
                    self.in_flight.get()
                );
                break;
            }
            turns += 1;
        }
        turns
    }

    /// Number of spawned futures still running on the local pool.
    pub fn futures_in_flight(&self) -> usize {
        self.in_flight.get()
    }

    pub fn has_pending_work(&self) -> bool {
        !self.scheduler.is_empty()
            || self.doc.has_pending_mutations()
            || !self.completions.borrow().is_empty()
            || self.in_flight.get() > 0
    }

    fn only_waiting(&self) -> bool {
        self.unpolled == 0
            && self.scheduler.is_empty()
            && !self.doc.has_pending_mutations()
            && self.completions.borrow().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::channel::oneshot;

    #[test]
    fn spawned_futures_complete_on_a_turn() {
        let mut page = Page::new(Document::parse("<body></body>"));
        let out = Rc::new(Cell::new(0));
        let sink = Rc::clone(&out);
        page.spawn_local(async { 41 }, move |_, v| sink.set(v + 1));
        assert_eq!(out.get(), 0);
        assert!(!page.run_turn());
        assert_eq!(out.get(), 42);
    }

    #[test]
    fn waiting_futures_count_as_pending_work() {
        let mut page = Page::new(Document::parse("<body></body>"));
        let (sender, receiver) = oneshot::channel::<u32>();
        let out = Rc::new(Cell::new(0));
        let sink = Rc::clone(&out);
        page.spawn_local(receiver, move |_, v| sink.set(v.unwrap_or(0)));
        assert!(page.has_pending_work());
        assert!(page.run_turn());
        assert_eq!(page.futures_in_flight(), 1);
        // Nothing on the page can wake it.
        assert_eq!(page.run_until_idle(), 1);
        assert_eq!(out.get(), 0);

        sender.send(7).unwrap();
        assert!(!page.run_turn());
        assert_eq!(page.futures_in_flight(), 0);
        assert_eq!(out.get(), 7);
    }

    #[test]
    fn scheduled_tasks_are_paced() {
        let config = DispatchConfig {
            groups_per_turn: 2,
            ..DispatchConfig::default()
        };
        let mut page = Page::with_config(
            Document::parse("<body></body>"),
            config,
            Box::new(layout::StaticGeometry::default()),
        );
        let ran = Rc::new(Cell::new(0));
        for _ in 0..5 {
            let ran = Rc::clone(&ran);
            page.schedule(Box::new(move |_: &mut Page| ran.set(ran.get() + 1)));
        }
        assert!(page.run_turn());
        assert_eq!(ran.get(), 2);
        assert_eq!(page.pending_tasks(), 3);
        assert_eq!(page.run_until_idle(), 2);
        assert_eq!(ran.get(), 5);
    }
}
