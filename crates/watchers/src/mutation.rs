use crate::callback::{ElementCallback, Invocation};
use css::Selector;
use html::{Document, Mutation, NodeId};
use std::collections::HashSet;
use std::rc::Rc;

struct Observer {
    container: NodeId,
    selector: Rc<Selector>,
    callback: ElementCallback,
    /// Children already reported, or present when observation began.
    seen: HashSet<NodeId>,
    once: bool,
}

/// Child-insertion observers fed from the document's mutation journal.
#[derive(Default)]
pub(crate) struct MutationObservers {
    observers: Vec<Observer>,
}

impl MutationObservers {
    pub(crate) fn observe(
        &mut self,
        doc: &Document,
        container: NodeId,
        selector: Rc<Selector>,
        callback: ElementCallback,
        once: bool,
    ) {
        let seen = doc.children(container).iter().copied().collect();
        self.observers.push(Observer {
            container,
            selector,
            callback,
            seen,
            once,
        });
    }

    pub(crate) fn len(&self) -> usize {
        self.observers.len()
    }

    /// Match journal entries against the observers and return the callbacks
    /// to run, in journal order. Observers of detached containers and fired
    /// one-shot observers are dropped.
    pub(crate) fn collect(&mut self, doc: &Document, mutations: &[Mutation]) -> Vec<Invocation> {
        let before = self.observers.len();
        self.observers.retain(|o| doc.is_connected(o.container));
        let dropped = before - self.observers.len();
        if dropped > 0 {
            log::debug!(target: "watchers.mutation", "dropped {dropped} observer(s) of detached containers");
        }

        let mut fired = vec![false; self.observers.len()];
        let mut out = Vec::new();
        for mutation in mutations {
            let Mutation::ChildInserted { parent, child } = *mutation;
            for (observer, fired) in self.observers.iter_mut().zip(fired.iter_mut()) {
                if observer.container != parent || (observer.once && *fired) {
                    continue;
                }
                // The child may have moved on before the flush.
                if doc.parent(child) != Some(parent) || !doc.is_element(child) {
                    continue;
                }
                if !css::matches(doc, child, &observer.selector) || !observer.seen.insert(child) {
                    continue;
                }
                *fired = true;
                out.push(Invocation::Element(Rc::clone(&observer.callback), child));
            }
        }

        let mut fired = fired.into_iter();
        self.observers
            .retain(|o| !(fired.next().unwrap_or(false) && o.once));
        out
    }
}
