use crate::error::ThingError;
use crate::selectors::{BODY_THING, ENTRY, SEARCH_LISTING, SITETABLE, THING};
use crate::thing::Thing;
use core_types::{Direction, ThingKind};
use html::{Document, NodeId};
use once_cell::unsync::OnceCell;
use std::any::Any;
use std::collections::{HashMap, HashSet};
use std::rc::Rc;

/// Opaque annotation attached to a thing by whoever filtered it.
pub type FilterPayload = Rc<dyn Any>;

const FILTERED_CLASS: &str = "RESFiltered";
const VISIBLE_CHILD_CLASS: &str = "res-thing-has-visible-child";

/// Stable handle of a wrapped thing. Ids are never reused, so a handle whose
/// thing was reclaimed simply stops resolving.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ThingId(pub u32);

/// Something `resolve` accepts: a raw node, or an already-resolved thing.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Target {
    Node(NodeId),
    Thing(ThingId),
}

impl From<NodeId> for Target {
    fn from(node: NodeId) -> Self {
        Target::Node(node)
    }
}

impl From<ThingId> for Target {
    fn from(id: ThingId) -> Self {
        Target::Thing(id)
    }
}

pub(crate) struct ThingRecord {
    pub(crate) element: NodeId,
    pub(crate) entry: NodeId,
    pub(crate) kind: ThingKind,
    pub(crate) filter: Option<FilterPayload>,
    /// Comments only: nearest enclosing comment, fixed at construction.
    pub(crate) parent: Option<ThingId>,
    /// Comments only: inverse of `parent`, in registration order.
    pub(crate) children: Vec<ThingId>,
    pub(crate) subreddit: OnceCell<Option<String>>,
}

/// Identity registry: at most one thing per element.
///
/// Invariants:
/// - `by_element[r.element] == id` for every live record `r` at `id`.
/// - For every live comment `c` with `c.parent == Some(p)`, `c` is in `p.children`.
#[derive(Default)]
pub struct Things {
    records: Vec<Option<ThingRecord>>,
    by_element: HashMap<NodeId, ThingId>,
    stale_visible_child: HashSet<ThingId>,
}

pub(crate) fn classify(doc: &Document, element: NodeId) -> ThingKind {
    if is_comment(doc, element) {
        ThingKind::Comment
    } else if is_post(doc, element) {
        ThingKind::Post
    } else {
        ThingKind::Generic
    }
}

pub fn is_comment(doc: &Document, element: NodeId) -> bool {
    doc.has_class(element, "comment") || doc.has_class(element, "was-comment")
}

pub fn is_post(doc: &Document, element: NodeId) -> bool {
    doc.has_class(element, "link") || doc.has_class(element, "search-result-link")
}

pub fn is_message(doc: &Document, element: NodeId) -> bool {
    doc.has_class(element, "message")
}

pub fn is_subreddit(doc: &Document, element: NodeId) -> bool {
    doc.has_class(element, "subreddit")
}

impl Things {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn record(&self, id: ThingId) -> Option<&ThingRecord> {
        self.records.get(id.0 as usize).and_then(Option::as_ref)
    }

    fn record_mut(&mut self, id: ThingId) -> Option<&mut ThingRecord> {
        self.records.get_mut(id.0 as usize).and_then(Option::as_mut)
    }

    pub fn contains(&self, id: ThingId) -> bool {
        self.record(id).is_some()
    }

    /// Number of live things.
    pub fn len(&self) -> usize {
        self.by_element.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_element.is_empty()
    }

    /// Thing already wrapping exactly `element`, without constructing one.
    pub fn lookup(&self, element: NodeId) -> Option<ThingId> {
        self.by_element.get(&element).copied()
    }

    /// Borrowed view of a live thing.
    pub fn get<'a>(&'a self, doc: &'a Document, id: ThingId) -> Option<Thing<'a>> {
        self.record(id).map(|rec| Thing::new(doc, self, id, rec))
    }

    /// Wrap the thing enclosing `target`.
    ///
    /// - A live `ThingId` resolves to itself.
    /// - A node resolves through its closest ancestor-or-self thing element;
    ///   `None` when there is none.
    /// - The same element always yields the same id.
    pub fn resolve(&mut self, doc: &Document, target: impl Into<Target>) -> Option<ThingId> {
        match target.into() {
            Target::Thing(id) => self.contains(id).then_some(id),
            Target::Node(node) => {
                let element = css::closest(doc, node, &THING)?;
                if let Some(id) = self.by_element.get(&element) {
                    return Some(*id);
                }
                Some(self.construct(doc, element))
            }
        }
    }

    /// Like [`resolve`](Self::resolve), for call sites that know a thing must exist.
    pub fn resolve_or_fail(
        &mut self,
        doc: &Document,
        target: impl Into<Target>,
    ) -> Result<ThingId, ThingError> {
        let target = target.into();
        self.resolve(doc, target).ok_or(match target {
            Target::Node(node) => ThingError::Construction { node },
            Target::Thing(id) => ThingError::Reclaimed(id),
        })
    }

    fn construct(&mut self, doc: &Document, element: NodeId) -> ThingId {
        let kind = classify(doc, element);
        let entry = css::query_selector(doc, element, &ENTRY).unwrap_or(element);
        let id = ThingId(self.records.len() as u32);
        self.records.push(Some(ThingRecord {
            element,
            entry,
            kind,
            filter: None,
            parent: None,
            children: Vec::new(),
            subreddit: OnceCell::new(),
        }));
        self.by_element.insert(element, id);
        log::trace!(target: "things", "wrapped {element:?} as {kind:?} ({id:?})");

        if kind == ThingKind::Comment {
            let parent = self
                .enclosing_thing_element(doc, element)
                .and_then(|p| self.resolve(doc, p))
                .filter(|p| self.record(*p).is_some_and(|r| r.kind == ThingKind::Comment));
            if let Some(parent) = parent {
                if let Some(rec) = self.record_mut(id) {
                    rec.parent = Some(parent);
                }
                if let Some(prec) = self.record_mut(parent) {
                    if !prec.children.contains(&id) {
                        prec.children.push(id);
                    }
                }
            }
        }
        id
    }

    fn enclosing_thing_element(&self, doc: &Document, element: NodeId) -> Option<NodeId> {
        doc.ancestors(element)
            .find(|a| doc.is_element(*a) && doc.has_class(*a, "thing"))
    }

    /// Things inside `container` (the container itself first, when it is one),
    /// in document order.
    pub fn find_things(&mut self, doc: &Document, container: NodeId) -> Vec<ThingId> {
        let potential: Vec<NodeId> = html::traverse::inclusive_descendants(doc, container)
            .filter(|n| doc.is_element(*n) && css::matches(doc, *n, &THING))
            .collect();
        potential
            .into_iter()
            .filter_map(|e| self.resolve(doc, e))
            .collect()
    }

    /// Thing elements that belong to the page listing, in document order.
    pub fn thing_elements(doc: &Document) -> Vec<NodeId> {
        css::query_selector_all(doc, Document::ROOT, &BODY_THING)
    }

    /// Every listing thing, resolved, in document order.
    pub fn all(&mut self, doc: &Document) -> Vec<ThingId> {
        Self::thing_elements(doc)
            .into_iter()
            .filter_map(|e| self.resolve(doc, e))
            .collect()
    }

    /// The listing that holds the page's things.
    pub fn things_container(doc: &Document, body: NodeId) -> Option<NodeId> {
        css::query_selector(doc, body, &SITETABLE)
            .or_else(|| css::query_selector_all(doc, body, &SEARCH_LISTING).pop())
    }

    /// Store (or clear) the filter annotation and mirror it as the
    /// `RESFiltered` marker class.
    pub fn set_filter(
        &mut self,
        doc: &mut Document,
        id: ThingId,
        filter: Option<FilterPayload>,
    ) -> Result<(), ThingError> {
        let rec = self.record_mut(id).ok_or(ThingError::Reclaimed(id))?;
        let filtered = filter.is_some();
        rec.filter = filter;
        let (element, parent) = (rec.element, rec.parent);
        doc.toggle_class(element, FILTERED_CLASS, filtered);
        if let Some(parent) = parent {
            self.invalidate_child_visibility(parent);
        }
        Ok(())
    }

    /// Mark a comment's cached "has visible child" state as stale.
    pub fn invalidate_child_visibility(&mut self, id: ThingId) {
        if self.contains(id) {
            self.stale_visible_child.insert(id);
        }
    }

    pub fn has_stale_child_visibility(&self) -> bool {
        !self.stale_visible_child.is_empty()
    }

    /// Recompute stale "has visible child" markers, deepest comments first so
    /// a parent sees its children's settled state. A change re-queues the
    /// parent. Returns the number of markers that changed.
    pub fn flush_child_visibility(&mut self, doc: &mut Document) -> usize {
        let mut changed = 0;
        while !self.stale_visible_child.is_empty() {
            let mut batch: Vec<(usize, ThingId)> = std::mem::take(&mut self.stale_visible_child)
                .into_iter()
                .filter_map(|id| self.record(id).map(|r| (doc.depth(r.element), id)))
                .collect();
            batch.sort_by(|a, b| b.0.cmp(&a.0).then(a.1.cmp(&b.1)));
            for (_, id) in batch {
                let Some(rec) = self.record(id) else { continue };
                let (element, parent) = (rec.element, rec.parent);
                let any_visible = rec.children.iter().any(|c| {
                    self.get(doc, *c)
                        .and_then(Thing::as_comment)
                        .is_some_and(|child| child.holds_parent_open())
                });
                if doc.toggle_class(element, VISIBLE_CHILD_CLASS, any_visible) {
                    changed += 1;
                    if let Some(parent) = parent {
                        self.stale_visible_child.insert(parent);
                    }
                }
            }
        }
        changed
    }

    /// Sibling comment in `direction` under the same parent element that is visible.
    pub fn next_sibling(
        &mut self,
        doc: &Document,
        id: ThingId,
        direction: Direction,
    ) -> Option<ThingId> {
        let element = self.record(id)?.element;
        let parent = doc.parent_element(element)?;
        let siblings: Vec<ThingId> = doc
            .element_children(parent)
            .filter(|e| css::matches(doc, *e, &THING))
            .filter_map(|e| self.resolve(doc, e))
            .collect();
        self.get(doc, id)?
            .get_next(direction, &siblings, Some(ThingKind::Comment))
    }

    /// [`Thing::get_closest_visible`] over every listing thing on the page.
    pub fn closest_visible(
        &mut self,
        doc: &Document,
        id: ThingId,
        include_self: bool,
    ) -> Option<ThingId> {
        let all = self.all(doc);
        self.get(doc, id)?.get_closest_visible(&all, include_self)
    }

    /// Drop things whose element is no longer in the document. Returns the
    /// number of reclaimed things.
    pub fn prune(&mut self, doc: &Document) -> usize {
        let dead: Vec<ThingId> = self
            .by_element
            .iter()
            .filter(|(element, _)| !doc.is_connected(**element))
            .map(|(_, id)| *id)
            .collect();
        for id in &dead {
            let Some(rec) = self.records.get_mut(id.0 as usize).and_then(Option::take) else {
                continue;
            };
            self.by_element.remove(&rec.element);
            self.stale_visible_child.remove(id);
            if let Some(parent) = rec.parent.and_then(|p| self.record_mut(p)) {
                parent.children.retain(|c| c != id);
            }
            for child in rec.children {
                if let Some(crec) = self.record_mut(child) {
                    crec.parent = None;
                }
            }
        }
        if !dead.is_empty() {
            log::debug!(target: "things", "reclaimed {} detached things", dead.len());
        }
        dead.len()
    }
}
