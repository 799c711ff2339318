//! Dispatch pass: discover the things and watched elements of a newly
//! available subtree, run immediate callbacks on the spot and queue the rest
//! in per-row groups.

use crate::callback::Invocation;
use crate::page::Page;
use core_types::{ContainerKind, ThingKind, WatchKind};
use html::{Document, NodeId};
use layout::Geometry;
use std::collections::HashMap;
use things::{Thing, ThingId};

/// Order in which the deferred groups of one pass are queued.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum GroupOrder {
    /// Order of first discovery.
    #[default]
    Discovery,
    /// Nearest to the visible part of the viewport first; rows without a
    /// layout box last.
    Viewport,
}

/// What a dispatch pass found and did.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PassSummary {
    pub things: usize,
    /// Callbacks run during the pass.
    pub immediate: usize,
    /// Callbacks queued behind the scheduler.
    pub deferred: usize,
    pub groups: usize,
}

struct Group {
    owner: NodeId,
    invocations: Vec<Invocation>,
}

/// Groups keyed by owning element, in first-seen order.
#[derive(Default)]
struct Groups {
    groups: Vec<Group>,
    index: HashMap<NodeId, usize>,
}

impl Groups {
    fn push(&mut self, owner: NodeId, invocation: Invocation) {
        let slot = *self.index.entry(owner).or_insert_with(|| {
            self.groups.push(Group {
                owner,
                invocations: Vec::new(),
            });
            self.groups.len() - 1
        });
        self.groups[slot].invocations.push(invocation);
    }
}

/// Watcher table a thing is announced to, if any.
pub fn watch_kind(thing: &Thing<'_>) -> Option<WatchKind> {
    let doc = thing.document();
    match thing.kind() {
        ThingKind::Post => Some(WatchKind::Post),
        ThingKind::Comment => Some(WatchKind::Comment),
        ThingKind::Generic if things::is_message(doc, thing.element()) => Some(WatchKind::Message),
        ThingKind::Generic if things::is_subreddit(doc, thing.element()) => {
            Some(WatchKind::Subreddit)
        }
        ThingKind::Generic => None,
    }
}

/// Sort key of `node` for [`GroupOrder::Viewport`]: distance below the top
/// of the viewport, with rows scrolled out past the top ranked after the
/// viewport height.
pub fn viewport_key(geometry: &dyn Geometry, doc: &Document, node: NodeId) -> f32 {
    match geometry.client_rect(doc, node) {
        Some(rect) if rect.y >= 0.0 => rect.y,
        Some(rect) => -rect.y + geometry.viewport().height,
        None => f32::INFINITY,
    }
}

/// Element that owns callbacks for `target`: the nearest `.thing` above it,
/// else the target itself.
fn owning_element(doc: &Document, target: NodeId) -> NodeId {
    doc.ancestors(target)
        .find(|a| doc.has_class(*a, "thing"))
        .unwrap_or(target)
}

impl Page {
    /// Run one dispatch pass over `root` for watchers of container `kind`.
    pub fn dispatch(&mut self, kind: ContainerKind, root: NodeId, order: GroupOrder) -> PassSummary {
        let mut summary = PassSummary::default();
        let mut groups = Groups::default();

        // Watchers registered from here on wait for the next pass.
        let thing_watchers: HashMap<WatchKind, _> = WatchKind::CONCRETE
            .iter()
            .map(|k| (*k, self.watchers.thing_watchers(*k)))
            .collect();
        let element_watchers = self.watchers.element_watchers(kind);

        let found: Vec<ThingId> = self.things.find_things(&self.doc, root);
        summary.things = found.len();
        for id in found {
            let Some((element, watch)) = self
                .thing(id)
                .map(|t| (t.element(), watch_kind(&t)))
            else {
                continue;
            };
            let Some(watchers) = watch.and_then(|w| thing_watchers.get(&w)) else {
                continue;
            };
            for watcher in watchers {
                let invocation = Invocation::Thing(watcher.callback.clone(), id);
                if watcher.options.immediate {
                    summary.immediate += 1;
                    invocation.run(self);
                } else {
                    summary.deferred += 1;
                    groups.push(element, invocation);
                }
            }
        }

        for watcher in &element_watchers {
            let targets = match &watcher.selector {
                Some(selector) => css::query_selector_all(&self.doc, root, selector),
                None => vec![root],
            };
            for target in targets {
                let invocation = Invocation::Element(watcher.callback.clone(), target);
                if watcher.options.immediate {
                    summary.immediate += 1;
                    invocation.run(self);
                } else {
                    summary.deferred += 1;
                    groups.push(owning_element(&self.doc, target), invocation);
                }
            }
        }

        let mut ordered = groups.groups;
        if order == GroupOrder::Viewport {
            let geometry = self.geometry();
            let mut keyed: Vec<(f32, Group)> = ordered
                .into_iter()
                .map(|g| (viewport_key(geometry, &self.doc, g.owner), g))
                .collect();
            keyed.sort_by(|a, b| a.0.total_cmp(&b.0));
            ordered = keyed.into_iter().map(|(_, g)| g).collect();
        }

        summary.groups = ordered.len();
        for group in ordered {
            let invocations = group.invocations;
            self.schedule(Box::new(move |page: &mut Page| {
                for invocation in invocations {
                    invocation.run(page);
                }
            }));
        }

        log::trace!(
            target: "watchers.dispatch",
            "{kind:?} pass over {root:?}: {} thing(s), {} immediate, {} deferred in {} group(s)",
            summary.things,
            summary.immediate,
            summary.deferred,
            summary.groups
        );
        summary
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use layout::{LayoutMap, Rect, StaticGeometry, Viewport};

    fn rect(y: f32) -> Rect {
        Rect {
            x: 0.0,
            y,
            width: 100.0,
            height: 10.0,
        }
    }

    #[test]
    fn viewport_key_folds_rows_above_the_fold() {
        let doc = Document::parse("<div></div><div></div><div></div>");
        let nodes: Vec<_> = doc.element_children(Document::ROOT).collect();
        let mut rects = LayoutMap::default();
        rects.insert(nodes[0], rect(50.0));
        rects.insert(nodes[1], rect(-20.0));
        let geometry = StaticGeometry {
            viewport: Viewport {
                width: 800.0,
                height: 600.0,
                scroll_y: 0.0,
            },
            rects,
        };
        assert_eq!(viewport_key(&geometry, &doc, nodes[0]), 50.0);
        assert_eq!(viewport_key(&geometry, &doc, nodes[1]), 620.0);
        assert_eq!(viewport_key(&geometry, &doc, nodes[2]), f32::INFINITY);
    }

    #[test]
    fn callbacks_group_under_the_enclosing_row() {
        let doc = Document::parse(
            r#"<div class="thing" id="row"><div class="entry"><p id="inner"></p></div></div><p id="loose"></p>"#,
        );
        let find = |id: &str| {
            doc.descendants(Document::ROOT)
                .find(|n| doc.attr(*n, "id") == Some(id))
                .unwrap()
        };
        assert_eq!(owning_element(&doc, find("inner")), find("row"));
        // The row itself is owned by nothing above it.
        assert_eq!(owning_element(&doc, find("row")), find("row"));
        assert_eq!(owning_element(&doc, find("loose")), find("loose"));
    }
}
