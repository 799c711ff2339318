use html::{Document, NodeId, NodeKind};
use std::cell::RefCell;
use std::collections::HashMap;

const DEFAULT_BLOCK_HEIGHT: f32 = 24.0; // until we have text metrics

/// A rectangle in CSS px units (we'll treat everything as px for now).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

/// Visible window onto the laid-out page.
#[derive(Clone, Copy, Debug, PartialEq, serde::Deserialize)]
#[serde(default)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
    /// Document offset of the viewport's top edge.
    pub scroll_y: f32,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            width: 1024.0,
            height: 768.0,
            scroll_y: 0.0,
        }
    }
}

/// Source of element geometry, in viewport coordinates.
pub trait Geometry {
    /// Bounding rect relative to the viewport, or `None` when the element
    /// currently has no layout box (detached or not rendered).
    fn client_rect(&self, doc: &Document, node: NodeId) -> Option<Rect>;

    fn viewport(&self) -> Viewport;
}

/// Document-space rects for every rendered node.
#[derive(Debug, Default)]
pub struct LayoutMap {
    rects: HashMap<NodeId, Rect>,
}

impl LayoutMap {
    pub fn get(&self, node: NodeId) -> Option<Rect> {
        self.rects.get(&node).copied()
    }

    pub fn insert(&mut self, node: NodeId, rect: Rect) {
        self.rects.insert(node, rect);
    }

    pub fn len(&self) -> usize {
        self.rects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rects.is_empty()
    }
}

/// Elements that never produce a box, together with their subtree.
pub fn is_non_rendering(doc: &Document, node: NodeId) -> bool {
    match doc.kind(node) {
        Some(NodeKind::Element { name, .. }) => {
            matches!(
                name.as_str(),
                "head" | "style" | "script" | "title" | "meta" | "link" | "template"
            ) || doc.attr(node, "hidden").is_some()
                || doc.attr(node, "style").is_some_and(declares_display_none)
        }
        Some(NodeKind::Comment { .. }) => true,
        _ => false,
    }
}

fn declares_display_none(style: &str) -> bool {
    style.split(';').any(|decl| {
        decl.split_once(':').is_some_and(|(name, value)| {
            name.trim().eq_ignore_ascii_case("display") && value.trim().eq_ignore_ascii_case("none")
        })
    })
}

/// Compute block layout for the whole document.
/// - every rendered element gets a base row of `DEFAULT_BLOCK_HEIGHT` plus its children
/// - the document, `html` and `body` only contain their children
pub fn layout_document(doc: &Document, page_width: f32) -> LayoutMap {
    let mut map = LayoutMap::default();
    layout_block_subtree(doc, Document::ROOT, 0.0, 0.0, page_width, &mut map);
    map
}

/// Lays out `node` at (`x`, `y`) and returns the next sibling's y cursor.
fn layout_block_subtree(
    doc: &Document,
    node: NodeId,
    x: f32,
    y: f32,
    width: f32,
    map: &mut LayoutMap,
) -> f32 {
    if is_non_rendering(doc, node) {
        return y;
    }

    let base_height = match doc.kind(node) {
        Some(NodeKind::Document) => 0.0,
        Some(NodeKind::Element { name, .. }) if name == "html" || name == "body" => 0.0,
        _ => DEFAULT_BLOCK_HEIGHT,
    };

    let mut cursor_y = y + base_height;
    for child in doc.children(node) {
        cursor_y = layout_block_subtree(doc, *child, x, cursor_y, width, map);
    }

    let mut height = cursor_y - y;
    if height <= 0.0 {
        height = DEFAULT_BLOCK_HEIGHT;
    }
    map.insert(
        node,
        Rect {
            x,
            y,
            width,
            height,
        },
    );
    y + height
}

/// [`Geometry`] backed by [`layout_document`], recomputed whenever the
/// document version changes.
pub struct BlockLayout {
    viewport: Viewport,
    cache: RefCell<Option<(u64, LayoutMap)>>,
}

impl BlockLayout {
    pub fn new(viewport: Viewport) -> Self {
        Self {
            viewport,
            cache: RefCell::new(None),
        }
    }

    pub fn scroll_to(&mut self, scroll_y: f32) {
        self.viewport.scroll_y = scroll_y;
    }
}

impl Geometry for BlockLayout {
    fn client_rect(&self, doc: &Document, node: NodeId) -> Option<Rect> {
        if !doc.is_connected(node) {
            return None;
        }
        let mut cache = self.cache.borrow_mut();
        let stale = cache.as_ref().is_none_or(|(version, _)| *version != doc.version());
        if stale {
            *cache = Some((doc.version(), layout_document(doc, self.viewport.width)));
        }
        let (_, map) = cache.as_ref()?;
        let rect = map.get(node)?;
        Some(Rect {
            y: rect.y - self.viewport.scroll_y,
            ..rect
        })
    }

    fn viewport(&self) -> Viewport {
        self.viewport
    }
}

/// Fixed geometry, for hosts that measure elements themselves.
#[derive(Debug, Default)]
pub struct StaticGeometry {
    pub viewport: Viewport,
    pub rects: LayoutMap,
}

impl Geometry for StaticGeometry {
    fn client_rect(&self, _doc: &Document, node: NodeId) -> Option<Rect> {
        self.rects.get(node).map(|r| Rect {
            y: r.y - self.viewport.scroll_y,
            ..r
        })
    }

    fn viewport(&self) -> Viewport {
        self.viewport
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn by_id(doc: &Document, id: &str) -> NodeId {
        doc.descendants(Document::ROOT)
            .find(|n| doc.attr(*n, "id") == Some(id))
            .unwrap()
    }

    #[test]
    fn siblings_stack_vertically() {
        let doc = Document::parse("<body><div id=a></div><div id=b><p>x</p></div><div id=c></div></body>");
        let map = layout_document(&doc, 800.0);
        let a = map.get(by_id(&doc, "a")).unwrap();
        let b = map.get(by_id(&doc, "b")).unwrap();
        let c = map.get(by_id(&doc, "c")).unwrap();
        assert_eq!(a.y, 0.0);
        assert_eq!(b.y, 24.0);
        // own row + <p> row + text row
        assert_eq!(b.height, 72.0);
        assert_eq!(c.y, 96.0);
    }

    #[test]
    fn hidden_elements_have_no_box() {
        let doc = Document::parse(
            r#"<div id=a style="color: red; display: none"><p id=inner></p></div><div id=b hidden></div><div id=c></div>"#,
        );
        let map = layout_document(&doc, 800.0);
        assert!(map.get(by_id(&doc, "a")).is_none());
        assert!(map.get(by_id(&doc, "inner")).is_none());
        assert!(map.get(by_id(&doc, "b")).is_none());
        assert_eq!(map.get(by_id(&doc, "c")).unwrap().y, 0.0);
    }

    #[test]
    fn block_layout_tracks_scroll_and_mutation() {
        let mut doc = Document::parse("<div id=a></div><div id=b></div>");
        let mut geometry = BlockLayout::new(Viewport {
            width: 800.0,
            height: 100.0,
            scroll_y: 0.0,
        });
        let b = by_id(&doc, "b");
        assert_eq!(geometry.client_rect(&doc, b).unwrap().y, 24.0);
        geometry.scroll_to(30.0);
        assert_eq!(geometry.client_rect(&doc, b).unwrap().y, -6.0);

        let a = by_id(&doc, "a");
        doc.remove(a).unwrap();
        assert_eq!(geometry.client_rect(&doc, b).unwrap().y, -30.0);
        assert!(geometry.client_rect(&doc, a).is_none());
    }
}
