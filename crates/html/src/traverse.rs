use crate::{Document, NodeId};

/// Walks parent links upward, nearest ancestor first.
pub struct Ancestors<'a> {
    doc: &'a Document,
    next: Option<NodeId>,
}

impl<'a> Ancestors<'a> {
    pub(crate) fn new(doc: &'a Document, start: Option<NodeId>) -> Self {
        Self { doc, next: start }
    }
}

impl Iterator for Ancestors<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let current = self.next?;
        self.next = self.doc.parent(current);
        Some(current)
    }
}

/// Pre-order (document order) walk of a subtree, excluding its root.
pub struct Descendants<'a> {
    doc: &'a Document,
    stack: Vec<NodeId>,
}

impl<'a> Descendants<'a> {
    pub(crate) fn new(doc: &'a Document, root: NodeId) -> Self {
        let stack = doc.children(root).iter().rev().copied().collect();
        Self { doc, stack }
    }
}

impl Iterator for Descendants<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let current = self.stack.pop()?;
        self.stack
            .extend(self.doc.children(current).iter().rev().copied());
        Some(current)
    }
}

/// `root` followed by its descendants, in document order.
pub fn inclusive_descendants(doc: &Document, root: NodeId) -> impl Iterator<Item = NodeId> + '_ {
    std::iter::once(root).chain(doc.descendants(root))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn descendants_follow_document_order() {
        let doc = Document::parse("<div id=a><p id=b><i id=c></i></p><p id=d></p></div>");
        let ids: Vec<_> = doc
            .descendants(Document::ROOT)
            .filter_map(|n| doc.attr(n, "id"))
            .collect();
        assert_eq!(ids, ["a", "b", "c", "d"]);
    }

    #[test]
    fn ancestors_walk_to_the_document() {
        let doc = Document::parse("<div><p><i id=leaf></i></p></div>");
        let leaf = doc
            .descendants(Document::ROOT)
            .find(|n| doc.attr(*n, "id") == Some("leaf"))
            .unwrap();
        let names: Vec<_> = doc.ancestors(leaf).map(|n| doc.name(n)).collect();
        assert_eq!(names, [Some("p"), Some("div"), None]);
    }
}
