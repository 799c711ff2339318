use crate::traverse::{Ancestors, Descendants};
use crate::types::{NodeId, NodeKind, NodeRecord};

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum DomError {
    #[error("unknown node {0:?}")]
    UnknownNode(NodeId),
    #[error("node {0:?} cannot have children")]
    InvalidParent(NodeId),
    #[error("node {0:?} already has a parent")]
    AlreadyAttached(NodeId),
    #[error("{before:?} is not a child of {parent:?}")]
    InvalidSibling { parent: NodeId, before: NodeId },
    #[error("inserting {child:?} under {parent:?} would create a cycle")]
    CycleDetected { parent: NodeId, child: NodeId },
    #[error("the document root cannot be moved or removed")]
    RootImmutable,
}

/// Structural change recorded for the mutation watcher.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Mutation {
    ChildInserted { parent: NodeId, child: NodeId },
}

/// Mutable document tree.
///
/// Invariants:
/// - `NodeId(0)` is the document node and is always connected.
/// - A node has at most one parent, and no operation creates a cycle.
/// - `version` increases on every structural or attribute change.
#[derive(Debug)]
pub struct Document {
    nodes: Vec<NodeRecord>,
    url: Option<String>,
    version: u64,
    journal: Vec<Mutation>,
}

impl Document {
    pub const ROOT: NodeId = NodeId(0);

    pub fn new() -> Self {
        Self {
            nodes: vec![NodeRecord {
                kind: NodeKind::Document,
                parent: None,
                children: Vec::new(),
            }],
            url: None,
            version: 0,
            journal: Vec::new(),
        }
    }

    /// Parse `markup` and append the result to the document node.
    pub fn parse(markup: &str) -> Self {
        let mut doc = Self::new();
        for node in crate::fragment::parse_fragment(&mut doc, markup) {
            // Fresh detached nodes under the root: cannot fail.
            let _ = doc.append_child(Self::ROOT, node);
        }
        doc.journal.clear();
        doc
    }

    pub fn root(&self) -> NodeId {
        Self::ROOT
    }

    pub fn url(&self) -> Option<&str> {
        self.url.as_deref()
    }

    pub fn set_url(&mut self, url: impl Into<String>) {
        self.url = Some(url.into());
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.len() <= 1
    }

    fn record(&self, id: NodeId) -> Option<&NodeRecord> {
        self.nodes.get(id.index())
    }

    fn live(&self, id: NodeId) -> Result<&NodeRecord, DomError> {
        self.record(id).ok_or(DomError::UnknownNode(id))
    }

    fn bump(&mut self) {
        self.version = self.version.wrapping_add(1);
    }

    // ----- construction -----

    pub fn create_element(&mut self, name: &str, attributes: &[(&str, &str)]) -> NodeId {
        let attributes = attributes
            .iter()
            .map(|(k, v)| (k.to_ascii_lowercase(), (*v).to_string()))
            .collect();
        self.push(NodeKind::Element {
            name: name.to_ascii_lowercase(),
            attributes,
        })
    }

    pub fn create_text(&mut self, text: &str) -> NodeId {
        self.push(NodeKind::Text {
            text: text.to_string(),
        })
    }

    pub(crate) fn push(&mut self, kind: NodeKind) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(NodeRecord {
            kind,
            parent: None,
            children: Vec::new(),
        });
        id
    }

    // ----- structure mutation -----

    fn check_insert(&self, parent: NodeId, child: NodeId) -> Result<(), DomError> {
        if child == Self::ROOT {
            return Err(DomError::RootImmutable);
        }
        let parent_rec = self.live(parent)?;
        let child_rec = self.live(child)?;
        if !parent_rec.kind.allows_children() {
            return Err(DomError::InvalidParent(parent));
        }
        if child_rec.parent.is_some() {
            return Err(DomError::AlreadyAttached(child));
        }
        if parent == child || self.contains(child, parent) {
            return Err(DomError::CycleDetected { parent, child });
        }
        Ok(())
    }

    pub fn append_child(&mut self, parent: NodeId, child: NodeId) -> Result<(), DomError> {
        self.check_insert(parent, child)?;
        self.nodes[parent.index()].children.push(child);
        self.nodes[child.index()].parent = Some(parent);
        self.journal.push(Mutation::ChildInserted { parent, child });
        self.bump();
        Ok(())
    }

    pub fn insert_before(
        &mut self,
        parent: NodeId,
        child: NodeId,
        before: NodeId,
    ) -> Result<(), DomError> {
        self.check_insert(parent, child)?;
        let pos = self.nodes[parent.index()]
            .children
            .iter()
            .position(|c| *c == before)
            .ok_or(DomError::InvalidSibling { parent, before })?;
        self.nodes[parent.index()].children.insert(pos, child);
        self.nodes[child.index()].parent = Some(parent);
        self.journal.push(Mutation::ChildInserted { parent, child });
        self.bump();
        Ok(())
    }

    /// Detach `node` (and its subtree) from its parent. The subtree stays in
    /// the arena and may be re-inserted.
    pub fn remove(&mut self, node: NodeId) -> Result<(), DomError> {
        if node == Self::ROOT {
            return Err(DomError::RootImmutable);
        }
        let Some(parent) = self.live(node)?.parent else {
            return Ok(());
        };
        self.nodes[parent.index()].children.retain(|c| *c != node);
        self.nodes[node.index()].parent = None;
        self.bump();
        Ok(())
    }

    /// Drain structural changes recorded since the last call.
    pub fn take_mutations(&mut self) -> Vec<Mutation> {
        std::mem::take(&mut self.journal)
    }

    pub(crate) fn journal_len(&self) -> usize {
        self.journal.len()
    }

    pub(crate) fn truncate_journal(&mut self, len: usize) {
        self.journal.truncate(len);
    }

    pub fn has_pending_mutations(&self) -> bool {
        !self.journal.is_empty()
    }

    // ----- node queries -----

    pub fn kind(&self, id: NodeId) -> Option<&NodeKind> {
        self.record(id).map(|r| &r.kind)
    }

    pub fn is_element(&self, id: NodeId) -> bool {
        matches!(self.kind(id), Some(NodeKind::Element { .. }))
    }

    /// Lowercase tag name of an element.
    pub fn name(&self, id: NodeId) -> Option<&str> {
        match self.kind(id)? {
            NodeKind::Element { name, .. } => Some(name),
            _ => None,
        }
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.record(id).and_then(|r| r.parent)
    }

    /// Parent when it is an element (the document node is excluded).
    pub fn parent_element(&self, id: NodeId) -> Option<NodeId> {
        self.parent(id).filter(|p| self.is_element(*p))
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.record(id).map(|r| r.children.as_slice()).unwrap_or(&[])
    }

    pub fn element_children(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        self.children(id)
            .iter()
            .copied()
            .filter(|c| self.is_element(*c))
    }

    pub fn previous_element_sibling(&self, id: NodeId) -> Option<NodeId> {
        let parent = self.parent(id)?;
        let siblings = self.children(parent);
        let pos = siblings.iter().position(|c| *c == id)?;
        siblings[..pos]
            .iter()
            .rev()
            .copied()
            .find(|c| self.is_element(*c))
    }

    /// Ancestors of `id`, nearest first, excluding `id` itself.
    pub fn ancestors(&self, id: NodeId) -> Ancestors<'_> {
        Ancestors::new(self, self.parent(id))
    }

    /// Descendants of `id` in document order, excluding `id` itself.
    pub fn descendants(&self, id: NodeId) -> Descendants<'_> {
        Descendants::new(self, id)
    }

    /// `true` when `node` is `ancestor` or lies in its subtree.
    pub fn contains(&self, ancestor: NodeId, node: NodeId) -> bool {
        node == ancestor || self.ancestors(node).any(|a| a == ancestor)
    }

    pub fn is_connected(&self, id: NodeId) -> bool {
        self.record(id).is_some() && self.contains(Self::ROOT, id)
    }

    /// Number of ancestors between `id` and the top of its tree.
    pub fn depth(&self, id: NodeId) -> usize {
        self.ancestors(id).count()
    }

    pub fn body(&self) -> Option<NodeId> {
        std::iter::once(Self::ROOT)
            .chain(self.descendants(Self::ROOT))
            .find(|n| self.name(*n) == Some("body"))
    }

    // ----- attributes -----

    pub fn attributes(&self, id: NodeId) -> &[(String, String)] {
        match self.kind(id) {
            Some(NodeKind::Element { attributes, .. }) => attributes,
            _ => &[],
        }
    }

    pub fn attr(&self, id: NodeId, name: &str) -> Option<&str> {
        self.attributes(id)
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    pub fn set_attr(&mut self, id: NodeId, name: &str, value: &str) -> Result<(), DomError> {
        let Some(NodeRecord {
            kind: NodeKind::Element { attributes, .. },
            ..
        }) = self.nodes.get_mut(id.index())
        else {
            return Err(DomError::UnknownNode(id));
        };
        match attributes
            .iter_mut()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
        {
            Some((_, v)) => *v = value.to_string(),
            None => attributes.push((name.to_ascii_lowercase(), value.to_string())),
        }
        self.bump();
        Ok(())
    }

    // ----- class list -----

    pub fn classes(&self, id: NodeId) -> impl Iterator<Item = &str> + '_ {
        self.attr(id, "class").unwrap_or("").split_ascii_whitespace()
    }

    pub fn has_class(&self, id: NodeId, class: &str) -> bool {
        self.classes(id).any(|c| c == class)
    }

    /// Add or remove `class` so that its presence equals `force`.
    /// Returns `true` when the class list changed.
    pub fn toggle_class(&mut self, id: NodeId, class: &str, force: bool) -> bool {
        if !self.is_element(id) || self.has_class(id, class) == force {
            return false;
        }
        let mut list: Vec<String> = self.classes(id).map(str::to_string).collect();
        if force {
            list.push(class.to_string());
        } else {
            list.retain(|c| c != class);
        }
        let joined = list.join(" ");
        self.set_attr(id, "class", &joined).is_ok()
    }

    pub fn add_class(&mut self, id: NodeId, class: &str) -> bool {
        self.toggle_class(id, class, true)
    }

    pub fn remove_class(&mut self, id: NodeId, class: &str) -> bool {
        self.toggle_class(id, class, false)
    }

    // ----- text -----

    /// Concatenated text of all descendant text nodes.
    pub fn text_content(&self, id: NodeId) -> String {
        let mut out = String::new();
        if let Some(NodeKind::Text { text }) = self.kind(id) {
            out.push_str(text);
            return out;
        }
        for n in self.descendants(id) {
            if let Some(NodeKind::Text { text }) = self.kind(n) {
                out.push_str(text);
            }
        }
        out
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}
