use crate::location::first_integer;
use crate::registry::ThingId;
use crate::selectors::{COMMENT_SUBREDDIT_LINK, COMMENT_TOGGLE, NUM_CHILDREN, PERMALINK};
use crate::thing::{Thing, Visibility};
use html::NodeId;
use std::ops::Deref;

const VISIBLE_CHILD_CLASS: &str = "res-thing-has-visible-child";
const CHILDREN_HIDDEN_CLASS: &str = "res-children-hidden";

/// A reply in a comment tree. Parent and children are fixed when the
/// comment is first resolved.
#[derive(Clone, Copy, Debug)]
pub struct Comment<'a>(pub(crate) Thing<'a>);

impl<'a> Deref for Comment<'a> {
    type Target = Thing<'a>;

    fn deref(&self) -> &Thing<'a> {
        &self.0
    }
}

impl<'a> Comment<'a> {
    pub fn thing(&self) -> Thing<'a> {
        self.0
    }

    fn comment(&self, id: ThingId) -> Option<Comment<'a>> {
        self.sibling(id).and_then(Thing::as_comment)
    }

    pub fn parent(&self) -> Option<Comment<'a>> {
        self.comment(self.record().parent?)
    }

    pub fn parent_id(&self) -> Option<ThingId> {
        self.record().parent
    }

    pub fn children(&self) -> impl Iterator<Item = Comment<'a>> + use<'a> {
        let this = *self;
        self.record()
            .children
            .iter()
            .filter_map(move |id| this.comment(*id))
    }

    pub fn child_ids(&self) -> &'a [ThingId] {
        &self.record().children
    }

    /// `also_partially` keeps a filtered comment visible while one of its
    /// children is.
    pub fn is_filtered_with(&self, also_partially: bool) -> bool {
        self.is_marked_filtered() && !(also_partially && self.has_class(VISIBLE_CHILD_CLASS))
    }

    pub fn is_collapsed(&self) -> bool {
        self.has_class("collapsed")
    }

    /// Some ancestor comment hides its subtree: it is collapsed, hides its
    /// children, or is filtered with no visible child to keep it open.
    pub fn is_in_hidden(&self) -> bool {
        self.parent()
            .and_then(|p| {
                p.get_closest(|c| {
                    (c.is_collapsed() || c.has_class(CHILDREN_HIDDEN_CLASS) || c.is_filtered())
                        .then_some(())
                })
            })
            .is_some()
    }

    /// Whether this comment would be visible with its parent kept open: it
    /// is not filtered itself and the parent neither collapses nor hides its
    /// children. Ancestors above the parent are not consulted.
    pub(crate) fn holds_parent_open(&self) -> bool {
        let parent_hides = self
            .parent()
            .is_some_and(|p| p.is_collapsed() || p.has_class(CHILDREN_HIDDEN_CLASS));
        !parent_hides && !self.is_filtered()
    }

    /// First `Some` produced by `f` for self, then each parent in turn.
    pub fn get_closest<T>(&self, mut f: impl FnMut(&Comment<'a>) -> Option<T>) -> Option<T> {
        let mut current = Some(*self);
        while let Some(c) = current {
            if let Some(hit) = f(&c) {
                return Some(hit);
            }
            current = c.parent();
        }
        None
    }

    pub fn thread_top(&self) -> Comment<'a> {
        let mut top = *self;
        while let Some(parent) = top.parent() {
            top = parent;
        }
        top
    }

    /// Ancestor comments, nearest first.
    pub fn parents(&self) -> Vec<Comment<'a>> {
        std::iter::successors(self.parent(), Comment::parent).collect()
    }

    pub fn is_top_level(&self) -> bool {
        self.record().parent.is_none()
    }

    pub fn permalink(&self) -> Option<NodeId> {
        css::query_selector(self.doc, self.entry(), &PERMALINK)
    }

    pub fn subreddit_link(&self) -> Option<NodeId> {
        css::query_selector(self.doc, self.entry(), &COMMENT_SUBREDDIT_LINK)
    }

    pub fn number_of_children(&self) -> u64 {
        self.element_query(&NUM_CHILDREN)
            .and_then(|el| first_integer(&self.doc.text_content(el)))
            .unwrap_or(0)
    }

    pub fn toggle_element(&self) -> Option<NodeId> {
        css::query_selector(self.doc, self.entry(), &COMMENT_TOGGLE)
    }
}

impl Visibility for Comment<'_> {
    fn is_filtered(&self) -> bool {
        self.is_filtered_with(true)
    }

    fn is_visible(&self) -> bool {
        !(self.is_filtered() || self.is_in_hidden())
    }

    fn is_content_visible(&self) -> bool {
        !(self.is_filtered_with(false) || self.is_collapsed() || self.is_in_hidden())
    }
}

#[cfg(test)]
mod tests {
    use crate::{Things, Visibility};
    use html::Document;

    const THREAD: &str = r#"
<body><div class="commentarea"><div class="sitetable nestedlisting">
  <div class="thing comment" id=top>
    <div class="entry"><a class="bylink" href="/r/x/comments/1/t/top">permalink</a></div>
    <div class="child"><div class="sitetable">
      <div class="thing comment" id=mid>
        <div class="entry"></div>
        <div class="child"><div class="sitetable">
          <div class="thing comment" id=leaf><div class="entry"></div></div>
        </div></div>
      </div>
    </div></div>
  </div>
</div></div></body>"#;

    fn by_id(doc: &Document, id: &str) -> html::NodeId {
        doc.descendants(Document::ROOT)
            .find(|n| doc.attr(*n, "id") == Some(id))
            .unwrap()
    }

    #[test]
    fn resolving_a_leaf_builds_the_whole_chain() {
        let doc = Document::parse(THREAD);
        let mut things = Things::new();
        let leaf = things.resolve(&doc, by_id(&doc, "leaf")).unwrap();
        assert_eq!(things.len(), 3);
        let leaf = things.get(&doc, leaf).unwrap().as_comment().unwrap();
        let parents: Vec<_> = leaf.parents().iter().map(|c| c.element()).collect();
        assert_eq!(parents, [by_id(&doc, "mid"), by_id(&doc, "top")]);
        assert_eq!(leaf.thread_top().element(), by_id(&doc, "top"));
        assert!(leaf.thread_top().is_top_level());
        assert!(leaf.thread_top().permalink().is_some());
    }

    #[test]
    fn collapsed_ancestor_hides_descendants() {
        let mut doc = Document::parse(THREAD);
        let mut things = Things::new();
        let leaf = things.resolve(&doc, by_id(&doc, "leaf")).unwrap();
        doc.add_class(by_id(&doc, "top"), "collapsed");
        let leaf = things.get(&doc, leaf).unwrap().as_comment().unwrap();
        assert!(leaf.is_in_hidden());
        assert!(!leaf.is_visible());
        assert!(!leaf.is_content_visible());
    }
}
