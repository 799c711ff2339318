use crate::comment::Comment;
use crate::location::{parse_leading_int, pathname, profile_from_path};
use crate::post::Post;
use crate::registry::{FilterPayload, ThingId, ThingRecord, Things};
use crate::selectors::{
    ANCHOR, AUTHOR, DOWNVOTE, EDITED_TIME, SCORE, TAGLINE, TAGLINE_TIME, TIME, UPVOTE, USERATTRS,
    USER_FLAIR,
};
use chrono::{DateTime, FixedOffset};
use core_types::{Direction, ThingKind};
use html::{Document, NodeId};

const FILTERS_DISABLED_CLASS: &str = "res-filters-disabled";
const FILTERED_CLASS: &str = "RESFiltered";

/// Page-wide switch: while the body carries `res-filters-disabled`, nothing
/// counts as filtered.
pub fn filters_disabled(doc: &Document) -> bool {
    doc.body()
        .is_some_and(|body| doc.has_class(body, FILTERS_DISABLED_CLASS))
}

/// Visibility queries shared by every kind of thing.
pub trait Visibility {
    fn is_filtered(&self) -> bool;

    fn is_visible(&self) -> bool {
        !self.is_filtered()
    }

    /// Whether the thing's own content is shown, as opposed to a stub kept
    /// for navigation.
    fn is_content_visible(&self) -> bool {
        self.is_visible()
    }
}

/// Borrowed view of one wrapped element.
#[derive(Clone, Copy)]
pub struct Thing<'a> {
    pub(crate) doc: &'a Document,
    pub(crate) things: &'a Things,
    id: ThingId,
    rec: &'a ThingRecord,
}

impl<'a> Thing<'a> {
    pub(crate) fn new(
        doc: &'a Document,
        things: &'a Things,
        id: ThingId,
        rec: &'a ThingRecord,
    ) -> Self {
        Self {
            doc,
            things,
            id,
            rec,
        }
    }

    pub(crate) fn record(&self) -> &'a ThingRecord {
        self.rec
    }

    pub(crate) fn sibling(&self, id: ThingId) -> Option<Thing<'a>> {
        self.things.get(self.doc, id)
    }

    pub fn id(&self) -> ThingId {
        self.id
    }

    pub fn element(&self) -> NodeId {
        self.rec.element
    }

    /// Content root; differs from the element for compact search rows.
    pub fn entry(&self) -> NodeId {
        self.rec.entry
    }

    pub fn kind(&self) -> ThingKind {
        self.rec.kind
    }

    pub fn document(&self) -> &'a Document {
        self.doc
    }

    pub fn filter(&self) -> Option<&'a FilterPayload> {
        self.rec.filter.as_ref()
    }

    pub fn as_post(self) -> Option<Post<'a>> {
        (self.kind() == ThingKind::Post).then_some(Post(self))
    }

    pub fn as_comment(self) -> Option<Comment<'a>> {
        (self.kind() == ThingKind::Comment).then_some(Comment(self))
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.doc.has_class(self.element(), class)
    }

    fn entry_query(&self, selector: &css::Selector) -> Option<NodeId> {
        css::query_selector(self.doc, self.entry(), selector)
    }

    pub(crate) fn element_query(&self, selector: &css::Selector) -> Option<NodeId> {
        css::query_selector(self.doc, self.element(), selector)
    }

    /// Filter marker present, and filters not switched off page-wide.
    /// Ignores the comment exceptions.
    pub(crate) fn is_marked_filtered(&self) -> bool {
        !filters_disabled(self.doc) && self.has_class(FILTERED_CLASS)
    }

    pub fn is_selected(&self) -> bool {
        self.has_class("res-selected")
    }

    pub fn is_deleted(&self) -> bool {
        self.has_class("deleted")
    }

    pub fn is_upvoted(&self) -> bool {
        self.doc.has_class(self.entry(), "likes")
    }

    pub fn is_downvoted(&self) -> bool {
        self.doc.has_class(self.entry(), "dislikes")
    }

    pub fn is_unvoted(&self) -> bool {
        self.doc.has_class(self.entry(), "unvoted")
    }

    pub fn score_element(&self) -> Option<NodeId> {
        match self.as_post() {
            Some(post) => post.score_element(),
            None => self.entry_query(&SCORE),
        }
    }

    pub fn all_score_elements(&self) -> Vec<NodeId> {
        match self.as_post() {
            Some(post) => post.all_score_elements(),
            None => css::query_selector_all(self.doc, self.entry(), &SCORE),
        }
    }

    /// Displayed score; the `title` attribute holds the exact value when
    /// the text is abbreviated. `0` when missing or unparsable.
    pub fn score(&self) -> i64 {
        self.score_element()
            .and_then(|el| {
                let text = self
                    .doc
                    .attr(el, "title")
                    .filter(|t| !t.is_empty())
                    .map(str::to_string)
                    .unwrap_or_else(|| self.doc.text_content(el));
                parse_leading_int(&text)
            })
            .unwrap_or(0)
    }

    pub fn author_element(&self) -> Option<NodeId> {
        self.entry_query(&AUTHOR)
    }

    pub fn author(&self) -> Option<String> {
        if let Some(author) = self.doc.attr(self.element(), "data-author") {
            return Some(author.to_string());
        }
        let href = self.doc.attr(self.author_element()?, "href")?;
        profile_from_path(&pathname(self.doc, href))
    }

    pub fn author_url(&self) -> Option<String> {
        self.author().map(|a| format!("/user/{a}/"))
    }

    pub fn user_flair_text(&self) -> Option<String> {
        self.entry_query(&USER_FLAIR)
            .map(|el| html::dom_utils::normalized_text(self.doc, el))
    }

    pub fn timestamp(&self) -> Option<DateTime<FixedOffset>> {
        let time = self.entry_query(&TIME)?;
        DateTime::parse_from_rfc3339(self.doc.attr(time, "datetime")?).ok()
    }

    /// Unix seconds of the edit marker, `0` when the thing was never edited.
    pub fn post_edit_timestamp(&self) -> i64 {
        self.entry_query(&EDITED_TIME)
            .and_then(|el| self.doc.attr(el, "datetime"))
            .and_then(|dt| DateTime::parse_from_rfc3339(dt).ok())
            .map_or(0, |dt| dt.timestamp())
    }

    pub fn post_time(&self) -> Option<String> {
        self.entry_query(&TAGLINE_TIME)
            .map(|el| self.doc.text_content(el))
    }

    pub fn fullname(&self) -> Option<&'a str> {
        self.doc.attr(self.element(), "data-fullname")
    }

    pub fn tagline(&self) -> Option<NodeId> {
        self.entry_query(&TAGLINE)
    }

    pub fn userattrs(&self) -> Option<NodeId> {
        self.entry_query(&USERATTRS)
    }

    // The vote arrows sit just before the entry, sometimes behind an anchor.
    fn vote_container(&self) -> Option<NodeId> {
        let prev = self.doc.previous_element_sibling(self.entry())?;
        if css::matches(self.doc, prev, &ANCHOR) {
            self.doc.previous_element_sibling(prev)
        } else {
            Some(prev)
        }
    }

    pub fn upvote_button(&self) -> Option<NodeId> {
        css::query_selector(self.doc, self.vote_container()?, &UPVOTE)
    }

    pub fn downvote_button(&self) -> Option<NodeId> {
        css::query_selector(self.doc, self.vote_container()?, &DOWNVOTE)
    }

    /// Nearest visible thing of `kind` (any kind when `None`) after this one
    /// in `collection`, walking in `direction`.
    pub fn get_next(
        &self,
        direction: Direction,
        collection: &[ThingId],
        kind: Option<ThingKind>,
    ) -> Option<ThingId> {
        let pos = collection.iter().position(|id| *id == self.id)?;
        let candidates: Box<dyn Iterator<Item = &ThingId>> = match direction {
            Direction::Down => Box::new(collection[pos + 1..].iter()),
            Direction::Up => Box::new(collection[..pos].iter().rev()),
        };
        candidates
            .filter_map(|id| self.sibling(*id))
            .find(|t| kind.is_none_or(|k| t.kind() == k) && t.is_visible())
            .map(|t| t.id())
    }

    /// Self when visible (and wanted), else the nearest visible thing below,
    /// else above.
    pub fn get_closest_visible(&self, collection: &[ThingId], include_self: bool) -> Option<ThingId> {
        if include_self && self.is_visible() {
            return Some(self.id);
        }
        self.get_next(Direction::Down, collection, None)
            .or_else(|| self.get_next(Direction::Up, collection, None))
    }
}

impl Visibility for Thing<'_> {
    fn is_filtered(&self) -> bool {
        match self.as_comment() {
            Some(comment) => comment.is_filtered(),
            None => self.is_marked_filtered(),
        }
    }

    fn is_visible(&self) -> bool {
        match self.as_comment() {
            Some(comment) => comment.is_visible(),
            None => !self.is_marked_filtered(),
        }
    }

    fn is_content_visible(&self) -> bool {
        match self.as_comment() {
            Some(comment) => comment.is_content_visible(),
            None => !self.is_marked_filtered(),
        }
    }
}

impl std::fmt::Debug for Thing<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Thing")
            .field("id", &self.id)
            .field("kind", &self.kind())
            .field("element", &self.element())
            .finish()
    }
}
