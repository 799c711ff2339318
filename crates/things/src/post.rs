use crate::location::{current_subreddit, first_integer, pathname, resolve_href, subreddit_from_path};
use crate::selectors::{
    ANCHOR, COMMENTS_LINK, COMMENT_COUNT, CROSSPOST_BADGE, DOMAIN, DOMAIN_LINK, NSFW_STAMP,
    POST_ACTIVE_SCORE, POST_ALL_SCORES, POST_FLAIR, POST_LINK, POST_SUBREDDIT_LINK, RANK,
    SPOILER_STAMP, THUMBNAIL_IMG, TITLE_ANY, TITLE_LINK,
};
use crate::thing::Thing;
use html::NodeId;
use std::ops::Deref;

/// A submission row, in a listing or on a search results page.
#[derive(Clone, Copy, Debug)]
pub struct Post<'a>(pub(crate) Thing<'a>);

impl<'a> Deref for Post<'a> {
    type Target = Thing<'a>;

    fn deref(&self) -> &Thing<'a> {
        &self.0
    }
}

impl<'a> Post<'a> {
    pub fn thing(&self) -> Thing<'a> {
        self.0
    }

    fn href(&self, node: Option<NodeId>) -> Option<String> {
        let href = self.doc.attr(node?, "href")?;
        Some(resolve_href(self.doc, href))
    }

    fn entry_query(&self, selector: &css::Selector) -> Option<NodeId> {
        css::query_selector(self.doc, self.entry(), selector)
    }

    fn text_of(&self, node: Option<NodeId>) -> Option<String> {
        node.map(|n| self.doc.text_content(n))
    }

    pub fn is_search_result(&self) -> bool {
        self.has_class("search-result-link")
    }

    pub fn score_element(&self) -> Option<NodeId> {
        self.element_query(&POST_ACTIVE_SCORE)
    }

    pub fn all_score_elements(&self) -> Vec<NodeId> {
        css::query_selector_all(self.doc, self.element(), &POST_ALL_SCORES)
    }

    pub fn is_self_post(&self) -> bool {
        if self.is_search_result() {
            self.element_query(&ANCHOR)
                .is_some_and(|a| self.doc.has_class(a, "self"))
        } else {
            self.has_class("self")
        }
    }

    pub fn is_link_post(&self) -> bool {
        !self.is_self_post()
    }

    pub fn title_element(&self) -> Option<NodeId> {
        self.entry_query(&TITLE_LINK)
            .or_else(|| self.entry_query(&TITLE_ANY))
    }

    pub fn title(&self) -> String {
        self.text_of(self.title_element()).unwrap_or_default()
    }

    pub fn title_url(&self) -> Option<String> {
        self.href(self.title_element())
    }

    pub fn post_url(&self) -> Option<String> {
        match self.doc.attr(self.element(), "data-url") {
            Some(url) => Some(resolve_href(self.doc, url)),
            None => self.href(self.entry_query(&POST_LINK)),
        }
    }

    pub fn comments_link(&self) -> Option<NodeId> {
        self.entry_query(&COMMENTS_LINK)
    }

    pub fn comments_url(&self) -> Option<String> {
        self.href(self.comments_link())
    }

    pub fn subreddit_link(&self) -> Option<NodeId> {
        self.entry_query(&POST_SUBREDDIT_LINK)
    }

    /// Subreddit the post was submitted to. Computed on first use and
    /// remembered for the lifetime of the thing.
    pub fn subreddit(&self) -> Option<&'a str> {
        let rec = self.record();
        rec.subreddit
            .get_or_init(|| {
                if let Some(data) = self.doc.attr(self.element(), "data-subreddit") {
                    return Some(data.to_string());
                }
                match self.subreddit_link() {
                    Some(link) => self
                        .doc
                        .attr(link, "href")
                        .and_then(|href| subreddit_from_path(&pathname(self.doc, href))),
                    None => current_subreddit(self.doc),
                }
            })
            .as_deref()
    }

    pub fn domain_link(&self) -> Option<NodeId> {
        self.element_query(&DOMAIN_LINK)
    }

    fn domain_text(&self) -> Option<String> {
        let text = self.doc.text_content(self.element_query(&DOMAIN)?);
        let cleaned: String = text
            .chars()
            .filter(|c| !matches!(c, '(' | ')') && !c.is_whitespace())
            .collect();
        (!cleaned.is_empty()).then_some(cleaned)
    }

    pub fn domain(&self) -> String {
        if let Some(data) = self.doc.attr(self.element(), "data-domain") {
            return data.to_string();
        }
        if let Some(link) = self.domain_link() {
            return self.doc.text_content(link);
        }
        if let Some(text) = self.domain_text() {
            return text;
        }
        match self.subreddit() {
            Some(sub) => format!("self.{sub}"),
            None => "reddit.com".to_string(),
        }
    }

    pub fn domain_url(&self) -> String {
        self.href(self.domain_link())
            .unwrap_or_else(|| format!("/domain/{}/", self.domain()))
    }

    /// Integer in the comments button, `0` without one.
    pub fn comment_count(&self) -> u64 {
        let Some(el) = self.element_query(&COMMENT_COUNT) else {
            return 0;
        };
        let text = self.doc.text_content(el);
        let text = if text.is_empty() {
            self.doc.attr(el, "data-text").unwrap_or_default().to_string()
        } else {
            text
        };
        first_integer(&text).unwrap_or(0)
    }

    pub fn thumbnail_url(&self) -> Option<String> {
        self.element_query(&THUMBNAIL_IMG)
            .and_then(|img| self.doc.attr(img, "src"))
            .filter(|src| !src.is_empty())
            .map(|src| resolve_href(self.doc, src))
    }

    pub fn flair_text(&self) -> Option<String> {
        self.text_of(self.entry_query(&POST_FLAIR))
    }

    pub fn crosspost_badge(&self) -> Option<NodeId> {
        self.entry_query(&CROSSPOST_BADGE)
    }

    pub fn is_crosspost(&self) -> bool {
        self.crosspost_badge().is_some()
    }

    pub fn rank(&self) -> Option<i64> {
        self.doc
            .attr(self.element(), "data-rank")
            .and_then(|r| r.trim().parse().ok())
    }

    pub fn rank_element(&self) -> Option<NodeId> {
        self.element_query(&RANK)
    }

    fn on_search_page(&self) -> bool {
        self.has_class("search-result")
    }

    pub fn is_nsfw(&self) -> bool {
        if self.on_search_page() {
            self.entry_query(&NSFW_STAMP).is_some()
        } else {
            self.has_class("over18")
        }
    }

    pub fn is_spoiler(&self) -> bool {
        if self.on_search_page() {
            self.entry_query(&SPOILER_STAMP).is_some()
        } else {
            self.has_class("spoiler")
        }
    }

    pub fn is_locked(&self) -> bool {
        if self.on_search_page() {
            self.has_class("linkflair-locked")
        } else {
            self.has_class("locked")
        }
    }
}
