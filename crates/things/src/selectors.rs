//! Built-in selectors, parsed once on first use.

use css::Selector;
use once_cell::sync::Lazy;

macro_rules! selectors {
    ($($(#[$meta:meta])* $name:ident = $src:expr;)*) => {
        $(
            $(#[$meta])*
            pub static $name: Lazy<Selector> = Lazy::new(|| {
                Selector::parse($src).expect(concat!("built-in selector must parse: ", $src))
            });
        )*

        #[cfg(test)]
        pub(crate) fn all() -> Vec<&'static Selector> {
            vec![$(&*$name),*]
        }
    };
}

selectors! {
    /// Any element that wraps a thing.
    THING = ".thing, .search-result-link, .Post, .Comment";
    /// Things that belong to a page listing.
    BODY_THING = ".listing .thing, .linklisting .thing, .nestedlisting .thing, .search-result-link, .Post, .Comment";
    ENTRY = ".entry, .search-result-link > :not(.thumbnail)";
    SITETABLE = ".sitetable";
    SEARCH_LISTING = ".search-result-listing";

    SCORE = ".tagline > .score";
    POST_ACTIVE_SCORE = ".midcol.unvoted > .score.unvoted, .midcol.likes > .score.likes, .midcol.dislikes > .score.dislikes, .search-score";
    POST_ALL_SCORES = ".midcol > .score, .search-score";
    AUTHOR = ".tagline a.author, .search-author .author";
    USER_FLAIR = ".tagline > .flair";
    UPVOTE = "div.up, div.upmod";
    DOWNVOTE = "div.down, div.downmod";
    TIME = "time";
    EDITED_TIME = "time.edited-timestamp";
    TAGLINE_TIME = ".tagline time";
    TAGLINE = ".tagline";
    USERATTRS = ".userattrs";

    ANCHOR = "a";
    TITLE_LINK = "a.title, a.search-title";
    TITLE_ANY = ".title";
    POST_LINK = "a.title, a.search-link";
    COMMENTS_LINK = "a.comments, a.search-comments";
    POST_SUBREDDIT_LINK = ".tagline a.subreddit, a.search-subreddit-link";
    DOMAIN_LINK = ".domain a";
    DOMAIN = ".domain";
    COMMENT_COUNT = ".buttons .comments";
    THUMBNAIL_IMG = ".thumbnail img";
    POST_FLAIR = ".title > .linkflairlabel";
    CROSSPOST_BADGE = ".crosspost-badge";
    RANK = ".rank";
    NSFW_STAMP = ".nsfw-stamp";
    SPOILER_STAMP = ".spoiler-stamp";

    PERMALINK = "a.bylink";
    COMMENT_SUBREDDIT_LINK = ".parent a.subreddit, .tagline .subreddit a";
    NUM_CHILDREN = ".numchildren";
    COMMENT_TOGGLE = ".expand";
}
