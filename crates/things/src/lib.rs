//! Typed, identity-unique wrappers ("things") over listing elements.
//!
//! A [`Things`] registry owns one record per wrapped element. Records are
//! addressed by [`ThingId`] and read through borrowed views: [`Thing`] for
//! every kind, plus [`Post`] and [`Comment`] for the specialised queries.
//!
//! ```ignore
//! let id = things.resolve(&doc, node).ok_or(..)?;
//! let post = things.get(&doc, id).and_then(Thing::as_post);
//! ```

mod comment;
mod error;
mod location;
mod post;
mod registry;
pub mod selectors;
mod thing;

pub use comment::Comment;
pub use error::ThingError;
pub use location::{current_subreddit, is_comments_page, resolve_href};
pub use post::Post;
pub use registry::{
    FilterPayload, Target, ThingId, Things, is_comment, is_message, is_post, is_subreddit,
};
pub use thing::{Thing, Visibility, filters_disabled};

pub use core_types::{Direction, ThingKind};
