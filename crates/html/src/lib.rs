//! Arena-backed document tree standing in for the host page.
//!
//! Nodes live in a single `Vec` and are addressed by [`NodeId`]. Detaching a
//! node never frees its slot, so ids stay valid (but disconnected) for the
//! lifetime of the [`Document`].

pub mod dom_utils;
pub mod traverse;

mod document;
mod fragment;
mod types;

pub use crate::document::{DomError, Document, Mutation};
pub use crate::fragment::parse_fragment;
pub use crate::types::{NodeId, NodeKind};
