use crate::ThingId;
use html::NodeId;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ThingError {
    /// The node has no enclosing thing element.
    #[error("could not construct a thing from node {node:?}")]
    Construction { node: NodeId },
    /// The id belonged to a thing whose element left the document.
    #[error("thing {0:?} has been reclaimed")]
    Reclaimed(ThingId),
}
