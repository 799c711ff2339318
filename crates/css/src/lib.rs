pub mod query;
pub mod syntax;

// Re-exports so other crates can just use `css::...` nicely.
pub use query::{closest, matches, query_selector, query_selector_all};
pub use syntax::{AttrOp, Combinator, Complex, Compound, Selector, SelectorError, Simple};
