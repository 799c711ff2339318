//! Filter cases: predicate definitions over things, and their evaluation.
//!
//! A [`CaseEngine`] holds the registered [`CaseDef`]s. An [`Expression`]
//! combines configured uses of them; evaluating it runs them cheapest tier
//! first, suspending at each asynchronous case until it settles.

mod builtin;
mod case;
mod engine;
mod error;
mod expression;

pub use builtin::{
    Collaborators, EXPANDO_TYPES, ExpandoInfo, ExpandoSource, Nothing, ReadComments, VisitedLinks,
    register_builtins,
};
pub use case::{AsyncEvaluate, CaseDef, CaseFuture, Evaluator, Field, SyncEvaluate};
pub use engine::{CaseEngine, Combine, Evaluation, PendingVerdict, Remaining, Verdict};
pub use error::CaseError;
pub use expression::{CaseUse, CaseUseSpec, Expression, ExpressionSpec};
