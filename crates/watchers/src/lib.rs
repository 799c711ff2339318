//! Watchers: callbacks for things and containers as they become available.
//!
//! A [`Page`] owns the document, the [`things::Things`] registry and the
//! watcher tables. Announcing a container runs a dispatch pass: immediate
//! callbacks run during the pass, the rest are queued in per-row groups that
//! [`Page::run_turn`] drains a few at a time.

mod callback;
mod dispatch;
mod integration;
mod mutation;
mod page;
mod registry;
mod scheduler;

pub use callback::{CallbackError, CallbackResult, ElementCallback, ThingCallback};
pub use dispatch::{GroupOrder, PassSummary, viewport_key, watch_kind};
pub use integration::{init_observers, new_sitetable};
pub use page::{DispatchConfig, Page};
pub use registry::{WatcherOptions, WatcherRegistry};
pub use scheduler::{Scheduler, Task};

pub use core_types::{ContainerKind, WatchKind};
