//! Structured logger with scoped tag groups, pluggable destinations
//! and colorized formatters.
//!
//! ```
//! use klogger::{tags, FormatterKind, Logger};
//!
//! let logger = Logger::builder()
//!     .name("example")
//!     .formatter(FormatterKind::Go)
//!     .build();
//!
//! logger.info(("Hello, world!", tags! { name: "adam" }));
//!
//! // Scoped ambient context: the tags apply to every log call inside
//! // the block, on this thread only.
//! logger.group(tags! { request_id: "abc123" }, || {
//!     logger.info("processing");
//! });
//! ```

pub mod destination;
pub mod format;
pub mod group;
pub mod level;
pub mod logger;
pub mod payload;
pub mod tagged;

mod colors;
mod highlight;

pub use destination::{Destination, NoopDestination};
pub use format::{FormatterKind, UnknownFormatter};
pub use group::{Group, GroupStack};
pub use level::Level;
pub use logger::{Builder, Entry, Logger};
pub use payload::{Payload, Tags};
pub use tagged::TaggedLogger;

// Used by the `tags!` macro.
#[doc(hidden)]
pub use serde_json;

use std::sync::{Arc, OnceLock};

static GLOBAL_GROUPS: OnceLock<Arc<GroupStack>> = OnceLock::new();

/// The process-wide group stack shared by every logger.
///
/// Storage is still per-thread: a group pushed here is visible to all
/// loggers on the pushing thread and to none on any other thread. This
/// is the mechanism for cross-cutting context (a request id, say)
/// without threading it through every call site.
pub fn global_groups() -> &'static Arc<GroupStack> {
    GLOBAL_GROUPS.get_or_init(|| Arc::new(GroupStack::new()))
}

/// Run `f` with `tags` pushed as a global group; every logger on this
/// thread sees them for the duration.
pub fn group<R>(tags: Tags, f: impl FnOnce() -> R) -> R {
    global_groups().call(tags, f)
}

/// Like [`group`] but anonymous: no id is generated and nothing is
/// added to any group-id trail.
pub fn tagged<R>(tags: Tags, f: impl FnOnce() -> R) -> R {
    global_groups().call_anonymous(tags, f)
}
