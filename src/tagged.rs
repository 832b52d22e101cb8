use crate::level::Level;
use crate::logger::{Entry, Logger};
use crate::payload::Tags;

/// Thin facade over a [`Logger`] with a fixed set of bound tags.
///
/// Every call is forwarded to the parent with the bound tags merged in
/// under the call-site tags: bound tags come first in the payload, the
/// call site wins on key collision. Carries no state of its own.
pub struct TaggedLogger<'a> {
    parent: &'a Logger,
    tags: Tags,
}

macro_rules! forward_level_methods {
    ($($method:ident => $level:ident),* $(,)?) => {
        $(
            pub fn $method<'e>(&self, entry: impl Into<Entry<'e>>) {
                self.log(Level::$level, entry);
            }
        )*
    };
}

impl<'a> TaggedLogger<'a> {
    pub(crate) fn new(parent: &'a Logger, tags: Tags) -> Self {
        TaggedLogger { parent, tags }
    }

    forward_level_methods! {
        debug => Debug,
        info => Info,
        warn => Warn,
        error => Error,
        fatal => Fatal,
    }

    pub fn log<'e>(&self, level: Level, entry: impl Into<Entry<'e>>) {
        let mut entry = entry.into();
        entry.prepend_tags(&self.tags);
        self.parent.log(level, entry);
    }

    pub fn exception<E: std::error::Error>(&self, error: &E, message: Option<&str>, tags: Tags) {
        self.parent.exception(error, message, self.merged(tags));
    }

    pub fn group<R>(&self, tags: Tags, f: impl FnOnce() -> R) -> R {
        self.parent.group(self.merged(tags), f)
    }

    pub fn tagged<R>(&self, tags: Tags, f: impl FnOnce() -> R) -> R {
        self.parent.tagged(self.merged(tags), f)
    }

    pub fn add_group(&self, tags: Tags) -> String {
        self.parent.add_group(self.merged(tags))
    }

    pub fn pop_group(&self) {
        self.parent.pop_group()
    }

    pub fn silence(&self) {
        self.parent.silence()
    }

    pub fn unsilence(&self) {
        self.parent.unsilence()
    }

    pub fn silenced(&self) -> bool {
        self.parent.silenced()
    }

    pub fn silence_during<R>(&self, f: impl FnOnce() -> R) -> R {
        self.parent.silence_during(f)
    }

    pub fn unsilence_during<R>(&self, f: impl FnOnce() -> R) -> R {
        self.parent.unsilence_during(f)
    }

    /// A further tagged logger over the same parent, with this logger's
    /// tags merged under the new ones.
    pub fn create_tagged_logger(&self, tags: Tags) -> TaggedLogger<'a> {
        TaggedLogger::new(self.parent, self.merged(tags))
    }

    fn merged(&self, tags: Tags) -> Tags {
        let mut merged = self.tags.clone();
        merged.extend(tags);
        merged
    }
}
