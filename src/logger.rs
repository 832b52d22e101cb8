use crate::destination::Destination;
use crate::format::FormatterKind;
use crate::group::{GroupStack, PerThread};
use crate::level::Level;
use crate::payload::{build_payload, Tags};
use crate::tagged::TaggedLogger;
use chrono::Utc;
use parking_lot::Mutex;
use serde_json::json;
use std::io::Write;
use std::sync::Arc;

/// One log call's worth of call-site data: an optional message, tags,
/// and an optional lazy block producing (part of) the message.
///
/// Usually built implicitly through the `From` conversions:
///
/// ```
/// use klogger::{tags, Entry, Logger};
///
/// let logger = Logger::builder().build();
/// logger.info("plain message");
/// logger.info(tags! { event: "boot" });
/// logger.info(("with tags", tags! { port: 8080 }));
/// logger.info(Entry::from("expensive").with_block(|| "details".to_string()));
/// ```
///
/// The block runs at most once, and only if the entry survives the
/// silence and severity gates.
#[derive(Default)]
pub struct Entry<'a> {
    message: Option<String>,
    tags: Tags,
    block: Option<Box<dyn FnOnce() -> String + 'a>>,
}

impl<'a> Entry<'a> {
    pub fn message(message: impl Into<String>) -> Self {
        Entry {
            message: Some(message.into()),
            ..Entry::default()
        }
    }

    pub fn data(tags: Tags) -> Self {
        Entry {
            tags,
            ..Entry::default()
        }
    }

    /// Entry whose message is computed by `block`, but only if the call
    /// survives the silence and severity gates.
    pub fn lazy(block: impl FnOnce() -> String + 'a) -> Self {
        Entry {
            block: Some(Box::new(block)),
            ..Entry::default()
        }
    }

    /// Append tags; an existing key keeps its position but takes the
    /// new value.
    pub fn with_tags(mut self, tags: Tags) -> Self {
        self.tags.extend(tags);
        self
    }

    pub fn with_block(mut self, block: impl FnOnce() -> String + 'a) -> Self {
        self.block = Some(Box::new(block));
        self
    }

    /// Resolve the final message: block-only entries use the block's
    /// result, message-plus-block entries join them as
    /// `"<message>: <result>"`.
    fn resolve_message(message: Option<String>, block: Option<Box<dyn FnOnce() -> String + 'a>>) -> Option<String> {
        match (message, block) {
            (Some(message), Some(block)) => Some(format!("{}: {}", message, block())),
            (None, Some(block)) => Some(block()),
            (message, None) => message,
        }
    }

    pub(crate) fn prepend_tags(&mut self, tags: &Tags) {
        let mut merged = tags.clone();
        merged.extend(std::mem::take(&mut self.tags));
        self.tags = merged;
    }
}

impl From<&str> for Entry<'_> {
    fn from(message: &str) -> Self {
        Entry::message(message)
    }
}

impl From<String> for Entry<'_> {
    fn from(message: String) -> Self {
        Entry::message(message)
    }
}

impl From<Tags> for Entry<'_> {
    fn from(tags: Tags) -> Self {
        Entry::data(tags)
    }
}

impl<M: Into<String>> From<(M, Tags)> for Entry<'_> {
    fn from((message, tags): (M, Tags)) -> Self {
        Entry {
            message: Some(message.into()),
            tags,
            block: None,
        }
    }
}

/// Configuration for a [`Logger`]; obtain one via [`Logger::builder`].
pub struct Builder {
    name: Option<String>,
    tags: Tags,
    level: Level,
    formatter: FormatterKind,
    highlight: bool,
    include_group_ids: bool,
    output: Option<Box<dyn Write + Send>>,
    global_groups: Option<Arc<GroupStack>>,
}

impl Default for Builder {
    fn default() -> Self {
        Builder {
            name: None,
            tags: Tags::new(),
            level: Level::Debug,
            formatter: FormatterKind::Json,
            highlight: false,
            include_group_ids: false,
            output: None,
            global_groups: None,
        }
    }
}

impl Builder {
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Instance-level tags, merged into every payload right after the
    /// logger name.
    pub fn tags(mut self, tags: Tags) -> Self {
        self.tags = tags;
        self
    }

    /// Minimum severity; entries below it are dropped before any work.
    pub fn level(mut self, level: Level) -> Self {
        self.level = level;
        self
    }

    pub fn formatter(mut self, formatter: FormatterKind) -> Self {
        self.formatter = formatter;
        self
    }

    pub fn highlight(mut self, highlight: bool) -> Self {
        self.highlight = highlight;
        self
    }

    /// Expose the active group-id trail as a comma-joined `groups`
    /// payload field.
    pub fn include_group_ids(mut self, include: bool) -> Self {
        self.include_group_ids = include;
        self
    }

    /// Output stream for formatted lines. Defaults to stdout.
    pub fn output(mut self, output: Box<dyn Write + Send>) -> Self {
        self.output = Some(output);
        self
    }

    /// Override the process-wide global group stack. Mainly useful in
    /// tests that need an isolated one.
    pub fn global_groups(mut self, stack: Arc<GroupStack>) -> Self {
        self.global_groups = Some(stack);
        self
    }

    pub fn build(self) -> Logger {
        Logger {
            name: self.name,
            tags: self.tags,
            level: self.level,
            formatter: self.formatter,
            highlight: self.highlight,
            include_group_ids: self.include_group_ids,
            output: Mutex::new(self.output.unwrap_or_else(|| Box::new(std::io::stdout()))),
            destinations: Mutex::new(Vec::new()),
            scoped_destinations: PerThread::new(),
            silence: PerThread::new(),
            groups: GroupStack::new(),
            global_groups: self
                .global_groups
                .unwrap_or_else(|| crate::global_groups().clone()),
        }
    }
}

/// Structured logger: merges ambient context (instance tags, global and
/// instance group stacks) with call-site data into one ordered payload,
/// dispatches it to registered destinations with failures isolated, and
/// writes the formatted line to the output stream.
///
/// Group scoping, silencing and scoped destinations are all per-thread:
/// one thread's scopes are invisible to every other thread sharing the
/// same logger.
pub struct Logger {
    name: Option<String>,
    tags: Tags,
    level: Level,
    formatter: FormatterKind,
    highlight: bool,
    include_group_ids: bool,
    output: Mutex<Box<dyn Write + Send>>,
    destinations: Mutex<Vec<Arc<dyn Destination>>>,
    scoped_destinations: PerThread<Vec<Arc<dyn Destination>>>,
    silence: PerThread<bool>,
    groups: GroupStack,
    global_groups: Arc<GroupStack>,
}

macro_rules! level_methods {
    ($($(#[$meta:meta])* $method:ident => $level:ident),* $(,)?) => {
        $(
            $(#[$meta])*
            pub fn $method<'a>(&self, entry: impl Into<Entry<'a>>) {
                self.add(Level::$level, entry.into());
            }
        )*
    };
}

impl Logger {
    pub fn builder() -> Builder {
        Builder::default()
    }

    /// Logger writing JSON to stdout under the given name.
    pub fn named(name: impl Into<String>) -> Logger {
        Logger::builder().name(name).build()
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn tags(&self) -> &Tags {
        &self.tags
    }

    level_methods! {
        debug => Debug,
        info => Info,
        warn => Warn,
        error => Error,
        fatal => Fatal,
    }

    /// Log at a dynamically chosen severity. [`Level::Unknown`] always
    /// passes the gate.
    pub fn log<'a>(&self, level: Level, entry: impl Into<Entry<'a>>) {
        self.add(level, entry.into());
    }

    /// Log an error value at `error` severity with `exception`,
    /// `exception_message` and `backtrace` (first four frames) fields.
    pub fn exception<E: std::error::Error>(&self, error: &E, message: Option<&str>, tags: Tags) {
        let mut data = Tags::new();
        if let Some(message) = message {
            data.insert("message".to_string(), json!(message));
        }
        data.insert(
            "exception".to_string(),
            json!(std::any::type_name::<E>()),
        );
        data.insert("exception_message".to_string(), json!(error.to_string()));
        data.insert("backtrace".to_string(), json!(short_backtrace()));
        data.extend(tags);
        self.add(Level::Error, Entry::data(data));
    }

    /// Run `f` with the given tags pushed onto this logger's group
    /// stack; the group pops on every exit path.
    pub fn group<R>(&self, tags: Tags, f: impl FnOnce() -> R) -> R {
        self.groups.call(tags, f)
    }

    /// Like [`group`](Self::group) but anonymous: the tags merge into
    /// payloads without ever appearing in the group-id trail.
    pub fn tagged<R>(&self, tags: Tags, f: impl FnOnce() -> R) -> R {
        self.groups.call_anonymous(tags, f)
    }

    /// Push a group without a scope and return its id. Pair with
    /// [`pop_group`](Self::pop_group).
    pub fn add_group(&self, tags: Tags) -> String {
        self.groups.add(tags)
    }

    pub fn pop_group(&self) {
        self.groups.pop()
    }

    /// Suppress all logging from the calling thread until
    /// [`unsilence`](Self::unsilence).
    pub fn silence(&self) {
        self.set_silenced(true);
    }

    pub fn unsilence(&self) {
        self.set_silenced(false);
    }

    fn set_silenced(&self, silenced: bool) {
        self.silence.set(silenced);
        // An unsilenced thread holds only the default state; drop its
        // slot so thread churn does not accumulate entries.
        self.silence.prune_current_if(|&silenced| !silenced);
    }

    pub fn silenced(&self) -> bool {
        self.silence.get()
    }

    /// Silence the calling thread for the duration of `f`, restoring
    /// the prior state afterwards (also on unwind). Nestable.
    pub fn silence_during<R>(&self, f: impl FnOnce() -> R) -> R {
        self.with_silence(true, f)
    }

    /// Temporarily lift silencing for the duration of `f`.
    pub fn unsilence_during<R>(&self, f: impl FnOnce() -> R) -> R {
        self.with_silence(false, f)
    }

    fn with_silence<R>(&self, silenced: bool, f: impl FnOnce() -> R) -> R {
        struct Restore<'a> {
            logger: &'a Logger,
            prior: bool,
        }
        impl Drop for Restore<'_> {
            fn drop(&mut self) {
                self.logger.set_silenced(self.prior);
            }
        }

        let prior = self.silence.get();
        self.set_silenced(silenced);
        let _guard = Restore {
            logger: self,
            prior,
        };
        f()
    }

    /// Register a persistent destination, called for every emitted
    /// payload until removed.
    pub fn add_destination(&self, destination: Arc<dyn Destination>) {
        self.destinations.lock().push(destination);
    }

    /// Remove a previously added destination (pointer identity).
    pub fn remove_destination(&self, destination: &Arc<dyn Destination>) {
        self.destinations
            .lock()
            .retain(|d| !Arc::ptr_eq(d, destination));
    }

    /// Route payloads emitted by the calling thread during `f` to
    /// `destination` as well; removal is guaranteed on every exit path
    /// and other threads are unaffected.
    pub fn with_destination<R>(
        &self,
        destination: Arc<dyn Destination>,
        f: impl FnOnce() -> R,
    ) -> R {
        struct Remove<'a>(&'a Logger);
        impl Drop for Remove<'_> {
            fn drop(&mut self) {
                self.0.scoped_destinations.with(|list| {
                    list.pop();
                });
                self.0.scoped_destinations.prune_current_if(Vec::is_empty);
            }
        }

        self.scoped_destinations.with(|list| list.push(destination));
        let _guard = Remove(self);
        f()
    }

    /// A [`TaggedLogger`] bound to this logger and the given tags.
    pub fn create_tagged_logger(&self, tags: Tags) -> TaggedLogger<'_> {
        TaggedLogger::new(self, tags)
    }

    fn add(&self, level: Level, entry: Entry<'_>) {
        if self.silenced() {
            return;
        }
        if level < self.level {
            return;
        }

        let Entry {
            message,
            tags,
            block,
        } = entry;
        let message = Entry::resolve_message(message, block);

        let global = self.global_groups.snapshot();
        let local = self.groups.snapshot();
        let (payload, group_ids) = build_payload(
            level,
            Utc::now(),
            self.name.as_deref(),
            &self.tags,
            message,
            tags,
            &global,
            &local,
            self.include_group_ids,
        );

        // Snapshot the destination lists before dispatch so a
        // destination that logs back into this logger cannot deadlock.
        let mut destinations: Vec<Arc<dyn Destination>> = self.destinations.lock().clone();
        destinations.extend(self.scoped_destinations.get());
        for destination in &destinations {
            if let Err(e) = destination.call(self, payload.clone(), &group_ids) {
                eprintln!("error while sending payload to destination: {e}");
            }
        }

        let line = self.formatter.render(&payload, self.highlight);
        let mut output = self.output.lock();
        if let Err(e) = output.write_all(line.as_bytes()) {
            eprintln!("error while writing log line: {e}");
        }
        let _ = output.flush();
    }
}

/// First four frames of a freshly captured backtrace, joined by
/// newlines. Frame lines are the `N: symbol` lines of the std
/// backtrace rendering; location lines are dropped.
fn short_backtrace() -> String {
    let captured = std::backtrace::Backtrace::force_capture().to_string();
    let frames: Vec<&str> = captured
        .lines()
        .filter(|line| is_frame_line(line))
        .take(4)
        .map(str::trim)
        .collect();
    frames.join("\n")
}

fn is_frame_line(line: &str) -> bool {
    let trimmed = line.trim_start();
    match trimmed.find(':') {
        Some(i) if i > 0 => trimmed[..i].bytes().all(|b| b.is_ascii_digit()),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::destination::NoopDestination;

    fn quiet_logger() -> Logger {
        Logger::builder().output(Box::new(std::io::sink())).build()
    }

    #[test]
    fn unsilencing_drops_the_thread_slot() {
        let logger = quiet_logger();
        logger.silence();
        assert!(logger.silenced());
        logger.unsilence();
        assert!(!logger.silenced());
        assert!(logger.silence.is_empty());
    }

    #[test]
    fn scoped_silencing_drops_the_thread_slot_on_exit() {
        let logger = quiet_logger();
        logger.silence_during(|| {
            assert!(logger.silenced());
        });
        assert!(logger.silence.is_empty());
    }

    #[test]
    fn scoped_destinations_drop_the_thread_slot_on_exit() {
        let logger = quiet_logger();
        logger.with_destination(Arc::new(NoopDestination), || {
            logger.info("dispatched and dropped");
        });
        assert!(logger.scoped_destinations.is_empty());
    }

    #[test]
    fn short_backtrace_keeps_at_most_four_frames() {
        let backtrace = short_backtrace();
        assert!(!backtrace.is_empty());
        assert!(backtrace.lines().count() <= 4);
        for line in backtrace.lines() {
            assert!(is_frame_line(line));
        }
    }

    #[test]
    fn frame_lines_are_recognized() {
        assert!(is_frame_line("   0: klogger::logger::short_backtrace"));
        assert!(is_frame_line("12: main"));
        assert!(!is_frame_line("             at src/logger.rs:1:1"));
        assert!(!is_frame_line(""));
    }
}
