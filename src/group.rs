use crate::payload::Tags;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::thread::{self, ThreadId};

/// One scoped tag set, pushed for the duration of a block.
///
/// `id` is `None` for anonymous groups: their tags still merge into
/// payloads but they never contribute to the group-id trail.
#[derive(Debug, Clone)]
pub struct Group {
    pub id: Option<String>,
    pub tags: Tags,
}

/// Mutable state keyed by the calling thread.
///
/// A single logical value that behaves as if physically partitioned per
/// thread: no thread ever observes another thread's slot. Used for the
/// group stacks, the silence flag and scoped destination lists.
///
/// Callers prune a slot once it returns to its default state, so
/// short-lived threads do not accumulate entries. A thread that exits
/// while still holding live state leaves its slot behind.
#[derive(Debug, Default)]
pub(crate) struct PerThread<T> {
    slots: Mutex<HashMap<ThreadId, T>>,
}

impl<T: Default> PerThread<T> {
    pub(crate) fn new() -> Self {
        PerThread {
            slots: Mutex::new(HashMap::new()),
        }
    }

    /// Run `f` with mutable access to the calling thread's slot,
    /// creating it on first use.
    pub(crate) fn with<R>(&self, f: impl FnOnce(&mut T) -> R) -> R {
        let mut slots = self.slots.lock();
        f(slots.entry(thread::current().id()).or_default())
    }
}

impl<T: Default + Clone> PerThread<T> {
    /// Clone of the calling thread's slot, or `T::default()` if the
    /// thread has never touched this value.
    pub(crate) fn get(&self) -> T {
        self.slots
            .lock()
            .get(&thread::current().id())
            .cloned()
            .unwrap_or_default()
    }

    pub(crate) fn set(&self, value: T) {
        self.slots.lock().insert(thread::current().id(), value);
    }
}

impl<T> PerThread<T> {
    /// Drop the calling thread's slot when `f` says it holds nothing
    /// worth keeping.
    pub(crate) fn prune_current_if(&self, f: impl FnOnce(&T) -> bool) {
        let mut slots = self.slots.lock();
        let id = thread::current().id();
        if slots.get(&id).map_or(false, |value| f(value)) {
            slots.remove(&id);
        }
    }

    #[cfg(test)]
    pub(crate) fn is_empty(&self) -> bool {
        self.slots.lock().is_empty()
    }
}

/// An ordered stack of [`Group`]s with per-thread storage.
///
/// One `GroupStack` is shared by everything that logs on it, but each
/// thread pushes onto and pops from its own private stack, so two
/// threads scoping groups concurrently never see each other's tags.
#[derive(Debug, Default)]
pub struct GroupStack {
    groups: PerThread<Vec<Group>>,
}

impl GroupStack {
    pub fn new() -> Self {
        GroupStack {
            groups: PerThread::new(),
        }
    }

    /// Push a group with a fresh random id and return the id.
    ///
    /// Ids are 4 random bytes, hex encoded. 32 bits of entropy is plenty
    /// for a dispatch-trace label; these are not secrets.
    pub fn add(&self, tags: Tags) -> String {
        let id = hex::encode(rand::random::<[u8; 4]>());
        self.groups.with(|stack| {
            stack.push(Group {
                id: Some(id.clone()),
                tags,
            })
        });
        id
    }

    /// Push a group with no id. Its tags merge into payloads like any
    /// other group's, but it is invisible to the group-id trail.
    pub fn add_anonymous(&self, tags: Tags) {
        self.groups.with(|stack| stack.push(Group { id: None, tags }));
    }

    /// Remove the calling thread's most recently pushed group.
    ///
    /// Popping an empty stack is a no-op; a logger must stay harmless
    /// under unbalanced calls.
    pub fn pop(&self) {
        self.groups.with(|stack| {
            stack.pop();
        });
        self.groups.prune_current_if(Vec::is_empty);
    }

    /// Push, run `f`, pop. The pop happens on every exit path, including
    /// panic unwinding.
    pub fn call<R>(&self, tags: Tags, f: impl FnOnce() -> R) -> R {
        self.add(tags);
        let _guard = PopGuard(self);
        f()
    }

    /// [`call`](Self::call) with an anonymous group.
    pub fn call_anonymous<R>(&self, tags: Tags, f: impl FnOnce() -> R) -> R {
        self.add_anonymous(tags);
        let _guard = PopGuard(self);
        f()
    }

    /// The calling thread's active groups, oldest pushed first.
    pub fn snapshot(&self) -> Vec<Group> {
        self.groups.get()
    }
}

struct PopGuard<'a>(&'a GroupStack);

impl Drop for PopGuard<'_> {
    fn drop(&mut self) {
        self.0.pop();
    }
}
