#![forbid(unsafe_code)]

//! Change feeds: explicit subscriptions to state owned by someone else.
//!
//! A [`ChangeFeed`] lives inside the owner of some shared state. Interested
//! parties call [`subscribe`](ChangeFeed::subscribe) when they mount and
//! [`unsubscribe`](ChangeFeed::unsubscribe) when they unmount. Every
//! [`publish`](ChangeFeed::publish) appends the change to each live
//! subscriber's queue; subscribers pull with [`drain`](ChangeFeed::drain)
//! from inside their own update step.
//!
//! Delivery is pull-based rather than callback-based so that the owner
//! never calls into a subscriber while holding `&mut self`.
//!
//! # Invariants
//!
//! 1. Each published change is delivered at most once to each subscriber.
//! 2. A subscriber only sees changes published after it subscribed.
//! 3. After `unsubscribe`, the id receives nothing and `drain` is empty.
//! 4. Ids are never reused within one feed.

use std::collections::{BTreeMap, VecDeque};

/// Identifier handed out by [`ChangeFeed::subscribe`].
///
/// Ids are unique for the lifetime of the feed that issued them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SubId(u64);

impl SubId {
    /// Raw numeric value (for logging).
    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }
}

/// Per-subscriber fan-out queue of changes.
#[derive(Debug, Clone)]
pub struct ChangeFeed<T> {
    next_id: u64,
    queues: BTreeMap<SubId, VecDeque<T>>,
}

impl<T> Default for ChangeFeed<T> {
    fn default() -> Self {
        Self {
            next_id: 1,
            queues: BTreeMap::new(),
        }
    }
}

impl<T: Clone> ChangeFeed<T> {
    /// Create a feed with no subscribers.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new subscriber.
    pub fn subscribe(&mut self) -> SubId {
        let id = SubId(self.next_id);
        self.next_id += 1;
        self.queues.insert(id, VecDeque::new());
        crate::debug!(sub_id = id.0, "change feed subscribe");
        id
    }

    /// Remove a subscriber. Returns `false` if the id was not live.
    pub fn unsubscribe(&mut self, id: SubId) -> bool {
        let removed = self.queues.remove(&id).is_some();
        crate::debug!(sub_id = id.0, removed, "change feed unsubscribe");
        removed
    }

    /// Whether `id` is currently subscribed.
    pub fn is_subscribed(&self, id: SubId) -> bool {
        self.queues.contains_key(&id)
    }

    /// Number of live subscribers.
    pub fn subscriber_count(&self) -> usize {
        self.queues.len()
    }

    /// Append `change` to every live subscriber's queue.
    ///
    /// Queues grow until drained. For latest-value state, use
    /// [`ChangeFeed::publish_latest`].
    pub fn publish(&mut self, change: T) {
        for queue in self.queues.values_mut() {
            queue.push_back(change.clone());
        }
    }

    /// Append `change` after dropping the queued entries it supersedes.
    ///
    /// With one `supersedes` predicate per change kind, each queue holds
    /// at most one pending entry per kind however long it goes undrained.
    pub fn publish_latest(&mut self, change: T, supersedes: impl Fn(&T) -> bool) {
        for queue in self.queues.values_mut() {
            queue.retain(|queued| !supersedes(queued));
            queue.push_back(change.clone());
        }
    }

    /// Take all pending changes for `id`, oldest first.
    ///
    /// Unknown ids get an empty vec.
    pub fn drain(&mut self, id: SubId) -> Vec<T> {
        match self.queues.get_mut(&id) {
            Some(queue) => queue.drain(..).collect(),
            None => Vec::new(),
        }
    }

    /// Number of changes waiting for `id`.
    pub fn pending(&self, id: SubId) -> usize {
        self.queues.get(&id).map_or(0, VecDeque::len)
    }
}
