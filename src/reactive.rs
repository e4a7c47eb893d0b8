// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Minimal push-based dataflow: a state cell, a combine-latest join and a
//! shared view that multiplexes one computation across many observers.
//!
//! Everything is synchronous. Values are delivered on the caller's thread,
//! never while an internal lock is held, so observers may call back into
//! the graph (for example to change the selected month).

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard, Weak};

use chrono::{NaiveDateTime, TimeDelta};

use crate::clock::Clock;

/// Observer callback.
pub type Callback<T> = Box<dyn FnMut(&T) + Send>;

fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(|e| e.into_inner())
}

/// Guard for an attached observer. Dropping it detaches the observer.
#[must_use = "dropping a Subscription detaches the observer immediately"]
pub struct Subscription {
    cancel: Option<Box<dyn FnOnce() + Send>>,
}

impl Subscription {
    pub fn new(cancel: impl FnOnce() + Send + 'static) -> Self {
        Self {
            cancel: Some(Box::new(cancel)),
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(cancel) = self.cancel.take() {
            cancel();
        }
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription")
            .field("attached", &self.cancel.is_some())
            .finish()
    }
}

struct HubState<T> {
    next_id: u64,
    subscribers: Vec<(u64, Arc<Mutex<Callback<T>>>)>,
    delivering: bool,
    pending: VecDeque<T>,
}

/// Subscriber list with serialized fan-out. A value published while another
/// is being delivered is queued and delivered afterwards, in order.
pub struct Hub<T> {
    state: Arc<Mutex<HubState<T>>>,
}

impl<T: Clone + Send + 'static> Hub<T> {
    pub fn new() -> Self {
        Self {
            state: Arc::new(Mutex::new(HubState {
                next_id: 0,
                subscribers: Vec::new(),
                delivering: false,
                pending: VecDeque::new(),
            })),
        }
    }

    pub fn subscribe(&self, callback: Callback<T>) -> Subscription {
        self.subscribe_with_replay(callback, || None)
    }

    /// Registers `callback`, then hands it the value `replay` yields.
    ///
    /// `replay` runs under the hub lock and must not touch this hub. The
    /// callback is registered before the replay is delivered, so anything
    /// it publishes while handling the replay reaches it as well.
    pub fn subscribe_with_replay(
        &self,
        callback: Callback<T>,
        replay: impl FnOnce() -> Option<T>,
    ) -> Subscription {
        let target = Arc::new(Mutex::new(callback));
        let (id, initial, owns_delivery) = {
            let mut st = lock(&self.state);
            let id = st.next_id;
            st.next_id += 1;
            st.subscribers.push((id, Arc::clone(&target)));
            let initial = replay();
            // Inside an ongoing delivery the outer loop drains the queue.
            let owns = initial.is_some() && !st.delivering;
            if owns {
                st.delivering = true;
            }
            (id, initial, owns)
        };
        if let Some(value) = &initial {
            (*lock(&target))(value);
        }
        if owns_delivery {
            self.drain();
        }
        let weak: Weak<Mutex<HubState<T>>> = Arc::downgrade(&self.state);
        Subscription::new(move || {
            if let Some(state) = weak.upgrade() {
                lock(&state).subscribers.retain(|(sid, _)| *sid != id);
            }
        })
    }

    pub fn publish(&self, value: T) {
        {
            let mut st = lock(&self.state);
            if st.delivering {
                st.pending.push_back(value);
                return;
            }
            st.delivering = true;
        }
        self.deliver(&value);
        self.drain();
    }

    fn deliver(&self, value: &T) {
        let targets: Vec<Arc<Mutex<Callback<T>>>> = lock(&self.state)
            .subscribers
            .iter()
            .map(|(_, cb)| Arc::clone(cb))
            .collect();
        for target in targets {
            let mut cb = lock(&target);
            (*cb)(value);
        }
    }

    /// Delivers queued values in order, then releases the hub.
    fn drain(&self) {
        loop {
            let next = {
                let mut st = lock(&self.state);
                match st.pending.pop_front() {
                    Some(next) => next,
                    None => {
                        st.delivering = false;
                        return;
                    }
                }
            };
            self.deliver(&next);
        }
    }

    pub fn len(&self) -> usize {
        lock(&self.state).subscribers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<T: Clone + Send + 'static> Default for Hub<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// Single-writer mutable value. Subscribers receive the current value on
/// subscribe and every later change.
pub struct StateCell<T> {
    value: Mutex<T>,
    hub: Hub<T>,
}

impl<T: Clone + PartialEq + Send + 'static> StateCell<T> {
    pub fn new(initial: T) -> Self {
        Self {
            value: Mutex::new(initial),
            hub: Hub::new(),
        }
    }

    pub fn get(&self) -> T {
        lock(&self.value).clone()
    }

    /// Stores `value` and notifies subscribers. Returns `false` (and stays
    /// silent) when the value is unchanged.
    pub fn set(&self, value: T) -> bool {
        {
            let mut current = lock(&self.value);
            if *current == value {
                return false;
            }
            *current = value.clone();
        }
        self.hub.publish(value);
        true
    }

    pub fn subscribe(&self, callback: Callback<T>) -> Subscription {
        self.hub
            .subscribe_with_replay(callback, || Some(lock(&self.value).clone()))
    }
}

/// Calls `combine` with the latest value of each side once both have
/// emitted, and again whenever either side emits.
pub fn combine_latest<A, B, F>(
    subscribe_a: impl FnOnce(Callback<A>) -> Subscription,
    subscribe_b: impl FnOnce(Callback<B>) -> Subscription,
    combine: F,
) -> Vec<Subscription>
where
    A: Clone + Send + 'static,
    B: Clone + Send + 'static,
    F: Fn(&A, &B) + Send + Sync + 'static,
{
    let latest: Arc<Mutex<(Option<A>, Option<B>)>> = Arc::new(Mutex::new((None, None)));
    let combine = Arc::new(combine);

    let (slot, f) = (Arc::clone(&latest), Arc::clone(&combine));
    let sub_a = subscribe_a(Box::new(move |a: &A| {
        let pair = {
            let mut g = lock(&slot);
            g.0 = Some(a.clone());
            g.1.clone()
        };
        if let Some(b) = pair {
            f(a, &b);
        }
    }));

    let (slot, f) = (latest, combine);
    let sub_b = subscribe_b(Box::new(move |b: &B| {
        let pair = {
            let mut g = lock(&slot);
            g.1 = Some(b.clone());
            g.0.clone()
        };
        if let Some(a) = pair {
            f(&a, b);
        }
    }));

    vec![sub_a, sub_b]
}

struct ViewState<T> {
    observers: usize,
    active: bool,
    generation: u64,
    starts: u64,
    upstream: Vec<Subscription>,
    latest: Option<T>,
    idle_since: Option<NaiveDateTime>,
}

type Wiring<T> = Box<dyn Fn(Emitter<T>) -> Vec<Subscription> + Send + Sync>;

struct SharedInner<T> {
    name: &'static str,
    wiring: Wiring<T>,
    clock: Arc<dyn Clock>,
    grace: TimeDelta,
    hub: Hub<T>,
    state: Mutex<ViewState<T>>,
}

/// Handle the wiring uses to push freshly computed values into its view.
pub struct Emitter<T> {
    inner: Weak<SharedInner<T>>,
    generation: u64,
}

impl<T> Clone for Emitter<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Weak::clone(&self.inner),
            generation: self.generation,
        }
    }
}

impl<T: Clone + Send + 'static> Emitter<T> {
    pub fn emit(&self, value: T) {
        if let Some(inner) = self.inner.upgrade() {
            inner.accept(self.generation, value);
        }
    }
}

impl<T: Clone + Send + 'static> SharedInner<T> {
    fn idle_expired(&self, st: &ViewState<T>) -> bool {
        st.active
            && st.observers == 0
            && st
                .idle_since
                .is_some_and(|since| self.clock.now() - since >= self.grace)
    }

    fn teardown(&self, st: &mut ViewState<T>) -> Vec<Subscription> {
        tracing::debug!(view = self.name, "tearing down idle view");
        st.active = false;
        st.latest = None;
        st.idle_since = None;
        std::mem::take(&mut st.upstream)
    }

    fn accept(&self, generation: u64, value: T) {
        let stale = {
            let mut st = lock(&self.state);
            if !st.active || st.generation != generation {
                return;
            }
            if self.idle_expired(&st) {
                Some(self.teardown(&mut st))
            } else {
                st.latest = Some(value.clone());
                None
            }
        };
        match stale {
            Some(upstream) => drop(upstream),
            None => self.hub.publish(value),
        }
    }

    fn release(&self) {
        let stale = {
            let mut st = lock(&self.state);
            st.observers = st.observers.saturating_sub(1);
            if st.observers > 0 {
                Vec::new()
            } else if self.grace <= TimeDelta::zero() {
                self.teardown(&mut st)
            } else {
                st.idle_since = Some(self.clock.now());
                Vec::new()
            }
        };
        drop(stale);
    }
}

/// A derived value computed once and shared by every observer.
///
/// The first observer starts the computation; later observers receive the
/// cached latest value immediately. After the last observer leaves the view
/// stays warm for `grace`, then tears down. Teardown is noticed on the next
/// subscribe, the next upstream emission, or [`SharedView::sweep`]. A torn
/// down view restarts from scratch and never replays its old output.
pub struct SharedView<T> {
    inner: Arc<SharedInner<T>>,
}

impl<T> Clone for SharedView<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T: Clone + Send + 'static> SharedView<T> {
    pub fn new(
        name: &'static str,
        clock: Arc<dyn Clock>,
        grace: TimeDelta,
        wiring: impl Fn(Emitter<T>) -> Vec<Subscription> + Send + Sync + 'static,
    ) -> Self {
        Self {
            inner: Arc::new(SharedInner {
                name,
                wiring: Box::new(wiring),
                clock,
                grace,
                hub: Hub::new(),
                state: Mutex::new(ViewState {
                    observers: 0,
                    active: false,
                    generation: 0,
                    starts: 0,
                    upstream: Vec::new(),
                    latest: None,
                    idle_since: None,
                }),
            }),
        }
    }

    pub fn observe(&self, callback: Callback<T>) -> Subscription {
        let inner = &self.inner;
        let (stale, start) = {
            let mut st = lock(&inner.state);
            let stale = if inner.idle_expired(&st) {
                inner.teardown(&mut st)
            } else {
                Vec::new()
            };
            st.observers += 1;
            st.idle_since = None;
            let start = if st.active {
                None
            } else {
                st.active = true;
                st.generation += 1;
                st.starts += 1;
                Some(st.generation)
            };
            (stale, start)
        };
        drop(stale);

        if let Some(generation) = start {
            tracing::debug!(view = inner.name, generation, "starting view");
            let upstream = (inner.wiring)(Emitter {
                inner: Arc::downgrade(inner),
                generation,
            });
            let mut st = lock(&inner.state);
            if st.active && st.generation == generation {
                st.upstream = upstream;
            } else {
                drop(st);
                drop(upstream);
            }
        }

        let delivery = inner
            .hub
            .subscribe_with_replay(callback, || lock(&inner.state).latest.clone());
        let weak = Arc::downgrade(inner);
        Subscription::new(move || {
            drop(delivery);
            if let Some(inner) = weak.upgrade() {
                inner.release();
            }
        })
    }

    /// Subscribes just long enough to read the current value.
    pub fn snapshot(&self) -> Option<T> {
        let slot: Arc<Mutex<Option<T>>> = Arc::new(Mutex::new(None));
        let sink = Arc::clone(&slot);
        let sub = self.observe(Box::new(move |v: &T| {
            *lock(&sink) = Some(v.clone());
        }));
        drop(sub);
        lock(&slot).take()
    }

    /// Tears the view down if it has been idle past its grace period.
    pub fn sweep(&self) -> bool {
        let stale = {
            let mut st = lock(&self.inner.state);
            if !self.inner.idle_expired(&st) {
                return false;
            }
            self.inner.teardown(&mut st)
        };
        drop(stale);
        true
    }

    pub fn is_active(&self) -> bool {
        lock(&self.inner.state).active
    }

    pub fn observer_count(&self) -> usize {
        lock(&self.inner.state).observers
    }

    /// How many times the upstream computation has been (re)started.
    pub fn starts(&self) -> u64 {
        lock(&self.inner.state).starts
    }
}
