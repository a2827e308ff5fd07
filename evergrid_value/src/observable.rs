// Copyright 2025 the Evergrid Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Owned observable values and read-only handles.

use alloc::boxed::Box;
use alloc::rc::Rc;
use alloc::vec::Vec;
use core::cell::RefCell;
use core::fmt;
use core::marker::PhantomData;

type Listener<T> = Box<dyn FnMut(&T)>;

struct Shared<T> {
    value: T,
    version: u64,
    listeners: Vec<(u64, Listener<T>)>,
    next_listener: u64,
    notifying: bool,
    removed_while_notifying: Vec<u64>,
}

/// Token returned from [`Observable::subscribe`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Subscription(u64);

/// The single owner of a shared value.
///
/// Only the owner can write. Consumers hold [`ValueHandle`]s, which can read the
/// current value and its version but never mutate it. Listeners registered with
/// [`Observable::subscribe`] run after each write, once the new value is committed,
/// so they are free to read any handle of the same value.
///
/// `Observable` is intentionally not `Clone`: pass [`Observable::handle`] to
/// anything that only needs to read.
///
/// ```rust
/// use evergrid_value::Observable;
///
/// let mut size = Observable::new(300.0_f64);
/// let handle = size.handle();
/// let v0 = handle.version();
///
/// size.set(420.0);
/// assert_eq!(handle.get(), 420.0);
/// assert!(handle.version() > v0);
/// ```
pub struct Observable<T> {
    shared: Rc<RefCell<Shared<T>>>,
}

impl<T: Clone + 'static> Observable<T> {
    /// Creates a new observable holding `value`.
    pub fn new(value: T) -> Self {
        Self {
            shared: Rc::new(RefCell::new(Shared {
                value,
                version: 0,
                listeners: Vec::new(),
                next_listener: 0,
                notifying: false,
                removed_while_notifying: Vec::new(),
            })),
        }
    }

    /// Returns a clone of the current value.
    #[must_use]
    pub fn get(&self) -> T {
        self.shared.borrow().value.clone()
    }

    /// Returns the current version. Every write bumps it by one.
    #[must_use]
    pub fn version(&self) -> u64 {
        self.shared.borrow().version
    }

    /// Replaces the value and notifies listeners.
    pub fn set(&mut self, value: T) {
        self.shared.borrow_mut().value = value;
        self.commit();
    }

    /// Mutates the value in place and notifies listeners.
    pub fn update(&mut self, f: impl FnOnce(&mut T)) {
        f(&mut self.shared.borrow_mut().value);
        self.commit();
    }

    /// Returns a read-only handle to this value.
    #[must_use]
    pub fn handle(&self) -> ValueHandle<T> {
        ValueHandle {
            repr: Repr::Shared(self.shared.clone()),
        }
    }

    /// Registers a listener that runs after every write.
    pub fn subscribe(&self, listener: impl FnMut(&T) + 'static) -> Subscription {
        let mut shared = self.shared.borrow_mut();
        let id = shared.next_listener;
        shared.next_listener += 1;
        shared.listeners.push((id, Box::new(listener)));
        Subscription(id)
    }

    /// Removes a listener. Returns `false` if it was not registered.
    pub fn unsubscribe(&self, subscription: Subscription) -> bool {
        let mut shared = self.shared.borrow_mut();
        let before = shared.listeners.len();
        shared.listeners.retain(|(id, _)| *id != subscription.0);
        if shared.notifying {
            // The listener list is detached while notifying; remember the removal.
            shared.removed_while_notifying.push(subscription.0);
            return subscription.0 < shared.next_listener;
        }
        shared.listeners.len() != before
    }

    /// Number of registered listeners.
    #[must_use]
    pub fn listener_count(&self) -> usize {
        self.shared.borrow().listeners.len()
    }

    fn commit(&mut self) {
        let (snapshot, mut listeners) = {
            let mut shared = self.shared.borrow_mut();
            shared.version = shared.version.wrapping_add(1);
            shared.notifying = true;
            (
                shared.value.clone(),
                core::mem::take(&mut shared.listeners),
            )
        };

        for (_, listener) in &mut listeners {
            listener(&snapshot);
        }

        let mut shared = self.shared.borrow_mut();
        shared.notifying = false;
        let added = core::mem::replace(&mut shared.listeners, listeners);
        shared.listeners.extend(added);
        if !shared.removed_while_notifying.is_empty() {
            let removed = core::mem::take(&mut shared.removed_while_notifying);
            shared.listeners.retain(|(id, _)| !removed.contains(id));
        }
    }
}

impl<T: Clone + fmt::Debug> fmt::Debug for Observable<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let shared = self.shared.borrow();
        f.debug_struct("Observable")
            .field("value", &shared.value)
            .field("version", &shared.version)
            .field("listeners", &shared.listeners.len())
            .finish()
    }
}

trait Derived<T> {
    fn get(&self) -> T;
    fn version(&self) -> u64;
}

struct Mapped<S, T, F> {
    source: ValueHandle<S>,
    f: F,
    marker: PhantomData<fn() -> T>,
}

impl<S: Clone + 'static, T, F: Fn(S) -> T> Derived<T> for Mapped<S, T, F> {
    fn get(&self) -> T {
        (self.f)(self.source.get())
    }

    fn version(&self) -> u64 {
        self.source.version()
    }
}

struct Combined<A, B, T, F> {
    a: ValueHandle<A>,
    b: ValueHandle<B>,
    f: F,
    marker: PhantomData<fn() -> T>,
}

impl<A, B, T, F> Derived<T> for Combined<A, B, T, F>
where
    A: Clone + 'static,
    B: Clone + 'static,
    F: Fn(A, B) -> T,
{
    fn get(&self) -> T {
        (self.f)(self.a.get(), self.b.get())
    }

    fn version(&self) -> u64 {
        self.a.version().wrapping_add(self.b.version())
    }
}

enum Repr<T> {
    Fixed(T),
    Shared(Rc<RefCell<Shared<T>>>),
    Derived(Rc<dyn Derived<T>>),
}

impl<T: Clone> Clone for Repr<T> {
    fn clone(&self) -> Self {
        match self {
            Self::Fixed(v) => Self::Fixed(v.clone()),
            Self::Shared(s) => Self::Shared(s.clone()),
            Self::Derived(d) => Self::Derived(d.clone()),
        }
    }
}

/// A read-only view of a value owned elsewhere.
///
/// A handle is either bound to an [`Observable`], a constant created with
/// [`ValueHandle::fixed`], or derived from other handles with
/// [`ValueHandle::map`] / [`ValueHandle::combine`]. Derived handles recompute on
/// every read and report the version of their inputs.
///
/// ```rust
/// use evergrid_value::{Observable, ValueHandle};
/// use kurbo::Vec2;
///
/// let mut item_size = Observable::new(Vec2::new(300.0, 300.0));
/// // A row that shares the grid's column width but is 40 pixels tall.
/// let row_size = item_size.handle().map(|s| Vec2::new(s.x, 40.0));
///
/// item_size.set(Vec2::new(200.0, 300.0));
/// assert_eq!(row_size.get(), Vec2::new(200.0, 40.0));
///
/// let fixed = ValueHandle::fixed(12.0_f64);
/// assert_eq!(fixed.get(), 12.0);
/// ```
pub struct ValueHandle<T> {
    repr: Repr<T>,
}

impl<T: Clone> Clone for ValueHandle<T> {
    fn clone(&self) -> Self {
        Self {
            repr: self.repr.clone(),
        }
    }
}

impl<T: Clone + 'static> ValueHandle<T> {
    /// Creates a handle to a constant value.
    pub fn fixed(value: T) -> Self {
        Self {
            repr: Repr::Fixed(value),
        }
    }

    /// Returns the current value.
    #[must_use]
    pub fn get(&self) -> T {
        match &self.repr {
            Repr::Fixed(v) => v.clone(),
            Repr::Shared(s) => s.borrow().value.clone(),
            Repr::Derived(d) => d.get(),
        }
    }

    /// Returns the version of the underlying value(s). Constant handles are always `0`.
    #[must_use]
    pub fn version(&self) -> u64 {
        match &self.repr {
            Repr::Fixed(_) => 0,
            Repr::Shared(s) => s.borrow().version,
            Repr::Derived(d) => d.version(),
        }
    }

    /// Returns `true` if this handle can never change.
    #[must_use]
    pub fn is_fixed(&self) -> bool {
        matches!(self.repr, Repr::Fixed(_))
    }

    /// Derives a new handle by applying `f` to this handle's value on each read.
    #[must_use]
    pub fn map<U: 'static>(&self, f: impl Fn(T) -> U + 'static) -> ValueHandle<U> {
        ValueHandle {
            repr: Repr::Derived(Rc::new(Mapped {
                source: self.clone(),
                f,
                marker: PhantomData,
            })),
        }
    }

    /// Derives a new handle from two handles.
    #[must_use]
    pub fn combine<B: Clone + 'static, U: 'static>(
        &self,
        other: &ValueHandle<B>,
        f: impl Fn(T, B) -> U + 'static,
    ) -> ValueHandle<U> {
        ValueHandle {
            repr: Repr::Derived(Rc::new(Combined {
                a: self.clone(),
                b: other.clone(),
                f,
                marker: PhantomData,
            })),
        }
    }
}

impl<T: Clone + 'static> From<T> for ValueHandle<T> {
    fn from(value: T) -> Self {
        Self::fixed(value)
    }
}

impl<T: Clone + fmt::Debug + 'static> fmt::Debug for ValueHandle<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = match self.repr {
            Repr::Fixed(_) => "fixed",
            Repr::Shared(_) => "shared",
            Repr::Derived(_) => "derived",
        };
        f.debug_struct("ValueHandle")
            .field("kind", &kind)
            .field("value", &self.get())
            .field("version", &self.version())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::{Observable, ValueHandle};
    use alloc::rc::Rc;
    use alloc::vec::Vec;
    use core::cell::RefCell;

    #[test]
    fn listeners_see_committed_value() {
        let mut value = Observable::new(1_i32);
        let handle = value.handle();
        let seen = Rc::new(RefCell::new(Vec::new()));
        let seen_in_listener = seen.clone();
        value.subscribe(move |v| {
            // Reading through a handle inside the listener must not panic.
            seen_in_listener.borrow_mut().push((*v, handle.get()));
        });

        value.set(2);
        value.update(|v| *v += 3);
        assert_eq!(*seen.borrow(), [(2, 2), (5, 5)]);
    }

    #[test]
    fn unsubscribe_stops_notifications() {
        let mut value = Observable::new(0_u8);
        let count = Rc::new(RefCell::new(0));
        let c = count.clone();
        let sub = value.subscribe(move |_| *c.borrow_mut() += 1);
        value.set(1);
        assert!(value.unsubscribe(sub));
        value.set(2);
        assert_eq!(*count.borrow(), 1);
        assert_eq!(value.listener_count(), 0);
        assert!(!value.unsubscribe(sub));
    }

    #[test]
    fn versions_track_writes() {
        let mut value = Observable::new(0.0_f64);
        let handle = value.handle();
        assert_eq!(handle.version(), 0);
        value.set(1.0);
        value.set(1.0);
        assert_eq!(handle.version(), 2);
    }

    #[test]
    fn derived_handles_follow_inputs() {
        let mut scale = Observable::new(2.0_f64);
        let mut base = Observable::new(12.0_f64);
        let font = scale.handle().combine(&base.handle(), |s, b| s * b);
        assert_eq!(font.get(), 24.0);
        let v0 = font.version();

        scale.set(3.0);
        assert_eq!(font.get(), 36.0);
        base.set(10.0);
        assert_eq!(font.get(), 30.0);
        assert!(font.version() != v0);

        let doubled = font.map(|f| f * 2.0);
        assert_eq!(doubled.get(), 60.0);
    }

    #[test]
    fn fixed_handles_never_change() {
        let h = ValueHandle::fixed(5_u32);
        assert!(h.is_fixed());
        assert_eq!(h.version(), 0);
        assert_eq!(h.clone().get(), 5);
    }
}
