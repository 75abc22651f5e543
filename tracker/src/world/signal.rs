use std::{
    cell::{Cell, Ref, RefCell},
    fmt,
    rc::{Rc, Weak},
};

use crate::tracking::error::CleanupError;

/// Returned by a listener to tell its [`Signal`] whether to keep it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ListenerAction {
    Keep,
    /// Unsubscribe this listener once the current emit finishes
    Detach,
}

/// Token handed out by [`Signal::subscribe`]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SubscriptionToken(u64);

impl fmt::Display for SubscriptionToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

type Listener<T> = Rc<dyn Fn(&T, &T) -> ListenerAction>;

// SignalHandle
trait SignalHandle {
    fn try_unsubscribe(&self, token: SubscriptionToken) -> Result<bool, CleanupError>;
}

struct SignalInner<T> {
    listeners: RefCell<Vec<(SubscriptionToken, Listener<T>)>>,
    next_token: Cell<u64>,
}

impl<T> SignalHandle for SignalInner<T> {
    fn try_unsubscribe(&self, token: SubscriptionToken) -> Result<bool, CleanupError> {
        let mut listeners = self
            .listeners
            .try_borrow_mut()
            .map_err(|_| CleanupError::SignalBusy { token })?;
        let before = listeners.len();
        listeners.retain(|(existing, _)| *existing != token);
        Ok(listeners.len() != before)
    }
}

/// Change notifications for a single externally-owned field.
///
/// Listeners receive `(old, new)` and may detach themselves while being
/// invoked. Cloning a `Signal` yields another handle to the same listener list.
pub struct Signal<T: 'static> {
    inner: Rc<SignalInner<T>>,
}

impl<T: 'static> Clone for Signal<T> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<T: 'static> Default for Signal<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: 'static> Signal<T> {
    pub fn new() -> Self {
        Self {
            inner: Rc::new(SignalInner {
                listeners: RefCell::new(Vec::new()),
                next_token: Cell::new(0),
            }),
        }
    }

    pub fn subscribe<F>(&self, listener: F) -> Subscription
    where
        F: Fn(&T, &T) -> ListenerAction + 'static,
    {
        let token = SubscriptionToken(self.inner.next_token.get());
        self.inner.next_token.set(token.0 + 1);
        self.inner
            .listeners
            .borrow_mut()
            .push((token, Rc::new(listener)));

        let handle: Rc<dyn SignalHandle> = self.inner.clone();
        Subscription {
            handle: Rc::downgrade(&handle),
            token,
        }
    }

    /// Returns whether a listener with this token was subscribed
    pub fn unsubscribe(&self, token: SubscriptionToken) -> bool {
        self.inner.try_unsubscribe(token).unwrap_or(false)
    }

    pub fn listener_count(&self) -> usize {
        self.inner.listeners.borrow().len()
    }

    pub fn emit(&self, old: &T, new: &T) {
        // snapshot, so listeners may subscribe or unsubscribe while we iterate
        let snapshot: Vec<(SubscriptionToken, Listener<T>)> = self
            .inner
            .listeners
            .borrow()
            .iter()
            .map(|(token, listener)| (*token, listener.clone()))
            .collect();

        let mut detached = Vec::new();
        for (token, listener) in snapshot {
            if !self.is_subscribed(token) {
                continue;
            }
            if listener(old, new) == ListenerAction::Detach {
                detached.push(token);
            }
        }

        if !detached.is_empty() {
            self.inner
                .listeners
                .borrow_mut()
                .retain(|(token, _)| !detached.contains(token));
        }
    }

    fn is_subscribed(&self, token: SubscriptionToken) -> bool {
        self.inner
            .listeners
            .borrow()
            .iter()
            .any(|(existing, _)| *existing == token)
    }
}

/// A live listener registration. Cancelling it is the only way to remove the
/// listener from outside; it holds no strong reference to the signal.
pub struct Subscription {
    handle: Weak<dyn SignalHandle>,
    token: SubscriptionToken,
}

impl Subscription {
    pub fn token(&self) -> SubscriptionToken {
        self.token
    }

    pub fn cancel(self) -> Result<(), CleanupError> {
        let token = self.token;
        let Some(handle) = self.handle.upgrade() else {
            return Err(CleanupError::SignalDropped { token });
        };
        if handle.try_unsubscribe(token)? {
            Ok(())
        } else {
            Err(CleanupError::NotSubscribed { token })
        }
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("token", &self.token)
            .finish()
    }
}

/// A value owned by a host entity whose every change is announced on a
/// [`Signal`].
pub struct WatchedField<T: 'static> {
    value: RefCell<T>,
    signal: Signal<T>,
}

impl<T: 'static> WatchedField<T> {
    pub fn new(value: T) -> Self {
        Self {
            value: RefCell::new(value),
            signal: Signal::new(),
        }
    }

    pub fn get(&self) -> Ref<'_, T> {
        self.value.borrow()
    }

    pub fn signal(&self) -> &Signal<T> {
        &self.signal
    }
}

impl<T: Clone + 'static> WatchedField<T> {
    /// Replaces the value, then notifies listeners with `(old, new)`.
    /// No borrow of the field is held while listeners run, so they may set it
    /// again.
    pub fn set(&self, new: T) {
        let old = self.value.replace(new.clone());
        self.signal.emit(&old, &new);
    }

    pub fn value(&self) -> T {
        self.value.borrow().clone()
    }
}

impl<T: Default + 'static> Default for WatchedField<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}
