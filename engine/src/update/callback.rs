//! Callback handles stored by the [`Registry`](super::Registry).
//!
//! A [`Callback`] wraps a shared [`Runnable`]. Two handles are equal when they point at the
//! same allocation, so cloning a handle yields one that removes the original, while two
//! closures with identical bodies stay distinct.
//!
//! ```rust,ignore
//! let hello = Callback::new(|| log::info!("hello"));
//!
//! registry.add(Phase::NormalUpdate, &hello);
//! registry.add(Phase::NormalUpdate, &hello.clone()); // same identity, second slot
//! registry.remove(Phase::NormalUpdate, &hello);      // removes the first slot only
//! ```

use std::{fmt, rc::Rc};

/// A single-method unit of work invoked during dispatch.
///
/// Implemented for every `Fn()` closure. Implement it manually for types that want to be
/// subscribed directly through [`Callback::from_rc`].
pub trait Runnable {
    /// Run the unit of work.
    fn run(&self);
}

impl<F> Runnable for F
where
    F: Fn(),
{
    #[inline]
    fn run(&self) {
        self()
    }
}

/// A shared, identity-compared handle to a [`Runnable`].
///
/// A handle may be empty, mirroring an unset delegate. Empty handles are ignored by the
/// registry.
#[derive(Clone, Default)]
pub struct Callback {
    inner: Option<Rc<dyn Runnable>>,
}

impl Callback {
    /// Wrap a runnable (usually a closure) in a new handle with its own identity.
    pub fn new<R: Runnable + 'static>(runnable: R) -> Self {
        Self {
            inner: Some(Rc::new(runnable)),
        }
    }

    /// Wrap an existing shared runnable. Handles created from clones of the same `Rc`
    /// compare equal.
    pub fn from_rc<R: Runnable + 'static>(runnable: Rc<R>) -> Self {
        Self {
            inner: Some(runnable),
        }
    }

    /// An empty handle.
    #[inline]
    pub const fn empty() -> Self {
        Self { inner: None }
    }

    /// Returns `true` if the handle does not point at anything.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.inner.is_none()
    }

    /// Run the wrapped runnable. Does nothing for an empty handle.
    #[inline]
    pub fn invoke(&self) {
        if let Some(runnable) = &self.inner {
            runnable.run();
        }
    }

    fn addr(&self) -> Option<*const ()> {
        self.inner.as_ref().map(|rc| Rc::as_ptr(rc) as *const ())
    }
}

impl PartialEq for Callback {
    fn eq(&self, other: &Self) -> bool {
        self.addr() == other.addr()
    }
}

impl Eq for Callback {}

impl fmt::Debug for Callback {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.addr() {
            Some(addr) => write!(f, "Callback({addr:p})"),
            None => f.write_str("Callback(empty)"),
        }
    }
}

impl<R: Runnable + 'static> From<Rc<R>> for Callback {
    fn from(runnable: Rc<R>) -> Self {
        Self::from_rc(runnable)
    }
}
