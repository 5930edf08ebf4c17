//! Per-phase callback registry.
//!
//! The [`Registry`] keeps one ordered list of [`Callback`]s per [`Phase`]. Dispatching a phase
//! runs every callback of that phase synchronously, in the order the callbacks were added.
//!
//! # Contract
//!
//! - [`add`](Registry::add) appends. The same callback may be added several times and fires
//!   once per slot.
//! - [`remove`](Registry::remove) drops the *first* matching slot only. A callback added `n`
//!   times must be removed `n` times.
//! - Empty callbacks and removals of callbacks that are not registered are ignored. Both are
//!   reported through the diagnostic hook and the `log` facade, never as errors.
//! - A panicking callback is not caught. The panic unwinds out of
//!   [`dispatch`](Registry::dispatch) and the rest of that phase is skipped for the tick.
//!
//! # Mutation During Dispatch
//!
//! While any dispatch is running, `add`, `remove` and `clear` are queued instead of applied.
//! The queue is applied in call order when the outermost dispatch returns or unwinds. A
//! running dispatch therefore always sees its phase exactly as it was when it started:
//!
//! ```text
//! dispatch(NormalUpdate)           list: [a, b]
//!   a() ── remove(NormalUpdate, b) queued
//!   b()                            still runs this tick
//! return ── queue applied          list: [a]
//! ```
//!
//! # Thread Safety
//!
//! `Registry` is `!Send` and `!Sync`. It is meant to be owned by the thread driving the frame
//! loop and shared through `Rc`.

use std::{
    cell::{Cell, RefCell},
    fmt,
    rc::Rc,
};

use log::{debug, trace};

use crate::update::{Callback, Phase};

/// Initial per-phase capacity used by [`Registry::new`].
pub const DEFAULT_CAPACITY: usize = 50;

/// Registry operation named in a [`Diagnostic`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Add,
    Remove,
    Clear,
}

/// A registry call that was ignored or postponed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Diagnostic {
    /// An empty callback was passed to `add` or `remove`.
    EmptyCallback { phase: Phase, action: Action },
    /// `remove` found no matching callback.
    NotRegistered { phase: Phase },
    /// The call arrived during a dispatch and was queued.
    Deferred { phase: Phase, action: Action },
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Diagnostic::EmptyCallback { phase, action } => {
                write!(f, "ignored {action:?} of an empty callback on {phase}")
            }
            Diagnostic::NotRegistered { phase } => {
                write!(f, "ignored Remove of a callback not registered on {phase}")
            }
            Diagnostic::Deferred { phase, action } => {
                write!(f, "deferred {action:?} on {phase} until dispatch completes")
            }
        }
    }
}

type DiagnosticHook = Rc<dyn Fn(&Diagnostic)>;

/// A queued mutation. `callback` is empty for [`Action::Clear`].
struct Pending {
    action: Action,
    phase: Phase,
    callback: Callback,
}

/// Ordered callback lists for every [`Phase`].
pub struct Registry {
    phases: RefCell<[Vec<Callback>; Phase::COUNT]>,
    /// Mutations received while dispatching.
    pending: RefCell<Vec<Pending>>,
    /// Number of dispatches currently on the stack.
    depth: Cell<usize>,
    diagnostic_hook: RefCell<Option<DiagnosticHook>>,
}

impl Registry {
    /// Creates an empty registry with [`DEFAULT_CAPACITY`] slots reserved per phase.
    #[inline]
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    /// Creates an empty registry reserving `capacity` slots per phase.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            phases: RefCell::new(std::array::from_fn(|_| Vec::with_capacity(capacity))),
            pending: RefCell::new(Vec::new()),
            depth: Cell::new(0),
            diagnostic_hook: RefCell::new(None),
        }
    }

    /// Appends `callback` to the end of `phase`.
    ///
    /// Empty callbacks are ignored. During a dispatch the add is queued (see the
    /// [module documentation](self)).
    pub fn add(&self, phase: Phase, callback: &Callback) {
        if callback.is_empty() {
            self.report(Diagnostic::EmptyCallback {
                phase,
                action: Action::Add,
            });
            return;
        }
        if self.is_dispatching() {
            self.defer(Action::Add, phase, callback.clone());
            return;
        }
        self.phases.borrow_mut()[phase.index()].push(callback.clone());
    }

    /// Removes the first slot of `phase` holding `callback`.
    ///
    /// Empty or unregistered callbacks are ignored. During a dispatch the removal is queued.
    pub fn remove(&self, phase: Phase, callback: &Callback) {
        if callback.is_empty() {
            self.report(Diagnostic::EmptyCallback {
                phase,
                action: Action::Remove,
            });
            return;
        }
        if self.is_dispatching() {
            self.defer(Action::Remove, phase, callback.clone());
            return;
        }
        self.remove_first(phase, callback);
    }

    /// Removes every callback from `phase`. Queued when called during a dispatch.
    pub fn clear(&self, phase: Phase) {
        if self.is_dispatching() {
            self.defer(Action::Clear, phase, Callback::empty());
            return;
        }
        self.phases.borrow_mut()[phase.index()].clear();
    }

    /// Removes every callback from every phase.
    pub fn clear_all(&self) {
        for phase in Phase::ALL {
            self.clear(phase);
        }
    }

    /// Invokes every callback of `phase` in registration order and returns how many ran.
    ///
    /// Dispatching a phase with no callbacks does nothing. A panic raised by a callback
    /// propagates to the caller, skipping the callbacks after it.
    pub fn dispatch(&self, phase: Phase) -> usize {
        let _guard = DispatchGuard::enter(self);
        let phases = self.phases.borrow();
        let callbacks = &phases[phase.index()];
        for callback in callbacks {
            callback.invoke();
        }
        callbacks.len()
    }

    /// Number of callbacks registered on `phase`.
    #[inline]
    pub fn len(&self, phase: Phase) -> usize {
        self.phases.borrow()[phase.index()].len()
    }

    #[inline]
    pub fn is_empty(&self, phase: Phase) -> bool {
        self.len(phase) == 0
    }

    /// Number of callbacks registered across all phases.
    pub fn total_len(&self) -> usize {
        self.phases.borrow().iter().map(Vec::len).sum()
    }

    /// Returns `true` if `phase` holds at least one slot for `callback`.
    pub fn contains(&self, phase: Phase, callback: &Callback) -> bool {
        self.phases.borrow()[phase.index()].contains(callback)
    }

    /// Number of slots `callback` occupies on `phase`.
    pub fn count(&self, phase: Phase, callback: &Callback) -> usize {
        self.phases.borrow()[phase.index()]
            .iter()
            .filter(|c| *c == callback)
            .count()
    }

    /// A copy of the callbacks currently registered on `phase`, in dispatch order.
    pub fn snapshot(&self, phase: Phase) -> Vec<Callback> {
        self.phases.borrow()[phase.index()].clone()
    }

    /// Returns `true` while a dispatch is running.
    #[inline]
    pub fn is_dispatching(&self) -> bool {
        self.depth.get() > 0
    }

    /// Installs a hook receiving every [`Diagnostic`], replacing any previous hook.
    pub fn set_diagnostic_hook<F>(&self, hook: F)
    where
        F: Fn(&Diagnostic) + 'static,
    {
        *self.diagnostic_hook.borrow_mut() = Some(Rc::new(hook));
    }

    pub fn clear_diagnostic_hook(&self) {
        *self.diagnostic_hook.borrow_mut() = None;
    }

    fn remove_first(&self, phase: Phase, callback: &Callback) {
        let removed = {
            let mut phases = self.phases.borrow_mut();
            let callbacks = &mut phases[phase.index()];
            match callbacks.iter().position(|c| c == callback) {
                Some(index) => {
                    callbacks.remove(index);
                    true
                }
                None => false,
            }
        };
        if !removed {
            self.report(Diagnostic::NotRegistered { phase });
        }
    }

    fn defer(&self, action: Action, phase: Phase, callback: Callback) {
        self.pending.borrow_mut().push(Pending {
            action,
            phase,
            callback,
        });
        self.report(Diagnostic::Deferred { phase, action });
    }

    /// Applies queued mutations in the order they were received.
    fn flush(&self) {
        let pending = std::mem::take(&mut *self.pending.borrow_mut());
        for Pending {
            action,
            phase,
            callback,
        } in pending
        {
            match action {
                Action::Add => self.add(phase, &callback),
                Action::Remove => self.remove_first(phase, &callback),
                Action::Clear => self.clear(phase),
            }
        }
    }

    fn report(&self, diagnostic: Diagnostic) {
        match diagnostic {
            Diagnostic::Deferred { .. } => trace!("{diagnostic}"),
            _ => debug!("{diagnostic}"),
        }
        let hook = self.diagnostic_hook.borrow().clone();
        if let Some(hook) = hook {
            hook(&diagnostic);
        }
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Registry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let phases = self.phases.borrow();
        let mut map = f.debug_map();
        for phase in Phase::ALL {
            map.entry(&phase, &phases[phase.index()].len());
        }
        map.finish()
    }
}

/// Tracks dispatch nesting. Dropping the outermost guard, including during unwinding, applies
/// the pending queue.
struct DispatchGuard<'a> {
    registry: &'a Registry,
}

impl<'a> DispatchGuard<'a> {
    fn enter(registry: &'a Registry) -> Self {
        registry.depth.set(registry.depth.get() + 1);
        Self { registry }
    }
}

impl Drop for DispatchGuard<'_> {
    fn drop(&mut self) {
        let depth = self.registry.depth.get() - 1;
        self.registry.depth.set(depth);
        if depth == 0 {
            self.registry.flush();
        }
    }
}

#[cfg(test)]
mod tests {
    use std::{
        panic::{self, AssertUnwindSafe},
        rc::Weak,
    };

    use super::*;

    type Journal = Rc<RefCell<Vec<&'static str>>>;

    fn journal() -> Journal {
        Rc::new(RefCell::new(Vec::new()))
    }

    fn record(journal: &Journal, label: &'static str) -> Callback {
        let journal = Rc::clone(journal);
        Callback::new(move || journal.borrow_mut().push(label))
    }

    #[test]
    fn new_registry_is_empty() {
        let registry = Registry::new();
        assert_eq!(registry.total_len(), 0);
        for phase in Phase::ALL {
            assert!(registry.is_empty(phase));
        }
    }

    #[test]
    fn dispatch_follows_add_order() {
        // Given
        let registry = Registry::new();
        let calls = journal();
        for label in ["a", "b", "c", "d"] {
            registry.add(Phase::NormalUpdate, &record(&calls, label));
        }

        // When
        let ran = registry.dispatch(Phase::NormalUpdate);

        // Then
        assert_eq!(ran, 4);
        assert_eq!(*calls.borrow(), vec!["a", "b", "c", "d"]);
    }

    #[test]
    fn dispatch_only_runs_requested_phase() {
        let registry = Registry::new();
        let calls = journal();
        registry.add(Phase::EarlyUpdate, &record(&calls, "early"));
        registry.add(Phase::LateUpdate, &record(&calls, "late"));

        registry.dispatch(Phase::LateUpdate);

        assert_eq!(*calls.borrow(), vec!["late"]);
    }

    #[test]
    fn add_then_remove_restores_sequence() {
        // Given
        let registry = Registry::new();
        let calls = journal();
        let a = record(&calls, "a");
        let b = record(&calls, "b");
        let extra = record(&calls, "extra");
        registry.add(Phase::LateUpdate, &a);
        registry.add(Phase::LateUpdate, &b);
        let before = registry.snapshot(Phase::LateUpdate);

        // When
        registry.add(Phase::LateUpdate, &extra);
        registry.remove(Phase::LateUpdate, &extra);

        // Then
        assert_eq!(registry.snapshot(Phase::LateUpdate), before);
        registry.dispatch(Phase::LateUpdate);
        assert_eq!(*calls.borrow(), vec!["a", "b"]);
    }

    #[test]
    fn remove_takes_first_match_only() {
        // Given
        let registry = Registry::new();
        let calls = journal();
        let a = record(&calls, "a");
        let b = record(&calls, "b");
        registry.add(Phase::NormalUpdate, &a);
        registry.add(Phase::NormalUpdate, &b);
        registry.add(Phase::NormalUpdate, &a);

        // When
        registry.remove(Phase::NormalUpdate, &a);

        // Then
        assert_eq!(registry.snapshot(Phase::NormalUpdate), vec![b, a]);
    }

    #[test]
    fn duplicates_need_matching_removals() {
        // Given
        let registry = Registry::new();
        let calls = journal();
        let a = record(&calls, "a");
        for _ in 0..3 {
            registry.add(Phase::FixedUpdate, &a);
        }

        // When
        registry.remove(Phase::FixedUpdate, &a);
        registry.dispatch(Phase::FixedUpdate);

        // Then
        assert_eq!(registry.count(Phase::FixedUpdate, &a), 2);
        assert_eq!(calls.borrow().len(), 2);

        // And When
        registry.remove(Phase::FixedUpdate, &a);
        registry.remove(Phase::FixedUpdate, &a);
        calls.borrow_mut().clear();
        registry.dispatch(Phase::FixedUpdate);

        // Then
        assert!(!registry.contains(Phase::FixedUpdate, &a));
        assert!(calls.borrow().is_empty());
    }

    #[test]
    fn dispatch_of_empty_phase_is_noop() {
        let registry = Registry::new();
        assert_eq!(registry.dispatch(Phase::PostLateUpdate), 0);
        assert!(!registry.is_dispatching());
    }

    #[test]
    fn empty_callbacks_are_ignored() {
        // Given
        let registry = Registry::new();
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        registry.set_diagnostic_hook(move |d| sink.borrow_mut().push(*d));
        registry.add(Phase::EarlyUpdate, &Callback::new(|| {}));

        // When
        registry.add(Phase::EarlyUpdate, &Callback::empty());
        registry.remove(Phase::EarlyUpdate, &Callback::empty());

        // Then
        assert_eq!(registry.len(Phase::EarlyUpdate), 1);
        assert_eq!(
            *seen.borrow(),
            vec![
                Diagnostic::EmptyCallback {
                    phase: Phase::EarlyUpdate,
                    action: Action::Add
                },
                Diagnostic::EmptyCallback {
                    phase: Phase::EarlyUpdate,
                    action: Action::Remove
                },
            ]
        );
    }

    #[test]
    fn removing_unknown_callback_is_reported() {
        let registry = Registry::new();
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        registry.set_diagnostic_hook(move |d| sink.borrow_mut().push(*d));

        registry.remove(Phase::LateUpdate, &Callback::new(|| {}));

        assert_eq!(
            *seen.borrow(),
            vec![Diagnostic::NotRegistered {
                phase: Phase::LateUpdate
            }]
        );

        // Hook can be removed again
        registry.clear_diagnostic_hook();
        registry.remove(Phase::LateUpdate, &Callback::new(|| {}));
        assert_eq!(seen.borrow().len(), 1);
    }

    #[test]
    fn add_during_dispatch_fires_from_next_dispatch() {
        // Given
        let registry = Rc::new(Registry::new());
        let calls = journal();
        let late = record(&calls, "late");
        let weak: Weak<Registry> = Rc::downgrade(&registry);
        let adder = {
            let calls = Rc::clone(&calls);
            let late = late.clone();
            Callback::new(move || {
                calls.borrow_mut().push("adder");
                if let Some(registry) = weak.upgrade() {
                    registry.add(Phase::NormalUpdate, &late);
                    assert!(registry.is_dispatching());
                }
            })
        };
        registry.add(Phase::NormalUpdate, &adder);

        // When
        registry.dispatch(Phase::NormalUpdate);

        // Then
        assert_eq!(*calls.borrow(), vec!["adder"]);
        assert_eq!(registry.len(Phase::NormalUpdate), 2);

        // And When
        registry.remove(Phase::NormalUpdate, &adder);
        calls.borrow_mut().clear();
        registry.dispatch(Phase::NormalUpdate);

        // Then
        assert_eq!(*calls.borrow(), vec!["late"]);
    }

    #[test]
    fn mutations_during_dispatch_report_deferred() {
        // Given
        let registry = Rc::new(Registry::new());
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        registry.set_diagnostic_hook(move |d| sink.borrow_mut().push(*d));
        let weak: Weak<Registry> = Rc::downgrade(&registry);
        let mutator = Callback::new(move || {
            if let Some(registry) = weak.upgrade() {
                let other = Callback::new(|| {});
                registry.add(Phase::LateUpdate, &other);
                registry.remove(Phase::LateUpdate, &other);
            }
        });
        registry.add(Phase::EarlyUpdate, &mutator);

        // When
        registry.dispatch(Phase::EarlyUpdate);

        // Then
        assert_eq!(
            *seen.borrow(),
            vec![
                Diagnostic::Deferred {
                    phase: Phase::LateUpdate,
                    action: Action::Add,
                },
                Diagnostic::Deferred {
                    phase: Phase::LateUpdate,
                    action: Action::Remove,
                },
            ]
        );
        assert!(registry.is_empty(Phase::LateUpdate));
    }

    #[test]
    fn remove_during_dispatch_keeps_current_pass() {
        // Given
        let registry = Rc::new(Registry::new());
        let calls = journal();
        let victim = record(&calls, "victim");
        let weak = Rc::downgrade(&registry);
        let remover = {
            let calls = Rc::clone(&calls);
            let victim = victim.clone();
            Callback::new(move || {
                calls.borrow_mut().push("remover");
                if let Some(registry) = weak.upgrade() {
                    registry.remove(Phase::LateUpdate, &victim);
                }
            })
        };
        registry.add(Phase::LateUpdate, &remover);
        registry.add(Phase::LateUpdate, &victim);

        // When
        registry.dispatch(Phase::LateUpdate);

        // Then
        assert_eq!(*calls.borrow(), vec!["remover", "victim"]);
        assert!(!registry.contains(Phase::LateUpdate, &victim));
    }

    #[test]
    fn queued_mutations_apply_in_call_order() {
        // Given
        let registry = Rc::new(Registry::new());
        let calls = journal();
        let a = record(&calls, "a");
        let weak = Rc::downgrade(&registry);
        let churn = {
            let a = a.clone();
            Callback::new(move || {
                if let Some(registry) = weak.upgrade() {
                    registry.add(Phase::EarlyUpdate, &a);
                    registry.remove(Phase::EarlyUpdate, &a);
                    registry.add(Phase::EarlyUpdate, &a);
                    registry.clear(Phase::FixedUpdate);
                }
            })
        };
        registry.add(Phase::FixedUpdate, &Callback::new(|| {}));
        registry.add(Phase::NormalUpdate, &churn);

        // When
        registry.dispatch(Phase::NormalUpdate);

        // Then
        assert_eq!(registry.count(Phase::EarlyUpdate, &a), 1);
        assert!(registry.is_empty(Phase::FixedUpdate));
    }

    #[test]
    fn nested_dispatch_defers_until_outermost_returns() {
        // Given
        let registry = Rc::new(Registry::new());
        let calls = journal();
        let inner = record(&calls, "inner");
        let weak = Rc::downgrade(&registry);
        let outer = {
            let calls = Rc::clone(&calls);
            let inner = inner.clone();
            Callback::new(move || {
                calls.borrow_mut().push("outer");
                if let Some(registry) = weak.upgrade() {
                    registry.dispatch(Phase::EverySecondFrame);
                    registry.add(Phase::EverySecondFrame, &inner);
                    registry.dispatch(Phase::EverySecondFrame);
                    assert_eq!(registry.len(Phase::EverySecondFrame), 1);
                }
            })
        };
        registry.add(Phase::EverySecondFrame, &inner);
        registry.add(Phase::PostLateUpdate, &outer);

        // When
        registry.dispatch(Phase::PostLateUpdate);

        // Then
        assert_eq!(*calls.borrow(), vec!["outer", "inner", "inner"]);
        assert_eq!(registry.len(Phase::EverySecondFrame), 2);
    }

    #[test]
    fn panicking_callback_aborts_rest_of_phase() {
        // Given
        let registry = Rc::new(Registry::new());
        let calls = journal();
        let weak = Rc::downgrade(&registry);
        let late_add = record(&calls, "late_add");
        let faulty = {
            let calls = Rc::clone(&calls);
            let late_add = late_add.clone();
            Callback::new(move || {
                calls.borrow_mut().push("faulty");
                if let Some(registry) = weak.upgrade() {
                    registry.add(Phase::NormalUpdate, &late_add);
                }
                panic!("callback failure");
            })
        };
        registry.add(Phase::NormalUpdate, &record(&calls, "first"));
        registry.add(Phase::NormalUpdate, &faulty);
        registry.add(Phase::NormalUpdate, &record(&calls, "skipped"));

        // When
        let result = panic::catch_unwind(AssertUnwindSafe(|| {
            registry.dispatch(Phase::NormalUpdate);
        }));

        // Then
        assert!(result.is_err());
        assert_eq!(*calls.borrow(), vec!["first", "faulty"]);
        assert!(!registry.is_dispatching());
        assert!(registry.contains(Phase::NormalUpdate, &late_add));

        // And the registry keeps working
        registry.remove(Phase::NormalUpdate, &faulty);
        calls.borrow_mut().clear();
        registry.dispatch(Phase::NormalUpdate);
        assert_eq!(*calls.borrow(), vec!["first", "skipped", "late_add"]);
    }

    #[test]
    fn clear_all_empties_every_phase() {
        let registry = Registry::with_capacity(4);
        for phase in Phase::ALL {
            registry.add(phase, &Callback::new(|| {}));
        }
        assert_eq!(registry.total_len(), Phase::COUNT);

        registry.clear_all();

        assert_eq!(registry.total_len(), 0);
    }

    #[test]
    fn independent_registries_do_not_share_state() {
        let first = Registry::new();
        let second = Registry::default();
        first.add(Phase::NormalUpdate, &Callback::new(|| {}));
        assert_eq!(first.len(Phase::NormalUpdate), 1);
        assert_eq!(second.len(Phase::NormalUpdate), 0);
    }
}
