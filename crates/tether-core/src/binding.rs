//! Two-way accessors over state held elsewhere.
//!
//! A [`Binding<T>`] owns nothing: it forwards `get` to its source and `set`
//! to the source's write path, so a write through a binding dirties exactly
//! what a direct write would. Bindings are passed down to child views by
//! value; every clone aliases the same source.
//!
//! ```rust
//! use tether_core::prelude::*;
//!
//! #[derive(Clone)]
//! struct Point { x: i32, y: i32 }
//!
//! let scheduler = ChangeScheduler::new();
//! let scope = scheduler.root_scope();
//! let point = scope.state(Point { x: 1, y: 2 });
//!
//! let x = point.binding().project(|p| p.x, |p, x| p.x = x);
//! x.set(5);
//! assert_eq!(point.read().x, 5);
//! assert_eq!(point.read().y, 2);
//! ```

use std::fmt;
use std::rc::Rc;

use crate::error::Result;
use crate::transaction::{self, TransactionAnimation};
use crate::transition::TransitionSpec;

type Getter<T> = Rc<dyn Fn() -> Result<T>>;
type Setter<T> = Rc<dyn Fn(T) -> Result<()>>;
type VersionFn = Rc<dyn Fn() -> u64>;

pub struct Binding<T> {
    get: Getter<T>,
    set: Setter<T>,
    version: Option<VersionFn>,
}

impl<T> Clone for Binding<T> {
    fn clone(&self) -> Self {
        Self {
            get: self.get.clone(),
            set: self.set.clone(),
            version: self.version.clone(),
        }
    }
}

impl<T: fmt::Debug + 'static> fmt::Debug for Binding<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Binding")
            .field("value", &self.try_get())
            .field("source_version", &self.source_version())
            .finish()
    }
}

impl<T: 'static> Binding<T> {
    /// A binding over some outer mutable location captured by the closures.
    /// `set` must forward the value to that location.
    pub fn new(get: impl Fn() -> T + 'static, set: impl Fn(T) + 'static) -> Self {
        Self::from_parts(
            move || Ok(get()),
            move |v| {
                set(v);
                Ok(())
            },
            None,
        )
    }

    pub(crate) fn from_parts(
        get: impl Fn() -> Result<T> + 'static,
        set: impl Fn(T) -> Result<()> + 'static,
        version: Option<VersionFn>,
    ) -> Self {
        Self {
            get: Rc::new(get),
            set: Rc::new(set),
            version,
        }
    }

    pub fn get(&self) -> T {
        match self.try_get() {
            Ok(v) => v,
            Err(err) => panic!("Binding::get: {err}"),
        }
    }

    pub fn try_get(&self) -> Result<T> {
        (self.get)()
    }

    pub fn set(&self, value: T) {
        if let Err(err) = self.try_set(value) {
            panic!("Binding::set: {err}");
        }
    }

    pub fn try_set(&self, value: T) -> Result<()> {
        (self.set)(value)
    }

    /// Read-modify-write through the binding.
    pub fn update(&self, f: impl FnOnce(&mut T)) {
        let mut value = self.get();
        f(&mut value);
        self.set(value);
    }

    /// Version of the underlying cell or store, when the source has one.
    pub fn source_version(&self) -> Option<u64> {
        self.version.as_ref().map(|v| v())
    }

    /// Binding to one part of this binding's value. `set` writes the whole
    /// outer value back, leaving the other parts as they were.
    pub fn project<U: 'static>(
        &self,
        get: impl Fn(&T) -> U + 'static,
        set: impl Fn(&mut T, U) + 'static,
    ) -> Binding<U> {
        let reader = self.clone();
        let writer = self.clone();
        Binding::from_parts(
            move || reader.try_get().map(|outer| get(&outer)),
            move |part| {
                let mut outer = writer.try_get()?;
                set(&mut outer, part);
                writer.try_set(outer)
            },
            self.version.clone(),
        )
    }

    /// Same source, but every `set` animates the resulting commit.
    pub fn animation(&self, transition: impl Into<TransitionSpec>) -> Binding<T> {
        self.in_transaction(TransactionAnimation::Transition(Rc::new(
            transition.into(),
        )))
    }

    /// Like [`animation`](Self::animation) with the scheduler's default curve.
    pub fn animated(&self) -> Binding<T> {
        self.in_transaction(TransactionAnimation::Default)
    }

    fn in_transaction(&self, animation: TransactionAnimation) -> Binding<T> {
        let inner = self.clone();
        Binding {
            get: self.get.clone(),
            set: Rc::new(move |v: T| {
                transaction::with_transaction(Some(animation.clone()), || inner.try_set(v))
            }),
            version: self.version.clone(),
        }
    }
}

impl Binding<bool> {
    pub fn toggle(&self) {
        self.update(|v| *v = !*v);
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;

    use super::*;
    use crate::runtime::ChangeScheduler;

    #[derive(Clone, Debug, PartialEq)]
    struct Pair {
        x: i32,
        y: i32,
    }

    #[test]
    fn aliases_observe_each_others_writes() {
        let scheduler = ChangeScheduler::new();
        let scope = scheduler.root_scope();
        let cell = scope.state(false);

        let a = cell.binding();
        let b = a.clone();
        let c = cell.binding();

        b.set(true);
        assert!(a.get());
        assert!(c.get());
        c.toggle();
        assert!(!a.get());
        assert_eq!(cell.version(), 2);
    }

    #[test]
    fn projection_preserves_sibling_fields() {
        let scheduler = ChangeScheduler::new();
        let scope = scheduler.root_scope();
        let cell = scope.state(Pair { x: 1, y: 2 });

        let x = cell.binding().project(|p| p.x, |p, x| p.x = x);
        x.set(5);

        assert_eq!(cell.read(), Pair { x: 5, y: 2 });
        assert_eq!(x.source_version(), Some(1));
    }

    #[test]
    fn nested_projection_reaches_the_owning_cell() {
        let scheduler = ChangeScheduler::new();
        let scope = scheduler.root_scope();
        let cell = scope.state((Pair { x: 0, y: 0 }, "label"));

        let pair = cell.binding().project(|t| t.0.clone(), |t, p| t.0 = p);
        let y = pair.project(|p| p.y, |p, y| p.y = y);
        y.set(9);

        assert_eq!(cell.read(), (Pair { x: 0, y: 9 }, "label"));
        assert!(scheduler.is_dirty(scope.id()));
    }

    #[test]
    fn closure_binding_forwards_writes() {
        let slot = Rc::new(RefCell::new(Pair { x: 1, y: 1 }));
        let binding = Binding::new(
            {
                let slot = slot.clone();
                move || slot.borrow().y
            },
            {
                let slot = slot.clone();
                move |y| slot.borrow_mut().y = y
            },
        );

        binding.update(|y| *y += 4);
        assert_eq!(*slot.borrow(), Pair { x: 1, y: 5 });
        assert_eq!(binding.source_version(), None);
    }

    #[test]
    fn binding_outliving_its_scope_reports_disposal() {
        let scheduler = ChangeScheduler::new();
        let scope = scheduler.root_scope();
        let id = scope.id();
        let binding = scope.state(1).binding();

        scope.dispose();
        assert_eq!(
            binding.try_get(),
            Err(crate::error::CoreError::ScopeDisposed(id))
        );
        assert!(binding.try_set(2).is_err());
    }
}
