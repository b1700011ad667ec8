use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::{Rc, Weak};

use crate::binding::Binding;
use crate::error::{CoreError, Result};
use crate::runtime::ChangeScheduler;
use crate::scope::{Scope, ScopeId};

/// An owned, mutable slot whose writes request a re-render of its scope.
///
/// Handles are cheap to clone; the cell itself lives as long as the scope
/// that created it. Every write bumps [`version`](Self::version) and marks the
/// scope dirty, including writes of an equal value.
pub struct StateCell<T: 'static> {
    inner: Rc<CellInner<T>>,
}

pub(crate) struct CellInner<T> {
    value: RefCell<T>,
    version: Cell<u64>,
    scope: ScopeId,
    scheduler: ChangeScheduler,
}

impl<T: 'static> StateCell<T> {
    pub fn new(scope: &Scope, value: T) -> Self {
        let inner = Rc::new(CellInner {
            value: RefCell::new(value),
            version: Cell::new(0),
            scope: scope.id(),
            scheduler: scope.scheduler().clone(),
        });
        scope.adopt(inner.clone());
        Self { inner }
    }

    pub fn scope_id(&self) -> ScopeId {
        self.inner.scope
    }

    pub fn version(&self) -> u64 {
        self.inner.version.get()
    }

    pub fn is_alive(&self) -> bool {
        self.inner.is_alive()
    }

    pub fn read(&self) -> T
    where
        T: Clone,
    {
        match self.try_read() {
            Ok(v) => v,
            Err(err) => panic!("StateCell::read: {err}"),
        }
    }

    pub fn try_read(&self) -> Result<T>
    where
        T: Clone,
    {
        self.inner.try_read()
    }

    /// Borrow the current value. `f` must not write to this cell.
    pub fn with<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        if let Err(err) = self.inner.check_alive() {
            panic!("StateCell::with: {err}");
        }
        f(&self.inner.value.borrow())
    }

    pub fn write(&self, value: T) {
        if let Err(err) = self.try_write(value) {
            panic!("StateCell::write: {err}");
        }
    }

    pub fn try_write(&self, value: T) -> Result<()> {
        self.inner.try_write(value)
    }

    /// Mutate in place; counts as a single write.
    pub fn update(&self, f: impl FnOnce(&mut T)) {
        if let Err(err) = self.inner.check_alive() {
            panic!("StateCell::update: {err}");
        }
        f(&mut self.inner.value.borrow_mut());
        self.inner.committed();
    }

    /// A two-way binding that does not keep the cell alive.
    pub fn binding(&self) -> Binding<T>
    where
        T: Clone,
    {
        if let Err(err) = self.inner.check_alive() {
            panic!("StateCell::binding: {err}");
        }
        let read = Rc::downgrade(&self.inner);
        let write = read.clone();
        let version = read.clone();
        let scope = self.inner.scope;
        Binding::from_parts(
            move || upgrade(&read, scope)?.try_read(),
            move |v| upgrade(&write, scope)?.try_write(v),
            Some(Rc::new(move || {
                version.upgrade().map(|c| c.version.get()).unwrap_or_default()
            })),
        )
    }
}

fn upgrade<T>(weak: &Weak<CellInner<T>>, scope: ScopeId) -> Result<Rc<CellInner<T>>> {
    weak.upgrade().ok_or(CoreError::ScopeDisposed(scope))
}

impl<T> CellInner<T> {
    fn is_alive(&self) -> bool {
        self.scheduler.is_scope_alive(self.scope)
    }

    fn check_alive(&self) -> Result<()> {
        if self.is_alive() {
            Ok(())
        } else {
            Err(CoreError::ScopeDisposed(self.scope))
        }
    }

    fn try_read(&self) -> Result<T>
    where
        T: Clone,
    {
        self.check_alive()?;
        Ok(self.value.borrow().clone())
    }

    fn try_write(&self, value: T) -> Result<()> {
        self.check_alive()?;
        *self.value.borrow_mut() = value;
        self.committed();
        Ok(())
    }

    fn committed(&self) {
        self.version.set(self.version.get() + 1);
        self.scheduler.mark_dirty(self.scope);
    }
}

impl<T> Clone for StateCell<T> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for StateCell<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StateCell")
            .field("value", &*self.inner.value.borrow())
            .field("version", &self.inner.version.get())
            .field("scope", &self.inner.scope)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runtime::ChangeScheduler;

    #[test]
    fn every_write_bumps_version_and_marks_scope() {
        let scheduler = ChangeScheduler::new();
        let scope = scheduler.root_scope();
        let cell = scope.state(3);

        assert_eq!(cell.scope_id(), scope.id());
        assert_eq!(cell.version(), 0);
        cell.write(3);
        cell.write(3);
        assert_eq!(cell.version(), 2);
        assert!(scheduler.is_dirty(scope.id()));
    }

    #[test]
    fn update_counts_as_one_write() {
        let scheduler = ChangeScheduler::new();
        let scope = scheduler.root_scope();
        let cell = scope.state(vec![1, 2]);

        cell.update(|v| v.push(3));
        assert_eq!(cell.read(), vec![1, 2, 3]);
        assert_eq!(cell.version(), 1);
    }

    #[test]
    fn disposed_scope_rejects_access() {
        let scheduler = ChangeScheduler::new();
        let scope = scheduler.root_scope();
        let id = scope.id();
        let cell = scope.state(1u8);

        scope.dispose();
        assert!(!cell.is_alive());
        assert_eq!(cell.try_read(), Err(CoreError::ScopeDisposed(id)));
        assert_eq!(cell.try_write(2), Err(CoreError::ScopeDisposed(id)));
    }

    #[test]
    #[should_panic(expected = "was disposed")]
    fn binding_over_disposed_scope_fails_fast() {
        let scheduler = ChangeScheduler::new();
        let scope = scheduler.root_scope();
        let cell = scope.state(false);
        scope.dispose();
        let _ = cell.binding();
    }
}
