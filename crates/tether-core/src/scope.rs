use std::any::Any;
use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

use slotmap::new_key_type;

use crate::runtime::ChangeScheduler;
use crate::state::StateCell;
use crate::store::{Model, ObservableStore};

new_key_type! {
    /// Generational id of a view scope within one scheduler session.
    pub struct ScopeId;
}

/// A view scope: owns state cells and cleanups, and is the unit the
/// scheduler marks dirty.
pub struct Scope {
    inner: Rc<ScopeInner>,
}

struct ScopeInner {
    id: ScopeId,
    scheduler: ChangeScheduler,
    parent: Option<Weak<ScopeInner>>,
    disposed: Cell<bool>,
    disposers: RefCell<Vec<Box<dyn FnOnce()>>>,
    children: RefCell<Vec<Scope>>,
    owned: RefCell<Vec<Rc<dyn Any>>>,
}

impl Scope {
    pub(crate) fn new(scheduler: &ChangeScheduler, parent: Option<&Scope>) -> Self {
        let id = scheduler.register_scope();
        Self {
            inner: Rc::new(ScopeInner {
                id,
                scheduler: scheduler.clone(),
                parent: parent.map(|p| Rc::downgrade(&p.inner)),
                disposed: Cell::new(false),
                disposers: RefCell::new(Vec::new()),
                children: RefCell::new(Vec::new()),
                owned: RefCell::new(Vec::new()),
            }),
        }
    }

    pub fn id(&self) -> ScopeId {
        self.inner.id
    }

    pub fn scheduler(&self) -> &ChangeScheduler {
        &self.inner.scheduler
    }

    pub fn is_alive(&self) -> bool {
        !self.inner.disposed.get() && self.inner.scheduler.is_scope_alive(self.inner.id)
    }

    /// New cell owned by this scope.
    pub fn state<T: 'static>(&self, value: T) -> StateCell<T> {
        StateCell::new(self, value)
    }

    /// Mark this scope dirty for the next commit.
    pub fn invalidate(&self) {
        if self.is_alive() {
            self.inner.scheduler.mark_dirty(self.inner.id);
        }
    }

    /// Re-render this scope whenever `store` publishes a change. The
    /// subscription is dropped with the scope.
    pub fn observe<M: Model>(&self, store: &ObservableStore<M>) {
        let scheduler = self.inner.scheduler.clone();
        let id = self.inner.id;
        let handle = store.subscribe(move || {
            if scheduler.is_scope_alive(id) {
                scheduler.mark_dirty(id);
            }
        });
        let store = store.clone();
        self.add_disposer(move || store.unsubscribe(handle));
    }

    pub fn add_disposer(&self, disposer: impl FnOnce() + 'static) {
        self.inner.disposers.borrow_mut().push(Box::new(disposer));
    }

    pub fn child(&self) -> Scope {
        let child = Scope::new(&self.inner.scheduler, Some(self));
        self.inner.children.borrow_mut().push(child.clone());
        child
    }

    /// Live children; disposed ones are detached.
    pub fn child_count(&self) -> usize {
        self.inner.children.borrow().len()
    }

    pub(crate) fn adopt(&self, value: Rc<dyn Any>) {
        self.inner.owned.borrow_mut().push(value);
    }

    /// Tear down children first, then run disposers, then drop owned state.
    /// Disposing twice is a no-op.
    pub fn dispose(self) {
        self.inner.teardown();
    }
}

impl ScopeInner {
    fn teardown(&self) {
        if self.disposed.replace(true) {
            return;
        }

        let children = std::mem::take(&mut *self.children.borrow_mut());
        for child in children {
            child.dispose();
        }

        let disposers = std::mem::take(&mut *self.disposers.borrow_mut());
        for disposer in disposers {
            disposer();
        }

        self.owned.borrow_mut().clear();
        if let Some(parent) = self.parent.as_ref().and_then(Weak::upgrade)
            && let Ok(mut siblings) = parent.children.try_borrow_mut()
        {
            siblings.retain(|c| c.inner.id != self.id);
        }
        self.scheduler.release_scope(self.id);
        log::trace!("scope {:?} disposed", self.id);
    }
}

impl Clone for Scope {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl std::fmt::Debug for Scope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Scope")
            .field("id", &self.inner.id)
            .field("alive", &self.is_alive())
            .finish()
    }
}

impl Drop for ScopeInner {
    fn drop(&mut self) {
        self.teardown();
    }
}
