//! Reference-type models that publish changes.
//!
//! An [`ObservableStore`] wraps a [`Model`] shared by every view holding the
//! store. Writes go through [`ObservableStore::write_field`]; a write to a
//! published field notifies every current subscriber, synchronously and in
//! subscription order, before returning. Notification is store-wide: the
//! handler is told that something changed, not what.
//!
//! [`observable_model!`](crate::observable_model) declares a model together
//! with named accessors:
//!
//! ```rust
//! use tether_core::prelude::*;
//!
//! tether_core::observable_model! {
//!     #[derive(Debug)]
//!     pub struct Profile => ProfileStore {
//!         #[published] name(set_name): String = "Ana".to_string(),
//!         visits(set_visits): u32 = 0,
//!     }
//! }
//!
//! let scheduler = ChangeScheduler::new();
//! let store = ObservableStore::new(&scheduler, Profile::default());
//! store.set_name("Bea".to_string());
//! assert_eq!(store.name(), "Bea");
//! ```

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;

use slotmap::{SlotMap, new_key_type};

use crate::binding::Binding;
use crate::error::{CoreError, Result};
use crate::runtime::ChangeScheduler;

new_key_type! {
    pub struct SubscriptionHandle;
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FieldDescriptor {
    pub name: &'static str,
    pub published: bool,
}

/// A store model: its name and its field table.
pub trait Model: 'static {
    const NAME: &'static str;
    const FIELDS: &'static [FieldDescriptor];
}

type Handler = Rc<dyn Fn()>;

pub struct ObservableStore<M: Model> {
    inner: Rc<StoreInner<M>>,
}

struct StoreInner<M> {
    model: RefCell<M>,
    version: Cell<u64>,
    subscribers: RefCell<SlotMap<SubscriptionHandle, Handler>>,
    order: RefCell<Vec<SubscriptionHandle>>,
    notifying: Cell<bool>,
    scheduler: ChangeScheduler,
}

impl<M: Model> Clone for ObservableStore<M> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<M: Model> ObservableStore<M> {
    pub fn new(scheduler: &ChangeScheduler, model: M) -> Self {
        Self {
            inner: Rc::new(StoreInner {
                model: RefCell::new(model),
                version: Cell::new(0),
                subscribers: RefCell::new(SlotMap::with_key()),
                order: RefCell::new(Vec::new()),
                notifying: Cell::new(false),
                scheduler: scheduler.clone(),
            }),
        }
    }

    pub fn read<R>(&self, f: impl FnOnce(&M) -> R) -> R {
        f(&self.inner.model.borrow())
    }

    pub fn version(&self) -> u64 {
        self.inner.version.get()
    }

    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }

    pub fn subscribe(&self, handler: impl Fn() + 'static) -> SubscriptionHandle {
        let handle = self.inner.subscribers.borrow_mut().insert(Rc::new(handler));
        self.inner.order.borrow_mut().push(handle);
        handle
    }

    /// Unknown or already removed handles are ignored.
    pub fn unsubscribe(&self, handle: SubscriptionHandle) {
        if self.inner.subscribers.borrow_mut().remove(handle).is_some() {
            self.inner.order.borrow_mut().retain(|h| *h != handle);
        }
    }

    pub fn subscriber_count(&self) -> usize {
        self.inner.subscribers.borrow().len()
    }

    /// Apply `mutate` as a write to `field`.
    ///
    /// Published fields notify subscribers before this returns. A write issued
    /// from inside one of this store's own notifications is posted to the
    /// scheduler and applied at the start of the next cycle.
    pub fn write_field(&self, field: &'static str, mutate: impl FnOnce(&mut M) + 'static) {
        if let Err(err) = self.try_write_field(field, mutate) {
            panic!("ObservableStore::write_field: {err}");
        }
    }

    pub fn try_write_field(
        &self,
        field: &'static str,
        mutate: impl FnOnce(&mut M) + 'static,
    ) -> Result<()> {
        let descriptor = lookup::<M>(field)?;

        if self.inner.notifying.get() {
            log::debug!(
                "{}.{field} written during its own notification; deferred to the next cycle",
                M::NAME
            );
            let store = self.clone();
            self.inner
                .scheduler
                .post(move || store.write_field(field, mutate));
            return Ok(());
        }

        mutate(&mut self.inner.model.borrow_mut());
        self.inner.version.set(self.inner.version.get() + 1);

        if descriptor.published {
            self.notify();
        }
        Ok(())
    }

    /// Two-way binding over one field; `set` goes through [`write_field`](Self::write_field).
    pub fn field_binding<T: 'static>(
        &self,
        field: &'static str,
        get: impl Fn(&M) -> T + 'static,
        set: impl Fn(&mut M, T) + 'static,
    ) -> Binding<T> {
        if let Err(err) = lookup::<M>(field) {
            panic!("ObservableStore::field_binding: {err}");
        }
        let reader = self.clone();
        let writer = self.clone();
        let versioned = self.clone();
        let set = Rc::new(set);
        Binding::from_parts(
            move || Ok(reader.read(&get)),
            move |value| {
                let set = set.clone();
                writer.try_write_field(field, move |m| set(m, value))
            },
            Some(Rc::new(move || versioned.version())),
        )
    }

    fn notify(&self) {
        struct Reset<'a>(&'a Cell<bool>);
        impl Drop for Reset<'_> {
            fn drop(&mut self) {
                self.0.set(false);
            }
        }

        // Exactly the subscribers present at the moment of the write.
        let handlers: Vec<Handler> = {
            let subs = self.inner.subscribers.borrow();
            self.inner
                .order
                .borrow()
                .iter()
                .filter_map(|h| subs.get(*h).cloned())
                .collect()
        };

        self.inner.notifying.set(true);
        let _reset = Reset(&self.inner.notifying);
        for handler in handlers {
            handler();
        }
    }
}

fn lookup<M: Model>(field: &'static str) -> Result<&'static FieldDescriptor> {
    M::FIELDS
        .iter()
        .find(|f| f.name == field)
        .ok_or(CoreError::UnknownField {
            model: M::NAME,
            field,
        })
}

impl<M: Model + fmt::Debug> fmt::Debug for ObservableStore<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ObservableStore")
            .field("model", &*self.inner.model.borrow())
            .field("version", &self.inner.version.get())
            .field("subscribers", &self.subscriber_count())
            .finish()
    }
}

/// Declares a store model and an extension trait with one getter and one
/// setter per field, implemented for `ObservableStore<Model>`.
///
/// Fields marked `#[published]` notify subscribers when set.
#[macro_export]
macro_rules! observable_model {
    (@published published) => { true };
    (@published) => { false };
    (
        $(#[$meta:meta])*
        $vis:vis struct $name:ident => $ext:ident {
            $(
                $(#[$flag:ident])?
                $field:ident ( $setter:ident ) : $ty:ty = $default:expr
            ),* $(,)?
        }
    ) => {
        $(#[$meta])*
        $vis struct $name {
            $( pub $field: $ty, )*
        }

        impl ::core::default::Default for $name {
            fn default() -> Self {
                Self { $( $field: $default, )* }
            }
        }

        impl $crate::store::Model for $name {
            const NAME: &'static str = ::core::stringify!($name);
            const FIELDS: &'static [$crate::store::FieldDescriptor] = &[
                $(
                    $crate::store::FieldDescriptor {
                        name: ::core::stringify!($field),
                        published: $crate::observable_model!(@published $($flag)?),
                    },
                )*
            ];
        }

        $vis trait $ext {
            $(
                fn $field(&self) -> $ty;
                fn $setter(&self, value: $ty);
            )*
        }

        impl $ext for $crate::store::ObservableStore<$name> {
            $(
                fn $field(&self) -> $ty {
                    self.read(|m| ::core::clone::Clone::clone(&m.$field))
                }

                fn $setter(&self, value: $ty) {
                    self.write_field(::core::stringify!($field), move |m| m.$field = value);
                }
            )*
        }
    };
}
