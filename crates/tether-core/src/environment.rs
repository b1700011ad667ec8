//! # Environment values
//!
//! An [`EnvironmentRegistry`] is passed down the render call. Each
//! [`with_override`](EnvironmentRegistry::with_override) returns a child
//! registry for one subtree; the parent and any sibling subtree never see it.
//!
//! Lookups walk from the innermost override outwards, then fall back to a
//! default registered at startup with [`register_default`], then to the
//! key's declared [`EnvironmentKey::default_value`]. A key with none of those
//! is a programming error and [`resolve`](EnvironmentRegistry::resolve)
//! panics.
//!
//! ```rust
//! use tether_core::prelude::*;
//!
//! let root = EnvironmentRegistry::new().with_override(Locale::new("en"));
//! let subtree = root.with_override(Locale::new("pt"));
//!
//! assert_eq!(subtree.resolve::<Locale>(), Locale::new("pt"));
//! assert_eq!(root.resolve::<Locale>(), Locale::new("en"));
//! ```

use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::rc::Rc;
use std::sync::LazyLock;

use parking_lot::RwLock;

use crate::binding::Binding;
use crate::error::{CoreError, Result};
use crate::store::{Model, ObservableStore};

/// A type usable as an environment key; the type is both key and value.
pub trait EnvironmentKey: Clone + 'static {
    fn default_value() -> Option<Self> {
        None
    }
}

type DefaultTable = HashMap<TypeId, Box<dyn Any + Send + Sync>>;

static DEFAULTS: LazyLock<RwLock<DefaultTable>> = LazyLock::new(|| RwLock::new(HashMap::new()));

/// Register the process-wide default for `K`. Meant to run once at startup;
/// a second registration for the same key is rejected.
pub fn register_default<K: EnvironmentKey + Send + Sync>(value: K) -> Result<()> {
    let mut table = DEFAULTS.write();
    let key = TypeId::of::<K>();
    if table.contains_key(&key) {
        return Err(CoreError::DefaultAlreadyRegistered {
            key: std::any::type_name::<K>(),
        });
    }
    table.insert(key, Box::new(value));
    Ok(())
}

fn registered_default<K: EnvironmentKey>() -> Option<K> {
    DEFAULTS
        .read()
        .get(&TypeId::of::<K>())
        .and_then(|v| v.downcast_ref::<K>())
        .cloned()
}

struct Frame {
    parent: Option<Rc<Frame>>,
    key: TypeId,
    value: Rc<dyn Any>,
}

/// Scoped, type-keyed table of ambient values.
#[derive(Clone, Default)]
pub struct EnvironmentRegistry {
    top: Option<Rc<Frame>>,
}

impl EnvironmentRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Child registry for one subtree, with `value` overriding `K`.
    pub fn with_override<K: EnvironmentKey>(&self, value: K) -> Self {
        self.push(TypeId::of::<K>(), Rc::new(value))
    }

    /// Child registry carrying `store` as an environment object.
    pub fn with_object<M: Model>(&self, store: ObservableStore<M>) -> Self {
        self.push(TypeId::of::<ObservableStore<M>>(), Rc::new(store))
    }

    fn push(&self, key: TypeId, value: Rc<dyn Any>) -> Self {
        Self {
            top: Some(Rc::new(Frame {
                parent: self.top.clone(),
                key,
                value,
            })),
        }
    }

    fn lookup<T: 'static>(&self) -> Option<T>
    where
        T: Clone,
    {
        let key = TypeId::of::<T>();
        let mut frame = self.top.as_deref();
        while let Some(f) = frame {
            if f.key == key
                && let Some(v) = f.value.downcast_ref::<T>()
            {
                return Some(v.clone());
            }
            frame = f.parent.as_deref();
        }
        None
    }

    pub fn resolve<K: EnvironmentKey>(&self) -> K {
        match self.try_resolve::<K>() {
            Ok(v) => v,
            Err(err) => panic!("EnvironmentRegistry::resolve: {err}"),
        }
    }

    pub fn try_resolve<K: EnvironmentKey>(&self) -> Result<K> {
        self.lookup::<K>()
            .or_else(registered_default::<K>)
            .or_else(K::default_value)
            .ok_or(CoreError::MissingEnvironmentValue {
                key: std::any::type_name::<K>(),
            })
    }

    /// Whether `K` is overridden somewhere up this chain (defaults ignored).
    pub fn is_overridden<K: EnvironmentKey>(&self) -> bool {
        self.lookup::<K>().is_some()
    }

    pub fn object<M: Model>(&self) -> ObservableStore<M> {
        match self.try_object::<M>() {
            Ok(store) => store,
            Err(err) => panic!("EnvironmentRegistry::object: {err}"),
        }
    }

    pub fn try_object<M: Model>(&self) -> Result<ObservableStore<M>> {
        self.lookup::<ObservableStore<M>>()
            .ok_or(CoreError::MissingEnvironmentObject {
                type_name: M::NAME,
            })
    }

    /// Number of overrides between this registry and the root.
    pub fn depth(&self) -> usize {
        let mut depth = 0;
        let mut frame = self.top.as_deref();
        while let Some(f) = frame {
            depth += 1;
            frame = f.parent.as_deref();
        }
        depth
    }
}

impl std::fmt::Debug for EnvironmentRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EnvironmentRegistry")
            .field("depth", &self.depth())
            .finish()
    }
}

// Built-in keys

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Locale(pub String);

impl Locale {
    pub fn new(identifier: impl Into<String>) -> Self {
        Self(identifier.into())
    }

    pub fn identifier(&self) -> &str {
        &self.0
    }
}

impl EnvironmentKey for Locale {
    fn default_value() -> Option<Self> {
        Some(Locale::new("en_US"))
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum ColorScheme {
    #[default]
    Light,
    Dark,
}

impl EnvironmentKey for ColorScheme {
    fn default_value() -> Option<Self> {
        Some(Self::default())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Default)]
pub enum SizeCategory {
    Small,
    Medium,
    #[default]
    Large,
    ExtraLarge,
    Accessibility,
}

impl EnvironmentKey for SizeCategory {
    fn default_value() -> Option<Self> {
        Some(Self::default())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct IsEnabled(pub bool);

impl EnvironmentKey for IsEnabled {
    fn default_value() -> Option<Self> {
        Some(IsEnabled(true))
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum TextDirection {
    #[default]
    Ltr,
    Rtl,
}

impl EnvironmentKey for TextDirection {
    fn default_value() -> Option<Self> {
        Some(Self::default())
    }
}

/// Installed by whoever presents a modal subtree; there is no default.
#[derive(Clone, Debug)]
pub struct PresentationMode {
    is_presented: Binding<bool>,
}

impl PresentationMode {
    pub fn new(is_presented: Binding<bool>) -> Self {
        Self { is_presented }
    }

    pub fn is_presented(&self) -> bool {
        self.is_presented.get()
    }

    pub fn dismiss(&self) {
        if self.is_presented.get() {
            self.is_presented.set(false);
        }
    }
}

impl EnvironmentKey for PresentationMode {}
