use crate::scope::ScopeId;

/// Programming errors surfaced by the reactive core.
///
/// None of these are transient: the panicking accessors (`read`, `get`,
/// `resolve`) raise them immediately, the `try_` variants hand them back.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum CoreError {
    #[error("no value for environment key `{key}` and no default is registered")]
    MissingEnvironmentValue { key: &'static str },

    #[error("no environment object `{type_name}` was installed above this subtree")]
    MissingEnvironmentObject { type_name: &'static str },

    #[error("scope {0:?} was disposed; its state can no longer be used")]
    ScopeDisposed(ScopeId),

    #[error("a default for environment key `{key}` is already registered")]
    DefaultAlreadyRegistered { key: &'static str },

    #[error("model `{model}` has no field named `{field}`")]
    UnknownField {
        model: &'static str,
        field: &'static str,
    },
}

pub type Result<T, E = CoreError> = std::result::Result<T, E>;
