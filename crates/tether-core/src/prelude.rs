pub use crate::animation::{
    AnimatedValue, AnimationSpec, Clock, Easing, Interpolate, SystemClock, TestClock, reset_clock,
    set_clock,
};
pub use crate::binding::Binding;
pub use crate::environment::{
    ColorScheme, EnvironmentKey, EnvironmentRegistry, IsEnabled, Locale, PresentationMode,
    SizeCategory, TextDirection, register_default,
};
pub use crate::error::{CoreError, Result};
pub use crate::runtime::{ChangeScheduler, Commit, DirtyScopes, Phase, Renderer, SchedulerConfig};
pub use crate::scope::{Scope, ScopeId};
pub use crate::state::StateCell;
pub use crate::store::{FieldDescriptor, Model, ObservableStore, SubscriptionHandle};
pub use crate::transaction::{with_animation, with_default_animation, without_animation};
pub use crate::transition::{
    ActiveTransition, Channels, Edge, Effect, EffectState, Extent, TransitionPhase, TransitionSpec,
    TreeDiff,
};
