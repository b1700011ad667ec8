//! # State, Bindings, and Commits
//!
//! Tether is the reactive core behind a declarative view layer. View
//! descriptions are rebuilt from state; this crate decides *when* that
//! happens and *what* state they see. The pieces:
//!
//! - `StateCell<T>`: a value slot owned by a view `Scope`.
//! - `Binding<T>`: a two-way accessor handed to child views.
//! - `ObservableStore<M>`: a shared model that publishes changes.
//! - `EnvironmentRegistry`: ambient values with subtree-local overrides.
//! - `ChangeScheduler`: turns all writes of a cycle into one `Commit`.
//! - `TransitionSpec`: insertion/removal effects for animated commits.
//!
//! ## Cells and bindings
//!
//! ```rust
//! use tether_core::prelude::*;
//!
//! let scheduler = ChangeScheduler::new();
//! let scope = scheduler.root_scope();
//!
//! let is_on = scope.state(false);
//! let toggle = is_on.binding(); // passed down to a child view
//!
//! scheduler.dispatch(|| toggle.toggle());
//! assert!(is_on.read());
//! assert_eq!(scheduler.commit_count(), 1);
//! ```
//!
//! ## Coalescing
//!
//! Writes never render synchronously. They mark their scope dirty, and the
//! scheduler commits once when the processing cycle ends:
//!
//! ```rust
//! use std::cell::RefCell;
//! use std::rc::Rc;
//! use tether_core::prelude::*;
//!
//! let scheduler = ChangeScheduler::new();
//! let scope = scheduler.root_scope();
//! let flag = scope.state(false);
//!
//! let seen = Rc::new(RefCell::new(Vec::new()));
//! scheduler.set_renderer({
//!     let seen = seen.clone();
//!     let flag = flag.clone();
//!     move |_: &Commit| seen.borrow_mut().push(flag.read())
//! });
//!
//! scheduler.dispatch(|| {
//!     flag.write(true);
//!     flag.write(false);
//! });
//! assert_eq!(*seen.borrow(), vec![false]);
//! ```
//!
//! ## Animated commits
//!
//! Wrap writes in `with_animation` (or bind through `Binding::animation`)
//! and the commit carries the transition for the renderer to apply to the
//! inserted and removed views.
//!
//! Everything here is single-threaded: handles are `Rc`-based, and timers or
//! other async completions must come back through `ChangeScheduler::post`.

pub mod animation;
pub mod binding;
pub mod environment;
pub mod error;
pub mod prelude;
pub mod runtime;
pub mod scope;
pub mod state;
pub mod store;
pub mod tests;
pub mod transaction;
pub mod transition;

pub use binding::*;
pub use environment::*;
pub use error::*;
pub use prelude::*;
pub use runtime::*;
pub use scope::*;
pub use state::*;
pub use store::*;
pub use transaction::*;
pub use transition::*;
