//! Animated transactions.
//!
//! Writes issued inside [`with_animation`] tag the pending commit with a
//! transition; the scheduler hands that transition to the renderer together
//! with the dirty scopes.

use std::cell::RefCell;
use std::rc::Rc;

use crate::transition::TransitionSpec;

thread_local! {
    static TRANSACTIONS: RefCell<Vec<Option<TransactionAnimation>>> =
        const { RefCell::new(Vec::new()) };
}

#[derive(Clone, Debug, PartialEq)]
pub enum TransactionAnimation {
    /// Resolved by the scheduler from `SchedulerConfig::default_animation`.
    Default,
    Transition(Rc<TransitionSpec>),
}

/// Run `f` so that every write inside it animates the next commit with `transition`.
pub fn with_animation<R>(transition: impl Into<TransitionSpec>, f: impl FnOnce() -> R) -> R {
    with_transaction(
        Some(TransactionAnimation::Transition(Rc::new(transition.into()))),
        f,
    )
}

/// Like [`with_animation`], using the scheduler's default animation.
pub fn with_default_animation<R>(f: impl FnOnce() -> R) -> R {
    with_transaction(Some(TransactionAnimation::Default), f)
}

/// Writes inside `f` carry no animation, even inside an animated transaction.
pub fn without_animation<R>(f: impl FnOnce() -> R) -> R {
    with_transaction(None, f)
}

pub(crate) fn with_transaction<R>(
    animation: Option<TransactionAnimation>,
    f: impl FnOnce() -> R,
) -> R {
    // Pops on unwind too
    struct Guard;
    impl Drop for Guard {
        fn drop(&mut self) {
            TRANSACTIONS.with(|st| {
                st.borrow_mut().pop();
            });
        }
    }
    TRANSACTIONS.with(|st| st.borrow_mut().push(animation));
    let _guard = Guard;
    f()
}

/// Animation of the innermost open transaction, if any.
pub(crate) fn current_animation() -> Option<TransactionAnimation> {
    TRANSACTIONS.with(|st| st.borrow().last().cloned().flatten())
}
