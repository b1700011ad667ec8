use std::cell::RefCell;

use tether_core::prelude::*;

use crate::view::*;

/// Slides in from the leading edge, fades out on removal.
pub fn slide_in_fade_out() -> TransitionSpec {
    TransitionSpec::asymmetric(
        &TransitionSpec::move_edge(Edge::Leading),
        &TransitionSpec::opacity(),
    )
    .animation(AnimationSpec::fast())
}

/// A disclosure row: the detail view slides in, the chevron rotates.
pub struct AnimationScreen {
    scope: Scope,
    show_detail: StateCell<bool>,
    chevron: RefCell<AnimatedValue<f32>>,
}

impl AnimationScreen {
    pub fn new(parent: &Scope) -> Self {
        let scope = parent.child();
        let show_detail = scope.state(false);
        Self {
            scope,
            show_detail,
            chevron: RefCell::new(AnimatedValue::new(0.0, AnimationSpec::spring())),
        }
    }

    pub fn scope(&self) -> &Scope {
        &self.scope
    }

    pub fn is_showing_detail(&self) -> bool {
        self.show_detail.read()
    }

    /// The disclosure button: an animated write through the binding.
    pub fn toggle_detail(&self) {
        self.show_detail.binding().animated().toggle();
        let target = if self.show_detail.read() { 90.0 } else { 0.0 };
        self.chevron.borrow_mut().set_target(target);
    }

    /// Samples the chevron; returns `true` while it is still moving.
    pub fn tick(&self) -> bool {
        self.chevron.borrow_mut().update()
    }

    pub fn chevron_rotation(&self) -> f32 {
        *self.chevron.borrow().get()
    }

    pub fn view(&self) -> View {
        let header = Section("animation", "Animations")
            .child(Button("animation.toggle", "Show detail"))
            .child(Image("animation.chevron", "chevron", self.chevron_rotation()));
        if self.show_detail.read() {
            header.child(
                Text("animation.detail", "Details slide in and fade out")
                    .transition(slide_in_fade_out()),
            )
        } else {
            header
        }
    }
}

#[cfg(test)]
mod tests {
    use std::rc::Rc;

    use web_time::{Duration, Instant};

    use super::*;

    #[test]
    fn toggle_commits_with_the_default_animation() {
        let scheduler = ChangeScheduler::new();
        let root = scheduler.root_scope();
        let screen = AnimationScreen::new(&root);

        let animated = Rc::new(RefCell::new(Vec::new()));
        scheduler.set_renderer({
            let animated = animated.clone();
            move |commit: &Commit| animated.borrow_mut().push(commit.is_animated())
        });

        scheduler.dispatch(|| screen.toggle_detail());
        scheduler.dispatch(|| root.invalidate());
        assert_eq!(*animated.borrow(), vec![true, false]);
        assert!(screen.is_showing_detail());
    }

    #[test]
    fn chevron_follows_the_clock() {
        let clock = TestClock::new(Instant::now());
        set_clock(clock.clone());

        let scheduler = ChangeScheduler::new();
        let root = scheduler.root_scope();
        let screen = AnimationScreen::new(&root);
        scheduler.dispatch(|| screen.toggle_detail());

        assert!(screen.tick());
        clock.advance(Duration::from_secs(2));
        assert!(!screen.tick());
        assert_eq!(screen.chevron_rotation(), 90.0);

        reset_clock();
    }

    #[test]
    fn detail_insertion_and_removal_differ() {
        let spec = slide_in_fade_out();
        assert_eq!(
            spec.effects(TransitionPhase::Insertion),
            &[Effect::Move {
                edge: Edge::Leading
            }]
        );
        assert_eq!(spec.effects(TransitionPhase::Removal), &[Effect::Opacity]);
    }
}
