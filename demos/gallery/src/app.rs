use std::rc::Rc;

use tether_core::prelude::*;

use crate::pages::animation::AnimationScreen;
use crate::pages::binding::BindingScreen;
use crate::pages::environment::EnvironmentScreen;
use crate::pages::observable::{ObservableScreen, Switchboard};
use crate::pages::paging::PagingScreen;
use crate::ui::{Frames, TextRenderer};
use crate::view::*;

pub struct Screens {
    pub binding: BindingScreen,
    pub observable: ObservableScreen,
    pub environment: EnvironmentScreen,
    pub animation: AnimationScreen,
    pub paging: PagingScreen,
}

impl Screens {
    pub fn view(&self) -> View {
        Section("gallery", "Tether gallery").children([
            self.binding.view(),
            self.observable.view(),
            self.environment.view(),
            self.animation.view(),
            self.paging.view(),
        ])
    }
}

/// All demo screens under one root scope, rendered as text.
pub struct Gallery {
    pub scheduler: ChangeScheduler,
    pub root: Scope,
    pub screens: Rc<Screens>,
    frames: Frames,
}

impl Gallery {
    pub fn new(config: SchedulerConfig, env: EnvironmentRegistry) -> Self {
        let scheduler = ChangeScheduler::with_config(config);
        let root = scheduler.root_scope();

        let store = ObservableStore::new(&scheduler, Switchboard::default());
        let env = env.with_object(store.clone());
        let screens = Rc::new(Screens {
            binding: BindingScreen::new(&root),
            observable: ObservableScreen::new(&root, store),
            environment: EnvironmentScreen::new(&root, env),
            animation: AnimationScreen::new(&root),
            paging: PagingScreen::new(&root),
        });

        let mut text = TextRenderer::new({
            let screens = screens.clone();
            move || screens.view()
        });
        let frames = text.frames();
        scheduler.set_renderer({
            let screens = screens.clone();
            move |commit: &Commit| {
                text.render(commit);
                screens.paging.coordinator().update(commit);
            }
        });

        Self {
            scheduler,
            root,
            screens,
            frames,
        }
    }

    /// First frame.
    pub fn launch(&self) {
        self.scheduler.dispatch(|| self.root.invalidate());
    }

    pub fn frames(&self) -> Frames {
        self.frames.clone()
    }

    /// Schedules chevron frames until it settles, one commit per tick.
    pub fn animate_chevron(&self) {
        let screens = self.screens.clone();
        let scope = self.screens.animation.scope().clone();
        fn tick(screens: Rc<Screens>, scope: Scope) {
            if screens.animation.tick() {
                scope.invalidate();
                let scheduler = scope.scheduler().clone();
                scheduler.post(move || tick(screens, scope));
            } else {
                scope.invalidate();
            }
        }
        self.scheduler.post(move || tick(screens, scope));
    }
}
