use tether_core::prelude::*;

use crate::pages::observable::{Switchboard, SwitchboardStore};
use crate::view::*;

/// Reads ambient values and presents a sheet that dismisses itself through
/// the environment.
pub struct EnvironmentScreen {
    scope: Scope,
    env: EnvironmentRegistry,
    presented: StateCell<bool>,
}

impl EnvironmentScreen {
    pub fn new(parent: &Scope, env: EnvironmentRegistry) -> Self {
        let scope = parent.child();
        let presented = scope.state(false);
        Self {
            scope,
            env,
            presented,
        }
    }

    pub fn scope(&self) -> &Scope {
        &self.scope
    }

    /// Sheets slide up with the default animation.
    pub fn present(&self) {
        with_default_animation(|| self.presented.write(true));
    }

    pub fn is_presented(&self) -> bool {
        self.presented.read()
    }

    /// The registry the sheet is built with.
    pub fn sheet_env(&self) -> EnvironmentRegistry {
        self.env
            .with_override(PresentationMode::new(self.presented.binding()))
            .with_override(ColorScheme::Dark)
    }

    pub fn view(&self) -> View {
        let locale = self.env.resolve::<Locale>();
        let scheme = self.env.resolve::<ColorScheme>();
        let section = Section("environment", "Environment")
            .child(Text(
                "environment.locale",
                format!("Locale: {}", locale.identifier()),
            ))
            .child(Text("environment.scheme", format!("Scheme: {scheme:?}")))
            .child(Text(
                "environment.size",
                format!("Size: {:?}", self.env.resolve::<SizeCategory>()),
            ))
            .child(Text(
                "environment.object",
                format!("Shared value: {}", self.env.object::<Switchboard>().value()),
            ))
            .child(Button("environment.present", "Present sheet"));
        if self.presented.read() {
            section.child(Sheet::new(self.sheet_env()).view())
        } else {
            section
        }
    }
}

/// Content of the presented sheet. Knows nothing about who presented it.
pub struct Sheet {
    env: EnvironmentRegistry,
}

impl Sheet {
    pub fn new(env: EnvironmentRegistry) -> Self {
        Self { env }
    }

    pub fn dismiss(&self) {
        self.env.resolve::<PresentationMode>().dismiss();
    }

    pub fn view(&self) -> View {
        let scheme = self.env.resolve::<ColorScheme>();
        Section("environment.sheet", "Sheet")
            .child(Text("environment.sheet.scheme", format!("Scheme: {scheme:?}")))
            .child(Button("environment.sheet.dismiss", "Dismiss"))
            .transition(TransitionSpec::move_edge(Edge::Bottom))
    }
}
