use tether_core::prelude::*;

use crate::view::*;

/// A toggle whose state lives here and is edited by a child through a binding.
pub struct BindingScreen {
    scope: Scope,
    is_on: StateCell<bool>,
}

/// The child only ever sees the binding.
pub struct SwitchRow {
    is_on: Binding<bool>,
}

impl SwitchRow {
    pub fn new(is_on: Binding<bool>) -> Self {
        Self { is_on }
    }

    pub fn tap(&self) {
        self.is_on.toggle();
    }

    pub fn view(&self) -> View {
        Toggle("binding.switch", "Switch", self.is_on.get())
    }
}

impl BindingScreen {
    pub fn new(parent: &Scope) -> Self {
        let scope = parent.child();
        let is_on = scope.state(false);
        Self { scope, is_on }
    }

    pub fn scope(&self) -> &Scope {
        &self.scope
    }

    pub fn is_on(&self) -> bool {
        self.is_on.read()
    }

    pub fn row(&self) -> SwitchRow {
        SwitchRow::new(self.is_on.binding())
    }

    pub fn view(&self) -> View {
        let status = if self.is_on.read() {
            "The switch is on"
        } else {
            "The switch is off"
        };
        Section("binding", "Binding")
            .child(self.row().view())
            .child(Text("binding.status", status))
    }
}
