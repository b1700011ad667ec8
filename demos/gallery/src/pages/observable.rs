use std::cell::Cell;
use std::rc::Rc;

use tether_core::observable_model;
use tether_core::prelude::*;

use crate::view::*;

observable_model! {
    #[derive(Debug)]
    pub struct Switchboard => SwitchboardStore {
        #[published]
        value(set_value): bool = false,
        taps(set_taps): u32 = 0,
    }
}

/// Toggles the store's published flag and bumps an unpublished counter.
pub fn update_value(store: &ObservableStore<Switchboard>) {
    store.set_taps(store.taps() + 1);
    store.set_value(!store.value());
}

/// A view observing a shared store; any published change redraws it.
pub struct ObservableScreen {
    scope: Scope,
    store: ObservableStore<Switchboard>,
    notifications: Rc<Cell<u32>>,
}

impl ObservableScreen {
    pub fn new(parent: &Scope, store: ObservableStore<Switchboard>) -> Self {
        let scope = parent.child();
        scope.observe(&store);

        let notifications = Rc::new(Cell::new(0));
        let handle = store.subscribe({
            let notifications = notifications.clone();
            move || notifications.set(notifications.get() + 1)
        });
        scope.add_disposer({
            let store = store.clone();
            move || store.unsubscribe(handle)
        });

        Self {
            scope,
            store,
            notifications,
        }
    }

    pub fn scope(&self) -> &Scope {
        &self.scope
    }

    pub fn store(&self) -> &ObservableStore<Switchboard> {
        &self.store
    }

    pub fn notifications(&self) -> u32 {
        self.notifications.get()
    }

    pub fn tap(&self) {
        update_value(&self.store);
    }

    pub fn view(&self) -> View {
        let value = self.store.value();
        Section("observable", "Observable store")
            .child(Toggle("observable.value", "Value", value))
            .child(Text(
                "observable.summary",
                format!("{} after {} taps", value, self.store.taps()),
            ))
            .child(Button("observable.update", "Update value"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_published_writes_notify() {
        let scheduler = ChangeScheduler::new();
        let root = scheduler.root_scope();
        let store = ObservableStore::new(&scheduler, Switchboard::default());
        let screen = ObservableScreen::new(&root, store.clone());

        scheduler.dispatch(|| screen.tap());
        assert!(store.value());
        assert_eq!(store.taps(), 1);
        assert_eq!(screen.notifications(), 1);

        scheduler.dispatch(|| store.set_taps(10));
        assert_eq!(screen.notifications(), 1);
    }

    #[test]
    fn disposing_the_screen_drops_its_subscriptions() {
        let scheduler = ChangeScheduler::new();
        let root = scheduler.root_scope();
        let store = ObservableStore::new(&scheduler, Switchboard::default());
        let screen = ObservableScreen::new(&root, store.clone());
        assert_eq!(store.subscriber_count(), 2);

        screen.scope().clone().dispose();
        assert_eq!(store.subscriber_count(), 0);
    }
}
