//! Bridges an imperatively driven paging widget into bindings.
//!
//! The widget keeps its own notion of the visible page. A
//! [`PageCoordinator`] owns it, exposes the selection as a
//! `Binding<usize>`, and after every commit pushes the bound selection into
//! the widget. When the user swipes, the widget reports back through
//! [`PageCoordinator::did_finish_paging`], which writes the binding like any
//! other host event.

use std::cell::{Cell, Ref, RefCell, RefMut};

use tether_core::prelude::*;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum PageDirection {
    Forward,
    Reverse,
}

/// The externally owned paging widget.
pub trait PageController {
    fn page_count(&self) -> usize;
    fn show_page(&mut self, index: usize, direction: PageDirection, animated: bool);
}

struct Page {
    /// Disposed with the coordinator, so per-page state goes away with it.
    scope: Scope,
}

pub struct PageCoordinator<C: PageController> {
    controller: RefCell<C>,
    selection: Binding<usize>,
    pages: Vec<Page>,
    shown: Cell<Option<usize>>,
}

impl<C: PageController> PageCoordinator<C> {
    /// Pages get child scopes of `host`, one per controller page.
    pub fn new(host: &Scope, controller: C, selection: Binding<usize>) -> Self {
        let pages = (0..controller.page_count())
            .map(|_| Page {
                scope: host.child(),
            })
            .collect();
        Self {
            controller: RefCell::new(controller),
            selection,
            pages,
            shown: Cell::new(None),
        }
    }

    pub fn selection(&self) -> Binding<usize> {
        self.selection.clone()
    }

    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    pub fn page_scope(&self, index: usize) -> Option<&Scope> {
        self.pages.get(index).map(|p| &p.scope)
    }

    pub fn shown(&self) -> Option<usize> {
        self.shown.get()
    }

    pub fn controller(&self) -> Ref<'_, C> {
        self.controller.borrow()
    }

    pub fn controller_mut(&self) -> RefMut<'_, C> {
        self.controller.borrow_mut()
    }

    /// Forward a commit into the widget. The first page is shown without
    /// animation; later changes animate. An out-of-range selection is clamped
    /// for display and left untouched in the binding.
    pub fn update(&self, commit: &Commit) {
        let count = self.page_count();
        if count == 0 {
            return;
        }
        let selected = self.selection.get();
        let target = selected.min(count - 1);
        if target != selected {
            log::warn!(
                "page selection {selected} out of range for {count} pages; showing {target}"
            );
        }

        let shown = self.shown.get();
        if shown == Some(target) {
            return;
        }
        let direction = match shown {
            Some(prev) if target < prev => PageDirection::Reverse,
            _ => PageDirection::Forward,
        };
        let animated = shown.is_some();
        log::debug!(
            "commit #{}: paging to {target} ({direction:?}, animated: {animated})",
            commit.id
        );
        self.controller
            .borrow_mut()
            .show_page(target, direction, animated);
        self.shown.set(Some(target));
    }

    /// The widget settled on `index` after user interaction.
    pub fn did_finish_paging(&self, index: usize) {
        if index >= self.page_count() {
            log::warn!("widget reported page {index} of {}; ignored", self.page_count());
            return;
        }
        self.shown.set(Some(index));
        if self.selection.get() != index {
            self.selection.set(index);
        }
    }

    pub fn dispose(self) {
        for page in self.pages {
            page.scope.dispose();
        }
    }
}

/// Page dots over the same selection binding.
#[derive(Clone, Debug)]
pub struct PageIndicator {
    count: usize,
    selection: Binding<usize>,
}

impl PageIndicator {
    pub fn new(count: usize, selection: Binding<usize>) -> Self {
        Self { count, selection }
    }

    pub fn count(&self) -> usize {
        self.count
    }

    pub fn current(&self) -> usize {
        self.selection.get()
    }

    /// Taps outside the dot range are ignored.
    pub fn select(&self, index: usize) {
        if index < self.count && index != self.current() {
            self.selection.set(index);
        }
    }

    pub fn advance(&self) {
        if self.count > 0 {
            self.select((self.current() + 1).min(self.count - 1));
        }
    }

    pub fn retreat(&self) {
        self.select(self.current().saturating_sub(1));
    }

    pub fn dots(&self) -> Vec<bool> {
        let current = self.current();
        (0..self.count).map(|i| i == current).collect()
    }
}
