use std::rc::Rc;

use tether_core::prelude::*;
use tether_pager::{PageController, PageCoordinator, PageDirection, PageIndicator};

use crate::view::*;

const TITLES: [&str; 3] = ["Welcome", "Bindings", "Stores"];

/// Stands in for a native paging widget; prints what it was asked to do.
#[derive(Default)]
pub struct ConsolePager {
    pub visible: Option<usize>,
    pub moves: Vec<(usize, PageDirection, bool)>,
}

impl PageController for ConsolePager {
    fn page_count(&self) -> usize {
        TITLES.len()
    }

    fn show_page(&mut self, index: usize, direction: PageDirection, animated: bool) {
        log::info!("pager: page {index} {direction:?} animated={animated}");
        self.visible = Some(index);
        self.moves.push((index, direction, animated));
    }
}

pub struct PagingScreen {
    scope: Scope,
    current: StateCell<usize>,
    coordinator: Rc<PageCoordinator<ConsolePager>>,
    indicator: PageIndicator,
}

impl PagingScreen {
    pub fn new(parent: &Scope) -> Self {
        let scope = parent.child();
        let current = scope.state(0usize);
        let coordinator = Rc::new(PageCoordinator::new(
            &scope,
            ConsolePager::default(),
            current.binding(),
        ));
        let indicator = PageIndicator::new(coordinator.page_count(), coordinator.selection());
        Self {
            scope,
            current,
            coordinator,
            indicator,
        }
    }

    pub fn scope(&self) -> &Scope {
        &self.scope
    }

    pub fn coordinator(&self) -> &Rc<PageCoordinator<ConsolePager>> {
        &self.coordinator
    }

    pub fn indicator(&self) -> &PageIndicator {
        &self.indicator
    }

    pub fn current(&self) -> usize {
        self.current.read()
    }

    /// The user swiped the widget to `index`.
    pub fn swipe_to(&self, index: usize) {
        self.coordinator.controller_mut().visible = Some(index);
        self.coordinator.did_finish_paging(index);
    }

    pub fn view(&self) -> View {
        let title = TITLES
            .get(self.current.read())
            .copied()
            .unwrap_or("?");
        Section("paging", "Pages")
            .child(Text("paging.title", title))
            .child(Dots("paging.dots", self.indicator.dots()))
    }
}
