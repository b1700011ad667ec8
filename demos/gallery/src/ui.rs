use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use tether_core::prelude::*;

use crate::view::{View, ViewKind};

/// What the renderer produced for one commit.
#[derive(Clone, Debug, PartialEq)]
pub struct Frame {
    pub commit: u64,
    pub lines: Vec<String>,
    /// Keys that started a transition in this frame.
    pub transitions: Vec<(String, TransitionPhase)>,
}

pub type Frames = Rc<RefCell<Vec<Frame>>>;

/// Rebuilds the whole tree on every commit and prints it as indented text.
///
/// On an animated commit, inserted and removed keys get the view's own
/// transition if it declares one, else the commit's. Unanimated commits swap
/// views in place, whatever the views declare.
pub struct TextRenderer {
    build: Box<dyn Fn() -> View>,
    previous: Option<View>,
    active: Vec<ActiveTransition<String>>,
    frames: Frames,
}

impl TextRenderer {
    pub fn new(build: impl Fn() -> View + 'static) -> Self {
        Self {
            build: Box::new(build),
            previous: None,
            active: Vec::new(),
            frames: Rc::new(RefCell::new(Vec::new())),
        }
    }

    pub fn frames(&self) -> Frames {
        self.frames.clone()
    }

    pub fn active(&self) -> &[ActiveTransition<String>] {
        &self.active
    }

    fn start_transitions(
        &mut self,
        tree: &View,
        commit: &Commit,
    ) -> Vec<(String, TransitionPhase)> {
        let Some(fallback) = commit.animation.clone() else {
            return Vec::new();
        };
        let old_keys = self.previous.as_ref().map(View::keys).unwrap_or_default();
        let diff = TreeDiff::between(&old_keys, &tree.keys());
        if diff.is_empty() {
            return Vec::new();
        }

        let pick = |view: Option<&View>| {
            view.and_then(|v| v.transition.clone())
                .unwrap_or_else(|| fallback.clone())
        };
        let mut started = Vec::new();
        for key in &diff.inserted {
            started.push(ActiveTransition::start(
                key.clone(),
                TransitionPhase::Insertion,
                pick(tree.find(key)),
            ));
        }
        for key in &diff.removed {
            let old = self.previous.as_ref().and_then(|p| p.find(key));
            started.push(ActiveTransition::start(
                key.clone(),
                TransitionPhase::Removal,
                pick(old),
            ));
        }

        let summary = started.iter().map(|t| (t.key.clone(), t.phase)).collect();
        // A key re-entering mid-animation restarts from its new phase.
        self.active
            .retain(|a| !started.iter().any(|s| s.key == a.key) && !a.is_finished());
        self.active.extend(started);
        summary
    }
}

impl Renderer for TextRenderer {
    fn render(&mut self, commit: &Commit) {
        let tree = (self.build)();
        let transitions = self.start_transitions(&tree, commit);
        let lines = layout(&tree);
        log::debug!(
            "frame for commit #{}: {} lines, {} transitions",
            commit.id,
            lines.len(),
            transitions.len()
        );
        self.frames.borrow_mut().push(Frame {
            commit: commit.id,
            lines,
            transitions,
        });
        self.previous = Some(tree);
    }
}

pub fn layout(tree: &View) -> Vec<String> {
    let mut lines = Vec::new();
    tree.walk(&mut |v, depth| {
        let indent = "  ".repeat(depth);
        let body = match &v.kind {
            ViewKind::Section(title) => format!("== {title} =="),
            ViewKind::Text(text) => text.clone(),
            ViewKind::Toggle { label, on } => {
                format!("[{}] {label}", if *on { "x" } else { " " })
            }
            ViewKind::Button(label) => format!("<{label}>"),
            ViewKind::Dots(dots) => dots
                .iter()
                .map(|d| if *d { "●" } else { "○" })
                .collect::<Vec<_>>()
                .join(" "),
            ViewKind::Image { name, rotation } => format!("({name} {rotation:.0}°)"),
        };
        lines.push(format!("{indent}{body}"));
    });
    lines
}

/// Last transition started per key, for inspection.
pub fn latest_phases(frames: &[Frame]) -> HashMap<String, TransitionPhase> {
    frames
        .iter()
        .flat_map(|f| f.transitions.iter().cloned())
        .collect()
}
