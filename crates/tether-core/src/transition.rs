//! Insertion/removal transitions applied by animated commits.
//!
//! A [`TransitionSpec`] holds two ordered effect chains and a timing curve.
//! Composition appends insertion effects in order and prepends removal
//! effects, so a removal unwinds the insertion:
//!
//! ```rust
//! use tether_core::prelude::*;
//!
//! let insertion = TransitionSpec::move_edge(Edge::Trailing)
//!     .compose(&TransitionSpec::scale())
//!     .compose(&TransitionSpec::opacity());
//! let removal = TransitionSpec::scale().compose(&TransitionSpec::opacity());
//! let slide_in_fade_out = TransitionSpec::asymmetric(&insertion, &removal);
//!
//! let settled = slide_in_fade_out.resolve(
//!     TransitionPhase::Insertion,
//!     1.0,
//!     Extent::new(100.0, 40.0),
//! );
//! assert!(settled.is_identity());
//! ```

use std::collections::HashSet;
use std::hash::Hash;
use std::rc::Rc;

use bitflags::bitflags;
use smallvec::SmallVec;
use web_time::Instant;

use crate::animation::{AnimationSpec, Interpolate, now};

bitflags! {
    /// Visual channels an effect writes to.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
    pub struct Channels: u8 {
        const OPACITY = 1;
        const SCALE = 1 << 1;
        const OFFSET = 1 << 2;
        const ROTATION = 1 << 3;
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Edge {
    Leading,
    Trailing,
    Top,
    Bottom,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Effect {
    Opacity,
    Scale { from: f32 },
    Move { edge: Edge },
    Offset { dx: f32, dy: f32 },
    Rotation { degrees: f32 },
}

impl Effect {
    pub fn channels(&self) -> Channels {
        match self {
            Effect::Opacity => Channels::OPACITY,
            Effect::Scale { .. } => Channels::SCALE,
            Effect::Move { .. } | Effect::Offset { .. } => Channels::OFFSET,
            Effect::Rotation { .. } => Channels::ROTATION,
        }
    }

    /// Fold this effect into `state`. `visibility` is 0 off-stage, 1 at rest.
    fn apply(&self, visibility: f32, extent: Extent, state: &mut EffectState) {
        let hidden = 1.0 - visibility;
        match *self {
            Effect::Opacity => state.opacity *= visibility,
            Effect::Scale { from } => state.scale *= from.interpolate(&1.0, visibility),
            Effect::Move { edge } => {
                let (dx, dy) = match edge {
                    Edge::Leading => (-extent.width, 0.0),
                    Edge::Trailing => (extent.width, 0.0),
                    Edge::Top => (0.0, -extent.height),
                    Edge::Bottom => (0.0, extent.height),
                };
                state.dx += dx * hidden;
                state.dy += dy * hidden;
            }
            Effect::Offset { dx, dy } => {
                state.dx += dx * hidden;
                state.dy += dy * hidden;
            }
            Effect::Rotation { degrees } => state.rotation += degrees * hidden,
        }
    }
}

/// Size of the view being transitioned; edge moves travel this far.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Extent {
    pub width: f32,
    pub height: f32,
}

impl Extent {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }
}

/// Resolved visual state of a transitioning view.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EffectState {
    pub opacity: f32,
    pub scale: f32,
    pub dx: f32,
    pub dy: f32,
    pub rotation: f32,
}

impl EffectState {
    pub const IDENTITY: EffectState = EffectState {
        opacity: 1.0,
        scale: 1.0,
        dx: 0.0,
        dy: 0.0,
        rotation: 0.0,
    };

    pub fn is_identity(&self) -> bool {
        const EPS: f32 = 1e-4;
        (self.opacity - 1.0).abs() < EPS
            && (self.scale - 1.0).abs() < EPS
            && self.dx.abs() < EPS
            && self.dy.abs() < EPS
            && self.rotation.abs() < EPS
    }
}

impl Default for EffectState {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Interpolate for EffectState {
    fn interpolate(&self, other: &Self, t: f32) -> Self {
        Self {
            opacity: self.opacity.interpolate(&other.opacity, t),
            scale: self.scale.interpolate(&other.scale, t),
            dx: self.dx.interpolate(&other.dx, t),
            dy: self.dy.interpolate(&other.dy, t),
            rotation: self.rotation.interpolate(&other.rotation, t),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TransitionPhase {
    Insertion,
    Removal,
}

type EffectChain = SmallVec<[Effect; 4]>;

/// How a view's appearance and removal are interpolated. Immutable once built.
#[derive(Clone, Debug, PartialEq)]
pub struct TransitionSpec {
    insertion: EffectChain,
    removal: EffectChain,
    timing: AnimationSpec,
}

impl Default for TransitionSpec {
    fn default() -> Self {
        Self::opacity()
    }
}

impl From<AnimationSpec> for TransitionSpec {
    fn from(timing: AnimationSpec) -> Self {
        Self::opacity().animation(timing)
    }
}

impl TransitionSpec {
    fn symmetric(effect: Effect) -> Self {
        let mut chain = EffectChain::new();
        chain.push(effect);
        Self {
            insertion: chain.clone(),
            removal: chain,
            timing: AnimationSpec::default(),
        }
    }

    /// Appears and disappears without any effect.
    pub fn identity() -> Self {
        Self {
            insertion: EffectChain::new(),
            removal: EffectChain::new(),
            timing: AnimationSpec::default(),
        }
    }

    pub fn opacity() -> Self {
        Self::symmetric(Effect::Opacity)
    }

    pub fn scale() -> Self {
        Self::scale_from(0.0)
    }

    pub fn scale_from(from: f32) -> Self {
        Self::symmetric(Effect::Scale { from })
    }

    pub fn move_edge(edge: Edge) -> Self {
        Self::symmetric(Effect::Move { edge })
    }

    pub fn offset(dx: f32, dy: f32) -> Self {
        Self::symmetric(Effect::Offset { dx, dy })
    }

    pub fn rotation(degrees: f32) -> Self {
        Self::symmetric(Effect::Rotation { degrees })
    }

    /// In from the leading edge, out through the trailing edge.
    pub fn slide() -> Self {
        Self::asymmetric(
            &Self::move_edge(Edge::Leading),
            &Self::move_edge(Edge::Trailing),
        )
    }

    /// Insertion behaviour of `insertion`, removal behaviour of `removal`,
    /// timing of `insertion`.
    pub fn asymmetric(insertion: &TransitionSpec, removal: &TransitionSpec) -> Self {
        Self {
            insertion: insertion.insertion.clone(),
            removal: removal.removal.clone(),
            timing: insertion.timing,
        }
    }

    /// `self` then `other` on insertion, `other` then `self` on removal.
    /// Effects sharing a channel are applied one after the other.
    pub fn compose(&self, other: &TransitionSpec) -> Self {
        let overlap = self.channels() & other.channels();
        if !overlap.is_empty() {
            log::debug!("composed transitions share channels {overlap:?}; applying independently");
        }
        let mut insertion = self.insertion.clone();
        insertion.extend(other.insertion.iter().copied());
        let mut removal = other.removal.clone();
        removal.extend(self.removal.iter().copied());
        Self {
            insertion,
            removal,
            timing: self.timing,
        }
    }

    pub fn animation(mut self, timing: AnimationSpec) -> Self {
        self.timing = timing;
        self
    }

    pub fn timing(&self) -> &AnimationSpec {
        &self.timing
    }

    pub fn effects(&self, phase: TransitionPhase) -> &[Effect] {
        match phase {
            TransitionPhase::Insertion => &self.insertion,
            TransitionPhase::Removal => &self.removal,
        }
    }

    pub fn channels(&self) -> Channels {
        self.insertion
            .iter()
            .chain(self.removal.iter())
            .fold(Channels::empty(), |acc, e| acc | e.channels())
    }

    /// Visual state at linear time `progress` (0..=1) through `phase`.
    pub fn resolve(&self, phase: TransitionPhase, progress: f32, extent: Extent) -> EffectState {
        let t = progress.clamp(0.0, 1.0);
        let eased = if t >= 1.0 {
            1.0
        } else {
            self.timing.easing.interpolate(t)
        };
        let visibility = match phase {
            TransitionPhase::Insertion => eased,
            TransitionPhase::Removal => 1.0 - eased,
        };
        let mut state = EffectState::IDENTITY;
        for effect in self.effects(phase) {
            effect.apply(visibility, extent, &mut state);
        }
        state
    }
}

/// Keys inserted into and removed from a view tree by one commit.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TreeDiff<K> {
    pub inserted: Vec<K>,
    pub removed: Vec<K>,
    pub retained: Vec<K>,
}

impl<K: Clone + Eq + Hash> TreeDiff<K> {
    /// Order of `inserted`/`retained` follows `new`, `removed` follows `old`.
    pub fn between(old: &[K], new: &[K]) -> Self {
        let old_set: HashSet<&K> = old.iter().collect();
        let new_set: HashSet<&K> = new.iter().collect();
        let (retained, inserted): (Vec<K>, Vec<K>) =
            new.iter().cloned().partition(|k| old_set.contains(k));
        let removed = old
            .iter()
            .filter(|k| !new_set.contains(k))
            .cloned()
            .collect();
        Self {
            inserted,
            removed,
            retained,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.inserted.is_empty() && self.removed.is_empty()
    }

    /// Start `spec` for every inserted and removed key, stamped with the current clock.
    pub fn transitions(&self, spec: &Rc<TransitionSpec>) -> Vec<ActiveTransition<K>> {
        let inserted = self
            .inserted
            .iter()
            .map(|k| ActiveTransition::start(k.clone(), TransitionPhase::Insertion, spec.clone()));
        let removed = self
            .removed
            .iter()
            .map(|k| ActiveTransition::start(k.clone(), TransitionPhase::Removal, spec.clone()));
        inserted.chain(removed).collect()
    }
}

/// A running transition for one view.
#[derive(Clone, Debug)]
pub struct ActiveTransition<K> {
    pub key: K,
    pub phase: TransitionPhase,
    spec: Rc<TransitionSpec>,
    started: Instant,
}

impl<K> ActiveTransition<K> {
    pub fn start(key: K, phase: TransitionPhase, spec: Rc<TransitionSpec>) -> Self {
        Self {
            key,
            phase,
            spec,
            started: now(),
        }
    }

    pub fn spec(&self) -> &TransitionSpec {
        &self.spec
    }

    pub fn progress(&self) -> f32 {
        let elapsed = now().saturating_duration_since(self.started);
        self.spec.timing().fraction_at(elapsed)
    }

    pub fn is_finished(&self) -> bool {
        let elapsed = now().saturating_duration_since(self.started);
        self.spec.timing().is_finished_at(elapsed)
    }

    pub fn sample(&self, extent: Extent) -> EffectState {
        self.spec.resolve(self.phase, self.progress(), extent)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::animation::{Easing, TestClock, reset_clock, set_clock};
    use web_time::Duration;

    fn linear(spec: TransitionSpec) -> TransitionSpec {
        spec.animation(AnimationSpec::tween(Duration::from_millis(100), Easing::Linear))
    }

    #[test]
    fn compose_orders_insertion_forward_and_removal_backward() {
        let spec = TransitionSpec::opacity().compose(&TransitionSpec::scale());
        assert_eq!(
            spec.effects(TransitionPhase::Insertion),
            &[Effect::Opacity, Effect::Scale { from: 0.0 }]
        );
        assert_eq!(
            spec.effects(TransitionPhase::Removal),
            &[Effect::Scale { from: 0.0 }, Effect::Opacity]
        );
    }

    #[test]
    fn asymmetric_keeps_each_side() {
        let spec = TransitionSpec::asymmetric(
            &TransitionSpec::move_edge(Edge::Trailing),
            &TransitionSpec::opacity(),
        );
        assert_eq!(
            spec.effects(TransitionPhase::Insertion),
            &[Effect::Move { edge: Edge::Trailing }]
        );
        assert_eq!(spec.effects(TransitionPhase::Removal), &[Effect::Opacity]);
        assert_eq!(spec.channels(), Channels::OFFSET | Channels::OPACITY);
    }

    #[test]
    fn insertion_starts_off_stage_and_settles_at_identity() {
        let spec =
            linear(TransitionSpec::move_edge(Edge::Trailing).compose(&TransitionSpec::opacity()));
        let extent = Extent::new(200.0, 50.0);

        let start = spec.resolve(TransitionPhase::Insertion, 0.0, extent);
        assert_eq!(start.dx, 200.0);
        assert_eq!(start.opacity, 0.0);

        let mid = spec.resolve(TransitionPhase::Insertion, 0.5, extent);
        assert!((mid.dx - 100.0).abs() < 1e-3);
        assert!((mid.opacity - 0.5).abs() < 1e-3);

        assert!(spec.resolve(TransitionPhase::Insertion, 1.0, extent).is_identity());
    }

    #[test]
    fn removal_ends_hidden() {
        let spec = linear(TransitionSpec::scale().compose(&TransitionSpec::opacity()));
        let end = spec.resolve(TransitionPhase::Removal, 1.0, Extent::default());
        assert_eq!(end.scale, 0.0);
        assert_eq!(end.opacity, 0.0);
        assert!(spec.resolve(TransitionPhase::Removal, 0.0, Extent::default()).is_identity());
    }

    #[test]
    fn overlapping_channels_accumulate() {
        let spec =
            linear(TransitionSpec::offset(10.0, 0.0).compose(&TransitionSpec::offset(5.0, 2.0)));
        let start = spec.resolve(TransitionPhase::Insertion, 0.0, Extent::default());
        assert_eq!((start.dx, start.dy), (15.0, 2.0));
    }

    #[test]
    fn diff_splits_keys() {
        let diff = TreeDiff::between(&["a", "b", "c"], &["b", "d", "a"]);
        assert_eq!(diff.inserted, vec!["d"]);
        assert_eq!(diff.removed, vec!["c"]);
        assert_eq!(diff.retained, vec!["b", "a"]);
        assert!(TreeDiff::between(&[1, 2], &[2, 1]).is_empty());
    }

    #[test]
    fn active_transition_follows_the_clock() {
        let clock = TestClock::new(Instant::now());
        set_clock(clock.clone());

        let spec = Rc::new(linear(TransitionSpec::opacity()));
        let diff = TreeDiff::between(&["old"], &["new"]);
        let running = diff.transitions(&spec);
        assert_eq!(running.len(), 2);

        clock.advance(Duration::from_millis(25));
        let inserting = &running[0];
        assert_eq!(inserting.key, "new");
        assert!((inserting.sample(Extent::default()).opacity - 0.25).abs() < 1e-3);
        let removing = &running[1];
        assert!((removing.sample(Extent::default()).opacity - 0.75).abs() < 1e-3);

        clock.advance(Duration::from_millis(100));
        assert!(running.iter().all(ActiveTransition::is_finished));
        reset_clock();
    }
}
