use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

use slotmap::SlotMap;
use smallvec::SmallVec;

use crate::animation::AnimationSpec;
use crate::scope::{Scope, ScopeId};
use crate::transaction::{self, TransactionAnimation};
use crate::transition::TransitionSpec;

pub type DirtyScopes = SmallVec<[ScopeId; 8]>;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Collecting,
    Committing,
}

#[derive(Clone, Debug)]
pub struct SchedulerConfig {
    /// Upper bound on back-to-back cycles in [`ChangeScheduler::run_until_idle`].
    pub max_settle_cycles: usize,
    /// Timing used by `with_default_animation` and `Binding::animated`.
    pub default_animation: AnimationSpec,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            max_settle_cycles: 64,
            default_animation: AnimationSpec::default(),
        }
    }
}

/// One coherent re-render pass over a snapshot of dirty state.
#[derive(Clone, Debug)]
pub struct Commit {
    pub id: u64,
    pub dirty_scopes: DirtyScopes,
    pub animation: Option<Rc<TransitionSpec>>,
}

impl Commit {
    pub fn is_animated(&self) -> bool {
        self.animation.is_some()
    }

    pub fn touches(&self, scope: ScopeId) -> bool {
        self.dirty_scopes.contains(&scope)
    }
}

/// Receives every commit. Must be idempotent for an unchanged snapshot.
pub trait Renderer {
    fn render(&mut self, commit: &Commit);
}

impl<F: FnMut(&Commit)> Renderer for F {
    fn render(&mut self, commit: &Commit) {
        self(commit)
    }
}

type Task = Box<dyn FnOnce()>;

struct SchedulerState {
    phase: Phase,
    scopes: SlotMap<ScopeId, ()>,
    dirty: DirtyScopes,
    pending_animation: Option<Rc<TransitionSpec>>,
    // queued during the current cycle
    posted: VecDeque<Task>,
    // runs at the start of the next cycle
    ready: VecDeque<Task>,
    cycle: u64,
    commits: u64,
}

struct Shared {
    state: RefCell<SchedulerState>,
    renderer: RefCell<Option<Box<dyn Renderer>>>,
    config: SchedulerConfig,
}

/// Coalesces every write of a processing cycle into a single commit.
///
/// Cloning yields another handle to the same session.
#[derive(Clone)]
pub struct ChangeScheduler(Rc<Shared>);

impl Default for ChangeScheduler {
    fn default() -> Self {
        Self::new()
    }
}

impl ChangeScheduler {
    pub fn new() -> Self {
        Self::with_config(SchedulerConfig::default())
    }

    pub fn with_config(config: SchedulerConfig) -> Self {
        Self(Rc::new(Shared {
            state: RefCell::new(SchedulerState {
                phase: Phase::Idle,
                scopes: SlotMap::with_key(),
                dirty: SmallVec::new(),
                pending_animation: None,
                posted: VecDeque::new(),
                ready: VecDeque::new(),
                cycle: 0,
                commits: 0,
            }),
            renderer: RefCell::new(None),
            config,
        }))
    }

    pub fn config(&self) -> &SchedulerConfig {
        &self.0.config
    }

    pub fn set_renderer(&self, renderer: impl Renderer + 'static) {
        *self.0.renderer.borrow_mut() = Some(Box::new(renderer));
    }

    pub fn root_scope(&self) -> Scope {
        Scope::new(self, None)
    }

    pub fn phase(&self) -> Phase {
        self.0.state.borrow().phase
    }

    pub fn cycle(&self) -> u64 {
        self.0.state.borrow().cycle
    }

    pub fn commit_count(&self) -> u64 {
        self.0.state.borrow().commits
    }

    pub fn is_dirty(&self, scope: ScopeId) -> bool {
        self.0.state.borrow().dirty.contains(&scope)
    }

    pub fn has_pending_work(&self) -> bool {
        let st = self.0.state.borrow();
        !st.dirty.is_empty() || !st.posted.is_empty() || !st.ready.is_empty()
    }

    pub(crate) fn register_scope(&self) -> ScopeId {
        self.0.state.borrow_mut().scopes.insert(())
    }

    pub(crate) fn release_scope(&self, id: ScopeId) {
        match self.0.state.try_borrow_mut() {
            Ok(mut st) => {
                st.scopes.remove(id);
                st.dirty.retain(|s| *s != id);
                // Nothing left to commit for this batch.
                if st.phase == Phase::Collecting && st.dirty.is_empty() {
                    st.phase = Phase::Idle;
                    st.pending_animation = None;
                    log::trace!("scheduler: Collecting -> Idle (last dirty scope {id:?} released)");
                }
            }
            Err(_) => log::warn!("scope {id:?} released while the scheduler was busy"),
        }
    }

    pub fn is_scope_alive(&self, id: ScopeId) -> bool {
        self.0
            .state
            .try_borrow()
            .map(|st| st.scopes.contains_key(id))
            .unwrap_or(true)
    }

    /// Record a write against `scope`. Never commits synchronously.
    pub fn mark_dirty(&self, scope: ScopeId) {
        let animation = transaction::current_animation().map(|a| self.resolve_animation(a));

        let mut st = self.0.state.borrow_mut();
        if !st.dirty.contains(&scope) {
            st.dirty.push(scope);
        }
        if let Some(animation) = animation {
            st.pending_animation = Some(animation);
        }
        match st.phase {
            Phase::Idle => {
                st.phase = Phase::Collecting;
                log::trace!("scheduler: Idle -> Collecting (scope {scope:?})");
            }
            Phase::Collecting => {}
            Phase::Committing => {
                log::trace!("scheduler: write to {scope:?} during commit, queued for the next one");
            }
        }
    }

    fn resolve_animation(&self, animation: TransactionAnimation) -> Rc<TransitionSpec> {
        match animation {
            TransactionAnimation::Transition(spec) => spec,
            TransactionAnimation::Default => {
                Rc::new(TransitionSpec::from(self.0.config.default_animation))
            }
        }
    }

    /// Queue `task` to run at the start of the next cycle, on this thread.
    pub fn post(&self, task: impl FnOnce() + 'static) {
        self.0.state.borrow_mut().posted.push_back(Box::new(task));
    }

    /// One processing cycle around a host event.
    pub fn dispatch<R>(&self, event: impl FnOnce() -> R) -> R {
        self.begin_cycle();
        let out = event();
        self.end_cycle();
        out
    }

    /// Run cycles until nothing is dirty or queued. Returns the number of commits.
    pub fn run_until_idle(&self) -> usize {
        let mut commits = 0;
        for _ in 0..self.0.config.max_settle_cycles {
            if !self.has_pending_work() {
                return commits;
            }
            self.begin_cycle();
            if self.end_cycle().is_some() {
                commits += 1;
            }
        }
        if self.has_pending_work() {
            log::warn!(
                "scheduler still has pending work after {} cycles; state writes keep re-arming",
                self.0.config.max_settle_cycles
            );
        }
        commits
    }

    fn begin_cycle(&self) {
        let ready = {
            let mut st = self.0.state.borrow_mut();
            st.cycle += 1;
            std::mem::take(&mut st.ready)
        };
        for task in ready {
            task();
        }
    }

    /// Close the current cycle: commit if anything was written, then promote
    /// posted work to the next cycle.
    pub fn end_cycle(&self) -> Option<Commit> {
        let phase = self.phase();
        let commit = match phase {
            Phase::Collecting => Some(self.commit()),
            Phase::Idle => None,
            Phase::Committing => {
                log::warn!("end_cycle called from inside a commit; ignored");
                return None;
            }
        };

        let mut st = self.0.state.borrow_mut();
        let posted = std::mem::take(&mut st.posted);
        st.ready.extend(posted);
        commit
    }

    fn commit(&self) -> Commit {
        let commit = {
            let mut st = self.0.state.borrow_mut();
            st.phase = Phase::Committing;
            st.commits += 1;
            let mut dirty = std::mem::take(&mut st.dirty);
            dirty.retain(|s| st.scopes.contains_key(*s));
            Commit {
                id: st.commits,
                dirty_scopes: dirty,
                animation: st.pending_animation.take(),
            }
        };
        log::trace!("scheduler: Collecting -> Committing");
        log::debug!(
            "commit #{}: {} dirty scope(s), animated: {}",
            commit.id,
            commit.dirty_scopes.len(),
            commit.is_animated()
        );

        let renderer = self.0.renderer.borrow_mut().take();
        if let Some(mut renderer) = renderer {
            renderer.render(&commit);
            let mut slot = self.0.renderer.borrow_mut();
            if slot.is_none() {
                *slot = Some(renderer);
            }
        }

        let mut st = self.0.state.borrow_mut();
        st.phase = Phase::Idle;
        log::trace!("scheduler: Committing -> Idle");
        if !st.dirty.is_empty() {
            st.phase = Phase::Collecting;
            log::trace!("scheduler: Idle -> Collecting (writes made during commit #{})", commit.id);
        }
        commit
    }
}
