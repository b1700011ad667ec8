#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use crate::prelude::*;
    use web_time::{Duration, Instant};

    crate::observable_model! {
        #[derive(Debug)]
        struct Toggle => ToggleStore {
            #[published] flag(set_flag): bool = false,
        }
    }

    fn recording_renderer(scheduler: &ChangeScheduler) -> Rc<RefCell<Vec<Commit>>> {
        let commits = Rc::new(RefCell::new(Vec::new()));
        scheduler.set_renderer({
            let commits = commits.clone();
            move |commit: &Commit| commits.borrow_mut().push(commit.clone())
        });
        commits
    }

    #[test]
    fn test_writes_in_one_cycle_coalesce() {
        let scheduler = ChangeScheduler::new();
        let scope = scheduler.root_scope();
        let cell = scope.state(false);

        let observed = Rc::new(RefCell::new(Vec::new()));
        scheduler.set_renderer({
            let observed = observed.clone();
            let cell = cell.clone();
            move |_: &Commit| observed.borrow_mut().push(cell.read())
        });

        scheduler.dispatch(|| {
            cell.write(true);
            cell.write(false);
        });

        assert_eq!(scheduler.commit_count(), 1);
        assert_eq!(*observed.borrow(), vec![false]);
        assert!(!cell.read());
        assert_eq!(scheduler.phase(), Phase::Idle);
    }

    #[test]
    fn test_phase_transitions() {
        let scheduler = ChangeScheduler::new();
        let scope = scheduler.root_scope();
        let cell = scope.state(0);

        let during = Rc::new(RefCell::new(None));
        scheduler.set_renderer({
            let during = during.clone();
            let scheduler = scheduler.clone();
            move |_: &Commit| *during.borrow_mut() = Some(scheduler.phase())
        });

        assert_eq!(scheduler.phase(), Phase::Idle);
        cell.write(1);
        assert_eq!(scheduler.phase(), Phase::Collecting);
        cell.write(2);
        assert_eq!(scheduler.phase(), Phase::Collecting);
        assert_eq!(scheduler.commit_count(), 0);

        let commit = scheduler.end_cycle().expect("a commit");
        assert_eq!(commit.dirty_scopes.as_slice(), &[scope.id()]);
        assert_eq!(*during.borrow(), Some(Phase::Committing));
        assert_eq!(scheduler.phase(), Phase::Idle);
        assert!(scheduler.end_cycle().is_none());
    }

    #[test]
    fn test_write_during_commit_goes_to_next_commit() {
        let scheduler = ChangeScheduler::new();
        let scope = scheduler.root_scope();
        let cell = scope.state(0);
        let echo = scope.child();
        let echoed = echo.state(0);

        let seen = Rc::new(RefCell::new(Vec::new()));
        scheduler.set_renderer({
            let seen = seen.clone();
            let cell = cell.clone();
            let echoed = echoed.clone();
            move |commit: &Commit| {
                seen.borrow_mut().push(commit.dirty_scopes.len());
                if echoed.read() != cell.read() {
                    echoed.write(cell.read());
                }
            }
        });

        scheduler.dispatch(|| cell.write(7));
        assert_eq!(scheduler.commit_count(), 1);
        assert_eq!(scheduler.phase(), Phase::Collecting);
        assert!(scheduler.is_dirty(echo.id()));

        assert_eq!(scheduler.run_until_idle(), 1);
        assert_eq!(scheduler.commit_count(), 2);
        assert_eq!(echoed.read(), 7);
        assert_eq!(*seen.borrow(), vec![1, 1]);
    }

    #[test]
    fn test_store_notifies_synchronously() {
        let scheduler = ChangeScheduler::new();
        let store = ObservableStore::new(&scheduler, Toggle::default());
        let calls = Rc::new(RefCell::new(Vec::new()));

        store.subscribe({
            let calls = calls.clone();
            let store = store.clone();
            move || calls.borrow_mut().push(store.flag())
        });

        store.set_flag(true);
        assert!(store.flag());
        assert_eq!(*calls.borrow(), vec![true]);
    }

    #[test]
    fn test_reentrant_store_write_lands_next_cycle() {
        let scheduler = ChangeScheduler::new();
        let commits = recording_renderer(&scheduler);
        let scope = scheduler.root_scope();
        let store = ObservableStore::new(&scheduler, Toggle::default());
        scope.observe(&store);

        let notified = Rc::new(RefCell::new(Vec::new()));
        store.subscribe({
            let notified = notified.clone();
            let store = store.clone();
            let scheduler = scheduler.clone();
            move || {
                notified.borrow_mut().push((scheduler.cycle(), store.flag()));
                if store.flag() {
                    store.set_flag(false);
                }
            }
        });

        scheduler.dispatch(|| store.set_flag(true));
        assert_eq!(*notified.borrow(), vec![(1, true)]);
        assert!(store.flag());
        assert_eq!(commits.borrow().len(), 1);
        assert!(scheduler.has_pending_work());

        scheduler.run_until_idle();
        assert_eq!(*notified.borrow(), vec![(1, true), (2, false)]);
        assert!(!store.flag());
        assert_eq!(commits.borrow().len(), 2);
        assert!(commits.borrow()[1].touches(scope.id()));
    }

    #[test]
    fn test_observing_scope_unsubscribes_on_dispose() {
        let scheduler = ChangeScheduler::new();
        let store = ObservableStore::new(&scheduler, Toggle::default());
        let root = scheduler.root_scope();
        let screen = root.child();
        screen.observe(&store);
        assert_eq!(store.subscriber_count(), 1);

        let id = screen.id();
        screen.dispose();
        assert_eq!(store.subscriber_count(), 0);

        store.set_flag(true);
        assert!(!scheduler.is_dirty(id));
        assert!(scheduler.end_cycle().is_none());
    }

    #[test]
    fn test_disposed_scope_dropped_from_snapshot() {
        let scheduler = ChangeScheduler::new();
        let commits = recording_renderer(&scheduler);
        let root = scheduler.root_scope();
        let child = root.child();
        let a = root.state(1);
        let b = child.state(1);

        a.write(2);
        b.write(2);
        child.dispose();
        scheduler.end_cycle();

        assert_eq!(commits.borrow()[0].dirty_scopes.as_slice(), &[root.id()]);
    }

    #[test]
    fn test_disposed_children_are_detached() {
        let scheduler = ChangeScheduler::new();
        let root = scheduler.root_scope();
        let kept = root.child();

        for _ in 0..1000 {
            let child = root.child();
            let _buffer = child.state(vec![0u8; 1024]);
            child.dispose();
        }
        assert_eq!(root.child_count(), 1);

        let grandchild = kept.child();
        let grandchild_id = grandchild.id();
        kept.dispose();
        assert_eq!(root.child_count(), 0);
        assert!(!scheduler.is_scope_alive(grandchild_id));
    }

    #[test]
    fn test_disposing_the_only_dirty_scope_goes_idle() {
        let scheduler = ChangeScheduler::new();
        let commits = recording_renderer(&scheduler);
        let root = scheduler.root_scope();
        let child = root.child();
        let cell = child.state(0);

        with_default_animation(|| cell.write(1));
        assert_eq!(scheduler.phase(), Phase::Collecting);
        child.dispose();

        assert_eq!(scheduler.phase(), Phase::Idle);
        assert!(!scheduler.has_pending_work());
        assert_eq!(scheduler.run_until_idle(), 0);
        assert!(scheduler.end_cycle().is_none());
        assert!(commits.borrow().is_empty());

        // A later write starts a clean, unanimated batch.
        root.invalidate();
        scheduler.end_cycle();
        assert!(!commits.borrow()[0].is_animated());
    }

    #[test]
    fn test_animated_commit_carries_transition() {
        let scheduler = ChangeScheduler::new();
        let commits = recording_renderer(&scheduler);
        let scope = scheduler.root_scope();
        let shown = scope.state(false);

        scheduler.dispatch(|| with_animation(TransitionSpec::slide(), || shown.write(true)));
        scheduler.dispatch(|| shown.write(false));
        scheduler.dispatch(|| shown.binding().animated().set(true));
        scheduler.dispatch(|| {
            with_default_animation(|| without_animation(|| shown.write(false)))
        });

        let commits = commits.borrow();
        assert_eq!(commits.len(), 4);
        assert_eq!(commits[0].animation.as_deref(), Some(&TransitionSpec::slide()));
        assert!(!commits[1].is_animated());
        assert_eq!(
            commits[2].animation.as_deref(),
            Some(&TransitionSpec::from(scheduler.config().default_animation))
        );
        assert!(!commits[3].is_animated());
    }

    #[test]
    fn test_latest_animated_write_wins() {
        let scheduler = ChangeScheduler::new();
        let scope = scheduler.root_scope();
        let cell = scope.state(0);

        with_animation(TransitionSpec::opacity(), || cell.write(1));
        with_animation(TransitionSpec::scale(), || cell.write(2));
        cell.write(3);

        let commit = scheduler.end_cycle().expect("a commit");
        assert_eq!(commit.animation.as_deref(), Some(&TransitionSpec::scale()));
    }

    #[test]
    fn test_posted_task_runs_next_cycle() {
        let scheduler = ChangeScheduler::new();
        let scope = scheduler.root_scope();
        let loaded = scope.state(None::<String>);

        scheduler.dispatch(|| {
            let loaded = loaded.clone();
            scheduler.post(move || loaded.write(Some("done".into())));
        });
        assert_eq!(loaded.read(), None);
        assert_eq!(scheduler.commit_count(), 0);

        assert_eq!(scheduler.run_until_idle(), 1);
        assert_eq!(loaded.read().as_deref(), Some("done"));
    }

    #[test]
    fn test_settle_loop_is_bounded() {
        let scheduler = ChangeScheduler::with_config(SchedulerConfig {
            max_settle_cycles: 5,
            ..SchedulerConfig::default()
        });
        let scope = scheduler.root_scope();
        let counter = scope.state(0u32);
        scheduler.set_renderer({
            let counter = counter.clone();
            move |_: &Commit| counter.update(|c| *c += 1)
        });

        counter.write(0);
        assert_eq!(scheduler.run_until_idle(), 5);
        assert!(scheduler.has_pending_work());
    }

    #[test]
    fn test_scope_explicit_dispose() {
        let scheduler = ChangeScheduler::new();
        let cleaned_up = Rc::new(RefCell::new(Vec::new()));

        let scope = scheduler.root_scope();
        let child = scope.child();
        let log = cleaned_up.clone();
        scope.add_disposer(move || log.borrow_mut().push("parent"));
        let log = cleaned_up.clone();
        child.add_disposer(move || log.borrow_mut().push("child"));

        assert!(cleaned_up.borrow().is_empty());
        let child_id = child.id();
        scope.dispose();
        assert_eq!(*cleaned_up.borrow(), vec!["child", "parent"]);
        assert!(!scheduler.is_scope_alive(child_id));
    }

    #[test]
    fn test_scope_drop_cleans_up() {
        let scheduler = ChangeScheduler::new();
        let cleaned_up = Rc::new(RefCell::new(false));
        let id = {
            let scope = scheduler.root_scope();
            let flag = cleaned_up.clone();
            scope.add_disposer(move || *flag.borrow_mut() = true);
            scope.id()
        };
        assert!(*cleaned_up.borrow());
        assert!(!scheduler.is_scope_alive(id));
    }

    #[test]
    fn test_animation_deterministic() {
        let clock = TestClock::new(Instant::now());
        set_clock(clock.clone());

        let mut a = AnimatedValue::new(
            0.0f32,
            AnimationSpec::tween(Duration::from_millis(1000), Easing::Linear),
        );
        a.set_target(10.0);
        assert!(a.is_animating());
        assert_eq!(*a.target(), 10.0);
        clock.advance(Duration::from_millis(250));
        assert!(a.update());
        assert!((*a.get() - 2.5).abs() < 0.01);

        clock.advance(Duration::from_millis(750));
        assert!(!a.update());
        assert!(!a.is_animating());
        assert!((*a.get() - 10.0).abs() < 0.001);
        reset_clock();
    }

    #[test]
    fn test_delayed_animation_holds_then_runs() {
        let spec = AnimationSpec::tween(Duration::from_millis(100), Easing::Linear)
            .delayed(Duration::from_millis(50));

        assert_eq!(spec.fraction_at(Duration::from_millis(40)), 0.0);
        assert!((spec.fraction_at(Duration::from_millis(100)) - 0.5).abs() < 1e-4);
        assert!(!spec.is_finished_at(Duration::from_millis(120)));
        assert!(spec.is_finished_at(Duration::from_millis(150)));
    }
}
