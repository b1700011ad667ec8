use anyhow::Context;
use tether_core::prelude::*;
use web_time::Duration;

use gallery::app::Gallery;
use gallery::pages::environment::Sheet;
use gallery::ui::Frame;

const FRAME: Duration = Duration::from_millis(16);

fn print_frame(frame: &Frame) {
    println!("--- commit #{} ---", frame.commit);
    for line in &frame.lines {
        println!("{line}");
    }
    for (key, phase) in &frame.transitions {
        println!("  ~ {key}: {phase:?}");
    }
}

fn main() -> anyhow::Result<()> {
    env_logger::init();

    register_default(Locale::new("en_GB")).context("registering the app locale")?;

    let config = SchedulerConfig {
        default_animation: AnimationSpec::tween(Duration::from_millis(200), Easing::EaseInOut),
        ..SchedulerConfig::default()
    };
    let env = EnvironmentRegistry::new().with_override(SizeCategory::ExtraLarge);
    let app = Gallery::new(config, env);
    let screens = app.screens.clone();

    app.launch();
    app.scheduler.dispatch(|| screens.binding.row().tap());
    app.scheduler.dispatch(|| screens.observable.tap());
    app.scheduler.dispatch(|| screens.environment.present());
    let sheet = Sheet::new(screens.environment.sheet_env());
    app.scheduler.dispatch(|| sheet.dismiss());
    app.scheduler.dispatch(|| screens.animation.toggle_detail());
    app.animate_chevron();
    app.scheduler.dispatch(|| screens.paging.indicator().advance());
    app.scheduler.dispatch(|| screens.paging.swipe_to(2));

    // Drive the chevron at roughly display rate until nothing is queued.
    let before = app.scheduler.commit_count();
    while app.scheduler.has_pending_work() {
        std::thread::sleep(FRAME);
        app.scheduler.dispatch(|| {});
    }
    log::info!(
        "settled after {} more commits",
        app.scheduler.commit_count() - before
    );

    for frame in app.frames().borrow().iter() {
        print_frame(frame);
    }
    Ok(())
}
