use std::ops::ControlFlow;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use framebind_animation_core::{
    render_channel, FrameCaps, FrameScheduler, FrameTick, SchedulerConfig, SchedulerState,
};

fn short_timeout() -> SchedulerConfig {
    SchedulerConfig {
        handoff_timeout_ms: 30,
        ..SchedulerConfig::default()
    }
}

#[test]
fn construction_on_render_thread_is_local() {
    let (render, _queue) = render_channel();
    let scheduler = FrameScheduler::on_render_thread(&render, FrameCaps::default(), &short_timeout());
    assert!(scheduler.has_affinity());
    assert_eq!(scheduler.state(), SchedulerState::Idle);
}

#[test]
fn off_thread_construction_is_handed_to_render_thread() {
    let (render, queue) = render_channel();
    let done = Arc::new(AtomicBool::new(false));
    let worker = {
        let done = done.clone();
        let cfg = SchedulerConfig {
            handoff_timeout_ms: 5_000,
            ..SchedulerConfig::default()
        };
        std::thread::spawn(move || {
            let s = FrameScheduler::on_render_thread(&render, FrameCaps { vsync: true }, &cfg);
            done.store(true, Ordering::SeqCst);
            s
        })
    };
    while !done.load(Ordering::SeqCst) {
        queue.run_pending();
        std::thread::sleep(Duration::from_millis(1));
    }
    let mut scheduler = worker.join().unwrap();
    assert!(scheduler.has_affinity());

    // Affinity belongs to this (the render) thread, so pulses here are accepted.
    scheduler.start();
    let mut cb = |_: FrameTick| ControlFlow::Continue(());
    assert!(scheduler.dispatch(Duration::from_millis(1), &mut cb));
}

#[test]
fn handoff_timeout_degrades_instead_of_failing() {
    let (render, _queue) = render_channel();
    let worker = std::thread::spawn(move || {
        FrameScheduler::on_render_thread(&render, FrameCaps::default(), &short_timeout())
    });
    let mut scheduler = worker.join().unwrap();
    assert!(!scheduler.has_affinity());

    // Without affinity, pulses from any thread are accepted.
    scheduler.start();
    let mut count = 0;
    let mut cb = |_: FrameTick| {
        count += 1;
        ControlFlow::Continue(())
    };
    scheduler.dispatch(Duration::from_millis(0), &mut cb);
    scheduler.dispatch(Duration::from_millis(20), &mut cb);
    assert_eq!(count, 2);
}
