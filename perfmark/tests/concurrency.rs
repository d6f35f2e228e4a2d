//! One helper shared across threads

use perfmark::{ErrorKind, PerformanceHelper};
use std::sync::{Barrier, mpsc};
use std::time::Duration;

#[test]
fn test_active_state_visible_while_body_runs() {
    let helper = PerformanceHelper::without_file_storage();
    helper.prepare_to_measure("slow").unwrap();

    let (entered_tx, entered_rx) = mpsc::channel();
    let (release_tx, release_rx) = mpsc::channel::<()>();

    std::thread::scope(|s| {
        let worker = &helper;
        s.spawn(move || {
            worker
                .measure_scoped("slow", || {
                    entered_tx.send(()).unwrap();
                    release_rx.recv().unwrap();
                })
                .unwrap();
        });

        entered_rx.recv().unwrap();

        // The state lock is free while the body runs, so these calls return
        // promptly and observe the active measurement.
        assert_eq!(helper.active_identifier().as_deref(), Some("slow"));
        let err = helper.record_untimed_measurement("other", 1.0).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InterruptedMeasurement);
        let err = helper.prepare_to_measure("other").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InterruptedMeasurement);

        release_tx.send(()).unwrap();
    });

    assert_eq!(helper.active_identifier(), None);
    assert!(helper.newest_timed_measurement("slow").is_ok());
}

#[test]
fn test_only_one_thread_wins_the_guard() {
    const THREADS: usize = 8;
    let helper = PerformanceHelper::without_file_storage();
    for i in 0..THREADS {
        helper.prepare_to_measure(&format!("t{i}")).unwrap();
    }

    let barrier = Barrier::new(THREADS);
    let winners: Vec<String> = std::thread::scope(|s| {
        let handles: Vec<_> = (0..THREADS)
            .map(|i| {
                let helper = &helper;
                let barrier = &barrier;
                s.spawn(move || {
                    let id = format!("t{i}");
                    barrier.wait();
                    helper.start_measuring(&id).ok().map(|()| id)
                })
            })
            .collect();
        handles
            .into_iter()
            .filter_map(|h| h.join().unwrap())
            .collect()
    });

    assert_eq!(winners.len(), 1);
    assert_eq!(helper.active_identifier().as_deref(), Some(winners[0].as_str()));
    helper.stop_measuring(&winners[0]).unwrap();
}

#[test]
fn test_concurrent_untimed_records() {
    const THREADS: u32 = 4;
    const PER_THREAD: u32 = 25;
    let helper = PerformanceHelper::without_file_storage();

    std::thread::scope(|s| {
        for t in 0..THREADS {
            let helper = &helper;
            s.spawn(move || {
                for i in 0..PER_THREAD {
                    helper
                        .record_untimed_measurement("shared", f64::from(t * PER_THREAD + i))
                        .unwrap();
                }
            });
        }
    });

    let history = helper.history("shared").unwrap();
    assert_eq!(history.len(), (THREADS * PER_THREAD) as usize);
}

#[test]
fn test_sequential_measurements_from_threads() {
    let helper = PerformanceHelper::without_file_storage();

    std::thread::scope(|s| {
        for i in 0..4 {
            let helper = &helper;
            s.spawn(move || {
                let id = format!("worker-{i}");
                // Retry until the guard is free; bookkeeping never blocks on a body.
                loop {
                    match helper.measure(&id, || std::thread::sleep(Duration::from_millis(2))) {
                        Ok(()) => break,
                        Err(e) if e.is_interrupted() => std::thread::yield_now(),
                        Err(e) => panic!("unexpected error: {e}"),
                    }
                }
            });
        }
    });

    for i in 0..4 {
        assert!(
            helper.newest_timed_measurement(&format!("worker-{i}")).unwrap()
                >= Duration::from_millis(2)
        );
    }
}
