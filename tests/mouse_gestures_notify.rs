use gesture_engine::mouse_gestures::{
    Action, Direction, Gesture, GestureEngine, GestureEngineConfig, ModifierSet, Point,
};
use std::sync::mpsc::{self, RecvTimeoutError};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::{Duration, Instant};

const WAIT: Duration = Duration::from_secs(2);
const QUIET: Duration = Duration::from_millis(200);

fn engine() -> GestureEngine {
    GestureEngine::new(GestureEngineConfig::with_wiggle_radius(25))
}

#[test]
fn plain_click_is_reported_as_click_through() {
    let mut engine = engine();
    let (click_tx, click_rx) = mpsc::channel();
    let (done_tx, done_rx) = mpsc::channel::<Gesture>();
    engine
        .notifier()
        .on_click_through(move |pos| {
            let _ = click_tx.send(pos);
        })
        .unwrap();
    engine
        .notifier()
        .on_complete(move |gesture| {
            let _ = done_tx.send(gesture.clone());
        })
        .unwrap();

    let cleanup_ran = Arc::new(Mutex::new(false));
    let flag = Arc::clone(&cleanup_ran);
    assert!(engine.trigger_down(Point::new(5, 5), ModifierSet::NONE));
    assert!(engine.trigger_up(Point::new(5, 5), move |_| {
        *flag.lock().unwrap() = true;
    }));

    assert_eq!(click_rx.recv_timeout(WAIT), Ok(Point::new(5, 5)));
    assert_eq!(done_rx.recv_timeout(QUIET).err(), Some(RecvTimeoutError::Timeout));
    assert!(!*cleanup_ran.lock().unwrap());
}

#[test]
fn aux_button_click_is_a_zero_length_gesture() {
    let mut engine = engine();
    let (click_tx, click_rx) = mpsc::channel();
    let (done_tx, done_rx) = mpsc::channel::<Gesture>();
    engine
        .notifier()
        .on_click_through(move |pos| {
            let _ = click_tx.send(pos);
        })
        .unwrap();
    engine
        .notifier()
        .on_complete(move |gesture| {
            let _ = done_tx.send(gesture.clone());
        })
        .unwrap();

    engine.trigger_down(Point::new(5, 5), ModifierSet::AUX | ModifierSet::SHIFT);
    engine.trigger_up(Point::new(5, 5), |_| {});

    let gesture = done_rx.recv_timeout(WAIT).unwrap();
    assert!(gesture.is_empty());
    assert_eq!(gesture.encode(), "AUX|SHIFT");
    assert_eq!(click_rx.recv_timeout(QUIET).err(), Some(RecvTimeoutError::Timeout));
}

#[test]
fn wiggle_without_actions_is_not_a_click() {
    let mut engine = engine();
    let (click_tx, click_rx) = mpsc::channel();
    let (done_tx, done_rx) = mpsc::channel::<Gesture>();
    engine
        .notifier()
        .on_click_through(move |pos| {
            let _ = click_tx.send(pos);
        })
        .unwrap();
    engine
        .notifier()
        .on_complete(move |gesture| {
            let _ = done_tx.send(gesture.clone());
        })
        .unwrap();

    engine.trigger_down(Point::new(0, 0), ModifierSet::NONE);
    engine.move_to(Point::new(3, 2));
    engine.trigger_up(Point::new(3, 2), |_| {});

    let gesture = done_rx.recv_timeout(WAIT).unwrap();
    assert_eq!(gesture, Gesture::new(ModifierSet::NONE, Vec::new()));
    assert_eq!(click_rx.recv_timeout(QUIET).err(), Some(RecvTimeoutError::Timeout));
}

#[test]
fn cleanup_runs_before_completion_is_delivered() {
    let mut engine = engine();
    let log = Arc::new(Mutex::new(Vec::<String>::new()));
    let (done_tx, done_rx) = mpsc::channel();

    let complete_log = Arc::clone(&log);
    engine
        .notifier()
        .on_complete(move |gesture| {
            complete_log.lock().unwrap().push(format!("complete {gesture}"));
            let _ = done_tx.send(());
        })
        .unwrap();

    for round in 0..5 {
        let start = Point::new(round * 100, 0);
        engine.trigger_down(start, ModifierSet::NONE);
        engine.move_to(Point::new(start.x, 40));

        let cleanup_log = Arc::clone(&log);
        let issued = Instant::now();
        engine.trigger_up(Point::new(start.x, 40), move |gesture| {
            thread::sleep(Duration::from_millis(100));
            cleanup_log.lock().unwrap().push(format!("cleanup {gesture}"));
        });
        // The producer is not held up by the slow cleanup.
        assert!(issued.elapsed() < Duration::from_millis(100));

        done_rx.recv_timeout(WAIT).unwrap();
        let entries = std::mem::take(&mut *log.lock().unwrap());
        assert_eq!(entries, vec!["cleanup NONE;DOWN", "complete NONE;DOWN"]);
    }
}

#[test]
fn complete_subscribers_can_look_up_positions() {
    let mut engine = engine();
    let (tx, rx) = mpsc::channel();
    engine
        .notifier()
        .on_complete(move |gesture| {
            let session = gesture.session().expect("session alive during delivery");
            let _ = tx.send((
                gesture.clone(),
                session.initial_position(),
                session.current_position(),
            ));
        })
        .unwrap();

    engine.trigger_down(Point::new(10, 10), ModifierSet::CONTROL);
    engine.move_to(Point::new(10, 60));
    engine.move_to(Point::new(70, 60));
    engine.trigger_up(Point::new(71, 61), |_| {});

    let (gesture, initial, last) = rx.recv_timeout(WAIT).unwrap();
    assert_eq!(
        gesture.actions(),
        &[
            Action::Movement(Direction::Down),
            Action::Movement(Direction::Right)
        ]
    );
    assert_eq!(initial, Point::new(10, 10));
    assert_eq!(last, Point::new(71, 61));

    // Holding on to the gesture does not keep the session alive.
    let deadline = Instant::now() + WAIT;
    while gesture.session().is_some() && Instant::now() < deadline {
        thread::sleep(Duration::from_millis(5));
    }
    assert!(gesture.session().is_none());
}

#[test]
fn start_and_update_carry_snapshots() {
    let mut engine = engine();
    let (start_tx, start_rx) = mpsc::channel();
    let (update_tx, update_rx) = mpsc::channel();
    engine
        .notifier()
        .on_start(move |session| {
            let _ = start_tx.send(session);
        })
        .unwrap();
    engine
        .notifier()
        .on_update(move |session| {
            let _ = update_tx.send(session);
        })
        .unwrap();

    engine.trigger_down(Point::new(0, 0), ModifierSet::NONE);
    engine.move_to(Point::new(40, 0));
    engine.move_to(Point::new(40, 40));
    engine.reset();

    let started = start_rx.recv_timeout(WAIT).unwrap();
    assert_eq!(started.samples(), &[Point::new(0, 0)]);
    assert!(started.actions().is_empty());

    let first = update_rx.recv_timeout(WAIT).unwrap().unwrap();
    assert_eq!(first.current_position(), Point::new(40, 0));
    assert_eq!(first.actions().len(), 1);

    let second = update_rx.recv_timeout(WAIT).unwrap().unwrap();
    assert_eq!(second.current_position(), Point::new(40, 40));
    assert_eq!(second.actions().len(), 2);

    assert!(update_rx.recv_timeout(WAIT).unwrap().is_none(), "reset");
    assert_eq!(update_rx.recv_timeout(QUIET).err(), Some(RecvTimeoutError::Timeout));
}

#[test]
fn idle_reset_publishes_nothing() {
    let mut engine = engine();
    let (tx, rx) = mpsc::channel();
    engine
        .notifier()
        .on_update(move |session| {
            let _ = tx.send(session.is_some());
        })
        .unwrap();

    engine.reset();
    engine.reset();
    assert_eq!(rx.recv_timeout(QUIET).err(), Some(RecvTimeoutError::Timeout));
}

#[test]
fn panicking_subscriber_does_not_affect_others() {
    let mut engine = engine();
    let (tx, rx) = mpsc::channel();
    engine
        .notifier()
        .on_complete(|_| panic!("subscriber failure"))
        .unwrap();
    engine
        .notifier()
        .on_complete(move |gesture| {
            let _ = tx.send(gesture.encode());
        })
        .unwrap();

    for _ in 0..2 {
        engine.trigger_down(Point::new(0, 0), ModifierSet::NONE);
        engine.move_to(Point::new(-30, 0));
        assert!(engine.trigger_up(Point::new(-30, 0), |_| panic!("cleanup failure")));
        assert_eq!(rx.recv_timeout(WAIT).unwrap(), "NONE;LEFT");
    }
}

#[test]
fn unsubscribed_handlers_stop_receiving() {
    let mut engine = engine();
    let (tx, rx) = mpsc::channel();
    let id = engine
        .notifier()
        .on_click_through(move |pos| {
            let _ = tx.send(pos);
        })
        .unwrap();
    assert_eq!(engine.notifier().subscriber_count(), 1);

    assert!(engine.notifier().unsubscribe(id));
    assert!(!engine.notifier().unsubscribe(id));
    assert_eq!(engine.notifier().subscriber_count(), 0);

    engine.trigger_down(Point::new(1, 1), ModifierSet::NONE);
    engine.trigger_up(Point::new(1, 1), |_| {});
    assert!(rx.recv_timeout(QUIET).is_err());
}

#[test]
fn slow_update_subscriber_sees_bounded_point_in_time_snapshots() {
    let config = GestureEngineConfig {
        max_samples: 8,
        ..GestureEngineConfig::with_wiggle_radius(25)
    };
    let mut engine = GestureEngine::new(config);
    let (tx, rx) = mpsc::channel();
    engine
        .notifier()
        .on_update(move |session| {
            thread::sleep(Duration::from_millis(1));
            let _ = tx.send(session);
        })
        .unwrap();

    engine.trigger_down(Point::new(0, 0), ModifierSet::NONE);
    for x in 1..=200 {
        engine.move_to(Point::new(x, 0));
    }

    for x in 1..=200 {
        let snapshot = rx.recv_timeout(WAIT).unwrap().unwrap();
        assert_eq!(snapshot.current_position(), Point::new(x, 0));
        assert!(snapshot.samples().len() <= 8);
    }
}
