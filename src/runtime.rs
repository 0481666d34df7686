use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::thread;
use std::time::Duration;

use crossterm::event::{self, Event as CtEvent, KeyEvent};

use crate::provider::{FetchError, TextProvider};

/// Unified event type consumed by the app loop.
#[derive(Debug)]
pub enum AppEvent {
    Key(KeyEvent),
    Resize,
    Tick,
    TextLoaded(Result<String, FetchError>),
}

/// Countdown granularity. The session contract decrements whole seconds.
pub const TICK_RATE_MS: u64 = 1000;

pub fn event_channel() -> (Sender<AppEvent>, Receiver<AppEvent>) {
    mpsc::channel()
}

/// Forward crossterm key/resize events into the app channel.
pub fn spawn_key_reader(tx: Sender<AppEvent>) {
    thread::spawn(move || loop {
        match event::read() {
            Ok(CtEvent::Key(key)) => {
                if tx.send(AppEvent::Key(key)).is_err() {
                    break;
                }
            }
            Ok(CtEvent::Resize(_, _)) => {
                if tx.send(AppEvent::Resize).is_err() {
                    break;
                }
            }
            Ok(_) => {}
            Err(_) => break,
        }
    });
}

/// Emit a Tick at a fixed interval until the receiver goes away.
pub fn spawn_ticker(tx: Sender<AppEvent>, interval: Duration) {
    thread::spawn(move || loop {
        thread::sleep(interval);
        if tx.send(AppEvent::Tick).is_err() {
            break;
        }
    });
}

/// Run the one-off sample fetch off the UI thread; the result arrives as a
/// TextLoaded event. No typing state exists until it does.
pub fn spawn_loader(tx: Sender<AppEvent>, provider: Box<dyn TextProvider + Send>) {
    thread::spawn(move || {
        let result = provider.fetch_sample_text();
        let _ = tx.send(AppEvent::TextLoaded(result));
    });
}

/// Source of app events, abstracted for headless tests.
pub trait EventSource: Send + 'static {
    /// Block for up to `timeout` waiting for an event.
    fn recv_timeout(&self, timeout: Duration) -> Result<AppEvent, RecvTimeoutError>;
}

/// Test event source fed from an mpsc channel.
pub struct TestEventSource {
    rx: Receiver<AppEvent>,
}

impl TestEventSource {
    pub fn new(rx: Receiver<AppEvent>) -> Self {
        Self { rx }
    }
}

impl EventSource for TestEventSource {
    fn recv_timeout(&self, timeout: Duration) -> Result<AppEvent, RecvTimeoutError> {
        self.rx.recv_timeout(timeout)
    }
}

/// Fixed interval ticker
#[derive(Clone, Copy, Debug)]
pub struct FixedTicker {
    interval: Duration,
}

impl FixedTicker {
    pub fn new(interval: Duration) -> Self {
        Self { interval }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }
}

/// Runner that advances the application one event/tick at a time.
pub struct Runner<E: EventSource> {
    event_source: E,
    ticker: FixedTicker,
}

impl<E: EventSource> Runner<E> {
    pub fn new(event_source: E, ticker: FixedTicker) -> Self {
        Self {
            event_source,
            ticker,
        }
    }

    /// Blocks up to the tick interval and returns the next event, or Tick
    /// on timeout.
    pub fn step(&self) -> AppEvent {
        match self.event_source.recv_timeout(self.ticker.interval()) {
            Ok(ev) => ev,
            Err(RecvTimeoutError::Timeout) | Err(RecvTimeoutError::Disconnected) => AppEvent::Tick,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::FixedTextProvider;

    #[test]
    fn step_returns_tick_on_timeout() {
        let (_tx, rx) = event_channel();
        let es = TestEventSource::new(rx);
        let runner = Runner::new(es, FixedTicker::new(Duration::from_millis(1)));

        match runner.step() {
            AppEvent::Tick => {}
            other => panic!("expected Tick on timeout, got {other:?}"),
        }
    }

    #[test]
    fn step_passes_through_events() {
        let (tx, rx) = event_channel();
        tx.send(AppEvent::Resize).unwrap();
        let es = TestEventSource::new(rx);
        let runner = Runner::new(es, FixedTicker::new(Duration::from_millis(10)));

        match runner.step() {
            AppEvent::Resize => {}
            other => panic!("expected Resize event, got {other:?}"),
        }
    }

    #[test]
    fn loader_delivers_text_loaded_event() {
        let (tx, rx) = event_channel();
        spawn_loader(tx, Box::new(FixedTextProvider("hi there".to_string())));

        let es = TestEventSource::new(rx);
        let runner = Runner::new(es, FixedTicker::new(Duration::from_millis(200)));

        // The loader may race the first step; skip over timeout ticks.
        for _ in 0..10 {
            if let AppEvent::TextLoaded(result) = runner.step() {
                assert_eq!(result.unwrap(), "hi there");
                return;
            }
        }
        panic!("loader never delivered a TextLoaded event");
    }

    #[test]
    fn loader_delivers_fetch_errors() {
        let (tx, rx) = event_channel();
        spawn_loader(tx, Box::new(FixedTextProvider(String::new())));

        let es = TestEventSource::new(rx);
        let runner = Runner::new(es, FixedTicker::new(Duration::from_millis(200)));

        for _ in 0..10 {
            if let AppEvent::TextLoaded(result) = runner.step() {
                assert!(result.is_err());
                return;
            }
        }
        panic!("loader never delivered a TextLoaded event");
    }

    #[test]
    fn ticker_emits_ticks() {
        let (tx, rx) = event_channel();
        spawn_ticker(tx, Duration::from_millis(5));

        let got = rx.recv_timeout(Duration::from_millis(500));
        assert!(matches!(got, Ok(AppEvent::Tick)));
    }
}
