use std::collections::VecDeque;
use std::sync::mpsc::{self, Receiver, RecvTimeoutError};
use std::sync::Mutex;
use std::time::Duration;

use crossterm::event::{self, Event as CtEvent, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

/// Unified event type consumed by the app runner
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum QuizEvent {
    Key(KeyEvent),
    Resize,
    /// The input source is gone; the runner should stop
    Closed,
}

/// Source of terminal events (keyboard, resize, etc.)
pub trait QuizEventSource: Send + 'static {
    /// Wait up to `timeout` for the next event. `None` means nothing arrived in time.
    fn next_event(&self, timeout: Duration) -> Option<QuizEvent>;
}

/// Production event source: crossterm reads on a background thread
pub struct CrosstermEventSource {
    rx: Receiver<QuizEvent>,
}

impl CrosstermEventSource {
    pub fn new() -> Self {
        let (tx, rx) = mpsc::channel();

        std::thread::spawn(move || loop {
            let evt = match event::read() {
                // ignore key releases reported by some terminals
                Ok(CtEvent::Key(key)) if key.kind != KeyEventKind::Release => QuizEvent::Key(key),
                Ok(CtEvent::Resize(_, _)) => QuizEvent::Resize,
                Ok(_) => continue,
                Err(e) => {
                    tracing::warn!(error = %e, "terminal input closed");
                    let _ = tx.send(QuizEvent::Closed);
                    break;
                }
            };
            if tx.send(evt).is_err() {
                break;
            }
        });

        Self { rx }
    }
}

impl Default for CrosstermEventSource {
    fn default() -> Self {
        Self::new()
    }
}

impl QuizEventSource for CrosstermEventSource {
    fn next_event(&self, timeout: Duration) -> Option<QuizEvent> {
        match self.rx.recv_timeout(timeout) {
            Ok(ev) => Some(ev),
            Err(RecvTimeoutError::Timeout) => None,
            Err(RecvTimeoutError::Disconnected) => Some(QuizEvent::Closed),
        }
    }
}

/// Replays a fixed list of events, then reports `Closed`. For headless tests.
pub struct ScriptedEventSource {
    events: Mutex<VecDeque<QuizEvent>>,
}

impl ScriptedEventSource {
    pub fn new(events: impl IntoIterator<Item = QuizEvent>) -> Self {
        Self {
            events: Mutex::new(events.into_iter().collect()),
        }
    }

    /// Plain key presses, one per char
    pub fn from_keys(keys: &str) -> Self {
        Self::new(keys.chars().map(|c| QuizEvent::Key(key(KeyCode::Char(c)))))
    }
}

impl QuizEventSource for ScriptedEventSource {
    fn next_event(&self, _timeout: Duration) -> Option<QuizEvent> {
        let mut events = match self.events.lock() {
            Ok(events) => events,
            Err(poisoned) => poisoned.into_inner(),
        };
        Some(events.pop_front().unwrap_or(QuizEvent::Closed))
    }
}

pub fn key(code: KeyCode) -> KeyEvent {
    KeyEvent::new(code, KeyModifiers::NONE)
}

/// Pulls events for the app loop, waiting in `poll_interval` slices
pub struct Runner<E: QuizEventSource> {
    event_source: E,
    poll_interval: Duration,
}

impl<E: QuizEventSource> Runner<E> {
    pub fn new(event_source: E, poll_interval: Duration) -> Self {
        Self {
            event_source,
            poll_interval,
        }
    }

    /// Block until the next event
    pub fn step(&self) -> QuizEvent {
        loop {
            if let Some(ev) = self.event_source.next_event(self.poll_interval) {
                return ev;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scripted_source_replays_then_closes() {
        let runner = Runner::new(ScriptedEventSource::from_keys("ab"), Duration::from_millis(1));

        assert_eq!(runner.step(), QuizEvent::Key(key(KeyCode::Char('a'))));
        assert_eq!(runner.step(), QuizEvent::Key(key(KeyCode::Char('b'))));
        assert_eq!(runner.step(), QuizEvent::Closed);
        assert_eq!(runner.step(), QuizEvent::Closed);
    }

    #[test]
    fn test_step_passes_through_resize() {
        let runner = Runner::new(
            ScriptedEventSource::new([QuizEvent::Resize]),
            Duration::from_millis(10),
        );
        assert_eq!(runner.step(), QuizEvent::Resize);
    }

    /// Nothing for a while, then one key
    struct SlowSource {
        misses: Mutex<u32>,
    }

    impl QuizEventSource for SlowSource {
        fn next_event(&self, _timeout: Duration) -> Option<QuizEvent> {
            let mut misses = self.misses.lock().unwrap();
            if *misses > 0 {
                *misses -= 1;
                None
            } else {
                Some(QuizEvent::Key(key(KeyCode::Enter)))
            }
        }
    }

    #[test]
    fn test_step_waits_through_timeouts() {
        let runner = Runner::new(
            SlowSource {
                misses: Mutex::new(3),
            },
            Duration::from_millis(1),
        );
        assert_eq!(runner.step(), QuizEvent::Key(key(KeyCode::Enter)));
    }
}
