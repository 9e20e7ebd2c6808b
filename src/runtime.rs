//! Terminal input for the game loop.
//!
//! A reader thread forwards crossterm events over a channel. The loop asks the
//! [`Runner`] for the next one and gets [`GameEvent::Tick`] whenever nothing
//! arrives within the tick interval, so timers are polled even when idle.

use std::sync::mpsc::{self, Receiver};
use std::time::Duration;

use crossterm::event::{self, Event, KeyEvent, KeyEventKind, MouseEvent, MouseEventKind};
use tracing::debug;

#[derive(Clone, Debug)]
pub enum GameEvent {
    Key(KeyEvent),
    Mouse(MouseEvent),
    Resize,
    Tick,
}

pub trait GameEventSource {
    /// Wait at most `timeout` for the next input event.
    fn next_event(&self, timeout: Duration) -> Option<GameEvent>;
}

/// Events taken off a channel. The terminal reader feeds one; tests feed
/// another by hand.
pub struct ChannelEventSource {
    rx: Receiver<GameEvent>,
}

impl ChannelEventSource {
    pub fn new(rx: Receiver<GameEvent>) -> Self {
        Self { rx }
    }

    /// Start a thread reading the terminal and return the source it writes to.
    /// The thread stops once the source is dropped or the terminal read fails.
    pub fn terminal() -> Self {
        let (tx, rx) = mpsc::channel();

        std::thread::spawn(move || loop {
            let raw = match event::read() {
                Ok(raw) => raw,
                Err(e) => {
                    debug!(error = %e, "terminal reader stopped");
                    break;
                }
            };
            let Some(evt) = translate(raw) else {
                continue;
            };
            if tx.send(evt).is_err() {
                break;
            }
        });

        Self { rx }
    }
}

impl GameEventSource for ChannelEventSource {
    fn next_event(&self, timeout: Duration) -> Option<GameEvent> {
        self.rx.recv_timeout(timeout).ok()
    }
}

/// Keep key presses, mouse button presses and resizes. Releases, repeats,
/// drags and moves would only flood the loop.
pub fn translate(raw: Event) -> Option<GameEvent> {
    match raw {
        Event::Key(key) if key.kind == KeyEventKind::Press => Some(GameEvent::Key(key)),
        Event::Mouse(mouse) if matches!(mouse.kind, MouseEventKind::Down(_)) => {
            Some(GameEvent::Mouse(mouse))
        }
        Event::Resize(_, _) => Some(GameEvent::Resize),
        _ => None,
    }
}

/// Hands the loop one event at a time, or a tick when input is quiet.
pub struct Runner<E: GameEventSource> {
    source: E,
    tick: Duration,
}

impl<E: GameEventSource> Runner<E> {
    pub fn new(source: E, tick: Duration) -> Self {
        Self { source, tick }
    }

    /// A disconnected source also yields ticks.
    pub fn step(&self) -> GameEvent {
        self.source.next_event(self.tick).unwrap_or(GameEvent::Tick)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::{KeyCode, KeyEventState, KeyModifiers, MouseButton};

    fn runner(rx: Receiver<GameEvent>) -> Runner<ChannelEventSource> {
        Runner::new(ChannelEventSource::new(rx), Duration::from_millis(1))
    }

    fn mouse(kind: MouseEventKind) -> Event {
        Event::Mouse(MouseEvent {
            kind,
            column: 3,
            row: 4,
            modifiers: KeyModifiers::NONE,
        })
    }

    #[test]
    fn quiet_input_ticks() {
        let (_tx, rx) = mpsc::channel();
        assert!(matches!(runner(rx).step(), GameEvent::Tick));
    }

    #[test]
    fn queued_events_come_first() {
        let (tx, rx) = mpsc::channel();
        tx.send(GameEvent::Resize).unwrap();
        let runner = runner(rx);

        assert!(matches!(runner.step(), GameEvent::Resize));
        assert!(matches!(runner.step(), GameEvent::Tick));
    }

    #[test]
    fn dropped_sender_still_ticks() {
        let (tx, rx) = mpsc::channel::<GameEvent>();
        drop(tx);
        assert!(matches!(runner(rx).step(), GameEvent::Tick));
    }

    #[test]
    fn translate_keeps_presses_only() {
        let press = KeyEvent::new(KeyCode::Char(' '), KeyModifiers::NONE);
        let release = KeyEvent::new_with_kind_and_state(
            KeyCode::Char(' '),
            KeyModifiers::NONE,
            KeyEventKind::Release,
            KeyEventState::NONE,
        );

        assert!(matches!(translate(Event::Key(press)), Some(GameEvent::Key(_))));
        assert!(translate(Event::Key(release)).is_none());
        assert!(matches!(
            translate(mouse(MouseEventKind::Down(MouseButton::Left))),
            Some(GameEvent::Mouse(m)) if m.column == 3 && m.row == 4
        ));
        assert!(translate(mouse(MouseEventKind::Moved)).is_none());
        assert!(translate(mouse(MouseEventKind::Up(MouseButton::Left))).is_none());
        assert!(matches!(translate(Event::Resize(80, 24)), Some(GameEvent::Resize)));
        assert!(translate(Event::FocusGained).is_none());
    }
}
