/// Keyboard input collector.
///
/// Every game action here is a discrete step, so there is no held-key
/// tracking: each Press or Repeat event is one press, in arrival order.
/// Both players share one keyboard, so order matters when they act in
/// the same frame.
///
/// Release events are ignored. Terminals without keyboard enhancement
/// never send them anyway.

use std::time::Duration;

use crossterm::event::{self, poll, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

pub struct InputState {
    /// Key presses from the most recent drain_events(), oldest first.
    presses: Vec<KeyCode>,

    /// Raw key events collected during drain, for modifier checks.
    raw_events: Vec<KeyEvent>,
}

impl InputState {
    pub fn new() -> Self {
        InputState {
            presses: Vec::with_capacity(8),
            raw_events: Vec::with_capacity(8),
        }
    }

    /// Drain all pending terminal events without blocking.
    /// Call this once per frame.
    pub fn drain_events(&mut self) {
        self.presses.clear();
        self.raw_events.clear();

        while poll(Duration::ZERO).unwrap_or(false) {
            match event::read() {
                Ok(Event::Key(key)) => self.record(key),
                Ok(_) => {}
                Err(e) => {
                    log::warn!("terminal read failed: {e}");
                    break;
                }
            }
        }
    }

    /// This frame's presses in arrival order.
    pub fn presses(&self) -> &[KeyCode] {
        &self.presses
    }

    /// Check if any raw event this frame has Ctrl+C
    pub fn ctrl_c_pressed(&self) -> bool {
        self.raw_events.iter().any(|k| {
            k.modifiers.contains(KeyModifiers::CONTROL)
                && (k.code == KeyCode::Char('c') || k.code == KeyCode::Char('C'))
        })
    }

    // ── Internal ──

    fn record(&mut self, key: KeyEvent) {
        self.raw_events.push(key);
        if key.kind == KeyEventKind::Release {
            return;
        }
        // Ctrl+C is a quit request, never a gameplay 'c'.
        if key.modifiers.contains(KeyModifiers::CONTROL) {
            return;
        }
        self.presses.push(key.code);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(code: KeyCode, kind: KeyEventKind) -> KeyEvent {
        KeyEvent::new_with_kind(code, KeyModifiers::NONE, kind)
    }

    #[test]
    fn presses_keep_arrival_order() {
        let mut kb = InputState::new();
        kb.record(key(KeyCode::Char('d'), KeyEventKind::Press));
        kb.record(key(KeyCode::Left, KeyEventKind::Press));
        kb.record(key(KeyCode::Char('d'), KeyEventKind::Repeat));
        assert_eq!(
            kb.presses(),
            &[KeyCode::Char('d'), KeyCode::Left, KeyCode::Char('d')]
        );
    }

    #[test]
    fn releases_are_not_presses() {
        let mut kb = InputState::new();
        kb.record(key(KeyCode::Up, KeyEventKind::Release));
        assert!(kb.presses().is_empty());
    }

    #[test]
    fn ctrl_c_is_detected_and_not_a_press() {
        let mut kb = InputState::new();
        kb.record(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL));
        assert!(kb.ctrl_c_pressed());
        assert!(kb.presses().is_empty());
    }
}
