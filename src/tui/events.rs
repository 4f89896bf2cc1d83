// Event handling for the matrix workbench
// Terminal keys are decoded into actions before they reach the session

use anyhow::Result;
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use std::time::Duration;

use crate::matrix::{GridInput, NavKey, Operation};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatrixAction {
    Quit,
    Input(GridInput),
    Dispatch(Operation),
    /// Nothing happened; drain finished requests and redraw
    Tick,
}

pub struct EventHandler {
    poll_interval: Duration,
}

impl EventHandler {
    pub fn new() -> Self {
        Self {
            poll_interval: Duration::from_millis(50),
        }
    }

    pub async fn handle_events(&mut self) -> Result<Option<MatrixAction>> {
        if event::poll(self.poll_interval)? {
            match event::read()? {
                Event::Key(key_event) if key_event.kind != KeyEventKind::Release => {
                    return Ok(map_key(key_event));
                }
                Event::Resize(_, _) => return Ok(Some(MatrixAction::Tick)),
                _ => {}
            }
        }

        Ok(Some(MatrixAction::Tick))
    }
}

impl Default for EventHandler {
    fn default() -> Self {
        Self::new()
    }
}

pub fn map_key(key_event: KeyEvent) -> Option<MatrixAction> {
    let shift = key_event.modifiers.contains(KeyModifiers::SHIFT);
    let nav = |key| Some(MatrixAction::Input(GridInput::Nav { key, shift }));

    match key_event.code {
        KeyCode::Esc => Some(MatrixAction::Quit),
        KeyCode::Char('c') if key_event.modifiers.contains(KeyModifiers::CONTROL) => {
            Some(MatrixAction::Quit)
        }

        KeyCode::Tab => Some(MatrixAction::Input(GridInput::NextField)),
        KeyCode::BackTab => Some(MatrixAction::Input(GridInput::PrevField)),

        KeyCode::Up => nav(NavKey::Up),
        KeyCode::Down => nav(NavKey::Down),
        KeyCode::Left => nav(NavKey::Left),
        KeyCode::Right => nav(NavKey::Right),
        KeyCode::Enter => nav(NavKey::Enter),

        KeyCode::Backspace => Some(MatrixAction::Input(GridInput::Backspace)),
        KeyCode::Char(c) => Some(MatrixAction::Input(GridInput::Char(c))),

        KeyCode::F(5) => Some(MatrixAction::Dispatch(Operation::Add)),
        KeyCode::F(6) => Some(MatrixAction::Dispatch(Operation::Subtract)),
        KeyCode::F(7) => Some(MatrixAction::Dispatch(Operation::Multiply)),
        KeyCode::F(8) => Some(MatrixAction::Dispatch(Operation::Transpose)),
        KeyCode::F(9) => Some(MatrixAction::Dispatch(Operation::Determinant)),

        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(code: KeyCode, modifiers: KeyModifiers) -> KeyEvent {
        KeyEvent::new(code, modifiers)
    }

    #[test]
    fn test_shift_is_carried_into_navigation() {
        assert_eq!(
            map_key(key(KeyCode::Down, KeyModifiers::SHIFT)),
            Some(MatrixAction::Input(GridInput::Nav {
                key: NavKey::Down,
                shift: true
            }))
        );
        assert_eq!(
            map_key(key(KeyCode::Enter, KeyModifiers::NONE)),
            Some(MatrixAction::Input(GridInput::Nav {
                key: NavKey::Enter,
                shift: false
            }))
        );
    }

    #[test]
    fn test_function_keys_dispatch_operations() {
        assert_eq!(
            map_key(key(KeyCode::F(9), KeyModifiers::NONE)),
            Some(MatrixAction::Dispatch(Operation::Determinant))
        );
        assert_eq!(
            map_key(key(KeyCode::F(5), KeyModifiers::NONE)),
            Some(MatrixAction::Dispatch(Operation::Add))
        );
        assert_eq!(map_key(key(KeyCode::F(1), KeyModifiers::NONE)), None);
    }

    #[test]
    fn test_quit_keys() {
        assert_eq!(map_key(key(KeyCode::Esc, KeyModifiers::NONE)), Some(MatrixAction::Quit));
        assert_eq!(
            map_key(key(KeyCode::Char('c'), KeyModifiers::CONTROL)),
            Some(MatrixAction::Quit)
        );
        assert_eq!(
            map_key(key(KeyCode::Char('c'), KeyModifiers::NONE)),
            Some(MatrixAction::Input(GridInput::Char('c')))
        );
    }
}
