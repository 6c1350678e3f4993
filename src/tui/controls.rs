//! Keyboard input handling for the TUI.

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use super::runtime::App;

/// Maps a key event to an application action.
///
/// Guards on [`KeyEventKind::Press`] to avoid double-fire on some terminals.
pub fn handle_key(app: &mut App, key: KeyEvent) {
    if key.kind != KeyEventKind::Press {
        return;
    }
    match key.code {
        KeyCode::Char('q') | KeyCode::Esc => app.quit = true,
        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => app.quit = true,
        KeyCode::Left | KeyCode::Char('h') => app.card.previous(),
        KeyCode::Right | KeyCode::Char('l') => app.card.next(),
        KeyCode::Char(d) if d.is_ascii_digit() => {
            if let Some(idx) = digit_slide(d) {
                app.card.jump(idx);
            }
        }
        KeyCode::Char(' ') => app.toggle_pause(),
        KeyCode::Char('+' | '=') => app.speed_up(),
        KeyCode::Char('-') => app.speed_down(),
        KeyCode::Char('r') => app.restart(),
        _ => {}
    }
}

/// Slide index for a digit key: `1`..`9` are slides 1-9, `0` is slide 10.
fn digit_slide(key: char) -> Option<usize> {
    match key {
        '0' => Some(9),
        d @ '1'..='9' => Some(d as usize - '1' as usize),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;

    fn press(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn digits_map_to_slides() {
        assert_eq!(digit_slide('1'), Some(0));
        assert_eq!(digit_slide('9'), Some(8));
        assert_eq!(digit_slide('0'), Some(9));
        assert_eq!(digit_slide('x'), None);
    }

    #[test]
    fn zero_reaches_tenth_default_slide() {
        let mut app = App::new(AppConfig::baseline(), "default").expect("valid config");
        assert_eq!(app.card.len(), 10);
        handle_key(&mut app, press(KeyCode::Char('0')));
        assert_eq!(app.card.index(), 9);
        handle_key(&mut app, press(KeyCode::Char('3')));
        assert_eq!(app.card.index(), 2);
    }

    #[test]
    fn digit_handling_leaves_other_keys_alone() {
        let mut app = App::new(AppConfig::baseline(), "default").expect("valid config");
        handle_key(&mut app, press(KeyCode::Char(' ')));
        assert!(app.paused);
        handle_key(&mut app, press(KeyCode::Char('q')));
        assert!(app.quit);
    }
}
