/// Operator key names to dispatcher intents
use crate::dispatcher::Intent;

/// Help rows shown in the panel's command list
pub const KEY_HELP: &[(&str, &str)] = &[
    ("up/down", "forward / backward"),
    ("left/right", "turn in place"),
    ("p", "passive mode"),
    ("s", "safe mode"),
    ("f", "full mode"),
    ("o", "stop"),
    ("k", "seek dock"),
    ("d", "power down"),
    ("q", "quit"),
];

/// Map a key name to its intent. Arrow keys may be spelled `up`, `<Up>`, or
/// arrive as the terminal's escape sequence.
pub fn intent_for_key(key: &str) -> Option<Intent> {
    let key = key.trim();
    if let Some(intent) = arrow_escape(key) {
        return Some(intent);
    }
    let key = key
        .strip_prefix('<')
        .and_then(|k| k.strip_suffix('>'))
        .unwrap_or(key);

    let intent = match key.to_ascii_lowercase().as_str() {
        "up" => Intent::MoveForward,
        "down" => Intent::MoveBackward,
        "left" => Intent::TurnLeft,
        "right" => Intent::TurnRight,
        "p" => Intent::SetModePassive,
        "s" => Intent::SetModeSafe,
        "f" => Intent::SetModeFull,
        "o" => Intent::Stop,
        "k" => Intent::SeekDock,
        "d" => Intent::PowerDown,
        "q" | "c-c" => Intent::Quit,
        _ => return None,
    };
    Some(intent)
}

/// `ESC [ A` (normal cursor mode) or `ESC O A` (application mode) and friends
fn arrow_escape(key: &str) -> Option<Intent> {
    let rest = key
        .strip_prefix("\x1b[")
        .or_else(|| key.strip_prefix("\x1bO"))?;
    match rest {
        "A" => Some(Intent::MoveForward),
        "B" => Some(Intent::MoveBackward),
        "C" => Some(Intent::TurnRight),
        "D" => Some(Intent::TurnLeft),
        _ => None,
    }
}
