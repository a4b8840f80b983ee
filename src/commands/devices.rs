//! Input device code translation.
//!
//! Programs address keys by DirectInput scancode (`KeyDown(57)` is space)
//! and mouse buttons as 1 = left, 2 = right, 3 = middle. The runtime works
//! with DOM `KeyboardEvent.code` strings and `MouseEvent.button` numbers.

/// Which device a code refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Device {
    Keyboard,
    Mouse,
}

impl Device {
    /// Translates lowered argument text.
    ///
    /// Integer literals are mapped at compile time; anything else is wrapped
    /// in a runtime lookup.
    pub fn translate(&self, arg: &str) -> String {
        let literal = arg.trim().parse::<i64>().ok();
        match (self, literal) {
            (Device::Keyboard, Some(code)) => match scancode_key(code) {
                Some(key) => format!("\"{}\"", key),
                None => format!("$input.keyCode({})", code),
            },
            (Device::Mouse, Some(code)) => match mouse_button(code) {
                Some(button) => button.to_string(),
                None => format!("$input.mouseButton({})", code),
            },
            (Device::Keyboard, None) => format!("$input.keyCode({})", arg),
            (Device::Mouse, None) => format!("$input.mouseButton({})", arg),
        }
    }
}

/// Maps a scancode to a `KeyboardEvent.code` name.
pub fn scancode_key(code: i64) -> Option<&'static str> {
    let key = match code {
        1 => "Escape",
        2 => "Digit1",
        3 => "Digit2",
        4 => "Digit3",
        5 => "Digit4",
        6 => "Digit5",
        7 => "Digit6",
        8 => "Digit7",
        9 => "Digit8",
        10 => "Digit9",
        11 => "Digit0",
        12 => "Minus",
        13 => "Equal",
        14 => "Backspace",
        15 => "Tab",
        16 => "KeyQ",
        17 => "KeyW",
        18 => "KeyE",
        19 => "KeyR",
        20 => "KeyT",
        21 => "KeyY",
        22 => "KeyU",
        23 => "KeyI",
        24 => "KeyO",
        25 => "KeyP",
        26 => "BracketLeft",
        27 => "BracketRight",
        28 => "Enter",
        29 => "ControlLeft",
        30 => "KeyA",
        31 => "KeyS",
        32 => "KeyD",
        33 => "KeyF",
        34 => "KeyG",
        35 => "KeyH",
        36 => "KeyJ",
        37 => "KeyK",
        38 => "KeyL",
        39 => "Semicolon",
        40 => "Quote",
        41 => "Backquote",
        42 => "ShiftLeft",
        43 => "Backslash",
        44 => "KeyZ",
        45 => "KeyX",
        46 => "KeyC",
        47 => "KeyV",
        48 => "KeyB",
        49 => "KeyN",
        50 => "KeyM",
        51 => "Comma",
        52 => "Period",
        53 => "Slash",
        54 => "ShiftRight",
        55 => "NumpadMultiply",
        56 => "AltLeft",
        57 => "Space",
        58 => "CapsLock",
        59 => "F1",
        60 => "F2",
        61 => "F3",
        62 => "F4",
        63 => "F5",
        64 => "F6",
        65 => "F7",
        66 => "F8",
        67 => "F9",
        68 => "F10",
        71 => "Numpad7",
        72 => "Numpad8",
        73 => "Numpad9",
        74 => "NumpadSubtract",
        75 => "Numpad4",
        76 => "Numpad5",
        77 => "Numpad6",
        78 => "NumpadAdd",
        79 => "Numpad1",
        80 => "Numpad2",
        81 => "Numpad3",
        82 => "Numpad0",
        83 => "NumpadDecimal",
        87 => "F11",
        88 => "F12",
        156 => "NumpadEnter",
        157 => "ControlRight",
        181 => "NumpadDivide",
        184 => "AltRight",
        199 => "Home",
        200 => "ArrowUp",
        201 => "PageUp",
        203 => "ArrowLeft",
        205 => "ArrowRight",
        207 => "End",
        208 => "ArrowDown",
        209 => "PageDown",
        210 => "Insert",
        211 => "Delete",
        _ => return None,
    };
    Some(key)
}

/// Maps a mouse button number to `MouseEvent.button`.
pub fn mouse_button(code: i64) -> Option<i64> {
    match code {
        1 => Some(0),
        2 => Some(2),
        3 => Some(1),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_common_scancodes() {
        assert_eq!(scancode_key(57), Some("Space"));
        assert_eq!(scancode_key(200), Some("ArrowUp"));
        assert_eq!(scancode_key(30), Some("KeyA"));
        assert_eq!(scancode_key(999), None);
    }

    #[test]
    fn test_mouse_buttons() {
        assert_eq!(mouse_button(1), Some(0));
        assert_eq!(mouse_button(3), Some(1));
        assert_eq!(mouse_button(4), None);
    }

    #[test]
    fn test_translate_literals_and_expressions() {
        assert_eq!(Device::Keyboard.translate("203"), "\"ArrowLeft\"");
        assert_eq!(Device::Keyboard.translate("k"), "$input.keyCode(k)");
        assert_eq!(Device::Keyboard.translate("300"), "$input.keyCode(300)");
        assert_eq!(Device::Mouse.translate("2"), "2");
        assert_eq!(Device::Mouse.translate("b + 1"), "$input.mouseButton(b + 1)");
    }
}
