//! Comment composer input handling.

/// Key of a key-down event, as far as the composer cares.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
	/// Return/Enter.
	Enter,
	/// Up arrow.
	ArrowUp,
	/// Down arrow.
	ArrowDown,
	/// Anything else.
	Other,
}

impl Key {
	/// Maps a DOM `KeyboardEvent.key` value.
	pub fn from_name(name: &str) -> Self {
		match name {
			"Enter" => Self::Enter,
			"ArrowUp" => Self::ArrowUp,
			"ArrowDown" => Self::ArrowDown,
			_ => Self::Other,
		}
	}
}

/// A key-down event with its modifier state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyPress {
	/// Pressed key.
	pub key: Key,
	/// Control held.
	pub ctrl: bool,
	/// Meta (Command) held.
	pub meta: bool,
}

impl KeyPress {
	/// A press without modifiers.
	pub fn plain(key: Key) -> Self {
		Self {
			key,
			ctrl: false,
			meta: false,
		}
	}
}

/// What the composer does with a key-down event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyAction {
	/// Send the comment.
	Submit,
	/// The mention popup consumes the key; suppress the default action.
	PreventDefault,
	/// Keep the key inside the composer.
	StopPropagation,
}

/// Decides how the composer reacts to `press`.
///
/// Ctrl/Meta+Enter submits non-empty input. While mention suggestions are
/// shown, Enter and vertical arrows drive the popup.
pub fn handle_keydown(press: KeyPress, input: &str, mentions_shown: bool) -> KeyAction {
	if (press.ctrl || press.meta) && press.key == Key::Enter && !input.is_empty() {
		return KeyAction::Submit;
	}
	let navigates_popup = matches!(press.key, Key::Enter | Key::ArrowUp | Key::ArrowDown);
	if navigates_popup && mentions_shown {
		return KeyAction::PreventDefault;
	}
	KeyAction::StopPropagation
}

/// Replaces non-breaking spaces from rich-text input with plain spaces.
pub fn cleanup_empty_spaces(input: &str) -> String {
	input.replace('\u{a0}', " ")
}
