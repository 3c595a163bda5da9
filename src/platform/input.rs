//! Input mapping
//!
//! Every raw event collapses to a single logical action.

/// Logical game input
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Jump,
    /// Toggle demo mode
    ToggleAutopilot,
}

/// Map a `KeyboardEvent.key` value
pub fn action_for_key(key: &str) -> Option<Action> {
    match key {
        " " | "Spacebar" => Some(Action::Jump),
        "i" | "I" => Some(Action::ToggleAutopilot),
        _ => None,
    }
}

/// Map a pointer-down button (touch reports as the primary button)
pub fn action_for_pointer(button: i16) -> Option<Action> {
    (button == 0).then_some(Action::Jump)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn space_jumps() {
        assert_eq!(action_for_key(" "), Some(Action::Jump));
        assert_eq!(action_for_key("Spacebar"), Some(Action::Jump));
        assert_eq!(action_for_key("Enter"), None);
    }

    #[test]
    fn only_primary_pointer_jumps() {
        assert_eq!(action_for_pointer(0), Some(Action::Jump));
        assert_eq!(action_for_pointer(2), None);
    }
}
