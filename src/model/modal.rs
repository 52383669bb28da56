//! Modal stack for managing overlays
//!
//! Dialog state lives in the dialog components; the stack only records which
//! overlays are open and in what order.

use crate::components::confirm_dialog::ConfirmDialog;

/// Represents a modal overlay that can be displayed on top of the main UI
#[derive(Debug, Clone, PartialEq)]
pub enum Modal {
    /// Yes/no confirmation (quit, delete connection, delete table group)
    Confirm(ConfirmDialog),
    /// Help dialog showing all keyboard shortcuts
    Help,
    /// Create or edit a connection
    ConnectionForm,
    /// Create a table group under the opened connection
    TableGroupForm,
    /// Start a profiling run for one table group
    TriggerProfiling,
    /// Enter or clear the bearer token
    Token,
    /// Run history list and profile results
    History,
}

/// A stack of modal overlays
///
/// Modals are rendered from bottom to top, with only the top modal
/// receiving input events.
#[derive(Debug, Default)]
pub struct ModalStack {
    stack: Vec<Modal>,
}

impl ModalStack {
    /// Create a new empty modal stack
    pub fn new() -> Self {
        Self { stack: Vec::new() }
    }

    /// Push a modal onto the stack
    pub fn push(&mut self, modal: Modal) {
        self.stack.push(modal);
    }

    /// Pop the top modal from the stack
    pub fn pop(&mut self) -> Option<Modal> {
        self.stack.pop()
    }

    /// Get a reference to the top modal without removing it
    pub fn top(&self) -> Option<&Modal> {
        self.stack.last()
    }

    /// Check if the stack is empty
    pub fn is_empty(&self) -> bool {
        self.stack.is_empty()
    }

    /// Bottom-to-top iteration, the order overlays are drawn in
    pub fn iter(&self) -> impl Iterator<Item = &Modal> {
        self.stack.iter()
    }

    /// Whether `modal` is open anywhere in the stack
    pub fn contains(&self, modal: &Modal) -> bool {
        self.stack.contains(modal)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::action::Action;

    #[test]
    fn test_modal_stack_push_pop() {
        let mut stack = ModalStack::new();
        assert!(stack.top().is_none());

        stack.push(Modal::ConnectionForm);
        stack.push(Modal::Confirm(ConfirmDialog::quit()));
        assert_eq!(stack.iter().count(), 2);

        let top = stack.pop();
        assert_eq!(top, Some(Modal::Confirm(ConfirmDialog::quit())));

        let top = stack.pop();
        assert_eq!(top, Some(Modal::ConnectionForm));
        assert!(stack.is_empty());
    }

    #[test]
    fn test_contains_compares_confirm_payload() {
        let mut stack = ModalStack::new();
        stack.push(Modal::Confirm(ConfirmDialog::delete_connection(3, "prod")));
        assert!(stack.contains(&Modal::Confirm(ConfirmDialog::delete_connection(3, "prod"))));
        assert!(!stack.contains(&Modal::Confirm(ConfirmDialog::new(
            "Quit?",
            "Are you sure you want to quit?",
            Action::ForceQuit
        ))));
    }
}
