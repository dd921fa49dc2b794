//! Typed delete confirmation

/// Delete is only enabled once the operator has re-typed the exact name
#[derive(Debug, Clone)]
pub struct DeleteConfirmation {
    name: String,
    typed: String,
}

impl DeleteConfirmation {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            typed: String::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn set_input(&mut self, typed: impl Into<String>) {
        self.typed = typed.into();
    }

    /// Exact, case-sensitive match
    pub fn can_confirm(&self) -> bool {
        self.typed == self.name
    }

    pub fn prompt(&self) -> String {
        format!(
            "This action cannot be undone. Type \"{}\" to confirm deletion.",
            self.name
        )
    }
}
