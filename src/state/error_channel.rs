/// The single user-visible failure message. Last write wins.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ErrorChannel {
    current: String,
}

impl ErrorChannel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, message: impl Into<String>) {
        self.current = message.into();
    }

    pub fn clear(&mut self) {
        self.current.clear();
    }

    pub fn current(&self) -> &str {
        &self.current
    }

    pub fn is_empty(&self) -> bool {
        self.current.is_empty()
    }
}
