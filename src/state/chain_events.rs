//! Change signal raised once per terminal transaction receipt

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ChainEventCounter {
    value: u64,
}

impl ChainEventCounter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn value(&self) -> u64 {
        self.value
    }

    pub fn notify(&mut self) -> u64 {
        self.value += 1;
        self.value
    }
}

/// Last counter value a consumer has acted on
#[derive(Debug, Default, Clone, Copy)]
pub struct ChainEventCursor {
    seen: u64,
}

impl ChainEventCursor {
    pub fn at(counter: &ChainEventCounter) -> Self {
        Self {
            seen: counter.value(),
        }
    }

    /// True when the counter moved since the last call; advances the cursor.
    pub fn observe(&mut self, counter: &ChainEventCounter) -> bool {
        let current = counter.value();
        if current == self.seen {
            return false;
        }
        self.seen = current;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_notify_counts() {
        let mut counter = ChainEventCounter::new();
        for _ in 0..5 {
            counter.notify();
        }
        assert_eq!(counter.notify(), 6);
        assert_eq!(counter.value(), 6);
    }

    #[test]
    fn test_cursor_sees_changes_once() {
        let mut counter = ChainEventCounter::new();
        let mut cursor = ChainEventCursor::at(&counter);
        assert!(!cursor.observe(&counter));

        counter.notify();
        counter.notify();
        assert!(cursor.observe(&counter));
        assert!(!cursor.observe(&counter));
    }
}
