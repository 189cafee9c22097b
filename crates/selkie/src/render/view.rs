//! Stale-render discard for streaming views.
//!
//! When a chat message is still streaming, a block can be re-rendered while a
//! previous render is in flight. There is no true cancellation of in-flight
//! work; instead every render is tagged with a generation and a completion
//! carrying a stale generation is discarded rather than applied.

use crate::render::BlockOutcome;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Generation(u64);

/// Display slot for one diagram block.
#[derive(Debug, Default)]
pub struct DiagramSlot {
    current: u64,
    content: Option<BlockOutcome>,
}

impl DiagramSlot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Marks the start of a new render and invalidates all earlier ones.
    pub fn begin(&mut self) -> Generation {
        self.current += 1;
        Generation(self.current)
    }

    /// Applies a finished render if it is still current. Returns `false` when
    /// the result was stale and discarded.
    pub fn complete(&mut self, generation: Generation, outcome: BlockOutcome) -> bool {
        if generation.0 != self.current {
            tracing::debug!(
                stale = generation.0,
                current = self.current,
                "discarding stale render result"
            );
            return false;
        }
        self.content = Some(outcome);
        true
    }

    /// The outcome currently on display, if any.
    pub fn content(&self) -> Option<&BlockOutcome> {
        self.content.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(s: &str) -> BlockOutcome {
        BlockOutcome::PlainText(s.to_string())
    }

    #[test]
    fn current_generation_applies() {
        let mut slot = DiagramSlot::new();
        let generation = slot.begin();
        assert!(slot.complete(generation, text("a")));
        assert!(matches!(
            slot.content(),
            Some(BlockOutcome::PlainText(s)) if s == "a"
        ));
    }

    #[test]
    fn stale_generation_is_discarded() {
        let mut slot = DiagramSlot::new();
        let first = slot.begin();
        let second = slot.begin();
        // The older render finishes after the newer one started.
        assert!(!slot.complete(first, text("old")));
        assert!(slot.content().is_none());
        assert!(slot.complete(second, text("new")));
        assert!(matches!(
            slot.content(),
            Some(BlockOutcome::PlainText(s)) if s == "new"
        ));
    }

    #[test]
    fn late_stale_result_does_not_overwrite_newer_content() {
        let mut slot = DiagramSlot::new();
        let first = slot.begin();
        let second = slot.begin();
        assert!(slot.complete(second, text("new")));
        assert!(!slot.complete(first, text("old")));
        assert!(matches!(
            slot.content(),
            Some(BlockOutcome::PlainText(s)) if s == "new"
        ));
    }
}
