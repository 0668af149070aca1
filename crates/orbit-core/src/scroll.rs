//! Section scroll snapping
//!
//! The page is a stack of viewport-high sections. Scroll events only record
//! an offset; the snap itself is evaluated at most once per frame.

/// Debounced snap-to-section logic
#[derive(Debug, Clone, Default)]
pub struct SectionSnapper {
    last_offset: f32,
    pending: Option<f32>,
}

impl SectionSnapper {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapper for a page currently scrolled to `offset`
    pub fn with_offset(offset: f32) -> Self {
        Self {
            last_offset: offset,
            pending: None,
        }
    }

    /// Record a scroll offset. Only the first offset since the last
    /// evaluation is kept.
    pub fn record(&mut self, offset: f32) {
        if self.pending.is_none() && offset.is_finite() {
            self.pending = Some(offset);
        }
    }

    /// Whether a snap is waiting for the next frame
    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Evaluate the pending snap against the section height.
    ///
    /// Scrolling down rounds up to the next section boundary, anything else
    /// rounds down. Returns the offset to scroll to, or `None` when nothing is
    /// pending or the page already sits on that boundary.
    pub fn evaluate(&mut self, section_height: f32) -> Option<f32> {
        let offset = self.pending.take()?;
        if !(section_height.is_finite() && section_height > 0.0) {
            return None;
        }

        let sections = offset / section_height;
        let target = if offset > self.last_offset {
            sections.ceil()
        } else {
            sections.floor()
        } * section_height;

        self.last_offset = offset;
        ((target - offset).abs() > 0.5).then_some(target)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scrolling_down_snaps_to_next_section() {
        let mut snapper = SectionSnapper::new();
        snapper.record(120.0);
        assert_eq!(snapper.evaluate(800.0), Some(800.0));
    }

    #[test]
    fn test_scrolling_up_snaps_to_previous_section() {
        let mut snapper = SectionSnapper::new();
        snapper.record(1700.0);
        assert_eq!(snapper.evaluate(800.0), Some(2400.0));
        snapper.record(1500.0);
        assert_eq!(snapper.evaluate(800.0), Some(800.0));
    }

    #[test]
    fn test_one_evaluation_per_frame() {
        let mut snapper = SectionSnapper::new();
        snapper.record(100.0);
        snapper.record(400.0);
        assert!(snapper.is_pending());
        // First offset of the frame wins
        assert_eq!(snapper.evaluate(800.0), Some(800.0));
        assert!(!snapper.is_pending());
        assert_eq!(snapper.evaluate(800.0), None);
    }

    #[test]
    fn test_on_boundary_does_nothing() {
        let mut snapper = SectionSnapper::new();
        snapper.record(800.0);
        assert_eq!(snapper.evaluate(800.0), None);
        snapper.record(800.0);
        assert_eq!(snapper.evaluate(800.0), None);
    }

    #[test]
    fn test_degenerate_height_is_ignored() {
        let mut snapper = SectionSnapper::new();
        snapper.record(100.0);
        assert_eq!(snapper.evaluate(0.0), None);
        assert!(!snapper.is_pending());
    }
}
