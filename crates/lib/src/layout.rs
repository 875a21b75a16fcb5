//! Resizable list/detail split.

use crate::config::ListWidthConfig;

/// Width of the list panel, adjusted by dragging the divider. Drag state is transient.
#[derive(Debug, Clone, PartialEq)]
pub struct SplitPane {
    width: f32,
    min: f32,
    max: f32,
    drag: Option<DragStart>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct DragStart {
    pointer_x: f32,
    width: f32,
}

impl SplitPane {
    /// `initial` is clamped into `[min, max]`; `max` below `min` is raised to `min`.
    pub fn new(min: f32, max: f32, initial: f32) -> Self {
        let max = max.max(min);
        Self {
            width: initial.clamp(min, max),
            min,
            max,
            drag: None,
        }
    }

    pub fn from_config(config: &ListWidthConfig) -> Self {
        Self::new(config.min, config.max, config.initial)
    }

    pub fn width(&self) -> f32 {
        self.width
    }

    pub fn is_dragging(&self) -> bool {
        self.drag.is_some()
    }

    pub fn begin_drag(&mut self, pointer_x: f32) {
        self.drag = Some(DragStart {
            pointer_x,
            width: self.width,
        });
    }

    /// Width becomes start width plus pointer delta, clamped. No-op when not dragging.
    pub fn drag_to(&mut self, pointer_x: f32) {
        if let Some(start) = self.drag {
            self.width = (start.width + pointer_x - start.pointer_x).clamp(self.min, self.max);
        }
    }

    pub fn end_drag(&mut self) {
        self.drag = None;
    }
}

impl Default for SplitPane {
    fn default() -> Self {
        Self::from_config(&ListWidthConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn drag_moves_by_pointer_delta() {
        let mut pane = SplitPane::new(100.0, 500.0, 300.0);
        pane.begin_drag(310.0);
        pane.drag_to(350.0);
        assert_eq!(pane.width(), 340.0);
        pane.drag_to(290.0);
        assert_eq!(pane.width(), 280.0);
        pane.end_drag();
        pane.drag_to(1000.0);
        assert_eq!(pane.width(), 280.0);
    }

    #[test]
    fn width_is_clamped() {
        let mut pane = SplitPane::new(100.0, 500.0, 300.0);
        pane.begin_drag(0.0);
        pane.drag_to(-1000.0);
        assert_eq!(pane.width(), 100.0);
        pane.drag_to(1000.0);
        assert_eq!(pane.width(), 500.0);
        assert_eq!(SplitPane::new(100.0, 500.0, 900.0).width(), 500.0);
    }
}
