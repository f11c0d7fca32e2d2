use serde::{Deserialize, Serialize};

use crate::core::PixelPoint;

/// Which layer owns the current pointer press.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum InteractionMode {
    #[default]
    Idle,
    Panning,
    /// The drawing engine consumed the press (drawing or editing).
    Annotating,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PointerButton {
    Primary,
    Secondary,
    Middle,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum KeyInput {
    Delete,
    Backspace,
    Escape,
    Undo,
    Redo,
}

/// Wheel or trackpad scroll at canvas x `x`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WheelInput {
    pub x: f64,
    pub delta_x: f64,
    pub delta_y: f64,
    pub shift: bool,
}

impl WheelInput {
    #[must_use]
    pub fn new(x: f64, delta_x: f64, delta_y: f64) -> Self {
        Self {
            x,
            delta_x,
            delta_y,
            shift: false,
        }
    }

    #[must_use]
    pub fn with_shift(mut self, shift: bool) -> Self {
        self.shift = shift;
        self
    }

    /// Mostly horizontal scrolls pan, mostly vertical ones zoom; shift swaps.
    #[must_use]
    pub fn gesture(self) -> Option<WheelGesture> {
        if !self.x.is_finite() || !self.delta_x.is_finite() || !self.delta_y.is_finite() {
            return None;
        }
        let horizontal = self.delta_x.abs() > self.delta_y.abs();
        let dominant = if horizontal { self.delta_x } else { self.delta_y };
        if dominant == 0.0 {
            return None;
        }
        if horizontal != self.shift {
            Some(WheelGesture::Pan {
                delta_px: -dominant,
            })
        } else {
            Some(WheelGesture::Zoom {
                anchor_x: self.x,
                delta: dominant,
            })
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum WheelGesture {
    /// Content shift in pixels; positive moves bars to the right.
    Pan { delta_px: f64 },
    /// Negative `delta` zooms in.
    Zoom { anchor_x: f64, delta: f64 },
}

/// Pointer routing state kept by the chart facade.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct InteractionState {
    mode: InteractionMode,
    cursor: Option<PixelPoint>,
}

impl InteractionState {
    #[must_use]
    pub fn mode(self) -> InteractionMode {
        self.mode
    }

    /// Last pointer position over the canvas.
    #[must_use]
    pub fn cursor(self) -> Option<PixelPoint> {
        self.cursor
    }

    pub fn on_pointer_move(&mut self, point: PixelPoint) {
        self.cursor = Some(point);
    }

    pub fn on_pointer_leave(&mut self) {
        self.cursor = None;
    }

    pub fn on_pan_start(&mut self) {
        self.mode = InteractionMode::Panning;
    }

    pub fn on_annotation_start(&mut self) {
        self.mode = InteractionMode::Annotating;
    }

    pub fn on_release(&mut self) {
        self.mode = InteractionMode::Idle;
    }
}

#[cfg(test)]
mod tests {
    use super::{WheelGesture, WheelInput};

    #[test]
    fn vertical_scroll_zooms_and_horizontal_pans() {
        assert_eq!(
            WheelInput::new(300.0, 0.0, -120.0).gesture(),
            Some(WheelGesture::Zoom {
                anchor_x: 300.0,
                delta: -120.0
            })
        );
        assert_eq!(
            WheelInput::new(300.0, 40.0, 5.0).gesture(),
            Some(WheelGesture::Pan { delta_px: -40.0 })
        );
    }

    #[test]
    fn shift_swaps_mapping() {
        assert_eq!(
            WheelInput::new(300.0, 0.0, 60.0).with_shift(true).gesture(),
            Some(WheelGesture::Pan { delta_px: -60.0 })
        );
        assert!(matches!(
            WheelInput::new(300.0, 60.0, 0.0).with_shift(true).gesture(),
            Some(WheelGesture::Zoom { .. })
        ));
    }

    #[test]
    fn empty_scroll_is_ignored() {
        assert_eq!(WheelInput::new(10.0, 0.0, 0.0).gesture(), None);
    }
}
