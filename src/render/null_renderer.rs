use crate::error::ChartResult;
use crate::render::{RenderFrame, Renderer};

/// No-op renderer used by tests and headless engine usage.
///
/// It still validates frame content so tests can catch invalid geometry before
/// a real backend is introduced.
#[derive(Debug, Default)]
pub struct NullRenderer {
    pub frames_rendered: usize,
    pub last_time_label_count: usize,
    pub last_price_label_count: usize,
    pub last_drawing_primitive_count: usize,
    pub last_frame: Option<RenderFrame>,
}

impl Renderer for NullRenderer {
    fn render(&mut self, frame: &RenderFrame) -> ChartResult<()> {
        frame.validate()?;
        self.frames_rendered += 1;
        self.last_time_label_count = frame.visible_time_labels.len();
        self.last_price_label_count = frame.visible_price_labels.len();
        self.last_drawing_primitive_count = frame.drawing_primitive_count();
        self.last_frame = Some(frame.clone());
        Ok(())
    }
}
