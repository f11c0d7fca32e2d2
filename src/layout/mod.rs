//! Axis label collision resolution.

mod collision;
mod label;
mod truncation;

pub use collision::{AdaptiveLayoutConfig, resolve_collisions, resolve_collisions_adaptive};
pub use label::{
    LabelCandidate, LabelPriority, PixelBox, boxes_overlap, estimate_label_text_width_px,
};
pub use truncation::{TruncationConfig, resolve_collisions_with_truncation, shorten_label};
