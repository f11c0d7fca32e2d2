//! Visible window, derived price range and edge-triggered data loading.

mod config;
mod edge;
mod manager;
mod state;

pub use config::{EdgeLoadingConfig, ViewportConfig};
pub use edge::{
    BarSupply, EdgeApplyOutcome, EdgeRequest, EdgeResponse, EdgeSide, NoBarSupply,
};
pub use manager::ViewportManager;
pub use state::{RangeChange, ViewportSnapshot, ViewportState};
