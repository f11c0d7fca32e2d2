//! Chart facade: owns the viewport, drawing engine and plugins of one chart,
//! routes host input and renders batched frames.

mod data_controller;
mod engine;
mod engine_config;
mod interaction_controller;
mod invalidation;
mod json_contract;
mod plugin_dispatch;
mod plugin_registry;
mod render_coordinator;
mod render_frame_builder;

pub use engine::ChartEngine;
pub use engine_config::ChartEngineConfig;
pub use invalidation::{InvalidationLevel, InvalidationMask, InvalidationTopic, InvalidationTopics};
pub use json_contract::{ChartEngineConfigJsonContractV1, ENGINE_CONFIG_JSON_SCHEMA_V1};
pub use render_frame_builder::FrameCacheStats;
