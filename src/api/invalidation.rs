use serde::{Deserialize, Serialize};

use crate::render::Renderer;

use super::ChartEngine;

/// Ordered repaint classes; higher levels imply the lower ones.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, Default)]
pub enum InvalidationLevel {
    #[default]
    None,
    /// Only the cursor moved; cached axes and key levels are reused.
    Cursor,
    /// Drawings or the selection changed; cached axes and key levels are reused.
    Light,
    /// Viewport, data or style changed; the frame cache is dropped.
    Full,
}

/// What changed since the last frame, used to decide which cached frame parts
/// stay valid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum InvalidationTopic {
    Cursor,
    Viewport,
    Data,
    Drawings,
    Style,
}

impl InvalidationTopic {
    const fn bit(self) -> u8 {
        match self {
            Self::Cursor => 1 << 0,
            Self::Viewport => 1 << 1,
            Self::Data => 1 << 2,
            Self::Drawings => 1 << 3,
            Self::Style => 1 << 4,
        }
    }

    const fn level(self) -> InvalidationLevel {
        match self {
            Self::Cursor => InvalidationLevel::Cursor,
            Self::Drawings => InvalidationLevel::Light,
            Self::Viewport | Self::Data | Self::Style => InvalidationLevel::Full,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct InvalidationTopics {
    bits: u8,
}

impl InvalidationTopics {
    #[must_use]
    pub const fn none() -> Self {
        Self { bits: 0 }
    }

    #[must_use]
    pub const fn from_topic(topic: InvalidationTopic) -> Self {
        Self { bits: topic.bit() }
    }

    #[must_use]
    pub const fn union(self, other: Self) -> Self {
        Self {
            bits: self.bits | other.bits,
        }
    }

    #[must_use]
    pub const fn contains_topic(self, topic: InvalidationTopic) -> bool {
        self.bits & topic.bit() != 0
    }

    #[must_use]
    pub const fn is_none(self) -> bool {
        self.bits == 0
    }
}

/// Coalesced invalidation request consumed by frame scheduling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct InvalidationMask {
    level: InvalidationLevel,
    topics: InvalidationTopics,
}

impl InvalidationMask {
    #[must_use]
    pub const fn none() -> Self {
        Self {
            level: InvalidationLevel::None,
            topics: InvalidationTopics::none(),
        }
    }

    #[must_use]
    pub const fn from_topic(topic: InvalidationTopic) -> Self {
        Self {
            level: topic.level(),
            topics: InvalidationTopics::from_topic(topic),
        }
    }

    #[must_use]
    pub const fn level(self) -> InvalidationLevel {
        self.level
    }

    #[must_use]
    pub const fn topics(self) -> InvalidationTopics {
        self.topics
    }

    #[must_use]
    pub const fn has_topic(self, topic: InvalidationTopic) -> bool {
        self.topics.contains_topic(topic)
    }

    #[must_use]
    pub const fn is_none(self) -> bool {
        matches!(self.level, InvalidationLevel::None)
    }

    pub fn merge(&mut self, other: Self) {
        self.level = self.level.max(other.level);
        self.topics = self.topics.union(other.topics);
    }
}

impl<R: Renderer> ChartEngine<R> {
    pub(super) fn invalidate(&mut self, topic: InvalidationTopic) {
        self.core
            .pending_invalidation
            .merge(InvalidationMask::from_topic(topic));
    }

    /// Forces a full rebuild on the next frame tick.
    pub fn invalidate_full(&mut self) {
        self.invalidate(InvalidationTopic::Style);
    }

    #[must_use]
    pub fn pending_invalidation(&self) -> InvalidationMask {
        self.core.pending_invalidation
    }

    #[must_use]
    pub fn has_pending_invalidation(&self) -> bool {
        !self.core.pending_invalidation.is_none()
    }
}
