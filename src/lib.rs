// src/lib.rs
// Public library surface for the binary and integration tests.

pub mod collector;
pub mod config;
pub mod dates;
pub mod error;
pub mod event;
pub mod source_weights;
pub mod sources;
pub mod text;

// ---- Re-exports for stable public API ----
pub use crate::collector::{render, request_label, CollectReport, Collector, SourceFailure};
pub use crate::config::AppConfig;
pub use crate::error::{ConfigError, SourceError};
pub use crate::event::{sort_events, Event, EventType, SourceMeta, DEFAULT_WEIGHT};
pub use crate::sources::{PageFetcher, Source};
