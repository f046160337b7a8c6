//! Rate limiting decision core.

mod engine;
mod fixed_window;
mod local;
mod resolver;
mod strategy;

pub use engine::DecisionEngine;
pub use fixed_window::FixedWindowStrategy;
pub use local::LocalFallbackStrategy;
pub use resolver::{ConfigResolver, RateLimitConfig};
pub use strategy::{RateLimitStrategy, StrategyKind};
