//! Built-in subscribers of the event bus.

pub mod ambient;
pub mod notifications;

pub use ambient::{AmbientEffect, AmbientEngine, DEFAULT_FOLLOWED_TEAM_ID};
pub use notifications::{Notification, NotificationSink, attach_notifications, describe};
