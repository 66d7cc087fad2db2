pub mod isolate;
pub mod polling_interval;
pub mod relevance;
