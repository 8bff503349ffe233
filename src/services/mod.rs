pub mod aggregator;
pub mod ai_decode;
pub mod catalog;
pub mod engine;
pub mod providers;
pub mod ranking;
