//! Chat webhook delivery backends for relay.

pub mod slack;

pub use slack::SlackNotifier;
