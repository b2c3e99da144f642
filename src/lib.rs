//! Engagement suitability scoring and outreach policy gating for tracked
//! accounts, driven by versioned configuration packs.

pub mod config;
pub mod engagement;
pub mod error;
pub mod http;
pub mod packs;
pub mod telemetry;
