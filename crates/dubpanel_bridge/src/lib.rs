//! Dubpanel bridge: backend calls, poll timer and effect execution.
mod bridge;
mod handle;
mod http;
mod types;

pub use bridge::{Bridge, BridgeSettings};
pub use handle::{BridgeHandle, PollTiming};
pub use http::HttpBridge;
pub use types::{
    BridgeError, BridgeEvent, Call, Notice, Reply, SettingsTarget, WireFileSelection, WireFolder,
    WireInitState, WireProgress, WireProgressMap, WireSettingsReply, WireStartResponse,
    WireTaskUuid,
};
