use crate::error::WriteResult;
use async_trait::async_trait;

/// Request/response channel to the device.
///
/// Implementations own framing, transport, serialization of concurrent
/// callers and any retry policy. The write pipeline issues at most one read
/// and exactly one write per operation and assumes the channel keeps
/// requests ordered.
#[async_trait]
pub trait DeviceChannel: Send + Sync {
    /// Read `count` consecutive words starting at `address`.
    async fn read_registers(&self, address: u16, count: u16) -> WriteResult<Vec<u16>>;

    /// Write a contiguous word block starting at `address`, returning the
    /// number of registers the device acknowledged.
    async fn write_registers(&self, address: u16, words: &[u16]) -> WriteResult<u16>;
}

/// Caller-visible state sink, notified only on confirmed write success.
pub trait StateSink: Send + Sync {
    /// Apply the display state together with the raw words the field
    /// encoded to.
    fn apply(&self, display: &str, raw: &[u16]);
}
