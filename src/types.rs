use serde::{Deserialize, Serialize};
use serde_repr::{Deserialize_repr, Serialize_repr};
use std::time::Duration;

/// Access mode of a register field.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize_repr, Deserialize_repr)]
#[repr(i16)]
pub enum AccessMode {
    Read = 0,
    Write = 1,
    ReadWrite = 2,
}

/// Declarative encoding of a logical value into register words.
///
/// One variant per encoding mode; `registerCount` drives whether the value is
/// split across two words or packed into one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", tag = "mode")]
pub enum Encoding {
    /// `month * scale + day` in one word, or the raw component pair in two.
    #[serde(rename_all = "camelCase")]
    Scaled {
        #[serde(default = "Encoding::default_scale")]
        scale: u16,
        register_count: u8,
    },
    /// Big-endian 16-bit split of an integer with sign-aware left-padding.
    #[serde(rename_all = "camelCase")]
    SplitInt {
        #[serde(default)]
        signed: bool,
        register_count: u8,
    },
    /// Two decimal sub-values packed digit-wise into hex bytes. In the
    /// two-register form each packed word gains `hexBase` when the field
    /// lives in the packed-with-base address family (>= 0x100).
    #[serde(rename_all = "camelCase")]
    HexPacked {
        #[serde(default = "Encoding::default_hex_base")]
        hex_base: u16,
        register_count: u8,
    },
}

impl Encoding {
    /// Default scale (month * 100 + day).
    fn default_scale() -> u16 {
        100
    }

    /// Default base offset for packed words (device convention).
    fn default_hex_base() -> u16 {
        0x100
    }

    /// Number of target words this encoding produces.
    #[inline]
    pub fn register_count(&self) -> u8 {
        match self {
            Encoding::Scaled { register_count, .. }
            | Encoding::SplitInt { register_count, .. }
            | Encoding::HexPacked { register_count, .. } => *register_count,
        }
    }
}

/// A preset word inside a dependency block, keyed by absolute address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PresetWord {
    pub address: u16,
    pub value: u16,
}

/// Declarative dependency block: a larger address range that must remain
/// internally consistent across the write.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DependencyModel {
    /// Block base address.
    pub start: u16,
    /// Number of words in the block.
    pub length: u16,
    /// Words whose value is fixed without querying the device.
    #[serde(default)]
    pub data: Vec<PresetWord>,
}

/// Declarative form of a writable field, as it appears in device profiles.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldModel {
    pub key: String,
    pub name: String,
    #[serde(default = "FieldModel::default_access_mode")]
    pub access_mode: AccessMode,
    /// Target registers, ascending and contiguous (1 or 2 entries).
    pub registers: Vec<u16>,
    pub encoding: Encoding,
    #[serde(default)]
    pub dependencies: Option<DependencyModel>,
}

impl FieldModel {
    fn default_access_mode() -> AccessMode {
        AccessMode::ReadWrite
    }
}

/// Per-operation deadlines for device channel calls.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WritePolicy {
    #[serde(default = "WritePolicy::default_read_timeout_ms")]
    pub read_timeout_ms: u64,
    #[serde(default = "WritePolicy::default_write_timeout_ms")]
    pub write_timeout_ms: u64,
}

impl WritePolicy {
    fn default_read_timeout_ms() -> u64 {
        10000
    }
    fn default_write_timeout_ms() -> u64 {
        10000
    }
}

impl Default for WritePolicy {
    fn default() -> Self {
        Self {
            read_timeout_ms: WritePolicy::default_read_timeout_ms(),
            write_timeout_ms: WritePolicy::default_write_timeout_ms(),
        }
    }
}

/// Result of a confirmed write: the request as issued plus the device ack.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WriteReceipt {
    /// Address the combined write started at.
    pub address: u16,
    /// Words as written, dependency merge included.
    pub words: Vec<u16>,
    /// Positive acknowledgement count reported by the device.
    pub acknowledged: u16,
}

/// Writer request metrics snapshot.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WriterMetrics {
    pub total_requests: u64,
    pub successful_requests: u64,
    pub failed_requests: u64,
    pub average_response_time: Duration,
}
