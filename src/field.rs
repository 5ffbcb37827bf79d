use crate::{
    codec::WordEncoding,
    error::{WriteError, WriteResult},
    types::{AccessMode, DependencyModel, Encoding, FieldModel},
};
use std::collections::HashMap;

/// Address family boundary: fields at or above this address use the
/// packed-with-base encoding variant (device convention).
const PACKED_BASE_FAMILY_START: u16 = 0x100;

/// An address range that must remain internally consistent across a write.
///
/// `known` maps relative offsets to preset words; offsets without an entry
/// are unknown until fetched from the device. The sparse map distinguishes
/// "unset" from "explicitly zero".
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DependencyBlock {
    start: u16,
    length: u16,
    known: HashMap<u16, u16>,
}

impl DependencyBlock {
    /// Build a block from its declarative model, converting absolute preset
    /// addresses to relative offsets and enforcing the range invariants.
    pub fn from_model(model: &DependencyModel) -> WriteResult<Self> {
        if model.length == 0 {
            return Err(WriteError::InvalidConfiguration(
                "Dependency block length must be at least 1".to_string(),
            ));
        }
        let end = model.start.checked_add(model.length - 1).ok_or_else(|| {
            WriteError::InvalidConfiguration(format!(
                "Dependency block {:#06x}+{} exceeds the address space",
                model.start, model.length
            ))
        })?;
        let mut known = HashMap::with_capacity(model.data.len());
        for preset in &model.data {
            if preset.address < model.start || preset.address > end {
                return Err(WriteError::InvalidConfiguration(format!(
                    "Preset address {:#06x} is outside dependency block {:#06x}..={:#06x}",
                    preset.address, model.start, end
                )));
            }
            known.insert(preset.address - model.start, preset.value);
        }
        Ok(Self {
            start: model.start,
            length: model.length,
            known,
        })
    }

    #[inline]
    pub fn start(&self) -> u16 {
        self.start
    }

    #[inline]
    pub fn length(&self) -> u16 {
        self.length
    }

    /// Preset word at a relative offset, if one is configured.
    #[inline]
    pub fn known_word(&self, offset: u16) -> Option<u16> {
        self.known.get(&offset).copied()
    }

    /// True iff at least one offset in the block has no preset value and a
    /// device read is required before the block can be written back.
    pub fn needs_fetch(&self) -> bool {
        (0..self.length).any(|offset| !self.known.contains_key(&offset))
    }
}

/// A writable logical field, validated and immutable after registration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WritableField {
    key: String,
    name: String,
    access_mode: AccessMode,
    target_address: u16,
    encoding: WordEncoding,
    dependency: Option<DependencyBlock>,
}

impl WritableField {
    /// Deserialize a declarative field description and lower it in one step,
    /// the way fields arrive from JSON device profiles.
    pub fn from_json(value: serde_json::Value) -> WriteResult<Self> {
        let model: FieldModel = serde_json::from_value(value).map_err(|e| {
            WriteError::InvalidConfiguration(format!("Failed to deserialize field model: {e}"))
        })?;
        Self::from_model(model)
    }

    /// Validate a declarative field model and lower it into the runtime
    /// descriptor. All count and range invariants are enforced here so the
    /// write path can assume a well-formed field.
    pub fn from_model(model: FieldModel) -> WriteResult<Self> {
        let register_count = model.encoding.register_count();
        if !(1..=2).contains(&register_count) {
            return Err(WriteError::InvalidConfiguration(format!(
                "Register count must be 1 or 2, got {register_count}"
            )));
        }
        if model.registers.len() != usize::from(register_count) {
            return Err(WriteError::InvalidConfiguration(format!(
                "Field '{}' declares {} register(s) but its encoding expects {}",
                model.key,
                model.registers.len(),
                register_count
            )));
        }
        if register_count == 2 && Some(model.registers[1]) != model.registers[0].checked_add(1) {
            return Err(WriteError::InvalidConfiguration(format!(
                "Field '{}' registers must be contiguous ascending",
                model.key
            )));
        }
        let target_address = model.registers[0];

        let encoding = match model.encoding {
            Encoding::Scaled {
                scale,
                register_count,
            } => {
                if scale == 0 {
                    return Err(WriteError::InvalidConfiguration(
                        "Scale must be non-zero".to_string(),
                    ));
                }
                WordEncoding::Scaled {
                    scale,
                    two_words: register_count == 2,
                }
            }
            Encoding::SplitInt {
                signed,
                register_count,
            } => WordEncoding::SplitInt {
                signed,
                words: register_count,
            },
            Encoding::HexPacked {
                hex_base,
                register_count,
            } => WordEncoding::HexPacked {
                base: (register_count == 2 && target_address >= PACKED_BASE_FAMILY_START)
                    .then_some(hex_base),
                two_words: register_count == 2,
            },
        };

        let dependency = match &model.dependencies {
            Some(dep_model) => {
                let block = DependencyBlock::from_model(dep_model)?;
                if target_address < block.start() {
                    return Err(WriteError::InvalidConfiguration(format!(
                        "Field '{}' target {:#06x} lies below its dependency block {:#06x}",
                        model.key,
                        target_address,
                        block.start()
                    )));
                }
                let offset = target_address - block.start();
                if u32::from(offset) + u32::from(register_count) > u32::from(block.length()) {
                    return Err(WriteError::InvalidConfiguration(format!(
                        "Field '{}' target range does not fit inside its dependency block",
                        model.key
                    )));
                }
                Some(block)
            }
            None => None,
        };

        Ok(Self {
            key: model.key,
            name: model.name,
            access_mode: model.access_mode,
            target_address,
            encoding,
            dependency,
        })
    }

    #[inline]
    pub fn key(&self) -> &str {
        &self.key
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    pub fn access_mode(&self) -> AccessMode {
        self.access_mode
    }

    /// Address where the field's own words begin.
    #[inline]
    pub fn target_address(&self) -> u16 {
        self.target_address
    }

    #[inline]
    pub fn encoding(&self) -> &WordEncoding {
        &self.encoding
    }

    #[inline]
    pub fn dependency(&self) -> Option<&DependencyBlock> {
        self.dependency.as_ref()
    }

    /// Address the final combined write must begin at.
    #[inline]
    pub fn write_base_address(&self) -> u16 {
        match &self.dependency {
            Some(block) => self.target_address.min(block.start()),
            None => self.target_address,
        }
    }
}
