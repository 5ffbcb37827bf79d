use crate::{
    channel::DeviceChannel,
    error::{WriteError, WriteResult},
    field::{DependencyBlock, WritableField},
};
use tracing::debug;

/// Read-modify-write merge of a field's words into its dependency block.
///
/// The merge is a pure function of the field configuration, the new words
/// and the current known/fetched block contents; repeated calls with the
/// same inputs produce structurally identical write requests.
pub struct WriteMerger;

impl WriteMerger {
    /// Produce the final contiguous write for a field.
    ///
    /// Without a dependency the field's own words are written at its target
    /// address. With one, the block is resolved first and the field's
    /// sub-range is overwritten in place so the whole block goes back to the
    /// device as a single request.
    pub async fn merge(
        field: &WritableField,
        new_words: Vec<u16>,
        channel: &dyn DeviceChannel,
    ) -> WriteResult<(u16, Vec<u16>)> {
        let Some(block) = field.dependency() else {
            return Ok((field.target_address(), new_words));
        };

        let mut words = Self::resolve(block, channel).await?;
        let offset = usize::from(field.target_address() - block.start());
        words[offset..offset + new_words.len()].copy_from_slice(&new_words);

        debug!(
            address = format_args!("{:#06x}", block.start()),
            length = words.len(),
            offset,
            "merged field words into dependency block"
        );

        Ok((block.start(), words))
    }

    /// Resolve a dependency block to a fully-populated word buffer.
    ///
    /// Issues a single whole-block read only when at least one offset has no
    /// preset value. Preset words always win over fetched ones.
    pub async fn resolve(
        block: &DependencyBlock,
        channel: &dyn DeviceChannel,
    ) -> WriteResult<Vec<u16>> {
        let length = usize::from(block.length());

        let mut words = if block.needs_fetch() {
            let fetched = channel.read_registers(block.start(), block.length()).await?;
            if fetched.len() != length {
                return Err(WriteError::DeviceRead(format!(
                    "Dependency read at {:#06x} returned {} word(s), expected {}",
                    block.start(),
                    fetched.len(),
                    length
                )));
            }
            fetched
        } else {
            vec![0; length]
        };

        for offset in 0..block.length() {
            if let Some(value) = block.known_word(offset) {
                words[usize::from(offset)] = value;
            }
        }

        Ok(words)
    }
}
