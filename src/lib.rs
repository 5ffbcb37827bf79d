//! Register value codec and dependency-aware write merge for devices that
//! expose state as 16-bit registers behind whole-block read/write requests.

mod channel;
mod codec;
mod error;
mod field;
mod merge;
mod types;
mod value;
mod writer;

pub use channel::{DeviceChannel, StateSink};
pub use codec::{RegisterCodec, WordEncoding};
pub use error::{WriteError, WriteResult};
pub use field::{DependencyBlock, WritableField};
pub use merge::WriteMerger;
pub use types::{
    AccessMode, DependencyModel, Encoding, FieldModel, PresetWord, WritePolicy, WriteReceipt,
    WriterMetrics,
};
pub use value::LogicalValue;
pub use writer::RegisterWriter;
