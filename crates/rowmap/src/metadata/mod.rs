//! Record metadata: tag parsing, table descriptors and the process-wide
//! descriptor cache.

mod cache;
mod descriptor;
mod tags;

pub use cache::describe;
pub use descriptor::{FieldMapping, RemainderField, TableDescriptor};
pub use tags::{parse_tag, ParsedTag};
