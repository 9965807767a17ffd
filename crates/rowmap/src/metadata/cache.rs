//! Process-wide descriptor cache.
//!
//! Keyed by `TypeId`, populated lazily, never evicted: the number of
//! entries is bounded by the record types a program uses. `try_get_with`
//! coalesces concurrent first builds of the same type into a single parse
//! and only holds the per-key lock for the build itself.

use std::any::TypeId;
use std::sync::{Arc, OnceLock};

use moka::sync::Cache;
use rowmap_core::{Error, Record};

use super::descriptor::{MappingFailure, TableDescriptor};

static DESCRIPTORS: OnceLock<Cache<TypeId, Arc<TableDescriptor>>> = OnceLock::new();

fn descriptors() -> &'static Cache<TypeId, Arc<TableDescriptor>> {
    DESCRIPTORS.get_or_init(|| Cache::builder().build())
}

/// The descriptor for `T`, parsing its tags on first use.
pub fn describe<T: Record>() -> Result<Arc<TableDescriptor>, Error> {
    descriptors()
        .try_get_with(TypeId::of::<T>(), || {
            let descriptor = TableDescriptor::build::<T>()?;
            tracing::debug!(
                record = descriptor.type_name(),
                columns = descriptor.fields().len(),
                "described record type"
            );
            Ok::<_, MappingFailure>(Arc::new(descriptor))
        })
        .map_err(|failure| Error::from((*failure).clone()))
}
