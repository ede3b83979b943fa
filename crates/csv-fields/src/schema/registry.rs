//! Process-wide cache of record descriptors.
//!
//! Descriptors are built on first use per record type and shared after
//! that. Failed builds are not cached: describing an invalid record type
//! fails the same way on every call.

use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::sync::{Arc, LazyLock, RwLock};

use super::descriptor::{Record, RecordDescriptor};
use super::error::SchemaResult;

type AnyDescriptor = Arc<dyn Any + Send + Sync>;

/// A cache of [`RecordDescriptor`]s keyed by record type.
pub struct DescriptorRegistry {
    descriptors: RwLock<HashMap<TypeId, AnyDescriptor>>,
}

impl DescriptorRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self {
            descriptors: RwLock::new(HashMap::new()),
        }
    }

    /// Returns the descriptor for `R`, building and caching it on first use.
    ///
    /// # Errors
    ///
    /// Returns the [`SchemaError`](super::SchemaError) from
    /// [`RecordDescriptor::build`] if `R`'s field table is invalid.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    pub fn describe<R: Record>(&self) -> SchemaResult<Arc<RecordDescriptor<R>>> {
        let key = TypeId::of::<R>();

        if let Some(cached) = self
            .descriptors
            .read()
            .expect("descriptor registry poisoned")
            .get(&key)
            .cloned()
            .and_then(|d| d.downcast::<RecordDescriptor<R>>().ok())
        {
            return Ok(cached);
        }

        let built = Arc::new(RecordDescriptor::build(R::record_name(), R::fields())?);
        let mut descriptors = self
            .descriptors
            .write()
            .expect("descriptor registry poisoned");
        // Another thread may have built it meanwhile; keep the first one.
        let entry = descriptors
            .entry(key)
            .or_insert_with(|| built.clone() as AnyDescriptor)
            .clone();
        Ok(entry.downcast::<RecordDescriptor<R>>().unwrap_or(built))
    }

    /// Returns `true` if a descriptor for `R` is cached.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    #[must_use]
    pub fn contains<R: Record>(&self) -> bool {
        self.descriptors
            .read()
            .expect("descriptor registry poisoned")
            .contains_key(&TypeId::of::<R>())
    }

    /// Returns the number of cached descriptors.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    #[must_use]
    pub fn len(&self) -> usize {
        self.descriptors
            .read()
            .expect("descriptor registry poisoned")
            .len()
    }

    /// Returns `true` if nothing is cached.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for DescriptorRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Global descriptor registry used by [`describe`] and the codec.
pub static DESCRIPTOR_REGISTRY: LazyLock<DescriptorRegistry> =
    LazyLock::new(DescriptorRegistry::new);

/// Returns the descriptor for record type `R` from the global registry.
///
/// # Errors
///
/// Returns [`SchemaError::MissingPosition`](super::SchemaError::MissingPosition)
/// if any field of `R` lacks a column index, or
/// [`SchemaError::DuplicateIndex`](super::SchemaError::DuplicateIndex) if two
/// fields share one.
pub fn describe<R: Record>() -> SchemaResult<Arc<RecordDescriptor<R>>> {
    DESCRIPTOR_REGISTRY.describe::<R>()
}
