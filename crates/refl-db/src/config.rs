//! Database configuration parameters.

use refl_core::ConfigError;

/// Configuration for a new [`DeclDb`](crate::DeclDb).
///
/// Controls initial buffer sizing and whether the intrinsic catalog is
/// installed. Validated at construction.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DbConfig {
    /// Initial arena capacity in records, including the sentinel.
    ///
    /// Default: 128. Capacity doubles whenever it is exhausted.
    pub initial_records: u32,

    /// Initial string pool capacity in bytes, including the empty name.
    ///
    /// Default: 128. Capacity doubles whenever it is exhausted.
    pub initial_pool_bytes: u32,

    /// Install the intrinsic catalog into the fresh database.
    pub with_intrinsics: bool,

    /// Reuse the offset of a previously interned identical name.
    ///
    /// Off by default: the pool stores every name it is given.
    pub dedup_names: bool,
}

impl DbConfig {
    /// Default initial arena capacity.
    pub const DEFAULT_INITIAL_RECORDS: u32 = 128;

    /// Default initial string pool capacity.
    pub const DEFAULT_INITIAL_POOL_BYTES: u32 = 128;

    /// A config with no intrinsic catalog, as used when loading a file.
    pub fn bare() -> Self {
        Self {
            with_intrinsics: false,
            ..Self::default()
        }
    }

    /// Check structural invariants.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.initial_records == 0 {
            return Err(ConfigError::ZeroCapacity {
                field: "initial_records",
            });
        }
        if self.initial_pool_bytes == 0 {
            return Err(ConfigError::ZeroCapacity {
                field: "initial_pool_bytes",
            });
        }
        Ok(())
    }
}

impl Default for DbConfig {
    fn default() -> Self {
        Self {
            initial_records: Self::DEFAULT_INITIAL_RECORDS,
            initial_pool_bytes: Self::DEFAULT_INITIAL_POOL_BYTES,
            with_intrinsics: true,
            dedup_names: false,
        }
    }
}
