//! Append-only string pool.
//!
//! Names are stored NUL-terminated in one contiguous byte buffer and
//! addressed by byte offset. Offset 0 holds a lone NUL and is the "no name"
//! entry; nothing is ever stored there.

use indexmap::IndexMap;
use refl_core::{DbError, NameOffset};

/// Byte buffer of NUL-terminated names.
#[derive(Clone, Debug)]
pub struct StringPool {
    data: Vec<u8>,
    /// Name to offset cache, present only when deduplication is enabled.
    dedup: Option<IndexMap<String, NameOffset>>,
}

impl StringPool {
    /// Create a pool with room for `initial_bytes` bytes.
    pub fn new(initial_bytes: u32, dedup: bool) -> Self {
        let mut data = Vec::with_capacity((initial_bytes as usize).max(1));
        data.push(0);
        Self {
            data,
            dedup: dedup.then(IndexMap::new),
        }
    }

    /// Adopt raw pool bytes read back from storage.
    ///
    /// The buffer must start with the empty name, end with a NUL and hold
    /// only UTF-8 names.
    pub fn from_bytes(data: Vec<u8>) -> Result<Self, DbError> {
        match (data.first(), data.last()) {
            (Some(0), Some(0)) => {}
            (None, _) => {
                return Err(DbError::Corrupt {
                    detail: "string pool is empty".into(),
                })
            }
            (Some(0), _) => {
                return Err(DbError::Corrupt {
                    detail: "string pool is not NUL-terminated".into(),
                })
            }
            (Some(_), _) => {
                return Err(DbError::Corrupt {
                    detail: "string pool does not start with the empty name".into(),
                })
            }
        }
        if data.len() > u32::MAX as usize {
            return Err(DbError::CapacityExceeded {
                what: "string pool",
                limit: u32::MAX as usize,
            });
        }
        if let Err(e) = std::str::from_utf8(&data) {
            return Err(DbError::Corrupt {
                detail: format!("string pool is not UTF-8 at byte {}", e.valid_up_to()),
            });
        }
        Ok(Self { data, dedup: None })
    }

    /// Copy `text` into the pool and return its offset.
    ///
    /// Empty text yields [`NameOffset::EMPTY`] without storing anything.
    /// Text is stored up to its first NUL byte.
    pub fn intern(&mut self, text: &str) -> Result<NameOffset, DbError> {
        let text = match text.find('\0') {
            Some(end) => &text[..end],
            None => text,
        };
        if text.is_empty() {
            return Ok(NameOffset::EMPTY);
        }
        if let Some(offset) = self.dedup.as_ref().and_then(|m| m.get(text)) {
            return Ok(*offset);
        }

        let offset = self.data.len();
        let needed = offset + text.len() + 1;
        if needed > u32::MAX as usize {
            return Err(DbError::CapacityExceeded {
                what: "string pool",
                limit: u32::MAX as usize,
            });
        }
        self.reserve_for(needed)?;
        self.data.extend_from_slice(text.as_bytes());
        self.data.push(0);

        let offset = NameOffset(offset as u32);
        if let Some(map) = self.dedup.as_mut() {
            map.insert(text.to_owned(), offset);
        }
        Ok(offset)
    }

    /// Resolve an offset to its text.
    ///
    /// Offset 0, an out-of-range offset, or an offset inside a multi-byte
    /// character resolves to the empty string.
    pub fn resolve(&self, offset: NameOffset) -> &str {
        let start = offset.0 as usize;
        if start == 0 || start >= self.data.len() {
            return "";
        }
        let tail = &self.data[start..];
        let end = tail.iter().position(|&b| b == 0).unwrap_or(tail.len());
        std::str::from_utf8(&tail[..end]).unwrap_or("")
    }

    /// The used bytes, including the leading empty name.
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    /// Number of used bytes.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Whether no name has been stored.
    pub fn is_empty(&self) -> bool {
        self.data.len() <= 1
    }

    /// Allocated capacity in bytes.
    pub fn capacity(&self) -> usize {
        self.data.capacity()
    }

    fn reserve_for(&mut self, needed: usize) -> Result<(), DbError> {
        let capacity = self.data.capacity();
        if needed <= capacity {
            return Ok(());
        }
        let mut target = capacity.max(1);
        while target < needed {
            target <<= 1;
        }
        self.data
            .try_reserve_exact(target - self.data.len())
            .map_err(|_| DbError::AllocationFailed {
                what: "string pool",
                requested: target,
            })?;
        tracing::trace!(from = capacity, to = target, "string pool grown");
        Ok(())
    }
}

impl Default for StringPool {
    fn default() -> Self {
        Self::new(1, false)
    }
}
