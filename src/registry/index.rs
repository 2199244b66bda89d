use crate::error::RegistryError;

/// A reserved, contiguous range of id magnitudes owned by one component
/// instance.
///
/// Ids are handed out in order from `base`; blocks reserved from the same
/// allocator never overlap, which is what makes ids process-unique without
/// any global coordination beyond the allocator cursor. Deliberately not
/// `Clone`: a duplicated block would hand out the same id twice.
#[derive(Debug)]
pub struct IndexBlock {
    base: i64,
    size: i64,
    used: i64,
}

impl IndexBlock {
    /// Returns the first magnitude of the block.
    #[must_use]
    pub fn base(&self) -> i64 {
        self.base
    }

    /// Returns the block capacity.
    #[must_use]
    pub fn size(&self) -> i64 {
        self.size
    }

    /// Returns how many ids are still available.
    #[must_use]
    pub fn remaining(&self) -> i64 {
        self.size - self.used
    }

    /// Returns `true` if `id` falls inside this block's range.
    #[must_use]
    pub fn contains(&self, id: i64) -> bool {
        id >= self.base && id < self.base + self.size
    }

    /// Takes the next id from the block.
    pub(crate) fn take(&mut self) -> Result<i64, RegistryError> {
        if self.used == self.size {
            return Err(RegistryError::BlockExhausted {
                base: self.base,
                end: self.base + self.size,
            });
        }
        let id = self.base + self.used;
        self.used += 1;
        Ok(id)
    }
}

/// Monotonic cursor handing out non-overlapping [`IndexBlock`]s.
#[derive(Debug)]
pub(crate) struct IndexAllocator {
    next: i64,
}

impl IndexAllocator {
    /// Starts allocation at `start` (magnitudes must stay positive).
    pub(crate) fn new(start: i64) -> Self {
        Self { next: start }
    }

    /// Reserves a contiguous block of `size` ids.
    pub(crate) fn reserve(&mut self, size: i64) -> Result<IndexBlock, RegistryError> {
        if size <= 0 {
            return Err(RegistryError::InvalidBlockSize(size));
        }
        let base = self.next;
        self.next = base
            .checked_add(size)
            .ok_or(RegistryError::AllocationExhausted { requested: size })?;
        Ok(IndexBlock {
            base,
            size,
            used: 0,
        })
    }
}
