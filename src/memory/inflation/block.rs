/*!
 * Memory Block
 *
 * A committed chunk of heap memory. Allocation is fallible: the buffer is
 * reserved with `try_reserve_exact` so exhaustion surfaces as an error
 * instead of aborting the process, then filled one page at a time in a
 * single pass. Each page starts with the touch pattern, so the kernel has to
 * back every page with physical memory.
 */

use crate::core::limits::TOUCH_PATTERN;
use crate::core::types::{mb_to_bytes, Megabytes};
use std::collections::TryReserveError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BlockAllocError {
    #[error("{size_mb} MB does not fit in the address space")]
    CapacityOverflow { size_mb: Megabytes },

    #[error("allocator refused {size_mb} MB: {source}")]
    Reserve {
        size_mb: Megabytes,
        #[source]
        source: TryReserveError,
    },
}

pub struct MemoryBlock {
    data: Vec<u8>,
    size_mb: Megabytes,
}

impl MemoryBlock {
    /// Allocate `size_mb` megabytes and touch one byte per page
    pub fn allocate(size_mb: Megabytes, page_size: usize) -> Result<Self, BlockAllocError> {
        let len = mb_to_bytes(size_mb)
            .and_then(|bytes| usize::try_from(bytes).ok())
            .ok_or(BlockAllocError::CapacityOverflow { size_mb })?;

        let mut data = Vec::new();
        data.try_reserve_exact(len)
            .map_err(|source| BlockAllocError::Reserve { size_mb, source })?;
        fill_pages(&mut data, len, page_size);

        Ok(Self { data, size_mb })
    }

    pub fn size_mb(&self) -> Megabytes {
        self.size_mb
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Number of pages of `page_size` spanned by the block
    pub fn page_count(&self, page_size: usize) -> usize {
        self.data.len().div_ceil(page_size.max(1))
    }

    pub fn byte_at(&self, offset: usize) -> Option<u8> {
        self.data.get(offset).copied()
    }
}

impl std::fmt::Debug for MemoryBlock {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryBlock")
            .field("size_mb", &self.size_mb)
            .field("len", &self.data.len())
            .finish()
    }
}

/// Grow `data` to `len` bytes page by page, writing the touch pattern at the
/// start of each page. Stays within reserved capacity. Returns pages touched.
fn fill_pages(data: &mut Vec<u8>, len: usize, page_size: usize) -> usize {
    let page_size = page_size.max(1);
    let mut touched = 0;
    while data.len() < len {
        let page_end = (data.len() + page_size).min(len);
        data.push(TOUCH_PATTERN);
        data.resize(page_end, 0);
        touched += 1;
    }
    touched
}
