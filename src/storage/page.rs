//! Page - the fundamental fixed-size unit of storage.
//!
//! A [`Page`] is a raw byte array that serves as the unit of I/O
//! between a backing file and memory, plus its own self-identifying
//! [`PageId`]. Pages are stored in [`Frame`](crate::buffer::Frame)s
//! within the buffer pool.

use crate::common::config::PAGE_SIZE;
use crate::common::PageId;

/// A page of data (4KB, 4KB-aligned), carrying its own page id.
///
/// This is the fundamental unit of I/O between a backing file and
/// memory. The buffer pool manages these in frames.
///
/// # Why 4KB Alignment?
/// Operating systems and storage devices work most efficiently with aligned I/O:
/// - SSDs have 4KB pages internally
/// - OS page cache uses 4KB pages
/// - O_DIRECT I/O requires alignment to sector size
///
/// # Clone Implementation
/// `Page` does NOT implement `Clone` in production code to match production
/// database behavior (copying 4KB is expensive and should be explicit).
/// A `#[cfg(test)]` Clone is provided for tests.
///
/// # Example
/// ```
/// use clockpool::storage::Page;
///
/// let mut page = Page::new();
/// page.as_mut_slice()[0] = 0xFF;
/// assert_eq!(page.as_slice()[0], 0xFF);
/// ```
#[repr(align(4096))]
pub struct Page {
    data: [u8; PAGE_SIZE],
    page_no: PageId,
}

impl Page {
    /// Create a new zeroed page with no page id assigned yet.
    #[inline]
    pub fn new() -> Self {
        Self {
            data: [0u8; PAGE_SIZE],
            page_no: PageId::INVALID,
        }
    }

    /// Get immutable slice of page data.
    #[inline]
    pub fn as_slice(&self) -> &[u8] {
        &self.data
    }

    /// Get mutable slice of page data.
    #[inline]
    pub fn as_mut_slice(&mut self) -> &mut [u8] {
        &mut self.data
    }

    /// Zero out the data, leaving the page id untouched.
    pub fn reset(&mut self) {
        self.data.fill(0);
    }

    /// Get the size of a page.
    #[inline]
    pub const fn size() -> usize {
        PAGE_SIZE
    }

    /// This page's self-identifier, as assigned by `PageFile::allocate_page`
    /// or `PageFile::read_page`.
    #[inline]
    pub fn page_number(&self) -> PageId {
        self.page_no
    }

    /// Set this page's self-identifier. Called by `PageFile` implementations
    /// when handing back a freshly allocated or freshly read page.
    #[inline]
    pub fn set_page_number(&mut self, page_no: PageId) {
        self.page_no = page_no;
    }
}

impl Default for Page {
    fn default() -> Self {
        Self::new()
    }
}

// Clone only available in tests - forces explicit copying in production
#[cfg(test)]
impl Clone for Page {
    fn clone(&self) -> Self {
        let mut new_page = Page::new();
        new_page.data.copy_from_slice(&self.data);
        new_page.page_no = self.page_no;
        new_page
    }
}
