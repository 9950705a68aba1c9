//! The `PageFile` trait - the buffer pool's external page-store collaborator.
//!
//! This generalizes the original specification's single "File" type into a
//! trait so that one buffer pool can serve pages belonging to several
//! distinct backing files (heap files, index files, the catalog, ...) at
//! once, exactly as a real storage engine does. File *identity* is by
//! pointer, not by filename: two `PageFile`s with the same `filename()`
//! are still distinct keys in the page directory, matching the source's
//! raw-pointer-identity semantics.

use std::hash::{Hash, Hasher};
use std::sync::Arc;

use crate::common::{PageId, Result};
use crate::storage::page::Page;

/// The on-disk (or otherwise durable) page store a buffer pool manager
/// reads through and writes back to.
///
/// Implementations must be safe to share behind an `Arc` across threads;
/// the buffer pool never assumes exclusive access.
pub trait PageFile: Send + Sync {
    /// Fetch a page by id. Fails if the page is unknown to this file.
    fn read_page(&self, page_no: PageId) -> Result<Page>;

    /// Persist `page` at `page_no`. The page must have been previously
    /// allocated with `allocate_page`.
    fn write_page(&self, page_no: PageId, page: &Page) -> Result<()>;

    /// Reserve a new page id and return a zero-initialized page carrying it.
    fn allocate_page(&self) -> Result<Page>;

    /// Release a page id. A subsequent `read_page` for it is undefined.
    fn delete_page(&self, page_no: PageId) -> Result<()>;

    /// Identifier used only in error messages and the debug dump.
    fn filename(&self) -> String;
}

/// Wraps `Arc<dyn PageFile>` so it can be used as a hash map key keyed on
/// pointer identity rather than on any field of the underlying file.
///
/// Two files with identical `filename()`s are still distinct keys, mirroring
/// the original implementation comparing `File*` pointers directly.
#[derive(Clone)]
pub(crate) struct FileKey(pub Arc<dyn PageFile>);

impl PartialEq for FileKey {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl Eq for FileKey {}

impl Hash for FileKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        let thin = Arc::as_ptr(&self.0) as *const () as usize;
        thin.hash(state);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::PageId;
    use parking_lot::Mutex;

    struct StubFile {
        name: String,
        pages: Mutex<Vec<Page>>,
    }

    impl PageFile for StubFile {
        fn read_page(&self, page_no: PageId) -> Result<Page> {
            let pages = self.pages.lock();
            pages
                .get(page_no.0 as usize)
                .map(|p| {
                    let mut copy = Page::new();
                    copy.set_page_number(page_no);
                    copy.as_mut_slice().copy_from_slice(p.as_slice());
                    copy
                })
                .ok_or(crate::error::Error::PageNotFound(page_no.0))
        }

        fn write_page(&self, page_no: PageId, page: &Page) -> Result<()> {
            let mut pages = self.pages.lock();
            pages[page_no.0 as usize].as_mut_slice().copy_from_slice(page.as_slice());
            Ok(())
        }

        fn allocate_page(&self) -> Result<Page> {
            let mut pages = self.pages.lock();
            let page_no = PageId::new(pages.len() as u32);
            let mut page = Page::new();
            page.set_page_number(page_no);
            pages.push(Page::new());
            Ok(page)
        }

        fn delete_page(&self, _page_no: PageId) -> Result<()> {
            Ok(())
        }

        fn filename(&self) -> String {
            self.name.clone()
        }
    }

    #[test]
    fn test_file_key_identity_not_filename() {
        let a: Arc<dyn PageFile> = Arc::new(StubFile {
            name: "same.db".into(),
            pages: Mutex::new(vec![]),
        });
        let b: Arc<dyn PageFile> = Arc::new(StubFile {
            name: "same.db".into(),
            pages: Mutex::new(vec![]),
        });

        let ka = FileKey(Arc::clone(&a));
        let kb = FileKey(Arc::clone(&b));
        let ka2 = FileKey(Arc::clone(&a));

        assert_ne!(ka, kb, "distinct Arc instances must not compare equal");
        assert_eq!(ka, ka2, "clones of the same Arc must compare equal");
    }
}
