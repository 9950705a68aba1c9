//! Shared test fixtures for integration tests: an in-memory `PageFile`.

use std::sync::Arc;

use clockpool::storage::PageFile;
use clockpool::{Error, Page, PageId, Result};
use parking_lot::Mutex;

/// An in-memory, in-process `PageFile` backend, for tests that don't want
/// to touch the filesystem at all.
pub struct MockFile {
    name: String,
    pages: Mutex<Vec<Page>>,
    /// Records every `write_page` call, for tests that assert write order.
    pub write_log: Mutex<Vec<(PageId, Vec<u8>)>>,
}

impl MockFile {
    /// A concrete handle, for tests that need to inspect `write_log`.
    pub fn new_handle(name: &str) -> Arc<MockFile> {
        Arc::new(Self {
            name: name.to_string(),
            pages: Mutex::new(Vec::new()),
            write_log: Mutex::new(Vec::new()),
        })
    }

    /// A type-erased handle, ready to hand to `BufferPoolManager`.
    pub fn new(name: &str) -> Arc<dyn PageFile> {
        Self::new_handle(name)
    }

    pub fn writes_to(&self, page_no: PageId) -> Vec<Vec<u8>> {
        self.write_log
            .lock()
            .iter()
            .filter(|(pid, _)| *pid == page_no)
            .map(|(_, bytes)| bytes.clone())
            .collect()
    }
}

impl PageFile for MockFile {
    fn read_page(&self, page_no: PageId) -> Result<Page> {
        let pages = self.pages.lock();
        let stored = pages
            .get(page_no.0 as usize)
            .ok_or(Error::PageNotFound(page_no.0))?;

        let mut page = Page::new();
        page.set_page_number(page_no);
        page.as_mut_slice().copy_from_slice(stored.as_slice());
        Ok(page)
    }

    fn write_page(&self, page_no: PageId, page: &Page) -> Result<()> {
        let mut pages = self.pages.lock();
        let stored = pages
            .get_mut(page_no.0 as usize)
            .ok_or(Error::PageNotFound(page_no.0))?;
        stored.as_mut_slice().copy_from_slice(page.as_slice());

        self.write_log
            .lock()
            .push((page_no, page.as_slice().to_vec()));
        Ok(())
    }

    fn allocate_page(&self) -> Result<Page> {
        let mut pages = self.pages.lock();
        let page_no = PageId::new(pages.len() as u32);

        let mut page = Page::new();
        page.set_page_number(page_no);
        pages.push(Page::new());

        let mut stored = Page::new();
        stored.set_page_number(page_no);
        pages[page_no.0 as usize] = stored;

        Ok(page)
    }

    fn delete_page(&self, _page_no: PageId) -> Result<()> {
        Ok(())
    }

    fn filename(&self) -> String {
        self.name.clone()
    }
}
