//! Document host abstraction
//!
//! The navigator never touches a real browser document directly; it asks a
//! [`DomHost`] to replace a slot's contents, replace the whole document, or
//! fall back to a full page load. [`MemoryDom`] keeps the document as a
//! string, which is enough for headless embedding and tests.

use crate::{ClientError, Result};
use trellis_core::markup::{root_range, slot_range};

/// Operations the navigator needs from the document
pub trait DomHost: Send {
    /// Current document markup
    fn document(&self) -> String;

    /// Replace the contents of the slot container owned by `swap_point`
    fn replace_slot(&mut self, swap_point: &str, markup: &str) -> Result<()>;

    /// Replace the whole document
    fn replace_document(&mut self, document: &str);

    /// Abandon client navigation and load `target` from scratch
    fn reload(&mut self, target: &str);
}

/// Document held in memory
#[derive(Debug, Clone, Default)]
pub struct MemoryDom {
    document: String,
    reloads: Vec<String>,
    swaps: usize,
}

impl MemoryDom {
    /// Start from a server-rendered document
    pub fn new(document: impl Into<String>) -> Self {
        Self {
            document: document.into(),
            reloads: Vec::new(),
            swaps: 0,
        }
    }

    /// Targets passed to [`DomHost::reload`], oldest first
    pub fn reloads(&self) -> &[String] {
        &self.reloads
    }

    /// Number of slot or document replacements so far
    pub fn swaps(&self) -> usize {
        self.swaps
    }

    /// Contents of `<trellis-root>`
    pub fn root_contents(&self) -> Option<&str> {
        root_range(&self.document).map(|r| &self.document[r])
    }
}

impl DomHost for MemoryDom {
    fn document(&self) -> String {
        self.document.clone()
    }

    fn replace_slot(&mut self, swap_point: &str, markup: &str) -> Result<()> {
        let range = slot_range(&self.document, swap_point).ok_or_else(|| ClientError::SwapTarget {
            swap_point: swap_point.to_string(),
        })?;
        self.document.replace_range(range, markup);
        self.swaps += 1;
        Ok(())
    }

    fn replace_document(&mut self, document: &str) {
        self.document = document.to_string();
        self.swaps += 1;
    }

    fn reload(&mut self, target: &str) {
        tracing::debug!(target = %target, "Full page reload requested");
        self.reloads.push(target.to_string());
    }
}
