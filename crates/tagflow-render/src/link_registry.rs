#![forbid(unsafe_code)]

//! OSC 8 hyperlink registry.
//!
//! Cells store a compact link id; the registry maps ids back to URLs for
//! the presenter. Id 0 means "no link". Registering the same URL twice
//! returns the same id.
//!
//! ```
//! use tagflow_render::link_registry::LinkRegistry;
//!
//! let mut links = LinkRegistry::new();
//! let id = links.register("/pipelineruns?labelSelector=app%3Dweb");
//! assert_eq!(links.get(id), Some("/pipelineruns?labelSelector=app%3Dweb"));
//! assert_eq!(links.register("/pipelineruns?labelSelector=app%3Dweb"), id);
//! ```

use std::collections::HashMap;

#[derive(Debug, Clone, Default)]
pub struct LinkRegistry {
    urls: Vec<String>,
    lookup: HashMap<String, u32>,
}

impl LinkRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `url` and return its id (never 0).
    pub fn register(&mut self, url: &str) -> u32 {
        if let Some(&id) = self.lookup.get(url) {
            return id;
        }
        self.urls.push(url.to_owned());
        let id = self.urls.len() as u32;
        self.lookup.insert(url.to_owned(), id);
        id
    }

    /// URL for `id`, or `None` for 0 and unknown ids.
    pub fn get(&self, id: u32) -> Option<&str> {
        let idx = usize::try_from(id).ok()?.checked_sub(1)?;
        self.urls.get(idx).map(String::as_str)
    }

    /// Registered URLs in id order (index 0 is id 1).
    pub fn urls(&self) -> &[String] {
        &self.urls
    }

    pub fn len(&self) -> usize {
        self.urls.len()
    }

    pub fn is_empty(&self) -> bool {
        self.urls.is_empty()
    }

    /// Forget all links. Ids issued before are invalid afterwards.
    pub fn clear(&mut self) {
        self.urls.clear();
        self.lookup.clear();
    }
}
