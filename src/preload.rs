//! Neighbour preloading.
//!
//! After every viewer transition the full-size images on either side of the
//! current one are requested so that the next step feels instant. Requests
//! are fire-and-forget: the [`Fetcher`] receives a URL and nothing comes
//! back. Two requests are issued every time, even when the gallery is so
//! small that both neighbours are the same image (or the current one).

use crate::gallery::GalleryEntry;
use std::cell::RefCell;
use std::rc::Rc;

/// Something that can warm a cache for a URL.
pub trait Fetcher {
    fn fetch(&mut self, url: &str);
}

impl<F: FnMut(&str)> Fetcher for F {
    fn fetch(&mut self, url: &str) {
        self(url)
    }
}

/// Positions of the previous and next entries around `index`.
pub fn neighbor_indices(index: usize, len: usize) -> [usize; 2] {
    [(index + len - 1) % len, (index + 1) % len]
}

pub struct Preloader {
    fetcher: Box<dyn Fetcher>,
    issued: u64,
}

impl std::fmt::Debug for Preloader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Preloader")
            .field("issued", &self.issued)
            .finish_non_exhaustive()
    }
}

impl Preloader {
    pub fn new(fetcher: impl Fetcher + 'static) -> Self {
        Self {
            fetcher: Box::new(fetcher),
            issued: 0,
        }
    }

    /// Request both neighbours of `index`. Returns the number of requests.
    pub fn preload_neighbors(&mut self, entries: &[GalleryEntry], index: usize) -> usize {
        if entries.is_empty() {
            return 0;
        }
        let index = index % entries.len();
        for neighbor in neighbor_indices(index, entries.len()) {
            let url = &entries[neighbor].full_url;
            tracing::debug!(%url, neighbor, "preload");
            self.fetcher.fetch(url);
        }
        self.issued += 2;
        2
    }

    /// Total requests issued so far.
    pub fn issued(&self) -> u64 {
        self.issued
    }
}

/// Records every requested URL in a shared log.
///
/// Clones share the log, so a host can hand one clone to the page and keep
/// another to inspect what was requested.
#[derive(Debug, Clone, Default)]
pub struct RecordingFetcher {
    log: Rc<RefCell<Vec<String>>>,
}

impl RecordingFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn urls(&self) -> Vec<String> {
        self.log.borrow().clone()
    }

    /// Return and clear the recorded URLs.
    pub fn take(&self) -> Vec<String> {
        std::mem::take(&mut *self.log.borrow_mut())
    }

    pub fn len(&self) -> usize {
        self.log.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.log.borrow().is_empty()
    }
}

impl Fetcher for RecordingFetcher {
    fn fetch(&mut self, url: &str) {
        self.log.borrow_mut().push(url.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::entries_for;

    #[test]
    fn neighbours_wrap_both_ways() {
        assert_eq!(neighbor_indices(0, 3), [2, 1]);
        assert_eq!(neighbor_indices(2, 3), [1, 0]);
        assert_eq!(neighbor_indices(0, 1), [0, 0]);
    }

    #[test]
    fn always_two_requests() {
        for n in 1..5 {
            let entries = entries_for(n);
            let log = RecordingFetcher::new();
            let mut preloader = Preloader::new(log.clone());
            for i in 0..n {
                assert_eq!(preloader.preload_neighbors(&entries, i), 2);
            }
            assert_eq!(log.len(), 2 * n);
            assert_eq!(preloader.issued(), 2 * n as u64);
        }
    }

    #[test]
    fn single_entry_requests_itself_twice() {
        let entries = entries_for(1);
        let log = RecordingFetcher::new();
        let mut preloader = Preloader::new(log.clone());
        preloader.preload_neighbors(&entries, 0);
        assert_eq!(log.urls(), vec!["full-0.jpg", "full-0.jpg"]);
    }

    #[test]
    fn two_entries_request_the_other_twice() {
        let entries = entries_for(2);
        let log = RecordingFetcher::new();
        let mut preloader = Preloader::new(log.clone());
        preloader.preload_neighbors(&entries, 0);
        assert_eq!(log.take(), vec!["full-1.jpg", "full-1.jpg"]);
        assert!(log.is_empty());
    }

    #[test]
    fn requests_use_full_urls_in_prev_next_order() {
        let entries = entries_for(4);
        let log = RecordingFetcher::new();
        let mut preloader = Preloader::new(log.clone());
        preloader.preload_neighbors(&entries, 2);
        assert_eq!(log.urls(), vec!["full-1.jpg", "full-3.jpg"]);
    }

    #[test]
    fn empty_list_requests_nothing() {
        let log = RecordingFetcher::new();
        let mut preloader = Preloader::new(log.clone());
        assert_eq!(preloader.preload_neighbors(&[], 0), 0);
        assert!(log.is_empty());
    }

    #[test]
    fn closures_are_fetchers() {
        let mut seen = Vec::new();
        {
            let mut fetch = |url: &str| seen.push(url.to_string());
            Fetcher::fetch(&mut fetch, "a.jpg");
        }
        assert_eq!(seen, vec!["a.jpg"]);
    }
}
