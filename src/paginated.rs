use std::sync::atomic::{AtomicU64, Ordering};

use crate::connection::CursorConnection;
use crate::location::{Location, SearchParams};

pub const AFTER: &str = "after";

static NEXT_GENERATION: AtomicU64 = AtomicU64::new(1);

fn next_generation() -> u64 {
    NEXT_GENERATION.fetch_add(1, Ordering::Relaxed)
}

#[derive(Debug, Clone, PartialEq)]
pub struct PaginatedState {
    pub is_loading: bool,
    /// `None` after a failed first page.
    pub data: Option<CursorConnection>,
}

impl PaginatedState {
    pub fn initial() -> Self {
        Self {
            is_loading: true,
            data: Some(CursorConnection::empty()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageKind {
    /// First page of a tab (possibly deep-linked through `after`).
    Initial,
    /// Next page, appended to what is already loaded.
    More,
}

/// A fetch the owner of a [`Paginator`] must perform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRequest {
    pub url: String,
    pub generation: u64,
    pub kind: PageKind,
}

impl PageRequest {
    pub fn complete(&self, result: Result<CursorConnection, String>) -> PageOutcome {
        PageOutcome {
            generation: self.generation,
            kind: self.kind,
            result,
        }
    }
}

/// The result of a [`PageRequest`].
#[derive(Debug, Clone)]
pub struct PageOutcome {
    pub generation: u64,
    pub kind: PageKind,
    pub result: Result<CursorConnection, String>,
}

/// Cursor pagination state for one resource collection.
///
/// The paginator never performs I/O. It hands out [`PageRequest`]s and merges
/// the matching [`PageOutcome`]s. Each paginator has its own generation, so
/// outcomes of requests issued by a replaced paginator are dropped.
#[derive(Debug)]
pub struct Paginator {
    base_url: String,
    generation: u64,
    state: PaginatedState,
    fetching_more: bool,
    /// Last `after` value exchanged with the location, by either side.
    synced_after: Option<String>,
}

impl Paginator {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            generation: next_generation(),
            state: PaginatedState::initial(),
            fetching_more: false,
            synced_after: None,
        }
    }

    pub fn state(&self) -> &PaginatedState {
        &self.state
    }

    pub fn is_loading(&self) -> bool {
        self.state.is_loading
    }

    pub fn is_fetching_more(&self) -> bool {
        self.fetching_more
    }

    pub fn data(&self) -> Option<&CursorConnection> {
        self.state.data.as_ref()
    }

    pub fn has_next_page(&self) -> bool {
        self.data().is_some_and(CursorConnection::has_next_page)
    }

    /// Request for the first page. A non-empty `after` parameter is appended
    /// as `?after<cursor>`, without `=`, which is the format deep links have
    /// always produced.
    pub fn initial_request(&mut self, query: &SearchParams) -> PageRequest {
        let after = query.get(AFTER).filter(|a| !a.is_empty());
        self.synced_after = after.map(str::to_string);

        let url = match after {
            Some(after) => format!("{}?{}{}", self.base_url, AFTER, after),
            None => self.base_url.clone(),
        };

        tracing::debug!(%url, generation = self.generation, "requesting first page");
        PageRequest {
            url,
            generation: self.generation,
            kind: PageKind::Initial,
        }
    }

    /// Whether the `after` value in `query` was changed by someone other than
    /// this paginator since it last read or wrote it.
    pub fn is_stale(&self, query: &SearchParams) -> bool {
        let after = query.get(AFTER).filter(|a| !a.is_empty());
        after != self.synced_after.as_deref()
    }

    /// Request for the page after the current `endCursor`, recording the
    /// cursor in `location`. Returns `None` and changes nothing while a page
    /// is loading or when there is no data to continue from.
    pub fn load_more(&mut self, location: &mut Location) -> Option<PageRequest> {
        if self.state.is_loading || self.fetching_more {
            return None;
        }
        let end_cursor = self.state.data.as_ref()?.page_info.end_cursor.clone();
        // Without a cursor the request would refetch the first page.
        if end_cursor.is_empty() {
            tracing::warn!(base_url = %self.base_url, "next page announced without an end cursor");
            return None;
        }

        location.set_param(AFTER, Some(&end_cursor));
        self.synced_after = Some(end_cursor.clone());
        self.fetching_more = true;

        let url = format!(
            "{}?{}={}",
            self.base_url,
            AFTER,
            urlencoding::encode(&end_cursor)
        );
        tracing::debug!(%url, generation = self.generation, "requesting next page");
        Some(PageRequest {
            url,
            generation: self.generation,
            kind: PageKind::More,
        })
    }

    /// Merge a finished request. Returns false when the outcome belongs to
    /// another generation and was ignored.
    pub fn apply(&mut self, outcome: PageOutcome) -> bool {
        if outcome.generation != self.generation {
            tracing::debug!(
                stale = outcome.generation,
                current = self.generation,
                "dropping page from a previous request generation"
            );
            return false;
        }

        match (outcome.kind, outcome.result) {
            (PageKind::Initial, Ok(page)) => {
                self.state = PaginatedState {
                    is_loading: false,
                    data: Some(page),
                };
            }
            (PageKind::Initial, Err(err)) => {
                tracing::error!(url = %self.base_url, error = %err, "failed to load first page");
                self.state = PaginatedState {
                    is_loading: false,
                    data: None,
                };
            }
            (PageKind::More, Ok(page)) => {
                self.fetching_more = false;
                self.state.is_loading = false;
                self.state.data = Some(match self.state.data.take() {
                    Some(previous) => merge(previous, page),
                    None => page,
                });
            }
            (PageKind::More, Err(err)) => {
                self.fetching_more = false;
                tracing::error!(url = %self.base_url, error = %err, "failed to load next page");
            }
        }
        true
    }
}

/// Append `page` to `previous`. The new page info is only taken when it
/// carries an end cursor, so a terminal or malformed page cannot wipe out a
/// valid cursor.
fn merge(previous: CursorConnection, page: CursorConnection) -> CursorConnection {
    let page_info = if page.page_info.end_cursor.is_empty() {
        previous.page_info
    } else {
        page.page_info
    };

    let mut edges = previous.edges;
    edges.extend(page.edges);

    CursorConnection { edges, page_info }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::connection::{Edge, PageInfo};
    use pretty_assertions::assert_eq;
    use serde_json::json;

    const BASE: &str = "http://api.test/user/belchior/followers";

    fn page(ids: &[&str], end_cursor: &str, has_next_page: bool) -> CursorConnection {
        CursorConnection {
            edges: ids.iter().map(|id| Edge::new(json!({ "id": id }))).collect(),
            page_info: PageInfo {
                has_previous_page: false,
                has_next_page,
                start_cursor: String::new(),
                end_cursor: end_cursor.to_string(),
            },
        }
    }

    fn ids(paginator: &Paginator) -> Vec<String> {
        paginator
            .data()
            .unwrap()
            .edges
            .iter()
            .map(|e| e.node["id"].as_str().unwrap().to_string())
            .collect()
    }

    fn loaded(first: CursorConnection) -> Paginator {
        let mut paginator = Paginator::new(BASE);
        let request = paginator.initial_request(&SearchParams::default());
        assert!(paginator.apply(request.complete(Ok(first))));
        paginator
    }

    #[test]
    fn starts_loading_with_empty_connection() {
        let paginator = Paginator::new(BASE);
        assert_eq!(paginator.state(), &PaginatedState::initial());
        assert!(paginator.is_loading());
        assert_eq!(paginator.data().unwrap().page_info.end_cursor, "");
        assert!(paginator.data().unwrap().edges.is_empty());
    }

    #[test]
    fn initial_request_without_cursor() {
        let mut paginator = Paginator::new(BASE);
        let request = paginator.initial_request(&SearchParams::parse("tab=followers"));
        assert_eq!(request.url, BASE);
        assert_eq!(request.kind, PageKind::Initial);
        assert_eq!(request.generation, paginator.generation);
    }

    #[test]
    fn initial_request_keeps_literal_deep_link_format() {
        let mut paginator = Paginator::new("http://api.test/user/belchior/starred-repositories");
        let request =
            paginator.initial_request(&SearchParams::parse("tab=starredRepositories&after=abc"));
        assert_eq!(
            request.url,
            "http://api.test/user/belchior/starred-repositories?afterabc"
        );
    }

    #[test]
    fn first_page_stops_loading() {
        let paginator = loaded(page(&["a", "b"], "b", true));
        assert!(!paginator.is_loading());
        assert_eq!(ids(&paginator), vec!["a", "b"]);
        assert!(paginator.has_next_page());
    }

    #[test]
    fn failed_first_page_has_no_data() {
        let mut paginator = Paginator::new(BASE);
        let request = paginator.initial_request(&SearchParams::default());
        paginator.apply(request.complete(Err("connection refused".into())));
        assert!(!paginator.is_loading());
        assert!(paginator.data().is_none());
        assert!(!paginator.has_next_page());

        let mut location = Location::parse("/belchior");
        assert_eq!(paginator.load_more(&mut location), None);
    }

    #[test]
    fn load_more_while_loading_is_ignored() {
        let mut paginator = Paginator::new(BASE);
        let mut location = Location::parse("/belchior?tab=followers");
        let before = paginator.state().clone();

        assert_eq!(paginator.load_more(&mut location), None);
        assert_eq!(paginator.state(), &before);
        assert!(location.history().is_empty());
        assert_eq!(location.param(AFTER), None);
    }

    #[test]
    fn load_more_while_fetching_more_is_ignored() {
        let mut paginator = loaded(page(&["a"], "a", true));
        let mut location = Location::parse("/belchior");

        assert!(paginator.load_more(&mut location).is_some());
        assert!(paginator.is_fetching_more());
        assert_eq!(paginator.load_more(&mut location), None);
        assert_eq!(location.history().len(), 1);
    }

    #[test]
    fn load_more_without_end_cursor_is_ignored() {
        let mut paginator = loaded(page(&["a"], "", true));
        let mut location = Location::parse("/belchior?tab=followers");

        assert_eq!(paginator.load_more(&mut location), None);
        assert!(!paginator.is_fetching_more());
        assert_eq!(location.param(AFTER), None);
        assert!(location.history().is_empty());
        assert_eq!(ids(&paginator), vec!["a"]);
    }

    #[test]
    fn load_more_records_cursor_and_requests_next_page() {
        let mut paginator = loaded(page(&["a"], "Y3Vyc29y", true));
        let mut location = Location::parse("/belchior?tab=followers");

        let request = paginator.load_more(&mut location).unwrap();
        assert_eq!(request.url, format!("{}?after=Y3Vyc29y", BASE));
        assert_eq!(request.kind, PageKind::More);
        assert_eq!(location.param(AFTER), Some("Y3Vyc29y"));
        assert_eq!(
            location.history().last().map(String::as_str),
            Some("/belchior?tab=followers&after=Y3Vyc29y")
        );
    }

    #[test]
    fn next_page_is_appended_without_dedup() {
        let mut paginator = loaded(page(&["a", "b"], "b", true));
        let mut location = Location::parse("/belchior");
        let request = paginator.load_more(&mut location).unwrap();

        paginator.apply(request.complete(Ok(page(&["b", "c"], "c", false))));

        assert_eq!(ids(&paginator), vec!["a", "b", "b", "c"]);
        assert_eq!(paginator.data().unwrap().page_info.end_cursor, "c");
        assert!(!paginator.has_next_page());
        assert!(!paginator.is_fetching_more());
    }

    #[test]
    fn page_without_end_cursor_keeps_previous_page_info() {
        let first = page(&["a"], "a", true);
        let previous_info = first.page_info.clone();
        let mut paginator = loaded(first);
        let mut location = Location::parse("/belchior");
        let request = paginator.load_more(&mut location).unwrap();

        paginator.apply(request.complete(Ok(page(&[], "", false))));

        assert_eq!(paginator.data().unwrap().page_info, previous_info);
        assert_eq!(ids(&paginator), vec!["a"]);
    }

    #[test]
    fn failed_next_page_keeps_data_and_allows_retry() {
        let mut paginator = loaded(page(&["a"], "a", true));
        let mut location = Location::parse("/belchior");
        let request = paginator.load_more(&mut location).unwrap();

        paginator.apply(request.complete(Err("timeout".into())));

        assert_eq!(ids(&paginator), vec!["a"]);
        assert!(!paginator.is_fetching_more());
        assert!(paginator.load_more(&mut location).is_some());
    }

    #[test]
    fn outcome_from_another_generation_is_dropped() {
        let mut old = Paginator::new(BASE);
        let stale = old.initial_request(&SearchParams::default());

        let mut current = Paginator::new(BASE);
        let _ = current.initial_request(&SearchParams::default());
        assert_ne!(old.generation, current.generation);

        assert!(!current.apply(stale.complete(Ok(page(&["x"], "x", false)))));
        assert!(current.is_loading());
        assert!(current.data().unwrap().edges.is_empty());
    }

    #[test]
    fn staleness_follows_after_parameter() {
        let mut paginator = Paginator::new(BASE);
        let query = SearchParams::parse("tab=followers&after=abc");
        let _ = paginator.initial_request(&query);

        assert!(!paginator.is_stale(&query));
        assert!(paginator.is_stale(&SearchParams::parse("after=def")));
        assert!(paginator.is_stale(&SearchParams::parse("tab=followers")));
    }

    #[test]
    fn own_cursor_writes_are_not_stale() {
        let mut paginator = loaded(page(&["a"], "a", true));
        let mut location = Location::parse("/belchior");
        let _ = paginator.load_more(&mut location).unwrap();
        assert!(!paginator.is_stale(location.query()));
    }
}
