use crate::cache::{CacheConfig, EntryStatus, QueryCache};
use crate::client::MovieApi;
use crate::deduplication::Lookup;
use crate::pager::{paginate, PageWindow, PAGE_SIZE};
use getset::Getters;
use movie_info::{ItemDetail, SearchResponse, SearchResultItem};
use std::sync::Arc;

/// What a search result grid should show right now.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchView {
    pub term: Option<String>,
    pub loading: bool,
    pub error: Option<String>,
    pub items: Vec<SearchResultItem>,
    pub total_available: u64,
    pub window: PageWindow,
}

/// What a detail panel should show right now.
#[derive(Debug, Clone, PartialEq)]
pub struct DetailView {
    pub selected: Option<String>,
    pub loading: bool,
    pub error: Option<String>,
    pub detail: Option<ItemDetail>,
}

/// Client-side state of one user session: the current search term, the page
/// being viewed and the selected title.
///
/// Search results and details are cached separately; both caches are owned
/// by the session and live as long as it does.
#[derive(Getters)]
pub struct SearchSession {
    api: Arc<dyn MovieApi>,
    #[getset(get = "pub")]
    searches: QueryCache<String, SearchResponse>,
    #[getset(get = "pub")]
    details: QueryCache<String, ItemDetail>,
    #[getset(get = "pub")]
    term: Option<String>,
    page_index: usize,
    #[getset(get = "pub")]
    selected: Option<String>,
}

fn normalize(input: &str) -> Option<String> {
    let trimmed = input.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

impl SearchSession {
    pub fn new(
        api: Arc<dyn MovieApi>,
        searches: QueryCache<String, SearchResponse>,
        details: QueryCache<String, ItemDetail>,
    ) -> Self {
        Self {
            api,
            searches,
            details,
            term: None,
            page_index: 1,
            selected: None,
        }
    }

    /// Session with fresh caches for searches and details sharing `config`.
    pub fn with_config(api: Arc<dyn MovieApi>, config: CacheConfig) -> Self {
        Self::new(
            api,
            QueryCache::new(config.clone()),
            QueryCache::new(config),
        )
    }

    /// Switches to `term` and requests its results.
    ///
    /// A blank term issues no request and resolves to an empty response.
    /// A different term starts again at page 1.
    pub fn search(&mut self, term: &str) -> Lookup<SearchResponse> {
        let Some(term) = normalize(term) else {
            self.term = None;
            self.page_index = 1;
            return Lookup::Ready(Ok(SearchResponse::empty()));
        };

        if self.term.as_deref() != Some(term.as_str()) {
            log::debug!("Search term changed to '{}'", term);
            self.page_index = 1;
        }
        self.term = Some(term.clone());

        let api = Arc::clone(&self.api);
        let key = term.clone();
        self.searches
            .request(key, move || async move { api.search(&term).await })
    }

    /// Re-issues the request for the current term, if any.
    pub fn refresh_search(&mut self) -> Option<Lookup<SearchResponse>> {
        let term = self.term.clone()?;
        let api = Arc::clone(&self.api);
        let key = term.clone();
        Some(
            self.searches
                .refresh(key, move || async move { api.search(&term).await }),
        )
    }

    /// Requests the details of `id` and marks it as selected.
    pub fn select(&mut self, id: &str) -> Lookup<ItemDetail> {
        let Some(id) = normalize(id) else {
            self.selected = None;
            return Lookup::Ready(Err("No title selected".to_string()));
        };
        self.selected = Some(id.clone());

        let api = Arc::clone(&self.api);
        let key = id.clone();
        self.details
            .request(key, move || async move { api.detail(&id).await })
    }

    pub fn clear_selection(&mut self) {
        self.selected = None;
    }

    fn current_items(&self) -> Option<SearchResponse> {
        self.term
            .as_ref()
            .and_then(|term| self.searches.get(term))
    }

    /// Moves to `page_index`, clamped to the pages of the current results.
    pub fn go_to_page(&mut self, page_index: usize) -> PageWindow {
        let item_count = self.current_items().map_or(0, |r| r.items.len());
        let window = PageWindow::new(item_count, page_index, PAGE_SIZE);
        self.page_index = window.page_index();
        window
    }

    pub fn next_page(&mut self) -> PageWindow {
        self.go_to_page(self.page_index + 1)
    }

    pub fn previous_page(&mut self) -> PageWindow {
        self.go_to_page(self.page_index.saturating_sub(1))
    }

    /// Derives the grid state from the current term's entry only, so results
    /// of a previous term never show while a new one is loading.
    pub fn view(&self) -> SearchView {
        let entry = self
            .term
            .as_ref()
            .and_then(|term| self.searches.status(term));

        let loading = matches!(&entry, Some(e) if e.status == EntryStatus::Pending);
        let error = entry.as_ref().and_then(|e| e.error_message.clone());
        let response = entry.and_then(|e| e.value).unwrap_or_default();

        let page = paginate(&response.items, self.page_index, PAGE_SIZE);
        SearchView {
            term: self.term.clone(),
            loading,
            error,
            items: page.items.to_vec(),
            total_available: response.total_available,
            window: page.window,
        }
    }

    pub fn detail_view(&self) -> DetailView {
        let entry = self
            .selected
            .as_ref()
            .and_then(|id| self.details.status(id));

        DetailView {
            selected: self.selected.clone(),
            loading: matches!(&entry, Some(e) if e.status == EntryStatus::Pending),
            error: entry.as_ref().and_then(|e| e.error_message.clone()),
            detail: entry.and_then(|e| e.value),
        }
    }
}
