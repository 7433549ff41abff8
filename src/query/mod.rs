//! Query and pagination state machine.
//!
//! [`SearchState`] owns the current keyword, the accumulated results and the
//! paging flags. Every input arrives as a [`QueryEvent`];
//! [`SearchState::handle`] applies it and returns the [`Effect`]s the caller
//! has to carry out (network fetches and notifications). Nothing in this
//! module performs I/O, so every transition can be exercised directly.
//!
//! ```
//! use pixgrid::query::{Effect, QueryEvent, SearchState};
//!
//! let mut state = SearchState::default();
//! let effects = state.handle(QueryEvent::Submit("otter".to_string()));
//! assert!(state.is_loading());
//! assert!(matches!(&effects[..], [Effect::Fetch(req)] if req.page == 1));
//! ```

mod notify;

pub use notify::{Notification, NotificationSink, Severity};

pub use crate::search::{NetworkError, PAGE_SIZE, ResultItem, SearchPage};

pub const NO_RESULTS: &str = "Sorry, there are no results for your request";
pub const NO_MORE_RESULTS: &str = "There are no more results for this request";
pub const REQUEST_FAILED: &str = "Something went wrong";
pub const EMPTY_KEYWORD: &str = "Enter a keyword to search";

/// Coarse lifecycle of the machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Phase {
    /// No keyword submitted yet
    #[default]
    Idle,
    /// Exactly one page request is outstanding
    Loading,
    /// Last request finished, successfully or not
    Ready,
}

/// A page request issued by the machine.
///
/// `generation` identifies the keyword submission the request belongs to, so
/// a late answer for an older keyword can be recognized and dropped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchRequest {
    pub keyword: String,
    pub page: u32,
    pub generation: u64,
}

/// Inputs to the machine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryEvent {
    /// User submitted a keyword
    Submit(String),
    /// User asked for the next page
    LoadMore,
    /// A previously issued request finished
    Completed {
        request: FetchRequest,
        result: Result<SearchPage, NetworkError>,
    },
}

/// Work the caller must perform after a transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    Fetch(FetchRequest),
    Notify(Notification),
}

/// Search results for the current keyword and the paging state around them.
#[derive(Debug, Clone, Default)]
pub struct SearchState {
    keyword: String,
    results: Vec<ResultItem>,
    page: u32,
    total_hits: u32,
    has_more: bool,
    phase: Phase,
    generation: u64,
    in_flight: Option<FetchRequest>,
}

impl SearchState {
    /// Apply one event and return the effects it produced.
    pub fn handle(&mut self, event: QueryEvent) -> Vec<Effect> {
        match event {
            QueryEvent::Submit(keyword) => self.submit(&keyword),
            QueryEvent::LoadMore => self.load_more(),
            QueryEvent::Completed { request, result } => self.complete(&request, result),
        }
    }

    pub fn keyword(&self) -> &str {
        &self.keyword
    }

    pub fn results(&self) -> &[ResultItem] {
        &self.results
    }

    /// Highest page fetched for the current keyword (0 before the first one lands).
    pub const fn page(&self) -> u32 {
        self.page
    }

    pub const fn total_hits(&self) -> u32 {
        self.total_hits
    }

    pub const fn has_more(&self) -> bool {
        self.has_more
    }

    pub const fn phase(&self) -> Phase {
        self.phase
    }

    pub fn is_loading(&self) -> bool {
        self.phase == Phase::Loading
    }

    /// Whether a load-more request would currently be accepted.
    pub fn can_load_more(&self) -> bool {
        self.has_more && !self.is_loading()
    }

    /// The page request still waiting for an answer.
    pub const fn in_flight(&self) -> Option<&FetchRequest> {
        self.in_flight.as_ref()
    }

    /// Counter bumped on every keyword submission that starts a new result set.
    pub const fn generation(&self) -> u64 {
        self.generation
    }

    fn submit(&mut self, raw: &str) -> Vec<Effect> {
        let keyword = raw.trim();
        if keyword.is_empty() {
            return vec![Effect::Notify(Notification::warning(EMPTY_KEYWORD))];
        }
        // Resubmitting the same keyword only refetches when its first page never arrived.
        let first_page_missing = self.page == 0 && !self.is_loading();
        if keyword == self.keyword && !first_page_missing {
            tracing::debug!(keyword, "keyword unchanged, ignoring submit");
            return Vec::new();
        }

        self.keyword = keyword.to_string();
        self.results.clear();
        self.page = 0;
        self.total_hits = 0;
        self.has_more = false;
        self.generation += 1;
        tracing::info!(keyword, generation = self.generation, "new search");
        vec![Effect::Fetch(self.begin_fetch(1))]
    }

    fn load_more(&mut self) -> Vec<Effect> {
        if self.is_loading() {
            tracing::debug!(page = self.page, "load more ignored while a request is in flight");
            return Vec::new();
        }
        if !self.has_more {
            tracing::debug!(page = self.page, "load more ignored, no pages left");
            return Vec::new();
        }
        vec![Effect::Fetch(self.begin_fetch(self.page + 1))]
    }

    fn begin_fetch(&mut self, page: u32) -> FetchRequest {
        let request = FetchRequest {
            keyword: self.keyword.clone(),
            page,
            generation: self.generation,
        };
        self.phase = Phase::Loading;
        self.in_flight = Some(request.clone());
        request
    }

    fn complete(
        &mut self,
        request: &FetchRequest,
        result: Result<SearchPage, NetworkError>,
    ) -> Vec<Effect> {
        if self.in_flight.as_ref() != Some(request) {
            tracing::debug!(
                keyword = %request.keyword,
                page = request.page,
                generation = request.generation,
                current = self.generation,
                "discarding stale search response"
            );
            return Vec::new();
        }
        self.in_flight = None;
        self.phase = Phase::Ready;

        let fetched = match result {
            Ok(fetched) => fetched,
            Err(err) => {
                tracing::warn!(keyword = %request.keyword, page = request.page, %err, "search failed");
                return vec![Effect::Notify(Notification::error(REQUEST_FAILED))];
            }
        };

        tracing::debug!(
            keyword = %request.keyword,
            page = request.page,
            items = fetched.items.len(),
            total_hits = fetched.total_hits,
            "page received"
        );
        self.results.extend(fetched.items);
        self.page = request.page;
        self.total_hits = fetched.total_hits;
        self.has_more = has_more(self.page, self.total_hits);

        let notice = if request.page == 1 {
            first_page_notice(self.total_hits)
        } else {
            next_page_notice(self.page, self.total_hits)
        };
        vec![Effect::Notify(notice)]
    }
}

/// Whether pages beyond `page` exist when the endpoint reports `total_hits`.
pub fn has_more(page: u32, total_hits: u32) -> bool {
    u64::from(page) * u64::from(PAGE_SIZE) < u64::from(total_hits)
}

fn first_page_notice(total_hits: u32) -> Notification {
    match total_hits {
        0 => Notification::info(NO_RESULTS),
        1 => Notification::success("We found 1 result"),
        n => Notification::success(format!("We found {n} results")),
    }
}

fn next_page_notice(page: u32, total_hits: u32) -> Notification {
    if page < total_hits.div_ceil(PAGE_SIZE) {
        let remaining = total_hits.saturating_sub(page.saturating_mul(PAGE_SIZE));
        Notification::success(format!("We found {remaining} more results"))
    } else {
        Notification::info(NO_MORE_RESULTS)
    }
}

/// Deliver the notifications in `effects` to `sink` and return the fetches.
pub fn route_effects(
    effects: impl IntoIterator<Item = Effect>,
    sink: &mut impl NotificationSink,
) -> Vec<FetchRequest> {
    let mut fetches = Vec::new();
    for effect in effects {
        match effect {
            Effect::Fetch(request) => fetches.push(request),
            Effect::Notify(notification) => sink.notify(notification),
        }
    }
    fetches
}

#[cfg(test)]
mod tests;
