use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::sync::mpsc::{self, Receiver, Sender, TryRecvError};
use std::thread::{self, JoinHandle};

use thiserror::Error;

use super::{NetworkError, SearchClient, SearchPage};
use crate::query::FetchRequest;

/// A finished request together with the request that produced it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchOutcome {
    pub request: FetchRequest,
    pub result: Result<SearchPage, NetworkError>,
}

/// The dispatcher thread is gone and no further outcomes will arrive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("search worker stopped")]
pub struct WorkerStopped;

/// Runs search requests off the UI thread.
///
/// A dispatcher thread hands every request its own thread, so a request for
/// a new keyword never queues behind a slow one for an abandoned keyword.
/// Nothing is cancelled: outcomes arrive in completion order and it is up to
/// the receiver to discard the ones it no longer wants.
pub struct SearchWorker {
    requests: Sender<FetchRequest>,
    outcomes: Receiver<SearchOutcome>,
    _handle: JoinHandle<()>,
}

impl SearchWorker {
    /// Spawn the dispatcher thread, sharing `client` between requests.
    ///
    /// # Errors
    /// Returns an error if the OS refuses to create the thread.
    pub fn spawn<C>(client: C) -> std::io::Result<Self>
    where
        C: SearchClient + Send + Sync + 'static,
    {
        let client = Arc::new(client);
        let (request_tx, request_rx) = mpsc::channel::<FetchRequest>();
        let (outcome_tx, outcome_rx) = mpsc::channel();
        let handle = thread::Builder::new()
            .name("pixgrid-search".to_string())
            .spawn(move || {
                for request in request_rx {
                    start_request(&client, request, &outcome_tx);
                }
            })?;

        Ok(Self {
            requests: request_tx,
            outcomes: outcome_rx,
            _handle: handle,
        })
    }

    /// Queue a request.
    ///
    /// # Errors
    /// Hands the request back when the worker thread is gone.
    pub fn submit(&self, request: FetchRequest) -> Result<(), FetchRequest> {
        self.requests.send(request).map_err(|err| err.0)
    }

    /// Take one finished outcome, if any is ready.
    ///
    /// # Errors
    /// Returns [`WorkerStopped`] once the dispatcher has exited, after which
    /// outstanding requests will never be answered.
    pub fn try_recv(&self) -> Result<Option<SearchOutcome>, WorkerStopped> {
        match self.outcomes.try_recv() {
            Ok(outcome) => Ok(Some(outcome)),
            Err(TryRecvError::Empty) => Ok(None),
            Err(TryRecvError::Disconnected) => Err(WorkerStopped),
        }
    }
}

fn start_request<C>(client: &Arc<C>, request: FetchRequest, outcomes: &Sender<SearchOutcome>)
where
    C: SearchClient + Send + Sync + 'static,
{
    let fallback = request.clone();
    let client = Arc::clone(client);
    let tx = outcomes.clone();
    let spawned = thread::Builder::new()
        .name(format!("pixgrid-search-{}-{}", request.generation, request.page))
        .spawn(move || {
            let _ = tx.send(run_request(client.as_ref(), request));
        });

    if let Err(err) = spawned {
        tracing::error!(
            keyword = %fallback.keyword,
            page = fallback.page,
            %err,
            "failed to start search request"
        );
        let _ = outcomes.send(SearchOutcome {
            request: fallback,
            result: Err(NetworkError::Transport(err.to_string())),
        });
    }
}

/// Every request produces an outcome, even when the client panics.
fn run_request<C: SearchClient + ?Sized>(client: &C, request: FetchRequest) -> SearchOutcome {
    let result = panic::catch_unwind(AssertUnwindSafe(|| {
        client.search(&request.keyword, request.page)
    }))
    .unwrap_or_else(|_| Err(NetworkError::Transport("search request panicked".to_string())));
    if let Err(err) = &result {
        tracing::debug!(
            keyword = %request.keyword,
            page = request.page,
            %err,
            "search worker request failed"
        );
    }
    SearchOutcome { request, result }
}

#[cfg(test)]
mod tests {
    use std::time::{Duration, Instant};

    use super::*;
    use crate::search::ResultItem;

    const SLOW_DELAY: Duration = Duration::from_secs(3);

    struct EchoClient;

    impl SearchClient for EchoClient {
        fn search(&self, keyword: &str, page: u32) -> Result<SearchPage, NetworkError> {
            match keyword {
                "fail" => return Err(NetworkError::Status(500)),
                "boom" => panic!("client blew up"),
                "slow" => thread::sleep(SLOW_DELAY),
                _ => {}
            }
            Ok(SearchPage {
                total_hits: 40,
                items: vec![ResultItem {
                    image_url: format!("{keyword}-{page}-large"),
                    thumbnail_url: format!("{keyword}-{page}-small"),
                    tags: keyword.to_string(),
                }],
            })
        }
    }

    fn wait_for(worker: &SearchWorker) -> SearchOutcome {
        let deadline = Instant::now() + Duration::from_secs(5);
        loop {
            if let Some(outcome) = worker.try_recv().unwrap() {
                return outcome;
            }
            assert!(Instant::now() < deadline, "worker produced no outcome");
            thread::sleep(Duration::from_millis(5));
        }
    }

    fn request(keyword: &str, page: u32, generation: u64) -> FetchRequest {
        FetchRequest {
            keyword: keyword.to_string(),
            page,
            generation,
        }
    }

    #[test]
    fn test_worker_answers_every_request() {
        let worker = SearchWorker::spawn(EchoClient).unwrap();
        worker.submit(request("cat", 1, 1)).unwrap();
        worker.submit(request("cat", 2, 1)).unwrap();

        let mut outcomes = vec![wait_for(&worker), wait_for(&worker)];
        outcomes.sort_by_key(|outcome| outcome.request.page);
        assert_eq!(outcomes[0].request.page, 1);
        assert_eq!(outcomes[1].request.page, 2);
        assert_eq!(
            outcomes[1].result.as_ref().unwrap().items[0].image_url,
            "cat-2-large"
        );
    }

    #[test]
    fn test_new_keyword_does_not_wait_for_slow_request() {
        let worker = SearchWorker::spawn(EchoClient).unwrap();
        let started = Instant::now();
        worker.submit(request("slow", 1, 1)).unwrap();
        worker.submit(request("fast", 1, 2)).unwrap();

        let first = wait_for(&worker);
        assert_eq!(first.request.keyword, "fast");
        assert_eq!(first.request.generation, 2);
        assert!(started.elapsed() < SLOW_DELAY);
    }

    #[test]
    fn test_worker_passes_errors_through() {
        let worker = SearchWorker::spawn(EchoClient).unwrap();
        worker.submit(request("fail", 1, 1)).unwrap();
        let outcome = wait_for(&worker);
        assert_eq!(outcome.result, Err(NetworkError::Status(500)));
    }

    #[test]
    fn test_panicking_client_still_answers() {
        let worker = SearchWorker::spawn(EchoClient).unwrap();
        worker.submit(request("boom", 1, 1)).unwrap();
        let outcome = wait_for(&worker);
        assert!(matches!(outcome.result, Err(NetworkError::Transport(_))));
        assert_eq!(outcome.request.keyword, "boom");
    }

    #[test]
    fn test_try_recv_is_empty_before_any_request() {
        let worker = SearchWorker::spawn(EchoClient).unwrap();
        assert_eq!(worker.try_recv(), Ok(None));
    }

    #[test]
    fn test_try_recv_reports_stopped_dispatcher() {
        let (requests, _request_rx) = mpsc::channel();
        let (outcome_tx, outcomes) = mpsc::channel::<SearchOutcome>();
        drop(outcome_tx);
        let worker = SearchWorker {
            requests,
            outcomes,
            _handle: thread::spawn(|| {}),
        };
        assert_eq!(worker.try_recv(), Err(WorkerStopped));
    }
}
