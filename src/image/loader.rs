//! Image downloading and caching.

use std::collections::{HashMap, VecDeque};
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::{Arc, Mutex, PoisonError};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use image::DynamicImage;

/// Longest edge, in pixels, that thumbnails are reduced to after decoding.
const THUMBNAIL_MAX_EDGE: u32 = 320;

const DOWNLOAD_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Default)]
struct CacheInner {
    entries: HashMap<String, DynamicImage>,
    order: VecDeque<String>,
}

/// Shared cache of decoded images keyed by URL.
///
/// Clones share the same storage. Once full, the oldest insertion is evicted.
#[derive(Debug, Clone, Default)]
pub struct ImageCache {
    inner: Arc<Mutex<CacheInner>>,
    max_size: usize,
}

impl ImageCache {
    /// Create a new image cache with the given maximum number of entries.
    pub fn new(max_size: usize) -> Self {
        Self {
            inner: Arc::new(Mutex::new(CacheInner::default())),
            max_size,
        }
    }

    /// Get an image from the cache.
    pub fn get(&self, url: &str) -> Option<DynamicImage> {
        let guard = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        guard.entries.get(url).cloned()
    }

    /// Insert an image into the cache.
    pub fn insert(&self, url: String, image: DynamicImage) {
        let mut guard = self.inner.lock().unwrap_or_else(PoisonError::into_inner);

        if guard.entries.contains_key(&url) {
            guard.entries.insert(url, image);
            return;
        }

        guard.order.push_back(url.clone());
        guard.entries.insert(url, image);

        while guard.entries.len() > self.max_size {
            if let Some(oldest) = guard.order.pop_front() {
                guard.entries.remove(&oldest);
            } else {
                break;
            }
        }
    }

    /// Check if an image is in the cache.
    pub fn contains(&self, url: &str) -> bool {
        let guard = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        guard.entries.contains_key(url)
    }

    /// Get the number of cached images.
    pub fn len(&self) -> usize {
        let guard = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        guard.entries.len()
    }

    /// Check if the cache is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// What an image is going to be used for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageKind {
    /// Grid tile, downscaled after decoding
    Thumbnail,
    /// Preview overlay, kept at full resolution
    Full,
}

#[derive(Debug, thiserror::Error)]
pub enum ImageFetchError {
    #[error("download failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("decode failed: {0}")]
    Decode(#[from] image::ImageError),
}

/// A finished download.
#[derive(Debug)]
pub struct FetchedImage {
    pub url: String,
    pub kind: ImageKind,
    pub result: Result<DynamicImage, ImageFetchError>,
}

#[derive(Debug)]
struct ImageJob {
    url: String,
    kind: ImageKind,
}

/// Small pool of threads downloading and decoding images.
pub struct ImageFetcher {
    jobs: Sender<ImageJob>,
    done: Receiver<FetchedImage>,
    cache: ImageCache,
    _workers: Vec<JoinHandle<()>>,
}

impl ImageFetcher {
    /// Start `workers` download threads backed by `cache`.
    ///
    /// # Errors
    /// Returns an error if the HTTP client or a thread cannot be created.
    pub fn spawn(workers: usize, cache: ImageCache) -> std::io::Result<Self> {
        let http = reqwest::blocking::Client::builder()
            .timeout(DOWNLOAD_TIMEOUT)
            .user_agent(concat!("pixgrid/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(std::io::Error::other)?;

        let (job_tx, job_rx) = mpsc::channel::<ImageJob>();
        let job_rx = Arc::new(Mutex::new(job_rx));
        let (done_tx, done_rx) = mpsc::channel();

        let mut handles = Vec::with_capacity(workers.max(1));
        for i in 0..workers.max(1) {
            let jobs = Arc::clone(&job_rx);
            let done = done_tx.clone();
            let http = http.clone();
            let cache = cache.clone();
            let handle = thread::Builder::new()
                .name(format!("pixgrid-image-{i}"))
                .spawn(move || worker_loop(&jobs, &done, &http, &cache))?;
            handles.push(handle);
        }

        Ok(Self {
            jobs: job_tx,
            done: done_rx,
            cache,
            _workers: handles,
        })
    }

    /// Queue a download. Returns false when the workers are gone.
    pub fn request(&self, url: &str, kind: ImageKind) -> bool {
        crate::debug_log::log_event("image.request", format!("kind={kind:?} url={url}"));
        self.jobs
            .send(ImageJob {
                url: url.to_string(),
                kind,
            })
            .is_ok()
    }

    /// Take one finished download, if any is ready.
    pub fn try_recv(&self) -> Option<FetchedImage> {
        self.done.try_recv().ok()
    }

    pub const fn cache(&self) -> &ImageCache {
        &self.cache
    }
}

fn worker_loop(
    jobs: &Mutex<Receiver<ImageJob>>,
    done: &Sender<FetchedImage>,
    http: &reqwest::blocking::Client,
    cache: &ImageCache,
) {
    loop {
        let job = {
            let guard = jobs.lock().unwrap_or_else(PoisonError::into_inner);
            match guard.recv() {
                Ok(job) => job,
                Err(_) => return,
            }
        };

        let result = match cache.get(&job.url) {
            Some(image) => Ok(image),
            None => download(http, &job.url, job.kind).inspect(|image| {
                cache.insert(job.url.clone(), image.clone());
            }),
        };

        let fetched = FetchedImage {
            url: job.url,
            kind: job.kind,
            result,
        };
        if done.send(fetched).is_err() {
            return;
        }
    }
}

fn download(
    http: &reqwest::blocking::Client,
    url: &str,
    kind: ImageKind,
) -> Result<DynamicImage, ImageFetchError> {
    let bytes = http.get(url).send()?.error_for_status()?.bytes()?;
    let image = image::load_from_memory(&bytes)?;
    Ok(match kind {
        ImageKind::Thumbnail => image.thumbnail(THUMBNAIL_MAX_EDGE, THUMBNAIL_MAX_EDGE),
        ImageKind::Full => image,
    })
}
