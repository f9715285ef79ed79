//! Background document building for live previews.
//!
//! [`DocumentRenderer`] parses and builds documents on a `rayon` thread pool.
//! Every submission is tagged with a generation number; only the result of
//! the latest submission is delivered. Superseded builds run to completion
//! and are dropped instead of being interrupted.
//!
//! # Thread Safety
//!
//! - Uses `AtomicU64` for the current generation
//! - Uses `RwLock<Option<ParsedHook>>` for the parsed-nodes hook
//! - Delivers results over an `mpsc` channel to a single [`Deliveries`] consumer
//!
//! # Example
//!
//! ```
//! use std::time::Duration;
//!
//! use mdview_preview::DocumentRenderer;
//! use mdview_renderer::{StyleSheet, TreeBuilder};
//!
//! let (renderer, deliveries) =
//!     DocumentRenderer::new(TreeBuilder::new(StyleSheet::default()), 1).unwrap();
//! let generation = renderer.submit("# Hello");
//!
//! let rendered = deliveries.recv_timeout(Duration::from_secs(5)).unwrap();
//! assert_eq!(rendered.generation, generation);
//! ```

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::sync::{Arc, RwLock};
use std::time::{Duration, Instant};

use mdview_renderer::{BuildError, ParsedNode, RenderNode, TreeBuilder, parse_markdown};

/// Hook receiving freshly parsed nodes with their generation, e.g. for caching.
pub type ParsedHook = Arc<dyn Fn(u64, &[ParsedNode]) + Send + Sync>;

/// Preview error.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum PreviewError {
    /// Worker pool could not be created.
    #[error("Failed to create thread pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}

/// A finished build.
#[derive(Debug)]
pub struct Rendered {
    /// Generation of the submission that produced this tree.
    pub generation: u64,
    /// Root render nodes.
    pub nodes: Vec<RenderNode>,
    /// Time spent parsing and building.
    pub elapsed: Duration,
}

enum Input {
    Markdown(String),
    Nodes(Vec<ParsedNode>),
}

struct Shared {
    builder: TreeBuilder,
    generation: AtomicU64,
    on_parsed: RwLock<Option<ParsedHook>>,
}

impl Shared {
    fn is_current(&self, generation: u64) -> bool {
        self.generation.load(Ordering::Acquire) == generation
    }

    /// Parse (if needed) and build.
    fn build(&self, generation: u64, input: Input) -> Result<Vec<RenderNode>, BuildError> {
        let nodes = match input {
            Input::Markdown(text) => {
                let nodes = parse_markdown(&text);
                let hook = self.on_parsed.read().unwrap().clone();
                if let Some(hook) = hook {
                    hook(generation, &nodes);
                }
                nodes
            }
            Input::Nodes(nodes) => nodes,
        };
        self.builder.build(&nodes)
    }
}

/// Builds documents in the background, delivering only the latest result.
pub struct DocumentRenderer {
    pool: rayon::ThreadPool,
    shared: Arc<Shared>,
    sender: Sender<Rendered>,
}

impl DocumentRenderer {
    /// Create a renderer with `threads` workers and its delivery endpoint.
    ///
    /// A thread count of zero is treated as one.
    ///
    /// # Errors
    ///
    /// Returns [`PreviewError::ThreadPool`] if the worker pool cannot be created.
    pub fn new(builder: TreeBuilder, threads: usize) -> Result<(Self, Deliveries), PreviewError> {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(threads.max(1))
            .thread_name(|index| format!("mdview-build-{index}"))
            .build()?;

        let shared = Arc::new(Shared {
            builder,
            generation: AtomicU64::new(0),
            on_parsed: RwLock::new(None),
        });
        let (sender, receiver) = mpsc::channel();

        let deliveries = Deliveries {
            receiver,
            shared: Arc::clone(&shared),
        };
        Ok((
            Self {
                pool,
                shared,
                sender,
            },
            deliveries,
        ))
    }

    /// Install a hook called with parsed nodes of every markdown submission.
    ///
    /// # Panics
    ///
    /// Panics if the internal `RwLock` is poisoned.
    pub fn set_on_parsed(&self, hook: Option<ParsedHook>) {
        *self.shared.on_parsed.write().unwrap() = hook;
    }

    /// Parse and build `markdown` in the background.
    ///
    /// Returns the generation assigned to this submission. Any earlier
    /// submission still in flight becomes stale.
    pub fn submit(&self, markdown: impl Into<String>) -> u64 {
        self.spawn(Input::Markdown(markdown.into()))
    }

    /// Build already parsed nodes in the background, skipping the parse step.
    pub fn submit_nodes(&self, nodes: Vec<ParsedNode>) -> u64 {
        self.spawn(Input::Nodes(nodes))
    }

    /// Make every in-flight build stale without submitting a new one.
    pub fn cancel(&self) {
        let generation = self.shared.generation.fetch_add(1, Ordering::AcqRel) + 1;
        tracing::debug!(generation, "Cancelled in-flight builds");
    }

    /// Generation of the latest submission or cancellation.
    #[must_use]
    pub fn current_generation(&self) -> u64 {
        self.shared.generation.load(Ordering::Acquire)
    }

    fn spawn(&self, input: Input) -> u64 {
        let generation = self.shared.generation.fetch_add(1, Ordering::AcqRel) + 1;
        let shared = Arc::clone(&self.shared);
        let sender = self.sender.clone();

        self.pool.spawn(move || {
            let started = Instant::now();
            let result = panic::catch_unwind(AssertUnwindSafe(|| shared.build(generation, input)));
            let elapsed = started.elapsed();

            match result {
                Ok(Ok(nodes)) if shared.is_current(generation) => {
                    tracing::debug!(
                        generation,
                        elapsed_ms = elapsed.as_millis(),
                        blocks = nodes.len(),
                        "Document built"
                    );
                    // The consumer may be gone; nothing to deliver to then
                    let _ = sender.send(Rendered {
                        generation,
                        nodes,
                        elapsed,
                    });
                }
                Ok(Ok(_)) => {
                    tracing::debug!(generation, "Discarding superseded build");
                }
                Ok(Err(e)) => {
                    tracing::error!(generation, error = %e, "Document build failed");
                }
                Err(payload) => {
                    tracing::error!(
                        generation,
                        panic = panic_message(payload.as_ref()),
                        "Document build panicked"
                    );
                }
            }
        });

        generation
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    payload
        .downcast_ref::<&str>()
        .copied()
        .or_else(|| payload.downcast_ref::<String>().map(String::as_str))
        .unwrap_or("unknown panic")
}

/// Receiving side of a [`DocumentRenderer`].
///
/// Results that became stale after they were sent are skipped.
pub struct Deliveries {
    receiver: Receiver<Rendered>,
    shared: Arc<Shared>,
}

impl Deliveries {
    /// Take the newest current result without blocking.
    pub fn try_latest(&self) -> Option<Rendered> {
        let mut latest = None;
        while let Ok(rendered) = self.receiver.try_recv() {
            if self.shared.is_current(rendered.generation) {
                latest = Some(rendered);
            }
        }
        latest
    }

    /// Wait up to `timeout` for a current result.
    pub fn recv_timeout(&self, timeout: Duration) -> Option<Rendered> {
        let deadline = Instant::now() + timeout;
        loop {
            let remaining = deadline.saturating_duration_since(Instant::now());
            match self.receiver.recv_timeout(remaining) {
                Ok(rendered) if self.shared.is_current(rendered.generation) => {
                    return Some(rendered);
                }
                Ok(rendered) => {
                    tracing::debug!(generation = rendered.generation, "Dropping stale delivery");
                }
                Err(RecvTimeoutError::Timeout | RecvTimeoutError::Disconnected) => return None,
            }
        }
    }

    /// Block until a current result arrives.
    ///
    /// Returns `None` once the renderer is dropped and all builds finished.
    pub fn recv(&self) -> Option<Rendered> {
        loop {
            let rendered = self.receiver.recv().ok()?;
            if self.shared.is_current(rendered.generation) {
                return Some(rendered);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use mdview_renderer::{
        BuilderDelegate, DelegateError, LinkHandler, StyleSheet, outline,
    };

    use super::*;

    const TIMEOUT: Duration = Duration::from_secs(10);

    fn renderer() -> (DocumentRenderer, Deliveries) {
        DocumentRenderer::new(TreeBuilder::new(StyleSheet::default()), 1).unwrap()
    }

    /// Hook that blocks the first generation until released.
    fn gate_first_generation(renderer: &DocumentRenderer) -> mpsc::Sender<()> {
        let (release, gate) = mpsc::channel::<()>();
        let gate = Mutex::new(gate);
        renderer.set_on_parsed(Some(Arc::new(move |generation, _nodes: &[ParsedNode]| {
            if generation == 1 {
                let _ = gate.lock().unwrap().recv();
            }
        })));
        release
    }

    #[test]
    fn test_submit_delivers_result() {
        let (renderer, deliveries) = renderer();
        let generation = renderer.submit("# Title\n\nBody");

        let rendered = deliveries.recv_timeout(TIMEOUT).unwrap();

        assert_eq!(rendered.generation, generation);
        assert_eq!(rendered.nodes.len(), 3);
    }

    #[test]
    fn test_submit_normalizes_crlf() {
        let (renderer, deliveries) = renderer();
        renderer.submit("one\r\ntwo");

        let rendered = deliveries.recv_timeout(TIMEOUT).unwrap();
        assert!(outline(&rendered.nodes).contains("\"one two\""));
    }

    #[test]
    fn test_superseded_build_discarded() {
        let (renderer, deliveries) = renderer();
        let release = gate_first_generation(&renderer);

        let first = renderer.submit("first");
        let second = renderer.submit("second");
        release.send(()).unwrap();

        let rendered = deliveries.recv_timeout(TIMEOUT).unwrap();
        assert_eq!(first, 1);
        assert_eq!(rendered.generation, second);
        assert!(outline(&rendered.nodes).contains("second"));
        assert!(deliveries.try_latest().is_none());
    }

    #[test]
    fn test_cancel_discards_in_flight() {
        let (renderer, deliveries) = renderer();
        let release = gate_first_generation(&renderer);

        renderer.submit("doomed");
        renderer.cancel();
        release.send(()).unwrap();

        assert_eq!(renderer.current_generation(), 2);
        assert!(deliveries.recv_timeout(Duration::from_millis(300)).is_none());
    }

    #[test]
    fn test_submit_nodes_skips_parse_hook() {
        let (renderer, deliveries) = renderer();
        let calls = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&calls);
        renderer.set_on_parsed(Some(Arc::new(move |generation, nodes: &[ParsedNode]| {
            sink.lock().unwrap().push((generation, nodes.len()));
        })));

        renderer.submit("a\n\nb");
        deliveries.recv_timeout(TIMEOUT).unwrap();
        let nodes = vec![ParsedNode::element("p", vec![ParsedNode::text("cached")])];
        let generation = renderer.submit_nodes(nodes);
        let rendered = deliveries.recv_timeout(TIMEOUT).unwrap();

        assert_eq!(rendered.generation, generation);
        assert_eq!(*calls.lock().unwrap(), [(1, 2)]);
    }

    #[test]
    fn test_failed_build_delivers_nothing() {
        struct Refuse;

        impl BuilderDelegate for Refuse {
            fn create_link(&self, href: &str) -> Result<Arc<dyn LinkHandler>, DelegateError> {
                Err(DelegateError::Link {
                    href: href.to_owned(),
                    message: "refused".to_owned(),
                })
            }
        }

        let builder = TreeBuilder::new(StyleSheet::default()).with_delegate(Arc::new(Refuse));
        let (renderer, deliveries) = DocumentRenderer::new(builder, 1).unwrap();

        renderer.submit("[link](https://example.com)");
        assert!(deliveries.recv_timeout(Duration::from_millis(300)).is_none());

        let generation = renderer.submit("no links here");
        assert_eq!(deliveries.recv_timeout(TIMEOUT).unwrap().generation, generation);
    }

    #[test]
    fn test_panicking_build_is_contained() {
        let (renderer, deliveries) = renderer();
        let malformed = vec![ParsedNode::element(
            "p",
            vec![ParsedNode::element(
                "em",
                vec![ParsedNode::element("p", vec![ParsedNode::text("x")])],
            )],
        )];

        renderer.submit_nodes(malformed);
        assert!(deliveries.recv_timeout(Duration::from_millis(300)).is_none());

        let generation = renderer.submit("still alive");
        assert_eq!(deliveries.recv_timeout(TIMEOUT).unwrap().generation, generation);
    }

    #[test]
    fn test_recv_returns_none_after_drop() {
        let (renderer, deliveries) = renderer();
        drop(renderer);
        assert!(deliveries.recv().is_none());
    }

    #[test]
    fn test_panic_message() {
        let payload: Box<dyn Any + Send> = Box::new("static message");
        assert_eq!(panic_message(payload.as_ref()), "static message");
        let payload: Box<dyn Any + Send> = Box::new(String::from("owned"));
        assert_eq!(panic_message(payload.as_ref()), "owned");
        let payload: Box<dyn Any + Send> = Box::new(42);
        assert_eq!(panic_message(payload.as_ref()), "unknown panic");
    }
}
