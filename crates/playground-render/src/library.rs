//! Lazy library registry using moka
//!
//! Rendering engines are large and most conversations never need them, so
//! they are fetched on first use and cached for the lifetime of the page.
//!
//! Guarantees:
//! - At most one load in flight per library; concurrent requests share it
//! - A successful load is never repeated
//! - A failed load is not cached, so the next request retries

use crate::engine::{ChartEngine, DiagramEngine, GraphLayoutEngine};
use crate::error::LibraryError;
use async_trait::async_trait;
use moka::future::Cache;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// Lazily loaded rendering libraries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LibraryId {
    /// Mermaid-style diagram grammar
    Diagram,
    /// ECharts-style chart runtime
    Chart,
    /// D3-style tree layout
    GraphLayout,
}

impl LibraryId {
    /// All libraries
    pub const ALL: [Self; 3] = [Self::Diagram, Self::Chart, Self::GraphLayout];

    /// Human-readable name
    #[inline]
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Diagram => "diagram engine",
            Self::Chart => "chart engine",
            Self::GraphLayout => "graph layout engine",
        }
    }
}

impl fmt::Display for LibraryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Loaded library handle
#[derive(Clone)]
pub enum LibraryHandle {
    Diagram(Arc<dyn DiagramEngine>),
    Chart(Arc<dyn ChartEngine>),
    GraphLayout(Arc<dyn GraphLayoutEngine>),
}

impl LibraryHandle {
    /// Library this handle belongs to
    #[inline]
    #[must_use]
    pub fn id(&self) -> LibraryId {
        match self {
            Self::Diagram(_) => LibraryId::Diagram,
            Self::Chart(_) => LibraryId::Chart,
            Self::GraphLayout(_) => LibraryId::GraphLayout,
        }
    }
}

impl fmt::Debug for LibraryHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("LibraryHandle").field(&self.id()).finish()
    }
}

/// Fetches and initializes one library
#[async_trait]
pub trait LibraryLoader: Send + Sync {
    /// Load the library
    ///
    /// # Errors
    /// Returns [`LibraryError::LoadFailed`] when fetching or initializing
    /// fails.
    async fn load(&self, id: LibraryId) -> Result<LibraryHandle, LibraryError>;
}

/// Process-wide cache of loaded libraries
///
/// Clones share the same cache and counters.
#[derive(Clone)]
pub struct LibraryRegistry {
    loaders: HashMap<LibraryId, Arc<dyn LibraryLoader>>,
    inner: Cache<LibraryId, LibraryHandle>,
    loads: Arc<AtomicUsize>,
}

impl LibraryRegistry {
    /// Create registry without loaders
    #[must_use]
    pub fn new() -> Self {
        Self {
            loaders: HashMap::new(),
            inner: Cache::new(LibraryId::ALL.len() as u64),
            loads: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Register the loader for a library
    #[must_use]
    pub fn with_loader(mut self, id: LibraryId, loader: Arc<dyn LibraryLoader>) -> Self {
        self.loaders.insert(id, loader);
        self
    }

    /// Acquire a library, loading it on first use
    ///
    /// # Errors
    /// Returns [`LibraryError::NotRegistered`] without a loader, otherwise
    /// the loader's error. Every caller waiting on a failed load receives the
    /// same error.
    pub async fn acquire(&self, id: LibraryId) -> Result<LibraryHandle, LibraryError> {
        let loader = self
            .loaders
            .get(&id)
            .cloned()
            .ok_or(LibraryError::NotRegistered(id))?;
        let loads = Arc::clone(&self.loads);

        self.inner
            .try_get_with(id, async move {
                loads.fetch_add(1, Ordering::SeqCst);
                tracing::info!(library = %id, "loading rendering library");
                let handle = loader.load(id).await.map_err(|e| {
                    tracing::warn!(library = %id, error = %e, "library load failed");
                    e
                })?;
                if handle.id() != id {
                    return Err(LibraryError::WrongHandle {
                        expected: id,
                        actual: handle.id(),
                    });
                }
                Ok(handle)
            })
            .await
            .map_err(|e: Arc<LibraryError>| (*e).clone())
    }

    /// Acquire the diagram engine
    ///
    /// # Errors
    /// See [`Self::acquire`].
    pub async fn diagram(&self) -> Result<Arc<dyn DiagramEngine>, LibraryError> {
        match self.acquire(LibraryId::Diagram).await? {
            LibraryHandle::Diagram(engine) => Ok(engine),
            other => Err(Self::mismatch(LibraryId::Diagram, &other)),
        }
    }

    /// Acquire the chart engine
    ///
    /// # Errors
    /// See [`Self::acquire`].
    pub async fn chart(&self) -> Result<Arc<dyn ChartEngine>, LibraryError> {
        match self.acquire(LibraryId::Chart).await? {
            LibraryHandle::Chart(engine) => Ok(engine),
            other => Err(Self::mismatch(LibraryId::Chart, &other)),
        }
    }

    /// Acquire the tree layout engine
    ///
    /// # Errors
    /// See [`Self::acquire`].
    pub async fn graph_layout(&self) -> Result<Arc<dyn GraphLayoutEngine>, LibraryError> {
        match self.acquire(LibraryId::GraphLayout).await? {
            LibraryHandle::GraphLayout(engine) => Ok(engine),
            other => Err(Self::mismatch(LibraryId::GraphLayout, &other)),
        }
    }

    /// Whether a library finished loading
    #[inline]
    #[must_use]
    pub fn is_loaded(&self, id: LibraryId) -> bool {
        self.inner.contains_key(&id)
    }

    /// Whether a loader is registered
    #[inline]
    #[must_use]
    pub fn is_registered(&self, id: LibraryId) -> bool {
        self.loaders.contains_key(&id)
    }

    /// Number of load attempts started, including failed ones
    #[inline]
    #[must_use]
    pub fn load_count(&self) -> usize {
        self.loads.load(Ordering::SeqCst)
    }

    fn mismatch(expected: LibraryId, handle: &LibraryHandle) -> LibraryError {
        LibraryError::WrongHandle {
            expected,
            actual: handle.id(),
        }
    }
}

impl Default for LibraryRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for LibraryRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut registered: Vec<_> = self.loaders.keys().copied().collect();
        registered.sort_by_key(|id| id.as_str());
        f.debug_struct("LibraryRegistry")
            .field("registered", &registered)
            .field("loads", &self.load_count())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::RenderError;
    use crate::engine::DiagramLook;

    struct EchoDiagram;

    impl DiagramEngine for EchoDiagram {
        fn render(&self, id: &str, source: &str, _look: DiagramLook) -> Result<String, RenderError> {
            Ok(format!("<svg id=\"{id}\">{source}</svg>"))
        }
    }

    struct DiagramLoader;

    #[async_trait]
    impl LibraryLoader for DiagramLoader {
        async fn load(&self, _id: LibraryId) -> Result<LibraryHandle, LibraryError> {
            Ok(LibraryHandle::Diagram(Arc::new(EchoDiagram)))
        }
    }

    #[tokio::test]
    async fn unregistered_library_fails() {
        let registry = LibraryRegistry::new();
        let err = registry.acquire(LibraryId::Chart).await.unwrap_err();
        assert_eq!(err, LibraryError::NotRegistered(LibraryId::Chart));
        assert_eq!(registry.load_count(), 0);
    }

    #[tokio::test]
    async fn loads_once() {
        let registry =
            LibraryRegistry::new().with_loader(LibraryId::Diagram, Arc::new(DiagramLoader));
        assert!(!registry.is_loaded(LibraryId::Diagram));

        let engine = registry.diagram().await.unwrap();
        assert_eq!(
            engine.render("d1", "x", DiagramLook::Classic).unwrap(),
            "<svg id=\"d1\">x</svg>"
        );
        registry.diagram().await.unwrap();

        assert!(registry.is_loaded(LibraryId::Diagram));
        assert_eq!(registry.load_count(), 1);
    }

    #[tokio::test]
    async fn wrong_handle_is_rejected() {
        let registry =
            LibraryRegistry::new().with_loader(LibraryId::Chart, Arc::new(DiagramLoader));
        let err = match registry.chart().await {
            Err(err) => err,
            Ok(_) => panic!("diagram handle accepted as chart"),
        };
        assert_eq!(
            err,
            LibraryError::WrongHandle {
                expected: LibraryId::Chart,
                actual: LibraryId::Diagram,
            }
        );
        assert!(!registry.is_loaded(LibraryId::Chart));
    }
}
