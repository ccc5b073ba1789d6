//! In-memory document store with optimistic concurrency
//!
//! Every stored document carries a version drawn from a store-wide clock.
//! A transaction records the version of everything it read (absent documents
//! read as version 0) plus the exact result of every listing. Commit takes
//! the store lock, re-checks all of it, and only then applies the buffered
//! writes. Any mismatch aborts with [`DomainError::TransactionConflict`].

use std::collections::{BTreeMap, HashMap};
use std::ops::Bound;
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;
use tracing::{debug, instrument, warn};

use tally_core::{
    CollectionPath, DocPath, Document, DocumentStore, DomainError, RepoResult, Transaction,
    WriteBuffer, WriteOp,
};

#[derive(Debug, Clone)]
struct Entry {
    version: u64,
    data: Document,
}

#[derive(Debug, Default)]
struct State {
    docs: BTreeMap<String, Entry>,
    clock: u64,
    injected_conflicts: usize,
    commits: u64,
}

impl State {
    fn version(&self, path: &DocPath) -> u64 {
        self.docs.get(path.as_str()).map_or(0, |e| e.version)
    }

    fn list(
        &self,
        collection: &CollectionPath,
        start_after: Option<&DocPath>,
        limit: Option<usize>,
    ) -> RepoResult<Vec<(DocPath, u64, Document)>> {
        let prefix = collection.child_prefix();
        let lower = match start_after {
            Some(after) => Bound::Excluded(after.as_str()),
            None => Bound::Included(prefix.as_str()),
        };
        self.docs
            .range::<str, _>((lower, Bound::Unbounded))
            .take_while(|(key, _)| key.starts_with(&prefix))
            .filter(|(key, _)| !key[prefix.len()..].contains('/'))
            .take(limit.unwrap_or(usize::MAX))
            .map(|(key, entry)| {
                Ok((
                    DocPath::parse(key.clone())?,
                    entry.version,
                    entry.data.clone(),
                ))
            })
            .collect()
    }
}

/// Process-local [`DocumentStore`]
#[derive(Debug, Clone, Default)]
pub struct MemoryDocumentStore {
    state: Arc<Mutex<State>>,
}

impl MemoryDocumentStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Write a document directly, bypassing transactions
    pub fn insert(&self, path: DocPath, data: Document) {
        let mut state = self.state.lock();
        state.clock += 1;
        let version = state.clock;
        state.docs.insert(path.into(), Entry { version, data });
    }

    /// Make the next `n` commits fail with a conflict
    pub fn inject_conflicts(&self, n: usize) {
        self.state.lock().injected_conflicts = n;
    }

    /// Number of successful commits so far
    pub fn commit_count(&self) -> u64 {
        self.state.lock().commits
    }

    pub fn contains(&self, path: &DocPath) -> bool {
        self.state.lock().docs.contains_key(path.as_str())
    }

    /// Paths of every stored document at or beneath `path`
    pub fn paths_under(&self, path: &DocPath) -> Vec<String> {
        let nested = format!("{}/", path.as_str());
        self.state
            .lock()
            .docs
            .keys()
            .filter(|key| key.as_str() == path.as_str() || key.starts_with(&nested))
            .cloned()
            .collect()
    }

    /// Every stored document keyed by path
    pub fn snapshot(&self) -> BTreeMap<String, Document> {
        self.state
            .lock()
            .docs
            .iter()
            .map(|(k, e)| (k.clone(), e.data.clone()))
            .collect()
    }
}

#[async_trait]
impl DocumentStore for MemoryDocumentStore {
    #[instrument(skip(self))]
    async fn get(&self, path: &DocPath) -> RepoResult<Option<Document>> {
        Ok(self
            .state
            .lock()
            .docs
            .get(path.as_str())
            .map(|e| e.data.clone()))
    }

    #[instrument(skip(self))]
    async fn list_after(
        &self,
        collection: &CollectionPath,
        start_after: Option<&DocPath>,
        limit: Option<usize>,
    ) -> RepoResult<Vec<(DocPath, Document)>> {
        let listed = self.state.lock().list(collection, start_after, limit)?;
        Ok(listed.into_iter().map(|(p, _, d)| (p, d)).collect())
    }

    async fn begin(&self) -> RepoResult<Box<dyn Transaction>> {
        Ok(Box::new(MemoryTransaction {
            state: Arc::clone(&self.state),
            reads: HashMap::new(),
            listings: Vec::new(),
            writes: WriteBuffer::new(),
        }))
    }
}

struct Listing {
    collection: CollectionPath,
    limit: Option<usize>,
    seen: Vec<(DocPath, u64)>,
}

/// Transaction over a [`MemoryDocumentStore`]
struct MemoryTransaction {
    state: Arc<Mutex<State>>,
    reads: HashMap<DocPath, u64>,
    listings: Vec<Listing>,
    writes: WriteBuffer,
}

impl MemoryTransaction {
    fn validate(&self, state: &State) -> RepoResult<()> {
        for (path, version) in &self.reads {
            if state.version(path) != *version {
                debug!(path = %path, "read set changed before commit");
                return Err(DomainError::TransactionConflict);
            }
        }
        for listing in &self.listings {
            let now: Vec<(DocPath, u64)> = state
                .list(&listing.collection, None, listing.limit)?
                .into_iter()
                .map(|(p, v, _)| (p, v))
                .collect();
            if now != listing.seen {
                debug!(collection = %listing.collection, "listing changed before commit");
                return Err(DomainError::TransactionConflict);
            }
        }
        Ok(())
    }
}

#[async_trait]
impl Transaction for MemoryTransaction {
    async fn get(&mut self, path: &DocPath) -> RepoResult<Option<Document>> {
        self.writes.guard_read(path.as_str())?;
        let state = self.state.lock();
        let entry = state.docs.get(path.as_str());
        self.reads
            .insert(path.clone(), entry.map_or(0, |e| e.version));
        Ok(entry.map(|e| e.data.clone()))
    }

    async fn list(
        &mut self,
        collection: &CollectionPath,
        limit: Option<usize>,
    ) -> RepoResult<Vec<(DocPath, Document)>> {
        self.writes.guard_read(collection.as_str())?;
        let listed = self.state.lock().list(collection, None, limit)?;
        self.listings.push(Listing {
            collection: collection.clone(),
            limit,
            seen: listed.iter().map(|(p, v, _)| (p.clone(), *v)).collect(),
        });
        Ok(listed.into_iter().map(|(p, _, d)| (p, d)).collect())
    }

    fn write(&mut self, op: WriteOp) {
        self.writes.push(op);
    }

    fn pending_writes(&self) -> usize {
        self.writes.len()
    }

    async fn commit(self: Box<Self>) -> RepoResult<()> {
        let mut state = self.state.lock();

        if state.injected_conflicts > 0 {
            state.injected_conflicts -= 1;
            warn!("injected commit conflict");
            return Err(DomainError::TransactionConflict);
        }
        self.validate(&state)?;

        let resolved = self
            .writes
            .resolve(|path| state.docs.get(path.as_str()).map(|e| e.data.clone()));
        for (path, next) in resolved {
            match next {
                Some(data) => {
                    state.clock += 1;
                    let version = state.clock;
                    state.docs.insert(path.into(), Entry { version, data });
                }
                None => {
                    state.docs.remove(path.as_str());
                }
            }
        }
        state.commits += 1;
        debug!(writes = self.writes.len(), "memory transaction committed");
        Ok(())
    }

    async fn rollback(self: Box<Self>) -> RepoResult<()> {
        Ok(())
    }
}
