//! Background reparsing of a project's scripts.
//!
//! One worker thread owns all parsing. Requests that arrive while a pass is
//! running are merged into the next pass (latest text per file wins), and a
//! finished pass is published by swapping a single `Arc`, so readers always
//! see a complete snapshot.

use crate::config::IndexOptions;
use crate::index::SymbolIndex;
use crate::parser::parse;
use crate::tree::SkriptTree;
use rayon::prelude::*;
use std::collections::BTreeMap;
use std::mem;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError, RwLock};
use std::thread::{self, JoinHandle};

/// A fully parsed view of the project at one point in time.
#[derive(Debug, Clone, Default)]
pub struct Snapshot {
    generation: u64,
    trees: BTreeMap<PathBuf, Arc<SkriptTree>>,
    index: SymbolIndex,
}

impl Snapshot {
    /// Count of published passes; zero before the first one.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn tree(&self, path: &Path) -> Option<&Arc<SkriptTree>> {
        self.trees.get(path)
    }

    pub fn files(&self) -> impl Iterator<Item = &Path> {
        self.trees.keys().map(PathBuf::as_path)
    }

    pub fn index(&self) -> &SymbolIndex {
        &self.index
    }
}

enum Change {
    Update(String),
    Remove,
}

#[derive(Default)]
struct Queue {
    pending: BTreeMap<PathBuf, Change>,
    running: bool,
    shutdown: bool,
}

struct Shared {
    queue: Mutex<Queue>,
    wake: Condvar,
    idle: Condvar,
    current: RwLock<Arc<Snapshot>>,
    options: IndexOptions,
    // Held by tests to keep a pass in flight.
    #[cfg(test)]
    pass_gate: Mutex<()>,
}

impl Shared {
    fn queue(&self) -> MutexGuard<'_, Queue> {
        self.queue.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn current(&self) -> Arc<Snapshot> {
        self.current
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn publish(&self, snapshot: Snapshot) {
        *self.current.write().unwrap_or_else(PoisonError::into_inner) = Arc::new(snapshot);
    }
}

pub struct Reparser {
    shared: Arc<Shared>,
    worker: Option<JoinHandle<()>>,
}

impl Reparser {
    pub fn spawn(options: IndexOptions) -> Self {
        let shared = Arc::new(Shared {
            queue: Mutex::new(Queue::default()),
            wake: Condvar::new(),
            idle: Condvar::new(),
            current: RwLock::new(Arc::new(Snapshot::default())),
            options,
            #[cfg(test)]
            pass_gate: Mutex::new(()),
        });
        let worker = {
            let shared = Arc::clone(&shared);
            thread::Builder::new()
                .name("skript-reparse".to_string())
                .spawn(move || run(&shared))
                .ok()
        };
        if worker.is_none() {
            tracing::error!("failed to start reparse worker");
        }
        Self { shared, worker }
    }

    /// Schedules `path` to be reparsed with `text`.
    pub fn request(&self, path: impl Into<PathBuf>, text: impl Into<String>) {
        self.enqueue(path.into(), Change::Update(text.into()));
    }

    /// Schedules `path` to be dropped from the project.
    pub fn remove(&self, path: impl Into<PathBuf>) {
        self.enqueue(path.into(), Change::Remove);
    }

    fn enqueue(&self, path: PathBuf, change: Change) {
        let mut queue = self.shared.queue();
        if queue.running {
            tracing::trace!(path = %path.display(), "coalescing reparse request");
        }
        queue.pending.insert(path, change);
        self.shared.wake.notify_one();
    }

    /// The latest published snapshot.
    pub fn snapshot(&self) -> Arc<Snapshot> {
        self.shared.current()
    }

    pub fn generation(&self) -> u64 {
        self.snapshot().generation
    }

    /// Blocks until nothing is pending and no pass is running.
    pub fn wait_idle(&self) {
        if self.worker.is_none() {
            return;
        }
        let mut queue = self.shared.queue();
        while (queue.running || !queue.pending.is_empty()) && !queue.shutdown {
            queue = self
                .shared
                .idle
                .wait(queue)
                .unwrap_or_else(PoisonError::into_inner);
        }
    }

    /// Stops the worker once the pass in flight, if any, has finished.
    pub fn shutdown(&mut self) {
        {
            let mut queue = self.shared.queue();
            queue.shutdown = true;
        }
        self.shared.wake.notify_all();
        self.shared.idle.notify_all();
        if let Some(worker) = self.worker.take() {
            if worker.join().is_err() {
                tracing::error!("reparse worker panicked");
            }
        }
    }
}

impl Drop for Reparser {
    fn drop(&mut self) {
        self.shutdown();
    }
}

fn run(shared: &Shared) {
    loop {
        let batch = {
            let mut queue = shared.queue();
            while queue.pending.is_empty() && !queue.shutdown {
                queue = shared
                    .wake
                    .wait(queue)
                    .unwrap_or_else(PoisonError::into_inner);
            }
            if queue.shutdown {
                break;
            }
            queue.running = true;
            mem::take(&mut queue.pending)
        };

        {
            #[cfg(test)]
            let _gate = shared
                .pass_gate
                .lock()
                .unwrap_or_else(PoisonError::into_inner);
            let next = build_snapshot(&shared.current(), batch, &shared.options);
            let generation = next.generation;
            shared.publish(next);
            tracing::debug!(generation, "published reparse snapshot");
        }

        let mut queue = shared.queue();
        queue.running = false;
        shared.idle.notify_all();
    }

    let mut queue = shared.queue();
    queue.running = false;
    shared.idle.notify_all();
}

/// Applies a batch of changes on top of `previous` without touching it.
fn build_snapshot(
    previous: &Snapshot,
    batch: BTreeMap<PathBuf, Change>,
    options: &IndexOptions,
) -> Snapshot {
    let mut trees = previous.trees.clone();
    let mut index = previous.index.clone();

    let mut updates = Vec::new();
    for (path, change) in batch {
        match change {
            Change::Update(text) => updates.push((path, text)),
            Change::Remove => {
                trees.remove(&path);
                index.remove_file(&path);
            }
        }
    }

    let parsed: Vec<(PathBuf, SkriptTree)> = updates
        .into_par_iter()
        .map(|(path, text)| {
            let tree = parse(&text, &options.parse);
            (path, tree)
        })
        .collect();
    tracing::debug!(files = parsed.len(), "reparsed scripts");

    for (path, tree) in parsed {
        if options.cross_auto_complete {
            index.update_tree(path.clone(), &tree);
        }
        trees.insert(path, Arc::new(tree));
    }

    Snapshot {
        generation: previous.generation + 1,
        trees,
        index,
    }
}
