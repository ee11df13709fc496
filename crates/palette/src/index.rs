//! Cached union of provider output.
//!
//! # Caching
//!
//! Entries are keyed by `(context signature, provider id)` and store the
//! provider's [`CommandProvider::generation`] observed *before* `provide`
//! ran. A hit is only trusted when the stored generation equals the current
//! one, so a generation bump that races a recompute merely causes one extra
//! recompute later, never a stale hit. The cache lock is never held while a
//! provider runs.
//!
//! The cache is bounded (LRU), so many distinct contexts cannot grow it
//! without limit.

use std::collections::BTreeMap;
use std::num::NonZeroUsize;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use arc_swap::ArcSwap;
use lru::LruCache;
use parking_lot::Mutex;
use rustc_hash::FxHashMap;
use serde::Serialize;
use switchyard_invocation::panic_message;
use tracing::{trace, warn};

use crate::command::Command;
use crate::context::CommandContext;
use crate::error::PaletteError;
use crate::provider::CommandProvider;

type CacheKey = (u64, Arc<str>);

#[derive(Clone)]
struct CacheEntry {
	generation: u64,
	commands: Arc<[Command]>,
}

/// Observability counters.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct IndexStats {
	pub hits: u64,
	pub misses: u64,
	/// Successful `provide` calls per provider id.
	pub recomputes: BTreeMap<String, u64>,
}

impl IndexStats {
	pub fn recomputes_for(&self, provider: &str) -> u64 {
		self.recomputes.get(provider).copied().unwrap_or(0)
	}
}

#[derive(Clone)]
struct RegisteredProvider {
	id: Arc<str>,
	provider: Arc<dyn CommandProvider>,
}

/// Single writer of derived command data.
pub struct CommandIndex {
	providers: ArcSwap<Vec<RegisteredProvider>>,
	writer: Mutex<()>,
	cache: Mutex<LruCache<CacheKey, CacheEntry>>,
	hits: AtomicU64,
	misses: AtomicU64,
	recomputes: Mutex<FxHashMap<Arc<str>, u64>>,
}

impl std::fmt::Debug for CommandIndex {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("CommandIndex")
			.field("providers", &self.provider_ids())
			.field("cached", &self.cache.lock().len())
			.finish_non_exhaustive()
	}
}

impl CommandIndex {
	pub fn new(capacity: NonZeroUsize) -> Self {
		Self {
			providers: ArcSwap::from_pointee(Vec::new()),
			writer: Mutex::new(()),
			cache: Mutex::new(LruCache::new(capacity)),
			hits: AtomicU64::new(0),
			misses: AtomicU64::new(0),
			recomputes: Mutex::new(FxHashMap::default()),
		}
	}

	/// Appends a provider. Registration order is the provider's rank, used
	/// for empty-query ordering and search tie-breaks.
	///
	/// The id becomes one segment of `plugin:<provider>:<name>`, so it may not
	/// be empty or contain `:`.
	pub fn register_provider(&self, provider: Arc<dyn CommandProvider>) -> Result<usize, PaletteError> {
		let _writer = self.writer.lock();
		let id: Arc<str> = Arc::from(provider.provider_id());
		if id.is_empty() || id.contains(':') {
			return Err(PaletteError::InvalidProviderId(id.to_string()));
		}
		let current = self.providers.load_full();
		if current.iter().any(|p| p.id == id) {
			return Err(PaletteError::DuplicateProvider(id.to_string()));
		}
		let mut next = Vec::clone(&current);
		next.push(RegisteredProvider { id: Arc::clone(&id), provider });
		let rank = next.len() - 1;
		self.providers.store(Arc::new(next));
		tracing::debug!(provider = %id, rank, "registered command provider");
		Ok(rank)
	}

	pub fn provider(&self, id: &str) -> Option<Arc<dyn CommandProvider>> {
		self.providers.load().iter().find(|p| &*p.id == id).map(|p| Arc::clone(&p.provider))
	}

	pub fn provider_ids(&self) -> Vec<String> {
		self.providers.load().iter().map(|p| p.id.to_string()).collect()
	}

	/// Union of every active provider's commands for `ctx`, in provider
	/// registration order. Faulting providers contribute nothing.
	pub fn commands(&self, ctx: &CommandContext) -> Vec<Command> {
		let signature = ctx.signature();
		let providers = self.providers.load_full();
		let mut out = Vec::new();
		for (rank, registered) in providers.iter().enumerate() {
			if let Some(commands) = self.provider_commands(rank, registered, ctx, signature) {
				out.extend(commands.iter().cloned());
			}
		}
		out
	}

	pub fn stats(&self) -> IndexStats {
		IndexStats {
			hits: self.hits.load(Ordering::Relaxed),
			misses: self.misses.load(Ordering::Relaxed),
			recomputes: self.recomputes.lock().iter().map(|(id, n)| (id.to_string(), *n)).collect(),
		}
	}

	pub fn cached_entries(&self) -> usize {
		self.cache.lock().len()
	}

	pub fn clear_cache(&self) {
		self.cache.lock().clear();
	}

	fn provider_commands(&self, rank: usize, registered: &RegisteredProvider, ctx: &CommandContext, signature: u64) -> Option<Arc<[Command]>> {
		let id = &registered.id;
		let provider = registered.provider.as_ref();

		let (active, generation) = guarded(id, "checking activity", || (provider.is_active(ctx), provider.generation()))?;
		if !active {
			return None;
		}

		let key: CacheKey = (signature, Arc::clone(id));
		if let Some(entry) = self.cache.lock().get(&key)
			&& entry.generation == generation
		{
			self.hits.fetch_add(1, Ordering::Relaxed);
			trace!(provider = %id, generation, "command cache hit");
			return Some(Arc::clone(&entry.commands));
		}
		self.misses.fetch_add(1, Ordering::Relaxed);
		trace!(provider = %id, generation, "command cache miss");

		let commands = match guarded(id, "providing commands", || provider.provide(ctx))? {
			Ok(commands) => commands,
			Err(err) => {
				warn!(provider = %id, error = %err, "provider failed; contributing no commands");
				return None;
			}
		};
		let commands: Arc<[Command]> = commands
			.into_iter()
			.map(|mut command| {
				command.provider = id.to_string();
				command.provider_rank = rank;
				command
			})
			.collect();

		*self.recomputes.lock().entry(Arc::clone(id)).or_default() += 1;
		self.cache.lock().put(
			key,
			CacheEntry {
				generation,
				commands: Arc::clone(&commands),
			},
		);
		Some(commands)
	}
}

fn guarded<T>(provider: &str, stage: &str, f: impl FnOnce() -> T) -> Option<T> {
	catch_unwind(AssertUnwindSafe(f))
		.map_err(|payload| {
			warn!(provider, stage, message = %panic_message(&*payload), "provider panicked; contributing no commands");
		})
		.ok()
}
