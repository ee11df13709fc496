use std::sync::atomic::{AtomicU64, Ordering};

/// Monotonic version counter observed by derived caches.
///
/// Writers publish their data first and then [`Generation::bump`] with
/// release ordering; readers load with acquire ordering, so a reader that
/// sees generation `g` also sees everything published before `g`.
#[derive(Debug, Default)]
pub struct Generation(AtomicU64);

impl Generation {
	pub const fn new() -> Self {
		Self(AtomicU64::new(0))
	}

	pub fn current(&self) -> u64 {
		self.0.load(Ordering::Acquire)
	}

	/// Advances the counter and returns the new value. Never decrements.
	pub fn bump(&self) -> u64 {
		self.0.fetch_add(1, Ordering::AcqRel) + 1
	}
}
