//! Ranking of candidate commands against a query.
//!
//! [`search`] is a pure function of its inputs: repeated calls with the same
//! candidates, query and configuration return identical results.

use std::cmp::Ordering;

use serde::Serialize;
use switchyard_matcher::Matcher;

use crate::command::Command;
use crate::config::SearchConfig;

/// Weight added to a title match so it outranks any description match.
pub const TITLE_WEIGHT: i32 = 220;
/// Weight added to a description match.
pub const DESCRIPTION_WEIGHT: i32 = -120;

/// One ranked result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SearchHit {
	pub command: Command,
	/// Zero for an empty query.
	pub score: i32,
	/// Char indices of matched title characters, empty when the title did not match.
	pub title_indices: Vec<usize>,
}

/// Ranks `candidates` against `query`.
///
/// An empty (or blank) query keeps candidate order. Otherwise every command
/// whose title or description contains the query as a fuzzy subsequence is
/// kept and ordered by score, then shorter title, then provider registration
/// order, then id. Either way at most `config.max_results` hits are returned.
pub fn search(candidates: Vec<Command>, query: &str, config: &SearchConfig) -> Vec<SearchHit> {
	let query = query.trim();
	if query.is_empty() {
		return candidates
			.into_iter()
			.take(config.max_results)
			.map(|command| SearchHit {
				command,
				score: 0,
				title_indices: Vec::new(),
			})
			.collect();
	}

	let matcher = Matcher::new(query, &config.scoring);
	let mut hits: Vec<SearchHit> = candidates
		.into_iter()
		.filter_map(|command| {
			let mut best: Option<i32> = None;
			let mut title_indices = Vec::new();

			if let Some(m) = matcher.score(&command.title) {
				best = Some(i32::from(m.score) + TITLE_WEIGHT);
				title_indices = m.indices;
			}
			if let Some(m) = command.description.as_deref().and_then(|d| matcher.score(d)) {
				let score = i32::from(m.score) + DESCRIPTION_WEIGHT;
				best = Some(best.map_or(score, |b| b.max(score)));
			}

			best.map(|score| SearchHit {
				command,
				score,
				title_indices,
			})
		})
		.collect();

	hits.sort_by(compare_hits);
	hits.truncate(config.max_results);
	hits
}

fn compare_hits(a: &SearchHit, b: &SearchHit) -> Ordering {
	b.score
		.cmp(&a.score)
		.then_with(|| a.command.title.chars().count().cmp(&b.command.title.chars().count()))
		.then_with(|| a.command.provider_rank.cmp(&b.command.provider_rank))
		.then_with(|| a.command.id.cmp(&b.command.id))
}
