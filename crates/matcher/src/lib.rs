//! Fuzzy subsequence matching for command search.
//!
//! A haystack matches when every needle character appears in it in order
//! (case-insensitively). Matches are then scored so that contiguous runs,
//! characters anchored at word boundaries and exact matches rank higher,
//! while gaps between matched characters cost an affine penalty.
//!
//! The scorer is a pure function of `(needle, haystack, scoring)`.

pub mod r#const;
pub mod greedy;
pub mod smith_waterman;

use r#const::*;

/// Tunable weights for the scorer.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct Scoring {
	pub match_score: u16,
	pub gap_open_penalty: u16,
	pub gap_extend_penalty: u16,
	/// Added for each matched character directly following the previous match.
	pub consecutive_bonus: u16,
	/// Match on the first haystack character.
	pub prefix_bonus: u16,
	/// Match on the second character when the first is not alphabetic (`-foo`).
	pub offset_prefix_bonus: u16,
	/// Match right after a delimiter (`new pane`, `file.new`).
	pub delimiter_bonus: u16,
	/// Match on an uppercase character following a lowercase one (`newPane`).
	pub capitalization_bonus: u16,
	pub matching_case_bonus: u16,
	pub exact_match_bonus: u16,
	pub delimiters: String,
}

impl Default for Scoring {
	fn default() -> Self {
		Self {
			match_score: MATCH_SCORE,
			gap_open_penalty: GAP_OPEN_PENALTY,
			gap_extend_penalty: GAP_EXTEND_PENALTY,
			consecutive_bonus: CONSECUTIVE_BONUS,
			prefix_bonus: PREFIX_BONUS,
			offset_prefix_bonus: OFFSET_PREFIX_BONUS,
			delimiter_bonus: DELIMITER_BONUS,
			capitalization_bonus: CAPITALIZATION_BONUS,
			matching_case_bonus: MATCHING_CASE_BONUS,
			exact_match_bonus: EXACT_MATCH_BONUS,
			delimiters: DELIMITERS.to_string(),
		}
	}
}

/// A scored match of a needle inside one haystack.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Match {
	pub score: u16,
	/// Char indices of the matched haystack characters, ascending.
	pub indices: Vec<usize>,
	/// Needle and haystack are equal ignoring case.
	pub exact: bool,
}

/// Needle prepared once and scored against many haystacks.
#[derive(Debug, Clone)]
pub struct Matcher<'a> {
	needle: Vec<char>,
	scoring: &'a Scoring,
}

impl<'a> Matcher<'a> {
	pub fn new(needle: &str, scoring: &'a Scoring) -> Self {
		Self {
			needle: needle.chars().collect(),
			scoring,
		}
	}

	pub fn needle_is_empty(&self) -> bool {
		self.needle.is_empty()
	}

	/// Scores `haystack`, or returns `None` when the needle is not a subsequence of it.
	///
	/// An empty needle matches everything with score 0.
	pub fn score(&self, haystack: &str) -> Option<Match> {
		if self.needle.is_empty() {
			return Some(Match {
				score: 0,
				indices: Vec::new(),
				exact: haystack.is_empty(),
			});
		}
		let haystack: Vec<char> = haystack.chars().collect();
		if !is_subsequence(&self.needle, &haystack) {
			return None;
		}
		let m = if matrix_too_large(self.needle.len(), haystack.len()) {
			greedy::match_greedy(&self.needle, &haystack, self.scoring)
		} else {
			smith_waterman::smith_waterman(&self.needle, &haystack, self.scoring)
		};
		Some(m)
	}
}

/// One-shot convenience over [`Matcher`].
pub fn match_one(needle: &str, haystack: &str, scoring: &Scoring) -> Option<Match> {
	Matcher::new(needle, scoring).score(haystack)
}

#[inline]
pub(crate) fn matrix_too_large(needle_len: usize, haystack_len: usize) -> bool {
	needle_len.saturating_mul(haystack_len) > MAX_MATRIX_CELLS
}

#[inline]
pub(crate) fn chars_eq(a: char, b: char) -> bool {
	a == b || fold(a) == fold(b)
}

#[inline]
pub(crate) fn fold(c: char) -> char {
	if c.is_ascii() {
		c.to_ascii_lowercase()
	} else {
		c.to_lowercase().next().unwrap_or(c)
	}
}

pub(crate) fn is_subsequence(needle: &[char], haystack: &[char]) -> bool {
	let mut it = haystack.iter();
	needle.iter().all(|&n| it.any(|&h| chars_eq(n, h)))
}

pub(crate) fn is_exact(needle: &[char], haystack: &[char]) -> bool {
	needle.len() == haystack.len() && needle.iter().zip(haystack).all(|(&a, &b)| chars_eq(a, b))
}

/// Per-position bonus for matching haystack character `j`, independent of the needle.
pub(crate) fn position_bonuses(haystack: &[char], scoring: &Scoring) -> Vec<u16> {
	let is_delimiter = |c: char| scoring.delimiters.contains(c);
	let mut bonuses = Vec::with_capacity(haystack.len());
	let mut seen_non_delimiter = false;
	for (j, &c) in haystack.iter().enumerate() {
		let bonus = if j == 0 {
			scoring.prefix_bonus
		} else {
			let prev = haystack[j - 1];
			if j == 1 && !prev.is_alphabetic() && !is_delimiter(c) {
				scoring.offset_prefix_bonus
			} else if is_delimiter(prev) && seen_non_delimiter && !is_delimiter(c) {
				scoring.delimiter_bonus
			} else if prev.is_lowercase() && c.is_uppercase() {
				scoring.capitalization_bonus
			} else {
				0
			}
		};
		seen_non_delimiter |= !is_delimiter(c);
		bonuses.push(bonus);
	}
	bonuses
}

#[inline]
pub(crate) fn char_score(needle_char: char, haystack_char: char, bonus: u16, scoring: &Scoring) -> i32 {
	let case_bonus = if needle_char.is_uppercase() == haystack_char.is_uppercase() {
		scoring.matching_case_bonus
	} else {
		0
	};
	i32::from(scoring.match_score) + i32::from(bonus) + i32::from(case_bonus)
}

#[inline]
pub(crate) fn clamp_score(score: i32) -> u16 {
	score.clamp(0, i32::from(u16::MAX)) as u16
}
