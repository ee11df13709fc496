//! Linear-time fallback for haystacks too large for the alignment matrix.
//!
//! Takes the leftmost occurrence of each needle character, so the score is a
//! lower bound of the optimal alignment.

use crate::{Match, Scoring, char_score, chars_eq, clamp_score, is_exact, position_bonuses};

pub fn match_greedy(needle: &[char], haystack: &[char], scoring: &Scoring) -> Match {
	let bonuses = position_bonuses(haystack, scoring);
	let mut indices = Vec::with_capacity(needle.len());
	let mut score: i32 = 0;
	let mut start = 0;

	for &n in needle {
		let Some(offset) = haystack[start..].iter().position(|&h| chars_eq(n, h)) else {
			return Match {
				score: 0,
				indices: Vec::new(),
				exact: false,
			};
		};
		let j = start + offset;
		score += char_score(n, haystack[j], bonuses[j], scoring);
		if let Some(&prev) = indices.last() {
			let gap = j - prev - 1;
			if gap == 0 {
				score += i32::from(scoring.consecutive_bonus);
			} else {
				score -= i32::from(scoring.gap_open_penalty) + i32::from(scoring.gap_extend_penalty) * (gap as i32 - 1);
			}
		}
		indices.push(j);
		start = j + 1;
	}

	let exact = is_exact(needle, haystack);
	if exact {
		score += i32::from(scoring.exact_match_bonus);
	}
	Match {
		score: clamp_score(score),
		indices,
		exact,
	}
}
