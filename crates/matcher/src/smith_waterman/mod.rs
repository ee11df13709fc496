//! Optimal alignment backend.
//!
//! `d[i][j]` is the best score for `needle[..=i]` with `needle[i]` matched at
//! `haystack[j]`. `e[i][j]` is the best score for `needle[..=i]` whose last
//! match lies strictly before `j`, charged an affine gap up to `j`. Leading
//! and trailing haystack characters are free, so only gaps between matched
//! characters cost anything.

use crate::{Match, Scoring, char_score, clamp_score, is_exact, position_bonuses};

const NEG: i32 = i32::MIN / 4;

#[inline]
fn reachable(score: i32) -> bool {
	score > NEG / 2
}

pub fn smith_waterman(needle: &[char], haystack: &[char], scoring: &Scoring) -> Match {
	let n = needle.len();
	let m = haystack.len();
	let bonuses = position_bonuses(haystack, scoring);
	let open = i32::from(scoring.gap_open_penalty);
	let extend = i32::from(scoring.gap_extend_penalty);
	let consecutive = i32::from(scoring.consecutive_bonus);

	let mut d = vec![vec![NEG; m]; n];
	let mut e_prev = vec![NEG; m];

	for i in 0..n {
		let mut e_curr = vec![NEG; m];
		for j in 0..m {
			if crate::chars_eq(needle[i], haystack[j]) {
				let here = char_score(needle[i], haystack[j], bonuses[j], scoring);
				let prior = if i == 0 {
					0
				} else if j == 0 {
					NEG
				} else {
					(d[i - 1][j - 1] + consecutive).max(e_prev[j - 1])
				};
				if reachable(prior) {
					d[i][j] = prior + here;
				}
			}
			if j > 0 {
				e_curr[j] = (d[i][j - 1] - open).max(e_curr[j - 1] - extend);
			}
		}
		e_prev = e_curr;
	}

	let Some((end, best)) = d[n - 1]
		.iter()
		.copied()
		.enumerate()
		.filter(|&(_, s)| reachable(s))
		.max_by(|(ja, a), (jb, b)| a.cmp(b).then(jb.cmp(ja)))
	else {
		return Match {
			score: 0,
			indices: Vec::new(),
			exact: false,
		};
	};

	let indices = traceback(&d, needle, haystack, &bonuses, scoring, end);
	let exact = is_exact(needle, haystack);
	let mut score = best;
	if exact {
		score += i32::from(scoring.exact_match_bonus);
	}

	Match {
		score: clamp_score(score),
		indices,
		exact,
	}
}

/// Recovers the matched positions by re-deriving which predecessor produced each cell.
fn traceback(d: &[Vec<i32>], needle: &[char], haystack: &[char], bonuses: &[u16], scoring: &Scoring, end: usize) -> Vec<usize> {
	let open = i32::from(scoring.gap_open_penalty);
	let extend = i32::from(scoring.gap_extend_penalty);
	let consecutive = i32::from(scoring.consecutive_bonus);

	let mut indices = vec![end];
	let mut j = end;
	for i in (1..needle.len()).rev() {
		let target = d[i][j] - char_score(needle[i], haystack[j], bonuses[j], scoring);
		let k = if j >= 1 && reachable(d[i - 1][j - 1]) && d[i - 1][j - 1] + consecutive == target {
			j - 1
		} else {
			// gap of length `j - k - 1 >= 1`
			(0..j.saturating_sub(1))
				.rev()
				.find(|&k| reachable(d[i - 1][k]) && d[i - 1][k] - open - extend * (j - k - 2) as i32 == target)
				.unwrap_or(j.saturating_sub(1))
		};
		indices.push(k);
		j = k;
	}
	indices.reverse();
	indices
}
