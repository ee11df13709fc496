pub const MATCH_SCORE: u16 = 12;
pub const GAP_OPEN_PENALTY: u16 = 5;
pub const GAP_EXTEND_PENALTY: u16 = 1;
pub const CONSECUTIVE_BONUS: u16 = 6;

pub const PREFIX_BONUS: u16 = 12;
pub const OFFSET_PREFIX_BONUS: u16 = 8;
pub const DELIMITER_BONUS: u16 = 8;
pub const CAPITALIZATION_BONUS: u16 = 4;
pub const MATCHING_CASE_BONUS: u16 = 4;
pub const EXACT_MATCH_BONUS: u16 = 8;

pub const DELIMITERS: &str = " /:,.;_-=|()[]";

/// Above this many DP cells the matcher falls back to the greedy backend.
pub const MAX_MATRIX_CELLS: usize = 64 * 1024;
