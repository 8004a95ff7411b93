//! Mask patterns and the penalty search that picks one.

use tracing::{debug, trace};

use crate::matrix::Grid;
use crate::qrcode::Mask;

const PENALTY_N2: u32 = 3;
const PENALTY_N3: u32 = 40;
const PENALTY_N4: u32 = 10;

/// Whether `mask` inverts the module at (`row`, `col`).
pub fn mask_bit(mask: Mask, row: usize, col: usize) -> bool {
    let (x, y) = (col, row);
    match mask.value() {
        0 => (x + y) % 2 == 0,
        1 => y % 2 == 0,
        2 => x % 3 == 0,
        3 => (x + y) % 3 == 0,
        4 => (x / 3 + y / 2) % 2 == 0,
        5 => ((x * y) % 2) + ((x * y) % 3) == 0,
        6 => (((x * y) % 2) + ((x * y) % 3)) % 2 == 0,
        7 => (((x + y) % 2) + ((x * y) % 3)) % 2 == 0,
        _ => unreachable!(),
    }
}

/// Returns a copy of `grid` with `mask` XORed into every data cell.
pub fn apply_mask(grid: &Grid, mask: Mask) -> Grid {
    let mut result = grid.clone();
    let size = result.size();
    for row in 0..size {
        for col in 0..size {
            if mask_bit(mask, row, col) {
                result.toggle_data(row, col);
            }
        }
    }
    result
}

/// The four penalty terms of one masked grid.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub struct Penalty {
    pub runs: u32,
    pub blocks: u32,
    pub finder_like: u32,
    pub balance: u32,
}

impl Penalty {
    pub fn total(&self) -> u32 {
        self.runs + self.blocks + self.finder_like + self.balance
    }
}

/// Rows and columns of a grid as color vectors, so each scan reads one line.
struct Lines {
    rows: Vec<Vec<bool>>,
    cols: Vec<Vec<bool>>,
}

impl Lines {
    fn new(grid: &Grid) -> Self {
        let size = grid.size();
        let rows = (0..size)
            .map(|r| (0..size).map(|c| grid.is_dark(r, c)).collect())
            .collect();
        let cols = (0..size)
            .map(|c| (0..size).map(|r| grid.is_dark(r, c)).collect())
            .collect();
        Self { rows, cols }
    }

    fn iter(&self) -> impl Iterator<Item = &Vec<bool>> {
        self.rows.iter().chain(self.cols.iter())
    }
}

/// Scores every condition without pruning.
pub fn penalty(grid: &Grid) -> Penalty {
    let lines = Lines::new(grid);
    Penalty {
        runs: lines.iter().map(|l| run_penalty(l)).sum(),
        blocks: block_penalty(&lines.rows),
        finder_like: lines.iter().map(|l| finder_penalty(l)).sum(),
        balance: balance_penalty(grid),
    }
}

/// Condition 1: each run of five or more same-colored modules scores
/// its length minus two.
fn run_penalty(line: &[bool]) -> u32 {
    let mut result: u32 = 0;
    let mut count: u32 = 1;
    for pair in line.windows(2) {
        if pair[0] != pair[1] {
            if count >= 5 {
                result += count - 2;
            }
            count = 0;
        }
        count += 1;
    }
    if count >= 5 {
        result += count - 2;
    }
    result
}

/// Condition 2: every 2x2 block of one color.
fn block_penalty(rows: &[Vec<bool>]) -> u32 {
    let mut result: u32 = 0;
    for pair in rows.windows(2) {
        let (upper, lower) = (&pair[0], &pair[1]);
        for c in 1..upper.len() {
            let color = upper[c];
            if upper[c - 1] == color && lower[c - 1] == color && lower[c] == color {
                result += PENALTY_N2;
            }
        }
    }
    result
}

/// Dark-light-dark-dark-dark-light-dark starting at `start`.
fn is_finder_like(line: &[bool], start: usize) -> bool {
    line[start]
        && !line[start + 1]
        && line[start + 2]
        && line[start + 3]
        && line[start + 4]
        && !line[start + 5]
        && line[start + 6]
}

/// Condition 3: a light run of at least four modules with a 1:1:3:1:1
/// finder-like pattern right before or right after it.
fn finder_penalty(line: &[bool]) -> u32 {
    let size = line.len();
    let mut result: u32 = 0;
    let mut start: usize = 0;
    let mut pos: usize = 0;
    while pos < size {
        if line[pos] {
            if pos - start >= 4 {
                if start >= 7 && is_finder_like(line, start - 7) {
                    result += PENALTY_N3;
                }
                if size - pos >= 7 && is_finder_like(line, pos) {
                    result += PENALTY_N3;
                    pos += 6;
                }
            }
            start = pos + 1;
        }
        pos += 1;
    }
    // trailing light run
    if size - start >= 4 && start >= 7 && is_finder_like(line, start - 7) {
        result += PENALTY_N3;
    }
    result
}

/// Condition 4: distance of the dark ratio from one half, in whole 5%
/// steps (truncated), ten points per step.
fn balance_penalty(grid: &Grid) -> u32 {
    let total = (grid.size() * grid.size()) as i64;
    let dark = grid.dark_count() as i64;
    let k = (dark * 20 - total * 10).abs() / total;
    k as u32 * PENALTY_N4
}

/// Outcome of the mask search.
#[derive(Clone, Debug)]
pub struct MaskChoice {
    pub mask: Mask,
    pub score: u32,
    pub grid: Grid,
}

/// Tries all eight masks on `grid` and keeps the lowest-scoring one.
///
/// Ties go to the lower mask index. A candidate is dropped as soon as its
/// running score reaches the best total so far, which never changes the
/// winner.
pub fn select_mask(grid: &Grid) -> MaskChoice {
    let first = apply_mask(grid, Mask::new(0));
    let mut best = MaskChoice {
        mask: Mask::new(0),
        score: penalty(&first).total(),
        grid: first,
    };
    trace!(mask = 0, score = best.score, "mask candidate");
    for i in 1u8..8 {
        let mask = Mask::new(i);
        let candidate = apply_mask(grid, mask);
        match pruned_score(&candidate, best.score) {
            Some(score) => {
                trace!(mask = i, score, "mask candidate");
                best = MaskChoice {
                    mask,
                    score,
                    grid: candidate,
                };
            }
            None => trace!(mask = i, limit = best.score, "mask candidate pruned"),
        }
    }
    debug!(mask = best.mask.value(), score = best.score, "mask selected");
    best
}

/// Total penalty, or `None` once the running sum reaches `limit`.
fn pruned_score(grid: &Grid, limit: u32) -> Option<u32> {
    let lines = Lines::new(grid);
    let mut score: u32 = lines.iter().map(|l| run_penalty(l)).sum();
    if score >= limit {
        return None;
    }
    score += block_penalty(&lines.rows);
    if score >= limit {
        return None;
    }
    score += lines.iter().map(|l| finder_penalty(l)).sum::<u32>();
    if score >= limit {
        return None;
    }
    score += balance_penalty(grid);
    if score >= limit {
        return None;
    }
    Some(score)
}
