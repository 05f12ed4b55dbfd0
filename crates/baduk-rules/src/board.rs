//! Go board and move resolution.
//!
//! Coordinates are `(x, y)` = (row, column), both zero-based; the cell at
//! `(x, y)` lives at index `x * size + y`. That is the same row-major order
//! clients use for stone requests and board snapshots.

use baduk_protocol::Stone;

use crate::RulesError;

/// An immutable Go position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Board {
    size: usize,
    cells: Vec<Option<Stone>>,
    /// Point that may not be played on the next move (simple ko).
    ko: Option<usize>,
}

impl Board {
    /// An empty `size` × `size` board.
    pub fn new(size: usize) -> Self {
        Self {
            size,
            cells: vec![None; size * size],
            ko: None,
        }
    }

    /// Side length.
    pub fn size(&self) -> usize {
        self.size
    }

    /// The stone at `(x, y)`; `None` if empty or off the board.
    pub fn get(&self, x: usize, y: usize) -> Option<Stone> {
        if x >= self.size || y >= self.size {
            return None;
        }
        self.cells[x * self.size + y]
    }

    /// The point currently forbidden by the ko rule, if any.
    pub fn ko_point(&self) -> Option<(usize, usize)> {
        self.ko.map(|i| (i / self.size, i % self.size))
    }

    /// Number of stones of `stone`'s color on the board.
    pub fn count(&self, stone: Stone) -> usize {
        self.cells.iter().filter(|c| **c == Some(stone)).count()
    }

    /// Plays `stone` at `(x, y)` and returns the resulting position.
    ///
    /// Opposing groups left without liberties are removed first; only then
    /// is the placed stone's own group checked, so a move that captures is
    /// never suicide.
    pub fn play(&self, stone: Stone, x: usize, y: usize) -> Result<Board, RulesError> {
        if x >= self.size || y >= self.size {
            return Err(RulesError::OutOfBounds {
                x,
                y,
                size: self.size,
            });
        }
        let at = x * self.size + y;
        if self.cells[at].is_some() {
            return Err(RulesError::Occupied { x, y });
        }
        if self.ko == Some(at) {
            return Err(RulesError::Ko { x, y });
        }

        let mut next = self.clone();
        next.cells[at] = Some(stone);
        next.ko = None;

        let mut captured = Vec::new();
        for n in self.neighbors(at) {
            if next.cells[n] != Some(stone.opposite()) {
                continue;
            }
            let (group, liberties) = next.group(n);
            if liberties == 0 {
                for &g in &group {
                    next.cells[g] = None;
                }
                captured.extend(group);
            }
        }

        let (own, liberties) = next.group(at);
        if liberties == 0 {
            return Err(RulesError::Suicide { x, y });
        }

        // A lone stone that captured exactly one stone and sits in that
        // stone's only liberty would be recaptured immediately.
        if captured.len() == 1 && own.len() == 1 && liberties == 1 {
            next.ko = Some(captured[0]);
        }

        if !captured.is_empty() {
            tracing::trace!(%stone, x, y, captured = captured.len(), "stones captured");
        }
        Ok(next)
    }

    fn neighbors(&self, at: usize) -> impl Iterator<Item = usize> {
        let size = self.size;
        let (x, y) = (at / size, at % size);
        let mut out = Vec::with_capacity(4);
        if x > 0 {
            out.push(at - size);
        }
        if x + 1 < size {
            out.push(at + size);
        }
        if y > 0 {
            out.push(at - 1);
        }
        if y + 1 < size {
            out.push(at + 1);
        }
        out.into_iter()
    }

    /// Flood-fills the group containing `at`; returns its cells and the
    /// number of distinct empty points adjacent to it.
    fn group(&self, at: usize) -> (Vec<usize>, usize) {
        let color = self.cells[at];
        let mut seen = vec![false; self.cells.len()];
        let mut liberty = vec![false; self.cells.len()];
        let mut stack = vec![at];
        let mut group = Vec::new();
        let mut liberties = 0;
        seen[at] = true;

        while let Some(cell) = stack.pop() {
            group.push(cell);
            for n in self.neighbors(cell) {
                match self.cells[n] {
                    None if !liberty[n] => {
                        liberty[n] = true;
                        liberties += 1;
                    }
                    c if c == color && !seen[n] => {
                        seen[n] = true;
                        stack.push(n);
                    }
                    _ => {}
                }
            }
        }
        (group, liberties)
    }
}
