//! Inclusive block ranges and the fixed-size windows used to page through them.

use std::{fmt, num::NonZeroU64};

use serde::{Deserialize, Serialize};

/// Block number an open-ended range is resolved to before chunking.
pub const UNBOUNDED_END_BLOCK: u64 = 99_999_999;

/// Upper bound of a requested block range.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub enum EndBlock {
    /// No explicit upper bound.
    #[default]
    Latest,

    /// Scan up to and including this block.
    Number(u64),
}

impl EndBlock {
    /// Decodes the wire convention where `0` means "no upper bound".
    pub fn from_raw(raw: u64) -> Self {
        if raw == 0 {
            Self::Latest
        } else {
            Self::Number(raw)
        }
    }

    /// Returns the concrete block number this bound stands for.
    pub fn resolve(self) -> u64 {
        match self {
            Self::Latest => UNBOUNDED_END_BLOCK,
            Self::Number(n) => n,
        }
    }
}

impl fmt::Display for EndBlock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Latest => f.write_str("latest"),
            Self::Number(n) => write!(f, "{n}"),
        }
    }
}

/// Inclusive range of block numbers, `from <= to`.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct BlockRange {
    from: u64,
    to: u64,
}

impl BlockRange {
    /// Creates a range, returning `None` if `from > to`.
    pub fn new(from: u64, to: u64) -> Option<Self> {
        (from <= to).then_some(Self { from, to })
    }

    pub fn from(&self) -> u64 {
        self.from
    }

    pub fn to(&self) -> u64 {
        self.to
    }

    /// Number of blocks in the range, saturating for the full `u64` domain.
    pub fn block_count(&self) -> u64 {
        (self.to - self.from).saturating_add(1)
    }

    /// Splits the range into consecutive windows of at most `limit` blocks.
    ///
    /// Windows are yielded in ascending order, never overlap and together cover
    /// the range exactly once.
    pub fn chunks(&self, limit: NonZeroU64) -> ChunkWindows {
        ChunkWindows {
            next_from: Some(self.from),
            end: self.to,
            limit: limit.get(),
        }
    }
}

impl fmt::Display for BlockRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..={}", self.from, self.to)
    }
}

/// Iterator over the chunk windows of a [`BlockRange`].
#[derive(Clone, Debug)]
pub struct ChunkWindows {
    next_from: Option<u64>,
    end: u64,
    limit: u64,
}

impl Iterator for ChunkWindows {
    type Item = BlockRange;

    fn next(&mut self) -> Option<Self::Item> {
        let from = self.next_from?;
        let to = from.saturating_add(self.limit - 1).min(self.end);

        // `to == end` must stop here, `end` may be `u64::MAX`.
        self.next_from = if to >= self.end { None } else { Some(to + 1) };

        Some(BlockRange { from, to })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let Some(from) = self.next_from else {
            return (0, Some(0));
        };
        let remaining = (self.end - from).saturating_add(1);
        let windows = remaining.div_ceil(self.limit);
        match usize::try_from(windows) {
            Ok(n) => (n, Some(n)),
            Err(_) => (usize::MAX, None),
        }
    }
}
