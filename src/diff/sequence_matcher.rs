use std::collections::HashMap;
use std::hash::Hash;

// @module: Longest matching block alignment of two sequences

/// Edit operation between two slices
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpTag {
    Equal,
    Replace,
    Delete,
    Insert,
}

/// `a[i1..i2]` relates to `b[j1..j2]` through `tag`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Opcode {
    pub tag: OpTag,
    pub i1: usize,
    pub i2: usize,
    pub j1: usize,
    pub j2: usize,
}

/// A run of `size` equal elements starting at `a[a_start]` and `b[b_start]`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Match {
    pub a_start: usize,
    pub b_start: usize,
    pub size: usize,
}

/// Recursive longest-common-block matcher with no junk heuristics
pub struct SequenceMatcher<'a, T: Eq + Hash> {
    a: &'a [T],
    b: &'a [T],
    b_index: HashMap<&'a T, Vec<usize>>,
}

impl<'a, T: Eq + Hash> SequenceMatcher<'a, T> {
    pub fn new(a: &'a [T], b: &'a [T]) -> Self {
        let mut b_index: HashMap<&'a T, Vec<usize>> = HashMap::new();
        for (j, item) in b.iter().enumerate() {
            b_index.entry(item).or_default().push(j);
        }
        Self { a, b, b_index }
    }

    /// Longest equal block in `a[alo..ahi]` and `b[blo..bhi]`, earliest on ties
    pub fn find_longest_match(&self, alo: usize, ahi: usize, blo: usize, bhi: usize) -> Match {
        let mut best = Match {
            a_start: alo,
            b_start: blo,
            size: 0,
        };
        let mut run_lengths: HashMap<usize, usize> = HashMap::new();

        for i in alo..ahi {
            let mut next_lengths = HashMap::new();
            if let Some(positions) = self.b_index.get(&self.a[i]) {
                for &j in positions {
                    if j < blo {
                        continue;
                    }
                    if j >= bhi {
                        break;
                    }
                    let k = j
                        .checked_sub(1)
                        .and_then(|prev| run_lengths.get(&prev))
                        .copied()
                        .unwrap_or(0)
                        + 1;
                    next_lengths.insert(j, k);
                    if k > best.size {
                        best = Match {
                            a_start: i + 1 - k,
                            b_start: j + 1 - k,
                            size: k,
                        };
                    }
                }
            }
            run_lengths = next_lengths;
        }
        best
    }

    /// Non-overlapping matching blocks in order, adjacent blocks merged
    pub fn matching_blocks(&self) -> Vec<Match> {
        let mut queue = vec![(0, self.a.len(), 0, self.b.len())];
        let mut blocks = Vec::new();

        while let Some((alo, ahi, blo, bhi)) = queue.pop() {
            let m = self.find_longest_match(alo, ahi, blo, bhi);
            if m.size == 0 {
                continue;
            }
            if alo < m.a_start && blo < m.b_start {
                queue.push((alo, m.a_start, blo, m.b_start));
            }
            if m.a_start + m.size < ahi && m.b_start + m.size < bhi {
                queue.push((m.a_start + m.size, ahi, m.b_start + m.size, bhi));
            }
            blocks.push(m);
        }
        blocks.sort_by_key(|m| (m.a_start, m.b_start));

        let mut merged: Vec<Match> = Vec::with_capacity(blocks.len());
        for block in blocks {
            match merged.last_mut() {
                Some(last)
                    if last.a_start + last.size == block.a_start
                        && last.b_start + last.size == block.b_start =>
                {
                    last.size += block.size;
                }
                _ => merged.push(block),
            }
        }
        merged
    }

    /// Number of elements covered by matching blocks
    pub fn matched_count(&self) -> usize {
        self.matching_blocks().iter().map(|m| m.size).sum()
    }

    /// Edit script turning `a` into `b`
    pub fn opcodes(&self) -> Vec<Opcode> {
        let mut opcodes = Vec::new();
        let (mut i, mut j) = (0, 0);
        let sentinel = Match {
            a_start: self.a.len(),
            b_start: self.b.len(),
            size: 0,
        };

        for m in self.matching_blocks().into_iter().chain(std::iter::once(sentinel)) {
            let tag = match (i < m.a_start, j < m.b_start) {
                (true, true) => Some(OpTag::Replace),
                (true, false) => Some(OpTag::Delete),
                (false, true) => Some(OpTag::Insert),
                (false, false) => None,
            };
            if let Some(tag) = tag {
                opcodes.push(Opcode {
                    tag,
                    i1: i,
                    i2: m.a_start,
                    j1: j,
                    j2: m.b_start,
                });
            }
            i = m.a_start + m.size;
            j = m.b_start + m.size;
            if m.size > 0 {
                opcodes.push(Opcode {
                    tag: OpTag::Equal,
                    i1: m.a_start,
                    i2: i,
                    j1: m.b_start,
                    j2: j,
                });
            }
        }
        opcodes
    }
}
