//! Fuzzy ranking of the command list
//!
//! Candidates are scored with a nucleo fuzzy atom (ordered subsequence match,
//! smart case). Higher scores rank first; equal scores keep the original
//! order of the list.

use std::sync::Arc;

use nucleo_matcher::pattern::{Atom, AtomKind, CaseMatching, Normalization};
use nucleo_matcher::{Matcher, Utf32Str};

use crate::config::{Command, SearchField};

/// A candidate that matched the query
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RankedCandidate {
    /// Position in the unfiltered list
    pub index: usize,
    /// Match score, higher is better
    pub rank: u32,
}

/// Context for nucleo fuzzy matching that reuses allocations across calls.
///
/// Usage:
/// ```ignore
/// let mut ctx = NucleoCtx::new(query);
/// for item in items {
///     if let Some(score) = ctx.score(&item.command) {
///         // matched with score
///     }
/// }
/// ```
pub(crate) struct NucleoCtx {
    atom: Atom,
    matcher: Matcher,
    buf: Vec<char>,
}

impl NucleoCtx {
    /// The whole query is one needle, so spaces must match in order too
    pub fn new(query: &str) -> Self {
        let atom = Atom::new(
            query,
            CaseMatching::Smart,
            Normalization::Smart,
            AtomKind::Fuzzy,
            false,
        );
        Self {
            atom,
            matcher: Matcher::new(nucleo_matcher::Config::DEFAULT),
            buf: Vec::with_capacity(64),
        }
    }

    /// Score a haystack string against this context's query.
    /// Returns Some(score) if matched, None otherwise.
    #[inline]
    pub fn score(&mut self, haystack: &str) -> Option<u32> {
        self.buf.clear();
        let utf32 = Utf32Str::new(haystack, &mut self.buf);
        self.atom.score(utf32, &mut self.matcher).map(u32::from)
    }
}

/// Score one string; `None` means the query is not a subsequence of it
pub fn rank_match(query: &str, haystack: &str) -> Option<u32> {
    NucleoCtx::new(query).score(haystack)
}

fn score_command(ctx: &mut NucleoCtx, command: &Command, field: SearchField) -> Option<u32> {
    match field {
        SearchField::Command => ctx.score(&command.command),
        SearchField::Description => ctx.score(&command.description),
        SearchField::Any => ctx
            .score(&command.command)
            .max(ctx.score(&command.description)),
    }
}

/// Rank the commands against `query`.
///
/// An empty query keeps every command in its original order.
pub fn rank(query: &str, commands: &[Arc<Command>], field: SearchField) -> Vec<RankedCandidate> {
    if query.is_empty() {
        return (0..commands.len())
            .map(|index| RankedCandidate { index, rank: 0 })
            .collect();
    }

    let mut ctx = NucleoCtx::new(query);
    let mut ranked: Vec<RankedCandidate> = commands
        .iter()
        .enumerate()
        .filter_map(|(index, command)| {
            score_command(&mut ctx, command, field).map(|rank| RankedCandidate { index, rank })
        })
        .collect();

    // sort_by is stable: ties stay in list order
    ranked.sort_by(|a, b| b.rank.cmp(&a.rank));
    ranked
}

/// The matching subset of `commands`, best match first
pub fn filter(query: &str, commands: &[Arc<Command>], field: SearchField) -> Vec<Arc<Command>> {
    rank(query, commands, field)
        .into_iter()
        .map(|r| Arc::clone(&commands[r.index]))
        .collect()
}

/// Char indices of a greedy case-insensitive subsequence match, for highlighting.
/// Empty when the query does not match.
pub fn match_indices(haystack: &str, query: &str) -> Vec<usize> {
    let query_lower = query.to_lowercase();
    let mut indices = Vec::new();
    let mut pattern_chars = query_lower.chars().peekable();

    for (idx, ch) in haystack.chars().enumerate() {
        if let Some(&p) = pattern_chars.peek() {
            if ch.to_lowercase().eq(std::iter::once(p)) {
                indices.push(idx);
                pattern_chars.next();
            }
        }
    }

    if pattern_chars.peek().is_none() {
        indices
    } else {
        Vec::new()
    }
}
