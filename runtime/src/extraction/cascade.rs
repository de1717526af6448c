//! Ordered fallback chains.
//!
//! A cascade is a table of named strategies tried in order; the first one that
//! produces a value wins and the rest are never run. Every field of a film
//! card and the container lookup itself are expressed this way.

/// A named strategy over some input.
pub struct Strategy<I: ?Sized, T> {
    pub name: &'static str,
    pub run: fn(&I) -> Option<T>,
}

impl<I: ?Sized, T> Strategy<I, T> {
    pub const fn new(name: &'static str, run: fn(&I) -> Option<T>) -> Self {
        Self { name, run }
    }
}

/// Result of a cascade: the value and the strategy that produced it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Hit<T> {
    pub strategy: &'static str,
    pub value: T,
}

/// Run strategies in order and stop at the first that returns a value.
pub fn first_hit<I: ?Sized, T>(input: &I, strategies: &[Strategy<I, T>]) -> Option<Hit<T>> {
    strategies.iter().find_map(|s| {
        (s.run)(input).map(|value| Hit {
            strategy: s.name,
            value,
        })
    })
}

/// Like [`first_hit`], for strategies yielding lists: an empty list counts
/// as a miss so that the next strategy gets its turn.
pub fn first_non_empty<I: ?Sized, T>(
    input: &I,
    strategies: &[Strategy<I, Vec<T>>],
) -> Option<Hit<Vec<T>>> {
    strategies.iter().find_map(|s| match (s.run)(input) {
        Some(value) if !value.is_empty() => Some(Hit {
            strategy: s.name,
            value,
        }),
        _ => None,
    })
}
