use super::{identity_expansions, Expander, NOEXP};
use crate::core::identifier::{Expansion, Identifier};
use crate::splitting::CONSERV;

/// Identity expansion over the conservative split; the baseline chain.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoExpander;

impl Expander for NoExpander {
    fn name(&self) -> &'static str {
        NOEXP
    }

    fn applicable_on(&self) -> &'static str {
        CONSERV
    }

    fn expand(&self, identifier: &Identifier) -> Vec<Expansion> {
        identifier
            .split_tokens(CONSERV)
            .map(|tokens| identity_expansions(CONSERV, &tokens))
            .unwrap_or_default()
    }
}
