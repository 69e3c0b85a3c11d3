use super::{Splitter, CONSERV};
use crate::core::identifier::Identifier;
use crate::text::split_identifier_lower;

/// Splits on delimiters, digits and case changes only.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConservSplitter;

impl Splitter for ConservSplitter {
    fn name(&self) -> &'static str {
        CONSERV
    }

    fn split(&self, identifier: &Identifier) -> Vec<String> {
        split_identifier_lower(&identifier.name)
    }
}
