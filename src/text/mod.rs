//! Text utilities shared by mining, splitting and normalization.

pub mod dictionary;
pub mod phrases;
pub mod tokenizer;

pub use dictionary::Dictionary;
pub use phrases::{initials, noun_phrases};
pub use tokenizer::{camel_join, split_identifier, split_identifier_lower, text_tokens, words};
