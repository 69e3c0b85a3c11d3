//! Lightweight noun-phrase chunking for comments and literals.
//!
//! A clause is cut at punctuation, then at function words (articles, verbs
//! like "is", prepositions, conjunctions, pronouns). Every remaining run of two
//! or more words is treated as a noun phrase.

use unicode_segmentation::UnicodeSegmentation;

const STOP_WORDS: &[&str] = &[
    "a", "about", "above", "after", "again", "all", "also", "am", "an", "and", "any", "are", "as",
    "at", "be", "because", "been", "before", "being", "below", "between", "both", "but", "by",
    "can", "could", "did", "do", "does", "doing", "down", "during", "each", "either", "else",
    "every", "few", "for", "from", "further", "had", "has", "have", "having", "he", "her", "here",
    "hers", "him", "his", "how", "i", "if", "in", "into", "is", "it", "its", "itself", "just",
    "may", "me", "might", "more", "most", "must", "my", "no", "nor", "not", "now", "of", "off",
    "on", "once", "only", "or", "other", "our", "out", "over", "own", "same", "shall", "she",
    "should", "so", "some", "such", "than", "that", "the", "their", "them", "then", "there",
    "these", "they", "this", "those", "through", "to", "too", "under", "until", "up", "upon",
    "very", "was", "we", "were", "what", "when", "where", "whether", "which", "while", "who",
    "whom", "why", "will", "with", "within", "without", "would", "you", "your",
];

/// True for function words that never take part in a noun phrase.
pub fn is_stop_word(word: &str) -> bool {
    STOP_WORDS.binary_search(&word).is_ok()
}

fn is_clause_break(segment: &str) -> bool {
    segment
        .chars()
        .any(|c| matches!(c, ',' | '.' | ';' | ':' | '!' | '?' | '(' | ')' | '\n' | '"' | '`'))
}

fn flush(run: &mut Vec<String>, phrases: &mut Vec<String>) {
    if run.len() >= 2 {
        phrases.push(run.join(" "));
    }
    run.clear();
}

/// Extract lower-cased noun phrases (two or more words) in order of appearance.
pub fn noun_phrases(text: &str) -> Vec<String> {
    let mut phrases = Vec::new();
    let mut run: Vec<String> = Vec::new();

    for segment in text.split_word_bounds() {
        if segment.chars().all(char::is_whitespace) && !segment.contains('\n') {
            continue;
        }
        if is_clause_break(segment) {
            flush(&mut run, &mut phrases);
            continue;
        }

        let lowered = segment.to_lowercase();
        if !lowered.chars().all(char::is_alphabetic) || is_stop_word(&lowered) {
            flush(&mut run, &mut phrases);
            continue;
        }
        run.push(lowered);
    }
    flush(&mut run, &mut phrases);

    phrases
}

/// First letters of each word of a phrase (`"string buffer"` → `"sb"`).
pub fn initials(phrase: &str) -> String {
    phrase
        .split(|c: char| c.is_whitespace() || c == '-')
        .filter_map(|word| word.chars().next())
        .flat_map(char::to_lowercase)
        .collect()
}
