//! Identifier and prose tokenization.

use unicode_segmentation::UnicodeSegmentation;

#[derive(Clone, Copy, PartialEq, Eq)]
enum CharClass {
    Upper,
    Lower,
    Digit,
    Other,
}

fn class_of(ch: char) -> CharClass {
    if ch.is_uppercase() {
        CharClass::Upper
    } else if ch.is_alphabetic() {
        CharClass::Lower
    } else if ch.is_numeric() {
        CharClass::Digit
    } else {
        CharClass::Other
    }
}

/// Split a compound identifier on delimiters, digits and case changes.
///
/// Acronyms stay together unless followed by a capitalised word:
/// `HTTPServer` → `HTTP`, `Server`; `parseURL2` → `parse`, `URL`, `2`.
/// Original casing is preserved.
pub fn split_identifier(name: &str) -> Vec<String> {
    let chars: Vec<char> = name.chars().collect();
    let mut parts = Vec::new();
    let mut current = String::new();

    for (i, &ch) in chars.iter().enumerate() {
        let class = class_of(ch);
        if class == CharClass::Other {
            if !current.is_empty() {
                parts.push(std::mem::take(&mut current));
            }
            continue;
        }

        if let Some(prev) = current.chars().last() {
            let prev_class = class_of(prev);
            let next_class = chars.get(i + 1).map(|c| class_of(*c));
            let boundary = match (prev_class, class) {
                (CharClass::Lower, CharClass::Upper) => true,
                (CharClass::Digit, CharClass::Upper | CharClass::Lower)
                | (CharClass::Upper | CharClass::Lower, CharClass::Digit) => true,
                (CharClass::Upper, CharClass::Upper) => next_class == Some(CharClass::Lower),
                _ => false,
            };
            if boundary {
                parts.push(std::mem::take(&mut current));
            }
        }
        current.push(ch);
    }

    if !current.is_empty() {
        parts.push(current);
    }
    parts
}

/// Lower-cased identifier parts.
pub fn split_identifier_lower(name: &str) -> Vec<String> {
    split_identifier(name)
        .into_iter()
        .map(|part| part.to_lowercase())
        .collect()
}

/// Lower-cased alphabetic words of a piece of prose.
pub fn words(text: &str) -> Vec<String> {
    text.unicode_words()
        .filter(|word| word.chars().all(char::is_alphabetic))
        .map(str::to_lowercase)
        .collect()
}

/// Lower-cased tokens of free text, with compound words split like identifiers.
///
/// Used by frequency counting, where `parseConfig` in a literal should count
/// towards both `parse` and `config`.
pub fn text_tokens(text: &str) -> Vec<String> {
    text.unicode_words()
        .flat_map(split_identifier_lower)
        .filter(|token| token.chars().all(char::is_alphabetic))
        .collect()
}

/// Join words as camelCase: first word lower-cased, later words capitalised.
pub fn camel_join<I, S>(words: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut joined = String::new();
    for word in words {
        let word = word.as_ref().to_lowercase();
        if word.is_empty() {
            continue;
        }
        if joined.is_empty() {
            joined.push_str(&word);
        } else {
            let mut chars = word.chars();
            if let Some(first) = chars.next() {
                joined.extend(first.to_uppercase());
                joined.push_str(chars.as_str());
            }
        }
    }
    joined
}
