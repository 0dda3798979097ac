//! Sentence splitting and vocabulary extraction for the translate endpoint.
//!
//! Tagging is a lightweight suffix-rule pass backed by small word tables. It
//! only has to produce plausible lookup candidates, not a full parse.

use crate::model::Token;
use once_cell::sync::Lazy;
use std::collections::{HashMap, HashSet};
use unicode_segmentation::UnicodeSegmentation;

/// Parts of speech kept as vocabulary candidates.
pub const ALLOWED_POS: [&str; 6] = ["NOUN", "VERB", "ADJ", "ADV", "ADP", "SCONJ"];

static STOP_WORDS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "a", "about", "above", "after", "again", "against", "all", "almost", "alone", "along",
        "already", "also", "although", "always", "am", "among", "an", "and", "another", "any",
        "anyone", "anything", "are", "around", "as", "at", "back", "be", "became", "because",
        "become", "been", "before", "behind", "being", "below", "beside", "besides", "between",
        "beyond", "both", "but", "by", "can", "cannot", "could", "did", "do", "does", "doing",
        "done", "down", "during", "each", "either", "else", "enough", "even", "ever", "every",
        "everyone", "everything", "few", "for", "from", "further", "get", "give", "go", "had",
        "has", "have", "he", "her", "here", "hers", "herself", "him", "himself", "his", "how",
        "however", "i", "if", "in", "into", "is", "it", "its", "itself", "just", "last", "least",
        "less", "made", "make", "many", "may", "me", "might", "mine", "more", "most", "much",
        "must", "my", "myself", "neither", "never", "next", "no", "nobody", "none", "nor", "not",
        "nothing", "now", "of", "off", "often", "on", "once", "one", "only", "onto", "or",
        "other", "others", "otherwise", "our", "ours", "ourselves", "out", "over", "own", "per",
        "perhaps", "put", "quite", "rather", "really", "said", "same", "say", "see", "seem",
        "seemed", "seems", "several", "she", "should", "show", "since", "so", "some", "someone",
        "something", "sometimes", "still", "such", "take", "than", "that", "the", "their",
        "theirs", "them", "themselves", "then", "there", "therefore", "these", "they", "this",
        "those", "though", "through", "throughout", "thus", "to", "together", "too", "top",
        "toward", "towards", "under", "unless", "until", "up", "upon", "us", "used", "using",
        "very", "via", "was", "we", "well", "were", "what", "whatever", "when", "whenever",
        "where", "whereas", "wherever", "whether", "which", "while", "who", "whoever", "whole",
        "whom", "whose", "why", "will", "with", "within", "without", "would", "yet", "you",
        "your", "yours", "yourself", "yourselves",
    ]
    .into_iter()
    .collect()
});

static ADPOSITIONS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "across", "amid", "amidst", "alongside", "beneath", "despite", "inside", "near",
        "outside", "past", "underneath", "unlike", "versus",
    ]
    .into_iter()
    .collect()
});

static SUBORDINATORS: Lazy<HashSet<&'static str>> =
    Lazy::new(|| ["albeit", "lest", "provided", "whilst"].into_iter().collect());

/// Irregular and very common verb forms mapped to their lemma.
static VERB_FORMS: Lazy<HashMap<&'static str, &'static str>> = Lazy::new(|| {
    [
        ("ate", "eat"), ("bought", "buy"), ("brought", "bring"), ("came", "come"),
        ("come", "come"), ("eat", "eat"), ("eats", "eat"), ("felt", "feel"), ("found", "find"),
        ("gave", "give"), ("got", "get"), ("knew", "know"), ("know", "know"), ("knows", "know"),
        ("left", "leave"), ("like", "like"), ("likes", "like"), ("love", "love"),
        ("loves", "love"), ("need", "need"), ("needs", "need"), ("ran", "run"), ("read", "read"),
        ("reads", "read"), ("run", "run"), ("runs", "run"), ("saw", "see"), ("spoke", "speak"),
        ("taught", "teach"), ("thought", "think"), ("think", "think"), ("thinks", "think"),
        ("told", "tell"), ("took", "take"), ("want", "want"), ("wants", "want"),
        ("went", "go"), ("wrote", "write"),
    ]
    .into_iter()
    .collect()
});

const ADJECTIVE_SUFFIXES: [&str; 9] = [
    "ous", "ful", "ive", "able", "ible", "less", "ical", "ish", "ary",
];

/// Replaces non-breaking spaces, unifies newlines and collapses whitespace.
pub fn normalize_text(text: &str) -> String {
    text.replace('\u{00a0}', " ")
        .replace("\r\n", "\n")
        .replace('\r', "\n")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Splits normalized text into sentences after `.`, `!` or `?` (plus any
/// closing quotes or brackets) when followed by whitespace.
pub fn split_sentences(text: &str) -> Vec<String> {
    let text = normalize_text(text);
    let chars: Vec<char> = text.chars().collect();
    let mut sentences = Vec::new();
    let mut current = String::new();
    let mut i = 0;
    while i < chars.len() {
        let ch = chars[i];
        current.push(ch);
        if matches!(ch, '.' | '!' | '?') {
            while i + 1 < chars.len() && is_closer(chars[i + 1]) {
                i += 1;
                current.push(chars[i]);
            }
            let at_boundary = i + 1 >= chars.len() || chars[i + 1].is_whitespace();
            if at_boundary && !(ch == '.' && ends_with_abbreviation(&current)) {
                push_trimmed(&mut sentences, &current);
                current.clear();
            }
        }
        i += 1;
    }
    push_trimmed(&mut sentences, &current);
    sentences
}

fn is_closer(ch: char) -> bool {
    matches!(ch, '"' | '\'' | ')' | ']' | '”' | '’' | '.' | '!' | '?')
}

fn ends_with_abbreviation(fragment: &str) -> bool {
    const ABBREVIATIONS: [&str; 9] = [
        "mr.", "mrs.", "ms.", "dr.", "prof.", "st.", "e.g.", "i.e.", "vs.",
    ];
    let last = fragment
        .split_whitespace()
        .last()
        .unwrap_or_default()
        .to_lowercase();
    ABBREVIATIONS.contains(&last.as_str())
}

fn push_trimmed(out: &mut Vec<String>, fragment: &str) {
    let trimmed = fragment.trim();
    if !trimmed.is_empty() {
        out.push(trimmed.to_string());
    }
}

/// Unique vocabulary candidates of a sentence, deduplicated by `lemma|pos`.
pub fn extract_vocab(sentence: &str) -> Vec<Token> {
    let mut seen = HashSet::new();
    let mut vocab = Vec::new();
    for (position, word) in sentence.unicode_words().enumerate() {
        if !word.chars().all(char::is_alphabetic) {
            continue;
        }
        let lower = word.to_lowercase();
        if STOP_WORDS.contains(lower.as_str()) {
            continue;
        }
        let (lemma, pos) = tag(word, &lower, position);
        if !ALLOWED_POS.contains(&pos) || lemma.is_empty() {
            continue;
        }
        if !seen.insert(format!("{lemma}|{pos}")) {
            continue;
        }
        vocab.push(Token::new(word, lemma, pos));
    }
    vocab
}

/// Returns `(lemma, part of speech)` for a single alphabetic word.
pub fn tag(word: &str, lower: &str, position: usize) -> (String, &'static str) {
    if ADPOSITIONS.contains(lower) {
        return (lower.to_string(), "ADP");
    }
    if SUBORDINATORS.contains(lower) {
        return (lower.to_string(), "SCONJ");
    }
    if let Some(lemma) = VERB_FORMS.get(lower) {
        return (lemma.to_string(), "VERB");
    }
    if position > 0 && word.chars().next().is_some_and(char::is_uppercase) {
        return (lower.to_string(), "PROPN");
    }
    let len = lower.chars().count();
    if len > 4 && lower.ends_with("ly") {
        return (lower.to_string(), "ADV");
    }
    if len > 5 && lower.ends_with("ing") {
        return (undouble(&lower[..lower.len() - 3]), "VERB");
    }
    if len > 4 && lower.ends_with("ied") {
        return (format!("{}y", &lower[..lower.len() - 3]), "VERB");
    }
    if len > 4 && lower.ends_with("ed") {
        return (undouble(&lower[..lower.len() - 2]), "VERB");
    }
    if ADJECTIVE_SUFFIXES.iter().any(|s| lower.ends_with(s)) && len > 4 {
        return (lower.to_string(), "ADJ");
    }
    (singular(lower), "NOUN")
}

fn undouble(stem: &str) -> String {
    let bytes = stem.as_bytes();
    let n = bytes.len();
    let last = bytes.last().copied().unwrap_or_default();
    let doubled = n >= 2 && last.is_ascii_alphabetic() && last == bytes[n - 2];
    if doubled && !matches!(last, b'l' | b's' | b'z') {
        return stem[..n - 1].to_string();
    }
    stem.to_string()
}

fn singular(noun: &str) -> String {
    if noun.len() > 4 && noun.ends_with("ies") {
        return format!("{}y", &noun[..noun.len() - 3]);
    }
    for suffix in ["sses", "ches", "shes", "xes"] {
        if noun.ends_with(suffix) {
            return noun[..noun.len() - 2].to_string();
        }
    }
    if noun.len() > 3 && noun.ends_with('s') && !noun.ends_with("ss") && !noun.ends_with("us")
        && !noun.ends_with("is")
    {
        return noun[..noun.len() - 1].to_string();
    }
    noun.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalizes_whitespace_and_newlines() {
        assert_eq!(
            normalize_text("  I\u{00a0}like\r\napples.\r\n\n  Yes "),
            "I like apples. Yes"
        );
    }

    #[test]
    fn splits_on_terminal_punctuation() {
        assert_eq!(
            split_sentences("I like apples.  I like bananas.\nThis is a new sentence."),
            vec!["I like apples.", "I like bananas.", "This is a new sentence."]
        );
    }

    #[test]
    fn keeps_closing_quotes_and_abbreviations() {
        assert_eq!(
            split_sentences("He said \"Stop!\" Then Dr. Lee left... Fine?"),
            vec!["He said \"Stop!\"", "Then Dr. Lee left...", "Fine?"]
        );
    }

    #[test]
    fn blank_text_has_no_sentences() {
        assert!(split_sentences(" \n\t ").is_empty());
    }

    #[test]
    fn extracts_bananas() {
        assert_eq!(
            extract_vocab("I like bananas."),
            vec![
                Token::new("like", "like", "VERB"),
                Token::new("bananas", "banana", "NOUN"),
            ]
        );
    }

    #[test]
    fn contractions_and_numbers_are_not_candidates() {
        assert_eq!(
            extract_vocab("I don't think it's fine, and we’ll pay 20 dollars."),
            vec![
                Token::new("think", "think", "VERB"),
                Token::new("fine", "fine", "NOUN"),
                Token::new("pay", "pay", "NOUN"),
                Token::new("dollars", "dollar", "NOUN"),
            ]
        );
    }

    #[test]
    fn drops_duplicates_and_proper_nouns() {
        let vocab = extract_vocab("Cats chase cats while Alice watched quietly.");
        let lemmas: Vec<_> = vocab
            .iter()
            .map(|t| (t.lemma.as_str(), t.part_of_speech.as_str()))
            .collect();
        assert_eq!(
            lemmas,
            vec![
                ("cat", "NOUN"),
                ("chase", "NOUN"),
                ("watch", "VERB"),
                ("quietly", "ADV"),
            ]
        );
    }

    #[test]
    fn suffix_rules() {
        assert_eq!(tag("running", "running", 0), ("run".to_string(), "VERB"));
        assert_eq!(tag("studied", "studied", 0), ("study".to_string(), "VERB"));
        assert_eq!(tag("careful", "careful", 0), ("careful".to_string(), "ADJ"));
        assert_eq!(tag("boxes", "boxes", 0), ("box".to_string(), "NOUN"));
        assert_eq!(tag("went", "went", 0), ("go".to_string(), "VERB"));
    }
}
