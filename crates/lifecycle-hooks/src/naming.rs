//! Naming convention resolver.
//!
//! Turns a lifecycle point name into the identifiers a discovery
//! collaborator probes for. Discovery targets cannot encode `.`, so no
//! candidate ever contains one.

/// Candidate discovery identifiers for `point`, in probe order.
///
/// - `payment.failed` → `PaymentFailed`, `Payment_Failed`, `payment_failed`
/// - `payment_complete` → `PaymentComplete`, `Payment_Complete`, `payment_complete`
/// - `paymentBegin` → `payment_begin`, `Payment_Begin`, `paymentBegin`
/// - `start` → `start`
///
/// Duplicates are dropped keeping the first occurrence. An empty name
/// yields no candidates.
pub fn candidates(point: &str) -> Vec<String> {
    let raw = if point.contains('.') {
        let words = split_words(point, &['.', '_']);
        if words.is_empty() {
            return Vec::new();
        }
        vec![
            pascal_case(&words),
            title_underscored(&words),
            point.replace('.', "_"),
        ]
    } else if point.contains('_') {
        let words = split_words(point, &['_']);
        if words.is_empty() {
            return Vec::new();
        }
        vec![
            pascal_case(&words),
            title_underscored(&words),
            point.to_string(),
        ]
    } else if has_camel_boundary(point) {
        let snake = to_snake_case(point);
        let words = split_words(&snake, &['_']);
        vec![snake.clone(), title_underscored(&words), point.to_string()]
    } else {
        vec![point.to_string()]
    };

    let mut out: Vec<String> = Vec::with_capacity(raw.len());
    for candidate in raw {
        if !candidate.is_empty() && !out.contains(&candidate) {
            out.push(candidate);
        }
    }
    out
}

fn split_words<'a>(s: &'a str, separators: &[char]) -> Vec<&'a str> {
    s.split(separators).filter(|w| !w.is_empty()).collect()
}

fn upper_first(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

fn pascal_case(words: &[&str]) -> String {
    words.iter().map(|w| upper_first(w)).collect()
}

fn title_underscored(words: &[&str]) -> String {
    words
        .iter()
        .map(|w| upper_first(w))
        .collect::<Vec<_>>()
        .join("_")
}

fn has_camel_boundary(s: &str) -> bool {
    s.chars()
        .zip(s.chars().skip(1))
        .any(|(a, b)| a.is_lowercase() && b.is_uppercase())
}

fn to_snake_case(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 4);
    let mut prev: Option<char> = None;
    for c in s.chars() {
        if c.is_uppercase() {
            if prev.is_some_and(|p| p.is_lowercase() || p.is_ascii_digit()) {
                out.push('_');
            }
            out.extend(c.to_lowercase());
        } else {
            out.push(c);
        }
        prev = Some(c);
    }
    out
}
