//! Query expansion for quickfiler.
//!
//! Turns the raw text typed into the picker into a single glob pattern that tolerates the usual
//! ways a file name is spelled: `fooBar`, `foo_bar`, `foo-bar` and `foo bar` all expand to an
//! alternation covering each other, and unless the session is case sensitive a per-character
//! `[lU]` bracket alternative is appended as well.
//!
//! Expansion is a pure function. The same query and [QueryOptions] always yield the same string.

/// Options fixed for the lifetime of a navigation session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct QueryOptions {
    pub case_sensitive: bool,
}

impl QueryOptions {
    pub fn new(case_sensitive: bool) -> Self {
        Self { case_sensitive }
    }
}

/// Glob used for the non-recursive listing and for a missing or bare `/` query.
pub const IMMEDIATE_PATTERN: &str = "*";

/// Expands `query` into a glob pattern. Never fails; an empty query yields `"**"`.
pub fn expand(query: &str, options: QueryOptions) -> String {
    let q = normalize(query);

    let mut candidates: Vec<String> = Vec::with_capacity(5);
    let mut push = |candidate: String| {
        if !candidates.contains(&candidate) {
            candidates.push(candidate);
        }
    };

    let words = split_words(&q);
    push(q.clone());
    push(camel_case(&words));
    push(join_lower(&words, '_'));
    push(join_lower(&words, '-'));
    if !options.case_sensitive {
        push(case_insensitive(&q));
    }

    let mut pattern = match candidates.len() {
        0 => String::new(),
        1 => candidates.remove(0),
        _ => format!("{{{}}}", candidates.join(",")),
    };
    pattern.push_str("**");
    pattern
}

/// Returns the recursive search glob for a raw query, relative to the search root.
///
/// A missing, empty or bare `/` query is not a text query and searches the immediate entries.
pub fn search_pattern(query: Option<&str>, options: QueryOptions) -> String {
    match query.map(str::trim) {
        None | Some("") | Some("/") => IMMEDIATE_PATTERN.to_string(),
        Some(q) => format!("**/{}", expand(q, options)),
    }
}

/// Trims, strips one leading `/` and turns inner spaces into `*`.
fn normalize(query: &str) -> String {
    let q = query.trim();
    let q = q.strip_prefix('/').unwrap_or(q);
    q.replace(' ', "*")
}

/// Splits a query into words on `_`, `-`, whitespace and case boundaries.
///
/// Acronyms stay together: `XMLHttpRequest` splits into `XML`, `Http`, `Request`.
pub fn split_words(input: &str) -> Vec<String> {
    let chars: Vec<char> = input.chars().collect();
    let mut words = Vec::new();
    let mut current = String::new();

    for (i, &c) in chars.iter().enumerate() {
        if c == '_' || c == '-' || c.is_whitespace() {
            if !current.is_empty() {
                words.push(std::mem::take(&mut current));
            }
            continue;
        }

        if c.is_uppercase() && !current.is_empty() {
            let prev = chars[i - 1];
            let next_is_lower = chars.get(i + 1).is_some_and(|n| n.is_lowercase());
            let boundary = prev.is_lowercase()
                || prev.is_ascii_digit()
                || (prev.is_uppercase() && next_is_lower);
            if boundary {
                words.push(std::mem::take(&mut current));
            }
        }
        current.push(c);
    }

    if !current.is_empty() {
        words.push(current);
    }
    words
}

fn camel_case(words: &[String]) -> String {
    let mut out = String::new();
    for (i, word) in words.iter().enumerate() {
        if i == 0 {
            out.extend(word.chars().flat_map(char::to_lowercase));
            continue;
        }
        let mut chars = word.chars();
        if let Some(first) = chars.next() {
            out.extend(first.to_uppercase());
            out.extend(chars.flat_map(char::to_lowercase));
        }
    }
    out
}

fn join_lower(words: &[String], sep: char) -> String {
    let mut out = String::new();
    for (i, word) in words.iter().enumerate() {
        if i > 0 {
            out.push(sep);
        }
        out.extend(word.chars().flat_map(char::to_lowercase));
    }
    out
}

/// Folds every cased character into a `[lu]` class. Caseless characters pass through.
fn case_insensitive(query: &str) -> String {
    let mut out = String::with_capacity(query.len() * 4);
    for c in query.chars() {
        let lower: String = c.to_lowercase().collect();
        let upper: String = c.to_uppercase().collect();
        if lower == upper || lower.chars().count() != 1 || upper.chars().count() != 1 {
            out.push(c);
        } else {
            out.push('[');
            out.push_str(&lower);
            out.push_str(&upper);
            out.push(']');
        }
    }
    out
}
