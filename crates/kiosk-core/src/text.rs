//! Display-string helpers.

/// Upper-case the first character of every space-separated word.
///
/// Splits on single spaces, so runs of spaces survive as empty words.
pub fn capitalize_words(s: &str) -> String {
    s.split(' ')
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<String>>()
        .join(" ")
}
