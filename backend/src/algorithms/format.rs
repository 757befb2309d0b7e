//! Text helpers for generated sentences.

const ORDINAL_WORDS: [&str; 10] = [
    "first", "second", "third", "fourth", "fifth", "sixth", "seventh", "eighth", "ninth", "tenth",
];

/// Ordinal name of the zero-based `index`: `0 -> "first"`, `10 -> "11th"`.
pub fn ordinal(index: usize) -> String {
    if let Some(word) = ORDINAL_WORDS.get(index) {
        return (*word).to_string();
    }

    let n = index + 1;
    let suffix = match (n % 10, n % 100) {
        (_, 11..=13) => "th",
        (1, _) => "st",
        (2, _) => "nd",
        (3, _) => "rd",
        _ => "th",
    };
    format!("{}{}", n, suffix)
}

/// Format a value with at most two decimals, trimming trailing zeros.
pub fn format_y(value: f64) -> String {
    let text = format!("{:.2}", value);
    let text = if text.contains('.') {
        text.trim_end_matches('0').trim_end_matches('.')
    } else {
        text.as_str()
    };
    if text == "-0" {
        "0".to_string()
    } else {
        text.to_string()
    }
}

/// Wrap `text` in emphasis markup.
pub fn bold(text: impl std::fmt::Display) -> String {
    format!("<b>{}</b>", text)
}
