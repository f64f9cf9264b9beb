//! CNPJ normalization and display formatting.
//!
//! A CNPJ travels through the pipeline in three shapes:
//!
//! - **raw**: whatever the user typed, e.g. `19.131.243/0001-97` or `19131243000197 `.
//! - **normalized**: digits only, as substituted into the registry URL.
//! - **display**: the canonical `NN.NNN.NNN/NNNN-NN` mask written to the report.
//!
//! Neither function validates length. A malformed identifier is passed through
//! to the registry, which rejects it there.

pub const CNPJ_LENGTH: usize = 14;

/// Segment boundaries of the display mask and the separator preceding each segment.
const MASK: [(usize, usize, &str); 5] = [
    (0, 2, ""),
    (2, 5, "."),
    (5, 8, "."),
    (8, 12, "/"),
    (12, usize::MAX, "-"),
];

/// Removes every character that is not an ASCII digit.
pub fn normalize(raw: &str) -> String {
    raw.chars().filter(|c| c.is_ascii_digit()).collect()
}

/// Applies the `NN.NNN.NNN/NNNN-NN` mask.
///
/// Input shorter than 14 characters yields truncated segments and input longer
/// than 14 characters spills into the last segment. Never panics.
pub fn format(digits: &str) -> String {
    let chars: Vec<char> = digits.chars().collect();
    let mut display = String::with_capacity(CNPJ_LENGTH + 4);
    for (start, end, separator) in MASK {
        display.push_str(separator);
        let start = start.min(chars.len());
        let end = end.min(chars.len());
        display.extend(&chars[start..end]);
    }
    display
}

pub fn is_well_formed(digits: &str) -> bool {
    digits.len() == CNPJ_LENGTH && digits.bytes().all(|b| b.is_ascii_digit())
}
