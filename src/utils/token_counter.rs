/// Fixed characters-per-token ratio used for budget accounting.
/// This is an approximation, not a real tokenizer; keeping it a named
/// constant lets tests assert exact boundary behavior.
pub const CHARS_PER_TOKEN: usize = 4;

/// Approximate the number of tokens in a string from its character count.
pub fn approximate_tokens(text: &str) -> usize {
    let chars = text.chars().count();
    // Round up so a non-empty string never counts as zero tokens
    (chars + CHARS_PER_TOKEN - 1) / CHARS_PER_TOKEN
}

/// The largest number of characters that fits in `tokens` tokens.
pub fn chars_for_tokens(tokens: usize) -> usize {
    tokens * CHARS_PER_TOKEN
}
