//! Discord transport.
//!
//! [`serenity`] holds the Serenity-backed connector and the event handler
//! that feeds Discord messages to the dispatcher.

pub mod serenity;

/// Longest message Discord accepts, in characters.
pub const MESSAGE_LIMIT: usize = 2000;

/// Splits `message` into chunks of at most `limit` characters, preferring to
/// break after a newline.
pub fn split_message(message: &str, limit: usize) -> Vec<String> {
    let mut chunks = Vec::new();
    let mut current = String::new();
    let mut current_len = 0;

    for line in message.split_inclusive('\n') {
        let line_len = line.chars().count();
        if current_len + line_len > limit && !current.is_empty() {
            chunks.push(std::mem::take(&mut current));
            current_len = 0;
        }
        if line_len > limit {
            // A single line longer than the limit is cut hard.
            let chars: Vec<char> = line.chars().collect();
            for piece in chars.chunks(limit) {
                chunks.push(piece.iter().collect());
            }
            continue;
        }
        current.push_str(line);
        current_len += line_len;
    }
    if !current.is_empty() {
        chunks.push(current);
    }
    chunks
}
