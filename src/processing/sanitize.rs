//! Cleanup of raw extracted text before chunking.

/// Normalize raw extracted text into a single clean line of printable ASCII.
///
/// Newline runs collapse to a space, any character outside the printable 7-bit
/// ASCII range (0x20–0x7E) is replaced by a space to drop encoding artifacts, and
/// whitespace runs collapse to a single space. The result is trimmed and the
/// function is idempotent.
pub fn clean_text(text: &str) -> String {
    let replaced: String = text
        .chars()
        .map(|c| if (' '..='~').contains(&c) { c } else { ' ' })
        .collect();

    let mut cleaned = String::with_capacity(replaced.len());
    for word in replaced.split_whitespace() {
        if !cleaned.is_empty() {
            cleaned.push(' ');
        }
        cleaned.push_str(word);
    }
    cleaned
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collapses_newline_and_whitespace_runs() {
        assert_eq!(clean_text("a\n\n\nb\t\t c"), "a b c");
    }

    #[test]
    fn strips_characters_outside_printable_ascii() {
        assert_eq!(clean_text("caf\u{00E9} bar"), "caf bar");
        assert_eq!(clean_text("x\u{0000}\u{0001}y"), "x y");
        assert_eq!(clean_text("page\u{000C}break"), "page break");
    }

    #[test]
    fn trims_leading_and_trailing_whitespace() {
        assert_eq!(clean_text("  hello world  \n"), "hello world");
    }

    #[test]
    fn cleaning_is_idempotent() {
        let samples = [
            "plain already-clean text",
            "m\u{00FC}nchen\n\nreport\t2024",
            "   \n\t  ",
            "",
        ];
        for sample in samples {
            let once = clean_text(sample);
            assert_eq!(clean_text(&once), once);
        }
    }

    #[test]
    fn whitespace_only_input_becomes_empty() {
        assert_eq!(clean_text(" \n \t \r "), "");
    }
}
