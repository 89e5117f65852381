//! Greedy word wrapping with explicit line breaks.

/// Explicit line break marker inside caption text.
pub const NEWLINE_DELIMITER: &str = "##";

/// Splits on [`NEWLINE_DELIMITER`] and wraps every segment to `width` characters.
///
/// Words longer than `width` are broken across lines. A segment that is empty
/// after trimming becomes a single `" "` line, so `a ## ## b` keeps a blank
/// line between `a` and `b`. Text that is empty after trimming yields no lines.
#[must_use]
pub fn wrap_lines(text: &str, width: usize) -> Vec<String> {
    if text.trim().is_empty() {
        return Vec::new();
    }

    let width = width.max(1);
    let mut lines = Vec::new();

    for segment in text.split(NEWLINE_DELIMITER) {
        let segment = segment.trim();
        if segment.is_empty() {
            lines.push(" ".to_string());
        } else {
            lines.extend(wrap_segment(segment, width));
        }
    }

    lines
}

fn wrap_segment(text: &str, width: usize) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();
    let mut current_len = 0;

    for word in text.split_whitespace() {
        let mut rest: Vec<char> = word.chars().collect();

        while !rest.is_empty() {
            let separator = usize::from(current_len > 0);

            if current_len + separator + rest.len() <= width {
                if separator == 1 {
                    current.push(' ');
                }
                current.extend(rest.iter());
                current_len += separator + rest.len();
                break;
            }

            if rest.len() > width {
                let space_left = width.saturating_sub(current_len + separator);
                if space_left > 0 {
                    if separator == 1 {
                        current.push(' ');
                    }
                    current.extend(rest.drain(..space_left));
                    current_len += separator + space_left;
                }
            }

            if current_len > 0 {
                lines.push(std::mem::take(&mut current));
                current_len = 0;
            }
        }
    }

    if current_len > 0 {
        lines.push(current);
    }

    lines
}
