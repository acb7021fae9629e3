//! Re-aligns scanned text with the original and removes comment-only lines.

/// Tokens that mark a line as having started with (or carried) a comment.
pub const COMMENT_MARKERS: &[&str] = &["//", "/*", "#", ";", "<#"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineClassification {
    /// Code remains on the line.
    Kept,
    /// The line held only a comment and is elided.
    Dropped,
    /// Empty or whitespace-only in the original, kept as is.
    Blank,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reconciled {
    pub text: String,
    pub dropped: usize,
    /// True when line counts drifted and the lossy fallback was used.
    pub realigned: bool,
}

fn has_comment_marker(original: &str) -> bool {
    let stripped = original.trim();
    COMMENT_MARKERS.iter().any(|m| stripped.starts_with(m))
        || original.contains("/*")
        || original.contains("*/")
}

pub fn classify(original: &str, scanned: &str) -> LineClassification {
    let scanned_empty = scanned.trim().is_empty();
    if scanned_empty && has_comment_marker(original) {
        LineClassification::Dropped
    } else if scanned_empty && original.trim().is_empty() {
        LineClassification::Blank
    } else {
        LineClassification::Kept
    }
}

/// One line split off the text, with the terminator it carried (`\n`,
/// `\r\n`, or nothing for an unterminated last line).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Line<'a> {
    body: &'a str,
    ending: &'a str,
}

fn split_lines(text: &str) -> Vec<Line<'_>> {
    text.split_inclusive('\n')
        .map(|segment| {
            let body = segment.strip_suffix('\n').unwrap_or(segment);
            let body = body.strip_suffix('\r').unwrap_or(body);
            Line {
                body,
                ending: &segment[body.len()..],
            }
        })
        .collect()
}

/// Build the final text from the original and the comment-erased text.
///
/// The scanner keeps every line terminator except those inside block
/// comments, so equal newline counts mean the two texts pair up by index.
/// A trailing unterminated comment line has no scanned counterpart and is
/// paired with an empty line. Kept lines reuse their original terminator.
///
/// When a multi-line block comment swallowed newlines the pairing is lost;
/// only the non-blank scanned lines survive, so intentional blank lines in
/// such a file are lost as well.
pub fn reconcile(original: &str, scanned: &str) -> Reconciled {
    let original_lines = split_lines(original);
    let scanned_lines = split_lines(scanned);

    let realigned = original.matches('\n').count() != scanned.matches('\n').count();

    let final_lines: Vec<Line> = if realigned {
        let ending = if original.contains("\r\n") { "\r\n" } else { "\n" };
        scanned_lines
            .iter()
            .filter(|line| !line.body.trim().is_empty())
            .map(|line| Line {
                body: line.body,
                ending,
            })
            .collect()
    } else {
        original_lines
            .iter()
            .enumerate()
            .filter_map(|(idx, old)| {
                let new = scanned_lines.get(idx).map_or("", |line| line.body);
                match classify(old.body, new) {
                    LineClassification::Dropped => None,
                    LineClassification::Kept | LineClassification::Blank => Some(Line {
                        body: new,
                        ending: old.ending,
                    }),
                }
            })
            .collect()
    };
    let dropped = original_lines.len().saturating_sub(final_lines.len());

    // The last line ends the way the original text ended.
    let final_ending = original_lines.last().map_or("", |line| line.ending);
    let mut text = String::with_capacity(original.len());
    if let Some((last, rest)) = final_lines.split_last() {
        for line in rest {
            text.push_str(line.body);
            text.push_str(line.ending);
        }
        text.push_str(last.body);
    }
    text.push_str(final_ending);

    Reconciled {
        text,
        dropped,
        realigned,
    }
}
