//! The source patcher: applies anchored insertions to the original text.
//!
//! Edits are pure insertions anchored to original positions, so the patcher
//! never re-parses. Multi-line texts are normalized: the common leading
//! whitespace of every line after the first is stripped, then every inserted
//! line is re-indented to the anchor's column (document start gets none).
//! Insertions are applied from the last anchor to the first so earlier
//! splices never shift positions still needed later in the same pass; for
//! edits sharing an anchor, edit-list order is preserved in the output.

use crate::violation::{Edit, EditAnchor};

struct Insertion<'e> {
    /// 0-based index into the line vector where the text goes.
    at: usize,
    /// 1-based anchor column; inserted lines are padded to `column - 1`.
    column: u32,
    text: &'e str,
}

/// Apply `edits` to `source`, returning the corrected text. The original
/// lines are never modified or reordered, only new lines spliced in, so
/// removing every inserted line reproduces the input byte-for-byte.
pub fn apply_edits(source: &str, edits: &[Edit]) -> String {
    // Split on bare newlines so a `\r` stays glued to its line and original
    // CRLF endings survive; inserted lines are plain LF.
    let mut lines: Vec<String> = if source.is_empty() {
        Vec::new()
    } else {
        let mut lines: Vec<String> = source.split('\n').map(String::from).collect();
        if source.ends_with('\n') {
            lines.pop();
        }
        lines
    };

    let mut insertions: Vec<Insertion<'_>> = edits
        .iter()
        .map(|edit| match edit.anchor {
            EditAnchor::DocumentStart => Insertion {
                at: 0,
                column: 1,
                text: &edit.text,
            },
            EditAnchor::Before(span) => Insertion {
                at: span.start_line.saturating_sub(1) as usize,
                column: span.start_col,
                text: &edit.text,
            },
            EditAnchor::After(span) => Insertion {
                at: span.end_line as usize,
                column: span.start_col,
                text: &edit.text,
            },
        })
        .collect();

    // Stable sort, then splice back-to-front: equal anchors keep list order.
    insertions.sort_by_key(|ins| ins.at);
    for ins in insertions.iter().rev() {
        let at = ins.at.min(lines.len());
        let rendered = reindent(ins.text, ins.column);
        lines.splice(at..at, rendered);
    }

    let mut out = lines.join("\n");
    if source.ends_with('\n') && !out.is_empty() {
        out.push('\n');
    }
    out
}

fn leading_whitespace(line: &str) -> usize {
    line.chars().take_while(|c| *c == ' ' || *c == '\t').count()
}

/// Strip the common indentation of every line after the first, then indent
/// all lines to `column - 1` spaces. Blank lines stay empty.
fn reindent(text: &str, column: u32) -> Vec<String> {
    let raw: Vec<&str> = text.lines().collect();
    let common = raw
        .iter()
        .skip(1)
        .filter(|l| !l.trim().is_empty())
        .map(|l| leading_whitespace(l))
        .min()
        .unwrap_or(0);
    let pad = " ".repeat(column.saturating_sub(1) as usize);

    raw.iter()
        .enumerate()
        .map(|(i, line)| {
            let body = if i == 0 {
                line.trim_start_matches([' ', '\t'])
            } else {
                line.get(common.min(line.len())..).unwrap_or("")
            };
            if body.trim().is_empty() {
                String::new()
            } else {
                format!("{}{}", pad, body)
            }
        })
        .collect()
}
