use crate::segmenter::ChapterSegment;

// @module: Human-review rendering of the final segment list

/// Render the parsed segment list as a plain-text table.
///
/// The last chapter usually runs to end-of-file; its absent end time is
/// shown as `EOF` rather than left blank so a reviewer scanning the column
/// doesn't mistake it for a dropped value.
pub fn render(segments: &[ChapterSegment]) -> String {
    const EOF_CELL: &str = "EOF";

    let start_width = segments
        .iter()
        .map(|s| s.start.len())
        .chain(["Start".len()].into_iter())
        .max()
        .unwrap_or(5);
    let end_width = segments
        .iter()
        .map(|s| s.end.as_deref().unwrap_or(EOF_CELL).len())
        .chain(["End".len()].into_iter())
        .max()
        .unwrap_or(3);
    let label_width = segments
        .iter()
        .map(|s| s.label.len())
        .chain(["Chapter".len()].into_iter())
        .max()
        .unwrap_or(7);

    let mut out = String::new();
    out.push_str("Parsed timecodes for chapters (EOF = end of file)\n");
    out.push_str(&format!(
        "{:<start_width$}  {:<end_width$}  {:<label_width$}\n",
        "Start", "End", "Chapter"
    ));
    out.push_str(&format!(
        "{}  {}  {}\n",
        "-".repeat(start_width),
        "-".repeat(end_width),
        "-".repeat(label_width)
    ));

    for segment in segments {
        out.push_str(&format!(
            "{:<start_width$}  {:<end_width$}  {:<label_width$}\n",
            segment.start,
            segment.end.as_deref().unwrap_or(EOF_CELL),
            segment.label
        ));
    }

    out
}
