/*!
 * Tests for the segment table renderer
 */

use chapterize::segment_table;

use crate::common::sample_segments;

#[test]
fn test_render_withSegments_shouldListEveryRow() {
    let rendered = segment_table::render(&sample_segments());

    assert!(rendered.contains("Start"));
    assert!(rendered.contains("End"));
    assert!(rendered.contains("Chapter"));

    assert!(rendered.contains("00:00:00.000"));
    assert!(rendered.contains("00:15:00.000"));
    assert!(rendered.contains("Chapter 01"));
    assert!(rendered.contains("Chapter 02"));
    assert!(rendered.contains("Epilogue"));
}

/// The open-ended final chapter renders as EOF, never as a blank cell
#[test]
fn test_render_withOpenEndedLastSegment_shouldShowEof() {
    let rendered = segment_table::render(&sample_segments());
    assert!(rendered.contains("EOF"));

    let last_row = rendered.lines().last().unwrap();
    assert!(last_row.contains("01:02:03.454"));
    assert!(last_row.contains("EOF"));
    assert!(last_row.contains("Epilogue"));
}

#[test]
fn test_render_withEmptyList_shouldStillRenderHeader() {
    let rendered = segment_table::render(&[]);
    assert!(rendered.contains("Start"));
    assert!(rendered.contains("End"));
}
