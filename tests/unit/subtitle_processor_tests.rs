/*!
 * Tests for line classification and document reading
 */

use anyhow::Result;
use vttai::subtitle_processor::{classify, LineKind, SubtitleDocument};

use crate::common;

#[test]
fn test_classify_withTimingLines_shouldBeStructural() {
    assert_eq!(classify("00:00:01.000 --> 00:00:02.000\n"), LineKind::StructuralMarker);
    assert_eq!(classify("00:01.000 --> 00:02.500"), LineKind::StructuralMarker);
    assert_eq!(classify("01:02.000 --> 01:02:03.000\r\n"), LineKind::StructuralMarker);
}

#[test]
fn test_classify_withCueSettingsAfterTiming_shouldStillBeStructural() {
    assert_eq!(
        classify("00:00:05.000 --> 00:00:08.000 align:start position:10%\n"),
        LineKind::StructuralMarker
    );
}

#[test]
fn test_classify_withSurroundingWhitespace_shouldTrimBeforeMatching() {
    assert_eq!(classify("   00:00:01.000 --> 00:00:02.000   \n"), LineKind::StructuralMarker);
    assert_eq!(classify("\n"), LineKind::StructuralMarker);
    assert_eq!(classify("  \t \r\n"), LineKind::StructuralMarker);
    assert_eq!(classify(""), LineKind::StructuralMarker);
}

#[test]
fn test_classify_withTextLines_shouldBeDialogue() {
    assert_eq!(classify("Hello\n"), LineKind::Dialogue);
    assert_eq!(classify("WEBVTT\n"), LineKind::Dialogue);
    assert_eq!(classify("1\n"), LineKind::Dialogue);
    assert_eq!(classify("NOTE written at 00:00:01.000 --> later\n"), LineKind::Dialogue);
}

#[test]
fn test_classify_withMalformedTimings_shouldBeDialogue() {
    // Comma separator is SRT style
    assert_eq!(classify("00:00:01,000 --> 00:00:02,000"), LineKind::Dialogue);
    // Single-digit minutes
    assert_eq!(classify("0:01.000 --> 0:02.000"), LineKind::Dialogue);
    // Missing second timestamp
    assert_eq!(classify("00:00:01.000 -->"), LineKind::Dialogue);
    // Two-digit milliseconds
    assert_eq!(classify("00:01.00 --> 00:02.00"), LineKind::Dialogue);
}

#[test]
fn test_line_kind_is_structural_withBothKinds_shouldMatch() {
    assert!(LineKind::StructuralMarker.is_structural());
    assert!(!LineKind::Dialogue.is_structural());
}

#[test]
fn test_dialogue_line_count_withSampleDocument_shouldCountTextOnly() {
    let doc = SubtitleDocument::parse(common::SAMPLE_VTT);
    assert_eq!(doc.len(), 8);
    // WEBVTT header plus three lines of cue text
    assert_eq!(doc.dialogue_line_count(), 4);
}

#[test]
fn test_read_from_file_withSampleFile_shouldKeepEveryLine() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let path = common::create_test_subtitle(temp_dir.path(), "sample.vtt")?;

    let doc = SubtitleDocument::read_from_file(&path)?;

    assert_eq!(doc.lines().concat(), common::SAMPLE_VTT);
    Ok(())
}

#[test]
fn test_read_from_file_withMissingFile_shouldFail() {
    assert!(SubtitleDocument::read_from_file("/definitely/not/here.vtt").is_err());
}
