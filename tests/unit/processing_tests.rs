/*!
 * Tests for the plain-text document processor
 */

use doctrans::errors::ProcessingError;
use doctrans::processing::{DocumentProcessor, PlainTextProcessor, split_into_chunks};

use crate::common::mock_providers::{MockErrorType, MockTranslator};
use crate::common::{create_temp_dir, create_test_file};

#[tokio::test]
async fn test_processFile_withPlainText_shouldWriteTranslatedOutput() {
    let temp_dir = create_temp_dir().unwrap();
    let dir = temp_dir.path().to_path_buf();
    let input = create_test_file(&dir, "report.txt", "First paragraph.\n\nSecond paragraph.")
        .unwrap();

    let processor = PlainTextProcessor::new();
    let translator = MockTranslator::new();

    let output = processor
        .process_file(&input, &translator, "zh", "en", 2, true)
        .await
        .unwrap();

    assert_eq!(output, dir.join("report_en.txt"));
    let translated = std::fs::read_to_string(&output).unwrap();
    assert_eq!(translated, "[en] First paragraph.\n\nSecond paragraph.");
}

#[tokio::test]
async fn test_processFile_withSmallChunkCap_shouldTranslateEveryChunk() {
    let temp_dir = create_temp_dir().unwrap();
    let dir = temp_dir.path().to_path_buf();
    let input = create_test_file(&dir, "doc.txt", "alpha\n\nbravo\n\ncharlie").unwrap();

    // Cap below two paragraph lengths forces one chunk per paragraph
    let processor = PlainTextProcessor::new().with_max_chunk_size(6);
    let translator = MockTranslator::new();

    let output = processor
        .process_file(&input, &translator, "zh", "en", 4, true)
        .await
        .unwrap();

    assert_eq!(translator.call_count(), 3);
    let translated = std::fs::read_to_string(&output).unwrap();
    assert_eq!(translated, "[en] alpha\n\n[en] bravo\n\n[en] charlie");
}

#[tokio::test]
async fn test_processFile_withEmptyDocument_shouldFail() {
    let temp_dir = create_temp_dir().unwrap();
    let dir = temp_dir.path().to_path_buf();
    let input = create_test_file(&dir, "empty.txt", "   \n\n  ").unwrap();

    let processor = PlainTextProcessor::new();
    let translator = MockTranslator::new();

    let result = processor
        .process_file(&input, &translator, "zh", "en", 1, true)
        .await;

    assert!(matches!(result, Err(ProcessingError::EmptyDocument(_))));
    assert_eq!(translator.call_count(), 0);
}

#[tokio::test]
async fn test_processFile_withUnsupportedExtension_shouldFail() {
    let temp_dir = create_temp_dir().unwrap();
    let dir = temp_dir.path().to_path_buf();
    let input = create_test_file(&dir, "image.png", "not text").unwrap();

    let processor = PlainTextProcessor::new();
    let translator = MockTranslator::new();

    let result = processor
        .process_file(&input, &translator, "zh", "en", 1, true)
        .await;

    assert!(matches!(result, Err(ProcessingError::UnsupportedFormat(_))));
    assert_eq!(translator.call_count(), 0);
}

#[tokio::test]
async fn test_processFile_withFailingChunk_shouldSurfaceProviderError() {
    let temp_dir = create_temp_dir().unwrap();
    let dir = temp_dir.path().to_path_buf();
    let input = create_test_file(&dir, "doc.txt", "alpha\n\nbravo").unwrap();

    let processor = PlainTextProcessor::new().with_max_chunk_size(6);
    let translator = MockTranslator::new();
    translator.fail_on_call(2, MockErrorType::RateLimit);

    let result = processor
        .process_file(&input, &translator, "zh", "en", 1, true)
        .await;

    assert!(matches!(result, Err(ProcessingError::Translation(_))));
    // Cleanup mode leaves nothing behind
    assert!(!dir.join("doc_en.txt").exists());
    assert!(!dir.join("doc_en.txt.partial").exists());
}

#[tokio::test]
async fn test_processFile_withFailureAndKeepIntermediate_shouldWritePartial() {
    let temp_dir = create_temp_dir().unwrap();
    let dir = temp_dir.path().to_path_buf();
    let input = create_test_file(&dir, "doc.txt", "alpha\n\nbravo").unwrap();

    let processor = PlainTextProcessor::new().with_max_chunk_size(6);
    let translator = MockTranslator::new();
    translator.fail_on_call(2, MockErrorType::Connection);

    // With one worker the first chunk finishes before the second fails
    let result = processor
        .process_file(&input, &translator, "zh", "en", 1, false)
        .await;
    assert!(result.is_err());

    let partial = dir.join("doc_en.txt.partial");
    assert!(partial.exists());
    assert_eq!(std::fs::read_to_string(partial).unwrap(), "[en] alpha");
}

#[tokio::test]
async fn test_processFile_withOutputDir_shouldWriteThere() {
    let temp_dir = create_temp_dir().unwrap();
    let dir = temp_dir.path().to_path_buf();
    let out_dir = dir.join("translated");
    let input = create_test_file(&dir, "doc.md", "Some markdown.").unwrap();

    let processor = PlainTextProcessor::new().with_output_dir(&out_dir);
    let translator = MockTranslator::new();

    let output = processor
        .process_file(&input, &translator, "zh", "fr", 1, true)
        .await
        .unwrap();

    assert_eq!(output, out_dir.join("doc_fr.md"));
    assert!(output.exists());
}

#[test]
fn test_processFile_withConcurrentWorkers_shouldPreserveChunkOrder() {
    let result = tokio_test::block_on(async {
        let temp_dir = create_temp_dir().unwrap();
        let dir = temp_dir.path().to_path_buf();
        let text = (0..12)
            .map(|i| format!("paragraph {}", i))
            .collect::<Vec<_>>()
            .join("\n\n");
        let input = create_test_file(&dir, "ordered.txt", &text).unwrap();

        let processor = PlainTextProcessor::new().with_max_chunk_size(12);
        let translator = MockTranslator::new();

        let output = processor
            .process_file(&input, &translator, "zh", "en", 4, true)
            .await
            .unwrap();
        std::fs::read_to_string(output).unwrap()
    });

    let expected = (0..12)
        .map(|i| format!("[en] paragraph {}", i))
        .collect::<Vec<_>>()
        .join("\n\n");
    assert_eq!(result, expected);
}

#[test]
fn test_splitIntoChunks_withParagraphs_shouldRespectCap() {
    let text = "one one\n\ntwo two\n\nthree three";
    let chunks = split_into_chunks(text, 16);

    assert_eq!(chunks, vec!["one one\n\ntwo two", "three three"]);
}

#[test]
fn test_splitIntoChunks_withWindowsLineEndings_shouldSplitParagraphs() {
    let chunks = split_into_chunks("one\r\n\r\ntwo", 4);
    assert_eq!(chunks, vec!["one", "two"]);
}
