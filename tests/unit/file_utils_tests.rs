/*!
 * Tests for file utility functionality
 */

use doctrans::file_utils::FileManager;

use crate::common::{create_temp_dir, create_test_file};

#[test]
fn test_fileExists_withRealAndMissingFiles_shouldDetectCorrectly() {
    let temp_dir = create_temp_dir().unwrap();
    let dir = temp_dir.path().to_path_buf();
    let file = create_test_file(&dir, "a.txt", "text").unwrap();

    assert!(FileManager::file_exists(&file));
    assert!(!FileManager::file_exists(dir.join("missing.txt")));
    assert!(!FileManager::file_exists(&dir));
    assert!(FileManager::dir_exists(&dir));
}

#[test]
fn test_ensureDir_withNestedPath_shouldCreateAll() {
    let temp_dir = create_temp_dir().unwrap();
    let nested = temp_dir.path().join("a").join("b").join("c");

    FileManager::ensure_dir(&nested).unwrap();
    assert!(FileManager::dir_exists(&nested));

    // Idempotent
    FileManager::ensure_dir(&nested).unwrap();
}

#[test]
fn test_findFiles_withMixedContent_shouldFilterAndSort() {
    let temp_dir = create_temp_dir().unwrap();
    let dir = temp_dir.path().to_path_buf();
    create_test_file(&dir, "b.txt", "b").unwrap();
    create_test_file(&dir, "a.txt", "a").unwrap();
    create_test_file(&dir, "notes.MD", "md").unwrap();
    create_test_file(&dir, "image.png", "png").unwrap();
    std::fs::create_dir(dir.join("sub")).unwrap();
    create_test_file(&dir.join("sub"), "c.txt", "c").unwrap();

    let files = FileManager::find_files(&dir, &["txt", "md"]).unwrap();
    let names: Vec<String> = files
        .iter()
        .map(|p| p.file_name().unwrap().to_string_lossy().to_string())
        .collect();

    assert_eq!(names, vec!["a.txt", "b.txt", "notes.MD", "c.txt"]);
}

#[test]
fn test_collectInputs_withFilesAndDirs_shouldPreserveArgumentOrder() {
    let temp_dir = create_temp_dir().unwrap();
    let dir = temp_dir.path().to_path_buf();
    let loose = create_test_file(&dir, "z.txt", "z").unwrap();
    let sub = dir.join("docs");
    std::fs::create_dir(&sub).unwrap();
    create_test_file(&sub, "b.txt", "b").unwrap();
    create_test_file(&sub, "a.txt", "a").unwrap();

    let inputs = FileManager::collect_inputs(&[loose.clone(), sub.clone()], &["txt"]).unwrap();
    assert_eq!(inputs.len(), 3);
    // The loose file keeps its leading position; directory contents sort
    assert_eq!(inputs[0], loose);
    assert_eq!(inputs[1], sub.join("a.txt"));
    assert_eq!(inputs[2], sub.join("b.txt"));
}

#[test]
fn test_collectInputs_withUnsupportedFile_shouldSkipIt() {
    let temp_dir = create_temp_dir().unwrap();
    let dir = temp_dir.path().to_path_buf();
    let image = create_test_file(&dir, "image.png", "png").unwrap();
    let text = create_test_file(&dir, "a.txt", "a").unwrap();

    let inputs = FileManager::collect_inputs(&[image, text.clone()], &["txt"]).unwrap();
    assert_eq!(inputs, vec![text]);
}

#[test]
fn test_collectInputs_withMissingPath_shouldFail() {
    let temp_dir = create_temp_dir().unwrap();
    let missing = temp_dir.path().join("nope.txt");

    let result = FileManager::collect_inputs(&[missing], &["txt"]);
    assert!(result.is_err());
}
