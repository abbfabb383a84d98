use std::fs;

use keychenga::engine::Token;
use keychenga::error::DrillError;
use keychenga::generator::TokenSource;
use tempfile::TempDir;

fn strings(tokens: &[Token]) -> Vec<&str> {
    tokens.iter().map(Token::as_str).collect()
}

#[test]
fn test_user_category_is_listed_and_loaded() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("vim.txt"), "Escape\n:wq\n\n  Ctrl  R \n").unwrap();
    fs::write(dir.path().join("notes.md"), "not a drill").unwrap();

    let source = TokenSource::new(Some(dir.path().to_path_buf()));
    let names = source.available();
    assert!(names.contains(&"vim".to_string()));
    assert!(names.contains(&"f-keys".to_string()));
    assert!(!names.iter().any(|n| n.starts_with("notes")));

    let category = source.load("vim").unwrap();
    assert_eq!(strings(&category.tokens), vec!["Escape", ":wq", "Ctrl R"]);
}

#[test]
fn test_user_category_shadows_bundled() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("f-keys.txt"), "F13\nF14\n").unwrap();
    let source = TokenSource::new(Some(dir.path().to_path_buf()));
    let category = source.load("f-keys").unwrap();
    assert_eq!(strings(&category.tokens), vec!["F13", "F14"]);
}

#[test]
fn test_missing_user_dir_falls_back_to_bundled() {
    let dir = TempDir::new().unwrap();
    let source = TokenSource::new(Some(dir.path().join("absent")));
    assert!(source.load("symbols").is_ok());
    assert!(matches!(
        source.load("absent-drill"),
        Err(DrillError::UnknownCategory(name)) if name == "absent-drill"
    ));
}

#[test]
fn test_merge_dedups_across_categories_only() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("one.txt"), "F1\nF1\nF2\n").unwrap();
    fs::write(dir.path().join("two.txt"), "F2\nF3\nF1\n").unwrap();
    let source = TokenSource::new(Some(dir.path().to_path_buf()));

    let merged = source.merged(&["one".to_string(), "two".to_string()]);
    assert_eq!(strings(&merged), vec!["F1", "F1", "F2", "F3"]);
}

#[test]
fn test_missing_category_contributes_nothing() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("one.txt"), "a\nb\n").unwrap();
    let source = TokenSource::new(Some(dir.path().to_path_buf()));
    let merged = source.merged(&["gone".to_string(), "one".to_string()]);
    assert_eq!(strings(&merged), vec!["a", "b"]);
    assert!(source.merged(&["gone".to_string()]).is_empty());
}

#[test]
fn test_exclusions_apply_to_user_files() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("keys.txt"), "F10\nCtrl F10\nF1\n").unwrap();
    let source = TokenSource::new(Some(dir.path().to_path_buf())).with_exclusions(vec!["F10".to_string()]);
    let category = source.load("keys").unwrap();
    assert_eq!(strings(&category.tokens), vec!["F1"]);
}
