use std::fs;

use tempfile::TempDir;
use tubeport_engine::{ensure_output_dir, result_filename, AtomicFileWriter};

#[test]
fn creates_missing_output_dir() {
    let temp = TempDir::new().unwrap();
    let new_dir = temp.path().join("downloads");
    assert!(!new_dir.exists());
    ensure_output_dir(&new_dir).unwrap();
    assert!(new_dir.is_dir());
}

#[test]
fn atomic_write_replaces_existing_result() {
    let temp = TempDir::new().unwrap();
    let writer = AtomicFileWriter::new(temp.path().join("downloads"));

    let first = writer.write("clip--abcd1234.mp4", b"first").unwrap();
    assert_eq!(first.file_name().unwrap(), "clip--abcd1234.mp4");
    assert_eq!(fs::read(&first).unwrap(), b"first");

    let second = writer.write("clip--abcd1234.mp4", b"second").unwrap();
    assert_eq!(first, second);
    assert_eq!(fs::read(&second).unwrap(), b"second");

    let leftovers = fs::read_dir(writer.dir()).unwrap().count();
    assert_eq!(leftovers, 1);
}

#[test]
fn no_partial_file_on_error() {
    let temp = TempDir::new().unwrap();
    let file_path = temp.path().join("not_a_dir");
    fs::write(&file_path, "x").unwrap();

    let writer = AtomicFileWriter::new(file_path.clone());
    let result = writer.write("clip.mp3", b"data");
    assert!(result.is_err());
    assert!(!file_path.with_file_name("clip.mp3").exists());
}

#[test]
fn result_names_are_stable_and_safe() {
    let a = result_filename(Some("My: \"Great\" Video?"), "job-1", "mp4");
    let b = result_filename(Some("My: \"Great\" Video?"), "job-1", "mp4");
    assert_eq!(a, b);
    assert!(a.starts_with("My_ _Great_ Video--"));
    assert!(a.ends_with(".mp4"));
    assert!(!a.contains(['/', ':', '"', '?']));

    let other = result_filename(Some("My: \"Great\" Video?"), "job-2", "mp4");
    assert_ne!(a, other);
}

#[test]
fn result_name_falls_back_for_blank_title_and_extension() {
    let name = result_filename(Some("  ..  "), "job-1", ".");
    assert!(name.starts_with("download--"));
    assert!(name.ends_with(".bin"));

    let untitled = result_filename(None, "job-1", ".MP3");
    assert!(untitled.starts_with("download--"));
    assert!(untitled.ends_with(".mp3"));
}

#[test]
fn long_titles_are_cut_on_char_boundary() {
    let title = "é".repeat(100);
    let name = result_filename(Some(&title), "job-1", "webm");
    let stem = name.split("--").next().unwrap();
    assert!(stem.len() <= 80);
    assert!(stem.chars().all(|c| c == 'é'));
}
