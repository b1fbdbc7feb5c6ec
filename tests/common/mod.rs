//! Shared helpers for the golden documentation tests

use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

use kcl_gendoc::MANIFEST_FILE_NAME;
use similar::{ChangeTag, TextDiff};

pub fn fixtures_path() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/doc")
}

pub fn source_path(case: &str) -> PathBuf {
    fixtures_path().join("source").join(case)
}

/// Expected output of `case` for one platform flavour (`unixlike` or `windows`)
pub fn expected_path(case: &str, flavour: &str) -> PathBuf {
    fixtures_path().join("expected").join(case).join(flavour).join("md")
}

fn entries(dir: &Path) -> BTreeSet<String> {
    fs::read_dir(dir)
        .unwrap_or_else(|e| panic!("cannot read {}: {}", dir.display(), e))
        .map(|entry| entry.unwrap().file_name().to_string_lossy().to_string())
        .filter(|name| name != MANIFEST_FILE_NAME)
        .collect()
}

/// Assert that `actual` and `expected` hold the same files with the same
/// lines. Carriage returns are ignored; the manifest is not compared.
pub fn compare_dir(actual: &Path, expected: &Path) {
    let actual_entries = entries(actual);
    let expected_entries = entries(expected);

    for name in expected_entries.difference(&actual_entries) {
        panic!("missing {} in {}", name, actual.display());
    }
    for name in actual_entries.difference(&expected_entries) {
        panic!("unexpected {} in {}", name, actual.display());
    }

    for name in &expected_entries {
        let actual_path = actual.join(name);
        let expected_path = expected.join(name);
        match (actual_path.is_dir(), expected_path.is_dir()) {
            (true, true) => compare_dir(&actual_path, &expected_path),
            (false, false) => compare_file(&actual_path, &expected_path),
            _ => panic!("{} is a file on one side and a directory on the other", actual_path.display()),
        }
    }
}

fn compare_file(actual: &Path, expected: &Path) {
    let actual_text = fs::read_to_string(actual).unwrap().replace('\r', "");
    let expected_text = fs::read_to_string(expected).unwrap().replace('\r', "");
    if actual_text == expected_text {
        return;
    }

    let diff = TextDiff::from_lines(&expected_text, &actual_text);
    let mut report = String::new();
    for change in diff.iter_all_changes() {
        let sign = match change.tag() {
            ChangeTag::Delete => "-",
            ChangeTag::Insert => "+",
            ChangeTag::Equal => " ",
        };
        report.push_str(&format!("{}{}", sign, change));
    }
    panic!("{} differs from {}:\n{}", actual.display(), expected.display(), report);
}
