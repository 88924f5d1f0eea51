use super::*;
use std::fs;
use tempfile::tempdir;

fn touch(dir: &Path, name: &str) -> PathBuf {
    let p = dir.join(name);
    fs::write(&p, [0u8; 8]).unwrap();
    p
}

#[test]
fn resolves_relative_to_manifest_directory() {
    let dir = tempdir().unwrap();
    let shards_dir = dir.path().join("test_files");
    fs::create_dir_all(&shards_dir).unwrap();
    touch(&shards_dir, "a.bin");
    touch(&shards_dir, "b.bin");
    let manifest = shards_dir.join("names.txt");
    fs::write(&manifest, "a.bin\nb.bin\n").unwrap();

    let resolved = resolve(&manifest).unwrap();
    let base = fs::canonicalize(&shards_dir).unwrap();

    assert_eq!(resolved.base_dir, base);
    assert!(resolved.is_clean());
    assert_eq!(
        resolved.shards,
        vec![
            ShardReference {
                filename: "a.bin".to_string(),
                path: base.join("a.bin"),
            },
            ShardReference {
                filename: "b.bin".to_string(),
                path: base.join("b.bin"),
            },
        ]
    );
    assert!(resolved.shards.iter().all(|s| s.path.is_absolute()));
}

#[test]
fn blank_lines_and_whitespace_are_ignored() {
    let dir = tempdir().unwrap();
    touch(dir.path(), "x.bin");
    let manifest = dir.path().join("names.txt");
    fs::write(&manifest, "\n   \n\t x.bin  \r\n\n").unwrap();

    let resolved = resolve(&manifest).unwrap();
    assert!(resolved.is_clean());
    assert_eq!(resolved.shards.len(), 1);
    assert_eq!(resolved.shards[0].filename, "x.bin");
}

#[test]
fn invalid_extension_is_a_warning_not_an_error() {
    let dir = tempdir().unwrap();
    touch(dir.path(), "good.bin");
    touch(dir.path(), "notes.txt");
    let manifest = dir.path().join("names.txt");
    fs::write(&manifest, "notes.txt\ngood.bin\ndata.BIN\n").unwrap();

    let resolved = resolve(&manifest).unwrap();
    assert_eq!(resolved.shards.len(), 1);
    assert_eq!(
        resolved.warnings,
        vec![
            ManifestWarning::InvalidExtension {
                line_number: 1,
                line: "notes.txt".to_string(),
            },
            ManifestWarning::InvalidExtension {
                line_number: 3,
                line: "data.BIN".to_string(),
            },
        ]
    );
}

#[test]
fn missing_shard_is_skipped_with_warning() {
    let dir = tempdir().unwrap();
    touch(dir.path(), "present.bin");
    let manifest = dir.path().join("names.txt");
    fs::write(&manifest, "gone.bin\npresent.bin\n").unwrap();

    let resolved = resolve(&manifest).unwrap();
    let base = fs::canonicalize(dir.path()).unwrap();
    assert_eq!(resolved.shards.len(), 1);
    assert_eq!(resolved.shards[0].filename, "present.bin");
    assert_eq!(
        resolved.warnings,
        vec![ManifestWarning::MissingShard {
            line_number: 1,
            path: base.join("gone.bin"),
        }]
    );
    assert!(resolved.warnings[0].to_string().contains("does not exist"));
}

#[test]
fn duplicate_entries_are_kept() {
    let dir = tempdir().unwrap();
    touch(dir.path(), "dup.bin");
    let manifest = dir.path().join("names.txt");
    fs::write(&manifest, "dup.bin\ndup.bin\n").unwrap();

    let resolved = resolve(&manifest).unwrap();
    assert_eq!(resolved.shards.len(), 2);
}

#[test]
fn empty_manifest_resolves_to_nothing() {
    let dir = tempdir().unwrap();
    let manifest = dir.path().join("names.txt");
    fs::write(&manifest, "").unwrap();

    let resolved = resolve(&manifest).unwrap();
    assert!(resolved.shards.is_empty());
    assert!(resolved.is_clean());
}

#[test]
fn unreadable_manifest_is_fatal() {
    let dir = tempdir().unwrap();
    let err = resolve(dir.path().join("absent.txt")).unwrap_err();
    assert!(matches!(err, ManifestError::Unreadable { .. }));
}

#[test]
fn non_utf8_manifest_is_unreadable() {
    let dir = tempdir().unwrap();
    let manifest = dir.path().join("names.txt");
    fs::write(&manifest, [0xff, 0xfe, b'\n']).unwrap();
    assert!(matches!(
        resolve(&manifest),
        Err(ManifestError::Unreadable { .. })
    ));
}

// -------------------- Writing --------------------

#[test]
fn write_then_resolve() {
    let dir = tempdir().unwrap();
    touch(dir.path(), "data_1.bin");
    touch(dir.path(), "data_2.bin");
    let manifest = dir.path().join("names.txt");

    write_manifest(&manifest, &["data_1.bin", "data_2.bin"]).unwrap();
    assert_eq!(
        fs::read_to_string(&manifest).unwrap(),
        "data_1.bin\ndata_2.bin\n"
    );
    assert!(!dir.path().join("names.txt.tmp").exists());

    let resolved = resolve(&manifest).unwrap();
    let names: Vec<&str> = resolved.shards.iter().map(|s| s.filename.as_str()).collect();
    assert_eq!(names, vec!["data_1.bin", "data_2.bin"]);
}

#[test]
fn write_overwrites_existing_manifest() {
    let dir = tempdir().unwrap();
    let manifest = dir.path().join("names.txt");
    write_manifest(&manifest, &["old.bin"]).unwrap();
    write_manifest(&manifest, &["new.bin"]).unwrap();
    assert_eq!(fs::read_to_string(&manifest).unwrap(), "new.bin\n");
}

#[test]
fn write_rejects_bad_entries() {
    let dir = tempdir().unwrap();
    let manifest = dir.path().join("names.txt");
    for bad in ["notes.txt", "", "a\nb.bin"] {
        let err = write_manifest(&manifest, &[bad]).unwrap_err();
        assert!(matches!(err, ManifestWriteError::InvalidEntry(_)), "{:?}", bad);
    }
    assert!(!manifest.exists());
}
