//! Document-level properties: migration, round-tripping, and Portal purging.

mod common;

use common::Env;
use fences_lib::modules::fences::migration::migrate;
use fences_lib::modules::fences::shortcuts::InternetShortcutResolver;
use fences_lib::modules::fences::state::{ItemsType, parse_document, to_document};
use pretty_assertions::assert_eq;
use serde_json::json;

/// Records from several schema versions: missing ids, native and string
/// booleans, numeric strings, a legacy unrolled height.
const LEGACY_DOCUMENT: &str = r#"[
  {
    "Title": "Work",
    "X": "120", "Y": 80, "Width": 300, "Height": 200,
    "ItemsType": "Data",
    "IsLocked": true,
    "IsHidden": "False",
    "IsRolled": "false",
    "UnrolledHeight": 12,
    "Items": [
      { "Filename": "/tmp/report.pdf" },
      { "Filename": "https://example.com", "IsLink": "true" }
    ]
  },
  {
    "Id": "dup", "Title": "Notes", "X": 500, "Y": 80, "Width": 250, "Height": 180,
    "ItemsType": "Note", "NoteContent": "hello", "IsLocked": "TRUE"
  },
  {
    "Id": "dup", "Title": "Games", "X": 800, "Y": 80, "Width": 250, "Height": 180,
    "ItemsType": "Data", "Items": []
  }
]"#;

#[test]
fn test_migration_is_idempotent() {
    let records = parse_document(LEGACY_DOCUMENT).unwrap();

    let (first, modified) = migrate(records, &InternetShortcutResolver);
    assert!(modified);

    let (second, modified_again) = migrate(first.clone(), &InternetShortcutResolver);
    assert!(!modified_again);
    assert_eq!(second, first);
}

#[test]
fn test_save_load_save_is_stable() {
    let (records, _) = migrate(parse_document(LEGACY_DOCUMENT).unwrap(), &InternetShortcutResolver);

    let saved = to_document(&records).unwrap();
    let reloaded = parse_document(&saved).unwrap();
    assert_eq!(to_document(&reloaded).unwrap(), saved);

    let value: serde_json::Value = serde_json::from_str(&saved).unwrap();
    assert_eq!(value[0]["IsLocked"], json!("true"));
    assert_eq!(value[0]["IsHidden"], json!("false"));
    assert_eq!(value[1]["IsLocked"], json!("true"));
    assert_eq!(value[0]["Items"][0]["IsFolder"], json!(false));
}

#[test]
fn test_migration_gives_every_record_a_unique_id() {
    let (records, _) = migrate(parse_document(LEGACY_DOCUMENT).unwrap(), &InternetShortcutResolver);

    let mut ids: Vec<&str> = records.iter().map(|r| r.id.as_str()).collect();
    assert!(ids.iter().all(|id| !id.is_empty()));
    ids.sort_unstable();
    ids.dedup();
    assert_eq!(ids.len(), 3);
}

#[test]
fn test_load_rewrites_legacy_document_once() {
    let mut env = Env::with_document(LEGACY_DOCUMENT);
    assert_eq!(env.manager.load().unwrap(), 3);
    let first = std::fs::read_to_string(env.document()).unwrap();

    env.restart();
    assert_eq!(std::fs::read_to_string(env.document()).unwrap(), first);
}

#[test]
fn test_missing_portal_folder_is_purged() {
    let mut env = Env::new();
    let folder = env.dir.path().join("Inbox");
    std::fs::create_dir(&folder).unwrap();
    let document = json!([
        { "Id": "kept", "Title": "Inbox", "ItemsType": "Portal", "Path": folder.to_string_lossy(),
          "X": 0, "Y": 0, "Width": 200, "Height": 200 },
        { "Id": "gone", "Title": "Old share", "ItemsType": "Portal", "Path": "/definitely/not/here",
          "X": 0, "Y": 0, "Width": 200, "Height": 200 }
    ]);
    std::fs::write(env.document(), document.to_string()).unwrap();

    env.manager.load().unwrap();

    let ids: Vec<String> = env.manager.get_all_records().into_iter().map(|r| r.id).collect();
    assert_eq!(ids, vec!["kept".to_string()]);

    let on_disk = env.read_document();
    assert_eq!(on_disk.as_array().unwrap().len(), 1);
    assert_eq!(on_disk[0]["Id"], json!("kept"));
    assert_eq!(env.manager.record("kept").unwrap().items_type, ItemsType::Portal);
}

#[test]
fn test_unreadable_document_fails_load() {
    let mut env = Env::with_document("{ this is not json");
    assert!(env.manager.load().is_err());
    assert!(env.manager.get_all_records().is_empty());
}
