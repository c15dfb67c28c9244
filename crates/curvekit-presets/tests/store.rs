use std::fs;

use curvekit_presets::{Preset, PresetError, PresetKind, PresetStore, Timestamp};
use serde_json::json;
use tempfile::tempdir;

fn curve_preset(name: &str) -> Preset {
    Preset::new(name, "curve_preset", json!({"points": "0,0;128,200;255,255", "strength": 0.8}))
}

#[test]
fn open_creates_kind_directories() {
    let root = tempdir().unwrap();
    let store = PresetStore::open(root.path(), "levels").unwrap();
    for kind in PresetKind::ALL {
        assert!(store.kind_dir(kind).is_dir(), "{kind}");
    }
    assert!(root.path().join("levels/user").is_dir());
}

#[test]
fn save_then_load() {
    let root = tempdir().unwrap();
    let store = PresetStore::open(root.path(), "curve_preset").unwrap();
    let id = store.save(curve_preset("Lift"), PresetKind::User).unwrap();

    let loaded = store.load(&id).unwrap();
    assert_eq!(loaded.name, "Lift");
    assert_eq!(loaded.node_type, "curve_preset");
    assert_eq!(loaded.version, "1.0");
    assert!(loaded.created_at > Timestamp::default());
    assert_eq!(loaded.parameters["strength"], 0.8);
    assert!(store.kind_dir(PresetKind::User).join(format!("{id}.json")).is_file());
}

#[test]
fn save_stamps_store_node_type() {
    let root = tempdir().unwrap();
    let store = PresetStore::open(root.path(), "hsl").unwrap();
    let id = store.save(curve_preset("Mislabelled"), PresetKind::Shared).unwrap();
    assert_eq!(store.load(&id).unwrap().node_type, "hsl");
    assert!(matches!(
        store.save(curve_preset("Nope"), PresetKind::Default),
        Err(PresetError::ReadOnly(_))
    ));
}

#[test]
fn list_is_newest_first_and_skips_junk() {
    let root = tempdir().unwrap();
    let store = PresetStore::open(root.path(), "curve_preset").unwrap();
    let mut old = curve_preset("Old");
    old.created_at = "2023-03-01T09:00:00".parse().unwrap();
    let mut newer = curve_preset("Newer");
    newer.created_at = "2024-05-01T12:00:00.123456".parse().unwrap();
    store.install_default(&old).unwrap();
    store.install_default(&newer).unwrap();
    store.save(curve_preset("Now"), PresetKind::User).unwrap();
    fs::write(store.kind_dir(PresetKind::Shared).join("broken.json"), "{not json").unwrap();
    fs::write(store.kind_dir(PresetKind::Shared).join("notes.txt"), "ignored").unwrap();

    let listed = store.list().unwrap();
    let names: Vec<&str> = listed.iter().map(|p| p.preset.name.as_str()).collect();
    assert_eq!(names, ["Now", "Newer", "Old"]);
    assert_eq!(listed[0].kind, PresetKind::User);
    assert_eq!(listed[2].kind, PresetKind::Default);
    assert_eq!(listed[2].file_name, format!("{}.json", old.id));
}

#[test]
fn delete_user_and_shared_but_not_default() {
    let root = tempdir().unwrap();
    let store = PresetStore::open(root.path(), "curve_preset").unwrap();
    let shipped = curve_preset("Shipped");
    store.install_default(&shipped).unwrap();
    let user = store.save(curve_preset("Mine"), PresetKind::User).unwrap();
    let shared = store.save(curve_preset("Ours"), PresetKind::Shared).unwrap();

    store.delete(&user).unwrap();
    store.delete(&shared).unwrap();
    assert!(matches!(store.load(&user), Err(PresetError::NotFound(_))));
    assert!(matches!(store.delete(&shipped.id), Err(PresetError::ReadOnly(_))));
    assert!(store.load(&shipped.id).is_ok());
    assert!(matches!(store.delete("missing"), Err(PresetError::NotFound(_))));
}

#[test]
fn ids_cannot_escape_the_store() {
    let root = tempdir().unwrap();
    let store = PresetStore::open(root.path(), "curve_preset").unwrap();
    assert!(matches!(store.load("../../etc/passwd"), Err(PresetError::InvalidId(_))));
    let mut sneaky = curve_preset("Sneaky");
    sneaky.id = "../outside".to_string();
    assert!(matches!(store.save(sneaky, PresetKind::User), Err(PresetError::InvalidId(_))));
    assert!(PresetStore::open(root.path(), "../up").is_err());
}

#[test]
fn export_then_import_into_another_store() {
    let source_root = tempdir().unwrap();
    let target_root = tempdir().unwrap();
    let source = PresetStore::open(source_root.path(), "curve_preset").unwrap();
    let target = PresetStore::open(target_root.path(), "curve_preset").unwrap();

    let id = source.save(curve_preset("Portable Look"), PresetKind::User).unwrap();
    let exported = source.export(&id).unwrap();
    assert_eq!(exported.exported_from.as_deref(), Some("curvekit-curve_preset"));
    assert!(exported.exported_at.is_some());
    assert_eq!(exported.export_file_name(), "Portable_Look_curve_preset_preset.json");

    let text = serde_json::to_string(&exported).unwrap();
    let new_id = target.import_json(&text).unwrap();
    assert_ne!(new_id, id);
    let imported = target.load(&new_id).unwrap();
    assert_eq!(imported.name, "Portable Look");
    assert!(imported.imported_at.is_some());
    assert_eq!(target.list().unwrap()[0].kind, PresetKind::User);
}

#[test]
fn import_rejects_other_node_types() {
    let root = tempdir().unwrap();
    let store = PresetStore::open(root.path(), "levels").unwrap();
    let err = store.import(curve_preset("Wrong")).unwrap_err();
    assert!(matches!(err, PresetError::NodeTypeMismatch { .. }));
    assert!(err.to_string().contains("levels"));
    assert!(store.list().unwrap().is_empty());
}

#[test]
fn parameters_decode_into_typed_config() {
    #[derive(serde::Deserialize)]
    struct Strength {
        strength: f32,
    }
    let preset = curve_preset("Typed");
    let parsed: Strength = preset.parameters_as().unwrap();
    assert_eq!(parsed.strength, 0.8);
}

#[test]
fn reads_documents_written_by_the_plugin() {
    let root = tempdir().unwrap();
    let store = PresetStore::open(root.path(), "curve_preset").unwrap();
    let document = r#"{
        "id": "9b2f7c1e-0d4a-4f5e-8c3b-2a1d6e7f8a90",
        "name": "Film Fade",
        "description": "Lifted blacks",
        "category": "film",
        "created_at": "2024-05-01T12:00:00.123456",
        "author": "Anonymous",
        "version": "1.0",
        "node_type": "curve_preset",
        "parameters": {"points": "0,30;255,240", "strength": 1.0},
        "metadata": {"tags": ["film"], "thumbnail": ""}
    }"#;
    fs::write(
        store.kind_dir(PresetKind::User).join("9b2f7c1e-0d4a-4f5e-8c3b-2a1d6e7f8a90.json"),
        document,
    )
    .unwrap();
    let mut legacy = curve_preset("Older");
    legacy.created_at = "2023-01-01T00:00:00".parse().unwrap();
    store.install_default(&legacy).unwrap();

    let listed = store.list().unwrap();
    let names: Vec<&str> = listed.iter().map(|p| p.preset.name.as_str()).collect();
    assert_eq!(names, ["Film Fade", "Older"]);

    let loaded = store.load("9b2f7c1e-0d4a-4f5e-8c3b-2a1d6e7f8a90").unwrap();
    assert_eq!(loaded.created_at.to_string(), "2024-05-01T12:00:00.123456");
    assert_eq!(loaded.metadata.tags, ["film"]);

    let exported = serde_json::to_value(store.export(&loaded.id).unwrap()).unwrap();
    assert_eq!(exported["created_at"], "2024-05-01T12:00:00.123456");
    assert!(exported["exported_at"].as_str().is_some_and(|t| t.parse::<Timestamp>().is_ok()));
}
