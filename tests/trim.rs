use assert_fs::TempDir;
use assert_fs::prelude::*;
use predicates::prelude::*;
use serde_json::json;
use slimzip::error::AppError;
use slimzip::{json_config, manifest, prune};

fn patterns(values: &[&str]) -> Vec<String> {
    values.iter().map(|value| value.to_string()).collect()
}

#[test]
fn remove_folders_matches_relative_paths() {
    let temp = TempDir::new().unwrap();
    temp.child("docs/readme.md").write_str("top-level docs").unwrap();
    temp.child("src/docs/api.md").write_str("nested docs").unwrap();
    temp.child("frontend/app/index.html").write_str("<html></html>").unwrap();
    temp.child("handler.js").write_str("ok").unwrap();

    let pruned =
        prune::remove_folders(temp.path(), &patterns(&["docs", "./frontend/", "missing"])).unwrap();
    let removed = pruned.removed;
    assert_eq!(pruned.unmatched, vec!["missing"]);

    let paths: Vec<String> =
        removed.iter().map(|folder| folder.path.display().to_string()).collect();
    assert_eq!(paths, vec!["docs", "frontend"]);
    assert_eq!(removed[0].size, "top-level docs".len() as u64);

    temp.child("docs").assert(predicate::path::missing());
    temp.child("frontend").assert(predicate::path::missing());
    temp.child("src/docs/api.md").assert(predicate::path::exists());
    temp.child("handler.js").assert(predicate::path::exists());
}

#[test]
fn remove_folders_globs_across_depths() {
    let temp = TempDir::new().unwrap();
    temp.child("docs/a.md").write_str("a").unwrap();
    temp.child("src/docs/b.md").write_str("b").unwrap();
    temp.child("src/lib/c.js").write_str("c").unwrap();

    prune::remove_folders(temp.path(), &patterns(&["**/docs"])).unwrap();

    temp.child("docs").assert(predicate::path::missing());
    temp.child("src/docs").assert(predicate::path::missing());
    temp.child("src/lib/c.js").assert(predicate::path::exists());
}

#[test]
fn remove_folders_counts_patterns_inside_removed_folders() {
    let temp = TempDir::new().unwrap();
    temp.child("docs/api/index.md").write_str("api").unwrap();
    temp.child("docs/guide.md").write_str("guide").unwrap();
    temp.child("docsite/keep.md").write_str("keep").unwrap();

    let pruned = prune::remove_folders(temp.path(), &patterns(&["docs", "docs/api"])).unwrap();

    let paths: Vec<String> =
        pruned.removed.iter().map(|folder| folder.path.display().to_string()).collect();
    assert_eq!(paths, vec!["docs"]);
    assert!(pruned.unmatched.is_empty());
    temp.child("docs").assert(predicate::path::missing());
    temp.child("docsite/keep.md").assert(predicate::path::exists());
}

#[test]
fn invalid_folder_pattern_is_an_error() {
    let temp = TempDir::new().unwrap();
    let err = prune::remove_folders(temp.path(), &patterns(&["src/[z-a]"])).unwrap_err();
    assert!(matches!(err, AppError::Glob(_)));
}

#[test]
fn strip_keys_removes_nested_sections_and_keeps_order() {
    let temp = TempDir::new().unwrap();
    let file = temp.child("config.json");
    file.write_str(
        r#"{"zeta":1,"frontend":{"cdn":"x"},"api":{"url":"u","debug":{"token":"t"}},"alpha":2}"#,
    )
    .unwrap();

    let removed = json_config::strip_keys(
        file.path(),
        &patterns(&["frontend", "api.debug.token", "api.absent", "nothing.here"]),
    )
    .unwrap();
    assert_eq!(removed, vec!["frontend", "api.debug.token"]);

    let contents = std::fs::read_to_string(file.path()).unwrap();
    assert!(contents.ends_with('\n'));
    let value: serde_json::Value = serde_json::from_str(&contents).unwrap();
    assert_eq!(value, json!({"zeta": 1, "api": {"url": "u", "debug": {}}, "alpha": 2}));
    let keys: Vec<&String> = value.as_object().unwrap().keys().collect();
    assert_eq!(keys, vec!["zeta", "api", "alpha"]);
}

#[test]
fn strip_keys_prefers_literal_dotted_key() {
    let temp = TempDir::new().unwrap();
    let file = temp.child("config.json");
    file.write_str(r#"{"feature.flag":true,"feature":{"flag":false}}"#).unwrap();

    json_config::strip_keys(file.path(), &patterns(&["feature.flag"])).unwrap();

    let value: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(file.path()).unwrap()).unwrap();
    assert_eq!(value, json!({"feature": {"flag": false}}));
}

#[test]
fn strip_keys_errors() {
    let temp = TempDir::new().unwrap();

    let missing = temp.path().join("absent.json");
    let err = json_config::strip_keys(&missing, &patterns(&["a"])).unwrap_err();
    assert!(matches!(err, AppError::MissingFile(_)));

    let list = temp.child("list.json");
    list.write_str("[1, 2]").unwrap();
    let err = json_config::strip_keys(list.path(), &patterns(&["a"])).unwrap_err();
    assert!(matches!(err, AppError::InvalidJson { .. }));

    let broken = temp.child("broken.json");
    broken.write_str("{ not json").unwrap();
    let err = json_config::strip_keys(broken.path(), &patterns(&["a"])).unwrap_err();
    assert!(matches!(err, AppError::InvalidJson { .. }));
}

#[test]
fn thin_drops_dev_and_named_dependencies() {
    let mut value = json!({
        "name": "service",
        "dependencies": {"lodash": "^4", "aws-sdk": "^2"},
        "optionalDependencies": {"fsevents": "^2"},
        "devDependencies": {"jest": "^29", "eslint": "^9"}
    });

    let thinned = manifest::thin(&mut value, &patterns(&["aws-sdk", "fsevents", "left-pad"]));

    assert_eq!(thinned.dev_dependencies, vec!["jest", "eslint"]);
    assert_eq!(thinned.dependencies, vec!["aws-sdk", "fsevents"]);
    assert_eq!(
        value,
        json!({
            "name": "service",
            "dependencies": {"lodash": "^4"},
            "optionalDependencies": {}
        })
    );
}

#[test]
fn stage_copies_thinned_manifest_and_lock_files() {
    let project = TempDir::new().unwrap();
    project
        .child("package.json")
        .write_str(r#"{"dependencies":{"a":"1","b":"2"},"devDependencies":{"c":"3"}}"#)
        .unwrap();
    project.child("package-lock.json").write_str("{\"lockfileVersion\":3}").unwrap();
    let workdir = TempDir::new().unwrap();

    let thinned = manifest::stage(project.path(), workdir.path(), &patterns(&["b"])).unwrap();
    assert_eq!(thinned.dependencies, vec!["b"]);

    let staged: serde_json::Value = serde_json::from_str(
        &std::fs::read_to_string(workdir.child("package.json").path()).unwrap(),
    )
    .unwrap();
    assert_eq!(staged, json!({"dependencies": {"a": "1"}}));
    workdir.child("package-lock.json").assert("{\"lockfileVersion\":3}");
    workdir.child("npm-shrinkwrap.json").assert(predicate::path::missing());
    // The project's own manifest is untouched.
    project.child("package.json").assert(predicate::str::contains("devDependencies"));
}

#[test]
fn stage_requires_manifest() {
    let project = TempDir::new().unwrap();
    let workdir = TempDir::new().unwrap();

    let err = manifest::stage(project.path(), workdir.path(), &[]).unwrap_err();
    assert!(matches!(err, AppError::MissingManifest(_)));
}

#[cfg(unix)]
#[test]
fn cleanup_removes_manifests_and_linked_packages() {
    use std::os::unix::fs::symlink;

    let local = TempDir::new().unwrap();
    local.child("cli.js").write_str("cli").unwrap();

    let workdir = TempDir::new().unwrap();
    workdir.child("package.json").write_str("{}").unwrap();
    workdir.child("package-lock.json").write_str("{}").unwrap();
    workdir.child("node_modules/.package-lock.json").write_str("{}").unwrap();
    workdir.child("node_modules/real/index.js").write_str("real").unwrap();
    workdir.child("node_modules/@scope/real/index.js").write_str("real").unwrap();
    workdir.child("node_modules/.bin").create_dir_all().unwrap();
    let node_modules = workdir.path().join("node_modules");
    symlink(local.path(), node_modules.join("linked")).unwrap();
    symlink(local.path(), node_modules.join("@scope/linked")).unwrap();
    symlink("../linked/cli.js", node_modules.join(".bin/linked")).unwrap();
    symlink("../real/index.js", node_modules.join(".bin/real")).unwrap();

    let mut removed: Vec<String> = manifest::cleanup(workdir.path())
        .unwrap()
        .iter()
        .map(|path| path.display().to_string())
        .collect();
    removed.sort();

    assert_eq!(
        removed,
        vec![
            "node_modules/.bin/linked",
            "node_modules/.package-lock.json",
            "node_modules/@scope/linked",
            "node_modules/linked",
            "package-lock.json",
            "package.json",
        ]
    );
    workdir.child("node_modules/real/index.js").assert(predicate::path::exists());
    workdir.child("node_modules/@scope/real/index.js").assert(predicate::path::exists());
    assert!(node_modules.join(".bin/real").symlink_metadata().is_ok());
    // The linked package's source is never followed.
    local.child("cli.js").assert(predicate::path::exists());
}
