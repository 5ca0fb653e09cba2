//! The filesystem source provider, end to end against a real directory
//! layout: `<root>/<namespace>/<name>.<ext>`.

use std::fs;
use std::sync::Arc;

use tempfile::TempDir;

use quill::base::{DefKind, Descriptor, DescriptorFilter};
use quill::registry::{FsSource, ProviderSet, SourceProvider};
use quill::service::DefinitionService;

fn desc(qualified: &str, kind: DefKind) -> Descriptor {
    Descriptor::parse(qualified, kind).unwrap()
}

fn write_def(root: &TempDir, namespace: &str, file: &str, text: &str) {
    let dir = root.path().join(namespace);
    fs::create_dir_all(&dir).unwrap();
    fs::write(dir.join(file), text).unwrap();
}

#[test]
fn test_reads_application_from_directory() {
    let dir = TempDir::new().unwrap();
    write_def(&dir, "demo", "home.app", "<quill:application useAppcache='true'/>");

    let sources = FsSource::new(dir.path());
    let src = sources
        .get_source(&desc("demo:home", DefKind::Application))
        .unwrap();
    assert_eq!(&*src.text, "<quill:application useAppcache='true'/>");
    assert!(src.last_modified > 0);
}

#[test]
fn test_extension_encodes_kind() {
    let dir = TempDir::new().unwrap();
    write_def(&dir, "demo", "widget.cmp", "<quill:component/>");
    write_def(&dir, "demo", "widget.css", ".THIS{}");

    let sources = FsSource::new(dir.path());
    assert!(sources.exists(&desc("demo:widget", DefKind::Component)));
    assert!(sources.exists(&desc("demo:widget", DefKind::Style)));
    assert!(!sources.exists(&desc("demo:widget", DefKind::Theme)));
    // Providers have no backing files at all.
    assert!(!sources.exists(&desc("demo:widget", DefKind::Provider)));
}

#[test]
fn test_find_matches_across_namespaces() {
    let dir = TempDir::new().unwrap();
    write_def(&dir, "ui", "button.cmp", "<quill:component/>");
    write_def(&dir, "ui", "input.cmp", "<quill:component/>");
    write_def(&dir, "ui", "base.theme", "<quill:theme/>");
    write_def(&dir, "other", "thing.cmp", "<quill:component/>");

    let sources = FsSource::new(dir.path());
    let filter = DescriptorFilter::parse("ui:*", DefKind::Component).unwrap();
    let mut found = sources.find(&filter);
    found.sort();
    let names: Vec<_> = found.iter().map(|d| d.to_string()).collect();
    assert_eq!(names, ["ui:button", "ui:input"]);
}

#[test]
fn test_full_resolution_from_disk() {
    let dir = TempDir::new().unwrap();
    write_def(
        &dir,
        "demo",
        "base.app",
        "<quill:application useAppcache='true' extensible='true'/>",
    );
    write_def(
        &dir,
        "demo",
        "home.app",
        "<quill:application extends='demo:base'><demo:panel/></quill:application>",
    );
    write_def(&dir, "demo", "panel.cmp", "<quill:component/>");

    let service = DefinitionService::new(
        Arc::new(FsSource::new(dir.path())),
        Arc::new(ProviderSet::with_default()),
    );
    let home = desc("demo:home", DefKind::Application);
    let def = service.get_definition(&home).unwrap();
    assert!(def.appcache_enabled());
    service.validate_references(&home).unwrap();
}

#[test]
fn test_missing_file_is_not_found() {
    let dir = TempDir::new().unwrap();
    let service = DefinitionService::new(
        Arc::new(FsSource::new(dir.path())),
        Arc::new(ProviderSet::with_default()),
    );
    let err = service
        .get_definition(&desc("demo:ghost", DefKind::Application))
        .unwrap_err();
    assert_eq!(err.to_string(), "No APPLICATION named demo:ghost found");
}
