use site_push_core::generate::{generate_candidates, GenerateOptions};
use site_push_core::history::PushHistory;
use site_push_core::site_url::SiteUrl;
use std::fs::{create_dir_all, write};
use std::path::Path;
use tempfile::tempdir;

fn touch(root: &Path, relative: &str) {
    let path = root.join(relative);
    if let Some(parent) = path.parent() {
        create_dir_all(parent).unwrap();
    }
    write(path, "# post\n").unwrap();
}

fn site() -> SiteUrl {
    SiteUrl::new("https://x").unwrap()
}

#[test]
fn test_filters_urls_already_in_history() {
    let dir = tempdir().expect("temp dir");
    touch(dir.path(), "a.md");
    touch(dir.path(), "b.md");

    let history: PushHistory = vec!["https://x/posts/a".to_string()].into_iter().collect();
    let batch = generate_candidates(&GenerateOptions::new(dir.path()), &site(), &history)
        .expect("generation should succeed");

    assert_eq!(batch.urls, vec!["https://x/posts/b".to_string()]);
    assert_eq!(batch.discovered, 2);
    assert_eq!(batch.filtered, 1);
}

#[test]
fn test_discovered_count_matches_content_files_only() {
    let dir = tempdir().expect("temp dir");
    touch(dir.path(), "one.md");
    touch(dir.path(), "nested/two.md");
    touch(dir.path(), "nested/deeper/three.md");
    touch(dir.path(), "nested/cover.png");
    touch(dir.path(), "README.txt");
    create_dir_all(dir.path().join("folder.md")).unwrap();

    let batch = generate_candidates(
        &GenerateOptions::new(dir.path()),
        &site(),
        &PushHistory::new(),
    )
    .expect("generation should succeed");

    assert_eq!(batch.discovered, 3, "only regular .md files count");
    assert_eq!(batch.discovered, batch.urls.len() + batch.filtered);
    assert!(batch.urls.contains(&"https://x/posts/nested/deeper/three".to_string()));
}

#[test]
fn test_generation_is_idempotent_and_does_not_touch_history() {
    let dir = tempdir().expect("temp dir");
    touch(dir.path(), "2024/hello.md");
    touch(dir.path(), "2024/world.md");
    touch(dir.path(), "about.md");

    let history: PushHistory = vec!["https://x/posts/about".to_string()].into_iter().collect();
    let before = history.clone();
    let options = GenerateOptions::new(dir.path());

    let first = generate_candidates(&options, &site(), &history).unwrap();
    let second = generate_candidates(&options, &site(), &history).unwrap();

    assert_eq!(first, second);
    assert_eq!(history, before);
    assert_eq!(
        first.urls,
        vec![
            "https://x/posts/2024/hello".to_string(),
            "https://x/posts/2024/world".to_string(),
        ]
    );
}

#[test]
fn test_empty_and_missing_content_roots_yield_empty_batch() {
    let dir = tempdir().expect("temp dir");

    let empty = generate_candidates(&GenerateOptions::new(dir.path()), &site(), &PushHistory::new())
        .expect("empty tree is fine");
    assert!(empty.is_empty());
    assert_eq!(empty.discovered, 0);

    let missing = generate_candidates(
        &GenerateOptions::new(dir.path().join("does-not-exist")),
        &site(),
        &PushHistory::new(),
    )
    .expect("missing tree is treated as empty");
    assert!(missing.is_empty());
}

#[test]
fn test_custom_extension_and_prefix() {
    let dir = tempdir().expect("temp dir");
    touch(dir.path(), "guide.mdx");
    touch(dir.path(), "ignored.md");

    let options = GenerateOptions {
        content_dir: dir.path().to_path_buf(),
        extension: "mdx".to_string(),
        url_prefix: "docs".to_string(),
    };
    let batch = generate_candidates(&options, &site(), &PushHistory::new()).unwrap();
    assert_eq!(batch.urls, vec!["https://x/docs/guide".to_string()]);
}

#[cfg(unix)]
#[test]
fn test_symlinked_posts_are_discovered() {
    let dir = tempdir().expect("temp dir");
    let shared = tempdir().expect("shared dir");
    touch(dir.path(), "real.md");
    touch(shared.path(), "shared.md");
    std::os::unix::fs::symlink(shared.path().join("shared.md"), dir.path().join("shared.md"))
        .unwrap();

    let batch = generate_candidates(
        &GenerateOptions::new(dir.path()),
        &site(),
        &PushHistory::new(),
    )
    .expect("generation should succeed");

    assert_eq!(batch.discovered, 2, "a symlinked post is still a post");
    assert_eq!(
        batch.urls,
        vec![
            "https://x/posts/real".to_string(),
            "https://x/posts/shared".to_string(),
        ]
    );
}

#[test]
fn test_content_root_pointing_at_a_file_yields_empty_batch() {
    let dir = tempdir().expect("temp dir");
    touch(dir.path(), "post.md");

    let batch = generate_candidates(
        &GenerateOptions::new(dir.path().join("post.md")),
        &site(),
        &PushHistory::new(),
    )
    .expect("a file root is treated as an empty tree");

    assert!(batch.is_empty(), "got {:?}", batch.urls);
    assert_eq!(batch.discovered, 0);
    assert!(!batch.urls.iter().any(|url| url.ends_with("/posts/")));
}
