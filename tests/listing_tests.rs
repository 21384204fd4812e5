use quickfiler::core::fm::{CopyOptions, DeleteOptions, Stat};
use quickfiler::core::oracle::IgnoreOracle;
use quickfiler::core::{
    CancelToken, FileSystem, GitignoreOracle, ItemKind, ListItem, ListingRequest, LocalFs,
    QueryOptions, ResultCache, Resolver, Workspace, WorkspaceFolder,
};
use quickfiler::error::Result;
use std::error;
use std::ffi::OsString;
use std::fs::{self, File};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tempfile::tempdir;

/// [LocalFs] counting the searches and directory reads that reach it.
#[derive(Default)]
struct CountingFs {
    searches: AtomicUsize,
    reads: AtomicUsize,
}

impl CountingFs {
    fn searches(&self) -> usize {
        self.searches.load(Ordering::SeqCst)
    }

    fn reads(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }
}

impl FileSystem for CountingFs {
    fn stat(&self, path: &Path) -> Result<Stat> {
        LocalFs.stat(path)
    }

    fn list_entries(&self, dir: &Path) -> Result<Vec<OsString>> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        LocalFs.list_entries(dir)
    }

    fn search(
        &self,
        root: &Path,
        pattern: &str,
        exclude: Option<&str>,
        max_results: usize,
        cancel: &CancelToken,
    ) -> Result<Vec<PathBuf>> {
        self.searches.fetch_add(1, Ordering::SeqCst);
        LocalFs.search(root, pattern, exclude, max_results, cancel)
    }

    fn exists(&self, path: &Path) -> bool {
        LocalFs.exists(path)
    }

    fn write_file(&self, path: &Path, contents: &[u8]) -> Result<()> {
        LocalFs.write_file(path, contents)
    }

    fn create_dir(&self, path: &Path) -> Result<()> {
        LocalFs.create_dir(path)
    }

    fn rename(&self, from: &Path, to: &Path) -> Result<()> {
        LocalFs.rename(from, to)
    }

    fn delete(&self, path: &Path, options: DeleteOptions) -> Result<()> {
        LocalFs.delete(path, options)
    }

    fn copy(&self, src: &Path, dst: &Path, options: CopyOptions) -> Result<()> {
        LocalFs.copy(src, dst, options)
    }
}

fn labels(items: &[ListItem]) -> Vec<String> {
    items.iter().map(ListItem::label).collect()
}

fn entry_paths(items: &[ListItem]) -> Vec<PathBuf> {
    items
        .iter()
        .filter_map(ListItem::entry_path)
        .map(Path::to_path_buf)
        .collect()
}

#[test]
fn cache_hit_performs_no_searches() -> std::result::Result<(), Box<dyn error::Error>> {
    let dir = tempdir()?;
    File::create(dir.path().join("main.rs"))?;
    let fs = Arc::new(CountingFs::default());
    let resolver = Resolver::new(fs.clone(), Arc::new(Workspace::single(dir.path())));
    let cache = ResultCache::new(Duration::from_secs(60), 8);
    let request = ListingRequest::new(Some(dir.path().to_path_buf())).with_query("main");
    let cancel = CancelToken::new();

    let first = cache.get_or_resolve(&resolver, &request, &cancel)?;
    assert_eq!(fs.searches(), 2);
    assert_eq!(fs.reads(), 1);

    let second = cache.get_or_resolve(&resolver, &request, &cancel)?;
    assert!(Arc::ptr_eq(&first, &second));
    assert_eq!(fs.searches(), 2);
    assert_eq!(fs.reads(), 1);

    // a different query is a different key
    let other = request.clone().with_query("lib");
    cache.get_or_resolve(&resolver, &other, &cancel)?;
    assert_eq!(fs.searches(), 4);

    cache.invalidate_all();
    cache.get_or_resolve(&resolver, &request, &cancel)?;
    assert_eq!(fs.searches(), 6);
    Ok(())
}

#[test]
fn directories_come_before_matching_files() -> std::result::Result<(), Box<dyn error::Error>> {
    let dir = tempdir()?;
    let root = dir.path();
    fs::create_dir_all(root.join("src/core"))?;
    fs::create_dir(root.join("docs"))?;
    File::create(root.join("README.md"))?;
    File::create(root.join("src/core/file_manager.rs"))?;
    File::create(root.join("src/other.rs"))?;

    let resolver = Resolver::new(Arc::new(LocalFs), Arc::new(Workspace::single(root)));
    let request = ListingRequest::new(Some(root.to_path_buf())).with_query("FileManager");
    let items = resolver.resolve(&request, &CancelToken::new())?;

    let kinds: Vec<ItemKind> = items.iter().map(ListItem::kind).collect();
    let last_dir = kinds.iter().rposition(|k| *k == ItemKind::Directory);
    let first_file = kinds.iter().position(|k| *k == ItemKind::File);
    assert!(last_dir.is_some() && last_dir < first_file);

    let names = labels(&items);
    assert!(names.contains(&"README.md".to_string()));
    assert!(names.contains(&"file_manager.rs".to_string()));
    assert!(!names.contains(&"other.rs".to_string()));
    Ok(())
}

#[test]
fn case_sensitive_query_drops_the_bracket_form() -> std::result::Result<(), Box<dyn error::Error>> {
    let dir = tempdir()?;
    let root = dir.path();
    fs::create_dir(root.join("nested"))?;
    File::create(root.join("nested/README.md"))?;
    File::create(root.join("nested/read_me.txt"))?;

    let resolver = Resolver::new(Arc::new(LocalFs), Arc::new(Workspace::single(root)));
    let request = ListingRequest::new(Some(root.to_path_buf())).with_query("ReadMe");

    let insensitive = labels(&resolver.resolve(&request, &CancelToken::new())?);
    assert!(insensitive.contains(&"README.md".to_string()));
    assert!(insensitive.contains(&"read_me.txt".to_string()));

    let sensitive = request.with_options(QueryOptions::new(true));
    let sensitive = labels(&resolver.resolve(&sensitive, &CancelToken::new())?);
    assert!(!sensitive.contains(&"README.md".to_string()));
    assert!(sensitive.contains(&"read_me.txt".to_string()));
    Ok(())
}

#[test]
fn workspace_view_concatenates_folders() -> std::result::Result<(), Box<dyn error::Error>> {
    let dir = tempdir()?;
    let one = dir.path().join("one");
    let two = dir.path().join("two");
    fs::create_dir_all(&one)?;
    fs::create_dir_all(&two)?;
    File::create(one.join("a.rs"))?;
    File::create(two.join("b.rs"))?;

    let workspace = Workspace::new(
        Some("multi".to_string()),
        vec![WorkspaceFolder::new(&one), WorkspaceFolder::new(&two)],
    );
    let resolver = Resolver::new(Arc::new(LocalFs), Arc::new(workspace));
    let cache = ResultCache::new(Duration::from_secs(60), 8);

    let items = cache.load_view(&resolver, &ListingRequest::new(None), &CancelToken::new())?;
    let names = labels(&items);
    let one_at = names.iter().position(|n| n == "ONE");
    let two_at = names.iter().position(|n| n == "TWO");
    assert!(one_at.is_some() && one_at < two_at);
    assert!(names.contains(&"a.rs".to_string()) && names.contains(&"b.rs".to_string()));
    // each folder is cached on its own
    assert_eq!(cache.len(), 2);
    Ok(())
}

#[test]
fn ignored_and_excluded_entries_are_dropped() -> std::result::Result<(), Box<dyn error::Error>> {
    let dir = tempdir()?;
    let root = dir.path();
    fs::write(root.join(".gitignore"), "target/\n*.log\n")?;
    for sub in ["src", "target", ".git"] {
        fs::create_dir(root.join(sub))?;
    }
    for file in [
        "main.rs",
        "app.log",
        "src/main.rs",
        "src/main.log",
        "target/main.rs",
        ".git/main.rs",
    ] {
        File::create(root.join(file))?;
    }

    let workspace = Arc::new(Workspace::single(root));
    let request = ListingRequest::new(Some(root.to_path_buf())).with_query("main");

    // without filters every entry is listed
    let plain = Resolver::new(Arc::new(LocalFs), Arc::clone(&workspace));
    let all = entry_paths(&plain.resolve(&request, &CancelToken::new())?);
    assert!(all.contains(&root.join("target")));
    assert!(all.contains(&root.join("target/main.rs")));
    assert!(all.contains(&root.join(".git/main.rs")));
    assert!(all.contains(&root.join("src/main.log")));

    let oracle = GitignoreOracle::from_workspace(&workspace);
    assert!(!oracle.is_empty());
    let filtered = Resolver::new(Arc::new(LocalFs), Arc::clone(&workspace))
        .with_oracle(Some(Arc::new(oracle) as Arc<dyn IgnoreOracle>))
        .with_exclude(Some("**/.git".to_string()));
    let items = filtered.resolve(&request, &CancelToken::new())?;
    let paths = entry_paths(&items);

    assert!(paths.contains(&root.join("src")));
    assert!(paths.contains(&root.join("main.rs")));
    assert!(paths.contains(&root.join("src/main.rs")));
    // ignored directory and its recursive match
    assert!(!paths.contains(&root.join("target")));
    assert!(!paths.contains(&root.join("target/main.rs")));
    // ignored files from the immediate listing and the recursive search
    assert!(!paths.contains(&root.join("app.log")));
    assert!(!paths.contains(&root.join("src/main.log")));
    // excluded at search level
    assert!(!paths.contains(&root.join(".git/main.rs")));

    let kinds: Vec<ItemKind> = items.iter().map(ListItem::kind).collect();
    let last_dir = kinds.iter().rposition(|k| *k == ItemKind::Directory);
    let first_file = kinds.iter().position(|k| *k == ItemKind::File);
    assert!(last_dir < first_file);
    Ok(())
}
