use super::r#trait::relative_string;
use super::{FileSystem, FileType, WalkEntry, WalkOptions, WalkOutput};
use anyhow::{anyhow, Result};
use std::collections::HashMap;
use std::path::{Component, Path, PathBuf};
use std::sync::RwLock;

#[derive(Debug, Clone)]
pub struct MockEntry {
    pub content: Option<Vec<u8>>,
    pub file_type: FileType,
}

/// In-memory file system. A file entry without content models a file that
/// exists but cannot be read (e.g. permission denied).
pub struct MockFileSystem {
    files: RwLock<HashMap<PathBuf, MockEntry>>,
    root: PathBuf,
}

impl MockFileSystem {
    pub fn new() -> Self {
        Self::with_root(PathBuf::from("/mock"))
    }

    pub fn with_root(root: PathBuf) -> Self {
        let fs = Self {
            files: RwLock::new(HashMap::new()),
            root: root.clone(),
        };
        fs.add_dir(&root);
        fs
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn add_file(&self, path: impl AsRef<Path>, content: &str) {
        self.insert_file(path.as_ref(), Some(content.as_bytes().to_vec()));
    }

    pub fn add_binary(&self, path: impl AsRef<Path>, content: &[u8]) {
        self.insert_file(path.as_ref(), Some(content.to_vec()));
    }

    pub fn add_unreadable(&self, path: impl AsRef<Path>) {
        self.insert_file(path.as_ref(), None);
    }

    pub fn add_dir(&self, path: impl AsRef<Path>) {
        let path = self.normalize_path(path.as_ref());
        let mut files = self.files.write().unwrap();
        Self::ensure_parents(&mut files, &path);
    }

    /// Content of a file previously added or written, as lossy UTF-8
    pub fn contents(&self, path: impl AsRef<Path>) -> Option<String> {
        let path = self.normalize_path(path.as_ref());
        self.files
            .read()
            .unwrap()
            .get(&path)
            .and_then(|e| e.content.as_ref())
            .map(|c| String::from_utf8_lossy(c).into_owned())
    }

    fn insert_file(&self, path: &Path, content: Option<Vec<u8>>) {
        let path = self.normalize_path(path);
        let mut files = self.files.write().unwrap();

        if let Some(parent) = path.parent() {
            Self::ensure_parents(&mut files, parent);
        }

        files.insert(
            path,
            MockEntry {
                content,
                file_type: FileType::File,
            },
        );
    }

    fn normalize_path(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.root.join(path)
        }
    }

    fn ensure_parents(files: &mut HashMap<PathBuf, MockEntry>, path: &Path) {
        let mut current = PathBuf::new();
        for component in path.components() {
            current.push(component);
            files.entry(current.clone()).or_insert(MockEntry {
                content: None,
                file_type: FileType::Directory,
            });
        }
    }

    fn entry_type(&self, path: &Path) -> Option<FileType> {
        let path = self.normalize_path(path);
        self.files.read().unwrap().get(&path).map(|e| e.file_type)
    }
}

impl Default for MockFileSystem {
    fn default() -> Self {
        Self::new()
    }
}

impl FileSystem for MockFileSystem {
    fn exists(&self, path: &Path) -> bool {
        self.entry_type(path).is_some()
    }

    fn is_dir(&self, path: &Path) -> bool {
        self.entry_type(path) == Some(FileType::Directory)
    }

    fn is_file(&self, path: &Path) -> bool {
        self.entry_type(path) == Some(FileType::File)
    }

    fn read_to_string(&self, path: &Path) -> Result<String> {
        let bytes = self.read_bytes(path, usize::MAX)?;
        String::from_utf8(bytes).map_err(|e| anyhow!("Invalid UTF-8 in {:?}: {}", path, e))
    }

    fn read_bytes(&self, path: &Path, max_bytes: usize) -> Result<Vec<u8>> {
        let path = self.normalize_path(path);
        let files = self.files.read().unwrap();
        let entry = files
            .get(&path)
            .ok_or_else(|| anyhow!("File not found: {:?}", path))?;

        if entry.file_type != FileType::File {
            return Err(anyhow!("Not a file: {:?}", path));
        }

        let content = entry
            .content
            .as_ref()
            .ok_or_else(|| anyhow!("Permission denied: {:?}", path))?;
        Ok(content[..content.len().min(max_bytes)].to_vec())
    }

    fn canonicalize(&self, path: &Path) -> Result<PathBuf> {
        let normalized = self.normalize_path(path);
        if self.files.read().unwrap().contains_key(&normalized) {
            Ok(normalized)
        } else {
            Err(anyhow!("Path not found: {:?}", path))
        }
    }

    fn walk(&self, root: &Path, options: &WalkOptions) -> Result<WalkOutput> {
        let root = self.normalize_path(root);
        if !self.is_dir(&root) {
            return Err(anyhow!("Directory not found: {:?}", root));
        }

        let files = self.files.read().unwrap();
        let mut entries = Vec::new();

        for (path, entry) in files.iter() {
            if entry.file_type != FileType::File {
                continue;
            }
            let Ok(relative) = path.strip_prefix(&root) else {
                continue;
            };
            if options.excluded_paths.iter().any(|p| path.starts_with(p)) {
                continue;
            }

            let components: Vec<Component> = relative.components().collect();
            let depth = components.len();
            if depth == 0 || depth > options.max_depth {
                continue;
            }
            let in_excluded_dir = components[..depth - 1].iter().any(|c| {
                let name = c.as_os_str().to_string_lossy();
                options.excluded_dirs.iter().any(|d| *d == name)
            });
            if in_excluded_dir {
                continue;
            }

            entries.push(WalkEntry {
                path: path.clone(),
                relative: relative_string(relative),
                depth,
            });
        }

        entries.sort_by(|a, b| a.relative.cmp(&b.relative));
        Ok(WalkOutput {
            entries,
            failures: Vec::new(),
        })
    }

    fn create_dir_all(&self, path: &Path) -> Result<()> {
        let path = self.normalize_path(path);
        if self.is_file(&path) {
            return Err(anyhow!("File exists: {:?}", path));
        }
        let mut files = self.files.write().unwrap();
        Self::ensure_parents(&mut files, &path);
        Ok(())
    }

    fn write(&self, path: &Path, contents: &[u8]) -> Result<()> {
        if self.is_dir(path) {
            return Err(anyhow!("Is a directory: {:?}", path));
        }
        self.insert_file(path, Some(contents.to_vec()));
        Ok(())
    }
}
