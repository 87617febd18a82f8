use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Scoped storage area used to stage attachment bytes as files so they
/// can be referenced by path in multipart upload fields.
///
/// Staged files are transient: the transport deletes everything it
/// staged before a submission returns.
#[derive(Clone, Debug)]
pub struct Storage {
    root: PathBuf,
}

impl Storage {
    pub fn new<P: AsRef<Path>>(root: P) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Write `data` under `name` and return the absolute path of the
    /// written file. The root directory is created on demand, so a
    /// message without attachments never touches the filesystem.
    pub fn put(&self, name: &str, data: &[u8]) -> io::Result<PathBuf> {
        fs::create_dir_all(&self.root)?;

        let path = self.root.join(name);
        fs::write(&path, data)?;

        path.canonicalize()
    }

    pub fn exists(&self, name: &str) -> bool {
        self.root.join(name).exists()
    }

    pub fn delete(&self, name: &str) -> io::Result<()> {
        fs::remove_file(self.root.join(name))
    }
}

/// Build a collision-free staging name for an attachment, keeping the
/// original file extension. Uniqueness comes from a fresh token per
/// file, so concurrent submissions never collide.
pub fn unique_name(filename: &str) -> String {
    let token = uuid::Uuid::new_v4().simple().to_string();

    match Path::new(filename).extension().and_then(|e| e.to_str()) {
        Some(ext) => format!("{}.{}", token, ext),
        None => token,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_root(tag: &str) -> PathBuf {
        std::env::temp_dir().join(format!(
            "elastic-mail-test-{}-{}",
            tag,
            uuid::Uuid::new_v4().simple()
        ))
    }

    #[test]
    fn test_put_exists_delete() {
        let root = test_root("put");
        let storage = Storage::new(&root);

        let path = storage.put("a.txt", b"hello").unwrap();
        assert!(path.is_absolute());
        assert!(storage.exists("a.txt"));
        assert_eq!(fs::read(&path).unwrap(), b"hello");

        storage.delete("a.txt").unwrap();
        assert!(!storage.exists("a.txt"));

        fs::remove_dir_all(&root).unwrap();
    }

    #[test]
    fn test_put_fails_on_unwritable_root() {
        let root = test_root("unwritable");
        fs::write(&root, b"not a directory").unwrap();

        let storage = Storage::new(&root);
        let result = storage.put("a.txt", b"hello");
        assert!(result.is_err());

        fs::remove_file(&root).unwrap();
    }

    #[test]
    fn test_unique_name_keeps_extension() {
        let name = unique_name("report.pdf");
        assert!(name.ends_with(".pdf"));
        assert_eq!(name.len(), 32 + ".pdf".len());

        // Two names for the same file never collide
        assert_ne!(unique_name("report.pdf"), unique_name("report.pdf"));
    }

    #[test]
    fn test_unique_name_without_extension() {
        let name = unique_name("README");
        assert_eq!(name.len(), 32);
        assert!(!name.contains('.'));
    }
}
