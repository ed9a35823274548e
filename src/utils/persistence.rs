use std::{
    fs::{self, File},
    io::{self, Write},
    path::{Path, PathBuf},
};

const TMP_SUFFIX: &str = "tmp";

/// Replaces `path` with `data` by staging to a temporary sibling and renaming.
///
/// On failure the previous contents of `path` are left untouched.
pub fn replace_atomic(path: &Path, data: &str) -> io::Result<()> {
    let tmp = tmp_path(path);
    write_staged(&tmp, data)?;
    fs::rename(&tmp, path)
}

/// Temporary sibling used while staging writes, e.g. `tables.json.tmp`.
pub fn tmp_path(path: &Path) -> PathBuf {
    let mut tmp = path.to_path_buf();
    let ext = match path.extension().and_then(|ext| ext.to_str()) {
        Some(existing) => format!("{}.{}", existing, TMP_SUFFIX),
        None => TMP_SUFFIX.to_string(),
    };
    tmp.set_extension(ext);
    tmp
}

/// Reads a file, treating a missing or whitespace-only file as absent.
pub fn read_if_present(path: &Path) -> io::Result<Option<String>> {
    match fs::read_to_string(path) {
        Ok(data) if data.trim().is_empty() => Ok(None),
        Ok(data) => Ok(Some(data)),
        Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
        Err(err) => Err(err),
    }
}

fn write_staged(path: &Path, data: &str) -> io::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let mut file = File::create(path)?;
    file.write_all(data.as_bytes())?;
    file.flush()
}
