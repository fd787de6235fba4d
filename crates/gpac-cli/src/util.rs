use std::{
    fs::{self, File},
    io::{self, BufWriter, Write as _},
    path::Path,
};

use anyhow::Context;

/// Creates `path` for writing, along with any missing parent directories.
pub fn create_file(file_kind: &str, path: &Path) -> anyhow::Result<BufWriter<File>> {
    if let Some(dir) = path.parent().filter(|dir| !dir.as_os_str().is_empty()) {
        fs::create_dir_all(dir).with_context(|| {
            format!("Failed to create directory for {file_kind} file: {}", dir.display())
        })?;
    }
    let file = File::create(path)
        .with_context(|| format!("Failed to create {file_kind} file: {}", path.display()))?;
    Ok(BufWriter::new(file))
}

pub fn save_json<T>(file_kind: &str, value: &T, path: &Path) -> anyhow::Result<()>
where
    T: serde::Serialize,
{
    let mut writer = create_file(file_kind, path)?;
    serde_json::to_writer_pretty(&mut writer, value)
        .with_context(|| format!("Failed to write {file_kind} JSON to {}", path.display()))?;
    writeln!(writer)
        .and_then(|()| writer.flush())
        .with_context(|| format!("Failed to flush {file_kind} file: {}", path.display()))?;
    Ok(())
}

pub fn read_json_file<T, P>(file_kind: &str, path: P) -> anyhow::Result<T>
where
    T: serde::de::DeserializeOwned,
    P: AsRef<Path>,
{
    let path = path.as_ref();
    let file = File::open(path)
        .with_context(|| format!("Failed to open {file_kind} file: {}", path.display()))?;

    let reader = io::BufReader::new(file);
    let value = serde_json::from_reader(reader)
        .with_context(|| format!("Failed to parse {file_kind} JSON file: {}", path.display()))?;

    Ok(value)
}
