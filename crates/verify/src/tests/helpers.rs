use anyhow::Result;
use record::{ByteOrder, RecordWriter};
use std::fs;
use std::path::{Path, PathBuf};

/// Writes `values` as a little-endian record file.
pub fn write_records(path: &Path, values: &[i64]) -> Result<()> {
    let mut w = RecordWriter::create(path, ByteOrder::Little)?;
    w.write_all(values.iter().copied())?;
    w.finish()?;
    Ok(())
}

/// Creates shard files under `dir` and a `names.txt` listing them.
/// Returns the manifest path.
pub fn write_dataset(dir: &Path, shards: &[(&str, &[i64])]) -> Result<PathBuf> {
    let mut names = Vec::with_capacity(shards.len());
    for (name, values) in shards {
        write_records(&dir.join(name), values)?;
        names.push(*name);
    }
    let manifest_path = dir.join("names.txt");
    manifest::write_manifest(&manifest_path, &names[..])?;
    Ok(manifest_path)
}

/// Concatenates and sorts every shard's values, as a correct merge would.
pub fn sorted_union(shards: &[(&str, &[i64])]) -> Vec<i64> {
    let mut all: Vec<i64> = shards.iter().flat_map(|(_, v)| v.iter().copied()).collect();
    all.sort_unstable();
    all
}

pub fn write_raw(path: &Path, bytes: &[u8]) -> Result<()> {
    fs::write(path, bytes)?;
    Ok(())
}
