//! File manipulation utilities, including the binary encoding used for model
//! artifacts and the mtime scan used to resolve the latest one in a directory.

use std::fs;
use std::fs::File;
use std::io::Error;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{from_reader, to_writer_pretty};

/// Reads a JSON-encoded type from a given file `path`.
pub fn read_json<D: DeserializeOwned>(path: impl AsRef<Path>) -> Result<D, Error> {
    let file = File::open(path)?;
    Ok(from_reader(file)?)
}

// JSON-encodes the `value` in pretty-printed form and writes it to a given `path`.
pub fn write_json(path: impl AsRef<Path>, value: &impl Serialize) -> Result<(), Error> {
    let file = File::create(path)?;
    Ok(to_writer_pretty(file, value)?)
}

pub trait ReadJsonFile<D> {
    fn read_json_file(path: impl AsRef<Path>) -> Result<D, Error>;
}

impl<D: DeserializeOwned> ReadJsonFile<D> for D {
    fn read_json_file(path: impl AsRef<Path>) -> Result<D, Error> {
        read_json(path)
    }
}

pub trait WriteJsonFile<S: Serialize> {
    fn write_json_file(&self, path: impl AsRef<Path>) -> Result<(), Error>;
}

impl<S: Serialize> WriteJsonFile<S> for S {
    fn write_json_file(&self, path: impl AsRef<Path>) -> Result<(), Error> {
        write_json(path, self)
    }
}

/// Reads a bincode-encoded type from a given file `path`. Used for model
/// artifacts, which are retrained often enough that JSON's verbosity and
/// parse cost aren't worth paying.
pub fn read_bincode<D: DeserializeOwned>(path: impl AsRef<Path>) -> anyhow::Result<D> {
    let file = File::open(path)?;
    Ok(bincode::deserialize_from(file)?)
}

/// Bincode-encodes the `value` and writes it to a given `path`.
pub fn write_bincode(path: impl AsRef<Path>, value: &impl Serialize) -> anyhow::Result<()> {
    let file = File::create(path)?;
    bincode::serialize_into(file, value)?;
    Ok(())
}

/// Finds the most recently modified file in `dir` matching `extension_filter`,
/// returning `None` if the directory has no such file (or doesn't exist).
pub fn latest_by_mtime(
    dir: impl AsRef<Path>,
    mut extension_filter: impl FnMut(&Path) -> bool,
) -> Result<Option<PathBuf>, Error> {
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(err) => return Err(err),
    };

    let mut latest: Option<(PathBuf, std::time::SystemTime)> = None;
    for entry in entries {
        let entry = entry?;
        let path = entry.path();
        if !extension_filter(&path) {
            continue;
        }
        let modified = entry.metadata()?.modified()?;
        if latest.as_ref().map_or(true, |(_, mtime)| modified > *mtime) {
            latest = Some((path, modified));
        }
    }
    Ok(latest.map(|(path, _)| path))
}
