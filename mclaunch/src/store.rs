//! Document store, filesystem and JSON primitives shared by the pipeline.
//!
//! Creation helpers follow a check-then-act contract: the existence check is done
//! just before the creation, failures are logged and the caller continues.

use std::io::{self, BufReader};
use std::fs::{self, File};
use std::path::Path;

use serde::de::DeserializeOwned;


/// Error type when parsing a JSON document.
pub type JsonError = serde_path_to_error::Error<serde_json::Error>;

/// Create the given directory and its parents if not existing. Failures are logged and
/// false is returned.
pub fn ensure_dir(dir: &Path) -> bool {

    if dir.is_dir() {
        return true;
    }

    match fs::create_dir_all(dir) {
        Ok(()) => true,
        Err(e) => {
            log::warn!("create dir: {}: {e}", dir.display());
            false
        }
    }

}

/// Create the parent directory of the given file, if any.
pub fn ensure_parent_dir(file: &Path) -> bool {
    match file.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => ensure_dir(parent),
        _ => true,
    }
}

/// Create an empty file if not already existing. Failures are logged and false is
/// returned.
pub fn ensure_file(file: &Path) -> bool {

    if file.exists() {
        return true;
    }

    match File::create(file) {
        Ok(_) => true,
        Err(e) => {
            log::warn!("create file: {}: {e}", file.display());
            false
        }
    }

}

/// Write the whole content to the file, logging any failure.
pub fn write_file(file: &Path, contents: &[u8]) -> bool {
    match fs::write(file, contents) {
        Ok(()) => true,
        Err(e) => {
            log::warn!("write file: {}: {e}", file.display());
            false
        }
    }
}

/// Parse a JSON document from raw bytes, errors give the path to the invalid field.
pub fn parse_json<T: DeserializeOwned>(bytes: &[u8]) -> Result<T, JsonError> {
    let mut deserializer = serde_json::Deserializer::from_slice(bytes);
    serde_path_to_error::deserialize(&mut deserializer)
}

/// Error when reading and parsing a JSON file.
#[derive(Debug)]
pub enum ReadJsonError {
    Io(io::Error),
    Json(JsonError),
}

/// Read and parse a JSON document from a file.
pub fn read_json<T: DeserializeOwned>(file: &Path) -> Result<T, ReadJsonError> {
    let reader = BufReader::new(File::open(file).map_err(ReadJsonError::Io)?);
    let mut deserializer = serde_json::Deserializer::from_reader(reader);
    serde_path_to_error::deserialize(&mut deserializer).map_err(ReadJsonError::Json)
}
