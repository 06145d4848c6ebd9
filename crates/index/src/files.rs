use std::fs;
use std::path::Path;

use crate::{faiss, npy, FlatIpIndex, IndexError};

/// Loads the index/id file pair, refusing anything that looks missing or corrupt.
pub fn load_pair(
    index_path: &Path,
    ids_path: &Path,
    min_index_bytes: u64,
) -> Result<(FlatIpIndex, Vec<i64>), IndexError> {
    let size = file_size(index_path)?;
    if size < min_index_bytes {
        return Err(IndexError::TooSmall {
            path: index_path.to_path_buf(),
            size,
            min: min_index_bytes,
        });
    }
    file_size(ids_path)?;

    let flat = faiss::read_flat_ip(index_path)?;
    let ids = npy::read_ids(ids_path)?;
    if ids.is_empty() {
        return Err(IndexError::EmptyIds(ids_path.to_path_buf()));
    }
    if ids.len() != flat.len() {
        return Err(IndexError::CountMismatch {
            vectors: flat.len(),
            ids: ids.len(),
        });
    }
    Ok((flat, ids))
}

/// Writes the pair in the formats [`load_pair`] reads.
pub fn write_pair(
    index_path: &Path,
    ids_path: &Path,
    flat: &FlatIpIndex,
    ids: &[i64],
) -> Result<(), IndexError> {
    if ids.len() != flat.len() {
        return Err(IndexError::CountMismatch {
            vectors: flat.len(),
            ids: ids.len(),
        });
    }
    for path in [index_path, ids_path] {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| IndexError::io(parent, e))?;
        }
    }
    faiss::write_flat_ip(index_path, flat)?;
    npy::write_ids(ids_path, ids)
}

fn file_size(path: &Path) -> Result<u64, IndexError> {
    match fs::metadata(path) {
        Ok(meta) => Ok(meta.len()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            Err(IndexError::MissingFile(path.to_path_buf()))
        }
        Err(e) => Err(IndexError::io(path, e)),
    }
}
