//! Reader and writer for FAISS `IndexFlatIP` files (`faiss.write_index`).
//!
//! Layout, all little-endian:
//!
//! ```text
//! fourcc "IxFI"
//! d: i32, ntotal: i64, dummy: i64, dummy: i64, is_trained: u8, metric_type: i32
//! [metric_arg: f32]            only when metric_type > 1
//! n: u64, n * f32              row-major vectors, n == d * ntotal
//! ```

use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

use crate::{FlatIpIndex, IndexError};

const FOURCC_FLAT_IP: &[u8; 4] = b"IxFI";
const FOURCC_FLAT_L2: &[u8; 4] = b"IxF2";
const FOURCC_FLAT: &[u8; 4] = b"IxFl";
const METRIC_INNER_PRODUCT: i32 = 0;
const HEADER_DUMMY: i64 = 1 << 20;

pub fn read_flat_ip(path: &Path) -> Result<FlatIpIndex, IndexError> {
    let file = File::open(path).map_err(|e| IndexError::io(path, e))?;
    read_flat_ip_from(&mut BufReader::new(file)).map_err(|err| match err {
        IndexError::Io { source, .. } => IndexError::io(path, source),
        other => other,
    })
}

pub fn write_flat_ip(path: &Path, index: &FlatIpIndex) -> Result<(), IndexError> {
    let file = File::create(path).map_err(|e| IndexError::io(path, e))?;
    let mut writer = BufWriter::new(file);
    write_flat_ip_to(&mut writer, index)
        .and_then(|_| writer.flush())
        .map_err(|e| IndexError::io(path, e))
}

pub fn read_flat_ip_from<R: Read>(reader: &mut R) -> Result<FlatIpIndex, IndexError> {
    let fourcc: [u8; 4] = read_array(reader)?;
    match &fourcc {
        FOURCC_FLAT_IP => {}
        FOURCC_FLAT_L2 | FOURCC_FLAT => {
            return Err(IndexError::UnsupportedIndexType(format!(
                "{} (flat index with non inner-product metric)",
                String::from_utf8_lossy(&fourcc)
            )))
        }
        other => {
            return Err(IndexError::UnsupportedIndexType(
                String::from_utf8_lossy(other).into_owned(),
            ))
        }
    }

    let d = i32::from_le_bytes(read_array(reader)?);
    let ntotal = i64::from_le_bytes(read_array(reader)?);
    let _dummy: [u8; 16] = read_array(reader)?;
    let _is_trained: [u8; 1] = read_array(reader)?;
    let metric_type = i32::from_le_bytes(read_array(reader)?);
    if metric_type > 1 {
        let _metric_arg: [u8; 4] = read_array(reader)?;
    }

    if d <= 0 {
        return Err(IndexError::Format(format!("invalid dimension {d}")));
    }
    if ntotal < 0 {
        return Err(IndexError::Format(format!("invalid vector count {ntotal}")));
    }
    if metric_type != METRIC_INNER_PRODUCT {
        return Err(IndexError::Format(format!(
            "metric type {metric_type} is not inner product"
        )));
    }

    let count = u64::from_le_bytes(read_array(reader)?);
    let expected = (d as u64)
        .checked_mul(ntotal as u64)
        .ok_or_else(|| IndexError::Format("vector payload size overflows".into()))?;
    if count != expected {
        return Err(IndexError::Format(format!(
            "payload holds {count} floats, header implies {expected}"
        )));
    }

    let byte_len = usize::try_from(count)
        .ok()
        .and_then(|n| n.checked_mul(4))
        .ok_or_else(|| IndexError::Format("vector payload too large".into()))?;
    let mut bytes = vec![0u8; byte_len];
    reader.read_exact(&mut bytes).map_err(truncated)?;
    let data = bytes
        .chunks_exact(4)
        .map(|b| f32::from_le_bytes([b[0], b[1], b[2], b[3]]))
        .collect();

    FlatIpIndex::new(d as usize, data)
}

pub fn write_flat_ip_to<W: Write>(writer: &mut W, index: &FlatIpIndex) -> std::io::Result<()> {
    let d = i32::try_from(index.dimension())
        .map_err(|_| std::io::Error::other("dimension exceeds i32"))?;
    writer.write_all(FOURCC_FLAT_IP)?;
    writer.write_all(&d.to_le_bytes())?;
    writer.write_all(&(index.len() as i64).to_le_bytes())?;
    writer.write_all(&HEADER_DUMMY.to_le_bytes())?;
    writer.write_all(&HEADER_DUMMY.to_le_bytes())?;
    writer.write_all(&[1u8])?;
    writer.write_all(&METRIC_INNER_PRODUCT.to_le_bytes())?;
    writer.write_all(&(index.as_slice().len() as u64).to_le_bytes())?;
    for value in index.as_slice() {
        writer.write_all(&value.to_le_bytes())?;
    }
    Ok(())
}

fn read_array<R: Read, const N: usize>(reader: &mut R) -> Result<[u8; N], IndexError> {
    let mut buf = [0u8; N];
    reader.read_exact(&mut buf).map_err(truncated)?;
    Ok(buf)
}

fn truncated(err: std::io::Error) -> IndexError {
    if err.kind() == std::io::ErrorKind::UnexpectedEof {
        IndexError::Format("file is truncated".into())
    } else {
        IndexError::io("<faiss stream>", err)
    }
}
