//! Minimal NumPy `.npy` support for the 1-D id array written next to the index.

use std::fs;
use std::path::Path;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::IndexError;

const MAGIC: &[u8; 6] = b"\x93NUMPY";

static DESCR: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"['"]descr['"]\s*:\s*['"]([<>|=]?)([iu])([1248])['"]"#).expect("descr regex"));
static FORTRAN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"['"]fortran_order['"]\s*:\s*(True|False)"#).expect("fortran regex"));
static SHAPE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"['"]shape['"]\s*:\s*\(\s*(\d+)\s*,?\s*\)"#).expect("shape regex"));

/// Reads a 1-D little-endian integer array (`<i8`, `<i4`, `<u8`, `<u4`, ...) as `i64`.
pub fn read_ids(path: &Path) -> Result<Vec<i64>, IndexError> {
    let bytes = fs::read(path).map_err(|e| IndexError::io(path, e))?;
    parse_ids(&bytes)
}

/// Writes `ids` as a version 1.0 `<i8` array.
pub fn write_ids(path: &Path, ids: &[i64]) -> Result<(), IndexError> {
    fs::write(path, encode_ids(ids)).map_err(|e| IndexError::io(path, e))
}

pub fn parse_ids(bytes: &[u8]) -> Result<Vec<i64>, IndexError> {
    if bytes.len() < 10 || &bytes[..6] != MAGIC {
        return Err(IndexError::Format("not a .npy file".into()));
    }
    let major = bytes[6];
    let (header_len, header_start) = match major {
        1 => (u16::from_le_bytes([bytes[8], bytes[9]]) as usize, 10),
        2 | 3 => {
            let raw = bytes
                .get(8..12)
                .ok_or_else(|| IndexError::Format(".npy header is truncated".into()))?;
            (u32::from_le_bytes([raw[0], raw[1], raw[2], raw[3]]) as usize, 12)
        }
        other => {
            return Err(IndexError::Format(format!(
                "unsupported .npy version {other}"
            )))
        }
    };
    let body_start = header_start + header_len;
    let header = bytes
        .get(header_start..body_start)
        .ok_or_else(|| IndexError::Format(".npy header is truncated".into()))?;
    let header = std::str::from_utf8(header)
        .map_err(|_| IndexError::Format(".npy header is not text".into()))?;

    let descr = DESCR
        .captures(header)
        .ok_or_else(|| IndexError::Format(format!("unsupported dtype in header {header:?}")))?;
    if &descr[1] == ">" {
        return Err(IndexError::Format("big-endian id arrays are not supported".into()));
    }
    let signed = &descr[2] == "i";
    let width: usize = descr[3]
        .parse()
        .map_err(|_| IndexError::Format("bad dtype width".into()))?;
    if width != 4 && width != 8 {
        return Err(IndexError::Format(format!(
            "id dtype must be 4 or 8 bytes wide, got {width}"
        )));
    }

    if FORTRAN.captures(header).is_none() {
        return Err(IndexError::Format("header lacks fortran_order".into()));
    }
    let len: usize = SHAPE
        .captures(header)
        .and_then(|c| c[1].parse().ok())
        .ok_or_else(|| IndexError::Format("id array must be one-dimensional".into()))?;

    let body = &bytes[body_start..];
    let needed = len
        .checked_mul(width)
        .ok_or_else(|| IndexError::Format("id array too large".into()))?;
    if body.len() < needed {
        return Err(IndexError::Format(format!(
            "id array holds {} bytes, shape needs {needed}",
            body.len()
        )));
    }

    body[..needed]
        .chunks_exact(width)
        .map(|chunk| decode_id(chunk, signed))
        .collect()
}

fn decode_id(chunk: &[u8], signed: bool) -> Result<i64, IndexError> {
    match (chunk.len(), signed) {
        (4, true) => Ok(i32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]) as i64),
        (4, false) => Ok(u32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]) as i64),
        (8, signed) => {
            let mut raw = [0u8; 8];
            raw.copy_from_slice(chunk);
            if signed {
                Ok(i64::from_le_bytes(raw))
            } else {
                i64::try_from(u64::from_le_bytes(raw))
                    .map_err(|_| IndexError::Format("id exceeds i64 range".into()))
            }
        }
        _ => Err(IndexError::Format("bad id width".into())),
    }
}

pub fn encode_ids(ids: &[i64]) -> Vec<u8> {
    let mut header = format!(
        "{{'descr': '<i8', 'fortran_order': False, 'shape': ({},), }}",
        ids.len()
    );
    // Magic, version and length take 10 bytes; the header ends in '\n' and
    // pads the preamble to a multiple of 64.
    let unpadded = 10 + header.len() + 1;
    let padding = (64 - unpadded % 64) % 64;
    header.extend(std::iter::repeat_n(' ', padding));
    header.push('\n');

    let mut out = Vec::with_capacity(10 + header.len() + ids.len() * 8);
    out.extend_from_slice(MAGIC);
    out.extend_from_slice(&[1, 0]);
    out.extend_from_slice(&(header.len() as u16).to_le_bytes());
    out.extend_from_slice(header.as_bytes());
    for id in ids {
        out.extend_from_slice(&id.to_le_bytes());
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn npy(version: u8, header: &str, body: &[u8]) -> Vec<u8> {
        let mut out = MAGIC.to_vec();
        out.extend_from_slice(&[version, 0]);
        if version == 1 {
            out.extend_from_slice(&(header.len() as u16).to_le_bytes());
        } else {
            out.extend_from_slice(&(header.len() as u32).to_le_bytes());
        }
        out.extend_from_slice(header.as_bytes());
        out.extend_from_slice(body);
        out
    }

    #[test]
    fn encoded_header_is_aligned() {
        let bytes = encode_ids(&[7, 8, 9]);
        let header_len = u16::from_le_bytes([bytes[8], bytes[9]]) as usize;
        assert_eq!((10 + header_len) % 64, 0);
        assert_eq!(bytes[10 + header_len - 1], b'\n');
        assert_eq!(bytes.len(), 10 + header_len + 24);
        assert_eq!(parse_ids(&bytes).unwrap(), vec![7, 8, 9]);
    }

    #[test]
    fn reads_int32_and_unsigned() {
        let body: Vec<u8> = [5i32, -2, 40].iter().flat_map(|v| v.to_le_bytes()).collect();
        let bytes = npy(1, "{'descr': '<i4', 'fortran_order': False, 'shape': (3,), }\n", &body);
        assert_eq!(parse_ids(&bytes).unwrap(), vec![5, -2, 40]);

        let body: Vec<u8> = [11u64, 12].iter().flat_map(|v| v.to_le_bytes()).collect();
        let bytes = npy(2, "{'descr': '<u8', 'fortran_order': False, 'shape': (2,), }\n", &body);
        assert_eq!(parse_ids(&bytes).unwrap(), vec![11, 12]);
    }

    #[test]
    fn rejects_multidimensional_and_float() {
        let bytes = npy(1, "{'descr': '<i8', 'fortran_order': False, 'shape': (2, 3), }\n", &[0; 48]);
        assert!(parse_ids(&bytes).is_err());

        let bytes = npy(1, "{'descr': '<f4', 'fortran_order': False, 'shape': (2,), }\n", &[0; 8]);
        assert!(parse_ids(&bytes).is_err());
    }

    #[test]
    fn rejects_short_body_and_bad_magic() {
        let bytes = npy(1, "{'descr': '<i8', 'fortran_order': False, 'shape': (4,), }\n", &[0; 16]);
        assert!(matches!(parse_ids(&bytes), Err(IndexError::Format(_))));
        assert!(parse_ids(b"PK\x03\x04 zip archive").is_err());
    }

    #[test]
    fn empty_array_parses() {
        assert!(parse_ids(&encode_ids(&[])).unwrap().is_empty());
    }

    #[test]
    fn big_unsigned_ids_overflow() {
        let body = u64::MAX.to_le_bytes();
        let bytes = npy(1, "{'descr': '<u8', 'fortran_order': False, 'shape': (1,), }\n", &body);
        assert!(parse_ids(&bytes).is_err());
    }
}
