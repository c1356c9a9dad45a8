//! Whole-file reads into allocator-backed arrays.

use std::{fs::File, io::Read, path::Path};

use crate::{
    array::Array,
    error::Result,
    mem_allocator::{Allocator, prelude::ctx_alloc},
};

pub fn read_bytes(path: impl AsRef<Path>) -> Result<Array<'static, u8>> {
    read_bytes_in(path, ctx_alloc())
}

/// Reads the whole file into an array allocated from `alloc`.
///
/// Running out of memory is reported as an error rather than failing.
pub fn read_bytes_in<'a>(path: impl AsRef<Path>, alloc: Allocator<'a>) -> Result<Array<'a, u8>> {
    let path = path.as_ref();
    let mut file = File::open(path)?;
    let len = usize::try_from(file.metadata()?.len()).unwrap_or(usize::MAX);

    let mut bytes = Array::new_in(alloc);
    bytes.try_reserve(len)?;
    bytes.resize(len);
    file.read_exact(&mut bytes)?;

    tracing::trace!(path = %path.display(), len, "read file");
    Ok(bytes)
}

pub fn read_string(path: impl AsRef<Path>) -> Result<Array<'static, u8>> {
    read_string_in(path, ctx_alloc())
}

/// Like [`read_bytes_in`], additionally checking that the contents are UTF-8.
pub fn read_string_in<'a>(path: impl AsRef<Path>, alloc: Allocator<'a>) -> Result<Array<'a, u8>> {
    let bytes = read_bytes_in(path, alloc)?;
    bytes.to_str()?;
    Ok(bytes)
}
