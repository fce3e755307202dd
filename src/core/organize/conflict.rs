//! Opt-in content comparison for name collisions.
//!
//! Only consulted after a skip has already been decided. It never changes
//! what happens to either file.

use std::fs::{self, File};
use std::io::{self, Read};
use std::path::Path;
use xxhash_rust::xxh3::Xxh3;

const CHUNK_SIZE: usize = 64 * 1024;

/// Check whether two files differ in content.
///
/// Sizes are compared first; only same-sized files are hashed.
pub fn contents_differ(a: &Path, b: &Path) -> io::Result<bool> {
    if fs::metadata(a)?.len() != fs::metadata(b)?.len() {
        return Ok(true);
    }
    Ok(content_hash(a)? != content_hash(b)?)
}

fn content_hash(path: &Path) -> io::Result<u64> {
    let mut file = File::open(path)?;
    let mut hasher = Xxh3::new();
    let mut buf = vec![0u8; CHUNK_SIZE];
    loop {
        let n = file.read(&mut buf)?;
        if n == 0 {
            break;
        }
        hasher.update(&buf[..n]);
    }
    Ok(hasher.digest())
}
