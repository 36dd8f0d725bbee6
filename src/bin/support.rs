//! File-level helpers behind the `gzs` command line.

use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};

use stream::{GzFile, OpenMode};
use tracing::debug;

/// Suffix that marks a file as compressed.
pub const SUFFIX: &str = "gz";

/// What [`transform`] decided to do with a file.
#[derive(Debug, Eq, PartialEq)]
pub enum Outcome {
    /// The file was compressed into the returned path.
    Compressed(PathBuf),
    /// The file was decompressed into the returned path.
    Decompressed(PathBuf),
}

/// Compresses or decompresses `path`, choosing the direction from its
/// extension: `*.gz` is decompressed to the stem, anything else is
/// compressed to `<path>.gz`. The source file is removed afterwards unless
/// `keep` is set.
pub fn transform(path: &Path, keep: bool) -> io::Result<Outcome> {
    let outcome = if path.extension().is_some_and(|ext| ext == SUFFIX) {
        let target = path.with_extension("");
        debug!(source = %path.display(), dest = %target.display(), "decompress");
        decompress_file(path, &target)?;
        Outcome::Decompressed(target)
    } else {
        let mut name = path.as_os_str().to_os_string();
        name.push(".");
        name.push(SUFFIX);
        let target = PathBuf::from(name);
        debug!(source = %path.display(), dest = %target.display(), "compress");
        compress_file(path, &target)?;
        Outcome::Compressed(target)
    };

    if !keep {
        std::fs::remove_file(path)?;
    }
    Ok(outcome)
}

/// Compresses `source` into the gzip file `target`, returning the number of
/// plaintext bytes processed.
pub fn compress_file(source: &Path, target: &Path) -> io::Result<u64> {
    let mut input = File::open(source)?;
    let mut output = GzFile::open_path(0, target, OpenMode::WRITE | OpenMode::BINARY)?;

    let copied = io::copy(&mut input, &mut output)?;
    output.final_flush()?;
    debug!(
        plain = copied,
        compressed = output.stream().total_compressed_out(),
        "compression finished"
    );
    output.close();
    Ok(copied)
}

/// Decompresses the gzip file `source` into `target`, returning the number
/// of plaintext bytes recovered.
pub fn decompress_file(source: &Path, target: &Path) -> io::Result<u64> {
    let mut input = GzFile::open_path(0, source, OpenMode::READ | OpenMode::BINARY)?;
    let mut output = File::create(target)?;

    let copied = io::copy(&mut input, &mut output)?;
    debug!(
        compressed = input.stream().total_compressed_in(),
        plain = copied,
        "decompression finished"
    );
    input.close();
    Ok(copied)
}
