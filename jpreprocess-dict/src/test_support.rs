//! Archive builders shared by unit tests.

use std::io::Write;

use flate2::write::GzEncoder;
use flate2::Compression;
use tar::{Builder, EntryType, Header};

use crate::fetch::{stream_to_temp, FetchError, FetchedArchive, NoProgress};

pub(crate) const TEST_URL: &str = "file:///test/naist-jdic-jpreprocess.tar.gz";

/// Gzip-compressed tar containing the given regular files.
pub(crate) fn archive_bytes(files: &[(&str, &[u8])]) -> Vec<u8> {
    let mut builder = Builder::new(GzEncoder::new(Vec::new(), Compression::default()));

    for (path, data) in files {
        let mut header = Header::new_gnu();
        header.set_size(data.len() as u64);
        header.set_mode(0o644);
        header.set_entry_type(EntryType::Regular);
        builder.append_data(&mut header, path, *data).unwrap();
    }

    builder.into_inner().unwrap().finish().unwrap()
}

/// Gzip-compressed tar with a single entry whose name is written verbatim,
/// bypassing the path checks `tar::Builder` applies.
pub(crate) fn raw_entry_archive(name: &str, entry_type: EntryType, data: &[u8]) -> Vec<u8> {
    let mut header = Header::new_old();
    header.as_old_mut().name[..name.len()].copy_from_slice(name.as_bytes());
    header.set_size(data.len() as u64);
    header.set_mode(0o644);
    header.set_entry_type(entry_type);
    if entry_type == EntryType::Symlink {
        header.set_link_name("target").unwrap();
    }
    header.set_cksum();

    let mut builder = Builder::new(Vec::new());
    builder.append(&header, data).unwrap();
    let tar = builder.into_inner().unwrap();

    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(&tar).unwrap();
    encoder.finish().unwrap()
}

/// Wrap raw bytes as a fetched archive.
pub(crate) fn fetched(bytes: &[u8]) -> FetchedArchive {
    stream_to_temp(bytes, TEST_URL, Some(bytes.len() as u64), &NoProgress, FetchError::Io).unwrap()
}
