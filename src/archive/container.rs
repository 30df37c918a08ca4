// Random-access zip container reader.
//
// A `Container` reads the central directory once when opened and keeps an
// eager, stable entry list. Entry data is never loaded up front: each entry
// is opened on demand as a decompressing reader that borrows the container.
// The underlying file handle is owned by the container and released on drop.

use std::fs::File;
use std::io::{self, BufReader, Read, Seek};
use std::path::{Path, PathBuf};

use zip::ZipArchive;
use zip::result::ZipError;

const BUF_SIZE: usize = 64 * 1024; // 64 KiB

// ---------------------------------------------------------------------------
// Entry
// ---------------------------------------------------------------------------

/// One named entry of a container, as listed in the central directory.
///
/// Size and CRC are informational; comparisons always read the entry data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    /// Position in the container's central directory.
    pub index: usize,
    /// Archive-relative path, forward-slash separated.
    pub name: String,
    /// Uncompressed size in bytes.
    pub size: u64,
    /// Stored (compressed) size in bytes.
    pub compressed_size: u64,
    /// CRC-32 recorded in the central directory.
    pub crc32: u32,
}

impl AsRef<str> for Entry {
    fn as_ref(&self) -> &str {
        &self.name
    }
}

// ---------------------------------------------------------------------------
// Container
// ---------------------------------------------------------------------------

/// An opened zip container (APK or AAB).
pub struct Container<R: Read + Seek = BufReader<File>> {
    label: String,
    archive: ZipArchive<R>,
    entries: Vec<Entry>,
}

impl Container {
    /// Open the container at `path`.
    ///
    /// Fails with [`ContainerError::Open`] when the file cannot be opened and
    /// [`ContainerError::InvalidArchive`] when it is not a readable zip file.
    pub fn open(path: &Path) -> Result<Self, ContainerError> {
        let file = File::open(path).map_err(|source| ContainerError::Open {
            path: path.to_path_buf(),
            source,
        })?;
        let reader = BufReader::with_capacity(BUF_SIZE, file);
        Self::from_reader(reader, path.display().to_string())
    }
}

impl<R: Read + Seek> Container<R> {
    /// Build a container over any seekable reader. `label` names the
    /// container in errors and log output.
    pub fn from_reader(reader: R, label: impl Into<String>) -> Result<Self, ContainerError> {
        let label = label.into();
        let mut archive = ZipArchive::new(reader).map_err(|source| {
            ContainerError::InvalidArchive {
                label: label.clone(),
                source,
            }
        })?;

        let mut entries = Vec::with_capacity(archive.len());
        for index in 0..archive.len() {
            let file = archive
                .by_index_raw(index)
                .map_err(|source| ContainerError::InvalidArchive {
                    label: label.clone(),
                    source,
                })?;
            entries.push(Entry {
                index,
                name: file.name().to_owned(),
                size: file.size(),
                compressed_size: file.compressed_size(),
                crc32: file.crc32(),
            });
        }

        log::debug!("{label}: {} entries", entries.len());

        Ok(Self {
            label,
            archive,
            entries,
        })
    }

    /// Human-readable name of this container (usually its path).
    pub fn label(&self) -> &str {
        &self.label
    }

    /// All entries in central-directory order. Stable for the container's
    /// lifetime.
    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the container has no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Open `entry` for reading its decompressed bytes.
    ///
    /// Inconsistent central-directory metadata fails here with
    /// [`ContainerError::EntryRead`]. Corrupt entry data is reported by the
    /// returned reader as an `io::Error` (the CRC is verified at end of
    /// stream).
    pub fn open_entry(&mut self, entry: &Entry) -> Result<impl Read + '_, ContainerError> {
        self.archive
            .by_index(entry.index)
            .map_err(|e| ContainerError::EntryRead {
                name: entry.name.clone(),
                source: zip_to_io(e),
            })
    }
}

impl<R: Read + Seek> std::fmt::Debug for Container<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Container")
            .field("label", &self.label)
            .field("entries", &self.entries.len())
            .finish()
    }
}

fn zip_to_io(e: ZipError) -> io::Error {
    match e {
        ZipError::Io(e) => e,
        other => io::Error::new(io::ErrorKind::InvalidData, other),
    }
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Errors raised while opening a container or one of its entries.
#[derive(Debug, thiserror::Error)]
pub enum ContainerError {
    /// The container file could not be opened.
    #[error("cannot open {}: {source}", path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    /// The file is not a valid zip archive.
    #[error("{label}: not a valid archive: {source}")]
    InvalidArchive {
        label: String,
        #[source]
        source: ZipError,
    },
    /// An entry's metadata or data could not be read.
    #[error("entry {name}: {source}")]
    EntryRead {
        name: String,
        #[source]
        source: io::Error,
    },
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Cursor, Write};
    use zip::ZipWriter;
    use zip::write::SimpleFileOptions;

    fn build_zip(files: &[(&str, &[u8])]) -> Vec<u8> {
        let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
        let opts = SimpleFileOptions::default();
        for (name, data) in files {
            writer.start_file(*name, opts).unwrap();
            writer.write_all(data).unwrap();
        }
        writer.finish().unwrap().into_inner()
    }

    #[test]
    fn lists_entries_in_directory_order() {
        let bytes = build_zip(&[("classes.dex", b"dex"), ("lib/x.so", b"elf!")]);
        let container = Container::from_reader(Cursor::new(bytes), "mem").unwrap();

        let names: Vec<_> = container.entries().iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, ["classes.dex", "lib/x.so"]);
        assert_eq!(container.entries()[1].size, 4);
        assert_eq!(container.entries()[1].index, 1);
        assert_eq!(container.len(), 2);
    }

    #[test]
    fn entry_list_is_stable() {
        let bytes = build_zip(&[("a", b"1"), ("b", b"2")]);
        let mut container = Container::from_reader(Cursor::new(bytes), "mem").unwrap();
        let before = container.entries().to_vec();

        let entry = container.entries()[1].clone();
        let mut data = Vec::new();
        container
            .open_entry(&entry)
            .unwrap()
            .read_to_end(&mut data)
            .unwrap();

        assert_eq!(data, b"2");
        assert_eq!(container.entries(), before.as_slice());
    }

    #[test]
    fn open_entry_reads_deflated_data() {
        let payload = vec![0x5Au8; 10_000];
        let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
        let opts =
            SimpleFileOptions::default().compression_method(zip::CompressionMethod::Deflated);
        writer.start_file("assets/blob", opts).unwrap();
        writer.write_all(&payload).unwrap();
        let bytes = writer.finish().unwrap().into_inner();

        let mut container = Container::from_reader(Cursor::new(bytes), "mem").unwrap();
        let entry = container.entries()[0].clone();
        assert!(entry.compressed_size < entry.size);

        let mut data = Vec::new();
        container
            .open_entry(&entry)
            .unwrap()
            .read_to_end(&mut data)
            .unwrap();
        assert_eq!(data, payload);
    }

    #[test]
    fn rejects_non_archive() {
        let err = Container::from_reader(Cursor::new(b"not a zip".to_vec()), "junk").unwrap_err();
        assert!(matches!(err, ContainerError::InvalidArchive { .. }));
        assert!(err.to_string().starts_with("junk:"));
    }

    #[test]
    fn missing_file_is_open_error() {
        let err = Container::open(Path::new("/nonexistent/apkdiff/missing.apk")).unwrap_err();
        assert!(matches!(err, ContainerError::Open { .. }));
    }

    #[test]
    fn out_of_range_entry_is_read_error() {
        let bytes = build_zip(&[("a", b"1")]);
        let mut container = Container::from_reader(Cursor::new(bytes), "mem").unwrap();
        let bogus = Entry {
            index: 7,
            name: "ghost".into(),
            size: 0,
            compressed_size: 0,
            crc32: 0,
        };
        let err = container.open_entry(&bogus).err().unwrap();
        assert!(matches!(err, ContainerError::EntryRead { ref name, .. } if name == "ghost"));
    }
}
