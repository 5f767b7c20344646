//! Manifest loading.

use std::fs::File;
use std::io::{BufRead, BufReader, Lines};
use std::path::{Path, PathBuf};

use clipset_models::ClipSpec;

use crate::error::{WorkerError, WorkerResult};

/// Lazy reader over a manifest file.
///
/// Yields one [`ClipSpec`] per non-empty line, in file order. Re-opening
/// the same file yields the same sequence, so a run can always be
/// restarted against its manifest.
pub struct ManifestReader {
    path: PathBuf,
    lines: Lines<BufReader<File>>,
    line_no: usize,
}

impl ManifestReader {
    /// Open a manifest for reading. An unreadable path is a fatal error.
    pub fn open(path: impl AsRef<Path>) -> WorkerResult<Self> {
        let path = path.as_ref().to_path_buf();
        let file = File::open(&path)?;
        Ok(Self {
            path,
            lines: BufReader::new(file).lines(),
            line_no: 0,
        })
    }
}

impl Iterator for ManifestReader {
    type Item = WorkerResult<ClipSpec>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let line = match self.lines.next()? {
                Ok(line) => line,
                Err(e) => return Some(Err(e.into())),
            };
            self.line_no += 1;
            if line.trim().is_empty() {
                continue;
            }
            return Some(ClipSpec::parse_line(&line).map_err(|source| {
                WorkerError::MalformedRecord {
                    path: self.path.clone(),
                    line: self.line_no,
                    source,
                }
            }));
        }
    }
}

/// Read a whole manifest, failing fast on the first malformed record.
pub fn load_manifest(path: impl AsRef<Path>) -> WorkerResult<Vec<ClipSpec>> {
    ManifestReader::open(path)?.collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn manifest(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_load_manifest() {
        let file = manifest(
            "cliqA,720,1280,30,90,100,50,600,400\n\
             cliqB,720,1280,0,10,0,0,1280,720\n",
        );
        let specs = load_manifest(file.path()).unwrap();
        assert_eq!(specs.len(), 2);
        assert_eq!(specs[0].source_id, "cliqA");
        assert_eq!(specs[1].source_id, "cliqB");
    }

    #[test]
    fn test_blank_lines_are_skipped() {
        let file = manifest("\ncliqA,720,1280,30,90,100,50,600,400\n\n");
        let specs = load_manifest(file.path()).unwrap();
        assert_eq!(specs.len(), 1);
    }

    #[test]
    fn test_malformed_record_aborts_with_line_number() {
        let file = manifest(
            "cliqA,720,1280,30,90,100,50,600,400\n\
             cliqB,720,1280,90,30,100,50,600,400\n",
        );
        let err = load_manifest(file.path()).unwrap_err();
        match err {
            WorkerError::MalformedRecord { line, .. } => assert_eq!(line, 2),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_reader_is_restartable() {
        let file = manifest("cliqA,720,1280,30,90,100,50,600,400\n");
        let first: Vec<_> = ManifestReader::open(file.path())
            .unwrap()
            .collect::<WorkerResult<_>>()
            .unwrap();
        let second: Vec<_> = ManifestReader::open(file.path())
            .unwrap()
            .collect::<WorkerResult<_>>()
            .unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_missing_manifest_is_fatal() {
        assert!(load_manifest("/nonexistent/manifest.txt").is_err());
    }
}
