//! Documents from files and directories on disk.

use docschema_profile::Document;
use std::fs::{self, File};
use std::io::BufReader;
use std::path::{Path, PathBuf};
use tracing::debug;
use walkdir::WalkDir;

use crate::reader::{InputFormat, JsonDocuments};
use crate::{SourceError, SourceOptions};

const JSON_EXTENSIONS: [&str; 3] = ["json", "jsonl", "ndjson"];

fn has_json_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| JSON_EXTENSIONS.iter().any(|e| ext.eq_ignore_ascii_case(e)))
}

fn is_json_lines(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("jsonl") || ext.eq_ignore_ascii_case("ndjson"))
}

/// Resolve inputs to an ordered list of files.
///
/// Files are taken as given, in argument order. Directories are walked
/// recursively for `.json`, `.jsonl` and `.ndjson` files, sorted by path.
pub fn collect_input_files<P: AsRef<Path>>(inputs: &[P]) -> Result<Vec<PathBuf>, SourceError> {
    let mut files = Vec::new();
    for input in inputs {
        let input = input.as_ref();
        let meta = fs::metadata(input).map_err(|source| SourceError::Io {
            origin: input.display().to_string(),
            source,
        })?;
        if !meta.is_dir() {
            files.push(input.to_path_buf());
            continue;
        }

        let mut found = Vec::new();
        for entry in WalkDir::new(input).sort_by_file_name() {
            let entry = entry?;
            if entry.file_type().is_file() && has_json_extension(entry.path()) {
                found.push(entry.into_path());
            }
        }
        if found.is_empty() {
            return Err(SourceError::NoInputs(input.display().to_string()));
        }
        files.extend(found);
    }
    Ok(files)
}

/// Chains the documents of several files, opening each one only when the
/// previous one is exhausted.
///
/// Stops after the first error. Build a new one for every pass over the
/// same inputs.
pub struct DocumentFiles {
    files: std::vec::IntoIter<PathBuf>,
    current: Option<JsonDocuments<BufReader<File>>>,
    options: SourceOptions,
    failed: bool,
}

impl DocumentFiles {
    pub fn open<P: AsRef<Path>>(inputs: &[P], options: SourceOptions) -> Result<Self, SourceError> {
        Ok(Self::from_files(collect_input_files(inputs)?, options))
    }

    pub fn from_files(files: Vec<PathBuf>, options: SourceOptions) -> Self {
        Self {
            files: files.into_iter(),
            current: None,
            options,
            failed: false,
        }
    }

    /// Files not yet opened.
    pub fn remaining_files(&self) -> &[PathBuf] {
        self.files.as_slice()
    }

    fn open_file(&self, path: &Path) -> Result<JsonDocuments<BufReader<File>>, SourceError> {
        let origin = path.display().to_string();
        let file = File::open(path).map_err(|source| SourceError::Io {
            origin: origin.clone(),
            source,
        })?;
        let format = match self.options.format {
            InputFormat::Auto if is_json_lines(path) => InputFormat::JsonLines,
            format => format,
        };
        debug!(file = %origin, ?format, "opening document file");
        JsonDocuments::new(
            BufReader::new(file),
            format,
            self.options.extended_json,
            origin,
        )
    }
}

impl Iterator for DocumentFiles {
    type Item = Result<Document, SourceError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if self.failed {
                return None;
            }
            if let Some(current) = self.current.as_mut() {
                match current.next() {
                    Some(Ok(doc)) => return Some(Ok(doc)),
                    Some(Err(e)) => {
                        self.failed = true;
                        return Some(Err(e));
                    }
                    None => self.current = None,
                }
            }

            let path = self.files.next()?;
            match self.open_file(&path) {
                Ok(docs) => self.current = Some(docs),
                Err(e) => {
                    self.failed = true;
                    return Some(Err(e));
                }
            }
        }
    }
}
