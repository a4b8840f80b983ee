//! Source preprocessing: `Include` splicing.
//!
//! A line of the form `Include "file.bb"` is replaced by the contents of that
//! file, preprocessed recursively. Files are read through a [`FileSystem`],
//! so the compiler itself never touches the disk unless it is handed a
//! [`DiskFileSystem`].
//!
//! A file that is missing, or that would include itself again through a
//! chain of includes, is reported and its line is left blank. Blank lines
//! keep the line numbers of the including file stable up to the first
//! include.

use std::collections::HashMap;
use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Read-only access to source files by name.
pub trait FileSystem {
    /// Returns the contents of `path`.
    fn read_file(&self, path: &str) -> io::Result<String>;
}

/// Files held in memory, keyed by name.
#[derive(Debug, Clone, Default)]
pub struct MemoryFileSystem {
    files: HashMap<String, String>,
}

impl MemoryFileSystem {
    /// Creates an empty file system.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds or replaces a file.
    pub fn insert(&mut self, path: &str, contents: &str) {
        self.files.insert(normalize(path), contents.to_string());
    }

    /// Builder form of [`insert`](Self::insert).
    pub fn with_file(mut self, path: &str, contents: &str) -> Self {
        self.insert(path, contents);
        self
    }
}

impl FileSystem for MemoryFileSystem {
    fn read_file(&self, path: &str) -> io::Result<String> {
        self.files
            .get(&normalize(path))
            .cloned()
            .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, path.to_string()))
    }
}

/// Files read from disk, relative to a root directory.
#[derive(Debug, Clone)]
pub struct DiskFileSystem {
    root: PathBuf,
}

impl DiskFileSystem {
    /// Resolves relative include paths against `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

impl FileSystem for DiskFileSystem {
    fn read_file(&self, path: &str) -> io::Result<String> {
        std::fs::read_to_string(self.root.join(path))
    }
}

/// A problem found while splicing includes.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum IncludeError {
    #[error("cannot include `{path}`: {reason}")]
    NotFound {
        path: String,
        reason: String,
        /// Line of the `Include` in the expanded source.
        line: usize,
    },

    #[error("`{path}` includes itself")]
    Cycle { path: String, line: usize },
}

impl IncludeError {
    /// Line of the offending `Include`.
    pub fn line(&self) -> usize {
        match self {
            IncludeError::NotFound { line, .. } | IncludeError::Cycle { line, .. } => *line,
        }
    }
}

/// Expands every `Include` in `source`.
///
/// Always returns the expanded text, together with every include problem.
pub fn preprocess(source: &str, fs: &dyn FileSystem) -> (String, Vec<IncludeError>) {
    let mut expander = Expander {
        fs,
        stack: Vec::new(),
        output: String::with_capacity(source.len()),
        line: 0,
        errors: Vec::new(),
    };
    expander.expand(source);
    log::debug!(
        "preprocessed {} bytes into {} bytes with {} include errors",
        source.len(),
        expander.output.len(),
        expander.errors.len()
    );
    (expander.output, expander.errors)
}

struct Expander<'a> {
    fs: &'a dyn FileSystem,
    /// Normalized names of the files being expanded, outermost first.
    stack: Vec<String>,
    output: String,
    /// Lines written so far.
    line: usize,
    errors: Vec<IncludeError>,
}

impl Expander<'_> {
    fn expand(&mut self, source: &str) {
        for text in source.lines() {
            match include_target(text) {
                Some(path) => self.include(path),
                None => self.push_line(text),
            }
        }
    }

    fn include(&mut self, path: &str) {
        let key = normalize(path);
        let line = self.line + 1;

        if self.stack.contains(&key) {
            self.errors.push(IncludeError::Cycle {
                path: path.to_string(),
                line,
            });
            self.push_line("");
            return;
        }

        match self.fs.read_file(path) {
            Ok(contents) => {
                self.stack.push(key);
                self.expand(&contents);
                self.stack.pop();
            }
            Err(e) => {
                self.errors.push(IncludeError::NotFound {
                    path: path.to_string(),
                    reason: e.to_string(),
                    line,
                });
                self.push_line("");
            }
        }
    }

    fn push_line(&mut self, text: &str) {
        self.output.push_str(text);
        self.output.push('\n');
        self.line += 1;
    }
}

/// Returns the quoted path if `line` is an `Include` line.
fn include_target(line: &str) -> Option<&str> {
    let trimmed = line.trim_start();
    let keyword = trimmed.get(..7)?;
    if !keyword.eq_ignore_ascii_case("include") {
        return None;
    }
    let rest = trimmed[7..].trim_start();
    let rest = rest.strip_prefix('"')?;
    let end = rest.find('"')?;
    Some(&rest[..end])
}

fn normalize(path: &str) -> String {
    path.replace('\\', "/").to_ascii_lowercase()
}
