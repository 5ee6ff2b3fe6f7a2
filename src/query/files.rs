//! Input and output file resolution for query directives.
use std::fmt;
use std::fs::{File, OpenOptions};
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::str::FromStr;

use encoding_rs::{Encoding, UTF_16BE, UTF_8};
use tracing::debug;

use crate::console::ConsoleIo;
use crate::error::{ConsoleError, Result};

/// Input files must be smaller than this many bytes.
pub const MAX_INPUT_BYTES: u64 = 1_000_000;

/// Character set of an input file, looked up by its WHATWG label.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Charset {
    encoding: &'static Encoding,
    sniff_bom: bool,
}

impl Charset {
    /// UTF-8, used when a directive names no charset.
    pub const UTF8: Charset = Charset {
        encoding: UTF_8,
        sniff_bom: false,
    };

    /// Underlying encoding.
    pub fn encoding(&self) -> &'static Encoding {
        self.encoding
    }

    /// Decodes `bytes`, replacing invalid sequences with U+FFFD.
    pub fn decode(&self, bytes: &[u8]) -> String {
        if self.sniff_bom {
            self.encoding.decode(bytes).0.into_owned()
        } else {
            self.encoding.decode_without_bom_handling(bytes).0.into_owned()
        }
    }
}

impl FromStr for Charset {
    type Err = ConsoleError;

    fn from_str(s: &str) -> Result<Self> {
        let label = s.trim();
        // bare UTF-16 is big endian unless a byte order mark says otherwise
        if label.eq_ignore_ascii_case("utf-16") || label.eq_ignore_ascii_case("utf16") {
            return Ok(Charset {
                encoding: UTF_16BE,
                sniff_bom: true,
            });
        }
        Encoding::for_label_no_replacement(label.as_bytes())
            .or_else(|| Encoding::for_label_no_replacement(label.replace('_', "-").as_bytes()))
            .map(|encoding| Charset {
                encoding,
                sniff_bom: false,
            })
            .ok_or_else(|| ConsoleError::InvalidCharset(s.to_string()))
    }
}

impl fmt::Display for Charset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.encoding.name())
    }
}

/// Resolves directive paths against the working directory.
#[derive(Clone, Debug)]
pub struct FileResolver {
    work_dir: PathBuf,
}

impl FileResolver {
    /// Resolver for relative paths under `work_dir`.
    pub fn new(work_dir: impl Into<PathBuf>) -> Self {
        Self {
            work_dir: work_dir.into(),
        }
    }

    /// Absolute form of `name`.
    pub fn resolve(&self, name: &str) -> Result<PathBuf> {
        if name.trim().is_empty() {
            return Err(ConsoleError::InvalidArgument("empty file name".into()));
        }
        let path = Path::new(name);
        Ok(if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.work_dir.join(path)
        })
    }

    /// Reads a query file, decoding it with `charset` (UTF-8 when `None`).
    pub fn resolve_input(&self, name: &str, charset: Option<&str>) -> Result<String> {
        let charset = match charset.filter(|c| !c.is_empty()) {
            Some(name) => name.parse::<Charset>()?,
            None => Charset::UTF8,
        };
        let path = self.resolve(name)?;
        let file = File::open(&path).map_err(|e| ConsoleError::io(&path, e))?;
        let meta = file.metadata().map_err(|e| ConsoleError::io(&path, e))?;
        if !meta.is_file() {
            return Err(ConsoleError::io(
                &path,
                io::Error::new(io::ErrorKind::InvalidInput, "not a regular file"),
            ));
        }
        if meta.len() >= MAX_INPUT_BYTES {
            return Err(ConsoleError::SizeLimitExceeded {
                path,
                size: meta.len(),
                limit: MAX_INPUT_BYTES,
            });
        }
        let mut bytes = Vec::with_capacity(meta.len() as usize);
        file.take(MAX_INPUT_BYTES)
            .read_to_end(&mut bytes)
            .map_err(|e| ConsoleError::io(&path, e))?;
        // the file may have grown since the metadata call
        if bytes.len() as u64 >= MAX_INPUT_BYTES {
            return Err(ConsoleError::SizeLimitExceeded {
                path,
                size: bytes.len() as u64,
                limit: MAX_INPUT_BYTES,
            });
        }
        debug!(path = %path.display(), %charset, bytes = bytes.len(), "read query file");
        Ok(charset.decode(&bytes))
    }

    /// Resolves an output path, asking before an existing file may be replaced.
    ///
    /// Nothing is created or truncated here; see [`OutputTarget::open`].
    pub fn resolve_output(&self, name: &str, io: &mut dyn ConsoleIo) -> Result<OutputTarget> {
        let path = self.resolve(name)?;
        if path.is_dir() {
            return Err(ConsoleError::io(
                &path,
                io::Error::new(io::ErrorKind::InvalidInput, "is a directory"),
            ));
        }
        let overwrite = path.exists();
        if overwrite && !io.confirm(&format!("File {} exists, overwrite?", path.display()), false) {
            return Err(ConsoleError::OutputRefused { path });
        }
        debug!(path = %path.display(), overwrite, "resolved output file");
        Ok(OutputTarget { path, overwrite })
    }
}

/// Output file chosen by a directive.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OutputTarget {
    /// Absolute path of the file.
    pub path: PathBuf,
    /// Whether the operator agreed to replace an existing file.
    pub overwrite: bool,
}

impl OutputTarget {
    /// Target for a file that must not exist yet.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            overwrite: false,
        }
    }

    /// Opens the file for writing.
    ///
    /// Without a confirmed overwrite the file is created exclusively, so a file
    /// that appeared after confirmation is refused rather than truncated.
    pub fn open(&self) -> Result<File> {
        let mut options = OpenOptions::new();
        options.write(true);
        if self.overwrite {
            options.create(true).truncate(true);
        } else {
            options.create_new(true);
        }
        options.open(&self.path).map_err(|e| match e.kind() {
            io::ErrorKind::AlreadyExists => ConsoleError::OutputRefused {
                path: self.path.clone(),
            },
            _ => ConsoleError::io(&self.path, e),
        })
    }
}
