use sca_lab_abstract::{RawRecordStore, STATISTICS_SCOPE, ScalarValue};
use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum TraceError {
    #[error("trace file {} not found or not readable", path.display())]
    NotFound {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to read trace file {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl TraceError {
    pub fn path(&self) -> &Path {
        match self {
            TraceError::NotFound { path, .. } | TraceError::Io { path, .. } => path,
        }
    }
}

/// One recognized statement of a scalar trace.
#[derive(Debug, Clone, PartialEq)]
pub enum TraceLine<'a> {
    /// `scalar <scope> <name> <value>`
    Scalar {
        scope: &'a str,
        name: &'a str,
        value: ScalarValue,
    },
    /// `field <name> <value>`, stored under the statistics scope
    Field { name: &'a str, value: ScalarValue },
}

/// Classify a single line. Anything that is not a complete `scalar` or `field`
/// statement yields `None`.
pub fn parse_line(line: &str) -> Option<TraceLine<'_>> {
    let mut tokens = line.split_whitespace();
    match tokens.next()? {
        "scalar" => {
            let scope = tokens.next()?;
            let name = tokens.next()?;
            let literal = tokens.next()?;
            Some(TraceLine::Scalar {
                scope,
                name,
                value: ScalarValue::coerce(literal),
            })
        }
        "field" => {
            let name = tokens.next()?;
            let literal = tokens.next()?;
            Some(TraceLine::Field {
                name,
                value: ScalarValue::coerce(literal),
            })
        }
        _ => None,
    }
}

/// Build a record store from any line source. Unrecognized lines are skipped.
pub fn parse_reader<R: BufRead>(reader: R) -> io::Result<RawRecordStore> {
    let mut store = RawRecordStore::new();
    let mut skipped = 0usize;

    for line in reader.lines() {
        let line = line?;
        match parse_line(line.trim()) {
            Some(TraceLine::Scalar { scope, name, value }) => store.insert(scope, name, value),
            Some(TraceLine::Field { name, value }) => store.insert(STATISTICS_SCOPE, name, value),
            None => skipped += 1,
        }
    }

    debug!("{} values kept, {} lines skipped", store.len(), skipped);
    Ok(store)
}

/// Parse one trace file into a fresh record store.
///
/// The file handle lives only for the duration of this call and is closed on every
/// return path.
pub fn parse_file(path: impl AsRef<Path>) -> Result<RawRecordStore, TraceError> {
    let path = path.as_ref();
    debug!("Parsing trace file {}", path.display());

    if !path.is_file() {
        return Err(TraceError::NotFound {
            path: path.to_path_buf(),
            source: io::Error::new(io::ErrorKind::NotFound, "no regular file at this path"),
        });
    }

    let file = File::open(path).map_err(|source| TraceError::NotFound {
        path: path.to_path_buf(),
        source,
    })?;

    parse_reader(BufReader::new(file)).map_err(|source| TraceError::Io {
        path: path.to_path_buf(),
        source,
    })
}
