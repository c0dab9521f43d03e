use encoding_rs::Encoding;
use std::io::Read;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::info;

use super::{MessagePool, MessageRecord};

/// Header columns the message file must provide.
const REQUIRED_COLUMNS: [&str; 3] = ["title", "message", "final"];

#[derive(Error, Debug)]
pub enum LoadError {
    #[error("Failed to read message file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Message file {path} is not valid {encoding}")]
    Decode { path: PathBuf, encoding: &'static str },
    #[error("Message file is missing required column `{0}`")]
    MissingColumn(&'static str),
    #[error("Malformed message file: {0}")]
    Csv(#[from] csv::Error),
    #[error("Message file contains no records")]
    Empty,
}

/// Reads and decodes the message file, then parses it into a pool.
pub fn load(path: &Path, encoding: &'static Encoding) -> Result<MessagePool, LoadError> {
    let bytes = std::fs::read(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let (text, _, had_errors) = encoding.decode(&bytes);
    if had_errors {
        return Err(LoadError::Decode {
            path: path.to_path_buf(),
            encoding: encoding.name(),
        });
    }

    let pool = from_reader(text.as_bytes())?;
    info!(
        "Loaded {} messages from {:?} ({})",
        pool.len(),
        path,
        encoding.name()
    );
    Ok(pool)
}

/// Parses UTF-8 CSV with a `title,message,final` header. Values are kept verbatim.
pub fn from_reader<R: Read>(reader: R) -> Result<MessagePool, LoadError> {
    let mut rdr = csv::Reader::from_reader(reader);

    let headers = rdr.headers()?.clone();
    for column in REQUIRED_COLUMNS {
        if !headers.iter().any(|h| h == column) {
            return Err(LoadError::MissingColumn(column));
        }
    }

    let records = rdr
        .deserialize::<MessageRecord>()
        .collect::<Result<Vec<_>, _>>()?;

    MessagePool::new(records)
}
