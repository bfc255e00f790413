use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::parser::Field;

/// Fatal outcomes of building a record. None of them touch the store.
#[derive(Debug, Error)]
pub enum IntakeError {
    #[error("missing required fields: {}", join(.missing))]
    Validation { missing: Vec<Field> },
    #[error("community already registered: {}", join(.conflicts))]
    Duplicate { conflicts: Vec<Conflict> },
    #[error("geocoding failed: {0}")]
    Geocode(#[from] GeocodeError),
    #[error("no id left after #{0}")]
    IdExhausted(u64),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Conflict {
    Name { existing_id: String, name: String },
    Logo { existing_id: String, file: String },
}

impl std::fmt::Display for Conflict {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Conflict::Name { existing_id, name } => {
                write!(f, "name matches #{} ({})", existing_id, name)
            }
            Conflict::Logo { existing_id, file } => {
                write!(f, "logo '{}' already used by #{}", file, existing_id)
            }
        }
    }
}

#[derive(Debug, Error)]
pub enum GeocodeError {
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("unexpected response: {0}")]
    Malformed(String),
}

/// Logo problems only downgrade the record to an empty `thumbnailUrl`.
#[derive(Debug, Error)]
pub enum LogoError {
    #[error("no image URL in logo answer")]
    NoUrl,
    #[error("community name yields an empty file name")]
    EmptySlug,
    #[error("fetch failed: {0}")]
    Fetch(#[from] reqwest::Error),
    #[error("fetch returned HTTP {0}")]
    Status(u16),
    #[error("could not decode or encode image: {0}")]
    Image(#[from] image::ImageError),
    #[error(transparent)]
    Io(#[from] io::Error),
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("cannot read {}: {source}", .path.display())]
    Read { path: PathBuf, source: io::Error },
    #[error("{} is not a valid record list: {source}", .path.display())]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error("cannot write {}: {source}", .path.display())]
    Write { path: PathBuf, source: io::Error },
    #[error("cannot serialize records: {0}")]
    Serialize(#[from] serde_json::Error),
}

fn join<T: std::fmt::Display>(items: &[T]) -> String {
    items
        .iter()
        .map(|i| i.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

// ── Tests ──
