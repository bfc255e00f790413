use std::sync::LazyLock;

use chrono::NaiveDate;
use regex::Regex;
use tracing::{info, warn};

use crate::error::{Conflict, IntakeError, LogoError};
use crate::geocode::Geocoder;
use crate::logo::LogoConverter;
use crate::parser::Submission;
use crate::record::{LatLon, Record};

/// Site-relative directory `thumbnailUrl` points into.
pub const THUMBNAIL_DIR: &str = "images";

static WHITESPACE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").unwrap());
static UNSAFE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[^A-Za-z0-9_-]").unwrap());

/// A new record plus the reason its logo was dropped, if it was.
#[derive(Debug)]
pub struct Built {
    pub record: Record,
    pub logo_warning: Option<LogoError>,
}

/// Turns one issue body into a record for the existing collection. Never writes
/// the store; the logo image is the only thing put on disk.
pub struct RecordBuilder<G, L> {
    geocoder: G,
    logos: L,
}

impl<G: Geocoder, L: LogoConverter> RecordBuilder<G, L> {
    pub fn new(geocoder: G, logos: L) -> Self {
        RecordBuilder { geocoder, logos }
    }

    pub async fn build(
        &self,
        body: &str,
        existing: &[Record],
        today: NaiveDate,
    ) -> Result<Built, IntakeError> {
        let submission = Submission::from_body(body);
        let id = check(&submission, existing)?;

        // Geocode before touching the images dir so a failure leaves nothing behind.
        let coordinates = self.geocoder.geocode(&submission.location).await?;
        if coordinates.is_none() {
            info!("No coordinates found for '{}'", submission.location);
        }

        let (thumbnail_url, logo_warning) = match self.convert_logo(&submission).await {
            Ok(path) => (path.unwrap_or_default(), None),
            Err(e) => {
                warn!("Logo for '{}' skipped: {}", submission.name, e);
                (String::new(), Some(e))
            }
        };

        let record = Record {
            id,
            name: submission.name,
            status: submission.status,
            last_reviewed: review_date(today),
            community_type: submission.community_type,
            event_format: submission.event_format,
            location: submission.location,
            topics: submission.topics,
            contact_info: submission.contact_info,
            community_url: submission.community_url,
            thumbnail_url,
            lat_lon: LatLon::from(coordinates),
            extra: serde_json::Map::new(),
        };
        info!("Built record #{} '{}'", record.id, record.name);
        Ok(Built {
            record,
            logo_warning,
        })
    }

    #[cfg(test)]
    pub fn geocoder(&self) -> &G {
        &self.geocoder
    }

    #[cfg(test)]
    pub fn logos(&self) -> &L {
        &self.logos
    }

    /// Delete the image a built record points at. Used when the record never
    /// made it into the store.
    pub fn discard_logo(&self, record: &Record) {
        let prefix = format!("{}/", THUMBNAIL_DIR);
        let Some(file_name) = record.thumbnail_url.strip_prefix(&prefix) else {
            return;
        };
        if file_name.is_empty() {
            return;
        }
        if let Err(e) = self.logos.discard(file_name) {
            warn!("Could not remove orphaned logo {}: {}", file_name, e);
        }
    }

    /// `Ok(None)` when the form left the logo blank.
    async fn convert_logo(&self, submission: &Submission) -> Result<Option<String>, LogoError> {
        if submission.logo.is_empty() {
            return Ok(None);
        }
        let url = submission.logo_url().ok_or(LogoError::NoUrl)?;
        let file_name = thumbnail_file(submission).ok_or(LogoError::EmptySlug)?;
        self.logos.convert(url, &file_name).await?;
        Ok(Some(format!("{}/{}", THUMBNAIL_DIR, file_name)))
    }
}

/// Validation, duplicate detection and id allocation. Returns the id the
/// submission would get.
pub fn check(submission: &Submission, existing: &[Record]) -> Result<String, IntakeError> {
    let missing = submission.missing_required();
    if !missing.is_empty() {
        return Err(IntakeError::Validation { missing });
    }
    let conflicts = find_duplicates(submission, existing);
    if !conflicts.is_empty() {
        return Err(IntakeError::Duplicate { conflicts });
    }
    next_id(existing)
}

/// Records clashing with the submission by name (case-insensitive) or by
/// logo file name.
pub fn find_duplicates(submission: &Submission, existing: &[Record]) -> Vec<Conflict> {
    let name = submission.name.trim().to_lowercase();
    let logo_file = submission.logo_url().and_then(logo_basename);
    // our own <slug>.webp must not land on another record's image
    let target = thumbnail_file(submission);
    let mut conflicts = Vec::new();

    for r in existing {
        if r.name.trim().to_lowercase() == name {
            conflicts.push(Conflict::Name {
                existing_id: r.id.clone(),
                name: r.name.clone(),
            });
        }
        let clash = match (logo_file, &target) {
            (Some(file), _) if r.thumbnail_url.contains(file) => Some(file.to_string()),
            (_, Some(t)) if logo_basename_of_path(&r.thumbnail_url) == Some(t.as_str()) => {
                Some(t.clone())
            }
            _ => None,
        };
        if let Some(file) = clash {
            conflicts.push(Conflict::Logo {
                existing_id: r.id.clone(),
                file,
            });
        }
    }

    conflicts
}

/// One past the largest numeric id. Ids that are not positive integers are
/// skipped, so gaps from deleted records are never reused.
pub fn next_id(existing: &[Record]) -> Result<String, IntakeError> {
    let max = existing.iter().filter_map(Record::numeric_id).max().unwrap_or(0);
    max.checked_add(1)
        .map(|id| id.to_string())
        .ok_or(IntakeError::IdExhausted(max))
}

/// `<slug>.webp` for a submission that carries a logo.
fn thumbnail_file(submission: &Submission) -> Option<String> {
    if submission.logo_url().is_none() {
        return None;
    }
    let slug = slugify(&submission.name);
    (!slug.is_empty()).then(|| format!("{}.webp", slug))
}

/// `Rust Madrid Meetup!` → `rust-madrid-meetup`
pub fn slugify(name: &str) -> String {
    let lower = name.trim().to_lowercase();
    let hyphenated = WHITESPACE_RE.replace_all(&lower, "-");
    UNSAFE_RE.replace_all(&hyphenated, "").into_owned()
}

/// `dd/mm/yyyy`, zero-padded.
pub fn review_date(day: NaiveDate) -> String {
    day.format("%d/%m/%Y").to_string()
}

/// Last path segment of a URL, without query or fragment.
pub fn logo_basename(url: &str) -> Option<&str> {
    let url = url.split(['?', '#']).next().unwrap_or(url);
    let without_scheme = url.split_once("://").map_or(url, |(_, rest)| rest);
    let (_host, path) = without_scheme.split_once('/')?;
    path.rsplit('/').next().filter(|s| !s.is_empty())
}

fn logo_basename_of_path(path: &str) -> Option<&str> {
    path.rsplit('/').next().filter(|s| !s.is_empty())
}

// ── Tests ──
