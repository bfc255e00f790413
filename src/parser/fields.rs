use std::sync::LazyLock;

use regex::Regex;

use super::sections::split_sections;

/// Placeholder GitHub issue forms write for optional questions left blank.
pub const NO_RESPONSE: &str = "_No response_";

static MD_URL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\]\(\s*<?(https?://[^\s)>]+)").unwrap());
static BARE_URL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"https?://[^\s\]<>"']+"#).unwrap());

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    Name,
    Status,
    CommunityType,
    EventFormat,
    Location,
    Topics,
    ContactInfo,
    CommunityUrl,
    Logo,
}

impl Field {
    pub const ALL: [Field; 9] = [
        Field::Name,
        Field::Status,
        Field::CommunityType,
        Field::EventFormat,
        Field::Location,
        Field::Topics,
        Field::ContactInfo,
        Field::CommunityUrl,
        Field::Logo,
    ];

    /// Heading used by the issue form.
    pub fn label(self) -> &'static str {
        match self {
            Field::Name => "Nombre de la comunidad",
            Field::Status => "Estado de la comunidad",
            Field::CommunityType => "Tipo de comunidad",
            Field::EventFormat => "Formato del evento",
            Field::Location => "Ciudad o región principal",
            Field::Topics => "Temas que trata",
            Field::ContactInfo => "Información de contacto",
            Field::CommunityUrl => "URL principal de la comunidad",
            Field::Logo => "Imagen o logotipo de la comunidad",
        }
    }

    /// Key of the field in `communities.json`.
    pub fn key(self) -> &'static str {
        match self {
            Field::Name => "name",
            Field::Status => "status",
            Field::CommunityType => "communityType",
            Field::EventFormat => "eventFormat",
            Field::Location => "location",
            Field::Topics => "topics",
            Field::ContactInfo => "contactInfo",
            Field::CommunityUrl => "communityUrl",
            Field::Logo => "thumbnailUrl",
        }
    }

    pub fn is_required(self) -> bool {
        !matches!(self, Field::Topics | Field::ContactInfo | Field::Logo)
    }
}

impl std::fmt::Display for Field {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.key(), self.label())
    }
}

/// Return the cleaned answer under the `### <label>` heading, or `""` when the
/// heading is absent.
pub fn extract_field(body: &str, label: &str) -> String {
    let wanted = label.trim().to_lowercase();
    split_sections(body)
        .iter()
        .find(|s| s.heading.to_lowercase() == wanted)
        .map(|s| clean_value(&s.body))
        .unwrap_or_default()
}

/// Strip double quotes, trim, and collapse the "no response" placeholder to `""`.
pub fn clean_value(raw: &str) -> String {
    let unquoted: String = raw
        .chars()
        // single quotes stay: they are apostrophes in names (O'Reilly, L'Hospitalet)
        .filter(|c| !matches!(c, '"' | '\u{201C}' | '\u{201D}'))
        .collect();
    let value = unquoted.trim();
    if value.eq_ignore_ascii_case(NO_RESPONSE) {
        String::new()
    } else {
        value.to_string()
    }
}

/// All answers of one community submission, unvalidated.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Submission {
    pub name: String,
    pub status: String,
    pub community_type: String,
    pub event_format: String,
    pub location: String,
    pub topics: String,
    pub contact_info: String,
    pub community_url: String,
    pub logo: String,
}

impl Submission {
    pub fn from_body(body: &str) -> Self {
        let get = |field: Field| extract_field(body, field.label());
        Submission {
            name: get(Field::Name),
            status: get(Field::Status),
            community_type: get(Field::CommunityType),
            event_format: get(Field::EventFormat),
            location: get(Field::Location),
            topics: get(Field::Topics),
            contact_info: get(Field::ContactInfo),
            community_url: get(Field::CommunityUrl),
            logo: get(Field::Logo),
        }
    }

    pub fn value(&self, field: Field) -> &str {
        match field {
            Field::Name => &self.name,
            Field::Status => &self.status,
            Field::CommunityType => &self.community_type,
            Field::EventFormat => &self.event_format,
            Field::Location => &self.location,
            Field::Topics => &self.topics,
            Field::ContactInfo => &self.contact_info,
            Field::CommunityUrl => &self.community_url,
            Field::Logo => &self.logo,
        }
    }

    /// Required fields that came back empty, in form order.
    pub fn missing_required(&self) -> Vec<Field> {
        Field::ALL
            .into_iter()
            .filter(|f| f.is_required() && self.value(*f).is_empty())
            .collect()
    }

    /// Image URL of the logo answer, if it holds one.
    pub fn logo_url(&self) -> Option<&str> {
        logo_source_url(&self.logo)
    }
}

/// First http(s) URL in a logo answer. Covers bare URLs as well as the
/// `![alt](url)` and `<img src=...>` forms GitHub writes for uploads.
pub fn logo_source_url(value: &str) -> Option<&str> {
    if let Some(caps) = MD_URL_RE.captures(value) {
        return caps.get(1).map(|m| m.as_str());
    }
    BARE_URL_RE.find(value).map(|m| trim_unbalanced_paren(m.as_str()))
}

/// Drop a closing paren that belongs to surrounding prose, not to the URL.
fn trim_unbalanced_paren(url: &str) -> &str {
    let opens = url.matches('(').count();
    let closes = url.matches(')').count();
    if closes > opens {
        url.strip_suffix(')').unwrap_or(url)
    } else {
        url
    }
}

// ── Tests ──
