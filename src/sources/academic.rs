//! Academic metadata from an Atom feed (arXiv query API)

use crate::sources::http::{HttpSource, StatusCheck};
use crate::sources::{or_placeholder, Harvest, SourceAdapter, SourceKind, SourceResult};
use crate::TributaryError;
use quick_xml::events::Event;
use quick_xml::Reader;

const ACADEMIC_LIMIT: usize = 3;

/// Summaries longer than this many characters are cut and marked with "..."
const SUMMARY_MAX_CHARS: usize = 300;

/// Title and summary of one feed entry, whitespace-collapsed
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AtomEntry {
    pub title: Option<String>,
    pub summary: Option<String>,
}

#[derive(Debug, Clone, Copy)]
enum Field {
    Title,
    Summary,
}

impl AtomEntry {
    fn append(&mut self, field: Field, text: &str) {
        let slot = match field {
            Field::Title => &mut self.title,
            Field::Summary => &mut self.summary,
        };
        let current = slot.get_or_insert_with(String::new);
        for word in text.split_whitespace() {
            if !current.is_empty() {
                current.push(' ');
            }
            current.push_str(word);
        }
    }
}

/// Extracts `<entry>` titles and summaries from an Atom document
///
/// Elements are matched by local name, so namespace prefixes do not matter.
/// The feed-level `<title>` is ignored.
pub fn parse_atom_entries(xml: &str) -> Result<Vec<AtomEntry>, quick_xml::Error> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut entries = Vec::new();
    let mut current: Option<AtomEntry> = None;
    let mut field: Option<Field> = None;

    loop {
        match reader.read_event()? {
            Event::Start(e) => match e.local_name().as_ref() {
                b"entry" => current = Some(AtomEntry::default()),
                b"title" if current.is_some() => field = Some(Field::Title),
                b"summary" if current.is_some() => field = Some(Field::Summary),
                _ => {}
            },
            Event::Text(text) => {
                if let (Some(entry), Some(field)) = (current.as_mut(), field) {
                    entry.append(field, &text.unescape()?);
                }
            }
            Event::CData(data) => {
                if let (Some(entry), Some(field)) = (current.as_mut(), field) {
                    entry.append(field, &String::from_utf8_lossy(&data.into_inner()));
                }
            }
            Event::End(e) => match e.local_name().as_ref() {
                b"entry" => {
                    if let Some(entry) = current.take() {
                        entries.push(entry);
                    }
                    field = None;
                }
                b"title" | b"summary" => field = None,
                _ => {}
            },
            Event::Eof => break,
            _ => {}
        }
    }

    Ok(entries)
}

/// Cuts `summary` to [`SUMMARY_MAX_CHARS`] characters, appending "..." only when cut
pub fn truncate_summary(summary: &str) -> String {
    if summary.chars().count() <= SUMMARY_MAX_CHARS {
        return summary.to_string();
    }
    let mut cut: String = summary.chars().take(SUMMARY_MAX_CHARS).collect();
    cut.push_str("...");
    cut
}

/// Academic-metadata source adapter
pub struct AcademicAdapter {
    http: HttpSource,
}

impl AcademicAdapter {
    pub fn new(http: HttpSource) -> Self {
        Self { http }
    }

    fn lookup(&self, query: &str) -> Result<Vec<SourceResult>, TributaryError> {
        let params = [
            ("search_query", format!("all:{}", query)),
            ("start", "0".to_string()),
            ("max_results", ACADEMIC_LIMIT.to_string()),
        ];
        let (_, body) = self
            .http
            .get("academic feed", &params, StatusCheck::RequireSuccess)?;

        let entries = parse_atom_entries(&body).map_err(|e| TributaryError::Malformed {
            what: "academic feed",
            message: e.to_string(),
        })?;

        Ok(format_entries(entries))
    }
}

fn format_entries(entries: Vec<AtomEntry>) -> Vec<SourceResult> {
    entries
        .into_iter()
        .take(ACADEMIC_LIMIT)
        .enumerate()
        .map(|(i, entry)| {
            let title = or_placeholder(entry.title.as_deref(), "No title");
            let summary = match entry.summary.as_deref().map(str::trim) {
                Some(s) if !s.is_empty() => truncate_summary(s),
                _ => "No summary".to_string(),
            };
            SourceResult::snippet(
                SourceKind::Academic,
                i + 1,
                format!("[Academic Result {}] {}\nSummary: {}", i + 1, title, summary),
            )
        })
        .collect()
}

impl SourceAdapter for AcademicAdapter {
    fn kind(&self) -> SourceKind {
        SourceKind::Academic
    }

    fn limit(&self) -> usize {
        ACADEMIC_LIMIT
    }

    fn harvest(&self, query: &str) -> Harvest {
        match self.lookup(query) {
            Ok(results) => Harvest::from_results(results),
            Err(e) => Harvest::failed(self.kind(), e),
        }
    }
}
