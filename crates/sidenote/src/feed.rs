//! Feed rendering.
//!
//! The feed groups log records by source URL and renders them into a single
//! HTML document through a compiled [upon] template. Groups are ordered by
//! their most recent record, newest first, so the page reads as a
//! reverse-chronological feed of pages you've been annotating.
//!
//! HTML fragments are embedded verbatim: the renderer performs no
//! sanitization, on the trust assumption that the content author and the
//! feed reader are the same person. Don't point an internet-facing
//! deployment at an untrusted client.

use std::collections::HashMap;

use serde::Serialize;
use upon::{Engine, Template};

use crate::error::{Error, Result};
use crate::record::{Content, Record};

/// The feed page template, embedded at build time.
const FEED_TEMPLATE: &str = include_str!("../templates/feed.html");

/// Renders the record log as an HTML feed.
///
/// The template is compiled once at construction and reused across
/// requests.
pub struct FeedRenderer {
    engine: Engine<'static>,
    template: Template<'static>,
}

impl std::fmt::Debug for FeedRenderer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FeedRenderer").finish_non_exhaustive()
    }
}

/// Template context: the ordered groups of the feed.
#[derive(Debug, Serialize)]
struct FeedContext {
    groups: Vec<GroupView>,
}

/// One feed article: the records sharing an `href`, in log order.
#[derive(Debug, Serialize)]
struct GroupView {
    href: String,
    title: String,
    entries: Vec<EntryView>,
}

/// One rendered record inside a group.
#[derive(Debug, Serialize)]
struct EntryView {
    image: bool,
    src: String,
    html: String,
    text: String,
    tags: String,
}

impl EntryView {
    fn from_record(record: &Record) -> Self {
        let tags = record.tags.join(", ");
        match &record.content {
            Content::File { file } => Self {
                image: true,
                src: file.src.clone(),
                html: String::new(),
                text: record.text.clone().unwrap_or_default(),
                tags,
            },
            Content::Html { html } => Self {
                image: false,
                src: String::new(),
                html: html.clone(),
                text: String::new(),
                tags,
            },
        }
    }
}

impl FeedRenderer {
    /// Compile the embedded feed template.
    ///
    /// # Errors
    ///
    /// Returns an error if the template is syntactically invalid.
    pub fn new() -> Result<Self> {
        let engine = Engine::new();
        let template = engine
            .compile(FEED_TEMPLATE)
            .map_err(|source| Error::Template(Box::new(source)))?;
        Ok(Self { engine, template })
    }

    /// Render the full feed for the given records.
    ///
    /// # Errors
    ///
    /// Returns an error if template rendering fails.
    pub fn render(&self, records: &[Record]) -> Result<String> {
        let context = FeedContext {
            groups: group_records(records),
        };
        self.template
            .render(&self.engine, &context)
            .to_string()
            .map_err(|source| Error::Template(Box::new(source)))
    }
}

/// Group records by `href` and order the groups for display.
///
/// Log order is preserved inside each group; the group header takes the
/// first record's title. Groups sort by their largest `time` descending,
/// and the sort is stable so groups with equal activity keep first-seen
/// order.
fn group_records(records: &[Record]) -> Vec<GroupView> {
    let mut index: HashMap<&str, usize> = HashMap::new();
    let mut groups: Vec<(f64, GroupView)> = Vec::new();

    for record in records {
        let time = record.time_secs();
        let entry = EntryView::from_record(record);
        if let Some(&position) = index.get(record.href.as_str()) {
            let (latest, group) = &mut groups[position];
            if time > *latest {
                *latest = time;
            }
            group.entries.push(entry);
        } else {
            index.insert(record.href.as_str(), groups.len());
            groups.push((
                time,
                GroupView {
                    href: record.href.clone(),
                    title: record.title.clone(),
                    entries: vec![entry],
                },
            ));
        }
    }

    groups.sort_by(|a, b| b.0.total_cmp(&a.0));
    groups.into_iter().map(|(_, group)| group).collect()
}
