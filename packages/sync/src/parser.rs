//! Streaming parser for RSR project update feeds.
//!
//! The API returns update lists as
//!
//! ```xml
//! <response><objects type="list">
//!   <object>
//!     <id type="integer">2505</id>
//!     <title>Video screening improves farms productivity</title>
//!     <project>/api/v1/project/363/</project>
//!     <user>/api/v1/user/460/</user>
//!     <time>2013-02-04T10:54:12</time>
//!     ...
//!   </object>
//! </objects></response>
//! ```
//!
//! [`UpdateListParser`] consumes open/text/close events and rebuilds one
//! [`Update`] per `<object>` without keeping more than the update in progress
//! in memory. Each completed update is either stored right away
//! ([`CompletionMode::Insert`]) or kept as the last completed one
//! ([`CompletionMode::Lookup`]).
//!
//! Bad field values never abort a run: they become [`FieldWarning`]s in the
//! returned [`ParseReport`] and the field is left unset. Only structural
//! problems (nested objects, empty reference paths, tokenizer errors) and
//! storage failures are fatal.

use std::io::BufRead;

use thiserror::Error;

use crate::config::{parse_feed_date, MAX_RECORDED_WARNINGS, OBJECT_TAG};
use crate::error::{Result, SyncError};
use crate::reference::{id_from_url, ReferenceError};
use crate::storage::UpdateStore;
use crate::types::{FieldTag, Update};
use crate::xml::{EventReader, XmlEvent};

/// What happens to an update once its `<object>` closes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompletionMode {
    /// Store every completed update and drop it from memory.
    Insert,
    /// Keep only the most recently completed update for the caller.
    Lookup,
}

/// A recoverable problem with a single field value.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FieldWarning {
    /// `<time>` did not match the API timestamp format.
    #[error("object #{object}: invalid <time> value '{value}': {source}")]
    InvalidDate {
        object: usize,
        value: String,
        #[source]
        source: chrono::ParseError,
    },

    /// `<project>` or `<user>` was not a resource path.
    #[error("object #{object}: invalid <{field}> reference '{value}': {source}")]
    InvalidReference {
        object: usize,
        field: &'static str,
        value: String,
        #[source]
        source: ReferenceError,
    },

    /// An update completed without any `<time>` element.
    #[error("update {id} has no <time> element")]
    MissingDate { id: String },
}

/// Outcome of a parse run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParseReport {
    success_count: usize,
    objects_seen: usize,
    warning_count: usize,
    warnings: Vec<FieldWarning>,
    last_completed: Option<Update>,
    extended_fields: bool,
}

impl ParseReport {
    /// Whether any field warning was raised. Once set, it stays set.
    #[must_use]
    pub fn had_error(&self) -> bool {
        self.warning_count > 0
    }

    /// Number of completed updates that carried an id.
    #[must_use]
    pub fn success_count(&self) -> usize {
        self.success_count
    }

    /// Number of `<object>` elements encountered, with or without id.
    #[must_use]
    pub fn objects_seen(&self) -> usize {
        self.objects_seen
    }

    /// Total number of warnings, including ones not kept in [`warnings`](Self::warnings).
    #[must_use]
    pub fn warning_count(&self) -> usize {
        self.warning_count
    }

    /// The first [`MAX_RECORDED_WARNINGS`] warnings of the run.
    #[must_use]
    pub fn warnings(&self) -> &[FieldWarning] {
        &self.warnings
    }

    /// Last completed update with an id. Always `None` in insert mode.
    #[must_use]
    pub fn last_completed(&self) -> Option<&Update> {
        self.last_completed.as_ref()
    }

    /// Consume the report, keeping only the last completed update.
    #[must_use]
    pub fn into_last_completed(self) -> Option<Update> {
        self.last_completed
    }

    /// The extended-fields toggle the parser was built with.
    #[must_use]
    pub fn extended_fields(&self) -> bool {
        self.extended_fields
    }

    fn record(&mut self, warning: FieldWarning) {
        tracing::warn!(%warning, "Field conversion failed");
        self.warning_count += 1;
        if self.warnings.len() < MAX_RECORDED_WARNINGS {
            self.warnings.push(warning);
        }
    }
}

/// The field currently collecting text, with its accumulator.
#[derive(Debug)]
struct ActiveField {
    tag: FieldTag,
    text: String,
}

/// The update being built between `<object>` and `</object>`.
#[derive(Debug, Default)]
struct InProgress {
    update: Update,
    saw_time: bool,
}

/// Event-driven parser for update list feeds.
///
/// Drive it either with [`parse`](Self::parse) / [`parse_reader`](Self::parse_reader),
/// or by hand through [`start_document`](Self::start_document),
/// [`handle`](Self::handle) and [`end_document`](Self::end_document).
pub struct UpdateListParser<'s, S> {
    store: &'s mut S,
    mode: CompletionMode,
    current: Option<InProgress>,
    active: Option<ActiveField>,
    depth: usize,
    report: ParseReport,
}

impl<'s, S: UpdateStore> UpdateListParser<'s, S> {
    /// Create a parser.
    ///
    /// `extended_fields` tells callers whether photo and video metadata are
    /// expected; those fields are extracted whenever present either way.
    pub fn new(store: &'s mut S, mode: CompletionMode, extended_fields: bool) -> Self {
        Self {
            store,
            mode,
            current: None,
            active: None,
            depth: 0,
            report: ParseReport {
                extended_fields,
                ..ParseReport::default()
            },
        }
    }

    #[must_use]
    pub fn mode(&self) -> CompletionMode {
        self.mode
    }

    /// Current element nesting depth.
    #[must_use]
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Results gathered so far.
    #[must_use]
    pub fn report(&self) -> &ParseReport {
        &self.report
    }

    /// Parse a whole feed from a buffered reader.
    pub fn parse_reader<R: BufRead>(self, reader: R) -> Result<ParseReport> {
        self.parse(EventReader::new(reader))
    }

    /// Run the full protocol over a stream of events.
    ///
    /// The store session is closed on every exit path. When the run fails,
    /// the run's error is returned and a failure to close is only logged.
    pub fn parse<I>(mut self, events: I) -> Result<ParseReport>
    where
        I: IntoIterator<Item = Result<XmlEvent>>,
    {
        self.start_document()?;

        let outcome = events
            .into_iter()
            .try_for_each(|event| self.handle(event?));

        if let Err(err) = outcome {
            if let Err(close_err) = self.store.close() {
                tracing::warn!(error = %close_err, "Failed to close store after aborted parse");
            }
            return Err(err);
        }

        self.end_document()
    }

    /// Open the store session and reset run state.
    pub fn start_document(&mut self) -> Result<()> {
        self.store.open()?;
        self.current = None;
        self.active = None;
        self.depth = 0;
        self.report = ParseReport {
            extended_fields: self.report.extended_fields,
            ..ParseReport::default()
        };
        Ok(())
    }

    /// Close the store session and hand back the report.
    pub fn end_document(self) -> Result<ParseReport> {
        self.store.close()?;

        if self.current.is_some() {
            tracing::debug!("Feed ended inside an <object>; discarding it");
        }

        let report = self.report;
        tracing::info!(
            updates = report.success_count,
            objects = report.objects_seen,
            warnings = report.warning_count,
            "Parsed update feed"
        );
        Ok(report)
    }

    /// Dispatch one event.
    pub fn handle(&mut self, event: XmlEvent) -> Result<()> {
        match event {
            XmlEvent::Open(name) => self.start_element(&name),
            XmlEvent::Text(text) => {
                self.characters(&text);
                Ok(())
            }
            XmlEvent::Close(name) => self.end_element(&name),
        }
    }

    pub fn start_element(&mut self, name: &str) -> Result<()> {
        self.depth += 1;

        if let Some(active) = self.active.as_mut() {
            active.text.clear();
        }

        if name == OBJECT_TAG {
            if self.current.is_some() {
                return Err(SyncError::NestedObject { depth: self.depth });
            }
            self.report.objects_seen += 1;
            self.current = Some(InProgress::default());
            self.active = None;
            return Ok(());
        }

        if self.current.is_none() {
            return Ok(());
        }

        if let Some(tag) = FieldTag::from_tag_name(name) {
            if tag.is_extended() && !self.report.extended_fields {
                tracing::trace!(field = tag.as_str(), "Extended field in basic feed");
            }
            self.active = Some(ActiveField {
                tag,
                text: String::new(),
            });
        }

        Ok(())
    }

    /// Append character data; may be called several times per element.
    pub fn characters(&mut self, text: &str) {
        if let Some(active) = self.active.as_mut() {
            active.text.push_str(text);
        }
    }

    pub fn end_element(&mut self, name: &str) -> Result<()> {
        self.depth = self.depth.saturating_sub(1);

        if name == OBJECT_TAG {
            return self.complete_object();
        }

        let Some(tag) = FieldTag::from_tag_name(name) else {
            return Ok(());
        };

        match self.active.take() {
            Some(active) if active.tag == tag => self.assign(active),
            other => {
                self.active = other;
                Ok(())
            }
        }
    }

    fn assign(&mut self, field: ActiveField) -> Result<()> {
        let Some(entity) = self.current.as_mut() else {
            return Ok(());
        };
        let object = self.report.objects_seen;
        let update = &mut entity.update;
        let ActiveField { tag, text } = field;

        match tag {
            FieldTag::Id => update.id = text,
            FieldTag::Title => update.title = text,
            FieldTag::Text => update.text = text,
            FieldTag::Time => {
                entity.saw_time = true;
                match parse_feed_date(&text) {
                    Ok(date) => update.date = Some(date),
                    Err(source) => self.report.record(FieldWarning::InvalidDate {
                        object,
                        value: text,
                        source,
                    }),
                }
            }
            FieldTag::Project | FieldTag::User => match id_from_url(&text) {
                Ok(id) => {
                    let id = Some(id.to_string());
                    if tag == FieldTag::Project {
                        update.project_id = id;
                    } else {
                        update.user_id = id;
                    }
                }
                Err(ReferenceError::Empty) => {
                    return Err(SyncError::empty_reference(tag.as_str(), &update.id));
                }
                Err(source) => self.report.record(FieldWarning::InvalidReference {
                    object,
                    field: tag.as_str(),
                    value: text,
                    source,
                }),
            },
            FieldTag::Uuid => update.uuid = Some(text),
            FieldTag::Photo => update.thumbnail_url = Some(text),
            FieldTag::PhotoCredit => update.photo_credit = Some(text),
            FieldTag::PhotoCaption => update.photo_caption = Some(text),
            FieldTag::Video => update.video_url = Some(text),
        }

        Ok(())
    }

    fn complete_object(&mut self) -> Result<()> {
        self.active = None;
        let Some(InProgress { update, saw_time }) = self.current.take() else {
            return Ok(());
        };

        if !update.has_id() {
            tracing::debug!(
                object = self.report.objects_seen,
                "Dropping update without id"
            );
            return Ok(());
        }

        if !saw_time {
            self.report.record(FieldWarning::MissingDate {
                id: update.id.clone(),
            });
        }

        self.report.success_count += 1;
        tracing::debug!(id = %update.id, mode = ?self.mode, depth = self.depth, "Completed update");

        match self.mode {
            CompletionMode::Insert => self.store.save_update(&update, true)?,
            CompletionMode::Lookup => self.report.last_completed = Some(update),
        }

        Ok(())
    }
}
