//! SQL template engine for read workloads.
//!
//! Templates are parsed once at setup into literal fragments and
//! placeholders. Instantiation walks the parsed segments and streams them
//! straight into the output writer.
//!
//! Placeholder syntax: `{{name}}` or `{{name:count}}`.
//!
//! | Name | Substitution |
//! |------|--------------|
//! | any entity tag key | the tag value of a randomly picked entity |
//! | `start`, `end` | window bounds, RFC 3339 |
//! | `start_ns`, `end_ns` | window bounds, integer nanoseconds |
//! | `now`, `now_ns` | boundary of the data acknowledged as written |
//!
//! A tag placeholder with a count above one expands to that many entity picks
//! joined by `','`, which drops straight into `IN ('{{site_id:3}}')`. All
//! single tag placeholders of one instantiation share the same entity, so
//! `province` and `city` stay consistent with each other.

use crate::error::{Result, SimError};
use crate::rng;
use chrono::{SecondsFormat, TimeZone, Utc};
use rusts_core::Timestamp;
use std::io::{self, Write};

/// Separator between repeated tag values.
pub const REPEAT_SEPARATOR: &str = "','";

const OPEN: &str = "{{";
const CLOSE: &str = "}}";

/// What a placeholder substitutes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placeholder {
    /// Index into the entity tag schema
    Tag(usize),
    Start,
    End,
    StartNs,
    EndNs,
    Now,
    NowNs,
}

impl Placeholder {
    fn reserved(name: &str) -> Option<Self> {
        match name {
            "start" => Some(Placeholder::Start),
            "end" => Some(Placeholder::End),
            "start_ns" => Some(Placeholder::StartNs),
            "end_ns" => Some(Placeholder::EndNs),
            "now" => Some(Placeholder::Now),
            "now_ns" => Some(Placeholder::NowNs),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Placeholder { placeholder: Placeholder, repeat: u32 },
}

/// Values a template draws from while being instantiated.
pub trait SqlSource {
    fn entity_count(&self) -> usize;

    /// Value of schema tag `key` on entity `entity`.
    fn tag_value(&self, entity: usize, key: usize) -> &str;

    fn start(&self) -> Timestamp;

    fn end(&self) -> Timestamp;

    fn now(&self) -> Timestamp;
}

/// A parsed, immutable query template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SqlTemplate {
    source: String,
    segments: Vec<Segment>,
}

impl SqlTemplate {
    /// Parses `template` against the entity tag schema `tag_keys`.
    pub fn parse(template: &str, tag_keys: &[&str]) -> Result<Self> {
        Self::parse_with_repeat(template, tag_keys, 1)
    }

    /// Like [`SqlTemplate::parse`], but tag placeholders without an explicit
    /// count repeat `repeat` times.
    pub fn parse_with_repeat(template: &str, tag_keys: &[&str], repeat: u32) -> Result<Self> {
        let malformed = |reason: String| SimError::MalformedPlaceholder {
            template: template.to_string(),
            reason,
        };
        if repeat == 0 {
            return Err(malformed("repeat count must be positive".to_string()));
        }

        let mut segments = Vec::new();
        let mut rest = template;

        while let Some(open) = rest.find(OPEN) {
            if open > 0 {
                segments.push(Segment::Literal(rest[..open].to_string()));
            }
            let body_start = open + OPEN.len();
            let close = rest[body_start..]
                .find(CLOSE)
                .ok_or_else(|| malformed("unterminated '{{'".to_string()))?;
            let body = &rest[body_start..body_start + close];
            rest = &rest[body_start + close + CLOSE.len()..];

            let (name, count) = match body.split_once(':') {
                Some((name, count)) => {
                    let count = count
                        .parse::<u32>()
                        .ok()
                        .filter(|c| *c > 0)
                        .ok_or_else(|| malformed(format!("invalid count in '{{{{{}}}}}'", body)))?;
                    (name, Some(count))
                }
                None => (body, None),
            };

            if name.is_empty() || !name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
                return Err(malformed(format!("invalid name '{}'", name)));
            }

            let segment = if let Some(placeholder) = Placeholder::reserved(name) {
                if count.is_some() {
                    return Err(malformed(format!("'{}' cannot repeat", name)));
                }
                Segment::Placeholder {
                    placeholder,
                    repeat: 1,
                }
            } else if let Some(key) = tag_keys.iter().position(|k| *k == name) {
                Segment::Placeholder {
                    placeholder: Placeholder::Tag(key),
                    repeat: count.unwrap_or(repeat),
                }
            } else {
                return Err(SimError::UnknownPlaceholder {
                    template: template.to_string(),
                    name: name.to_string(),
                });
            };
            segments.push(segment);
        }

        if !rest.is_empty() {
            segments.push(Segment::Literal(rest.to_string()));
        }

        Ok(Self {
            source: template.to_string(),
            segments,
        })
    }

    /// The unparsed template text.
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Placeholders in order of appearance with their repeat counts.
    pub fn placeholders(&self) -> impl Iterator<Item = (Placeholder, u32)> + '_ {
        self.segments.iter().filter_map(|s| match s {
            Segment::Placeholder {
                placeholder,
                repeat,
            } => Some((*placeholder, *repeat)),
            Segment::Literal(_) => None,
        })
    }

    /// Streams one instantiation of the template into `out`.
    pub fn write_to<S, W>(&self, source: &S, out: &mut W) -> io::Result<()>
    where
        S: SqlSource + ?Sized,
        W: Write + ?Sized,
    {
        let entities = source.entity_count() as u32;
        let primary = rng::draw32_below(entities) as usize;

        for segment in &self.segments {
            match segment {
                Segment::Literal(text) => out.write_all(text.as_bytes())?,
                Segment::Placeholder {
                    placeholder: Placeholder::Tag(key),
                    repeat: 1,
                } => out.write_all(source.tag_value(primary, *key).as_bytes())?,
                Segment::Placeholder {
                    placeholder: Placeholder::Tag(key),
                    repeat,
                } => {
                    for i in 0..*repeat {
                        if i > 0 {
                            out.write_all(REPEAT_SEPARATOR.as_bytes())?;
                        }
                        let entity = rng::draw32_below(entities) as usize;
                        out.write_all(source.tag_value(entity, *key).as_bytes())?;
                    }
                }
                Segment::Placeholder { placeholder, .. } => match placeholder {
                    Placeholder::Start => write_rfc3339(out, source.start())?,
                    Placeholder::End => write_rfc3339(out, source.end())?,
                    Placeholder::Now => write_rfc3339(out, source.now())?,
                    Placeholder::StartNs => write!(out, "{}", source.start())?,
                    Placeholder::EndNs => write!(out, "{}", source.end())?,
                    Placeholder::NowNs => write!(out, "{}", source.now())?,
                    Placeholder::Tag(_) => unreachable!("tag placeholders handled above"),
                },
            }
        }
        Ok(())
    }

    /// Instantiates into a fresh `String`; convenient for tests and logging.
    pub fn render<S: SqlSource + ?Sized>(&self, source: &S) -> String {
        let mut buf = Vec::with_capacity(self.source.len() + 64);
        // Writing into a Vec cannot fail
        let _ = self.write_to(source, &mut buf);
        String::from_utf8_lossy(&buf).into_owned()
    }
}

fn write_rfc3339<W: Write + ?Sized>(out: &mut W, ts: Timestamp) -> io::Result<()> {
    // Whole seconds render without a fraction; sub-second bounds keep theirs
    let rendered = Utc.timestamp_nanos(ts).to_rfc3339_opts(SecondsFormat::AutoSi, true);
    out.write_all(rendered.as_bytes())
}
