use crate::release::models::{Release, Track};
use crate::split::error::{SplitError, SplitResult};
use lazy_static::lazy_static;
use regex::Regex;
use std::path::{Path, PathBuf};

pub const DEFAULT_NAME_TEMPLATE: &str = "{artist}/[{date} - ]{album}/{number}[ - {title}]";

lazy_static! {
    static ref OPTIONAL_GROUP: Regex = Regex::new(r"\[([^\[\]]*)\]").expect("valid regex");
    static ref PLACEHOLDER: Regex = Regex::new(r"\{([a-z]+)\}").expect("valid regex");
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Field {
    Artist,
    Album,
    Date,
    Genre,
    Title,
    Number,
    Disc,
    Performer,
    Composer,
}

impl Field {
    fn from_name(name: &str) -> Option<Self> {
        match name {
            "artist" => Some(Field::Artist),
            "album" => Some(Field::Album),
            "date" => Some(Field::Date),
            "genre" => Some(Field::Genre),
            "title" => Some(Field::Title),
            "number" => Some(Field::Number),
            "disc" => Some(Field::Disc),
            "performer" => Some(Field::Performer),
            "composer" => Some(Field::Composer),
            _ => None,
        }
    }

    fn value(&self, release: &Release, track: &Track) -> String {
        match self {
            Field::Artist => release.artist().to_string(),
            Field::Album => release.album().to_string(),
            Field::Date => release.date.clone(),
            Field::Genre => track.genre.clone(),
            Field::Title => track.title.clone(),
            Field::Number => format!(
                "{:0width$}",
                track.number,
                width = release.track_number_width()
            ),
            Field::Disc if track.disc_number > 0 => track.disc_number.to_string(),
            Field::Disc => String::new(),
            Field::Performer => track.performer.clone(),
            Field::Composer => track.composer.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Field(Field),
    /// Rendered only if none of its fields is empty.
    Optional(Vec<Segment>),
}

/// Output file naming template.
///
/// `{field}` is replaced by a track or release value, `[...]` groups vanish
/// when any field inside them is empty and `/` starts a new directory level.
/// Values never introduce directory levels of their own.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NameTemplate {
    segments: Vec<Segment>,
}

impl NameTemplate {
    pub fn parse(template: &str) -> SplitResult<Self> {
        let invalid = |reason: String| SplitError::InvalidNameTemplate {
            template: template.to_string(),
            reason,
        };

        let mut segments = Vec::new();
        let mut last = 0;
        for group in OPTIONAL_GROUP.captures_iter(template) {
            let (Some(whole), Some(inner)) = (group.get(0), group.get(1)) else {
                continue;
            };
            segments.extend(parse_fields(&template[last..whole.start()]).map_err(&invalid)?);
            segments.push(Segment::Optional(
                parse_fields(inner.as_str()).map_err(&invalid)?,
            ));
            last = whole.end();
        }
        segments.extend(parse_fields(&template[last..]).map_err(&invalid)?);

        if segments.is_empty() {
            return Err(invalid("template is empty".to_string()));
        }

        Ok(Self { segments })
    }

    /// Path of `track` below `output_dir`, with `extension` appended.
    pub fn render(
        &self,
        output_dir: &Path,
        release: &Release,
        track: &Track,
        extension: &str,
    ) -> PathBuf {
        let mut rendered = String::new();
        render_segments(&self.segments, release, track, &mut rendered);

        let mut components: Vec<String> = rendered
            .split('/')
            .map(str::trim)
            .filter(|component| !component.is_empty())
            .map(not_relative)
            .collect();
        if components.is_empty() {
            components.push(Field::Number.value(release, track));
        }

        let mut path = output_dir.to_path_buf();
        for (position, component) in components.iter().enumerate() {
            if position + 1 == components.len() {
                path.push(format!("{component}.{extension}"));
            } else {
                path.push(component);
            }
        }

        path
    }
}

fn parse_fields(text: &str) -> Result<Vec<Segment>, String> {
    let mut segments = Vec::new();
    let mut last = 0;

    for placeholder in PLACEHOLDER.captures_iter(text) {
        let (Some(whole), Some(name)) = (placeholder.get(0), placeholder.get(1)) else {
            continue;
        };
        push_literal(&mut segments, &text[last..whole.start()])?;
        let field = Field::from_name(name.as_str())
            .ok_or_else(|| format!("unknown field {{{}}}", name.as_str()))?;
        segments.push(Segment::Field(field));
        last = whole.end();
    }
    push_literal(&mut segments, &text[last..])?;

    Ok(segments)
}

fn push_literal(segments: &mut Vec<Segment>, literal: &str) -> Result<(), String> {
    if let Some(c) = literal.chars().find(|c| matches!(c, '[' | ']' | '{' | '}')) {
        return Err(format!("unbalanced {c:?}"));
    }
    if !literal.is_empty() {
        segments.push(Segment::Literal(literal.to_string()));
    }
    Ok(())
}

/// Returns whether every field rendered to a non-empty value.
fn render_segments(segments: &[Segment], release: &Release, track: &Track, out: &mut String) -> bool {
    let mut complete = true;
    for segment in segments {
        match segment {
            Segment::Literal(literal) => out.push_str(literal),
            Segment::Field(field) => {
                let value = field.value(release, track);
                if value.is_empty() {
                    complete = false;
                }
                out.push_str(&path_safe(&value));
            }
            Segment::Optional(inner) => {
                let mut group = String::new();
                if render_segments(inner, release, track, &mut group) {
                    out.push_str(&group);
                }
            }
        }
    }
    complete
}

/// Keeps a value inside a single path component.
fn path_safe(value: &str) -> String {
    value.replace('/', "∕").replace('\\', "⧵")
}

/// `.` and `..` would point at the current or parent directory.
fn not_relative(component: &str) -> String {
    match component {
        "." | ".." => component.replace('.', "．"),
        _ => component.to_string(),
    }
}
