use crate::ir::{Annotation, Dependency, ParseOutput, Token};
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::{debug, warn};

static COHORT_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"^(.+?)>"\n\s+(".+)(?:\n|$)"#).unwrap());
static DEPENDENCY_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"#(\d+)->(\d+)").unwrap());
static DEPENDENCY_PRESENT_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r" #\d+->\d+").unwrap());

static BASE_FORM_SPLIT_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r#"("[^"]+"\S*) "#).unwrap());
static DEPENDENCY_SPLIT_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r" (#\d+->\d+)").unwrap());
static TAG_SPLIT_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r" ([A-Z]{2,})").unwrap());
static MAPPING_SPLIT_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r" (@)").unwrap());

static BASE_FORM_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r#""[^"]+"\S*"#).unwrap());
static DEPENDENCY_LINE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^#\d+->\d+$").unwrap());

const COHORT_OPEN: &str = "\"<";
const COHORT_SEPARATOR: &str = "\n\"<";

/// Parse one sentence of cohort text into tokens.
///
/// Chunks that do not look like a cohort are skipped and reported in
/// [`ParseOutput::skipped`]; they never abort the parse.
pub fn parse_cohorts(input: &str) -> ParseOutput {
    let normalized = input.replace("\r\n", "\n");
    let body = normalized.strip_prefix(COHORT_OPEN).unwrap_or(&normalized);

    let mut output = ParseOutput::default();
    for chunk in body.split(COHORT_SEPARATOR) {
        if chunk.trim().is_empty() {
            continue;
        }
        match parse_cohort(chunk) {
            Some(token) => output.tokens.push(token),
            None => {
                warn!(chunk, "skipping chunk that is not a cohort");
                output.skipped.push(chunk.to_string());
            }
        }
    }
    debug!(
        tokens = output.tokens.len(),
        skipped = output.skipped.len(),
        "parsed cohorts"
    );
    output
}

fn parse_cohort(chunk: &str) -> Option<Token> {
    let caps = COHORT_RE.captures(chunk)?;
    let surface = caps.get(1)?.as_str();
    let reading = caps.get(2)?.as_str();

    let mut token = Token::new(surface);
    token.dependency = parse_dependency(reading);
    for line in split_reading(reading) {
        token.push_annotation(classify_annotation(&line));
    }
    Some(token)
}

/// First `#self->parent` marker in the reading; later markers are ignored.
pub fn parse_dependency(reading: &str) -> Option<Dependency> {
    let caps = DEPENDENCY_RE.captures(reading)?;
    let self_index = caps[1].parse::<u32>();
    let parent_index = caps[2].parse::<u32>();
    match (self_index, parent_index) {
        (Ok(self_index), Ok(parent_index)) => Some(Dependency {
            self_index,
            parent_index,
        }),
        _ => {
            warn!(marker = &caps[0], "dependency id out of range; ignoring marker");
            None
        }
    }
}

/// Break a reading line into one entry per annotation.
pub fn split_reading(reading: &str) -> Vec<String> {
    let text = BASE_FORM_SPLIT_RE.replace_all(reading, "\n${1}\n");
    let text = DEPENDENCY_SPLIT_RE.replace(&text, "\n${1}");
    let text = TAG_SPLIT_RE.replace_all(&text, "\n${1}");
    let text = MAPPING_SPLIT_RE.replace(&text, "\n${1}");
    text.split('\n')
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}

type AnnotationRule = (fn(&str) -> bool, fn(&str) -> Annotation);

// Checked in order; the first matching rule wins, anything else is a tag.
const ANNOTATION_RULES: [AnnotationRule; 2] = [
    (is_base_form, base_form),
    (is_dependency_marker, dependency_marker),
];

pub fn classify_annotation(line: &str) -> Annotation {
    let line = line.trim();
    for (matches, build) in ANNOTATION_RULES {
        if matches(line) {
            return build(line);
        }
    }
    Annotation::Tag(line.to_string())
}

fn is_base_form(line: &str) -> bool {
    BASE_FORM_RE.is_match(line)
}

fn is_dependency_marker(line: &str) -> bool {
    DEPENDENCY_LINE_RE.is_match(line)
}

fn base_form(line: &str) -> Annotation {
    Annotation::BaseForm(strip_quotes(line))
}

fn dependency_marker(line: &str) -> Annotation {
    Annotation::DependencyMarker(line.to_string())
}

// Drops the first and last character, which are the quotes for a plain `"lemma"`.
fn strip_quotes(line: &str) -> String {
    let mut chars = line.chars();
    chars.next();
    chars.next_back();
    chars.as_str().to_string()
}

/// Whether the text carries any dependency markers worth drawing.
pub fn contains_dependency_markers(text: &str) -> bool {
    DEPENDENCY_PRESENT_RE.is_match(text)
}

/// Split a multi-sentence stream on blank lines.
pub fn split_sentences(input: &str) -> Vec<String> {
    let mut sentences = Vec::new();
    let mut current: Vec<&str> = Vec::new();
    for line in input.lines() {
        if line.trim().is_empty() {
            if !current.is_empty() {
                sentences.push(current.join("\n"));
                current.clear();
            }
            continue;
        }
        current.push(line);
    }
    if !current.is_empty() {
        sentences.push(current.join("\n"));
    }
    sentences
}

#[cfg(test)]
mod tests {
    use super::*;

    const CATS: &str = "\"<Cats>\"\n\t\"cat\" N NOM #1->2\n\"<meow>\"\n\t\"meow\" V #2->0\n";

    #[test]
    fn parse_two_cohorts() {
        let parsed = parse_cohorts(CATS);
        assert_eq!(parsed.tokens.len(), 2);
        assert!(parsed.skipped.is_empty());

        let cats = &parsed.tokens[0];
        assert_eq!(cats.surface_form, "Cats");
        assert_eq!(cats.base_forms, vec!["cat".to_string()]);
        assert_eq!(cats.tags, vec!["N".to_string(), "NOM".to_string()]);
        assert_eq!(
            cats.dependency,
            Some(Dependency {
                self_index: 1,
                parent_index: 2
            })
        );
        assert_eq!(
            cats.annotations,
            vec![
                Annotation::BaseForm("cat".to_string()),
                Annotation::Tag("N".to_string()),
                Annotation::Tag("NOM".to_string()),
                Annotation::DependencyMarker("#1->2".to_string()),
            ]
        );

        let meow = &parsed.tokens[1];
        assert_eq!(meow.surface_form, "meow");
        assert!(meow.dependency.unwrap().is_root());
        assert_eq!(meow.line_count(), 4);
    }

    #[test]
    fn garbage_chunk_is_skipped() {
        let input = "\"<Cats>\"\n\t\"cat\" N #1->2\n\"<garbage\n\"<meow>\"\n\t\"meow\" V #2->0";
        let parsed = parse_cohorts(input);
        assert_eq!(parsed.tokens.len(), 2);
        assert_eq!(parsed.skipped, vec!["garbage".to_string()]);
        assert_eq!(parsed.tokens[1].surface_form, "meow");
    }

    #[test]
    fn empty_and_plain_input_yield_no_tokens() {
        assert!(parse_cohorts("").tokens.is_empty());
        let parsed = parse_cohorts("just some words");
        assert!(parsed.tokens.is_empty());
        assert_eq!(parsed.skipped.len(), 1);
    }

    #[test]
    fn first_dependency_marker_wins() {
        let dep = parse_dependency("\"x\" N #3->5 #4->1").unwrap();
        assert_eq!(dep.self_index, 3);
        assert_eq!(dep.parent_index, 5);
    }

    #[test]
    fn overflowing_dependency_is_ignored() {
        assert_eq!(parse_dependency("\"x\" #99999999999->1"), None);
    }

    #[test]
    fn split_reading_breaks_on_tags_and_mapping() {
        let lines = split_reading("\"walk\" V PRES Sg3 #4->0 @FMV");
        assert_eq!(lines, vec!["\"walk\"", "V", "PRES Sg3", "#4->0", "@FMV"]);
    }

    #[test]
    fn split_reading_keeps_multiple_base_forms() {
        let lines = split_reading("\"a\" \"b\" N");
        assert_eq!(lines, vec!["\"a\"", "\"b\"", "N"]);
    }

    #[test]
    fn classifier_priority() {
        assert_eq!(
            classify_annotation("\"cat\""),
            Annotation::BaseForm("cat".to_string())
        );
        assert_eq!(
            classify_annotation("#12->7"),
            Annotation::DependencyMarker("#12->7".to_string())
        );
        assert_eq!(
            classify_annotation("#12->7x"),
            Annotation::Tag("#12->7x".to_string())
        );
        assert_eq!(classify_annotation("@SUBJ"), Annotation::Tag("@SUBJ".to_string()));
    }

    #[test]
    fn crlf_input_is_normalized() {
        let parsed = parse_cohorts(&CATS.replace('\n', "\r\n"));
        assert_eq!(parsed.tokens.len(), 2);
        assert_eq!(parsed.tokens[0].surface_form, "Cats");
    }

    #[test]
    fn detects_dependency_markers() {
        assert!(contains_dependency_markers(CATS));
        assert!(!contains_dependency_markers("\"<a>\"\n\t\"a\" N"));
    }

    #[test]
    fn splits_sentences_on_blank_lines() {
        let input = "\"<a>\"\n\t\"a\" N #1->0\n\n\n\"<b>\"\n\t\"b\" V #1->0\n";
        let sentences = split_sentences(input);
        assert_eq!(sentences.len(), 2);
        assert!(sentences[1].starts_with("\"<b>\""));
    }
}
