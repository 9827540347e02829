use crate::ir::{Annotation, Token};
use crate::text_metrics::{FontSpec, TextExtent, TextMeasurer};
use tracing::warn;

use super::error::{LayoutError, Result};
use super::types::LineRole;

pub(super) struct MeasuredLine {
    pub text: String,
    pub role: LineRole,
    pub extent: TextExtent,
}

/// Every line of a token with its extent, plus the widest width and tallest height.
pub(super) struct MeasuredToken {
    pub lines: Vec<MeasuredLine>,
    pub max_width: f32,
    pub max_height: f32,
}

pub(super) fn token_lines(token: &Token) -> Vec<(String, LineRole)> {
    let mut lines = Vec::with_capacity(token.line_count());
    lines.push((token.surface_form.clone(), LineRole::WordForm));
    for annotation in &token.annotations {
        let role = match annotation {
            Annotation::BaseForm(_) => LineRole::BaseForm,
            Annotation::DependencyMarker(_) => LineRole::Dependency,
            Annotation::Tag(_) => LineRole::Tag,
        };
        lines.push((annotation.text().to_string(), role));
    }
    lines
}

pub(super) fn measure_token(
    token: &Token,
    measurer: &dyn TextMeasurer,
    font: &FontSpec,
) -> Result<MeasuredToken> {
    let mut lines = Vec::with_capacity(token.line_count());
    let mut max_width = 0.0f32;
    let mut max_height = 0.0f32;
    for (text, role) in token_lines(token) {
        let extent = match measurer.measure(&text, font) {
            Some(extent) => check_extent(&text, extent)?,
            None => {
                warn!(text = %text, "text measurement unavailable; line takes no space");
                TextExtent::default()
            }
        };
        max_width = max_width.max(extent.width);
        max_height = max_height.max(extent.height);
        lines.push(MeasuredLine { text, role, extent });
    }
    Ok(MeasuredToken {
        lines,
        max_width,
        max_height,
    })
}

fn check_extent(text: &str, extent: TextExtent) -> Result<TextExtent> {
    let usable = |value: f32| value.is_finite() && value >= 0.0;
    if usable(extent.width) && usable(extent.height) {
        Ok(extent)
    } else {
        Err(LayoutError::InvalidMeasurement {
            text: text.to_string(),
            width: extent.width,
            height: extent.height,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_cohorts;
    use crate::text_metrics::FixedMeasurer;

    struct Unavailable;

    impl TextMeasurer for Unavailable {
        fn measure(&self, text: &str, _font: &FontSpec) -> Option<TextExtent> {
            (text != "cat").then_some(TextExtent {
                width: 8.0,
                height: 12.0,
            })
        }
    }

    struct Broken;

    impl TextMeasurer for Broken {
        fn measure(&self, _text: &str, _font: &FontSpec) -> Option<TextExtent> {
            Some(TextExtent {
                width: f32::NAN,
                height: 12.0,
            })
        }
    }

    fn font() -> FontSpec {
        FontSpec {
            family: "sans-serif".to_string(),
            size: 14.0,
            line_height: 1.25,
        }
    }

    fn cats() -> Token {
        parse_cohorts("\"<Cats>\"\n\t\"cat\" N NOM #1->2\n").tokens.remove(0)
    }

    #[test]
    fn lines_follow_annotation_order() {
        let roles: Vec<LineRole> = token_lines(&cats()).into_iter().map(|(_, role)| role).collect();
        assert_eq!(
            roles,
            vec![
                LineRole::WordForm,
                LineRole::BaseForm,
                LineRole::Tag,
                LineRole::Tag,
                LineRole::Dependency,
            ]
        );
    }

    #[test]
    fn maxima_cover_every_line() {
        let measured = measure_token(&cats(), &FixedMeasurer::new(10.0, 20.0), &font()).unwrap();
        assert_eq!(measured.lines.len(), 5);
        assert_eq!(measured.max_width, 50.0);
        assert_eq!(measured.max_height, 20.0);
    }

    #[test]
    fn unavailable_measurement_keeps_the_line() {
        let measured = measure_token(&cats(), &Unavailable, &font()).unwrap();
        assert_eq!(measured.lines.len(), 5);
        assert_eq!(measured.lines[1].extent, TextExtent::default());
        assert_eq!(measured.max_width, 8.0);
    }

    #[test]
    fn non_finite_measurement_is_fatal() {
        let err = measure_token(&cats(), &Broken, &font()).err().unwrap();
        assert!(matches!(err, LayoutError::InvalidMeasurement { .. }));
    }
}
