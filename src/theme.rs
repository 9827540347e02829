use serde::{Deserialize, Serialize};

use crate::text_metrics::FontSpec;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Theme {
    pub font_family: String,
    pub font_size: f32,
    pub line_height: f32,
    pub text_color: String,
    pub base_form_color: String,
    pub tag_color: String,
    pub dependency_color: String,
    pub box_fill: String,
    pub box_stroke: String,
    pub line_color: String,
    pub background: String,
    /// Imported from the generated document so a page stylesheet can restyle it.
    pub stylesheet_url: Option<String>,
}

impl Theme {
    /// Colours of the regression-test inspector page.
    pub fn inspector() -> Self {
        Self {
            font_family: "\"Segoe UI\", Roboto, \"Helvetica Neue\", Arial, sans-serif".to_string(),
            font_size: 14.0,
            line_height: 1.25,
            text_color: "#212529".to_string(),
            base_form_color: "#0D6EFD".to_string(),
            tag_color: "#198754".to_string(),
            dependency_color: "#6C757D".to_string(),
            box_fill: "#F8F9FA".to_string(),
            box_stroke: "#ADB5BD".to_string(),
            line_color: "#343A40".to_string(),
            background: "#FFFFFF".to_string(),
            stylesheet_url: Some("/static/svg.css".to_string()),
        }
    }

    /// Black on white without an external stylesheet, for standalone files.
    pub fn plain() -> Self {
        Self {
            font_family: "sans-serif".to_string(),
            font_size: 14.0,
            line_height: 1.25,
            text_color: "#000000".to_string(),
            base_form_color: "#000000".to_string(),
            tag_color: "#333333".to_string(),
            dependency_color: "#666666".to_string(),
            box_fill: "#FFFFFF".to_string(),
            box_stroke: "#000000".to_string(),
            line_color: "#000000".to_string(),
            background: "#FFFFFF".to_string(),
            stylesheet_url: None,
        }
    }

    pub fn font(&self) -> FontSpec {
        FontSpec {
            family: self.font_family.clone(),
            size: self.font_size,
            line_height: self.line_height,
        }
    }
}

impl Default for Theme {
    fn default() -> Self {
        Self::inspector()
    }
}
