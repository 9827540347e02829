use dep2svg::{RenderOptions, render_with_options};
use serde::Deserialize;
use wasm_bindgen::prelude::*;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DepRenderOptions {
    theme: Option<String>,
    font_family: Option<String>,
    font_size: Option<f32>,
    stylesheet_url: Option<String>,
    max_arc_height: Option<f32>,
}

fn build_render_options(options: DepRenderOptions) -> RenderOptions {
    let mut render_options = if options.theme.as_deref() == Some("plain") {
        RenderOptions::plain()
    } else {
        RenderOptions::inspector()
    };
    // No font files in the browser sandbox.
    render_options.fast_text = true;

    if let Some(font_family) = options.font_family {
        render_options.theme.font_family = font_family;
    }
    if let Some(font_size) = options.font_size {
        render_options.theme.font_size = font_size;
    }
    if let Some(url) = options.stylesheet_url {
        render_options.theme.stylesheet_url = if url.is_empty() { None } else { Some(url) };
    }
    if let Some(height) = options.max_arc_height {
        render_options.layout.max_arc_height = height;
    }

    render_options
}

/// Render one sentence of cohort text. Errors surface as JS exceptions so the
/// page can hide the graph panel.
#[wasm_bindgen]
pub fn render_dep_svg(text: &str, options_json: Option<String>) -> Result<String, JsValue> {
    let options = if let Some(raw_options) = options_json {
        serde_json::from_str::<DepRenderOptions>(&raw_options)
            .map_err(|error| JsValue::from_str(&error.to_string()))?
    } else {
        DepRenderOptions::default()
    };

    render_with_options(text, build_render_options(options))
        .map_err(|error| JsValue::from_str(&error.to_string()))
}

#[wasm_bindgen]
pub fn has_dependency_markers(text: &str) -> bool {
    dep2svg::contains_dependency_markers(text)
}

#[cfg(test)]
mod tests {
    use dep2svg::render_with_options;

    use crate::{DepRenderOptions, build_render_options};

    #[test]
    fn renders_arcs_with_default_options() {
        let text = "\"<Cats>\"\n\t\"cat\" N NOM #1->2\n\"<meow>\"\n\t\"meow\" V #2->0\n";

        let svg = render_with_options(text, build_render_options(DepRenderOptions::default()))
            .expect("two-token sentence should render");

        assert!(svg.contains("<svg"));
        assert!(svg.contains("class=\"arc\""));
        assert!(svg.contains("meow"));
    }

    #[test]
    fn empty_stylesheet_url_drops_import() {
        let options = build_render_options(DepRenderOptions {
            stylesheet_url: Some(String::new()),
            ..DepRenderOptions::default()
        });
        assert!(options.theme.stylesheet_url.is_none());
        assert!(options.fast_text);
    }
}
