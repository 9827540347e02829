use crate::theme::Theme;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Geometry constants of the arc diagram, in pixels unless noted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LayoutConfig {
    /// Vertical band above the token row reserved for arcs.
    pub arc_band: f32,
    /// Arcs are flattened until none is taller than this.
    pub max_arc_height: f32,
    pub initial_curvature: f32,
    pub curvature_step: f32,
    /// x of the first token box.
    pub margin_left: f32,
    /// Offset of the box tops below the arc band.
    pub box_top: f32,
    pub box_padding_x: f32,
    pub box_padding_y: f32,
    /// Offset of the first text line below the box top.
    pub text_top: f32,
    pub line_gap: f32,
    /// Added to a token's text width to reach the next box.
    pub token_advance: f32,
    pub row_padding: f32,
    pub min_row_height: f32,
    pub canvas_padding: f32,
    pub corner_radius: f32,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            arc_band: 200.0,
            max_arc_height: 180.0,
            initial_curvature: 2.0,
            curvature_step: 0.25,
            margin_left: 20.0,
            box_top: 20.0,
            box_padding_x: 10.0,
            box_padding_y: 20.0,
            text_top: 10.0,
            line_gap: 5.0,
            token_advance: 30.0,
            row_padding: 60.0,
            min_row_height: 20.0,
            canvas_padding: 10.0,
            corner_radius: 3.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenderConfig {
    /// Fallback size for rasterising documents without intrinsic size.
    pub width: f32,
    pub height: f32,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            width: 1200.0,
            height: 800.0,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub theme: Theme,
    pub layout: LayoutConfig,
    pub render: RenderConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            theme: Theme::inspector(),
            layout: LayoutConfig::default(),
            render: RenderConfig::default(),
        }
    }
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct ThemeVariables {
    font_family: Option<String>,
    font_size: Option<f32>,
    line_height: Option<f32>,
    text_color: Option<String>,
    base_form_color: Option<String>,
    tag_color: Option<String>,
    dependency_color: Option<String>,
    box_fill: Option<String>,
    box_stroke: Option<String>,
    line_color: Option<String>,
    background: Option<String>,
    stylesheet_url: Option<String>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct LayoutConfigFile {
    arc_band: Option<f32>,
    max_arc_height: Option<f32>,
    initial_curvature: Option<f32>,
    curvature_step: Option<f32>,
    margin_left: Option<f32>,
    box_top: Option<f32>,
    box_padding_x: Option<f32>,
    box_padding_y: Option<f32>,
    text_top: Option<f32>,
    line_gap: Option<f32>,
    token_advance: Option<f32>,
    row_padding: Option<f32>,
    min_row_height: Option<f32>,
    canvas_padding: Option<f32>,
    corner_radius: Option<f32>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct RenderConfigFile {
    width: Option<f32>,
    height: Option<f32>,
    background: Option<String>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct ConfigFile {
    theme: Option<String>,
    theme_variables: Option<ThemeVariables>,
    layout: Option<LayoutConfigFile>,
    render: Option<RenderConfigFile>,
}

/// Load a JSON (or JSON5) config file on top of the defaults.
pub fn load_config(path: Option<&Path>) -> anyhow::Result<Config> {
    let Some(path) = path else {
        return Ok(Config::default());
    };
    let contents = std::fs::read_to_string(path)?;
    parse_config(&contents)
}

pub fn parse_config(contents: &str) -> anyhow::Result<Config> {
    let parsed: ConfigFile = json5::from_str(contents)?;
    let mut config = Config::default();

    if let Some(theme_name) = parsed.theme.as_deref() {
        match theme_name {
            "plain" => config.theme = Theme::plain(),
            "default" | "inspector" => config.theme = Theme::inspector(),
            other => tracing::warn!(theme = other, "unknown theme; keeping the default"),
        }
    }

    if let Some(vars) = parsed.theme_variables {
        apply_theme_variables(&mut config.theme, vars);
    }
    if let Some(layout) = parsed.layout {
        apply_layout(&mut config.layout, layout);
    }
    if let Some(render) = parsed.render {
        if let Some(v) = render.width {
            config.render.width = v;
        }
        if let Some(v) = render.height {
            config.render.height = v;
        }
        // The page colour lives on the theme; this wins over themeVariables.
        if let Some(v) = render.background {
            config.theme.background = v;
        }
    }

    Ok(config)
}

fn apply_theme_variables(theme: &mut Theme, vars: ThemeVariables) {
    if let Some(v) = vars.font_family {
        theme.font_family = v;
    }
    if let Some(v) = vars.font_size {
        theme.font_size = v;
    }
    if let Some(v) = vars.line_height {
        theme.line_height = v;
    }
    if let Some(v) = vars.text_color {
        theme.text_color = v;
    }
    if let Some(v) = vars.base_form_color {
        theme.base_form_color = v;
    }
    if let Some(v) = vars.tag_color {
        theme.tag_color = v;
    }
    if let Some(v) = vars.dependency_color {
        theme.dependency_color = v;
    }
    if let Some(v) = vars.box_fill {
        theme.box_fill = v;
    }
    if let Some(v) = vars.box_stroke {
        theme.box_stroke = v;
    }
    if let Some(v) = vars.line_color {
        theme.line_color = v;
    }
    if let Some(v) = vars.background {
        theme.background = v;
    }
    if let Some(v) = vars.stylesheet_url {
        // An empty URL switches the import off.
        theme.stylesheet_url = if v.trim().is_empty() { None } else { Some(v) };
    }
}

fn apply_layout(layout: &mut LayoutConfig, file: LayoutConfigFile) {
    let fields = [
        (file.arc_band, &mut layout.arc_band),
        (file.max_arc_height, &mut layout.max_arc_height),
        (file.initial_curvature, &mut layout.initial_curvature),
        (file.curvature_step, &mut layout.curvature_step),
        (file.margin_left, &mut layout.margin_left),
        (file.box_top, &mut layout.box_top),
        (file.box_padding_x, &mut layout.box_padding_x),
        (file.box_padding_y, &mut layout.box_padding_y),
        (file.text_top, &mut layout.text_top),
        (file.line_gap, &mut layout.line_gap),
        (file.token_advance, &mut layout.token_advance),
        (file.row_padding, &mut layout.row_padding),
        (file.min_row_height, &mut layout.min_row_height),
        (file.canvas_padding, &mut layout.canvas_padding),
        (file.corner_radius, &mut layout.corner_radius),
    ];
    for (value, slot) in fields {
        if let Some(value) = value {
            *slot = value;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_path_gives_defaults() {
        let config = load_config(None).unwrap();
        assert_eq!(config.layout.arc_band, 200.0);
        assert_eq!(config.layout.max_arc_height, 180.0);
        assert_eq!(
            config.theme.stylesheet_url.as_deref(),
            Some("/static/svg.css")
        );
    }

    #[test]
    fn json5_overrides_apply() {
        let config = parse_config(
            r##"{
                // comments are allowed
                theme: "plain",
                themeVariables: { fontSize: 18, lineColor: "#ff0000" },
                layout: { maxArcHeight: 120, curvatureStep: 0.5 },
                render: { width: 640 },
            }"##,
        )
        .unwrap();
        assert!(config.theme.stylesheet_url.is_none());
        assert_eq!(config.theme.font_size, 18.0);
        assert_eq!(config.theme.line_color, "#ff0000");
        assert_eq!(config.layout.max_arc_height, 120.0);
        assert_eq!(config.layout.curvature_step, 0.5);
        assert_eq!(config.layout.arc_band, 200.0);
        assert_eq!(config.render.width, 640.0);
    }

    #[test]
    fn empty_stylesheet_url_disables_import() {
        let config = parse_config(r#"{"themeVariables": {"stylesheetUrl": ""}}"#).unwrap();
        assert!(config.theme.stylesheet_url.is_none());
    }

    #[test]
    fn render_background_paints_the_page() {
        let config = parse_config(
            r##"{
                themeVariables: { background: "#eeeeee" },
                render: { background: "white" },
            }"##,
        )
        .unwrap();
        assert_eq!(config.theme.background, "white");

        let layout = crate::layout::compute_layout(
            &crate::parser::parse_cohorts("\"<a>\"\n\t\"a\" N #1->0\n"),
            &crate::text_metrics::FixedMeasurer::new(10.0, 20.0),
            &config.theme,
            &config.layout,
        )
        .unwrap();
        let svg = crate::render::render_svg(&layout, &config.theme, config.layout.corner_radius);
        assert!(svg.contains("<rect width=\"100%\" height=\"100%\" fill=\"white\"/>"));
    }

    #[test]
    fn malformed_config_is_an_error() {
        assert!(parse_config("{ layout: ").is_err());
    }
}
