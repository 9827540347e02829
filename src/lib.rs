#[cfg(feature = "cli")]
pub mod cli;
pub mod config;
pub mod ir;
pub mod layout;
pub mod layout_dump;
pub mod parser;
pub mod render;
pub mod text_metrics;
pub mod theme;

#[cfg(feature = "cli")]
pub use cli::run;
pub use config::{LayoutConfig, load_config};
pub use layout::{Layout, LayoutError, compute_layout};
pub use parser::{contains_dependency_markers, parse_cohorts};
pub use render::render_svg;
pub use text_metrics::{
    FixedMeasurer, FontSpec, HeuristicMeasurer, SystemFontMeasurer, TextExtent, TextMeasurer,
};
pub use theme::Theme;

#[derive(Debug, Clone)]
pub struct RenderOptions {
    pub theme: Theme,
    pub layout: LayoutConfig,
    /// Measure with the built-in width table instead of installed fonts.
    pub fast_text: bool,
}

impl RenderOptions {
    pub fn inspector() -> Self {
        Self {
            theme: Theme::inspector(),
            layout: LayoutConfig::default(),
            fast_text: false,
        }
    }

    pub fn plain() -> Self {
        Self {
            theme: Theme::plain(),
            ..Self::inspector()
        }
    }

    pub fn with_fast_text(mut self, fast_text: bool) -> Self {
        self.fast_text = fast_text;
        self
    }
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self::inspector()
    }
}

/// Render one sentence of cohort text to an SVG document with default options.
pub fn render(text: &str) -> anyhow::Result<String> {
    render_with_options(text, RenderOptions::default())
}

pub fn render_with_options(text: &str, options: RenderOptions) -> anyhow::Result<String> {
    if options.fast_text {
        render_with_measurer(text, &HeuristicMeasurer, &options.theme, &options.layout)
    } else {
        render_with_measurer(text, &SystemFontMeasurer, &options.theme, &options.layout)
    }
}

pub fn render_with_measurer(
    text: &str,
    measurer: &dyn TextMeasurer,
    theme: &Theme,
    layout_config: &LayoutConfig,
) -> anyhow::Result<String> {
    let parsed = parse_cohorts(text);
    let layout = compute_layout(&parsed, measurer, theme, layout_config)?;
    Ok(render_svg(&layout, theme, layout_config.corner_radius))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fast_text_render_has_both_layers() {
        let svg = render_with_options(
            "\"<Cats>\"\n\t\"cat\" N NOM #1->2\n\"<meow>\"\n\t\"meow\" V #2->0\n",
            RenderOptions::plain().with_fast_text(true),
        )
        .unwrap();
        assert!(svg.contains("<g class=\"arcs\"><path"));
        assert_eq!(svg.matches("<g class=\"word\">").count(), 2);
    }

    #[test]
    fn invalid_config_fails_the_call() {
        let mut options = RenderOptions::default().with_fast_text(true);
        options.layout.max_arc_height = -1.0;
        assert!(render_with_options("\"<a>\"\n\t\"a\" N #1->0", options).is_err());
    }
}
