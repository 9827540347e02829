use crate::layout::{ArcLayout, CurveArc, Layout, LineRole, TokenLayout};
use crate::theme::Theme;
use anyhow::Result;
use std::path::Path;

#[cfg(feature = "png")]
use crate::config::RenderConfig;

const ARROW_HALF_WIDTH: f32 = 5.0;
const ARROW_HALF_HEIGHT: f32 = 3.5;
const ARROW_POINTS_RIGHT: &str = "0 0, 10 3.5, 0 7";
const ARROW_POINTS_LEFT: &str = "0 3.5, 10 0, 10 7";

pub fn render_svg(layout: &Layout, theme: &Theme, corner_radius: f32) -> String {
    let mut svg = String::new();
    let width = layout.width;
    let height = layout.height;

    svg.push_str(&format!(
        "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{width:.2}\" height=\"{height:.2}\" viewBox=\"0 0 {width:.2} {height:.2}\">"
    ));
    if let Some(url) = theme.stylesheet_url.as_deref() {
        svg.push_str(&format!("<style>@import url({});</style>", escape_xml(url)));
    }
    svg.push_str(&format!(
        "<rect width=\"100%\" height=\"100%\" fill=\"{}\"/>",
        theme.background
    ));

    svg.push_str("<defs>");
    svg.push_str(&format!(
        "<marker id=\"arrowhead\" markerWidth=\"10\" markerHeight=\"7\" refX=\"0\" refY=\"3.5\" orient=\"auto\"><polygon points=\"{ARROW_POINTS_RIGHT}\" fill=\"{}\"/></marker>",
        theme.line_color
    ));
    svg.push_str("</defs>");

    svg.push_str("<g class=\"arcs\">");
    for arc in &layout.arcs {
        match arc {
            ArcLayout::Root {
                x, y_top, y_bottom, ..
            } => {
                svg.push_str(&format!(
                    "<line class=\"arc\" x1=\"{x:.2}\" y1=\"{y_top:.2}\" x2=\"{x:.2}\" y2=\"{y_bottom:.2}\" stroke=\"{}\" stroke-width=\"1\" marker-end=\"url(#arrowhead)\"/>",
                    theme.line_color
                ));
            }
            ArcLayout::Curve(curve) => svg.push_str(&curve_svg(curve, theme)),
        }
    }
    svg.push_str("</g>");

    svg.push_str("<g class=\"nodes\">");
    for token in &layout.tokens {
        svg.push_str(&token_svg(token, theme, corner_radius));
    }
    svg.push_str("</g>");

    svg.push_str("</svg>");
    svg
}

fn curve_svg(curve: &CurveArc, theme: &Theme) -> String {
    let mut out = String::new();
    let direction = curve.direction.as_str();
    out.push_str(&format!(
        "<path class=\"arc\" d=\"{}\" data-dir=\"{direction}\" fill=\"none\" stroke=\"{}\" stroke-width=\"1\"/>",
        curve.path_data(),
        theme.line_color
    ));
    let points = match curve.direction {
        crate::layout::ArcDirection::Left => ARROW_POINTS_LEFT,
        crate::layout::ArcDirection::Right => ARROW_POINTS_RIGHT,
    };
    out.push_str(&format!(
        "<polygon class=\"dir-{direction}\" transform=\"translate({:.2}, {:.2})\" points=\"{points}\" fill=\"{}\"/>",
        curve.arrow.0 - ARROW_HALF_WIDTH,
        curve.arrow.1 - ARROW_HALF_HEIGHT,
        theme.line_color
    ));
    out
}

fn token_svg(token: &TokenLayout, theme: &Theme, corner_radius: f32) -> String {
    let mut out = String::from("<g class=\"word\">");
    let mut rect_attrs = String::new();
    if let Some(dep) = token.dependency {
        rect_attrs.push_str(&format!(
            " class=\"ds{0}\" data-ds=\"{0}\" data-dp=\"{1}\"",
            dep.self_index, dep.parent_index
        ));
    }
    out.push_str(&format!(
        "<rect{rect_attrs} x=\"{:.2}\" y=\"{:.2}\" width=\"{:.2}\" height=\"{:.2}\" rx=\"{corner_radius}\" ry=\"{corner_radius}\" fill=\"{}\" stroke=\"{}\"/>",
        token.x, token.y, token.width, token.height, theme.box_fill, theme.box_stroke
    ));
    for line in &token.lines {
        let fill = match line.role {
            LineRole::WordForm => &theme.text_color,
            LineRole::BaseForm => &theme.base_form_color,
            LineRole::Tag => &theme.tag_color,
            LineRole::Dependency => &theme.dependency_color,
        };
        out.push_str(&format!(
            "<text class=\"{}\" x=\"{:.2}\" y=\"{:.2}\" text-anchor=\"middle\" dominant-baseline=\"hanging\" font-family=\"{}\" font-size=\"{}\" fill=\"{}\">{}</text>",
            line.role.css_class(),
            line.x,
            line.y,
            escape_xml(&theme.font_family),
            theme.font_size,
            fill,
            escape_xml(&line.text)
        ));
    }
    out.push_str("</g>");
    out
}

pub fn write_output_svg(svg: &str, output: Option<&Path>) -> Result<()> {
    match output {
        Some(path) => {
            std::fs::write(path, svg)?;
        }
        None => {
            print!("{}", svg);
        }
    }
    Ok(())
}

#[cfg(feature = "png")]
pub fn write_output_png(svg: &str, output: &Path, render_cfg: &RenderConfig, theme: &Theme) -> Result<()> {
    let mut opt = usvg::Options::default();
    opt.font_family = theme
        .font_family
        .split(',')
        .map(|family| family.trim().trim_matches('"').to_string())
        .find(|family| !family.is_empty())
        .unwrap_or_else(|| "sans-serif".to_string());
    opt.default_size = usvg::Size::from_wh(render_cfg.width, render_cfg.height)
        .ok_or_else(|| anyhow::anyhow!("Invalid default render size"))?;

    let tree = usvg::Tree::from_str(svg, &opt)?;
    let size = tree.size().to_int_size();
    let mut pixmap = resvg::tiny_skia::Pixmap::new(size.width(), size.height())
        .ok_or_else(|| anyhow::anyhow!("Failed to allocate pixmap"))?;

    let mut pixmap_mut = pixmap.as_mut();
    resvg::render(&tree, resvg::tiny_skia::Transform::default(), &mut pixmap_mut);
    pixmap.save_png(output)?;
    Ok(())
}

#[cfg(not(feature = "png"))]
pub fn write_output_png(
    _svg: &str,
    _output: &Path,
    _render_cfg: &crate::config::RenderConfig,
    _theme: &Theme,
) -> Result<()> {
    Err(anyhow::anyhow!("PNG output requires the `png` feature"))
}

fn escape_xml(input: &str) -> String {
    input
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}
