mod arcs;
mod error;
mod text;
pub(crate) mod types;

pub use arcs::refine_curvature;
pub use error::LayoutError;
pub use types::*;

use crate::config::LayoutConfig;
use crate::ir::ParseOutput;
use crate::text_metrics::TextMeasurer;
use crate::theme::Theme;
use tracing::debug;

use arcs::build_arcs;
use text::measure_token;

/// Lay out a parsed sentence: token boxes left to right, then arcs above them.
///
/// Measurement gaps are tolerated; unusable measurements or an invalid
/// config fail the whole call.
pub fn compute_layout(
    parsed: &ParseOutput,
    measurer: &dyn TextMeasurer,
    theme: &Theme,
    config: &LayoutConfig,
) -> Result<Layout, LayoutError> {
    validate_config(config)?;
    let font = theme.font();

    let row_top = config.arc_band + config.box_top;
    let mut cursor = config.margin_left;
    let mut row_height = config.min_row_height;
    let mut tokens = Vec::with_capacity(parsed.tokens.len());

    for (index, token) in parsed.tokens.iter().enumerate() {
        let measured = measure_token(token, measurer, &font)?;
        let line_count = measured.lines.len() as f32;
        let mw = measured.max_width;
        let mh = measured.max_height;
        let stacked = line_count * mh + line_count * config.line_gap;

        let center_x = cursor + config.box_padding_x + mw / 2.0;
        let lines = measured
            .lines
            .into_iter()
            .enumerate()
            .map(|(j, line)| TextLine {
                text: line.text,
                role: line.role,
                x: center_x,
                y: row_top + config.text_top + j as f32 * (mh + config.line_gap),
                width: line.extent.width,
                height: line.extent.height,
            })
            .collect();

        tokens.push(TokenLayout {
            index,
            x: cursor,
            y: row_top,
            width: mw + 2.0 * config.box_padding_x,
            height: stacked + config.box_padding_y,
            lines,
            dependency: token.dependency,
        });

        row_height = row_height.max(stacked + config.row_padding);
        cursor += mw + config.token_advance;
    }

    let (arcs, curvature_divisor) = build_arcs(&tokens, config);
    let layout = Layout {
        tokens,
        arcs,
        curvature_divisor,
        width: cursor + config.canvas_padding,
        height: row_height + config.arc_band,
    };
    debug!(
        tokens = layout.tokens.len(),
        arcs = layout.arcs.len(),
        width = layout.width,
        height = layout.height,
        "layout computed"
    );
    Ok(layout)
}

// Below these the arc pass degenerates: steps vanish against the divisor's
// f32 spacing, and sub-pixel arcs cannot be drawn.
const MIN_CURVATURE_STEP: f32 = 1e-3;
const MIN_ARC_HEIGHT: f32 = 1.0;

fn validate_config(config: &LayoutConfig) -> Result<(), LayoutError> {
    let positive = [
        ("initialCurvature", config.initial_curvature),
        ("curvatureStep", config.curvature_step),
        ("maxArcHeight", config.max_arc_height),
    ];
    for (name, value) in positive {
        if !(value.is_finite() && value > 0.0) {
            return Err(LayoutError::InvalidConfig(format!(
                "{name} must be a positive number, got {value}"
            )));
        }
    }
    if config.curvature_step < MIN_CURVATURE_STEP {
        return Err(LayoutError::InvalidConfig(format!(
            "curvatureStep must be at least {MIN_CURVATURE_STEP}, got {}",
            config.curvature_step
        )));
    }
    if config.max_arc_height < MIN_ARC_HEIGHT {
        return Err(LayoutError::InvalidConfig(format!(
            "maxArcHeight must be at least {MIN_ARC_HEIGHT}, got {}",
            config.max_arc_height
        )));
    }
    Ok(())
}
