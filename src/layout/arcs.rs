use std::collections::HashMap;

use crate::config::LayoutConfig;
use tracing::debug;

use super::types::{ArcDirection, ArcLayout, CurveArc, TokenLayout};

/// Smallest divisor, stepping up from `initial_curvature`, at which no span's
/// arc (`|span| / divisor` tall) exceeds `max_arc_height`.
///
/// Only the widest span matters, so the step count is solved directly rather
/// than by repeated addition, which stalls once a step falls below the f32
/// spacing of the divisor.
pub fn refine_curvature(spans: &[f32], config: &LayoutConfig) -> f32 {
    let initial = config.initial_curvature;
    let step = config.curvature_step;
    let max_height = config.max_arc_height;
    let widest = spans.iter().fold(0.0_f32, |acc, span| acc.max(span.abs()));
    if widest / initial <= max_height {
        return initial;
    }

    let steps = ((widest / max_height - initial) / step).ceil().max(0.0);
    let mut divisor = initial + step * steps;
    // Rounding can leave the solved divisor one step short.
    if widest / divisor > max_height {
        divisor += step;
    }
    divisor
}

struct PendingCurve {
    token: usize,
    governor: usize,
    start_x: f32,
    end_x: f32,
}

/// Build root lines and curves for every token carrying a dependency.
pub(super) fn build_arcs(tokens: &[TokenLayout], config: &LayoutConfig) -> (Vec<ArcLayout>, f32) {
    // Later tokens win when ids repeat.
    let mut by_id: HashMap<u32, usize> = HashMap::new();
    for (idx, token) in tokens.iter().enumerate() {
        if let Some(dep) = token.dependency {
            by_id.insert(dep.self_index, idx);
        }
    }

    let baseline_y = config.arc_band + config.box_top;
    let mut slots: Vec<Option<ArcLayout>> = Vec::new();
    let mut pending: Vec<(usize, PendingCurve)> = Vec::new();

    for (idx, token) in tokens.iter().enumerate() {
        let Some(dep) = token.dependency else {
            continue;
        };
        let start_x = token.center_x();
        let governor = if dep.is_root() {
            None
        } else {
            let found = by_id.get(&dep.parent_index).copied();
            if found.is_none() {
                debug!(
                    token = idx,
                    parent = dep.parent_index,
                    "governor not found; drawing as root"
                );
            }
            found
        };

        let Some(governor) = governor else {
            slots.push(Some(ArcLayout::Root {
                token: idx,
                x: start_x,
                y_top: config.box_top,
                y_bottom: baseline_y,
            }));
            continue;
        };

        let end_x = tokens[governor].center_x();
        if start_x == end_x {
            continue;
        }
        pending.push((
            slots.len(),
            PendingCurve {
                token: idx,
                governor,
                start_x,
                end_x,
            },
        ));
        slots.push(None);
    }

    let spans: Vec<f32> = pending
        .iter()
        .map(|(_, curve)| curve.start_x - curve.end_x)
        .collect();
    let divisor = refine_curvature(&spans, config);
    debug!(divisor, curves = pending.len(), "curvature settled");

    for (slot, curve) in pending {
        slots[slot] = Some(ArcLayout::Curve(finish_curve(curve, divisor, baseline_y)));
    }
    (slots.into_iter().flatten().collect(), divisor)
}

fn finish_curve(curve: PendingCurve, divisor: f32, baseline_y: f32) -> CurveArc {
    let span = (curve.start_x - curve.end_x).abs();
    let rx = span / 2.0;
    let ry = span / divisor;
    // The half-ellipse is symmetric, so its length midpoint is the apex.
    let arrow = ((curve.start_x + curve.end_x) / 2.0, baseline_y - ry);
    CurveArc {
        token: curve.token,
        governor: curve.governor,
        start_x: curve.start_x,
        end_x: curve.end_x,
        baseline_y,
        rx,
        ry,
        direction: ArcDirection::between(curve.start_x, curve.end_x),
        arrow,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::Dependency;

    fn token(index: usize, x: f32, width: f32, dep: Option<(u32, u32)>) -> TokenLayout {
        TokenLayout {
            index,
            x,
            y: 220.0,
            width,
            height: 100.0,
            lines: Vec::new(),
            dependency: dep.map(|(self_index, parent_index)| Dependency {
                self_index,
                parent_index,
            }),
        }
    }

    #[test]
    fn short_spans_keep_initial_divisor() {
        let config = LayoutConfig::default();
        assert_eq!(refine_curvature(&[80.0, -200.0], &config), 2.0);
        assert_eq!(refine_curvature(&[], &config), 2.0);
    }

    #[test]
    fn long_span_flattens_in_quarter_steps() {
        let config = LayoutConfig::default();
        // 450 / 2.5 == 180 is within budget; 2.25 is not.
        assert_eq!(refine_curvature(&[450.0], &config), 2.5);
        assert_eq!(refine_curvature(&[-1000.0], &config), 5.75);
    }

    #[test]
    fn divisor_is_monotone_across_spans() {
        let config = LayoutConfig::default();
        let mut spans = Vec::new();
        let mut last = config.initial_curvature;
        for span in [100.0, 900.0, 50.0, 1800.0, 10.0] {
            spans.push(span);
            let divisor = refine_curvature(&spans, &config);
            assert!(divisor >= last);
            last = divisor;
        }
        assert_eq!(last, 10.0);
    }

    #[test]
    fn tiny_step_still_settles() {
        let config = LayoutConfig {
            curvature_step: 1e-8,
            ..LayoutConfig::default()
        };
        let divisor = refine_curvature(&[400.0], &config);
        assert!(divisor.is_finite());
        assert!((400.0 / divisor - config.max_arc_height).abs() < 0.01);
    }

    #[test]
    fn tiny_arc_budget_still_settles() {
        let config = LayoutConfig {
            max_arc_height: 1e-6,
            ..LayoutConfig::default()
        };
        let divisor = refine_curvature(&[400.0], &config);
        assert!(divisor.is_finite());
        assert!(400.0 / divisor <= config.max_arc_height * 1.001);
    }

    #[test]
    fn every_curve_fits_the_budget() {
        let config = LayoutConfig::default();
        let tokens = vec![
            token(0, 20.0, 60.0, Some((1, 3))),
            token(1, 100.0, 60.0, Some((2, 3))),
            token(2, 1500.0, 60.0, Some((3, 0))),
        ];
        let (arcs, divisor) = build_arcs(&tokens, &config);
        assert_eq!(arcs.len(), 3);
        assert!(divisor > config.initial_curvature);
        for arc in &arcs {
            if let ArcLayout::Curve(curve) = arc {
                assert!(curve.height() <= config.max_arc_height);
                assert_eq!(curve.ry, (curve.start_x - curve.end_x).abs() / divisor);
                assert_eq!(curve.direction, ArcDirection::Right);
            }
        }
    }

    #[test]
    fn root_and_unresolved_parents_become_vertical_lines() {
        let config = LayoutConfig::default();
        let tokens = vec![
            token(0, 20.0, 60.0, Some((1, 0))),
            token(1, 100.0, 60.0, Some((2, 9))),
        ];
        let (arcs, _) = build_arcs(&tokens, &config);
        assert_eq!(
            arcs,
            vec![
                ArcLayout::Root {
                    token: 0,
                    x: 50.0,
                    y_top: 20.0,
                    y_bottom: 220.0,
                },
                ArcLayout::Root {
                    token: 1,
                    x: 130.0,
                    y_top: 20.0,
                    y_bottom: 220.0,
                },
            ]
        );
    }

    #[test]
    fn self_loop_draws_nothing() {
        let config = LayoutConfig::default();
        let tokens = vec![token(0, 20.0, 60.0, Some((4, 4)))];
        let (arcs, divisor) = build_arcs(&tokens, &config);
        assert!(arcs.is_empty());
        assert_eq!(divisor, 2.0);
    }

    #[test]
    fn leftward_arc_and_midpoint() {
        let config = LayoutConfig::default();
        let tokens = vec![
            token(0, 20.0, 60.0, Some((1, 0))),
            token(1, 100.0, 60.0, Some((2, 1))),
        ];
        let (arcs, _) = build_arcs(&tokens, &config);
        let ArcLayout::Curve(curve) = &arcs[1] else {
            panic!("expected a curve, got {:?}", arcs[1]);
        };
        assert_eq!(curve.direction, ArcDirection::Left);
        assert_eq!(curve.sweep_flag(), 0);
        assert_eq!(curve.rx, 40.0);
        assert_eq!(curve.ry, 40.0);
        assert_eq!(curve.arrow, (90.0, 180.0));
        assert_eq!(curve.path_data(), "M 130.00 220.00 A 40.00 40.00 0 0 0 50.00 220.00");
    }

    #[test]
    fn repeated_ids_resolve_to_the_last_token() {
        let config = LayoutConfig::default();
        let tokens = vec![
            token(0, 20.0, 60.0, Some((1, 2))),
            token(1, 100.0, 60.0, Some((2, 0))),
            token(2, 180.0, 60.0, Some((2, 0))),
        ];
        let (arcs, _) = build_arcs(&tokens, &config);
        let governor = arcs.iter().find_map(|arc| match arc {
            ArcLayout::Curve(curve) => Some(curve.governor),
            ArcLayout::Root { .. } => None,
        });
        assert_eq!(governor, Some(2));
    }
}
