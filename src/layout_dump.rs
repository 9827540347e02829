use crate::ir::ParseOutput;
use crate::layout::{ArcLayout, Layout};
use serde::Serialize;
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

/// JSON-friendly snapshot of a computed layout, for debugging geometry.
#[derive(Debug, Serialize)]
pub struct LayoutDump {
    pub width: f32,
    pub height: f32,
    pub curvature_divisor: f32,
    pub tokens: Vec<TokenDump>,
    pub arcs: Vec<ArcDump>,
    pub skipped: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct TokenDump {
    pub index: usize,
    pub surface_form: String,
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub lines: Vec<LineDump>,
    pub self_index: Option<u32>,
    pub parent_index: Option<u32>,
}

#[derive(Debug, Serialize)]
pub struct LineDump {
    pub text: String,
    pub role: &'static str,
    pub x: f32,
    pub y: f32,
}

#[derive(Debug, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ArcDump {
    Root {
        token: usize,
        x: f32,
        y_top: f32,
        y_bottom: f32,
    },
    Curve {
        token: usize,
        governor: usize,
        path: String,
        direction: &'static str,
        arrow: [f32; 2],
    },
}

impl LayoutDump {
    pub fn from_layout(layout: &Layout, parsed: &ParseOutput) -> Self {
        let tokens = layout
            .tokens
            .iter()
            .map(|token| TokenDump {
                index: token.index,
                surface_form: parsed
                    .tokens
                    .get(token.index)
                    .map(|t| t.surface_form.clone())
                    .unwrap_or_default(),
                x: token.x,
                y: token.y,
                width: token.width,
                height: token.height,
                lines: token
                    .lines
                    .iter()
                    .map(|line| LineDump {
                        text: line.text.clone(),
                        role: line.role.css_class(),
                        x: line.x,
                        y: line.y,
                    })
                    .collect(),
                self_index: token.dependency.map(|dep| dep.self_index),
                parent_index: token.dependency.map(|dep| dep.parent_index),
            })
            .collect();

        let arcs = layout
            .arcs
            .iter()
            .map(|arc| match arc {
                ArcLayout::Root {
                    token,
                    x,
                    y_top,
                    y_bottom,
                } => ArcDump::Root {
                    token: *token,
                    x: *x,
                    y_top: *y_top,
                    y_bottom: *y_bottom,
                },
                ArcLayout::Curve(curve) => ArcDump::Curve {
                    token: curve.token,
                    governor: curve.governor,
                    path: curve.path_data(),
                    direction: curve.direction.as_str(),
                    arrow: [curve.arrow.0, curve.arrow.1],
                },
            })
            .collect();

        LayoutDump {
            width: layout.width,
            height: layout.height,
            curvature_divisor: layout.curvature_divisor,
            tokens,
            arcs,
            skipped: parsed.skipped.clone(),
        }
    }
}

pub fn write_layout_dump(path: &Path, layout: &Layout, parsed: &ParseOutput) -> anyhow::Result<()> {
    let file = File::create(path)?;
    let writer = BufWriter::new(file);
    let dump = LayoutDump::from_layout(layout, parsed);
    serde_json::to_writer_pretty(writer, &dump)?;
    Ok(())
}
