use crate::ir::Dependency;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineRole {
    WordForm,
    BaseForm,
    Tag,
    Dependency,
}

impl LineRole {
    /// Class name understood by the inspector stylesheet.
    pub fn css_class(self) -> &'static str {
        match self {
            LineRole::WordForm => "wform",
            LineRole::BaseForm => "bform",
            LineRole::Tag => "tags",
            LineRole::Dependency => "dep",
        }
    }
}

/// One text line inside a token box. `x` is the horizontal centre, `y` the line top.
#[derive(Debug, Clone, PartialEq)]
pub struct TextLine {
    pub text: String,
    pub role: LineRole,
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TokenLayout {
    /// Position in the input sequence.
    pub index: usize,
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub lines: Vec<TextLine>,
    pub dependency: Option<Dependency>,
}

impl TokenLayout {
    pub fn center_x(&self) -> f32 {
        self.x + self.width / 2.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArcDirection {
    Left,
    Right,
}

impl ArcDirection {
    pub fn between(start_x: f32, end_x: f32) -> Self {
        if start_x < end_x {
            ArcDirection::Right
        } else {
            ArcDirection::Left
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ArcDirection::Left => "left",
            ArcDirection::Right => "right",
        }
    }
}

/// Half-ellipse above the token row from a dependent to its governor.
#[derive(Debug, Clone, PartialEq)]
pub struct CurveArc {
    /// Index of the dependent token.
    pub token: usize,
    /// Index of the governor token.
    pub governor: usize,
    pub start_x: f32,
    pub end_x: f32,
    pub baseline_y: f32,
    pub rx: f32,
    pub ry: f32,
    pub direction: ArcDirection,
    /// Midpoint of the arc by path length, where the direction marker sits.
    pub arrow: (f32, f32),
}

impl CurveArc {
    /// Height of the arc's bounding box.
    pub fn height(&self) -> f32 {
        self.ry
    }

    pub fn sweep_flag(&self) -> u8 {
        match self.direction {
            ArcDirection::Right => 1,
            ArcDirection::Left => 0,
        }
    }

    pub fn path_data(&self) -> String {
        format!(
            "M {:.2} {:.2} A {:.2} {:.2} 0 0 {} {:.2} {:.2}",
            self.start_x,
            self.baseline_y,
            self.rx,
            self.ry,
            self.sweep_flag(),
            self.end_x,
            self.baseline_y
        )
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ArcLayout {
    /// Root attachment: a vertical line ending in an arrowhead at the token row.
    Root {
        token: usize,
        x: f32,
        y_top: f32,
        y_bottom: f32,
    },
    Curve(CurveArc),
}

impl ArcLayout {
    pub fn token(&self) -> usize {
        match self {
            ArcLayout::Root { token, .. } => *token,
            ArcLayout::Curve(curve) => curve.token,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Layout {
    pub tokens: Vec<TokenLayout>,
    pub arcs: Vec<ArcLayout>,
    /// Shared divisor every arc's minor radius was computed with.
    pub curvature_divisor: f32,
    pub width: f32,
    pub height: f32,
}

impl Layout {
    pub fn curves(&self) -> impl Iterator<Item = &CurveArc> {
        self.arcs.iter().filter_map(|arc| match arc {
            ArcLayout::Curve(curve) => Some(curve),
            ArcLayout::Root { .. } => None,
        })
    }
}
