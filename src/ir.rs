use serde::Serialize;

/// Head/dependent relation carried by a cohort's `#self->parent` marker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Dependency {
    pub self_index: u32,
    pub parent_index: u32,
}

impl Dependency {
    /// Parent id 0 attaches the token to the sentence root.
    pub fn is_root(&self) -> bool {
        self.parent_index == 0
    }
}

/// One annotation line of a reading, classified by role.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum Annotation {
    BaseForm(String),
    DependencyMarker(String),
    Tag(String),
}

impl Annotation {
    pub fn text(&self) -> &str {
        match self {
            Annotation::BaseForm(text)
            | Annotation::DependencyMarker(text)
            | Annotation::Tag(text) => text,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Token {
    pub surface_form: String,
    pub base_forms: Vec<String>,
    pub tags: Vec<String>,
    pub dependency: Option<Dependency>,
    /// Every annotation line in input order; these are rendered below the surface form.
    pub annotations: Vec<Annotation>,
}

impl Token {
    pub fn new(surface_form: impl Into<String>) -> Self {
        Self {
            surface_form: surface_form.into(),
            base_forms: Vec::new(),
            tags: Vec::new(),
            dependency: None,
            annotations: Vec::new(),
        }
    }

    pub fn push_annotation(&mut self, annotation: Annotation) {
        match &annotation {
            Annotation::BaseForm(text) => self.base_forms.push(text.clone()),
            Annotation::Tag(text) => self.tags.push(text.clone()),
            Annotation::DependencyMarker(_) => {}
        }
        self.annotations.push(annotation);
    }

    /// Number of text lines the token occupies: surface form plus annotations.
    pub fn line_count(&self) -> usize {
        1 + self.annotations.len()
    }
}

#[derive(Debug, Clone, Default)]
pub struct ParseOutput {
    pub tokens: Vec<Token>,
    /// Chunks that did not look like a cohort; kept for diagnostics.
    pub skipped: Vec<String>,
}

impl ParseOutput {
    pub fn has_dependencies(&self) -> bool {
        self.tokens.iter().any(|token| token.dependency.is_some())
    }
}
