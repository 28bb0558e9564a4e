//! Reformatter
//!
//! Applies the style registry to a classified document: page layout,
//! table captions and borders, paragraph styles, figure captions and
//! formula numbers. Figure and formula counters live on the
//! [`Reformatter`] and start at 1 for every run.

mod figures;
mod formula;
mod pages;
mod paragraphs;
mod tables;

use std::collections::HashSet;
use std::path::Path;

use gostfmt_ast::{DocumentEditor, NodeId, Persist, RunFormat};

use crate::classify::{ClassifiedParagraph, Role};
use crate::error::{ConvertError, Result};
use crate::styles::StyleRegistry;

pub use figures::figure_title;
pub use formula::numbered_formula_text;
pub use paragraphs::{bullet_text, heading_text};
pub use tables::table_title;

/// Separator between a caption number and its title (U+2212)
pub const CAPTION_DASH: &str = "−";
/// Title used when a caption has none
pub const EMPTY_TITLE: &str = "[]";

/// Optional reformatting behaviour
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ReformatOptions {
    /// Number formula paragraphs as `formula,\t(N)`
    pub number_formulas: bool,
}

/// One reformatting run over one document
pub struct Reformatter<'a, D: DocumentEditor + ?Sized> {
    doc: &'a mut D,
    classified: Vec<ClassifiedParagraph>,
    registry: &'a StyleRegistry,
    options: ReformatOptions,
    figure_counter: usize,
    formula_counter: usize,
    /// Captions written during this run; never taken as existing captions
    generated: HashSet<NodeId>,
}

impl<'a, D: DocumentEditor + ?Sized> Reformatter<'a, D> {
    /// Install the registry styles into `doc` and prepare a run
    pub fn new(
        doc: &'a mut D,
        classified: Vec<ClassifiedParagraph>,
        registry: &'a StyleRegistry,
    ) -> Self {
        registry.install(&mut *doc);
        Self {
            doc,
            classified,
            registry,
            options: ReformatOptions::default(),
            figure_counter: 1,
            formula_counter: 1,
            generated: HashSet::new(),
        }
    }

    pub fn with_options(mut self, options: ReformatOptions) -> Self {
        self.options = options;
        self
    }

    /// Next figure number
    pub fn figure_counter(&self) -> usize {
        self.figure_counter
    }

    /// Next formula number
    pub fn formula_counter(&self) -> usize {
        self.formula_counter
    }

    /// Pages, then tables, then every classified paragraph
    pub fn apply(&mut self) {
        self.format_pages();
        self.format_tables();
        self.format_paragraphs();
        tracing::info!(
            figures = self.figure_counter - 1,
            formulas = self.formula_counter - 1,
            "reformatted document"
        );
    }

    /// [`apply`](Self::apply) and save the result to `output`
    pub fn start(&mut self, output: &Path) -> Result<()>
    where
        D: Persist,
    {
        self.apply();
        self.doc.save(output).map_err(ConvertError::document)
    }

    fn format_paragraphs(&mut self) {
        for index in 0..self.classified.len() {
            let (role, level, par) = {
                let c = &self.classified[index];
                (c.role, c.level, c.par)
            };
            if self.doc.node_kind(par).is_none() {
                tracing::debug!(index, %role, "paragraph no longer in document");
                continue;
            }
            match role {
                Role::Heading => self.format_heading(par, level),
                Role::ListBullet => self.format_bullet(par),
                Role::ListNumber => self.format_numbered(par),
                Role::Normal => self.format_normal(par),
                Role::Image => self.format_image(par),
                Role::Code => self.format_code(par),
                Role::Formula if self.options.number_formulas => self.format_formula(par),
                Role::Empty => self.format_empty(par, index),
                Role::Formula | Role::TableCaption | Role::ImageCaption => {}
            }
        }
    }

    /// Insert a caption paragraph holding `text` at body `position`
    fn insert_caption(&mut self, position: usize, text: &str) -> NodeId {
        let caption = self.doc.insert_paragraph(position);
        self.doc.add_run(caption, text, &RunFormat::default());
        self.generated.insert(caption);
        caption
    }
}
