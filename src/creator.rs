//! The driver: parse, evaluate, commit.
//!
//! [`SelectionCreator`] wires the read-only collaborators and the mutable
//! selection store together. `evaluate` replaces the store's content when
//! the expression produces a selection and leaves it untouched on any
//! failure.

use tracing::{debug, info, warn};

use crate::error::{Result, SelectError};
use crate::evaluate::{Evaluator, Operand};
use crate::graph::LineageGraph;
use crate::model::{FeatureStore, SelectionStore, TagSetStore};
use crate::parse::parse_expression;
use crate::selection::Selection;

/// Creates selections from expression text.
pub struct SelectionCreator<'a> {
    graph: &'a LineageGraph,
    features: &'a FeatureStore,
    tags: &'a TagSetStore,
    selection: &'a mut SelectionStore,
}

impl<'a> SelectionCreator<'a> {
    pub fn new(
        graph: &'a LineageGraph,
        features: &'a FeatureStore,
        tags: &'a TagSetStore,
        selection: &'a mut SelectionStore,
    ) -> Self {
        Self {
            graph,
            features,
            tags,
            selection,
        }
    }

    /// Evaluates `expression` and, on success, replaces the live selection
    /// by the result in one atomic transition. On failure the store is left
    /// untouched and the error carries the first root cause.
    pub fn evaluate(&mut self, expression: &str) -> Result<Selection> {
        debug!(expression, "evaluating selection expression");
        let tree = parse_expression(expression)?;
        let result = {
            let evaluator =
                Evaluator::new(self.graph, self.features, self.tags, self.selection);
            evaluator.evaluate(&tree)
        };
        match result {
            Ok(Operand::Selection(selection)) => {
                selection.write_to_store(self.selection);
                info!(%selection, "selection replaced");
                Ok(selection)
            }
            Ok(other) => {
                let err = SelectError::UnexpectedResult(other.kind().to_owned());
                warn!(%err, "expression did not produce a selection");
                Err(err)
            }
            Err(err) => {
                warn!(%err, "evaluation failed");
                Err(err)
            }
        }
    }
}
