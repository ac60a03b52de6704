//! The expression evaluator: a postorder tree-walking interpreter over a
//! dynamically-typed operand domain.
//!
//! Operands are a closed tagged union ([`Operand`]); every operator handler
//! matches exhaustively on the kinds it supports and rejects the rest with a
//! descriptive type error. Bare identifiers stay [`Operand::Name`] until
//! they are consumed: the three ambient names (`selection`,
//! `vertexSelection`, `edgeSelection`) resolve to snapshots of the live
//! store, anything else is kept unresolved so that a forgotten pair of
//! quotation marks can be reported as such.
//!
//! Failures propagate as `Err` through `?`, which aborts the walk at the
//! first broken node — the root cause is the error surfaced, later
//! subexpressions are never evaluated and can never overwrite it.

use crate::error::{Result, SelectError};
use crate::graph::LineageGraph;
use crate::model::{FeatureStore, SelectionStore, TagSetStore, Target};
use crate::morph::{MorphOp, Morpher};
use crate::parse::{BinOp, Expr, UnaryOp};
use crate::predicate::{FeaturePredicate, TagPredicate, TagScope};
use crate::selection::Selection;

/// The dynamic operand domain of the interpreter.
pub enum Operand<'a> {
    Number(f64),
    Str(String),
    Selection(Selection),
    Feature(FeaturePredicate<'a>),
    TagSet(TagPredicate<'a>),
    /// Ordered operand list from a comma-separated group; used for function
    /// argument pairs and morph switch lists.
    Tuple(Vec<Operand<'a>>),
    /// A bare identifier not yet known to be anything.
    Name(String),
}

impl Operand<'_> {
    /// How the operand kind is called in type-error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            Operand::Number(_) => "a number",
            Operand::Str(_) => "a string",
            Operand::Selection(_) => "a selection",
            Operand::Feature(_) => "a feature filter",
            Operand::TagSet(_) => "a tag-set filter",
            Operand::Tuple(_) => "a list",
            Operand::Name(_) => "an unquoted name",
        }
    }
}

/// Walks a parsed expression tree against one graph snapshot.
pub struct Evaluator<'a> {
    graph: &'a LineageGraph,
    features: &'a FeatureStore,
    tags: &'a TagSetStore,
    store: &'a SelectionStore,
}

impl<'a> Evaluator<'a> {
    pub fn new(
        graph: &'a LineageGraph,
        features: &'a FeatureStore,
        tags: &'a TagSetStore,
        store: &'a SelectionStore,
    ) -> Self {
        Self {
            graph,
            features,
            tags,
            store,
        }
    }

    /// Evaluates the tree to its final operand, resolving an ambient name
    /// that ends up as the whole result.
    pub fn evaluate(&self, expr: &Expr) -> Result<Operand<'a>> {
        let result = self.eval(expr)?;
        Ok(self.resolve(result))
    }

    fn eval(&self, expr: &Expr) -> Result<Operand<'a>> {
        match expr {
            Expr::Number(n) => Ok(Operand::Number(*n)),
            Expr::Str(s) => Ok(Operand::Str(s.clone())),
            Expr::Name(n) => Ok(Operand::Name(n.clone())),
            Expr::Tuple(items) => Ok(Operand::Tuple(
                items.iter().map(|i| self.eval(i)).collect::<Result<_>>()?,
            )),
            Expr::Unary(op, a) => {
                let a = self.resolve(self.eval(a)?);
                self.unary(*op, a)
            }
            Expr::Binary(op, a, b) => {
                let a = self.resolve(self.eval(a)?);
                let b = self.resolve(self.eval(b)?);
                self.binary(*op, a, b)
            }
            Expr::Call(name, args) => self.call(name, args),
        }
    }

    /// Just-in-time resolution of the ambient selection variables. Any
    /// other name stays unresolved.
    fn resolve(&self, operand: Operand<'a>) -> Operand<'a> {
        let Operand::Name(name) = &operand else {
            return operand;
        };
        match name.to_ascii_lowercase().as_str() {
            "selection" => Operand::Selection(Selection::from_store(self.store)),
            "vertexselection" => {
                let mut snapshot = Selection::from_store(self.store);
                snapshot.clear_edges();
                Operand::Selection(snapshot)
            }
            "edgeselection" => {
                let mut snapshot = Selection::from_store(self.store);
                snapshot.clear_vertices();
                Operand::Selection(snapshot)
            }
            _ => operand,
        }
    }

    fn unary(&self, op: UnaryOp, a: Operand<'a>) -> Result<Operand<'a>> {
        match (op, a) {
            (UnaryOp::Pos, Operand::Number(n)) => Ok(Operand::Number(n)),
            (UnaryOp::Neg, Operand::Number(n)) => Ok(Operand::Number(-n)),
            (UnaryOp::Not, Operand::TagSet(ts)) => Ok(Operand::Selection(ts.unset())),
            (UnaryOp::Complement, Operand::TagSet(ts)) => Ok(Operand::Selection(ts.set())),
            (op, a) => Err(SelectError::UnaryType {
                op: op.symbol(),
                operand: a.kind(),
            }),
        }
    }

    fn binary(&self, op: BinOp, a: Operand<'a>, b: Operand<'a>) -> Result<Operand<'a>> {
        match op {
            // '+' and '|' share their semantics; they only differ in
            // user-facing precedence.
            BinOp::Add | BinOp::Or => match (a, b) {
                (Operand::Selection(mut x), Operand::Selection(y)) => {
                    x.union_with(&y);
                    Ok(Operand::Selection(x))
                }
                (Operand::Number(x), Operand::Number(y)) => Ok(Operand::Number(x + y)),
                (a, b) => Err(SelectError::BinaryType {
                    op: op.symbol(),
                    lhs: a.kind(),
                    rhs: b.kind(),
                    hint: " Use brackets to clarify operator priority.",
                }),
            },
            BinOp::Sub => match (a, b) {
                (Operand::Selection(mut x), Operand::Selection(y)) => {
                    x.subtract(&y);
                    Ok(Operand::Selection(x))
                }
                (Operand::Number(x), Operand::Number(y)) => Ok(Operand::Number(x - y)),
                (a, b) => Err(SelectError::BinaryType {
                    op: op.symbol(),
                    lhs: a.kind(),
                    rhs: b.kind(),
                    hint: " Use brackets to clarify operator priority.",
                }),
            },
            BinOp::And => match (a, b) {
                (Operand::Selection(mut x), Operand::Selection(y)) => {
                    x.intersect_with(&y);
                    Ok(Operand::Selection(x))
                }
                (a, b) => Err(SelectError::BinaryType {
                    op: op.symbol(),
                    lhs: a.kind(),
                    rhs: b.kind(),
                    hint: "",
                }),
            },
            BinOp::Eq => self.equality(op, a, b, false),
            BinOp::Neq => self.equality(op, a, b, true),
            BinOp::Lt | BinOp::Gt | BinOp::Le | BinOp::Ge => self.comparison(op, a, b),
        }
    }

    fn equality(
        &self,
        op: BinOp,
        a: Operand<'a>,
        b: Operand<'a>,
        negate: bool,
    ) -> Result<Operand<'a>> {
        match (a, b) {
            (Operand::Feature(f), Operand::Number(n))
            | (Operand::Number(n), Operand::Feature(f)) => Ok(Operand::Selection(if negate {
                f.not_equal(n)
            } else {
                f.equal(n)
            })),
            (Operand::TagSet(ts), param) | (param, Operand::TagSet(ts)) => {
                self.tag_compare(op, ts, param, negate)
            }
            (a, b) => Err(SelectError::BinaryType {
                op: op.symbol(),
                lhs: a.kind(),
                rhs: b.kind(),
                hint: "",
            }),
        }
    }

    /// Looks the tag label up in the predicate's tag-set and delegates to
    /// its equal/notEqual operation.
    fn tag_compare(
        &self,
        op: BinOp,
        predicate: TagPredicate<'a>,
        param: Operand<'a>,
        negate: bool,
    ) -> Result<Operand<'a>> {
        match param {
            Operand::Name(name) => Err(SelectError::UnquotedName(name)),
            Operand::Str(label) => {
                let Some(set) = predicate.tag_set() else {
                    // Explicitly empty predicate: nothing can match.
                    return Ok(Operand::Selection(Selection::new()));
                };
                let tag = set
                    .tag_index(&label)
                    .ok_or_else(|| SelectError::UnknownTag {
                        label: label.clone(),
                        tag_set: set.name().to_owned(),
                    })?;
                Ok(Operand::Selection(if negate {
                    predicate.not_equal(tag)
                } else {
                    predicate.equal(tag)
                }))
            }
            other => Err(SelectError::BinaryType {
                op: op.symbol(),
                lhs: "a tag-set filter",
                rhs: other.kind(),
                hint: "",
            }),
        }
    }

    /// Ordering comparisons are only defined between a feature predicate
    /// and a number; with the predicate on the right the comparator is
    /// mirrored (`5 > f` means `f < 5`).
    fn comparison(&self, op: BinOp, a: Operand<'a>, b: Operand<'a>) -> Result<Operand<'a>> {
        match (a, b) {
            (Operand::Feature(f), Operand::Number(n)) => Ok(Operand::Selection(match op {
                BinOp::Lt => f.less_than(n),
                BinOp::Gt => f.greater_than(n),
                BinOp::Le => f.less_or_equal(n),
                _ => f.greater_or_equal(n),
            })),
            (Operand::Number(n), Operand::Feature(f)) => Ok(Operand::Selection(match op {
                BinOp::Lt => f.greater_than(n),
                BinOp::Gt => f.less_than(n),
                BinOp::Le => f.greater_or_equal(n),
                _ => f.less_or_equal(n),
            })),
            (a, b) => Err(SelectError::BinaryType {
                op: op.symbol(),
                lhs: a.kind(),
                rhs: b.kind(),
                hint: "",
            }),
        }
    }

    fn call(&self, name: &str, args: &[Expr]) -> Result<Operand<'a>> {
        let operands = args
            .iter()
            .map(|a| self.eval(a))
            .collect::<Result<Vec<_>>>()?;
        match name.to_ascii_lowercase().as_str() {
            "vertexfeature" => self.feature_call("vertexFeature", Target::Vertices, operands),
            "edgefeature" => self.feature_call("edgeFeature", Target::Edges, operands),
            "tagset" => self.tag_set_call("tagSet", TagScope::Graph, operands),
            "vertextagset" => self.tag_set_call("vertexTagSet", TagScope::Vertices, operands),
            "edgetagset" => self.tag_set_call("edgeTagSet", TagScope::Edges, operands),
            "morph" => self.morph_call(operands),
            _ => Err(SelectError::UnknownFunction(name.to_owned())),
        }
    }

    fn feature_call(
        &self,
        function: &'static str,
        target: Target,
        operands: Vec<Operand<'a>>,
    ) -> Result<Operand<'a>> {
        // A wrapped list is the same as spelled-out arguments:
        // vertexFeature(('a', 'b')) == vertexFeature('a', 'b').
        let operands = match operands {
            mut single if single.len() == 1 && matches!(single[0], Operand::Tuple(_)) => {
                match single.remove(0) {
                    Operand::Tuple(items) => items,
                    _ => unreachable!(),
                }
            }
            other => other,
        };
        if operands.iter().any(|o| matches!(o, Operand::Name(_))) {
            return Err(SelectError::BadCall {
                function,
                hint: "specify feature and projection keys between single quotation marks \
                       (e.g. 'Spot position', 'X').",
            });
        }
        // The projection key of a scalar feature defaults to the feature key.
        let (feature_key, projection_key) = match operands.as_slice() {
            [Operand::Str(key)] => (key.clone(), key.clone()),
            [Operand::Str(key), Operand::Str(projection)] => (key.clone(), projection.clone()),
            _ => {
                return Err(SelectError::BadCall {
                    function,
                    hint: "specify feature and projection keys as one or two quoted strings \
                           (e.g. \"vertexFeature('Spot position', 'X')\").",
                });
            }
        };
        let feature =
            self.features
                .feature(&feature_key)
                .ok_or_else(|| SelectError::UnknownFeature {
                    function: function.to_owned(),
                    key: feature_key.clone(),
                })?;
        if feature.target() != target {
            return Err(SelectError::WrongFeatureTarget {
                function: function.to_owned(),
                feature: feature_key,
                target: target.noun(),
            });
        }
        let projection =
            feature
                .projection(&projection_key)
                .ok_or_else(|| SelectError::UnknownProjection {
                    function: function.to_owned(),
                    feature: feature_key.clone(),
                    key: projection_key.clone(),
                })?;
        Ok(Operand::Feature(FeaturePredicate::new(
            self.graph,
            target,
            &feature_key,
            &projection_key,
            projection,
        )))
    }

    fn tag_set_call(
        &self,
        function: &'static str,
        scope: TagScope,
        operands: Vec<Operand<'a>>,
    ) -> Result<Operand<'a>> {
        match operands.as_slice() {
            [Operand::Str(name)] => {
                let set = self
                    .tags
                    .tag_set(name)
                    .ok_or_else(|| SelectError::UnknownTagSet(name.clone()))?;
                Ok(Operand::TagSet(TagPredicate::new(self.graph, set, scope)))
            }
            _ => Err(SelectError::BadCall {
                function,
                hint: "specify the tag-set name between single quotation marks \
                       (e.g. \"tagSet('Reviewed by')\").",
            }),
        }
    }

    fn morph_call(&self, operands: Vec<Operand<'a>>) -> Result<Operand<'a>> {
        let hint = "specify a selection and a list of morphings \
                    (e.g. \"morph( vertexFeature('N links') == 3, ('toVertex', 'outgoingEdges') )\").";
        let [a, b] = <[Operand; 2]>::try_from(operands)
            .map_err(|_| SelectError::BadCall {
                function: "morph",
                hint,
            })?;
        let a = self.resolve(a);
        let b = self.resolve(b);
        // The selection and the switch list are accepted in either order.
        let (selection, switches) = match (a, b) {
            (Operand::Selection(s), other) => (s, other),
            (other, Operand::Selection(s)) => (s, other),
            _ => {
                return Err(SelectError::BadCall {
                    function: "morph",
                    hint,
                });
            }
        };
        let ops = self.morph_switches(switches)?;
        let morphed = Morpher::new(self.graph).morph(&selection, &ops);
        Ok(Operand::Selection(morphed))
    }

    fn morph_switches(&self, operand: Operand<'a>) -> Result<Vec<MorphOp>> {
        match operand {
            Operand::Str(name) => Ok(vec![Self::morph_switch(&name)?]),
            Operand::Tuple(items) => items
                .into_iter()
                .map(|item| match item {
                    Operand::Str(name) => Self::morph_switch(&name),
                    Operand::Name(name) => Err(SelectError::UnquotedName(name)),
                    _ => Err(SelectError::BadCall {
                        function: "morph",
                        hint: "specify morphings between single quotation marks \
                               (e.g. 'toVertex', 'incomingEdges').",
                    }),
                })
                .collect(),
            Operand::Name(name) => Err(SelectError::UnquotedName(name)),
            _ => Err(SelectError::BadCall {
                function: "morph",
                hint: "specify morphings between single quotation marks \
                       (e.g. 'toVertex', 'incomingEdges').",
            }),
        }
    }

    fn morph_switch(name: &str) -> Result<MorphOp> {
        MorphOp::from_name(name).ok_or_else(|| SelectError::UnknownMorph(name.to_owned()))
    }
}
