//! Parsing of expression text into an operator tree.
//!
//! The grammar lives in `selection.pest`; precedence follows the usual
//! C-family ranking so that `|` binds loosest and `+`/`-` bind tighter than
//! the comparison operators. That matches the user-facing contract of the
//! language: `f == 3 | g == 25` needs no brackets, while the same union
//! written with `+` does.

use lazy_static::lazy_static;
use pest::Parser;
use pest::iterators::{Pair, Pairs};
use pest::pratt_parser::{Assoc, Op, PrattParser};
use pest_derive::Parser;

use crate::error::{Result, SelectError};

#[derive(Parser)]
#[grammar = "selection.pest"]
struct ExpressionParser;

lazy_static! {
    static ref PRATT: PrattParser<Rule> = PrattParser::new()
        .op(Op::infix(Rule::or, Assoc::Left))
        .op(Op::infix(Rule::and, Assoc::Left))
        .op(Op::infix(Rule::eq, Assoc::Left) | Op::infix(Rule::neq, Assoc::Left))
        .op(Op::infix(Rule::lt, Assoc::Left)
            | Op::infix(Rule::gt, Assoc::Left)
            | Op::infix(Rule::le, Assoc::Left)
            | Op::infix(Rule::ge, Assoc::Left))
        .op(Op::infix(Rule::add, Assoc::Left) | Op::infix(Rule::sub, Assoc::Left))
        .op(Op::prefix(Rule::pos)
            | Op::prefix(Rule::neg)
            | Op::prefix(Rule::not)
            | Op::prefix(Rule::complement));
}

/// Binary operators of the expression language.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinOp {
    Or,
    Add,
    Sub,
    And,
    Eq,
    Neq,
    Lt,
    Gt,
    Le,
    Ge,
}

impl BinOp {
    pub fn symbol(&self) -> &'static str {
        match self {
            BinOp::Or => "|",
            BinOp::Add => "+",
            BinOp::Sub => "-",
            BinOp::And => "&",
            BinOp::Eq => "==",
            BinOp::Neq => "!=",
            BinOp::Lt => "<",
            BinOp::Gt => ">",
            BinOp::Le => "<=",
            BinOp::Ge => ">=",
        }
    }
}

/// Unary operators of the expression language.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    Pos,
    Neg,
    Not,
    Complement,
}

impl UnaryOp {
    pub fn symbol(&self) -> &'static str {
        match self {
            UnaryOp::Pos => "+",
            UnaryOp::Neg => "-",
            UnaryOp::Not => "!",
            UnaryOp::Complement => "~",
        }
    }
}

/// A parsed expression tree, consumed by the evaluator in postorder.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Number(f64),
    Str(String),
    /// A bare identifier; resolved to an ambient selection variable at
    /// evaluation time, or reported to the user as a missing-quotes mistake.
    Name(String),
    Unary(UnaryOp, Box<Expr>),
    Binary(BinOp, Box<Expr>, Box<Expr>),
    Call(String, Vec<Expr>),
    /// A parenthesised group of several comma-separated elements. A group
    /// of one is passed through as the element itself.
    Tuple(Vec<Expr>),
}

/// Parses expression text into an [`Expr`] tree.
pub fn parse_expression(text: &str) -> Result<Expr> {
    let mut pairs = ExpressionParser::parse(Rule::expression, text)
        .map_err(|e| SelectError::Parse(e.to_string()))?;
    let expression = pairs
        .next()
        .ok_or_else(|| SelectError::Parse("empty expression".to_owned()))?;
    let expr = expression
        .into_inner()
        .find(|p| p.as_rule() == Rule::expr)
        .ok_or_else(|| SelectError::Parse("empty expression".to_owned()))?;
    build_expr(expr)
}

fn build_expr(pair: Pair<Rule>) -> Result<Expr> {
    build_pairs(pair.into_inner())
}

fn build_pairs(pairs: Pairs<Rule>) -> Result<Expr> {
    PRATT
        .map_primary(|primary| match primary.as_rule() {
            Rule::number => primary
                .as_str()
                .parse::<f64>()
                .map(Expr::Number)
                .map_err(|e| SelectError::Parse(e.to_string())),
            Rule::string => {
                let quoted = primary.as_str();
                Ok(Expr::Str(quoted[1..quoted.len() - 1].to_owned()))
            }
            Rule::name => Ok(Expr::Name(primary.as_str().to_owned())),
            Rule::call => {
                let mut inner = primary.into_inner();
                let name = inner
                    .next()
                    .ok_or_else(|| SelectError::Parse("malformed function call".to_owned()))?
                    .as_str()
                    .to_owned();
                let args = inner.map(build_expr).collect::<Result<Vec<_>>>()?;
                Ok(Expr::Call(name, args))
            }
            Rule::group => {
                let mut items = primary
                    .into_inner()
                    .map(build_expr)
                    .collect::<Result<Vec<_>>>()?;
                if items.len() == 1 {
                    Ok(items.remove(0))
                } else {
                    Ok(Expr::Tuple(items))
                }
            }
            other => Err(SelectError::Parse(format!(
                "unexpected token: {other:?}"
            ))),
        })
        .map_prefix(|op, rhs| {
            let op = match op.as_rule() {
                Rule::pos => UnaryOp::Pos,
                Rule::neg => UnaryOp::Neg,
                Rule::not => UnaryOp::Not,
                Rule::complement => UnaryOp::Complement,
                other => {
                    return Err(SelectError::Parse(format!(
                        "unexpected prefix operator: {other:?}"
                    )));
                }
            };
            Ok(Expr::Unary(op, Box::new(rhs?)))
        })
        .map_infix(|lhs, op, rhs| {
            let op = match op.as_rule() {
                Rule::or => BinOp::Or,
                Rule::add => BinOp::Add,
                Rule::sub => BinOp::Sub,
                Rule::and => BinOp::And,
                Rule::eq => BinOp::Eq,
                Rule::neq => BinOp::Neq,
                Rule::lt => BinOp::Lt,
                Rule::gt => BinOp::Gt,
                Rule::le => BinOp::Le,
                Rule::ge => BinOp::Ge,
                other => {
                    return Err(SelectError::Parse(format!(
                        "unexpected operator: {other:?}"
                    )));
                }
            };
            Ok(Expr::Binary(op, Box::new(lhs?), Box::new(rhs?)))
        })
        .parse(pairs)
}
