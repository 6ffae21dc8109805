//! Node construction helpers.
//!
//! The factory owns the location options, so the parser hands it raw
//! positions and gets back spans with `range`/`loc` filled in as requested.

use crate::ast::*;
use crate::source::Position;

#[derive(Clone, Copy, Debug, Default)]
pub struct NodeFactory {
    loc: bool,
    ranges: bool,
}

impl NodeFactory {
    pub fn new(loc: bool, ranges: bool) -> Self {
        Self { loc, ranges }
    }

    pub fn span(&self, start: Position, end: Position) -> Span {
        Span {
            start: start.offset,
            end: end.offset,
            range: self.ranges.then_some([start.offset, end.offset]),
            loc: self.loc.then(|| SourceLocation {
                start: LineColumn {
                    line: start.line,
                    column: start.column,
                },
                end: LineColumn {
                    line: end.line,
                    column: end.column,
                },
            }),
        }
    }

    /// A span from the start of `from` to the end of `to`.
    pub fn cover(&self, from: &Span, to: &Span) -> Span {
        Span {
            start: from.start,
            end: to.end,
            range: self.ranges.then_some([from.start, to.end]),
            loc: match (&from.loc, &to.loc) {
                (Some(a), Some(b)) => Some(SourceLocation {
                    start: a.start,
                    end: b.end,
                }),
                _ => None,
            },
        }
    }

    pub fn identifier(&self, name: impl Into<String>, start: Position, end: Position) -> Identifier {
        Identifier {
            span: self.span(start, end),
            name: name.into(),
        }
    }

    pub fn string_literal(&self, value: String, raw: Option<String>, span: Span) -> Literal {
        Literal {
            span,
            value: LiteralValue::String(value),
            raw,
            regex: None,
            bigint: None,
        }
    }

    pub fn literal(&self, value: LiteralValue, raw: Option<String>, span: Span) -> Literal {
        Literal {
            span,
            value,
            raw,
            regex: None,
            bigint: None,
        }
    }

    pub fn regexp_literal(&self, pattern: String, flags: String, raw: Option<String>, span: Span) -> Literal {
        Literal {
            span,
            value: LiteralValue::RegExp,
            raw,
            regex: Some(RegExpValue { pattern, flags }),
            bigint: None,
        }
    }

    pub fn bigint_literal(&self, digits: String, raw: Option<String>, span: Span) -> Literal {
        Literal {
            span,
            value: LiteralValue::BigInt,
            raw,
            regex: None,
            bigint: Some(digits),
        }
    }

    pub fn expression_statement(&self, expression: Expression, directive: Option<String>, span: Span) -> Statement {
        Statement::Expression(ExpressionStatement {
            span,
            expression: Box::new(expression),
            directive,
        })
    }

    pub fn member(&self, object: Expression, property: Expression, computed: bool, optional: bool, span: Span) -> Expression {
        Expression::Member(MemberExpression {
            span,
            object: Box::new(object),
            property: Box::new(property),
            computed,
            optional,
        })
    }

    pub fn binary(&self, operator: BinaryOperator, left: Expression, right: Expression, span: Span) -> Expression {
        Expression::Binary(BinaryExpression {
            span,
            operator,
            left: Box::new(left),
            right: Box::new(right),
        })
    }

    pub fn logical(&self, operator: LogicalOperator, left: Expression, right: Expression, span: Span) -> Expression {
        Expression::Logical(LogicalExpression {
            span,
            operator,
            left: Box::new(left),
            right: Box::new(right),
        })
    }

    pub fn assignment_pattern(&self, left: Pattern, right: Expression, span: Span) -> Pattern {
        Pattern::Assignment(AssignmentPattern {
            span,
            left: Box::new(left),
            right: Box::new(right),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pos(offset: usize, line: u32, column: u32) -> Position {
        Position { offset, line, column }
    }

    #[test]
    fn span_honours_options() {
        let plain = NodeFactory::new(false, false).span(pos(0, 1, 0), pos(3, 1, 3));
        assert_eq!((plain.start, plain.end), (0, 3));
        assert!(plain.range.is_none() && plain.loc.is_none());

        let full = NodeFactory::new(true, true).span(pos(4, 2, 1), pos(9, 3, 0));
        assert_eq!(full.range, Some([4, 9]));
        let loc = full.loc.unwrap();
        assert_eq!((loc.start.line, loc.start.column), (2, 1));
        assert_eq!((loc.end.line, loc.end.column), (3, 0));
    }

    #[test]
    fn cover_joins_outer_edges() {
        let factory = NodeFactory::new(true, false);
        let a = factory.span(pos(0, 1, 0), pos(1, 1, 1));
        let b = factory.span(pos(4, 1, 4), pos(5, 1, 5));
        let joined = factory.cover(&a, &b);
        assert_eq!((joined.start, joined.end), (0, 5));
        assert_eq!(joined.loc.unwrap().end.column, 5);
    }

    #[test]
    fn binary_keeps_operands_in_order() {
        let factory = NodeFactory::default();
        let left = Expression::Identifier(factory.identifier("a", pos(0, 1, 0), pos(1, 1, 1)));
        let right = Expression::Identifier(factory.identifier("b", pos(4, 1, 4), pos(5, 1, 5)));
        let span = factory.cover(left.span(), right.span());
        let Expression::Binary(sum) = factory.binary(BinaryOperator::Add, left, right, span) else {
            panic!("expected a binary expression");
        };
        assert_eq!((sum.span.start, sum.span.end), (0, 5));
        assert!(matches!(*sum.left, Expression::Identifier(ref id) if id.name == "a"));
    }
}
