//! Binding patterns, and the reinterpretation of cover-grammar expressions
//! (`[a, b] = c`, `({a = 1}) => a`) as patterns.
//!
//! Conversion consumes the expression and builds new pattern nodes with
//! the same spans, so a tree never holds a node that is half expression,
//! half pattern.

use super::*;

/// Deferred cover-grammar errors. Whether they are errors depends on what
/// the enclosing expression turns out to be.
#[derive(Clone, Copy, Debug, Default)]
pub(super) struct CoverErrors {
    /// `{a = 1}`: only valid once the object becomes a pattern.
    pub shorthand_assign: Option<Position>,
    /// A second `__proto__: v`: only valid in a pattern.
    pub double_proto: Option<Position>,
    /// A comma after a spread (`[...a,]`): only valid in an expression.
    pub trailing_comma: Option<Position>,
}

impl CoverErrors {
    pub fn merge(&mut self, other: CoverErrors) {
        self.shorthand_assign = self.shorthand_assign.or(other.shorthand_assign);
        self.double_proto = self.double_proto.or(other.double_proto);
        self.trailing_comma = self.trailing_comma.or(other.trailing_comma);
    }

    /// Fails when the covered text must stay an expression but is only
    /// valid as a pattern.
    pub fn check_expression(&self) -> Result<()> {
        if let Some(at) = self.shorthand_assign {
            return Err(ParseError::new(ErrorKind::ShorthandInitializer, at));
        }
        if let Some(at) = self.double_proto {
            return Err(ParseError::new(ErrorKind::DuplicateProto, at));
        }
        Ok(())
    }

    /// Fails when the covered text becomes a pattern but is only valid as
    /// an expression.
    pub fn check_pattern(&self) -> Result<()> {
        if let Some(at) = self.trailing_comma {
            return Err(ParseError::new(ErrorKind::RestNotLast, at));
        }
        Ok(())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(super) enum TargetKind {
    /// Destructuring assignment and for-in/of heads: members allowed.
    Assignment,
    /// Declarations and parameters: identifiers only.
    Binding,
}

/// Every identifier bound by `pattern`, in source order.
pub(super) fn binding_identifiers(pattern: &Pattern) -> Vec<&Identifier> {
    let mut out = Vec::new();
    collect_identifiers(pattern, &mut out);
    out
}

fn collect_identifiers<'p>(pattern: &'p Pattern, out: &mut Vec<&'p Identifier>) {
    match pattern {
        Pattern::Identifier(id) => out.push(id),
        Pattern::Member(_) => {}
        Pattern::Object(obj) => {
            for prop in &obj.properties {
                match prop {
                    ObjectPatternProperty::Property(p) => collect_identifiers(&p.value, out),
                    ObjectPatternProperty::Rest(r) => collect_identifiers(&r.argument, out),
                }
            }
        }
        Pattern::Array(arr) => {
            for elem in arr.elements.iter().flatten() {
                collect_identifiers(elem, out);
            }
        }
        Pattern::Assignment(assign) => collect_identifiers(&assign.left, out),
        Pattern::Rest(rest) => collect_identifiers(&rest.argument, out),
    }
}

impl<'a> Parser<'a> {
    // -----------------------------------------------------------------------
    // Binding patterns, parsed directly
    // -----------------------------------------------------------------------

    /// BindingIdentifier or BindingPattern.
    pub(super) fn parse_binding_target(&mut self) -> Result<Pattern> {
        match self.current {
            Token::LeftBracket => self.nested(|p| p.parse_array_binding()),
            Token::LeftBrace => self.nested(|p| p.parse_object_binding()),
            _ => Ok(Pattern::Identifier(self.parse_binding_identifier()?)),
        }
    }

    /// A binding target with an optional `= initializer`.
    pub(super) fn parse_binding_element(&mut self) -> Result<Pattern> {
        let start = self.start;
        let target = self.parse_binding_target()?;
        if !self.consume(&Token::Assign)? {
            return Ok(target);
        }
        let init = self.with_context(self.ctx.without(Context::DISALLOW_IN), |p| p.parse_assignment())?;
        Ok(self.factory.assignment_pattern(target, init, self.finish(start)))
    }

    /// `...target` in an array pattern or parameter list.
    pub(super) fn parse_binding_rest(&mut self) -> Result<Pattern> {
        let start = self.start;
        self.eat(&Token::Ellipsis)?;
        let argument = self.parse_binding_target()?;
        if self.at(&Token::Assign) {
            return Err(self.error(ErrorKind::RestInitializer));
        }
        Ok(Pattern::Rest(RestElement {
            span: self.finish(start),
            argument: Box::new(argument),
        }))
    }

    fn parse_array_binding(&mut self) -> Result<Pattern> {
        let start = self.start;
        self.eat(&Token::LeftBracket)?;
        let mut elements = Vec::new();
        while !self.at(&Token::RightBracket) {
            if self.consume(&Token::Comma)? {
                elements.push(None);
                continue;
            }
            if self.at(&Token::Ellipsis) {
                elements.push(Some(self.parse_binding_rest()?));
                if !self.at(&Token::RightBracket) {
                    return Err(self.error(ErrorKind::RestNotLast));
                }
                break;
            }
            elements.push(Some(self.parse_binding_element()?));
            if !self.at(&Token::RightBracket) {
                self.eat(&Token::Comma)?;
            }
        }
        self.eat(&Token::RightBracket)?;
        Ok(Pattern::Array(ArrayPattern {
            span: self.finish(start),
            elements,
        }))
    }

    fn parse_object_binding(&mut self) -> Result<Pattern> {
        let start = self.start;
        self.eat(&Token::LeftBrace)?;
        let mut properties = Vec::new();
        while !self.at(&Token::RightBrace) {
            if self.at(&Token::Ellipsis) {
                let rest_start = self.start;
                self.advance()?;
                let argument = if self.at_identifier() {
                    self.parse_binding_identifier()?
                } else {
                    return Err(self.error(ErrorKind::InvalidRestBinding));
                };
                properties.push(ObjectPatternProperty::Rest(RestElement {
                    span: self.finish(rest_start),
                    argument: Box::new(Pattern::Identifier(argument)),
                }));
                if !self.at(&Token::RightBrace) {
                    return Err(self.error(ErrorKind::RestNotLast));
                }
                break;
            }
            properties.push(ObjectPatternProperty::Property(self.parse_binding_property()?));
            if !self.at(&Token::RightBrace) {
                self.eat(&Token::Comma)?;
            }
        }
        self.eat(&Token::RightBrace)?;
        Ok(Pattern::Object(ObjectPattern {
            span: self.finish(start),
            properties,
        }))
    }

    fn parse_binding_property(&mut self) -> Result<AssignmentProperty> {
        let start = self.start;
        let shorthand_candidate = self.at_identifier();
        let key = self.parse_property_key(false)?;
        let computed = key.is_computed();
        if self.consume(&Token::Colon)? {
            let value = self.parse_binding_element()?;
            return Ok(AssignmentProperty {
                span: self.finish(start),
                method: false,
                shorthand: false,
                computed,
                key,
                value,
                kind: PropertyKind::Init,
            });
        }
        let PropertyKey::Identifier(id) = &key else {
            return Err(self.unexpected());
        };
        if !shorthand_candidate {
            return Err(self.error_at(ErrorKind::UnexpectedReserved, id.span.start));
        }
        self.check_binding(id, self.ctx)?;
        if id.name == "await" && self.await_ident_pos.is_none() {
            self.await_ident_pos = Some(self.start_of(&id.span));
        }
        let mut value = Pattern::Identifier(id.clone());
        if self.consume(&Token::Assign)? {
            let init = self.with_context(self.ctx.without(Context::DISALLOW_IN), |p| p.parse_assignment())?;
            value = self.factory.assignment_pattern(value, init, self.finish(start));
        }
        Ok(AssignmentProperty {
            span: self.finish(start),
            method: false,
            shorthand: true,
            computed: false,
            key,
            value,
            kind: PropertyKind::Init,
        })
    }

    // -----------------------------------------------------------------------
    // Cover grammar reinterpretation
    // -----------------------------------------------------------------------

    /// Target of `=` or of a for-in/of head. Objects and arrays are
    /// destructured; anything else must be a simple target.
    pub(super) fn to_assignment_target(&mut self, expr: Expression, cover: &CoverErrors) -> Result<Pattern> {
        let parenthesized = self.is_parenthesized(expr.span());
        match expr {
            Expression::Object(_) | Expression::Array(_) if !parenthesized => {
                cover.check_pattern()?;
                self.to_pattern(expr, TargetKind::Assignment)
            }
            other => self.to_simple_target(other, ErrorKind::InvalidAssignmentTarget),
        }
    }

    /// Target of compound assignment: an identifier or member expression.
    pub(super) fn to_simple_target(&mut self, expr: Expression, error: ErrorKind) -> Result<Pattern> {
        match expr {
            Expression::Identifier(id) => {
                if self.ctx.is_strict() && validate::is_eval_or_arguments(&id.name) {
                    return Err(self.error_at(ErrorKind::StrictEvalArguments, id.span.start));
                }
                Ok(Pattern::Identifier(id))
            }
            Expression::Member(member) => Ok(Pattern::Member(member)),
            other => Err(self.error_at(error, other.span().start)),
        }
    }

    /// Converts an expression nested inside a destructuring target, or an
    /// arrow function parameter.
    pub(super) fn to_pattern(&mut self, expr: Expression, kind: TargetKind) -> Result<Pattern> {
        let parenthesized = self.is_parenthesized(expr.span());
        match expr {
            Expression::Identifier(id) => {
                match kind {
                    TargetKind::Binding if parenthesized => {
                        return Err(self.error_at(ErrorKind::InvalidDestructuringTarget, id.span.start));
                    }
                    TargetKind::Binding => self.check_binding(&id, self.ctx)?,
                    TargetKind::Assignment => {
                        if self.ctx.is_strict() && validate::is_eval_or_arguments(&id.name) {
                            return Err(self.error_at(ErrorKind::StrictEvalArguments, id.span.start));
                        }
                    }
                }
                Ok(Pattern::Identifier(id))
            }
            Expression::Member(member) if kind == TargetKind::Assignment => Ok(Pattern::Member(member)),
            Expression::Object(obj) if !parenthesized => self.object_to_pattern(obj, kind),
            Expression::Array(arr) if !parenthesized => self.array_to_pattern(arr, kind),
            Expression::Assignment(assign) if !parenthesized && assign.operator == AssignmentOperator::Assign => {
                let left = self.recheck_pattern(*assign.left, kind)?;
                Ok(Pattern::Assignment(AssignmentPattern {
                    span: assign.span,
                    left: Box::new(left),
                    right: assign.right,
                }))
            }
            other => Err(self.error_at(ErrorKind::InvalidDestructuringTarget, other.span().start)),
        }
    }

    fn object_to_pattern(&mut self, obj: ObjectExpression, kind: TargetKind) -> Result<Pattern> {
        let count = obj.properties.len();
        let mut properties = Vec::with_capacity(count);
        for (i, prop) in obj.properties.into_iter().enumerate() {
            match prop {
                ObjectProperty::Property(p) => {
                    if p.kind != PropertyKind::Init || p.method {
                        return Err(self.error_at(ErrorKind::InvalidDestructuringTarget, p.span.start));
                    }
                    let value = self.to_pattern(*p.value, kind)?;
                    properties.push(ObjectPatternProperty::Property(AssignmentProperty {
                        span: p.span,
                        method: false,
                        shorthand: p.shorthand,
                        computed: p.computed,
                        key: p.key,
                        value,
                        kind: PropertyKind::Init,
                    }));
                }
                ObjectProperty::Spread(spread) => {
                    if i + 1 != count {
                        return Err(self.error_at(ErrorKind::RestNotLast, spread.span.start));
                    }
                    let argument = match (kind, *spread.argument) {
                        (TargetKind::Binding, Expression::Identifier(id)) if !self.is_parenthesized(&id.span) => {
                            self.to_pattern(Expression::Identifier(id), kind)?
                        }
                        (TargetKind::Binding, other) => {
                            return Err(self.error_at(ErrorKind::InvalidRestBinding, other.span().start));
                        }
                        (TargetKind::Assignment, other) => {
                            self.to_simple_target(other, ErrorKind::InvalidRestAssignment)?
                        }
                    };
                    properties.push(ObjectPatternProperty::Rest(RestElement {
                        span: spread.span,
                        argument: Box::new(argument),
                    }));
                }
            }
        }
        Ok(Pattern::Object(ObjectPattern {
            span: obj.span,
            properties,
        }))
    }

    fn array_to_pattern(&mut self, arr: ArrayExpression, kind: TargetKind) -> Result<Pattern> {
        let count = arr.elements.len();
        let mut elements = Vec::with_capacity(count);
        for (i, elem) in arr.elements.into_iter().enumerate() {
            let converted = match elem {
                None => None,
                Some(ExpressionOrSpread::Expression(expr)) => Some(self.to_pattern(expr, kind)?),
                Some(ExpressionOrSpread::Spread(spread)) => {
                    if i + 1 != count {
                        return Err(self.error_at(ErrorKind::RestNotLast, spread.span.start));
                    }
                    Some(self.spread_to_rest(spread, kind)?)
                }
            };
            elements.push(converted);
        }
        Ok(Pattern::Array(ArrayPattern {
            span: arr.span,
            elements,
        }))
    }

    /// `...x` in an array pattern or arrow parameter list.
    pub(super) fn spread_to_rest(&mut self, spread: SpreadElement, kind: TargetKind) -> Result<Pattern> {
        let argument = self.to_pattern(*spread.argument, kind)?;
        if let Pattern::Assignment(assign) = &argument {
            let error = match kind {
                TargetKind::Assignment => ErrorKind::InvalidRestAssignment,
                TargetKind::Binding => ErrorKind::RestInitializer,
            };
            return Err(self.error_at(error, assign.span.start));
        }
        Ok(Pattern::Rest(RestElement {
            span: spread.span,
            argument: Box::new(argument),
        }))
    }

    /// Re-validates the left side of a nested `x = default`, which was
    /// already converted as an assignment target.
    fn recheck_pattern(&mut self, pattern: Pattern, kind: TargetKind) -> Result<Pattern> {
        if kind == TargetKind::Assignment {
            return Ok(pattern);
        }
        if let Some(member) = first_member(&pattern) {
            return Err(self.error_at(ErrorKind::InvalidDestructuringTarget, member.start));
        }
        for id in binding_identifiers(&pattern) {
            if self.is_parenthesized(&id.span) {
                return Err(self.error_at(ErrorKind::InvalidDestructuringTarget, id.span.start));
            }
            self.check_binding(id, self.ctx)?;
        }
        Ok(pattern)
    }
}

fn first_member(pattern: &Pattern) -> Option<&Span> {
    match pattern {
        Pattern::Identifier(_) => None,
        Pattern::Member(member) => Some(&member.span),
        Pattern::Object(obj) => obj.properties.iter().find_map(|prop| match prop {
            ObjectPatternProperty::Property(p) => first_member(&p.value),
            ObjectPatternProperty::Rest(r) => first_member(&r.argument),
        }),
        Pattern::Array(arr) => arr.elements.iter().flatten().find_map(first_member),
        Pattern::Assignment(assign) => first_member(&assign.left),
        Pattern::Rest(rest) => first_member(&rest.argument),
    }
}
