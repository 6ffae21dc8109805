use super::*;
use patterns::TargetKind;

#[derive(Clone, Copy, PartialEq, Eq)]
enum InfixOperator {
    Binary(BinaryOperator),
    Logical(LogicalOperator),
}

const COALESCE_PRECEDENCE: u8 = 1;
const AND_PRECEDENCE: u8 = 2;

impl<'a> Parser<'a> {
    pub(super) fn parse_expression(&mut self) -> Result<Expression> {
        let start = self.start;
        let first = self.parse_assignment()?;
        if !self.at(&Token::Comma) {
            return Ok(first);
        }
        let mut expressions = vec![first];
        while self.consume(&Token::Comma)? {
            expressions.push(self.parse_assignment()?);
        }
        Ok(Expression::Sequence(SequenceExpression {
            span: self.finish(start),
            expressions,
        }))
    }

    /// An AssignmentExpression that must stay an expression.
    pub(super) fn parse_assignment(&mut self) -> Result<Expression> {
        let mut cover = CoverErrors::default();
        let expr = self.parse_assignment_cover(&mut cover)?;
        cover.check_expression()?;
        Ok(expr)
    }

    /// An AssignmentExpression inside something that may still become a
    /// pattern. Deferred errors go to `cover` for the caller to judge.
    pub(super) fn parse_assignment_cover(&mut self, cover: &mut CoverErrors) -> Result<Expression> {
        self.nested(|p| p.parse_assignment_level(cover))
    }

    fn parse_assignment_level(&mut self, cover: &mut CoverErrors) -> Result<Expression> {
        if self.at_keyword(Keyword::Yield) && self.ctx.has(Context::YIELD) {
            return self.parse_yield();
        }
        let start = self.start;
        if self.at(&Token::LeftParen) || self.at_identifier() {
            self.potential_arrow_at = Some(start.offset);
        }
        let mut inner = CoverErrors::default();
        let left = self.parse_conditional(&mut inner)?;
        let operator = match self.assignment_operator() {
            Some(op) if !self.is_bare_arrow(&left) => op,
            _ => {
                cover.merge(inner);
                return Ok(left);
            }
        };
        let target = if operator == AssignmentOperator::Assign {
            self.to_assignment_target(left, &inner)?
        } else {
            inner.check_expression()?;
            self.to_simple_target(left, ErrorKind::InvalidAssignmentTarget)?
        };
        self.advance()?;
        let right = self.parse_assignment()?;
        Ok(Expression::Assignment(AssignmentExpression {
            span: self.finish(start),
            operator,
            left: Box::new(target),
            right: Box::new(right),
        }))
    }

    fn assignment_operator(&self) -> Option<AssignmentOperator> {
        use AssignmentOperator as Op;
        Some(match self.current {
            Token::Assign => Op::Assign,
            Token::PlusAssign => Op::Add,
            Token::MinusAssign => Op::Subtract,
            Token::StarAssign => Op::Multiply,
            Token::SlashAssign => Op::Divide,
            Token::PercentAssign => Op::Remainder,
            Token::ExponentAssign => Op::Exponent,
            Token::LeftShiftAssign => Op::LeftShift,
            Token::RightShiftAssign => Op::RightShift,
            Token::UnsignedRightShiftAssign => Op::UnsignedRightShift,
            Token::PipeAssign => Op::BitOr,
            Token::CaretAssign => Op::BitXor,
            Token::AmpersandAssign => Op::BitAnd,
            Token::LogicalAndAssign => Op::And,
            Token::LogicalOrAssign => Op::Or,
            Token::NullishAssign => Op::Nullish,
            _ => return None,
        })
    }

    /// An unparenthesized arrow function takes no operators or subscripts.
    fn is_bare_arrow(&self, expr: &Expression) -> bool {
        matches!(expr, Expression::Arrow(_)) && !self.is_parenthesized(expr.span())
    }

    fn parse_conditional(&mut self, cover: &mut CoverErrors) -> Result<Expression> {
        let start = self.start;
        let mut inner = CoverErrors::default();
        let test = self.parse_binary(&mut inner)?;
        if !self.at(&Token::Question) || self.is_bare_arrow(&test) {
            cover.merge(inner);
            return Ok(test);
        }
        inner.check_expression()?;
        self.advance()?;
        let consequent = self.with_context(self.ctx.without(Context::DISALLOW_IN), |p| p.parse_assignment())?;
        self.eat(&Token::Colon)?;
        let alternate = self.parse_assignment()?;
        Ok(Expression::Conditional(ConditionalExpression {
            span: self.finish(start),
            test: Box::new(test),
            consequent: Box::new(consequent),
            alternate: Box::new(alternate),
        }))
    }

    // -----------------------------------------------------------------------
    // Binary operators
    // -----------------------------------------------------------------------

    fn binary_operator(&self) -> Option<(InfixOperator, u8)> {
        use BinaryOperator as B;
        use InfixOperator::{Binary, Logical};
        Some(match self.current {
            Token::NullishCoalescing => (Logical(LogicalOperator::Nullish), COALESCE_PRECEDENCE),
            Token::LogicalOr => (Logical(LogicalOperator::Or), 1),
            Token::LogicalAnd => (Logical(LogicalOperator::And), AND_PRECEDENCE),
            Token::Pipe => (Binary(B::BitOr), 3),
            Token::Caret => (Binary(B::BitXor), 4),
            Token::Ampersand => (Binary(B::BitAnd), 5),
            Token::Equal => (Binary(B::Equal), 6),
            Token::NotEqual => (Binary(B::NotEqual), 6),
            Token::StrictEqual => (Binary(B::StrictEqual), 6),
            Token::StrictNotEqual => (Binary(B::StrictNotEqual), 6),
            Token::LessThan => (Binary(B::LessThan), 7),
            Token::GreaterThan => (Binary(B::GreaterThan), 7),
            Token::LessThanEqual => (Binary(B::LessThanEqual), 7),
            Token::GreaterThanEqual => (Binary(B::GreaterThanEqual), 7),
            Token::Keyword(Keyword::Instanceof) => (Binary(B::Instanceof), 7),
            Token::Keyword(Keyword::In) if !self.ctx.has(Context::DISALLOW_IN) => (Binary(B::In), 7),
            Token::LeftShift => (Binary(B::LeftShift), 8),
            Token::RightShift => (Binary(B::RightShift), 8),
            Token::UnsignedRightShift => (Binary(B::UnsignedRightShift), 8),
            Token::Plus => (Binary(B::Add), 9),
            Token::Minus => (Binary(B::Subtract), 9),
            Token::Star => (Binary(B::Multiply), 10),
            Token::Slash => (Binary(B::Divide), 10),
            Token::Percent => (Binary(B::Remainder), 10),
            Token::Exponent => (Binary(B::Exponent), 11),
            _ => return None,
        })
    }

    fn parse_binary(&mut self, cover: &mut CoverErrors) -> Result<Expression> {
        let start = self.start;
        let mut inner = CoverErrors::default();
        let left = if matches!(self.current, Token::PrivateName(_)) {
            self.parse_private_in()?
        } else {
            self.parse_unary(&mut inner)?
        };
        if self.is_bare_arrow(&left) || self.binary_operator().is_none() {
            cover.merge(inner);
            return Ok(left);
        }
        inner.check_expression()?;
        self.parse_binary_rest(start, left, 0)
    }

    /// Precedence climbing over the operators following `left`. Spans come
    /// from explicit start positions so a parenthesized operand's span
    /// starts at its `(`.
    fn parse_binary_rest(&mut self, left_start: Position, mut left: Expression, min_precedence: u8) -> Result<Expression> {
        loop {
            let Some((operator, precedence)) = self.binary_operator() else {
                return Ok(left);
            };
            if precedence <= min_precedence {
                return Ok(left);
            }
            let coalesce = operator == InfixOperator::Logical(LogicalOperator::Nullish);
            let logical = matches!(
                operator,
                InfixOperator::Logical(LogicalOperator::And | LogicalOperator::Or)
            );
            if let Expression::PrivateIdentifier(id) = &left
                && operator != InfixOperator::Binary(BinaryOperator::In)
            {
                return Err(self.error_at(ErrorKind::UnexpectedToken(format!("#{}", id.name)), id.span.start));
            }
            self.advance()?;
            let right_start = self.start;
            let operand = if matches!(self.current, Token::PrivateName(_)) {
                self.parse_private_in()?
            } else {
                self.parse_unary_operand()?
            };
            let right_min = match operator {
                InfixOperator::Binary(BinaryOperator::Exponent) => precedence - 1,
                _ if coalesce => AND_PRECEDENCE,
                _ => precedence,
            };
            let right = self.nested(|p| p.parse_binary_rest(right_start, operand, right_min))?;
            if let Expression::PrivateIdentifier(id) = &right {
                return Err(self.error_at(ErrorKind::UnexpectedToken(format!("#{}", id.name)), id.span.start));
            }
            let mixes = (coalesce && matches!(self.current, Token::LogicalAnd | Token::LogicalOr))
                || (logical && self.at(&Token::NullishCoalescing));
            if mixes {
                return Err(self.error(ErrorKind::NullishMix));
            }
            let span = self.finish(left_start);
            left = match operator {
                InfixOperator::Binary(op) => self.factory.binary(op, left, right, span),
                InfixOperator::Logical(op) => self.factory.logical(op, left, right, span),
            };
        }
    }

    /// `#x in obj`: a private name is only an expression left of `in`.
    fn parse_private_in(&mut self) -> Result<Expression> {
        let start = self.start;
        let Token::PrivateName(name) = &self.current else {
            return Err(self.unexpected());
        };
        let name = name.clone();
        if self.ctx.has(Context::DISALLOW_IN) {
            return Err(self.unexpected());
        }
        self.advance()?;
        if !self.at_keyword(Keyword::In) {
            return Err(self.unexpected());
        }
        self.use_private_name(&name, start)?;
        Ok(Expression::PrivateIdentifier(PrivateIdentifier {
            span: self.finish(start),
            name,
        }))
    }

    // -----------------------------------------------------------------------
    // Unary and update
    // -----------------------------------------------------------------------

    fn parse_unary_operand(&mut self) -> Result<Expression> {
        let mut cover = CoverErrors::default();
        let expr = self.nested(|p| p.parse_unary(&mut cover))?;
        cover.check_expression()?;
        Ok(expr)
    }

    fn parse_unary(&mut self, cover: &mut CoverErrors) -> Result<Expression> {
        let start = self.start;
        if self.at_keyword(Keyword::Await) && self.ctx.has(Context::AWAIT) {
            return self.parse_await();
        }
        let operator = match self.current {
            Token::Minus => Some(UnaryOperator::Minus),
            Token::Plus => Some(UnaryOperator::Plus),
            Token::Bang => Some(UnaryOperator::Not),
            Token::Tilde => Some(UnaryOperator::BitNot),
            Token::Keyword(Keyword::Typeof) => Some(UnaryOperator::Typeof),
            Token::Keyword(Keyword::Void) => Some(UnaryOperator::Void),
            Token::Keyword(Keyword::Delete) => Some(UnaryOperator::Delete),
            _ => None,
        };
        if let Some(operator) = operator {
            self.advance()?;
            let argument = self.parse_unary_operand()?;
            if operator == UnaryOperator::Delete {
                if self.ctx.is_strict() && matches!(argument, Expression::Identifier(_)) {
                    return Err(ParseError::new(ErrorKind::StrictDelete, start));
                }
                if is_private_member(&argument) {
                    return Err(ParseError::new(ErrorKind::DeletePrivate, start));
                }
            }
            if self.at(&Token::Exponent) {
                return Err(self.error(ErrorKind::UnaryBeforeExponent));
            }
            return Ok(Expression::Unary(UnaryExpression {
                span: self.finish(start),
                operator,
                prefix: true,
                argument: Box::new(argument),
            }));
        }
        if let Some(operator) = self.update_operator() {
            self.advance()?;
            let argument = self.parse_unary_operand()?;
            self.check_update_target(&argument)?;
            return Ok(Expression::Update(UpdateExpression {
                span: self.finish(start),
                operator,
                prefix: true,
                argument: Box::new(argument),
            }));
        }
        self.parse_postfix(cover)
    }

    fn update_operator(&self) -> Option<UpdateOperator> {
        match self.current {
            Token::Increment => Some(UpdateOperator::Increment),
            Token::Decrement => Some(UpdateOperator::Decrement),
            _ => None,
        }
    }

    fn check_update_target(&self, target: &Expression) -> Result<()> {
        if validate::is_simple_assignment_target(target, self.ctx.is_strict()) {
            return Ok(());
        }
        let kind = match target {
            Expression::Identifier(_) => ErrorKind::StrictEvalArguments,
            _ => ErrorKind::InvalidUpdateTarget,
        };
        Err(self.error_at(kind, target.span().start))
    }

    fn parse_postfix(&mut self, cover: &mut CoverErrors) -> Result<Expression> {
        let start = self.start;
        let mut inner = CoverErrors::default();
        let expr = self.parse_lhs(&mut inner)?;
        let operator = match self.update_operator() {
            Some(op) if !self.newline_before && !self.is_bare_arrow(&expr) => op,
            _ => {
                cover.merge(inner);
                return Ok(expr);
            }
        };
        inner.check_expression()?;
        self.check_update_target(&expr)?;
        self.advance()?;
        Ok(Expression::Update(UpdateExpression {
            span: self.finish(start),
            operator,
            prefix: false,
            argument: Box::new(expr),
        }))
    }

    fn parse_await(&mut self) -> Result<Expression> {
        let start = self.start;
        if self.ctx.has(Context::FORMAL_PARAMETERS) {
            return Err(self.error(ErrorKind::AwaitInParameter));
        }
        self.await_pos.get_or_insert(start);
        self.advance()?;
        let argument = self.parse_unary_operand()?;
        if self.at(&Token::Exponent) {
            return Err(self.error(ErrorKind::UnaryBeforeExponent));
        }
        Ok(Expression::Await(AwaitExpression {
            span: self.finish(start),
            argument: Box::new(argument),
        }))
    }

    fn parse_yield(&mut self) -> Result<Expression> {
        let start = self.start;
        if self.ctx.has(Context::FORMAL_PARAMETERS) {
            return Err(self.error(ErrorKind::YieldInParameter));
        }
        self.yield_pos.get_or_insert(start);
        self.advance()?;
        let has_argument = !self.newline_before && (self.at(&Token::Star) || self.starts_expression());
        let (delegate, argument) = if has_argument {
            let delegate = self.consume(&Token::Star)?;
            (delegate, Some(Box::new(self.parse_assignment()?)))
        } else {
            (false, None)
        };
        Ok(Expression::Yield(YieldExpression {
            span: self.finish(start),
            delegate,
            argument,
        }))
    }

    /// Whether the current token can begin an expression.
    fn starts_expression(&self) -> bool {
        match &self.current {
            Token::Keyword(kw) => matches!(
                kw,
                Keyword::This
                    | Keyword::Function
                    | Keyword::Class
                    | Keyword::New
                    | Keyword::Super
                    | Keyword::Import
                    | Keyword::Typeof
                    | Keyword::Void
                    | Keyword::Delete
            ) || kw.is_contextual(),
            Token::Identifier(_)
            | Token::PrivateName(_)
            | Token::NumericLiteral(_)
            | Token::LegacyOctalLiteral(_)
            | Token::BigIntLiteral(_)
            | Token::StringLiteral(_)
            | Token::BooleanLiteral(_)
            | Token::NullLiteral
            | Token::NoSubstitutionTemplate(..)
            | Token::TemplateHead(..)
            | Token::LeftParen
            | Token::LeftBracket
            | Token::LeftBrace
            | Token::Plus
            | Token::Minus
            | Token::Bang
            | Token::Tilde
            | Token::Increment
            | Token::Decrement
            | Token::Slash
            | Token::SlashAssign => true,
            _ => false,
        }
    }

    // -----------------------------------------------------------------------
    // Left-hand-side expressions
    // -----------------------------------------------------------------------

    /// LeftHandSideExpression standing alone (class heritage).
    pub(super) fn parse_lhs_expression(&mut self) -> Result<Expression> {
        let mut cover = CoverErrors::default();
        let expr = self.parse_lhs(&mut cover)?;
        cover.check_expression()?;
        Ok(expr)
    }

    fn parse_lhs(&mut self, cover: &mut CoverErrors) -> Result<Expression> {
        let start = self.start;
        let mut inner = CoverErrors::default();
        let base = if self.at_keyword(Keyword::New) {
            self.parse_new()?
        } else {
            self.parse_primary(&mut inner)?
        };
        if self.is_bare_arrow(&base) || !self.at_subscript() {
            cover.merge(inner);
            return Ok(base);
        }
        inner.check_expression()?;
        self.parse_subscripts(base, start, false)
    }

    fn at_subscript(&self) -> bool {
        matches!(
            self.current,
            Token::Dot
                | Token::OptionalChain
                | Token::LeftBracket
                | Token::LeftParen
                | Token::NoSubstitutionTemplate(..)
                | Token::TemplateHead(..)
        )
    }

    /// Member accesses, calls and tagged templates following `expr`. With
    /// `no_call`, stops at the first `(` (the callee of `new`).
    fn parse_subscripts(&mut self, mut expr: Expression, start: Position, no_call: bool) -> Result<Expression> {
        let async_arrow_candidate = !no_call
            && self.potential_arrow_at == Some(start.offset)
            && matches!(&expr, Expression::Identifier(id)
                if id.span.end == self.prev_end.offset
                    && self.source.get(id.span.start..id.span.end) == Some("async"));
        let mut chained = false;
        let mut first = true;
        loop {
            match self.current {
                Token::OptionalChain => {
                    if no_call {
                        return Err(self.error(ErrorKind::OptionalChainNew));
                    }
                    self.advance()?;
                    chained = true;
                    expr = match self.current {
                        Token::LeftParen => {
                            let arguments = self.parse_arguments()?;
                            Expression::Call(CallExpression {
                                span: self.finish(start),
                                callee: Box::new(expr),
                                arguments,
                                optional: true,
                            })
                        }
                        Token::LeftBracket => self.parse_computed_member(expr, start, true)?,
                        Token::NoSubstitutionTemplate(..) | Token::TemplateHead(..) => {
                            return Err(self.error(ErrorKind::OptionalChainTemplate));
                        }
                        _ => self.parse_static_member(expr, start, true)?,
                    };
                }
                Token::Dot => {
                    self.advance()?;
                    expr = self.parse_static_member(expr, start, false)?;
                }
                Token::LeftBracket => expr = self.parse_computed_member(expr, start, false)?,
                Token::NoSubstitutionTemplate(..) | Token::TemplateHead(..) => {
                    if chained {
                        return Err(self.error(ErrorKind::OptionalChainTemplate));
                    }
                    let quasi = self.parse_template(true)?;
                    expr = Expression::TaggedTemplate(TaggedTemplateExpression {
                        span: self.finish(start),
                        tag: Box::new(expr),
                        quasi,
                    });
                }
                Token::LeftParen if !no_call => {
                    if first && async_arrow_candidate && !self.newline_before {
                        let result = self.parse_async_call_or_arrow(start, expr)?;
                        if matches!(result, Expression::Arrow(_)) {
                            return Ok(result);
                        }
                        expr = result;
                    } else {
                        let arguments = self.parse_arguments()?;
                        expr = Expression::Call(CallExpression {
                            span: self.finish(start),
                            callee: Box::new(expr),
                            arguments,
                            optional: false,
                        });
                    }
                }
                _ => break,
            }
            first = false;
        }
        if chained {
            expr = Expression::Chain(ChainExpression {
                span: self.finish(start),
                expression: Box::new(expr),
            });
        }
        Ok(expr)
    }

    /// `.name` or `.#name`, with the dot (or `?.`) already consumed.
    fn parse_static_member(&mut self, object: Expression, start: Position, optional: bool) -> Result<Expression> {
        let property = if let Token::PrivateName(name) = &self.current {
            let name = name.clone();
            let name_start = self.start;
            if matches!(object, Expression::Super(_)) {
                return Err(self.unexpected());
            }
            self.advance()?;
            self.use_private_name(&name, name_start)?;
            Expression::PrivateIdentifier(PrivateIdentifier {
                span: self.finish(name_start),
                name,
            })
        } else {
            Expression::Identifier(self.parse_identifier_name()?)
        };
        Ok(self.factory.member(object, property, false, optional, self.finish(start)))
    }

    fn parse_computed_member(&mut self, object: Expression, start: Position, optional: bool) -> Result<Expression> {
        self.eat(&Token::LeftBracket)?;
        let property = self.with_context(self.ctx.without(Context::DISALLOW_IN), |p| p.parse_expression())?;
        self.eat(&Token::RightBracket)?;
        Ok(self.factory.member(object, property, true, optional, self.finish(start)))
    }

    pub(super) fn parse_arguments(&mut self) -> Result<Vec<ExpressionOrSpread>> {
        let mut cover = CoverErrors::default();
        let arguments = self.parse_arguments_cover(&mut cover)?;
        cover.check_expression()?;
        Ok(arguments)
    }

    fn parse_arguments_cover(&mut self, cover: &mut CoverErrors) -> Result<Vec<ExpressionOrSpread>> {
        self.eat(&Token::LeftParen)?;
        self.with_context(self.ctx.without(Context::DISALLOW_IN), |p| {
            let mut arguments = Vec::new();
            while !p.at(&Token::RightParen) {
                if p.at(&Token::Ellipsis) {
                    let spread = p.parse_spread(cover)?;
                    arguments.push(ExpressionOrSpread::Spread(spread));
                } else {
                    arguments.push(ExpressionOrSpread::Expression(p.parse_assignment_cover(cover)?));
                }
                if !p.at(&Token::RightParen) {
                    p.eat(&Token::Comma)?;
                }
            }
            p.eat(&Token::RightParen)?;
            Ok(arguments)
        })
    }

    /// `...expr`. A comma right after it is noted, since a rest element
    /// must be last.
    fn parse_spread(&mut self, cover: &mut CoverErrors) -> Result<SpreadElement> {
        let start = self.start;
        self.eat(&Token::Ellipsis)?;
        let argument = self.parse_assignment_cover(cover)?;
        if self.at(&Token::Comma) && cover.trailing_comma.is_none() {
            cover.trailing_comma = Some(self.start);
        }
        Ok(SpreadElement {
            span: self.finish(start),
            argument: Box::new(argument),
        })
    }

    /// `async(...)`: a call, or the parameters of an async arrow.
    fn parse_async_call_or_arrow(&mut self, start: Position, callee: Expression) -> Result<Expression> {
        let saved = (self.yield_pos.take(), self.await_pos.take(), self.await_ident_pos.take());
        let mut cover = CoverErrors::default();
        let arguments = self.parse_arguments_cover(&mut cover)?;
        if self.at(&Token::Arrow) && !self.newline_before {
            cover.check_pattern()?;
            if let Some(at) = self.yield_pos {
                return Err(ParseError::new(ErrorKind::YieldInParameter, at));
            }
            if let Some(at) = self.await_pos {
                return Err(ParseError::new(ErrorKind::AwaitInParameter, at));
            }
            if let Some(at) = self.await_ident_pos {
                return Err(ParseError::new(ErrorKind::UnexpectedReserved, at));
            }
            (self.yield_pos, self.await_pos, self.await_ident_pos) = saved;
            let params = self.arguments_to_params(arguments)?;
            return self.parse_arrow_function(start, params, true);
        }
        cover.check_expression()?;
        self.yield_pos = saved.0.or(self.yield_pos);
        self.await_pos = saved.1.or(self.await_pos);
        self.await_ident_pos = saved.2.or(self.await_ident_pos);
        Ok(Expression::Call(CallExpression {
            span: self.finish(start),
            callee: Box::new(callee),
            arguments,
            optional: false,
        }))
    }

    fn arguments_to_params(&mut self, arguments: Vec<ExpressionOrSpread>) -> Result<Vec<Pattern>> {
        let count = arguments.len();
        let mut params = Vec::with_capacity(count);
        for (i, argument) in arguments.into_iter().enumerate() {
            match argument {
                ExpressionOrSpread::Expression(expr) => params.push(self.to_pattern(expr, TargetKind::Binding)?),
                ExpressionOrSpread::Spread(spread) => {
                    if i + 1 != count {
                        return Err(self.error_at(ErrorKind::RestNotLast, spread.span.start));
                    }
                    params.push(self.spread_to_rest(spread, TargetKind::Binding)?);
                }
            }
        }
        Ok(params)
    }

    fn parse_new(&mut self) -> Result<Expression> {
        let start = self.start;
        let meta = self.parse_identifier_name()?;
        if self.consume(&Token::Dot)? {
            if !self.at_contextual("target") {
                return Err(match self.current {
                    Token::Identifier(ref name) if name == "target" => self.error(ErrorKind::InvalidMetaProperty),
                    _ => self.unexpected(),
                });
            }
            let property = self.parse_identifier_name()?;
            if !self.ctx.has(Context::NEW_TARGET) {
                return Err(ParseError::new(ErrorKind::InvalidNewTarget, start));
            }
            return Ok(Expression::Meta(MetaProperty {
                span: self.finish(start),
                meta,
                property,
            }));
        }
        if self.at_keyword(Keyword::Import) {
            return Err(self.unexpected());
        }
        let callee_start = self.start;
        let callee = if self.at_keyword(Keyword::New) {
            self.nested(|p| p.parse_new())?
        } else {
            let mut cover = CoverErrors::default();
            let callee = self.parse_primary(&mut cover)?;
            cover.check_expression()?;
            callee
        };
        let callee = self.parse_subscripts(callee, callee_start, true)?;
        let arguments = if self.at(&Token::LeftParen) {
            self.parse_arguments()?
        } else {
            Vec::new()
        };
        Ok(Expression::New(NewExpression {
            span: self.finish(start),
            callee: Box::new(callee),
            arguments,
        }))
    }

    // -----------------------------------------------------------------------
    // Primary expressions
    // -----------------------------------------------------------------------

    fn parse_primary(&mut self, cover: &mut CoverErrors) -> Result<Expression> {
        let start = self.start;
        match &self.current {
            Token::Keyword(Keyword::This) => {
                self.advance()?;
                Ok(Expression::This(ThisExpression {
                    span: self.finish(start),
                }))
            }
            Token::Keyword(Keyword::Super) => self.parse_super(),
            Token::Keyword(Keyword::Function) => {
                Ok(Expression::Function(self.parse_function_expression(start, false)?))
            }
            Token::Keyword(Keyword::Class) => Ok(Expression::Class(self.parse_class(start, ClassType::ClassExpression)?)),
            Token::Keyword(Keyword::Import) => self.parse_import_expression(),
            Token::Keyword(Keyword::Async) => self.parse_async_primary(),
            Token::NumericLiteral(_)
            | Token::LegacyOctalLiteral(_)
            | Token::BigIntLiteral(_)
            | Token::StringLiteral(_)
            | Token::BooleanLiteral(_)
            | Token::NullLiteral => Ok(Expression::Literal(self.parse_literal()?)),
            Token::Slash | Token::SlashAssign => {
                self.rescan_regex()?;
                Ok(Expression::Literal(self.parse_literal()?))
            }
            Token::NoSubstitutionTemplate(..) | Token::TemplateHead(..) => {
                Ok(Expression::Template(self.parse_template(false)?))
            }
            Token::LeftParen => self.parse_paren(),
            Token::LeftBracket => self.parse_array(cover),
            Token::LeftBrace => self.parse_object(cover),
            _ if self.at_identifier() => {
                let can_be_arrow = self.potential_arrow_at == Some(start.offset);
                let id = self.parse_identifier_reference()?;
                if can_be_arrow && self.at(&Token::Arrow) && !self.newline_before {
                    let param = self.to_pattern(Expression::Identifier(id), TargetKind::Binding)?;
                    return self.parse_arrow_function(start, vec![param], false);
                }
                Ok(Expression::Identifier(id))
            }
            _ => Err(self.unexpected()),
        }
    }

    fn parse_super(&mut self) -> Result<Expression> {
        let start = self.start;
        self.advance()?;
        let allowed = match self.current {
            Token::LeftParen => self.ctx.has(Context::SUPER_CALL),
            Token::Dot | Token::LeftBracket => self.ctx.has(Context::SUPER_PROPERTY),
            _ => false,
        };
        if !allowed {
            return Err(ParseError::new(ErrorKind::UnexpectedSuper, start));
        }
        Ok(Expression::Super(Super {
            span: self.finish(start),
        }))
    }

    /// `async function`, `async x => ...`, or `async` as an identifier (a
    /// following `(` is handled with the subscripts).
    fn parse_async_primary(&mut self) -> Result<Expression> {
        let start = self.start;
        let can_be_arrow = self.potential_arrow_at == Some(start.offset);
        let (next, newline) = self.peek()?;
        if !newline && next.is_keyword(Keyword::Function) {
            self.advance()?;
            return Ok(Expression::Function(self.parse_function_expression(start, true)?));
        }
        let next_is_identifier = match &next {
            Token::Identifier(_) => true,
            Token::Keyword(kw) => kw.is_contextual(),
            _ => false,
        };
        if can_be_arrow && !newline && next_is_identifier && self.arrow_follows_next()? {
            self.advance()?;
            let id = self.take_identifier()?;
            if id.name == "await" {
                return Err(self.error_at(ErrorKind::UnexpectedReserved, id.span.start));
            }
            self.check_binding(&id, self.ctx)?;
            if !self.at(&Token::Arrow) || self.newline_before {
                return Err(self.unexpected());
            }
            return self.parse_arrow_function(start, vec![Pattern::Identifier(id)], true);
        }
        let id = self.parse_identifier_reference()?;
        if can_be_arrow && self.at(&Token::Arrow) && !self.newline_before {
            let param = self.to_pattern(Expression::Identifier(id), TargetKind::Binding)?;
            return self.parse_arrow_function(start, vec![param], false);
        }
        Ok(Expression::Identifier(id))
    }

    /// Whether `=>` is the second token ahead (`async x =>`).
    fn arrow_follows_next(&self) -> Result<bool> {
        let mut lexer = self.lexer.clone();
        lexer.next_token()?;
        Ok(lexer.next_token()? == Token::Arrow)
    }

    /// `import(source[, options])` or `import.meta`.
    fn parse_import_expression(&mut self) -> Result<Expression> {
        let start = self.start;
        let meta = self.parse_identifier_name()?;
        if self.consume(&Token::Dot)? {
            if !self.at_contextual("meta") {
                return Err(match self.current {
                    Token::Identifier(ref name) if name == "meta" => self.error(ErrorKind::InvalidMetaProperty),
                    _ => self.unexpected(),
                });
            }
            let property = self.parse_identifier_name()?;
            if !self.ctx.is_module() {
                return Err(ParseError::new(ErrorKind::ImportMetaOutsideModule, start));
            }
            return Ok(Expression::Meta(MetaProperty {
                span: self.finish(start),
                meta,
                property,
            }));
        }
        if !self.at(&Token::LeftParen) {
            return Err(self.unexpected());
        }
        self.advance()?;
        let (source, options) = self.with_context(self.ctx.without(Context::DISALLOW_IN), |p| {
            let source = p.parse_assignment()?;
            let mut options = None;
            if p.consume(&Token::Comma)? && !p.at(&Token::RightParen) {
                options = Some(Box::new(p.parse_assignment()?));
                p.consume(&Token::Comma)?;
            }
            p.eat(&Token::RightParen)?;
            Ok((source, options))
        })?;
        Ok(Expression::Import(ImportExpression {
            span: self.finish(start),
            source: Box::new(source),
            options,
        }))
    }

    pub(super) fn parse_literal(&mut self) -> Result<Literal> {
        let start = self.start;
        let text = self.token_text();
        let raw = self.options.raw.then(|| text.to_string());
        let escape = self.legacy_escape;
        let token = self.advance()?;
        let span = self.finish(start);
        let value = match token {
            Token::NumericLiteral(n) => LiteralValue::Number(n),
            Token::LegacyOctalLiteral(n) => {
                if self.ctx.is_strict() || !self.options.legacy_octal() {
                    let kind = if text.bytes().all(|b| (b'0'..=b'7').contains(&b)) {
                        ErrorKind::StrictOctalLiteral
                    } else {
                        ErrorKind::StrictDecimalWithLeadingZero
                    };
                    return Err(ParseError::new(kind, start));
                }
                LiteralValue::Number(n)
            }
            Token::StringLiteral(s) => {
                self.check_legacy_escape(escape)?;
                LiteralValue::String(s)
            }
            Token::BooleanLiteral(b) => LiteralValue::Boolean(b),
            Token::NullLiteral => LiteralValue::Null,
            Token::BigIntLiteral(digits) => return Ok(self.factory.bigint_literal(digits, raw, span)),
            Token::RegExpLiteral { pattern, flags } => {
                return Ok(self.factory.regexp_literal(pattern, flags, raw, span));
            }
            _ => return Err(ParseError::new(ErrorKind::UnexpectedToken(text.to_string()), start)),
        };
        Ok(self.factory.literal(value, raw, span))
    }

    pub(super) fn parse_template(&mut self, tagged: bool) -> Result<TemplateLiteral> {
        let start = self.start;
        let mut quasis = Vec::new();
        let mut expressions = Vec::new();
        loop {
            let (cooked, raw, tail) = match &self.current {
                Token::NoSubstitutionTemplate(cooked, raw) | Token::TemplateTail(cooked, raw) => {
                    (cooked.clone(), raw.clone(), true)
                }
                Token::TemplateHead(cooked, raw) | Token::TemplateMiddle(cooked, raw) => {
                    (cooked.clone(), raw.clone(), false)
                }
                _ => return Err(self.unexpected()),
            };
            if !tagged && let Some(err) = &self.template_error {
                return Err(err.clone());
            }
            let (content_start, content_end) = self.template_content;
            quasis.push(TemplateElement {
                span: self.factory.span(content_start, content_end),
                value: TemplateValue { raw, cooked },
                tail,
            });
            self.advance()?;
            if tail {
                break;
            }
            let expr = self.with_context(self.ctx.without(Context::DISALLOW_IN), |p| p.parse_expression())?;
            expressions.push(expr);
            if !self.at(&Token::RightBrace) {
                return Err(self.unexpected());
            }
            self.rescan_template_continuation()?;
        }
        Ok(TemplateLiteral {
            span: self.finish(start),
            expressions,
            quasis,
        })
    }

    /// `( ... )`: a parenthesized expression or arrow parameters.
    fn parse_paren(&mut self) -> Result<Expression> {
        let start = self.start;
        let can_be_arrow = self.potential_arrow_at == Some(start.offset);
        self.advance()?;
        let saved = (self.yield_pos.take(), self.await_pos.take());
        let mut cover = CoverErrors::default();
        let mut items = Vec::new();
        let mut rest = None;
        let mut trailing_comma = None;
        self.with_context(self.ctx.without(Context::DISALLOW_IN), |p| {
            while !p.at(&Token::RightParen) {
                if p.at(&Token::Ellipsis) {
                    rest = Some(p.parse_binding_rest()?);
                    if !p.at(&Token::RightParen) {
                        return Err(p.error(ErrorKind::RestNotLast));
                    }
                    break;
                }
                items.push(p.parse_assignment_cover(&mut cover)?);
                if !p.at(&Token::RightParen) {
                    let comma = p.start;
                    p.eat(&Token::Comma)?;
                    if p.at(&Token::RightParen) {
                        trailing_comma = Some(comma);
                    }
                }
            }
            Ok(())
        })?;
        let close = self.start;
        self.eat(&Token::RightParen)?;

        if can_be_arrow && self.at(&Token::Arrow) && !self.newline_before {
            cover.check_pattern()?;
            if let Some(at) = self.yield_pos {
                return Err(ParseError::new(ErrorKind::YieldInParameter, at));
            }
            if let Some(at) = self.await_pos {
                return Err(ParseError::new(ErrorKind::AwaitInParameter, at));
            }
            (self.yield_pos, self.await_pos) = saved;
            let mut params = Vec::with_capacity(items.len() + 1);
            for item in items {
                params.push(self.to_pattern(item, TargetKind::Binding)?);
            }
            params.extend(rest);
            return self.parse_arrow_function(start, params, false);
        }

        if let Some(rest) = rest {
            return Err(self.error_at(ErrorKind::UnexpectedToken("...".into()), rest.span().start));
        }
        if let Some(comma) = trailing_comma {
            return Err(ParseError::new(ErrorKind::UnexpectedToken(")".into()), comma));
        }
        if items.is_empty() {
            return Err(ParseError::new(ErrorKind::UnexpectedToken(")".into()), close));
        }
        cover.check_expression()?;
        self.yield_pos = saved.0.or(self.yield_pos);
        self.await_pos = saved.1.or(self.await_pos);
        let expr = if items.len() == 1 {
            items.remove(0)
        } else {
            let span = match (items.first(), items.last()) {
                (Some(first), Some(last)) => self.factory.cover(first.span(), last.span()),
                _ => self.finish(start),
            };
            Expression::Sequence(SequenceExpression {
                span,
                expressions: items,
            })
        };
        let span = expr.span();
        self.parenthesized.insert((span.start, span.end));
        Ok(expr)
    }

    fn parse_array(&mut self, cover: &mut CoverErrors) -> Result<Expression> {
        let start = self.start;
        self.eat(&Token::LeftBracket)?;
        let elements = self.with_context(self.ctx.without(Context::DISALLOW_IN), |p| {
            let mut elements = Vec::new();
            while !p.at(&Token::RightBracket) {
                if p.consume(&Token::Comma)? {
                    elements.push(None);
                    continue;
                }
                let element = if p.at(&Token::Ellipsis) {
                    ExpressionOrSpread::Spread(p.parse_spread(cover)?)
                } else {
                    ExpressionOrSpread::Expression(p.parse_assignment_cover(cover)?)
                };
                elements.push(Some(element));
                if !p.at(&Token::RightBracket) {
                    p.eat(&Token::Comma)?;
                }
            }
            Ok(elements)
        })?;
        self.eat(&Token::RightBracket)?;
        Ok(Expression::Array(ArrayExpression {
            span: self.finish(start),
            elements,
        }))
    }

    fn parse_object(&mut self, cover: &mut CoverErrors) -> Result<Expression> {
        let start = self.start;
        self.eat(&Token::LeftBrace)?;
        let properties = self.with_context(self.ctx.without(Context::DISALLOW_IN), |p| {
            let mut properties = Vec::new();
            let mut has_proto = false;
            while !p.at(&Token::RightBrace) {
                if p.at(&Token::Ellipsis) {
                    properties.push(ObjectProperty::Spread(p.parse_spread(cover)?));
                } else {
                    properties.push(ObjectProperty::Property(p.parse_object_property(cover, &mut has_proto)?));
                }
                if !p.at(&Token::RightBrace) {
                    p.eat(&Token::Comma)?;
                }
            }
            Ok(properties)
        })?;
        self.eat(&Token::RightBrace)?;
        Ok(Expression::Object(ObjectExpression {
            span: self.finish(start),
            properties,
        }))
    }

    fn parse_object_property(&mut self, cover: &mut CoverErrors, has_proto: &mut bool) -> Result<Property> {
        let start = self.start;
        let mut is_async = false;
        let mut is_generator = false;
        let mut kind = PropertyKind::Init;
        if self.at_keyword(Keyword::Async) {
            let (next, newline) = self.peek()?;
            if !newline && (next == Token::Star || starts_property_name(&next)) {
                self.advance()?;
                is_async = true;
            }
        }
        if self.at(&Token::Star) {
            self.advance()?;
            is_generator = true;
        }
        if !is_async && !is_generator && (self.at_contextual("get") || self.at_contextual("set")) {
            let (next, _) = self.peek()?;
            if starts_property_name(&next) {
                kind = if self.at_contextual("get") {
                    PropertyKind::Get
                } else {
                    PropertyKind::Set
                };
                self.advance()?;
            }
        }
        let shorthand_candidate = self.at_identifier();
        let key = self.parse_property_key(false)?;
        let computed = key.is_computed();

        if is_async || is_generator || kind != PropertyKind::Init || self.at(&Token::LeftParen) {
            let method_kind = match kind {
                PropertyKind::Init => MethodKind::Method,
                PropertyKind::Get => MethodKind::Get,
                PropertyKind::Set => MethodKind::Set,
            };
            let value = self.parse_method(is_async, is_generator, method_kind, false)?;
            return Ok(Property {
                span: self.finish(start),
                method: kind == PropertyKind::Init,
                shorthand: false,
                computed,
                key,
                value: Box::new(Expression::Function(value)),
                kind,
            });
        }

        if self.consume(&Token::Colon)? {
            if !computed && key.static_name().as_deref() == Some("__proto__") {
                if *has_proto {
                    cover.double_proto.get_or_insert(self.start_of(key.span()));
                }
                *has_proto = true;
            }
            let value = self.parse_assignment_cover(cover)?;
            return Ok(Property {
                span: self.finish(start),
                method: false,
                shorthand: false,
                computed,
                key,
                value: Box::new(value),
                kind,
            });
        }

        let PropertyKey::Identifier(id) = &key else {
            return Err(self.unexpected());
        };
        if !shorthand_candidate {
            return Err(self.error_at(ErrorKind::UnexpectedReserved, id.span.start));
        }
        if validate::is_keyword(&id.name) {
            return Err(self.error_at(ErrorKind::EscapedKeyword, id.span.start));
        }
        let id = id.clone();
        self.check_reference(&id)?;
        let value = if self.at(&Token::Assign) {
            cover.shorthand_assign.get_or_insert(self.start);
            self.advance()?;
            let right = self.parse_assignment()?;
            Expression::Assignment(AssignmentExpression {
                span: self.finish(start),
                operator: AssignmentOperator::Assign,
                left: Box::new(Pattern::Identifier(id)),
                right: Box::new(right),
            })
        } else {
            Expression::Identifier(id)
        };
        Ok(Property {
            span: self.finish(start),
            method: false,
            shorthand: true,
            computed: false,
            key,
            value: Box::new(value),
            kind,
        })
    }

    /// Property name of an object member, class element or object pattern
    /// property.
    pub(super) fn parse_property_key(&mut self, allow_private: bool) -> Result<PropertyKey> {
        let start = self.start;
        match &self.current {
            Token::StringLiteral(_) | Token::NumericLiteral(_) | Token::LegacyOctalLiteral(_) | Token::BigIntLiteral(_) => {
                Ok(PropertyKey::Literal(self.parse_literal()?))
            }
            Token::LeftBracket => {
                self.advance()?;
                let expr = self.with_context(self.ctx.without(Context::DISALLOW_IN), |p| p.parse_assignment())?;
                self.eat(&Token::RightBracket)?;
                Ok(PropertyKey::Computed(Box::new(expr)))
            }
            Token::PrivateName(name) if allow_private => {
                let name = name.clone();
                self.advance()?;
                Ok(PropertyKey::PrivateIdentifier(PrivateIdentifier {
                    span: self.finish(start),
                    name,
                }))
            }
            token if token.is_identifier_name() => Ok(PropertyKey::Identifier(self.parse_identifier_name()?)),
            _ => Err(self.unexpected()),
        }
    }
}

/// Tokens that can begin a property name after `get`, `set` or `async`.
pub(super) fn starts_property_name(token: &Token) -> bool {
    token.is_identifier_name()
        || matches!(
            token,
            Token::StringLiteral(_)
                | Token::NumericLiteral(_)
                | Token::LegacyOctalLiteral(_)
                | Token::BigIntLiteral(_)
                | Token::LeftBracket
                | Token::PrivateName(_)
        )
}

fn is_private_member(expr: &Expression) -> bool {
    match expr {
        Expression::Member(member) => matches!(*member.property, Expression::PrivateIdentifier(_)),
        Expression::Chain(chain) => is_private_member(&chain.expression),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse_with(src: &str, options: Options) -> std::result::Result<Program, ParseError> {
        Parser::new(src, options).parse_program()
    }

    fn parse(src: &str) -> Program {
        parse_with(src, Options::default()).unwrap()
    }

    fn parse_err(src: &str) -> ErrorKind {
        parse_with(src, Options::default()).unwrap_err().kind
    }

    fn expr(src: &str) -> Expression {
        let prog = parse(src);
        match prog.body.into_iter().next() {
            Some(Statement::Expression(es)) => *es.expression,
            other => panic!("expected an expression statement, got {other:?}"),
        }
    }

    #[test]
    fn precedence() {
        let Expression::Binary(sum) = expr("1 + 2 * 3") else {
            panic!("expected a binary expression");
        };
        assert_eq!(sum.operator, BinaryOperator::Add);
        assert!(matches!(*sum.right, Expression::Binary(ref b) if b.operator == BinaryOperator::Multiply));

        let Expression::Binary(pow) = expr("2 ** 3 ** 2") else {
            panic!("expected a binary expression");
        };
        assert!(matches!(*pow.left, Expression::Literal(_)));
        assert!(matches!(*pow.right, Expression::Binary(_)));
    }

    #[test]
    fn parenthesized_operand_span_starts_at_paren() {
        let Expression::Binary(product) = expr("(a + b) * c") else {
            panic!("expected a binary expression");
        };
        assert_eq!(product.span.start, 0);
        assert_eq!(product.left.span().start, 1);
    }

    #[test]
    fn logical_operators() {
        assert!(matches!(expr("a ?? b"), Expression::Logical(ref l) if l.operator == LogicalOperator::Nullish));
        assert_eq!(parse_err("a ?? b || c"), ErrorKind::NullishMix);
        assert_eq!(parse_err("a && b ?? c"), ErrorKind::NullishMix);
        parse("(a ?? b) || c");
        parse("a ?? (b && c)");
    }

    #[test]
    fn exponent_after_unary() {
        assert_eq!(parse_err("-a ** 2"), ErrorKind::UnaryBeforeExponent);
        parse("(-a) ** 2");
        parse("2 ** -a");
        parse("++a ** 2");
    }

    #[test]
    fn conditional_and_assignment() {
        assert!(matches!(expr("a ? b : c"), Expression::Conditional(_)));
        let Expression::Assignment(assign) = expr("a = b = c") else {
            panic!("expected an assignment");
        };
        assert!(matches!(*assign.right, Expression::Assignment(_)));
        assert!(matches!(expr("a ||= b"), Expression::Assignment(ref a) if a.operator == AssignmentOperator::Or));
        assert_eq!(parse_err("a() = 1"), ErrorKind::InvalidAssignmentTarget);
        assert_eq!(parse_err("[a] += 1"), ErrorKind::InvalidAssignmentTarget);
    }

    #[test]
    fn update_targets() {
        parse("a++; --b.c");
        assert_eq!(parse_err("a() ++"), ErrorKind::InvalidUpdateTarget);
        assert_eq!(parse_err("'use strict'; eval++"), ErrorKind::StrictEvalArguments);
        let prog = parse("a\n++b");
        assert_eq!(prog.body.len(), 2);
    }

    #[test]
    fn optional_chains() {
        let Expression::Chain(chain) = expr("a?.b.c()") else {
            panic!("expected a chain expression");
        };
        let Expression::Call(call) = chain.expression.as_ref() else {
            panic!("expected a call");
        };
        assert!(!call.optional);
        assert!(matches!(*call.callee, Expression::Member(ref m) if !m.optional));
        assert_eq!(parse_err("new a?.b()"), ErrorKind::OptionalChainNew);
        assert_eq!(parse_err("a?.b`c`"), ErrorKind::OptionalChainTemplate);
        assert_eq!(parse_err("a?.b = 1"), ErrorKind::InvalidAssignmentTarget);

        let Expression::Member(member) = expr("(a?.b).c") else {
            panic!("expected a member expression");
        };
        assert!(matches!(*member.object, Expression::Chain(_)));
    }

    #[test]
    fn arrows() {
        let Expression::Arrow(arrow) = expr("(a, [b], {c} = {}, ...d) => a") else {
            panic!("expected an arrow");
        };
        assert_eq!(arrow.params.len(), 4);
        assert!(arrow.expression);
        assert!(matches!(arrow.params[3], Pattern::Rest(_)));

        let Expression::Arrow(simple) = expr("x => { return x }") else {
            panic!("expected an arrow");
        };
        assert!(!simple.expression);
        assert!(matches!(simple.body, ArrowBody::Block(_)));

        assert_eq!(parse_err("(a, a) => 1"), ErrorKind::DuplicateParameter);
        assert!(matches!(parse_err("(a, ...b,) => 1"), ErrorKind::RestNotLast));
        assert!(matches!(parse_err("(a)\n=> 1"), ErrorKind::UnexpectedToken(_)));
        assert!(matches!(parse_err("()"), ErrorKind::UnexpectedToken(_)));
        assert!(matches!(parse_err("a => {}()"), ErrorKind::UnexpectedToken(_)));
        assert_eq!(parse_err("(a) => { 'use strict' }; ([a]) => { 'use strict' }"), ErrorKind::UseStrictNonSimple);
    }

    #[test]
    fn async_arrows_and_calls() {
        assert!(matches!(expr("async (a) => a"), Expression::Arrow(ref a) if a.is_async));
        assert!(matches!(expr("async x => x"), Expression::Arrow(ref a) if a.is_async));
        assert!(matches!(expr("async (a)"), Expression::Call(_)));
        assert!(matches!(expr("async => 1"), Expression::Arrow(ref a) if !a.is_async));
        assert!(matches!(expr("async\n(a)"), Expression::Call(_)));
        assert_eq!(parse_err("async (await) => 1"), ErrorKind::UnexpectedReserved);
        assert_eq!(parse_err("async function f() { (a = await 1) => a }"), ErrorKind::AwaitInParameter);
    }

    #[test]
    fn yield_and_await() {
        let prog = parse("function* g() { yield; yield a; yield* b }");
        let Statement::Function(g) = &prog.body[0] else {
            panic!("expected a function");
        };
        assert_eq!(g.body.body.len(), 3);
        assert_eq!(parse_err("function* g(a = yield) {}"), ErrorKind::YieldInParameter);
        assert_eq!(parse_err("function* g() { (a = yield) => 1 }"), ErrorKind::YieldInParameter);
        parse("function f() { var yield; }");
        parse("async function f() { await a; }");
        assert_eq!(parse_err("async function f() { await a ** 2 }"), ErrorKind::UnaryBeforeExponent);
    }

    #[test]
    fn super_and_meta() {
        parse("({ m() { return super.x } })");
        assert_eq!(parse_err("function f() { super.x }"), ErrorKind::UnexpectedSuper);
        assert_eq!(parse_err("({ m() { super() } })"), ErrorKind::UnexpectedSuper);
        parse("function f() { new.target }");
        parse("function f() { () => new.target }");
        assert_eq!(parse_err("new.target"), ErrorKind::InvalidNewTarget);
        assert_eq!(parse_err("import.meta"), ErrorKind::ImportMetaOutsideModule);
        let module = Options {
            module: true,
            ..Options::default()
        };
        assert!(parse_with("import.meta.url", module).is_ok());
    }

    #[test]
    fn new_expressions() {
        let Expression::New(outer) = expr("new new A()()") else {
            panic!("expected new");
        };
        assert!(matches!(*outer.callee, Expression::New(_)));
        let Expression::Member(member) = expr("new A().b") else {
            panic!("expected a member expression");
        };
        assert!(matches!(*member.object, Expression::New(_)));
        let Expression::New(bare) = expr("new A") else {
            panic!("expected new");
        };
        assert!(bare.arguments.is_empty());
    }

    #[test]
    fn literals() {
        assert!(matches!(expr("0x10"), Expression::Literal(ref l) if l.value == LiteralValue::Number(16.0)));
        assert!(matches!(expr("10n"), Expression::Literal(ref l) if l.bigint.as_deref() == Some("10")));
        let Expression::Literal(re) = expr("/a+/gi") else {
            panic!("expected a regex literal");
        };
        let regex = re.regex.unwrap();
        assert_eq!((regex.pattern.as_str(), regex.flags.as_str()), ("a+", "gi"));
        assert!(matches!(expr("010"), Expression::Literal(ref l) if l.value == LiteralValue::Number(8.0)));
        assert_eq!(parse_err("'use strict'; 010"), ErrorKind::StrictOctalLiteral);
        assert_eq!(parse_err("'use strict'; 09"), ErrorKind::StrictDecimalWithLeadingZero);
        let no_compat = Options {
            disable_web_compat: true,
            ..Options::default()
        };
        assert_eq!(parse_with("010", no_compat).unwrap_err().kind, ErrorKind::StrictOctalLiteral);
    }

    #[test]
    fn raw_is_opt_in() {
        let Expression::Literal(plain) = expr("'a'") else {
            panic!("expected a literal");
        };
        assert!(plain.raw.is_none());
        let options = Options {
            raw: true,
            ..Options::default()
        };
        let prog = parse_with("'a'", options).unwrap();
        let Statement::Expression(es) = &prog.body[0] else {
            panic!("expected an expression statement");
        };
        assert!(matches!(*es.expression, Expression::Literal(ref l) if l.raw.as_deref() == Some("'a'")));
    }

    #[test]
    fn templates() {
        let Expression::Template(tpl) = expr("`a${b}c${d}e`") else {
            panic!("expected a template");
        };
        assert_eq!(tpl.quasis.len(), 3);
        assert_eq!(tpl.expressions.len(), 2);
        assert!(tpl.quasis[2].tail);
        assert_eq!(tpl.quasis[1].value.cooked.as_deref(), Some("c"));
        assert_eq!((tpl.quasis[0].span.start, tpl.quasis[0].span.end), (1, 2));

        assert_eq!(parse_err("`\\01`"), ErrorKind::TemplateOctalEscape);
        let Expression::TaggedTemplate(tagged) = expr("tag`\\01`") else {
            panic!("expected a tagged template");
        };
        assert!(tagged.quasi.quasis[0].value.cooked.is_none());
    }

    #[test]
    fn objects() {
        let Expression::Object(obj) = expr("({ a, b: 1, [c]: 2, d() {}, get e() { return 1 }, set e(v) {}, async *f() {}, ...g })") else {
            panic!("expected an object");
        };
        assert_eq!(obj.properties.len(), 8);
        let ObjectProperty::Property(computed) = &obj.properties[2] else {
            panic!("expected a property");
        };
        assert!(computed.computed);
        assert!(matches!(computed.key, PropertyKey::Computed(_)));
        let ObjectProperty::Property(getter) = &obj.properties[4] else {
            panic!("expected a property");
        };
        assert_eq!(getter.kind, PropertyKind::Get);
        assert!(!getter.method);
        parse("({ get: 1, set() {}, async: 2, get })");
        assert_eq!(parse_err("({ get a(b) {} })"), ErrorKind::GetterArity);
        assert_eq!(parse_err("({ set a() {} })"), ErrorKind::SetterArity);
        assert_eq!(parse_err("({ if })"), ErrorKind::UnexpectedReserved);
    }

    #[test]
    fn private_in() {
        parse("class A { #x; static is(o) { return #x in o } }");
        assert!(matches!(parse_err("class A { #x; m() { #x } }"), ErrorKind::UnexpectedToken(_)));
        assert!(matches!(parse_err("class A { #x; m(o) { 1 + #x in o } }"), ErrorKind::UnexpectedToken(_)));
    }

    #[test]
    fn delete_rules() {
        parse("delete a.b; delete a");
        assert_eq!(parse_err("'use strict'; delete a"), ErrorKind::StrictDelete);
        assert_eq!(parse_err("'use strict'; delete (a)"), ErrorKind::StrictDelete);
        assert_eq!(parse_err("class A { #x; m() { delete this.#x } }"), ErrorKind::DeletePrivate);
    }

    #[test]
    fn import_calls() {
        assert!(matches!(expr("import('a')"), Expression::Import(ref i) if i.options.is_none()));
        assert!(matches!(expr("import('a', { with: {} })"), Expression::Import(ref i) if i.options.is_some()));
        assert!(matches!(parse_err("new import('a')"), ErrorKind::UnexpectedToken(_)));
    }
}
