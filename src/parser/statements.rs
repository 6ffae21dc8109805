use super::*;

impl<'a> Parser<'a> {
    pub(super) fn parse_statement_list_item(&mut self) -> Result<Statement> {
        self.parse_statement(StatementPosition::ListItem)
    }

    fn parse_statement(&mut self, position: StatementPosition) -> Result<Statement> {
        self.nested(|p| p.parse_statement_at(position))
    }

    fn parse_statement_at(&mut self, position: StatementPosition) -> Result<Statement> {
        let start = self.start;
        let list_item = position == StatementPosition::ListItem;
        let keyword = match self.current {
            Token::Keyword(kw) => Some(kw),
            _ => None,
        };
        match keyword {
            Some(Keyword::Var) => self.parse_variable_statement(VariableKind::Var),
            Some(Keyword::Const) => {
                if !list_item {
                    return Err(self.error(ErrorKind::LexicalInSingleStatement));
                }
                self.parse_variable_statement(VariableKind::Const)
            }
            Some(Keyword::Let) => {
                let (next, _) = self.peek()?;
                if list_item && starts_let_declaration(&next) {
                    return self.parse_variable_statement(VariableKind::Let);
                }
                if !list_item && next == Token::LeftBracket {
                    return Err(self.error(ErrorKind::LexicalInSingleStatement));
                }
                self.parse_expression_or_labelled(position)
            }
            Some(Keyword::Function) => self.parse_function_statement(start, false, position),
            Some(Keyword::Async) => {
                let (next, newline) = self.peek()?;
                if !newline && next.is_keyword(Keyword::Function) {
                    return self.parse_function_statement(start, true, position);
                }
                self.parse_expression_or_labelled(position)
            }
            Some(Keyword::Class) => {
                if !list_item {
                    return Err(self.error(ErrorKind::LexicalInSingleStatement));
                }
                Ok(Statement::Class(self.parse_class(start, ClassType::ClassDeclaration)?))
            }
            Some(Keyword::If) => self.parse_if(),
            Some(Keyword::For) => self.parse_for(),
            Some(Keyword::While) => self.parse_while(),
            Some(Keyword::Do) => self.parse_do_while(),
            Some(Keyword::Return) => self.parse_return(),
            Some(Keyword::Break) => self.parse_jump(false),
            Some(Keyword::Continue) => self.parse_jump(true),
            Some(Keyword::Throw) => self.parse_throw(),
            Some(Keyword::Try) => self.parse_try(),
            Some(Keyword::Switch) => self.parse_switch(),
            Some(Keyword::With) => self.parse_with_statement(),
            Some(Keyword::Debugger) => {
                self.advance()?;
                self.eat_semicolon()?;
                Ok(Statement::Debugger(DebuggerStatement {
                    span: self.finish(start),
                }))
            }
            Some(Keyword::Import) => {
                let (next, _) = self.peek()?;
                if matches!(next, Token::LeftParen | Token::Dot) {
                    return self.parse_expression_or_labelled(position);
                }
                if !self.ctx.is_module() {
                    return Err(self.error(ErrorKind::ImportOutsideModule));
                }
                if !list_item || !self.scopes.at_top() {
                    return Err(self.unexpected());
                }
                Ok(Statement::Import(self.parse_import_declaration()?))
            }
            Some(Keyword::Export) => {
                if !self.ctx.is_module() {
                    return Err(self.error(ErrorKind::ExportOutsideModule));
                }
                if !list_item || !self.scopes.at_top() {
                    return Err(self.unexpected());
                }
                self.parse_export_declaration()
            }
            _ => match self.current {
                Token::LeftBrace => Ok(Statement::Block(self.parse_block()?)),
                Token::Semicolon => {
                    self.advance()?;
                    Ok(Statement::Empty(EmptyStatement {
                        span: self.finish(start),
                    }))
                }
                _ => self.parse_expression_or_labelled(position),
            },
        }
    }

    pub(super) fn parse_variable_statement(&mut self, kind: VariableKind) -> Result<Statement> {
        let start = self.start;
        let mut declaration = self.parse_variable_declaration(kind, false)?;
        self.eat_semicolon()?;
        declaration.span = self.finish(start);
        Ok(Statement::Variable(declaration))
    }

    /// Function declarations outside a statement list are only tolerated
    /// as sloppy-mode web-compat forms.
    fn parse_function_statement(&mut self, start: Position, is_async: bool, position: StatementPosition) -> Result<Statement> {
        if position != StatementPosition::ListItem {
            let is_generator = !is_async && self.peek()?.0 == Token::Star;
            if is_async || is_generator {
                return Err(self.error(ErrorKind::AsyncOrGeneratorPosition));
            }
            if self.ctx.is_strict() {
                return Err(self.error(ErrorKind::StrictFunctionPosition));
            }
            let allowed = matches!(position, StatementPosition::IfBody | StatementPosition::Labelled);
            if !allowed || !self.options.annex_b() {
                return Err(self.error(ErrorKind::SloppyFunctionPosition));
            }
        }
        if is_async {
            self.advance()?;
        }
        if position == StatementPosition::IfBody {
            // Behaves as if wrapped in a block.
            self.scopes.enter(ScopeFlags::empty());
            let function = self.parse_function_declaration(start, is_async, false);
            self.scopes.exit();
            return Ok(Statement::Function(function?));
        }
        Ok(Statement::Function(self.parse_function_declaration(start, is_async, false)?))
    }

    pub(super) fn parse_block(&mut self) -> Result<BlockStatement> {
        self.scopes.enter(ScopeFlags::empty());
        let block = self.parse_block_in_scope();
        self.scopes.exit();
        block
    }

    /// A block whose declarations land in the scope already on top (catch
    /// clause bodies share their parameter's scope).
    fn parse_block_in_scope(&mut self) -> Result<BlockStatement> {
        let start = self.start;
        self.eat(&Token::LeftBrace)?;
        let mut body = Vec::new();
        while !self.at(&Token::RightBrace) {
            body.push(self.parse_statement_list_item()?);
        }
        self.eat(&Token::RightBrace)?;
        Ok(BlockStatement {
            span: self.finish(start),
            body,
        })
    }

    fn parse_expression_or_labelled(&mut self, position: StatementPosition) -> Result<Statement> {
        let start = self.start;
        if self.at_identifier() && self.peek()?.0 == Token::Colon {
            return self.parse_labelled(position);
        }
        let expression = self.parse_expression()?;
        self.eat_semicolon()?;
        Ok(self.factory.expression_statement(expression, None, self.finish(start)))
    }

    fn parse_labelled(&mut self, position: StatementPosition) -> Result<Statement> {
        let start = self.start;
        let label = self.take_identifier()?;
        validate::check_identifier(&label.name, self.ctx).map_err(|k| self.error_at(k, label.span.start))?;
        validate::check_new_label(&self.labels, &label.name).map_err(|k| self.error_at(k, label.span.start))?;
        self.eat(&Token::Colon)?;
        let kind = if self.labelled_loop_follows()? {
            LabelKind::Loop
        } else {
            LabelKind::Other
        };
        self.labels.push(Label {
            name: label.name.clone(),
            kind,
        });
        let body_position = match position {
            StatementPosition::ListItem | StatementPosition::Labelled => StatementPosition::Labelled,
            _ => StatementPosition::Single,
        };
        let body = self.parse_statement(body_position);
        self.labels.pop();
        Ok(Statement::Labeled(LabeledStatement {
            span: self.finish(start),
            label,
            body: Box::new(body?),
        }))
    }

    /// Whether the labelled statement starting at the current token is a
    /// loop, looking through further `label:` prefixes.
    fn labelled_loop_follows(&self) -> Result<bool> {
        let mut lexer = self.lexer.clone();
        let mut token = self.current.clone();
        loop {
            match token {
                Token::Keyword(Keyword::For | Keyword::While | Keyword::Do) => return Ok(true),
                Token::Identifier(_) => {}
                Token::Keyword(kw) if kw.is_contextual() => {}
                _ => return Ok(false),
            }
            if lexer.next_token()? != Token::Colon {
                return Ok(false);
            }
            token = lexer.next_token()?;
        }
    }

    fn parse_if(&mut self) -> Result<Statement> {
        let start = self.start;
        self.advance()?;
        let test = self.parse_paren_expression()?;
        let consequent = self.parse_statement(StatementPosition::IfBody)?;
        let alternate = if self.at_keyword(Keyword::Else) {
            self.advance()?;
            Some(Box::new(self.parse_statement(StatementPosition::IfBody)?))
        } else {
            None
        };
        Ok(Statement::If(IfStatement {
            span: self.finish(start),
            test: Box::new(test),
            consequent: Box::new(consequent),
            alternate,
        }))
    }

    fn parse_paren_expression(&mut self) -> Result<Expression> {
        self.eat(&Token::LeftParen)?;
        let expr = self.parse_expression()?;
        self.eat(&Token::RightParen)?;
        Ok(expr)
    }

    fn parse_loop_body(&mut self) -> Result<Statement> {
        self.with_context(self.ctx.with(Context::ITERATION), |p| {
            p.parse_statement(StatementPosition::Single)
        })
    }

    fn parse_while(&mut self) -> Result<Statement> {
        let start = self.start;
        self.advance()?;
        let test = self.parse_paren_expression()?;
        let body = self.parse_loop_body()?;
        Ok(Statement::While(WhileStatement {
            span: self.finish(start),
            test: Box::new(test),
            body: Box::new(body),
        }))
    }

    fn parse_do_while(&mut self) -> Result<Statement> {
        let start = self.start;
        self.advance()?;
        let body = self.parse_loop_body()?;
        self.eat_keyword(Keyword::While)?;
        let test = self.parse_paren_expression()?;
        // A semicolon is always inserted after `do ... while (...)`.
        self.consume(&Token::Semicolon)?;
        Ok(Statement::DoWhile(DoWhileStatement {
            span: self.finish(start),
            body: Box::new(body),
            test: Box::new(test),
        }))
    }

    // -----------------------------------------------------------------------
    // for, for-in, for-of, for-await
    // -----------------------------------------------------------------------

    fn parse_for(&mut self) -> Result<Statement> {
        let start = self.start;
        self.advance()?;
        let is_await = self.at_keyword(Keyword::Await);
        if is_await {
            if !self.ctx.has(Context::AWAIT) {
                return Err(self.error(ErrorKind::ForAwaitOutsideAsync));
            }
            self.advance()?;
        }
        self.eat(&Token::LeftParen)?;
        self.scopes.enter(ScopeFlags::empty());
        let result = self.parse_for_head(start, is_await);
        self.scopes.exit();
        result
    }

    fn parse_for_head(&mut self, start: Position, is_await: bool) -> Result<Statement> {
        let head_ctx = self.ctx.with(Context::DISALLOW_IN);
        if self.at(&Token::Semicolon) {
            if is_await {
                return Err(self.unexpected());
            }
            return self.parse_for_loop(start, None);
        }

        let declaration_kind = match self.current {
            Token::Keyword(Keyword::Var) => Some(VariableKind::Var),
            Token::Keyword(Keyword::Const) => Some(VariableKind::Const),
            Token::Keyword(Keyword::Let) if starts_let_declaration(&self.peek()?.0) => Some(VariableKind::Let),
            _ => None,
        };
        if let Some(kind) = declaration_kind {
            let declaration = self.with_context(head_ctx, |p| p.parse_variable_declaration(kind, true))?;
            let is_of = self.at_keyword(Keyword::Of);
            if !is_of && !self.at_keyword(Keyword::In) {
                if is_await {
                    return Err(self.unexpected());
                }
                return self.parse_for_loop(start, Some(ForInit::Variable(declaration)));
            }
            let loop_kind = if is_of { "of" } else { "in" };
            if declaration.declarations.len() != 1 {
                return Err(self.error_at(
                    ErrorKind::ForInOfMultipleBindings(loop_kind),
                    declaration.span.start,
                ));
            }
            let declarator = &declaration.declarations[0];
            if declarator.init.is_some() {
                let web_compat_initializer = !is_of
                    && kind == VariableKind::Var
                    && !self.ctx.is_strict()
                    && self.options.annex_b()
                    && matches!(declarator.id, Pattern::Identifier(_));
                if !web_compat_initializer {
                    return Err(self.error_at(ErrorKind::ForInOfInitializer(loop_kind), declarator.span.start));
                }
            }
            return self.parse_for_in_of(start, ForTarget::Variable(declaration), is_of, is_await);
        }

        let init_start = self.start;
        let starts_with_let = self.at_keyword(Keyword::Let);
        let starts_with_async = self.at_keyword(Keyword::Async);
        let mut cover = CoverErrors::default();
        let first = self.with_context(head_ctx, |p| p.parse_assignment_cover(&mut cover))?;
        let is_of = self.at_keyword(Keyword::Of);
        if is_of || self.at_keyword(Keyword::In) {
            let loop_kind = if is_of { "of" } else { "in" };
            if is_of && starts_with_let {
                return Err(ParseError::new(ErrorKind::ForOfLet, init_start));
            }
            let bare_async = matches!(&first, Expression::Identifier(id)
                if id.name == "async" && id.span.end == init_start.offset + "async".len());
            if is_of && !is_await && starts_with_async && bare_async {
                return Err(ParseError::new(ErrorKind::ForOfAsync, init_start));
            }
            if is_await && !is_of {
                return Err(self.unexpected());
            }
            let parenthesized = self.is_parenthesized(first.span());
            let target = match first {
                Expression::Object(_) | Expression::Array(_) if !parenthesized => {
                    cover.check_pattern()?;
                    self.to_pattern(first, patterns::TargetKind::Assignment)?
                }
                other => self.to_simple_target(other, ErrorKind::InvalidForTarget(loop_kind))?,
            };
            return self.parse_for_in_of(start, ForTarget::Pattern(target), is_of, is_await);
        }
        if is_await {
            return Err(self.unexpected());
        }
        cover.check_expression()?;
        let init = if self.at(&Token::Comma) {
            let mut expressions = vec![first];
            while self.consume(&Token::Comma)? {
                expressions.push(self.with_context(head_ctx, |p| p.parse_assignment())?);
            }
            Expression::Sequence(SequenceExpression {
                span: self.finish(init_start),
                expressions,
            })
        } else {
            first
        };
        self.parse_for_loop(start, Some(ForInit::Expression(Box::new(init))))
    }

    fn parse_for_loop(&mut self, start: Position, init: Option<ForInit>) -> Result<Statement> {
        self.eat(&Token::Semicolon)?;
        let test = if self.at(&Token::Semicolon) {
            None
        } else {
            Some(Box::new(self.parse_expression()?))
        };
        self.eat(&Token::Semicolon)?;
        let update = if self.at(&Token::RightParen) {
            None
        } else {
            Some(Box::new(self.parse_expression()?))
        };
        self.eat(&Token::RightParen)?;
        let body = self.parse_loop_body()?;
        Ok(Statement::For(ForStatement {
            span: self.finish(start),
            init,
            test,
            update,
            body: Box::new(body),
        }))
    }

    fn parse_for_in_of(&mut self, start: Position, left: ForTarget, is_of: bool, is_await: bool) -> Result<Statement> {
        self.advance()?;
        let right = if is_of {
            self.parse_assignment()?
        } else {
            self.parse_expression()?
        };
        self.eat(&Token::RightParen)?;
        let body = Box::new(self.parse_loop_body()?);
        let span = self.finish(start);
        let right = Box::new(right);
        Ok(if is_of {
            Statement::ForOf(ForOfStatement {
                span,
                is_await,
                left,
                right,
                body,
            })
        } else {
            Statement::ForIn(ForInStatement {
                span,
                left,
                right,
                body,
            })
        })
    }

    // -----------------------------------------------------------------------
    // Jumps
    // -----------------------------------------------------------------------

    fn parse_return(&mut self) -> Result<Statement> {
        let start = self.start;
        if !self.ctx.has(Context::RETURN) {
            return Err(self.error(ErrorKind::IllegalReturn));
        }
        self.advance()?;
        let argument = if self.at(&Token::Semicolon) || self.can_insert_semicolon() {
            None
        } else {
            Some(Box::new(self.parse_expression()?))
        };
        self.eat_semicolon()?;
        Ok(Statement::Return(ReturnStatement {
            span: self.finish(start),
            argument,
        }))
    }

    /// `break` and `continue`, with or without a label.
    fn parse_jump(&mut self, is_continue: bool) -> Result<Statement> {
        let start = self.start;
        self.advance()?;
        let label = if self.at_identifier() && !self.newline_before {
            let label = self.take_identifier()?;
            validate::check_jump_label(&self.labels, &label.name, is_continue)
                .map_err(|k| self.error_at(k, label.span.start))?;
            Some(label)
        } else {
            validate::check_unlabelled_jump(self.ctx, is_continue).map_err(|k| ParseError::new(k, start))?;
            None
        };
        self.eat_semicolon()?;
        let span = self.finish(start);
        Ok(if is_continue {
            Statement::Continue(ContinueStatement { span, label })
        } else {
            Statement::Break(BreakStatement { span, label })
        })
    }

    fn parse_throw(&mut self) -> Result<Statement> {
        let start = self.start;
        self.advance()?;
        if self.newline_before {
            return Err(self.error(ErrorKind::NewlineAfterThrow));
        }
        let argument = self.parse_expression()?;
        self.eat_semicolon()?;
        Ok(Statement::Throw(ThrowStatement {
            span: self.finish(start),
            argument: Box::new(argument),
        }))
    }

    fn parse_try(&mut self) -> Result<Statement> {
        let start = self.start;
        self.advance()?;
        let block = self.parse_block()?;
        let handler = if self.at_keyword(Keyword::Catch) {
            Some(self.parse_catch()?)
        } else {
            None
        };
        let finalizer = if self.at_keyword(Keyword::Finally) {
            self.advance()?;
            Some(self.parse_block()?)
        } else {
            None
        };
        if handler.is_none() && finalizer.is_none() {
            return Err(self.error(ErrorKind::NoCatchOrFinally));
        }
        Ok(Statement::Try(TryStatement {
            span: self.finish(start),
            block,
            handler,
            finalizer,
        }))
    }

    fn parse_catch(&mut self) -> Result<CatchClause> {
        let start = self.start;
        self.advance()?;
        if !self.consume(&Token::LeftParen)? {
            let body = self.parse_block()?;
            return Ok(CatchClause {
                span: self.finish(start),
                param: None,
                body,
            });
        }
        let param = self.parse_binding_target()?;
        let result = match &param {
            Pattern::Identifier(id) => {
                self.scopes.enter(ScopeFlags::SIMPLE_CATCH);
                self.declare(id, BindingKind::SimpleCatch)
            }
            _ => {
                self.scopes.enter(ScopeFlags::empty());
                self.declare_pattern(&param, BindingKind::Lexical)
            }
        };
        let body = result
            .and_then(|()| self.eat(&Token::RightParen))
            .and_then(|()| self.parse_block_in_scope());
        self.scopes.exit();
        Ok(CatchClause {
            span: self.finish(start),
            param: Some(param),
            body: body?,
        })
    }

    fn parse_switch(&mut self) -> Result<Statement> {
        let start = self.start;
        self.advance()?;
        let discriminant = self.parse_paren_expression()?;
        self.eat(&Token::LeftBrace)?;
        self.scopes.enter(ScopeFlags::empty());
        let cases = self.with_context(self.ctx.with(Context::SWITCH), |p| p.parse_switch_cases());
        self.scopes.exit();
        let cases = cases?;
        self.eat(&Token::RightBrace)?;
        Ok(Statement::Switch(SwitchStatement {
            span: self.finish(start),
            discriminant: Box::new(discriminant),
            cases,
        }))
    }

    fn parse_switch_cases(&mut self) -> Result<Vec<SwitchCase>> {
        let mut cases = Vec::new();
        let mut has_default = false;
        while !self.at(&Token::RightBrace) {
            let start = self.start;
            let test = if self.at_keyword(Keyword::Case) {
                self.advance()?;
                Some(self.parse_expression()?)
            } else if self.at_keyword(Keyword::Default) {
                if has_default {
                    return Err(self.error(ErrorKind::MultipleDefaults));
                }
                has_default = true;
                self.advance()?;
                None
            } else {
                return Err(self.unexpected());
            };
            self.eat(&Token::Colon)?;
            let mut consequent = Vec::new();
            while !self.at(&Token::RightBrace) && !self.at_keyword(Keyword::Case) && !self.at_keyword(Keyword::Default) {
                consequent.push(self.parse_statement_list_item()?);
            }
            cases.push(SwitchCase {
                span: self.finish(start),
                test,
                consequent,
            });
        }
        Ok(cases)
    }

    fn parse_with_statement(&mut self) -> Result<Statement> {
        let start = self.start;
        if self.ctx.is_strict() {
            return Err(self.error(ErrorKind::StrictWith));
        }
        self.advance()?;
        let object = self.parse_paren_expression()?;
        let body = self.parse_statement(StatementPosition::Single)?;
        Ok(Statement::With(WithStatement {
            span: self.finish(start),
            object: Box::new(object),
            body: Box::new(body),
        }))
    }
}

/// After `let`, these tokens make it a declaration rather than an
/// identifier.
fn starts_let_declaration(next: &Token) -> bool {
    match next {
        Token::LeftBracket | Token::LeftBrace | Token::Identifier(_) => true,
        Token::Keyword(kw) => kw.is_contextual(),
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

    fn web_compat() -> Options {
        Options {
            web_compat: true,
            ..Options::default()
        }
    }

    #[test]
    fn let_as_identifier_or_declaration() {
        assert!(matches!(parse("let x = 1").body[0], Statement::Variable(_)));
        assert!(matches!(parse("let\nx = 1").body[0], Statement::Variable(_)));
        assert!(matches!(parse("let = 1").body[0], Statement::Expression(_)));
        assert!(matches!(parse("let;").body[0], Statement::Expression(_)));
        assert_eq!(parse_err("if (a) let [b] = c"), ErrorKind::LexicalInSingleStatement);
        assert_eq!(parse_err("while (a) const b = 1"), ErrorKind::LexicalInSingleStatement);
        assert_eq!(parse_err("if (a) class B {}"), ErrorKind::LexicalInSingleStatement);
        assert_eq!(parse_err("'use strict'; let = 1"), ErrorKind::UnexpectedStrictReserved);
    }

    #[test]
    fn function_positions() {
        assert_eq!(parse_err("if (a) function f() {}"), ErrorKind::SloppyFunctionPosition);
        assert!(parse_with("if (a) function f() {} else function g() {}", web_compat()).is_ok());
        assert!(parse_with("l: function f() {}", web_compat()).is_ok());
        assert_eq!(
            parse_with("while (a) function f() {}", web_compat()).unwrap_err().kind,
            ErrorKind::SloppyFunctionPosition
        );
        assert_eq!(parse_err("'use strict'; if (a) function f() {}"), ErrorKind::StrictFunctionPosition);
        assert_eq!(
            parse_with("if (a) function* g() {}", web_compat()).unwrap_err().kind,
            ErrorKind::AsyncOrGeneratorPosition
        );
        assert!(matches!(parse("async\nfunction f() {}").body[0], Statement::Expression(_)));
    }

    #[test]
    fn labels() {
        let prog = parse("outer: for (;;) { inner: for (;;) { continue outer; } }");
        assert!(matches!(prog.body[0], Statement::Labeled(_)));
        parse("a: b: while (1) continue a;");
        parse("a: { break a; }");
        assert_eq!(parse_err("a: { continue a; }"), ErrorKind::IllegalContinueLabel("a".into()));
        assert_eq!(parse_err("a: a: ;"), ErrorKind::DuplicateLabel("a".into()));
        assert_eq!(parse_err("break b;"), ErrorKind::UndefinedLabel("b".into()));
        assert_eq!(parse_err("a: while (1) { function f() { break a; } }"), ErrorKind::UndefinedLabel("a".into()));
        assert_eq!(parse_err("break;"), ErrorKind::IllegalBreak);
        assert_eq!(parse_err("switch (a) { case 1: continue; }"), ErrorKind::IllegalContinue);
        parse("switch (a) { case 1: break; default: }");
        let prog = parse("while (1) { break\nfoo }");
        let Statement::While(w) = &prog.body[0] else {
            panic!("expected while");
        };
        let Statement::Block(block) = w.body.as_ref() else {
            panic!("expected a block");
        };
        assert_eq!(block.body.len(), 2);
    }

    #[test]
    fn for_statements() {
        assert!(matches!(parse("for (var i = 0; i < n; i++) {}").body[0], Statement::For(_)));
        assert!(matches!(parse("for (let [a, b] of c) {}").body[0], Statement::ForOf(_)));
        assert!(matches!(parse("for ([a, b] of c) {}").body[0], Statement::ForOf(_)));
        assert!(matches!(parse("for (a.b in c) {}").body[0], Statement::ForIn(_)));
        assert!(matches!(parse("for (let in o) {}").body[0], Statement::ForIn(_)));
        assert!(matches!(parse("for ((async) of x) {}").body[0], Statement::ForOf(_)));
        let prog = parse("for (a, b; c; d++) {}");
        let Statement::For(f) = &prog.body[0] else {
            panic!("expected for");
        };
        assert!(matches!(f.init.as_ref(), Some(ForInit::Expression(e)) if matches!(**e, Expression::Sequence(_))));
        parse("async function f() { for await (async of x) ; }");
        parse("for (async.x of y) ;");
        parse("for (var i = 0, j = (1 in o); ; ) break;");
    }

    #[test]
    fn for_head_errors() {
        assert_eq!(parse_err("for (let of x) ;"), ErrorKind::UnexpectedToken("x".into()));
        assert_eq!(parse_err("for (let.x of y) ;"), ErrorKind::ForOfLet);
        assert_eq!(parse_err("for (async of x) ;"), ErrorKind::ForOfAsync);
        assert_eq!(parse_err("for (var a, b of c) ;"), ErrorKind::ForInOfMultipleBindings("of"));
        assert_eq!(parse_err("for (let a = 1 of c) ;"), ErrorKind::ForInOfInitializer("of"));
        assert_eq!(parse_err("for (var a = 1 in c) ;"), ErrorKind::ForInOfInitializer("in"));
        assert!(parse_with("for (var a = 1 in c) ;", web_compat()).is_ok());
        assert_eq!(parse_err("for (a() of c) ;"), ErrorKind::InvalidForTarget("of"));
        assert_eq!(parse_err("for (const a; ;) ;"), ErrorKind::MissingInitializer("const"));
        assert_eq!(parse_err("for await (a of b) ;"), ErrorKind::ForAwaitOutsideAsync);
        parse("async function f() { for await (const a of b) ; }");
        assert_eq!(parse_err("for (let a of b) { var a; }"), ErrorKind::DuplicateBinding("a".into()));
    }

    #[test]
    fn try_catch() {
        let prog = parse("try {} catch {} finally {}");
        let Statement::Try(t) = &prog.body[0] else {
            panic!("expected try");
        };
        assert!(t.handler.as_ref().is_some_and(|h| h.param.is_none()));
        assert!(t.finalizer.is_some());
        assert_eq!(parse_err("try {}"), ErrorKind::NoCatchOrFinally);
        assert_eq!(parse_err("try {} catch (e) { let e; }"), ErrorKind::DuplicateBinding("e".into()));
        parse("try {} catch (e) { var e; }");
        assert_eq!(parse_err("try {} catch ([e]) { var e; }"), ErrorKind::DuplicateBinding("e".into()));
        let strict_compat = Options {
            disable_web_compat: true,
            ..Options::default()
        };
        assert!(parse_with("try {} catch (e) { var e; }", strict_compat).is_err());
    }

    #[test]
    fn misc_statements() {
        assert_eq!(parse_err("return 1"), ErrorKind::IllegalReturn);
        let global_return = Options {
            global_return: true,
            ..Options::default()
        };
        assert!(parse_with("return 1", global_return).is_ok());
        assert_eq!(parse_err("throw\nnew Error()"), ErrorKind::NewlineAfterThrow);
        assert_eq!(parse_err("switch (a) { default: default: }"), ErrorKind::MultipleDefaults);
        let prog = parse("do x(); while (y) z()");
        assert_eq!(prog.body.len(), 2);
        assert!(matches!(parse("debugger;").body[0], Statement::Debugger(_)));
        assert!(matches!(parse(";").body[0], Statement::Empty(_)));
        let prog = parse("function f() { return\n1 }");
        let Statement::Function(f) = &prog.body[0] else {
            panic!("expected a function");
        };
        assert!(matches!(&f.body.body[0], Statement::Return(r) if r.argument.is_none()));
    }

    #[test]
    fn import_export_need_module_top_level() {
        assert_eq!(parse_err("import a from 'a'"), ErrorKind::ImportOutsideModule);
        assert_eq!(parse_err("export var a"), ErrorKind::ExportOutsideModule);
        parse("import('a')");
        let module = Options {
            module: true,
            ..Options::default()
        };
        assert!(matches!(
            parse_with("{ import a from 'a' }", module).unwrap_err().kind,
            ErrorKind::UnexpectedToken(_)
        ));
    }
}
