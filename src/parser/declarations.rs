use super::*;

impl<'a> Parser<'a> {
    // -----------------------------------------------------------------------
    // Variables
    // -----------------------------------------------------------------------

    /// `var`, `let` or `const` followed by its declarators, without the
    /// terminating semicolon. In a for-statement head a missing initializer
    /// is left for the caller to judge once it knows whether `in`/`of`
    /// follows.
    pub(super) fn parse_variable_declaration(&mut self, kind: VariableKind, in_for_head: bool) -> Result<VariableDeclaration> {
        let start = self.start;
        self.advance()?;
        let binding_kind = match kind {
            VariableKind::Var => BindingKind::Var,
            VariableKind::Let | VariableKind::Const => BindingKind::Lexical,
        };
        let mut declarations = Vec::new();
        loop {
            let decl_start = self.start;
            let id = self.parse_binding_target()?;
            if kind != VariableKind::Var {
                for name in patterns::binding_identifiers(&id) {
                    validate::check_lexical_name(&name.name).map_err(|k| self.error_at(k, name.span.start))?;
                }
            }
            self.declare_pattern(&id, binding_kind)?;
            let init = if self.consume(&Token::Assign)? {
                Some(Box::new(self.parse_assignment()?))
            } else {
                let head_of_for_in_of = in_for_head && (self.at_keyword(Keyword::In) || self.at_keyword(Keyword::Of));
                if !head_of_for_in_of {
                    if kind == VariableKind::Const {
                        return Err(self.error(ErrorKind::MissingInitializer("const")));
                    }
                    if !matches!(id, Pattern::Identifier(_)) {
                        return Err(self.error(ErrorKind::MissingInitializer("destructuring")));
                    }
                }
                None
            };
            declarations.push(VariableDeclarator {
                span: self.finish(decl_start),
                id,
                init,
            });
            if !self.consume(&Token::Comma)? {
                break;
            }
        }
        Ok(VariableDeclaration {
            span: self.finish(start),
            declarations,
            kind,
        })
    }

    // -----------------------------------------------------------------------
    // Functions
    // -----------------------------------------------------------------------

    /// A function declaration. `start` is where `async` (or `function`)
    /// began; the name may be omitted only after `export default`.
    pub(super) fn parse_function_declaration(&mut self, start: Position, is_async: bool, id_optional: bool) -> Result<Function> {
        self.eat_keyword(Keyword::Function)?;
        let is_generator = self.consume(&Token::Star)?;
        trace!(is_async, is_generator, "function declaration");
        let outer = self.ctx;
        let id = if self.at_identifier() {
            let id = self.take_identifier()?;
            self.check_binding(&id, outer)?;
            let plain = !is_async && !is_generator;
            let kind = self.function_binding_kind(plain);
            self.declare(&id, kind)?;
            Some(id)
        } else if id_optional {
            None
        } else {
            return Err(self.unexpected());
        };
        let ctx = outer.function_body(is_async, is_generator);
        let (params, body, use_strict) = self.parse_params_and_body(ctx, false)?;
        if use_strict && let Some(id) = &id {
            self.check_binding(id, outer.with(Context::STRICT))?;
        }
        Ok(Function {
            kind: FunctionType::FunctionDeclaration,
            span: self.finish(start),
            id,
            generator: is_generator,
            is_async,
            params,
            body,
        })
    }

    /// A function expression; its name is bound inside the function, so it
    /// is checked against the function's own `yield`/`await` rules.
    pub(super) fn parse_function_expression(&mut self, start: Position, is_async: bool) -> Result<Function> {
        self.eat_keyword(Keyword::Function)?;
        let is_generator = self.consume(&Token::Star)?;
        trace!(is_async, is_generator, "function expression");
        let ctx = self.ctx.function_body(is_async, is_generator);
        let id = if self.at_identifier() {
            let id = self.take_identifier()?;
            self.check_binding(&id, ctx)?;
            Some(id)
        } else {
            None
        };
        let (params, body, use_strict) = self.parse_params_and_body(ctx, false)?;
        if use_strict && let Some(id) = &id {
            self.check_binding(id, ctx.with(Context::STRICT))?;
        }
        Ok(Function {
            kind: FunctionType::FunctionExpression,
            span: self.finish(start),
            id,
            generator: is_generator,
            is_async,
            params,
            body,
        })
    }

    /// How a function declaration's name binds in the current scope.
    fn function_binding_kind(&self, plain: bool) -> BindingKind {
        if self.scopes.current_treats_functions_as_var() {
            return BindingKind::Function;
        }
        let sloppy_block = !self.ctx.is_strict() && !self.ctx.is_module();
        if plain && sloppy_block && self.options.annex_b() {
            BindingKind::Function
        } else {
            BindingKind::Lexical
        }
    }

    /// Object and class methods, getters and setters. The function node
    /// starts at the parameter list.
    pub(super) fn parse_method(&mut self, is_async: bool, is_generator: bool, kind: MethodKind, super_call: bool) -> Result<Function> {
        let start = self.start;
        trace!(?kind, is_async, is_generator, "method");
        let ctx = self.ctx.method_body(is_async, is_generator, super_call);
        let (params, body, _) = self.parse_params_and_body(ctx, true)?;
        let arity = match kind {
            MethodKind::Get => validate::check_getter_params(&params),
            MethodKind::Set => validate::check_setter_params(&params),
            MethodKind::Method | MethodKind::Constructor => Ok(()),
        };
        arity.map_err(|k| ParseError::new(k, start))?;
        Ok(Function {
            kind: FunctionType::FunctionExpression,
            span: self.finish(start),
            id: None,
            generator: is_generator,
            is_async,
            params,
            body,
        })
    }

    /// `(params) { body }` in a fresh function scope. Returns whether the
    /// body declared "use strict".
    fn parse_params_and_body(&mut self, ctx: Context, is_method: bool) -> Result<(Vec<Pattern>, BlockStatement, bool)> {
        let labels = std::mem::take(&mut self.labels);
        let positions = (self.yield_pos.take(), self.await_pos.take(), self.await_ident_pos.take());
        self.scopes.enter(ScopeFlags::FUNCTION);
        let result = self.with_context(ctx, |p| {
            let params = p.with_context(ctx.with(Context::FORMAL_PARAMETERS), |p| p.parse_formal_parameters())?;
            for param in &params {
                p.declare_pattern(param, BindingKind::Var)?;
            }
            let (body, use_strict) = p.parse_function_body()?;
            p.check_params(&params, use_strict, is_method)?;
            Ok((params, body, use_strict))
        });
        self.scopes.exit();
        self.labels = labels;
        (self.yield_pos, self.await_pos, self.await_ident_pos) = positions;
        result
    }

    fn parse_formal_parameters(&mut self) -> Result<Vec<Pattern>> {
        self.eat(&Token::LeftParen)?;
        let mut params = Vec::new();
        while !self.at(&Token::RightParen) {
            if self.at(&Token::Ellipsis) {
                params.push(self.parse_binding_rest()?);
                if !self.at(&Token::RightParen) {
                    return Err(self.error(ErrorKind::RestNotLast));
                }
                break;
            }
            params.push(self.parse_binding_element()?);
            if !self.at(&Token::RightParen) {
                self.eat(&Token::Comma)?;
            }
        }
        self.eat(&Token::RightParen)?;
        Ok(params)
    }

    /// `{ ... }` of a function, method or arrow. A "use strict" directive
    /// switches the current context to strict for the rest of the body.
    fn parse_function_body(&mut self) -> Result<(BlockStatement, bool)> {
        let start = self.start;
        self.eat(&Token::LeftBrace)?;
        self.ctx = self.ctx.without(Context::DISALLOW_IN);
        let (body, use_strict) = self.parse_body_items(&Token::RightBrace)?;
        self.eat(&Token::RightBrace)?;
        Ok((
            BlockStatement {
                span: self.finish(start),
                body,
            },
            use_strict,
        ))
    }

    /// Early errors of a parameter list that depend on the body: strictness
    /// acquired from a directive, and duplicate names.
    pub(super) fn check_params(&self, params: &[Pattern], use_strict: bool, arrow_or_method: bool) -> Result<()> {
        let simple = validate::is_simple_parameter_list(params);
        if use_strict && !simple {
            let at = params.first().map_or(self.start.offset, |p| p.span().start);
            return Err(self.error_at(ErrorKind::UseStrictNonSimple, at));
        }
        let ids: Vec<&Identifier> = params.iter().flat_map(patterns::binding_identifiers).collect();
        let strict = self.ctx.is_strict();
        if strict {
            for id in &ids {
                self.check_binding(id, self.ctx)?;
            }
        }
        if validate::allows_duplicate_parameters(strict, simple, arrow_or_method) {
            return Ok(());
        }
        if let Some(name) = validate::first_duplicate(ids.iter().map(|id| id.name.as_str()))
            && let Some(second) = ids.iter().filter(|id| id.name == name).nth(1)
        {
            return Err(self.error_at(ErrorKind::DuplicateParameter, second.span.start));
        }
        Ok(())
    }

    /// Body of an arrow function whose parameters have been converted.
    /// `start` is the start of the parameters.
    pub(super) fn parse_arrow_function(&mut self, start: Position, params: Vec<Pattern>, is_async: bool) -> Result<Expression> {
        trace!(is_async, params = params.len(), "arrow function");
        self.eat(&Token::Arrow)?;
        let ctx = self
            .ctx
            .arrow_body(is_async)
            .with_if(self.ctx.has(Context::DISALLOW_IN), Context::DISALLOW_IN);
        let labels = std::mem::take(&mut self.labels);
        let positions = (self.yield_pos.take(), self.await_pos.take(), self.await_ident_pos.take());
        self.scopes.enter(ScopeFlags::FUNCTION | ScopeFlags::ARROW);
        let result = self.with_context(ctx, |p| {
            for param in &params {
                p.declare_pattern(param, BindingKind::Var)?;
            }
            if p.at(&Token::LeftBrace) {
                let (block, use_strict) = p.parse_function_body()?;
                p.check_params(&params, use_strict, true)?;
                Ok((ArrowBody::Block(block), false))
            } else {
                let body = p.parse_assignment()?;
                p.check_params(&params, false, true)?;
                Ok((ArrowBody::Expression(Box::new(body)), true))
            }
        });
        self.scopes.exit();
        self.labels = labels;
        (self.yield_pos, self.await_pos, self.await_ident_pos) = positions;
        let (body, expression) = result?;
        Ok(Expression::Arrow(ArrowFunctionExpression {
            span: self.finish(start),
            id: None,
            expression,
            generator: false,
            is_async,
            params,
            body,
        }))
    }

    // -----------------------------------------------------------------------
    // Classes
    // -----------------------------------------------------------------------

    /// A class expression, or a declaration whose name is required.
    pub(super) fn parse_class(&mut self, start: Position, kind: ClassType) -> Result<Class> {
        self.parse_class_with(start, kind, false)
    }

    /// `export default class {}` may leave out the name.
    pub(super) fn parse_class_with(&mut self, start: Position, kind: ClassType, id_optional: bool) -> Result<Class> {
        self.eat_keyword(Keyword::Class)?;
        trace!(?kind, "class");
        let ctx = self.ctx.with(Context::STRICT);
        let id = if self.at_identifier() {
            let id = self.take_identifier()?;
            self.check_binding(&id, ctx)?;
            validate::check_lexical_name(&id.name).map_err(|k| self.error_at(k, id.span.start))?;
            if kind == ClassType::ClassDeclaration {
                self.declare(&id, BindingKind::Lexical)?;
            }
            Some(id)
        } else if kind == ClassType::ClassDeclaration && !id_optional {
            return Err(self.unexpected());
        } else {
            None
        };
        let (super_class, body) = self.with_context(ctx, |p| {
            let super_class = if p.at_keyword(Keyword::Extends) {
                p.advance()?;
                Some(Box::new(p.parse_lhs_expression()?))
            } else {
                None
            };
            let body = p.parse_class_body(super_class.is_some())?;
            Ok((super_class, body))
        })?;
        Ok(Class {
            kind,
            span: self.finish(start),
            id,
            super_class,
            body,
        })
    }

    fn parse_class_body(&mut self, derived: bool) -> Result<ClassBody> {
        let start = self.start;
        self.eat(&Token::LeftBrace)?;
        self.private_scopes.push(PrivateScope::default());
        let mut body = Vec::new();
        let mut has_constructor = false;
        while !self.at(&Token::RightBrace) {
            if self.consume(&Token::Semicolon)? {
                continue;
            }
            body.push(self.parse_class_element(derived, &mut has_constructor)?);
        }
        self.eat(&Token::RightBrace)?;
        self.exit_private_scope()?;
        Ok(ClassBody {
            span: self.finish(start),
            body,
        })
    }

    fn parse_class_element(&mut self, derived: bool, has_constructor: &mut bool) -> Result<ClassElement> {
        let start = self.start;
        let mut is_static = false;
        if self.at_keyword(Keyword::Static) {
            let (next, _) = self.peek()?;
            if next == Token::LeftBrace {
                return self.parse_static_block(start);
            }
            if !ends_modifier(&next) {
                self.advance()?;
                is_static = true;
            }
        }
        let mut is_async = false;
        if self.at_keyword(Keyword::Async) {
            let (next, newline) = self.peek()?;
            if !newline && !ends_modifier(&next) {
                self.advance()?;
                is_async = true;
            }
        }
        let is_generator = self.consume(&Token::Star)?;
        let mut kind = MethodKind::Method;
        if !is_async && !is_generator && (self.at_contextual("get") || self.at_contextual("set")) {
            let (next, _) = self.peek()?;
            if !ends_modifier(&next) {
                kind = if self.at_contextual("get") {
                    MethodKind::Get
                } else {
                    MethodKind::Set
                };
                self.advance()?;
            }
        }

        let key = self.parse_property_key(true)?;
        let computed = key.is_computed();
        let key_at = key.span().start;
        let is_method = is_async || is_generator || kind != MethodKind::Method || self.at(&Token::LeftParen);

        if !is_method {
            validate::check_class_field(&key, is_static).map_err(|k| self.error_at(k, key_at))?;
            if let PropertyKey::PrivateIdentifier(id) = &key {
                self.declare_private_name(id, PrivateNameKind::Other, is_static)?;
            }
            let value = if self.consume(&Token::Assign)? {
                let ctx = self.ctx.field_initializer();
                let labels = std::mem::take(&mut self.labels);
                let value = self.with_context(ctx, |p| p.parse_assignment());
                self.labels = labels;
                Some(Box::new(value?))
            } else {
                None
            };
            self.eat_semicolon()?;
            return Ok(ClassElement::Property(PropertyDefinition {
                span: self.finish(start),
                is_static,
                computed,
                key,
                value,
            }));
        }

        validate::check_class_method(&key, is_static, kind, is_async, is_generator)
            .map_err(|k| self.error_at(k, key_at))?;
        let is_constructor = !is_static && validate::is_constructor_key(&key);
        match &key {
            PropertyKey::PrivateIdentifier(id) if id.name == "constructor" => {
                return Err(self.error_at(ErrorKind::PrivateConstructor, key_at));
            }
            PropertyKey::PrivateIdentifier(id) => {
                let private_kind = match kind {
                    MethodKind::Get => PrivateNameKind::Getter,
                    MethodKind::Set => PrivateNameKind::Setter,
                    _ => PrivateNameKind::Other,
                };
                self.declare_private_name(id, private_kind, is_static)?;
            }
            _ => {}
        }
        if is_constructor {
            if *has_constructor {
                return Err(self.error_at(ErrorKind::DuplicateConstructor, key_at));
            }
            *has_constructor = true;
            kind = MethodKind::Constructor;
        }
        let value = self.parse_method(is_async, is_generator, kind, is_constructor && derived)?;
        Ok(ClassElement::Method(MethodDefinition {
            span: self.finish(start),
            is_static,
            computed,
            key,
            kind,
            value,
        }))
    }

    fn parse_static_block(&mut self, start: Position) -> Result<ClassElement> {
        self.advance()?;
        self.eat(&Token::LeftBrace)?;
        let labels = std::mem::take(&mut self.labels);
        self.scopes.enter(ScopeFlags::STATIC_BLOCK);
        let body = self.with_context(self.ctx.static_block(), |p| {
            let mut body = Vec::new();
            while !p.at(&Token::RightBrace) {
                body.push(p.parse_statement_list_item()?);
            }
            Ok(body)
        });
        self.scopes.exit();
        self.labels = labels;
        let body = body?;
        self.eat(&Token::RightBrace)?;
        Ok(ClassElement::StaticBlock(StaticBlock {
            span: self.finish(start),
            body,
        }))
    }
}

/// After `static`, `async`, `get` or `set`, these tokens mean the word was
/// the element's name rather than a modifier.
fn ends_modifier(token: &Token) -> bool {
    matches!(
        token,
        Token::LeftParen | Token::Assign | Token::Semicolon | Token::RightBrace | Token::Eof
    )
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

    fn class_of(prog: &Program) -> &Class {
        match &prog.body[0] {
            Statement::Class(class) => class,
            other => panic!("expected a class declaration, got {other:?}"),
        }
    }

    #[test]
    fn variable_declarations() {
        let prog = parse("var foo, bar;");
        let Statement::Variable(decl) = &prog.body[0] else {
            panic!("expected a variable declaration");
        };
        assert_eq!(decl.kind, VariableKind::Var);
        assert_eq!(decl.declarations.len(), 2);
        assert!(decl.declarations.iter().all(|d| d.init.is_none()));
        assert_eq!((decl.span.start, decl.span.end), (0, 13));

        assert_eq!(parse_err("const a;"), ErrorKind::MissingInitializer("const"));
        assert_eq!(parse_err("let [a];"), ErrorKind::MissingInitializer("destructuring"));
        assert_eq!(parse_err("let let = 1;"), ErrorKind::LetInLexicalBinding);
        assert_eq!(parse_err("let a; let a;"), ErrorKind::DuplicateBinding("a".into()));
        assert_eq!(parse_err("let a; var a;"), ErrorKind::DuplicateBinding("a".into()));
        parse("var a; var a; { let a; }");
    }

    #[test]
    fn function_declarations() {
        let prog = parse("async function* f(a, b = 1, ...c) { }");
        let Statement::Function(f) = &prog.body[0] else {
            panic!("expected a function");
        };
        assert!(f.is_async && f.generator);
        assert_eq!(f.params.len(), 3);
        assert_eq!(f.id.as_ref().map(|id| id.name.as_str()), Some("f"));
        assert_eq!(parse_err("function (a) {}"), ErrorKind::UnexpectedToken("(".into()));
        assert_eq!(parse_err("function f(...a, b) {}"), ErrorKind::RestNotLast);
    }

    #[test]
    fn parameter_rules() {
        parse("function f(a, a) {}");
        assert_eq!(parse_err("'use strict'; function f(a, a) {}"), ErrorKind::DuplicateParameter);
        assert_eq!(parse_err("function f(a, [a]) {}"), ErrorKind::DuplicateParameter);
        assert_eq!(parse_err("function f(a = 1) { 'use strict' }"), ErrorKind::UseStrictNonSimple);
        assert_eq!(parse_err("function f(eval) { 'use strict' }"), ErrorKind::StrictEvalArguments);
        assert_eq!(parse_err("function eval() { 'use strict' }"), ErrorKind::StrictEvalArguments);
        assert_eq!(parse_err("function f(a) { let a; }"), ErrorKind::DuplicateBinding("a".into()));
        parse("function f(a) { var a; }");
    }

    #[test]
    fn function_names_follow_their_context() {
        parse("function* yield() {}");
        assert_eq!(parse_err("(function* yield() {})"), ErrorKind::UnexpectedReserved);
        parse("async function await() {}");
        assert_eq!(parse_err("(async function await() {})"), ErrorKind::UnexpectedReserved);
    }

    #[test]
    fn block_function_redeclaration() {
        assert_eq!(
            parse_err("{ function f() {} function f() {} }"),
            ErrorKind::DuplicateBinding("f".into())
        );
        let web = Options {
            web_compat: true,
            ..Options::default()
        };
        assert!(parse_with("{ function f() {} function f() {} }", web).is_ok());
        parse("function f() {} function f() {} var f;");
        let module = Options {
            module: true,
            ..Options::default()
        };
        assert!(parse_with("function f() {} var f;", module).is_err());
    }

    #[test]
    fn empty_class() {
        let options = Options {
            loc: true,
            ..Options::default()
        };
        let prog = parse_with("class A {}", options).unwrap();
        let class = class_of(&prog);
        assert_eq!((class.span.start, class.span.end), (0, 10));
        assert!(class.super_class.is_none());
        let loc = class.span.loc.unwrap();
        assert_eq!((loc.start.line, loc.start.column, loc.end.column), (1, 0, 10));
    }

    #[test]
    fn class_members() {
        let prog = parse("class C { a(){}b(){} }");
        let class = class_of(&prog);
        assert_eq!(class.body.body.len(), 2);
        assert!(class
            .body
            .body
            .iter()
            .all(|m| matches!(m, ClassElement::Method(m) if m.kind == MethodKind::Method)));

        let prog = parse("class D extends B { constructor() { super() } static #x = 1; get y() { return 1 } static { this.z = 2 } }");
        let class = class_of(&prog);
        assert!(class.super_class.is_some());
        assert_eq!(class.body.body.len(), 4);
        let ClassElement::Method(ctor) = &class.body.body[0] else {
            panic!("expected a constructor");
        };
        assert_eq!(ctor.kind, MethodKind::Constructor);
        assert_eq!(ctor.value.span.start, 31);
        assert!(matches!(&class.body.body[1], ClassElement::Property(p) if p.is_static));
        assert!(matches!(&class.body.body[3], ClassElement::StaticBlock(_)));
    }

    #[test]
    fn modifier_names_are_keys() {
        let prog = parse("class C { static; get; set = 1; async() {} static static() {} }");
        let class = class_of(&prog);
        assert_eq!(class.body.body.len(), 5);
        assert!(matches!(&class.body.body[0], ClassElement::Property(p) if !p.is_static));
        assert!(matches!(&class.body.body[4], ClassElement::Method(m) if m.is_static));
    }

    #[test]
    fn class_early_errors() {
        assert!(parse_with("class { get constructor() {} }", Options::default()).is_err());
        assert_eq!(parse_err("(class { get constructor() {} })"), ErrorKind::SpecialConstructor("an accessor"));
        assert_eq!(parse_err("class x { static get prototype() {} }"), ErrorKind::StaticPrototype);
        assert_eq!(parse_err("class A { constructor() {} constructor() {} }"), ErrorKind::DuplicateConstructor);
        assert_eq!(parse_err("class A { constructor = 1 }"), ErrorKind::ConstructorField);
        assert_eq!(parse_err("class A { #constructor() {} }"), ErrorKind::PrivateConstructor);
        assert_eq!(parse_err("class A { constructor() { super() } }"), ErrorKind::UnexpectedSuper);
        assert_eq!(parse_err("class A extends B { m() { super() } }"), ErrorKind::UnexpectedSuper);
        assert_eq!(parse_err("class A { x = arguments }"), ErrorKind::ArgumentsInClassInit);
        assert_eq!(parse_err("class A { static { await } }"), ErrorKind::UnexpectedReserved);
        assert_eq!(parse_err("class A { static { return } }"), ErrorKind::IllegalReturn);
        parse("class A { 'constructor'() {} static constructor() {} x = () => this; }");
    }

    #[test]
    fn class_bodies_are_strict() {
        assert_eq!(parse_err("class A { m() { with (a) {} } }"), ErrorKind::StrictWith);
        assert_eq!(parse_err("class let {}"), ErrorKind::UnexpectedStrictReserved);
    }

    #[test]
    fn getter_and_setter_arity() {
        assert_eq!(parse_err("class A { set x(...v) {} }"), ErrorKind::SetterRest);
        assert_eq!(parse_err("class A { get x(v) {} }"), ErrorKind::GetterArity);
        parse("class A { get x() { return 1 } set x(v) {} }");
    }
}
