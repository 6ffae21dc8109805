use super::*;

impl<'a> Parser<'a> {
    // -----------------------------------------------------------------------
    // Imports
    // -----------------------------------------------------------------------

    pub(super) fn parse_import_declaration(&mut self) -> Result<ImportDeclaration> {
        let start = self.start;
        self.advance()?; // import

        let mut specifiers = Vec::new();
        // import "module"
        if !matches!(self.current, Token::StringLiteral(_)) {
            if self.at_identifier() {
                // import defaultExport[, ...] from "module"
                let local = self.parse_import_local()?;
                specifiers.push(ImportDeclarationSpecifier::Default(ImportDefaultSpecifier {
                    span: local.span.clone(),
                    local,
                }));
                if self.consume(&Token::Comma)? {
                    self.parse_import_clause(&mut specifiers)?;
                }
            } else {
                self.parse_import_clause(&mut specifiers)?;
            }
            self.eat_contextual("from")?;
        }
        let source = self.parse_module_source()?;
        let attributes = self.parse_import_attributes()?;
        self.eat_semicolon()?;
        trace!(specifiers = specifiers.len(), "import declaration");
        Ok(ImportDeclaration {
            span: self.finish(start),
            specifiers,
            source,
            attributes,
        })
    }

    /// `* as ns` or `{ named, other as local }`.
    fn parse_import_clause(&mut self, specifiers: &mut Vec<ImportDeclarationSpecifier>) -> Result<()> {
        let start = self.start;
        if self.consume(&Token::Star)? {
            self.eat_contextual("as")?;
            let local = self.parse_import_local()?;
            specifiers.push(ImportDeclarationSpecifier::Namespace(ImportNamespaceSpecifier {
                span: self.finish(start),
                local,
            }));
            return Ok(());
        }

        self.eat(&Token::LeftBrace)?;
        while !self.at(&Token::RightBrace) {
            let start = self.start;
            let imported = self.parse_module_export_name()?;
            let local = if self.at_contextual("as") {
                self.advance()?;
                self.parse_import_local()?
            } else {
                let ModuleExportName::Identifier(id) = &imported else {
                    return Err(self.error(ErrorKind::Expected("as")));
                };
                let id = id.clone();
                self.check_binding(&id, self.ctx)?;
                self.declare(&id, BindingKind::Lexical)?;
                id
            };
            specifiers.push(ImportDeclarationSpecifier::Named(ImportSpecifier {
                span: self.finish(start),
                imported,
                local,
            }));
            if !self.consume(&Token::Comma)? {
                break;
            }
        }
        self.eat(&Token::RightBrace)
    }

    fn parse_import_local(&mut self) -> Result<Identifier> {
        let id = self.parse_binding_identifier()?;
        self.declare(&id, BindingKind::Lexical)?;
        Ok(id)
    }

    fn eat_contextual(&mut self, name: &'static str) -> Result<()> {
        if !self.at_contextual(name) {
            return Err(match self.current {
                Token::Eof => self.unexpected(),
                _ => self.error(ErrorKind::Expected(name)),
            });
        }
        self.advance()?;
        Ok(())
    }

    fn parse_module_source(&mut self) -> Result<Literal> {
        if !matches!(self.current, Token::StringLiteral(_)) {
            return Err(self.unexpected());
        }
        self.parse_literal()
    }

    fn parse_module_export_name(&mut self) -> Result<ModuleExportName> {
        if matches!(self.current, Token::StringLiteral(_)) {
            if self.lone_surrogate {
                return Err(self.error(ErrorKind::MalformedExportName));
            }
            return Ok(ModuleExportName::Literal(self.parse_literal()?));
        }
        Ok(ModuleExportName::Identifier(self.parse_identifier_name()?))
    }

    /// `with { type: "json" }` after a module source.
    fn parse_import_attributes(&mut self) -> Result<Vec<ImportAttribute>> {
        if !self.at_keyword(Keyword::With) {
            return Ok(Vec::new());
        }
        self.advance()?;
        self.eat(&Token::LeftBrace)?;
        let mut attributes: Vec<ImportAttribute> = Vec::new();
        while !self.at(&Token::RightBrace) {
            let start = self.start;
            let key = self.parse_module_export_name()?;
            let name = key.name();
            if attributes.iter().any(|a| a.key.name() == name) {
                return Err(self.error_at(ErrorKind::DuplicateImportAttribute(name), key.span().start));
            }
            self.eat(&Token::Colon)?;
            if !matches!(self.current, Token::StringLiteral(_)) {
                return Err(self.unexpected());
            }
            let value = self.parse_literal()?;
            attributes.push(ImportAttribute {
                span: self.finish(start),
                key,
                value,
            });
            if !self.consume(&Token::Comma)? {
                break;
            }
        }
        self.eat(&Token::RightBrace)?;
        Ok(attributes)
    }

    // -----------------------------------------------------------------------
    // Exports
    // -----------------------------------------------------------------------

    pub(super) fn parse_export_declaration(&mut self) -> Result<Statement> {
        let start = self.start;
        self.advance()?; // export

        if self.at_keyword(Keyword::Default) {
            return self.parse_export_default(start);
        }

        // export * from "module", export * as ns from "module"
        if self.consume(&Token::Star)? {
            let exported = if self.at_contextual("as") {
                self.advance()?;
                let name = self.parse_module_export_name()?;
                self.record_export(&name.name(), name.span().start)?;
                Some(name)
            } else {
                None
            };
            self.eat_contextual("from")?;
            let source = self.parse_module_source()?;
            let attributes = self.parse_import_attributes()?;
            self.eat_semicolon()?;
            return Ok(Statement::ExportAll(ExportAllDeclaration {
                span: self.finish(start),
                exported,
                source,
                attributes,
            }));
        }

        if self.at(&Token::LeftBrace) {
            return self.parse_export_list(start);
        }

        let decl_start = self.start;
        let declaration = match self.current {
            Token::Keyword(Keyword::Var) => self.parse_variable_statement(VariableKind::Var)?,
            Token::Keyword(Keyword::Let) => self.parse_variable_statement(VariableKind::Let)?,
            Token::Keyword(Keyword::Const) => self.parse_variable_statement(VariableKind::Const)?,
            Token::Keyword(Keyword::Function) => {
                Statement::Function(self.parse_function_declaration(decl_start, false, false)?)
            }
            Token::Keyword(Keyword::Async) if self.async_function_follows()? => {
                self.advance()?;
                Statement::Function(self.parse_function_declaration(decl_start, true, false)?)
            }
            Token::Keyword(Keyword::Class) => {
                Statement::Class(self.parse_class(decl_start, ClassType::ClassDeclaration)?)
            }
            _ => return Err(self.unexpected()),
        };
        for id in declared_names(&declaration) {
            self.record_export(&id.name, id.span.start)?;
        }
        Ok(Statement::ExportNamed(ExportNamedDeclaration {
            span: self.finish(start),
            declaration: Some(Box::new(declaration)),
            specifiers: Vec::new(),
            source: None,
            attributes: Vec::new(),
        }))
    }

    /// `export { a, b as c }` with or without `from "module"`.
    fn parse_export_list(&mut self, start: Position) -> Result<Statement> {
        self.eat(&Token::LeftBrace)?;
        let mut specifiers = Vec::new();
        while !self.at(&Token::RightBrace) {
            let spec_start = self.start;
            let local = self.parse_module_export_name()?;
            let exported = if self.at_contextual("as") {
                self.advance()?;
                self.parse_module_export_name()?
            } else {
                local.clone()
            };
            self.record_export(&exported.name(), exported.span().start)?;
            specifiers.push(ExportSpecifier {
                span: self.finish(spec_start),
                local,
                exported,
            });
            if !self.consume(&Token::Comma)? {
                break;
            }
        }
        self.eat(&Token::RightBrace)?;

        let (source, attributes) = if self.at_contextual("from") {
            self.advance()?;
            let source = self.parse_module_source()?;
            (Some(source), self.parse_import_attributes()?)
        } else {
            // Without a source, every local must name a binding of this module.
            for spec in &specifiers {
                match &spec.local {
                    ModuleExportName::Literal(lit) => {
                        return Err(self.error_at(ErrorKind::StringLocalExport, lit.span.start));
                    }
                    ModuleExportName::Identifier(id) => {
                        validate::check_identifier(&id.name, self.ctx)
                            .map_err(|k| self.error_at(k, id.span.start))?;
                        let at = self.start_of(&id.span);
                        self.export_references.push((id.name.clone(), at));
                    }
                }
            }
            (None, Vec::new())
        };
        self.eat_semicolon()?;
        Ok(Statement::ExportNamed(ExportNamedDeclaration {
            span: self.finish(start),
            declaration: None,
            specifiers,
            source,
            attributes,
        }))
    }

    fn parse_export_default(&mut self, start: Position) -> Result<Statement> {
        self.record_export("default", self.start.offset)?;
        self.advance()?; // default
        let decl_start = self.start;
        let declaration = if self.at_keyword(Keyword::Function) {
            ExportDefaultKind::Function(self.parse_function_declaration(decl_start, false, true)?)
        } else if self.at_keyword(Keyword::Async) && self.async_function_follows()? {
            self.advance()?;
            ExportDefaultKind::Function(self.parse_function_declaration(decl_start, true, true)?)
        } else if self.at_keyword(Keyword::Class) {
            ExportDefaultKind::Class(self.parse_class_with(decl_start, ClassType::ClassDeclaration, true)?)
        } else {
            let expr = self.parse_assignment()?;
            self.eat_semicolon()?;
            ExportDefaultKind::Expression(Box::new(expr))
        };
        Ok(Statement::ExportDefault(ExportDefaultDeclaration {
            span: self.finish(start),
            declaration,
        }))
    }

    fn async_function_follows(&self) -> Result<bool> {
        let (next, newline) = self.peek()?;
        Ok(!newline && next.is_keyword(Keyword::Function))
    }

    fn record_export(&mut self, name: &str, offset: usize) -> Result<()> {
        trace!(name, "export");
        validate::check_export_name(&mut self.exported, name).map_err(|k| self.error_at(k, offset))
    }

    /// Local names in `export { ... }` may be declared after the export,
    /// so they are resolved once the whole module is parsed.
    pub(super) fn check_export_references(&self) -> Result<()> {
        for (name, at) in &self.export_references {
            if !self.scopes.is_declared_at_top(name) {
                return Err(ParseError::new(ErrorKind::UndefinedExport(name.clone()), *at));
            }
        }
        Ok(())
    }
}

fn declared_names(declaration: &Statement) -> Vec<&Identifier> {
    match declaration {
        Statement::Variable(decl) => decl
            .declarations
            .iter()
            .flat_map(|d| patterns::binding_identifiers(&d.id))
            .collect(),
        Statement::Function(function) => function.id.iter().collect(),
        Statement::Class(class) => class.id.iter().collect(),
        _ => Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse_module(src: &str) -> std::result::Result<Program, ParseError> {
        let options = Options {
            module: true,
            ..Options::default()
        };
        Parser::new(src, options).parse_program()
    }

    fn parse(src: &str) -> Program {
        parse_module(src).unwrap()
    }

    fn parse_err(src: &str) -> ErrorKind {
        parse_module(src).unwrap_err().kind
    }

    #[test]
    fn import_forms() {
        let prog = parse(
            "import 'a'; import b from 'b'; import * as c from 'c'; \
             import d, { e, f as g, 'h-i' as j } from 'd'; import k, * as l from 'k';",
        );
        let counts: Vec<usize> = prog
            .body
            .iter()
            .map(|s| match s {
                Statement::Import(i) => i.specifiers.len(),
                _ => usize::MAX,
            })
            .collect();
        assert_eq!(counts, vec![0, 1, 1, 4, 2]);
        let Statement::Import(import) = &prog.body[3] else {
            panic!("expected an import");
        };
        assert!(matches!(&import.specifiers[0], ImportDeclarationSpecifier::Default(d) if d.local.name == "d"));
        assert!(matches!(&import.specifiers[3], ImportDeclarationSpecifier::Named(n)
            if n.imported.name() == "h-i" && n.local.name == "j"));
        parse("import from from 'x'; import { default as y } from 'x';");
    }

    #[test]
    fn import_errors() {
        assert_eq!(parse_err("import { 'a' } from 'a'"), ErrorKind::Expected("as"));
        assert_eq!(parse_err("import { default } from 'a'"), ErrorKind::UnexpectedReserved);
        assert_eq!(parse_err("import a from 'a'; let a;"), ErrorKind::DuplicateBinding("a".into()));
        assert_eq!(parse_err("import { a, a } from 'a'"), ErrorKind::DuplicateBinding("a".into()));
        assert_eq!(parse_err("import a 'a'"), ErrorKind::Expected("from"));
        assert_eq!(parse_err("import await from 'a'"), ErrorKind::UnexpectedReserved);
    }

    #[test]
    fn import_attributes() {
        let prog = parse("import a from './a.json' with { type: 'json' };");
        let Statement::Import(import) = &prog.body[0] else {
            panic!("expected an import");
        };
        assert_eq!(import.attributes.len(), 1);
        assert_eq!(import.attributes[0].key.name(), "type");
        assert_eq!(
            parse_err("import a from 'a' with { type: 'json', 'type': 'css' }"),
            ErrorKind::DuplicateImportAttribute("type".into())
        );
        assert!(matches!(parse_err("import a from 'a' with { type: json }"), ErrorKind::UnexpectedToken(_)));
        parse("export * from 'a' with { type: 'json' }");
    }

    #[test]
    fn export_forms() {
        let prog = parse(
            "export var a = 1, [b] = c; export let d; export function e() {} \
             export async function f() {} export class G {} export { a as h, d as 'i j' }; \
             export * from 'x'; export * as ns from 'y'; export { k as l } from 'z';",
        );
        assert_eq!(prog.body.len(), 9);
        assert!(matches!(&prog.body[6], Statement::ExportAll(e) if e.exported.is_none()));
        assert!(matches!(&prog.body[7], Statement::ExportAll(e) if e.exported.is_some()));
        assert!(matches!(&prog.body[8], Statement::ExportNamed(e) if e.source.is_some()));
    }

    #[test]
    fn export_default_forms() {
        let prog = parse("export default function () {}");
        let Statement::ExportDefault(e) = &prog.body[0] else {
            panic!("expected a default export");
        };
        assert!(matches!(&e.declaration, ExportDefaultKind::Function(f) if f.id.is_none()));
        let prog = parse("export default class A {}\nnew A()");
        assert!(matches!(&prog.body[0], Statement::ExportDefault(e)
            if matches!(&e.declaration, ExportDefaultKind::Class(c) if c.id.is_some())));
        let prog = parse("export default async function () {}");
        assert!(matches!(&prog.body[0], Statement::ExportDefault(e)
            if matches!(&e.declaration, ExportDefaultKind::Function(f) if f.is_async)));
        let prog = parse("export default a + b;");
        assert!(matches!(&prog.body[0], Statement::ExportDefault(e)
            if matches!(e.declaration, ExportDefaultKind::Expression(_))));
    }

    #[test]
    fn export_errors() {
        assert_eq!(parse_err("export default 1; export default 2;"), ErrorKind::DuplicateExport("default".into()));
        assert_eq!(parse_err("export var a; export { a };"), ErrorKind::DuplicateExport("a".into()));
        assert_eq!(parse_err("export { a };"), ErrorKind::UndefinedExport("a".into()));
        parse("export { a }; var a;");
        parse("export { a }; function a() {}");
        assert_eq!(parse_err("export { 'a' };"), ErrorKind::StringLocalExport);
        parse("export { 'a' } from 'b';");
        assert_eq!(parse_err("export { if };"), ErrorKind::UnexpectedReserved);
        parse("export { if } from 'b';");
        assert!(matches!(parse_err("export 1;"), ErrorKind::UnexpectedToken(_)));
        assert!(matches!(parse_err("function f() { export var a; }"), ErrorKind::UnexpectedToken(_)));
    }

    #[test]
    fn export_names_must_be_well_formed() {
        assert_eq!(parse_err(r"export { a as '\uD800' }; var a;"), ErrorKind::MalformedExportName);
        assert_eq!(parse_err(r"export { '\uDC00' as b } from 'm';"), ErrorKind::MalformedExportName);
        assert_eq!(parse_err(r"import { '\uD800' as c } from 'm';"), ErrorKind::MalformedExportName);
        parse(r"export { a as '\uD83D\uDE00' }; var a;");
        parse(r"export * as '\u{1F600}' from 'm';");
    }
}
