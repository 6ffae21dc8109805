//! Static semantics (early error) predicates.
//!
//! Each check here is a small pure function over the current [`Context`]
//! and data the parser has already collected. The parser calls them at the
//! point a construct completes, so no separate pass over the tree exists.
//!
//! # Covered checks
//!
//! - Reserved words, `yield` and `await` as identifiers
//! - `eval`/`arguments` as strict-mode binding or assignment targets
//! - `arguments` in class field initializers and static blocks
//! - Duplicate and non-simple parameter lists
//! - Getter/setter arity
//! - Class constructors, `static prototype`, fields named `constructor`
//! - Simple assignment and update targets
//! - Label sets for `break` and `continue`

use crate::ast::{Expression, MethodKind, Pattern, PropertyKey};
use crate::context::Context;
use crate::error::ErrorKind;
use rustc_hash::FxHashSet;

const KEYWORDS: &[&str] = &[
    "break", "case", "catch", "class", "const", "continue", "debugger", "default", "delete", "do",
    "else", "enum", "export", "extends", "false", "finally", "for", "function", "if", "import",
    "in", "instanceof", "new", "null", "return", "super", "switch", "this", "throw", "true", "try",
    "typeof", "var", "void", "while", "with",
];

const STRICT_RESERVED: &[&str] = &[
    "implements", "interface", "let", "package", "private", "protected", "public", "static",
    "yield",
];

pub fn is_keyword(name: &str) -> bool {
    KEYWORDS.contains(&name)
}

pub fn is_strict_reserved(name: &str) -> bool {
    STRICT_RESERVED.contains(&name)
}

pub fn is_eval_or_arguments(name: &str) -> bool {
    name == "eval" || name == "arguments"
}

/// Rules shared by identifier references and binding identifiers.
pub fn check_identifier(name: &str, ctx: Context) -> Result<(), ErrorKind> {
    if is_keyword(name) {
        return Err(ErrorKind::UnexpectedReserved);
    }
    match name {
        "yield" if ctx.yield_is_reserved() => {
            if ctx.has(Context::YIELD) {
                return Err(ErrorKind::UnexpectedReserved);
            }
            Err(ErrorKind::UnexpectedStrictReserved)
        }
        "yield" => Ok(()),
        "await" if ctx.await_is_reserved() => Err(ErrorKind::UnexpectedReserved),
        "await" => Ok(()),
        _ if ctx.is_strict() && is_strict_reserved(name) => Err(ErrorKind::UnexpectedStrictReserved),
        "arguments" if ctx.has(Context::CLASS_FIELD_INIT) => Err(ErrorKind::ArgumentsInClassInit),
        _ => Ok(()),
    }
}

/// Names introduced by declarations, parameters and catch clauses.
pub fn check_binding_identifier(name: &str, ctx: Context) -> Result<(), ErrorKind> {
    check_identifier(name, ctx)?;
    if ctx.is_strict() && is_eval_or_arguments(name) {
        return Err(ErrorKind::StrictEvalArguments);
    }
    Ok(())
}

/// `let` and `const` (and classes) may not bind the name `let`.
pub fn check_lexical_name(name: &str) -> Result<(), ErrorKind> {
    if name == "let" {
        return Err(ErrorKind::LetInLexicalBinding);
    }
    Ok(())
}

/// A parameter list is simple when it is only plain identifiers.
pub fn is_simple_parameter_list(params: &[Pattern]) -> bool {
    params.iter().all(|p| matches!(p, Pattern::Identifier(_)))
}

/// Duplicate parameter names are tolerated only in sloppy functions with
/// a simple list that are neither arrows nor methods.
pub fn allows_duplicate_parameters(strict: bool, simple: bool, arrow_or_method: bool) -> bool {
    !strict && simple && !arrow_or_method
}

/// First name bound twice, if any.
pub fn first_duplicate<'a>(names: impl IntoIterator<Item = &'a str>) -> Option<&'a str> {
    let mut seen = FxHashSet::default();
    names.into_iter().find(|name| !seen.insert(*name))
}

/// Every name bound by `pattern`, in source order.
pub fn bound_names(pattern: &Pattern) -> Vec<String> {
    let mut names = Vec::new();
    collect_bound_names(pattern, &mut names);
    names
}

fn collect_bound_names(pattern: &Pattern, names: &mut Vec<String>) {
    match pattern {
        Pattern::Identifier(id) => names.push(id.name.clone()),
        Pattern::Member(_) => {}
        Pattern::Object(obj) => {
            for prop in &obj.properties {
                match prop {
                    crate::ast::ObjectPatternProperty::Property(p) => collect_bound_names(&p.value, names),
                    crate::ast::ObjectPatternProperty::Rest(r) => collect_bound_names(&r.argument, names),
                }
            }
        }
        Pattern::Array(arr) => {
            for elem in arr.elements.iter().flatten() {
                collect_bound_names(elem, names);
            }
        }
        Pattern::Assignment(assign) => collect_bound_names(&assign.left, names),
        Pattern::Rest(rest) => collect_bound_names(&rest.argument, names),
    }
}

pub fn check_getter_params(params: &[Pattern]) -> Result<(), ErrorKind> {
    if !params.is_empty() {
        return Err(ErrorKind::GetterArity);
    }
    Ok(())
}

pub fn check_setter_params(params: &[Pattern]) -> Result<(), ErrorKind> {
    match params {
        [Pattern::Rest(_)] => Err(ErrorKind::SetterRest),
        [_] => Ok(()),
        _ => Err(ErrorKind::SetterArity),
    }
}

/// The string name of a non-computed key, for the `constructor` and
/// `prototype` checks. String literal keys count.
fn plain_key_name(key: &PropertyKey) -> Option<String> {
    match key {
        PropertyKey::Identifier(_) | PropertyKey::Literal(_) => key.static_name(),
        _ => None,
    }
}

pub fn is_constructor_key(key: &PropertyKey) -> bool {
    plain_key_name(key).as_deref() == Some("constructor")
}

/// Checks a class method's name against its modifiers.
pub fn check_class_method(
    key: &PropertyKey,
    is_static: bool,
    kind: MethodKind,
    is_async: bool,
    is_generator: bool,
) -> Result<(), ErrorKind> {
    let name = plain_key_name(key);
    if is_static {
        if name.as_deref() == Some("prototype") {
            return Err(ErrorKind::StaticPrototype);
        }
        return Ok(());
    }
    if name.as_deref() != Some("constructor") {
        return Ok(());
    }
    match kind {
        MethodKind::Get | MethodKind::Set => Err(ErrorKind::SpecialConstructor("an accessor")),
        _ if is_generator => Err(ErrorKind::SpecialConstructor("a generator")),
        _ if is_async => Err(ErrorKind::SpecialConstructor("an async method")),
        _ => Ok(()),
    }
}

/// Checks a class field's name.
pub fn check_class_field(key: &PropertyKey, is_static: bool) -> Result<(), ErrorKind> {
    let name = plain_key_name(key);
    match name.as_deref() {
        Some("constructor") => Err(ErrorKind::ConstructorField),
        Some("prototype") if is_static => Err(ErrorKind::StaticPrototype),
        _ => match key {
            PropertyKey::PrivateIdentifier(id) if id.name == "constructor" => {
                Err(ErrorKind::PrivateConstructor)
            }
            _ => Ok(()),
        },
    }
}

/// Identifier or member expression, the only valid targets of compound
/// assignment and update operators.
pub fn is_simple_assignment_target(expr: &Expression, strict: bool) -> bool {
    match expr {
        Expression::Identifier(id) => !(strict && is_eval_or_arguments(&id.name)),
        Expression::Member(_) => true,
        _ => false,
    }
}

/// `"use strict"` exactly, without escapes or line continuations.
pub fn is_use_strict_directive(raw: &str) -> bool {
    raw == "\"use strict\"" || raw == "'use strict'"
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LabelKind {
    Loop,
    Switch,
    Other,
}

#[derive(Clone, Debug)]
pub struct Label {
    pub name: String,
    pub kind: LabelKind,
}

pub fn check_new_label(labels: &[Label], name: &str) -> Result<(), ErrorKind> {
    if labels.iter().any(|l| l.name == name) {
        return Err(ErrorKind::DuplicateLabel(name.to_string()));
    }
    Ok(())
}

/// `break label` and `continue label` need a matching enclosing label;
/// `continue` needs it to label a loop.
pub fn check_jump_label(labels: &[Label], name: &str, is_continue: bool) -> Result<(), ErrorKind> {
    match labels.iter().rev().find(|l| l.name == name) {
        None => Err(ErrorKind::UndefinedLabel(name.to_string())),
        Some(label) if is_continue && label.kind != LabelKind::Loop => {
            Err(ErrorKind::IllegalContinueLabel(name.to_string()))
        }
        Some(_) => Ok(()),
    }
}

/// Unlabelled `break` needs a loop or switch, unlabelled `continue` a loop.
pub fn check_unlabelled_jump(ctx: Context, is_continue: bool) -> Result<(), ErrorKind> {
    if is_continue {
        if !ctx.has(Context::ITERATION) {
            return Err(ErrorKind::IllegalContinue);
        }
    } else if !ctx.intersects(Context::ITERATION | Context::SWITCH) {
        return Err(ErrorKind::IllegalBreak);
    }
    Ok(())
}

/// Records an export name, rejecting duplicates.
pub fn check_export_name(exported: &mut FxHashSet<String>, name: &str) -> Result<(), ErrorKind> {
    if !exported.insert(name.to_string()) {
        return Err(ErrorKind::DuplicateExport(name.to_string()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{Identifier, Literal, LiteralValue, PrivateIdentifier, RestElement, Span};

    fn ident(name: &str) -> Identifier {
        Identifier {
            span: Span::default(),
            name: name.into(),
        }
    }

    fn key(name: &str) -> PropertyKey {
        PropertyKey::Identifier(ident(name))
    }

    #[test]
    fn reserved_words() {
        let sloppy = Context::default();
        let strict = Context::STRICT;
        assert_eq!(check_identifier("class", sloppy), Err(ErrorKind::UnexpectedReserved));
        assert_eq!(check_identifier("let", sloppy), Ok(()));
        assert_eq!(check_identifier("let", strict), Err(ErrorKind::UnexpectedStrictReserved));
        assert_eq!(check_identifier("yield", strict), Err(ErrorKind::UnexpectedStrictReserved));
        assert_eq!(check_identifier("yield", Context::YIELD), Err(ErrorKind::UnexpectedReserved));
        assert_eq!(check_identifier("await", sloppy), Ok(()));
        assert_eq!(check_identifier("await", Context::MODULE), Err(ErrorKind::UnexpectedReserved));
    }

    #[test]
    fn eval_and_arguments() {
        assert_eq!(check_binding_identifier("eval", Context::default()), Ok(()));
        assert_eq!(check_binding_identifier("eval", Context::STRICT), Err(ErrorKind::StrictEvalArguments));
        assert_eq!(check_identifier("eval", Context::STRICT), Ok(()));
        let field = Context::STRICT.field_initializer();
        assert_eq!(check_identifier("arguments", field), Err(ErrorKind::ArgumentsInClassInit));
    }

    #[test]
    fn parameter_duplicates() {
        assert!(allows_duplicate_parameters(false, true, false));
        assert!(!allows_duplicate_parameters(true, true, false));
        assert!(!allows_duplicate_parameters(false, false, false));
        assert!(!allows_duplicate_parameters(false, true, true));
        assert_eq!(first_duplicate(["a", "b", "a"]), Some("a"));
        assert_eq!(first_duplicate(["a", "b"]), None);
    }

    #[test]
    fn accessor_arity() {
        let x = Pattern::Identifier(ident("x"));
        let rest = Pattern::Rest(RestElement {
            span: Span::default(),
            argument: Box::new(Pattern::Identifier(ident("r"))),
        });
        assert_eq!(check_getter_params(&[]), Ok(()));
        assert_eq!(check_getter_params(std::slice::from_ref(&x)), Err(ErrorKind::GetterArity));
        assert_eq!(check_setter_params(std::slice::from_ref(&x)), Ok(()));
        assert_eq!(check_setter_params(&[]), Err(ErrorKind::SetterArity));
        assert_eq!(check_setter_params(&[rest]), Err(ErrorKind::SetterRest));
    }

    #[test]
    fn class_method_names() {
        assert_eq!(
            check_class_method(&key("constructor"), false, MethodKind::Get, false, false),
            Err(ErrorKind::SpecialConstructor("an accessor"))
        );
        assert_eq!(
            check_class_method(&key("prototype"), true, MethodKind::Get, false, false),
            Err(ErrorKind::StaticPrototype)
        );
        assert_eq!(check_class_method(&key("constructor"), true, MethodKind::Method, true, true), Ok(()));
        assert_eq!(check_class_method(&key("prototype"), false, MethodKind::Method, false, false), Ok(()));
        let string_key = PropertyKey::Literal(Literal {
            span: Span::default(),
            value: LiteralValue::String("constructor".into()),
            raw: None,
            regex: None,
            bigint: None,
        });
        assert_eq!(
            check_class_method(&string_key, false, MethodKind::Method, false, true),
            Err(ErrorKind::SpecialConstructor("a generator"))
        );
    }

    #[test]
    fn class_field_names() {
        assert_eq!(check_class_field(&key("constructor"), false), Err(ErrorKind::ConstructorField));
        assert_eq!(check_class_field(&key("prototype"), true), Err(ErrorKind::StaticPrototype));
        let private = PropertyKey::PrivateIdentifier(PrivateIdentifier {
            span: Span::default(),
            name: "constructor".into(),
        });
        assert_eq!(check_class_field(&private, false), Err(ErrorKind::PrivateConstructor));
        assert_eq!(check_class_field(&key("x"), true), Ok(()));
    }

    #[test]
    fn labels() {
        let labels = vec![
            Label {
                name: "outer".into(),
                kind: LabelKind::Loop,
            },
            Label {
                name: "block".into(),
                kind: LabelKind::Other,
            },
        ];
        assert_eq!(check_new_label(&labels, "outer"), Err(ErrorKind::DuplicateLabel("outer".into())));
        assert_eq!(check_jump_label(&labels, "outer", true), Ok(()));
        assert_eq!(check_jump_label(&labels, "block", false), Ok(()));
        assert_eq!(
            check_jump_label(&labels, "block", true),
            Err(ErrorKind::IllegalContinueLabel("block".into()))
        );
        assert_eq!(check_jump_label(&labels, "none", false), Err(ErrorKind::UndefinedLabel("none".into())));
        assert_eq!(check_unlabelled_jump(Context::SWITCH, false), Ok(()));
        assert_eq!(check_unlabelled_jump(Context::SWITCH, true), Err(ErrorKind::IllegalContinue));
    }

    #[test]
    fn directives_and_targets() {
        assert!(is_use_strict_directive("'use strict'"));
        assert!(!is_use_strict_directive(r"'use\x20strict'"));
        let id = Expression::Identifier(ident("arguments"));
        assert!(is_simple_assignment_target(&id, false));
        assert!(!is_simple_assignment_target(&id, true));
    }

    #[test]
    fn export_names() {
        let mut exported = FxHashSet::default();
        assert_eq!(check_export_name(&mut exported, "a"), Ok(()));
        assert_eq!(check_export_name(&mut exported, "a"), Err(ErrorKind::DuplicateExport("a".into())));
    }
}
