//! Binding name tables, one per scope, used to detect redeclarations.

use bitflags::bitflags;
use rustc_hash::FxHashSet;

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct ScopeFlags: u8 {
        const TOP = 1 << 0;
        const FUNCTION = 1 << 1;
        const ARROW = 1 << 2;
        const SIMPLE_CATCH = 1 << 3;
        const STATIC_BLOCK = 1 << 4;
        /// Scopes that `var` declarations hoist to.
        const VAR = Self::TOP.bits() | Self::FUNCTION.bits() | Self::STATIC_BLOCK.bits();
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BindingKind {
    Var,
    Lexical,
    /// Sloppy-mode function declaration; redeclarable alongside `var`.
    Function,
    /// The single identifier of `catch (e)`.
    SimpleCatch,
}

#[derive(Debug)]
struct Scope {
    flags: ScopeFlags,
    var: FxHashSet<String>,
    lexical: FxHashSet<String>,
    functions: FxHashSet<String>,
    catch_param: Option<String>,
}

impl Scope {
    fn new(flags: ScopeFlags) -> Self {
        Self {
            flags,
            var: FxHashSet::default(),
            lexical: FxHashSet::default(),
            functions: FxHashSet::default(),
            catch_param: None,
        }
    }
}

#[derive(Debug)]
pub struct ScopeStack {
    scopes: Vec<Scope>,
    module: bool,
    /// `catch (e) { var e }` stays legal (on unless web compat is disabled).
    catch_var_redeclaration: bool,
}

impl ScopeStack {
    pub fn new(module: bool, catch_var_redeclaration: bool) -> Self {
        Self {
            scopes: vec![Scope::new(ScopeFlags::TOP)],
            module,
            catch_var_redeclaration,
        }
    }

    pub fn enter(&mut self, flags: ScopeFlags) {
        self.scopes.push(Scope::new(flags));
    }

    pub fn exit(&mut self) {
        if self.scopes.len() > 1 {
            self.scopes.pop();
        }
    }

    pub fn depth(&self) -> usize {
        self.scopes.len()
    }

    fn treats_functions_as_var(&self, scope: &Scope) -> bool {
        scope.flags.contains(ScopeFlags::FUNCTION)
            || scope.flags.contains(ScopeFlags::STATIC_BLOCK)
            || (!self.module && scope.flags.contains(ScopeFlags::TOP))
    }

    /// True when function declarations directly in the current scope hoist
    /// like `var` (function bodies and script top level).
    pub fn current_treats_functions_as_var(&self) -> bool {
        self.scopes
            .last()
            .is_some_and(|scope| self.treats_functions_as_var(scope))
    }

    /// Records `name` in the current scope. Returns false when it clashes
    /// with an existing declaration.
    pub fn declare(&mut self, name: &str, kind: BindingKind) -> bool {
        let catch_var_redeclaration = self.catch_var_redeclaration;
        match kind {
            BindingKind::Lexical => {
                let Some(scope) = self.scopes.last_mut() else {
                    return true;
                };
                let redeclared = scope.lexical.contains(name)
                    || scope.functions.contains(name)
                    || scope.var.contains(name);
                scope.lexical.insert(name.to_string());
                !redeclared
            }
            BindingKind::SimpleCatch => {
                if let Some(scope) = self.scopes.last_mut() {
                    scope.lexical.insert(name.to_string());
                    scope.catch_param = Some(name.to_string());
                }
                true
            }
            BindingKind::Function => {
                let Some(scope) = self.scopes.last() else {
                    return true;
                };
                let redeclared = if self.treats_functions_as_var(scope) {
                    scope.lexical.contains(name)
                } else {
                    scope.lexical.contains(name) || scope.var.contains(name)
                };
                if let Some(scope) = self.scopes.last_mut() {
                    scope.functions.insert(name.to_string());
                }
                !redeclared
            }
            BindingKind::Var => {
                for i in (0..self.scopes.len()).rev() {
                    let scope = &self.scopes[i];
                    let catch_exemption = catch_var_redeclaration
                        && scope.flags.contains(ScopeFlags::SIMPLE_CATCH)
                        && scope.catch_param.as_deref() == Some(name);
                    let clashes = (scope.lexical.contains(name) && !catch_exemption)
                        || (!self.treats_functions_as_var(scope) && scope.functions.contains(name));
                    if clashes {
                        return false;
                    }
                    let scope = &mut self.scopes[i];
                    scope.var.insert(name.to_string());
                    if scope.flags.intersects(ScopeFlags::VAR) {
                        break;
                    }
                }
                true
            }
        }
    }

    /// Whether `name` is bound at the top level (for `export { name }`).
    pub fn is_declared_at_top(&self, name: &str) -> bool {
        self.scopes.first().is_some_and(|top| {
            top.var.contains(name) || top.lexical.contains(name) || top.functions.contains(name)
        })
    }

    /// Whether the current scope is the top level of the program.
    pub fn at_top(&self) -> bool {
        self.scopes.len() == 1
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn var_redeclaration_is_fine() {
        let mut scopes = ScopeStack::new(false, true);
        assert!(scopes.declare("x", BindingKind::Var));
        assert!(scopes.declare("x", BindingKind::Var));
    }

    #[test]
    fn lexical_clashes() {
        let mut scopes = ScopeStack::new(false, true);
        assert!(scopes.declare("x", BindingKind::Lexical));
        assert!(!scopes.declare("x", BindingKind::Lexical));
        assert!(!scopes.declare("x", BindingKind::Var));
    }

    #[test]
    fn var_hoists_through_blocks() {
        let mut scopes = ScopeStack::new(false, true);
        assert!(scopes.declare("x", BindingKind::Lexical));
        scopes.enter(ScopeFlags::empty());
        assert!(!scopes.declare("x", BindingKind::Var));
        scopes.exit();

        let mut scopes = ScopeStack::new(false, true);
        scopes.enter(ScopeFlags::empty());
        assert!(scopes.declare("y", BindingKind::Var));
        scopes.exit();
        assert!(!scopes.declare("y", BindingKind::Lexical));
    }

    #[test]
    fn functions_stop_at_function_scope() {
        let mut scopes = ScopeStack::new(false, true);
        assert!(scopes.declare("x", BindingKind::Lexical));
        scopes.enter(ScopeFlags::FUNCTION);
        assert!(scopes.declare("x", BindingKind::Var));
        scopes.exit();
    }

    #[test]
    fn sloppy_functions_at_script_top_are_var_like() {
        let mut scopes = ScopeStack::new(false, true);
        assert!(scopes.declare("f", BindingKind::Function));
        assert!(scopes.declare("f", BindingKind::Var));
        assert!(scopes.declare("f", BindingKind::Function));

        let mut module = ScopeStack::new(true, true);
        assert!(module.declare("f", BindingKind::Function));
        assert!(!module.declare("f", BindingKind::Var));
    }

    #[test]
    fn simple_catch_parameter() {
        let mut scopes = ScopeStack::new(false, true);
        scopes.enter(ScopeFlags::SIMPLE_CATCH);
        scopes.declare("e", BindingKind::SimpleCatch);
        assert!(scopes.declare("e", BindingKind::Var));
        assert!(!scopes.declare("e", BindingKind::Lexical));

        let mut strict_compat = ScopeStack::new(false, false);
        strict_compat.enter(ScopeFlags::SIMPLE_CATCH);
        strict_compat.declare("e", BindingKind::SimpleCatch);
        assert!(!strict_compat.declare("e", BindingKind::Var));
    }

    #[test]
    fn top_level_lookup() {
        let mut scopes = ScopeStack::new(true, true);
        scopes.declare("a", BindingKind::Lexical);
        scopes.enter(ScopeFlags::FUNCTION);
        scopes.declare("b", BindingKind::Var);
        assert!(!scopes.at_top());
        scopes.exit();
        assert!(scopes.is_declared_at_top("a"));
        assert!(!scopes.is_declared_at_top("b"));
    }
}
