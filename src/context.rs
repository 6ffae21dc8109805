//! Grammar context flags threaded through every production.

use bitflags::bitflags;

bitflags! {
    /// Syntactic and semantic context of the production being parsed. The
    /// parser holds one of these and swaps it around each nested production,
    /// restoring the outer value afterwards.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct Context: u32 {
        /// Strict mode code.
        const STRICT = 1 << 0;
        /// Module goal; `await` is reserved everywhere.
        const MODULE = 1 << 1;
        /// `return` is allowed.
        const RETURN = 1 << 2;
        /// [Yield]: inside a generator body.
        const YIELD = 1 << 3;
        /// [Await]: inside an async body, or top level of a module.
        const AWAIT = 1 << 4;
        /// [~In]: the `in` operator is not allowed (for-statement heads).
        const DISALLOW_IN = 1 << 5;
        /// Unlabelled `continue` and `break` are allowed.
        const ITERATION = 1 << 6;
        /// Unlabelled `break` is allowed.
        const SWITCH = 1 << 7;
        /// `super.x` / `super[x]` is allowed.
        const SUPER_PROPERTY = 1 << 8;
        /// `super(...)` is allowed.
        const SUPER_CALL = 1 << 9;
        /// `new.target` is allowed.
        const NEW_TARGET = 1 << 10;
        /// Class field initializer or static block: `arguments` is forbidden.
        const CLASS_FIELD_INIT = 1 << 11;
        /// Directly inside a class static block: `await` is reserved.
        const STATIC_BLOCK = 1 << 12;
        /// Parsing formal parameters: `yield`/`await` expressions are forbidden.
        const FORMAL_PARAMETERS = 1 << 13;
        /// Top level of the program (outside every function).
        const TOP_LEVEL = 1 << 14;
    }
}

impl Default for Context {
    fn default() -> Self {
        Self::TOP_LEVEL
    }
}

impl Context {
    #[inline]
    pub fn with(self, flag: Context) -> Self {
        self | flag
    }

    #[inline]
    pub fn without(self, flag: Context) -> Self {
        self - flag
    }

    #[inline]
    pub fn has(self, flag: Context) -> bool {
        self.contains(flag)
    }

    #[inline]
    pub fn with_if(self, include: bool, flag: Context) -> Self {
        if include { self | flag } else { self }
    }

    #[inline]
    pub fn is_strict(self) -> bool {
        self.contains(Self::STRICT)
    }

    #[inline]
    pub fn is_module(self) -> bool {
        self.contains(Self::MODULE)
    }

    /// Context of an ordinary function's parameters and body. Only the goal
    /// and strictness survive from the enclosing context.
    pub fn function_body(self, is_async: bool, is_generator: bool) -> Self {
        (self & (Self::STRICT | Self::MODULE))
            .with(Self::RETURN | Self::NEW_TARGET)
            .with_if(is_async, Self::AWAIT)
            .with_if(is_generator, Self::YIELD)
    }

    /// Context of a method body: a function body with a home object.
    pub fn method_body(self, is_async: bool, is_generator: bool, super_call: bool) -> Self {
        self.function_body(is_async, is_generator)
            .with(Self::SUPER_PROPERTY)
            .with_if(super_call, Self::SUPER_CALL)
    }

    /// Context of an arrow function body. Arrows see through to the
    /// enclosing `super`, `new.target` and `arguments` restrictions.
    pub fn arrow_body(self, is_async: bool) -> Self {
        (self
            & (Self::STRICT
                | Self::MODULE
                | Self::SUPER_PROPERTY
                | Self::SUPER_CALL
                | Self::NEW_TARGET
                | Self::CLASS_FIELD_INIT))
            .with(Self::RETURN)
            .with_if(is_async, Self::AWAIT)
    }

    /// Context of a class field initializer.
    pub fn field_initializer(self) -> Self {
        (self & (Self::STRICT | Self::MODULE))
            .with(Self::SUPER_PROPERTY | Self::NEW_TARGET | Self::CLASS_FIELD_INIT)
    }

    /// Context of a class static block.
    pub fn static_block(self) -> Self {
        self.field_initializer().with(Self::STATIC_BLOCK)
    }

    /// True when `await` cannot be an identifier here.
    pub fn await_is_reserved(self) -> bool {
        self.intersects(Self::MODULE | Self::AWAIT | Self::STATIC_BLOCK)
    }

    /// True when `yield` cannot be an identifier here.
    pub fn yield_is_reserved(self) -> bool {
        self.intersects(Self::STRICT | Self::YIELD)
    }
}
