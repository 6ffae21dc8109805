use serde::Deserialize;

/// Parser options. Every field defaults to `false`; deserializes from the
/// camelCase options object hosts usually pass around.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Options {
    /// Parse with the module goal.
    pub module: bool,
    /// Attach `loc` to every node.
    pub loc: bool,
    /// Attach `range: [start, end]` to every node.
    pub ranges: bool,
    /// Attach the source text of literals as `raw`.
    pub raw: bool,
    /// Attach `directive` to directive prologue statements.
    pub directives: bool,
    /// Enable the opt-in Annex B extensions.
    pub web_compat: bool,
    /// Disable every Annex B allowance, including the default ones.
    pub disable_web_compat: bool,
    /// Start in strict mode.
    pub implied_strict: bool,
    /// Allow `return` at the top level of a script.
    pub global_return: bool,
    /// Allow `await` at the top level of a script.
    pub top_level_await: bool,
}

impl Options {
    /// Opt-in Annex B extensions (HTML-like comments, function declarations
    /// in `if` and labelled positions, duplicate block functions,
    /// initialized `for (var x = 1 in o)`).
    pub fn annex_b(&self) -> bool {
        self.web_compat && !self.disable_web_compat
    }

    /// Sloppy-mode legacy forms that stay on unless explicitly disabled:
    /// legacy octal literals and escapes.
    pub fn legacy_octal(&self) -> bool {
        !self.disable_web_compat
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserializes_camel_case_subset() {
        let options: Options =
            serde_json::from_str(r#"{"loc": true, "webCompat": true, "impliedStrict": true}"#)
                .unwrap();
        assert!(options.loc);
        assert!(options.web_compat);
        assert!(options.implied_strict);
        assert!(!options.module);
    }

    #[test]
    fn disable_overrides_enable() {
        let options = Options {
            web_compat: true,
            disable_web_compat: true,
            ..Options::default()
        };
        assert!(!options.annex_b());
        assert!(!options.legacy_octal());
        assert!(Options::default().legacy_octal());
    }
}
