//! Early validation of regular expression literals.
//!
//! The pattern is walked once, char by char, checking its structure:
//! balanced groups and classes, quantifier placement and bounds, group
//! names and named references, class ranges, and the stricter escape
//! rules of `u`/`v` mode. Matching semantics are left to whoever compiles
//! the pattern later.

use crate::error::ErrorKind;

const FLAGS: &str = "dgimsuvy";

const GENERAL_CATEGORIES: &[&str] = &[
    "C", "Other", "Cc", "Control", "cntrl", "Cf", "Format", "Cn", "Unassigned", "Co", "Private_Use",
    "Cs", "Surrogate", "L", "Letter", "LC", "Cased_Letter", "Ll", "Lowercase_Letter", "Lm",
    "Modifier_Letter", "Lo", "Other_Letter", "Lt", "Titlecase_Letter", "Lu", "Uppercase_Letter", "M",
    "Mark", "Combining_Mark", "Mc", "Spacing_Mark", "Me", "Enclosing_Mark", "Mn", "Nonspacing_Mark",
    "N", "Number", "Nd", "Decimal_Number", "digit", "Nl", "Letter_Number", "No", "Other_Number", "P",
    "Punctuation", "punct", "Pc", "Connector_Punctuation", "Pd", "Dash_Punctuation", "Pe",
    "Close_Punctuation", "Pf", "Final_Punctuation", "Pi", "Initial_Punctuation", "Po",
    "Other_Punctuation", "Ps", "Open_Punctuation", "S", "Symbol", "Sc", "Currency_Symbol", "Sk",
    "Modifier_Symbol", "Sm", "Math_Symbol", "So", "Other_Symbol", "Z", "Separator", "Zl",
    "Line_Separator", "Zp", "Paragraph_Separator", "Zs", "Space_Separator",
];

const BINARY_PROPERTIES: &[&str] = &[
    "ASCII", "ASCII_Hex_Digit", "AHex", "Alphabetic", "Alpha", "Any", "Assigned", "Bidi_Control",
    "Bidi_C", "Bidi_Mirrored", "Bidi_M", "Case_Ignorable", "CI", "Cased", "Changes_When_Casefolded",
    "CWCF", "Changes_When_Casemapped", "CWCM", "Changes_When_Lowercased", "CWL",
    "Changes_When_NFKC_Casefolded", "CWKCF", "Changes_When_Titlecased", "CWT",
    "Changes_When_Uppercased", "CWU", "Dash", "Default_Ignorable_Code_Point", "DI", "Deprecated",
    "Dep", "Diacritic", "Dia", "Emoji", "Emoji_Component", "EComp", "Emoji_Modifier", "EMod",
    "Emoji_Modifier_Base", "EBase", "Emoji_Presentation", "EPres", "Extended_Pictographic",
    "ExtPict", "Extender", "Ext", "Grapheme_Base", "Gr_Base", "Grapheme_Extend", "Gr_Ext",
    "Hex_Digit", "Hex", "IDS_Binary_Operator", "IDSB", "IDS_Trinary_Operator", "IDST", "ID_Continue",
    "IDC", "ID_Start", "IDS", "Ideographic", "Ideo", "Join_Control", "Join_C",
    "Logical_Order_Exception", "LOE", "Lowercase", "Lower", "Math", "Noncharacter_Code_Point",
    "NChar", "Pattern_Syntax", "Pat_Syn", "Pattern_White_Space", "Pat_WS", "Quotation_Mark",
    "QMark", "Radical", "Regional_Indicator", "RI", "Sentence_Terminal", "STerm", "Soft_Dotted", "SD",
    "Terminal_Punctuation", "Term", "Unified_Ideograph", "UIdeo", "Uppercase", "Upper",
    "Variation_Selector", "VS", "White_Space", "space", "XID_Continue", "XIDC", "XID_Start", "XIDS",
];

/// Properties of strings, only valid under the `v` flag.
const STRING_PROPERTIES: &[&str] = &[
    "Basic_Emoji", "Emoji_Keycap_Sequence", "RGI_Emoji_Modifier_Sequence", "RGI_Emoji_Flag_Sequence",
    "RGI_Emoji_Tag_Sequence", "RGI_Emoji_ZWJ_Sequence", "RGI_Emoji",
];

const SCRIPTS: &[&str] = &[
    "Adlam", "Adlm", "Ahom", "Anatolian_Hieroglyphs", "Hluw", "Arabic", "Arab", "Armenian", "Armn",
    "Avestan", "Avst", "Balinese", "Bali", "Bamum", "Bamu", "Bassa_Vah", "Bass", "Batak", "Batk",
    "Bengali", "Beng", "Bhaiksuki", "Bhks", "Bopomofo", "Bopo", "Brahmi", "Brah", "Braille", "Brai",
    "Buginese", "Bugi", "Buhid", "Buhd", "Canadian_Aboriginal", "Cans", "Carian", "Cari",
    "Caucasian_Albanian", "Aghb", "Chakma", "Cakm", "Cham", "Cherokee", "Cher", "Chorasmian", "Chrs",
    "Common", "Zyyy", "Coptic", "Copt", "Qaac", "Cuneiform", "Xsux", "Cypriot", "Cprt",
    "Cypro_Minoan", "Cpmn", "Cyrillic", "Cyrl", "Deseret", "Dsrt", "Devanagari", "Deva",
    "Dives_Akuru", "Diak", "Dogra", "Dogr", "Duployan", "Dupl", "Egyptian_Hieroglyphs", "Egyp",
    "Elbasan", "Elba", "Elymaic", "Elym", "Ethiopic", "Ethi", "Garay", "Gara", "Georgian", "Geor",
    "Glagolitic", "Glag", "Gothic", "Goth", "Grantha", "Gran", "Greek", "Grek", "Gujarati", "Gujr",
    "Gunjala_Gondi", "Gong", "Gurmukhi", "Guru", "Gurung_Khema", "Gukh", "Han", "Hani", "Hangul",
    "Hang", "Hanifi_Rohingya", "Rohg", "Hanunoo", "Hano", "Hatran", "Hatr", "Hebrew", "Hebr",
    "Hiragana", "Hira", "Imperial_Aramaic", "Armi", "Inherited", "Zinh", "Qaai",
    "Inscriptional_Pahlavi", "Phli", "Inscriptional_Parthian", "Prti", "Javanese", "Java", "Kaithi",
    "Kthi", "Kannada", "Knda", "Katakana", "Kana", "Kawi", "Kayah_Li", "Kali", "Kharoshthi", "Khar",
    "Khitan_Small_Script", "Kits", "Khmer", "Khmr", "Khojki", "Khoj", "Khudawadi", "Sind",
    "Kirat_Rai", "Krai", "Lao", "Laoo", "Latin", "Latn", "Lepcha", "Lepc", "Limbu", "Limb",
    "Linear_A", "Lina", "Linear_B", "Linb", "Lisu", "Lycian", "Lyci", "Lydian", "Lydi", "Mahajani",
    "Mahj", "Makasar", "Maka", "Malayalam", "Mlym", "Mandaic", "Mand", "Manichaean", "Mani",
    "Marchen", "Marc", "Masaram_Gondi", "Gonm", "Medefaidrin", "Medf", "Meetei_Mayek", "Mtei",
    "Mende_Kikakui", "Mend", "Meroitic_Cursive", "Merc", "Meroitic_Hieroglyphs", "Mero", "Miao",
    "Plrd", "Modi", "Mongolian", "Mong", "Mro", "Mroo", "Multani", "Mult", "Myanmar", "Mymr",
    "Nabataean", "Nbat", "Nag_Mundari", "Nagm", "Nandinagari", "Nand", "New_Tai_Lue", "Talu", "Newa",
    "Nko", "Nkoo", "Nushu", "Nshu", "Nyiakeng_Puachue_Hmong", "Hmnp", "Ogham", "Ogam", "Ol_Chiki",
    "Olck", "Ol_Onal", "Onao", "Old_Hungarian", "Hung", "Old_Italic", "Ital", "Old_North_Arabian",
    "Narb", "Old_Permic", "Perm", "Old_Persian", "Xpeo", "Old_Sogdian", "Sogo", "Old_South_Arabian",
    "Sarb", "Old_Turkic", "Orkh", "Old_Uyghur", "Ougr", "Oriya", "Orya", "Osage", "Osge", "Osmanya",
    "Osma", "Pahawh_Hmong", "Hmng", "Palmyrene", "Palm", "Pau_Cin_Hau", "Pauc", "Phags_Pa", "Phag",
    "Phoenician", "Phnx", "Psalter_Pahlavi", "Phlp", "Rejang", "Rjng", "Runic", "Runr", "Samaritan",
    "Samr", "Saurashtra", "Saur", "Sharada", "Shrd", "Shavian", "Shaw", "Siddham", "Sidd",
    "SignWriting", "Sgnw", "Sinhala", "Sinh", "Sogdian", "Sogd", "Sora_Sompeng", "Sora", "Soyombo",
    "Soyo", "Sundanese", "Sund", "Sunuwar", "Sunu", "Syloti_Nagri", "Sylo", "Syriac", "Syrc",
    "Tagalog", "Tglg", "Tagbanwa", "Tagb", "Tai_Le", "Tale", "Tai_Tham", "Lana", "Tai_Viet", "Tavt",
    "Takri", "Takr", "Tamil", "Taml", "Tangsa", "Tnsa", "Tangut", "Tang", "Telugu", "Telu", "Thaana",
    "Thaa", "Thai", "Tibetan", "Tibt", "Tifinagh", "Tfng", "Tirhuta", "Tirh", "Todhri", "Todr",
    "Toto", "Tulu_Tigalari", "Tutg", "Ugaritic", "Ugar", "Vai", "Vaii", "Vithkuqi", "Vith", "Wancho",
    "Wcho", "Warang_Citi", "Wara", "Yezidi", "Yezi", "Yi", "Yiii", "Zanabazar_Square", "Zanb",
    "Unknown", "Zzzz",
];

pub fn validate_flags(flags: &str) -> Result<(), ErrorKind> {
    let mut seen = String::new();
    for ch in flags.chars() {
        if !FLAGS.contains(ch) {
            return Err(ErrorKind::InvalidRegExpFlag(ch));
        }
        if seen.contains(ch) {
            return Err(ErrorKind::DuplicateRegExpFlag(ch));
        }
        seen.push(ch);
    }
    if seen.contains('u') && seen.contains('v') {
        return Err(ErrorKind::InvalidRegExpFlag('v'));
    }
    Ok(())
}

/// Checks `pattern` under `flags` (already validated). Returns a short
/// reason on failure.
pub fn validate_pattern(pattern: &str, flags: &str) -> Result<(), &'static str> {
    let chars: Vec<char> = pattern.chars().collect();
    let mut validator = Validator {
        has_named_groups: has_named_groups(&chars),
        chars,
        pos: 0,
        unicode: flags.contains('u') || flags.contains('v'),
        sets: flags.contains('v'),
        group_count: 0,
        max_backreference: 0,
        names: Vec::new(),
        references: Vec::new(),
        path: Vec::new(),
        next_disjunction: 0,
    };
    validator.pattern()
}

/// Where a named group sits: the alternative taken at each enclosing
/// disjunction, as (disjunction id, alternative index).
type GroupPath = Vec<(usize, usize)>;

struct Validator {
    chars: Vec<char>,
    pos: usize,
    unicode: bool,
    sets: bool,
    has_named_groups: bool,
    group_count: u32,
    max_backreference: u32,
    names: Vec<(String, GroupPath)>,
    references: Vec<String>,
    path: GroupPath,
    next_disjunction: usize,
}

impl Validator {
    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn peek_at(&self, n: usize) -> Option<char> {
        self.chars.get(self.pos + n).copied()
    }

    fn eat(&mut self, ch: char) -> bool {
        if self.peek() == Some(ch) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn eat_str(&mut self, s: &str) -> bool {
        let matches = s
            .chars()
            .enumerate()
            .all(|(i, ch)| self.peek_at(i) == Some(ch));
        if matches {
            self.pos += s.chars().count();
        }
        matches
    }

    fn pattern(&mut self) -> Result<(), &'static str> {
        self.disjunction()?;
        if self.pos < self.chars.len() {
            return Err(if self.peek() == Some(')') {
                "Unmatched ')'"
            } else {
                "Lone quantifier brackets"
            });
        }
        if self.unicode && self.max_backreference > self.group_count {
            return Err("Invalid escape");
        }
        for name in &self.references {
            if !self.names.iter().any(|(n, _)| n == name) {
                return Err("Invalid named capture referenced");
            }
        }
        Ok(())
    }

    fn disjunction(&mut self) -> Result<(), &'static str> {
        let id = self.next_disjunction;
        self.next_disjunction += 1;
        let mut alternative = 0;
        self.path.push((id, alternative));
        self.alternative()?;
        while self.eat('|') {
            alternative += 1;
            if let Some(last) = self.path.last_mut() {
                *last = (id, alternative);
            }
            self.alternative()?;
        }
        self.path.pop();
        Ok(())
    }

    fn alternative(&mut self) -> Result<(), &'static str> {
        while let Some(ch) = self.peek() {
            if ch == '|' || ch == ')' {
                break;
            }
            self.term()?;
        }
        Ok(())
    }

    fn term(&mut self) -> Result<(), &'static str> {
        // Assertions
        if self.eat('^') || self.eat('$') || self.eat_str("\\b") || self.eat_str("\\B") {
            return self.reject_quantifier();
        }
        if self.eat_str("(?<=") || self.eat_str("(?<!") {
            self.group_body()?;
            return self.reject_quantifier();
        }
        if self.eat_str("(?=") || self.eat_str("(?!") {
            self.group_body()?;
            if self.unicode {
                return self.reject_quantifier();
            }
            self.quantifier()?;
            return Ok(());
        }

        self.atom()?;
        self.quantifier()?;
        Ok(())
    }

    fn reject_quantifier(&mut self) -> Result<(), &'static str> {
        let save = self.pos;
        if self.quantifier()? {
            self.pos = save;
            return Err("Nothing to repeat");
        }
        Ok(())
    }

    /// Parses an optional quantifier. Returns whether one was present.
    fn quantifier(&mut self) -> Result<bool, &'static str> {
        match self.peek() {
            Some('*' | '+' | '?') => {
                self.pos += 1;
            }
            Some('{') => {
                let save = self.pos;
                match self.braced_quantifier()? {
                    true => {}
                    false => {
                        self.pos = save;
                        if self.unicode {
                            return Err("Incomplete quantifier");
                        }
                        return Ok(false);
                    }
                }
            }
            _ => return Ok(false),
        }
        self.eat('?');
        Ok(true)
    }

    fn braced_quantifier(&mut self) -> Result<bool, &'static str> {
        self.pos += 1;
        let Some(min) = self.decimal() else {
            return Ok(false);
        };
        let mut max = Some(min);
        if self.eat(',') {
            max = self.decimal();
        }
        if !self.eat('}') {
            return Ok(false);
        }
        if let Some(max) = max
            && max < min
        {
            return Err("numbers out of order in {} quantifier");
        }
        Ok(true)
    }

    fn decimal(&mut self) -> Option<u64> {
        let start = self.pos;
        let mut value: u64 = 0;
        while let Some(d) = self.peek().and_then(|c| c.to_digit(10)) {
            value = value.saturating_mul(10).saturating_add(d as u64);
            self.pos += 1;
        }
        (self.pos > start).then_some(value)
    }

    fn atom(&mut self) -> Result<(), &'static str> {
        let Some(ch) = self.peek() else {
            return Ok(());
        };
        match ch {
            '.' => {
                self.pos += 1;
                Ok(())
            }
            '(' => {
                self.pos += 1;
                if self.eat('?') {
                    if self.eat(':') {
                        return self.group_body();
                    }
                    if self.eat('<') {
                        let name = self.group_name()?;
                        self.declare_name(name)?;
                        self.group_count += 1;
                        return self.group_body();
                    }
                    return Err("Invalid group");
                }
                self.group_count += 1;
                self.group_body()
            }
            '[' => {
                self.pos += 1;
                if self.sets {
                    self.class_set()
                } else {
                    self.class()
                }
            }
            '\\' => {
                self.pos += 1;
                self.atom_escape()
            }
            '*' | '+' | '?' => Err("Nothing to repeat"),
            '{' => {
                if self.unicode {
                    return Err("Lone quantifier brackets");
                }
                let save = self.pos;
                if self.braced_quantifier()? {
                    return Err("Nothing to repeat");
                }
                self.pos = save + 1;
                Ok(())
            }
            ']' | '}' if self.unicode => Err("Lone quantifier brackets"),
            _ => {
                self.pos += 1;
                Ok(())
            }
        }
    }

    fn group_body(&mut self) -> Result<(), &'static str> {
        self.disjunction()?;
        if !self.eat(')') {
            return Err("Unterminated group");
        }
        Ok(())
    }

    /// Reads `name>` after `(?<` or `\k<`.
    fn group_name(&mut self) -> Result<String, &'static str> {
        let mut name = String::new();
        loop {
            let ch = match self.peek() {
                Some('>') if !name.is_empty() => {
                    self.pos += 1;
                    return Ok(name);
                }
                Some('\\') => {
                    self.pos += 1;
                    if !self.eat('u') {
                        return Err("Invalid capture group name");
                    }
                    self.unicode_escape_value(true)
                        .and_then(char::from_u32)
                        .ok_or("Invalid capture group name")?
                }
                Some(ch) => {
                    self.pos += 1;
                    ch
                }
                None => return Err("Invalid capture group name"),
            };
            let valid = if name.is_empty() {
                is_name_start(ch)
            } else {
                is_name_continue(ch)
            };
            if !valid {
                return Err("Invalid capture group name");
            }
            name.push(ch);
        }
    }

    /// Names may repeat only in different alternatives of some shared
    /// disjunction.
    fn declare_name(&mut self, name: String) -> Result<(), &'static str> {
        for (existing, path) in &self.names {
            if *existing != name {
                continue;
            }
            let exclusive = path.iter().any(|&(id, alt)| {
                self.path
                    .iter()
                    .any(|&(other_id, other_alt)| other_id == id && other_alt != alt)
            });
            if !exclusive {
                return Err("Duplicate capture group name");
            }
        }
        self.names.push((name, self.path.clone()));
        Ok(())
    }

    fn atom_escape(&mut self) -> Result<(), &'static str> {
        let Some(ch) = self.peek() else {
            return Err("\\ at end of pattern");
        };
        if ch == 'k' {
            self.pos += 1;
            if self.unicode || self.has_named_groups {
                if !self.eat('<') {
                    return Err("Invalid named reference");
                }
                let name = self.group_name()?;
                self.references.push(name);
            }
            return Ok(());
        }
        if ('1'..='9').contains(&ch) {
            let value = self.decimal().unwrap_or(0);
            self.max_backreference = self.max_backreference.max(value.min(u32::MAX as u64) as u32);
            return Ok(());
        }
        self.character_escape(false).map(|_| ())
    }

    /// Parses an escape shared by atoms and classes. Returns the escaped
    /// code point, or None for a character class escape such as `\d`.
    fn character_escape(&mut self, in_class: bool) -> Result<Option<u32>, &'static str> {
        let Some(ch) = self.peek() else {
            return Err("\\ at end of pattern");
        };
        self.pos += 1;
        let value = match ch {
            'd' | 'D' | 's' | 'S' | 'w' | 'W' => return Ok(None),
            'p' | 'P' if self.unicode => {
                self.property_escape(ch == 'P')?;
                return Ok(None);
            }
            'f' => 0x0C,
            'n' => 0x0A,
            'r' => 0x0D,
            't' => 0x09,
            'v' => 0x0B,
            'b' if in_class => 0x08,
            '-' if in_class && self.unicode => '-' as u32,
            'c' => match self.peek() {
                Some(letter) if letter.is_ascii_alphabetic() => {
                    self.pos += 1;
                    letter as u32 % 32
                }
                Some(digit) if in_class && !self.unicode && (digit.is_ascii_digit() || digit == '_') => {
                    self.pos += 1;
                    digit as u32 % 32
                }
                _ if self.unicode => return Err("Invalid unicode escape"),
                _ => {
                    self.pos -= 1;
                    '\\' as u32
                }
            },
            '0' if !self.peek().is_some_and(|c| c.is_ascii_digit()) => 0,
            'x' => match (self.peek().and_then(hex), self.peek_at(1).and_then(hex)) {
                (Some(hi), Some(lo)) => {
                    self.pos += 2;
                    hi * 16 + lo
                }
                _ if self.unicode => return Err("Invalid escape"),
                _ => 'x' as u32,
            },
            'u' => match self.unicode_escape_value(self.unicode) {
                Some(cp) => cp,
                None if self.unicode => return Err("Invalid Unicode escape"),
                None => 'u' as u32,
            },
            c if c.is_ascii_digit() => {
                if self.unicode {
                    return Err("Invalid decimal escape");
                }
                let mut value = c as u32 - '0' as u32;
                for _ in 0..2 {
                    match self.peek().and_then(|c| c.to_digit(8)) {
                        Some(d) if value * 8 + d <= 0o377 => {
                            self.pos += 1;
                            value = value * 8 + d;
                        }
                        _ => break,
                    }
                }
                value
            }
            c if is_syntax_character(c) || c == '/' => c as u32,
            _ if self.unicode => return Err("Invalid escape"),
            'k' if self.has_named_groups => return Err("Invalid named reference"),
            c => c as u32,
        };
        Ok(Some(value))
    }

    /// Reads `XXXX`, a surrogate pair `XXXX\uXXXX` or (when `braced`) `{X...}`
    /// after `\u`. Leaves the position unchanged on failure.
    fn unicode_escape_value(&mut self, braced: bool) -> Option<u32> {
        let start = self.pos;
        if braced && self.eat('{') {
            let mut value: u32 = 0;
            let mut digits = 0;
            while let Some(d) = self.peek().and_then(hex) {
                value = value.saturating_mul(16).saturating_add(d);
                digits += 1;
                self.pos += 1;
            }
            if digits > 0 && value <= 0x10FFFF && self.eat('}') {
                return Some(value);
            }
            self.pos = start;
            return None;
        }
        let lead = self.hex4()?;
        if braced && (0xD800..0xDC00).contains(&lead) && self.peek() == Some('\\') && self.peek_at(1) == Some('u') {
            let save = self.pos;
            self.pos += 2;
            match self.hex4() {
                Some(trail) if (0xDC00..0xE000).contains(&trail) => {
                    return Some(0x10000 + ((lead - 0xD800) << 10) + (trail - 0xDC00));
                }
                _ => self.pos = save,
            }
        }
        Some(lead)
    }

    fn hex4(&mut self) -> Option<u32> {
        let mut value = 0;
        for i in 0..4 {
            value = value * 16 + self.peek_at(i).and_then(hex)?;
        }
        self.pos += 4;
        Some(value)
    }

    /// `{Name}` or `{Name=Value}` after `\p` or `\P`.
    fn property_escape(&mut self, negated: bool) -> Result<(), &'static str> {
        if !self.eat('{') {
            return Err("Invalid property name");
        }
        let start = self.pos;
        while self.peek().is_some_and(|ch| ch.is_ascii_alphanumeric() || ch == '_' || ch == '=') {
            self.pos += 1;
        }
        let body: String = self.chars[start..self.pos].iter().collect();
        if !self.eat('}') {
            return Err("Invalid property name");
        }
        let known = match body.split_once('=') {
            Some((name, value)) => match name {
                "General_Category" | "gc" => GENERAL_CATEGORIES.contains(&value),
                "Script" | "sc" | "Script_Extensions" | "scx" => SCRIPTS.contains(&value),
                _ => false,
            },
            None if GENERAL_CATEGORIES.contains(&body.as_str()) => true,
            None if BINARY_PROPERTIES.contains(&body.as_str()) => true,
            None if STRING_PROPERTIES.contains(&body.as_str()) => {
                if !self.sets || negated {
                    return Err("Invalid property name");
                }
                true
            }
            None => false,
        };
        if !known {
            return Err("Invalid property name");
        }
        Ok(())
    }

    fn class(&mut self) -> Result<(), &'static str> {
        self.eat('^');
        loop {
            match self.peek() {
                None => return Err("Unterminated character class"),
                Some(']') => {
                    self.pos += 1;
                    return Ok(());
                }
                _ => {}
            }
            let from = self.class_atom()?;
            if self.peek() == Some('-') && self.peek_at(1).is_some_and(|c| c != ']') {
                self.pos += 1;
                let to = self.class_atom()?;
                match (from, to) {
                    (Some(a), Some(b)) if a > b => return Err("Range out of order in character class"),
                    (None, _) | (_, None) if self.unicode => return Err("Invalid character class"),
                    _ => {}
                }
            }
        }
    }

    fn class_atom(&mut self) -> Result<Option<u32>, &'static str> {
        match self.peek() {
            Some('\\') => {
                self.pos += 1;
                self.character_escape(true)
            }
            Some(ch) => {
                self.pos += 1;
                Ok(Some(ch as u32))
            }
            None => Err("Unterminated character class"),
        }
    }

    /// `v`-mode classes nest and support set operators. Only nesting and
    /// escapes are checked.
    fn class_set(&mut self) -> Result<(), &'static str> {
        let mut depth = 1;
        while depth > 0 {
            match self.peek() {
                None => return Err("Unterminated character class"),
                Some('[') => {
                    self.pos += 1;
                    depth += 1;
                }
                Some(']') => {
                    self.pos += 1;
                    depth -= 1;
                }
                Some('\\') => {
                    self.pos += 1;
                    if self.eat('q') {
                        if !self.eat('{') {
                            return Err("Invalid escape");
                        }
                        while !self.eat('}') {
                            if self.peek().is_none() {
                                return Err("Unterminated character class");
                            }
                            self.pos += 1;
                        }
                    } else if self.peek().is_some_and(|c| "&-!#%,:;<=>@`~".contains(c)) {
                        self.pos += 1;
                    } else {
                        self.character_escape(true)?;
                    }
                }
                Some(ch) => {
                    if "()[{}/|".contains(ch) && ch != '[' {
                        return Err("Invalid set operation in character class");
                    }
                    self.pos += 1;
                }
            }
        }
        Ok(())
    }
}

fn hex(ch: char) -> Option<u32> {
    ch.to_digit(16)
}

fn is_syntax_character(ch: char) -> bool {
    "^$\\.*+?()[]{}|".contains(ch)
}

fn is_name_start(ch: char) -> bool {
    ch == '$' || ch == '_' || ch.is_ascii_alphabetic() || (!ch.is_ascii() && unicode_ident::is_xid_start(ch))
}

fn is_name_continue(ch: char) -> bool {
    is_name_start(ch)
        || ch.is_ascii_digit()
        || ch == '\u{200C}'
        || ch == '\u{200D}'
        || (!ch.is_ascii() && unicode_ident::is_xid_continue(ch))
}

fn has_named_groups(chars: &[char]) -> bool {
    let mut in_class = false;
    let mut i = 0;
    while i < chars.len() {
        match chars[i] {
            '\\' => i += 1,
            '[' => in_class = true,
            ']' => in_class = false,
            '(' if !in_class
                && chars.get(i + 1) == Some(&'?')
                && chars.get(i + 2) == Some(&'<')
                && !matches!(chars.get(i + 3), Some('=' | '!')) =>
            {
                return true;
            }
            _ => {}
        }
        i += 1;
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ok(pattern: &str, flags: &str) {
        assert_eq!(validate_pattern(pattern, flags), Ok(()), "/{pattern}/{flags}");
    }

    fn err(pattern: &str, flags: &str) -> &'static str {
        validate_pattern(pattern, flags).unwrap_err()
    }

    #[test]
    fn flags() {
        assert_eq!(validate_flags("dgimsuy"), Ok(()));
        assert_eq!(validate_flags("gig"), Err(ErrorKind::DuplicateRegExpFlag('g')));
        assert_eq!(validate_flags("x"), Err(ErrorKind::InvalidRegExpFlag('x')));
        assert!(validate_flags("uv").is_err());
    }

    #[test]
    fn accepts_common_patterns() {
        ok("^[a-z]+\\d*$", "");
        ok("(?:a|b)+?", "g");
        ok("(?<year>\\d{4})-\\k<year>", "u");
        ok("(?<=\\$)\\d+(?!px)", "");
        ok("a{2,3}", "u");
        ok("\\p{Letter}", "u");
        ok("[\\w--\\d]", "v");
    }

    #[test]
    fn annex_b_leniency_without_unicode() {
        ok("a{", "");
        ok("]", "");
        ok("\\a", "");
        ok("(?=a)*", "");
        ok("\\1(a)", "");
        ok("[\\d-z]", "");
    }

    #[test]
    fn structural_errors() {
        assert_eq!(err("(", ""), "Unterminated group");
        assert_eq!(err("a)", ""), "Unmatched ')'");
        assert_eq!(err("*", ""), "Nothing to repeat");
        assert_eq!(err("a**", ""), "Nothing to repeat");
        assert_eq!(err("^*", ""), "Nothing to repeat");
        assert_eq!(err("(?<=a)+", ""), "Nothing to repeat");
        assert_eq!(err("a{3,1}", ""), "numbers out of order in {} quantifier");
        assert_eq!(err("[z-a]", ""), "Range out of order in character class");
        assert_eq!(err("[a", ""), "Unterminated character class");
        assert_eq!(err("(?x)", ""), "Invalid group");
    }

    #[test]
    fn property_names_are_checked() {
        ok("\\p{L}\\P{Lu}\\p{gc=Nd}\\p{Script=Greek}\\p{scx=Hira}\\p{ASCII_Hex_Digit}", "u");
        ok("\\p{RGI_Emoji}", "v");
        assert_eq!(err("\\p{Nope}", "u"), "Invalid property name");
        assert_eq!(err("\\p{=}", "u"), "Invalid property name");
        assert_eq!(err("\\p{Script=Nope}", "u"), "Invalid property name");
        assert_eq!(err("\\p{ASCII=Y}", "u"), "Invalid property name");
        assert_eq!(err("\\p{RGI_Emoji}", "u"), "Invalid property name");
        assert_eq!(err("\\P{RGI_Emoji}", "v"), "Invalid property name");
        ok("\\p{Nope}", "");
    }

    #[test]
    fn unicode_mode_is_strict() {
        assert_eq!(err("\\a", "u"), "Invalid escape");
        assert_eq!(err("a{", "u"), "Incomplete quantifier");
        assert_eq!(err("]", "u"), "Lone quantifier brackets");
        assert_eq!(err("\\2(a)", "u"), "Invalid escape");
        assert_eq!(err("\\u{110000}", "u"), "Invalid Unicode escape");
        assert_eq!(err("[\\d-z]", "u"), "Invalid character class");
    }

    #[test]
    fn group_names() {
        assert_eq!(err("(?<a>x)(?<a>y)", ""), "Duplicate capture group name");
        ok("(?<a>x)|(?<a>y)", "");
        assert_eq!(err("(?<a>x)\\k<b>", ""), "Invalid named capture referenced");
        assert_eq!(err("(?<1a>x)", ""), "Invalid capture group name");
        assert_eq!(err("(?<a>.)\\k", ""), "Invalid named reference");
        ok("\\k", "");
    }
}
