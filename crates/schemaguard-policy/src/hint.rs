use std::fmt;

/// Matching rule of a hint expression.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HintKind {
    /// Plain value, compared ignoring case.
    Exact,
    /// `prefix:X`
    Prefix,
    /// `suffix:X`
    Suffix,
    /// `contain:X`
    Contain,
}

/// A parsed hint expression such as `prefix:FK_` or `not:suffix:_ID`.
///
/// Hints are parsed once when a statement is compiled and reused for every
/// entity the statement is evaluated against.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Hint {
    negated: bool,
    kind: HintKind,
    literal: String,
    raw: String,
}

impl Hint {
    /// Parse a hint expression. Every string is a valid hint; unknown
    /// prefixes are treated as part of an exact value.
    pub fn parse(raw: &str) -> Self {
        let raw = raw.trim();
        let (negated, body) = match strip_keyword(raw, "not:") {
            Some(rest) => (true, rest),
            None => (false, raw),
        };

        let (kind, literal) = if let Some(rest) = strip_keyword(body, "prefix:") {
            (HintKind::Prefix, rest)
        } else if let Some(rest) = strip_keyword(body, "suffix:") {
            (HintKind::Suffix, rest)
        } else if let Some(rest) = strip_keyword(body, "contain:") {
            (HintKind::Contain, rest)
        } else {
            (HintKind::Exact, body)
        };

        Self {
            negated,
            kind,
            literal: literal.to_string(),
            raw: raw.to_string(),
        }
    }

    pub fn kind(&self) -> HintKind {
        self.kind
    }

    pub fn literal(&self) -> &str {
        &self.literal
    }

    pub fn is_negated(&self) -> bool {
        self.negated
    }

    /// Test an actual attribute value against the hint.
    ///
    /// A missing or empty value never satisfies a positive hint, so it
    /// always satisfies a negated one.
    pub fn is_hit(&self, actual: Option<&str>) -> bool {
        let hit = match actual {
            Some(value) if !value.is_empty() => self.matches(value),
            _ => false,
        };
        hit != self.negated
    }

    fn matches(&self, value: &str) -> bool {
        let literal = self.literal.as_str();
        match self.kind {
            HintKind::Exact => value.eq_ignore_ascii_case(literal),
            HintKind::Prefix => value.starts_with(literal),
            HintKind::Suffix => value.ends_with(literal),
            HintKind::Contain => value.contains(literal),
        }
    }
}

impl fmt::Display for Hint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

/// Strip a keyword prefix, ignoring ASCII case.
pub(crate) fn strip_keyword<'a>(value: &'a str, keyword: &str) -> Option<&'a str> {
    let head = value.get(..keyword.len())?;
    if head.eq_ignore_ascii_case(keyword) {
        Some(&value[keyword.len()..])
    } else {
        None
    }
}
