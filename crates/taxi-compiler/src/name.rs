//! Qualified type names.
//!
//! A name is a namespace, a simple name and (for parameterized types) a list
//! of parameter names. Surface text like `com.acme.Box<lang.taxi.String>` or
//! `Foo[]` is parsed into this structure; `Foo[]` is sugar for
//! `lang.taxi.Array<Foo>`.

use std::fmt;

use serde::Serialize;

use crate::primitives::TAXI_NAMESPACE;

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct QualifiedName {
    pub namespace: String,
    pub type_name: String,
    pub parameters: Vec<QualifiedName>,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum NameParseError {
    #[error("empty type name")]
    Empty,
    #[error("unexpected `{found}` at offset {offset} in `{text}`")]
    Unexpected { text: String, found: char, offset: usize },
    #[error("unclosed `<` in `{0}`")]
    Unclosed(String),
}

impl QualifiedName {
    pub fn new(namespace: impl Into<String>, type_name: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            type_name: type_name.into(),
            parameters: Vec::new(),
        }
    }

    /// Split a plain dotted name at its last `.`. No generic syntax.
    pub fn from_fully_qualified(name: &str) -> Self {
        match name.rsplit_once('.') {
            Some((namespace, type_name)) => Self::new(namespace, type_name),
            None => Self::new("", name),
        }
    }

    pub fn with_parameters(mut self, parameters: Vec<QualifiedName>) -> Self {
        self.parameters = parameters;
        self
    }

    /// The built-in `lang.taxi.Array<element>`.
    pub fn array_of(element: QualifiedName) -> Self {
        Self::new(TAXI_NAMESPACE, "Array").with_parameters(vec![element])
    }

    /// Parse `a.b.Foo`, `a.b.Foo<X, Y<Z>>` or `Foo[]`.
    pub fn parse(text: &str) -> Result<Self, NameParseError> {
        let mut parser = NameParser {
            text,
            chars: text.char_indices().peekable(),
        };
        let name = parser.parse_name()?;
        match parser.chars.next() {
            None => Ok(name),
            Some((offset, found)) => Err(NameParseError::Unexpected {
                text: text.to_string(),
                found,
                offset,
            }),
        }
    }

    /// `namespace.Name`, or just `Name` in the root namespace.
    pub fn fully_qualified_name(&self) -> String {
        qualify(&self.namespace, &self.type_name)
    }

    /// The fully qualified name followed by `<P1,P2>` when parameterized.
    pub fn parameterized_name(&self) -> String {
        let base = self.fully_qualified_name();
        if self.parameters.is_empty() {
            return base;
        }
        let params: Vec<String> = self.parameters.iter().map(|p| p.parameterized_name()).collect();
        format!("{base}<{}>", params.join(","))
    }
}

impl fmt::Display for QualifiedName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.parameterized_name())
    }
}

/// Join a namespace and a simple name.
pub fn qualify(namespace: &str, name: &str) -> String {
    if namespace.is_empty() {
        name.to_string()
    } else {
        format!("{namespace}.{name}")
    }
}

struct NameParser<'a> {
    text: &'a str,
    chars: std::iter::Peekable<std::str::CharIndices<'a>>,
}

impl NameParser<'_> {
    fn parse_name(&mut self) -> Result<QualifiedName, NameParseError> {
        self.skip_whitespace();
        let mut dotted = String::new();
        while let Some(&(_, c)) = self.chars.peek() {
            if c.is_alphanumeric() || c == '_' || c == '$' || c == '.' {
                dotted.push(c);
                self.chars.next();
            } else {
                break;
            }
        }
        if dotted.is_empty() {
            return match self.chars.peek() {
                Some(&(offset, found)) => Err(self.unexpected(offset, found)),
                None => Err(NameParseError::Empty),
            };
        }

        let mut name = QualifiedName::from_fully_qualified(&dotted);
        self.skip_whitespace();

        if let Some(&(_, '<')) = self.chars.peek() {
            self.chars.next();
            loop {
                name.parameters.push(self.parse_name()?);
                self.skip_whitespace();
                match self.chars.next() {
                    Some((_, ',')) => continue,
                    Some((_, '>')) => break,
                    Some((offset, found)) => return Err(self.unexpected(offset, found)),
                    None => return Err(NameParseError::Unclosed(self.text.to_string())),
                }
            }
        }

        while let Some(&(offset, '[')) = self.chars.peek() {
            self.chars.next();
            match self.chars.next() {
                Some((_, ']')) => name = QualifiedName::array_of(name),
                Some((at, found)) => return Err(self.unexpected(at, found)),
                None => return Err(self.unexpected(offset, '[')),
            }
        }
        Ok(name)
    }

    fn skip_whitespace(&mut self) {
        while matches!(self.chars.peek(), Some(&(_, c)) if c.is_whitespace()) {
            self.chars.next();
        }
    }

    fn unexpected(&self, offset: usize, found: char) -> NameParseError {
        NameParseError::Unexpected {
            text: self.text.to_string(),
            found,
            offset,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_and_root_names() {
        let name = QualifiedName::parse("com.acme.Person").unwrap();
        assert_eq!(name.namespace, "com.acme");
        assert_eq!(name.type_name, "Person");
        assert_eq!(name.fully_qualified_name(), "com.acme.Person");

        let root = QualifiedName::parse("Person").unwrap();
        assert_eq!(root.namespace, "");
        assert_eq!(root.fully_qualified_name(), "Person");
    }

    #[test]
    fn generic_parameters_are_nested() {
        let name = QualifiedName::parse("lang.taxi.Map<lang.taxi.String, a.Box<b.C>>").unwrap();
        assert_eq!(name.parameters.len(), 2);
        assert_eq!(name.parameters[1].parameters[0].fully_qualified_name(), "b.C");
        assert_eq!(
            name.parameterized_name(),
            "lang.taxi.Map<lang.taxi.String,a.Box<b.C>>"
        );
    }

    #[test]
    fn array_shorthand_is_array_generic() {
        let sugar = QualifiedName::parse("com.Foo[]").unwrap();
        let explicit = QualifiedName::parse("lang.taxi.Array<com.Foo>").unwrap();
        assert_eq!(sugar, explicit);

        let nested = QualifiedName::parse("Foo[][]").unwrap();
        assert_eq!(nested.parameterized_name(), "lang.taxi.Array<lang.taxi.Array<Foo>>");
    }

    #[test]
    fn malformed_names() {
        assert_eq!(QualifiedName::parse(""), Err(NameParseError::Empty));
        assert!(matches!(
            QualifiedName::parse("Foo<Bar"),
            Err(NameParseError::Unclosed(_))
        ));
        assert!(matches!(
            QualifiedName::parse("Foo>"),
            Err(NameParseError::Unexpected { found: '>', .. })
        ));
    }
}
