//! Parsed chat command.

/// A parsed command: symbol to argument tokens, kept in order of appearance.
///
/// An empty argument list means the symbol was given without arguments,
/// which is distinct from the symbol being absent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Command {
    start: String,
    entries: Vec<(String, Vec<String>)>,
}

impl Command {
    /// Creates an empty command for the given start symbol.
    #[must_use]
    pub fn new(start: impl Into<String>) -> Self {
        Self {
            start: start.into(),
            entries: Vec::new(),
        }
    }

    /// Appends a symbol with its arguments. A repeated symbol replaces the
    /// earlier arguments but keeps its original position.
    pub fn push(&mut self, symbol: impl Into<String>, args: Vec<String>) {
        let symbol = symbol.into();
        if let Some((_, existing)) = self.entries.iter_mut().find(|(s, _)| *s == symbol) {
            *existing = args;
        } else {
            self.entries.push((symbol, args));
        }
    }

    /// The start symbol this command was parsed with.
    #[must_use]
    pub fn start_symbol(&self) -> &str {
        &self.start
    }

    /// Arguments for a symbol, if the symbol was invoked.
    #[must_use]
    pub fn get(&self, symbol: &str) -> Option<&[String]> {
        self.entries
            .iter()
            .find(|(s, _)| s == symbol)
            .map(|(_, args)| args.as_slice())
    }

    /// Returns true if the symbol was invoked.
    #[must_use]
    pub fn contains(&self, symbol: &str) -> bool {
        self.get(symbol).is_some()
    }

    /// Arguments of a symbol joined with single spaces.
    #[must_use]
    pub fn text(&self, symbol: &str) -> Option<String> {
        self.get(symbol).map(|args| args.join(" "))
    }

    /// Upper-cased option words given to the start symbol.
    #[must_use]
    pub fn options(&self) -> &[String] {
        self.get(&self.start).unwrap_or_default()
    }

    /// Returns true if the start symbol carries the option word.
    #[must_use]
    pub fn has_option(&self, option: &str) -> bool {
        self.options().iter().any(|o| o.eq_ignore_ascii_case(option))
    }

    /// Iterates over symbols and arguments in order of appearance.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.entries
            .iter()
            .map(|(s, args)| (s.as_str(), args.as_slice()))
    }

    /// Number of invoked symbols, including the start symbol.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if no symbol was recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
