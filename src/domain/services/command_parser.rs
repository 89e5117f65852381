use crate::domain::entities::Command;

/// Option words hoisted into the start symbol's argument list.
pub const DEFAULT_OPTIONS: [&str; 5] = ["ANON", "DARK", "PING", "HELP", "VERSION"];

const OPTION_PREFIX: char = '-';

/// Splits raw message text into a [`Command`].
#[derive(Debug, Clone)]
pub struct CommandParser {
    start: String,
    symbols: Vec<String>,
    options: Vec<String>,
}

impl CommandParser {
    /// Creates a parser for a start symbol and the recognized format symbols.
    #[must_use]
    pub fn new<I, S>(start: &str, symbols: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            start: start.to_uppercase(),
            symbols: symbols
                .into_iter()
                .map(|s| s.as_ref().to_uppercase())
                .collect(),
            options: DEFAULT_OPTIONS.iter().map(|o| (*o).to_string()).collect(),
        }
    }

    /// Replaces the option words.
    #[must_use]
    pub fn with_options<I, S>(mut self, options: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.options = options
            .into_iter()
            .map(|o| o.as_ref().to_uppercase())
            .collect();
        self
    }

    /// Symbol every command must start with.
    #[must_use]
    pub fn start_symbol(&self) -> &str {
        &self.start
    }

    /// Returns `None` unless the text begins with the start symbol.
    #[must_use]
    pub fn parse(&self, raw: &str) -> Option<Command> {
        let normalized = raw.replace(['\n', '\t'], " ");
        let normalized = normalized.trim();

        if !normalized.to_uppercase().starts_with(&self.start) {
            return None;
        }

        let tokens: Vec<&str> = normalized.split_whitespace().collect();
        let upper: Vec<String> = tokens.iter().map(|t| t.to_uppercase()).collect();

        let mut located: Vec<(usize, &str)> = std::iter::once(self.start.as_str())
            .chain(self.symbols.iter().map(String::as_str))
            .filter_map(|symbol| {
                upper
                    .iter()
                    .position(|t| t == symbol)
                    .map(|pos| (pos, symbol))
            })
            .collect();
        located.sort_by_key(|(pos, _)| *pos);
        located.dedup_by_key(|(pos, _)| *pos);

        if !located.iter().any(|(_, s)| *s == self.start) {
            return None;
        }

        let mut command = Command::new(self.start.clone());
        let mut hoisted = Vec::new();
        let mut segments = Vec::with_capacity(located.len());

        for (i, (pos, symbol)) in located.iter().enumerate() {
            let end = located.get(i + 1).map_or(tokens.len(), |(next, _)| *next);
            let mut args = Vec::new();

            for (token, token_upper) in tokens[pos + 1..end].iter().zip(&upper[pos + 1..end]) {
                if let Some(option) = self.option_word(token_upper) {
                    hoisted.push(option.to_string());
                } else if *symbol == self.start {
                    args.push(token_upper.clone());
                } else {
                    args.push((*token).to_string());
                }
            }
            segments.push((*symbol, args));
        }

        for (symbol, mut args) in segments {
            if symbol == self.start {
                args.append(&mut hoisted);
            }
            command.push(symbol, args);
        }

        Some(command)
    }

    fn option_word<'a>(&self, token_upper: &'a str) -> Option<&'a str> {
        let word = token_upper.strip_prefix(OPTION_PREFIX)?;
        self.options.iter().any(|o| o == word).then_some(word)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    fn parser() -> CommandParser {
        CommandParser::new("-M", ["-I", "-IT", "-IB", "-T", "-D", "-W", "-URL"])
    }

    fn args(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| (*v).to_string()).collect()
    }

    #[test]
    fn test_option_flag_hoisted_into_start() {
        let cmd = parser().parse("-M -T hello world -ANON").unwrap();

        assert_eq!(cmd.get("-M"), Some(args(&["ANON"]).as_slice()));
        assert_eq!(cmd.get("-T"), Some(args(&["hello", "world"]).as_slice()));
        assert_eq!(cmd.len(), 2);
    }

    #[test_case("hello -M -T hi" ; "start not first")]
    #[test_case("" ; "empty")]
    #[test_case("-MT hi" ; "start glued to word")]
    fn test_not_a_command(raw: &str) {
        assert!(parser().parse(raw).is_none());
    }

    #[test]
    fn test_start_segment_upper_cased() {
        let cmd = parser().parse("-m ping").unwrap();
        assert_eq!(cmd.get("-M"), Some(args(&["PING"]).as_slice()));
    }

    #[test]
    fn test_arguments_keep_case_and_order() {
        let cmd = parser()
            .parse("-M -i Top Text // Bottom\n-t\tSecond")
            .unwrap();

        let symbols: Vec<&str> = cmd.iter().map(|(s, _)| s).collect();
        assert_eq!(symbols, vec!["-M", "-I", "-T"]);
        assert_eq!(
            cmd.get("-I"),
            Some(args(&["Top", "Text", "//", "Bottom"]).as_slice())
        );
        assert_eq!(cmd.text("-T").as_deref(), Some("Second"));
    }

    #[test]
    fn test_empty_segment_is_distinct_from_absence() {
        let cmd = parser().parse("-M -W -T x").unwrap();

        assert_eq!(cmd.get("-W"), Some(&[][..]));
        assert!(!cmd.contains("-I"));
    }

    #[test]
    fn test_only_first_occurrence_is_a_symbol() {
        let cmd = parser().parse("-M -T a -T b").unwrap();
        assert_eq!(cmd.get("-T"), Some(args(&["a", "-T", "b"]).as_slice()));
    }

    #[test]
    fn test_custom_options() {
        let cmd = parser()
            .with_options(["loud"])
            .parse("-M -T hi -loud -anon")
            .unwrap();

        assert_eq!(cmd.get("-M"), Some(args(&["LOUD"]).as_slice()));
        assert_eq!(cmd.get("-T"), Some(args(&["hi", "-anon"]).as_slice()));
    }
}
