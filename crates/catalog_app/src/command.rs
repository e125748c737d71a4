use catalog_core::CharacterId;

pub const HELP: &str = "commands: m|more, s|show <id>, l|list, b|back, h|help, q|quit";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    More,
    Show(CharacterId),
    List,
    Back,
    Help,
    Quit,
}

impl Command {
    /// Parses one input line. Blank input means "load more", like scrolling on.
    pub fn parse(line: &str) -> Result<Self, String> {
        let mut words = line.split_whitespace();
        let Some(word) = words.next() else {
            return Ok(Command::More);
        };
        let command = match word.to_ascii_lowercase().as_str() {
            "m" | "more" => Command::More,
            "l" | "list" => Command::List,
            "b" | "back" => Command::Back,
            "h" | "help" | "?" => Command::Help,
            "q" | "quit" | "exit" => Command::Quit,
            "s" | "show" => {
                let id = words
                    .next()
                    .ok_or_else(|| "show needs a character id".to_string())?;
                let id = id
                    .trim_start_matches('#')
                    .parse()
                    .map_err(|_| format!("not a character id: {id}"))?;
                Command::Show(id)
            }
            other => return Err(format!("unknown command {other:?}; {HELP}")),
        };
        if words.next().is_some() {
            return Err(format!("too many arguments; {HELP}"));
        }
        Ok(command)
    }
}
