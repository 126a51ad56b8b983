/// A chat command, classified from the literal message text.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Command {
    Start,
    Help,
    /// Product link, taken verbatim.
    Track(String),
    List,
    StopAll,
    /// Product id, taken verbatim.
    StopOne(String),
    Unknown,
}

impl Command {
    /// Classify a message by prefix. Order matters: `/stop` is an exact match
    /// and must be tested before the `/stop_` prefix.
    pub fn parse(text: &str) -> Self {
        if text == "/start" {
            return Command::Start;
        }
        if text == "/help" {
            return Command::Help;
        }
        if let Some(url) = text.strip_prefix("/track ") {
            return Command::Track(url.to_string());
        }
        if text == "/list" {
            return Command::List;
        }
        if text == "/stop" {
            return Command::StopAll;
        }
        if let Some(product_id) = text.strip_prefix("/stop_") {
            return Command::StopOne(product_id.to_string());
        }
        Command::Unknown
    }

    pub fn name(&self) -> &'static str {
        match self {
            Command::Start => "start",
            Command::Help => "help",
            Command::Track(_) => "track",
            Command::List => "list",
            Command::StopAll => "stop",
            Command::StopOne(_) => "stop_one",
            Command::Unknown => "unknown",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exact_commands() {
        assert_eq!(Command::parse("/start"), Command::Start);
        assert_eq!(Command::parse("/help"), Command::Help);
        assert_eq!(Command::parse("/list"), Command::List);
    }

    #[test]
    fn bare_stop_is_stop_all() {
        assert_eq!(Command::parse("/stop"), Command::StopAll);
    }

    #[test]
    fn stop_underscore_keeps_id_verbatim() {
        assert_eq!(
            Command::parse("/stop_99"),
            Command::StopOne("99".to_string())
        );
        assert_eq!(
            Command::parse("/stop_ab c/ "),
            Command::StopOne("ab c/ ".to_string())
        );
        assert_eq!(Command::parse("/stop_"), Command::StopOne(String::new()));
    }

    #[test]
    fn track_keeps_remainder_verbatim() {
        assert_eq!(
            Command::parse("/track https://shop.example/item/42"),
            Command::Track("https://shop.example/item/42".to_string())
        );
        assert_eq!(
            Command::parse("/track   spaced  link "),
            Command::Track("  spaced  link ".to_string())
        );
    }

    #[test]
    fn track_without_separator_is_unknown() {
        assert_eq!(Command::parse("/track"), Command::Unknown);
        assert_eq!(Command::parse("/trackhttps://x"), Command::Unknown);
    }

    #[test]
    fn matching_is_literal() {
        assert_eq!(Command::parse("/START"), Command::Unknown);
        assert_eq!(Command::parse(" /help"), Command::Unknown);
        assert_eq!(Command::parse("/list "), Command::Unknown);
        assert_eq!(Command::parse("/stops"), Command::Unknown);
        assert_eq!(Command::parse(""), Command::Unknown);
        assert_eq!(Command::parse("/unknowncmd"), Command::Unknown);
    }
}
