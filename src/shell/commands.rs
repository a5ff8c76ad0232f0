//! Shell command parsing

/// One line of shell input
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShellCommand {
    Load,
    Translate,
    Clear,
    Copy,
    Status,
    Help,
    Quit,
    /// Text appended to the Urdu input pane
    Text(String),
    Unknown(String),
}

impl ShellCommand {
    pub fn parse(line: &str) -> Self {
        let trimmed = line.trim();
        let Some(name) = trimmed.strip_prefix(':') else {
            return ShellCommand::Text(line.trim_end_matches(['\r', '\n']).to_string());
        };

        match name.to_lowercase().as_str() {
            "load" | "l" => ShellCommand::Load,
            "translate" | "t" => ShellCommand::Translate,
            "clear" | "c" => ShellCommand::Clear,
            "copy" | "y" => ShellCommand::Copy,
            "status" | "s" => ShellCommand::Status,
            "help" | "h" | "?" => ShellCommand::Help,
            "quit" | "q" | "exit" => ShellCommand::Quit,
            _ => ShellCommand::Unknown(trimmed.to_string()),
        }
    }
}

pub const HELP: &str = "\
Type Urdu text to add it to the input pane, then:
  :load        load the translation model
  :translate   translate the input pane (:t)
  :clear       clear both panes
  :copy        copy the English output to the clipboard
  :status      show model and pane status
  :help        show this help
  :quit        exit";
