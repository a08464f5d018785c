//! Line commands for the interactive composer.

use notification_core::UpdateOptions;

pub const HELP: &str = "\
Commands:
  update <n>   set the update number
  resolve      toggle the Resolved prefix
  downgrade    toggle the Downgraded prefix
  refresh      fetch the incident again
  show         render the current message
  help         print this help
  quit         exit";

/// One parsed line of operator input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Update(u32),
    ToggleResolve,
    ToggleDowngrade,
    Refresh,
    Show,
    Help,
    Quit,
}

impl Command {
    /// Parse a line. Blank input re-renders.
    pub fn parse(line: &str) -> Result<Self, String> {
        let mut words = line.split_whitespace();
        let Some(word) = words.next() else {
            return Ok(Command::Show);
        };

        let command = match word.to_ascii_lowercase().as_str() {
            "update" | "u" => {
                let value = words.next().ok_or("update needs a number")?;
                let number = value
                    .parse::<u32>()
                    .ok()
                    .filter(|n| *n >= 1)
                    .ok_or_else(|| format!("invalid update number: {}", value))?;
                Command::Update(number)
            }
            "resolve" | "r" => Command::ToggleResolve,
            "downgrade" | "d" => Command::ToggleDowngrade,
            "refresh" => Command::Refresh,
            "show" | "s" => Command::Show,
            "help" | "?" => Command::Help,
            "quit" | "q" | "exit" => Command::Quit,
            other => return Err(format!("unknown command: {}", other)),
        };

        if words.next().is_some() {
            return Err(format!("too many arguments for {}", word));
        }
        Ok(command)
    }

    /// Apply option changes. Commands that only re-render or control the
    /// loop leave the options untouched.
    pub fn apply(&self, options: &mut UpdateOptions) {
        match self {
            Command::Update(number) => options.update_number = *number,
            Command::ToggleResolve => options.resolve = !options.resolve,
            Command::ToggleDowngrade => options.downgrade = !options.downgrade,
            Command::Refresh | Command::Show | Command::Help | Command::Quit => {}
        }
    }
}

/// One-line summary of the current options, printed above each render.
pub fn describe(options: &UpdateOptions) -> String {
    let mut flags = Vec::new();
    if options.resolve {
        flags.push("resolved");
    }
    if options.downgrade {
        flags.push("downgraded");
    }
    if flags.is_empty() {
        format!("Update {}", options.update_number)
    } else {
        format!("Update {} ({})", options.update_number, flags.join(", "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_commands() {
        assert_eq!(Command::parse("update 3"), Ok(Command::Update(3)));
        assert_eq!(Command::parse("  U 12 "), Ok(Command::Update(12)));
        assert_eq!(Command::parse("resolve"), Ok(Command::ToggleResolve));
        assert_eq!(Command::parse("d"), Ok(Command::ToggleDowngrade));
        assert_eq!(Command::parse("refresh"), Ok(Command::Refresh));
        assert_eq!(Command::parse(""), Ok(Command::Show));
        assert_eq!(Command::parse("q"), Ok(Command::Quit));
    }

    #[test]
    fn test_parse_rejects_bad_input() {
        assert!(Command::parse("update").is_err());
        assert!(Command::parse("update 0").is_err());
        assert!(Command::parse("update two").is_err());
        assert!(Command::parse("resolve now").is_err());
        assert_eq!(
            Command::parse("publish"),
            Err("unknown command: publish".to_string())
        );
    }

    #[test]
    fn test_apply_toggles() {
        let mut options = UpdateOptions::default();

        Command::ToggleResolve.apply(&mut options);
        assert!(options.resolve);
        Command::ToggleResolve.apply(&mut options);
        assert!(!options.resolve);

        Command::Update(4).apply(&mut options);
        assert_eq!(options.update_number, 4);

        Command::Refresh.apply(&mut options);
        Command::Help.apply(&mut options);
        assert_eq!(
            options,
            UpdateOptions {
                update_number: 4,
                resolve: false,
                downgrade: false,
            }
        );
    }

    #[test]
    fn test_describe() {
        let mut options = UpdateOptions::default();
        assert_eq!(describe(&options), "Update 1");

        options.update_number = 2;
        options.resolve = true;
        options.downgrade = true;
        assert_eq!(describe(&options), "Update 2 (resolved, downgraded)");
    }
}
