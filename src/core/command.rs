//! Command parser for the : command system

/// Parsed command from user input
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    // Navigation
    Wallet,
    Watchlist,
    Details { contract: String, token_id: String },

    // Watchlist
    /// `add` alone opens the step-by-step prompt
    Add(Option<(String, String)>),
    Remove { contract: String, token_id: String },

    // Wallet
    /// `import` alone opens the private key prompt
    Import(Option<String>),
    Primary(String),

    // Details
    Send(String),

    // General
    Clear,
    Help,
    Quit,

    // Unknown command
    Unknown(String),
}

/// Parse a command string (without the leading :)
pub fn parse_command(input: &str) -> Command {
    let input = input.trim();
    let mut parts = input.split_whitespace();
    let cmd = parts.next().unwrap_or("");
    let args: Vec<String> = parts.map(str::to_string).collect();

    match (cmd.to_lowercase().as_str(), args.as_slice()) {
        ("wallet" | "w", []) => Command::Wallet,
        ("watchlist" | "list" | "ls", []) => Command::Watchlist,
        ("details" | "show", [contract, token_id]) => Command::Details {
            contract: contract.clone(),
            token_id: token_id.clone(),
        },

        ("add", []) => Command::Add(None),
        ("add", [contract, token_id]) => Command::Add(Some((contract.clone(), token_id.clone()))),
        ("remove" | "rm", [contract, token_id]) => Command::Remove {
            contract: contract.clone(),
            token_id: token_id.clone(),
        },

        ("import", []) => Command::Import(None),
        ("import", [key]) => Command::Import(Some(key.clone())),
        ("primary" | "use", [address]) => Command::Primary(address.clone()),

        ("send" | "sell", [to]) => Command::Send(to.clone()),

        ("clear", []) => Command::Clear,
        ("help" | "h", []) => Command::Help,
        ("quit" | "q" | "exit", []) => Command::Quit,

        _ => Command::Unknown(input.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_navigation_commands() {
        assert_eq!(parse_command("wallet"), Command::Wallet);
        assert_eq!(parse_command("  LIST "), Command::Watchlist);
        assert_eq!(
            parse_command("details 0xabc 7"),
            Command::Details {
                contract: "0xabc".to_string(),
                token_id: "7".to_string()
            }
        );
    }

    #[test]
    fn test_parse_watchlist_commands() {
        assert_eq!(parse_command("add"), Command::Add(None));
        assert_eq!(
            parse_command("add 0xabc 1"),
            Command::Add(Some(("0xabc".to_string(), "1".to_string())))
        );
        assert_eq!(
            parse_command("rm 0xabc 1"),
            Command::Remove {
                contract: "0xabc".to_string(),
                token_id: "1".to_string()
            }
        );
    }

    #[test]
    fn test_parse_wallet_commands() {
        assert_eq!(parse_command("import"), Command::Import(None));
        assert_eq!(
            parse_command("import 0x01"),
            Command::Import(Some("0x01".to_string()))
        );
        assert_eq!(
            parse_command("primary 0xdef"),
            Command::Primary("0xdef".to_string())
        );
        assert_eq!(parse_command("send 0xdef"), Command::Send("0xdef".to_string()));
    }

    #[test]
    fn test_parse_unknown() {
        assert_eq!(
            parse_command("notacommand"),
            Command::Unknown("notacommand".to_string())
        );
        // wrong arity
        assert_eq!(
            parse_command("details 0xabc"),
            Command::Unknown("details 0xabc".to_string())
        );
        assert_eq!(parse_command("quit now"), Command::Unknown("quit now".to_string()));
    }
}
