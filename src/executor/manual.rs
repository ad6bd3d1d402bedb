//! Built-in command manuals

/// One-line summary of every command, in help order
const SUMMARIES: &[(&str, &str)] = &[
    ("cd", "Change the current catalog path"),
    ("ls", "List the objects below a path"),
    ("tree", "Print the hierarchy below a path"),
    ("pwd", "Print the current catalog path"),
    ("man", "Show the manual of a command"),
    ("help", "Show this overview"),
    ("clear", "Clear the screen"),
    (".cmds", "Run the commands stored in a file"),
    ("exit", "Leave the shell"),
];

/// Full manual page of a command
///
/// # Arguments
/// * `command` - Command name as typed after `man`
///
/// # Returns
/// * `Option<&'static str>` - Manual text, None for unknown commands
pub fn page(command: &str) -> Option<&'static str> {
    let text = match command {
        "cd" => {
            "cd [PATH]\n\n\
             Change the current path. Without PATH, go back to the root.\n\
             PATH may be absolute or relative; '.' and '..' are understood."
        }
        "ls" => {
            "ls [-r] [PATH]\n\n\
             List the children of PATH, or of the current path.\n\
             -r lists every descendant, one relative path per line."
        }
        "tree" => {
            "tree [PATH] [DEPTH]\n\n\
             Print the hierarchy below PATH down to DEPTH levels (default 3)."
        }
        "pwd" => "pwd\n\nPrint the current path.",
        "man" => "man [COMMAND]\n\nShow the manual of COMMAND, or list the manuals.",
        "help" => "help\n\nShow a one-line summary of every command.",
        "clear" => "clear\n\nClear the screen.",
        ".cmds" | ".cmds:" => {
            ".cmds: FILE\n\n\
             Run FILE one line at a time. Blank lines and lines starting\n\
             with '#' are skipped. The first failing line stops the run."
        }
        "exit" | "quit" => "exit\n\nLeave the shell. Ctrl-D on an empty line does the same.",
        _ => return None,
    };
    Some(text)
}

/// Overview printed by `help`
pub fn overview() -> String {
    let mut out = String::from("Commands:\n");
    for (name, summary) in SUMMARIES {
        out.push_str(&format!("  {:<8}{}\n", name, summary));
    }
    out.push_str("\nPress Tab to complete, Tab again to pick from the list.");
    out
}

/// Names with a manual page, one per line
pub fn index() -> String {
    SUMMARIES
        .iter()
        .map(|(name, _)| *name)
        .collect::<Vec<_>>()
        .join("\n")
}
