use std::io::{self, BufRead, Write};

use crate::output::{BOLD, CYAN, GRAY, GREEN, RESET, YELLOW};

/// Operator interaction used by the workflows. Every call blocks until answered.
pub trait Prompter {
    /// Free-text answer. Empty input yields `default` (or an empty string).
    fn ask(&mut self, question: &str, default: Option<&str>) -> String;

    /// Pick one of `options`. Empty input yields `default`, or the first option.
    fn select(&mut self, question: &str, options: &[String], default: Option<&str>) -> String;

    fn yes_no(&mut self, question: &str, default: bool) -> bool;
}

/// [`Prompter`] on stdin/stdout.
#[derive(Debug, Default)]
pub struct TerminalPrompter;

impl TerminalPrompter {
    pub fn new() -> Self {
        Self
    }
}

/// One line from stdin, trimmed. `None` on EOF or read error.
fn read_answer() -> Option<String> {
    let _ = io::stdout().flush();
    let mut input = String::new();
    match io::stdin().lock().read_line(&mut input) {
        Ok(0) | Err(_) => None,
        Ok(_) => Some(input.trim().to_string()),
    }
}

impl Prompter for TerminalPrompter {
    fn ask(&mut self, question: &str, default: Option<&str>) -> String {
        match default {
            Some(d) if !d.is_empty() => print!("{CYAN}?{RESET} {} {GRAY}({}){RESET} ", question, d),
            _ => print!("{CYAN}?{RESET} {} ", question),
        }

        match read_answer() {
            Some(answer) if !answer.is_empty() => answer,
            _ => default.unwrap_or_default().to_string(),
        }
    }

    fn select(&mut self, question: &str, options: &[String], default: Option<&str>) -> String {
        if options.is_empty() {
            return self.ask(question, default);
        }

        let default_index = default
            .and_then(|d| options.iter().position(|o| o == d))
            .unwrap_or(0);

        println!("{CYAN}?{RESET} {}", question);
        println!();
        for (i, option) in options.iter().enumerate() {
            let marker = if i == default_index {
                format!("{GREEN}>{RESET}")
            } else {
                " ".to_string()
            };
            println!("  {} {BOLD}{}{RESET}. {}", marker, i + 1, option);
        }

        loop {
            println!();
            print!("{GRAY}Enter choice [{}]:{RESET} ", default_index + 1);

            let Some(answer) = read_answer() else {
                return options[default_index].clone();
            };
            if answer.is_empty() {
                return options[default_index].clone();
            }

            match answer.parse::<usize>() {
                Ok(n) if n >= 1 && n <= options.len() => return options[n - 1].clone(),
                _ => {
                    if let Some(exact) = options.iter().find(|o| **o == answer) {
                        return exact.clone();
                    }
                    println!(
                        "{YELLOW}Please enter a number between 1 and {}{RESET}",
                        options.len()
                    );
                }
            }
        }
    }

    fn yes_no(&mut self, question: &str, default: bool) -> bool {
        let hint = if default { "[Y/n]" } else { "[y/N]" };
        print!("{CYAN}?{RESET} {} {GRAY}{}{RESET} ", question, hint);

        match read_answer().map(|a| a.to_lowercase()).as_deref() {
            Some("y") | Some("yes") => true,
            Some("n") | Some("no") => false,
            _ => default,
        }
    }
}
