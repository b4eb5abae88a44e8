//! Readline wrapper with command and product-key completion.

use std::path::PathBuf;

use rustyline::completion::{Completer, Pair};
use rustyline::error::ReadlineError;
use rustyline::highlight::Highlighter;
use rustyline::hint::{Hinter, HistoryHinter};
use rustyline::history::DefaultHistory;
use rustyline::validate::Validator;
use rustyline::{Config, Context, Editor, Helper};

use crate::catalog::InvestmentKey;

/// Flags whose value is a product key
const INVESTMENT_FLAGS: &[&str] = &["-i", "--investment"];

pub struct CommandHelper {
    patterns: Vec<Vec<String>>,
    hinter: HistoryHinter,
}

impl CommandHelper {
    pub fn new(patterns: &[&[&str]]) -> Self {
        Self {
            patterns: patterns
                .iter()
                .map(|p| p.iter().map(|s| s.to_string()).collect())
                .collect(),
            hinter: HistoryHinter::default(),
        }
    }

    /// Command words matching the typed tokens; the first word keeps a
    /// leading slash when the user typed one.
    fn command_candidates(&self, tokens: &[&str]) -> Vec<String> {
        let Some((current, typed)) = tokens.split_last() else {
            return Vec::new();
        };
        let slash = tokens.first().is_some_and(|t| t.starts_with('/'));
        let typed: Vec<String> = typed
            .iter()
            .map(|t| t.trim_start_matches('/').to_lowercase())
            .collect();
        let current = current.trim_start_matches('/').to_lowercase();

        self.patterns
            .iter()
            .filter(|p| p.len() > typed.len())
            .filter(|p| p.iter().zip(&typed).all(|(word, t)| word.eq_ignore_ascii_case(t)))
            .map(|p| &p[typed.len()])
            .filter(|word| word.to_lowercase().starts_with(&current))
            .map(|word| {
                if typed.is_empty() && slash {
                    format!("/{}", word)
                } else {
                    word.clone()
                }
            })
            .collect()
    }
}

fn investment_candidates(prefix: &str) -> Vec<String> {
    let prefix = prefix.to_uppercase();
    InvestmentKey::ALL
        .iter()
        .map(|k| k.as_str())
        .filter(|k| k.starts_with(&prefix))
        .map(str::to_string)
        .collect()
}

impl Helper for CommandHelper {}
impl Validator for CommandHelper {}
impl Highlighter for CommandHelper {}

impl Hinter for CommandHelper {
    type Hint = String;

    fn hint(&self, line: &str, pos: usize, ctx: &Context<'_>) -> Option<String> {
        self.hinter.hint(line, pos, ctx)
    }
}

impl Completer for CommandHelper {
    type Candidate = Pair;

    fn complete(
        &self,
        line: &str,
        pos: usize,
        _ctx: &Context<'_>,
    ) -> rustyline::Result<(usize, Vec<Pair>)> {
        let before = &line[..pos];
        let mut tokens: Vec<&str> = before.split_whitespace().collect();

        // A trailing space starts a new, empty token
        if before.ends_with(char::is_whitespace) {
            tokens.push("");
        }

        let current = tokens.last().copied().unwrap_or("");
        let start = pos.saturating_sub(current.len());

        let previous = tokens.len().checked_sub(2).map(|i| tokens[i]);
        let mut candidates = match previous {
            Some(flag) if INVESTMENT_FLAGS.contains(&flag) => investment_candidates(current),
            _ => self.command_candidates(&tokens),
        };
        candidates.sort();
        candidates.dedup();

        let matches = candidates
            .into_iter()
            .map(|c| {
                let replacement = format!("{} ", c);
                Pair {
                    display: replacement.clone(),
                    replacement,
                }
            })
            .collect();

        Ok((start, matches))
    }
}

/// Thin wrapper over `rustyline::Editor` with preset commands and history path.
pub struct Readline {
    editor: Editor<CommandHelper, DefaultHistory>,
    history_path: PathBuf,
}

impl Readline {
    pub fn new(
        command_patterns: &[&[&str]],
        history_path: Option<PathBuf>,
    ) -> anyhow::Result<Self> {
        let config = Config::builder()
            .history_ignore_dups(true)?
            .history_ignore_space(true)
            .build();
        let mut editor = Editor::with_config(config)?;
        editor.set_helper(Some(CommandHelper::new(command_patterns)));

        let history_path = history_path.unwrap_or_else(|| {
            let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
            PathBuf::from(home).join(".rendimentos/history")
        });
        if let Some(parent) = history_path.parent() {
            let _ = std::fs::create_dir_all(parent);
        }
        let _ = editor.load_history(&history_path);

        Ok(Self {
            editor,
            history_path,
        })
    }

    pub fn readline(&mut self, prompt: &str) -> Result<String, ReadlineError> {
        let line = self.editor.readline(prompt)?;
        if !line.trim().is_empty() {
            let _ = self.editor.add_history_entry(line.as_str());
            let _ = self.editor.append_history(&self.history_path);
        }
        Ok(line)
    }

    /// Completions for `line` with the cursor at its end, paired with the
    /// replacement start index.
    pub fn completions(&self, line: &str) -> Vec<(usize, String)> {
        let Some(helper) = self.editor.helper() else {
            return Vec::new();
        };
        let ctx = Context::new(self.editor.history());
        match helper.complete(line, line.len(), &ctx) {
            Ok((start, pairs)) => pairs.into_iter().map(|p| (start, p.replacement)).collect(),
            Err(_) => Vec::new(),
        }
    }
}
