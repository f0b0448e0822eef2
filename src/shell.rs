//! Interactive line-oriented front-end.
//!
//! Reads commands from stdin, edits the session and drives background runs.
//! While a run is active, status updates are applied to the session's plan as
//! they arrive and conflicts are answered at the prompt.

use std::io::Write;
use std::path::PathBuf;

use color_eyre::eyre::{Result, bail};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader, Lines, Stdin};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use renamer_core::Session;
use renamer_ops::{ConflictResolution, RenameEngine, RenameEvent, RunHandle, RunSummary};

use crate::display;

const HELP: &str = "\
Commands:
  list                 Show the plan
  input <dir>          Select the input folder and load its files
  output <dir>         Select the output folder
  load                 Reload the input folder
  set <n> <name>       Set the new name of file n (extension is kept if omitted)
  paste <n>            Paste names starting at file n, end with a line containing '.'
  clear <n>...         Clear the new names of the given files
  undo | redo          Undo or redo the last edit
  run                  Copy the files under their new names
  reset                Clear the plan and both folders
  help                 Show this help
  quit                 Exit

While a run is active, type 'stop' or press Ctrl-C to stop after the current file.";

/// A parsed command line. File numbers are converted to zero-based indices.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Help,
    List,
    Input(PathBuf),
    Output(PathBuf),
    Load,
    Set(usize, String),
    Paste(usize),
    Clear(Vec<usize>),
    Undo,
    Redo,
    Run,
    Reset,
    Quit,
}

impl Command {
    /// Parse one input line. Returns `Ok(None)` for a blank line.
    pub fn parse(line: &str) -> Result<Option<Self>, String> {
        let line = line.trim();
        if line.is_empty() {
            return Ok(None);
        }
        let (word, rest) = match line.split_once(char::is_whitespace) {
            Some((word, rest)) => (word, rest.trim()),
            None => (line, ""),
        };

        let command = match word {
            "help" | "?" => Self::Help,
            "list" | "ls" => Self::List,
            "input" => Self::Input(required_path(rest, "input")?),
            "output" => Self::Output(required_path(rest, "output")?),
            "load" => Self::Load,
            "set" => {
                let (number, name) = match rest.split_once(char::is_whitespace) {
                    Some((number, name)) => (number, name.trim()),
                    None => (rest, ""),
                };
                Self::Set(parse_index(number)?, name.to_string())
            }
            "paste" => Self::Paste(if rest.is_empty() { 0 } else { parse_index(rest)? }),
            "clear" => {
                let indices = rest
                    .split_whitespace()
                    .map(parse_index)
                    .collect::<Result<Vec<_>, _>>()?;
                if indices.is_empty() {
                    return Err("usage: clear <n>...".to_string());
                }
                Self::Clear(indices)
            }
            "undo" => Self::Undo,
            "redo" => Self::Redo,
            "run" => Self::Run,
            "reset" => Self::Reset,
            "quit" | "exit" | "q" => Self::Quit,
            other => return Err(format!("unknown command: {other} (type 'help')")),
        };
        Ok(Some(command))
    }
}

fn required_path(arg: &str, command: &str) -> Result<PathBuf, String> {
    if arg.is_empty() {
        Err(format!("usage: {command} <dir>"))
    } else {
        Ok(PathBuf::from(arg))
    }
}

fn parse_index(arg: &str) -> Result<usize, String> {
    match arg.parse::<usize>() {
        Ok(number) if number > 0 => Ok(number - 1),
        _ => Err(format!("not a file number: {arg}")),
    }
}

/// Parse an answer to the conflict prompt.
pub fn parse_resolution(answer: &str) -> Option<ConflictResolution> {
    match answer.trim() {
        "o" | "overwrite" => Some(ConflictResolution::Overwrite),
        "s" | "skip" => Some(ConflictResolution::Skip),
        "O" | "a" | "overwrite all" => Some(ConflictResolution::OverwriteAll),
        "S" | "k" | "skip all" => Some(ConflictResolution::SkipAll),
        "c" | "cancel" => Some(ConflictResolution::CancelAll),
        _ => None,
    }
}

const CONFLICT_PROMPT: &str = "[o]verwrite, [s]kip, overwrite [a]ll, s[k]ip all, [c]ancel: ";

/// What woke up the run loop.
enum Wakeup {
    Event(Option<RenameEvent>),
    Input(Option<String>),
}

/// Cancel `cancel` on every Ctrl-C until aborted.
fn watch_interrupts(cancel: CancellationToken) -> JoinHandle<()> {
    tokio::spawn(async move {
        while tokio::signal::ctrl_c().await.is_ok() {
            if !cancel.is_cancelled() {
                println!();
                println!("Stopping after the current file...");
            }
            cancel.cancel();
        }
    })
}

/// Interactive session reading commands from a line source.
pub struct Shell<R = BufReader<Stdin>> {
    session: Session,
    engine: RenameEngine,
    lines: Lines<R>,
    stdin_open: bool,
    assume_yes: bool,
}

impl Shell {
    /// Shell over the process's stdin.
    pub fn new(session: Session, engine: RenameEngine, assume_yes: bool) -> Self {
        Self::with_input(session, engine, assume_yes, BufReader::new(tokio::io::stdin()))
    }
}

impl<R: AsyncBufRead + Unpin> Shell<R> {
    pub fn with_input(session: Session, engine: RenameEngine, assume_yes: bool, input: R) -> Self {
        Self {
            session,
            engine,
            lines: input.lines(),
            stdin_open: true,
            assume_yes,
        }
    }

    /// Run the command loop until `quit`, Ctrl-C or end of input.
    pub async fn run(mut self) -> Result<()> {
        println!("{}", self.folders_text());
        if !self.session.plan().is_empty() {
            println!("{}", display::plan_table(self.session.plan()));
        }
        println!("Type 'help' for commands.");

        while let Some(line) = self.prompt_interruptible("> ").await? {
            let command = match Command::parse(&line) {
                Ok(Some(command)) => command,
                Ok(None) => continue,
                Err(message) => {
                    println!("{message}");
                    continue;
                }
            };
            if command == Command::Quit {
                break;
            }
            self.dispatch(command).await?;
        }
        Ok(())
    }

    async fn dispatch(&mut self, command: Command) -> Result<()> {
        match command {
            Command::Help => println!("{HELP}"),
            Command::List => println!("{}", display::plan_table(self.session.plan())),
            Command::Input(dir) => {
                self.session.set_input_dir(dir);
                self.save_settings();
                self.load();
            }
            Command::Output(dir) => {
                self.session.set_output_dir(dir);
                self.save_settings();
                println!("{}", self.folders_text());
            }
            Command::Load => self.load(),
            Command::Set(index, name) => match self.session.edit_target(index, &name) {
                Ok(()) => self.print_item(index),
                Err(e) => println!("{e}"),
            },
            Command::Paste(start) => {
                let Some(text) = self.read_block().await? else {
                    println!("Paste cancelled");
                    return Ok(());
                };
                match self.session.paste_names(start, &text) {
                    Ok(count) => {
                        println!("Pasted {count} names");
                        println!("{}", display::plan_table(self.session.plan()));
                    }
                    Err(e) => println!("{e}"),
                }
            }
            Command::Clear(indices) => match self.session.clear_targets(&indices) {
                Ok(count) => println!("Cleared {count} names"),
                Err(e) => println!("{e}"),
            },
            Command::Undo => self.step_history(true),
            Command::Redo => self.step_history(false),
            Command::Run => self.run_plan().await?,
            Command::Reset => {
                self.session.clear();
                self.save_settings();
                println!("Cleared");
            }
            Command::Quit => {}
        }
        Ok(())
    }

    fn load(&mut self) {
        match self.session.load_files() {
            Ok(count) => {
                println!("Loaded {count} files");
                println!("{}", display::plan_table(self.session.plan()));
            }
            Err(e) => println!("{e}"),
        }
    }

    fn step_history(&mut self, undo: bool) {
        let changed = if undo {
            let description = self.session.history().peek_undo().map(|a| a.description());
            let changed = self.session.undo();
            if let Some(description) = description.filter(|_| changed) {
                println!("Undid: {description}");
            }
            changed
        } else {
            self.session.redo()
        };
        if changed {
            println!("{}", display::plan_table(self.session.plan()));
        } else {
            println!("Nothing to {}", if undo { "undo" } else { "redo" });
        }
    }

    async fn run_plan(&mut self) -> Result<()> {
        let check = match self.session.check_ready() {
            Ok(check) => check,
            Err(e) => {
                println!("{e}");
                return Ok(());
            }
        };

        if check.has_unnamed() && !self.assume_yes {
            println!(
                "Total files: {}, with a new name: {}. Files without a new name are skipped.",
                check.total, check.named
            );
            if !self.confirm("Continue? [y/N] ").await? {
                return Ok(());
            }
        }

        let handle = match self
            .engine
            .start(self.session.plan(), &check.input_dir, &check.output_dir)
        {
            Ok(Some(handle)) => handle,
            Ok(None) => {
                println!("A run is already in progress");
                return Ok(());
            }
            Err(e) => {
                println!("{e}");
                return Ok(());
            }
        };

        println!("Copying {} files to {}", check.total, check.output_dir.display());
        let summary = self.drive(handle).await?;
        println!("{}", summary.summary());
        Ok(())
    }

    /// Follow a run until it finishes. Ctrl-C cancels it.
    async fn drive(&mut self, mut handle: RunHandle) -> Result<RunSummary> {
        let cancel = handle.cancel_token();
        let interrupts = watch_interrupts(cancel.clone());
        let result = self.pump_events(&mut handle, &cancel).await;
        interrupts.abort();
        result
    }

    async fn pump_events(
        &mut self,
        handle: &mut RunHandle,
        cancel: &CancellationToken,
    ) -> Result<RunSummary> {
        loop {
            let stdin_open = self.stdin_open;
            let wakeup = tokio::select! {
                event = handle.recv() => Wakeup::Event(event),
                line = self.lines.next_line(), if stdin_open => Wakeup::Input(line?),
            };

            match wakeup {
                Wakeup::Event(Some(event)) => {
                    if let Some(summary) = self.handle_event(event, cancel).await? {
                        return Ok(summary);
                    }
                }
                Wakeup::Event(None) => bail!("run ended without a summary"),
                Wakeup::Input(Some(line)) => {
                    if line.trim() == "stop" {
                        println!("Stopping after the current file...");
                        handle.cancel();
                    }
                }
                Wakeup::Input(None) => self.stdin_open = false,
            }
        }
    }

    async fn handle_event(
        &mut self,
        event: RenameEvent,
        cancel: &CancellationToken,
    ) -> Result<Option<RunSummary>> {
        match event {
            RenameEvent::Started { total } => tracing::debug!(total, "run started"),
            RenameEvent::Progress(progress) => println!("{}", display::progress_line(&progress)),
            RenameEvent::ItemUpdated(update) => {
                self.session.apply_update(&update)?;
                self.print_item(update.index);
            }
            RenameEvent::Conflict(request) => {
                println!("{}", display::conflict_text(request.conflict()));
                let resolution = self.ask_resolution(cancel).await?;
                request.respond(resolution);
            }
            RenameEvent::Finished(summary) => return Ok(Some(summary)),
        }
        Ok(None)
    }

    /// Ask how to resolve a conflict. A stop request while waiting cancels the run.
    async fn ask_resolution(&mut self, cancel: &CancellationToken) -> Result<ConflictResolution> {
        loop {
            let answer = tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    println!();
                    return Ok(ConflictResolution::CancelAll);
                }
                answer = self.prompt(CONFLICT_PROMPT) => answer?,
            };
            let Some(answer) = answer else {
                return Ok(ConflictResolution::Skip);
            };
            if let Some(resolution) = parse_resolution(&answer) {
                return Ok(resolution);
            }
        }
    }

    async fn confirm(&mut self, question: &str) -> Result<bool> {
        let answer = self.prompt_interruptible(question).await?.unwrap_or_default();
        Ok(matches!(answer.trim(), "y" | "Y" | "yes"))
    }

    /// Read lines until a line containing only `.` or end of input.
    ///
    /// Returns `None` if interrupted with Ctrl-C.
    async fn read_block(&mut self) -> Result<Option<String>> {
        println!("Paste names, one per line. End with a line containing only '.'");
        let mut text = String::new();
        loop {
            let line = tokio::select! {
                line = self.next_line() => line?,
                _ = tokio::signal::ctrl_c() => return Ok(None),
            };
            match line {
                Some(line) if line.trim() != "." => {
                    text.push_str(&line);
                    text.push('\n');
                }
                _ => return Ok(Some(text)),
            }
        }
    }

    /// Like `prompt`, but Ctrl-C reads as end of input.
    async fn prompt_interruptible(&mut self, text: &str) -> Result<Option<String>> {
        tokio::select! {
            line = self.prompt(text) => line,
            _ = tokio::signal::ctrl_c() => {
                println!();
                Ok(None)
            }
        }
    }

    async fn prompt(&mut self, text: &str) -> Result<Option<String>> {
        print!("{text}");
        std::io::stdout().flush()?;
        self.next_line().await
    }

    async fn next_line(&mut self) -> Result<Option<String>> {
        if !self.stdin_open {
            return Ok(None);
        }
        let line = self.lines.next_line().await?;
        if line.is_none() {
            self.stdin_open = false;
        }
        Ok(line)
    }

    fn print_item(&self, index: usize) {
        if let Some(item) = self.session.plan().get(index) {
            println!("{}", display::item_line(index, item));
        }
    }

    fn save_settings(&self) {
        if let Err(e) = self.session.settings().save() {
            tracing::warn!("Failed to save settings: {}", e);
        }
    }

    fn folders_text(&self) -> String {
        let show = |dir: Option<&std::path::Path>| {
            dir.map(|d| d.display().to_string())
                .unwrap_or_else(|| "(not set)".to_string())
        };
        format!(
            "Input:  {}\nOutput: {}",
            show(self.session.input_dir()),
            show(self.session.output_dir())
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::time::Duration;

    use tempfile::TempDir;
    use tokio::io::{AsyncWriteExt, DuplexStream};

    fn conflicting_session(input: &TempDir, output: &TempDir) -> Session {
        for name in ["a.txt", "b.txt"] {
            fs::write(input.path().join(name), "new").unwrap();
            fs::write(output.path().join(name), "old").unwrap();
        }
        let mut session = Session::new();
        session.set_input_dir(input.path());
        session.set_output_dir(output.path());
        session.load_files().unwrap();
        session
    }

    fn shell(session: Session, keyboard: DuplexStream) -> Shell<BufReader<DuplexStream>> {
        Shell::with_input(session, RenameEngine::default(), true, BufReader::new(keyboard))
    }

    #[tokio::test]
    async fn test_stop_while_conflict_prompt_is_open() {
        let input = TempDir::new().unwrap();
        let output = TempDir::new().unwrap();
        // Nothing is ever typed, so the first conflict prompt stays open
        let (_keyboard, stdin) = tokio::io::duplex(64);
        let mut shell = shell(conflicting_session(&input, &output), stdin);

        let mut handle = shell
            .engine
            .start(shell.session.plan(), input.path(), output.path())
            .unwrap()
            .unwrap();
        let cancel = handle.cancel_token();
        tokio::spawn({
            let cancel = cancel.clone();
            async move {
                tokio::time::sleep(Duration::from_millis(50)).await;
                cancel.cancel();
            }
        });

        let summary = shell.pump_events(&mut handle, &cancel).await.unwrap();

        assert!(summary.is_cancelled());
        assert_eq!(summary.processed(), 0);
        assert_eq!(fs::read_to_string(output.path().join("a.txt")).unwrap(), "old");
        assert_eq!(fs::read_to_string(output.path().join("b.txt")).unwrap(), "old");
        assert!(!shell.engine.is_running());
    }

    #[tokio::test]
    async fn test_stop_request_wins_over_typed_answer() {
        let (mut keyboard, stdin) = tokio::io::duplex(64);
        keyboard.write_all(b"o\n").await.unwrap();
        let mut shell = shell(Session::new(), stdin);

        let cancel = CancellationToken::new();
        cancel.cancel();
        assert_eq!(
            shell.ask_resolution(&cancel).await.unwrap(),
            ConflictResolution::CancelAll
        );

        // The typed answer is still there for an uncancelled prompt
        assert_eq!(
            shell.ask_resolution(&CancellationToken::new()).await.unwrap(),
            ConflictResolution::Overwrite
        );
    }

    #[tokio::test]
    async fn test_end_of_input_at_conflict_prompt_skips() {
        let (keyboard, stdin) = tokio::io::duplex(64);
        drop(keyboard);
        let mut shell = shell(Session::new(), stdin);

        assert_eq!(
            shell.ask_resolution(&CancellationToken::new()).await.unwrap(),
            ConflictResolution::Skip
        );
    }

    #[test]
    fn test_parse_commands() {
        assert_eq!(Command::parse("  "), Ok(None));
        assert_eq!(Command::parse("ls"), Ok(Some(Command::List)));
        assert_eq!(
            Command::parse("input /tmp/my photos"),
            Ok(Some(Command::Input(PathBuf::from("/tmp/my photos"))))
        );
        assert_eq!(
            Command::parse("set 2 holiday 01.jpg"),
            Ok(Some(Command::Set(1, "holiday 01.jpg".to_string())))
        );
        assert_eq!(
            Command::parse("set 3"),
            Ok(Some(Command::Set(2, String::new())))
        );
        assert_eq!(Command::parse("paste"), Ok(Some(Command::Paste(0))));
        assert_eq!(Command::parse("paste 4"), Ok(Some(Command::Paste(3))));
        assert_eq!(
            Command::parse("clear 1 3"),
            Ok(Some(Command::Clear(vec![0, 2])))
        );
    }

    #[test]
    fn test_parse_errors() {
        assert!(Command::parse("input").is_err());
        assert!(Command::parse("set 0 name").is_err());
        assert!(Command::parse("set x name").is_err());
        assert!(Command::parse("clear").is_err());
        assert!(Command::parse("frobnicate").is_err());
    }

    #[test]
    fn test_parse_resolution() {
        assert_eq!(parse_resolution("o"), Some(ConflictResolution::Overwrite));
        assert_eq!(parse_resolution(" s "), Some(ConflictResolution::Skip));
        assert_eq!(parse_resolution("a"), Some(ConflictResolution::OverwriteAll));
        assert_eq!(parse_resolution("k"), Some(ConflictResolution::SkipAll));
        assert_eq!(parse_resolution("c"), Some(ConflictResolution::CancelAll));
        assert_eq!(parse_resolution("maybe"), None);
    }
}
