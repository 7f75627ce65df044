//! Interactive conversation loop.

use std::io::Write;

use nepisirsem_session::Session;
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;
use tracing::warn;

use crate::assistant::RecipeAssistant;

pub const GREETING: &str = "Merhaba! Ben Akıllı Yemek Asistanıyım. Hangi tarifi arıyorsun ya da \
elinde hangi malzemeler var? Sana süresiyle birlikte yardımcı olabilirim.";

pub const FAREWELL: &str = "Ne Pişirsem sonlandırılıyor. Afiyet olsun!";

const PROMPT: &str = "\nSenin Sorun: ";
const ANSWER_LABEL: &str = "Ne Pişirsem Asistan Cevabı:";
const HISTORY_COMMAND: &str = "/gecmis";

/// Words that end the conversation, compared case-insensitively. The dotless
/// and ASCII spellings of "çıkış" are accepted too.
const EXIT_WORDS: [&str; 6] = ["çıkış", "çikiş", "cikis", "exit", "kapat", "quit"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConsoleCommand {
    Exit,
    Empty,
    History,
    Question(String),
}

pub fn parse_input(line: &str) -> ConsoleCommand {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return ConsoleCommand::Empty;
    }
    let lowered = trimmed.to_lowercase();
    if EXIT_WORDS.contains(&lowered.as_str()) {
        ConsoleCommand::Exit
    } else if lowered == HISTORY_COMMAND {
        ConsoleCommand::History
    } else {
        ConsoleCommand::Question(trimmed.to_string())
    }
}

/// Whether the loop should keep reading input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Stop,
}

pub fn print_history(session: &Session, out: &mut impl Write) -> std::io::Result<()> {
    for turn in session.history() {
        writeln!(out, "[{}] {}: {}", turn.timestamp.format("%H:%M"), turn.role, turn.text)?;
    }
    Ok(())
}

/// Handle one line of input, writing everything meant for the user to `out`.
///
/// A failed question is reported and the conversation continues.
pub async fn handle_line(
    assistant: &RecipeAssistant,
    session: &mut Session,
    line: &str,
    out: &mut impl Write,
) -> std::io::Result<Flow> {
    match parse_input(line) {
        ConsoleCommand::Exit => {
            writeln!(out, "{FAREWELL}")?;
            Ok(Flow::Stop)
        }
        ConsoleCommand::Empty => Ok(Flow::Continue),
        ConsoleCommand::History => {
            print_history(session, out)?;
            Ok(Flow::Continue)
        }
        ConsoleCommand::Question(question) => {
            match assistant.respond(session, &question).await {
                Ok(answer) => writeln!(out, "{ANSWER_LABEL}\n{}", answer.answer)?,
                Err(e) => {
                    warn!(error = %e, "question failed");
                    writeln!(out, "Hata oluştu: {e}")?;
                }
            }
            Ok(Flow::Continue)
        }
    }
}

/// Run the conversation on the terminal until an exit word, Ctrl-C or Ctrl-D.
pub async fn run_console(assistant: &RecipeAssistant, session: &mut Session) -> anyhow::Result<()> {
    let mut editor = DefaultEditor::new()?;
    let mut stdout = std::io::stdout();

    writeln!(stdout, "\n--- Ne Pişirsem BAŞLATILDI ---")?;
    writeln!(stdout, "Sohbeti sonlandırmak için 'çıkış' yazın, geçmiş için '{HISTORY_COMMAND}'.")?;
    if let Some(greeting) = session.last() {
        writeln!(stdout, "\n{}: {}", greeting.role, greeting.text)?;
    }

    loop {
        match editor.readline(PROMPT) {
            Ok(line) => {
                if !line.trim().is_empty() {
                    let _ = editor.add_history_entry(line.as_str());
                }
                if handle_line(assistant, session, &line, &mut stdout).await? == Flow::Stop {
                    break;
                }
            }
            Err(ReadlineError::Interrupted | ReadlineError::Eof) => {
                writeln!(stdout, "{FAREWELL}")?;
                break;
            }
            Err(e) => return Err(e.into()),
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use nepisirsem_session::Role;

    #[test]
    fn exit_words_are_case_insensitive() {
        for word in ["çıkış", "Çıkış", "EXIT", " kapat ", "quit", "cikis"] {
            assert_eq!(parse_input(word), ConsoleCommand::Exit, "{word}");
        }
    }

    #[test]
    fn blank_history_and_questions() {
        assert_eq!(parse_input("   "), ConsoleCommand::Empty);
        assert_eq!(parse_input("/GECMIS"), ConsoleCommand::History);
        assert_eq!(
            parse_input("  Menemen tarifi nedir? "),
            ConsoleCommand::Question("Menemen tarifi nedir?".to_string())
        );
        assert_eq!(parse_input("çıkış yap"), ConsoleCommand::Question("çıkış yap".to_string()));
    }

    #[test]
    fn history_lists_turns_with_roles() {
        let mut session = Session::with_greeting(GREETING);
        session.append(Role::User, "merhaba");
        let mut out = Vec::new();
        print_history(&session, &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("Asistan: Merhaba! Ben Akıllı Yemek Asistanıyım."));
        assert!(text.contains("Sen: merhaba"));
    }
}
