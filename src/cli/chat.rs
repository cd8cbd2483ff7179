use std::sync::Arc;

use anyhow::Result;
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;

use crate::ai::conversation::{Conversation, Mode, SessionState};
use crate::core::{AppConfig, logging};
use crate::gemini::GeminiClient;

enum Next {
    Continue,
    Restart,
    Quit,
}

fn start(conversation: &Conversation, session: &mut SessionState, mode: Mode) -> Result<()> {
    session.reset();
    conversation.start(session, mode)?;
    if let Some(turn) = session.transcript.last() {
        println!("\n{}\n", turn.text);
    }
    Ok(())
}

/// Extracts and prints the brief, then asks what to do next. Loops
/// on retry so a failed extraction can be attempted again.
async fn finish(
    rl: &mut DefaultEditor,
    conversation: &Conversation,
    session: &SessionState,
) -> Result<Next> {
    loop {
        println!("Preparing your style brief...\n");
        match conversation.extract_brief(session).await {
            Ok(brief) => println!("{}\n", brief.to_text()),
            Err(err) => println!("Error: {}\n", err),
        }

        let choice = match rl.readline("(r)etry brief, (n)ew session, (q)uit > ") {
            Ok(line) => line.trim().to_lowercase(),
            Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => return Ok(Next::Quit),
            Err(err) => return Err(err.into()),
        };
        match choice.as_str() {
            "r" | "retry" => continue,
            "n" | "new" => return Ok(Next::Restart),
            _ => return Ok(Next::Quit),
        }
    }
}

pub async fn run(mode: Mode) -> Result<()> {
    logging::init(&format!("{}=warn", env!("CARGO_CRATE_NAME")));

    let config = AppConfig::from_env()?;
    let client = GeminiClient::from_config(&config)?;
    let conversation = Conversation::new(Arc::new(client)).threshold(config.turn_threshold);

    let mut rl = DefaultEditor::new()?;
    let mut session = SessionState::new();
    start(&conversation, &mut session, mode)?;

    loop {
        let next = if session.is_finished() {
            finish(&mut rl, &conversation, &session).await?
        } else {
            match rl.readline(">>> ") {
                Ok(line) => match line.trim() {
                    "/quit" => Next::Quit,
                    "/restart" => Next::Restart,
                    "" => Next::Continue,
                    text => {
                        let _ = rl.add_history_entry(text);
                        match conversation.submit(&mut session, text).await {
                            Ok(reply) => println!("\n{}\n", reply),
                            Err(err) => println!("Error: {}", err),
                        }
                        Next::Continue
                    }
                },
                Err(ReadlineError::Interrupted) => Next::Quit,
                Err(ReadlineError::Eof) => Next::Quit,
                Err(err) => {
                    println!("Error: {:?}", err);
                    Next::Quit
                }
            }
        };

        match next {
            Next::Continue => {}
            Next::Restart => start(&conversation, &mut session, mode)?,
            Next::Quit => break,
        }
    }

    Ok(())
}
