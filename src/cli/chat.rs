use anyhow::Result;
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;

use crate::ai::chat::{ChatError, History};
use crate::api::AppState;
use crate::core::CorpusSource;

use super::serve::config_with;

pub async fn run(corpus: Option<CorpusSource>) -> Result<()> {
    let mut rl = DefaultEditor::new()?;
    let state = AppState::initialize(config_with(corpus)).await?;

    // Plays the part of the browser: holds the history between turns
    let mut history = History::new();

    loop {
        let readline = rl.readline(">>> ");
        match readline {
            Ok(line) => {
                match state.chat.respond(&line, &history).await {
                    Ok(turn) => {
                        println!("{}\n", turn.reply);
                        for (i, followup) in turn.followups.iter().enumerate() {
                            println!("  {}. {}", i + 1, followup);
                        }
                        history = turn.history;
                    }
                    Err(ChatError::Validation) => continue,
                    Err(err) => println!("Error: {}", err),
                }
                let _ = rl.add_history_entry(line.as_str());
            }
            Err(ReadlineError::Interrupted) => break,
            Err(ReadlineError::Eof) => break,
            Err(err) => {
                println!("Error: {:?}", err);
                break;
            }
        }
    }

    Ok(())
}
