//! Line-based interactive loop over stdin/stdout.

use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tracing::info;

use crate::agent::RagAgent;
use crate::llm::ChatModel;
use crate::message::Message;
use crate::types::RagError;

/// `true` when the input is a session-ending sentinel (case-insensitive
/// "exit" or "quit", surrounding whitespace ignored).
pub fn is_exit_command(input: &str) -> bool {
    let trimmed = input.trim();
    trimmed.eq_ignore_ascii_case("exit") || trimmed.eq_ignore_ascii_case("quit")
}

/// Reads one question per line, runs a full machine invocation over the
/// accumulated history, and prints the final answer.
///
/// History lives only for the life of the process. Sentinel inputs terminate
/// the loop without invoking the machine.
pub async fn run<M: ChatModel>(agent: &RagAgent<M>) -> Result<(), RagError> {
    let stdin = BufReader::new(tokio::io::stdin());
    let mut stdout = tokio::io::stdout();
    let mut lines = stdin.lines();
    let mut history: Vec<Message> = Vec::new();

    stdout.write_all(b"=== RESUME AGENT ===\n").await?;

    loop {
        stdout.write_all(b"\nWhat is your question: ").await?;
        stdout.flush().await?;

        let Some(line) = lines.next_line().await? else {
            break;
        };
        if is_exit_command(&line) {
            info!("session ended by user");
            break;
        }
        if line.trim().is_empty() {
            continue;
        }

        history.push(Message::user(line.trim()));
        let answer = agent.run_turn(&mut history).await?;

        stdout.write_all(b"\n=== ANSWER ===\n").await?;
        stdout.write_all(answer.as_bytes()).await?;
        stdout.write_all(b"\n").await?;
        stdout.flush().await?;
    }

    Ok(())
}
