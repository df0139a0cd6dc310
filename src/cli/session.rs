//! Read-eval loop over an async line source
//!
//! The session owns the history and re-encodes it for every exchange, so the
//! orchestrator itself stays stateless.

use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tracing::{debug, info};

use crate::chat::ChatOrchestrator;
use crate::conversation::History;

pub const PROMPT: &str = "You: ";
pub const REPLY_PREFIX: &str = "Assistant: ";
pub const EXIT_COMMAND: &str = "exit";

pub struct ChatSession {
    chat: ChatOrchestrator,
    history: History,
}

impl ChatSession {
    pub fn new(chat: ChatOrchestrator) -> Self {
        Self {
            chat,
            history: History::new(),
        }
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    pub fn banner(&self) -> String {
        format!(
            "flightdesk {} (model: {}). Ask about flights and ticket prices, type '{}' to quit.\n",
            crate::VERSION,
            self.chat.options().model,
            EXIT_COMMAND
        )
    }

    /// Runs until `exit` or end of input. Blank lines are skipped.
    pub async fn run<R, W>(&mut self, input: R, output: &mut W) -> std::io::Result<()>
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        output.write_all(self.banner().as_bytes()).await?;

        let mut lines = input.lines();
        loop {
            output.write_all(PROMPT.as_bytes()).await?;
            output.flush().await?;

            let Some(line) = lines.next_line().await? else {
                debug!("End of input");
                output.write_all(b"\n").await?;
                break;
            };

            let user_text = line.trim();
            if user_text.eq_ignore_ascii_case(EXIT_COMMAND) {
                break;
            }
            if user_text.is_empty() {
                continue;
            }

            let reply = self.chat.chat(user_text, &self.history.encode()).await;
            output
                .write_all(format!("{}{}\n\n", REPLY_PREFIX, reply).as_bytes())
                .await?;
            self.history.push(user_text, reply);
        }

        output.flush().await?;
        info!(exchanges = self.history.len(), "Session ended");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::{MockLLMClient, MockResponse};
    use crate::tools::{FunctionExecutor, ToolRegistry};
    use std::sync::Arc;

    fn session_with(client: Arc<MockLLMClient>) -> ChatSession {
        let executor = FunctionExecutor::new(Arc::new(ToolRegistry::empty()));
        ChatSession::new(ChatOrchestrator::new(client, executor))
    }

    #[tokio::test]
    async fn test_exit_is_case_insensitive() {
        let client = Arc::new(MockLLMClient::new());
        let mut session = session_with(Arc::clone(&client));

        let mut output = Vec::new();
        session.run(&b"EXIT\nhello\n"[..], &mut output).await.unwrap();

        assert!(client.requests().is_empty());
        assert!(session.history().is_empty());
    }

    #[tokio::test]
    async fn test_replies_are_printed_and_remembered() {
        let client = Arc::new(MockLLMClient::new());
        client.add_responses([MockResponse::text("你好!"), MockResponse::text("再见")]);
        let mut session = session_with(Arc::clone(&client));

        let mut output = Vec::new();
        session
            .run(&b"hi\n\n  bye  \nexit\n"[..], &mut output)
            .await
            .unwrap();

        let printed = String::from_utf8(output).unwrap();
        assert!(printed.contains("Assistant: 你好!\n"));
        assert!(printed.contains("Assistant: 再见\n"));
        assert_eq!(session.history().len(), 2);
        assert_eq!(session.history().exchanges()[1].user(), "bye");

        // Second request replays the first exchange
        let requests = client.requests();
        assert_eq!(requests.len(), 2);
        assert_eq!(requests[1].messages.len(), 4);
    }

    #[tokio::test]
    async fn test_end_of_input_quits() {
        let client = Arc::new(MockLLMClient::new());
        client.add_response(MockResponse::text("ok"));
        let mut session = session_with(client);

        let mut output = Vec::new();
        session.run(&b"question"[..], &mut output).await.unwrap();

        assert_eq!(session.history().len(), 1);
        assert!(String::from_utf8(output).unwrap().starts_with("flightdesk "));
    }
}
