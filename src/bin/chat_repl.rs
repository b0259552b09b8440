//! Minimal terminal client for a running relay.
//!
//! Usage: `chat_repl [base-url]`. Reads lines from stdin and streams the reply
//! to stdout. Ctrl-C stops the current reply without exiting.

use anyhow::Result;
use chat_relay::client::{CancelHandle, ChatClient, ClientError, TerminalView};
use std::io::Write;
use tokio::io::{AsyncBufReadExt, BufReader};

#[tokio::main]
async fn main() -> Result<()> {
    let base_url = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "http://127.0.0.1:3000".to_string());
    let model = std::env::var("CHAT_MODEL")
        .unwrap_or_else(|_| "deepseek/deepseek-chat-v3.1:free".to_string());

    let client = ChatClient::new(&base_url);
    let mut view = TerminalView::new();
    let mut input = BufReader::new(tokio::io::stdin()).lines();

    println!("chat-relay repl at {base_url} ({model}); Ctrl-C stops the current reply");

    loop {
        print!("> ");
        std::io::stdout().flush()?;
        let Some(line) = input.next_line().await? else {
            break;
        };

        let cancel = CancelHandle::new();
        let abort = cancel.clone();
        let ctrl_c = tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                abort.cancel();
            }
        });

        match client.send(&line, &model, &mut view, &cancel).await {
            Ok(_) => {}
            Err(ClientError::EmptyInput) => {} // blank line, nothing to do
        }
        ctrl_c.abort();
    }

    Ok(())
}
