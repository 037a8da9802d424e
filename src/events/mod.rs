//! Command input for Cryptoton.
//!
//! Reads line commands from stdin and forwards them as actions.

mod input;

pub use input::{HELP, parse_command};

use crate::state::Action;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tracing::warn;

/// Reads stdin line by line and dispatches parsed actions.
pub struct InputLoop {
    action_tx: mpsc::UnboundedSender<Action>,
}

impl InputLoop {
    /// Create an input loop dispatching to `action_tx`.
    pub fn new(action_tx: mpsc::UnboundedSender<Action>) -> Self {
        Self { action_tx }
    }

    /// Start reading stdin. End of input dispatches `Quit`.
    pub fn start(self) -> tokio::task::JoinHandle<()> {
        tokio::spawn(async move {
            let mut lines = BufReader::new(tokio::io::stdin()).lines();

            loop {
                let line = match lines.next_line().await {
                    Ok(Some(line)) => line,
                    Ok(None) => break,
                    Err(e) => {
                        warn!("Failed to read input: {}", e);
                        break;
                    }
                };

                match parse_command(&line) {
                    Ok(Some(action)) => {
                        if self.action_tx.send(action).is_err() {
                            return;
                        }
                    }
                    Ok(None) => {}
                    Err(e) => {
                        warn!("{}", e);
                        eprintln!("{}\n{}", e, HELP);
                    }
                }
            }

            let _ = self.action_tx.send(Action::Quit);
        })
    }
}
