//! Operator keys from stdin
//!
//! Enter is the click on the dot. `+`/`-` trim the pen height, `q` quits.
//! End of input is reported as [`Input::EndOfInput`]; the session decides
//! whether that stops playback.

use std::io::{self, BufRead};
use std::sync::mpsc::SyncSender;
use std::thread::{self, JoinHandle};

use tracing::{debug, warn};

use super::{Input, Z_SHIFT_STEP};

/// Map one input line to an operator action
pub fn parse_key(line: &str) -> Option<Input> {
    match line.trim() {
        "" => Some(Input::Click),
        "+" => Some(Input::ZShift(Z_SHIFT_STEP)),
        "-" => Some(Input::ZShift(-Z_SHIFT_STEP)),
        "q" | "quit" => Some(Input::Quit),
        _ => None,
    }
}

/// Forward stdin lines to the session loop until quit or end of input
pub fn spawn_stdin(tx: SyncSender<Input>) -> io::Result<JoinHandle<()>> {
    thread::Builder::new()
        .name("operator-stdin".into())
        .spawn(move || {
            let stdin = io::stdin();
            for line in stdin.lock().lines() {
                let line = match line {
                    Ok(line) => line,
                    Err(e) => {
                        warn!("stdin read failed: {}", e);
                        break;
                    }
                };
                match parse_key(&line) {
                    Some(input) => {
                        let quit = input == Input::Quit;
                        if tx.send(input).is_err() || quit {
                            return;
                        }
                    }
                    None => debug!("unknown key {:?}", line.trim()),
                }
            }
            debug!("stdin closed");
            let _ = tx.send(Input::EndOfInput);
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_key() {
        assert_eq!(parse_key(""), Some(Input::Click));
        assert_eq!(parse_key("  \r"), Some(Input::Click));
        assert_eq!(parse_key("+"), Some(Input::ZShift(0.02)));
        assert_eq!(parse_key("-"), Some(Input::ZShift(-0.02)));
        assert_eq!(parse_key("q"), Some(Input::Quit));
        assert_eq!(parse_key("x"), None);
    }
}
