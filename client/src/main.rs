//! Terminal shell around the game client: join a server, chat, guess and
//! start rounds from stdin. Drawing needs a pointer, so this shell is for
//! guessing, spectating and protocol debugging.

use std::io::BufRead;
use std::thread;

use clap::Parser;
use crossbeam_channel::{unbounded, Receiver};
use tracing::error;

use scrawl_client::app::GameApp;
use scrawl_client::config::{DEFAULT_SERVER_PORT, FRAME_INTERVAL};

#[derive(Parser, Debug)]
#[clap(author, version, about, long_about = None)]
struct Args {
    #[clap(short, long, value_parser, default_value = "127.0.0.1")]
    address: String,
    #[clap(short, long, value_parser, default_value_t = DEFAULT_SERVER_PORT)]
    port: u16,
    #[clap(short, long, value_parser, default_value = "Player")]
    name: String,
}

fn main() {
    tracing_subscriber::fmt::init();
    let args = Args::parse();

    let mut app = GameApp::new();
    let addr = format!("{}:{}", args.address, args.port);
    if let Err(err) = app.connect(&addr, &args.name) {
        error!(error = %err, "could not connect");
        std::process::exit(1);
    }
    println!(
        "Connected to {} as {}. Type /start to begin a round, /quit to leave.",
        addr, args.name
    );

    let lines = spawn_stdin_reader();
    let mut printed = 0;

    loop {
        app.pump();

        for line in &app.state.chat_log[printed..] {
            println!("{line}");
        }
        printed = app.state.chat_log.len();

        if let Some(text) = app.state.notification.clone() {
            println!("*** {text} ***");
            app.dismiss_notification();
        }

        loop {
            match lines.try_recv() {
                Ok(Some(line)) => {
                    let line = line.trim().to_string();
                    if line == "/quit" {
                        return;
                    }
                    app.submit_chat(&line);
                }
                // stdin closed; nothing more to submit.
                Ok(None) => return,
                Err(_) => break,
            }
        }

        if !app.is_alive() {
            println!("Connection closed.");
            return;
        }
        thread::sleep(FRAME_INTERVAL);
    }
}

/// Forwards stdin lines to the frame loop; `None` marks end of input.
fn spawn_stdin_reader() -> Receiver<Option<String>> {
    let (tx, rx) = unbounded();
    thread::spawn(move || {
        let stdin = std::io::stdin();
        for line in stdin.lock().lines() {
            match line {
                Ok(line) => {
                    if tx.send(Some(line)).is_err() {
                        return;
                    }
                }
                Err(_) => break,
            }
        }
        let _ = tx.send(None);
    });
    rx
}
