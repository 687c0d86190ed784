//! Interactive journal: every line typed is an entry, triggers are printed
//! as their guidance arrives.

use anyhow::{Context, Result};
use coherence_core::Trigger;
use coherence_session::CoherenceSession;
use coherence_store::Store;
use tokio::io::{AsyncBufReadExt, BufReader};

const HELP: &str = "commands: :score  :clear (dismiss suggestion)  :ack (acknowledge)  :quit";

enum Command<'a> {
    Entry(&'a str),
    Score,
    Clear,
    Ack,
    Help,
    Quit,
    Unknown(&'a str),
}

fn parse(line: &str) -> Option<Command<'_>> {
    let line = line.trim();
    if line.is_empty() {
        return None;
    }
    Some(match line {
        ":score" => Command::Score,
        ":clear" => Command::Clear,
        ":ack" => Command::Ack,
        ":help" => Command::Help,
        ":quit" | ":q" => Command::Quit,
        other if other.starts_with(':') => Command::Unknown(other),
        text => Command::Entry(text),
    })
}

pub async fn run(mut store: Store, session: CoherenceSession) -> Result<()> {
    store.subscribe(session.listener());
    let mut triggers = session.subscribe();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    println!("score: {:.2}", session.current_score());
    println!("{HELP}");

    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line.context("failed to read stdin")? else {
                    break;
                };
                match parse(&line) {
                    None => {}
                    Some(Command::Entry(text)) => {
                        store.append(text).context("failed to append entry")?;
                        println!("score: {:.2}", session.current_score());
                    }
                    Some(Command::Score) => {
                        println!("score: {:.2}", session.current_score());
                        let remaining = session.cooldown_remaining_ms();
                        if remaining > 0 {
                            println!("cooldown: {}s", (remaining + 999) / 1000);
                        }
                    }
                    Some(Command::Clear) => session.clear_suggestion(),
                    Some(Command::Ack) => session.acknowledge(),
                    Some(Command::Help) => println!("{HELP}"),
                    Some(Command::Quit) => break,
                    Some(Command::Unknown(cmd)) => println!("unknown command {cmd}; {HELP}"),
                }
            }
            changed = triggers.changed() => {
                if changed.is_err() {
                    break;
                }
                let trigger = triggers.borrow_and_update().clone();
                print_arrival(&trigger);
            }
            _ = tokio::signal::ctrl_c() => break,
        }
    }

    session.dispose();
    Ok(())
}

fn print_arrival(trigger: &Trigger) {
    match trigger {
        Trigger::None => {}
        Trigger::Suggestion { text } => println!("suggestion: {text}"),
        Trigger::DissonanceEvent { practice_text } => {
            println!("dissonance: {practice_text}");
            println!("(type :ack when done)");
        }
    }
}
