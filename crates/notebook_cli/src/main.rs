//! Interactive text-menu client for the notebook server.
//!
//! # Responsibility
//! - Collect menu choices and fields from stdin.
//! - Issue the matching HTTP request and print the server's answer.

mod client;
mod menu;

use client::{NotebookClient, Reply};
use menu::{parse_action, MenuAction, MENU_PROMPT};
use std::io::{self, BufRead, Write};
use std::process::ExitCode;

const DEFAULT_SERVER_URL: &str = "http://localhost:8080";

fn main() -> ExitCode {
    dotenvy::dotenv().ok();
    let server_url = std::env::var("NOTEBOOK_SERVER_URL")
        .ok()
        .filter(|value| !value.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_SERVER_URL.to_string());

    let client = match NotebookClient::new(&server_url) {
        Ok(client) => client,
        Err(err) => {
            eprintln!("{err}");
            return ExitCode::FAILURE;
        }
    };

    let stdin = io::stdin();
    let mut input = stdin.lock();
    loop {
        let Some(line) = prompt(&mut input, MENU_PROMPT) else {
            break;
        };
        match parse_action(&line) {
            Some(MenuAction::Exit) => break,
            Some(action) => {
                if run_action(&client, &mut input, action).is_none() {
                    break;
                }
            }
            None => println!("Invalid input."),
        }
    }
    ExitCode::SUCCESS
}

/// Runs one action; `None` means stdin closed mid-prompt.
fn run_action(client: &NotebookClient, input: &mut impl BufRead, action: MenuAction) -> Option<()> {
    match action {
        MenuAction::Add => {
            let topic = prompt(input, "Input the topic: ")?;
            let name = prompt(input, "Input the note's name: ")?;
            let text = prompt(input, "Input the text of the note: ")?;
            print_reply(client.add_note(&topic, &name, &text));
        }
        MenuAction::Get => {
            let topic = prompt(input, "Input the topic to retrieve: ")?;
            match client.get_notes(&topic) {
                Ok(notes) => {
                    for note in notes {
                        println!("{}: {} (Timestamp: {})\n", note.name, note.text, note.timestamp);
                    }
                }
                Err(message) => println!("Error: {message}\n"),
            }
        }
        MenuAction::Delete => {
            let topic = prompt(input, "Input the topic of the note to delete: ")?;
            let name = prompt(input, "Input the name of the note to delete: ")?;
            print_reply(client.delete_note(&topic, &name));
        }
        MenuAction::DeleteAll => {
            let topic = prompt(input, "Input the topic to delete all notes from: ")?;
            print_reply(client.delete_all_notes(&topic));
        }
        MenuAction::Wiki => {
            let topic = prompt(input, "Input the topic to append search links to: ")?;
            let term = prompt(input, "Input the search term: ")?;
            print_reply(client.add_links(&topic, &term));
        }
        MenuAction::Topics => match client.list_topics() {
            Ok(topics) if topics.is_empty() => println!("No topics yet.\n"),
            Ok(topics) => {
                for topic in topics {
                    println!("{} ({} notes)", topic.name, topic.note_count);
                }
                println!();
            }
            Err(message) => println!("Error: {message}\n"),
        },
        MenuAction::Exit => {}
    }
    Some(())
}

fn print_reply(reply: Result<Reply, String>) {
    match reply {
        Ok(reply) => {
            let prefix = if reply.ok { "" } else { "Error: " };
            println!("{prefix}{}", reply.message);
            for url in reply.urls {
                println!("  {url}");
            }
            println!();
        }
        Err(message) => println!("Error: {message}\n"),
    }
}

/// Prints `label` and reads one line without its trailing newline.
fn prompt(input: &mut impl BufRead, label: &str) -> Option<String> {
    print!("{label}");
    let _ = io::stdout().flush();
    let mut line = String::new();
    match input.read_line(&mut line) {
        Ok(0) | Err(_) => None,
        Ok(_) => Some(line.trim_end_matches(['\r', '\n']).to_string()),
    }
}
