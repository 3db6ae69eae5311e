//! Interactive shell for promptdeck
//!
//! Reads one line at a time from stdin. Lines starting with `/` are commands,
//! anything else is sent to the selected model.

use anyhow::Context;
use promptdeck::{
    tracing_ext, Action, BedrockAgentClient, BedrockRuntimeClient, ChatConfig, ChatSession,
    InferenceDispatcher, ModelDescriptor, Notice, Role, Turn,
};
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::info;

const HELP: &str = "\
Commands:
  /models          list models
  /model <label>   select a model
  /prompts         list prompt templates and favourites
  /prompt <n>      send prompt number <n>
  /history         show the conversation
  /clear           clear the conversation
  /save            save the conversation
  /load            load the saved conversation
  /help            show this help
  /quit            exit
Any other line is sent as a message.";

enum Command<'a> {
    Models,
    Model(&'a str),
    Prompts,
    Prompt(&'a str),
    History,
    Act(Action),
    Help,
    Quit,
    Unknown(&'a str),
}

fn parse(line: &str) -> Command<'_> {
    let Some(rest) = line.strip_prefix('/') else {
        return Command::Act(Action::Send(line.to_string()));
    };
    let (name, arg) = rest
        .split_once(char::is_whitespace)
        .map(|(n, a)| (n, a.trim()))
        .unwrap_or((rest, ""));

    match name {
        "models" => Command::Models,
        "model" => Command::Model(arg),
        "prompts" => Command::Prompts,
        "prompt" => Command::Prompt(arg),
        "history" => Command::History,
        "clear" => Command::Act(Action::Clear),
        "save" => Command::Act(Action::Save),
        "load" => Command::Act(Action::Load),
        "help" => Command::Help,
        "quit" | "exit" => Command::Quit,
        _ => Command::Unknown(name),
    }
}

fn format_turn(turn: &Turn) -> String {
    let speaker = match turn.role {
        Role::User => "you",
        Role::Assistant => "assistant",
    };
    format!("{}> {}", speaker, turn.content.trim())
}

fn render(session: &ChatSession) {
    println!("---");
    for turn in session.conversation().turns() {
        println!("{}", format_turn(turn));
    }
    println!("---");
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_ext::init();

    let config = ChatConfig::from_env().context("loading configuration")?;
    info!(?config, "Starting promptdeck");

    let runtime = BedrockRuntimeClient::new(&config).context("building inference client")?;
    let registry = BedrockAgentClient::new(&config).context("building registry client")?;
    let dispatcher = InferenceDispatcher::new(Arc::new(runtime));

    let (mut session, notice) = ChatSession::start(&config, dispatcher, &registry).await;
    println!("{}", notice);
    println!("Model: {}. Type /help for commands.", session.model());

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        match parse(line) {
            Command::Models => {
                for model in ModelDescriptor::ALL {
                    let marker = if *model == session.model() { "*" } else { " " };
                    println!("{} {}", marker, model);
                }
            }
            Command::Model(label) => match session.select_model(label) {
                Ok(model) => println!("{}", Notice::success(format!("Using {}", model))),
                Err(err) => println!("{}", Notice::from(&err)),
            },
            Command::Prompts => {
                for (index, prompt) in session.prompt_options().iter().enumerate() {
                    println!("{:>3}. {}", index + 1, prompt);
                }
            }
            Command::Prompt(arg) => {
                let options = session.prompt_options();
                let chosen = arg
                    .parse::<usize>()
                    .ok()
                    .and_then(|n| n.checked_sub(1))
                    .and_then(|i| options.get(i));
                match chosen {
                    Some(prompt) => {
                        let notice = session.handle(Action::Send(prompt.text().to_string())).await;
                        render(&session);
                        println!("{}", notice);
                    }
                    None => println!("{}", Notice::error(format!("No prompt numbered {:?}", arg))),
                }
            }
            Command::History => render(&session),
            Command::Act(action) => {
                let notice = session.handle(action).await;
                render(&session);
                println!("{}", notice);
            }
            Command::Help => println!("{}", HELP),
            Command::Quit => break,
            Command::Unknown(name) => {
                println!("{}", Notice::error(format!("Unknown command /{}", name)))
            }
        }
    }

    info!(turns = session.conversation().len(), "Session ended");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_commands() {
        assert!(matches!(parse("/model Titan"), Command::Model("Titan")));
        assert!(matches!(parse("/prompt  2 "), Command::Prompt("2")));
        assert!(matches!(parse("/save"), Command::Act(Action::Save)));
        assert!(matches!(parse("/bogus"), Command::Unknown("bogus")));
        match parse("hello there") {
            Command::Act(Action::Send(text)) => assert_eq!(text, "hello there"),
            _ => panic!("expected a send"),
        }
    }

    #[test]
    fn test_assistant_turns_not_tied_to_selected_model() {
        assert_eq!(format_turn(&Turn::user("hello ")), "you> hello");
        assert_eq!(format_turn(&Turn::assistant("hi there")), "assistant> hi there");
    }
}
