use crate::display::{describe_state, print_card, print_cards, print_history, print_numbered};
use notdeep_core::{
    KeyValueStore, LinkSection, SearchClient, SearchController, SuggestionClient, ViewState,
};
use tokio::io::{AsyncBufReadExt, BufReader};

const HELP: &str = "\
text            type the text and press Enter
<empty line>    submit the current query
:type [TEXT]    change the input (shows suggestions, no search)
:pick N         use suggestion N
:history        show query history (* marks the selection)
:select N       click history entry N
:delete N       double-click history entry N (deletes every copy)
:clear-history  forget all queries
:similar N      search with the keywords of result N
:children N     expand or collapse child links of result N
:parents N      expand or collapse parent links of result N
:stems          open or close the stemmed word list
:voice start|stop|say TEXT
:remote         backend query log
:state          show the screen state
:quit";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShellCommand {
    Submit,
    TypeAndSubmit(String),
    Type(String),
    Pick(usize),
    History,
    Select(usize),
    Delete(usize),
    ClearHistory,
    Similar(usize),
    Links(usize, LinkSection),
    Stems,
    VoiceStart,
    VoiceStop,
    VoiceSay(String),
    Remote,
    State,
    Help,
    Quit,
    Invalid(String),
}

/// Entry numbers are shown 1-based; commands carry 0-based indexes.
fn index_arg(arg: &str) -> Option<usize> {
    arg.trim().parse::<usize>().ok().and_then(|n| n.checked_sub(1))
}

pub fn parse_line(line: &str) -> ShellCommand {
    let line = line.trim_end_matches(['\r', '\n']);
    if line.trim().is_empty() {
        return ShellCommand::Submit;
    }
    let Some(command) = line.strip_prefix(':') else {
        return ShellCommand::TypeAndSubmit(line.to_string());
    };

    let (name, arg) = command.split_once(' ').unwrap_or((command, ""));
    let indexed = |build: fn(usize) -> ShellCommand| {
        index_arg(arg).map_or_else(
            || ShellCommand::Invalid(format!(":{name} needs an entry number")),
            build,
        )
    };

    match name {
        "type" => ShellCommand::Type(arg.to_string()),
        "pick" => indexed(ShellCommand::Pick),
        "history" => ShellCommand::History,
        "select" => indexed(ShellCommand::Select),
        "delete" => indexed(ShellCommand::Delete),
        "clear-history" => ShellCommand::ClearHistory,
        "similar" => indexed(ShellCommand::Similar),
        "children" => indexed(|index| ShellCommand::Links(index, LinkSection::Children)),
        "parents" => indexed(|index| ShellCommand::Links(index, LinkSection::Parents)),
        "stems" => ShellCommand::Stems,
        "voice" => match arg.split_once(' ').unwrap_or((arg, "")) {
            ("start", _) => ShellCommand::VoiceStart,
            ("stop", _) => ShellCommand::VoiceStop,
            ("say", text) => ShellCommand::VoiceSay(text.to_string()),
            _ => ShellCommand::Invalid("usage: :voice start|stop|say TEXT".to_string()),
        },
        "remote" => ShellCommand::Remote,
        "state" => ShellCommand::State,
        "help" | "?" => ShellCommand::Help,
        "quit" | "q" | "exit" => ShellCommand::Quit,
        other => ShellCommand::Invalid(format!("unknown command :{other}")),
    }
}

pub async fn run<B, S>(controller: &mut SearchController<B, S>, color: bool) -> anyhow::Result<()>
where
    B: SearchClient + SuggestionClient + Send + Sync,
    S: KeyValueStore,
{
    println!("Not Deep Search. Type a query, or :help.");
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    while let Some(line) = lines.next_line().await? {
        match parse_line(&line) {
            ShellCommand::Quit => break,
            command => handle(controller, command, color).await,
        }
    }

    Ok(())
}

async fn handle<B, S>(controller: &mut SearchController<B, S>, command: ShellCommand, color: bool)
where
    B: SearchClient + SuggestionClient + Send + Sync,
    S: KeyValueStore,
{
    match command {
        ShellCommand::Submit => {
            controller.submit().await;
            show_outcome(controller, color);
        }
        ShellCommand::TypeAndSubmit(text) => {
            controller.type_text(text).await;
            controller.submit().await;
            show_outcome(controller, color);
        }
        ShellCommand::Type(text) => {
            controller.type_text(text).await;
            print_numbered(controller.suggestions());
        }
        ShellCommand::Pick(index) => {
            if controller.select_suggestion(index) {
                println!("query: {}", controller.query());
            } else {
                println!("no such suggestion");
            }
        }
        ShellCommand::History => {
            print_history(controller.history(), controller.selected_history());
        }
        ShellCommand::Select(index) => {
            if controller.click_history(index).await {
                print_history(controller.history(), controller.selected_history());
                if controller.selected_history().is_some() {
                    show_outcome(controller, color);
                }
            } else {
                println!("no such history entry");
            }
        }
        ShellCommand::Delete(index) => {
            let removed = controller.double_click_history(index);
            println!("removed {removed} entr{}", if removed == 1 { "y" } else { "ies" });
        }
        ShellCommand::ClearHistory => {
            controller.clear_history();
            println!("history cleared");
        }
        ShellCommand::Similar(index) => {
            if controller.find_similar(index).await {
                println!("query: {}", controller.query());
                show_outcome(controller, color);
            } else {
                println!("no such result");
            }
        }
        ShellCommand::Links(index, section) => match controller.toggle_links(index, section) {
            Some(_) => print_card(index, &controller.cards()[index], color),
            None => println!("no such result"),
        },
        ShellCommand::Stems => {
            if !controller.stemmed_words_available() {
                println!("stemmed words are only offered before the first search");
            } else if controller.toggle_stemmed_words().await {
                print_numbered(controller.vocabulary());
            } else {
                println!("stemmed word list closed");
            }
        }
        ShellCommand::VoiceStart => match controller.start_dictation() {
            Ok(()) => println!("listening"),
            Err(error) => println!("{error}"),
        },
        ShellCommand::VoiceStop => match controller.stop_dictation() {
            Ok(()) => println!("query: {}", controller.query()),
            Err(error) => println!("{error}"),
        },
        ShellCommand::VoiceSay(text) => {
            if !controller.transcript_update(text) {
                println!("not listening");
            }
        }
        ShellCommand::Remote => {
            for entry in controller.remote_history().await {
                println!("{}  {}", entry.timestamp.to_rfc3339(), entry.query);
            }
        }
        ShellCommand::State => {
            println!(
                "state: {} | query: {:?} | voice: {}",
                describe_state(controller.state()),
                controller.query(),
                match (controller.voice_available(), controller.is_listening()) {
                    (false, _) => "unavailable",
                    (true, true) => "listening",
                    (true, false) => "off",
                }
            );
        }
        ShellCommand::Help => println!("{HELP}"),
        ShellCommand::Invalid(message) => println!("{message}"),
        ShellCommand::Quit => {}
    }
}

fn show_outcome<B, S>(controller: &SearchController<B, S>, color: bool)
where
    B: SearchClient + SuggestionClient + Send + Sync,
    S: KeyValueStore,
{
    match controller.state() {
        ViewState::Results => print_cards(controller.cards(), color),
        ViewState::NoResults => println!("no results"),
        state if state.is_pre_search() => println!("Not Deep Search"),
        state => println!("{}", describe_state(state)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_lines_type_and_submit() {
        assert_eq!(parse_line("movie\n"), ShellCommand::TypeAndSubmit("movie".to_string()));
        assert_eq!(parse_line("   "), ShellCommand::Submit);
    }

    #[test]
    fn entry_numbers_are_one_based() {
        assert_eq!(parse_line(":select 1"), ShellCommand::Select(0));
        assert_eq!(
            parse_line(":parents 3"),
            ShellCommand::Links(2, LinkSection::Parents)
        );
        assert!(matches!(parse_line(":delete 0"), ShellCommand::Invalid(_)));
        assert!(matches!(parse_line(":similar x"), ShellCommand::Invalid(_)));
    }

    #[test]
    fn type_without_text_clears_input() {
        assert_eq!(parse_line(":type"), ShellCommand::Type(String::new()));
        assert_eq!(parse_line(":type mov"), ShellCommand::Type("mov".to_string()));
    }

    #[test]
    fn voice_subcommands() {
        assert_eq!(parse_line(":voice start"), ShellCommand::VoiceStart);
        assert_eq!(
            parse_line(":voice say dinosaur planet"),
            ShellCommand::VoiceSay("dinosaur planet".to_string())
        );
        assert!(matches!(parse_line(":voice"), ShellCommand::Invalid(_)));
    }
}
