use notdeep_core::{ResultCard, ScoreBucket, ViewState};
use std::io::IsTerminal;

/// Colors are off for pipes, `NO_COLOR`, or `--no-color`.
pub fn use_color(disabled: bool) -> bool {
    !disabled && std::env::var_os("NO_COLOR").is_none() && std::io::stdout().is_terminal()
}

fn hex_rgb(hex: &str) -> (u8, u8, u8) {
    let channel = |range: std::ops::Range<usize>| {
        hex.get(range)
            .and_then(|part| u8::from_str_radix(part, 16).ok())
            .unwrap_or(0)
    };
    (channel(1..3), channel(3..5), channel(5..7))
}

pub fn score_badge(bucket: ScoreBucket, score: f64, color: bool) -> String {
    if !color {
        return format!("[{score}]");
    }

    let (r, g, b) = hex_rgb(bucket.color());
    let foreground = if bucket.dark_text() { 30 } else { 97 };
    format!("\x1b[48;2;{r};{g};{b}m\x1b[{foreground}m {score} \x1b[0m")
}

pub fn print_card(index: usize, card: &ResultCard, color: bool) {
    let result = card.result();
    println!(
        "{:>2}. {} {}",
        index + 1,
        score_badge(card.bucket(), result.score, color),
        result.title
    );

    // The rendered first line repeats score and title without color.
    for line in card.render().lines().skip(1) {
        println!("    {line}");
    }
}

pub fn print_cards(cards: &[ResultCard], color: bool) {
    for (index, card) in cards.iter().enumerate() {
        print_card(index, card, color);
        println!();
    }
}

pub fn print_numbered(items: &[String]) {
    for (index, item) in items.iter().enumerate() {
        println!("{:>3}. {item}", index + 1);
    }
}

pub fn print_history(entries: &[String], selected: Option<usize>) {
    if entries.is_empty() {
        println!("(history is empty)");
        return;
    }
    for (index, entry) in entries.iter().enumerate() {
        let marker = if selected == Some(index) { '*' } else { ' ' };
        println!("{marker}{:>3}. {entry}", index + 1);
    }
}

pub fn describe_state(state: ViewState) -> &'static str {
    match state {
        ViewState::Idle => "idle",
        ViewState::Typing => "typing",
        ViewState::Searching => "searching...",
        ViewState::Results => "results",
        ViewState::NoResults => "no results",
        ViewState::StemmedBrowsing => "browsing stemmed words",
    }
}
