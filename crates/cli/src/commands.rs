use fivedraw_core::{Card, Hand, Selection, Suit, HAND_SIZE};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Help,
    Quit,
    Show,
    /// Zero-based positions, in the order typed.
    Toggle(Vec<usize>),
    Draw,
    Restart,
    Rank,
}

/// Parses one input line. Positions are typed 1-based.
pub fn parse_command(line: &str) -> Result<Command, String> {
    let mut parts = line.split_whitespace();
    let cmd = parts.next().unwrap_or("");
    let args: Vec<&str> = parts.collect();
    match cmd {
        "help" | "h" | "?" => Ok(Command::Help),
        "quit" | "exit" | "q" => Ok(Command::Quit),
        "hand" | "show" | "ls" => Ok(Command::Show),
        "draw" | "d" => Ok(Command::Draw),
        "restart" | "r" => Ok(Command::Restart),
        "rank" => Ok(Command::Rank),
        "select" | "s" | "toggle" | "t" => {
            if args.is_empty() {
                return Err(format!("usage: {cmd} <position 1-{HAND_SIZE}>..."));
            }
            args.iter()
                .map(|arg| parse_position(arg))
                .collect::<Result<Vec<_>, _>>()
                .map(Command::Toggle)
        }
        // bare digits toggle too: "1 3 5"
        other if !other.is_empty() && other.chars().all(|ch| ch.is_ascii_digit()) => {
            std::iter::once(other)
                .chain(args.iter().copied())
                .map(parse_position)
                .collect::<Result<Vec<_>, _>>()
                .map(Command::Toggle)
        }
        other => Err(format!("unknown command: {other} (try help)")),
    }
}

fn parse_position(arg: &str) -> Result<usize, String> {
    match arg.parse::<usize>() {
        Ok(position) if (1..=HAND_SIZE).contains(&position) => Ok(position - 1),
        _ => Err(format!("position must be 1-{HAND_SIZE}, got {arg}")),
    }
}

pub fn suit_symbol(suit: Suit) -> &'static str {
    match suit {
        Suit::Spades => "♠",
        Suit::Hearts => "♥",
        Suit::Clubs => "♣",
        Suit::Diamonds => "♦",
    }
}

pub fn format_card(card: &Card) -> String {
    format!("{}{}", card.rank.code(), suit_symbol(card.suit))
}

/// Two lines: positions with selection markers, then the cards.
pub fn format_hand(hand: &Hand, selection: &Selection) -> String {
    let mut marks = String::new();
    let mut cards = String::new();
    for (idx, card) in hand.iter().enumerate() {
        let mark = if selection.contains(idx) { "*" } else { " " };
        marks.push_str(&format!("{:>4}{mark} ", idx + 1));
        cards.push_str(&format!("{:>5} ", format_card(card)));
    }
    format!("{}\n{}", marks.trim_end(), cards.trim_end())
}

pub fn help_text() -> &'static str {
    "commands:\n  \
     select <n>...  toggle positions 1-5 for exchange (alias s, t, or just the numbers)\n  \
     draw           exchange the selected cards (alias d)\n  \
     restart        start a new round after drawing (alias r)\n  \
     hand           show the hand (alias show, ls)\n  \
     rank           name the current hand\n  \
     help           this text\n  \
     quit           leave; the round is kept for next time"
}
