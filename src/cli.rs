//! Terminal front-end: argument parsing and a line-oriented command loop.
//!
//! This is the "UI/platform layer" for the engine. It turns typed commands
//! into session requests, paces auto-complete with a sleep, and keeps the
//! highscore file up to date through a `GameObserver`.

use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{info, instrument, warn};

use crate::card::Card;
use crate::config::{DealMode, GameConfig};
use crate::display::{render_board, render_full_piles_debug};
use crate::events::{GameEvent, GameObserver};
use crate::game::GameSession;
use crate::highscore::HighscoreStore;
use crate::pile::PileId;

#[derive(Parser, Debug, Default)]
#[command(name = "klondike", version, about = "Klondike solitaire in the terminal")]
pub struct Args {
    /// TOML config file
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Reproduce a shuffled deal from this seed
    #[arg(long, conflicts_with_all = ["game", "ordered"])]
    pub seed: Option<u64>,

    /// Deal a numbered game (e.g. 617, ms617, 13101775566348840960)
    #[arg(long, value_name = "NUMBER", conflicts_with = "ordered")]
    pub game: Option<String>,

    /// Debug deal: one finished suit per column
    #[arg(long)]
    pub ordered: bool,

    /// Number of tableau columns (4..=7)
    #[arg(long)]
    pub columns: Option<usize>,

    /// Highscore file
    #[arg(long, value_name = "PATH")]
    pub scores: Option<PathBuf>,

    /// Play auto-complete without pauses
    #[arg(long)]
    pub no_delay: bool,
}

impl Args {
    /// Layers command-line overrides on top of `config`.
    pub fn apply(&self, mut config: GameConfig) -> GameConfig {
        if let Some(seed) = self.seed {
            config.deal = DealMode::Shuffled { seed: Some(seed) };
        }
        if let Some(number) = &self.game {
            config.deal = DealMode::Numbered {
                number: number.clone(),
            };
        }
        if self.ordered {
            config.deal = DealMode::Ordered;
        }
        if let Some(columns) = self.columns {
            config.tableau_piles = columns;
        }
        if let Some(path) = &self.scores {
            config.highscore_path = Some(path.clone());
        }
        if self.no_delay {
            config.auto_complete_delay_ms = 0;
        }
        config
    }
}

/// One typed command.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Command {
    /// Draw from the stock, or recycle the waste when the stock is empty.
    Stock,
    Move { card: Card, to: PileId },
    Undo,
    New,
    Scores,
    ClearScores,
    Debug,
    Help,
    Quit,
}

impl FromStr for Command {
    type Err = String;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let words: Vec<&str> = line.split_whitespace().collect();
        let Some((&verb, rest)) = words.split_first() else {
            return Err("empty command".to_string());
        };
        let cmd = match (verb.to_ascii_lowercase().as_str(), rest) {
            ("d" | "draw" | "s" | "stock", []) => Command::Stock,
            ("m" | "move", [card, pile]) => Command::Move {
                card: card.parse().map_err(|e| format!("{e}"))?,
                to: pile.parse().map_err(|e| format!("{e}"))?,
            },
            ("m" | "move", _) => return Err("usage: m <card> <pile>   e.g. m 7H t3".to_string()),
            ("u" | "undo", []) => Command::Undo,
            ("n" | "new", []) => Command::New,
            ("scores", []) => Command::Scores,
            ("clear-scores", []) => Command::ClearScores,
            ("debug", []) => Command::Debug,
            ("h" | "help" | "?", []) => Command::Help,
            ("q" | "quit" | "exit", []) => Command::Quit,
            _ => return Err(format!("unknown command {line:?} (try 'help')")),
        };
        Ok(cmd)
    }
}

const HELP: &str = "\
commands:
  d | draw          draw from the stock (recycles the waste when empty)
  m <card> <pile>   move a card and everything on it, e.g. m 7H t3, m AS f1
  u | undo          take back the last action
  n | new           deal a new game
  scores            show best times
  clear-scores      delete all best times
  debug             show every pile with hidden cards
  q | quit          leave";

/// Observer that files wins into the highscore table.
#[derive(Debug, Default)]
pub struct ScoreKeeper {
    store: Option<HighscoreStore>,
    /// Rank of the most recent win if it made the table.
    pub last_rank: Option<usize>,
    /// Set by a win, cleared once the win has been announced.
    win_pending: bool,
}

impl ScoreKeeper {
    pub fn new(store: Option<HighscoreStore>) -> Self {
        ScoreKeeper {
            store,
            last_rank: None,
            win_pending: false,
        }
    }

    /// True once after each win.
    pub fn take_win(&mut self) -> bool {
        std::mem::take(&mut self.win_pending)
    }

    pub fn store(&self) -> Option<&HighscoreStore> {
        self.store.as_ref()
    }

    pub fn store_mut(&mut self) -> Option<&mut HighscoreStore> {
        self.store.as_mut()
    }
}

impl GameObserver for ScoreKeeper {
    fn notify(&mut self, event: &GameEvent) {
        match event {
            GameEvent::Dealt => {
                self.last_rank = None;
                self.win_pending = false;
            }
            GameEvent::GameWon(result) => {
                self.win_pending = true;
                let Some(store) = self.store.as_mut() else {
                    return;
                };
                match store.record(*result) {
                    Ok(rank) => self.last_rank = rank,
                    Err(e) => warn!(error = %e, "Could not save highscore"),
                }
            }
            _ => {}
        }
    }
}

/// What the loop should do after a command.
#[derive(Debug, PartialEq, Eq)]
pub enum Reply {
    Show(String),
    Quit,
}

/// Applies one command to the session and describes the outcome.
pub fn execute(session: &mut GameSession<ScoreKeeper>, cmd: &Command) -> Result<Reply> {
    let text = match cmd {
        Command::Stock => {
            if session.activate_stock() {
                render_board(session.board())
            } else {
                "The stock and waste are both empty.".to_string()
            }
        }
        Command::Move { card, to } => {
            if session.request_move(*card, *to) {
                render_board(session.board())
            } else {
                format!("{card} cannot go to {to}.")
            }
        }
        Command::Undo => {
            if session.request_undo() {
                render_board(session.board())
            } else {
                "Nothing to undo.".to_string()
            }
        }
        Command::New => {
            session.reset().context("dealing a new game")?;
            format!("New game ({}).\n{}", session.deal_label(), render_board(session.board()))
        }
        Command::Scores => render_scores(session.observer()),
        Command::ClearScores => match session.observer_mut().store_mut() {
            Some(store) => {
                store.clear().context("clearing highscores")?;
                "Highscores cleared.".to_string()
            }
            None => "No highscore file in use.".to_string(),
        },
        Command::Debug => render_full_piles_debug(session.board()),
        Command::Help => HELP.to_string(),
        Command::Quit => return Ok(Reply::Quit),
    };
    Ok(Reply::Show(text))
}

fn render_scores(keeper: &ScoreKeeper) -> String {
    let Some(store) = keeper.store() else {
        return "No highscore file in use.".to_string();
    };
    let entries = store.table().entries();
    if entries.is_empty() {
        return "No highscores yet.".to_string();
    }
    let mut s = String::from("Best times:\n");
    for (i, e) in entries.iter().enumerate() {
        s.push_str(&format!(
            "  {}. {:02}:{:02}  {:>4} moves  {}\n",
            i + 1,
            e.elapsed_seconds / 60,
            e.elapsed_seconds % 60,
            e.moves,
            e.date.format("%Y-%m-%d %H:%M")
        ));
    }
    s
}

fn status_line(session: &GameSession<ScoreKeeper>) -> String {
    format!(
        "[{}]  moves: {}  time: {}",
        session.deal_label(),
        session.action_count(),
        session.timer().display()
    )
}

/// Plays out auto-complete, pausing between moves.
fn drain_auto_complete(session: &mut GameSession<ScoreKeeper>, out: &mut impl Write) -> Result<()> {
    let delay = Duration::from_millis(session.config().auto_complete_delay_ms);
    writeln!(out, "Auto-completing...")?;
    while session.tick() {
        if !delay.is_zero() {
            std::thread::sleep(delay);
        }
    }
    writeln!(out, "{}", render_board(session.board()))?;
    Ok(())
}

/// Plays out a pending auto-complete and announces a win the first time
/// it is seen.
fn settle(session: &mut GameSession<ScoreKeeper>, out: &mut impl Write) -> Result<()> {
    if session.is_auto_completing() {
        drain_auto_complete(session, out)?;
    }
    if session.observer_mut().take_win() {
        announce_win(session, out)?;
    }
    Ok(())
}

fn announce_win(session: &GameSession<ScoreKeeper>, out: &mut impl Write) -> Result<()> {
    writeln!(
        out,
        "You won in {} moves, {}!",
        session.action_count(),
        session.timer().display()
    )?;
    if let Some(rank) = session.observer().last_rank {
        writeln!(out, "New highscore: #{}", rank + 1)?;
    }
    writeln!(out, "Type 'n' for a new game or 'q' to quit.")?;
    Ok(())
}

/// Entry point for the `klondike` binary.
#[instrument(skip(args))]
pub fn run(args: Args) -> Result<()> {
    let base = match &args.config {
        Some(path) => GameConfig::load(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => GameConfig::default(),
    };
    let config = args.apply(base);
    config.validate().context("invalid settings")?;

    let store = match config.highscore_path() {
        Ok(path) => match HighscoreStore::open(&path) {
            Ok(store) => Some(store),
            Err(e) => {
                warn!(error = %e, "Highscores disabled");
                None
            }
        },
        Err(e) => {
            warn!(error = %e, "Highscores disabled");
            None
        }
    };

    let mut session = GameSession::new(config, ScoreKeeper::new(store)).context("starting game")?;
    info!(deal = %session.deal_label(), "Session started");

    let stdin = io::stdin();
    let mut stdout = io::stdout();
    writeln!(stdout, "{}\n{}", render_board(session.board()), HELP)?;

    loop {
        settle(&mut session, &mut stdout)?;

        write!(stdout, "{}\n> ", status_line(&session))?;
        stdout.flush()?;

        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            break; // EOF
        }
        if line.trim().is_empty() {
            continue;
        }
        let cmd = match line.parse::<Command>() {
            Ok(cmd) => cmd,
            Err(msg) => {
                writeln!(stdout, "{msg}")?;
                continue;
            }
        };
        match execute(&mut session, &cmd)? {
            Reply::Show(text) => writeln!(stdout, "{text}")?,
            Reply::Quit => break,
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::GameResult;
    use crate::game::Phase;

    #[test]
    fn commands_parse() {
        assert_eq!("d".parse::<Command>(), Ok(Command::Stock));
        assert_eq!(" DRAW ".parse::<Command>(), Ok(Command::Stock));
        assert_eq!(
            "m 7h t3".parse::<Command>(),
            Ok(Command::Move {
                card: "7H".parse().unwrap(),
                to: PileId::Tableau(2)
            })
        );
        assert_eq!("u".parse::<Command>(), Ok(Command::Undo));
        assert_eq!("quit".parse::<Command>(), Ok(Command::Quit));
        assert!("m 7H".parse::<Command>().is_err());
        assert!("m ZZ t1".parse::<Command>().is_err());
        assert!("m 7H t9".parse::<Command>().is_err());
        assert!("fly".parse::<Command>().is_err());
        assert!("".parse::<Command>().is_err());
    }

    #[test]
    fn flags_override_config() {
        let args = Args::parse_from(["klondike", "--seed", "99", "--columns", "5", "--no-delay"]);
        let config = args.apply(GameConfig::default());
        assert_eq!(config.deal, DealMode::Shuffled { seed: Some(99) });
        assert_eq!(config.tableau_piles, 5);
        assert_eq!(config.auto_complete_delay_ms, 0);

        let args = Args::parse_from(["klondike", "--game", "ms10"]);
        assert_eq!(
            args.apply(GameConfig::default()).deal,
            DealMode::Numbered {
                number: "ms10".to_string()
            }
        );
        assert!(Args::try_parse_from(["klondike", "--seed", "1", "--ordered"]).is_err());
    }

    #[test]
    fn ordered_game_wins_and_records_score() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("scores.json");
        let store = HighscoreStore::open(&path).unwrap();
        let config = Args {
            ordered: true,
            no_delay: true,
            columns: Some(4),
            ..Args::default()
        }
        .apply(GameConfig::default());

        let mut session = GameSession::new(config, ScoreKeeper::new(Some(store))).unwrap();
        let mut sink = Vec::new();
        drain_auto_complete(&mut session, &mut sink).unwrap();
        assert_eq!(session.phase(), Phase::Won);
        assert_eq!(session.observer().last_rank, Some(0));

        let reopened = HighscoreStore::open(&path).unwrap();
        assert_eq!(reopened.table().entries()[0].moves, 52);

        let reply = execute(&mut session, &Command::Scores).unwrap();
        assert!(matches!(reply, Reply::Show(text) if text.contains("52 moves")));
        execute(&mut session, &Command::ClearScores).unwrap();
        assert!(HighscoreStore::open(&path).unwrap().table().is_empty());
    }

    #[test]
    fn win_is_announced_once_per_game() {
        let config = Args {
            ordered: true,
            no_delay: true,
            columns: Some(4),
            ..Args::default()
        }
        .apply(GameConfig::default());
        let mut session = GameSession::new(config, ScoreKeeper::default()).unwrap();
        let mut sink = Vec::new();

        settle(&mut session, &mut sink).unwrap();
        assert!(session.is_won());
        assert_eq!(
            execute(&mut session, &Command::Undo).unwrap(),
            Reply::Show("Nothing to undo.".to_string())
        );
        settle(&mut session, &mut sink).unwrap();
        settle(&mut session, &mut sink).unwrap();
        let text = String::from_utf8(sink.clone()).unwrap();
        assert_eq!(text.matches("You won").count(), 1);

        // The next ordered deal finishes itself and earns its own banner.
        execute(&mut session, &Command::New).unwrap();
        settle(&mut session, &mut sink).unwrap();
        let text = String::from_utf8(sink).unwrap();
        assert_eq!(text.matches("You won").count(), 2);
    }

    #[test]
    fn refused_commands_explain_themselves() {
        let config = GameConfig {
            deal: DealMode::Shuffled { seed: Some(4) },
            ..GameConfig::default()
        };
        let mut session = GameSession::new(config, ScoreKeeper::default()).unwrap();
        assert_eq!(
            execute(&mut session, &Command::Undo).unwrap(),
            Reply::Show("Nothing to undo.".to_string())
        );
        let cmd = "m KS f1".parse().unwrap();
        // A King can never start a foundation.
        assert_eq!(
            execute(&mut session, &cmd).unwrap(),
            Reply::Show("KS cannot go to f1.".to_string())
        );
        assert_eq!(execute(&mut session, &Command::Quit).unwrap(), Reply::Quit);
    }

    #[test]
    fn keeper_without_store_ignores_wins() {
        let mut keeper = ScoreKeeper::default();
        keeper.notify(&GameEvent::GameWon(GameResult {
            elapsed_seconds: 3,
            moves: 60,
        }));
        assert_eq!(keeper.last_rank, None);
        assert_eq!(render_scores(&keeper), "No highscore file in use.");
    }
}
