//! An interactive text interface for playing against the engine from a terminal.
//
//  This Source Code Form is subject to the terms of the Mozilla Public
//  License, v. 2.0. If a copy of the MPL was not distributed with this
//  file, You can obtain one at http://mozilla.org/MPL/2.0/.
//
////////////////////////////////////////////////////////////////////////////////////////////////////
use std::collections::VecDeque;
use std::fmt::Write;
use std::str::FromStr;
use std::sync::mpsc::TryRecvError;
use std::time::Duration;
use log::{debug, error};
use super::{Protocol, SearchAction, SearchLimits, io};
use crate::chess::{Color, Position, MAX_DEPTH};
use crate::chess::{game, variations};
use crate::config::Config;
use crate::engine::{self, Thinking};

const PROMPT: &str = "cep> ";

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
enum State {
    Idle,
    Thinking,
    Quitting,
    Xboard,
}

/// A command typed at the prompt
#[derive(Debug, Clone, PartialEq, Eq)]
enum Command {
    Xboard,
    Quit,
    On,
    Off,
    SetTime(Duration),
    SetDepth(usize),
    Undo,
    New,
    Display,
    SetBoard(String),
    Eval,
    Moves,
    Perft(usize),
    Move(String),
}

impl FromStr for Command {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, ()> {
        use Command::*;

        let mut words = s.split_whitespace();
        let cmd = words.next().ok_or(())?;
        let mut number = || words.next().and_then(|w| w.parse::<u64>().ok()).ok_or(());

        match cmd {
            "xboard" => Ok(Xboard),
            "quit" => Ok(Quit),
            "on" => Ok(On),
            "off" => Ok(Off),
            "st" => Ok(SetTime(Duration::from_secs(number()?))),
            "sd" => Ok(SetDepth(number()? as usize)),
            "undo" => Ok(Undo),
            "new" => Ok(New),
            "d" => Ok(Display),
            "setboard" | "fen" => {
                let fen = s.trim()[cmd.len()..].trim();
                if fen.is_empty() {
                    Err(())
                } else {
                    Ok(SetBoard(fen.to_string()))
                }
            },
            "eval" => Ok(Eval),
            "moves" => Ok(Moves),
            "perft" => Ok(Perft(number()? as usize)),
            mv if is_coordinate_move(mv) => Ok(Move(mv.to_string())),
            _ => Err(()),
        }
    }
}

/// Returns true if `s` looks like a move such as `e2e4` or `a7a8q`
fn is_coordinate_move(s: &str) -> bool {
    let b = s.as_bytes();
    let square = |f: u8, r: u8| (b'a'..=b'h').contains(&f) && (b'1'..=b'8').contains(&r);

    match b.len() {
        4 => square(b[0], b[1]) && square(b[2], b[3]),
        5 => square(b[0], b[1]) && square(b[2], b[3]) && b"qrbn".contains(&b[4]),
        _ => false,
    }
}

/// Formats a search result the way the console shows it.
pub fn format_thinking(thinking: &Thinking) -> String {
    let mut s = format!("score:{:7} nodes:{:9} eff: {:3}%   ",
        i32::from(thinking.score()), thinking.nodes(), thinking.efficiency());
    for mv in thinking.pv() {
        let _ = write!(s, "{:#} ", mv);
    }
    s
}

////////////////////////////////////////////////////////////////////////////////////////////////////
/// The console interface
#[derive(Debug)]
pub struct Console {
    client: io::Client,
    pending: VecDeque<String>,

    pos: Position,
    state: State,
    color: Option<Color>,
    post_thinking: bool,

    limits: SearchLimits,
    hash_size: usize,
}

impl Console {
    /// Starts the console on stdin and stdout.
    pub fn new(config: &Config) -> Self {
        Self::with_client(io::Client::connect(), config)
    }

    /// Starts the console on a client that is already connected.
    pub fn with_client(client: io::Client, config: &Config) -> Self {
        Console {
            client,
            pending: VecDeque::new(),
            pos: Position::new(),
            state: State::Idle,
            color: None,
            post_thinking: config.post_thinking.unwrap_or(true),
            limits: config.limits(),
            hash_size: config.hash_size(),
        }
    }

    /// Returns true if the user switched to the xboard protocol.
    pub fn xboard_requested(&self) -> bool {
        self.state == State::Xboard
    }

    /// Gives up the connection, so another protocol can take it over.
    pub fn into_client(self) -> io::Client {
        self.client
    }

    fn update_state(&mut self) {
        if self.state == State::Idle && self.color == Some(self.pos.turn()) {
            self.state = State::Thinking;
        }
    }

    fn check_result(&mut self) {
        if let Some(result) = game::result(&mut self.pos) {
            io::Client::send(&result.to_string());
            self.color = None;
        }
    }

    fn execute(&mut self, line: &str) {
        use Command::*;

        let cmd: Command = match line.parse() {
            Ok(cmd) => cmd,
            Err(()) => {
                if !line.trim().is_empty() {
                    io::Client::send(&format!("Error (unknown command): {}", line.trim()));
                }
                return;
            },
        };

        match cmd {
            Xboard => self.state = State::Xboard,
            Quit => self.state = State::Quitting,
            On => self.color = Some(self.pos.turn()),
            Off => self.color = None,
            SetTime(time) => {
                self.limits = SearchLimits { depth: MAX_DEPTH - 1, time: Some(time) };
            },
            SetDepth(depth) => self.limits = SearchLimits::depth(depth),
            Undo => {
                self.pos.unmake_move();
                self.color = None;
            },
            New => {
                self.pos = Position::new();
                self.color = None;
            },
            Display => {
                for line in self.pos.diagram().lines() {
                    io::Client::send(line);
                }
            },
            SetBoard(fen) => {
                match fen.parse() {
                    Ok(pos) => self.pos = pos,
                    Err(err) => io::Client::send(&format!("Error ({}): {}", err, fen)),
                }
                self.color = None;
            },
            Eval => {
                io::Client::send(&format!("Eval: {}", i32::from(engine::evaluate(&self.pos))));
            },
            Moves => {
                let list = self.pos.generate_moves();
                for entry in list.as_slice() {
                    io::Client::send(&format!("{:#7} {:9}", entry.mv, entry.score));
                }
                io::Client::send(&format!("{} moves", list.len()));
            },
            Perft(depth) => {
                let total = variations::print(&mut self.pos, depth);
                io::Client::send(&format!("Total: {}", total));
            },
            Move(move_str) => {
                match self.pos.parse_move(&move_str) {
                    Ok(mv) if self.pos.make_move(mv) => self.check_result(),
                    _ => {
                        debug!("illegal move {} in {}", move_str, self.pos);
                        io::Client::send("Illegal Move");
                    },
                }
            },
        }
    }
}

impl Protocol for Console {
    fn wait_for_search(&mut self) -> bool {
        self.update_state();

        while self.state == State::Idle {
            let line = match self.pending.pop_front() {
                Some(line) => line,
                None => {
                    io::Client::prompt(PROMPT);
                    match self.client.recv() {
                        Ok(line) => line,
                        Err(_) => {
                            error!("lost connection to client");
                            self.state = State::Quitting;
                            break;
                        },
                    }
                },
            };
            self.execute(&line);
            self.update_state();
        }

        self.state == State::Thinking
    }

    fn send_move(&mut self, thinking: &Thinking) {
        match thinking.best_move() {
            Some(mv) if self.pos.make_move(mv) => {
                io::Client::send(&format!("move {}", mv));
                self.check_result();
            },
            _ => {
                error!("no move found in {}", self.pos);
                self.color = None;
            },
        }
        if self.state == State::Thinking {
            self.state = State::Idle;
        }
    }

    fn send_thinking(&mut self, thinking: &Thinking) {
        if self.post_thinking {
            io::Client::send(&format_thinking(thinking));
        }
    }

    fn send_debug_msg(&mut self, msg: &str) {
        io::Client::send(msg);
    }

    fn check_input(&mut self) -> Option<SearchAction> {
        // any input stops the search; everything but `quit` is handled afterwards
        match self.client.try_recv() {
            Ok(line) => {
                if line.trim() == "quit" {
                    self.state = State::Quitting;
                    Some(SearchAction::Abort)
                } else {
                    self.pending.push_back(line);
                    Some(SearchAction::Stop)
                }
            },
            Err(TryRecvError::Disconnected) => {
                error!("lost connection to client");
                self.state = State::Quitting;
                Some(SearchAction::Abort)
            },
            Err(TryRecvError::Empty) => None,
        }
    }

    fn position(&self) -> &Position {
        &self.pos
    }

    fn limits(&self) -> SearchLimits {
        self.limits
    }

    fn hash_size(&self) -> usize {
        self.hash_size
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn console(input: &str) -> Console {
        let client = io::Client::from_reader(Cursor::new(input.to_string()));
        Console::with_client(client, &Config::default())
    }

    #[test]
    fn parse_command() {
        assert_eq!("st 5".parse(), Ok(Command::SetTime(Duration::from_secs(5))));
        assert_eq!("sd 7".parse(), Ok(Command::SetDepth(7)));
        assert_eq!("perft 3".parse(), Ok(Command::Perft(3)));
        assert_eq!("fen 8/8/8/8/8/8/8/K1k5 w - -".parse(),
            Ok(Command::SetBoard("8/8/8/8/8/8/8/K1k5 w - -".to_string())));
        assert_eq!("e7e8q".parse(), Ok(Command::Move("e7e8q".to_string())));
        assert_eq!("st".parse::<Command>(), Err(()));
        assert_eq!("setboard".parse::<Command>(), Err(()));
        assert_eq!("e7e8k".parse::<Command>(), Err(()));
        assert_eq!("hello".parse::<Command>(), Err(()));
    }

    #[test]
    fn plays_moves_until_engine_turn() {
        let mut con = console("e2e4\ne7e5\nbogus\ne5e4\non\n");
        assert!(con.wait_for_search());
        assert_eq!(con.position().turn(), Color::White);
        assert_eq!(con.color, Some(Color::White));
        assert_eq!(con.position().moves_played().count(), 2);
    }

    #[test]
    fn quits_and_hands_over() {
        let mut con = console("new\nquit\n");
        assert!(!con.wait_for_search());
        assert!(!con.xboard_requested());

        let mut con = console("xboard\nprotover 2\n");
        assert!(!con.wait_for_search());
        assert!(con.xboard_requested());
        let client = con.into_client();
        assert_eq!(client.recv(), Ok("protover 2".to_string()));
    }

    #[test]
    fn settings_and_positions() {
        let mut con = console("");
        con.execute("sd 5");
        assert_eq!(con.limits(), SearchLimits::depth(5));
        con.execute("st 3");
        assert_eq!(con.limits(), SearchLimits { depth: MAX_DEPTH - 1, time: Some(Duration::from_secs(3)) });

        con.execute("on");
        con.execute("setboard 7k/8/8/8/8/8/8/K7 b - - 0 1");
        assert_eq!(con.color, None);
        assert_eq!(con.position().to_fen(), "7k/8/8/8/8/8/8/K7 b - - 0 1");
        con.execute("fen garbage");
        assert_eq!(con.position().to_fen(), "7k/8/8/8/8/8/8/K7 b - - 0 1");
        con.execute("new");
        assert_eq!(con.position(), &Position::new());
    }

    #[test]
    fn input_stops_search() {
        let mut con = console("d\n");
        // wait for the line, then the end of input, to arrive
        std::thread::sleep(Duration::from_millis(100));
        assert_eq!(con.check_input(), Some(SearchAction::Stop));
        assert_eq!(con.pending.len(), 1);
        assert_eq!(con.check_input(), Some(SearchAction::Abort));
        assert_eq!(con.state, State::Quitting);
    }

    #[test]
    fn thinking_line() {
        let pos = Position::new();
        let pv = vec![pos.parse_move("e2e4").unwrap()];
        let thinking = Thinking::with_pv(35.into(), 3, 1200, pv);
        assert_eq!(format_thinking(&thinking), "score:     35 nodes:     1200 eff:   0%   Pe2e4 ");
    }
}
