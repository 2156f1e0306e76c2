//! Implements the [Chess Engine Communication Protocol](http://hgm.nubati.net/CECP.html), commonly
//! known as xboard.
//
//  This Source Code Form is subject to the terms of the Mozilla Public
//  License, v. 2.0. If a copy of the MPL was not distributed with this
//  file, You can obtain one at http://mozilla.org/MPL/2.0/.
//
////////////////////////////////////////////////////////////////////////////////////////////////////
use std::cmp::min;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;
use std::num::{ParseIntError, ParseFloatError};
use std::sync::mpsc::TryRecvError;
use log::{debug, error};
use lazy_static::lazy_static;
use regex::{RegexSet, Regex};
use super::{Protocol, SearchAction, SearchLimits, io};
use crate::chess::{Color, Position, MAX_DEPTH};
use crate::chess::game;
use crate::config::Config;
use crate::engine::Thinking;
use crate::engine::hash::HashTable;

/// Share of the remaining time and the number of moves it is spread over, see `time_per_move`
const TIME_FRACTION: f64 = 0.35;
const EXPECTED_MOVES: f64 = 48.0;
/// Safety margin taken off each move's time, in milliseconds
const TIME_MARGIN: f64 = 50.0;
/// Time limit for `sd`, which effectively searches to the given depth
const DEPTH_ONLY_TIME: Duration = Duration::from_millis(1 << 25);

/// Returns the time to use for a move given the time remaining on the clock and the number of
/// plies played in the game.
pub fn time_per_move(remaining: Duration, game_ply: usize) -> Duration {
    let moves = EXPECTED_MOVES - (game_ply % 80) as f64 / 2.0;
    let ms = remaining.as_millis() as f64 / (TIME_FRACTION * moves) - TIME_MARGIN;
    Duration::from_millis(ms.max(0.0) as u64)
}

////////////////////////////////////////////////////////////////////////////////////////////////////
/// Current state of the engine.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
enum State {
    Idle,
    Thinking,
    Analyzing,
    Quitting,
}

////////////////////////////////////////////////////////////////////////////////////////////////////
/// Implementation of the xboard protocol
#[derive(Debug)]
pub struct Xboard {
    client: io::Client,

    pos: Position,

    state: State,
    color: Option<Color>,
    analyzing: bool,
    post_thinking: bool,

    limits: SearchLimits,
    fixed_time: Option<Duration>,
    hash_size: usize,
}

impl Xboard {
    /// Starts the xboard interface on stdin and stdout.
    pub fn new(config: &Config) -> Self {
        Self::with_client(io::Client::connect(), config)
    }

    /// Starts the xboard interface on a client that is already connected.
    pub fn with_client(client: io::Client, config: &Config) -> Self {
        Xboard {
            client,
            pos: Position::new(),
            state: State::Idle,
            color: Some(Color::Black),
            analyzing: false,
            post_thinking: config.post_thinking.unwrap_or(false),
            limits: config.limits(),
            fixed_time: None,
            hash_size: config.hash_size(),
        }
    }

    /// Works out what to do next, from the side the engine plays and the analysis mode.
    fn update_state(&mut self) {
        if self.state == State::Quitting {
            return;
        }

        self.state = if self.analyzing {
            State::Analyzing
        } else if self.color == Some(self.pos.turn()) {
            State::Thinking
        } else {
            State::Idle
        };

        if self.state != State::Idle && self.check_result() {
            self.state = State::Idle;
        }
    }

    /// Sends the result if the game is over, in which case the engine stops playing.
    fn check_result(&mut self) -> bool {
        match game::result(&mut self.pos) {
            Some(result) => {
                Response::GameResult(result.score().to_string(), Some(result.reason().to_string()))
                    .send();
                self.color = None;
                self.analyzing = false;
                true
            },
            None => false,
        }
    }

    fn user_move(&mut self, move_str: &str) -> bool {
        match self.pos.parse_move(move_str) {
            Ok(mv) if self.pos.make_move(mv) => {
                self.check_result();
                true
            },
            _ => {
                debug!("illegal move {} in {}", move_str, self.pos);
                Response::IllegalMove(move_str.to_string(), None).send();
                false
            },
        }
    }

    /// Carries out a command from the client. Returns what should happen to a search that is
    /// running.
    fn execute(&mut self, line: &str) -> Option<SearchAction> {
        use Command::*;

        let cmd: Command = match line.parse() {
            Ok(cmd) => cmd,
            Err(_) => {
                if !line.is_empty() {
                    Response::ErrorMessage(line.to_string(), "unknown command".to_string()).send();
                }
                return None;
            },
        };

        match cmd {
            Xboard | Accepted(_) | Rejected(_) | Draw | OppTime(_) | Level{ .. }
            | Ponder | NoPonder => None,
            Protover(_) => {
                use Feature::*;
                Response::Feature(vec![Done(false)]).send();
                Response::Feature(vec![
                    Ping(true),
                    SetBoard(true),
                    MyName("cep".to_string()),
                    Analyze(true),
                    Memory(true),
                    Sigint(false),
                    Sigterm(false),
                    Debug(true),
                ]).send();
                Response::Feature(vec![Done(true)]).send();
                None
            },
            Ping(n) => {
                Response::Pong(n).send();
                None
            },
            Quit => {
                self.state = State::Quitting;
                Some(SearchAction::Abort)
            },
            New => {
                self.pos = Position::new();
                self.color = Some(Color::Black);
                Some(SearchAction::Abort)
            },
            Force => {
                self.color = None;
                Some(SearchAction::Abort)
            },
            Go => {
                self.color = Some(self.pos.turn());
                Some(SearchAction::Abort)
            },
            UserMove(move_str) => {
                if self.user_move(&move_str) {
                    Some(SearchAction::Abort)
                } else {
                    None
                }
            },
            SetBoard(fen) => {
                match fen.parse() {
                    Ok(pos) => self.pos = pos,
                    Err(err) => Response::ErrorMessage(line.to_string(), err.to_string()).send(),
                }
                Some(SearchAction::Abort)
            },
            GameResult{ .. } => {
                self.color = None;
                Some(SearchAction::Abort)
            },
            Undo => {
                self.pos.unmake_move();
                Some(SearchAction::Abort)
            },
            Remove => {
                self.pos.unmake_move();
                self.pos.unmake_move();
                Some(SearchAction::Abort)
            },
            MoveNow => {
                if self.state == State::Thinking {
                    Some(SearchAction::Stop)
                } else {
                    None
                }
            },
            Time(time) => {
                self.limits = SearchLimits {
                    depth: MAX_DEPTH - 1,
                    time: Some(time_per_move(time, self.pos.game_ply())),
                };
                None
            },
            SetTime(time) => {
                self.limits = SearchLimits { depth: MAX_DEPTH - 1, time: Some(time) };
                None
            },
            SetDepth(depth) => {
                self.limits = SearchLimits { depth, time: Some(DEPTH_ONLY_TIME) };
                None
            },
            Memory(mb) => {
                self.hash_size = min(mb, HashTable::MAX_SIZE_MB) << 20;
                None
            },
            Post => {
                self.post_thinking = true;
                None
            },
            NoPost => {
                self.post_thinking = false;
                None
            },
            Analyze => {
                self.analyzing = true;
                self.color = None;
                Some(SearchAction::Abort)
            },
            Exit => {
                self.analyzing = false;
                Some(SearchAction::Abort)
            },
            PrintBoard => {
                for line in self.pos.diagram().lines() {
                    self.send_debug_msg(line);
                }
                None
            },
            FixTime(time) => {
                self.fixed_time = Some(time);
                None
            },
            FreeTime => {
                self.fixed_time = None;
                None
            },
        }
    }
}

impl Protocol for Xboard {
    fn wait_for_search(&mut self) -> bool {
        while self.state == State::Idle {
            match self.client.recv() {
                Ok(line) => {
                    self.execute(&line);
                    self.update_state();
                },
                Err(_) => {
                    error!("lost connection to client");
                    self.state = State::Quitting;
                },
            }
        }

        self.state != State::Quitting
    }

    fn send_move(&mut self, thinking: &Thinking) {
        match self.state {
            State::Thinking => {
                match thinking.best_move() {
                    Some(mv) if self.pos.make_move(mv) => {
                        Response::Move(mv.to_string()).send();
                        self.check_result();
                    },
                    _ => {
                        error!("no move found in {}", self.pos);
                        self.color = None;
                    },
                }
                self.update_state();
            },
            // an analysis that ran out of depth waits for the next change
            _ => self.state = State::Idle,
        }
    }

    fn send_thinking(&mut self, thinking: &Thinking) {
        if self.post_thinking {
            let pv: Vec<String> = thinking.pv().iter().map(|mv| mv.to_string()).collect();
            Response::ThinkingOutput{
                depth: thinking.depth(),
                score: thinking.score().into(),
                time: thinking.time(),
                nodes: thinking.nodes(),
                pv: pv.join(" "),
            }.send();
        }
    }

    fn send_debug_msg(&mut self, msg: &str) {
        Response::DebugMessage(msg.to_string()).send();
    }

    fn check_input(&mut self) -> Option<SearchAction> {
        match self.client.try_recv() {
            Ok(line) => {
                let action = self.execute(&line);
                if action == Some(SearchAction::Abort) {
                    self.update_state();
                }
                action
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
        if self.state == State::Analyzing {
            return SearchLimits::infinite();
        }
        match self.fixed_time {
            Some(time) => SearchLimits { time: Some(time), ..self.limits },
            None => self.limits,
        }
    }

    fn hash_size(&self) -> usize {
        self.hash_size
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////
/// Commands which can be sent to the engine
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Tells the engine to use the xboard protocol.
    ///
    /// ```text
    /// xboard
    /// ```
    Xboard,

    /// Tells the engine which version of the xboard protocol to use.
    ///
    /// ```text
    /// protover <version>
    /// ```
    Protover(usize),

    /// Tells the engine that the requested feature is supported.
    ///
    /// ```text
    /// accepted <name>
    /// ```
    Accepted(String),

    /// Tells the engine that the requested feature is not supported.
    ///
    /// ```text
    /// rejected <name>
    /// ```
    Rejected(String),

    /// Request that the engine send a "pong" response when it is ready for more input.
    ///
    /// ```text
    /// ping <n>
    /// ```
    Ping(usize),

    /// Tells the engine to exit.
    ///
    /// ```text
    /// quit
    /// ```
    Quit,

    /// Begin a new game with the engine playing Black.
    ///
    /// ```text
    /// new
    /// ```
    New,

    /// Set the engine to receive moves but play neither side.
    ///
    /// ```text
    /// force
    /// ```
    Force,

    /// Sets the engine to begin playing the side currently on move.
    ///
    /// ```text
    /// go
    /// ```
    Go,

    /// Send a move to the engine.
    ///
    /// ```text
    /// <move>
    /// usermove <move>
    /// ```
    UserMove(String),

    /// Set the board to the given position.
    ///
    /// ```text
    /// setboard <fen>
    /// ```
    SetBoard(String),

    /// Offers a draw. Ignored.
    ///
    /// ```text
    /// draw
    /// ```
    Draw,

    /// Tells the engine that the game has ended with the given result.
    ///
    /// ```text
    /// result <result> [{<reason>}]
    /// ```
    GameResult{
        /// `1-0`, `0-1` or `1/2-1/2`
        result: String,
        /// An optional plain-text reason for the result, enclosed in curly braces.
        reason: Option<String>
    },

    /// Take back the last move.
    ///
    /// ```text
    /// undo
    /// ```
    Undo,

    /// Take back the last move by each side.
    ///
    /// ```text
    /// remove
    /// ```
    Remove,

    /// Tells the engine to move immediately.
    ///
    /// ```text
    /// ?
    /// ```
    MoveNow,

    /// Informs the engine of how much time it has remaining, in centiseconds.
    ///
    /// ```text
    /// time <remaining>
    /// ```
    Time(Duration),

    /// Informs the engine how much time its opponent has remaining, in centiseconds.
    ///
    /// ```text
    /// otim <remaining>
    /// ```
    OppTime(Duration),

    /// Sets the time controls. The engine budgets its time from `time` instead.
    ///
    /// ```text
    /// level <mps> <base> <inc>
    /// ```
    Level{
        /// The number of moves per session
        mps: usize,
        /// The initial amount of time for the game, in minutes or `M:SS`
        base: Duration,
        /// The amount of time added after each move, in seconds
        inc: Duration
    },

    /// Sets the amount of time to use for each move, in seconds.
    ///
    /// ```text
    /// st <time>
    /// ```
    SetTime(Duration),

    /// Limits the search depth to the depth given.
    ///
    /// ```text
    /// sd <depth>
    /// ```
    SetDepth(usize),

    /// Tells the engine how many megabytes the transposition table may use.
    ///
    /// ```text
    /// memory <n>
    /// ```
    Memory(usize),

    /// Turns on thinking output.
    ///
    /// ```text
    /// post
    /// ```
    Post,

    /// Turns off thinking output.
    ///
    /// ```text
    /// nopost
    /// ```
    NoPost,

    /// Turns on pondering. The engine doesn't ponder.
    ///
    /// ```text
    /// hard
    /// ```
    Ponder,

    /// Turns off pondering.
    ///
    /// ```text
    /// easy
    /// ```
    NoPonder,

    /// Starts analysing the current position until `exit`.
    ///
    /// ```text
    /// analyze
    /// ```
    Analyze,

    /// Leaves analysis mode.
    ///
    /// ```text
    /// exit
    /// ```
    Exit,

    /// Prints the board as debug output. Not part of the protocol.
    ///
    /// ```text
    /// printb
    /// ```
    PrintBoard,

    /// Forces the time used for each move, in milliseconds. Not part of the protocol.
    ///
    /// ```text
    /// fixtime <ms>
    /// ```
    FixTime(Duration),

    /// Cancels `fixtime`. Not part of the protocol.
    ///
    /// ```text
    /// freetime
    /// ```
    FreeTime,
}

impl FromStr for Command {
    type Err = XboardError;

    fn from_str(s: &str) -> Result<Self, XboardError> {
        use Command::*;

        let s = s.trim();
        if let Some(ind) = COMMAND_SET.matches(s).iter().next() {
            let args = COMMAND_VEC[ind].captures(s).ok_or(XboardError)?;
            let arg = |i: usize| args.get(i).map_or("", |m| m.as_str());

            match ind {
                0 => Ok(Xboard),
                1 => Ok(Protover(arg(1).parse()?)),
                2 => Ok(Accepted(arg(1).to_string())),
                3 => Ok(Rejected(arg(1).to_string())),
                4 => Ok(Ping(arg(1).parse()?)),
                5 => Ok(Quit),
                6 => Ok(New),
                7 => Ok(Force),
                8 => Ok(Go),
                9 => Ok(UserMove(arg(1).to_string())),
                10 => Ok(SetBoard(arg(1).to_string())),
                11 => Ok(Draw),
                12 => {
                    let result = arg(1).to_string();
                    let reason = args.get(2).map(|reason| reason.as_str().to_string());
                    Ok(GameResult{ result, reason })
                },
                13 => Ok(Undo),
                14 => Ok(Remove),
                15 => Ok(MoveNow),
                16 => Ok(Time(centiseconds(arg(1))?)),
                17 => Ok(OppTime(centiseconds(arg(1))?)),
                18 => {
                    let mps = arg(1).parse()?;
                    let base_m: u64 = arg(2).parse()?;
                    let base_s: u64 = if args.get(3).is_some() { arg(3).parse()? } else { 0 };
                    let inc: f64 = arg(4).parse()?;
                    let base = base_m.checked_mul(60).and_then(|m| m.checked_add(base_s))
                        .ok_or(XboardError)?;
                    let base = Duration::from_secs(base);
                    let inc = Duration::try_from_secs_f64(inc).map_err(|_| XboardError)?;
                    Ok(Level{ mps, base, inc })
                },
                19 => {
                    let time: f64 = arg(1).parse()?;
                    Ok(SetTime(Duration::try_from_secs_f64(time).map_err(|_| XboardError)?))
                },
                20 => Ok(SetDepth(arg(1).parse()?)),
                21 => Ok(Memory(arg(1).parse()?)),
                22 => Ok(Post),
                23 => Ok(NoPost),
                24 => Ok(Ponder),
                25 => Ok(NoPonder),
                26 => Ok(Analyze),
                27 => Ok(Exit),
                28 => Ok(PrintBoard),
                29 => {
                    let time: u64 = arg(1).parse()?;
                    Ok(FixTime(Duration::from_millis(time)))
                },
                30 => Ok(FreeTime),
                _ => Err(XboardError),
            }
        } else {
            Err(XboardError)
        }
    }
}

/// Parses a clock reading given in centiseconds.
fn centiseconds(s: &str) -> Result<Duration, XboardError> {
    let cs: u64 = s.parse()?;
    cs.checked_mul(10).map(Duration::from_millis).ok_or(XboardError)
}

const COMMANDS: [&str; 31] = [
    r"^xboard\b",
    r"^protover\s+(\d+)\b",
    r"^accepted\s+(\w+)\b",
    r"^rejected\s+(\w+)\b",
    r"^ping\s+(\d+)\b",
    r"^quit\b",
    r"^new\b",
    r"^force\b",
    r"^go\b",
    r"^(?:usermove\s+)?([a-h][1-8][a-h][1-8][qrbn]?)$",
    r"^setboard\s+(.+?)\s*$",
    r"^draw\b",
    r"^result\s+([-/012]+)\s*(?:\{([^}]+)\})?",
    r"^undo\b",
    r"^remove\b",
    r"^\?$",
    r"^time\s+(\d+)\b",
    r"^otim\s+(\d+)\b",
    r"^level\s+(\d+)\s+(\d+)(?::(\d\d))?\s+([0-9.]+)$",
    r"^st\s+([0-9.]+)$",
    r"^sd\s+(\d+)\b",
    r"^memory\s+(\d+)\b",
    r"^post\b",
    r"^nopost\b",
    r"^hard\b",
    r"^easy\b",
    r"^analyze\b",
    r"^exit\b",
    r"^printb\b",
    r"^fixtime\s+(\d+)\b",
    r"^freetime\b",
];

lazy_static! {
    static ref COMMAND_SET: RegexSet = RegexSet::new(&COMMANDS).expect("INFALLIBLE");
    static ref COMMAND_VEC: Vec<Regex> = COMMANDS.iter()
        .map(|cmd| Regex::new(cmd).expect("INFALLIBLE"))
        .collect();
}

////////////////////////////////////////////////////////////////////////////////////////////////////
/// Responses from the engine
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Response {
    /// Requests that the client use the given features. Only sent in response to `protover`.
    ///
    /// ```text
    /// feature NAME=VALUE ...
    /// ```
    Feature(Vec<Feature>),

    /// Response to the `ping` command indicating that the engine is ready for the next command.
    ///
    /// ```text
    /// pong N
    /// ```
    Pong(usize),

    /// Tells the client that the engine is making the given move.
    ///
    /// ```text
    /// move MOVE
    /// ```
    Move(String),

    /// Tells the client that the game has ended with the given result.
    ///
    /// ```text
    /// RESULT [{REASON}]
    /// ```
    GameResult(String, Option<String>),

    /// Tells the client the engine's current line of thinking.
    ///
    /// ```text
    /// <depth> <score> <time> <nodes> <pv>
    /// ```
    ThinkingOutput{
        /// The depth of the current search
        depth: usize,
        /// The value of the current line of thinking, in centipawns
        score: i32,
        /// The amount of time spent thinking on this position, sent in centiseconds
        time: Duration,
        /// The number of nodes searched
        nodes: u64,
        /// One or more moves that make up the principal variation
        pv: String
    },

    /// Tells the client that a move received from the client is illegal.
    ///
    /// ```text
    /// Illegal move [(REASON)]: MOVE
    /// ```
    IllegalMove(String, Option<String>),

    /// Tells the client that the engine doesn't understand the given command.
    ///
    /// ```text
    /// Error (ERRORTYPE): COMMAND
    /// ```
    ErrorMessage(String, String),

    /// A debug message which should be ignored by the client.
    ///
    /// ```text
    /// # MESSAGE
    /// ```
    DebugMessage(String),
}

impl Response {
    fn send(&self) {
        io::Client::send(&self.to_string());
    }
}

impl fmt::Display for Response {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use Response::*;

        match self {
            Feature(list) => {
                f.write_str("feature")?;
                for feature in list {
                    write!(f, " {}", feature)?;
                }
                Ok(())
            },
            Pong(n) => write!(f, "pong {}", n),
            Move(mov) => write!(f, "move {}", mov),
            GameResult(res, Some(reason)) => write!(f, "{} {{{}}}", res, reason),
            GameResult(res, None) => f.pad(res),
            ThinkingOutput{ depth, score, time, nodes, pv } =>
                write!(f, "{} {} {} {} {}", depth, score, time.as_millis()/10, nodes, pv),
            IllegalMove(mov, Some(reason)) => write!(f, "Illegal move ({}): {}", reason, mov),
            IllegalMove(mov, None) => write!(f, "Illegal move: {}", mov),
            ErrorMessage(cmd, err_type) => write!(f, "Error ({}): {}", err_type, cmd),
            DebugMessage(msg) => write!(f, "# {}", msg),
        }
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////
/// A protocol feature that can be requested by the engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Feature{
    /// Tells the client whether all features have been given. Defaults to using a timeout.
    Done(bool),
    /// Tells the client whether or not to send SIGINT on Linux. Defaults to `true`.
    Sigint(bool),
    /// Tells the client whether or not to send SIGTERM on Linux. Defaults to `true`.
    Sigterm(bool),
    /// Tells the client whether or not to use the `ping` command.
    Ping(bool),
    /// Tells the client whether or not to use the `setboard` command.
    SetBoard(bool),
    /// Tells the client the name of the engine.
    MyName(String),
    /// Enables the `memory` command.
    Memory(bool),
    /// Tells the client to ignore lines beginning with the `#` character.
    Debug(bool),
    /// Enables use of the `analyze` command.
    Analyze(bool),
}

impl fmt::Display for Feature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use Feature::*;

        match self {
            Done(val) => write!(f, "done={}", *val as usize),
            Sigint(val) => write!(f, "sigint={}", *val as usize),
            Sigterm(val) => write!(f, "sigterm={}", *val as usize),
            Ping(val) => write!(f, "ping={}", *val as usize),
            SetBoard(val) => write!(f, "setboard={}", *val as usize),
            MyName(val) => write!(f, "myname=\"{}\"", val),
            Memory(val) => write!(f, "memory={}", *val as usize),
            Debug(val) => write!(f, "debug={}", *val as usize),
            Analyze(val) => write!(f, "analyze={}", *val as usize),
        }
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////
/// Error returned for a malformed or unknown xboard command
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct XboardError;

impl fmt::Display for XboardError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad("unknown or incorrectly formatted command")
    }
}

impl std::error::Error for XboardError { }

impl From<ParseIntError> for XboardError {
    fn from(_: ParseIntError) -> XboardError {
        XboardError
    }
}

impl From<ParseFloatError> for XboardError {
    fn from(_: ParseFloatError) -> XboardError {
        XboardError
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////
// ***************************************** UNIT TESTS ***************************************** //
////////////////////////////////////////////////////////////////////////////////////////////////////
#[cfg(test)]
mod test {
    use super::*;
    use std::io::Cursor;

    fn xboard(input: &str) -> Xboard {
        let client = io::Client::from_reader(Cursor::new(input.to_string()));
        Xboard::with_client(client, &Config::default())
    }

    #[test]
    fn parse_command() {
        use Command::*;

        assert_eq!(Ok(Protover(2)), "protover 2".parse());
        assert_eq!(Ok(Accepted("ping".to_string())), "accepted ping".parse());
        assert_eq!(Ok(Rejected("sigint".to_string())), "rejected sigint".parse());
        assert_eq!(Ok(Ping(1234)), "ping 1234".parse());
        assert_eq!(Ok(UserMove("g1f3".to_string())), "usermove g1f3".parse());
        assert_eq!(Ok(UserMove("a7a8q".to_string())), "a7a8q".parse());
        assert_eq!(Ok(SetBoard("8/8/8/8/8/8/8/K1k5 w - -".to_string())),
            "setboard 8/8/8/8/8/8/8/K1k5 w - -".parse());
        assert_eq!(Ok(
            GameResult{
                result: "1/2-1/2".to_string(),
                reason: Some("stalemate".to_string())
            }),
            "result 1/2-1/2 {stalemate}".parse()
        );
        assert_eq!(Ok(GameResult{ result: "0-1".to_string(), reason: None }),
            "result 0-1".parse());
        assert_eq!(Ok(MoveNow), "?".parse());
        assert_eq!(Ok(Time(Duration::from_millis(1020))), "time 102".parse());
        assert_eq!(Ok(OppTime(Duration::from_millis(50))), "otim 5".parse());
        assert_eq!(Ok(
            Level{ mps: 0, base: Duration::from_secs(90), inc: Duration::from_secs(12) }),
            "level 0 1:30 12".parse()
        );
        assert_eq!(Ok(
            Level{ mps: 40, base: Duration::from_secs(120), inc: Duration::from_millis(500) }),
            "level 40 2 0.5".parse()
        );
        assert_eq!(Ok(SetTime(Duration::from_secs(5))), "st 5".parse());
        assert_eq!(Ok(SetTime(Duration::from_millis(250))), "st 0.25".parse());
        assert_eq!(Ok(SetDepth(12)), "sd 12".parse());
        assert_eq!(Ok(Memory(512)), "memory 512".parse());
        assert_eq!(Ok(Analyze), "analyze".parse());
        assert_eq!(Ok(Exit), "exit".parse());
        assert_eq!(Ok(PrintBoard), "printb".parse());
        assert_eq!(Ok(FixTime(Duration::from_millis(1500))), "fixtime 1500".parse());
        assert_eq!(Ok(FreeTime), "freetime".parse());

        assert_eq!(Err::<Command, _>(XboardError), "e2e9".parse());
        assert_eq!(Err::<Command, _>(XboardError), "ping".parse());
        assert_eq!(Err::<Command, _>(XboardError), "st fast".parse());
        assert_eq!(Err::<Command, _>(XboardError), "bogus".parse());
    }

    #[test]
    fn parse_out_of_range_numbers() {
        assert_eq!(Err::<Command, _>(XboardError), "st 99999999999999999999999".parse());
        assert_eq!(Err::<Command, _>(XboardError), "level 40 5 99999999999999999999999".parse());
        assert_eq!(Err::<Command, _>(XboardError), "level 40 18446744073709551615 0".parse());
        assert_eq!(Err::<Command, _>(XboardError), "time 18446744073709551615".parse());
        assert_eq!(Err::<Command, _>(XboardError), "otim 18446744073709551615".parse());
        assert_eq!(Err::<Command, _>(XboardError), "time 99999999999999999999999".parse());
        assert_eq!(Ok(Command::Memory(usize::MAX)), "memory 18446744073709551615".parse());
    }

    #[test]
    fn format_response() {
        use Response::*;

        assert_eq!(Feature(vec![
            super::Feature::Ping(true),
            super::Feature::MyName("cep".to_string()),
            super::Feature::Sigint(false),
        ]).to_string(), "feature ping=1 myname=\"cep\" sigint=0");
        assert_eq!(Pong(512).to_string(), "pong 512");
        assert_eq!(Move("g1f3".to_string()).to_string(), "move g1f3");
        assert_eq!(GameResult("1/2-1/2".to_string(), Some("stalemate".to_string())).to_string(),
            "1/2-1/2 {stalemate}");
        assert_eq!(GameResult("0-1".to_string(), None).to_string(), "0-1");
        assert_eq!(ThinkingOutput{
            depth: 4,
            score: -23,
            time: Duration::from_millis(1234),
            nodes: 5678,
            pv: "e2e4 e7e5".to_string(),
        }.to_string(), "4 -23 123 5678 e2e4 e7e5");
        assert_eq!(IllegalMove("g1f3".to_string(), None).to_string(), "Illegal move: g1f3");
        assert_eq!(ErrorMessage("foo".to_string(), "unknown command".to_string()).to_string(),
            "Error (unknown command): foo");
        assert_eq!(DebugMessage("message".to_string()).to_string(), "# message");
    }

    #[test]
    fn time_budget() {
        // 48 moves expected at the start: 60 s / (0.35 * 48) - 50 ms
        assert_eq!(time_per_move(Duration::from_secs(60), 0), Duration::from_millis(3521));
        // fewer moves expected later on, so more time for each
        assert!(time_per_move(Duration::from_secs(60), 40) > Duration::from_millis(3521));
        assert_eq!(time_per_move(Duration::from_millis(10), 0), Duration::from_millis(0));
    }

    #[test]
    fn game_flow() {
        let mut xb = xboard("new\nusermove e2e4\nforce\n");
        assert!(xb.wait_for_search());
        assert_eq!(xb.position().turn(), Color::Black);
        assert_eq!(xb.limits(), Config::default().limits());

        // the rest of the input arrives while thinking
        let mut actions = Vec::new();
        while let Ok(line) = xb.client.recv() {
            actions.push(xb.execute(&line));
            if line == "quit" {
                break;
            }
        }
        assert_eq!(actions, vec![Some(SearchAction::Abort), Some(SearchAction::Abort)]);
        xb.update_state();
        assert_eq!(xb.state, State::Quitting);
        assert!(!xb.wait_for_search());
    }

    #[test]
    fn settings() {
        let mut xb = xboard("");
        xb.execute("sd 6");
        assert_eq!(xb.limits(), SearchLimits { depth: 6, time: Some(DEPTH_ONLY_TIME) });
        xb.execute("st 2");
        assert_eq!(xb.limits(), SearchLimits {
            depth: MAX_DEPTH - 1,
            time: Some(Duration::from_secs(2)),
        });
        xb.execute("fixtime 300");
        assert_eq!(xb.limits().time, Some(Duration::from_millis(300)));
        xb.execute("time 6000");
        assert_eq!(xb.limits().time, Some(Duration::from_millis(300)));
        xb.execute("freetime");
        assert_eq!(xb.limits().time, Some(Duration::from_millis(3521)));
        xb.execute("memory 4");
        assert_eq!(xb.hash_size(), 4 << 20);
        xb.execute("memory 18446744073709551615");
        assert_eq!(xb.hash_size(), HashTable::MAX_SIZE_MB << 20);
        xb.execute("st 99999999999999999999999");
        assert_eq!(xb.limits().time, Some(Duration::from_millis(3521)));

        assert!(!xb.post_thinking);
        xb.execute("post");
        assert!(xb.post_thinking);
    }

    #[test]
    fn moves_and_results() {
        let mut xb = xboard("");
        xb.execute("force");
        assert_eq!(xb.execute("e2e5"), None);
        assert_eq!(xb.position().turn(), Color::White);

        for mv in ["f2f3", "e7e5", "g2g4"].iter() {
            assert_eq!(xb.execute(mv), Some(SearchAction::Abort));
        }
        xb.execute("go");
        xb.update_state();
        assert_eq!(xb.state, State::Thinking);
        assert_eq!(xb.color, Some(Color::Black));

        // the engine mates; afterwards it plays neither side
        xb.execute("force");
        xb.execute("d8h4");
        assert_eq!(xb.color, None);
        xb.update_state();
        assert_eq!(xb.state, State::Idle);

        xb.execute("undo");
        assert_eq!(xb.position().turn(), Color::Black);
        xb.execute("setboard not a fen");
        assert_eq!(xb.position().turn(), Color::Black);
        xb.execute("setboard 4k3/8/8/8/8/8/8/4K3 w - - 18446744073709551615 1");
        assert_eq!(xb.position().turn(), Color::Black);
        xb.execute("setboard 7k/8/8/8/8/8/8/K7 w - - 0 1");
        assert_eq!(xb.position().to_fen(), "7k/8/8/8/8/8/8/K7 w - - 0 1");
    }

    #[test]
    fn analysis() {
        let mut xb = xboard("");
        xb.execute("analyze");
        xb.update_state();
        assert_eq!(xb.state, State::Analyzing);
        assert_eq!(xb.limits(), SearchLimits::infinite());
        assert_eq!(xb.execute("?"), None);
        assert_eq!(xb.execute("e2e4"), Some(SearchAction::Abort));
        xb.update_state();
        assert_eq!(xb.state, State::Analyzing);
        xb.execute("exit");
        xb.update_state();
        assert_eq!(xb.state, State::Idle);
    }
}
