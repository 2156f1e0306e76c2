//! The cep chess engine.
//
//  This Source Code Form is subject to the terms of the Mozilla Public
//  License, v. 2.0. If a copy of the MPL was not distributed with this
//  file, You can obtain one at http://mozilla.org/MPL/2.0/.
//
////////////////////////////////////////////////////////////////////////////////////////////////////
#![warn(missing_docs, missing_debug_implementations, unused_extern_crates)]
#![warn(clippy::unimplemented, clippy::todo)]
#![warn(clippy::option_unwrap_used, clippy::result_unwrap_used)]

use std::fs::File;
use std::path::{Path, PathBuf};
use clap::{App, Arg, SubCommand, crate_version};
use log::info;
use simplelog::{WriteLogger, LevelFilter};
use cep::chess::{variations, Position};
use cep::config::{self, Config};
use cep::engine::Engine;
use cep::protocol::console::Console;
use cep::protocol::xboard::Xboard;

fn main() -> Result<(), Error> {
    let matches =
        App::new("cep")
            .version(crate_version!())
            .about("A bitboard chess engine for xboard and the console")
            .arg(Arg::with_name("xboard")
                .long("xboard")
                .hidden(true)
                .help("Uses the xboard interface"))
            .arg(Arg::with_name("log")
                .long("log")
                .short("l")
                .global(true)
                .help("Turns on logging"))
            .arg(Arg::with_name("log-file")
                .long("log-file")
                .global(true)
                .value_name("LOG_FILE")
                .takes_value(true)
                .default_value("cep.log")
                .help("Sets the log file if logging is turned on"))
            .arg(Arg::with_name("log-level")
                .long("log-level")
                .global(true)
                .value_name("LEVEL")
                .takes_value(true)
                .default_value("info")
                .possible_values(&["off", "error", "warn", "info", "debug", "trace"])
                .help("Sets the log level if logging is turned on"))
            .arg(Arg::with_name("config")
                .long("config")
                .short("c")
                .value_name("FILE")
                .takes_value(true)
                .help("Reads engine settings from a YAML file [default: ~/.cep/config.yaml]"))
            .subcommand(SubCommand::with_name("perft")
                .about("Counts the number of variations from a given starting position \
                        to a specified\ndepth. Defaults to the standard starting position.")
                .arg(Arg::with_name("depth")
                    .long("depth")
                    .short("d")
                    .value_name("DEPTH")
                    .takes_value(true)
                    .required(true)
                    .help("Depth to search the position"))
                .arg(Arg::with_name("fen")
                    .value_name("FEN_STRING")
                    .default_value("rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1")
                    .hide_default_value(true)
                    .multiple(true)
                    .help("Position to search in Forsyth-Edwards Notation (FEN)")))
            .get_matches();

    let log_file = PathBuf::from(matches.value_of_os("log-file").expect("INFALLIBLE"));
    let log_level = match matches.value_of("log-level") {
        Some("off") => LevelFilter::Off,
        Some("error") => LevelFilter::Error,
        Some("warn") => LevelFilter::Warn,
        Some("info") => LevelFilter::Info,
        Some("debug") => LevelFilter::Debug,
        Some("trace") => LevelFilter::Trace,
        Some(level) => return Err(Error(format!("{}: invalid log level", level))),
        None => unreachable!(),
    };

    let _logger = if matches.is_present("log") {
        WriteLogger::init(
            log_level,
            simplelog::Config::default(),
            File::create(&log_file).map_err(|err| {
                Error(format!("{}: {}", log_file.display(), err))
            })?)
    } else {
        WriteLogger::init(LevelFilter::Off, simplelog::Config::default(), std::io::sink())
    };

    cep::init();

    match matches.subcommand() {
        (_, None) => {
            let config = Config::load(matches.value_of_os("config").map(Path::new))?;
            info!("cep {} starting", crate_version!());
            play(&config, matches.is_present("xboard"));
        },
        ("perft", Some(matches)) => {
            let depth = matches
                .value_of("depth")
                .expect("INFALLIBLE")
                .parse()
                .map_err(|_| {Error("depth must be numeric".to_owned())})?;

            println!();
            for fen in matches.values_of("fen").expect("INFALLIBLE") {
                let mut pos: Position =
                    fen.parse().map_err(|err| {Error(format!("{}: {}", fen, err))})?;
                println!("{}", fen);
                let count = variations::print(&mut pos, depth);
                println!("Depth {} total:\t{:12}\n", depth, count);
            }
        },
        _ => unreachable!(),
    }

    Ok(())
}

/// Runs the engine on stdin and stdout until the user quits. The console hands its connection
/// over when it receives `xboard`.
fn play(config: &Config, xboard: bool) {
    if xboard {
        Engine::new(Xboard::new(config)).run();
        return;
    }

    println!("cep {}", crate_version!());
    let mut engine = Engine::new(Console::new(config));
    engine.run();

    let console = engine.into_protocol();
    if console.xboard_requested() {
        info!("switching to xboard");
        Engine::new(Xboard::with_client(console.into_client(), config)).run();
    }
}

struct Error(String);

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> Result<(), std::fmt::Error> {
        std::fmt::Display::fmt(&self.0, f)
    }
}

impl std::fmt::Debug for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> Result<(), std::fmt::Error> {
        std::fmt::Display::fmt(&self.0, f)
    }
}

impl std::error::Error for Error { }

impl From<config::Error> for Error {
    fn from(err: config::Error) -> Error {
        Error(err.to_string())
    }
}
