//! Handles the engine's input and output with the client.
//
//  This Source Code Form is subject to the terms of the Mozilla Public
//  License, v. 2.0. If a copy of the MPL was not distributed with this
//  file, You can obtain one at http://mozilla.org/MPL/2.0/.
//
////////////////////////////////////////////////////////////////////////////////////////////////////
use std::io::{self, BufRead, Write};
use std::thread;
use std::sync::mpsc::*;
use log::{info, error};

/// Provides a pollable interface with the client using stdin and stdout. All input and output is
/// logged using the log crate (assuming a logger is set up).
///
/// When stdin is closed the client receives a final `quit` line.
#[derive(Debug)]
pub struct Client(Receiver<String>);

impl Client {
    /// Creates and returns a new interface.
    pub fn connect() -> Self {
        let (sender, receiver) = channel();
        thread::spawn(move || {
            let stdin = io::stdin();
            Self::thread(stdin.lock(), sender);
        });

        Self(receiver)
    }

    /// Creates an interface that reads its input from `input` instead of stdin.
    pub fn from_reader<R>(input: R) -> Self where R: BufRead + Send + 'static {
        let (sender, receiver) = channel();
        thread::spawn(move || {
            Self::thread(input, sender);
        });

        Self(receiver)
    }

    /// Retrieves a message from the client. Blocks until a message is received.
    pub fn recv(&self) -> Result<String, RecvError> {
        self.0.recv()
    }

    /// Tries to retrieve a message from the client, but does not block if a message is not
    /// available.
    pub fn try_recv(&self) -> Result<String, TryRecvError> {
        self.0.try_recv()
    }

    /// Sends a message to the client.
    pub fn send(s: &str) {
        println!("{}", s);
        info!("<engine>: {}", s);
    }

    /// Writes a prompt without ending the line.
    pub fn prompt(s: &str) {
        print!("{}", s);
        let _ = io::stdout().flush();
    }

    /// Reads lines from `input` and passes them on until the input ends or the receiving side
    /// goes away. Runs in its own thread.
    fn thread<R: BufRead>(mut input: R, sender: Sender<String>) {
        loop {
            let mut line = String::new();

            match input.read_line(&mut line) {
                Ok(0) => {
                    error!("input closed");
                    let _ = sender.send("quit".to_owned());
                    return;
                },
                Ok(_) => { },
                Err(err) => {
                    error!("io error: {}", err);
                    let _ = sender.send("quit".to_owned());
                    return;
                },
            }

            let line = line.trim().to_string();
            info!("<client>: {}", line);
            if let Err(err) = sender.send(line) {
                error!("internal error: {}", err);
                return;
            }
        }
    }
}
