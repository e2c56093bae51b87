//! Operator-facing console output.
//!
//! Separate from the tracing log: this is what the person at the terminal
//! reads. Each line is `[HH:MM:SS] <marker> message`.

use colored::{ColoredString, Colorize};

/// Which way a console line is going.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Line received from the server.
    In,
    /// Line written to the server.
    Out,
    Notification,
    Error,
}

impl Direction {
    pub fn marker(self) -> &'static str {
        match self {
            Direction::In => ">>>",
            Direction::Out => "<<<",
            Direction::Notification => "---",
            Direction::Error => "!!!",
        }
    }

    fn paint(self, text: String) -> ColoredString {
        match self {
            Direction::In => text.green(),
            Direction::Out => text.cyan(),
            Direction::Notification => text.yellow(),
            Direction::Error => text.red(),
        }
    }
}

/// Format a console line without colour.
pub fn format_line(timestamp: &str, direction: Direction, message: &str) -> String {
    format!("[{timestamp}] {} {message}", direction.marker())
}

/// Print a line to stdout with the current local time.
pub fn write(direction: Direction, message: &str) {
    let timestamp = chrono::Local::now().format("%H:%M:%S").to_string();
    println!("{}", direction.paint(format_line(&timestamp, direction, message)));
}

pub fn incoming(message: &str) {
    write(Direction::In, message);
}

pub fn outgoing(message: &str) {
    write(Direction::Out, message);
}

pub fn notify(message: &str) {
    write(Direction::Notification, message);
}

pub fn error(message: &str) {
    write(Direction::Error, message);
}
