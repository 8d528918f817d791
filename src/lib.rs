pub mod app;
pub mod cli;
pub mod config;
pub mod display;
pub mod lcd_driver;
pub mod link;
pub mod printer;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug)]
pub enum Error {
    InvalidArgs(String),
    Io(std::io::Error),
    Http(String),
    Parse(String),
    LinkDown(String),
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::InvalidArgs(msg) => write!(f, "invalid arguments: {msg}"),
            Error::Io(err) => write!(f, "io error: {err}"),
            Error::Http(msg) => write!(f, "http error: {msg}"),
            Error::Parse(msg) => write!(f, "parse error: {msg}"),
            Error::LinkDown(msg) => write!(f, "link down: {msg}"),
        }
    }
}

impl std::error::Error for Error {}

impl From<std::io::Error> for Error {
    fn from(value: std::io::Error) -> Self {
        Error::Io(value)
    }
}
