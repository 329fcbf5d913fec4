pub mod cursor;
mod scanner;
pub mod token;

pub use scanner::Lexer;
pub use token::{Token, TokenKind};
