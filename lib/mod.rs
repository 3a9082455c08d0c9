pub mod ast;
pub mod environment;
pub mod evaluator;
pub mod lexer;
pub mod object;
pub mod parser;
pub mod token;

mod engine;
mod interpreter;

pub use engine::Engine;
pub use environment::{Env, Environment};
pub use evaluator::Evaluator;
pub use interpreter::{new_interpreter, Interpreter, StandardLibrary};
pub use lexer::Lexer;
pub use object::{Builtins, Object};
pub use parser::{parse, Parser};
