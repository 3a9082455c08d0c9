use std::io::{self, Write};

use anyhow::Result;
use wolf404::{token::TokenKind, Interpreter, Lexer, Object};

const WOLF_FACE: &str = r#"
     /\         /\
    /  \_______/  \
   |   _       _   |
   |  (o)     (o)  |
    \      ^      /
     \   \___/   /
      '---------'
"#;

const PROMPT: &str = ">> ";
const CONTINUATION_PROMPT: &str = ".. ";

pub fn start() -> Result<()> {
    let mut interpreter = Interpreter::new();
    let stdin = io::stdin();

    loop {
        print!("{}", PROMPT);
        io::stdout().flush()?;

        let mut input = String::new();
        if stdin.read_line(&mut input)? == 0 {
            return Ok(());
        }

        // a block header keeps reading until an empty line
        if opens_block(&input) {
            loop {
                print!("{}", CONTINUATION_PROMPT);
                io::stdout().flush()?;

                let mut line = String::new();
                if stdin.read_line(&mut line)? == 0 || line.trim().is_empty() {
                    break;
                }
                input.push_str(&line);
            }
        }

        match interpreter.eval(&input) {
            Ok(Object::Null) => {}
            Ok(evaluated) => println!("{}", evaluated),
            Err(err) => {
                println!("{}", WOLF_FACE);
                println!("Awoo! The pack lost the scent:");
                println!("{}", err);
            }
        }
    }
}

fn opens_block(line: &str) -> bool {
    matches!(
        Lexer::new(line).next().map(|token| token.kind),
        Some(TokenKind::Hunt | TokenKind::Sniff | TokenKind::Track | TokenKind::Mold)
    )
}
