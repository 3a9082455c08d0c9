mod builtins;

use std::{
    cell::RefCell,
    fs,
    io::{self, Write},
    path::Path,
    rc::Rc,
};

use anyhow::{bail, Context, Result};
use tracing::debug;

pub use builtins::StandardLibrary;

use crate::{
    environment::{Env, Environment},
    evaluator::Evaluator,
    object::{Builtins, Object},
    parser::parse,
    Engine,
};

pub fn new_interpreter() -> Box<dyn Engine> {
    Box::new(Interpreter::new())
}

/// The standard engine: one global scope that lives across `run` calls,
/// with the standard library registered.
pub struct Interpreter {
    evaluator: Evaluator,
    env: Env,
}

impl Interpreter {
    pub fn new() -> Self {
        Self::with_output(Rc::new(RefCell::new(io::stdout())))
    }

    /// Sends everything `howl` prints to `output`.
    pub fn with_output(output: Rc<RefCell<dyn Write>>) -> Self {
        Self::with_builtins(StandardLibrary::builtins(output))
    }

    pub fn with_builtins(builtins: Builtins) -> Self {
        Self {
            evaluator: Evaluator::new(builtins),
            env: Environment::new(),
        }
    }

    pub fn with_task_error_sink(mut self, sink: impl FnMut(&str) + 'static) -> Self {
        self.evaluator = self.evaluator.with_task_error_sink(sink);
        self
    }

    pub fn env(&self) -> &Env {
        &self.env
    }

    /// Parses and evaluates `input` in the global scope.
    pub fn eval(&mut self, input: &str) -> Result<Object> {
        let program = parse(input)?;
        match self.evaluator.eval_program(&program, &self.env) {
            Object::Error(message) => bail!(message),
            object => Ok(object),
        }
    }

    pub fn run_file(&mut self, path: &Path) -> Result<Object> {
        debug!(path = %path.display(), "running file");
        let source = fs::read_to_string(path)
            .with_context(|| format!("could not read {}", path.display()))?;
        self.eval(&source)
            .with_context(|| format!("error in {}", path.display()))
    }
}

impl Default for Interpreter {
    fn default() -> Self {
        Self::new()
    }
}

impl Engine for Interpreter {
    fn run(&mut self, input: &str) -> Result<String> {
        let result = self.eval(input)?;
        Ok(result.to_string())
    }
}
