use std::{
    collections::{HashMap, VecDeque},
    fs,
    rc::Rc,
};

use anyhow::{anyhow, bail, Result};
use tracing::{debug, trace, warn};

use crate::{
    ast::{Expression, Program, Statement},
    environment::{Env, Environment},
    lexer::Lexer,
    object::{BoundMethod, Builtins, Class, Function, Instance, Object},
    parser::Parser,
    token::TokenKind,
};

const TRUE: Object = Object::Boolean(true);
const FALSE: Object = Object::Boolean(false);
const NULL: Object = Object::Null;

pub const MAX_TRACK_ITERATIONS: usize = 1_000_000;

/// Nested calls and `summon`s allowed before evaluation fails instead of
/// overflowing the host stack.
pub const MAX_CALL_DEPTH: usize = 1_000;

/// Stack to give the thread that runs the evaluator so that
/// [`MAX_CALL_DEPTH`] frames fit, unoptimized builds included.
pub const STACK_SIZE: usize = 256 * 1024 * 1024;

/// A `prowl` call waiting to run against the bindings it was queued with.
struct Task {
    call: Expression,
    env: Env,
}

pub struct Evaluator {
    env: Env,
    builtins: Builtins,
    tasks: VecDeque<Task>,
    task_error_sink: Box<dyn FnMut(&str)>,
    depth: usize,
}

impl Evaluator {
    pub fn new(builtins: Builtins) -> Self {
        Self {
            env: Environment::new(),
            builtins,
            tasks: VecDeque::new(),
            task_error_sink: Box::new(|message: &str| warn!(error = message, "prowl task failed")),
            depth: 0,
        }
    }

    /// Replaces the default sink, which logs failed `prowl` tasks as warnings.
    pub fn with_task_error_sink(mut self, sink: impl FnMut(&str) + 'static) -> Self {
        self.task_error_sink = Box::new(sink);
        self
    }

    /// Evaluates `program` in `env`, then drains any queued `prowl` tasks.
    /// A runtime error becomes the program's result as [`Object::Error`].
    #[tracing::instrument(level = "debug", skip_all, fields(statements = program.statements.len()))]
    pub fn eval_program(&mut self, program: &Program, env: &Env) -> Object {
        let result = self.eval_with_env(env.clone(), |this| this.eval_statements(&program.statements));
        self.run_tasks();
        match result {
            Ok(object) => object,
            Err(err) => Object::Error(err.to_string()),
        }
    }

    fn run_tasks(&mut self) {
        while let Some(task) = self.tasks.pop_front() {
            trace!(call = %task.call, "running prowl task");
            let call = task.call;
            if let Err(err) = self.eval_with_env(task.env, |this| this.eval_expression(&call)) {
                (self.task_error_sink)(&err.to_string());
            }
        }
    }

    fn eval_with_env<T>(&mut self, env: Env, f: impl FnOnce(&mut Self) -> Result<T>) -> Result<T> {
        let old_env = std::mem::replace(&mut self.env, env);
        let result = f(self);
        self.env = old_env;
        result
    }

    fn enter_frame<T>(&mut self, f: impl FnOnce(&mut Self) -> Result<T>) -> Result<T> {
        if self.depth == MAX_CALL_DEPTH {
            bail!("maximum call depth exceeded");
        }
        self.depth += 1;
        let result = f(self);
        self.depth -= 1;
        result
    }

    /// Runs a statement list the way a whole file runs: a `bring` stops the
    /// list and its value becomes the result.
    fn eval_statements(&mut self, statements: &[Statement]) -> Result<Object> {
        let mut result = NULL;
        for statement in statements {
            result = match self.eval_statement(statement)? {
                Object::ReturnValue(value) => return Ok(*value),
                object => object,
            };
        }
        Ok(result)
    }

    fn eval_statement(&mut self, statement: &Statement) -> Result<Object> {
        let object = match statement {
            Statement::Expression(expression) => self.eval_expression(expression)?,
            Statement::Block(statements) => self.eval_block_statement(statements)?,
            Statement::Return(expression) => {
                let value = self.eval_expression(expression)?;
                return Ok(Object::ReturnValue(Box::new(value)));
            }
            Statement::Class {
                name,
                superclass,
                body,
            } => self.eval_class_statement(name, superclass.as_deref(), body)?,
            Statement::Track { condition, body } => self.eval_track_statement(condition, body)?,
            Statement::Summon(path) => self.eval_summon_statement(path)?,
            Statement::Prowl(call) => {
                debug!(call = %call, "queued prowl task");
                let env = self.env.borrow().snapshot();
                self.tasks.push_back(Task {
                    call: call.clone(),
                    env,
                });
                NULL
            }
        };
        Ok(object)
    }

    fn eval_block_statement(&mut self, statements: &[Statement]) -> Result<Object> {
        let mut result = NULL;
        for statement in statements {
            result = self.eval_statement(statement)?;
            if let Object::ReturnValue(_) = result {
                return Ok(result);
            }
        }
        Ok(result)
    }

    fn eval_class_statement(
        &mut self,
        name: &str,
        superclass: Option<&str>,
        body: &Statement,
    ) -> Result<Object> {
        let superclass = match superclass {
            Some(superclass) => match self.eval_identifier_expression(superclass)? {
                Object::Class(class) => Some(class),
                other => bail!("superclass of {} must be a class, got {}", name, other),
            },
            None => None,
        };

        let mut methods = HashMap::new();
        if let Statement::Block(statements) = body {
            for statement in statements {
                if let Statement::Expression(Expression::FunctionLiteral {
                    name: Some(method),
                    parameters,
                    body,
                }) = statement
                {
                    let function = Function {
                        name: Some(method.clone()),
                        parameters: parameters.clone(),
                        body: (**body).clone(),
                        env: self.env.clone(),
                    };
                    methods.insert(method.clone(), Rc::new(function));
                }
            }
        }

        debug!(class = name, methods = methods.len(), "defined class");

        let class = Object::Class(Rc::new(Class {
            name: name.to_string(),
            methods,
            superclass,
        }));
        self.env.borrow_mut().define(name, class.clone());
        Ok(class)
    }

    fn eval_track_statement(&mut self, condition: &Expression, body: &Statement) -> Result<Object> {
        let mut result = NULL;
        let mut iterations = 0;
        loop {
            if iterations == MAX_TRACK_ITERATIONS {
                bail!("track exceeded {} iterations", MAX_TRACK_ITERATIONS);
            }
            if !self.eval_expression(condition)?.is_truthy() {
                break;
            }
            iterations += 1;
            result = self.eval_statement(body)?;
            if let Object::ReturnValue(_) = result {
                return Ok(result);
            }
        }
        Ok(result)
    }

    fn eval_summon_statement(&mut self, path: &str) -> Result<Object> {
        debug!(path, "summoning");
        let source =
            fs::read_to_string(path).map_err(|err| anyhow!("could not summon {}: {}", path, err))?;

        let mut parser = Parser::new(Lexer::new(&source));
        let program = parser.parse_program();
        if !parser.errors().is_empty() {
            bail!("could not parse {}: {}", path, parser.errors().join("; "));
        }

        self.enter_frame(|this| this.eval_statements(&program.statements))
    }

    fn eval_expression(&mut self, expression: &Expression) -> Result<Object> {
        let object = match expression {
            Expression::IntegerLiteral(value) => Object::Integer(*value),
            Expression::FloatLiteral(value) => Object::Float(*value),
            Expression::StringLiteral(value) => Object::String(value.clone()),
            Expression::BooleanLiteral(value) => self.native_bool_to_boolean_object(*value),
            Expression::NilLiteral => NULL,
            Expression::Prefix { operator, right } => {
                let right = self.eval_expression(right)?;
                self.eval_prefix_expression(*operator, right)?
            }
            Expression::Infix {
                left,
                operator,
                right,
            } => match operator {
                TokenKind::Assign => self.eval_assignment(left, right)?,
                TokenKind::Dot => self.eval_property(left, right)?,
                TokenKind::And | TokenKind::Or => self.eval_logical(left, *operator, right)?,
                _ => {
                    let left = self.eval_expression(left)?;
                    let right = self.eval_expression(right)?;
                    self.eval_infix_expression(left, *operator, right)?
                }
            },
            Expression::If {
                condition,
                consequence,
                alternative,
            } => self.eval_if_expression(condition, consequence, alternative.as_deref())?,
            Expression::Identifier(name) => self.eval_identifier_expression(name)?,
            Expression::FunctionLiteral {
                name,
                parameters,
                body,
            } => {
                let function = Object::Function(Rc::new(Function {
                    name: name.clone(),
                    parameters: parameters.clone(),
                    body: (**body).clone(),
                    env: self.env.clone(),
                }));
                if let Some(name) = name {
                    self.env.borrow_mut().define(name, function.clone());
                }
                function
            }
            Expression::Call {
                function,
                arguments,
            } => self.eval_call_expression(function, arguments)?,
            Expression::ArrayLiteral(elements) => {
                let elements = elements
                    .iter()
                    .map(|e| self.eval_expression(e))
                    .collect::<Result<Vec<Object>>>()?;
                Object::array(elements)
            }
            Expression::HashLiteral(pairs) => self.eval_hash_literal(pairs)?,
            Expression::Index { left, index } => self.eval_index(left, index)?,
        };
        Ok(object)
    }

    fn eval_assignment(&mut self, target: &Expression, value: &Expression) -> Result<Object> {
        match target {
            Expression::Identifier(name) => {
                let value = self.eval_expression(value)?;
                self.env.borrow_mut().assign(name, value.clone());
                Ok(value)
            }
            Expression::Infix {
                left,
                operator: TokenKind::Dot,
                right,
            } => {
                let Expression::Identifier(field) = &**right else {
                    bail!("invalid property name: {}", right);
                };
                let object = self.eval_expression(left)?;
                let value = self.eval_expression(value)?;
                match object {
                    Object::Instance(instance) => {
                        instance
                            .fields
                            .borrow_mut()
                            .insert(field.clone(), value.clone());
                        Ok(value)
                    }
                    other => bail!("cannot set property {} on {}", field, other.type_name()),
                }
            }
            _ => bail!("invalid assignment target: {}", target),
        }
    }

    fn eval_property(&mut self, left: &Expression, right: &Expression) -> Result<Object> {
        let Expression::Identifier(name) = right else {
            bail!("invalid property name: {}", right);
        };
        match self.eval_expression(left)? {
            Object::Instance(instance) => {
                if let Some(value) = instance.fields.borrow().get(name) {
                    return Ok(value.clone());
                }
                match instance.class.find_method(name) {
                    Some(method) => Ok(Object::BoundMethod(Rc::new(BoundMethod {
                        receiver: instance.clone(),
                        method,
                    }))),
                    None => bail!(
                        "undefined property {} on {} instance",
                        name,
                        instance.class.name
                    ),
                }
            }
            other => bail!("cannot read property {} of {}", name, other.type_name()),
        }
    }

    fn eval_logical(
        &mut self,
        left: &Expression,
        operator: TokenKind,
        right: &Expression,
    ) -> Result<Object> {
        let left = self.eval_expression(left)?.is_truthy();
        match (operator, left) {
            (TokenKind::And, false) => Ok(FALSE),
            (TokenKind::Or, true) => Ok(TRUE),
            _ => {
                let right = self.eval_expression(right)?.is_truthy();
                Ok(self.native_bool_to_boolean_object(right))
            }
        }
    }

    fn eval_hash_literal(&mut self, pairs: &[(Expression, Expression)]) -> Result<Object> {
        let mut hash = HashMap::new();
        for (key, value) in pairs {
            let key = self.eval_expression(key)?;
            if !key.hashable() {
                bail!("unusable as hash key: {}", key)
            }
            let value = self.eval_expression(value)?;
            hash.insert(key, value);
        }
        Ok(Object::Hash(hash))
    }

    fn eval_index(&mut self, left: &Expression, index: &Expression) -> Result<Object> {
        let left = self.eval_expression(left)?;
        let index = self.eval_expression(index)?;
        match (&left, index) {
            (Object::Array(elements), Object::Integer(index)) => {
                let element = usize::try_from(index)
                    .ok()
                    .and_then(|index| elements.borrow().get(index).cloned());
                Ok(element.unwrap_or(NULL))
            }
            (Object::String(value), Object::Integer(index)) => {
                let char = usize::try_from(index)
                    .ok()
                    .and_then(|index| value.chars().nth(index));
                Ok(char.map_or(NULL, |char| Object::String(char.to_string())))
            }
            (Object::Hash(hash), index) => {
                if !index.hashable() {
                    bail!("unusable as hash key: {}", index)
                }
                match hash.get(&index) {
                    Some(value) => Ok(value.clone()),
                    None => Ok(NULL),
                }
            }
            _ => Err(anyhow!("index operator not supported: {}", left)),
        }
    }

    fn eval_call_expression(
        &mut self,
        function: &Expression,
        arguments: &[Expression],
    ) -> Result<Object> {
        let callee = self.eval_expression(function)?;
        let args = arguments
            .iter()
            .map(|arg| self.eval_expression(arg))
            .collect::<Result<Vec<Object>>>()?;
        self.apply_function(callee, args)
    }

    pub fn apply_function(&mut self, callee: Object, args: Vec<Object>) -> Result<Object> {
        trace!(callee = %callee, args = args.len(), "call");
        match callee {
            Object::Function(function) => self.call_function(&function, args, None),
            Object::BoundMethod(bound) => {
                self.call_function(&bound.method, args, Some(bound.receiver.clone()))
            }
            Object::Class(class) => self.instantiate(class, args),
            Object::Builtin(builtin) => match (builtin.function)(args)? {
                Object::Error(message) => bail!(message),
                object => Ok(object),
            },
            other => bail!("not a function: {}", other),
        }
    }

    fn call_function(
        &mut self,
        function: &Function,
        args: Vec<Object>,
        receiver: Option<Rc<Instance>>,
    ) -> Result<Object> {
        if function.parameters.len() != args.len() {
            bail!(
                "wrong number of arguments: want={}, got={}",
                function.parameters.len(),
                args.len()
            )
        }

        let env = Environment::new_enclosed_environment(function.env.clone());
        {
            let mut scope = env.borrow_mut();
            if let Some(receiver) = receiver {
                scope.define("this", Object::Instance(receiver));
            }
            for (parameter, arg) in function.parameters.iter().zip(args) {
                scope.define(parameter, arg);
            }
        }

        let result = self.enter_frame(|this| {
            this.eval_with_env(env, |this| this.eval_statement(&function.body))
        })?;
        match result {
            Object::ReturnValue(value) => Ok(*value),
            object => Ok(object),
        }
    }

    fn instantiate(&mut self, class: Rc<Class>, args: Vec<Object>) -> Result<Object> {
        let instance = Rc::new(Instance::new(class.clone()));
        match class.find_method("init") {
            Some(init) => {
                self.call_function(&init, args, Some(instance.clone()))?;
            }
            None if !args.is_empty() => bail!(
                "wrong number of arguments: want=0, got={}",
                args.len()
            ),
            None => {}
        }
        Ok(Object::Instance(instance))
    }

    fn eval_prefix_expression(&mut self, operator: TokenKind, right: Object) -> Result<Object> {
        match operator {
            TokenKind::Not => Ok(self.native_bool_to_boolean_object(!right.is_truthy())),
            TokenKind::Minus => self.eval_minus_prefix_operator_expression(right),
            _ => bail!("unknown operator: {}{}", operator, right),
        }
    }

    fn eval_minus_prefix_operator_expression(&mut self, right: Object) -> Result<Object> {
        match right {
            Object::Integer(value) => value
                .checked_neg()
                .map(Object::Integer)
                .ok_or_else(|| anyhow!("integer overflow: -{}", value)),
            Object::Float(value) => Ok(Object::Float(-value)),
            _ => Err(anyhow!("unknown operator: -{}", right)),
        }
    }

    fn eval_infix_expression(
        &mut self,
        left: Object,
        operator: TokenKind,
        right: Object,
    ) -> Result<Object> {
        match (left, right) {
            (Object::Integer(left), Object::Integer(right)) => {
                self.eval_integer_infix_expression(left, operator, right)
            }
            (Object::Float(left), Object::Float(right)) => {
                self.eval_float_infix_expression(left, operator, right)
            }
            (Object::Integer(left), Object::Float(right)) => {
                self.eval_float_infix_expression(left as f64, operator, right)
            }
            (Object::Float(left), Object::Integer(right)) => {
                self.eval_float_infix_expression(left, operator, right as f64)
            }
            (Object::String(left), Object::String(right)) => {
                self.eval_string_infix_expression(left, operator, right)
            }
            (left, right) => match operator {
                TokenKind::Eq => Ok(self.native_bool_to_boolean_object(left == right)),
                TokenKind::NotEq => Ok(self.native_bool_to_boolean_object(left != right)),
                _ if left.type_name() == right.type_name() => {
                    Err(anyhow!("unknown operator: {} {} {}", left, operator, right))
                }
                _ => Err(anyhow!("type mismatch: {} {} {}", left, operator, right)),
            },
        }
    }

    fn eval_integer_infix_expression(
        &mut self,
        left: i64,
        operator: TokenKind,
        right: i64,
    ) -> Result<Object> {
        let checked = |value: Option<i64>| {
            value
                .map(Object::Integer)
                .ok_or_else(|| anyhow!("integer overflow: {} {} {}", left, operator, right))
        };
        match operator {
            TokenKind::Plus => checked(left.checked_add(right)),
            TokenKind::Minus => checked(left.checked_sub(right)),
            TokenKind::Asterisk => checked(left.checked_mul(right)),
            TokenKind::Slash | TokenKind::Percent if right == 0 => bail!("division by zero"),
            TokenKind::Slash => checked(left.checked_div(right)),
            TokenKind::Percent => checked(left.checked_rem(right)),
            TokenKind::Lt => Ok(self.native_bool_to_boolean_object(left < right)),
            TokenKind::Gt => Ok(self.native_bool_to_boolean_object(left > right)),
            TokenKind::LtEq => Ok(self.native_bool_to_boolean_object(left <= right)),
            TokenKind::GtEq => Ok(self.native_bool_to_boolean_object(left >= right)),
            TokenKind::Eq => Ok(self.native_bool_to_boolean_object(left == right)),
            TokenKind::NotEq => Ok(self.native_bool_to_boolean_object(left != right)),
            _ => Err(anyhow!("unknown operator: {} {} {}", left, operator, right)),
        }
    }

    fn eval_float_infix_expression(
        &mut self,
        left: f64,
        operator: TokenKind,
        right: f64,
    ) -> Result<Object> {
        match operator {
            TokenKind::Plus => Ok(Object::Float(left + right)),
            TokenKind::Minus => Ok(Object::Float(left - right)),
            TokenKind::Asterisk => Ok(Object::Float(left * right)),
            TokenKind::Slash => Ok(Object::Float(left / right)),
            TokenKind::Percent => Ok(Object::Float(left % right)),
            TokenKind::Lt => Ok(self.native_bool_to_boolean_object(left < right)),
            TokenKind::Gt => Ok(self.native_bool_to_boolean_object(left > right)),
            TokenKind::LtEq => Ok(self.native_bool_to_boolean_object(left <= right)),
            TokenKind::GtEq => Ok(self.native_bool_to_boolean_object(left >= right)),
            TokenKind::Eq => Ok(self.native_bool_to_boolean_object(left == right)),
            TokenKind::NotEq => Ok(self.native_bool_to_boolean_object(left != right)),
            _ => Err(anyhow!("unknown operator: {:?} {} {:?}", left, operator, right)),
        }
    }

    fn eval_string_infix_expression(
        &mut self,
        left: String,
        operator: TokenKind,
        right: String,
    ) -> Result<Object> {
        match operator {
            TokenKind::Plus => Ok(Object::String(format!("{}{}", left, right))),
            TokenKind::Eq => Ok(self.native_bool_to_boolean_object(left == right)),
            TokenKind::NotEq => Ok(self.native_bool_to_boolean_object(left != right)),
            _ => Err(anyhow!("unknown operator: {} {} {}", left, operator, right)),
        }
    }

    fn native_bool_to_boolean_object(&self, input: bool) -> Object {
        if input {
            TRUE
        } else {
            FALSE
        }
    }

    fn eval_if_expression(
        &mut self,
        condition: &Expression,
        consequence: &Statement,
        alternative: Option<&Statement>,
    ) -> Result<Object> {
        let condition = self.eval_expression(condition)?;
        if condition.is_truthy() {
            self.eval_statement(consequence)
        } else if let Some(alternative) = alternative {
            self.eval_statement(alternative)
        } else {
            Ok(NULL)
        }
    }

    fn eval_identifier_expression(&mut self, name: &str) -> Result<Object> {
        if let Some(value) = self.env.borrow().get(name) {
            return Ok(value);
        }
        self.builtins
            .get(name)
            .ok_or_else(|| anyhow!("identifier not found: {}", name))
    }
}
