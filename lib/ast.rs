use std::fmt;

use crate::token::TokenKind;

const INDENT: &str = "    ";

#[derive(Debug, PartialEq, Clone, Default)]
pub struct Program {
    pub statements: Vec<Statement>,
}

impl fmt::Display for Program {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let lines: Vec<String> = self.statements.iter().map(|s| s.to_string()).collect();
        write!(f, "{}", lines.join("\n"))
    }
}

#[derive(Debug, PartialEq, Clone)]
pub enum Statement {
    Expression(Expression),
    Return(Expression),
    Block(Vec<Statement>),
    Class {
        name: String,
        superclass: Option<String>,
        body: Box<Statement>,
    },
    Track {
        condition: Expression,
        body: Box<Statement>,
    },
    Summon(String),
    Prowl(Expression),
}

impl fmt::Display for Statement {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Statement::Expression(expression) => write!(f, "{}", expression),
            Statement::Return(expression) => write!(f, "bring {}", expression),
            Statement::Block(statements) => {
                let lines: Vec<String> = statements
                    .iter()
                    .flat_map(|s| {
                        s.to_string()
                            .lines()
                            .map(|line| format!("{INDENT}{line}"))
                            .collect::<Vec<String>>()
                    })
                    .collect();
                write!(f, "{}", lines.join("\n"))
            }
            Statement::Class {
                name,
                superclass,
                body,
            } => {
                write!(f, "mold {}", name)?;
                if let Some(superclass) = superclass {
                    write!(f, " : {}", superclass)?;
                }
                write!(f, "\n{}", body)
            }
            Statement::Track { condition, body } => write!(f, "track {}\n{}", condition, body),
            Statement::Summon(path) => write!(f, "summon \"{}\"", path),
            Statement::Prowl(call) => write!(f, "prowl {}", call),
        }
    }
}

#[derive(Debug, PartialEq, Clone)]
pub enum Expression {
    Identifier(String),
    IntegerLiteral(i64),
    FloatLiteral(f64),
    StringLiteral(String),
    BooleanLiteral(bool),
    NilLiteral,
    ArrayLiteral(Vec<Expression>),
    HashLiteral(Vec<(Expression, Expression)>),
    Index {
        left: Box<Expression>,
        index: Box<Expression>,
    },
    Prefix {
        operator: TokenKind,
        right: Box<Expression>,
    },
    Infix {
        left: Box<Expression>,
        operator: TokenKind,
        right: Box<Expression>,
    },
    If {
        condition: Box<Expression>,
        consequence: Box<Statement>,
        alternative: Option<Box<Statement>>,
    },
    FunctionLiteral {
        name: Option<String>,
        parameters: Vec<String>,
        body: Box<Statement>,
    },
    Call {
        function: Box<Expression>,
        arguments: Vec<Expression>,
    },
}

impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Expression::Identifier(name) => write!(f, "{}", name),
            Expression::IntegerLiteral(value) => write!(f, "{}", value),
            Expression::FloatLiteral(value) => write!(f, "{}", format_float(*value)),
            Expression::StringLiteral(value) => write!(f, "\"{}\"", value),
            Expression::BooleanLiteral(value) => write!(f, "{}", value),
            Expression::NilLiteral => write!(f, "nil"),
            Expression::ArrayLiteral(elements) => write!(f, "[{}]", join(elements)),
            Expression::HashLiteral(pairs) => {
                let pairs: Vec<String> = pairs
                    .iter()
                    .map(|(key, value)| format!("{}: {}", key, value))
                    .collect();
                write!(f, "{{{}}}", pairs.join(", "))
            }
            Expression::Index { left, index } => write!(f, "({}[{}])", left, index),
            Expression::Prefix { operator, right } => write!(f, "({} {})", operator, right),
            Expression::Infix {
                left,
                operator,
                right,
            } => write!(f, "({} {} {})", left, operator, right),
            Expression::If {
                condition,
                consequence,
                alternative,
            } => {
                write!(f, "sniff {}\n{}", condition, consequence)?;
                if let Some(alternative) = alternative {
                    write!(f, "\nmissing\n{}", alternative)?;
                }
                Ok(())
            }
            Expression::FunctionLiteral {
                name,
                parameters,
                body,
            } => {
                let parameters: Vec<String> = parameters.iter().map(|p| format!("${p}")).collect();
                write!(f, "hunt")?;
                if let Some(name) = name {
                    write!(f, " {}", name)?;
                }
                write!(f, "({})\n{}", parameters.join(", "), body)
            }
            Expression::Call {
                function,
                arguments,
            } => write!(f, "{}({})", function, join(arguments)),
        }
    }
}

/// Fixed notation that always keeps a fraction, so `1e20` prints as
/// `100000000000000000000.0` and reads back as the same float.
pub(crate) fn format_float(value: f64) -> String {
    let text = value.to_string();
    if value.is_finite() && !text.contains('.') {
        format!("{}.0", text)
    } else {
        text
    }
}

fn join(expressions: &[Expression]) -> String {
    expressions
        .iter()
        .map(|e| e.to_string())
        .collect::<Vec<String>>()
        .join(", ")
}
