use core::fmt;
use std::{
    cell::RefCell,
    collections::HashMap,
    hash::{Hash, Hasher},
    rc::Rc,
};

use anyhow::Result;

use crate::{
    ast::{format_float, Statement},
    environment::Env,
};

#[derive(Debug, Clone)]
pub enum Object {
    Integer(i64),
    Float(f64),
    String(String),
    Boolean(bool),
    Null,
    Array(Rc<RefCell<Vec<Object>>>),
    Hash(HashMap<Object, Object>),
    Function(Rc<Function>),
    Class(Rc<Class>),
    Instance(Rc<Instance>),
    BoundMethod(Rc<BoundMethod>),
    Builtin(Builtin),
    ReturnValue(Box<Object>),
    Error(String),
}

impl Object {
    pub fn array(elements: Vec<Object>) -> Self {
        Object::Array(Rc::new(RefCell::new(elements)))
    }

    pub fn hashable(&self) -> bool {
        matches!(
            self,
            Object::Integer(_) | Object::Boolean(_) | Object::String(_)
        )
    }

    pub fn is_truthy(&self) -> bool {
        !matches!(self, Object::Null | Object::Boolean(false))
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Object::Integer(_) => "INTEGER",
            Object::Float(_) => "FLOAT",
            Object::String(_) => "STRING",
            Object::Boolean(_) => "BOOLEAN",
            Object::Null => "NULL",
            Object::Array(_) => "ARRAY",
            Object::Hash(_) => "HASH",
            Object::Function(_) => "FUNCTION",
            Object::Class(_) => "CLASS",
            Object::Instance(_) => "INSTANCE",
            Object::BoundMethod(_) => "BOUND_METHOD",
            Object::Builtin(_) => "BUILTIN",
            Object::ReturnValue(_) => "RETURN_VALUE",
            Object::Error(_) => "ERROR",
        }
    }
}

/// Arrays and hashes compare by contents; functions, classes and instances
/// compare by identity.
impl PartialEq for Object {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Object::Integer(left), Object::Integer(right)) => left == right,
            (Object::Float(left), Object::Float(right)) => left == right,
            (Object::String(left), Object::String(right)) => left == right,
            (Object::Boolean(left), Object::Boolean(right)) => left == right,
            (Object::Null, Object::Null) => true,
            (Object::Array(left), Object::Array(right)) => {
                Rc::ptr_eq(left, right) || *left.borrow() == *right.borrow()
            }
            (Object::Hash(left), Object::Hash(right)) => left == right,
            (Object::Function(left), Object::Function(right)) => Rc::ptr_eq(left, right),
            (Object::Class(left), Object::Class(right)) => Rc::ptr_eq(left, right),
            (Object::Instance(left), Object::Instance(right)) => Rc::ptr_eq(left, right),
            (Object::BoundMethod(left), Object::BoundMethod(right)) => {
                Rc::ptr_eq(&left.receiver, &right.receiver) && Rc::ptr_eq(&left.method, &right.method)
            }
            (Object::Builtin(left), Object::Builtin(right)) => left.name == right.name,
            (Object::ReturnValue(left), Object::ReturnValue(right)) => left == right,
            (Object::Error(left), Object::Error(right)) => left == right,
            _ => false,
        }
    }
}

impl Eq for Object {}

impl Hash for Object {
    fn hash<H: Hasher>(&self, state: &mut H) {
        match self {
            Object::Integer(value) => value.hash(state),
            Object::String(value) => value.hash(state),
            Object::Boolean(value) => value.hash(state),
            // only hashable() values are ever used as keys
            other => std::mem::discriminant(other).hash(state),
        }
    }
}

impl fmt::Display for Object {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Object::Integer(value) => write!(f, "{}", value),
            Object::Float(value) => write!(f, "{}", format_float(*value)),
            Object::String(value) => write!(f, "{}", value),
            Object::Boolean(value) => write!(f, "{}", value),
            Object::Null => write!(f, "nil"),
            Object::Array(values) => {
                let values: Vec<String> = values.borrow().iter().map(|v| v.to_string()).collect();
                write!(f, "[{}]", values.join(", "))
            }
            Object::Hash(hash) => {
                let mut pairs: Vec<String> = hash
                    .iter()
                    .map(|(k, v)| format!("{}: {}", k, v))
                    .collect();
                pairs.sort();
                write!(f, "{{{}}}", pairs.join(", "))
            }
            Object::Function(function) => write!(f, "{}", function),
            Object::Class(class) => write!(f, "mold {}", class.name),
            Object::Instance(instance) => write!(f, "{} instance", instance.class.name),
            Object::BoundMethod(bound) => write!(
                f,
                "bound method {}.{}",
                bound.receiver.class.name,
                bound.method.name.as_deref().unwrap_or("<anonymous>")
            ),
            Object::Builtin(builtin) => write!(f, "builtin function {}", builtin.name),
            Object::ReturnValue(value) => write!(f, "{}", value),
            Object::Error(message) => write!(f, "ERROR: {}", message),
        }
    }
}

/// A function literal closed over the environment it was evaluated in.
pub struct Function {
    pub name: Option<String>,
    pub parameters: Vec<String>,
    pub body: Statement,
    pub env: Env,
}

impl fmt::Debug for Function {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("Function")
            .field("name", &self.name)
            .field("parameters", &self.parameters)
            .finish_non_exhaustive()
    }
}

impl fmt::Display for Function {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let parameters: Vec<String> = self.parameters.iter().map(|p| format!("${p}")).collect();
        match &self.name {
            Some(name) => write!(f, "hunt {}({})", name, parameters.join(", ")),
            None => write!(f, "hunt({})", parameters.join(", ")),
        }
    }
}

#[derive(Debug)]
pub struct Class {
    pub name: String,
    pub methods: HashMap<String, Rc<Function>>,
    pub superclass: Option<Rc<Class>>,
}

impl Class {
    /// Looks up a method on this class, then up the superclass chain.
    pub fn find_method(&self, name: &str) -> Option<Rc<Function>> {
        match self.methods.get(name) {
            Some(method) => Some(method.clone()),
            None => self
                .superclass
                .as_ref()
                .and_then(|superclass| superclass.find_method(name)),
        }
    }
}

pub struct Instance {
    pub class: Rc<Class>,
    pub fields: RefCell<HashMap<String, Object>>,
}

impl Instance {
    pub fn new(class: Rc<Class>) -> Self {
        Self {
            class,
            fields: RefCell::new(HashMap::new()),
        }
    }
}

impl fmt::Debug for Instance {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("Instance")
            .field("class", &self.class.name)
            .field("fields", &self.fields.borrow().keys().collect::<Vec<_>>())
            .finish()
    }
}

#[derive(Debug)]
pub struct BoundMethod {
    pub receiver: Rc<Instance>,
    pub method: Rc<Function>,
}

pub type BuiltinFunction = Rc<dyn Fn(Vec<Object>) -> Result<Object>>;

#[derive(Clone)]
pub struct Builtin {
    pub name: String,
    pub function: BuiltinFunction,
}

impl fmt::Debug for Builtin {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Builtin({})", self.name)
    }
}

/// Host functions callable from scripts, keyed by every name they answer to.
#[derive(Clone, Default)]
pub struct Builtins {
    functions: HashMap<String, Builtin>,
}

impl Builtins {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `function` under each of `names`. The first name is the one
    /// shown when the builtin is printed.
    pub fn register<F>(&mut self, names: &[&str], function: F)
    where
        F: Fn(Vec<Object>) -> Result<Object> + 'static,
    {
        let Some(primary) = names.first() else {
            return;
        };
        let builtin = Builtin {
            name: primary.to_string(),
            function: Rc::new(function),
        };
        for name in names {
            self.functions.insert(name.to_string(), builtin.clone());
        }
    }

    pub fn get(&self, name: &str) -> Option<Object> {
        self.functions.get(name).cloned().map(Object::Builtin)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.functions.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.functions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.functions.is_empty()
    }
}
