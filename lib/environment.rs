use std::{cell::RefCell, collections::HashMap, rc::Rc};

use crate::object::Object;

pub type Env = Rc<RefCell<Environment>>;

#[derive(Debug, Default)]
pub struct Environment {
    store: HashMap<String, Object>,
    outer: Option<Env>,
}

impl Environment {
    pub fn new() -> Env {
        Rc::new(RefCell::new(Environment::default()))
    }

    pub fn new_enclosed_environment(outer: Env) -> Env {
        Rc::new(RefCell::new(Environment {
            store: HashMap::new(),
            outer: Some(outer),
        }))
    }

    pub fn get(&self, name: &str) -> Option<Object> {
        match self.store.get(name) {
            Some(value) => Some(value.clone()),
            None => match &self.outer {
                Some(outer) => outer.borrow().get(name),
                None => None,
            },
        }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.store.contains_key(name)
            || self
                .outer
                .as_ref()
                .is_some_and(|outer| outer.borrow().contains(name))
    }

    /// Binds `name` in this scope, shadowing any outer binding.
    pub fn define(&mut self, name: &str, value: Object) {
        self.store.insert(name.to_string(), value);
    }

    /// Rebinds the nearest existing `name`, or creates it in this scope.
    pub fn assign(&mut self, name: &str, value: Object) {
        if !self.store.contains_key(name) {
            if let Some(outer) = &self.outer {
                if outer.borrow().contains(name) {
                    outer.borrow_mut().assign(name, value);
                    return;
                }
            }
        }
        self.store.insert(name.to_string(), value);
    }

    /// A detached copy of every binding visible from this scope. Values are
    /// cloned shallowly, so arrays and instances are still shared.
    pub fn snapshot(&self) -> Env {
        let mut store = HashMap::new();
        self.flatten_into(&mut store);
        Rc::new(RefCell::new(Environment { store, outer: None }))
    }

    fn flatten_into(&self, store: &mut HashMap<String, Object>) {
        if let Some(outer) = &self.outer {
            outer.borrow().flatten_into(store);
        }
        for (name, value) in &self.store {
            store.insert(name.clone(), value.clone());
        }
    }
}
