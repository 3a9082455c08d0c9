use std::{
    cell::RefCell,
    fs,
    io::{self, Write},
    path::Path,
    rc::Rc,
};

use anyhow::{anyhow, bail, Context, Result};

use crate::object::{Builtins, Object};

pub struct StandardLibrary;

impl StandardLibrary {
    /// The host functions every script can call, under their English and
    /// Javanese names. `howl` and the `input` prompt write to `output`.
    pub fn builtins(output: Rc<RefCell<dyn Write>>) -> Builtins {
        let mut builtins = Builtins::new();

        let howl_output = output.clone();
        builtins.register(&["howl"], move |args| Self::howl_fn(&howl_output, args));
        builtins.register(&["len", "dowo"], Self::len_fn);
        builtins.register(&["push", "plumbungan"], Self::push_fn);
        builtins.register(&["string"], Self::string_fn);
        builtins.register(&["string_contains"], Self::string_contains_fn);
        builtins.register(&["set_field", "isi"], Self::set_field_fn);
        builtins.register(&["input", "takon"], move |args| Self::input_fn(&output, args));
        builtins.register(&["read_file", "moco_file"], Self::read_file_fn);
        builtins.register(&["write_file", "nulis_file"], Self::write_file_fn);

        builtins
    }

    fn howl_fn(output: &Rc<RefCell<dyn Write>>, args: Vec<Object>) -> Result<Object> {
        let mut output = output.borrow_mut();
        for arg in args {
            writeln!(output, "{}", arg)?;
        }
        output.flush()?;
        Ok(Object::Null)
    }

    fn len_fn(args: Vec<Object>) -> Result<Object> {
        if args.len() != 1 {
            bail!(
                "wrong number of arguments for len: want=1, got={}",
                args.len()
            );
        }

        match args.first() {
            Some(Object::String(value)) => Ok(Object::Integer(value.chars().count() as i64)),
            Some(Object::Array(value)) => Ok(Object::Integer(value.borrow().len() as i64)),
            Some(Object::Hash(value)) => Ok(Object::Integer(value.len() as i64)),
            Some(other) => Err(anyhow!("argument to `len` not supported, got {}", other.type_name())),
            None => Err(anyhow!("argument to `len` not provided")),
        }
    }

    fn push_fn(args: Vec<Object>) -> Result<Object> {
        if args.len() != 2 {
            bail!(
                "wrong number of arguments for push: want=2, got={}",
                args.len()
            );
        }

        match (&args[0], &args[1]) {
            (Object::Array(elements), value) => {
                elements.borrow_mut().push(value.clone());
                Ok(args[0].clone())
            }
            (other, _) => Err(anyhow!(
                "first argument to `push` must be ARRAY, got {}",
                other.type_name()
            )),
        }
    }

    fn string_fn(args: Vec<Object>) -> Result<Object> {
        if args.len() != 1 {
            bail!(
                "wrong number of arguments for string: want=1, got={}",
                args.len()
            );
        }

        Ok(Object::String(args[0].to_string()))
    }

    fn string_contains_fn(args: Vec<Object>) -> Result<Object> {
        if args.len() != 2 {
            bail!(
                "wrong number of arguments for string_contains: want=2, got={}",
                args.len()
            );
        }

        match (&args[0], &args[1]) {
            (Object::String(haystack), Object::String(needle)) => {
                Ok(Object::Boolean(haystack.contains(needle.as_str())))
            }
            (haystack, needle) => Err(anyhow!(
                "arguments to `string_contains` must be STRING, got {} and {}",
                haystack.type_name(),
                needle.type_name()
            )),
        }
    }

    fn set_field_fn(args: Vec<Object>) -> Result<Object> {
        if args.len() != 3 {
            bail!(
                "wrong number of arguments for set_field: want=3, got={}",
                args.len()
            );
        }

        match (&args[0], &args[1]) {
            (Object::Instance(instance), Object::String(key)) => {
                instance
                    .fields
                    .borrow_mut()
                    .insert(key.clone(), args[2].clone());
                Ok(args[2].clone())
            }
            (Object::Instance(_), other) => Err(anyhow!(
                "field name for `set_field` must be STRING, got {}",
                other.type_name()
            )),
            (other, _) => Err(anyhow!(
                "first argument to `set_field` must be INSTANCE, got {}",
                other.type_name()
            )),
        }
    }

    fn input_fn(output: &Rc<RefCell<dyn Write>>, args: Vec<Object>) -> Result<Object> {
        if let Some(Object::String(prompt)) = args.first() {
            let mut output = output.borrow_mut();
            write!(output, "{}", prompt)?;
            output.flush()?;
        }

        let mut line = String::new();
        io::stdin()
            .read_line(&mut line)
            .context("could not read input")?;
        Ok(Object::String(line.trim().to_string()))
    }

    fn read_file_fn(args: Vec<Object>) -> Result<Object> {
        if args.len() != 1 {
            bail!(
                "wrong number of arguments for read_file: want=1, got={}",
                args.len()
            );
        }

        let path = Self::safe_path("read_file", &args[0])?;
        let content = fs::read_to_string(path)
            .map_err(|err| anyhow!("could not read file {}: {}", path, err))?;
        Ok(Object::String(content))
    }

    fn write_file_fn(args: Vec<Object>) -> Result<Object> {
        if args.len() != 2 {
            bail!(
                "wrong number of arguments for write_file: want=2, got={}",
                args.len()
            );
        }

        let path = Self::safe_path("write_file", &args[0])?;
        let Object::String(content) = &args[1] else {
            bail!(
                "content for `write_file` must be STRING, got {}",
                args[1].type_name()
            );
        };
        fs::write(path, content).map_err(|err| anyhow!("could not write file {}: {}", path, err))?;
        Ok(Object::Boolean(true))
    }

    /// File builtins only touch paths below the working directory.
    fn safe_path<'a>(name: &str, arg: &'a Object) -> Result<&'a str> {
        let Object::String(path) = arg else {
            bail!("path for `{}` must be STRING, got {}", name, arg.type_name());
        };
        if path.contains("..") || Path::new(path).is_absolute() {
            bail!("unsafe path: {}", path);
        }
        Ok(path)
    }
}
