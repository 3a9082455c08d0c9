use anyhow::Result;

/// Runs one unit of Wolf404 source and renders its final value.
pub trait Engine {
    fn run(&mut self, input: &str) -> Result<String>;
}
