pub mod builtins;
pub mod interpreter;
pub mod value;
