pub mod household;
pub mod program;
