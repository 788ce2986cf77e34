pub mod clado;
pub mod openrouter;
