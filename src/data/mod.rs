pub mod difficulty;

pub use difficulty::{DifficultyProfile, DifficultyRegistry, RegistryError, BUILTIN_DIFFICULTIES};
