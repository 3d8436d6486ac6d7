pub mod cancel;
pub mod extraction;
pub mod glob_matcher;
pub mod organizing;
pub mod path_safety;
pub mod pipeline;
pub mod plan_parser;
pub mod plan_validator;
pub mod prompts;
pub mod scanner;
pub mod settings_store;

pub use cancel::Canceled;
