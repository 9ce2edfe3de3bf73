pub mod error;
pub mod library;

pub use error::{LibraryError, Result};
pub use library::{validate_prompt, PromptLibrary, CATEGORY_PRIORITY, DEFAULT_CATEGORY};
