pub mod error;
pub mod huggingface;
pub mod openai;
pub mod openrouter;
pub mod traits;
pub mod util;

pub use error::AiError;
pub use huggingface::{ClassLabel, HuggingFace};
pub use openai::{OpenAi, StructuredOutput};
pub use openrouter::OpenRouter;
pub use traits::{ChatAgent, TextClassifier};
pub use util::{extract_json_object, strip_code_blocks, truncate_to_char_boundary};
