pub mod anthropic;
pub mod client;
pub mod openai;
pub mod prompts;
