pub mod answer;
pub mod chat;
pub mod config;
mod config_env;
pub mod llm;
pub mod media;
pub mod models;
pub mod recorder;
pub mod repos;

#[cfg(test)]
pub(crate) mod test_support;
