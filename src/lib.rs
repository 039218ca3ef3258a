//! Taalcoach - a team of Dutch coaching agents
//!
//! Four LLM agents, each with a narrow instruction set and a Google Docs
//! tool, coach a learner towards Dutch-speaking job interviews.
//!
//! # Overview
//!
//! - The Vocabulary Teacher and Grammar Coach turn today's exercises into a lesson
//! - The Conversation Partner simulates an interview-style conversation
//! - The Weekly Planner turns a summary of the week into a study plan
//!
//! Every agent writes its output to a document and replies with the link.
//!
//! # Architecture
//!
//! - `config` - Settings, credentials and agent instructions
//! - `documents` - Document service abstraction (Composio, in-memory)
//! - `agent` - Agent definitions, registry and the OpenAI runner
//! - `dispatcher` - Routes one user action to one agent run
//! - `cli` - Command line and HTTP presentation
//!
//! # Example
//!
//! ```rust,no_run
//! use taalcoach::config::{Credentials, Settings};
//! use taalcoach::dispatcher::Dispatcher;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let settings = Settings::load()?;
//!     let credentials = Credentials::resolve(None, None, &settings)?;
//!     let dispatcher = Dispatcher::connect(&credentials, &settings).await?;
//!
//!     let result = dispatcher
//!         .run_daily_vocabulary("Ik heb vandaag vijf nieuwe woorden geleerd.")
//!         .await?;
//!     println!("{}", result.content);
//!
//!     Ok(())
//! }
//! ```

pub mod agent;
pub mod cli;
pub mod config;
pub mod dispatcher;
pub mod documents;
pub mod error;
pub mod openai;

pub use error::{Result, TaalcoachError};
