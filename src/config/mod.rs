//! Configuration module for Taalcoach.
//!
//! Handles loading settings, credentials and agent instruction lists.

mod instructions;
mod settings;

pub use instructions::{Instructions, DEFAULT_CONVERSATION_PROMPT};
pub use settings::{
    mask_key, CredentialSettings, Credentials, DocumentSettings, GeneralSettings,
    InstructionSettings, ModelSettings, ServerSettings, Settings,
};
