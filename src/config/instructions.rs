//! Instruction lists for the coaching agents.
//!
//! Defaults can be overridden by placing a `roles.toml` file in the custom
//! instructions directory. Any role left out of that file keeps its defaults.

use crate::agent::AgentRole;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;

/// Prompt sent to the conversation partner, which takes no user input.
pub const DEFAULT_CONVERSATION_PROMPT: &str = "Let's simulate a Dutch conversation based on today's practice. Focus on realistic interaction and interview style.";

/// Instruction lists for every role, plus the fixed conversation prompt.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Instructions {
    pub vocabulary_teacher: Vec<String>,
    pub grammar_coach: Vec<String>,
    pub weekly_planner: Vec<String>,
    pub conversation_partner: Vec<String>,
    pub conversation_prompt: String,
    /// Variables rendered into instructions as {{name}}.
    #[serde(skip)]
    pub variables: HashMap<String, String>,
}

fn lines(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

impl Default for Instructions {
    fn default() -> Self {
        Self {
            vocabulary_teacher: lines(&[
                "Teach the user 5 to 10 new important Dutch words or phrases daily that are useful for {{goal}}.",
                "For each word or phrase, provide:",
                "- The Dutch word/phrase",
                "- English translation",
                "- Example sentence in Dutch",
                "- English translation of the example sentence",
                "- Quick tip on when to use it (formally, casually, common interview situations)",
                "Be supportive, motivating, and realistic.",
                "After generating the feedback, use the provided Google Docs tool to create a real Google Document with the content you wrote. Then include the actual Google Doc link in your final response.",
                "Make sure to include the link to the Google Doc in your response.",
                "Use the Google Docs tool to create a new document for each daily feedback session.",
            ]),
            grammar_coach: lines(&[
                "Teach the user 1 key Dutch grammar topic daily that is important for {{goal}}.",
                "Explain the grammar concept in simple Dutch, and also add an English explanation.",
                "Give at least 3 Dutch example sentences using the grammar rule, with English translations.",
                "Provide a few short exercises (fill in the blanks, correct the sentence, etc.) based on the topic.",
                "Create a well-formatted Google Doc with today's grammar lesson and exercises.",
                "Return the real Google Doc link to the user.",
            ]),
            weekly_planner: lines(&[
                "Track the user's Dutch learning journey: topics mastered, new vocabulary learned, common mistakes identified.",
                "Create a clear weekly study plan: topics to review, new topics to study, and daily activities.",
                "Organize the plan in a simple weekly schedule format.",
                "Align all planning with the user's goal to prepare for {{goal}} at {{level}} level fluency.",
                "Store the weekly plan in a Google Doc and include the link in the response.",
            ]),
            conversation_partner: lines(&[
                "Simulate a realistic Dutch conversation based on job interviews or daily life topics.",
                "Adjust conversation difficulty to user's current level.",
                "Correct grammar, vocabulary, and structure politely and explain corrections.",
                "Suggest useful expressions or structures to sound more natural.",
                "Summarize the conversation, list key mistakes and suggestions for improvement.",
                "Store the conversation summary in a Google Doc and include the link in the response.",
            ]),
            conversation_prompt: DEFAULT_CONVERSATION_PROMPT.to_string(),
            variables: HashMap::new(),
        }
    }
}

impl Instructions {
    /// Load instructions, with an optional custom directory and variables.
    pub fn load(
        custom_dir: Option<&str>,
        custom_variables: Option<&HashMap<String, String>>,
    ) -> crate::error::Result<Self> {
        let mut instructions = Instructions::default();

        if let Some(dir) = custom_dir {
            let roles_path = PathBuf::from(shellexpand::tilde(dir).to_string()).join("roles.toml");
            if roles_path.exists() {
                let content = std::fs::read_to_string(&roles_path)?;
                instructions = toml::from_str(&content)?;
            }
        }

        if let Some(vars) = custom_variables {
            instructions.variables = vars.clone();
        }

        Ok(instructions)
    }

    /// Rendered instruction list for a role.
    pub fn for_role(&self, role: AgentRole) -> Vec<String> {
        let raw = match role {
            AgentRole::VocabularyTeacher => &self.vocabulary_teacher,
            AgentRole::GrammarCoach => &self.grammar_coach,
            AgentRole::WeeklyPlanner => &self.weekly_planner,
            AgentRole::ConversationPartner => &self.conversation_partner,
        };
        raw.iter()
            .map(|line| Self::render(line, &self.variables))
            .collect()
    }

    /// Rendered conversation prompt.
    pub fn conversation_prompt(&self) -> String {
        Self::render(&self.conversation_prompt, &self.variables)
    }

    /// Render a template with the given variables.
    pub fn render(template: &str, vars: &HashMap<String, String>) -> String {
        let mut result = template.to_string();
        for (key, value) in vars {
            result = result.replace(&format!("{{{{{}}}}}", key), value);
        }
        result
    }
}
