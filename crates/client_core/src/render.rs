//! Stateless projection of the session log into terminal text. Holds the
//! configured theme and nothing else; session state stays in the reducer.

use chrono::Local;
use colored::{ColoredString, Colorize};
use shared::domain::{Message, Role};

use crate::{config::Theme, session::Session};

pub struct Renderer {
    theme: Theme,
}

impl Renderer {
    pub fn new(theme: Theme) -> Self {
        Self { theme }
    }

    pub fn transcript(&self, session: &Session) -> String {
        session
            .messages()
            .iter()
            .map(|message| self.message(message))
            .collect::<Vec<_>>()
            .join("\n\n")
    }

    pub fn message(&self, message: &Message) -> String {
        let stamp = message.sent_at.with_timezone(&Local).format("%H:%M");
        match message.role {
            Role::User => format!("[{stamp}] {} {}", self.label("You:"), message.text),
            Role::Assistant => {
                let mut out = format!("[{stamp}] {} {}", self.label("Vedan:"), message.text);
                if !message.sources.is_empty() {
                    out.push_str(&format!("\n  {}", self.label("References:")));
                    for source in &message.sources {
                        out.push_str(&format!("\n    [{}] {}", source.ordinal, source.content));
                    }
                }
                out
            }
            Role::Error => format!("[{stamp}] {} {}", self.error_label(), message.text),
        }
    }

    fn label(&self, text: &str) -> ColoredString {
        match self.theme {
            Theme::Light => text.blue(),
            Theme::Dark => text.bright_blue(),
        }
    }

    fn error_label(&self) -> ColoredString {
        match self.theme {
            Theme::Light => "!".red(),
            Theme::Dark => "!".bright_red(),
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use shared::domain::{MessageId, Source};

    use super::*;
    use crate::session::GENERIC_FAILURE_TEXT;

    fn message(role: Role, text: &str, sources: Vec<Source>) -> Message {
        Message {
            id: MessageId(1),
            role,
            text: text.to_string(),
            sent_at: Utc::now(),
            sources,
        }
    }

    #[test]
    fn assistant_message_lists_numbered_references() {
        colored::control::set_override(false);
        let renderer = Renderer::new(Theme::Light);
        let rendered = renderer.message(&message(
            Role::Assistant,
            "18%.",
            vec![Source {
                ordinal: 1,
                content: "Schedule II, Entry 7".to_string(),
            }],
        ));

        assert!(rendered.contains("Vedan: 18%."));
        assert!(rendered.contains("References:"));
        assert!(rendered.contains("[1] Schedule II, Entry 7"));
    }

    #[test]
    fn assistant_message_without_sources_has_no_references_block() {
        colored::control::set_override(false);
        let renderer = Renderer::new(Theme::Dark);
        let rendered = renderer.message(&message(Role::Assistant, "Hello.", Vec::new()));

        assert!(!rendered.contains("References:"));
    }

    #[test]
    fn error_message_renders_fixed_text() {
        colored::control::set_override(false);
        let renderer = Renderer::new(Theme::Light);
        let rendered = renderer.message(&message(Role::Error, GENERIC_FAILURE_TEXT, Vec::new()));

        assert!(rendered.contains("! Something went wrong. Please try again."));
    }
}
