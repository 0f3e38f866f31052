use anyhow::Result;
use cliclack::input;

pub struct Input {
    pub input_type: InputType,
    pub content: Option<String>, // Only set for messages
}

pub enum InputType {
    AskAgain, // Ask the user for input again. Control flow command.
    Message,  // User described what is on their mind
    Exit,     // User wants to leave
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Theme {
    Light,
    Dark,
}

impl Theme {
    pub fn bat_theme(&self) -> &'static str {
        match self {
            Theme::Light => "GitHub",
            Theme::Dark => "zenburn",
        }
    }

    fn toggled(self) -> Self {
        match self {
            Theme::Light => Theme::Dark,
            Theme::Dark => Theme::Light,
        }
    }
}

pub struct ChatPrompt {
    pub theme: Theme,
}

impl ChatPrompt {
    pub fn new() -> Self {
        ChatPrompt { theme: Theme::Dark }
    }

    pub fn get_input(&mut self) -> Result<Input> {
        let message_text: String = input("What is on your mind?   [Help: /?]")
            .placeholder("")
            .interact()?;
        Ok(self.interpret(&message_text))
    }

    fn interpret(&mut self, raw: &str) -> Input {
        let message_text = raw.trim();

        if message_text.eq_ignore_ascii_case("/exit") || message_text.eq_ignore_ascii_case("/quit")
        {
            Input {
                input_type: InputType::Exit,
                content: None,
            }
        } else if message_text.eq_ignore_ascii_case("/t") {
            self.theme = self.theme.toggled();
            println!("Switched to {:?} theme", self.theme);
            ask_again()
        } else if message_text.eq_ignore_ascii_case("/?") {
            println!("Commands:");
            println!("/exit - Exit");
            println!("/t - Toggle Light/Dark theme");
            println!("/? - Display this help message");
            ask_again()
        } else {
            Input {
                input_type: InputType::Message,
                content: Some(message_text.to_string()),
            }
        }
    }
}

fn ask_again() -> Input {
    Input {
        input_type: InputType::AskAgain,
        content: None,
    }
}
