use async_trait::async_trait;
use bat::WrappingMode;
use console::{measure_text_width, style, truncate_str, Term};

use moyanavi::session::{ErrorNotice, Renderer};
use moyanavi::trace::{DisplayAction, Surface};

use crate::prompt::Theme;

/// Rows of body text a surface may take up.
const MAX_BODY_LINES: usize = 8;

/// The search and analysis surfaces, one item each.
#[derive(Debug, Default)]
pub struct Board {
    search: Option<DisplayAction>,
    analysis: Option<DisplayAction>,
}

impl Board {
    pub fn update(&mut self, action: DisplayAction) {
        match action.surface {
            Surface::Search => self.search = Some(action),
            Surface::Analysis => self.analysis = Some(action),
        }
    }

    /// The board as terminal rows, each cut to `width` columns so the row
    /// count matches what the terminal shows.
    pub fn lines(&self, width: usize) -> Vec<String> {
        let mut lines = Vec::new();
        for (heading, slot) in [("🔎 Search", &self.search), ("📊 Analysis", &self.analysis)] {
            lines.push(style(heading).bold().underlined().to_string());
            match slot {
                Some(action) => {
                    lines.push(style(&action.title).cyan().to_string());
                    let body: Vec<&str> = action.body.lines().collect();
                    for line in body.iter().take(MAX_BODY_LINES) {
                        lines.push(format!("  {}", line));
                    }
                    if body.len() > MAX_BODY_LINES {
                        lines.push(style("  …").dim().to_string());
                    }
                }
                None => lines.push(style("  waiting…").dim().to_string()),
            }
            lines.push(String::new());
        }

        lines
            .into_iter()
            .map(|line| {
                if measure_text_width(&line) > width {
                    truncate_str(&line, width, "…").into_owned()
                } else {
                    line
                }
            })
            .collect()
    }
}

/// Draws the board in place: every update erases the rows drawn last time.
pub struct TerminalRenderer {
    term: Term,
    board: Board,
    drawn: usize,
    theme: Theme,
}

impl TerminalRenderer {
    pub fn new(theme: Theme) -> Self {
        Self {
            term: Term::stdout(),
            board: Board::default(),
            drawn: 0,
            theme,
        }
    }

    fn redraw(&mut self) {
        let width = usize::from(self.term.size().1).max(20);
        let lines = self.board.lines(width);

        if self.drawn > 0 {
            if let Err(e) = self.term.clear_last_lines(self.drawn) {
                tracing::warn!("Failed to clear board: {}", e);
            }
        }
        for line in &lines {
            if let Err(e) = self.term.write_line(line) {
                tracing::warn!("Failed to draw board: {}", e);
            }
        }
        self.drawn = lines.len();
    }
}

#[async_trait]
impl Renderer for TerminalRenderer {
    async fn render_trace(&mut self, action: DisplayAction) {
        self.board.update(action);
        self.redraw();
    }

    async fn render_answer(&mut self, answer: &str) {
        // The answer goes below the board, which stays where it is from now on
        self.drawn = 0;
        println!("{}", style("💡 Answer").bold());

        let printed = bat::PrettyPrinter::new()
            .input(bat::Input::from_bytes(answer.as_bytes()))
            .theme(self.theme.bat_theme())
            .language("Markdown")
            .wrapping_mode(WrappingMode::Character)
            .print();
        if let Err(e) = printed {
            tracing::warn!("Failed to highlight answer: {}", e);
            println!("{}", answer);
        }
        println!();
    }

    async fn render_error(&mut self, notice: ErrorNotice) {
        if let Err(e) = cliclack::log::error(notice.message()) {
            tracing::warn!("Failed to print error: {}", e);
            eprintln!("{}", notice.message());
        }
    }
}
