use crate::Outcome;

const SPINNER: [&str; 4] = ["|", "/", "-", "\\"];

/// Everything the report window renders.
pub struct App {
    /// Period text typed by the user.
    pub input: String,
    /// Last summary; replaced wholesale after each successful run.
    pub output: String,
    /// Message for the error dialog, if one is open.
    pub error: Option<&'static str>,
    /// A run is in flight.
    pub running: bool,
    pub scroll: u16,
    pub tick_count: u64,
    pub output_path: String,
    pending_errors: Vec<&'static str>,
}

impl App {
    pub fn new(output_path: String) -> Self {
        Self {
            input: String::new(),
            output: String::new(),
            error: None,
            running: false,
            scroll: 0,
            tick_count: 0,
            output_path,
            pending_errors: Vec::new(),
        }
    }

    /// Marks a run as started and returns the input to run it with.
    pub fn start(&mut self) -> String {
        self.running = true;
        self.input.clone()
    }

    pub fn finish(&mut self, outcome: Outcome) {
        self.running = false;
        if let Some(summary) = outcome.summary {
            self.output = summary;
            self.scroll = 0;
        }
        self.pending_errors = outcome.errors;
        self.pending_errors.reverse();
        self.error = self.pending_errors.pop();
    }

    pub fn dismiss_error(&mut self) {
        self.error = self.pending_errors.pop();
    }

    pub fn insert(&mut self, c: char) {
        self.input.push(c);
    }

    pub fn backspace(&mut self) {
        self.input.pop();
    }

    pub fn clear_input(&mut self) {
        self.input.clear();
    }

    pub fn scroll_up(&mut self) {
        self.scroll = self.scroll.saturating_sub(1);
    }

    pub fn scroll_down(&mut self) {
        let max = self.output.lines().count().saturating_sub(1) as u16;
        self.scroll = self.scroll.saturating_add(1).min(max);
    }

    pub fn tick(&mut self) {
        self.tick_count = self.tick_count.wrapping_add(1);
    }

    pub fn spinner(&self) -> &'static str {
        SPINNER[(self.tick_count / 2) as usize % SPINNER.len()]
    }
}
