use crossterm::{
    queue,
    style::{Color, Print, ResetColor, SetForegroundColor},
};
use std::io::{self, Write};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tone {
    Plain,
    Scheduler,
    Completion,
    Warning,
}

impl Tone {
    fn color(self) -> Option<Color> {
        match self {
            Tone::Plain => None,
            Tone::Scheduler => Some(Color::Blue),
            Tone::Completion => Some(Color::Green),
            Tone::Warning => Some(Color::Yellow),
        }
    }
}

pub struct Console<W: Write> {
    out: W,
    colored: bool,
}

impl<W: Write> Console<W> {
    pub fn new(out: W, colored: bool) -> Self {
        Self { out, colored }
    }

    pub fn line(&mut self, tone: Tone, text: &str) -> io::Result<()> {
        match tone.color().filter(|_| self.colored) {
            Some(color) => queue!(
                self.out,
                SetForegroundColor(color),
                Print(text),
                ResetColor,
                Print('\n')
            )?,
            None => writeln!(self.out, "{text}")?,
        }
        self.out.flush()
    }

    #[cfg(test)]
    pub fn get_ref(&self) -> &W {
        &self.out
    }
}
