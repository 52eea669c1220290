use std::io::Write;
use termcolor::{Color, ColorChoice, ColorSpec, StandardStream, WriteColor};

pub enum Style {
    Location,
    Author,
    Age,
    Normal,
}

pub struct ColoredWriter<W> {
    inner: W,
}

impl ColoredWriter<StandardStream> {
    pub fn stdout(choice: ColorChoice) -> Self {
        Self::new(StandardStream::stdout(choice))
    }
}

impl<W: WriteColor> ColoredWriter<W> {
    pub fn new(inner: W) -> Self {
        Self { inner }
    }

    pub fn into_inner(self) -> W {
        self.inner
    }

    pub fn write(&mut self, message: impl std::fmt::Display, style: Style) -> std::io::Result<()> {
        match style {
            Style::Location => self
                .inner
                .set_color(ColorSpec::new().set_fg(Some(Color::Magenta)))?,

            Style::Author => self
                .inner
                .set_color(ColorSpec::new().set_fg(Some(Color::Green)))?,

            Style::Age => self
                .inner
                .set_color(ColorSpec::new().set_fg(Some(Color::Blue)))?,

            Style::Normal => self.inner.reset()?,
        }
        write!(self.inner, "{}", message)?;

        Ok(())
    }

    pub fn flush(&mut self) -> std::io::Result<()> {
        self.inner.reset()?;
        self.inner.flush()
    }
}
