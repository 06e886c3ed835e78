use std::io::{self, Write};
use vidfetch::{RenderCommand, StatusKind};

/// Applies render commands to a plain text stream.
pub struct Report<W: Write> {
    out: W,
    shown: usize,
}

impl<W: Write> Report<W> {
    pub fn new(out: W) -> Self {
        Report { out, shown: 0 }
    }

    pub fn apply(&mut self, command: &RenderCommand) -> io::Result<()> {
        match command {
            RenderCommand::SetStatus { kind, text } => {
                let tag = match kind {
                    StatusKind::Info => "..",
                    StatusKind::Success => "ok",
                    StatusKind::Error => "!!",
                };
                writeln!(self.out, "[{tag}] {text}")
            }
            RenderCommand::HideStatus => Ok(()),
            RenderCommand::ClearResults => {
                self.shown = 0;
                Ok(())
            }
            RenderCommand::SetPreview { src } => self.field("Preview", src),
            RenderCommand::SetThumbnail { src } => self.field("Thumbnail", src),
            RenderCommand::SetTitle { text } => self.field("Title", text),
            RenderCommand::AppendAction(action) => {
                self.shown += 1;
                writeln!(
                    self.out,
                    "  {:<15} {} (save as {})",
                    action.label, action.url, action.filename
                )
            }
            RenderCommand::ShowResults => {
                if self.shown == 0 {
                    writeln!(self.out, "No media found in the response.")?;
                }
                Ok(())
            }
        }
    }

    pub fn apply_all(&mut self, commands: &[RenderCommand]) -> io::Result<()> {
        for command in commands {
            self.apply(command)?;
        }
        self.out.flush()
    }

    fn field(&mut self, name: &str, value: &str) -> io::Result<()> {
        self.shown += 1;
        writeln!(self.out, "{:<10} {}", format!("{name}:"), value)
    }
}
