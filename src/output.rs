//! Plain-terminal output of routed items

use crate::item::{Item, ItemKind};
use std::io::{self, Write};
use termcolor::{Color, ColorChoice, ColorSpec, StandardStream, WriteColor};

fn color_choice(color: bool) -> ColorChoice {
    if color { ColorChoice::Auto } else { ColorChoice::Never }
}

/// Print items to stdout, one block per item
pub fn print_items(items: &[Item], color: bool) -> io::Result<()> {
    let mut stdout = StandardStream::stdout(color_choice(color));
    write_items(&mut stdout, items)
}

/// Print items as a JSON array
pub fn print_json(items: &[Item]) -> io::Result<()> {
    let stdout = io::stdout();
    let mut lock = stdout.lock();
    serde_json::to_writer_pretty(&mut lock, items)?;
    writeln!(lock)
}

pub fn write_items<W: WriteColor>(out: &mut W, items: &[Item]) -> io::Result<()> {
    if items.is_empty() {
        out.set_color(ColorSpec::new().set_dimmed(true))?;
        writeln!(out, "No results")?;
        out.reset()?;
        return Ok(());
    }

    for item in items {
        write_item(out, item)?;
    }
    Ok(())
}

fn write_item<W: WriteColor>(out: &mut W, item: &Item) -> io::Result<()> {
    let title_color = match item.kind {
        ItemKind::Dataset => Color::Cyan,
        ItemKind::Reference => Color::Green,
        ItemKind::Placeholder => Color::Yellow,
        ItemKind::Error => Color::Red,
    };

    out.set_color(ColorSpec::new().set_fg(Some(title_color)).set_bold(true))?;
    write!(out, "{}", item.title)?;
    out.reset()?;
    writeln!(out)?;

    if !item.subtitle.is_empty() {
        writeln!(out, "  {}", item.subtitle)?;
    }

    // The subtitle often is the URL already
    if let Some(url) = item.url().filter(|url| *url != item.subtitle) {
        out.set_color(ColorSpec::new().set_fg(Some(Color::Blue)).set_underline(true))?;
        write!(out, "  {}", url)?;
        out.reset()?;
        writeln!(out)?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use termcolor::NoColor;

    fn render(items: &[Item]) -> String {
        let mut out = NoColor::new(Vec::new());
        write_items(&mut out, items).unwrap();
        String::from_utf8(out.into_inner()).unwrap()
    }

    #[test]
    fn test_reference_with_distinct_url() {
        let item = Item::reference(
            "uid",
            "aws Res: S3 | s3_bucket",
            "Provides a S3 bucket resource.",
            "https://registry.terraform.io/x",
            "aws Res S3 s3_bucket",
        );
        assert_eq!(
            render(&[item]),
            "aws Res: S3 | s3_bucket\n  Provides a S3 bucket resource.\n  https://registry.terraform.io/x\n"
        );
    }

    #[test]
    fn test_url_subtitle_printed_once() {
        let url = "https://boto3.amazonaws.com/x.html";
        let item = Item::reference(url, "client | iam.create_role", url, url, "client iam create_role");
        assert_eq!(render(&[item]), format!("client | iam.create_role\n  {url}\n"));
    }

    #[test]
    fn test_empty_result() {
        assert_eq!(render(&[]), "No results\n");
    }
}
