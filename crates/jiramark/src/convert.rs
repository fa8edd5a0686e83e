use crate::prelude::{println, *};
use jiramark_core::{convert, markdown_from_payload, ConvertOptions, Origin};
use serde::Serialize;
use std::io::Read;
use std::path::PathBuf;

#[derive(Debug, clap::Parser)]
#[command(name = "convert")]
#[command(about = "Convert a Markdown or HTML file to Jira Wiki Markup")]
pub struct App {
    /// File to convert, reads stdin when omitted
    #[clap(env = "JIRAMARK_FILE")]
    file: Option<PathBuf>,

    /// Output as JSON
    #[arg(long)]
    json: bool,
}

#[derive(Debug, Serialize)]
pub struct ConvertOutput {
    pub markdown: String,
    pub jira: String,
    pub origin: Origin,
}

pub fn run(app: App, global: crate::Global) -> Result<()> {
    let input = match &app.file {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| f!("failed to read {}", path.display()))?,
        None => {
            let mut buffer = String::new();
            std::io::stdin()
                .read_to_string(&mut buffer)
                .context("failed to read stdin")?;
            buffer
        }
    };

    let output = convert_input(&input, &global.convert_options());

    if app.json {
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else {
        println!("{}", output.jira);
    }

    Ok(())
}

/// Public function for reuse by other front ends
pub fn convert_input(input: &str, options: &ConvertOptions) -> ConvertOutput {
    let extraction = markdown_from_payload(input);
    let jira = convert(&extraction.markdown, options);

    ConvertOutput {
        markdown: extraction.markdown,
        jira,
        origin: extraction.origin,
    }
}
