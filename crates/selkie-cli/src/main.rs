use futures::executor::block_on;
use selkie::render::export::{PageOptions, diagram_to_pdf, export_document, file_name_for};
use selkie::render::preview::{DocumentPreview, PreviewOptions};
use selkie::render::raster::{RasterOptions, svg_to_jpeg, svg_to_png};
use selkie::render::{BlockOutcome, DiagramRenderer};
use serde::Serialize;
use std::io::Read;
use std::str::FromStr;

#[derive(Debug)]
enum CliError {
    Usage(&'static str),
    Io(std::io::Error),
    Export(selkie::render::export::ExportError),
    Raster(selkie::render::raster::RasterError),
    Client(selkie_client::ClientError),
    Json(serde_json::Error),
    NoDiagram,
}

impl std::fmt::Display for CliError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CliError::Usage(msg) => write!(f, "{msg}"),
            CliError::Io(err) => write!(f, "I/O error: {err}"),
            CliError::Export(err) => write!(f, "{err}"),
            CliError::Raster(err) => write!(f, "{err}"),
            CliError::Client(err) => write!(f, "{err}"),
            CliError::Json(err) => write!(f, "JSON error: {err}"),
            CliError::NoDiagram => write!(f, "No flowchart recovered from input"),
        }
    }
}

impl From<std::io::Error> for CliError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<selkie::render::export::ExportError> for CliError {
    fn from(value: selkie::render::export::ExportError) -> Self {
        Self::Export(value)
    }
}

impl From<selkie::render::raster::RasterError> for CliError {
    fn from(value: selkie::render::raster::RasterError) -> Self {
        Self::Raster(value)
    }
}

impl From<selkie_client::ClientError> for CliError {
    fn from(value: selkie_client::ClientError) -> Self {
        Self::Client(value)
    }
}

impl From<serde_json::Error> for CliError {
    fn from(value: serde_json::Error) -> Self {
        Self::Json(value)
    }
}

#[derive(Debug, Clone, Copy, Default)]
enum Command {
    #[default]
    Recover,
    Render,
    Export,
    Sessions,
    Document,
}

#[derive(Debug, Clone, Copy, Default)]
enum RenderFormat {
    #[default]
    Svg,
    Png,
    Jpeg,
    Pdf,
}

impl FromStr for RenderFormat {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "svg" => Ok(Self::Svg),
            "png" => Ok(Self::Png),
            "jpg" | "jpeg" => Ok(Self::Jpeg),
            "pdf" => Ok(Self::Pdf),
            _ => Err(()),
        }
    }
}

#[derive(Debug, Default)]
struct Args {
    command: Command,
    input: Option<String>,
    json: bool,
    pretty: bool,
    render_format: RenderFormat,
    render_scale: f32,
    background: Option<String>,
    title: Option<String>,
    out: Option<String>,
    base_url: Option<String>,
    delete_id: Option<String>,
    session_id: Option<String>,
    export_pdf: bool,
}

#[derive(Serialize)]
struct RecoveredOut<'a> {
    start: usize,
    end: usize,
    direction: &'a str,
    subgraph_count: usize,
    source: &'a str,
}

fn usage() -> &'static str {
    "selkie-cli\n\
\n\
USAGE:\n\
  selkie-cli [recover] [--json] [--pretty] [<path>|-]\n\
  selkie-cli render [--format svg|png|jpg|pdf] [--scale <n>] [--background <css-color>] [--out <path>] [<path>|-]\n\
  selkie-cli export [--title <title>] [--out <path>] [<path>|-]\n\
  selkie-cli sessions --base-url <url> [--delete <id>]\n\
  selkie-cli document --base-url <url> --session <id> [--pdf] [--out <path>]\n\
\n\
NOTES:\n\
  - If <path> is omitted or '-', input is read from stdin.\n\
  - recover prints each repaired flowchart source; --json adds spans and orientation.\n\
  - render runs the full pipeline on the input and writes the first recovered diagram.\n\
  - export treats the input as markdown and writes a paginated A4 PDF.\n\
  - document fetches the generated document for a session; --pdf exports it.\n\
"
}

fn parse_args(argv: &[String]) -> Result<Args, CliError> {
    let mut args = Args {
        render_scale: 1.0,
        ..Default::default()
    };

    let mut it = argv.iter().skip(1).peekable();
    while let Some(a) = it.next() {
        match a.as_str() {
            "--help" | "-h" => return Err(CliError::Usage(usage())),
            "recover" => args.command = Command::Recover,
            "render" => args.command = Command::Render,
            "export" => args.command = Command::Export,
            "sessions" => args.command = Command::Sessions,
            "document" => args.command = Command::Document,
            "--json" => args.json = true,
            "--pretty" => args.pretty = true,
            "--pdf" => args.export_pdf = true,
            "--format" => {
                let Some(fmt) = it.next() else {
                    return Err(CliError::Usage(usage()));
                };
                args.render_format = fmt
                    .parse::<RenderFormat>()
                    .map_err(|_| CliError::Usage(usage()))?;
            }
            "--scale" => {
                let Some(scale) = it.next() else {
                    return Err(CliError::Usage(usage()));
                };
                args.render_scale = scale.parse::<f32>().map_err(|_| CliError::Usage(usage()))?;
                if !(args.render_scale.is_finite() && args.render_scale > 0.0) {
                    return Err(CliError::Usage(usage()));
                }
            }
            "--background" => {
                let Some(bg) = it.next() else {
                    return Err(CliError::Usage(usage()));
                };
                if !bg.trim().is_empty() {
                    args.background = Some(bg.trim().to_string());
                }
            }
            "--title" => {
                let Some(title) = it.next() else {
                    return Err(CliError::Usage(usage()));
                };
                args.title = Some(title.clone());
            }
            "--out" => {
                let Some(out) = it.next() else {
                    return Err(CliError::Usage(usage()));
                };
                args.out = Some(out.clone());
            }
            "--base-url" => {
                let Some(url) = it.next() else {
                    return Err(CliError::Usage(usage()));
                };
                args.base_url = Some(url.clone());
            }
            "--delete" => {
                let Some(id) = it.next() else {
                    return Err(CliError::Usage(usage()));
                };
                args.delete_id = Some(id.clone());
            }
            "--session" => {
                let Some(id) = it.next() else {
                    return Err(CliError::Usage(usage()));
                };
                args.session_id = Some(id.clone());
            }
            other if other.starts_with('-') && other != "-" => {
                return Err(CliError::Usage(usage()));
            }
            path => {
                if args.input.is_some() {
                    return Err(CliError::Usage(usage()));
                }
                args.input = Some(path.to_string());
            }
        }
    }

    Ok(args)
}

fn read_input(input: Option<&str>) -> Result<String, CliError> {
    match input {
        None | Some("-") => {
            let mut buf = String::new();
            std::io::stdin().read_to_string(&mut buf)?;
            Ok(buf)
        }
        Some(path) => Ok(std::fs::read_to_string(path)?),
    }
}

fn write_bytes(bytes: &[u8], out: Option<&str>, default_name: &str) -> Result<(), CliError> {
    match out {
        Some("-") => {
            use std::io::Write;
            std::io::stdout().lock().write_all(bytes)?;
            Ok(())
        }
        Some(path) => {
            std::fs::write(path, bytes)?;
            Ok(())
        }
        None => {
            std::fs::write(default_name, bytes)?;
            eprintln!("wrote {default_name}");
            Ok(())
        }
    }
}

fn run(args: Args) -> Result<(), CliError> {
    match args.command {
        Command::Recover => {
            let text = read_input(args.input.as_deref())?;
            let recovered = selkie::recover_diagrams(&text);
            if recovered.is_empty() {
                return Err(CliError::NoDiagram);
            }
            if args.json {
                let out: Vec<RecoveredOut<'_>> = recovered
                    .iter()
                    .map(|r| RecoveredOut {
                        start: r.span.start,
                        end: r.span.end,
                        direction: r.orientation.direction.token(),
                        subgraph_count: r.orientation.subgraph_count,
                        source: r.source.as_str(),
                    })
                    .collect();
                if args.pretty {
                    serde_json::to_writer_pretty(std::io::stdout().lock(), &out)?;
                } else {
                    serde_json::to_writer(std::io::stdout().lock(), &out)?;
                }
                println!();
            } else {
                for (i, r) in recovered.iter().enumerate() {
                    if i > 0 {
                        println!();
                    }
                    println!("{}", r.source.as_str());
                }
            }
            Ok(())
        }
        Command::Render => {
            let text = read_input(args.input.as_deref())?;
            let renderer = DiagramRenderer::new();
            let mut diagram = None;
            for recovered in selkie::recover_diagrams(&text) {
                if let BlockOutcome::Diagram(d) = block_on(renderer.render_block(&recovered.span.text))
                {
                    diagram = Some(d);
                    break;
                }
            }
            let Some(diagram) = diagram else {
                return Err(CliError::NoDiagram);
            };

            let raster = RasterOptions {
                scale: args.render_scale,
                background: args.background.clone(),
                ..RasterOptions::default()
            };
            match args.render_format {
                RenderFormat::Svg => match args.out.as_deref() {
                    None | Some("-") => print!("{}", diagram.svg),
                    Some(path) => std::fs::write(path, &diagram.svg)?,
                },
                RenderFormat::Png => {
                    let bytes = svg_to_png(&diagram.svg, &raster)?;
                    write_bytes(&bytes, args.out.as_deref(), "out.png")?;
                }
                RenderFormat::Jpeg => {
                    let bytes = svg_to_jpeg(&diagram.svg, &raster)?;
                    write_bytes(&bytes, args.out.as_deref(), "out.jpg")?;
                }
                RenderFormat::Pdf => {
                    let bytes = diagram_to_pdf(&diagram.svg)?;
                    write_bytes(&bytes, args.out.as_deref(), "out.pdf")?;
                }
            }
            Ok(())
        }
        Command::Export => {
            let markdown = read_input(args.input.as_deref())?;
            let title = args.title.as_deref().unwrap_or("document");
            let mut preview =
                DocumentPreview::from_markdown(title, &markdown, PreviewOptions::default());
            let bytes = block_on(export_document(&mut preview, None, &PageOptions::default()))?;
            let default_name = file_name_for(title);
            write_bytes(&bytes, args.out.as_deref(), &default_name)?;
            Ok(())
        }
        Command::Sessions => {
            let base = args
                .base_url
                .as_deref()
                .ok_or(CliError::Usage(usage()))?;
            let client = selkie_client::Client::new(base)?;
            if let Some(id) = args.delete_id.as_deref() {
                let ack = client.delete_session(id)?;
                println!("deleted {id}: ok={}", ack.ok);
                return Ok(());
            }
            let mut sessions = client.list_sessions()?.items;
            // Newest first, unparsable timestamps last.
            sessions.sort_by_key(|s| std::cmp::Reverse(s.started_at_parsed()));
            for s in &sessions {
                println!(
                    "{}\t{}\t{}",
                    s.id,
                    s.started_at,
                    s.title.as_deref().unwrap_or("(untitled)")
                );
            }
            Ok(())
        }
        Command::Document => {
            let base = args
                .base_url
                .as_deref()
                .ok_or(CliError::Usage(usage()))?;
            let session = args
                .session_id
                .as_deref()
                .ok_or(CliError::Usage(usage()))?;
            let client = selkie_client::Client::new(base)?;
            let document = client.get_document(session)?;
            if args.export_pdf {
                let mut preview = DocumentPreview::from_markdown(
                    &document.title,
                    &document.content_markdown,
                    PreviewOptions::default(),
                );
                let bytes =
                    block_on(export_document(&mut preview, None, &PageOptions::default()))?;
                let default_name = file_name_for(&document.title);
                write_bytes(&bytes, args.out.as_deref(), &default_name)?;
            } else {
                println!("# {}", document.title);
                println!();
                print!("{}", document.content_markdown);
                if let Some(url) = &document.confluence_url {
                    eprintln!("published: {url}");
                }
            }
            Ok(())
        }
    }
}

fn main() {
    let args = match parse_args(&std::env::args().collect::<Vec<_>>()) {
        Ok(v) => v,
        Err(CliError::Usage(msg)) => {
            eprintln!("{msg}");
            std::process::exit(2);
        }
        Err(err) => {
            eprintln!("{err}");
            std::process::exit(1);
        }
    };

    match run(args) {
        Ok(()) => {}
        Err(CliError::NoDiagram) => {
            eprintln!("{}", CliError::NoDiagram);
            std::process::exit(3);
        }
        Err(err) => {
            eprintln!("{err}");
            std::process::exit(1);
        }
    }
}
