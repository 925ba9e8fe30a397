use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use layergraph::{
    EdgePolicy, GraphLayout, LayeredLayout, LayoutEngine, LayoutRequest, TraceObserver,
};
use std::fmt::Write as _;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use tracing_subscriber::{prelude::*, EnvFilter};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum InputFormat {
    Json,
    Ron,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Json,
    Ron,
    /// One line per layer, using vertex labels when the request has them
    Text,
}

/// Assign the vertices of a directed graph to layers
#[derive(Parser)]
#[command(author, version, about)]
struct Args {
    /// Request to lay out, read from stdin when absent
    input: Option<PathBuf>,

    /// Where to write the layout, stdout when absent
    #[arg(short, long)]
    output: Option<PathBuf>,

    #[arg(long, value_enum, default_value_t = InputFormat::Json)]
    input_format: InputFormat,

    #[arg(short, long, value_enum, default_value_t = OutputFormat::Json)]
    format: OutputFormat,

    /// Layout configuration in RON, overridden by the flags below
    #[arg(long)]
    config: Option<PathBuf>,

    /// Fail on out of range edges and self-loops instead of dropping them
    #[arg(long)]
    strict: bool,

    /// Keep the longest-path layering as is
    #[arg(long)]
    no_compact: bool,

    #[arg(long)]
    max_compaction_passes: Option<usize>,

    /// Pretty-print json and ron output
    #[arg(long)]
    pretty: bool,

    /// Log layout events (dropped and reversed edges, components) at debug level
    #[arg(long)]
    events: bool,
}

impl Args {
    fn layout_config(&self) -> Result<LayeredLayout> {
        let mut config = match &self.config {
            Some(path) => {
                let text = std::fs::read_to_string(path)
                    .with_context(|| format!("Failed to read config {}", path.display()))?;
                ron::from_str(&text)
                    .with_context(|| format!("Failed to parse config {}", path.display()))?
            }
            None => LayeredLayout::default(),
        };

        if self.strict {
            config.edge_policy = EdgePolicy::Reject;
        }
        if self.no_compact {
            config.compact = false;
        }
        if let Some(passes) = self.max_compaction_passes {
            config.max_compaction_passes = passes;
        }

        Ok(config)
    }
}

fn read_request(input: Option<&Path>, format: InputFormat) -> Result<LayoutRequest> {
    let text = match input {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read request {}", path.display()))?,
        None => {
            let mut text = String::new();
            std::io::stdin()
                .read_to_string(&mut text)
                .context("Failed to read request from stdin")?;
            text
        }
    };
    parse_request(&text, format)
}

fn parse_request(text: &str, format: InputFormat) -> Result<LayoutRequest> {
    match format {
        InputFormat::Json => serde_json::from_str(text).context("Invalid json request"),
        InputFormat::Ron => ron::from_str(text).context("Invalid ron request"),
    }
}

fn render(
    layout: &GraphLayout,
    request: &LayoutRequest,
    format: OutputFormat,
    pretty: bool,
) -> Result<String> {
    let mut rendered = match (format, pretty) {
        (OutputFormat::Json, false) => serde_json::to_string(layout)?,
        (OutputFormat::Json, true) => serde_json::to_string_pretty(layout)?,
        (OutputFormat::Ron, false) => ron::to_string(layout)?,
        (OutputFormat::Ron, true) => {
            ron::ser::to_string_pretty(layout, ron::ser::PrettyConfig::default())?
        }
        (OutputFormat::Text, _) => render_text(layout, request)?,
    };
    if !rendered.ends_with('\n') {
        rendered.push('\n');
    }
    Ok(rendered)
}

fn render_text(
    layout: &GraphLayout,
    request: &LayoutRequest,
) -> Result<String, std::fmt::Error> {
    let mut text = String::new();
    for (index, component) in layout.components.iter().enumerate() {
        writeln!(text, "component {index}")?;
        for (layer, vertices) in component.layers.iter().enumerate() {
            let names: Vec<String> = vertices
                .iter()
                .map(|&vertex| match request.label(vertex) {
                    Some(label) if !label.is_empty() => label.to_string(),
                    _ => vertex.to_string(),
                })
                .collect();
            writeln!(text, "  {layer}: {}", names.join(" "))?;
        }
    }
    for (from, to) in &layout.reversed {
        writeln!(text, "reversed {from} -> {to}")?;
    }
    Ok(text)
}

fn write_output(output: Option<&Path>, rendered: &str) -> Result<()> {
    match output {
        Some(path) => std::fs::write(path, rendered)
            .with_context(|| format!("Failed to write layout to {}", path.display())),
        None => std::io::stdout()
            .lock()
            .write_all(rendered.as_bytes())
            .context("Failed to write layout to stdout"),
    }
}

fn main() -> Result<()> {
    let args = Args::parse();

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::from_default_env())
        .init();

    let config = args.layout_config()?;
    debug!("Layout configuration: {config:?}");

    let request = read_request(args.input.as_deref(), args.input_format)?;
    let layout = if args.events {
        config.layout_with(&request, &mut TraceObserver)
    } else {
        config.layout(&request)
    }
    .context("Layout failed")?;

    info!(
        "Laid out {} vertices in {} components, {} edges reversed",
        layout.vertex_count(),
        layout.components.len(),
        layout.reversed.len()
    );

    let rendered = render(&layout, &request, args.format, args.pretty)?;
    write_output(args.output.as_deref(), &rendered)
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_log::test;

    #[test]
    fn flags_override_defaults() {
        let args = Args::try_parse_from([
            "layergraph",
            "--strict",
            "--no-compact",
            "--max-compaction-passes",
            "3",
        ])
        .unwrap();
        let config = args.layout_config().unwrap();
        assert_eq!(config.edge_policy, EdgePolicy::Reject);
        assert!(!config.compact);
        assert_eq!(config.max_compaction_passes, 3);
    }

    #[test]
    fn default_flags_keep_default_config() {
        let args = Args::try_parse_from(["layergraph", "graph.json"]).unwrap();
        assert_eq!(args.input, Some(PathBuf::from("graph.json")));
        assert_eq!(args.format, OutputFormat::Json);
        assert_eq!(args.layout_config().unwrap(), LayeredLayout::default());
    }

    #[test]
    fn ron_request_parses() {
        let request = parse_request(
            r#"(vertex_count: 3, edges: [(0, 1), (1, 2)], labels: ["a", "b", "c"])"#,
            InputFormat::Ron,
        )
        .unwrap();
        assert_eq!(request.edges.len(), 2);
        assert_eq!(request.label(2), Some("c"));
    }

    #[test]
    fn text_output_uses_labels() {
        let request = parse_request(
            r#"{"vertex_count": 4, "edges": [[0, 1], [0, 2], [2, 0]], "labels": ["root", "", "leaf"]}"#,
            InputFormat::Json,
        )
        .unwrap();
        let layout = LayeredLayout::default().layout(&request).unwrap();

        let text = render(&layout, &request, OutputFormat::Text, false).unwrap();
        assert_eq!(
            text,
            "component 0\n  0: root\n  1: 1 leaf\ncomponent 1\n  0: 3\nreversed 2 -> 0\n"
        );
    }

    #[test]
    fn text_output_lists_every_layer() {
        let request = LayoutRequest::new(3)
            .with_edge(0, 1)
            .with_edge(1, 2)
            .with_labels(["a", "b"]);
        let layout = LayeredLayout::default().layout(&request).unwrap();

        let text = render_text(&layout, &request).unwrap();
        assert_eq!(text, "component 0\n  0: a\n  1: b\n  2: 2\n");
    }

    #[test]
    fn json_output_ends_with_newline() {
        let request = LayoutRequest::new(1);
        let layout = LayeredLayout::default().layout(&request).unwrap();
        let json = render(&layout, &request, OutputFormat::Json, false).unwrap();
        assert_eq!(json, "{\"components\":[{\"layers\":[[0]]}],\"reversed\":[]}\n");
    }
}
