//! CLI tool for datagrid - renders a CSV/TSV file through the grid engine
//!
//! Usage:
//!   datagrid_cli <input.csv>                       # Text table of the first page
//!   datagrid_cli <input.csv> --scroll-top 400      # Page at a scroll offset
//!   datagrid_cli <input.tsv> --html                # HTML instead of text
//!   datagrid_cli <input.csv> --options grid.json   # GridOptions from JSON
//!
//! Set `RUST_LOG=datagrid=debug` to trace draw passes.

#![allow(clippy::exit)]
#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::indexing_slicing)]

#[cfg(not(target_arch = "wasm32"))]
mod cli {
    use std::env;
    use std::fs;

    use datagrid::source::read_delimited;
    use datagrid::{Datagrid, GridOptions};
    use tracing_subscriber::EnvFilter;

    struct Args {
        input: String,
        width: f64,
        height: f64,
        scroll_top: f64,
        html: bool,
        stats: bool,
        options: Option<String>,
    }

    const USAGE: &str = "Usage: datagrid_cli <input.csv|tsv> [--width px] [--height px] \
                         [--scroll-top px] [--html] [--stats] [--options grid.json]";

    fn fail(msg: &str) -> ! {
        eprintln!("{msg}");
        std::process::exit(1);
    }

    fn parse_args() -> Args {
        let mut args = env::args().skip(1);
        let mut parsed = Args {
            input: String::new(),
            width: 800.0,
            height: 380.0,
            scroll_top: 0.0,
            html: false,
            stats: false,
            options: None,
        };
        let number = |flag: &str, value: Option<String>| -> f64 {
            value
                .and_then(|v| v.parse().ok())
                .unwrap_or_else(|| fail(&format!("{flag} expects a number\n{USAGE}")))
        };
        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--width" => parsed.width = number("--width", args.next()),
                "--height" => parsed.height = number("--height", args.next()),
                "--scroll-top" => parsed.scroll_top = number("--scroll-top", args.next()),
                "--html" => parsed.html = true,
                "--stats" => parsed.stats = true,
                "--options" => parsed.options = args.next(),
                "-h" | "--help" => {
                    println!("{USAGE}");
                    std::process::exit(0);
                }
                other if parsed.input.is_empty() => parsed.input = other.to_string(),
                other => fail(&format!("Unexpected argument {other}\n{USAGE}")),
            }
        }
        if parsed.input.is_empty() {
            fail(USAGE);
        }
        parsed
    }

    pub fn main() {
        tracing_subscriber::fmt()
            .with_env_filter(EnvFilter::from_default_env())
            .with_writer(std::io::stderr)
            .init();

        let args = parse_args();

        let options = match &args.options {
            Some(path) => {
                let json = fs::read_to_string(path)
                    .unwrap_or_else(|e| fail(&format!("Error reading {path}: {e}")));
                GridOptions::from_json(&json)
                    .unwrap_or_else(|e| fail(&format!("Error parsing {path}: {e}")))
            }
            None => GridOptions::default(),
        };

        let source = read_delimited(&args.input)
            .unwrap_or_else(|e| fail(&format!("Error loading {}: {e}", args.input)));

        let runtime = tokio::runtime::Builder::new_current_thread()
            .build()
            .expect("tokio runtime");
        runtime.block_on(async {
            let grid = Datagrid::new(source, options).with_size(args.width, args.height);
            if let Err(e) = grid.load().await {
                fail(&format!("Error drawing: {e}"));
            }
            if args.scroll_top > 0.0 {
                if let Err(e) = grid.scroll_to(args.scroll_top, 0.0).await {
                    fail(&format!("Error drawing: {e}"));
                }
            }

            let output = if args.html {
                grid.to_html()
            } else {
                grid.to_text()
            };
            println!("{}", output.unwrap_or_default());
            if args.stats {
                let stats = serde_json::to_string(&grid.stats()).unwrap();
                eprintln!("viewport: {:?}", grid.viewport());
                eprintln!("stats: {stats}");
            }
        });
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    cli::main();
}

#[cfg(target_arch = "wasm32")]
fn main() {}
