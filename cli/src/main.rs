//! html2rtf CLI - HTML to RTF conversion tool

use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand, ValueEnum};
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};

use html2rtf::{ConversionStats, Html2Rtf, RenderOptions, RenderResult, WidthMode};

#[derive(Parser)]
#[command(name = "html2rtf")]
#[command(author = "html2rtf contributors")]
#[command(version)]
#[command(about = "Convert HTML documents to RTF", long_about = None)]
struct Cli {
    /// Input HTML file ("-" for stdin)
    #[arg(value_name = "FILE")]
    input: Option<PathBuf>,

    /// Output RTF file
    #[arg(value_name = "OUTPUT")]
    output: Option<PathBuf>,

    #[command(flatten)]
    render: RenderArgs,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert one or more HTML files to RTF
    Convert {
        /// Input HTML files ("-" for stdin)
        #[arg(value_name = "FILE", required = true)]
        inputs: Vec<PathBuf>,

        /// Output file, or output directory when several inputs are given
        #[arg(short, long, value_name = "PATH")]
        output: Option<PathBuf>,

        #[command(flatten)]
        render: RenderArgs,
    },

    /// Show conversion statistics as JSON
    Info {
        /// Input HTML file ("-" for stdin)
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Output compact JSON
        #[arg(long)]
        compact: bool,
    },

    /// Show version information
    Version,
}

#[derive(Args, Clone, Default)]
struct RenderArgs {
    /// JSON file with render options
    #[arg(long, value_name = "FILE", env = "HTML2RTF_OPTIONS")]
    options: Option<PathBuf>,

    /// Mark the document as write-protected
    #[arg(short, long)]
    protect: bool,

    /// Base font size in points
    #[arg(long, value_name = "POINTS")]
    font_size: Option<u32>,

    /// How table column widths are derived
    #[arg(long, value_enum)]
    width_mode: Option<TableWidth>,

    /// Document title
    #[arg(long)]
    title: Option<String>,

    /// Custom RTF template file
    #[arg(long, value_name = "FILE")]
    template: Option<PathBuf>,

    /// Leave out embedded images
    #[arg(long)]
    no_images: bool,

    /// Never fetch images over the network
    #[arg(long)]
    offline: bool,

    /// Reject markup with parse errors
    #[arg(long)]
    strict: bool,
}

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum)]
enum TableWidth {
    /// Longest word per column
    MaxByColumn,
    /// Longest cell per column
    TotalByColumn,
    /// Running sum of longest words (default)
    CumulativeMax,
    /// Running sum of longest cells
    CumulativeTotal,
}

impl From<TableWidth> for WidthMode {
    fn from(mode: TableWidth) -> Self {
        match mode {
            TableWidth::MaxByColumn => WidthMode::MaxByColumn,
            TableWidth::TotalByColumn => WidthMode::TotalByColumn,
            TableWidth::CumulativeMax => WidthMode::CumulativeMax,
            TableWidth::CumulativeTotal => WidthMode::CumulativeTotal,
        }
    }
}

impl RenderArgs {
    fn render_options(&self) -> Result<RenderOptions, Box<dyn std::error::Error>> {
        let mut options = match self.options {
            Some(ref path) => {
                let json = fs::read_to_string(path)?;
                serde_json::from_str(&json)
                    .map_err(|e| format!("Invalid options file {}: {}", path.display(), e))?
            }
            None => RenderOptions::default(),
        };

        if self.protect {
            options = options.with_protection(true);
        }
        if let Some(size) = self.font_size {
            options = options.with_font_size(size);
        }
        if let Some(mode) = self.width_mode {
            options = options.with_width_mode(mode.into());
        }
        if let Some(ref title) = self.title {
            options = options.with_title(title.clone());
        }
        if let Some(ref template) = self.template {
            options = options.with_template(template.clone());
        }
        if self.no_images {
            options = options.with_images(false);
        }

        Ok(options)
    }

    fn converter(&self) -> Result<Html2Rtf, Box<dyn std::error::Error>> {
        let mut converter = Html2Rtf::new().with_options(self.render_options()?);
        if self.strict {
            converter = converter.strict();
        }
        if self.offline {
            converter = converter.offline();
        }
        Ok(converter)
    }
}

fn main() {
    env_logger::init();

    let cli = Cli::parse();

    let result = match cli.command {
        Some(Commands::Convert {
            inputs,
            output,
            render,
        }) => cmd_convert(&inputs, output.as_deref(), &render),
        Some(Commands::Info { input, compact }) => cmd_info(&input, compact),
        Some(Commands::Version) => {
            cmd_version();
            Ok(())
        }
        None => {
            // Default behavior: convert if input is provided
            if let Some(input) = cli.input {
                cmd_convert(&[input], cli.output.as_deref(), &cli.render)
            } else {
                println!("{}", "Usage: html2rtf <FILE> [OUTPUT]".yellow());
                println!("       html2rtf --help for more information");
                Ok(())
            }
        }
    };

    if let Err(e) = result {
        eprintln!("{}: {}", "Error".red().bold(), e);
        std::process::exit(1);
    }
}

fn is_stdin(path: &Path) -> bool {
    path.as_os_str() == "-"
}

fn convert_one(converter: &Html2Rtf, input: &Path) -> html2rtf::Result<RenderResult> {
    if is_stdin(input) {
        let mut data = Vec::new();
        io::stdin().read_to_end(&mut data)?;
        converter.convert_bytes(&data)
    } else {
        converter.convert_file(input)
    }
}

fn cmd_convert(
    inputs: &[PathBuf],
    output: Option<&Path>,
    render: &RenderArgs,
) -> Result<(), Box<dyn std::error::Error>> {
    let converter = render.converter()?;

    if let [input] = inputs {
        if output.map_or(true, |p| !p.is_dir()) {
            let result = convert_one(&converter, input)?;
            report_missing(input, &result);
            match output {
                Some(path) => {
                    fs::write(path, &result.content)?;
                    println!("{} {}", "Saved to".green(), path.display());
                }
                None => println!("{}", result.content),
            }
            return Ok(());
        }
    }

    if let Some(dir) = output {
        fs::create_dir_all(dir)?;
    }

    let pb = ProgressBar::new(inputs.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
            .unwrap()
            .progress_chars("#>-"),
    );

    let mut failed = 0;
    let mut totals = ConversionStats::new();
    for input in inputs {
        pb.set_message(input.display().to_string());
        let target = output_path(input, output);

        match convert_one(&converter, input) {
            Ok(result) => {
                fs::write(&target, &result.content)?;
                totals.merge(&result.stats);
                pb.println(format!("{} {}", "Converted".green(), target.display()));
            }
            Err(e) => {
                failed += 1;
                pb.println(format!("{} {}: {}", "Failed".red(), input.display(), e));
            }
        }
        pb.inc(1);
    }

    pb.finish_with_message("Done!");
    println!("{}", batch_summary(inputs.len() - failed, &totals));

    if failed > 0 {
        return Err(format!("{} of {} files failed", failed, inputs.len()).into());
    }

    Ok(())
}

fn output_path(input: &Path, output_dir: Option<&Path>) -> PathBuf {
    let name = if is_stdin(input) {
        PathBuf::from("stdin.rtf")
    } else {
        PathBuf::from(input.file_name().unwrap_or_default()).with_extension("rtf")
    };

    match output_dir {
        Some(dir) => dir.join(name),
        None => input.with_extension("rtf"),
    }
}

fn batch_summary(converted: usize, totals: &ConversionStats) -> String {
    let mut summary = format!(
        "{} file(s): {} paragraph(s), {} heading(s), {} table(s), {} image(s), {} link(s)",
        converted,
        totals.paragraph_count,
        totals.heading_count,
        totals.table_count,
        totals.image_count,
        totals.link_count
    );
    if totals.missing_image_count > 0 {
        summary.push_str(&format!(", {} missing image(s)", totals.missing_image_count));
    }
    summary
}

fn report_missing(input: &Path, result: &RenderResult) {
    if result.stats.missing_image_count > 0 {
        eprintln!(
            "{} {} image(s) in {} could not be embedded",
            "Warning:".yellow().bold(),
            result.stats.missing_image_count,
            input.display()
        );
    }
}

fn cmd_info(input: &Path, compact: bool) -> Result<(), Box<dyn std::error::Error>> {
    let converter = Html2Rtf::new().with_options(RenderOptions::new().with_info(false));
    let result = convert_one(&converter, input)?;

    let info = serde_json::json!({
        "file": input.display().to_string(),
        "title": result.title,
        "rtf_bytes": result.content_len(),
        "stats": result.stats,
    });

    let json = if compact {
        serde_json::to_string(&info)?
    } else {
        serde_json::to_string_pretty(&info)?
    };
    println!("{}", json);

    Ok(())
}

fn cmd_version() {
    println!("{} {}", "html2rtf".cyan().bold(), env!("CARGO_PKG_VERSION"));
    println!("HTML to RTF conversion tool");
    println!();
    println!(
        "Repository: {}",
        "https://github.com/html2rtf/html2rtf".dimmed()
    );
    println!("License: MIT");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_batch_summary_adds_up_files() {
        let converter = Html2Rtf::new().offline();
        let mut totals = ConversionStats::new();
        let pages = [
            "<h1>a</h1><p>b</p>",
            "<p><img src=\"gone.png\"></p><table><tr><td>c</td></tr></table>",
        ];
        for html in pages {
            totals.merge(&converter.convert(html).unwrap().stats);
        }

        assert_eq!(totals.heading_count, 1);
        assert_eq!(totals.table_count, 1);
        assert_eq!(
            batch_summary(2, &totals),
            format!(
                "2 file(s): {} paragraph(s), 1 heading(s), 1 table(s), 0 image(s), 0 link(s), 1 missing image(s)",
                totals.paragraph_count
            )
        );
    }

    #[test]
    fn test_output_path_next_to_input() {
        let path = output_path(Path::new("docs/page.html"), None);
        assert_eq!(path, PathBuf::from("docs/page.rtf"));
    }

    #[test]
    fn test_output_path_in_directory() {
        let path = output_path(Path::new("docs/page.html"), Some(Path::new("out")));
        assert_eq!(path, PathBuf::from("out/page.rtf"));
        let path = output_path(Path::new("-"), Some(Path::new("out")));
        assert_eq!(path, PathBuf::from("out/stdin.rtf"));
    }

    #[test]
    fn test_render_args_override_options_file() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("options.json");
        fs::write(&file, r#"{"font-size": 10, "document-protected": false}"#).unwrap();

        let args = RenderArgs {
            options: Some(file),
            protect: true,
            width_mode: Some(TableWidth::MaxByColumn),
            ..Default::default()
        };
        let options = args.render_options().unwrap();

        assert_eq!(options.font_size, 10);
        assert!(options.document_protected);
        assert_eq!(options.width_mode, WidthMode::MaxByColumn);
    }

    #[test]
    fn test_cli_parses_convert() {
        let cli = Cli::parse_from([
            "html2rtf",
            "convert",
            "a.html",
            "b.html",
            "-o",
            "out",
            "--protect",
            "--width-mode",
            "cumulative-total",
        ]);
        match cli.command {
            Some(Commands::Convert {
                inputs,
                output,
                render,
            }) => {
                assert_eq!(inputs.len(), 2);
                assert_eq!(output, Some(PathBuf::from("out")));
                assert!(render.protect);
                assert!(render.width_mode == Some(TableWidth::CumulativeTotal));
            }
            _ => panic!("expected convert"),
        }
    }
}
