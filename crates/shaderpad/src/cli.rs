use std::path::PathBuf;

use clap::Parser;

#[derive(Parser, Debug)]
#[command(
    name = "shaderpad",
    author,
    version,
    about = "Multi-pane live-coding shader playground",
    arg_required_else_help = false
)]
pub struct Args {
    /// Number of panes in the playground.
    #[arg(long, value_name = "COUNT")]
    pub panes: Option<usize>,

    /// Panes per row before the grid wraps.
    #[arg(long, value_name = "COUNT")]
    pub panes_per_row: Option<usize>,

    /// Logical pane size (e.g. `700x350`).
    #[arg(long, value_name = "WIDTHxHEIGHT", value_parser = parse_pane_size)]
    pub pane_size: Option<(f64, f64)>,

    /// Gap between panes in logical pixels.
    #[arg(long, value_name = "PIXELS")]
    pub gap: Option<f64>,

    /// Optional FPS cap (0 = render every refresh).
    #[arg(long, value_name = "FPS")]
    pub fps: Option<f32>,

    /// Freeze the clock and advance frames only with the space key.
    #[arg(long)]
    pub step: bool,

    /// Configuration file to load instead of the default location.
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Store file holding pane sources across restarts.
    #[arg(long, value_name = "PATH")]
    pub store: Option<PathBuf>,

    /// Directory containing the editable pane source files.
    #[arg(long, value_name = "PATH")]
    pub sources_dir: Option<PathBuf>,
}

pub fn parse() -> Args {
    Args::parse()
}

fn parse_pane_size(value: &str) -> Result<(f64, f64), String> {
    let (width, height) = value
        .split_once(['x', 'X'])
        .ok_or_else(|| format!("expected WIDTHxHEIGHT, got '{value}'"))?;
    let width: f64 = width
        .trim()
        .parse()
        .map_err(|_| format!("invalid width in '{value}'"))?;
    let height: f64 = height
        .trim()
        .parse()
        .map_err(|_| format!("invalid height in '{value}'"))?;
    if width <= 0.0 || height <= 0.0 {
        return Err("pane dimensions must be positive".to_string());
    }
    Ok((width, height))
}
