// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Katana CLI

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use katana::app::{ApplicationState, FrameReport, InputEvent};
use katana::geometry::{analyze, MeshStats};
use katana::scene::{AssetLibrary, DrawRecorder};
use katana::{cut_asset, export_stl, telemetry, Fragment, KatanaConfig};
use nalgebra::{Point2, Point3};
use serde::Serialize;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "katana")]
#[command(about = "Katana - interactive mesh slicing engine", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Raise log verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
    /// Cut a library asset with a world-space segment
    Cut {
        /// Asset name or STL path
        #[arg(short, long, default_value = "cube")]
        asset: String,

        /// Segment start as x,y,z
        #[arg(long, value_parser = parse_point, allow_hyphen_values = true)]
        start: Point3<f32>,

        /// Segment end as x,y,z
        #[arg(long, value_parser = parse_point, allow_hyphen_values = true)]
        end: Point3<f32>,

        /// Print the result as JSON
        #[arg(long)]
        json: bool,

        /// Write both fragments as STL into this directory
        #[arg(long)]
        export_dir: Option<PathBuf>,
    },

    /// Run the application loop headless
    Simulate {
        /// Number of frames to run
        #[arg(short, long, default_value = "600")]
        frames: usize,

        /// Frame duration in seconds
        #[arg(long, default_value = "0.016666668")]
        dt: f32,

        /// Scripted swipe in NDC as x0,y0,x1,y1@frame (repeatable)
        #[arg(short, long, value_parser = parse_gesture, allow_hyphen_values = true)]
        gesture: Vec<Gesture>,

        /// TOML configuration file
        #[arg(short, long)]
        config: Option<PathBuf>,
    },

    /// Print or write the default configuration
    Config {
        /// Output file
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[derive(Debug, Clone, Copy)]
struct Gesture {
    start: Point2<f32>,
    end: Point2<f32>,
    frame: usize,
}

fn parse_floats(s: &str, count: usize) -> Result<Vec<f32>, String> {
    let values = s
        .split(',')
        .map(|v| v.trim().parse::<f32>().map_err(|e| format!("{:?}: {}", v, e)))
        .collect::<Result<Vec<_>, _>>()?;
    if values.len() != count {
        return Err(format!("expected {} comma-separated numbers, got {}", count, values.len()));
    }
    Ok(values)
}

fn parse_point(s: &str) -> Result<Point3<f32>, String> {
    let v = parse_floats(s, 3)?;
    Ok(Point3::new(v[0], v[1], v[2]))
}

fn parse_gesture(s: &str) -> Result<Gesture, String> {
    let (coords, frame) = s
        .split_once('@')
        .ok_or_else(|| format!("missing @frame in {:?}", s))?;
    let v = parse_floats(coords, 4)?;
    let frame = frame
        .trim()
        .parse()
        .map_err(|e| format!("bad frame {:?}: {}", frame, e))?;
    Ok(Gesture {
        start: Point2::new(v[0], v[1]),
        end: Point2::new(v[2], v[3]),
        frame,
    })
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    telemetry::init_tracing(cli.verbose);

    match cli.command {
        Commands::Cut {
            asset,
            start,
            end,
            json,
            export_dir,
        } => cut_command(&asset, &start, &end, json, export_dir.as_deref()),
        Commands::Simulate {
            frames,
            dt,
            gesture,
            config,
        } => simulate_command(frames, dt, &gesture, config.as_deref()),
        Commands::Config { output } => config_command(output.as_deref()),
    }
}

#[derive(Serialize)]
struct FragmentSummary {
    weight: f32,
    surface_area: f32,
    cap_area: f32,
    cap_triangles: usize,
    hull_points: usize,
    centroid_world: [f32; 3],
    stats: MeshStats,
}

impl FragmentSummary {
    fn new(fragment: &Fragment) -> Self {
        let c = fragment.centroid_world;
        Self {
            weight: fragment.weight,
            surface_area: fragment.surface_area,
            cap_area: fragment.cap_area,
            cap_triangles: fragment.cap_triangles,
            hull_points: fragment.hull.len(),
            centroid_world: [c.x, c.y, c.z],
            stats: analyze(&fragment.mesh),
        }
    }
}

#[derive(Serialize)]
struct CutSummary {
    asset: String,
    split_triangles: usize,
    normal_world: [f32; 3],
    positive: FragmentSummary,
    negative: FragmentSummary,
}

fn cut_command(
    asset: &str,
    start: &Point3<f32>,
    end: &Point3<f32>,
    json: bool,
    export_dir: Option<&Path>,
) -> Result<()> {
    let begin = std::time::Instant::now();
    let outcome =
        cut_asset(asset, start, end).with_context(|| format!("Failed to cut asset {}", asset))?;
    let elapsed = begin.elapsed();

    let n = outcome.normal_world;
    let summary = CutSummary {
        asset: asset.to_string(),
        split_triangles: outcome.split_triangles,
        normal_world: [n.x, n.y, n.z],
        positive: FragmentSummary::new(&outcome.positive),
        negative: FragmentSummary::new(&outcome.negative),
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        println!("\n{}", "═".repeat(60).bright_black());
        println!("{} {}", "Cut".bold(), asset.cyan());
        println!("{}", "═".repeat(60).bright_black());
        println!("  {} {:.2?}", "Time:".bright_black(), elapsed);
        println!(
            "  {} {}",
            "Split triangles:".bright_black(),
            summary.split_triangles.to_string().yellow()
        );
        println!(
            "  {} ({:.3}, {:.3}, {:.3})",
            "Normal:".bright_black(),
            n.x,
            n.y,
            n.z
        );
        if !outcome.is_split() {
            println!("  {}", "Plane does not split the mesh".yellow());
        }
        for (label, fragment) in [("positive", &summary.positive), ("negative", &summary.negative)] {
            println!(
                "  {} weight {:.3}, cap {} triangles, hull {} points",
                label.green(),
                fragment.weight,
                fragment.cap_triangles,
                fragment.hull_points
            );
            fragment.stats.print(label);
        }
    }

    if let Some(dir) = export_dir {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create {}", dir.display()))?;
        for (label, fragment) in [("positive", &outcome.positive), ("negative", &outcome.negative)] {
            if fragment.is_empty() {
                continue;
            }
            let path = dir.join(format!("{}_{}.stl", asset_stem(asset), label));
            export_stl(&fragment.mesh, &path)?;
            if !json {
                println!("  {} {}", "Wrote".bright_black(), path.display().to_string().cyan());
            }
        }
    }

    Ok(())
}

fn asset_stem(asset: &str) -> &str {
    Path::new(asset)
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("mesh")
}

#[derive(Default)]
struct RunTotals {
    spawned: usize,
    steps: u64,
    removed: usize,
    gestures: usize,
    bodies_cut: usize,
    peak_live: usize,
}

impl RunTotals {
    fn add(&mut self, report: &FrameReport) {
        self.spawned += usize::from(report.spawned.is_some());
        self.steps += u64::from(report.steps);
        self.removed += report.removed;
        if let Some(cut) = &report.cut {
            self.gestures += 1;
            self.bodies_cut += cut.cut;
        }
        self.peak_live = self.peak_live.max(report.live);
    }
}

fn simulate_command(frames: usize, dt: f32, gestures: &[Gesture], config: Option<&Path>) -> Result<()> {
    if dt.is_nan() || dt <= 0.0 {
        bail!("--dt must be positive, got {}", dt);
    }
    let config = match config {
        Some(path) => KatanaConfig::from_file(path)?,
        None => KatanaConfig::load()?,
    };

    let mut app = ApplicationState::new(config, Box::new(AssetLibrary::default()));
    let mut recorder = DrawRecorder::new();
    let mut totals = RunTotals::default();

    let pb = ProgressBar::new(frames as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")?
            .progress_chars("#>-"),
    );

    let begin = std::time::Instant::now();
    for frame in 0..frames {
        for gesture in gestures.iter().filter(|g| g.frame == frame) {
            app.handle_event(InputEvent::Press(gesture.start));
            app.handle_event(InputEvent::Move(gesture.end));
            app.handle_event(InputEvent::Release(gesture.end));
        }

        let report = app.frame(dt, &mut recorder)?;
        totals.add(&report);
        pb.set_message(format!("{} live", report.live));
        pb.inc(1);

        if app.should_quit() {
            break;
        }
    }
    pb.finish_with_message("done");
    let elapsed = begin.elapsed();

    println!("\n{}", "═".repeat(60).bright_black());
    println!("{}", "Simulation Summary".bold());
    println!("{}", "═".repeat(60).bright_black());
    println!("  {} {} in {:.2?}", "Frames:".bright_black(), recorder.frames.to_string().cyan(), elapsed);
    println!("  {} {}", "Physics steps:".bright_black(), totals.steps.to_string().cyan());
    println!("  {} {}", "Spawned:".bright_black(), totals.spawned.to_string().green());
    println!(
        "  {} {} ({} bodies cut)",
        "Gestures:".bright_black(),
        totals.gestures.to_string().yellow(),
        totals.bodies_cut.to_string().yellow()
    );
    println!("  {} {}", "Removed:".bright_black(), totals.removed.to_string().red());
    println!("  {} {}", "Peak live:".bright_black(), totals.peak_live.to_string().cyan());
    println!(
        "  {} {} ({} triangles)",
        "Last frame draws:".bright_black(),
        recorder.mesh_calls(),
        recorder.triangles_drawn()
    );
    println!("{}", "═".repeat(60).bright_black());

    Ok(())
}

fn config_command(output: Option<&Path>) -> Result<()> {
    let config = KatanaConfig::default();
    match output {
        Some(path) => {
            config.save(path)?;
            println!("{} {}", "Wrote".green(), path.display());
        }
        None => print!("{}", config.to_toml_string()?),
    }
    Ok(())
}
