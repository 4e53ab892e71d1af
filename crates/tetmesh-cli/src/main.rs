//! tetmesh CLI - inspect tetrahedral mesh geometries
//!
//! Loads a JSON mesh description, builds the geometry and runs point and
//! ray queries against it.

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use std::fs;
use std::path::{Path, PathBuf};
use tetmesh::{MediumRegistry, Mesh, MeshBuilder, MeshConfig, MeshSpec};
use tetmesh_math::{Point3, Vec3};
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

#[derive(Parser)]
#[command(name = "tetmesh")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Tetrahedral mesh geometry queries", long_about = None)]
struct Cli {
    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct MeshArgs {
    /// JSON mesh description
    mesh: PathBuf,
    /// TOML file with tolerances and octree settings
    #[arg(long)]
    config: Option<PathBuf>,
    /// Multiply node coordinates by this factor
    #[arg(long)]
    scale: Option<f64>,
}

#[derive(Subcommand)]
enum Commands {
    /// Display element, node and boundary statistics
    Info {
        #[command(flatten)]
        mesh: MeshArgs,
    },
    /// Print the region containing a point, or -1 outside the mesh
    Locate {
        #[command(flatten)]
        mesh: MeshArgs,
        #[arg(allow_negative_numbers = true)]
        x: f64,
        #[arg(allow_negative_numbers = true)]
        y: f64,
        #[arg(allow_negative_numbers = true)]
        z: f64,
    },
    /// Print a lower bound on the distance to the nearest boundary
    Hownear {
        #[command(flatten)]
        mesh: MeshArgs,
        #[arg(allow_negative_numbers = true)]
        x: f64,
        #[arg(allow_negative_numbers = true)]
        y: f64,
        #[arg(allow_negative_numbers = true)]
        z: f64,
        /// Region the point is in (-1 for outside); located when omitted
        #[arg(long, allow_negative_numbers = true)]
        region: Option<i64>,
    },
    /// Follow a ray through the mesh, printing each boundary crossing
    Trace {
        #[command(flatten)]
        mesh: MeshArgs,
        /// Start point as x,y,z
        #[arg(long, value_parser = parse_vec3, allow_hyphen_values = true)]
        origin: Vec3,
        /// Direction as u,v,w (normalized before use)
        #[arg(long, value_parser = parse_vec3, allow_hyphen_values = true)]
        direction: Vec3,
        /// Maximum number of steps
        #[arg(long, default_value_t = 1000)]
        max_steps: usize,
        /// Print steps as JSON lines
        #[arg(long)]
        json: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => Level::INFO,
        1 => Level::DEBUG,
        _ => Level::TRACE,
    };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    match cli.command {
        Commands::Info { mesh } => {
            let mesh = load_mesh(&mesh)?;
            println!("{}", mesh);
        }
        Commands::Locate { mesh, x, y, z } => {
            let mesh = load_mesh(&mesh)?;
            println!("{}", region_number(mesh.locate(&Point3::new(x, y, z))));
        }
        Commands::Hownear {
            mesh,
            x,
            y,
            z,
            region,
        } => {
            let mesh = load_mesh(&mesh)?;
            let p = Point3::new(x, y, z);
            let region = match region {
                Some(r) => parse_region(r, &mesh)?,
                None => mesh.locate(&p),
            };
            println!("{}", mesh.hownear(region, &p));
        }
        Commands::Trace {
            mesh,
            origin,
            direction,
            max_steps,
            json,
        } => {
            let mesh = load_mesh(&mesh)?;
            trace(&mesh, origin, direction, max_steps, json)?;
        }
    }

    Ok(())
}

fn load_mesh(args: &MeshArgs) -> Result<Mesh> {
    let config = match &args.config {
        Some(path) => load_config(path)?,
        None => MeshConfig::default(),
    };

    let text = fs::read_to_string(&args.mesh)
        .with_context(|| format!("Failed to read {}", args.mesh.display()))?;
    let mut spec = MeshSpec::from_json(&text)
        .with_context(|| format!("Failed to parse {}", args.mesh.display()))?;
    if let Some(factor) = args.scale {
        spec.scale(factor)?;
    }

    let reporter = |message: &str| info!("{}", message);
    let mut media = MediumRegistry::new();
    let mesh = MeshBuilder::new(spec)
        .config(config)
        .progress(&reporter)
        .build(&mut media)
        .with_context(|| format!("Invalid mesh {}", args.mesh.display()))?;
    Ok(mesh)
}

fn load_config(path: &Path) -> Result<MeshConfig> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let config = MeshConfig::from_toml_str(&text)
        .with_context(|| format!("Invalid configuration {}", path.display()))?;
    Ok(config)
}

fn trace(mesh: &Mesh, origin: Vec3, direction: Vec3, max_steps: usize, json: bool) -> Result<()> {
    let norm = direction.norm();
    if !(norm.is_finite() && norm > 0.0) {
        bail!("Direction must be a non-zero vector");
    }
    let u = direction / norm;
    let mut x = Point3::from(origin);
    let mut region = mesh.locate(&x);
    let mut travelled = 0.0;

    for step_number in 0..max_steps {
        let step = mesh.howfar(region, &x, &u, tetmesh::mesh::VERY_FAR);
        if step.region == region {
            // Nothing ahead within range.
            break;
        }
        x += u * step.distance;
        travelled += step.distance;
        if json {
            let line = serde_json::json!({
                "step": step_number,
                "from": region_number(region),
                "to": region_number(step.region),
                "distance": step.distance,
                "travelled": travelled,
                "position": [x.x, x.y, x.z],
                "medium": step.medium,
            });
            println!("{}", line);
        } else {
            println!(
                "{:>5}  {:>7} -> {:<7}  step {:<14.8e}  total {:<14.8e}  ({:.6}, {:.6}, {:.6})",
                step_number,
                region_number(region),
                region_number(step.region),
                step.distance,
                travelled,
                x.x,
                x.y,
                x.z
            );
        }
        region = step.region;
    }

    Ok(())
}

fn region_number(region: Option<usize>) -> i64 {
    region.map_or(-1, |r| r as i64)
}

fn parse_region(region: i64, mesh: &Mesh) -> Result<Option<usize>> {
    if region < 0 {
        return Ok(None);
    }
    let index = region as usize;
    if index >= mesh.num_elements() {
        bail!(
            "Region {} out of range (mesh has {} elements)",
            region,
            mesh.num_elements()
        );
    }
    Ok(Some(index))
}

fn parse_vec3(s: &str) -> std::result::Result<Vec3, String> {
    let parts: Vec<&str> = s.split(',').map(str::trim).collect();
    if parts.len() != 3 {
        return Err(format!("expected x,y,z but got '{}'", s));
    }
    let mut v = Vec3::zeros();
    for (i, part) in parts.iter().enumerate() {
        v[i] = part
            .parse()
            .map_err(|e| format!("invalid component '{}': {}", part, e))?;
    }
    Ok(v)
}
