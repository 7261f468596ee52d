//! asm2urdf command line entry point

use std::path::PathBuf;
use std::process::ExitCode;

use asm2urdf_core::{ExportError, ExportOptions, Scene, StlMeshExporter, export_package, prepare};
use clap::Parser;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Assembly snapshot to export (.ron or .json)
    scene: PathBuf,

    /// Directory the package is written into
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Robot name (defaults to the first word of the assembly name)
    #[arg(long)]
    robot_name: Option<String>,

    /// RON file with export options; flags override it
    #[arg(long)]
    config: Option<PathBuf>,

    /// Fail when more than one occurrence claims base_link
    #[arg(long, default_value_t = false)]
    strict_base_link: bool,

    /// Package files copied over the generated package
    #[arg(long)]
    template_dir: Option<PathBuf>,

    /// Print the joint and inertial dictionaries as JSON, write nothing
    #[arg(long, default_value_t = false)]
    dry_run: bool,
}

impl Cli {
    fn options(&self) -> Result<ExportOptions, ExportError> {
        let mut options = match &self.config {
            Some(path) => ExportOptions::load(path)?,
            None => ExportOptions::default(),
        };
        if let Some(output) = &self.output {
            options.output_dir = output.clone();
        }
        if let Some(name) = &self.robot_name {
            options.robot_name = Some(name.clone());
        }
        if let Some(dir) = &self.template_dir {
            options.template_dir = Some(dir.clone());
        }
        options.strict_base_link |= self.strict_base_link;
        Ok(options)
    }
}

fn run(cli: &Cli) -> Result<(), String> {
    let options = cli.options().map_err(|e| e.to_string())?;
    let scene = Scene::load(&cli.scene).map_err(|e| e.to_string())?;
    tracing::info!(
        "Loaded {}: {} occurrences, {} joints",
        scene.name,
        scene.occurrences.len(),
        scene.joints.len()
    );

    if cli.dry_run {
        let plan = prepare(&scene, &options).map_err(|e| e.to_string())?;
        let dump = serde_json::json!({
            "robot": plan.robot_name,
            "package": plan.package_name,
            "joints": plan.joints,
            "inertials": plan.inertials,
            "meshes": plan.link_meshes,
        });
        let text = serde_json::to_string_pretty(&dump).map_err(|e| e.to_string())?;
        println!("{text}");
        return Ok(());
    }

    let mut exporter = StlMeshExporter::default();
    let report = export_package(&scene, &options, &mut exporter).map_err(|e| e.to_string())?;

    for warning in &report.warnings {
        tracing::warn!("{}", warning);
    }
    tracing::info!(
        "Wrote {} ({} links, {} joints, {} meshes)",
        report.package_dir.display(),
        report.links,
        report.joints,
        report.meshes_exported.len()
    );
    Ok(())
}

fn main() -> ExitCode {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "asm2urdf=info,asm2urdf_core=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();
    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(message) => {
            tracing::error!("{}", message);
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flags_override_defaults() {
        let cli = Cli::parse_from([
            "asm2urdf",
            "scene.ron",
            "-o",
            "out",
            "--robot-name",
            "rover",
            "--strict-base-link",
        ]);
        let options = cli.options().unwrap();
        assert_eq!(options.output_dir, PathBuf::from("out"));
        assert_eq!(options.robot_name.as_deref(), Some("rover"));
        assert!(options.strict_base_link);
        assert_eq!(options.mesh_dir, "meshes");
    }

    #[test]
    fn test_missing_config_is_an_error() {
        let cli = Cli::parse_from(["asm2urdf", "scene.ron", "--config", "/nonexistent/opts.ron"]);
        assert!(matches!(cli.options(), Err(ExportError::Io(_))));
    }
}
