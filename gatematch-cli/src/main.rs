use clap::Parser;
use gatematch::image::io::load_gray_image;
use gatematch::{
    BoundingBox, GateTemplate, GridSet, ImagePyramid, InMemoryLogicModel, IrregularGrid,
    LayerId, LayerKind, MatchConfig, Matcher, NoProgress, Orientation, RegularGrid,
    SearchStrategy, TemplateId,
};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

const SCHEMA_JSON: &str = include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/config.schema.json"));
const EXAMPLE_JSON: &str =
    include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/config.example.json"));

#[derive(Parser, Debug)]
#[command(author, version, about = "GateMatch CLI (JSON config driven)")]
struct Cli {
    /// Path to the JSON configuration file.
    #[arg(short, long, value_name = "FILE", default_value = "config.json")]
    config: PathBuf,
    /// Print the JSON schema and exit.
    #[arg(long)]
    print_schema: bool,
    /// Print an example config and exit.
    #[arg(long)]
    print_example: bool,
    /// Enable tracing output for performance profiling.
    #[arg(long)]
    trace: bool,
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(rename_all = "snake_case")]
enum LayerConfig {
    Transistor,
    Logic,
    Metal,
}

impl From<LayerConfig> for LayerKind {
    fn from(value: LayerConfig) -> Self {
        match value {
            LayerConfig::Transistor => LayerKind::Transistor,
            LayerConfig::Logic => LayerKind::Logic,
            LayerConfig::Metal => LayerKind::Metal,
        }
    }
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(rename_all = "snake_case")]
enum OrientationConfig {
    Normal,
    FlipUpDown,
    FlipLeftRight,
    FlipBoth,
}

impl From<OrientationConfig> for Orientation {
    fn from(value: OrientationConfig) -> Self {
        match value {
            OrientationConfig::Normal => Orientation::Normal,
            OrientationConfig::FlipUpDown => Orientation::FlipUpDown,
            OrientationConfig::FlipLeftRight => Orientation::FlipLeftRight,
            OrientationConfig::FlipBoth => Orientation::FlipBoth,
        }
    }
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(rename_all = "snake_case")]
enum ModeConfig {
    Normal,
    InRows,
    InCols,
}

impl From<ModeConfig> for SearchStrategy {
    fn from(value: ModeConfig) -> Self {
        match value {
            ModeConfig::Normal => SearchStrategy::Normal,
            ModeConfig::InRows => SearchStrategy::InRows,
            ModeConfig::InCols => SearchStrategy::InCols,
        }
    }
}

#[derive(Debug, Deserialize)]
struct TemplateConfig {
    id: u32,
    name: String,
    path: String,
}

#[derive(Debug, Deserialize)]
struct AreaConfig {
    min_x: usize,
    max_x: usize,
    min_y: usize,
    max_y: usize,
}

#[derive(Debug, Deserialize)]
struct RegularGridConfig {
    min: usize,
    max: usize,
    distance: usize,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct GridConfig {
    regular: Option<RegularGridConfig>,
    irregular: Option<Vec<usize>>,
}

impl GridConfig {
    fn build(&self) -> gatematch::GateMatchResult<GridSet> {
        let regular = match &self.regular {
            Some(grid) => Some(RegularGrid::new(grid.min, grid.max, grid.distance)?),
            None => None,
        };
        let irregular = self
            .irregular
            .as_ref()
            .map(|offsets| IrregularGrid::new(offsets.iter().copied()));
        Ok(GridSet { regular, irregular })
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
struct MatchConfigJson {
    threshold_hc: f64,
    threshold_detection: f64,
    max_step_size: usize,
    scale_down: usize,
}

impl Default for MatchConfigJson {
    fn default() -> Self {
        let cfg = MatchConfig::default();
        Self {
            threshold_hc: cfg.threshold_hc,
            threshold_detection: cfg.threshold_detection,
            max_step_size: cfg.max_step_size,
            scale_down: cfg.scale_down,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
struct Config {
    image_path: String,
    templates: Vec<TemplateConfig>,
    matching_layer: LayerConfig,
    insertion_layer: usize,
    area: Option<AreaConfig>,
    pyramid_levels: usize,
    orientations: Vec<OrientationConfig>,
    mode: ModeConfig,
    row_grid: GridConfig,
    column_grid: GridConfig,
    #[serde(rename = "match")]
    match_cfg: MatchConfigJson,
    output_path: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            image_path: String::new(),
            templates: Vec::new(),
            matching_layer: LayerConfig::Logic,
            insertion_layer: 0,
            area: None,
            pyramid_levels: 4,
            orientations: vec![OrientationConfig::Normal],
            mode: ModeConfig::Normal,
            row_grid: GridConfig::default(),
            column_grid: GridConfig::default(),
            match_cfg: MatchConfigJson::default(),
            output_path: None,
        }
    }
}

#[derive(Debug, Serialize)]
struct GateRecord {
    id: u64,
    template: String,
    orientation: &'static str,
    x: usize,
    y: usize,
    width: usize,
    height: usize,
    description: String,
}

#[derive(Debug, Serialize)]
struct Output {
    matches: usize,
    rejected: usize,
    gates: Vec<GateRecord>,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    if cli.trace {
        tracing_subscriber::fmt()
            .with_env_filter(EnvFilter::from_default_env().add_directive("gatematch=info".parse()?))
            .with_target(false)
            .init();
    }

    if cli.print_schema {
        println!("{SCHEMA_JSON}");
        return Ok(());
    }
    if cli.print_example {
        println!("{EXAMPLE_JSON}");
        return Ok(());
    }

    let config_text = fs::read_to_string(&cli.config)?;
    let config: Config = serde_json::from_str(&config_text)?;
    if config.image_path.is_empty() || config.templates.is_empty() {
        return Err("image_path and at least one template must be set in the config".into());
    }
    if config.pyramid_levels == 0 {
        return Err("pyramid_levels must be at least 1".into());
    }

    let layer: LayerKind = config.matching_layer.into();
    let image = load_gray_image(&config.image_path)?;
    let pyramid = ImagePyramid::build_u8(image.view(), config.pyramid_levels)?;

    let mut templates = Vec::with_capacity(config.templates.len());
    for entry in &config.templates {
        let img = load_gray_image(&entry.path)?;
        let name = entry.name.clone();
        templates.push(GateTemplate::new(TemplateId(entry.id), name, [(layer, img)])?);
    }
    let names: Vec<(TemplateId, String)> = templates
        .iter()
        .map(|tpl| (tpl.id(), tpl.name().to_string()))
        .collect();

    let mut matcher = Matcher::new()
        .with_config(MatchConfig {
            threshold_hc: config.match_cfg.threshold_hc,
            threshold_detection: config.match_cfg.threshold_detection,
            max_step_size: config.match_cfg.max_step_size,
            scale_down: config.match_cfg.scale_down,
        })
        .with_templates(templates)
        .with_orientations(config.orientations.iter().map(|&o| o.into()).collect())
        .with_layers(layer, LayerId(config.insertion_layer))
        .with_mode(config.mode.into())
        .with_row_grids(config.row_grid.build()?)
        .with_column_grids(config.column_grid.build()?);
    if let Some(area) = &config.area {
        matcher = matcher.with_search_area(BoundingBox::new(
            area.min_x, area.max_x, area.min_y, area.max_y,
        )?);
    }

    let mut model = InMemoryLogicModel::new();
    let summary = matcher.run(&pyramid, &mut model, &NoProgress)?;

    let gates = model
        .gates()
        .iter()
        .map(|placed| {
            let template = names
                .iter()
                .find(|(id, _)| *id == placed.gate.template_id)
                .map(|(_, name)| name.clone())
                .unwrap_or_default();
            GateRecord {
                id: placed.id.0,
                template,
                orientation: placed.gate.orientation.name(),
                x: placed.gate.bbox.min_x(),
                y: placed.gate.bbox.min_y(),
                width: placed.gate.bbox.width(),
                height: placed.gate.bbox.height(),
                description: placed.gate.description.clone(),
            }
        })
        .collect();
    let output = Output {
        matches: summary.matches.len(),
        rejected: summary.rejected,
        gates,
    };
    let json = serde_json::to_string_pretty(&output)?;

    match config.output_path {
        Some(path) => fs::write(path, json)?,
        None => println!("{json}"),
    }

    Ok(())
}
