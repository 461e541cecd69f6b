pub mod circle;
pub mod drl;
pub(crate) mod force;
pub mod fruchterman_reingold;
pub mod grid;
pub mod kamada_kawai;
pub(crate) mod rng;

use serde::{Deserialize, Deserializer, Serialize};

use crate::graph::{Graph, Point};

pub use force::Cooling;

/// Natural distance between neighbouring nodes, shared by every algorithm so their outputs live
/// on a comparable scale. It equals the Fruchterman-Reingold `k` obtained with the default area.
pub const DEFAULT_SPACING: f64 = 10.0;

/// The closed set of layout strategies, each carrying its resolved options.
#[derive(Debug, Clone, PartialEq)]
pub enum Algorithm {
    Circle(CircleOptions),
    Grid(GridOptions),
    FruchtermanReingold(FruchtermanReingoldOptions),
    KamadaKawai(KamadaKawaiOptions),
    /// Multilevel force-directed layout (DrL-style coarsen / lay out / refine).
    Drl(DrlOptions),
}

impl Algorithm {
    pub fn kind(&self) -> AlgorithmKind {
        match self {
            Algorithm::Circle(_) => AlgorithmKind::Circle,
            Algorithm::Grid(_) => AlgorithmKind::Grid,
            Algorithm::FruchtermanReingold(_) => AlgorithmKind::FruchtermanReingold,
            Algorithm::KamadaKawai(_) => AlgorithmKind::KamadaKawai,
            Algorithm::Drl(_) => AlgorithmKind::Drl,
        }
    }

    /// Positions in dense node-index order.
    pub fn run(&self, graph: &Graph) -> Vec<Point> {
        match self {
            Algorithm::Circle(opts) => circle::layout(graph.node_count(), opts),
            Algorithm::Grid(opts) => grid::layout(graph.node_count(), opts),
            Algorithm::FruchtermanReingold(opts) => fruchterman_reingold::layout(graph, opts),
            Algorithm::KamadaKawai(opts) => kamada_kawai::layout(graph, opts),
            Algorithm::Drl(opts) => drl::layout(graph, opts),
        }
    }
}

/// Algorithm tag as it appears in configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AlgorithmKind {
    #[default]
    Drl,
    FruchtermanReingold,
    KamadaKawai,
    Circle,
    Grid,
}

impl AlgorithmKind {
    pub const ALL: [AlgorithmKind; 5] = [
        AlgorithmKind::Drl,
        AlgorithmKind::FruchtermanReingold,
        AlgorithmKind::KamadaKawai,
        AlgorithmKind::Circle,
        AlgorithmKind::Grid,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            AlgorithmKind::Drl => "drl",
            AlgorithmKind::FruchtermanReingold => "fruchterman_reingold",
            AlgorithmKind::KamadaKawai => "kamada_kawai",
            AlgorithmKind::Circle => "circle",
            AlgorithmKind::Grid => "grid",
        }
    }

    /// Parses a canonical name or a short alias (`fr`, `kk`), ignoring case and surrounding
    /// whitespace.
    pub fn parse(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "drl" => Some(AlgorithmKind::Drl),
            "fruchterman_reingold" | "fr" => Some(AlgorithmKind::FruchtermanReingold),
            "kamada_kawai" | "kk" => Some(AlgorithmKind::KamadaKawai),
            "circle" => Some(AlgorithmKind::Circle),
            "grid" => Some(AlgorithmKind::Grid),
            _ => None,
        }
    }

    /// Like [`AlgorithmKind::parse`], but falls back to the multilevel layout for unknown names.
    pub fn parse_or_default(name: &str) -> Self {
        Self::parse(name).unwrap_or_else(|| {
            tracing::warn!(algorithm = name, "unknown layout algorithm, using drl");
            AlgorithmKind::default()
        })
    }
}

impl std::fmt::Display for AlgorithmKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for AlgorithmKind {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or(())
    }
}

impl<'de> Deserialize<'de> for AlgorithmKind {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let name = Option::<String>::deserialize(deserializer)?;
        Ok(name
            .as_deref()
            .map(AlgorithmKind::parse_or_default)
            .unwrap_or_default())
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct CircleOptions {
    /// Defaults to [`circle::default_radius`].
    pub radius: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct GridOptions {
    /// Cell size; defaults to [`DEFAULT_SPACING`].
    pub spacing: Option<f64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FruchtermanReingoldOptions {
    pub iterations: usize,
    /// Layout area; defaults to `node_count * 100`.
    pub area: Option<f64>,
    /// Defaults to a tenth of the side of the layout area.
    pub start_temperature: Option<f64>,
    pub cooling: Cooling,
    pub seed: u64,
}

impl FruchtermanReingoldOptions {
    pub const DEFAULT_ITERATIONS: usize = 500;
}

impl Default for FruchtermanReingoldOptions {
    fn default() -> Self {
        Self {
            iterations: Self::DEFAULT_ITERATIONS,
            area: None,
            start_temperature: None,
            cooling: Cooling::Linear,
            seed: 0,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct KamadaKawaiOptions {
    pub max_iterations: usize,
    /// Stop once a sweep lowers the stress by less than this fraction.
    pub tolerance: f64,
    /// Geometric length of one unit of graph distance.
    pub edge_length: f64,
}

impl KamadaKawaiOptions {
    pub const DEFAULT_MAX_ITERATIONS: usize = 300;
    pub const DEFAULT_TOLERANCE: f64 = 1e-5;
}

impl Default for KamadaKawaiOptions {
    fn default() -> Self {
        Self {
            max_iterations: Self::DEFAULT_MAX_ITERATIONS,
            tolerance: Self::DEFAULT_TOLERANCE,
            edge_length: DEFAULT_SPACING,
        }
    }
}

/// The two observed parameterizations of the multilevel layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DrlPreset {
    /// Attraction 10, unit output scale.
    #[default]
    Standard,
    /// Attraction 30, coordinates multiplied by 100.
    Scaled,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DrlOptions {
    /// Maximum number of neighbours a node considers when picking its matching partner.
    pub edge_cut: usize,
    /// Iterations at the coarsest level.
    pub init_iterations: usize,
    /// Start temperature at the coarsest level, relative to
    /// [`drl::TEMPERATURE_REFERENCE_EXTENT`].
    pub init_temperature: f64,
    /// Per-iteration temperature multiplier.
    pub cool_factor: f64,
    /// Attraction strength; [`drl::NEUTRAL_ATTRACTION`] leaves forces unscaled.
    pub init_attraction: f64,
    /// Scales the displacement clamp.
    pub init_damping_mult: f64,
    /// Iterations at every refinement level.
    pub refine_iterations: usize,
    /// Stop coarsening at or below this many nodes.
    pub coarsest_size: usize,
    pub seed: u64,
    /// Multiplier applied to the final coordinates.
    pub output_scale: f64,
}

impl DrlOptions {
    pub const DEFAULT_EDGE_CUT: usize = 32;
    pub const DEFAULT_INIT_ITERATIONS: usize = 100;
    pub const DEFAULT_INIT_TEMPERATURE: f64 = 2000.0;
    pub const DEFAULT_COOL_FACTOR: f64 = 0.95;
    pub const DEFAULT_INIT_DAMPING_MULT: f64 = 1.0;
    pub const DEFAULT_REFINE_ITERATIONS: usize = 30;
    pub const DEFAULT_COARSEST_SIZE: usize = 32;

    pub fn preset(preset: DrlPreset) -> Self {
        let (init_attraction, output_scale) = match preset {
            DrlPreset::Standard => (10.0, 1.0),
            DrlPreset::Scaled => (30.0, 100.0),
        };
        Self {
            edge_cut: Self::DEFAULT_EDGE_CUT,
            init_iterations: Self::DEFAULT_INIT_ITERATIONS,
            init_temperature: Self::DEFAULT_INIT_TEMPERATURE,
            cool_factor: Self::DEFAULT_COOL_FACTOR,
            init_attraction,
            init_damping_mult: Self::DEFAULT_INIT_DAMPING_MULT,
            refine_iterations: Self::DEFAULT_REFINE_ITERATIONS,
            coarsest_size: Self::DEFAULT_COARSEST_SIZE,
            seed: 0,
            output_scale,
        }
    }
}

impl Default for DrlOptions {
    fn default() -> Self {
        Self::preset(DrlPreset::Standard)
    }
}
