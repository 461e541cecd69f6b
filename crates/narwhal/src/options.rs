use serde::{Deserialize, Serialize};

use crate::algo::{
    Algorithm, AlgorithmKind, CircleOptions, Cooling, DrlOptions, DrlPreset,
    FruchtermanReingoldOptions, GridOptions, KamadaKawaiOptions,
};

/// Layout configuration as supplied by callers.
///
/// Every knob is optional; [`LayoutOptions::algorithm`] turns the set into a fully resolved
/// [`Algorithm`] with the documented defaults filled in. Knobs that do not apply to the chosen
/// algorithm are ignored, as are unknown keys when deserializing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutOptions {
    /// Unknown or missing names select the multilevel layout.
    pub algorithm: AlgorithmKind,
    /// Seed for the randomized initial placement (FR and multilevel).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,

    // Fruchterman-Reingold.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub iterations: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub area: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_temperature: Option<f64>,
    /// Switches FR from linear to geometric cooling with this per-step factor.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cooling_factor: Option<f64>,

    // Circle / grid.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub radius: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub spacing: Option<f64>,

    // Kamada-Kawai. `iterations` doubles as its sweep budget.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub edge_length: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tolerance: Option<f64>,

    // Multilevel.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub preset: Option<DrlPreset>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub edge_cut: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub init_iterations: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub init_temperature: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cool_factor: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub init_attraction: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub init_damping_mult: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub refine_iterations: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub coarsest_size: Option<usize>,
}

impl LayoutOptions {
    pub fn new(algorithm: AlgorithmKind) -> Self {
        Self {
            algorithm,
            ..Default::default()
        }
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_iterations(mut self, iterations: usize) -> Self {
        self.iterations = Some(iterations);
        self
    }

    /// Resolves the configured algorithm and its options.
    pub fn algorithm(&self) -> Algorithm {
        match self.algorithm {
            AlgorithmKind::Circle => Algorithm::Circle(CircleOptions {
                radius: self.radius,
            }),
            AlgorithmKind::Grid => Algorithm::Grid(GridOptions {
                spacing: self.spacing,
            }),
            AlgorithmKind::FruchtermanReingold => {
                let d = FruchtermanReingoldOptions::default();
                Algorithm::FruchtermanReingold(FruchtermanReingoldOptions {
                    iterations: self.iterations.unwrap_or(d.iterations),
                    area: self.area,
                    start_temperature: self.start_temperature,
                    cooling: self
                        .cooling_factor
                        .filter(|f| f.is_finite() && *f > 0.0 && *f < 1.0)
                        .map_or(d.cooling, Cooling::Geometric),
                    seed: self.seed.unwrap_or(d.seed),
                })
            }
            AlgorithmKind::KamadaKawai => {
                let d = KamadaKawaiOptions::default();
                Algorithm::KamadaKawai(KamadaKawaiOptions {
                    max_iterations: self.iterations.unwrap_or(d.max_iterations),
                    tolerance: self
                        .tolerance
                        .filter(|t| t.is_finite() && *t >= 0.0)
                        .unwrap_or(d.tolerance),
                    edge_length: self
                        .edge_length
                        .filter(|l| l.is_finite() && *l > 0.0)
                        .unwrap_or(d.edge_length),
                })
            }
            AlgorithmKind::Drl => {
                let d = DrlOptions::preset(self.preset.unwrap_or_default());
                Algorithm::Drl(DrlOptions {
                    edge_cut: self.edge_cut.unwrap_or(d.edge_cut),
                    init_iterations: self.init_iterations.unwrap_or(d.init_iterations),
                    init_temperature: self.init_temperature.unwrap_or(d.init_temperature),
                    cool_factor: self.cool_factor.unwrap_or(d.cool_factor),
                    init_attraction: self.init_attraction.unwrap_or(d.init_attraction),
                    init_damping_mult: self.init_damping_mult.unwrap_or(d.init_damping_mult),
                    refine_iterations: self.refine_iterations.unwrap_or(d.refine_iterations),
                    coarsest_size: self.coarsest_size.unwrap_or(d.coarsest_size),
                    seed: self.seed.unwrap_or(d.seed),
                    output_scale: d.output_scale,
                })
            }
        }
    }
}
