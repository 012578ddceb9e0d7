//! Design-space exploration over Cartesian parameter grids.
//!
//! Every grid point runs the full [`evaluate`] pipeline independently.
//! Failures (pull-in, unmanufacturable geometry, ...) are kept in their row so
//! one bad corner never aborts a sweep. With the `parallel` feature the points
//! are spread over the rayon pool; row order is the grid order either way.

use std::borrow::Cow;
use std::io;

#[cfg(feature = "parallel")]
use rayon::prelude::*;
use serde::Serialize;
use tracing::debug;

use crate::damping::quality_factor;
use crate::errors::MemsError;
use crate::math::Scalar;
use crate::sensitivity::Parameter;
use crate::simulation::{evaluate, DeviceConfig, Evaluation};

/// One swept parameter and its sample values.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GridAxis {
    /// Parameter overridden along this axis.
    pub parameter: Parameter,
    /// Values in sweep order.
    pub values: Vec<Scalar>,
}

/// Cartesian product of axes; the last axis varies fastest.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ParameterGrid {
    axes: Vec<GridAxis>,
}

impl ParameterGrid {
    /// Empty grid: a single point, the base configuration.
    #[must_use]
    pub const fn new() -> Self {
        Self { axes: Vec::new() }
    }

    /// Appends an axis.
    #[must_use]
    pub fn axis(mut self, parameter: Parameter, values: impl Into<Vec<Scalar>>) -> Self {
        self.axes.push(GridAxis {
            parameter,
            values: values.into(),
        });
        self
    }

    /// Axes in declaration order.
    #[must_use]
    pub fn axes(&self) -> &[GridAxis] {
        &self.axes
    }

    /// Number of grid points.
    #[must_use]
    pub fn len(&self) -> usize {
        self.axes.iter().map(|a| a.values.len()).product()
    }

    /// True if some axis has no values.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Parameter values of point `index`, one per axis; `None` past the end.
    #[must_use]
    pub fn point(&self, index: usize) -> Option<Vec<Scalar>> {
        if index >= self.len() {
            return None;
        }
        let mut rest = index;
        let mut out = vec![0.0; self.axes.len()];
        for (slot, axis) in out.iter_mut().zip(&self.axes).rev() {
            let n = axis.values.len();
            *slot = axis.values[rest % n];
            rest /= n;
        }
        Some(out)
    }

    fn check(&self, base: &DeviceConfig) -> Result<(), MemsError> {
        for axis in &self.axes {
            if axis.parameter.value(base).is_none() {
                return Err(MemsError::Config(format!(
                    "cannot sweep `{}` on this device",
                    axis.parameter
                )));
            }
            if let Some(bad) = axis.values.iter().find(|v| !v.is_finite()) {
                return Err(MemsError::input(
                    axis.parameter.name(),
                    *bad,
                    "grid values must be finite",
                ));
            }
        }
        Ok(())
    }
}

/// Derived quantity recorded per grid point.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Metric {
    /// Effective mass, kg.
    Mass,
    /// Stiffness, N/m.
    Stiffness,
    /// f₀, Hz.
    NaturalFrequency,
    /// Q.
    QualityFactor,
    /// Resonator bandwidth f₀/Q, Hz.
    Bandwidth,
    /// Damping coefficient, N·s/m.
    DampingCoefficient,
    /// Thermal RMS displacement, m.
    ThermalNoise,
    /// Total RMS displacement noise, m.
    TotalNoise,
    /// Minimum detectable acceleration, m/s².
    MinDetectableAcceleration,
    /// Pull-in voltage, V.
    PullInVoltage,
    /// Cubic stiffness, N/m³.
    CubicStiffness,
    /// Differential capacitance change per g, F/g.
    CapacitancePerG,
    /// f₀ shift in percent for `+tolerance` on a parameter.
    SensitivityPlus(Parameter),
    /// f₀ shift in percent for `−tolerance` on a parameter.
    SensitivityMinus(Parameter),
}

impl Metric {
    /// The columns of the standard design report.
    pub const SUMMARY: [Self; 6] = [
        Self::Mass,
        Self::Stiffness,
        Self::NaturalFrequency,
        Self::QualityFactor,
        Self::Bandwidth,
        Self::ThermalNoise,
    ];

    /// Column header.
    #[must_use]
    pub fn name(self) -> Cow<'static, str> {
        match self {
            Self::Mass => "m".into(),
            Self::Stiffness => "k".into(),
            Self::NaturalFrequency => "f0_hz".into(),
            Self::QualityFactor => "Q".into(),
            Self::Bandwidth => "bandwidth_hz".into(),
            Self::DampingCoefficient => "damping".into(),
            Self::ThermalNoise => "thermal_noise".into(),
            Self::TotalNoise => "total_noise".into(),
            Self::MinDetectableAcceleration => "min_detectable_accel".into(),
            Self::PullInVoltage => "pull_in_voltage".into(),
            Self::CubicStiffness => "cubic_stiffness".into(),
            Self::CapacitancePerG => "capacitance_per_g".into(),
            Self::SensitivityPlus(p) => format!("sens_plus_{p}").into(),
            Self::SensitivityMinus(p) => format!("sens_minus_{p}").into(),
        }
    }

    /// Extracts the metric; `None` for a sensitivity entry that does not apply.
    #[must_use]
    pub fn value(self, eval: &Evaluation) -> Option<Scalar> {
        match self {
            Self::Mass => Some(eval.mechanics.mass),
            Self::Stiffness => Some(eval.mechanics.stiffness),
            Self::NaturalFrequency => Some(eval.natural_frequency_hz),
            Self::QualityFactor => Some(eval.quality_factor),
            Self::Bandwidth => Some(eval.bandwidth_hz),
            Self::DampingCoefficient => Some(eval.damping_coefficient),
            Self::ThermalNoise => Some(eval.noise.thermal_displacement),
            Self::TotalNoise => Some(eval.noise.total_displacement),
            Self::MinDetectableAcceleration => Some(eval.noise.min_detectable_acceleration),
            Self::PullInVoltage => Some(eval.pull_in_voltage),
            Self::CubicStiffness => Some(eval.cubic_stiffness),
            Self::CapacitancePerG => Some(eval.readout.capacitance_per_g),
            Self::SensitivityPlus(p) => eval.sensitivity.get(p).map(|s| s.plus_percent),
            Self::SensitivityMinus(p) => eval.sensitivity.get(p).map(|s| s.minus_percent),
        }
    }
}

/// One grid point and its outcome.
#[derive(Debug, Clone, PartialEq)]
pub struct DesignRow {
    /// Swept parameter values, in axis order.
    pub parameters: Vec<Scalar>,
    /// Metric values in metric order, or the error that stopped this point.
    pub outcome: Result<Vec<Option<Scalar>>, MemsError>,
}

/// Flat table of (parameters → metrics) for a sweep.
#[derive(Debug, Clone, PartialEq)]
pub struct DesignTable {
    /// Swept parameters, one column each.
    pub parameters: Vec<Parameter>,
    /// Metric columns.
    pub metrics: Vec<Metric>,
    /// Rows in grid order.
    pub rows: Vec<DesignRow>,
}

impl DesignTable {
    /// Number of rows.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// True if the sweep produced no rows.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Rows whose evaluation failed.
    pub fn failures(&self) -> impl Iterator<Item = &DesignRow> {
        self.rows.iter().filter(|r| r.outcome.is_err())
    }

    /// Column index of `metric`, if recorded.
    #[must_use]
    pub fn metric_index(&self, metric: Metric) -> Option<usize> {
        self.metrics.iter().position(|m| *m == metric)
    }

    /// Values of one metric down the table; failed rows yield `None`.
    #[must_use]
    pub fn column(&self, metric: Metric) -> Option<Vec<Option<Scalar>>> {
        let idx = self.metric_index(metric)?;
        Some(
            self.rows
                .iter()
                .map(|r| r.outcome.as_ref().ok().and_then(|v| v[idx]))
                .collect(),
        )
    }

    /// Header row: parameter names, metric names, then `error`.
    #[must_use]
    pub fn headers(&self) -> Vec<String> {
        self.parameters
            .iter()
            .map(|p| p.name().to_owned())
            .chain(self.metrics.iter().map(|m| m.name().into_owned()))
            .chain(std::iter::once("error".to_owned()))
            .collect()
    }

    /// Writes the table as CSV. Missing values are empty cells; the `error`
    /// column carries the error kind of failed rows.
    pub fn write_csv<W: io::Write>(&self, writer: W) -> Result<(), csv::Error> {
        let mut wtr = csv::WriterBuilder::new().has_headers(false).from_writer(writer);
        wtr.write_record(self.headers())?;

        let blank_metrics = vec![String::new(); self.metrics.len()];
        for row in &self.rows {
            let mut record: Vec<String> = row.parameters.iter().map(|v| format!("{v:e}")).collect();
            match &row.outcome {
                Ok(values) => {
                    record.extend(
                        values
                            .iter()
                            .map(|v| v.map_or_else(String::new, |x| format!("{x:e}"))),
                    );
                    record.push(String::new());
                }
                Err(err) => {
                    record.extend(blank_metrics.iter().cloned());
                    record.push(err.kind().to_owned());
                }
            }
            wtr.write_record(&record)?;
        }
        wtr.flush()?;
        Ok(())
    }
}

fn evaluate_point(
    base: &DeviceConfig,
    grid: &ParameterGrid,
    metrics: &[Metric],
    index: usize,
    parameters: Vec<Scalar>,
) -> DesignRow {
    let outcome = grid
        .axes()
        .iter()
        .zip(&parameters)
        .try_fold(base.clone(), |cfg, (axis, &v)| axis.parameter.with_value(&cfg, v))
        .and_then(|cfg| evaluate(&cfg))
        .map(|eval| metrics.iter().map(|m| m.value(&eval)).collect());
    if let Err(err) = &outcome {
        debug!(index, kind = err.kind(), %err, "grid point failed");
    }
    DesignRow {
        parameters,
        outcome,
    }
}

/// Evaluates `base` at every point of `grid` and tabulates `metrics`.
///
/// Fails only when the grid itself is unusable for `base`; per-point failures
/// are recorded in their rows.
pub fn sweep(
    base: &DeviceConfig,
    grid: &ParameterGrid,
    metrics: &[Metric],
) -> Result<DesignTable, MemsError> {
    grid.check(base)?;
    let n = grid.len();
    debug!(points = n, metrics = metrics.len(), "design sweep started");

    #[cfg(feature = "parallel")]
    let rows: Vec<DesignRow> = (0..n)
        .into_par_iter()
        .filter_map(|i| grid.point(i).map(|p| evaluate_point(base, grid, metrics, i, p)))
        .collect();
    #[cfg(not(feature = "parallel"))]
    let rows: Vec<DesignRow> = (0..n)
        .filter_map(|i| grid.point(i).map(|p| evaluate_point(base, grid, metrics, i, p)))
        .collect();

    let table = DesignTable {
        parameters: grid.axes().iter().map(|a| a.parameter).collect(),
        metrics: metrics.to_vec(),
        rows,
    };
    debug!(
        points = n,
        failures = table.failures().count(),
        "design sweep finished"
    );
    Ok(table)
}

/// Damping and quality factor at one pressure.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PressurePoint {
    /// Pressure in Pa.
    pub pressure: Scalar,
    /// Damping coefficient in N·s/m.
    pub damping: Scalar,
    /// Q; infinite in vacuum.
    pub quality_factor: Scalar,
}

/// Quality factor of `base` across `pressures`, mechanics resolved once.
pub fn quality_factor_vs_pressure(
    base: &DeviceConfig,
    pressures: &[Scalar],
) -> Result<Vec<PressurePoint>, MemsError> {
    let mechanics = base.mechanics()?;
    pressures
        .iter()
        .map(|&pressure| {
            let mut cfg = base.clone();
            cfg.environment.pressure = pressure;
            let damping = cfg.damping_coefficient(&mechanics)?;
            Ok(PressurePoint {
                pressure,
                damping,
                quality_factor: quality_factor(&mechanics, damping),
            })
        })
        .collect()
}
