use std::io;

use mems_physics::constants::STANDARD_GRAVITY;
use mems_physics::dynamics::half_sine_pulse;
use mems_physics::explorer::{quality_factor_vs_pressure, sweep, Metric, ParameterGrid};
use mems_physics::nonlinear::backbone_curve;
use mems_physics::sensitivity::Parameter;
use mems_physics::simulation::{evaluate, DeviceConfig};
use mems_physics::sweep::{angular_logspace, linspace, logspace};
use mems_physics::transduction::CombDrive;

const REQUEST: &str = r#"{
    "geometry": {
        "w": 4e-6, "L": 2e-4, "t": 2e-6, "h": 2e-6,
        "proofMass": {"length": 2e-4, "width": 2e-4, "thickness": 2e-6}
    },
    "material": "silicon",
    "environment": {"P": 101325, "T": 300},
    "dampingModel": "squeeze",
    "electronicNoiseDensity": 1e-13,
    "biasVoltage": 1.0
}"#;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = DeviceConfig::from_json(REQUEST)?;
    let eval = evaluate(&config)?;
    println!("{}", eval.to_json()?);

    // Q from rough vacuum to one atmosphere.
    println!("\npressure(Pa), damping(N*s/m), Q");
    for p in quality_factor_vs_pressure(&config, &logspace(1.0, 1.0e5, 6)?)? {
        println!("{:.3e}, {:.3e}, {:.3e}", p.pressure, p.damping, p.quality_factor);
    }

    let system = config.system()?;
    let response = system.frequency_response(angular_logspace(1.0e2, 1.0e6, 41)?);
    let db = response.magnitude_db();
    println!(
        "\n-3 dB cutoff: {:.3e} Hz (|H| from {:.1} dB to {:.1} dB over the sweep)",
        system.cutoff_frequency_hz(),
        db[0],
        db[db.len() - 1]
    );

    // 500 g, 0.2 ms half-sine shock.
    let times = linspace(0.0, 1.0e-3, 201);
    let shock = system.forced_response(&times, half_sine_pulse(500.0 * STANDARD_GRAVITY, 0.2e-3))?;
    println!("\npeak shock displacement: {:.3e} m", shock.peak_displacement());

    let material = config.material.properties()?;
    let amplitudes = linspace(0.0, 1.0e-6, 5);
    let curve = backbone_curve(&config.geometry, &material, &amplitudes)?;
    println!("\namplitude(m), f_peak(Hz)");
    for (a, f) in curve.amplitudes.iter().zip(&curve.frequencies_hz) {
        println!("{a:.3e}, {f:.6e}");
    }

    // 40-finger comb drive on the same suspension.
    let comb = CombDrive::new(40, config.geometry.beam_thickness, 2.0e-6, 10.0e-6);
    println!("\ndrive(V), force(N), displacement(m)");
    for v in linspace(0.0, 40.0, 5) {
        let x = comb.displacement(v, eval.mechanics.stiffness)?;
        println!("{v:.1}, {:.3e}, {x:.3e}", comb.force(v));
    }

    // Width × gap design table; narrow gaps pull in at 1 V bias.
    let grid = ParameterGrid::new()
        .axis(Parameter::BeamWidth, linspace(3.0e-6, 6.0e-6, 4))
        .axis(Parameter::Gap, vec![0.5e-6, 1.0e-6, 2.0e-6]);
    let mut metrics = Metric::SUMMARY.to_vec();
    metrics.push(Metric::PullInVoltage);
    metrics.push(Metric::CapacitancePerG);
    metrics.push(Metric::SensitivityPlus(Parameter::BeamWidth));
    let table = sweep(&config, &grid, &metrics)?;
    println!();
    table.write_csv(io::stdout().lock())?;

    let failed = table.failures().count();
    if failed > 0 {
        eprintln!("{failed} grid point(s) failed");
    }
    Ok(())
}
