//! rcbeam example - two-span continuous beam: analysis, design and height search

use anyhow::Result;
use rcbeam::prelude::*;

fn main() -> Result<()> {
    env_logger::init();

    println!("=== rcbeam Example: Two-Span Continuous Beam ===\n");

    // Residential floor beam:
    //
    //   q = 12 kN/m (plus self weight)      P = 20 kN
    //   vvvvvvvvvvvvvvvvvvvvvvvvvvvvvv         v
    //   ================================================
    //   ^               ^                              ^
    //   N0              N1                             N2
    //   |---- 5.0 m ----|------------ 4.0 m -----------|
    //
    let mut model = BeamModel::new("V1 (15x45)");
    let section = CrossSection::rectangular(15.0, 45.0);
    model.add_span(5.0, section, Concrete::c25(), Steel::ca50())?;
    model.add_span(4.0, section, Concrete::c25(), Steel::ca50())?;
    model.set_support(0, Support::Pinned)?;
    model.set_support(1, Support::Pinned)?;
    model.set_support(2, Support::Pinned)?;
    model.add_uniform_load(0, 12.0)?;
    model.add_uniform_load(1, 12.0)?;
    model.add_point_load(0, 20.0, 2.5)?;

    let config = DesignConfig::default();

    println!("Running analysis and design...\n");
    let outcome = rcbeam::analyze(&model, &config)?;
    print!("{}", outcome.summary());

    let diagram = &outcome.solution.diagram;
    println!(
        "\nhogging over the middle support: {:.2} kN·m (service)",
        diagram.support_moment(1)
    );
    let total: f64 = outcome.solution.reactions.iter().map(|r| r.force).sum();
    println!("reaction total: {total:.2} kN");

    // Sweep section heights for the cheapest feasible beam
    println!("\n=== Height Optimization: 30 to 60 cm ===\n");
    let result = rcbeam::optimize(&model, &HeightRange::new(30.0, 60.0, 5.0), &config)?;

    for trial in &result.trials {
        match (trial.feasible, &trial.cost, &trial.worst_violation) {
            (true, Some(cost), _) => {
                println!("  h = {:>5.1} cm  R$ {cost:>8.2}", trial.height_cm);
            }
            (false, _, Some(v)) => {
                println!(
                    "  h = {:>5.1} cm  infeasible: {} at {:.2}x",
                    trial.height_cm, v.check, v.ratio
                );
            }
            _ => {}
        }
    }

    println!(
        "\nbest: h = {:.1} cm at R$ {:.2} \
         ({:.2} m³ concrete, {:.1} kg steel, {:.2} m² formwork)",
        result.best_height_cm,
        result.cost.total,
        result.cost.concrete_m3,
        result.cost.steel_kg,
        result.cost.formwork_m2
    );

    println!("\n=== Done ===");
    Ok(())
}
