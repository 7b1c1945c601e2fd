use std::error::Error;

use bridgestat::{force, point, render_summary, AnchorType, Truss};
use tracing::info;
use tracing_subscriber::EnvFilter;

fn main() -> Result<(), Box<dyn Error>> {
    // Diagnostics go to stderr so that `--json` output stays machine readable.
    // Set `RUST_LOG=debug` to see the outcome of every structural check.
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let json = std::env::args().skip(1).any(|arg| arg == "--json");

    // Place the supports first. A pin resists motion in both directions while
    // a roller sliding along X only pushes back vertically, which together give
    // the three reactions a planar rigid body needs.
    // See: https://en.wikipedia.org/wiki/Structural_support
    let mut truss = Truss::new();
    let pin = truss.add_anchor(point(0.0, 0.0), AnchorType::Pin)?;
    let roller = truss.add_anchor(point(100.0, 0.0), AnchorType::RollerX)?;

    // Close the triangle with a free apex. Three members on three joints with
    // three reactions satisfy 2j = b + r, so the truss is statically determinate.
    // See: https://en.wikipedia.org/wiki/Statically_determinate
    let apex = truss.add_joint(point(50.0, 87.0))?;
    truss.add_beam(pin, roller)?;
    truss.add_beam(roller, apex)?;
    truss.add_beam(apex, pin)?;

    // Hang a single downward load from the apex.
    truss.set_load(apex, force(0.0, -1_000.0))?;

    // Solve the method-of-joints equations and keep the member forces on the
    // truss. Every joint must satisfy the equilibrium conditions of
    // https://en.wikipedia.org/wiki/Truss#Method_of_joints.
    let state = truss.evaluate();
    info!(success = state.success, "analysis finished");

    // Print either the full state as JSON for other tools or a short report
    // for a person reading the terminal.
    if json {
        println!("{}", serde_json::to_string_pretty(&state)?);
    } else {
        println!("{}", render_summary(&state));
    }

    Ok(())
}
