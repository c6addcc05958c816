//! Compile command: AST in, optimized quantum IR and a savings report out.

use anyhow::Context;
use console::style;
use std::fs;
use tracing::info;

use skinfaxi_compile::passes::ToffoliDecomposition;
use skinfaxi_compile::{CircuitMetrics, FixpointDriver, Pass, TransformStats};
use skinfaxi_verilog::{lower, parse_ast};

/// Run the full compilation flow.
pub fn execute(
    input: &str,
    output: Option<&str>,
    decompose: bool,
    emit_ast: bool,
    verify: bool,
) -> anyhow::Result<()> {
    let json = fs::read_to_string(input).with_context(|| format!("reading '{input}'"))?;
    let ast = parse_ast(&json).context("decoding the frontend AST")?;
    if emit_ast {
        println!("{ast:#?}");
    }

    let lowered = lower(&ast).context("lowering to quantum IR")?;
    info!(
        ops = lowered.num_ops(),
        qubits = lowered.num_qubits(),
        "lowering complete"
    );

    // Baseline: the unoptimized circuit, decomposed the same way, so the
    // savings compare like with like.
    let basic_metrics = {
        let mut basic = lowered.clone();
        if decompose {
            ToffoliDecomposition.run(&mut basic, &mut TransformStats::default())?;
        }
        CircuitMetrics::collect(&basic)
    };

    let mut module = lowered;
    let mut stats = TransformStats::default();
    let driver = FixpointDriver::new().with_verification(verify);
    driver.run(&mut module, &mut stats)?;
    if decompose {
        driver.decompose_toffoli(&mut module, &mut stats)?;
    }
    let metrics = CircuitMetrics::collect(&module);

    let text = module.to_string();
    match output {
        Some(path) => {
            fs::write(path, &text).with_context(|| format!("writing '{path}'"))?;
            println!("{} wrote IR to {path}", style("ok").green().bold());
        }
        None => print!("{text}"),
    }

    println!();
    println!("{}", style("Transformations").cyan().bold());
    println!("{stats}");
    println!();
    println!("{}", style("Baseline circuit").cyan().bold());
    println!("{basic_metrics}");
    println!();
    println!("{}", style("Optimized circuit").cyan().bold());
    println!("{metrics}");
    println!();
    println!("{}", style("Savings").cyan().bold());
    print_saving("gates", basic_metrics.gate_count, metrics.gate_count);
    print_saving(
        "qubits",
        basic_metrics.total_qubits(),
        metrics.total_qubits(),
    );
    print_saving("depth", basic_metrics.depth, metrics.depth);
    print_saving("T gates", basic_metrics.t_gate_count, metrics.t_gate_count);
    print_saving("T depth", basic_metrics.t_depth, metrics.t_depth);

    Ok(())
}

fn print_saving(label: &str, basic: usize, optimized: usize) {
    if basic == 0 {
        println!("{label}: -");
        return;
    }
    let saving = (basic as f64 - optimized as f64) / basic as f64 * 100.0;
    println!("{label}: {optimized} ({saving:.2}% saved)");
}
