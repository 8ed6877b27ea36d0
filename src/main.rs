mod args;
mod console_driver;

use std::fs;

use anyhow::{anyhow, bail, Context};
use clap::Parser;
use codespan_reporting::files::SimpleFiles;
use console::style;
use log::info;

use xlat::parse::parse;
use xlat::pipeline::PassManager;
use xlat::target::RegisterInventory;
use xlat_backend::fallback::register_fallbacks;
use xlat_backend::regalloc::{Assignment, RegisterAllocationPass};
use xlat_common::ir::{IrGraph, Prettier};

use args::Arguments;
use console_driver::ConsoleDriver;

fn main() -> anyhow::Result<()> {
    let args = Arguments::parse();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(args.log_level()))
        .init();

    let target = args.target();
    let inventory = RegisterInventory::for_target(&target)
        .ok_or_else(|| anyhow!("cannot generate code for {target}"))?
        .limit(args.gprs, args.fprs)
        .ok_or_else(|| anyhow!("{target} does not have that many registers"))?;

    let path = args.path.display().to_string();
    let src = fs::read_to_string(&args.path).with_context(|| format!("reading {path}"))?;

    let mut files = SimpleFiles::new();
    let file = files.add(path.clone(), src.clone());
    let mut driver = ConsoleDriver::new(files, args.dump_ir);

    let mut ir = match parse(&src, file) {
        Ok(ir) => ir,
        Err(msgs) => {
            let count = msgs.msgs.len();
            driver.report(msgs)?;
            bail!("could not read {path} ({count} errors)");
        }
    };

    let mut manager = PassManager::new();
    manager.add_default_passes();
    manager.add_default_validation_passes();

    if args.validate {
        manager.enable("ir-validation");
    }

    for name in args.enable_pass.iter() {
        if !manager.enable(name) {
            bail!("there is no pass called '{name}'");
        }
    }

    for name in args.disable_pass.iter() {
        if !manager.disable(name, "disabled on the command line") {
            bail!("there is no pass called '{name}'");
        }
    }

    let mut allocator = RegisterAllocationPass::with_register_set(inventory.register_set());
    allocator.set_supports_spills(!args.no_spills);
    manager.insert_register_allocation_pass(allocator);

    info!("translating {path} for {target}");
    manager.run(&mut driver, &mut ir);

    let allocation = manager
        .register_allocation()
        .context("register allocation was not installed")?;

    print_allocation(&ir, allocation, &inventory);
    print_fallbacks(&ir);

    if !allocation.succeeded() {
        bail!("ran out of registers; the block has to be interpreted");
    }

    Ok(())
}

fn print_allocation(ir: &IrGraph, allocation: &RegisterAllocationPass, inventory: &RegisterInventory) {
    let prettier = Prettier::new(ir);

    for (block, nodes) in ir.blocks() {
        println!("{block}:");

        for id in nodes.nodes.iter().copied() {
            let location = match ir.get(id).result().map(|_| allocation.get_node_assignment(id)) {
                None => String::new(),
                Some(Assignment::Register(register)) => {
                    let name = inventory.name(register).unwrap_or("?");
                    style(name).green().to_string()
                }
                Some(Assignment::Spilled(slot)) => style(format!("slot {slot}")).yellow().to_string(),
                Some(Assignment::Unassigned) => style("none").red().to_string(),
            };

            println!("  {:<40} {location}", prettier.pretty_node(id));
        }
    }

    let summary = if allocation.had_full_ra() {
        style(String::from("every value fits in a register")).green()
    } else if allocation.has_spills() {
        style(format!("needed {} spill slots", allocation.spill_slots())).yellow()
    } else {
        style(String::from("allocation failed")).red()
    };

    println!("{summary}");
}

fn print_fallbacks(ir: &IrGraph) {
    let table = register_fallbacks();

    for id in ir.linear() {
        if let Some(info) = table.classify(ir, id) {
            println!("{id} calls {} as {}", style(info.routine).cyan(), info.abi);
        }
    }
}
