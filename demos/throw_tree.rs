//! Prints the call graph and throw trees of the sample program.

use anyhow::Result;
use raise_this::scenario::sample_index;

fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let index = sample_index()?;

    println!("Call graph:");
    print!("{}", index.call_graph_report());

    println!();
    println!("Throw trees:");
    print!("{}", index.throw_tree_report());

    for thrower in index.throwers() {
        let tree = index.throw_tree(thrower);
        println!();
        print!("{}", tree);
    }
    Ok(())
}
