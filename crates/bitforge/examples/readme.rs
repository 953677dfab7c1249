//! Builds a one-function module and writes it out as bitcode.
//!
//! The produced `readme.bc` disassembles with `llvm-dis`.

use bitforge::ModuleWriter;
use bitforge_ir::{BinOp, CallConv, Linkage, Module};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let mut module = Module::with_source("readme.ll");
    let i32ty = module.types_mut().int(32);
    let sig = module.types_mut().signature(i32ty, vec![i32ty, i32ty]);

    let mut f = module.define("add", sig, Linkage::External, CallConv::C);
    f.name_arg(0, "a");
    f.name_arg(1, "b");
    f.block(Some("entry"));
    let a = f.arg(0);
    let b = f.arg(1);
    let sum = f.binop(BinOp::Add, a, b)?;
    f.ret(Some(sum))?;
    f.finish();

    let bytes = ModuleWriter::new(module).build()?;
    std::fs::write("readme.bc", &bytes)?;
    println!("wrote readme.bc ({} bytes)", bytes.len());
    Ok(())
}
