use bitforge_ir::{
    Attribute, BinOp, CallConv, IcmpPred, Linkage, Module, TailKind,
};
use bitforge_stream::{BitStream, BlockInfo};

use crate::blocks::{ConstantBlock, FunctionBlock, MetadataBlock, TypeBlock};
use crate::{Enumerator, Error, ModuleWriter};

fn hex(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}

fn contains(haystack: &[u8], needle: &[u8]) -> bool {
    haystack.windows(needle.len()).any(|w| w == needle)
}

#[test]
fn minimal_module_round_trips_to_known_bytes() {
    let mut module = Module::with_source("t.ll");
    let void = module.types_mut().void();
    let sig = module.types_mut().signature(void, vec![]);

    let mut f = module.define("main", sig, Linkage::External, CallConv::C);
    f.block(Some("entry"));
    f.ret(None).unwrap();
    f.finish();

    let bytes = ModuleWriter::new(module).build().unwrap();
    assert_eq!(
        hex(&bytes),
        "4243c0de210c0000360000000b022100020000001c00000007c1a218404691\
         8090a180e180e381113a0818c50032860a8a0a84141708492e102244c8f041\
         72801019219202840809914c2044488c25052132342458b21022444382e58a\
         043246c851831021c90d4284081d048e640021434901428607c1233942868c\
         3a0a9021e4386064000000001a214c10093a1736b6441000030000001304c2\
         08c0540200000000009a2102213264a8481042864600110102040810204000\
         090520020000200c0600060000004450040e0300000002000000052888668a\
         30000000000000000000005d0c000003000000120394046d61696e00000000"
    );
}

#[test]
fn empty_module_is_well_formed() {
    let bytes = ModuleWriter::new(Module::new()).build().unwrap();
    assert_eq!(&bytes[..4], &[0x42, 0x43, 0xc0, 0xde]);
    assert_eq!(bytes.len() % 4, 0);
}

#[test]
fn symbol_names_land_in_the_string_table() {
    let mut module = Module::new();
    let i32ty = module.types_mut().int(32);
    let init = module.const_int(i32ty, 0);
    module.add_global("counter", i32ty, false, Linkage::Internal, Some(init));

    let sig = module.types_mut().signature(i32ty, vec![]);
    module.declare("reader", sig, Linkage::External, CallConv::C);

    let bytes = ModuleWriter::new(module).build().unwrap();
    // One concatenated blob, globals before declarations.
    assert!(contains(&bytes, b"counterreader"));
}

#[test]
fn a_full_function_body_encodes() {
    let mut module = Module::new();
    let i32ty = module.types_mut().int(32);
    let boolty = module.types_mut().int(1);
    let ptr = module.types_mut().ptr(i32ty);
    let sig = module.types_mut().signature(i32ty, vec![ptr, i32ty]);

    let mut f = module.define("clamp", sig, Linkage::External, CallConv::C);
    f.name_arg(0, "slot");
    let entry = f.block(Some("entry"));
    let store_bb = f.block(None);
    let done = f.block(None);

    f.switch_to(entry);
    let slot = f.arg(0);
    let limit = f.arg(1);
    let loaded = f.load(i32ty, slot, Some(4), false).unwrap();
    let over = f.icmp(IcmpPred::Sgt, loaded, limit).unwrap();
    f.branch(over, store_bb, done).unwrap();

    f.switch_to(store_bb);
    f.store(slot, limit, Some(4), false).unwrap();
    f.jump(done).unwrap();

    f.switch_to(done);
    let phi = f.phi(boolty, vec![(over, entry), (over, store_bb)]).unwrap();
    let ext = f.cast(bitforge_ir::CastOp::Zext, phi, i32ty).unwrap();
    let sum = f.binop(BinOp::Add, ext, limit).unwrap();
    f.ret(Some(sum)).unwrap();
    f.finish();

    let bytes = ModuleWriter::new(module).build().unwrap();
    assert_eq!(&bytes[..4], &[0x42, 0x43, 0xc0, 0xde]);
    assert!(contains(&bytes, b"clamp"));
}

#[test]
fn calls_aggregates_and_metadata_encode() {
    let mut module = Module::with_source("mixed.ll");
    let i8ty = module.types_mut().int(8);
    let i32ty = module.types_mut().int(32);
    let arr = module.types_mut().array(2, i8ty);

    let e0 = module.const_int(i8ty, 1);
    let e1 = module.const_int(i8ty, 2);
    let init = module.const_aggregate(arr, vec![e0, e1]);
    module.add_global("pair", arr, true, Linkage::Private, Some(init));

    let callee_sig = module.types_mut().signature(i32ty, vec![i32ty]);
    let callee = module.declare("helper", callee_sig, Linkage::External, CallConv::C);

    let sig = module.types_mut().signature(i32ty, vec![i32ty]);
    let mut f = module.define("run", sig, Linkage::External, CallConv::C);
    f.block(None);
    let a = f.arg(0);
    let got = f
        .call(callee, callee_sig, vec![a], CallConv::C, TailKind::Tail)
        .unwrap();
    let ret = f.ret(Some(got)).unwrap();

    let name = f.module().md_string("run");
    let node = f.module().md_tuple(vec![name]);
    f.attach_metadata(ret, "annotation", node);
    f.finish();

    let bytes = ModuleWriter::new(module).build().unwrap();
    assert_eq!(&bytes[..4], &[0x42, 0x43, 0xc0, 0xde]);
    // Strtab order: globals, then definitions, then declarations.
    assert!(contains(&bytes, b"pairrunhelper"));
}

#[test]
fn attributes_produce_paramattr_blocks() {
    let mut module = Module::new();
    let void = module.types_mut().void();
    let sig = module.types_mut().signature(void, vec![]);

    let plain = {
        let mut m = Module::new();
        let void = m.types_mut().void();
        let sig = m.types_mut().signature(void, vec![]);
        let mut f = m.define("f", sig, Linkage::External, CallConv::C);
        f.block(None);
        f.ret(None).unwrap();
        f.finish();
        ModuleWriter::new(m).build().unwrap()
    };

    let mut f = module.define("f", sig, Linkage::External, CallConv::C);
    f.block(None);
    f.ret(None).unwrap();
    let func = f.finish();
    if let Ok(function) = module.function_mut(func) {
        function.attrs.push(Attribute::flag("nounwind"));
        function.attrs.push(Attribute::int("align", 8));
    }

    let attributed = ModuleWriter::new(module).build().unwrap();
    assert!(attributed.len() > plain.len());
}

#[test]
fn extreme_integer_constants_encode() {
    let mut module = Module::new();
    let i64ty = module.types_mut().int(64);
    let sig = module.types_mut().signature(i64ty, vec![]);

    let mut f = module.define("min", sig, Linkage::External, CallConv::C);
    f.block(None);
    let c = f.module().const_int(i64ty, i64::MIN);
    f.ret(Some(c)).unwrap();
    f.finish();

    let bytes = ModuleWriter::new(module).build().unwrap();
    assert_eq!(&bytes[..4], &[0x42, 0x43, 0xc0, 0xde]);
}

#[test]
fn out_of_order_instruction_emission_is_rejected() {
    let mut module = Module::new();
    let i32ty = module.types_mut().int(32);
    let sig = module.types_mut().signature(i32ty, vec![i32ty, i32ty]);

    let mut f = module.define("f", sig, Linkage::External, CallConv::C);
    f.block(None);
    let a = f.arg(0);
    let b = f.arg(1);
    f.binop(BinOp::Add, a, b).unwrap();
    let ret = f.ret(None).unwrap();
    let func = f.finish();

    let mut e = Enumerator::new();
    e.enumerate(&module);
    let mut types = TypeBlock::new();
    for v in e.values() {
        types.add(module.types(), module.value_type(v));
    }

    // Mark the ret as already emitted; the add must then be refused.
    e.check_value_order(ret).unwrap();

    let mut stream = BitStream::new();
    let mut info = BlockInfo::default();
    ConstantBlock::register_info(&mut info);
    FunctionBlock::register_info(&mut info);
    MetadataBlock::register_info(&mut info);
    stream.write_block_info(info).unwrap();

    let err = FunctionBlock::build(&mut stream, &mut e, &types, &module, func).unwrap_err();
    assert!(matches!(err, Error::ValueOrder { .. }));
}

#[test]
fn bad_alignment_is_reported() {
    let mut module = Module::new();
    let i32ty = module.types_mut().int(32);
    let ptr = module.types_mut().ptr(i32ty);
    let sig = module.types_mut().signature(i32ty, vec![ptr]);

    let mut f = module.define("f", sig, Linkage::External, CallConv::C);
    f.block(None);
    let p = f.arg(0);
    let loaded = f.load(i32ty, p, Some(12), false).unwrap();
    f.ret(Some(loaded)).unwrap();
    f.finish();

    let err = ModuleWriter::new(module).build().unwrap_err();
    assert!(matches!(err, Error::InvalidAlignment(12)));
}
