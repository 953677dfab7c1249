use bitforge_ir::{BinOp, CallConv, Linkage, Module};

use crate::Error;
use crate::enumerator::Enumerator;

#[test]
fn module_entities_then_function_relative_ids() {
    let mut module = Module::new();
    let i8ty = module.types_mut().int(8);
    let i32ty = module.types_mut().int(32);
    let arr = module.types_mut().array(2, i8ty);

    let e0 = module.const_int(i8ty, 1);
    let e1 = module.const_int(i8ty, 2);
    let init = module.const_aggregate(arr, vec![e0, e1]);
    let g = module.add_global("g", arr, true, Linkage::External, Some(init));

    let sig = module.types_mut().signature(i32ty, vec![i32ty]);
    let mut f = module.define("f", sig, Linkage::External, CallConv::C);
    f.block(None);
    let a = f.arg(0);
    let one = f.module().const_int(i32ty, 1);
    let sum = f.binop(BinOp::Add, a, one).unwrap();
    f.ret(Some(sum)).unwrap();
    let func = f.finish();

    let decl = module.declare("d", sig, Linkage::External, CallConv::C);

    let mut e = Enumerator::new();
    e.enumerate(&module);

    // Module level: globals, their constants (aggregate before elements),
    // functions, declarations.
    assert_eq!(e.get(g).unwrap(), 0);
    assert_eq!(e.get(init).unwrap(), 1);
    assert_eq!(e.get(e0).unwrap(), 2);
    assert_eq!(e.get(e1).unwrap(), 3);
    assert_eq!(e.get(func).unwrap(), 4);
    assert_eq!(e.get(decl).unwrap(), 5);
    assert_eq!(e.global_constants(), &[init, e0, e1]);

    // Function level: arguments, then body constants, then instructions.
    assert_eq!(e.get(a).unwrap(), 6);
    assert_eq!(e.get(one).unwrap(), 7);
    assert_eq!(e.get(sum).unwrap(), 8);
    assert_eq!(e.function_constants(func), &[one]);
}

#[test]
fn each_function_restarts_at_the_baseline() {
    let mut module = Module::new();
    let i64ty = module.types_mut().int(64);
    let sig = module.types_mut().signature(i64ty, vec![i64ty]);

    let mut f1 = module.define("first", sig, Linkage::External, CallConv::C);
    f1.block(None);
    let a1 = f1.arg(0);
    let c1 = f1.module().const_int(i64ty, 10);
    let r1 = f1.binop(BinOp::Mul, a1, c1).unwrap();
    f1.ret(Some(r1)).unwrap();
    let first = f1.finish();

    let mut f2 = module.define("second", sig, Linkage::External, CallConv::C);
    f2.block(None);
    let a2 = f2.arg(0);
    f2.ret(Some(a2)).unwrap();
    f2.finish();

    let mut e = Enumerator::new();
    e.enumerate(&module);

    // Two definitions, so the baseline is 2; both argument lists start
    // there.
    assert_eq!(e.get(a1).unwrap(), 2);
    assert_eq!(e.get(a2).unwrap(), 2);
    assert_eq!(e.function_constants(first), &[c1]);
}

#[test]
fn void_instructions_consume_no_id() {
    let mut module = Module::new();
    let i32ty = module.types_mut().int(32);
    let sig = module.types_mut().signature(i32ty, vec![i32ty, i32ty]);

    let mut f = module.define("f", sig, Linkage::External, CallConv::C);
    let entry = f.block(None);
    let body = f.block(None);
    f.switch_to(entry);
    f.jump(body).unwrap();
    f.switch_to(body);
    let a = f.arg(0);
    let b = f.arg(1);
    let sum = f.binop(BinOp::Add, a, b).unwrap();
    f.ret(Some(sum)).unwrap();
    f.finish();

    let mut e = Enumerator::new();
    e.enumerate(&module);

    // args 1 and 2, so the add is id 3 regardless of any void
    // instructions around it.
    assert_eq!(e.get(sum).unwrap(), 3);
}

#[test]
fn constants_shared_with_module_scope_stay_global() {
    let mut module = Module::new();
    let i32ty = module.types_mut().int(32);
    let init = module.const_int(i32ty, 7);
    module.add_global("g", i32ty, true, Linkage::Internal, Some(init));
    let sig = module.types_mut().signature(i32ty, vec![]);

    let mut f = module.define("f", sig, Linkage::External, CallConv::C);
    f.block(None);
    f.ret(Some(init)).unwrap();
    let func = f.finish();

    let mut e = Enumerator::new();
    e.enumerate(&module);

    assert_eq!(e.global_constants(), &[init]);
    assert!(e.function_constants(func).is_empty());
    assert_eq!(e.get(init).unwrap(), 1);
}

#[test]
fn metadata_lists_are_topologically_ordered() {
    let mut module = Module::new();
    let i32ty = module.types_mut().int(32);
    let sig = module.types_mut().signature(i32ty, vec![i32ty]);

    let c = module.const_int(i32ty, 42);
    let s = module.md_string("answer");
    let v = module.md_value(c).unwrap();
    let tuple = module.md_tuple(vec![s, v]);

    let mut f = module.define("f", sig, Linkage::External, CallConv::C);
    f.block(None);
    let a = f.arg(0);
    let ret = f.ret(Some(a)).unwrap();
    f.attach_metadata(ret, "dbg", tuple);
    let func = f.finish();

    let mut e = Enumerator::new();
    e.enumerate(&module);

    assert_eq!(e.function_metadata(func), &[s, v, tuple]);
    assert_eq!(e.function_constants(func), &[c]);
    assert_eq!(e.metadata_kinds().get("dbg"), Some(&0));
}

#[test]
fn emission_order_is_validated() {
    let mut module = Module::new();
    let i8ty = module.types_mut().int(8);
    let g0 = module.add_global("a", i8ty, false, Linkage::External, None);
    let g1 = module.add_global("b", i8ty, false, Linkage::External, None);

    let mut e = Enumerator::new();
    e.enumerate(&module);

    assert_eq!(e.check_value_order(g1).unwrap(), 1);
    assert!(matches!(
        e.check_value_order(g0),
        Err(Error::ValueOrder { last: 1, got: 0 })
    ));
}

#[test]
fn leaving_a_function_requires_body_emission() {
    let mut module = Module::new();
    let i32ty = module.types_mut().int(32);
    let sig = module.types_mut().signature(i32ty, vec![i32ty]);

    let mut f = module.define("f", sig, Linkage::External, CallConv::C);
    f.block(None);
    let a = f.arg(0);
    let ret = f.ret(Some(a)).unwrap();
    f.finish();

    let mut e = Enumerator::new();
    e.enumerate(&module);

    // No body record was checked yet, so the last-emitted id still sits
    // below the baseline.
    assert!(matches!(e.leave_function(), Err(Error::BaselineOrder { .. })));

    e.check_value_order(ret).unwrap();
    e.leave_function().unwrap();
}

#[test]
fn unknown_values_are_rejected() {
    let mut module = Module::new();
    let i8ty = module.types_mut().int(8);
    let stray = module.const_int(i8ty, 1);

    let e = Enumerator::new();
    assert!(matches!(e.get(stray), Err(Error::NotEnumerated)));
}
