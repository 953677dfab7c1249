//! Symbolic-enum to wire-integer translation.

use bitforge_ir::{BinOp, CallConv, CastOp, IcmpPred, Linkage, TailKind, Visibility};

use crate::codes::call_flag_shift;
use crate::error::{Error, Result};

pub fn linkage(l: Linkage) -> u64 {
    match l {
        Linkage::External => 0,
        Linkage::Weak => 1,
        Linkage::Appending => 2,
        Linkage::Internal => 3,
        Linkage::Linkonce => 4,
        Linkage::Dllimport => 5,
        Linkage::Dllexport => 6,
        Linkage::ExternWeak => 7,
        Linkage::Common => 8,
        Linkage::Private => 9,
        Linkage::WeakOdr => 10,
        Linkage::LinkonceOdr => 11,
        Linkage::AvailableExternally => 12,
    }
}

pub fn cconv(c: CallConv) -> u64 {
    match c {
        CallConv::C => 0,
        CallConv::ArmAapcsVfp => 6,
        CallConv::Fast => 8,
        CallConv::Cold => 9,
        CallConv::WebkitJs => 12,
        CallConv::AnyReg => 13,
        CallConv::PreserveMost => 14,
        CallConv::PreserveAll => 15,
        CallConv::Swift => 16,
        CallConv::CxxFastTls => 17,
        CallConv::X86Stdcall => 64,
        CallConv::X86Fastcall => 65,
        CallConv::ArmApcs => 66,
        CallConv::ArmAapcs => 67,
    }
}

pub fn visibility(v: Visibility) -> u64 {
    match v {
        Visibility::Default => 0,
        Visibility::Hidden => 1,
        Visibility::Protected => 2,
    }
}

pub fn cast_op(op: CastOp) -> u64 {
    match op {
        CastOp::Trunc => 0,
        CastOp::Zext => 1,
        CastOp::Sext => 2,
        CastOp::FpToUi => 3,
        CastOp::FpToSi => 4,
        CastOp::UiToFp => 5,
        CastOp::SiToFp => 6,
        CastOp::FpTrunc => 7,
        CastOp::FpExt => 8,
        CastOp::PtrToInt => 9,
        CastOp::IntToPtr => 10,
        CastOp::Bitcast => 11,
        CastOp::AddrSpaceCast => 12,
    }
}

pub fn binop(op: BinOp) -> u64 {
    match op {
        BinOp::Add => 0,
        BinOp::Sub => 1,
        BinOp::Mul => 2,
        BinOp::Udiv => 3,
        BinOp::Sdiv => 4,
        BinOp::Urem => 5,
        BinOp::Srem => 6,
        BinOp::Shl => 7,
        BinOp::Lshr => 8,
        BinOp::Ashr => 9,
        BinOp::And => 10,
        BinOp::Or => 11,
        BinOp::Xor => 12,
    }
}

pub fn icmp_pred(p: IcmpPred) -> u64 {
    match p {
        IcmpPred::Eq => 32,
        IcmpPred::Ne => 33,
        IcmpPred::Ugt => 34,
        IcmpPred::Uge => 35,
        IcmpPred::Ult => 36,
        IcmpPred::Ule => 37,
        IcmpPred::Sgt => 38,
        IcmpPred::Sge => 39,
        IcmpPred::Slt => 40,
        IcmpPred::Sle => 41,
    }
}

/// Sign-magnitude: the sign lands in the low bit so small negative values
/// stay small on the wire.
pub fn signed(value: i64) -> u64 {
    if value < 0 {
        (value.unsigned_abs() << 1) | 1
    } else {
        (value as u64) << 1
    }
}

/// Alignment operand: `log2(align) + 1`, with `0` meaning "unspecified".
pub fn alignment(align: Option<u64>) -> Result<u64> {
    match align {
        None => Ok(0),
        Some(a) if a.is_power_of_two() => Ok(u64::from(a.trailing_zeros()) + 1),
        Some(a) => Err(Error::InvalidAlignment(a)),
    }
}

/// Packed flags operand of a call record. The explicit-type bit is always
/// set: every call carries its callee signature on the wire.
pub fn call_flags(c: CallConv, tail: TailKind) -> u64 {
    let mut flags = cconv(c) << call_flag_shift::CCONV;
    flags |= 1 << call_flag_shift::EXPLICIT_TYPE;
    flags
        | match tail {
            TailKind::None => 0,
            TailKind::Tail => 1 << call_flag_shift::TAIL,
            TailKind::MustTail => 1 << call_flag_shift::MUSTTAIL,
            TailKind::NoTail => 1 << call_flag_shift::NOTAIL,
        }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn signed_keeps_small_magnitudes_small() {
        assert_eq!(signed(0), 0);
        assert_eq!(signed(1), 2);
        assert_eq!(signed(-1), 3);
        assert_eq!(signed(-64), 129);
        assert_eq!(signed(i64::MAX), (i64::MAX as u64) << 1);
    }

    #[test]
    fn signed_extremes_stay_in_range() {
        // The magnitude of i64::MIN does not fit in i64; the sign bit
        // spills off the top and the wire value is 1.
        assert_eq!(signed(i64::MIN), 1);
        assert_eq!(signed(i64::MIN + 1), u64::MAX);
    }

    #[test]
    fn alignment_is_log2_plus_one() {
        assert_eq!(alignment(None).unwrap(), 0);
        assert_eq!(alignment(Some(1)).unwrap(), 1);
        assert_eq!(alignment(Some(8)).unwrap(), 4);
        assert!(matches!(
            alignment(Some(12)),
            Err(Error::InvalidAlignment(12))
        ));
    }

    #[test]
    fn call_flags_pack_cconv_and_tail() {
        assert_eq!(call_flags(CallConv::C, TailKind::None), 1 << 15);
        assert_eq!(call_flags(CallConv::Fast, TailKind::Tail), (8 << 1) | (1 << 15) | 1);
        assert_eq!(
            call_flags(CallConv::C, TailKind::MustTail),
            (1 << 15) | (1 << 14)
        );
    }
}
