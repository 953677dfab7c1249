//! Wire-level numeric tables: block ids, record codes, and the field
//! widths the stock abbreviations use.

pub mod block_id {
    pub const MODULE: u64 = 8;
    pub const PARAMATTR: u64 = 9;
    pub const PARAMATTR_GROUP: u64 = 10;
    pub const CONSTANTS: u64 = 11;
    pub const FUNCTION: u64 = 12;
    pub const VALUE_SYMTAB: u64 = 14;
    pub const METADATA: u64 = 15;
    pub const METADATA_ATTACHMENT: u64 = 16;
    pub const TYPE: u64 = 17;
    pub const METADATA_KIND: u64 = 22;
    pub const STRTAB: u64 = 23;
}

pub mod module_code {
    pub const VERSION: u64 = 1;
    pub const GLOBALVAR: u64 = 7;
    pub const FUNCTION: u64 = 8;
    pub const SOURCE_FILENAME: u64 = 16;
}

pub mod type_code {
    pub const NUMENTRY: u64 = 1;
    pub const VOID: u64 = 2;
    pub const LABEL: u64 = 5;
    pub const OPAQUE: u64 = 6;
    pub const INTEGER: u64 = 7;
    pub const POINTER: u64 = 8;
    pub const ARRAY: u64 = 11;
    pub const METADATA: u64 = 16;
    pub const STRUCT_ANON: u64 = 18;
    pub const STRUCT_NAME: u64 = 19;
    pub const STRUCT_NAMED: u64 = 20;
    pub const FUNCTION: u64 = 21;
}

pub mod constants_code {
    pub const SETTYPE: u64 = 1;
    pub const NULL: u64 = 2;
    pub const UNDEF: u64 = 3;
    pub const INTEGER: u64 = 4;
    pub const AGGREGATE: u64 = 7;
}

pub mod function_code {
    pub const DECLAREBLOCKS: u64 = 1;
    pub const INST_BINOP: u64 = 2;
    pub const INST_CAST: u64 = 3;
    pub const INST_CMP: u64 = 9;
    pub const INST_RET: u64 = 10;
    pub const INST_BR: u64 = 11;
    pub const INST_SWITCH: u64 = 12;
    pub const INST_UNREACHABLE: u64 = 15;
    pub const INST_PHI: u64 = 16;
    pub const INST_LOAD: u64 = 20;
    pub const INST_EXTRACTVAL: u64 = 26;
    pub const INST_INSERTVAL: u64 = 27;
    pub const INST_CALL: u64 = 34;
    pub const INST_GEP: u64 = 43;
    pub const INST_STORE: u64 = 44;
}

pub mod value_symtab_code {
    pub const ENTRY: u64 = 1;
    pub const BBENTRY: u64 = 2;
}

pub mod paramattr_code {
    pub const ENTRY: u64 = 2;
}

pub mod paramattr_group_code {
    pub const ENTRY: u64 = 3;
}

pub mod metadata_code {
    pub const VALUE: u64 = 2;
    pub const NODE: u64 = 3;
    pub const STRINGS: u64 = 35;
}

pub mod metadata_attachment_code {
    pub const ATTACHMENT: u64 = 11;
}

pub mod metadata_kind_code {
    pub const KIND: u64 = 6;
}

pub mod strtab_code {
    pub const BLOB: u64 = 1;
}

/// Fixed-width field sizes used by the stock abbreviations.
pub mod fixed {
    pub const BOOL: u32 = 1;
    pub const VISIBILITY: u32 = 2;
    pub const LINKAGE: u32 = 4;
    pub const CAST_TYPE: u32 = 4;
    pub const BINOP_TYPE: u32 = 4;
    pub const PREDICATE: u32 = 6;
    pub const CHAR: u32 = 8;
}

/// VBR group widths used by the stock abbreviations.
pub mod vbr {
    pub const ALIGNMENT: u32 = 3;
    pub const CCONV: u32 = 5;
    pub const ATTR_INDEX: u32 = 6;
    pub const BLOCK_COUNT: u32 = 6;
    pub const TYPE_INDEX: u32 = 6;
    pub const STRTAB_LENGTH: u32 = 6;
    pub const METADATA_INDEX: u32 = 6;
    pub const METADATA_KIND_INDEX: u32 = 6;
    pub const METADATA_STRING_COUNT: u32 = 6;
    pub const METADATA_STRING_OFF: u32 = 6;
    pub const ARRAY_LENGTH: u32 = 8;
    pub const BLOCK_INDEX: u32 = 8;
    pub const INTEGER: u32 = 8;
    pub const INT_WIDTH: u32 = 8;
    pub const STRTAB_OFFSET: u32 = 8;
    pub const VALUE_INDEX: u32 = 8;
}

/// Bit positions inside the packed call-record flags operand.
pub mod call_flag_shift {
    pub const TAIL: u32 = 0;
    pub const CCONV: u32 = 1;
    pub const MUSTTAIL: u32 = 14;
    pub const EXPLICIT_TYPE: u32 = 15;
    pub const NOTAIL: u32 = 16;
}

/// Wire id of a well-known attribute key, if there is one. Keys without an
/// entry here travel as custom string attributes.
pub fn known_attribute(key: &str) -> Option<u64> {
    let id = match key {
        "align" => 1,
        "alwaysinline" => 2,
        "byval" => 3,
        "inlinehint" => 4,
        "inreg" => 5,
        "minsize" => 6,
        "naked" => 7,
        "nest" => 8,
        "noalias" => 9,
        "nobuiltin" => 10,
        "nocapture" => 11,
        "noduplicates" => 12,
        "noimplicitfloat" => 13,
        "noinline" => 14,
        "nonlazybind" => 15,
        "noredzone" => 16,
        "noreturn" => 17,
        "nounwind" => 18,
        "optsize" => 19,
        "readnone" => 20,
        "readonly" => 21,
        "returned" => 22,
        "returns_twice" => 23,
        "signext" => 24,
        "alignstack" => 25,
        "ssp" => 26,
        "sspreq" => 27,
        "sspstrong" => 28,
        "sret" => 29,
        "sanitize_address" => 30,
        "sanitize_thread" => 31,
        "sanitize_memory" => 32,
        "uwtable" => 33,
        "zeroext" => 34,
        "builtin" => 35,
        "cold" => 36,
        "optnone" => 37,
        "inalloca" => 38,
        "nonnull" => 39,
        "jumptable" => 40,
        "dereferenceable" => 41,
        "dereferenceable_or_null" => 42,
        "convergent" => 43,
        "safestack" => 44,
        "argmemonly" => 45,
        "swiftself" => 46,
        "swifterror" => 47,
        "norecurse" => 48,
        "inaccessiblememonly" => 49,
        "inaccessiblememonly_or_argmemonly" => 50,
        "allocsize" => 51,
        "writeonly" => 52,
        "speculatable" => 53,
        "strictfp" => 54,
        "sanitize_hwaddress" => 55,
        _ => return None,
    };
    Some(id)
}
