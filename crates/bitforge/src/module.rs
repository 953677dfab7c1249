//! Top-level module encoding: the MODULE block with all its sub-blocks,
//! then the string table.

use bitforge_ir::{Metadata, Module, TypeId, Value, ValueRef};
use bitforge_stream::{Abbr, BitStream, BlockInfo, Operand, RecordValue};

use crate::blocks::{
    ConstantBlock, FunctionBlock, MetadataBlock, MetadataKindBlock, ParamAttrBlock, TypeBlock,
};
use crate::codes::{block_id, fixed, module_code, vbr};
use crate::encoding;
use crate::enumerator::Enumerator;
use crate::error::Result;
use crate::strtab::Strtab;

const ABBREV_ID_WIDTH: u32 = 3;

/// Module format version. Version 2 means symbol names live in the string
/// table and value references are relative.
const VERSION: u64 = 2;

/// Unset operand stand-ins for features the model does not carry.
const NO_SECTION: u64 = 0;
const NO_THREADLOCAL: u64 = 0;
const NO_UNNAMED_ADDR: u64 = 0;
const NOT_EXTERNALLY_INITIALIZED: u64 = 0;
const NO_DLL_STORAGE: u64 = 0;
const NO_COMDAT: u64 = 0;
const NO_GC: u64 = 0;
const NO_PROLOGUE: u64 = 0;
const NO_PREFIX: u64 = 0;
const NO_PERSONALITY: u64 = 0;

/// Encodes one [`Module`] into bitcode bytes.
///
/// The writer owns the module: encoding interns a few derived types (such
/// as pointers to function signatures referenced from metadata) before the
/// type table is laid out.
#[derive(Debug)]
pub struct ModuleWriter {
    module: Module,
}

impl ModuleWriter {
    pub fn new(module: Module) -> Self {
        Self { module }
    }

    pub fn build(mut self) -> Result<Vec<u8>> {
        let mut enumerator = Enumerator::new();
        enumerator.enumerate(&self.module);

        // Metadata wrapping a function symbol writes a pointer type; those
        // pointers must exist before the type table is collected.
        let md_sigs: Vec<TypeId> = enumerator
            .values()
            .filter_map(|v| match self.module.value(v) {
                Value::Metadata(Metadata::Value { ty, .. })
                    if self.module.types().is_signature(*ty) =>
                {
                    Some(*ty)
                }
                _ => None,
            })
            .collect();
        let mut md_ptrs = Vec::with_capacity(md_sigs.len());
        for sig in md_sigs {
            md_ptrs.push(self.module.types_mut().ptr(sig));
        }

        let mut types = TypeBlock::new();
        for v in enumerator.values() {
            types.add(self.module.types(), self.module.value_type(v));
        }
        for ptr in md_ptrs {
            types.add(self.module.types(), ptr);
        }

        let mut param_attrs = ParamAttrBlock::new();
        for &g in self.module.globals() {
            if let Value::Global(global) = self.module.value(g) {
                param_attrs.add_global(g, &global.attrs)?;
            }
        }
        for &f in self.module.functions() {
            if let Value::Function(func) = self.module.value(f) {
                param_attrs.add_function(f, &func.attrs, &func.return_attrs, &func.param_attrs)?;
            }
        }
        for &d in self.module.declarations() {
            if let Value::Declaration(decl) = self.module.value(d) {
                param_attrs.add_function(d, &decl.attrs, &decl.return_attrs, &decl.param_attrs)?;
            }
        }

        let mut stream = BitStream::new();
        let mut strtab = Strtab::new();

        stream.enter_block(block_id::MODULE, ABBREV_ID_WIDTH)?;
        stream.write_unabbrev_record(module_code::VERSION, &[VERSION])?;

        let mut info = BlockInfo::default();
        ConstantBlock::register_info(&mut info);
        FunctionBlock::register_info(&mut info);
        MetadataBlock::register_info(&mut info);
        stream.write_block_info(info)?;

        if let Some(name) = self.module.source_name() {
            stream.define_abbr(Abbr::new(
                "filename",
                vec![
                    Operand::Literal(module_code::SOURCE_FILENAME),
                    Operand::Array(Box::new(Operand::Fixed(fixed::CHAR))),
                ],
            ))?;
            stream.write_record("filename", &[RecordValue::chars(name)])?;
        }

        param_attrs.build(&mut stream)?;
        types.build(&mut stream, self.module.types())?;

        self.globals(&mut stream, &mut enumerator, &types, &param_attrs, &mut strtab)?;

        let global_constants = enumerator.global_constants().to_vec();
        ConstantBlock::build(
            &mut stream,
            &mut enumerator,
            &types,
            &self.module,
            &global_constants,
        )?;

        self.declarations(&mut stream, &mut enumerator, &types, &param_attrs, &mut strtab)?;

        for f in self.module.functions().to_vec() {
            FunctionBlock::build(&mut stream, &mut enumerator, &types, &self.module, f)?;
        }

        MetadataKindBlock::build(&mut stream, enumerator.metadata_kinds())?;

        stream.end_block()?;
        strtab.build(&mut stream)?;
        Ok(stream.end()?)
    }

    // Private

    fn globals(
        &self,
        stream: &mut BitStream,
        enumerator: &mut Enumerator,
        types: &TypeBlock,
        param_attrs: &ParamAttrBlock,
        strtab: &mut Strtab,
    ) -> Result<()> {
        if self.module.globals().is_empty() {
            return Ok(());
        }
        stream.define_abbr(Abbr::new(
            "global",
            vec![
                Operand::Literal(module_code::GLOBALVAR),
                Operand::Vbr(vbr::STRTAB_OFFSET),
                Operand::Vbr(vbr::STRTAB_LENGTH),
                Operand::Vbr(vbr::TYPE_INDEX),
                Operand::Fixed(fixed::BOOL), // constant
                Operand::Vbr(vbr::VALUE_INDEX), // init
                Operand::Fixed(fixed::LINKAGE),
                Operand::Vbr(vbr::ALIGNMENT),
                Operand::Literal(NO_SECTION),
                Operand::Fixed(fixed::VISIBILITY),
                Operand::Literal(NO_THREADLOCAL),
                Operand::Literal(NO_UNNAMED_ADDR),
                Operand::Literal(NOT_EXTERNALLY_INITIALIZED),
                Operand::Literal(NO_DLL_STORAGE),
                Operand::Literal(NO_COMDAT),
                Operand::Vbr(vbr::ATTR_INDEX),
                Operand::Fixed(fixed::BOOL), // dso_local
            ],
        ))?;

        for &g in self.module.globals() {
            enumerator.check_value_order(g)?;
            let Value::Global(global) = self.module.value(g) else {
                continue;
            };
            let name = strtab.add(&global.name);
            // Initializer operand is the constant's id plus one; zero
            // marks a global with no initializer.
            let init = match global.init {
                Some(init) => enumerator.get(init)? + 1,
                None => 0,
            };
            stream.write_record(
                "global",
                &[
                    name.offset.into(),
                    name.len.into(),
                    types.index_of(global.ty)?.into(),
                    u64::from(global.is_constant).into(),
                    init.into(),
                    encoding::linkage(global.linkage).into(),
                    0u64.into(), // alignment unspecified
                    encoding::visibility(bitforge_ir::Visibility::Default).into(),
                    param_attrs.entry_index(g).into(),
                    u64::from(global.linkage.is_local()).into(),
                ],
            )?;
        }
        Ok(())
    }

    /// FUNCTION records for definitions (body elsewhere in the stream) and
    /// declarations, in that order.
    fn declarations(
        &self,
        stream: &mut BitStream,
        enumerator: &mut Enumerator,
        types: &TypeBlock,
        param_attrs: &ParamAttrBlock,
        strtab: &mut Strtab,
    ) -> Result<()> {
        if self.module.functions().is_empty() && self.module.declarations().is_empty() {
            return Ok(());
        }
        stream.define_abbr(Abbr::new(
            "function",
            vec![
                Operand::Literal(module_code::FUNCTION),
                Operand::Vbr(vbr::STRTAB_OFFSET),
                Operand::Vbr(vbr::STRTAB_LENGTH),
                Operand::Vbr(vbr::TYPE_INDEX),
                Operand::Vbr(vbr::CCONV),
                Operand::Fixed(fixed::BOOL), // declaration
                Operand::Fixed(fixed::LINKAGE),
                Operand::Vbr(vbr::ATTR_INDEX),
                Operand::Vbr(vbr::ALIGNMENT),
                Operand::Literal(NO_SECTION),
                Operand::Fixed(fixed::VISIBILITY),
                Operand::Literal(NO_GC),
                Operand::Literal(NO_UNNAMED_ADDR),
                Operand::Literal(NO_PROLOGUE),
                Operand::Literal(NO_DLL_STORAGE),
                Operand::Literal(NO_COMDAT),
                Operand::Literal(NO_PREFIX),
                Operand::Literal(NO_PERSONALITY),
                Operand::Fixed(fixed::BOOL), // dso_local
            ],
        ))?;

        for &f in self.module.functions() {
            let Value::Function(func) = self.module.value(f) else {
                continue;
            };
            self.declaration_record(
                stream, enumerator, types, param_attrs, strtab, f, &func.name, func.ty,
                encoding::cconv(func.cconv), false, func.linkage,
            )?;
        }
        for &d in self.module.declarations() {
            let Value::Declaration(decl) = self.module.value(d) else {
                continue;
            };
            self.declaration_record(
                stream, enumerator, types, param_attrs, strtab, d, &decl.name, decl.ty,
                encoding::cconv(decl.cconv), true, decl.linkage,
            )?;
        }
        Ok(())
    }

    #[allow(clippy::too_many_arguments)]
    fn declaration_record(
        &self,
        stream: &mut BitStream,
        enumerator: &mut Enumerator,
        types: &TypeBlock,
        param_attrs: &ParamAttrBlock,
        strtab: &mut Strtab,
        v: ValueRef,
        name: &str,
        ty: TypeId,
        cconv: u64,
        is_declaration: bool,
        linkage: bitforge_ir::Linkage,
    ) -> Result<()> {
        enumerator.check_value_order(v)?;
        let name = strtab.add(name);
        stream.write_record(
            "function",
            &[
                name.offset.into(),
                name.len.into(),
                types.index_of(ty)?.into(),
                cconv.into(),
                u64::from(is_declaration).into(),
                encoding::linkage(linkage).into(),
                param_attrs.entry_index(v).into(),
                0u64.into(), // alignment unspecified
                encoding::visibility(bitforge_ir::Visibility::Default).into(),
                u64::from(linkage.is_local()).into(),
            ],
        )?;
        Ok(())
    }
}
